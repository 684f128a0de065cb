use crate::models::aircraft::{Aircraft, CreateAircraftRequest};
use crate::models::crew::{CrewMember, CrewRole};
use crate::models::flight::{
    CreateFlightRequest, CreateFlightResponse, Flight, FlightCancellation, FlightCandidates, FlightStatus,
    FlightStatusRequest, FlightSummary, Route,
};
use crate::models::order::CancellationOutcome;
use crate::models::report::DashboardReport;
use crate::routes::{parse_optional, parse_param};
use crate::services::crew_service::CrewService;
use crate::services::flight_service::FlightService;
use crate::services::order_service::OrderService;
use crate::services::report_service::ReportService;
use crate::utils::error::AppError;
use crate::utils::time::{parse_date, parse_time_of_day};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

#[openapi(tag = "Admin")]
#[get("/admin/routes")]
pub async fn list_routes(flight_service: &State<FlightService>) -> Result<Json<Vec<Route>>, AppError> {
    Ok(Json(flight_service.list_routes().await?))
}

#[openapi(tag = "Admin")]
#[get("/admin/aircraft")]
pub async fn list_aircraft(flight_service: &State<FlightService>) -> Result<Json<Vec<Aircraft>>, AppError> {
    Ok(Json(flight_service.list_aircraft().await?))
}

/// Register an aircraft with its cabin layouts
#[openapi(tag = "Admin")]
#[post("/admin/aircraft", format = "json", data = "<request>")]
pub async fn create_aircraft(
    request: Json<CreateAircraftRequest>,
    flight_service: &State<FlightService>,
) -> Result<Json<Aircraft>, AppError> {
    Ok(Json(flight_service.create_aircraft(request.into_inner()).await?))
}

#[openapi(tag = "Admin")]
#[get("/admin/crew?<role>")]
pub async fn list_crew(role: String, crew_service: &State<CrewService>) -> Result<Json<Vec<CrewMember>>, AppError> {
    let role: CrewRole = parse_param("role", &role)?;
    Ok(Json(crew_service.list_crew(role).await?))
}

/// All flights, newest first, optionally by status
#[openapi(tag = "Admin")]
#[get("/admin/flights?<status>")]
pub async fn list_flights(
    status: Option<String>,
    flight_service: &State<FlightService>,
) -> Result<Json<Vec<FlightSummary>>, AppError> {
    let status: Option<FlightStatus> = parse_optional("status", status)?;
    Ok(Json(flight_service.list_flights(status).await?))
}

/// Aircraft and crew that could staff a new flight
#[openapi(tag = "Admin")]
#[get("/admin/flights/candidates?<route_id>&<departure_date>&<departure_time>")]
pub async fn flight_candidates(
    route_id: i32,
    departure_date: String,
    departure_time: String,
    crew_service: &State<CrewService>,
) -> Result<Json<FlightCandidates>, AppError> {
    let date = parse_date(&departure_date)?;
    let time = parse_time_of_day(&departure_time)?;
    Ok(Json(crew_service.flight_candidates(route_id, date, time).await?))
}

/// Create a flight with its crew and pricing
#[openapi(tag = "Admin")]
#[post("/admin/flights", format = "json", data = "<request>")]
pub async fn create_flight(
    request: Json<CreateFlightRequest>,
    flight_service: &State<FlightService>,
) -> Result<Json<CreateFlightResponse>, AppError> {
    Ok(Json(flight_service.create_flight(request.into_inner()).await?))
}

/// Cancel a flight and every order holding a ticket on it
#[openapi(tag = "Admin")]
#[post("/admin/flights/<flight_number>/cancel")]
pub async fn cancel_flight(
    flight_number: String,
    flight_service: &State<FlightService>,
) -> Result<Json<FlightCancellation>, AppError> {
    Ok(Json(flight_service.cancel_flight(&flight_number).await?))
}

#[openapi(tag = "Admin")]
#[post("/admin/flights/<flight_number>/status", format = "json", data = "<request>")]
pub async fn set_flight_status(
    flight_number: String,
    request: Json<FlightStatusRequest>,
    flight_service: &State<FlightService>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(
        flight_service
            .set_flight_status(&flight_number, request.status)
            .await?,
    ))
}

/// Cancel an order with a full refund
#[openapi(tag = "Admin")]
#[post("/admin/orders/<order_id>/cancel")]
pub async fn admin_cancel_order(
    order_id: i64,
    order_service: &State<OrderService>,
) -> Result<Json<CancellationOutcome>, AppError> {
    Ok(Json(order_service.admin_cancel_order(order_id).await?))
}

#[openapi(tag = "Admin")]
#[get("/admin/reports")]
pub async fn dashboard(report_service: &State<ReportService>) -> Result<Json<DashboardReport>, AppError> {
    Ok(Json(report_service.dashboard().await?))
}
