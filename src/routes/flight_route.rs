use crate::models::flight::{AirportsResponse, FlightDetail, FlightSearchQuery, FlightSearchResponse, Pricing};
use crate::models::seat::{AvailableSeatsResponse, LayoutResponse, SeatClass};
use crate::routes::{parse_optional, parse_param};
use crate::services::flight_service::FlightService;
use crate::services::seat_service::SeatService;
use crate::utils::error::AppError;
use crate::utils::time::parse_date;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Search active flights
#[openapi(tag = "Flights")]
#[get("/flights/search?<departure_date>&<source>&<destination>")]
pub async fn search_flights(
    departure_date: Option<String>,
    source: Option<String>,
    destination: Option<String>,
    flight_service: &State<FlightService>,
) -> Result<Json<FlightSearchResponse>, AppError> {
    let departure_date = departure_date
        .filter(|d| !d.trim().is_empty())
        .map(|d| parse_date(&d))
        .transpose()?;

    let query = FlightSearchQuery {
        departure_date,
        source,
        destination,
    };
    let flights = flight_service.search_flights(query).await?;
    Ok(Json(flights))
}

/// Airports that appear on any route
#[openapi(tag = "Flights")]
#[get("/flights/airports")]
pub async fn list_airports(flight_service: &State<FlightService>) -> Result<Json<AirportsResponse>, AppError> {
    Ok(Json(flight_service.list_airports().await?))
}

#[openapi(tag = "Flights")]
#[get("/flights/<flight_number>")]
pub async fn get_flight_detail(
    flight_number: String,
    flight_service: &State<FlightService>,
) -> Result<Json<FlightDetail>, AppError> {
    Ok(Json(flight_service.get_flight_detail(&flight_number).await?))
}

#[openapi(tag = "Flights")]
#[get("/flights/<flight_number>/pricing")]
pub async fn get_pricing(
    flight_number: String,
    flight_service: &State<FlightService>,
) -> Result<Json<Vec<Pricing>>, AppError> {
    Ok(Json(flight_service.get_pricing(&flight_number).await?))
}

/// Seat grid of one class, empty when the class is not offered
#[openapi(tag = "Seats")]
#[get("/flights/<flight_number>/layout?<class>")]
pub async fn get_layout(
    flight_number: String,
    class: Option<String>,
    seat_service: &State<SeatService>,
) -> Result<Json<LayoutResponse>, AppError> {
    let class: SeatClass = parse_optional("class", class)?.unwrap_or(SeatClass::Economy);
    Ok(Json(seat_service.get_layout(&flight_number, class).await?))
}

/// Free seats, row by row
#[openapi(tag = "Seats")]
#[get("/flights/<flight_number>/seats?<class>")]
pub async fn get_available_seats(
    flight_number: String,
    class: String,
    seat_service: &State<SeatService>,
) -> Result<Json<AvailableSeatsResponse>, AppError> {
    let class: SeatClass = parse_param("class", &class)?;
    Ok(Json(seat_service.get_available_seats(&flight_number, class).await?))
}
