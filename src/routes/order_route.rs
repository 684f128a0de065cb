use crate::models::order::{
    BookingConfirmation, BookingRequest, CancellationOutcome, Order, OrderLookupRequest, OrderStatus, OrderWithTickets,
};
use crate::routes::parse_optional;
use crate::services::order_service::OrderService;
use crate::utils::error::AppError;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Book seats for a guest or a registered customer
#[openapi(tag = "Orders")]
#[post("/bookings", format = "json", data = "<request>")]
pub async fn book_seats(
    request: Json<BookingRequest>,
    order_service: &State<OrderService>,
) -> Result<Json<BookingConfirmation>, AppError> {
    let confirmation = order_service.book_seats(request.into_inner()).await?;
    Ok(Json(confirmation))
}

/// Find an order by id and payer email
#[openapi(tag = "Orders")]
#[post("/orders/lookup", format = "json", data = "<request>")]
pub async fn lookup_order(
    request: Json<OrderLookupRequest>,
    order_service: &State<OrderService>,
) -> Result<Json<OrderWithTickets>, AppError> {
    let order = order_service
        .find_order(request.order_id, &request.email)
        .await?;
    Ok(Json(order))
}

/// Cancel an order, keeping the cancellation fee
#[openapi(tag = "Orders")]
#[post("/orders/cancel", format = "json", data = "<request>")]
pub async fn cancel_order(
    request: Json<OrderLookupRequest>,
    order_service: &State<OrderService>,
) -> Result<Json<CancellationOutcome>, AppError> {
    let outcome = order_service
        .cancel_with_fee(request.order_id, &request.email)
        .await?;
    Ok(Json(outcome))
}

/// Orders of a registered customer, newest first
#[openapi(tag = "Orders")]
#[get("/orders/history?<email>&<status>")]
pub async fn order_history(
    email: String,
    status: Option<String>,
    order_service: &State<OrderService>,
) -> Result<Json<Vec<Order>>, AppError> {
    let status: Option<OrderStatus> = parse_optional("status", status)?;
    Ok(Json(order_service.order_history(&email, status).await?))
}
