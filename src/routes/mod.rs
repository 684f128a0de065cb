pub mod admin_route;
pub mod flight_route;
pub mod order_route;

use crate::utils::error::{AppError, AppResult};
use rocket_okapi::openapi_get_routes;
use std::str::FromStr;

// Query strings arrive as text; enum and date values are parsed here
pub(crate) fn parse_param<T: FromStr>(name: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::ValidationFailed(format!("Invalid {}: '{}'", name, value)))
}

pub(crate) fn parse_optional<T: FromStr>(name: &str, value: Option<String>) -> AppResult<Option<T>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_param(name, &v))
        .transpose()
}

/// Every `/api` route plus the generated `openapi.json`.
pub fn api_routes() -> Vec<rocket::Route> {
    openapi_get_routes![
        flight_route::search_flights,
        flight_route::list_airports,
        flight_route::get_flight_detail,
        flight_route::get_pricing,
        flight_route::get_layout,
        flight_route::get_available_seats,
        order_route::book_seats,
        order_route::lookup_order,
        order_route::cancel_order,
        order_route::order_history,
        admin_route::list_routes,
        admin_route::list_aircraft,
        admin_route::create_aircraft,
        admin_route::list_crew,
        admin_route::list_flights,
        admin_route::flight_candidates,
        admin_route::create_flight,
        admin_route::cancel_flight,
        admin_route::set_flight_status,
        admin_route::admin_cancel_order,
        admin_route::dashboard,
    ]
}
