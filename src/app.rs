use crate::config::BookingRules;
use crate::routes::api_routes;
use crate::services::crew_service::CrewService;
use crate::services::flight_service::FlightService;
use crate::services::order_service::OrderService;
use crate::services::report_service::ReportService;
use crate::services::seat_service::SeatService;
use crate::store::SharedStore;
use crate::utils::time::SharedClock;
use rocket::fairing::AdHoc;
use rocket::http::Header;
use rocket::{Build, Rocket};
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub const OPENAPI_URL: &str = "/api/openapi.json";

fn swagger_ui() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: OPENAPI_URL.to_string(),
        ..Default::default()
    }
}

/// Assembles the HTTP server around a store, the business rules and a clock.
pub fn build_rocket(store: SharedStore, rules: BookingRules, clock: SharedClock) -> Rocket<Build> {
    let seat_service = SeatService::new(store.clone());
    let crew_service = CrewService::new(store.clone(), rules.clone());
    let flight_service = FlightService::new(store.clone(), rules.clone(), clock.clone());
    let order_service = OrderService::new(store.clone(), rules, clock);
    let report_service = ReportService::new(store);

    rocket::build()
        .manage(seat_service)
        .manage(crew_service)
        .manage(flight_service)
        .manage(order_service)
        .manage(report_service)
        .mount("/api", api_routes())
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
            })
        }))
}
