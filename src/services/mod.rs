pub mod crew_service;
pub mod flight_service;
pub mod order_service;
pub mod report_service;
pub mod seat_service;
