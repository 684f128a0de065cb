pub mod aircraft;
pub mod crew;
pub mod flight;
pub mod order;
pub mod report;
pub mod seat;
pub mod ticket;
