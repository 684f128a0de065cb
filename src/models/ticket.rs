use crate::models::seat::{SeatClass, SeatCoordinate};
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Ticket {
    pub ticket_id: i64,
    pub order_id: i64,
    pub flight_number: String,
    pub passenger_name: String,
    pub class: SeatClass,
    pub seat: SeatCoordinate,
}

// Ticket row to be inserted, the order id is assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub flight_number: String,
    pub passenger_name: String,
    pub class: SeatClass,
    pub seat: SeatCoordinate,
}
