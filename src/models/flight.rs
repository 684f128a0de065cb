use crate::models::aircraft::{Aircraft, CrewRequirement};
use crate::models::crew::CrewMember;
use crate::models::seat::SeatClass;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::Validate;

// Flight status, driven by the lifecycle engine
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
pub enum FlightStatus {
    Active,
    Full,
    Arrived,
    Canceled,
}

impl FlightStatus {
    /// Canceled and Arrived flights no longer follow seat occupancy.
    pub fn tracks_occupancy(self) -> bool {
        matches!(self, FlightStatus::Active | FlightStatus::Full)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Route {
    pub route_id: i32,
    pub source_airport: String,
    pub destination_airport: String,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Flight {
    pub flight_number: String,
    pub route_id: i32,
    pub tail_number: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub status: FlightStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Pricing {
    pub class: SeatClass,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FlightSearchQuery {
    pub departure_date: Option<NaiveDate>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

// Single flight row in search results and admin listings
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FlightSummary {
    pub flight_number: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival: NaiveDateTime,
    pub status: FlightStatus,
    pub source_airport: String,
    pub destination_airport: String,
    pub duration_minutes: i64,
    pub tail_number: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FlightSearchResponse {
    pub flights: Vec<FlightSummary>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FlightDetail {
    #[serde(flatten)]
    pub summary: FlightSummary,
    pub economy_seats: u64,
    pub business_seats: u64,
    pub pricing: Vec<Pricing>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AirportsResponse {
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct CreateFlightRequest {
    #[validate(length(min = 1, max = 20, message = "Flight number is required"))]
    pub flight_number: String,
    pub route_id: i32,
    #[validate(length(min = 1, message = "Tail number is required"))]
    pub tail_number: String,
    pub departure_date: NaiveDate,
    /// `HH:MM` or `HH:MM:SS`
    pub departure_time: String,
    pub pilot_ids: Vec<i32>,
    pub attendant_ids: Vec<i32>,
    pub economy_price: Decimal,
    pub business_price: Option<Decimal>,
}

/// Everything written when a validated flight is created.
#[derive(Debug, Clone)]
pub struct FlightPlan {
    pub flight: Flight,
    pub pilot_ids: Vec<i32>,
    pub attendant_ids: Vec<i32>,
    pub pricing: Vec<Pricing>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CreateFlightResponse {
    pub flight_number: String,
    pub status: FlightStatus,
    pub pilots_assigned: usize,
    pub attendants_assigned: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FlightCandidates {
    pub route_id: i32,
    pub is_long_haul: bool,
    pub aircraft: Vec<Aircraft>,
    pub pilots: Vec<CrewMember>,
    pub attendants: Vec<CrewMember>,
    pub small_crew: CrewRequirement,
    pub large_crew: CrewRequirement,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlightStatusRequest {
    pub status: FlightStatus,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FlightCancellation {
    pub flight_number: String,
    pub cancelled_orders: Vec<i64>,
    pub refreshed_flights: Vec<String>,
}
