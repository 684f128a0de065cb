use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
pub enum CrewRole {
    Pilot,
    Attendant,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CrewMember {
    pub employee_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub long_haul_qualified: bool,
}

/// One non-canceled flight a crew member is already assigned to.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledLeg {
    pub flight_number: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub source_airport: String,
    pub destination_airport: String,
}

/// The flight a roster is being checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct ProspectiveFlight {
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub source_airport: String,
    pub long_haul: bool,
}
