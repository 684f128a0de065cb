use crate::models::aircraft::AircraftSize;
use crate::models::crew::CrewRole;
use crate::models::seat::SeatCoordinate;
use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::Request;
use rocket::Response;
use rocket_okapi::JsonSchema;
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Serialize, JsonSchema)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("You must choose exactly {expected} seats, got {actual}")]
    WrongSeatCount { expected: usize, actual: usize },

    #[error("Invalid seat format: {token}")]
    SeatFormatInvalid { token: String },

    #[error("Seat {seat} is not available")]
    SeatUnavailable { seat: SeatCoordinate },

    #[error("Seat {seat} was already taken, please select another seat")]
    SeatAlreadyTaken {
        seat: SeatCoordinate,
        // Set when the order row survived the collision (best-effort booking)
        order_id: Option<i64>,
        tickets_created: usize,
    },

    #[error("Flight number {0} already exists")]
    DuplicateFlightNumber(String),

    #[error("Tail number {0} already exists")]
    DuplicateTailNumber(String),

    #[error("Aircraft {tail_number} is not suitable for route {route_id}")]
    AircraftNotSuitable { tail_number: String, route_id: i32 },

    #[error("Duplicate {role} selected: {employee_id}")]
    DuplicateCrewMember { role: CrewRole, employee_id: i32 },

    #[error("Aircraft size {size}: you must select exactly {required} {role}s, got {provided}")]
    CrewCountMismatch {
        size: AircraftSize,
        role: CrewRole,
        required: usize,
        provided: usize,
    },

    #[error("Long flight: {role} {employee_id} is not long-haul qualified")]
    QualificationMissing { role: CrewRole, employee_id: i32 },

    #[error("{role} {employee_id} overlaps with flight {conflicting_flight}")]
    ScheduleConflict {
        role: CrewRole,
        employee_id: i32,
        conflicting_flight: String,
    },

    #[error("{role} {employee_id} last arrived to {last_location} but new flight departs from {required}")]
    LocationContinuityViolation {
        role: CrewRole,
        employee_id: i32,
        last_location: String,
        required: String,
    },

    #[error("Cancellation allowed only up to {lead_hours} hours before departure")]
    CancellationWindowClosed { lead_hours: i64 },

    #[error("Order {0} is already cancelled")]
    AlreadyCancelled(i64),

    #[error("{completed}, but {failure}")]
    PartiallyApplied {
        completed: String,
        failure: Box<AppError>,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::ValidationFailed(_) => "ValidationFailed",
            AppError::WrongSeatCount { .. } => "WrongSeatCount",
            AppError::SeatFormatInvalid { .. } => "SeatFormatInvalid",
            AppError::SeatUnavailable { .. } => "SeatUnavailable",
            AppError::SeatAlreadyTaken { .. } => "SeatAlreadyTaken",
            AppError::DuplicateFlightNumber(_) => "DuplicateFlightNumber",
            AppError::DuplicateTailNumber(_) => "DuplicateTailNumber",
            AppError::AircraftNotSuitable { .. } => "AircraftNotSuitable",
            AppError::DuplicateCrewMember { .. } => "DuplicateCrewMember",
            AppError::CrewCountMismatch { .. } => "CrewCountMismatch",
            AppError::QualificationMissing { .. } => "QualificationMissing",
            AppError::ScheduleConflict { .. } => "ScheduleConflict",
            AppError::LocationContinuityViolation { .. } => "LocationContinuityViolation",
            AppError::CancellationWindowClosed { .. } => "CancellationWindowClosed",
            AppError::AlreadyCancelled(_) => "AlreadyCancelled",
            AppError::PartiallyApplied { .. } => "PartiallyApplied",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            AppError::NotFound(_) => Status::NotFound,
            AppError::ValidationFailed(_)
            | AppError::WrongSeatCount { .. }
            | AppError::SeatFormatInvalid { .. } => Status::BadRequest,
            AppError::SeatUnavailable { .. }
            | AppError::SeatAlreadyTaken { .. }
            | AppError::DuplicateFlightNumber(_)
            | AppError::DuplicateTailNumber(_)
            | AppError::ScheduleConflict { .. }
            | AppError::AlreadyCancelled(_) => Status::Conflict,
            AppError::AircraftNotSuitable { .. }
            | AppError::DuplicateCrewMember { .. }
            | AppError::CrewCountMismatch { .. }
            | AppError::QualificationMissing { .. }
            | AppError::LocationContinuityViolation { .. }
            | AppError::CancellationWindowClosed { .. } => Status::UnprocessableEntity,
            AppError::PartiallyApplied { failure, .. } => failure.status(),
            AppError::StorageUnavailable(_) => Status::ServiceUnavailable,
        }
    }
}

// Convert sqlx::Error (database error) to AppError::StorageUnavailable.
// Unique key violations are mapped to their specific conflict by the store.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationFailed(err.to_string())
    }
}

// Define a type alias for the result type
pub type AppResult<T> = Result<T, AppError>;

// Format all errors from the route level to a JSON Http Response
#[rocket::async_trait]
impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let json = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });

        Response::build()
            .status(self.status())
            .header(ContentType::JSON)
            .sized_body(None, Cursor::new(json.to_string()))
            .ok()
    }
}
