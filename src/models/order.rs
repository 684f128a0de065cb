use crate::models::flight::FlightStatus;
use crate::models::seat::{SeatClass, SeatCoordinate};
use crate::models::ticket::Ticket;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
pub enum OrderStatus {
    Active,
    CustCancelled,
    SysCancelled,
}

impl OrderStatus {
    pub fn is_cancelled(self) -> bool {
        matches!(self, OrderStatus::CustCancelled | OrderStatus::SysCancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Order {
    pub order_id: i64,
    pub guest_email: Option<String>,
    pub registered_email: Option<String>,
    pub order_date: NaiveDateTime,
    pub total_price: Decimal,
    pub status: OrderStatus,
}

impl Order {
    pub fn belongs_to(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.guest_email.as_deref() == Some(email.as_str())
            || self.registered_email.as_deref() == Some(email.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub guest_email: Option<String>,
    pub registered_email: Option<String>,
    pub order_date: NaiveDateTime,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Who pays for a booking: exactly one of a guest or a registered customer.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payer {
    Guest {
        email: String,
        first_name: Option<String>,
        last_name: Option<String>,
    },
    Registered {
        email: String,
        name: Option<String>,
    },
}

impl Payer {
    pub fn email(&self) -> String {
        match self {
            Payer::Guest { email, .. } | Payer::Registered { email, .. } => normalize_email(email),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Payer::Guest { .. } => self
                .guest_record()
                .map(|g| format!("{} {}", g.first_name, g.last_name))
                .unwrap_or_else(|| "Guest".to_string()),
            Payer::Registered { email, name } => name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| normalize_email(email)),
        }
    }

    /// Guest row to record for this payer, `None` for registered customers.
    pub fn guest_record(&self) -> Option<GuestCustomer> {
        match self {
            Payer::Guest {
                email,
                first_name,
                last_name,
            } => Some(GuestCustomer {
                email: normalize_email(email),
                first_name: non_blank(first_name.as_deref()).unwrap_or("Guest").to_string(),
                last_name: non_blank(last_name.as_deref()).unwrap_or("User").to_string(),
            }),
            Payer::Registered { .. } => None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct BookingRequest {
    #[validate(length(min = 1, message = "Flight number is required"))]
    pub flight_number: String,
    pub class: SeatClass,
    /// Requested number of seats, clamped to what is still available.
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    /// Seat tokens such as `"12-C"`.
    pub seats: Vec<String>,
    pub passenger_name: Option<String>,
    pub payer: Payer,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingConfirmation {
    pub order_id: i64,
    pub flight_number: String,
    pub class: SeatClass,
    pub total_price: Decimal,
    pub seats: Vec<SeatCoordinate>,
    pub flight_status: FlightStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
pub enum CancelMode {
    Customer,
    Admin,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OrderLookupRequest {
    pub order_id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct OrderWithTickets {
    pub order: Order,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CancellationOutcome {
    pub order_id: i64,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub released_seats: usize,
    pub refreshed_flights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRefund {
    pub order_id: i64,
    pub total_price: Decimal,
}

/// Writes performed by a cancellation: orders re-priced and marked, their
/// tickets deleted, and optionally a flight moved to Canceled.
#[derive(Debug, Clone, PartialEq)]
pub struct CancellationPlan {
    pub cancel_flight: Option<String>,
    pub status: OrderStatus,
    pub orders: Vec<OrderRefund>,
}
