//! Storage contract consumed by the engines.
//!
//! Every read goes to the current committed state; nothing is cached in
//! process. The seat key `(flight, class, row, column)` is unique among
//! stored tickets and a collision surfaces as `AppError::SeatAlreadyTaken`.
//! Tickets of cancelled orders are deleted, so that key only ever covers
//! seats held by live orders.

pub mod memory_store;
pub mod mysql_store;

use crate::config::Atomicity;
use crate::models::aircraft::Aircraft;
use crate::models::crew::{CrewMember, CrewRole, ScheduledLeg};
use crate::models::flight::{Flight, FlightPlan, FlightSearchQuery, FlightStatus, FlightSummary, Pricing, Route};
use crate::models::order::{CancellationPlan, GuestCustomer, NewOrder, Order, OrderStatus};
use crate::models::report::{ClassRevenue, StatusCount};
use crate::models::seat::{Layout, SeatClass, SeatCoordinate};
use crate::models::ticket::{NewTicket, Ticket};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

pub use memory_store::MemoryStore;
pub use mysql_store::MySqlStore;

pub type SharedStore = Arc<dyn BookingStore>;

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Every route, by route id.
    async fn list_routes(&self) -> AppResult<Vec<Route>>;

    async fn find_route(&self, route_id: i32) -> AppResult<Option<Route>>;

    async fn list_aircraft(&self) -> AppResult<Vec<Aircraft>>;

    async fn find_aircraft(&self, tail_number: &str) -> AppResult<Option<Aircraft>>;

    async fn aircraft_layout(&self, tail_number: &str, class: SeatClass) -> AppResult<Option<Layout>>;

    /// Fails with `DuplicateTailNumber` if the tail number exists.
    async fn insert_aircraft(&self, aircraft: &Aircraft, layouts: &[(SeatClass, Layout)]) -> AppResult<()>;

    async fn find_flight(&self, flight_number: &str) -> AppResult<Option<Flight>>;

    async fn flight_summary(&self, flight_number: &str) -> AppResult<Option<FlightSummary>>;

    /// Flights matching every given filter, ordered by departure date then time.
    async fn search_flights(
        &self,
        query: &FlightSearchQuery,
        status: Option<FlightStatus>,
    ) -> AppResult<Vec<FlightSummary>>;

    async fn flight_pricing(&self, flight_number: &str) -> AppResult<Vec<Pricing>>;

    /// Returns false when no flight has that number.
    async fn update_flight_status(&self, flight_number: &str, status: FlightStatus) -> AppResult<bool>;

    /// Writes the flight row, then crew assignments, then pricing.
    ///
    /// Fails with `DuplicateFlightNumber` before anything is written if the
    /// number is taken. Under `BestEffort`, a later failure leaves the flight
    /// in place and is reported as `PartiallyApplied`.
    async fn insert_flight(&self, plan: &FlightPlan, atomicity: Atomicity) -> AppResult<()>;

    async fn list_crew(&self, role: CrewRole) -> AppResult<Vec<CrewMember>>;

    async fn find_crew_member(&self, role: CrewRole, employee_id: i32) -> AppResult<Option<CrewMember>>;

    /// Non-canceled flights the member is assigned to, by departure.
    async fn crew_schedule(&self, role: CrewRole, employee_id: i32) -> AppResult<Vec<ScheduledLeg>>;

    /// Seats held on a flight/class by orders that are not cancelled.
    async fn taken_seats(&self, flight_number: &str, class: SeatClass) -> AppResult<Vec<SeatCoordinate>>;

    /// Inserts the guest if the email is unknown, never overwrites.
    async fn ensure_guest(&self, guest: &GuestCustomer) -> AppResult<()>;

    /// Creates the order and one ticket per entry, in order.
    ///
    /// A seat collision fails with `SeatAlreadyTaken`. Under `Strict` the
    /// seats are re-checked against data read in the inserting transaction
    /// and nothing is kept on failure; under `BestEffort` the order and
    /// earlier tickets stay and the error carries the order id and how many
    /// tickets were created.
    async fn place_order(&self, order: &NewOrder, tickets: &[NewTicket], atomicity: Atomicity) -> AppResult<i64>;

    async fn find_order(&self, order_id: i64) -> AppResult<Option<Order>>;

    async fn order_tickets(&self, order_id: i64) -> AppResult<Vec<Ticket>>;

    /// Orders paid by a registered customer, newest first.
    async fn orders_for_customer(&self, email: &str, status: Option<OrderStatus>) -> AppResult<Vec<Order>>;

    /// Ids of non-cancelled orders holding at least one ticket on the flight.
    async fn active_orders_on_flight(&self, flight_number: &str) -> AppResult<Vec<i64>>;

    /// Applies a cancellation: flight status (if any), then order status and
    /// totals, then deletes every ticket of those orders.
    async fn apply_cancellation(&self, plan: &CancellationPlan, atomicity: Atomicity) -> AppResult<()>;

    async fn order_status_counts(&self) -> AppResult<Vec<StatusCount>>;

    async fn flight_status_counts(&self) -> AppResult<Vec<StatusCount>>;

    /// Sum of totals of orders that are not cancelled.
    async fn active_revenue(&self) -> AppResult<Decimal>;

    async fn cancelled_order_count(&self) -> AppResult<i64>;

    async fn revenue_by_class(&self) -> AppResult<Vec<ClassRevenue>>;
}
