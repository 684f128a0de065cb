#![allow(dead_code)]

use airline_booking_engine::config::Atomicity;
use airline_booking_engine::models::aircraft::Aircraft;
use airline_booking_engine::models::crew::{CrewMember, CrewRole, ScheduledLeg};
use airline_booking_engine::models::flight::{
    Flight, FlightPlan, FlightSearchQuery, FlightStatus, FlightSummary, Pricing, Route,
};
use airline_booking_engine::models::order::{CancellationPlan, GuestCustomer, NewOrder, Order, OrderStatus};
use airline_booking_engine::models::report::{ClassRevenue, StatusCount};
use airline_booking_engine::models::seat::{Layout, SeatClass, SeatCoordinate};
use airline_booking_engine::models::ticket::{NewTicket, Ticket};
use airline_booking_engine::store::{BookingStore, MemoryStore};
use airline_booking_engine::utils::error::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Barrier;

/// Memory store whose `place_order` waits until `parties` callers arrive.
///
/// Every booking has already passed its availability check by the time it
/// reaches the barrier, so the store's own seat guard decides the winner.
pub struct GatedStore {
    inner: MemoryStore,
    gate: Arc<Barrier>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore, parties: usize) -> Self {
        GatedStore {
            inner,
            gate: Arc::new(Barrier::new(parties)),
        }
    }
}

#[async_trait]
impl BookingStore for GatedStore {
    async fn list_routes(&self) -> AppResult<Vec<Route>> {
        self.inner.list_routes().await
    }

    async fn find_route(&self, route_id: i32) -> AppResult<Option<Route>> {
        self.inner.find_route(route_id).await
    }

    async fn list_aircraft(&self) -> AppResult<Vec<Aircraft>> {
        self.inner.list_aircraft().await
    }

    async fn find_aircraft(&self, tail_number: &str) -> AppResult<Option<Aircraft>> {
        self.inner.find_aircraft(tail_number).await
    }

    async fn aircraft_layout(&self, tail_number: &str, class: SeatClass) -> AppResult<Option<Layout>> {
        self.inner.aircraft_layout(tail_number, class).await
    }

    async fn insert_aircraft(&self, aircraft: &Aircraft, layouts: &[(SeatClass, Layout)]) -> AppResult<()> {
        self.inner.insert_aircraft(aircraft, layouts).await
    }

    async fn find_flight(&self, flight_number: &str) -> AppResult<Option<Flight>> {
        self.inner.find_flight(flight_number).await
    }

    async fn flight_summary(&self, flight_number: &str) -> AppResult<Option<FlightSummary>> {
        self.inner.flight_summary(flight_number).await
    }

    async fn search_flights(
        &self,
        query: &FlightSearchQuery,
        status: Option<FlightStatus>,
    ) -> AppResult<Vec<FlightSummary>> {
        self.inner.search_flights(query, status).await
    }

    async fn flight_pricing(&self, flight_number: &str) -> AppResult<Vec<Pricing>> {
        self.inner.flight_pricing(flight_number).await
    }

    async fn update_flight_status(&self, flight_number: &str, status: FlightStatus) -> AppResult<bool> {
        self.inner.update_flight_status(flight_number, status).await
    }

    async fn insert_flight(&self, plan: &FlightPlan, atomicity: Atomicity) -> AppResult<()> {
        self.inner.insert_flight(plan, atomicity).await
    }

    async fn list_crew(&self, role: CrewRole) -> AppResult<Vec<CrewMember>> {
        self.inner.list_crew(role).await
    }

    async fn find_crew_member(&self, role: CrewRole, employee_id: i32) -> AppResult<Option<CrewMember>> {
        self.inner.find_crew_member(role, employee_id).await
    }

    async fn crew_schedule(&self, role: CrewRole, employee_id: i32) -> AppResult<Vec<ScheduledLeg>> {
        self.inner.crew_schedule(role, employee_id).await
    }

    async fn taken_seats(&self, flight_number: &str, class: SeatClass) -> AppResult<Vec<SeatCoordinate>> {
        self.inner.taken_seats(flight_number, class).await
    }

    async fn ensure_guest(&self, guest: &GuestCustomer) -> AppResult<()> {
        self.inner.ensure_guest(guest).await
    }

    async fn place_order(&self, order: &NewOrder, tickets: &[NewTicket], atomicity: Atomicity) -> AppResult<i64> {
        self.gate.wait().await;
        self.inner.place_order(order, tickets, atomicity).await
    }

    async fn find_order(&self, order_id: i64) -> AppResult<Option<Order>> {
        self.inner.find_order(order_id).await
    }

    async fn order_tickets(&self, order_id: i64) -> AppResult<Vec<Ticket>> {
        self.inner.order_tickets(order_id).await
    }

    async fn orders_for_customer(&self, email: &str, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        self.inner.orders_for_customer(email, status).await
    }

    async fn active_orders_on_flight(&self, flight_number: &str) -> AppResult<Vec<i64>> {
        self.inner.active_orders_on_flight(flight_number).await
    }

    async fn apply_cancellation(&self, plan: &CancellationPlan, atomicity: Atomicity) -> AppResult<()> {
        self.inner.apply_cancellation(plan, atomicity).await
    }

    async fn order_status_counts(&self) -> AppResult<Vec<StatusCount>> {
        self.inner.order_status_counts().await
    }

    async fn flight_status_counts(&self) -> AppResult<Vec<StatusCount>> {
        self.inner.flight_status_counts().await
    }

    async fn active_revenue(&self) -> AppResult<Decimal> {
        self.inner.active_revenue().await
    }

    async fn cancelled_order_count(&self) -> AppResult<i64> {
        self.inner.cancelled_order_count().await
    }

    async fn revenue_by_class(&self) -> AppResult<Vec<ClassRevenue>> {
        self.inner.revenue_by_class().await
    }
}
