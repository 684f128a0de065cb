//! In-process store with the same contract as the MySQL one.
//!
//! Used by the test suites and for local runs without a database. Every
//! operation holds one lock for its whole duration; `Strict` writes go to a
//! draft copy of the state that only replaces the live state on success,
//! `BestEffort` writes land step by step.

use crate::config::Atomicity;
use crate::models::aircraft::Aircraft;
use crate::models::crew::{CrewMember, CrewRole, ScheduledLeg};
use crate::models::flight::{Flight, FlightPlan, FlightSearchQuery, FlightStatus, FlightSummary, Pricing, Route};
use crate::models::order::{CancellationPlan, GuestCustomer, NewOrder, Order, OrderStatus};
use crate::models::report::{ClassRevenue, StatusCount};
use crate::models::seat::{Layout, SeatClass, SeatCoordinate};
use crate::models::ticket::{NewTicket, Ticket};
use crate::store::BookingStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::{arrival_instant, departure_instant};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
struct State {
    routes: BTreeMap<i32, Route>,
    aircraft: BTreeMap<String, Aircraft>,
    layouts: HashMap<(String, SeatClass), Layout>,
    flights: BTreeMap<String, Flight>,
    pricing: BTreeMap<(String, SeatClass), Decimal>,
    crew: HashMap<CrewRole, BTreeMap<i32, CrewMember>>,
    assignments: HashSet<(CrewRole, String, i32)>,
    guests: BTreeMap<String, GuestCustomer>,
    orders: BTreeMap<i64, Order>,
    tickets: BTreeMap<i64, Ticket>,
    last_order_id: i64,
    last_ticket_id: i64,
}

enum FlightWriteError {
    // Nothing was written
    FlightRow(String),
    // The flight row exists, a later step failed
    Followup(String),
}

impl State {
    fn summary(&self, flight: &Flight) -> Option<FlightSummary> {
        let route = self.routes.get(&flight.route_id)?;
        Some(FlightSummary {
            flight_number: flight.flight_number.clone(),
            departure_date: flight.departure_date,
            departure_time: flight.departure_time,
            arrival: arrival_instant(flight.departure_date, flight.departure_time, route.duration_minutes),
            status: flight.status,
            source_airport: route.source_airport.clone(),
            destination_airport: route.destination_airport.clone(),
            duration_minutes: route.duration_minutes,
            tail_number: flight.tail_number.clone(),
        })
    }

    fn order_is_live(&self, order_id: i64) -> bool {
        self.orders
            .get(&order_id)
            .map_or(false, |order| !order.status.is_cancelled())
    }

    fn write_flight_plan(&mut self, plan: &FlightPlan) -> Result<(), FlightWriteError> {
        let flight = &plan.flight;
        if !self.routes.contains_key(&flight.route_id) {
            return Err(FlightWriteError::FlightRow(format!(
                "route {} does not exist",
                flight.route_id
            )));
        }
        if !self.aircraft.contains_key(&flight.tail_number) {
            return Err(FlightWriteError::FlightRow(format!(
                "aircraft {} does not exist",
                flight.tail_number
            )));
        }
        self.flights.insert(flight.flight_number.clone(), flight.clone());

        for &pilot_id in &plan.pilot_ids {
            self.assign(CrewRole::Pilot, &flight.flight_number, pilot_id)?;
        }
        for &attendant_id in &plan.attendant_ids {
            self.assign(CrewRole::Attendant, &flight.flight_number, attendant_id)?;
        }
        for pricing in &plan.pricing {
            self.pricing
                .insert((flight.flight_number.clone(), pricing.class), pricing.price);
        }

        Ok(())
    }

    fn assign(&mut self, role: CrewRole, flight_number: &str, employee_id: i32) -> Result<(), FlightWriteError> {
        let known = self
            .crew
            .get(&role)
            .map_or(false, |members| members.contains_key(&employee_id));
        if !known {
            return Err(FlightWriteError::Followup(format!(
                "{} {} assignment failed: unknown employee",
                role, employee_id
            )));
        }
        if !self.assignments.insert((role, flight_number.to_string(), employee_id)) {
            return Err(FlightWriteError::Followup(format!(
                "{} {} assignment failed: already assigned",
                role, employee_id
            )));
        }
        Ok(())
    }

    fn insert_order(&mut self, order: &NewOrder) -> i64 {
        self.last_order_id += 1;
        let order_id = self.last_order_id;
        self.orders.insert(
            order_id,
            Order {
                order_id,
                guest_email: order.guest_email.clone(),
                registered_email: order.registered_email.clone(),
                order_date: order.order_date,
                total_price: order.total_price,
                status: OrderStatus::Active,
            },
        );
        order_id
    }

    /// Returns false, writing nothing, if the seat key is already stored.
    fn insert_ticket(&mut self, order_id: i64, ticket: &NewTicket) -> bool {
        let taken = self.tickets.values().any(|t| {
            t.flight_number == ticket.flight_number && t.class == ticket.class && t.seat == ticket.seat
        });
        if taken {
            return false;
        }

        self.last_ticket_id += 1;
        self.tickets.insert(
            self.last_ticket_id,
            Ticket {
                ticket_id: self.last_ticket_id,
                order_id,
                flight_number: ticket.flight_number.clone(),
                passenger_name: ticket.passenger_name.clone(),
                class: ticket.class,
                seat: ticket.seat,
            },
        );
        true
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub async fn insert_route(&self, route: Route) {
        let mut state = self.state.lock().await;
        state.routes.insert(route.route_id, route);
    }

    pub async fn insert_crew_member(&self, role: CrewRole, member: CrewMember) {
        let mut state = self.state.lock().await;
        state
            .crew
            .entry(role)
            .or_default()
            .insert(member.employee_id, member);
    }

    pub async fn find_guest(&self, email: &str) -> Option<GuestCustomer> {
        self.state.lock().await.guests.get(email).cloned()
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn ticket_count(&self) -> usize {
        self.state.lock().await.tickets.len()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list_routes(&self) -> AppResult<Vec<Route>> {
        // BTreeMap keyed by route id
        Ok(self.state.lock().await.routes.values().cloned().collect())
    }

    async fn find_route(&self, route_id: i32) -> AppResult<Option<Route>> {
        Ok(self.state.lock().await.routes.get(&route_id).cloned())
    }

    async fn list_aircraft(&self) -> AppResult<Vec<Aircraft>> {
        Ok(self.state.lock().await.aircraft.values().cloned().collect())
    }

    async fn find_aircraft(&self, tail_number: &str) -> AppResult<Option<Aircraft>> {
        Ok(self.state.lock().await.aircraft.get(tail_number).cloned())
    }

    async fn aircraft_layout(&self, tail_number: &str, class: SeatClass) -> AppResult<Option<Layout>> {
        let state = self.state.lock().await;
        Ok(state.layouts.get(&(tail_number.to_string(), class)).copied())
    }

    async fn insert_aircraft(&self, aircraft: &Aircraft, layouts: &[(SeatClass, Layout)]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.aircraft.contains_key(&aircraft.tail_number) {
            return Err(AppError::DuplicateTailNumber(aircraft.tail_number.clone()));
        }

        state
            .aircraft
            .insert(aircraft.tail_number.clone(), aircraft.clone());
        for (class, layout) in layouts {
            state
                .layouts
                .insert((aircraft.tail_number.clone(), *class), *layout);
        }
        Ok(())
    }

    async fn find_flight(&self, flight_number: &str) -> AppResult<Option<Flight>> {
        Ok(self.state.lock().await.flights.get(flight_number).cloned())
    }

    async fn flight_summary(&self, flight_number: &str) -> AppResult<Option<FlightSummary>> {
        let state = self.state.lock().await;
        Ok(state
            .flights
            .get(flight_number)
            .and_then(|flight| state.summary(flight)))
    }

    async fn search_flights(
        &self,
        query: &FlightSearchQuery,
        status: Option<FlightStatus>,
    ) -> AppResult<Vec<FlightSummary>> {
        let state = self.state.lock().await;
        let mut flights: Vec<FlightSummary> = state
            .flights
            .values()
            .filter_map(|flight| state.summary(flight))
            .filter(|s| status.map_or(true, |status| s.status == status))
            .filter(|s| query.departure_date.map_or(true, |date| s.departure_date == date))
            .filter(|s| query.source.as_ref().map_or(true, |src| &s.source_airport == src))
            .filter(|s| {
                query
                    .destination
                    .as_ref()
                    .map_or(true, |dst| &s.destination_airport == dst)
            })
            .collect();

        flights.sort_by(|a, b| {
            (a.departure_date, a.departure_time, &a.flight_number).cmp(&(
                b.departure_date,
                b.departure_time,
                &b.flight_number,
            ))
        });
        Ok(flights)
    }

    async fn flight_pricing(&self, flight_number: &str) -> AppResult<Vec<Pricing>> {
        let state = self.state.lock().await;
        Ok(state
            .pricing
            .iter()
            .filter(|((number, _), _)| number == flight_number)
            .map(|((_, class), price)| Pricing {
                class: *class,
                price: *price,
            })
            .collect())
    }

    async fn update_flight_status(&self, flight_number: &str, status: FlightStatus) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.flights.get_mut(flight_number) {
            Some(flight) => {
                flight.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_flight(&self, plan: &FlightPlan, atomicity: Atomicity) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let flight_number = &plan.flight.flight_number;
        if state.flights.contains_key(flight_number) {
            return Err(AppError::DuplicateFlightNumber(flight_number.clone()));
        }

        let outcome = match atomicity {
            Atomicity::Strict => {
                let mut draft = state.clone();
                let outcome = draft.write_flight_plan(plan);
                if outcome.is_ok() {
                    *state = draft;
                }
                outcome
            }
            Atomicity::BestEffort => state.write_flight_plan(plan),
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(FlightWriteError::FlightRow(message)) => Err(AppError::StorageUnavailable(message)),
            Err(FlightWriteError::Followup(message)) => match atomicity {
                Atomicity::Strict => Err(AppError::StorageUnavailable(message)),
                Atomicity::BestEffort => Err(AppError::PartiallyApplied {
                    completed: format!("Flight {} created", flight_number),
                    failure: Box::new(AppError::StorageUnavailable(message)),
                }),
            },
        }
    }

    async fn list_crew(&self, role: CrewRole) -> AppResult<Vec<CrewMember>> {
        let state = self.state.lock().await;
        Ok(state
            .crew
            .get(&role)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_crew_member(&self, role: CrewRole, employee_id: i32) -> AppResult<Option<CrewMember>> {
        let state = self.state.lock().await;
        Ok(state
            .crew
            .get(&role)
            .and_then(|members| members.get(&employee_id))
            .cloned())
    }

    async fn crew_schedule(&self, role: CrewRole, employee_id: i32) -> AppResult<Vec<ScheduledLeg>> {
        let state = self.state.lock().await;
        let mut legs: Vec<ScheduledLeg> = state
            .assignments
            .iter()
            .filter(|(r, _, id)| *r == role && *id == employee_id)
            .filter_map(|(_, flight_number, _)| state.flights.get(flight_number))
            .filter(|flight| flight.status != FlightStatus::Canceled)
            .filter_map(|flight| {
                let route = state.routes.get(&flight.route_id)?;
                Some(ScheduledLeg {
                    flight_number: flight.flight_number.clone(),
                    departure: departure_instant(flight.departure_date, flight.departure_time),
                    arrival: arrival_instant(
                        flight.departure_date,
                        flight.departure_time,
                        route.duration_minutes,
                    ),
                    source_airport: route.source_airport.clone(),
                    destination_airport: route.destination_airport.clone(),
                })
            })
            .collect();

        legs.sort_by(|a, b| (a.departure, &a.flight_number).cmp(&(b.departure, &b.flight_number)));
        Ok(legs)
    }

    async fn taken_seats(&self, flight_number: &str, class: SeatClass) -> AppResult<Vec<SeatCoordinate>> {
        let state = self.state.lock().await;
        Ok(state
            .tickets
            .values()
            .filter(|t| t.flight_number == flight_number && t.class == class)
            .filter(|t| state.order_is_live(t.order_id))
            .map(|t| t.seat)
            .collect())
    }

    async fn ensure_guest(&self, guest: &GuestCustomer) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .guests
            .entry(guest.email.clone())
            .or_insert_with(|| guest.clone());
        Ok(())
    }

    async fn place_order(&self, order: &NewOrder, tickets: &[NewTicket], atomicity: Atomicity) -> AppResult<i64> {
        if order.guest_email.is_some() == order.registered_email.is_some() {
            return Err(AppError::StorageUnavailable(
                "An order needs exactly one of guest or registered email".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        match atomicity {
            Atomicity::Strict => {
                let mut draft = state.clone();
                let order_id = draft.insert_order(order);
                for ticket in tickets {
                    if !draft.insert_ticket(order_id, ticket) {
                        return Err(AppError::SeatAlreadyTaken {
                            seat: ticket.seat,
                            order_id: None,
                            tickets_created: 0,
                        });
                    }
                }
                *state = draft;
                Ok(order_id)
            }
            Atomicity::BestEffort => {
                let order_id = state.insert_order(order);
                for (created, ticket) in tickets.iter().enumerate() {
                    if !state.insert_ticket(order_id, ticket) {
                        return Err(AppError::SeatAlreadyTaken {
                            seat: ticket.seat,
                            order_id: Some(order_id),
                            tickets_created: created,
                        });
                    }
                }
                Ok(order_id)
            }
        }
    }

    async fn find_order(&self, order_id: i64) -> AppResult<Option<Order>> {
        Ok(self.state.lock().await.orders.get(&order_id).cloned())
    }

    async fn order_tickets(&self, order_id: i64) -> AppResult<Vec<Ticket>> {
        let state = self.state.lock().await;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|t| t.order_id == order_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| (&a.flight_number, a.class, a.seat).cmp(&(&b.flight_number, b.class, b.seat)));
        Ok(tickets)
    }

    async fn orders_for_customer(&self, email: &str, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.registered_email.as_deref() == Some(email))
            .filter(|o| status.map_or(true, |status| o.status == status))
            .cloned()
            .collect();
        orders.sort_by(|a, b| (b.order_date, b.order_id).cmp(&(a.order_date, a.order_id)));
        Ok(orders)
    }

    async fn active_orders_on_flight(&self, flight_number: &str) -> AppResult<Vec<i64>> {
        let state = self.state.lock().await;
        let mut order_ids: Vec<i64> = state
            .tickets
            .values()
            .filter(|t| t.flight_number == flight_number)
            .map(|t| t.order_id)
            .filter(|&order_id| state.order_is_live(order_id))
            .collect();
        order_ids.sort_unstable();
        order_ids.dedup();
        Ok(order_ids)
    }

    async fn apply_cancellation(&self, plan: &CancellationPlan, _atomicity: Atomicity) -> AppResult<()> {
        // Every step here is infallible, so both modes behave the same
        let mut state = self.state.lock().await;
        if let Some(flight_number) = &plan.cancel_flight {
            if let Some(flight) = state.flights.get_mut(flight_number) {
                flight.status = FlightStatus::Canceled;
            }
        }

        for refund in &plan.orders {
            if let Some(order) = state.orders.get_mut(&refund.order_id) {
                order.status = plan.status;
                order.total_price = refund.total_price;
            }
            state.tickets.retain(|_, t| t.order_id != refund.order_id);
        }
        Ok(())
    }

    async fn order_status_counts(&self) -> AppResult<Vec<StatusCount>> {
        let state = self.state.lock().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for order in state.orders.values() {
            *counts.entry(order.status.to_string()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn flight_status_counts(&self) -> AppResult<Vec<StatusCount>> {
        let state = self.state.lock().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for flight in state.flights.values() {
            *counts.entry(flight.status.to_string()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn active_revenue(&self) -> AppResult<Decimal> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .filter(|o| !o.status.is_cancelled())
            .map(|o| o.total_price)
            .sum())
    }

    async fn cancelled_order_count(&self) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state.orders.values().filter(|o| o.status.is_cancelled()).count() as i64)
    }

    async fn revenue_by_class(&self) -> AppResult<Vec<ClassRevenue>> {
        let state = self.state.lock().await;

        // One entry per (order, class) pair, like the SQL grouping
        let pairs: HashSet<(i64, SeatClass)> = state
            .tickets
            .values()
            .filter(|t| state.order_is_live(t.order_id))
            .map(|t| (t.order_id, t.class))
            .collect();

        let mut revenue: BTreeMap<SeatClass, Decimal> = BTreeMap::new();
        for (order_id, class) in pairs {
            if let Some(order) = state.orders.get(&order_id) {
                *revenue.entry(class).or_default() += order.total_price;
            }
        }

        Ok(revenue
            .into_iter()
            .map(|(class, revenue)| ClassRevenue { class, revenue })
            .collect())
    }
}
