use crate::config::BookingRules;
use crate::models::flight::FlightStatus;
use crate::models::order::{
    normalize_email, BookingConfirmation, BookingRequest, CancelMode, CancellationOutcome, CancellationPlan,
    NewOrder, Order, OrderRefund, OrderStatus, OrderWithTickets, Payer,
};
use crate::models::ticket::NewTicket;
use crate::services::flight_service::FlightService;
use crate::services::seat_service::{check_selection, clamp_quantity, SeatService};
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::{departure_instant, SharedClock};
use chrono::{Duration, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;
use tracing::{info, warn};
use validator::Validate;

/// Share of the original total kept when a customer cancels.
pub fn cancellation_fee(total: Decimal) -> Decimal {
    (total * Decimal::new(5, 2)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone)]
pub struct OrderService {
    store: SharedStore,
    rules: BookingRules,
    clock: SharedClock,
    seat_service: SeatService,
    flight_service: FlightService,
}

impl OrderService {
    pub fn new(store: SharedStore, rules: BookingRules, clock: SharedClock) -> Self {
        OrderService {
            seat_service: SeatService::new(store.clone()),
            flight_service: FlightService::new(store.clone(), rules.clone(), clock.clone()),
            store,
            rules,
            clock,
        }
    }

    /// Books seats on one flight and class for a single payer.
    ///
    /// The selection is checked against the seats free right now, then the
    /// order and its tickets are written. The store's seat key is the final
    /// word: a seat claimed in between fails with `SeatAlreadyTaken`. Flight
    /// fullness is refreshed whether or not the write succeeded.
    pub async fn book_seats(&self, request: BookingRequest) -> AppResult<BookingConfirmation> {
        request.validate()?;

        let flight_number = request.flight_number.trim().to_string();
        let flight = self
            .store
            .find_flight(&flight_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flight {} not found", flight_number)))?;
        if matches!(flight.status, FlightStatus::Canceled | FlightStatus::Arrived) {
            return Err(AppError::ValidationFailed(format!(
                "Flight {} is {} and cannot be booked",
                flight_number, flight.status
            )));
        }

        let price = self
            .store
            .flight_pricing(&flight_number)
            .await?
            .into_iter()
            .find(|p| p.class == request.class)
            .map(|p| p.price)
            .ok_or_else(|| {
                AppError::ValidationFailed(format!(
                    "{} class is not offered on flight {}",
                    request.class, flight_number
                ))
            })?;

        let available = self
            .seat_service
            .available_seats(&flight_number, request.class)
            .await?;
        let quantity = clamp_quantity(request.quantity, available.len());
        let seats = check_selection(&available, &request.seats, quantity as usize)?;

        let payer_email = request.payer.email();
        if payer_email.is_empty() {
            return Err(AppError::ValidationFailed("Payer email is required".into()));
        }
        if let Some(guest) = request.payer.guest_record() {
            self.store.ensure_guest(&guest).await?;
        }

        let order = NewOrder {
            guest_email: matches!(request.payer, Payer::Guest { .. }).then(|| payer_email.clone()),
            registered_email: matches!(request.payer, Payer::Registered { .. }).then(|| payer_email.clone()),
            order_date: self.clock.now(),
            total_price: price * Decimal::from(quantity),
        };

        let passenger_name = request
            .passenger_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| request.payer.display_name());

        let tickets: Vec<NewTicket> = seats
            .iter()
            .map(|&seat| NewTicket {
                flight_number: flight_number.clone(),
                passenger_name: passenger_name.clone(),
                class: request.class,
                seat,
            })
            .collect();

        let placed = self
            .store
            .place_order(&order, &tickets, self.rules.atomicity)
            .await;

        let refreshed = self.flight_service.refresh_flight_fullness(&flight_number).await;

        let order_id = match placed {
            Ok(order_id) => order_id,
            Err(err) => {
                warn!(flight = %flight_number, error = %err, "Booking failed");
                return Err(err);
            }
        };
        let flight_status = refreshed?;

        info!(
            order_id,
            flight = %flight_number,
            class = %request.class,
            seats = seats.len(),
            status = %flight_status,
            "Order placed"
        );

        Ok(BookingConfirmation {
            order_id,
            flight_number,
            class: request.class,
            total_price: order.total_price,
            seats,
            flight_status,
        })
    }

    /// Cancels one order.
    ///
    /// Customers must give the order's email and pay the cancellation fee;
    /// admins refund everything. Both are refused once the earliest flight
    /// in the order departs within the mode's lead time.
    pub async fn cancel_order(
        &self,
        order_id: i64,
        requester_email: Option<&str>,
        mode: CancelMode,
    ) -> AppResult<CancellationOutcome> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

        if mode == CancelMode::Customer && !requester_email.map_or(false, |email| order.belongs_to(email)) {
            return Err(AppError::NotFound(format!("Order {} not found", order_id)));
        }
        if order.status.is_cancelled() {
            return Err(AppError::AlreadyCancelled(order_id));
        }

        let tickets = self.store.order_tickets(order_id).await?;
        if tickets.is_empty() {
            return Err(AppError::ValidationFailed(format!(
                "No tickets found for order {}",
                order_id
            )));
        }

        let flights: BTreeSet<String> = tickets.iter().map(|t| t.flight_number.clone()).collect();
        let mut earliest: Option<NaiveDateTime> = None;
        for flight_number in &flights {
            if let Some(flight) = self.store.find_flight(flight_number).await? {
                let departure = departure_instant(flight.departure_date, flight.departure_time);
                earliest = Some(earliest.map_or(departure, |e| e.min(departure)));
            }
        }

        let lead_hours = match mode {
            CancelMode::Customer => self.rules.customer_cancel_lead_hours,
            CancelMode::Admin => self.rules.admin_cancel_lead_hours,
        };
        if let Some(departure) = earliest {
            if departure - self.clock.now() < Duration::hours(lead_hours) {
                return Err(AppError::CancellationWindowClosed { lead_hours });
            }
        }

        let (status, total_price) = match mode {
            CancelMode::Customer => (OrderStatus::CustCancelled, cancellation_fee(order.total_price)),
            CancelMode::Admin => (OrderStatus::SysCancelled, Decimal::ZERO),
        };
        let plan = CancellationPlan {
            cancel_flight: None,
            status,
            orders: vec![OrderRefund { order_id, total_price }],
        };
        self.store.apply_cancellation(&plan, self.rules.atomicity).await?;

        for flight_number in &flights {
            self.flight_service.refresh_flight_fullness(flight_number).await?;
        }

        info!(order_id, %mode, %status, %total_price, released = tickets.len(), "Order cancelled");

        Ok(CancellationOutcome {
            order_id,
            status,
            total_price,
            released_seats: tickets.len(),
            refreshed_flights: flights.into_iter().collect(),
        })
    }

    pub async fn cancel_with_fee(&self, order_id: i64, email: &str) -> AppResult<CancellationOutcome> {
        self.cancel_order(order_id, Some(email), CancelMode::Customer).await
    }

    pub async fn admin_cancel_order(&self, order_id: i64) -> AppResult<CancellationOutcome> {
        self.cancel_order(order_id, None, CancelMode::Admin).await
    }

    /// An order with its tickets, only if `email` paid for it.
    pub async fn find_order(&self, order_id: i64, email: &str) -> AppResult<OrderWithTickets> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .filter(|order| order.belongs_to(email))
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

        let tickets = self.store.order_tickets(order_id).await?;
        Ok(OrderWithTickets { order, tickets })
    }

    pub async fn order_history(&self, email: &str, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        self.store
            .orders_for_customer(&normalize_email(email), status)
            .await
    }
}
