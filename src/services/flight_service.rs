use crate::config::BookingRules;
use crate::models::aircraft::{Aircraft, AircraftSize, CreateAircraftRequest};
use crate::models::flight::{
    AirportsResponse, CreateFlightRequest, CreateFlightResponse, Flight, FlightCancellation, FlightDetail,
    FlightPlan, FlightSearchQuery, FlightSearchResponse, FlightStatus, FlightSummary, Pricing, Route,
};
use crate::models::order::{CancellationPlan, OrderRefund, OrderStatus};
use crate::models::seat::SeatClass;
use crate::services::crew_service::CrewService;
use crate::services::seat_service::SeatService;
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::{departure_instant, parse_time_of_day, SharedClock};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct FlightService {
    store: SharedStore,
    rules: BookingRules,
    clock: SharedClock,
    seat_service: SeatService,
    crew_service: CrewService,
}

// Trims an airport filter, treating blank as "any"
fn airport_filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

impl FlightService {
    pub fn new(store: SharedStore, rules: BookingRules, clock: SharedClock) -> Self {
        FlightService {
            seat_service: SeatService::new(store.clone()),
            crew_service: CrewService::new(store.clone(), rules.clone()),
            store,
            rules,
            clock,
        }
    }

    async fn flight(&self, flight_number: &str) -> AppResult<Flight> {
        self.store
            .find_flight(flight_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flight {} not found", flight_number)))
    }

    // Search bookable flights, earliest first
    pub async fn search_flights(&self, query: FlightSearchQuery) -> AppResult<FlightSearchResponse> {
        let query = FlightSearchQuery {
            departure_date: query.departure_date,
            source: airport_filter(query.source),
            destination: airport_filter(query.destination),
        };

        let flights = self
            .store
            .search_flights(&query, Some(FlightStatus::Active))
            .await?;

        Ok(FlightSearchResponse { flights })
    }

    // Admin listing, newest departure first
    pub async fn list_flights(&self, status: Option<FlightStatus>) -> AppResult<Vec<FlightSummary>> {
        let mut flights = self
            .store
            .search_flights(&FlightSearchQuery::default(), status)
            .await?;
        flights.reverse();
        Ok(flights)
    }

    pub async fn list_airports(&self) -> AppResult<AirportsResponse> {
        let routes = self.store.list_routes().await?;

        let sources: BTreeSet<String> = routes.iter().map(|r| r.source_airport.clone()).collect();
        let destinations: BTreeSet<String> = routes
            .iter()
            .map(|r| r.destination_airport.clone())
            .collect();

        Ok(AirportsResponse {
            sources: sources.into_iter().collect(),
            destinations: destinations.into_iter().collect(),
        })
    }

    pub async fn list_routes(&self) -> AppResult<Vec<Route>> {
        self.store.list_routes().await
    }

    pub async fn list_aircraft(&self) -> AppResult<Vec<Aircraft>> {
        self.store.list_aircraft().await
    }

    pub async fn get_pricing(&self, flight_number: &str) -> AppResult<Vec<Pricing>> {
        self.flight(flight_number).await?;
        self.store.flight_pricing(flight_number).await
    }

    pub async fn get_flight_detail(&self, flight_number: &str) -> AppResult<FlightDetail> {
        let summary = self
            .store
            .flight_summary(flight_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flight {} not found", flight_number)))?;

        let economy = self
            .seat_service
            .layout_of(flight_number, SeatClass::Economy)
            .await?;
        let business = self
            .seat_service
            .layout_of(flight_number, SeatClass::Business)
            .await?;
        let pricing = self.store.flight_pricing(flight_number).await?;

        Ok(FlightDetail {
            summary,
            economy_seats: economy.capacity(),
            business_seats: business.capacity(),
            pricing,
        })
    }

    pub async fn create_aircraft(&self, request: CreateAircraftRequest) -> AppResult<Aircraft> {
        request.validate()?;

        let mut layouts = vec![(SeatClass::Economy, request.economy_layout())];
        if let Some(business) = request.business_layout().map_err(AppError::ValidationFailed)? {
            layouts.push((SeatClass::Business, business));
        }

        let aircraft = Aircraft {
            tail_number: request.tail_number.trim().to_string(),
            manufacturer: request.manufacturer,
            size: request.size,
            purchase_date: request.purchase_date,
        };
        self.store.insert_aircraft(&aircraft, &layouts).await?;

        info!(tail = %aircraft.tail_number, size = %aircraft.size, "Aircraft registered");
        Ok(aircraft)
    }

    /// Validates and writes a new flight with its crew and pricing.
    pub async fn create_flight(&self, request: CreateFlightRequest) -> AppResult<CreateFlightResponse> {
        request.validate()?;

        let flight_number = request.flight_number.trim().to_string();
        let departure_time = parse_time_of_day(&request.departure_time)?;
        if departure_instant(request.departure_date, departure_time) <= self.clock.now() {
            return Err(AppError::ValidationFailed(
                "Departure must be in the future".into(),
            ));
        }

        let route = self
            .store
            .find_route(request.route_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Route {} not found", request.route_id)))?;
        let aircraft = self
            .store
            .find_aircraft(&request.tail_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Aircraft {} not found", request.tail_number)))?;

        if self.rules.is_long_haul(route.duration_minutes) && aircraft.size != AircraftSize::Large {
            return Err(AppError::AircraftNotSuitable {
                tail_number: aircraft.tail_number,
                route_id: route.route_id,
            });
        }

        if request.economy_price < Decimal::ZERO {
            return Err(AppError::ValidationFailed(
                "Economy price must be non-negative".into(),
            ));
        }
        if request.business_price.map_or(false, |p| p < Decimal::ZERO) {
            return Err(AppError::ValidationFailed(
                "Business price must be non-negative".into(),
            ));
        }

        let prospective = self
            .crew_service
            .prospective_flight(route.route_id, request.departure_date, departure_time)
            .await?;
        self.crew_service
            .validate_roster(aircraft.size, &prospective, &request.pilot_ids, &request.attendant_ids)
            .await?;

        let mut pricing = vec![Pricing {
            class: SeatClass::Economy,
            price: request.economy_price,
        }];
        if let Some(price) = request.business_price {
            let has_business = aircraft.size == AircraftSize::Large
                && self
                    .store
                    .aircraft_layout(&aircraft.tail_number, SeatClass::Business)
                    .await?
                    .map_or(false, |layout| layout.is_offered());
            if has_business {
                pricing.push(Pricing {
                    class: SeatClass::Business,
                    price,
                });
            } else {
                warn!(flight = %flight_number, "Business price ignored, aircraft has no business cabin");
            }
        }

        let plan = FlightPlan {
            flight: Flight {
                flight_number: flight_number.clone(),
                route_id: route.route_id,
                tail_number: aircraft.tail_number,
                departure_date: request.departure_date,
                departure_time,
                status: FlightStatus::Active,
            },
            pilot_ids: request.pilot_ids,
            attendant_ids: request.attendant_ids,
            pricing,
        };
        self.store.insert_flight(&plan, self.rules.atomicity).await?;

        info!(
            flight = %flight_number,
            route = route.route_id,
            pilots = plan.pilot_ids.len(),
            attendants = plan.attendant_ids.len(),
            "Flight created with crew"
        );

        Ok(CreateFlightResponse {
            flight_number,
            status: FlightStatus::Active,
            pilots_assigned: plan.pilot_ids.len(),
            attendants_assigned: plan.attendant_ids.len(),
        })
    }

    /// Admin override for any transition except into or out of `Canceled`.
    pub async fn set_flight_status(&self, flight_number: &str, status: FlightStatus) -> AppResult<Flight> {
        if status == FlightStatus::Canceled {
            return Err(AppError::ValidationFailed(
                "Use flight cancellation to cancel a flight".into(),
            ));
        }

        let mut flight = self.flight(flight_number).await?;
        if flight.status == FlightStatus::Canceled {
            return Err(AppError::ValidationFailed(format!(
                "Flight {} is canceled",
                flight_number
            )));
        }

        self.store.update_flight_status(flight_number, status).await?;
        info!(flight = %flight_number, from = %flight.status, to = %status, "Flight status set");

        flight.status = status;
        Ok(flight)
    }

    /// Cancels the flight and every live order holding a ticket on it.
    ///
    /// Orders are cancelled whole: their tickets on other flights are
    /// released too, and those other flights are refreshed afterwards.
    pub async fn cancel_flight(&self, flight_number: &str) -> AppResult<FlightCancellation> {
        self.flight(flight_number).await?;

        let order_ids = self.store.active_orders_on_flight(flight_number).await?;

        let mut other_flights = BTreeSet::new();
        for &order_id in &order_ids {
            for ticket in self.store.order_tickets(order_id).await? {
                if ticket.flight_number != flight_number {
                    other_flights.insert(ticket.flight_number);
                }
            }
        }

        let plan = CancellationPlan {
            cancel_flight: Some(flight_number.to_string()),
            status: OrderStatus::SysCancelled,
            orders: order_ids
                .iter()
                .map(|&order_id| OrderRefund {
                    order_id,
                    total_price: Decimal::ZERO,
                })
                .collect(),
        };
        self.store.apply_cancellation(&plan, self.rules.atomicity).await?;

        for other in &other_flights {
            self.refresh_flight_fullness(other).await?;
        }

        info!(
            flight = %flight_number,
            orders = order_ids.len(),
            other_flights = other_flights.len(),
            "Flight canceled"
        );

        Ok(FlightCancellation {
            flight_number: flight_number.to_string(),
            cancelled_orders: order_ids,
            refreshed_flights: other_flights.into_iter().collect(),
        })
    }

    /// Recomputes Active/Full from seat availability.
    ///
    /// A flight is Full when no priced class has a free seat. Canceled and
    /// Arrived flights are left untouched.
    pub async fn refresh_flight_fullness(&self, flight_number: &str) -> AppResult<FlightStatus> {
        let flight = self.flight(flight_number).await?;
        if !flight.status.tracks_occupancy() {
            return Ok(flight.status);
        }

        let mut has_free_seat = false;
        for pricing in self.store.flight_pricing(flight_number).await? {
            if !self
                .seat_service
                .available_seats(flight_number, pricing.class)
                .await?
                .is_empty()
            {
                has_free_seat = true;
                break;
            }
        }

        let status = if has_free_seat {
            FlightStatus::Active
        } else {
            FlightStatus::Full
        };
        if status != flight.status {
            self.store.update_flight_status(flight_number, status).await?;
            info!(flight = %flight_number, from = %flight.status, to = %status, "Flight fullness changed");
        }

        Ok(status)
    }
}
