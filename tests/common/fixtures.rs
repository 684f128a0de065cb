#![allow(dead_code)]

use airline_booking_engine::config::{Atomicity, BookingRules};
use airline_booking_engine::models::aircraft::{Aircraft, AircraftSize, Manufacturer};
use airline_booking_engine::models::crew::{CrewMember, CrewRole};
use airline_booking_engine::models::flight::{Flight, FlightPlan, FlightStatus, Pricing, Route};
use airline_booking_engine::models::order::{BookingConfirmation, BookingRequest, Payer};
use airline_booking_engine::models::seat::{Layout, SeatClass};
use airline_booking_engine::services::crew_service::CrewService;
use airline_booking_engine::services::flight_service::FlightService;
use airline_booking_engine::services::order_service::OrderService;
use airline_booking_engine::services::report_service::ReportService;
use airline_booking_engine::services::seat_service::SeatService;
use airline_booking_engine::store::{BookingStore, MemoryStore, SharedStore};
use airline_booking_engine::utils::error::AppResult;
use airline_booking_engine::utils::time::{FixedClock, SharedClock};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const TLV_JFK: i32 = 1;
pub const JFK_TLV: i32 = 2;
pub const TLV_LCA: i32 = 3;
pub const LCA_TLV: i32 = 4;
pub const JFK_LAX: i32 = 5;
pub const LAX_JFK: i32 = 6;

// 2x2 economy, no business
pub const SMALL_JET: &str = "4X-SML";
// 3x3 economy, 1x2 business
pub const LARGE_JET: &str = "4X-LRG";
// a single economy seat
pub const TINY_JET: &str = "4X-TNY";

pub const LONG_HAUL_PILOTS: [i32; 3] = [1, 2, 3];
pub const SHORT_HAUL_PILOTS: [i32; 3] = [4, 5, 6];
pub const LONG_HAUL_ATTENDANTS: [i32; 6] = [101, 102, 103, 104, 105, 106];
pub const SHORT_HAUL_ATTENDANTS: [i32; 6] = [107, 108, 109, 110, 111, 112];

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// What the fixed clock reads in every test.
pub fn now() -> NaiveDateTime {
    at(2030, 1, 1, 8, 0)
}

pub fn money(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub fn seats(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

pub fn guest(email: &str) -> Payer {
    Payer::Guest {
        email: email.to_string(),
        first_name: Some("Dana".to_string()),
        last_name: Some("Levi".to_string()),
    }
}

pub fn registered(email: &str) -> Payer {
    Payer::Registered {
        email: email.to_string(),
        name: Some("Noa Cohen".to_string()),
    }
}

pub fn booking(flight_number: &str, class: SeatClass, tokens: &[&str], payer: Payer) -> BookingRequest {
    BookingRequest {
        flight_number: flight_number.to_string(),
        class,
        quantity: tokens.len().max(1) as u32,
        seats: seats(tokens),
        passenger_name: None,
        payer,
    }
}

fn route(route_id: i32, source: &str, destination: &str, duration_minutes: i64) -> Route {
    Route {
        route_id,
        source_airport: source.to_string(),
        destination_airport: destination.to_string(),
        duration_minutes,
    }
}

fn member(employee_id: i32, long_haul_qualified: bool) -> CrewMember {
    CrewMember {
        employee_id,
        first_name: format!("First{}", employee_id),
        last_name: format!("Last{}", employee_id),
        long_haul_qualified,
    }
}

/// Services wired to a seeded in-memory store and a fixed clock.
pub struct World {
    pub store: MemoryStore,
    pub shared: SharedStore,
    pub rules: BookingRules,
    pub clock: SharedClock,
    pub seat_service: SeatService,
    pub crew_service: CrewService,
    pub flight_service: FlightService,
    pub order_service: OrderService,
    pub report_service: ReportService,
}

impl World {
    pub async fn new() -> World {
        World::with_rules(BookingRules::default()).await
    }

    pub async fn with_atomicity(atomicity: Atomicity) -> World {
        World::with_rules(BookingRules {
            atomicity,
            ..BookingRules::default()
        })
        .await
    }

    pub async fn with_rules(rules: BookingRules) -> World {
        let store = MemoryStore::new();
        seed(&store).await;

        let shared: SharedStore = Arc::new(store.clone());
        let clock: SharedClock = Arc::new(FixedClock(now()));

        World {
            seat_service: SeatService::new(shared.clone()),
            crew_service: CrewService::new(shared.clone(), rules.clone()),
            flight_service: FlightService::new(shared.clone(), rules.clone(), clock.clone()),
            order_service: OrderService::new(shared.clone(), rules.clone(), clock.clone()),
            report_service: ReportService::new(shared.clone()),
            store,
            shared,
            rules,
            clock,
        }
    }

    /// Writes a flight straight to the store, skipping crew validation.
    pub async fn add_flight(
        &self,
        flight_number: &str,
        route_id: i32,
        tail_number: &str,
        departure: NaiveDateTime,
        pilots: &[i32],
        attendants: &[i32],
    ) {
        let mut pricing = vec![Pricing {
            class: SeatClass::Economy,
            price: money("100.00"),
        }];
        if tail_number == LARGE_JET {
            pricing.push(Pricing {
                class: SeatClass::Business,
                price: money("450.00"),
            });
        }

        let plan = FlightPlan {
            flight: Flight {
                flight_number: flight_number.to_string(),
                route_id,
                tail_number: tail_number.to_string(),
                departure_date: departure.date(),
                departure_time: departure.time(),
                status: FlightStatus::Active,
            },
            pilot_ids: pilots.to_vec(),
            attendant_ids: attendants.to_vec(),
            pricing,
        };
        self.store
            .insert_flight(&plan, Atomicity::Strict)
            .await
            .unwrap();
    }

    pub async fn book(&self, request: BookingRequest) -> AppResult<BookingConfirmation> {
        self.order_service.book_seats(request).await
    }

    pub async fn flight_status(&self, flight_number: &str) -> FlightStatus {
        self.store
            .find_flight(flight_number)
            .await
            .unwrap()
            .unwrap()
            .status
    }
}

async fn seed(store: &MemoryStore) {
    for r in [
        route(TLV_JFK, "TLV", "JFK", 720),
        route(JFK_TLV, "JFK", "TLV", 660),
        route(TLV_LCA, "TLV", "LCA", 60),
        route(LCA_TLV, "LCA", "TLV", 60),
        route(JFK_LAX, "JFK", "LAX", 330),
        route(LAX_JFK, "LAX", "JFK", 330),
    ] {
        store.insert_route(r).await;
    }

    let purchased = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
    let fleet = [
        (SMALL_JET, Manufacturer::Boeing, AircraftSize::Small, Layout::new(2, 2), None),
        (
            LARGE_JET,
            Manufacturer::Airbus,
            AircraftSize::Large,
            Layout::new(3, 3),
            Some(Layout::new(1, 2)),
        ),
        (TINY_JET, Manufacturer::Dassault, AircraftSize::Small, Layout::new(1, 1), None),
    ];
    for (tail, manufacturer, size, economy, business) in fleet {
        let aircraft = Aircraft {
            tail_number: tail.to_string(),
            manufacturer,
            size,
            purchase_date: purchased,
        };
        let mut layouts = vec![(SeatClass::Economy, economy)];
        if let Some(business) = business {
            layouts.push((SeatClass::Business, business));
        }
        store.insert_aircraft(&aircraft, &layouts).await.unwrap();
    }

    for id in LONG_HAUL_PILOTS {
        store.insert_crew_member(CrewRole::Pilot, member(id, true)).await;
    }
    for id in SHORT_HAUL_PILOTS {
        store.insert_crew_member(CrewRole::Pilot, member(id, false)).await;
    }
    for id in LONG_HAUL_ATTENDANTS {
        store.insert_crew_member(CrewRole::Attendant, member(id, true)).await;
    }
    for id in SHORT_HAUL_ATTENDANTS {
        store.insert_crew_member(CrewRole::Attendant, member(id, false)).await;
    }
}
