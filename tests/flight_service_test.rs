use airline_booking_engine::config::Atomicity;
use airline_booking_engine::models::aircraft::{AircraftSize, CreateAircraftRequest, Manufacturer};
use airline_booking_engine::models::crew::CrewRole;
use airline_booking_engine::models::flight::{
    CreateFlightRequest, Flight, FlightPlan, FlightSearchQuery, FlightStatus, FlightSummary, Pricing,
};
use airline_booking_engine::models::order::{NewOrder, OrderStatus};
use airline_booking_engine::models::seat::{Layout, SeatClass, SeatCoordinate};
use airline_booking_engine::models::ticket::NewTicket;
use airline_booking_engine::store::BookingStore;
use airline_booking_engine::utils::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use test_context::{test_context, AsyncTestContext};

mod common {
    pub mod fixtures;
}
use common::fixtures::*;

struct FlightServiceContext {
    world: World,
}

#[async_trait]
impl AsyncTestContext for FlightServiceContext {
    async fn setup() -> Self {
        FlightServiceContext {
            world: World::new().await,
        }
    }
}

fn flight_request(
    flight_number: &str,
    route_id: i32,
    tail_number: &str,
    departure_date: NaiveDate,
    departure_time: &str,
    pilots: &[i32],
    attendants: &[i32],
) -> CreateFlightRequest {
    CreateFlightRequest {
        flight_number: flight_number.to_string(),
        route_id,
        tail_number: tail_number.to_string(),
        departure_date,
        departure_time: departure_time.to_string(),
        pilot_ids: pilots.to_vec(),
        attendant_ids: attendants.to_vec(),
        economy_price: money("120.00"),
        business_price: Some(money("480.00")),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn aircraft_request(tail_number: &str, business_rows: u32, business_columns: u32) -> CreateAircraftRequest {
    CreateAircraftRequest {
        tail_number: tail_number.to_string(),
        manufacturer: Manufacturer::Airbus,
        size: AircraftSize::Large,
        purchase_date: date(2024, 3, 1),
        economy_rows: 30,
        economy_columns: 6,
        business_rows,
        business_columns,
    }
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_create_flight(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let flights = &ctx.world.flight_service;

    let created = flights
        .create_flight(flight_request(
            "LY100",
            TLV_LCA,
            SMALL_JET,
            date(2030, 2, 1),
            "10:00",
            &[4, 5],
            &[107, 108, 109],
        ))
        .await?;
    assert_eq!(created.flight_number, "LY100");
    assert_eq!(created.status, FlightStatus::Active);
    assert_eq!(created.pilots_assigned, 2);
    assert_eq!(created.attendants_assigned, 3);

    // The small jet has no business cabin, so its price is dropped
    let pricing = flights.get_pricing("LY100").await?;
    assert_eq!(
        pricing,
        vec![Pricing {
            class: SeatClass::Economy,
            price: money("120.00"),
        }]
    );

    let detail = flights.get_flight_detail("LY100").await?;
    assert_eq!(detail.summary.source_airport, "TLV");
    assert_eq!(detail.summary.destination_airport, "LCA");
    assert_eq!(detail.summary.arrival, at(2030, 2, 1, 11, 0));
    assert_eq!(detail.economy_seats, 4);
    assert_eq!(detail.business_seats, 0);

    // Crew is now scheduled on the new flight
    let legs = ctx
        .world
        .shared
        .crew_schedule(CrewRole::Pilot, 4)
        .await?;
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].flight_number, "LY100");
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_create_long_haul_flight_keeps_business_price(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let flights = &ctx.world.flight_service;

    flights
        .create_flight(flight_request(
            "LY001",
            TLV_JFK,
            LARGE_JET,
            date(2030, 2, 1),
            "23:30",
            &LONG_HAUL_PILOTS,
            &LONG_HAUL_ATTENDANTS,
        ))
        .await?;

    let pricing = flights.get_pricing("LY001").await?;
    let classes: Vec<SeatClass> = pricing.iter().map(|p| p.class).collect();
    assert_eq!(classes, vec![SeatClass::Economy, SeatClass::Business]);
    assert_eq!(pricing[1].price, money("480.00"));

    let detail = flights.get_flight_detail("LY001").await?;
    assert_eq!(detail.summary.arrival, at(2030, 2, 2, 11, 30));
    assert_eq!(detail.business_seats, 2);
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_create_flight_validation(ctx: &FlightServiceContext) {
    let flights = &ctx.world.flight_service;

    let err = flights
        .create_flight(flight_request("LY100", TLV_LCA, SMALL_JET, date(2029, 12, 31), "10:00", &[4, 5], &[107, 108, 109]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    // Departing exactly now is not in the future
    let err = flights
        .create_flight(flight_request("LY100", TLV_LCA, SMALL_JET, date(2030, 1, 1), "08:00", &[4, 5], &[107, 108, 109]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let err = flights
        .create_flight(flight_request("LY100", TLV_LCA, SMALL_JET, date(2030, 2, 1), "25:00", &[4, 5], &[107, 108, 109]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let err = flights
        .create_flight(flight_request("", TLV_LCA, SMALL_JET, date(2030, 2, 1), "10:00", &[4, 5], &[107, 108, 109]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let err = flights
        .create_flight(flight_request("LY100", 999, SMALL_JET, date(2030, 2, 1), "10:00", &[4, 5], &[107, 108, 109]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = flights
        .create_flight(flight_request("LY100", TLV_LCA, "4X-NOPE", date(2030, 2, 1), "10:00", &[4, 5], &[107, 108, 109]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = flights
        .create_flight(flight_request("LY001", TLV_JFK, SMALL_JET, date(2030, 2, 1), "10:00", &[1, 2], &[101, 102, 103]))
        .await
        .unwrap_err();
    match err {
        AppError::AircraftNotSuitable { tail_number, route_id } => {
            assert_eq!(tail_number, SMALL_JET);
            assert_eq!(route_id, TLV_JFK);
        }
        other => panic!("expected AircraftNotSuitable, got {:?}", other),
    }

    // Roster problems surface before anything is written
    let err = flights
        .create_flight(flight_request("LY100", TLV_LCA, SMALL_JET, date(2030, 2, 1), "10:00", &[4], &[107, 108, 109]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CrewCountMismatch { .. }));

    let listed = flights.list_flights(None).await.unwrap();
    assert!(listed.is_empty());
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_duplicate_flight_number(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let flights = &ctx.world.flight_service;
    flights
        .create_flight(flight_request("LY100", TLV_LCA, SMALL_JET, date(2030, 2, 1), "10:00", &[4, 5], &[107, 108, 109]))
        .await?;

    let err = flights
        .create_flight(flight_request("LY100", TLV_LCA, TINY_JET, date(2030, 2, 1), "10:00", &[1, 2], &[101, 102, 103]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateFlightNumber(ref number) if number == "LY100"));

    // The second attempt left no crew assignments behind
    let legs = ctx
        .world
        .shared
        .crew_schedule(CrewRole::Pilot, 1)
        .await?;
    assert!(legs.is_empty());
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_search_flights(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let world = &ctx.world;
    world.add_flight("LY001", TLV_JFK, LARGE_JET, at(2030, 2, 2, 10, 0), &[], &[]).await;
    world.add_flight("LY002", TLV_LCA, SMALL_JET, at(2030, 2, 1, 12, 0), &[], &[]).await;
    world.add_flight("LY003", TLV_LCA, SMALL_JET, at(2030, 2, 1, 9, 0), &[], &[]).await;
    world.add_flight("LY004", LCA_TLV, SMALL_JET, at(2030, 2, 1, 15, 0), &[], &[]).await;
    world.add_flight("LY005", TLV_LCA, TINY_JET, at(2030, 2, 1, 18, 0), &[], &[]).await;
    world.flight_service.cancel_flight("LY005").await?;

    let numbers = |flights: Vec<FlightSummary>| -> Vec<String> {
        flights.into_iter().map(|f| f.flight_number).collect()
    };

    let all = world.flight_service.search_flights(FlightSearchQuery::default()).await?;
    assert_eq!(numbers(all.flights), vec!["LY003", "LY002", "LY004", "LY001"]);

    let from_tlv = world
        .flight_service
        .search_flights(FlightSearchQuery {
            source: Some(" tlv ".to_string()),
            ..FlightSearchQuery::default()
        })
        .await?;
    assert_eq!(numbers(from_tlv.flights), vec!["LY003", "LY002", "LY001"]);

    let to_lca_on_day = world
        .flight_service
        .search_flights(FlightSearchQuery {
            departure_date: Some(date(2030, 2, 1)),
            source: Some(String::new()),
            destination: Some("LCA".to_string()),
        })
        .await?;
    assert_eq!(numbers(to_lca_on_day.flights), vec!["LY003", "LY002"]);

    let nothing = world
        .flight_service
        .search_flights(FlightSearchQuery {
            departure_date: Some(date(2030, 3, 1)),
            ..FlightSearchQuery::default()
        })
        .await?;
    assert!(nothing.flights.is_empty());

    // Admin listings include every status, newest first
    let listed = world.flight_service.list_flights(None).await?;
    assert_eq!(numbers(listed), vec!["LY001", "LY005", "LY004", "LY002", "LY003"]);

    let canceled = world.flight_service.list_flights(Some(FlightStatus::Canceled)).await?;
    assert_eq!(numbers(canceled), vec!["LY005"]);
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_reference_listings(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let flights = &ctx.world.flight_service;

    let airports = flights.list_airports().await?;
    assert_eq!(airports.sources, vec!["JFK", "LAX", "LCA", "TLV"]);
    assert_eq!(airports.destinations, vec!["JFK", "LAX", "LCA", "TLV"]);

    let routes = flights.list_routes().await?;
    let ids: Vec<i32> = routes.iter().map(|r| r.route_id).collect();
    assert_eq!(ids, vec![TLV_JFK, JFK_TLV, TLV_LCA, LCA_TLV, JFK_LAX, LAX_JFK]);
    assert_eq!(routes[0].duration_minutes, 720);

    let aircraft = flights.list_aircraft().await?;
    assert_eq!(aircraft.len(), 3);

    let err = flights.get_flight_detail("LY999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = flights.get_pricing("LY999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_set_flight_status(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let world = &ctx.world;
    world.add_flight("LY100", TLV_LCA, SMALL_JET, at(2030, 2, 1, 10, 0), &[], &[]).await;
    world.add_flight("LY101", LCA_TLV, SMALL_JET, at(2030, 2, 1, 14, 0), &[], &[]).await;

    let flight = world.flight_service.set_flight_status("LY100", FlightStatus::Arrived).await?;
    assert_eq!(flight.status, FlightStatus::Arrived);
    assert_eq!(world.flight_status("LY100").await, FlightStatus::Arrived);

    let err = world
        .flight_service
        .set_flight_status("LY101", FlightStatus::Canceled)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert_eq!(world.flight_status("LY101").await, FlightStatus::Active);

    world.flight_service.cancel_flight("LY101").await?;
    let err = world
        .flight_service
        .set_flight_status("LY101", FlightStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert_eq!(world.flight_status("LY101").await, FlightStatus::Canceled);

    let err = world
        .flight_service
        .set_flight_status("LY999", FlightStatus::Arrived)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_refresh_fullness(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let world = &ctx.world;
    world.add_flight("LY200", TLV_LCA, TINY_JET, at(2030, 2, 1, 10, 0), &[], &[]).await;

    assert_eq!(
        world.flight_service.refresh_flight_fullness("LY200").await?,
        FlightStatus::Active
    );

    let confirmation = world
        .book(booking("LY200", SeatClass::Economy, &["1-A"], guest("solo@example.com")))
        .await?;
    assert_eq!(confirmation.flight_status, FlightStatus::Full);
    assert_eq!(world.flight_status("LY200").await, FlightStatus::Full);

    // Arrived flights keep their status whatever the occupancy
    world.flight_service.set_flight_status("LY200", FlightStatus::Arrived).await?;
    assert_eq!(
        world.flight_service.refresh_flight_fullness("LY200").await?,
        FlightStatus::Arrived
    );

    world.add_flight("LY201", TLV_LCA, TINY_JET, at(2030, 2, 2, 10, 0), &[], &[]).await;
    world.flight_service.cancel_flight("LY201").await?;
    assert_eq!(
        world.flight_service.refresh_flight_fullness("LY201").await?,
        FlightStatus::Canceled
    );
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_cancel_flight_cancels_every_touching_order(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let world = &ctx.world;
    world.add_flight("LY001", TLV_JFK, LARGE_JET, at(2030, 3, 1, 10, 0), &[], &[]).await;
    world.add_flight("LY002", TLV_LCA, TINY_JET, at(2030, 3, 2, 10, 0), &[], &[]).await;
    world.add_flight("LY003", TLV_LCA, SMALL_JET, at(2030, 3, 3, 10, 0), &[], &[]).await;

    let economy = world
        .book(booking("LY001", SeatClass::Economy, &["1-A", "1-B"], guest("g@example.com")))
        .await?;
    let business = world
        .book(booking("LY001", SeatClass::Business, &["1-A"], registered("r@example.com")))
        .await?;
    let untouched = world
        .book(booking("LY003", SeatClass::Economy, &["2-B"], guest("other@example.com")))
        .await?;

    // One order spanning LY001 and the only seat on LY002
    let shared = world
        .shared
        .place_order(
            &NewOrder {
                guest_email: None,
                registered_email: Some("r@example.com".to_string()),
                order_date: now(),
                total_price: money("200.00"),
            },
            &[
                NewTicket {
                    flight_number: "LY001".to_string(),
                    passenger_name: "Noa Cohen".to_string(),
                    class: SeatClass::Economy,
                    seat: SeatCoordinate::new(3, 'C'),
                },
                NewTicket {
                    flight_number: "LY002".to_string(),
                    passenger_name: "Noa Cohen".to_string(),
                    class: SeatClass::Economy,
                    seat: SeatCoordinate::new(1, 'A'),
                },
            ],
            Atomicity::Strict,
        )
        .await?;
    world.flight_service.refresh_flight_fullness("LY002").await?;
    assert_eq!(world.flight_status("LY002").await, FlightStatus::Full);

    let cancellation = world.flight_service.cancel_flight("LY001").await?;
    assert_eq!(
        cancellation.cancelled_orders,
        vec![economy.order_id, business.order_id, shared]
    );
    assert_eq!(cancellation.refreshed_flights, vec!["LY002".to_string()]);

    assert_eq!(world.flight_status("LY001").await, FlightStatus::Canceled);
    assert_eq!(world.flight_status("LY002").await, FlightStatus::Active);

    for order_id in [economy.order_id, business.order_id, shared] {
        let order = world.shared.find_order(order_id).await?.unwrap();
        assert_eq!(order.status, OrderStatus::SysCancelled);
        assert_eq!(order.total_price, Decimal::ZERO);
        assert!(world.shared.order_tickets(order_id).await?.is_empty());
    }

    let kept = world.shared.find_order(untouched.order_id).await?.unwrap();
    assert_eq!(kept.status, OrderStatus::Active);
    assert_eq!(world.store.ticket_count().await, 1);

    // The freed seat on LY002 can be booked again
    world
        .book(booking("LY002", SeatClass::Economy, &["1-A"], guest("next@example.com")))
        .await?;
    Ok(())
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_cancel_unknown_flight(ctx: &FlightServiceContext) {
    let err = ctx.world.flight_service.cancel_flight("LY999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test_context(FlightServiceContext)]
#[tokio::test]
async fn test_create_aircraft(ctx: &FlightServiceContext) -> Result<(), AppError> {
    let flights = &ctx.world.flight_service;

    let aircraft = flights.create_aircraft(aircraft_request(" 4X-NEW ", 4, 4)).await?;
    assert_eq!(aircraft.tail_number, "4X-NEW");
    assert_eq!(flights.list_aircraft().await?.len(), 4);
    assert_eq!(
        ctx.world.shared.aircraft_layout("4X-NEW", SeatClass::Business).await?,
        Some(Layout::new(4, 4))
    );

    let err = flights.create_aircraft(aircraft_request("4X-NEW", 0, 0)).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateTailNumber(ref tail) if tail == "4X-NEW"));

    let err = flights.create_aircraft(aircraft_request("4X-ODD", 2, 0)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let mut no_rows = aircraft_request("4X-ZERO", 0, 0);
    no_rows.economy_rows = 0;
    let err = flights.create_aircraft(no_rows).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let mut oversized = aircraft_request("4X-BIG", 0, 0);
    oversized.economy_rows = 200_000_000;
    oversized.economy_columns = 26;
    let err = flights.create_aircraft(oversized).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let err = flights.create_aircraft(aircraft_request("4X-BIG", 101, 2)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert!(ctx.world.shared.find_aircraft("4X-BIG").await?.is_none());

    let economy_only = flights.create_aircraft(aircraft_request("4X-ECO", 0, 0)).await?;
    assert_eq!(economy_only.size, AircraftSize::Large);
    assert_eq!(
        ctx.world.shared.aircraft_layout("4X-ECO", SeatClass::Business).await?,
        None
    );
    Ok(())
}

fn plan_with_unknown_pilot(flight_number: &str) -> FlightPlan {
    FlightPlan {
        flight: Flight {
            flight_number: flight_number.to_string(),
            route_id: TLV_LCA,
            tail_number: SMALL_JET.to_string(),
            departure_date: date(2030, 2, 1),
            departure_time: at(2030, 2, 1, 10, 0).time(),
            status: FlightStatus::Active,
        },
        pilot_ids: vec![4, 99],
        attendant_ids: vec![107, 108, 109],
        pricing: vec![Pricing {
            class: SeatClass::Economy,
            price: money("99.00"),
        }],
    }
}

#[tokio::test]
async fn test_flight_write_atomicity() {
    let strict = World::with_atomicity(Atomicity::Strict).await;
    let err = strict
        .shared
        .insert_flight(&plan_with_unknown_pilot("LY300"), Atomicity::Strict)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StorageUnavailable(_)));
    assert!(strict.shared.find_flight("LY300").await.unwrap().is_none());
    assert!(strict.shared.crew_schedule(CrewRole::Pilot, 4).await.unwrap().is_empty());

    let best_effort = World::with_atomicity(Atomicity::BestEffort).await;
    let err = best_effort
        .shared
        .insert_flight(&plan_with_unknown_pilot("LY300"), Atomicity::BestEffort)
        .await
        .unwrap_err();
    match err {
        AppError::PartiallyApplied { completed, failure } => {
            assert!(completed.contains("LY300"));
            assert!(matches!(*failure, AppError::StorageUnavailable(_)));
        }
        other => panic!("expected PartiallyApplied, got {:?}", other),
    }

    // The flight row and the first pilot survive, pricing was never written
    assert!(best_effort.shared.find_flight("LY300").await.unwrap().is_some());
    assert_eq!(
        best_effort
            .shared
            .crew_schedule(CrewRole::Pilot, 4)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(best_effort.shared.flight_pricing("LY300").await.unwrap().is_empty());
}
