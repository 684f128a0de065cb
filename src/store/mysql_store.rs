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
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlConnection, MySqlPool};
use sqlx::{FromRow, MySql, QueryBuilder};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{debug, warn};

const SUMMARY_SELECT: &str = r#"
    SELECT f.FlightNum AS flight_number,
           f.DepartureDate AS departure_date,
           f.DepartureTime AS departure_time,
           f.StatusF AS status,
           r.SourceAirport AS source_airport,
           r.DestAirport AS destination_airport,
           r.DurationMinutes AS duration_minutes,
           f.TailNum AS tail_number
    FROM Flights f
    JOIN Routes r ON f.RouteID = r.RouteID
    WHERE 1=1
"#;

#[derive(Debug, FromRow)]
struct RouteRow {
    route_id: i32,
    source_airport: String,
    destination_airport: String,
    duration_minutes: i32,
}

#[derive(Debug, FromRow)]
struct AircraftRow {
    tail_number: String,
    manufacturer: String,
    size: String,
    purchase_date: NaiveDate,
}

#[derive(Debug, FromRow)]
struct LayoutRow {
    num_rows: i32,
    num_cols: i32,
}

#[derive(Debug, FromRow)]
struct FlightRow {
    flight_number: String,
    route_id: i32,
    tail_number: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    status: String,
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    flight_number: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    status: String,
    source_airport: String,
    destination_airport: String,
    duration_minutes: i32,
    tail_number: String,
}

#[derive(Debug, FromRow)]
struct PricingRow {
    class_type: String,
    price: Decimal,
}

#[derive(Debug, FromRow)]
struct CrewRow {
    employee_id: i32,
    first_name: String,
    last_name: String,
    long_haul_qualified: bool,
}

#[derive(Debug, FromRow)]
struct LegRow {
    flight_number: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    source_airport: String,
    destination_airport: String,
    duration_minutes: i32,
}

#[derive(Debug, FromRow)]
struct SeatRow {
    seat_row: i32,
    seat_col: String,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    order_id: i64,
    guest_email: Option<String>,
    registered_email: Option<String>,
    order_date: NaiveDateTime,
    total_price: Decimal,
    status: String,
}

#[derive(Debug, FromRow)]
struct TicketRow {
    ticket_id: i64,
    order_id: i64,
    flight_number: String,
    passenger_name: String,
    class_type: String,
    seat_row: i32,
    seat_col: String,
}

#[derive(Debug, FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

#[derive(Debug, FromRow)]
struct ClassRevenueRow {
    class_type: String,
    revenue: Option<Decimal>,
}

// Enum columns are stored as their variant names
fn parse_column<T: FromStr>(column: &'static str, value: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|_| AppError::StorageUnavailable(format!("Unexpected {} value '{}'", column, value)))
}

fn seat_from_columns(row: i32, column: &str) -> AppResult<SeatCoordinate> {
    let letter = column
        .chars()
        .next()
        .ok_or_else(|| AppError::StorageUnavailable("Empty seat column".into()))?;
    Ok(SeatCoordinate::new(row.max(0) as u32, letter))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

impl RouteRow {
    fn into_route(self) -> Route {
        Route {
            route_id: self.route_id,
            source_airport: self.source_airport,
            destination_airport: self.destination_airport,
            duration_minutes: i64::from(self.duration_minutes),
        }
    }
}

impl AircraftRow {
    fn into_aircraft(self) -> AppResult<Aircraft> {
        Ok(Aircraft {
            manufacturer: parse_column("Manufacturer", &self.manufacturer)?,
            size: parse_column("Size", &self.size)?,
            tail_number: self.tail_number,
            purchase_date: self.purchase_date,
        })
    }
}

impl SummaryRow {
    fn into_summary(self) -> AppResult<FlightSummary> {
        let duration_minutes = i64::from(self.duration_minutes);
        Ok(FlightSummary {
            arrival: arrival_instant(self.departure_date, self.departure_time, duration_minutes),
            status: parse_column("StatusF", &self.status)?,
            flight_number: self.flight_number,
            departure_date: self.departure_date,
            departure_time: self.departure_time,
            source_airport: self.source_airport,
            destination_airport: self.destination_airport,
            duration_minutes,
            tail_number: self.tail_number,
        })
    }
}

impl CrewRow {
    fn into_member(self) -> CrewMember {
        CrewMember {
            employee_id: self.employee_id,
            first_name: self.first_name,
            last_name: self.last_name,
            long_haul_qualified: self.long_haul_qualified,
        }
    }
}

impl OrderRow {
    fn into_order(self) -> AppResult<Order> {
        Ok(Order {
            status: parse_column("OrderStatus", &self.status)?,
            order_id: self.order_id,
            guest_email: self.guest_email,
            registered_email: self.registered_email,
            order_date: self.order_date,
            total_price: self.total_price,
        })
    }
}

impl TicketRow {
    fn into_ticket(self) -> AppResult<Ticket> {
        Ok(Ticket {
            class: parse_column("ClassType", &self.class_type)?,
            seat: seat_from_columns(self.seat_row, &self.seat_col)?,
            ticket_id: self.ticket_id,
            order_id: self.order_id,
            flight_number: self.flight_number,
            passenger_name: self.passenger_name,
        })
    }
}

fn crew_tables(role: CrewRole) -> (&'static str, &'static str, &'static str) {
    match role {
        CrewRole::Pilot => ("Pilots", "CrewPilots", "PilotID"),
        CrewRole::Attendant => ("FlightAttendants", "CrewAttendants", "AttendantID"),
    }
}

// One step of writing a flight plan, for error reporting
#[derive(Debug, Clone, Copy)]
enum FlightStep {
    Flight,
    Pilot(i32),
    Attendant(i32),
    Pricing(SeatClass),
}

impl FlightStep {
    fn describe(self, err: &sqlx::Error) -> String {
        match self {
            FlightStep::Flight => format!("flight insert failed: {}", err),
            FlightStep::Pilot(id) => format!("pilot {} assignment failed: {}", id, err),
            FlightStep::Attendant(id) => format!("attendant {} assignment failed: {}", id, err),
            FlightStep::Pricing(class) => format!("{} pricing failed: {}", class, err),
        }
    }
}

async fn write_flight_plan(conn: &mut MySqlConnection, plan: &FlightPlan) -> Result<(), (FlightStep, sqlx::Error)> {
    let flight = &plan.flight;

    sqlx::query(
        r#"INSERT INTO Flights (FlightNum, RouteID, TailNum, DepartureDate, DepartureTime, StatusF)
        VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&flight.flight_number)
    .bind(flight.route_id)
    .bind(&flight.tail_number)
    .bind(flight.departure_date)
    .bind(flight.departure_time)
    .bind(flight.status.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| (FlightStep::Flight, e))?;

    for &pilot_id in &plan.pilot_ids {
        sqlx::query("INSERT INTO CrewPilots (FlightNum, PilotID) VALUES (?, ?)")
            .bind(&flight.flight_number)
            .bind(pilot_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| (FlightStep::Pilot(pilot_id), e))?;
    }

    for &attendant_id in &plan.attendant_ids {
        sqlx::query("INSERT INTO CrewAttendants (FlightNum, AttendantID) VALUES (?, ?)")
            .bind(&flight.flight_number)
            .bind(attendant_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| (FlightStep::Attendant(attendant_id), e))?;
    }

    for pricing in &plan.pricing {
        sqlx::query(
            r#"INSERT INTO FlightPricing (FlightNum, ClassType, Price) VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE Price = VALUES(Price)"#,
        )
        .bind(&flight.flight_number)
        .bind(pricing.class.to_string())
        .bind(pricing.price)
        .execute(&mut *conn)
        .await
        .map_err(|e| (FlightStep::Pricing(pricing.class), e))?;
    }

    Ok(())
}

async fn select_taken_seats(
    conn: &mut MySqlConnection,
    flight_number: &str,
    class: SeatClass,
) -> AppResult<Vec<SeatCoordinate>> {
    sqlx::query_as::<_, SeatRow>(
        r#"SELECT t.SeatRow AS seat_row, t.SeatCol AS seat_col
        FROM Tickets t
        JOIN Orders o ON t.OrderID = o.OrderID
        WHERE t.FlightNum = ?
          AND t.ClassType = ?
          AND o.OrderStatus NOT IN (?, ?)"#,
    )
    .bind(flight_number)
    .bind(class.to_string())
    .bind(OrderStatus::CustCancelled.to_string())
    .bind(OrderStatus::SysCancelled.to_string())
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|row| seat_from_columns(row.seat_row, &row.seat_col))
    .collect()
}

// Locks the booked flights' rows in key order, then re-reads their taken
// seats inside the same transaction that will insert the tickets.
async fn claim_seats(conn: &mut MySqlConnection, tickets: &[NewTicket]) -> AppResult<()> {
    let flights: BTreeSet<&str> = tickets.iter().map(|t| t.flight_number.as_str()).collect();
    for flight_number in &flights {
        sqlx::query("SELECT FlightNum FROM Flights WHERE FlightNum = ? FOR UPDATE")
            .bind(*flight_number)
            .fetch_optional(&mut *conn)
            .await?;
    }

    let keys: BTreeSet<(&str, SeatClass)> = tickets
        .iter()
        .map(|t| (t.flight_number.as_str(), t.class))
        .collect();
    let mut held = BTreeSet::new();
    for (flight_number, class) in keys {
        for seat in select_taken_seats(conn, flight_number, class).await? {
            held.insert((flight_number, class, seat));
        }
    }

    for ticket in tickets {
        if !held.insert((ticket.flight_number.as_str(), ticket.class, ticket.seat)) {
            warn!(flight = %ticket.flight_number, seat = %ticket.seat, "Seat claimed before commit");
            return Err(AppError::SeatAlreadyTaken {
                seat: ticket.seat,
                order_id: None,
                tickets_created: 0,
            });
        }
    }

    Ok(())
}

async fn insert_order_row(conn: &mut MySqlConnection, order: &NewOrder) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO Orders (GuestEmail, RegisteredEmail, OrderDate, TotalPrice, OrderStatus)
        VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(&order.guest_email)
    .bind(&order.registered_email)
    .bind(order.order_date)
    .bind(order.total_price)
    .bind(OrderStatus::Active.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_id() as i64)
}

async fn insert_ticket_row(conn: &mut MySqlConnection, order_id: i64, ticket: &NewTicket) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO Tickets (OrderID, FlightNum, PassengerName, ClassType, SeatRow, SeatCol)
        VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(order_id)
    .bind(&ticket.flight_number)
    .bind(&ticket.passenger_name)
    .bind(ticket.class.to_string())
    .bind(ticket.seat.row as i32)
    .bind(ticket.seat.column.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// Maps a failed ticket insert, given what was already committed
fn ticket_failure(err: sqlx::Error, ticket: &NewTicket, order_id: Option<i64>, tickets_created: usize) -> AppError {
    if is_unique_violation(&err) {
        warn!(flight = %ticket.flight_number, seat = %ticket.seat, "Seat collision on ticket insert");
        return AppError::SeatAlreadyTaken {
            seat: ticket.seat,
            order_id,
            tickets_created,
        };
    }

    match order_id {
        Some(order_id) => AppError::PartiallyApplied {
            completed: format!("Order {} created with {} ticket(s)", order_id, tickets_created),
            failure: Box::new(AppError::from(err)),
        },
        None => AppError::from(err),
    }
}

async fn write_cancellation(
    conn: &mut MySqlConnection,
    plan: &CancellationPlan,
    orders_done: &mut usize,
) -> Result<(), sqlx::Error> {
    if let Some(flight_number) = &plan.cancel_flight {
        sqlx::query("UPDATE Flights SET StatusF = ? WHERE FlightNum = ?")
            .bind(FlightStatus::Canceled.to_string())
            .bind(flight_number)
            .execute(&mut *conn)
            .await?;
    }

    for refund in &plan.orders {
        sqlx::query("UPDATE Orders SET OrderStatus = ?, TotalPrice = ? WHERE OrderID = ?")
            .bind(plan.status.to_string())
            .bind(refund.total_price)
            .bind(refund.order_id)
            .execute(&mut *conn)
            .await?;

        // Free the seats
        sqlx::query("DELETE FROM Tickets WHERE OrderID = ?")
            .bind(refund.order_id)
            .execute(&mut *conn)
            .await?;

        *orders_done += 1;
    }

    Ok(())
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlStore { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl BookingStore for MySqlStore {
    async fn list_routes(&self) -> AppResult<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>(
            r#"SELECT RouteID AS route_id, SourceAirport AS source_airport,
                DestAirport AS destination_airport, DurationMinutes AS duration_minutes
            FROM Routes
            ORDER BY RouteID"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RouteRow::into_route).collect())
    }

    async fn find_route(&self, route_id: i32) -> AppResult<Option<Route>> {
        let row = sqlx::query_as::<_, RouteRow>(
            r#"SELECT RouteID AS route_id, SourceAirport AS source_airport,
                DestAirport AS destination_airport, DurationMinutes AS duration_minutes
            FROM Routes
            WHERE RouteID = ?"#,
        )
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RouteRow::into_route))
    }

    async fn list_aircraft(&self) -> AppResult<Vec<Aircraft>> {
        sqlx::query_as::<_, AircraftRow>(
            r#"SELECT TailNum AS tail_number, Manufacturer AS manufacturer, Size AS size,
                PurchaseDate AS purchase_date
            FROM Aircrafts
            ORDER BY TailNum"#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(AircraftRow::into_aircraft)
        .collect()
    }

    async fn find_aircraft(&self, tail_number: &str) -> AppResult<Option<Aircraft>> {
        sqlx::query_as::<_, AircraftRow>(
            r#"SELECT TailNum AS tail_number, Manufacturer AS manufacturer, Size AS size,
                PurchaseDate AS purchase_date
            FROM Aircrafts
            WHERE TailNum = ?"#,
        )
        .bind(tail_number)
        .fetch_optional(&self.pool)
        .await?
        .map(AircraftRow::into_aircraft)
        .transpose()
    }

    async fn aircraft_layout(&self, tail_number: &str, class: SeatClass) -> AppResult<Option<Layout>> {
        let row = sqlx::query_as::<_, LayoutRow>(
            r#"SELECT NumRows AS num_rows, NumCols AS num_cols
            FROM AircraftLayout
            WHERE TailNum = ? AND ClassType = ?"#,
        )
        .bind(tail_number)
        .bind(class.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Layout::new(r.num_rows.max(0) as u32, r.num_cols.max(0) as u32)))
    }

    async fn insert_aircraft(&self, aircraft: &Aircraft, layouts: &[(SeatClass, Layout)]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT TailNum FROM Aircrafts WHERE TailNum = ? FOR UPDATE")
            .bind(&aircraft.tail_number)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateTailNumber(aircraft.tail_number.clone()));
        }

        sqlx::query(
            r#"INSERT INTO Aircrafts (TailNum, Manufacturer, Size, PurchaseDate)
            VALUES (?, ?, ?, ?)"#,
        )
        .bind(&aircraft.tail_number)
        .bind(aircraft.manufacturer.to_string())
        .bind(aircraft.size.to_string())
        .bind(aircraft.purchase_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateTailNumber(aircraft.tail_number.clone())
            } else {
                AppError::from(e)
            }
        })?;

        for (class, layout) in layouts {
            sqlx::query(
                r#"INSERT INTO AircraftLayout (TailNum, ClassType, NumRows, NumCols)
                VALUES (?, ?, ?, ?)"#,
            )
            .bind(&aircraft.tail_number)
            .bind(class.to_string())
            .bind(layout.rows as i32)
            .bind(layout.columns as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_flight(&self, flight_number: &str) -> AppResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(
            r#"SELECT FlightNum AS flight_number, RouteID AS route_id, TailNum AS tail_number,
                DepartureDate AS departure_date, DepartureTime AS departure_time, StatusF AS status
            FROM Flights
            WHERE FlightNum = ?"#,
        )
        .bind(flight_number)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Flight {
                status: parse_column("StatusF", &row.status)?,
                flight_number: row.flight_number,
                route_id: row.route_id,
                tail_number: row.tail_number,
                departure_date: row.departure_date,
                departure_time: row.departure_time,
            })),
            None => Ok(None),
        }
    }

    async fn flight_summary(&self, flight_number: &str) -> AppResult<Option<FlightSummary>> {
        let mut builder = QueryBuilder::<MySql>::new(SUMMARY_SELECT);
        builder.push(" AND f.FlightNum = ").push_bind(flight_number);

        builder
            .build_query_as::<SummaryRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(SummaryRow::into_summary)
            .transpose()
    }

    async fn search_flights(
        &self,
        query: &FlightSearchQuery,
        status: Option<FlightStatus>,
    ) -> AppResult<Vec<FlightSummary>> {
        let mut builder = QueryBuilder::<MySql>::new(SUMMARY_SELECT);

        if let Some(status) = status {
            builder.push(" AND f.StatusF = ").push_bind(status.to_string());
        }
        if let Some(date) = query.departure_date {
            builder.push(" AND f.DepartureDate = ").push_bind(date);
        }
        if let Some(source) = &query.source {
            builder.push(" AND r.SourceAirport = ").push_bind(source.clone());
        }
        if let Some(destination) = &query.destination {
            builder.push(" AND r.DestAirport = ").push_bind(destination.clone());
        }
        builder.push(" ORDER BY f.DepartureDate, f.DepartureTime, f.FlightNum");

        builder
            .build_query_as::<SummaryRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(SummaryRow::into_summary)
            .collect()
    }

    async fn flight_pricing(&self, flight_number: &str) -> AppResult<Vec<Pricing>> {
        sqlx::query_as::<_, PricingRow>(
            r#"SELECT ClassType AS class_type, Price AS price
            FROM FlightPricing
            WHERE FlightNum = ?
            ORDER BY ClassType DESC"#,
        )
        .bind(flight_number)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| {
            Ok(Pricing {
                class: parse_column("ClassType", &row.class_type)?,
                price: row.price,
            })
        })
        .collect()
    }

    async fn update_flight_status(&self, flight_number: &str, status: FlightStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE Flights SET StatusF = ? WHERE FlightNum = ?")
            .bind(status.to_string())
            .bind(flight_number)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        // MySQL reports 0 affected rows when the value did not change
        Ok(self.find_flight(flight_number).await?.is_some())
    }

    async fn insert_flight(&self, plan: &FlightPlan, atomicity: Atomicity) -> AppResult<()> {
        let flight_number = &plan.flight.flight_number;

        let existing = sqlx::query("SELECT FlightNum FROM Flights WHERE FlightNum = ?")
            .bind(flight_number)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateFlightNumber(flight_number.clone()));
        }

        let outcome = match atomicity {
            Atomicity::Strict => {
                let mut tx = self.pool.begin().await?;
                match write_flight_plan(&mut tx, plan).await {
                    Ok(()) => {
                        tx.commit().await?;
                        Ok(())
                    }
                    Err(failure) => {
                        tx.rollback().await?;
                        Err(failure)
                    }
                }
            }
            Atomicity::BestEffort => {
                let mut conn = self.pool.acquire().await?;
                write_flight_plan(&mut conn, plan).await
            }
        };

        match outcome {
            Ok(()) => Ok(()),
            Err((FlightStep::Flight, err)) if is_unique_violation(&err) => {
                Err(AppError::DuplicateFlightNumber(flight_number.clone()))
            }
            Err((FlightStep::Flight, err)) => Err(AppError::from(err)),
            Err((step, err)) => {
                let failure = AppError::StorageUnavailable(step.describe(&err));
                match atomicity {
                    Atomicity::Strict => Err(failure),
                    Atomicity::BestEffort => Err(AppError::PartiallyApplied {
                        completed: format!("Flight {} created", flight_number),
                        failure: Box::new(failure),
                    }),
                }
            }
        }
    }

    async fn list_crew(&self, role: CrewRole) -> AppResult<Vec<CrewMember>> {
        let (table, _, _) = crew_tables(role);
        let sql = format!(
            "SELECT EmployeeID AS employee_id, FirstName AS first_name, LastName AS last_name,
                IsLongHaulQualified AS long_haul_qualified
            FROM {} ORDER BY EmployeeID",
            table
        );

        let rows = sqlx::query_as::<_, CrewRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(CrewRow::into_member).collect())
    }

    async fn find_crew_member(&self, role: CrewRole, employee_id: i32) -> AppResult<Option<CrewMember>> {
        let (table, _, _) = crew_tables(role);
        let sql = format!(
            "SELECT EmployeeID AS employee_id, FirstName AS first_name, LastName AS last_name,
                IsLongHaulQualified AS long_haul_qualified
            FROM {} WHERE EmployeeID = ?",
            table
        );

        let row = sqlx::query_as::<_, CrewRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CrewRow::into_member))
    }

    async fn crew_schedule(&self, role: CrewRole, employee_id: i32) -> AppResult<Vec<ScheduledLeg>> {
        let (_, assignments, id_column) = crew_tables(role);
        let sql = format!(
            "SELECT f.FlightNum AS flight_number, f.DepartureDate AS departure_date,
                f.DepartureTime AS departure_time, r.SourceAirport AS source_airport,
                r.DestAirport AS destination_airport, r.DurationMinutes AS duration_minutes
            FROM {} c
            JOIN Flights f ON c.FlightNum = f.FlightNum
            JOIN Routes r ON f.RouteID = r.RouteID
            WHERE c.{} = ? AND f.StatusF <> ?
            ORDER BY f.DepartureDate, f.DepartureTime",
            assignments, id_column
        );

        let rows = sqlx::query_as::<_, LegRow>(&sql)
            .bind(employee_id)
            .bind(FlightStatus::Canceled.to_string())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScheduledLeg {
                departure: departure_instant(row.departure_date, row.departure_time),
                arrival: arrival_instant(
                    row.departure_date,
                    row.departure_time,
                    i64::from(row.duration_minutes),
                ),
                flight_number: row.flight_number,
                source_airport: row.source_airport,
                destination_airport: row.destination_airport,
            })
            .collect())
    }

    async fn taken_seats(&self, flight_number: &str, class: SeatClass) -> AppResult<Vec<SeatCoordinate>> {
        let mut conn = self.pool.acquire().await?;
        select_taken_seats(&mut conn, flight_number, class).await
    }

    async fn ensure_guest(&self, guest: &GuestCustomer) -> AppResult<()> {
        sqlx::query(
            r#"INSERT IGNORE INTO GuestCustomers (Email, FirstName, LastName)
            VALUES (?, ?, ?)"#,
        )
        .bind(&guest.email)
        .bind(&guest.first_name)
        .bind(&guest.last_name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn place_order(&self, order: &NewOrder, tickets: &[NewTicket], atomicity: Atomicity) -> AppResult<i64> {
        match atomicity {
            Atomicity::Strict => {
                let mut tx = self.pool.begin().await?;
                if let Err(err) = claim_seats(&mut tx, tickets).await {
                    tx.rollback().await?;
                    return Err(err);
                }
                let order_id = insert_order_row(&mut tx, order).await?;

                for ticket in tickets {
                    if let Err(err) = insert_ticket_row(&mut tx, order_id, ticket).await {
                        tx.rollback().await?;
                        return Err(ticket_failure(err, ticket, None, 0));
                    }
                }

                tx.commit().await?;
                debug!(order_id, tickets = tickets.len(), "Order committed");
                Ok(order_id)
            }
            Atomicity::BestEffort => {
                let mut conn = self.pool.acquire().await?;
                let order_id = insert_order_row(&mut conn, order).await?;

                for (created, ticket) in tickets.iter().enumerate() {
                    if let Err(err) = insert_ticket_row(&mut conn, order_id, ticket).await {
                        return Err(ticket_failure(err, ticket, Some(order_id), created));
                    }
                }

                Ok(order_id)
            }
        }
    }

    async fn find_order(&self, order_id: i64) -> AppResult<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(
            r#"SELECT OrderID AS order_id, GuestEmail AS guest_email, RegisteredEmail AS registered_email,
                OrderDate AS order_date, TotalPrice AS total_price, OrderStatus AS status
            FROM Orders
            WHERE OrderID = ?"#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .map(OrderRow::into_order)
        .transpose()
    }

    async fn order_tickets(&self, order_id: i64) -> AppResult<Vec<Ticket>> {
        sqlx::query_as::<_, TicketRow>(
            r#"SELECT TicketID AS ticket_id, OrderID AS order_id, FlightNum AS flight_number,
                PassengerName AS passenger_name, ClassType AS class_type,
                SeatRow AS seat_row, SeatCol AS seat_col
            FROM Tickets
            WHERE OrderID = ?
            ORDER BY FlightNum, ClassType, SeatRow, SeatCol"#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TicketRow::into_ticket)
        .collect()
    }

    async fn orders_for_customer(&self, email: &str, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let mut builder = QueryBuilder::<MySql>::new(
            r#"SELECT OrderID AS order_id, GuestEmail AS guest_email, RegisteredEmail AS registered_email,
                OrderDate AS order_date, TotalPrice AS total_price, OrderStatus AS status
            FROM Orders
            WHERE RegisteredEmail = "#,
        );
        builder.push_bind(email.to_string());
        if let Some(status) = status {
            builder.push(" AND OrderStatus = ").push_bind(status.to_string());
        }
        builder.push(" ORDER BY OrderDate DESC, OrderID DESC");

        builder
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(OrderRow::into_order)
            .collect()
    }

    async fn active_orders_on_flight(&self, flight_number: &str) -> AppResult<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"SELECT DISTINCT o.OrderID
            FROM Orders o
            JOIN Tickets t ON o.OrderID = t.OrderID
            WHERE t.FlightNum = ?
              AND o.OrderStatus NOT IN (?, ?)
            ORDER BY o.OrderID"#,
        )
        .bind(flight_number)
        .bind(OrderStatus::CustCancelled.to_string())
        .bind(OrderStatus::SysCancelled.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(order_id,)| order_id).collect())
    }

    async fn apply_cancellation(&self, plan: &CancellationPlan, atomicity: Atomicity) -> AppResult<()> {
        let mut orders_done = 0;

        match atomicity {
            Atomicity::Strict => {
                let mut tx = self.pool.begin().await?;
                if let Err(err) = write_cancellation(&mut tx, plan, &mut orders_done).await {
                    tx.rollback().await?;
                    return Err(AppError::from(err));
                }
                tx.commit().await?;
                Ok(())
            }
            Atomicity::BestEffort => {
                let mut conn = self.pool.acquire().await?;
                match write_cancellation(&mut conn, plan, &mut orders_done).await {
                    Ok(()) => Ok(()),
                    Err(err) if orders_done == 0 && plan.cancel_flight.is_none() => Err(AppError::from(err)),
                    Err(err) => Err(AppError::PartiallyApplied {
                        completed: format!("{} of {} order(s) cancelled", orders_done, plan.orders.len()),
                        failure: Box::new(AppError::from(err)),
                    }),
                }
            }
        }
    }

    async fn order_status_counts(&self) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"SELECT OrderStatus AS status, COUNT(*) AS count
            FROM Orders
            GROUP BY OrderStatus
            ORDER BY OrderStatus"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StatusCount {
                status: r.status,
                count: r.count,
            })
            .collect())
    }

    async fn flight_status_counts(&self) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"SELECT StatusF AS status, COUNT(*) AS count
            FROM Flights
            GROUP BY StatusF
            ORDER BY StatusF"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StatusCount {
                status: r.status,
                count: r.count,
            })
            .collect())
    }

    async fn active_revenue(&self) -> AppResult<Decimal> {
        let (revenue,): (Option<Decimal>,) = sqlx::query_as(
            r#"SELECT SUM(TotalPrice)
            FROM Orders
            WHERE OrderStatus NOT IN (?, ?)"#,
        )
        .bind(OrderStatus::CustCancelled.to_string())
        .bind(OrderStatus::SysCancelled.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(revenue.unwrap_or(Decimal::ZERO))
    }

    async fn cancelled_order_count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*)
            FROM Orders
            WHERE OrderStatus IN (?, ?)"#,
        )
        .bind(OrderStatus::CustCancelled.to_string())
        .bind(OrderStatus::SysCancelled.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn revenue_by_class(&self) -> AppResult<Vec<ClassRevenue>> {
        // An order's total counts once for every class it holds tickets in
        sqlx::query_as::<_, ClassRevenueRow>(
            r#"SELECT x.ClassType AS class_type, SUM(x.TotalPrice) AS revenue
            FROM (
                SELECT o.OrderID, o.TotalPrice, t.ClassType
                FROM Orders o
                JOIN Tickets t ON o.OrderID = t.OrderID
                WHERE o.OrderStatus NOT IN (?, ?)
                GROUP BY o.OrderID, o.TotalPrice, t.ClassType
            ) AS x
            GROUP BY x.ClassType
            ORDER BY x.ClassType DESC"#,
        )
        .bind(OrderStatus::CustCancelled.to_string())
        .bind(OrderStatus::SysCancelled.to_string())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| {
            Ok(ClassRevenue {
                class: parse_column("ClassType", &row.class_type)?,
                revenue: row.revenue.unwrap_or(Decimal::ZERO),
            })
        })
        .collect()
    }
}
