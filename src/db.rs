use crate::config::DatabaseConfig;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

// Schema, in dependency order. `uq_ticket_seat` is the seat collision guard.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS Routes (
        RouteID INT NOT NULL PRIMARY KEY,
        SourceAirport VARCHAR(8) NOT NULL,
        DestAirport VARCHAR(8) NOT NULL,
        DurationMinutes INT NOT NULL,
        CONSTRAINT routes_duration_positive CHECK (DurationMinutes > 0)
    )",
    "CREATE TABLE IF NOT EXISTS Aircrafts (
        TailNum VARCHAR(20) NOT NULL PRIMARY KEY,
        Manufacturer VARCHAR(16) NOT NULL,
        Size VARCHAR(8) NOT NULL,
        PurchaseDate DATE NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS AircraftLayout (
        TailNum VARCHAR(20) NOT NULL,
        ClassType VARCHAR(16) NOT NULL,
        NumRows INT NOT NULL,
        NumCols INT NOT NULL,
        PRIMARY KEY (TailNum, ClassType),
        CONSTRAINT layout_aircraft_fk
            FOREIGN KEY (TailNum) REFERENCES Aircrafts(TailNum)
            ON DELETE CASCADE,
        CONSTRAINT layout_positive CHECK (NumRows > 0 AND NumCols > 0 AND NumCols <= 26)
    )",
    "CREATE TABLE IF NOT EXISTS Flights (
        FlightNum VARCHAR(20) NOT NULL PRIMARY KEY,
        RouteID INT NOT NULL,
        TailNum VARCHAR(20) NOT NULL,
        DepartureDate DATE NOT NULL,
        DepartureTime TIME NOT NULL,
        StatusF VARCHAR(16) NOT NULL DEFAULT 'Active',
        CONSTRAINT flights_route_fk FOREIGN KEY (RouteID) REFERENCES Routes(RouteID),
        CONSTRAINT flights_aircraft_fk FOREIGN KEY (TailNum) REFERENCES Aircrafts(TailNum)
    )",
    "CREATE TABLE IF NOT EXISTS FlightPricing (
        FlightNum VARCHAR(20) NOT NULL,
        ClassType VARCHAR(16) NOT NULL,
        Price DECIMAL(10,2) NOT NULL,
        PRIMARY KEY (FlightNum, ClassType),
        CONSTRAINT pricing_flight_fk
            FOREIGN KEY (FlightNum) REFERENCES Flights(FlightNum)
            ON DELETE CASCADE,
        CONSTRAINT pricing_non_negative CHECK (Price >= 0)
    )",
    "CREATE TABLE IF NOT EXISTS Pilots (
        EmployeeID INT NOT NULL PRIMARY KEY,
        FirstName VARCHAR(64) NOT NULL,
        LastName VARCHAR(64) NOT NULL,
        IsLongHaulQualified TINYINT(1) NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS FlightAttendants (
        EmployeeID INT NOT NULL PRIMARY KEY,
        FirstName VARCHAR(64) NOT NULL,
        LastName VARCHAR(64) NOT NULL,
        IsLongHaulQualified TINYINT(1) NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS CrewPilots (
        FlightNum VARCHAR(20) NOT NULL,
        PilotID INT NOT NULL,
        PRIMARY KEY (FlightNum, PilotID),
        CONSTRAINT crew_pilots_flight_fk FOREIGN KEY (FlightNum) REFERENCES Flights(FlightNum),
        CONSTRAINT crew_pilots_pilot_fk FOREIGN KEY (PilotID) REFERENCES Pilots(EmployeeID)
    )",
    "CREATE TABLE IF NOT EXISTS CrewAttendants (
        FlightNum VARCHAR(20) NOT NULL,
        AttendantID INT NOT NULL,
        PRIMARY KEY (FlightNum, AttendantID),
        CONSTRAINT crew_attendants_flight_fk FOREIGN KEY (FlightNum) REFERENCES Flights(FlightNum),
        CONSTRAINT crew_attendants_attendant_fk
            FOREIGN KEY (AttendantID) REFERENCES FlightAttendants(EmployeeID)
    )",
    "CREATE TABLE IF NOT EXISTS GuestCustomers (
        Email VARCHAR(255) NOT NULL PRIMARY KEY,
        FirstName VARCHAR(64) NOT NULL,
        LastName VARCHAR(64) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS Orders (
        OrderID BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        GuestEmail VARCHAR(255) NULL,
        RegisteredEmail VARCHAR(255) NULL,
        OrderDate DATETIME NOT NULL,
        TotalPrice DECIMAL(10,2) NOT NULL,
        OrderStatus VARCHAR(16) NOT NULL DEFAULT 'Active',
        CONSTRAINT orders_single_payer CHECK ((GuestEmail IS NULL) <> (RegisteredEmail IS NULL))
    )",
    "CREATE TABLE IF NOT EXISTS Tickets (
        TicketID BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        OrderID BIGINT NOT NULL,
        FlightNum VARCHAR(20) NOT NULL,
        PassengerName VARCHAR(128) NOT NULL,
        ClassType VARCHAR(16) NOT NULL,
        SeatRow INT NOT NULL,
        SeatCol CHAR(1) NOT NULL,
        CONSTRAINT uq_ticket_seat UNIQUE (FlightNum, ClassType, SeatRow, SeatCol),
        CONSTRAINT tickets_order_fk FOREIGN KEY (OrderID) REFERENCES Orders(OrderID),
        CONSTRAINT tickets_flight_fk FOREIGN KEY (FlightNum) REFERENCES Flights(FlightNum)
    )",
];

// Database connection manager
pub struct Database {
    pub pool: MySqlPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        Ok(Database { pool })
    }

    /// Creates any missing table. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        create_schema(&self.pool).await
    }

    // Get a reference to the connection pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }
}

pub async fn create_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for create_sql in SCHEMA {
        sqlx::query(create_sql).execute(pool).await?;
    }
    info!(tables = SCHEMA.len(), "Database schema ready");
    Ok(())
}
