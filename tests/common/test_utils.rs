#![allow(dead_code)]

use airline_booking_engine::db::create_schema;
use dotenv::dotenv;
use once_cell::sync::OnceCell;
use sqlx::mysql::MySqlPool as Pool;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::Error;
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

static TEST_DB: OnceCell<Mutex<Option<TestDb>>> = OnceCell::new();
static DB_NAME: OnceCell<String> = OnceCell::new();

// Same reference data as the in-memory fixtures
const SEED: &[&str] = &[
    "INSERT INTO Routes (RouteID, SourceAirport, DestAirport, DurationMinutes) VALUES
        (1, 'TLV', 'JFK', 720), (2, 'JFK', 'TLV', 660), (3, 'TLV', 'LCA', 60),
        (4, 'LCA', 'TLV', 60), (5, 'JFK', 'LAX', 330), (6, 'LAX', 'JFK', 330)",
    "INSERT INTO Aircrafts (TailNum, Manufacturer, Size, PurchaseDate) VALUES
        ('4X-SML', 'Boeing', 'Small', '2020-05-01'),
        ('4X-LRG', 'Airbus', 'Large', '2020-05-01'),
        ('4X-TNY', 'Dassault', 'Small', '2020-05-01')",
    "INSERT INTO AircraftLayout (TailNum, ClassType, NumRows, NumCols) VALUES
        ('4X-SML', 'Economy', 2, 2),
        ('4X-LRG', 'Economy', 3, 3), ('4X-LRG', 'Business', 1, 2),
        ('4X-TNY', 'Economy', 1, 1)",
    "INSERT INTO Pilots (EmployeeID, FirstName, LastName, IsLongHaulQualified) VALUES
        (1, 'First1', 'Last1', 1), (2, 'First2', 'Last2', 1), (3, 'First3', 'Last3', 1),
        (4, 'First4', 'Last4', 0), (5, 'First5', 'Last5', 0), (6, 'First6', 'Last6', 0)",
    "INSERT INTO FlightAttendants (EmployeeID, FirstName, LastName, IsLongHaulQualified) VALUES
        (101, 'First101', 'Last101', 1), (102, 'First102', 'Last102', 1),
        (103, 'First103', 'Last103', 1), (104, 'First104', 'Last104', 1),
        (105, 'First105', 'Last105', 1), (106, 'First106', 'Last106', 1),
        (107, 'First107', 'Last107', 0), (108, 'First108', 'Last108', 0),
        (109, 'First109', 'Last109', 0), (110, 'First110', 'Last110', 0),
        (111, 'First111', 'Last111', 0), (112, 'First112', 'Last112', 0)",
];

#[derive(Debug)]
pub struct TestDb {
    pub pool: Pool,
    pub db_name: String,
}

fn server_url() -> String {
    dotenv().ok();
    let db_url = env::var("ADMIN_DATABASE_URL").expect("ADMIN_DATABASE_URL must be set in .env file");
    db_url.split('/').take(3).collect::<Vec<&str>>().join("/")
}

// Connection pool to the server itself, used to create and drop databases
async fn create_connection_pool_without_db() -> Result<Pool, Error> {
    MySqlPoolOptions::new()
        .max_connections(2)
        .connect(&server_url())
        .await
}

async fn create_connection_pool_with_db(db_name: &str) -> Result<Pool, Error> {
    MySqlPoolOptions::new()
        .max_connections(10)
        .connect(&format!("{}/{}", server_url(), db_name))
        .await
}

impl TestDb {
    /// Pool to a seeded database shared by every test in this binary.
    pub async fn get_instance() -> Result<Pool, Error> {
        let test_db = TEST_DB.get_or_init(|| Mutex::new(None));
        let mut guard = test_db.lock().await;

        if let Some(db) = guard.as_ref() {
            return Ok(db.pool.clone());
        }

        let db = Self::setup_database().await?;
        let pool = db.pool.clone();
        *guard = Some(db);
        Ok(pool)
    }

    async fn setup_database() -> Result<Self, Error> {
        let db_name = DB_NAME
            .get_or_init(|| {
                let timestamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_millis();
                format!("airline_booking_test_{}", timestamp)
            })
            .clone();

        let admin_pool = create_connection_pool_without_db().await?;
        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin_pool)
            .await?;

        let pool = create_connection_pool_with_db(&db_name).await?;
        create_schema(&pool).await?;
        for seed_sql in SEED {
            sqlx::query(seed_sql).execute(&pool).await?;
        }

        Ok(Self { pool, db_name })
    }

    /// Drops the test database; callable from a `#[dtor]` outside any runtime.
    pub fn cleanup_database_sync() -> Result<(), Error> {
        let Some(db_name) = DB_NAME.get().cloned() else {
            return Ok(());
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Io)?;
        runtime.block_on(async move {
            let admin_pool = create_connection_pool_without_db().await?;
            sqlx::query(&format!("DROP DATABASE IF EXISTS {}", db_name))
                .execute(&admin_pool)
                .await?;
            Ok::<(), Error>(())
        })
    }
}
