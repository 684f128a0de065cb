use crate::models::seat::{Layout, MAX_COLUMNS, MAX_ROWS};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
pub enum Manufacturer {
    Boeing,
    Airbus,
    Dassault,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
pub enum AircraftSize {
    Small,
    Large,
}

/// Crew that must be on board, by aircraft size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CrewRequirement {
    pub pilots: usize,
    pub attendants: usize,
}

impl AircraftSize {
    pub fn crew_requirement(self) -> CrewRequirement {
        match self {
            AircraftSize::Small => CrewRequirement {
                pilots: 2,
                attendants: 3,
            },
            AircraftSize::Large => CrewRequirement {
                pilots: 3,
                attendants: 6,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Aircraft {
    pub tail_number: String,
    pub manufacturer: Manufacturer,
    pub size: AircraftSize,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct CreateAircraftRequest {
    #[validate(length(min = 1, max = 20, message = "Tail number is required"))]
    pub tail_number: String,
    pub manufacturer: Manufacturer,
    pub size: AircraftSize,
    pub purchase_date: NaiveDate,
    #[validate(range(min = 1, max = 100, message = "Economy rows must be between 1 and 100"))]
    pub economy_rows: u32,
    #[validate(range(min = 1, max = 26, message = "Economy columns must be between 1 and 26"))]
    pub economy_columns: u32,
    // 0 / 0 means the aircraft has no business cabin
    #[serde(default)]
    #[validate(range(max = 100, message = "Business rows must be at most 100"))]
    pub business_rows: u32,
    #[serde(default)]
    #[validate(range(max = 26, message = "Business columns must be at most 26"))]
    pub business_columns: u32,
}

impl CreateAircraftRequest {
    pub fn economy_layout(&self) -> Layout {
        Layout::new(self.economy_rows, self.economy_columns)
    }

    /// Business layout is all-or-nothing: both dimensions zero or both positive.
    pub fn business_layout(&self) -> Result<Option<Layout>, String> {
        match (self.business_rows, self.business_columns) {
            (0, 0) => Ok(None),
            (rows, columns) if rows > 0 && rows <= MAX_ROWS && columns > 0 && columns <= MAX_COLUMNS => {
                Ok(Some(Layout::new(rows, columns)))
            }
            _ => Err("Business layout must be both 0 (no business) or both > 0".to_string()),
        }
    }
}
