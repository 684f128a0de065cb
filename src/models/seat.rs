use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// Highest number of seat columns a layout can have (letters A..=Z).
pub const MAX_COLUMNS: u32 = 26;

/// Highest number of rows accepted for one class.
pub const MAX_ROWS: u32 = 100;

// Fare class, stored as its name in the ClassType columns
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
)]
pub enum SeatClass {
    Economy,
    Business,
}

/// Grid shape of one class on one aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Layout {
    pub rows: u32,
    pub columns: u32,
}

impl Layout {
    pub fn new(rows: u32, columns: u32) -> Self {
        Layout { rows, columns }
    }

    /// A (0, 0) layout means the class is not offered on the aircraft.
    pub fn is_offered(&self) -> bool {
        self.rows > 0 && self.columns > 0
    }

    pub fn capacity(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.columns)
    }

    pub fn column_letters(&self) -> Vec<char> {
        (0..self.columns.min(MAX_COLUMNS))
            .filter_map(|i| char::from_u32('A' as u32 + i))
            .collect()
    }

    /// Every seat of the grid in row-major, column-ascending order.
    pub fn seats(&self) -> Vec<SeatCoordinate> {
        let letters = self.column_letters();
        (1..=self.rows)
            .flat_map(|row| {
                letters
                    .iter()
                    .map(move |&column| SeatCoordinate { row, column })
            })
            .collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct SeatCoordinate {
    pub row: u32,
    pub column: char,
}

impl SeatCoordinate {
    pub fn new(row: u32, column: char) -> Self {
        SeatCoordinate {
            row,
            column: column.to_ascii_uppercase(),
        }
    }

    /// Parses a `"<row>-<column>"` token such as `"12-C"`.
    ///
    /// The row must be a positive integer and the column a single ASCII
    /// letter; a lowercase letter is normalised to uppercase.
    pub fn parse(token: &str) -> Option<Self> {
        let (row, column) = token.trim().split_once('-')?;
        let row: u32 = row.trim().parse().ok()?;
        if row == 0 {
            return None;
        }

        let mut chars = column.trim().chars();
        let column = chars.next()?;
        if chars.next().is_some() || !column.is_ascii_alphabetic() {
            return None;
        }

        Some(SeatCoordinate::new(row, column))
    }
}

impl fmt::Display for SeatCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.column)
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LayoutResponse {
    pub flight_number: String,
    pub class: SeatClass,
    pub rows: u32,
    pub columns: Vec<char>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AvailableSeatsResponse {
    pub flight_number: String,
    pub class: SeatClass,
    pub available_seats: Vec<SeatCoordinate>,
}
