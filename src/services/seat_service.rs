use crate::models::flight::Flight;
use crate::models::seat::{AvailableSeatsResponse, Layout, LayoutResponse, SeatClass, SeatCoordinate};
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use std::collections::BTreeSet;

/// Seat occupancy for one flight and class, always read fresh from the store.
#[derive(Clone)]
pub struct SeatService {
    store: SharedStore,
}

impl SeatService {
    pub fn new(store: SharedStore) -> Self {
        SeatService { store }
    }

    async fn flight(&self, flight_number: &str) -> AppResult<Flight> {
        self.store
            .find_flight(flight_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flight {} not found", flight_number)))
    }

    // (0, 0) when the flight's aircraft has no such class
    pub async fn layout_of(&self, flight_number: &str, class: SeatClass) -> AppResult<Layout> {
        let flight = self.flight(flight_number).await?;
        Ok(self
            .store
            .aircraft_layout(&flight.tail_number, class)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_layout(&self, flight_number: &str, class: SeatClass) -> AppResult<LayoutResponse> {
        let layout = self.layout_of(flight_number, class).await?;
        Ok(LayoutResponse {
            flight_number: flight_number.to_string(),
            class,
            rows: layout.rows,
            columns: layout.column_letters(),
        })
    }

    pub async fn occupied_seats(&self, flight_number: &str, class: SeatClass) -> AppResult<BTreeSet<SeatCoordinate>> {
        Ok(self
            .store
            .taken_seats(flight_number, class)
            .await?
            .into_iter()
            .collect())
    }

    pub async fn available_seats(&self, flight_number: &str, class: SeatClass) -> AppResult<Vec<SeatCoordinate>> {
        let layout = self.layout_of(flight_number, class).await?;
        let occupied = self.occupied_seats(flight_number, class).await?;
        Ok(free_seats(&layout, &occupied))
    }

    pub async fn get_available_seats(
        &self,
        flight_number: &str,
        class: SeatClass,
    ) -> AppResult<AvailableSeatsResponse> {
        let available_seats = self.available_seats(flight_number, class).await?;
        Ok(AvailableSeatsResponse {
            flight_number: flight_number.to_string(),
            class,
            available_seats,
        })
    }

    /// Checks a selection against the seats free right now.
    pub async fn validate_selection(
        &self,
        flight_number: &str,
        class: SeatClass,
        tokens: &[String],
        required: usize,
    ) -> AppResult<Vec<SeatCoordinate>> {
        let available = self.available_seats(flight_number, class).await?;
        check_selection(&available, tokens, required)
    }
}

/// The layout grid minus the occupied seats, row-major.
pub fn free_seats(layout: &Layout, occupied: &BTreeSet<SeatCoordinate>) -> Vec<SeatCoordinate> {
    layout
        .seats()
        .into_iter()
        .filter(|seat| !occupied.contains(seat))
        .collect()
}

/// Validates seat tokens against an available set.
///
/// Fails on the first problem found, in this order: wrong number of tokens,
/// a token that does not parse, a seat that is not available. A seat listed
/// twice is unavailable the second time.
pub fn check_selection(
    available: &[SeatCoordinate],
    tokens: &[String],
    required: usize,
) -> AppResult<Vec<SeatCoordinate>> {
    if tokens.len() != required {
        return Err(AppError::WrongSeatCount {
            expected: required,
            actual: tokens.len(),
        });
    }

    let seats = tokens
        .iter()
        .map(|token| {
            SeatCoordinate::parse(token).ok_or_else(|| AppError::SeatFormatInvalid {
                token: token.clone(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let mut remaining: BTreeSet<SeatCoordinate> = available.iter().copied().collect();
    for seat in &seats {
        if !remaining.remove(seat) {
            return Err(AppError::SeatUnavailable { seat: *seat });
        }
    }

    Ok(seats)
}

/// `max(1, min(requested, available))`
pub fn clamp_quantity(requested: u32, available: usize) -> u32 {
    let available = u32::try_from(available).unwrap_or(u32::MAX);
    requested.min(available).max(1)
}
