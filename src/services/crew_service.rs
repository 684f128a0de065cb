//! Crew eligibility: who can legally staff a prospective flight.
//!
//! A member is eligible when none of their non-canceled legs overlaps the
//! new flight, when their last landing before departure is the new flight's
//! source airport (the home base if they have not landed anywhere yet), and,
//! for long-haul flights, when they are long-haul qualified.

use crate::config::BookingRules;
use crate::models::aircraft::AircraftSize;
use crate::models::crew::{CrewMember, CrewRole, ProspectiveFlight, ScheduledLeg};
use crate::models::flight::FlightCandidates;
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::{arrival_instant, departure_instant, intervals_overlap};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashSet;
use tracing::debug;

/// First existing leg overlapping the prospective flight, if any.
pub fn schedule_conflict<'a>(legs: &'a [ScheduledLeg], flight: &ProspectiveFlight) -> Option<&'a ScheduledLeg> {
    legs.iter()
        .find(|leg| intervals_overlap(leg.departure, leg.arrival, flight.departure, flight.arrival))
}

/// Where the member is at `flight.departure`: the destination of the leg
/// with the latest arrival not after departure, else the home base.
pub fn location_before<'a>(legs: &'a [ScheduledLeg], flight: &ProspectiveFlight, home_base: &'a str) -> &'a str {
    legs.iter()
        .filter(|leg| leg.arrival <= flight.departure)
        .max_by_key(|leg| leg.arrival)
        .map(|leg| leg.destination_airport.as_str())
        .unwrap_or(home_base)
}

pub fn is_eligible(
    member: &CrewMember,
    legs: &[ScheduledLeg],
    flight: &ProspectiveFlight,
    home_base: &str,
) -> bool {
    (!flight.long_haul || member.long_haul_qualified)
        && schedule_conflict(legs, flight).is_none()
        && location_before(legs, flight, home_base) == flight.source_airport
}

fn first_duplicate(ids: &[i32]) -> Option<i32> {
    let mut seen = HashSet::new();
    ids.iter().copied().find(|id| !seen.insert(*id))
}

#[derive(Clone)]
pub struct CrewService {
    store: SharedStore,
    rules: BookingRules,
}

impl CrewService {
    pub fn new(store: SharedStore, rules: BookingRules) -> Self {
        CrewService { store, rules }
    }

    pub async fn list_crew(&self, role: CrewRole) -> AppResult<Vec<CrewMember>> {
        self.store.list_crew(role).await
    }

    /// Builds the prospective flight for a route departing at `date time`.
    pub async fn prospective_flight(
        &self,
        route_id: i32,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<ProspectiveFlight> {
        let route = self
            .store
            .find_route(route_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;

        Ok(ProspectiveFlight {
            departure: departure_instant(date, time),
            arrival: arrival_instant(date, time, route.duration_minutes),
            source_airport: route.source_airport,
            long_haul: self.rules.is_long_haul(route.duration_minutes),
        })
    }

    pub async fn find_available_crew(
        &self,
        role: CrewRole,
        flight: &ProspectiveFlight,
    ) -> AppResult<Vec<CrewMember>> {
        let mut pool = Vec::new();
        for member in self.store.list_crew(role).await? {
            if flight.long_haul && !member.long_haul_qualified {
                continue;
            }
            let legs = self.store.crew_schedule(role, member.employee_id).await?;
            if is_eligible(&member, &legs, flight, &self.rules.crew_home_base) {
                pool.push(member);
            }
        }

        debug!(%role, available = pool.len(), "Crew pool computed");
        Ok(pool)
    }

    async fn load_members(&self, role: CrewRole, ids: &[i32]) -> AppResult<Vec<CrewMember>> {
        let mut members = Vec::with_capacity(ids.len());
        for &employee_id in ids {
            let member = self
                .store
                .find_crew_member(role, employee_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("{} {} not found", role, employee_id)))?;
            members.push(member);
        }
        Ok(members)
    }

    /// Validates a full roster, failing on the first violation.
    ///
    /// Checks run as: duplicates, crew counts, long-haul qualification,
    /// then each member (pilots first) for schedule conflicts and location
    /// continuity.
    pub async fn validate_roster(
        &self,
        size: AircraftSize,
        flight: &ProspectiveFlight,
        pilot_ids: &[i32],
        attendant_ids: &[i32],
    ) -> AppResult<()> {
        let roster = [(CrewRole::Pilot, pilot_ids), (CrewRole::Attendant, attendant_ids)];

        for (role, ids) in roster {
            if let Some(employee_id) = first_duplicate(ids) {
                return Err(AppError::DuplicateCrewMember { role, employee_id });
            }
        }

        let requirement = size.crew_requirement();
        for (role, ids) in roster {
            let required = match role {
                CrewRole::Pilot => requirement.pilots,
                CrewRole::Attendant => requirement.attendants,
            };
            if ids.len() != required {
                return Err(AppError::CrewCountMismatch {
                    size,
                    role,
                    required,
                    provided: ids.len(),
                });
            }
        }

        let pilots = self.load_members(CrewRole::Pilot, pilot_ids).await?;
        let attendants = self.load_members(CrewRole::Attendant, attendant_ids).await?;
        let members = [(CrewRole::Pilot, &pilots), (CrewRole::Attendant, &attendants)];

        if flight.long_haul {
            for (role, crew) in members {
                if let Some(member) = crew.iter().find(|m| !m.long_haul_qualified) {
                    return Err(AppError::QualificationMissing {
                        role,
                        employee_id: member.employee_id,
                    });
                }
            }
        }

        for (role, crew) in members {
            for member in crew.iter() {
                let legs = self.store.crew_schedule(role, member.employee_id).await?;

                if let Some(leg) = schedule_conflict(&legs, flight) {
                    return Err(AppError::ScheduleConflict {
                        role,
                        employee_id: member.employee_id,
                        conflicting_flight: leg.flight_number.clone(),
                    });
                }

                let last_location = location_before(&legs, flight, &self.rules.crew_home_base);
                if last_location != flight.source_airport {
                    return Err(AppError::LocationContinuityViolation {
                        role,
                        employee_id: member.employee_id,
                        last_location: last_location.to_string(),
                        required: flight.source_airport.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Aircraft that can fly the route and be fully staffed from the
    /// available pools, with those pools.
    pub async fn flight_candidates(
        &self,
        route_id: i32,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<FlightCandidates> {
        let flight = self.prospective_flight(route_id, date, time).await?;

        let pilots = self.find_available_crew(CrewRole::Pilot, &flight).await?;
        let attendants = self.find_available_crew(CrewRole::Attendant, &flight).await?;

        let aircraft: Vec<_> = self
            .store
            .list_aircraft()
            .await?
            .into_iter()
            .filter(|a| !flight.long_haul || a.size == AircraftSize::Large)
            .filter(|a| {
                let needed = a.size.crew_requirement();
                pilots.len() >= needed.pilots && attendants.len() >= needed.attendants
            })
            .collect();

        if aircraft.is_empty() {
            return Err(AppError::ValidationFailed(
                "No suitable aircraft with enough qualified and available crew for this route and time".into(),
            ));
        }

        Ok(FlightCandidates {
            route_id,
            is_long_haul: flight.long_haul,
            aircraft,
            pilots,
            attendants,
            small_crew: AircraftSize::Small.crew_requirement(),
            large_crew: AircraftSize::Large.crew_requirement(),
        })
    }
}
