//! Availability index
//!
//! Derived on every call from the booking list; nothing is cached.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{Booking, BookingId, DateRange, DomainError, DomainResult, VehicleId};

/// An existing booking that holds some of the requested dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub booking_id: BookingId,
    pub range: DateRange,
    /// Requested dates covered by `range`
    pub dates: Vec<NaiveDate>,
}

fn holding<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    vehicle_id: VehicleId,
) -> impl Iterator<Item = &'a Booking> {
    bookings
        .into_iter()
        .filter(move |b| b.vehicle_id == vehicle_id && b.blocks_dates())
}

/// Dates of `vehicle_id` covered by a pending or confirmed booking.
pub fn blocked_dates<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    vehicle_id: VehicleId,
) -> BTreeSet<NaiveDate> {
    holding(bookings, vehicle_id)
        .flat_map(|b| b.range().days())
        .collect()
}

/// First date-holding booking (lowest start) overlapping `requested`.
pub fn find_conflict<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    vehicle_id: VehicleId,
    requested: &DateRange,
) -> Option<Conflict> {
    holding(bookings, vehicle_id)
        .filter(|b| b.range().overlaps(requested))
        .min_by_key(|b| (b.start_date, b.id))
        .map(|b| {
            let range = b.range();
            Conflict {
                booking_id: b.id,
                range,
                dates: requested.days().filter(|d| range.contains(*d)).collect(),
            }
        })
}

/// `Ok` when `requested` is free, `DateConflict` otherwise.
pub fn ensure_available<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    vehicle_id: VehicleId,
    requested: &DateRange,
) -> DomainResult<()> {
    match find_conflict(bookings, vehicle_id, requested) {
        None => Ok(()),
        Some(conflict) => Err(DomainError::DateConflict {
            vehicle_id,
            conflicting: conflict.range,
            dates: conflict.dates,
        }),
    }
}
