//! In-memory reservation storage.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: u64,
    /// Identity that created the reservation.
    pub user_id: i64,
    /// ISO-8601 calendar date, e.g. `2026-01-05`.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub place_id: Option<String>,
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReservation {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservationPatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub place_id: Option<String>,
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("reservation {0} not found")]
    NotFound(u64),
    #[error("{0}")]
    Validation(String),
}

/// Concurrent reservation map with monotonically increasing ids.
#[derive(Debug)]
pub struct ReservationStore {
    items: DashMap<u64, Reservation>,
    next_id: AtomicU64,
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self {
            items: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl ReservationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the date range is inverted.
    pub fn create(&self, user_id: i64, new: NewReservation) -> Result<Reservation, StoreError> {
        validate_range(new.start_date, new.end_date)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let reservation = Reservation {
            id,
            user_id,
            start_date: new.start_date,
            end_date: new.end_date,
            place_id: new.place_id,
            invoice_id: new.invoice_id,
        };
        self.items.insert(id, reservation.clone());
        Ok(reservation)
    }

    /// All reservations ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<Reservation> {
        let mut all: Vec<_> = self.items.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|r| r.id);
        all
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn get(&self, id: u64) -> Result<Reservation, StoreError> {
        self.items
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    /// Apply the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::Validation`] if the patched range is invalid; the stored
    /// reservation is unchanged in both cases.
    pub fn update(&self, id: u64, patch: ReservationPatch) -> Result<Reservation, StoreError> {
        let mut entry = self.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let mut updated = entry.value().clone();
        if let Some(start) = patch.start_date {
            updated.start_date = start;
        }
        if let Some(end) = patch.end_date {
            updated.end_date = end;
        }
        if patch.place_id.is_some() {
            updated.place_id = patch.place_id;
        }
        if patch.invoice_id.is_some() {
            updated.invoice_id = patch.invoice_id;
        }
        validate_range(updated.start_date, updated.end_date)?;

        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn remove(&self, id: u64) -> Result<Reservation, StoreError> {
        self.items
            .remove(&id)
            .map(|(_, r)| r)
            .ok_or(StoreError::NotFound(id))
    }
}

/// A single-day stay has `start == end`.
fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), StoreError> {
    if start > end {
        return Err(StoreError::Validation(
            "start_date must not be after end_date".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn new(start: &str, end: &str) -> NewReservation {
        NewReservation {
            start_date: date(start),
            end_date: date(end),
            place_id: None,
            invoice_id: None,
        }
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let store = ReservationStore::new();
        let a = store.create(1, new("2026-01-01", "2026-01-03")).unwrap();
        let b = store.create(2, new("2026-02-01", "2026-02-03")).unwrap();

        assert!(b.id > a.id);
        assert_eq!(store.list(), vec![a, b]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let store = ReservationStore::new();
        let err = store.create(1, new("2026-01-05", "2026-01-01")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list().is_empty());
    }

    #[test]
    fn invalid_patch_leaves_reservation_untouched() {
        let store = ReservationStore::new();
        let r = store.create(1, new("2026-01-01", "2026-01-03")).unwrap();

        let patch = ReservationPatch {
            end_date: Some(date("2025-12-31")),
            ..ReservationPatch::default()
        };
        assert!(store.update(r.id, patch).is_err());
        assert_eq!(store.get(r.id).unwrap(), r);
    }

    #[test]
    fn patch_applies_present_fields_only() {
        let store = ReservationStore::new();
        let r = store.create(1, new("2026-01-01", "2026-01-03")).unwrap();

        let updated = store
            .update(
                r.id,
                ReservationPatch {
                    place_id: Some("room-7".to_owned()),
                    ..ReservationPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.place_id.as_deref(), Some("room-7"));
        assert_eq!(updated.start_date, r.start_date);
    }

    #[test]
    fn dates_compare_by_calendar_not_text() {
        let store = ReservationStore::new();
        let body: NewReservation = serde_json::from_value(json!({
            "start_date": "2026-9-30",
            "end_date": "2026-10-01"
        }))
        .unwrap();

        let r = store.create(1, body).unwrap();
        assert_eq!(r.start_date, NaiveDate::from_ymd_opt(2026, 9, 30).unwrap());
        assert_eq!(serde_json::to_value(&r).unwrap()["start_date"], "2026-09-30");
    }

    #[test]
    fn single_day_range_is_accepted() {
        let store = ReservationStore::new();
        assert!(store.create(1, new("2026-04-01", "2026-04-01")).is_ok());
    }

    #[test]
    fn non_date_values_do_not_deserialize() {
        let words = serde_json::from_value::<NewReservation>(json!({
            "start_date": "banana",
            "end_date": "cherry"
        }));
        assert!(words.is_err());

        let impossible = serde_json::from_value::<ReservationPatch>(json!({
            "end_date": "2026-02-30"
        }));
        assert!(impossible.is_err());
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let store = ReservationStore::new();
        assert_eq!(store.remove(9), Err(StoreError::NotFound(9)));
    }
}
