//! Courts, locations and time slots.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic position of a venue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Location) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Half-open time window `[start, end)`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if `other` lies entirely inside this window.
    pub fn contains(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Daily prime-time range (UTC wall clock), e.g. evenings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PrimeTime {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl PrimeTime {
    pub fn contains(&self, slot: &TimeSlot) -> bool {
        let t = slot.start.time();
        self.start <= t && t < self.end
    }
}

/// A court at a venue with its availability windows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Court {
    #[serde(default = "Uuid::new_v4")]
    pub id: CourtId,
    pub name: String,
    #[serde(default)]
    pub location: Location,
    /// Show court / main court; high-importance matches prefer it.
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub availability: Vec<TimeSlot>,
}

impl Court {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location,
            is_primary: false,
            availability: Vec::new(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn with_window(mut self, window: TimeSlot) -> Self {
        self.availability.push(window);
        self
    }

    /// Cut every availability window into consecutive slots of `length`.
    /// Trailing remainders shorter than `length` are dropped; duplicates from
    /// overlapping windows are removed. Sorted by start.
    pub fn slots(&self, length: Duration) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        if length <= Duration::zero() {
            return slots;
        }
        for window in &self.availability {
            let mut start = window.start;
            while start + length <= window.end {
                slots.push(TimeSlot::starting_at(start, length));
                start += length;
            }
        }
        slots.sort();
        slots.dedup();
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, h, m, 0).unwrap()
    }

    #[test]
    fn adjacent_slots_do_not_overlap() {
        let a = TimeSlot::new(at(10, 0), at(11, 0));
        let b = TimeSlot::new(at(11, 0), at(12, 0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&TimeSlot::new(at(10, 30), at(11, 30))));
    }

    #[test]
    fn windows_are_cut_into_slots() {
        let court = Court::new("C1", Location::default())
            .with_window(TimeSlot::new(at(9, 0), at(11, 30)))
            .with_window(TimeSlot::new(at(10, 0), at(11, 0)));
        let slots = court.slots(Duration::minutes(60));
        assert_eq!(
            slots,
            vec![
                TimeSlot::new(at(9, 0), at(10, 0)),
                TimeSlot::new(at(10, 0), at(11, 0)),
            ]
        );
    }

    #[test]
    fn distance_between_known_points() {
        let warsaw = Location::new(52.2297, 21.0122);
        let krakow = Location::new(50.0647, 19.9450);
        let d = warsaw.distance_km(&krakow);
        assert!((d - 252.0).abs() < 5.0, "got {d}");
    }
}
