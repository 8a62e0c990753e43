use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use log::debug;

use super::overlay::{compute_availability, AvailabilityRequest};
use super::types::{AvailabilityMap, OpenDays};

/// Everything the cached map depends on.
///
/// Only the schedule fields that shape the grid are kept; the price does not
/// affect availability. Reservations are identified by a caller-supplied
/// version number that must change whenever a new batch is fetched. `now` is
/// bucketed to the minute, the resolution of the past-slot check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub open_days: OpenDays,
    pub open_time: u32,
    pub close_time: u32,
    pub slot_minutes: u32,
    pub range_start: NaiveDate,
    pub range_end_exclusive: NaiveDate,
    pub reservations_version: u64,
    pub now_bucket: NaiveDateTime,
}

impl CacheKey {
    pub fn new(request: &AvailabilityRequest<'_>, reservations_version: u64) -> Self {
        let schedule = request.schedule;
        Self {
            open_days: schedule.open_days,
            open_time: schedule.open_time,
            close_time: schedule.close_time,
            slot_minutes: schedule.slot_minutes,
            range_start: request.range_start,
            range_end_exclusive: request.range_end_exclusive,
            reservations_version,
            now_bucket: truncate_to_minute(request.now),
        }
    }
}

fn truncate_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Remembers the last computed availability map.
///
/// There is no time-based expiry: an entry is replaced only when the key
/// changes or [`AvailabilityCache::invalidate`] is called.
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    last: Option<(CacheKey, Arc<AvailabilityMap>)>,
    hits: u64,
    misses: u64,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        request: &AvailabilityRequest<'_>,
        reservations_version: u64,
    ) -> Arc<AvailabilityMap> {
        let key = CacheKey::new(request, reservations_version);

        if let Some((cached_key, map)) = &self.last {
            if *cached_key == key {
                self.hits += 1;
                debug!("availability cache hit for [{}, {})", key.range_start, key.range_end_exclusive);
                return Arc::clone(map);
            }
        }

        self.misses += 1;
        debug!("availability cache miss for [{}, {})", key.range_start, key.range_end_exclusive);
        let map = Arc::new(compute_availability(request));
        self.last = Some((key, Arc::clone(&map)));
        map
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
