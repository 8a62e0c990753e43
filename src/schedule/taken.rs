//! Merging reservation ranges into per-date taken sets.
//!
//! Reservations arrive as `(date, first index, count)` triples that may
//! overlap or repeat. They are unioned into sorted, disjoint, half-open
//! index intervals so that overlaps never double count.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;

use crate::error::ReservationWarning;
use super::types::ReservationRange;

/// Occupied slot indices for one date as coalesced `[start, end)` intervals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TakenSet {
    intervals: Vec<(u32, u32)>,
}

impl TakenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `[from, from + count)` as taken, merging with touching intervals
    pub fn insert(&mut self, from: u32, count: u32) {
        if count == 0 {
            return;
        }
        let mut start = from;
        let mut end = from.saturating_add(count);

        // First interval whose end reaches `start` (touching counts as overlap)
        let lo = self.intervals.partition_point(|&(_, e)| e < start);
        // First interval starting strictly after `end`
        let hi = self.intervals.partition_point(|&(s, _)| s <= end);

        if lo < hi {
            start = start.min(self.intervals[lo].0);
            end = end.max(self.intervals[hi - 1].1);
        }
        self.intervals.splice(lo..hi, std::iter::once((start, end)));
    }

    pub fn contains(&self, index: u32) -> bool {
        let pos = self.intervals.partition_point(|&(_, e)| e <= index);
        self.intervals
            .get(pos)
            .is_some_and(|&(s, e)| s <= index && index < e)
    }

    /// Number of distinct taken indices
    pub fn len(&self) -> u64 {
        self.intervals
            .iter()
            .map(|&(s, e)| u64::from(e - s))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[(u32, u32)] {
        &self.intervals
    }

    /// Taken indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.intervals.iter().flat_map(|&(s, e)| s..e)
    }
}

/// Taken sets keyed by civil date, plus the entries that had to be dropped.
#[derive(Debug, Clone, Default)]
pub struct TakenByDate {
    by_date: BTreeMap<NaiveDate, TakenSet>,
    dropped: Vec<ReservationWarning>,
}

impl TakenByDate {
    /// Groups and unions reservations. Malformed entries are logged and skipped.
    pub fn from_reservations(reservations: &[ReservationRange]) -> Self {
        let mut taken = TakenByDate::default();
        for reservation in reservations {
            match checked_bounds(reservation) {
                Ok((from, count)) => taken
                    .by_date
                    .entry(reservation.date)
                    .or_default()
                    .insert(from, count),
                Err(warning) => {
                    warn!("dropping reservation: {}", warning);
                    taken.dropped.push(warning);
                }
            }
        }
        taken
    }

    pub fn for_date(&self, date: NaiveDate) -> Option<&TakenSet> {
        self.by_date.get(&date)
    }

    pub fn is_taken(&self, date: NaiveDate, index: u32) -> bool {
        self.for_date(date).is_some_and(|set| set.contains(index))
    }

    pub fn dropped(&self) -> &[ReservationWarning] {
        &self.dropped
    }
}

fn checked_bounds(reservation: &ReservationRange) -> Result<(u32, u32), ReservationWarning> {
    let ReservationRange {
        date,
        slot_index_from,
        slot_count,
    } = *reservation;

    if slot_count <= 0 {
        return Err(ReservationWarning::NonPositiveCount { date, slot_count });
    }
    if slot_index_from < 0 {
        return Err(ReservationWarning::NegativeIndex {
            date,
            slot_index_from,
        });
    }

    let overflow = || ReservationWarning::IndexOverflow {
        date,
        slot_index_from,
        slot_count,
    };
    let from = u32::try_from(slot_index_from).map_err(|_| overflow())?;
    let count = u32::try_from(slot_count).map_err(|_| overflow())?;
    from.checked_add(count).ok_or_else(overflow)?;
    Ok((from, count))
}
