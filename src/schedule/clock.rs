use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Source of the current instant. Injected so tests can pin "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The civil timezone that dates and opening hours are expressed in.
///
/// Courts and reservations are keyed by local calendar date, so the zone
/// must be the one the booking backend uses. It is an IANA zone passed in
/// explicitly instead of reading the host's local timezone, so daylight
/// saving shifts are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilZone {
    tz: Tz,
}

impl CivilZone {
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Zone from an IANA name such as `Europe/Madrid`. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().parse::<Tz>().ok().map(Self::new)
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Converts an absolute instant to wall-clock time in this zone
    pub fn to_civil(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    pub fn local_now(&self, clock: &dyn Clock) -> NaiveDateTime {
        self.to_civil(clock.now())
    }
}

impl Default for CivilZone {
    fn default() -> Self {
        Self::utc()
    }
}
