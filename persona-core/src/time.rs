//! Civil-time normalization.
//!
//! Every event time is stored as an absolute UTC instant but shown to the
//! user, and typed in by the user, as wall-clock time in one fixed civil
//! zone. By default that zone is Korea Standard Time (`Asia/Seoul`).
//!
//! All conversions go through the IANA zone database via `chrono-tz`.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{PersonaError, PersonaResult};

/// IANA name of the default civil zone.
pub const KST: &str = "Asia/Seoul";

/// A named civil timezone that all event times are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilZone(Tz);

impl Default for CivilZone {
    fn default() -> Self {
        Self::kst()
    }
}

impl CivilZone {
    /// `Asia/Seoul` as the zone database has it. That is +09:00 for any
    /// date since 1988, but not a fixed offset: the database also knows
    /// the 1987-88 summer time and the older offsets before 1961.
    pub fn kst() -> Self {
        CivilZone(chrono_tz::Asia::Seoul)
    }

    /// Look up a zone by its IANA name, e.g. `Asia/Seoul`.
    pub fn named(name: &str) -> PersonaResult<Self> {
        name.parse::<Tz>()
            .map(CivilZone)
            .map_err(|_| PersonaError::Time(format!("Unknown timezone '{}'", name)))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    /// Combine a calendar date and an `HH:MM` wall-clock time in this zone
    /// into the absolute instant it denotes.
    pub fn compose(&self, date: NaiveDate, time: &str) -> PersonaResult<DateTime<Utc>> {
        let time = parse_time_of_day(time)?;
        let local = date.and_time(time);

        self.0
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                PersonaError::Time(format!("{} does not exist in {}", local, self.name()))
            })
    }

    /// The `HH:MM` wall-clock time of an instant in this zone.
    pub fn time_of_day(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.0).format("%H:%M").to_string()
    }

    /// The calendar date an instant falls on in this zone.
    pub fn date_only(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Local midnight of the date an instant falls on, as an absolute instant.
    pub fn midnight(&self, instant: DateTime<Utc>) -> PersonaResult<DateTime<Utc>> {
        self.compose(self.date_only(instant), "00:00")
    }

    pub fn now_local(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.0)
    }

    /// `YYYY-MM-DD` in this zone. This is the key format of the holiday table.
    pub fn date_string(&self, instant: DateTime<Utc>) -> String {
        self.date_only(instant).format("%Y-%m-%d").to_string()
    }

    pub fn is_same_date(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.date_only(a) == self.date_only(b)
    }

    pub fn is_today(&self, instant: DateTime<Utc>) -> bool {
        self.date_only(instant) == self.now_local().date_naive()
    }

    /// Korean short date, e.g. `2025. 09. 01.`
    pub fn format_date(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.0)
            .format("%Y. %m. %d.")
            .to_string()
    }

    /// Korean short date and 24h time, e.g. `2025. 09. 01. 09:00`
    pub fn format_date_time(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.0)
            .format("%Y. %m. %d. %H:%M")
            .to_string()
    }
}

/// Parse `HH:MM` (or `H:MM`) into a time of day.
pub fn parse_time_of_day(s: &str) -> PersonaResult<NaiveTime> {
    let invalid = || PersonaError::Time(format!("Invalid time '{}'. Expected HH:MM", s));

    let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !(1..=2).contains(&hours.len())
        || minutes.len() != 2
        || !digits(hours)
        || !digits(minutes)
    {
        return Err(invalid());
    }
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// When a token issued at `now` with an `expires_in` lifetime (seconds)
/// runs out. `None` when the lifetime is not positive or out of range.
pub fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    if expires_in <= 0 {
        return None;
    }
    now.checked_add_signed(TimeDelta::try_seconds(expires_in)?)
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> PersonaResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| PersonaError::Time(format!("Invalid date '{}'. Expected YYYY-MM-DD", s)))
}
