//! The parser's input and output records.
//!
//! [`AnchorContext`] carries "now" explicitly so parsing never reads a clock.
//! [`ParsedEvent`] is built once per message and never mutated afterwards.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::AnchorError;

/// Working timezone used when the caller does not name one.
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Length of every event: no duration is read from the message.
pub const DEFAULT_DURATION: Duration = Duration::minutes(60);

// ── AnchorContext ───────────────────────────────────────────────────────────

/// The instant a message was received and the timezone its words refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorContext {
    now: DateTime<Utc>,
    tz: Tz,
}

impl AnchorContext {
    /// Build an anchor from an IANA timezone name (e.g. `"America/Sao_Paulo"`).
    pub fn new(now: DateTime<Utc>, timezone: &str) -> Result<Self, AnchorError> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|_| AnchorError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self::with_tz(now, tz))
    }

    pub fn with_tz(now: DateTime<Utc>, tz: Tz) -> Self {
        Self { now, tz }
    }

    /// Anchor in [`DEFAULT_TIMEZONE`].
    pub fn in_default_timezone(now: DateTime<Utc>) -> Self {
        Self::with_tz(now, chrono_tz::America::Sao_Paulo)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The calendar date of `now` in the anchor's timezone.
    pub fn local_date(&self) -> NaiveDate {
        self.now.with_timezone(&self.tz).date_naive()
    }

    /// Pin a local wall-clock time to an instant in the anchor's timezone.
    ///
    /// Ambiguous times (clocks going back) take the earlier instant. Times that
    /// do not exist (clocks going forward) are moved one hour later.
    ///
    /// Returns `None` on the first and last days chrono can represent, where
    /// the offset or the event's end could leave the calendar.
    pub fn localize(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
        date.pred_opt()?;
        date.succ_opt()?;
        let naive = date.and_time(time);
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => self.localize_after_gap(naive),
        }
    }

    fn localize_after_gap(&self, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
        let shifted = naive.checked_add_signed(Duration::hours(1))?;
        let dt = self
            .tz
            .from_local_datetime(&shifted)
            .earliest()
            // Every IANA gap is at most an hour; read the shifted time as UTC
            // if some zone ever proves otherwise.
            .unwrap_or_else(|| self.tz.from_utc_datetime(&shifted));
        Some(dt)
    }
}

// ── ParsedEvent ─────────────────────────────────────────────────────────────

/// A structured event extracted from one message.
///
/// Invariants: the title is non-empty and at most
/// [`MAX_TITLE_CHARS`](crate::title::MAX_TITLE_CHARS) characters, and
/// `end == start + DEFAULT_DURATION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEvent {
    title: String,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    location: Option<String>,
    raw_text: String,
}

impl ParsedEvent {
    pub(crate) fn new(
        title: String,
        start: DateTime<Tz>,
        location: Option<String>,
        raw_text: &str,
    ) -> Option<Self> {
        Some(Self {
            title,
            start,
            end: start.checked_add_signed(DEFAULT_DURATION)?,
            location,
            raw_text: raw_text.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The message exactly as received, kept as the event description.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
