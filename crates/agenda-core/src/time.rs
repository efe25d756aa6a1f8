//! Clock-time resolution: `15h`, `15h30`, `15hs`, `10:30`, `3 horas`, `10am`, `8 da noite`.
//!
//! Same table-driven shape as [`crate::date`]: the first [`TimeRule`] with a
//! valid match wins. When nothing matches, callers use [`DEFAULT_TIME`].

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::{Captures, Regex};
use tracing::trace;

use crate::normalize::Resolved;

/// Start time used when a message names no time at all (09:00 local).
pub const DEFAULT_TIME: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(time) => time,
    None => panic!("09:00 is a valid time"),
};

struct TimeRule {
    name: &'static str,
    pattern: Regex,
    /// `None` when the match is out of range (`25h`, `13pm`); the search goes on.
    resolve: fn(&Captures<'_>) -> Option<NaiveTime>,
}

/// Leading words that belong to the time expression ("as 15h", "ao meio-dia").
const CONNECTOR: &str = r"(?:\b(?:as|a|ao|pelas)\s+)?";

/// Optional 12-hour or period qualifier after a 24-hour form ("3h da tarde", "10:30 pm").
const QUALIFIER: &str = r"(?:\s*(?P<ampm>am|pm)|\s+da\s+(?P<period>manha|tarde|noite))?";

static TIME_RULES: LazyLock<Vec<TimeRule>> = LazyLock::new(|| {
    vec![
        TimeRule {
            name: "hour_h",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<hour>[0-9]{{1,2}})h(?:rs?|s)?(?P<minute>[0-9]{{1,2}})?(?:min)?{QUALIFIER}\b"
            )),
            resolve: resolve_clock,
        },
        TimeRule {
            name: "hour_colon",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<hour>[0-9]{{1,2}}):(?P<minute>[0-9]{{2}}){QUALIFIER}\b"
            )),
            resolve: resolve_clock,
        },
        TimeRule {
            name: "hour_horas",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<hour>[0-9]{{1,2}})\s+horas?{QUALIFIER}\b"
            )),
            resolve: resolve_clock,
        },
        TimeRule {
            name: "meridiem",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<hour>[0-9]{{1,2}})(?::(?P<minute>[0-9]{{2}}))?\s*(?P<ampm>am|pm)\b"
            )),
            resolve: resolve_meridiem,
        },
        TimeRule {
            name: "hour_period",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<hour>[0-9]{{1,2}})\s+da\s+(?P<period>manha|tarde|noite)\b"
            )),
            resolve: resolve_clock,
        },
        TimeRule {
            name: "noon_midnight",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?:(?P<noon>meio[- ]dia)|(?P<midnight>meia[- ]noite))\b"
            )),
            resolve: resolve_noon_midnight,
        },
        TimeRule {
            name: "bare_period",
            pattern: compile(r"\b(?:de|da|pela|a)\s+(?P<period>manha|tarde|noite)\b"),
            resolve: resolve_bare_period,
        },
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in time pattern must compile")
}

/// Resolve the first clock-time expression in `text` (normalized).
pub fn resolve_time(text: &str) -> Option<Resolved<NaiveTime>> {
    for rule in TIME_RULES.iter() {
        for caps in rule.pattern.captures_iter(text) {
            let Some(value) = (rule.resolve)(&caps) else {
                continue;
            };
            let span = caps.get(0).map_or(0..0, |m| m.range());
            trace!(rule = rule.name, ?span, %value, "time rule matched");
            return Some(Resolved {
                value,
                span,
                rule: rule.name,
            });
        }
    }
    None
}

// ── Hour arithmetic ─────────────────────────────────────────────────────────

/// 12-hour → 24-hour: `pm` adds 12 unless the hour is 12, `12am` is midnight.
fn apply_meridiem(hour: u32, pm: bool) -> u32 {
    match (hour, pm) {
        (12, true) => 12,
        (12, false) => 0,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

/// "da tarde" / "da noite" add 12 to hours before noon; "da manha" leaves the hour alone.
fn apply_period(hour: u32, period: &str) -> u32 {
    match period {
        "tarde" | "noite" if hour < 12 => hour + 12,
        _ => hour,
    }
}

fn capture_u32(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

// ── Table row resolvers ─────────────────────────────────────────────────────

fn resolve_clock(caps: &Captures<'_>) -> Option<NaiveTime> {
    let mut hour = capture_u32(caps, "hour")?;
    let minute = capture_u32(caps, "minute").unwrap_or(0);

    if let Some(ampm) = caps.name("ampm") {
        // "15h pm" is already a 24-hour value.
        if (1..=12).contains(&hour) {
            hour = apply_meridiem(hour, ampm.as_str() == "pm");
        }
    } else if let Some(period) = caps.name("period") {
        hour = apply_period(hour, period.as_str());
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn resolve_meridiem(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour = capture_u32(caps, "hour")?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let minute = capture_u32(caps, "minute").unwrap_or(0);
    let pm = caps.name("ampm")?.as_str() == "pm";
    NaiveTime::from_hms_opt(apply_meridiem(hour, pm), minute, 0)
}

fn resolve_noon_midnight(caps: &Captures<'_>) -> Option<NaiveTime> {
    if caps.name("noon").is_some() {
        NaiveTime::from_hms_opt(12, 0, 0)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
}

fn resolve_bare_period(caps: &Captures<'_>) -> Option<NaiveTime> {
    match caps.name("period")?.as_str() {
        "manha" => NaiveTime::from_hms_opt(9, 0, 0),
        "tarde" => NaiveTime::from_hms_opt(14, 0, 0),
        "noite" => NaiveTime::from_hms_opt(19, 0, 0),
        _ => None,
    }
}
