//! Date resolution: relative and absolute Portuguese date expressions → calendar date.
//!
//! The resolver walks an ordered table of [`DateRule`]s. The first rule with a
//! usable match wins and every other date cue in the message is ignored.
//!
//! # Rules (in priority order)
//!
//! 1. `explicit_numeric` — `15/02`, `15/02/2024`, `15/02/24`
//! 2. `explicit_month_name` — `15 de fevereiro`, `15 de fevereiro de 2025`
//! 3. `weeks_ahead_weekday` — `daqui a 2 domingo`
//! 4. `days_ahead` — `daqui a 3 dias`, `daqui a 2 semanas`
//! 5. `relative_day` — `hoje`, `amanha`, `depois de amanha`
//! 6. `weekday` — `sexta`, `terca-feira`, `proxima segunda`
//!
//! Explicit dates without a year use the anchor's year and roll over to the
//! next year when that would land before the anchor date. A day and month
//! that do not exist in the chosen year (`29/02` outside a leap year) are
//! malformed. Dates that would leave chrono's calendar range never match.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::{Captures, Regex};
use tracing::trace;

use crate::lexicon::{parse_weekday, weekday_alternation};
use crate::normalize::Resolved;

/// Outcome of running the date table over a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateResolution {
    Found(Resolved<NaiveDate>),
    /// An explicit date was written but is not a calendar date (`31/02`, `10/13`).
    Malformed { span: Range<usize>, rule: &'static str },
    NotFound,
}

impl DateResolution {
    /// Whether any date expression was present, valid or not.
    pub fn is_present(&self) -> bool {
        !matches!(self, DateResolution::NotFound)
    }
}

enum RuleOutcome {
    Date(NaiveDate),
    Malformed,
}

struct DateRule {
    name: &'static str,
    pattern: Regex,
    /// `None` means "not applicable here, keep looking".
    resolve: fn(&Captures<'_>, NaiveDate) -> Option<RuleOutcome>,
}

/// Leading words that belong to the date expression ("no dia 15/02", "na sexta").
const CONNECTOR: &str = r"(?:\b(?:no dia|dia|na|no|nesta|neste|para|pra|ate|em)\s+)?";

const MONTHS: &[&str] = &[
    "janeiro",
    "fevereiro",
    "marco",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

static DATE_RULES: LazyLock<Vec<DateRule>> = LazyLock::new(|| {
    let weekdays = weekday_alternation();
    let months = MONTHS.join("|");
    vec![
        DateRule {
            name: "explicit_numeric",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<day>[0-9]{{1,2}})/(?P<month>[0-9]{{1,2}})(?:/(?P<year>[0-9]{{2}}|[0-9]{{4}}))?\b"
            )),
            resolve: resolve_explicit_numeric,
        },
        DateRule {
            name: "explicit_month_name",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<day>[0-9]{{1,2}})\s+de\s+(?P<month>{months})(?:\s+de\s+(?P<year>[0-9]{{4}}))?\b"
            )),
            resolve: resolve_explicit_month_name,
        },
        DateRule {
            name: "weeks_ahead_weekday",
            pattern: compile(&format!(
                r"\bdaqui\s+a\s+(?P<count>[0-9]{{1,3}})\s+(?:(?:no|na)\s+)?(?P<weekday>{weekdays})(?:-feira|\s+feira)?\b"
            )),
            resolve: resolve_weeks_ahead_weekday,
        },
        DateRule {
            name: "days_ahead",
            pattern: compile(r"\bdaqui\s+a\s+(?P<count>[0-9]{1,3})\s+(?P<unit>dias?|semanas?)\b"),
            resolve: resolve_days_ahead,
        },
        DateRule {
            name: "relative_day",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?P<word>depois\s+de\s+amanha|amanha|hoje)\b"
            )),
            resolve: resolve_relative_day,
        },
        DateRule {
            name: "weekday",
            pattern: compile(&format!(
                r"{CONNECTOR}\b(?:(?P<next>proxima|proximo)\s+)?(?P<weekday>{weekdays})(?:-feira|\s+feira)?\b"
            )),
            resolve: resolve_weekday,
        },
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in date pattern must compile")
}

/// Resolve the first date expression in `text` (normalized) relative to `anchor`.
pub fn resolve_date(text: &str, anchor: NaiveDate) -> DateResolution {
    for rule in DATE_RULES.iter() {
        for caps in rule.pattern.captures_iter(text) {
            let Some(outcome) = (rule.resolve)(&caps, anchor) else {
                continue;
            };
            let span = caps.get(0).map_or(0..0, |m| m.range());
            trace!(rule = rule.name, ?span, "date rule matched");
            return match outcome {
                RuleOutcome::Date(value) => DateResolution::Found(Resolved {
                    value,
                    span,
                    rule: rule.name,
                }),
                RuleOutcome::Malformed => DateResolution::Malformed {
                    span,
                    rule: rule.name,
                },
            };
        }
    }
    DateResolution::NotFound
}

/// The nearest date strictly after `from` that falls on `weekday`.
///
/// Never returns `from` itself: asking for "sexta" on a Friday means next week.
/// `None` when the result is past [`NaiveDate::MAX`].
pub fn next_weekday_after(from: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let days_ahead = (weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    from.checked_add_signed(chrono::Duration::days(days_ahead))
}

// ── Table row resolvers ─────────────────────────────────────────────────────

fn capture_number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

fn resolve_explicit_numeric(caps: &Captures<'_>, anchor: NaiveDate) -> Option<RuleOutcome> {
    let day: u32 = capture_number(caps, "day")?;
    let month: u32 = capture_number(caps, "month")?;
    let year = caps.name("year").and_then(|y| {
        let value: i32 = y.as_str().parse().ok()?;
        Some(if y.as_str().len() == 2 { 2000 + value } else { value })
    });
    Some(resolve_day_month(day, month, year, anchor))
}

fn resolve_explicit_month_name(caps: &Captures<'_>, anchor: NaiveDate) -> Option<RuleOutcome> {
    let day: u32 = capture_number(caps, "day")?;
    let month_name = caps.name("month")?.as_str();
    let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let year: Option<i32> = capture_number(caps, "year");
    Some(resolve_day_month(day, month, year, anchor))
}

fn resolve_day_month(day: u32, month: u32, year: Option<i32>, anchor: NaiveDate) -> RuleOutcome {
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return RuleOutcome::Malformed;
    }

    let date = match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => match NaiveDate::from_ymd_opt(anchor.year(), month, day) {
            Some(date) if date < anchor => {
                NaiveDate::from_ymd_opt(anchor.year() + 1, month, day)
            }
            date => date,
        },
    };

    match date {
        Some(date) => RuleOutcome::Date(date),
        None => RuleOutcome::Malformed,
    }
}

fn resolve_weeks_ahead_weekday(caps: &Captures<'_>, anchor: NaiveDate) -> Option<RuleOutcome> {
    let count: u32 = capture_number(caps, "count")?;
    let weekday = parse_weekday(caps.name("weekday")?.as_str())?;
    let base = next_weekday_after(anchor, weekday)?;
    // Any count of two or more lands exactly one week after the base date.
    let date = if count <= 1 {
        base
    } else {
        base.checked_add_signed(chrono::Duration::days(7))?
    };
    Some(RuleOutcome::Date(date))
}

fn resolve_days_ahead(caps: &Captures<'_>, anchor: NaiveDate) -> Option<RuleOutcome> {
    let count: i64 = capture_number(caps, "count")?;
    let days = if caps.name("unit")?.as_str().starts_with("semana") {
        count * 7
    } else {
        count
    };
    anchor
        .checked_add_signed(chrono::Duration::days(days))
        .map(RuleOutcome::Date)
}

fn resolve_relative_day(caps: &Captures<'_>, anchor: NaiveDate) -> Option<RuleOutcome> {
    let word = caps.name("word")?.as_str();
    let days = match word {
        "hoje" => 0,
        "amanha" => 1,
        _ if word.starts_with("depois") => 2,
        _ => return None,
    };
    anchor
        .checked_add_signed(chrono::Duration::days(days))
        .map(RuleOutcome::Date)
}

fn resolve_weekday(caps: &Captures<'_>, anchor: NaiveDate) -> Option<RuleOutcome> {
    let weekday = parse_weekday(caps.name("weekday")?.as_str())?;
    let mut date = next_weekday_after(anchor, weekday)?;
    if caps.name("next").is_some() && anchor.weekday() == weekday {
        date = date.checked_add_signed(chrono::Duration::days(7))?;
    }
    Some(RuleOutcome::Date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday, January 10, 2024.
    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn found(text: &str) -> Resolved<NaiveDate> {
        match resolve_date(text, anchor()) {
            DateResolution::Found(resolved) => resolved,
            other => panic!("expected a date for '{text}', got {other:?}"),
        }
    }

    // ── explicit dates ──────────────────────────────────────────────────

    #[test]
    fn test_explicit_date_with_year() {
        let resolved = found("dentista 15/03/2025");
        assert_eq!(resolved.value, ymd(2025, 3, 15));
        assert_eq!(resolved.rule, "explicit_numeric");
    }

    #[test]
    fn test_explicit_date_two_digit_year() {
        assert_eq!(found("prova 05/06/25").value, ymd(2025, 6, 5));
    }

    #[test]
    fn test_explicit_date_without_year_uses_anchor_year() {
        assert_eq!(found("dentista 20/02").value, ymd(2024, 2, 20));
    }

    #[test]
    fn test_explicit_date_before_anchor_rolls_to_next_year() {
        assert_eq!(found("dentista 05/01").value, ymd(2025, 1, 5));
    }

    #[test]
    fn test_explicit_date_on_anchor_day_stays() {
        assert_eq!(found("dentista 10/01").value, ymd(2024, 1, 10));
    }

    #[test]
    fn test_explicit_leap_day_in_anchor_year() {
        assert_eq!(found("festa 29/02").value, ymd(2024, 2, 29));
    }

    #[test]
    fn test_explicit_leap_day_never_skips_past_next_year() {
        // 29/02/2024 is already past and 2025 has no 29/02.
        assert!(matches!(
            resolve_date("festa 29/02", ymd(2024, 3, 1)),
            DateResolution::Malformed { .. }
        ));
        // 2023 has no 29/02 at all.
        assert!(matches!(
            resolve_date("festa 29/02", ymd(2023, 1, 10)),
            DateResolution::Malformed { .. }
        ));
    }

    #[test]
    fn test_explicit_date_out_of_range_is_malformed() {
        for text in ["dentista 32/01", "dentista 10/13", "dentista 31/04", "dentista 00/05"] {
            assert!(
                matches!(resolve_date(text, anchor()), DateResolution::Malformed { .. }),
                "{text}"
            );
        }
    }

    #[test]
    fn test_explicit_date_consumes_connector() {
        let text = "dentista no dia 20/02 as 10h";
        let resolved = found(text);
        assert_eq!(&text[resolved.span], "no dia 20/02");
    }

    #[test]
    fn test_explicit_month_name() {
        let resolved = found("aniversario 15 de marco");
        assert_eq!(resolved.value, ymd(2024, 3, 15));
        assert_eq!(resolved.rule, "explicit_month_name");
        assert_eq!(found("viagem 2 de janeiro").value, ymd(2025, 1, 2));
        assert_eq!(found("viagem 2 de janeiro de 2026").value, ymd(2026, 1, 2));
    }

    #[test]
    fn test_explicit_month_name_invalid_day() {
        assert!(matches!(
            resolve_date("festa 30 de fevereiro", anchor()),
            DateResolution::Malformed { .. }
        ));
    }

    #[test]
    fn test_explicit_date_wins_over_weekday() {
        assert_eq!(found("sexta 20/02").value, ymd(2024, 2, 20));
    }

    // ── daqui a N ───────────────────────────────────────────────────────

    #[test]
    fn test_weeks_ahead_weekday_one_is_nearest() {
        // Nearest Sunday after Wed Jan 10 is Jan 14.
        assert_eq!(found("daqui a 1 domingo").value, ymd(2024, 1, 14));
    }

    #[test]
    fn test_weeks_ahead_weekday_two_and_three_are_the_same() {
        assert_eq!(found("daqui a 2 domingo").value, ymd(2024, 1, 21));
        assert_eq!(found("daqui a 3 domingo").value, ymd(2024, 1, 21));
        assert_eq!(found("daqui a 10 domingo").value, ymd(2024, 1, 21));
    }

    #[test]
    fn test_weeks_ahead_weekday_same_weekday_as_anchor() {
        // Anchor is Wednesday: base is the following Wednesday.
        assert_eq!(found("daqui a 1 quarta").value, ymd(2024, 1, 17));
        assert_eq!(found("daqui a 2 quarta-feira").value, ymd(2024, 1, 24));
    }

    #[test]
    fn test_days_ahead() {
        assert_eq!(found("daqui a 3 dias").value, ymd(2024, 1, 13));
        assert_eq!(found("daqui a 1 dia").value, ymd(2024, 1, 11));
        assert_eq!(found("daqui a 2 semanas").value, ymd(2024, 1, 24));
    }

    // ── relative days ───────────────────────────────────────────────────

    #[test]
    fn test_relative_days() {
        assert_eq!(found("hoje").value, ymd(2024, 1, 10));
        assert_eq!(found("amanha").value, ymd(2024, 1, 11));
        assert_eq!(found("depois de amanha").value, ymd(2024, 1, 12));
    }

    #[test]
    fn test_depois_de_amanha_span() {
        let text = "dentista depois de amanha as 9h";
        let resolved = found(text);
        assert_eq!(&text[resolved.span], "depois de amanha");
    }

    #[test]
    fn test_amanha_across_month_end() {
        let anchor = ymd(2024, 1, 31);
        match resolve_date("amanha", anchor) {
            DateResolution::Found(resolved) => assert_eq!(resolved.value, ymd(2024, 2, 1)),
            other => panic!("got {other:?}"),
        }
    }

    #[test]
    fn test_da_manha_is_not_amanha() {
        assert_eq!(resolve_date("as 8 da manha", anchor()), DateResolution::NotFound);
    }

    // ── weekdays ────────────────────────────────────────────────────────

    #[test]
    fn test_weekday_upcoming() {
        assert_eq!(found("sexta").value, ymd(2024, 1, 12));
        assert_eq!(found("sabado").value, ymd(2024, 1, 13));
        assert_eq!(found("segunda-feira").value, ymd(2024, 1, 15));
    }

    #[test]
    fn test_weekday_earlier_in_week_rolls_forward() {
        assert_eq!(found("terca-feira").value, ymd(2024, 1, 16));
    }

    #[test]
    fn test_bare_weekday_never_resolves_to_today() {
        assert_eq!(found("quarta").value, ymd(2024, 1, 17));
    }

    #[test]
    fn test_proxima_weekday_other_day() {
        assert_eq!(found("proxima sexta").value, ymd(2024, 1, 12));
    }

    #[test]
    fn test_proxima_weekday_same_day_skips_a_week() {
        assert_eq!(found("proxima quarta").value, ymd(2024, 1, 24));
    }

    #[test]
    fn test_weekday_span_includes_connector() {
        let text = "academia na proxima segunda feira";
        let resolved = found(text);
        assert_eq!(&text[resolved.span], "na proxima segunda feira");
    }

    #[test]
    fn test_weekday_inside_word_does_not_match() {
        assert_eq!(resolve_date("sextavado", anchor()), DateResolution::NotFound);
    }

    // ── priority ────────────────────────────────────────────────────────

    #[test]
    fn test_first_rule_wins_without_blending() {
        // "amanha" outranks "sexta"; no combination of the two cues.
        assert_eq!(found("sexta ou amanha").value, ymd(2024, 1, 11));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(resolve_date("jantar as 20h", anchor()), DateResolution::NotFound);
        assert!(!DateResolution::NotFound.is_present());
    }

    #[test]
    fn test_next_weekday_after_all_days() {
        let from = anchor();
        for (_, weekday) in crate::lexicon::WEEKDAYS {
            let date = next_weekday_after(from, *weekday).unwrap();
            assert_eq!(date.weekday(), *weekday);
            assert!(date > from);
            assert!(date <= from + chrono::Duration::days(7));
        }
    }

    // ── calendar edges ──────────────────────────────────────────────────

    #[test]
    fn test_next_weekday_after_last_date() {
        assert_eq!(next_weekday_after(NaiveDate::MAX, Weekday::Mon), None);
    }

    #[test]
    fn test_relative_dates_past_last_date_do_not_match() {
        for text in [
            "amanha",
            "depois de amanha",
            "sexta",
            "proxima sexta",
            "daqui a 2 domingo",
            "daqui a 3 dias",
        ] {
            assert_eq!(resolve_date(text, NaiveDate::MAX), DateResolution::NotFound, "{text}");
        }
        match resolve_date("hoje", NaiveDate::MAX) {
            DateResolution::Found(resolved) => assert_eq!(resolved.value, NaiveDate::MAX),
            other => panic!("got {other:?}"),
        }
    }
}
