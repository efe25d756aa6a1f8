//! Event assembly: normalize, run the resolvers, validate, build the record.
//!
//! Validation order for a message:
//!
//! 1. No date, no time and no trigger word → [`ParseError::NoEventKeywordFound`]
//! 2. An explicit date that is not a calendar date → [`ParseError::InvalidExplicitDate`]
//! 3. No usable date → [`ParseError::NoDateExpressionFound`] (unless
//!    [`ParseOptions::time_only_uses_anchor_date`] is set and a time was found).
//!    A date whose event would fall outside chrono's calendar is not usable.
//! 4. Otherwise a [`ParsedEvent`] starting at the resolved date and time
//!    (default [`DEFAULT_TIME`]) and lasting [`DEFAULT_DURATION`](crate::event::DEFAULT_DURATION).

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::date::{resolve_date, DateResolution};
use crate::error::{ConfigError, ParseError, Result};
use crate::event::{AnchorContext, ParsedEvent};
use crate::lexicon::contains_trigger_word;
use crate::location::resolve_location;
use crate::normalize::NormalizedText;
use crate::time::{resolve_time, DEFAULT_TIME};
use crate::title::{CategorySpec, TitleTable};

/// Options for building a [`Parser`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Accept messages with a time but no date, scheduling them on the
    /// anchor's own date. Off by default.
    pub time_only_uses_anchor_date: bool,
    /// Categories checked before the built-in table.
    pub extra_categories: Vec<CategorySpec>,
}

/// A configured parser. Immutable and shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
    titles: TitleTable,
}

static DEFAULT_PARSER: LazyLock<Parser> = LazyLock::new(Parser::default);

/// Parse `text` with the default options.
///
/// ```
/// use agenda_core::{parse, AnchorContext};
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();
/// let anchor = AnchorContext::in_default_timezone(now);
///
/// let event = parse("reunião com João amanhã às 15h", &anchor).unwrap();
/// assert_eq!(event.title(), "Reunião com João");
/// assert_eq!(event.start().to_rfc3339(), "2024-01-11T15:00:00-03:00");
/// ```
pub fn parse(text: &str, anchor: &AnchorContext) -> Result<ParsedEvent> {
    DEFAULT_PARSER.parse(text, anchor)
}

impl Parser {
    /// Compile `options` into a parser. Fails if an extra category is invalid.
    pub fn new(options: ParseOptions) -> std::result::Result<Self, ConfigError> {
        let titles = TitleTable::with_extra(&options.extra_categories)?;
        Ok(Self { options, titles })
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Turn one message into an event, or explain why it is not one.
    pub fn parse(&self, text: &str, anchor: &AnchorContext) -> Result<ParsedEvent> {
        trace!(text, "parsing message");
        let normalized = NormalizedText::new(text);
        let result = self.assemble(&normalized, anchor);
        if let Err(err) = &result {
            debug!(reason = err.code(), "message rejected");
        }
        result
    }

    fn assemble(
        &self,
        text: &NormalizedText<'_>,
        anchor: &AnchorContext,
    ) -> Result<ParsedEvent> {
        let today = anchor.local_date();
        let date = resolve_date(text.as_str(), today);
        let time = resolve_time(text.as_str());

        if !date.is_present() && time.is_none() && !contains_trigger_word(text.as_str()) {
            return Err(ParseError::NoEventKeywordFound);
        }

        let (day, date_rule, date_span) = match date {
            DateResolution::Found(found) => (found.value, found.rule, Some(found.span)),
            DateResolution::Malformed { .. } => return Err(ParseError::InvalidExplicitDate),
            DateResolution::NotFound if time.is_some() && self.options.time_only_uses_anchor_date => {
                (today, "anchor_date", None)
            }
            DateResolution::NotFound => return Err(ParseError::NoDateExpressionFound),
        };

        let mut consumed: Vec<_> = date_span
            .into_iter()
            .chain(time.as_ref().map(|t| t.span.clone()))
            .collect();
        let location = resolve_location(text, &consumed);
        consumed.extend(location.as_ref().map(|l| l.span.clone()));

        let title = self.titles.resolve(text, &consumed);
        let start = anchor
            .localize(day, time.as_ref().map_or(DEFAULT_TIME, |t| t.value))
            .ok_or(ParseError::NoDateExpressionFound)?;

        debug!(
            date_rule,
            time_rule = time.as_ref().map_or("default", |t| t.rule),
            title_source = ?title.source,
            has_location = location.is_some(),
            "message parsed"
        );

        ParsedEvent::new(title.title, start, location.map(|l| l.value), text.original())
            .ok_or(ParseError::NoDateExpressionFound)
    }
}
