//! # agenda-core
//!
//! Deterministic extraction of calendar events from Portuguese chat messages.
//!
//! A message such as `"reunião com João amanhã às 15h"` plus an explicit
//! [`AnchorContext`] (the instant it was received and the working timezone)
//! becomes a [`ParsedEvent`] with a title, a start and end instant, an optional
//! location and the raw text. Messages that do not describe an event yield a
//! [`ParseError`] instead. Parsing never reads a clock, never performs I/O and
//! holds no mutable state, so it is safe to call from any number of threads.
//!
//! ## Modules
//!
//! - [`normalize`] — Case folding and diacritic stripping, with a map back to the original text
//! - [`lexicon`] — Weekday names, trigger words, clause boundaries
//! - [`date`] — Date expressions (`15/02`, `amanhã`, `próxima sexta`, `daqui a 2 domingo`) → calendar date
//! - [`time`] — Clock expressions (`15h30`, `10:30`, `3pm`, `8 da noite`) → wall-clock time
//! - [`title`] — Category table and leftover-text title
//! - [`location`] — `no escritório`, `local: Rua X` → location string
//! - [`event`] — [`AnchorContext`] and [`ParsedEvent`]
//! - [`parser`] — [`Parser`], [`ParseOptions`] and the validation order
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use agenda_core::{parse, AnchorContext, ParseError};
//! use chrono::{TimeZone, Utc};
//!
//! // Wednesday 2024-01-10, 12:00 in São Paulo.
//! let now = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();
//! let anchor = AnchorContext::new(now, "America/Sao_Paulo").unwrap();
//!
//! let event = parse("lembrar de comprar leite sexta às 10h", &anchor).unwrap();
//! assert_eq!(event.title(), "Comprar leite");
//! assert_eq!(event.start().to_rfc3339(), "2024-01-12T10:00:00-03:00");
//! assert_eq!(event.end().to_rfc3339(), "2024-01-12T11:00:00-03:00");
//!
//! assert_eq!(
//!     parse("evento sem data nem hora", &anchor),
//!     Err(ParseError::NoEventKeywordFound)
//! );
//! ```

pub mod date;
pub mod error;
pub mod event;
pub mod lexicon;
pub mod location;
pub mod normalize;
pub mod parser;
pub mod time;
pub mod title;

pub use error::{AnchorError, ConfigError, ParseError};
pub use event::{AnchorContext, ParsedEvent, DEFAULT_DURATION, DEFAULT_TIMEZONE};
pub use normalize::normalize;
pub use parser::{parse, ParseOptions, Parser};
pub use time::DEFAULT_TIME;
pub use title::{CategorySpec, ComplementSpec, FALLBACK_TITLE, MAX_TITLE_CHARS};
