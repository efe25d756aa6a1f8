//! Location resolution: `local: Rua das Flores 10`, `no escritório`, `na sala 3`.
//!
//! Two rules, first match wins:
//!
//! 1. `labelled` — `local:`, `endereco:` or `onde:` followed by everything up
//!    to the next `,` or `;`.
//! 2. `preposition` — `no`, `na`, `nos`, `nas` or `em` followed by a short
//!    clause. Candidates that start with a date or time word (`na sexta`,
//!    `no dia 15/02`, `em 3 dias`), with a word that names a channel or a
//!    manner rather than a place (`no celular`, `em família`), or that overlap
//!    a span another resolver already claimed are skipped.
//!
//! The value is copied from the original message so accents and capitals survive.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::lexicon::take_clause;
use crate::normalize::{NormalizedText, Resolved};

/// Most words copied from a prepositional clause.
const MAX_LOCATION_WORDS: usize = 5;

/// First words of a prepositional clause that never name a place.
const NON_PLACES: &[&str] = &[
    "celular",
    "telefone",
    "fone",
    "whatsapp",
    "whats",
    "zap",
    "email",
    "e-mail",
    "sms",
    "familia",
    "particular",
    "privado",
    "segredo",
    "grupo",
    "horario",
    "prazo",
    "momento",
    "fim",
    "final",
    "inicio",
    "caso",
    "mesmo",
    "mesma",
];

static LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:local|endereco|onde)\s*:\s*(?P<place>[^,;]+)")
        .expect("labelled location regex must compile")
});

static PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:no|na|nos|nas|em)\s+(?P<place>\S)")
        .expect("prepositional location regex must compile")
});

/// Resolve the location of `text`. `claimed` lists normalized spans already
/// taken by the date and time resolvers.
pub fn resolve_location(
    text: &NormalizedText<'_>,
    claimed: &[Range<usize>],
) -> Option<Resolved<String>> {
    labelled(text).or_else(|| prepositional(text, claimed))
}

fn labelled(text: &NormalizedText<'_>) -> Option<Resolved<String>> {
    let normalized = text.as_str();
    let caps = LABELLED.captures(normalized)?;
    let place = caps.name("place")?;

    let trimmed = place
        .as_str()
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '!' | '?'));
    if trimmed.trim().is_empty() {
        return None;
    }
    let span = caps.get(0)?.start()..place.start() + trimmed.len();
    let value = tidy(text.original_slice(place.start()..place.start() + trimmed.len()));
    trace!(rule = "labelled", ?span, "location rule matched");

    Some(Resolved {
        value,
        span,
        rule: "labelled",
    })
}

fn prepositional(text: &NormalizedText<'_>, claimed: &[Range<usize>]) -> Option<Resolved<String>> {
    let normalized = text.as_str();

    PREPOSITION.captures_iter(normalized).find_map(|caps| {
        let whole = caps.get(0)?;
        let place = caps.name("place")?;
        if place.as_str().starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }

        let clause = take_clause(normalized, place.start(), MAX_LOCATION_WORDS)?;
        if names_non_place(&normalized[clause.clone()]) {
            return None;
        }
        let span = whole.start()..clause.end;
        if claimed.iter().any(|c| overlaps(c, &span)) {
            return None;
        }

        let value = tidy(text.original_slice(clause));
        trace!(rule = "preposition", ?span, "location rule matched");
        Some(Resolved {
            value,
            span,
            rule: "preposition",
        })
    })
}

fn names_non_place(clause: &str) -> bool {
    clause
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .next()
        .is_some_and(|first| NON_PLACES.contains(&first))
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn tidy(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
