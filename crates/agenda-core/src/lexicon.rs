//! Read-only Portuguese word tables shared by the resolvers.
//!
//! Every entry is written in normalized form (lowercase, no diacritics).

use std::ops::Range;
use std::sync::LazyLock;

use chrono::Weekday;
use regex::Regex;

/// Weekday names as they appear after normalization.
pub const WEEKDAYS: &[(&str, Weekday)] = &[
    ("domingo", Weekday::Sun),
    ("segunda", Weekday::Mon),
    ("terca", Weekday::Tue),
    ("quarta", Weekday::Wed),
    ("quinta", Weekday::Thu),
    ("sexta", Weekday::Fri),
    ("sabado", Weekday::Sat),
];

/// Words that make a message look like a scheduling request even when no date
/// or time was found. Weekday names are trigger words too.
pub const TRIGGER_WORDS: &[&str] = &[
    "agendar",
    "marcar",
    "lembrar",
    "lembre",
    "lembrete",
    "reuniao",
    "compromisso",
    "hoje",
    "amanha",
];

/// Words that end a captured clause (title complement or location).
const BOUNDARY_WORDS: &[&str] = &[
    "na", "no", "nas", "nos", "em", "com", "hoje", "amanha", "depois", "daqui", "proxima",
    "proximo", "proximas", "proximos", "dia", "semana", "meio", "meia", "meio-dia",
    "meia-noite",
];

/// "as" is both the article and "às"; it only ends a clause before a time.
const TIME_CONNECTORS: &[&str] = &["as", "pelas", "ao"];

/// Tokens shaped like a clock time or a numeric date: `15h`, `15h30`, `10:30`,
/// `10am`, `15/02`.
static TIME_OR_DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,2}(?:h(?:rs?|s)?[0-9]{0,2}|:[0-9]{2}|\s?[ap]m|/[0-9]{1,2}(?:/[0-9]{2,4})?)$")
        .expect("time/date token regex must compile")
});

/// Regex alternation of every weekday name, longest first.
pub fn weekday_alternation() -> String {
    let mut names: Vec<&str> = WEEKDAYS.iter().map(|(name, _)| *name).collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    names.join("|")
}

/// Look up a normalized weekday name.
pub fn parse_weekday(word: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, weekday)| *weekday)
}

/// Whether `word` appears as a whole word among the trigger words or weekdays.
pub fn is_trigger_word(word: &str) -> bool {
    TRIGGER_WORDS.contains(&word) || parse_weekday(word).is_some()
}

/// Whether a normalized text contains any trigger word.
pub fn contains_trigger_word(text: &str) -> bool {
    words(text).any(|(_, word)| is_trigger_word(bare(word)))
}

/// Whether `word` terminates a clause. `next` is the word that follows it.
pub fn is_boundary_word(word: &str, next: Option<&str>) -> bool {
    let bare = bare(word);
    if bare.is_empty() {
        return false;
    }
    if TIME_CONNECTORS.contains(&bare) {
        return next.map(self::bare).is_some_and(|next| {
            next.starts_with(|c: char| c.is_ascii_digit())
                || next.starts_with("meio")
                || next.starts_with("meia")
        });
    }
    BOUNDARY_WORDS.contains(&bare)
        || parse_weekday(bare.split('-').next().unwrap_or(bare)).is_some()
        || TIME_OR_DATE_TOKEN.is_match(bare)
}

/// Split `text` into whitespace-separated words with their byte offsets.
pub fn words(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_whitespace().map(move |word| {
        let offset = word.as_ptr() as usize - text.as_ptr() as usize;
        (offset, word)
    })
}

/// Strip surrounding punctuation from a word.
fn bare(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != ':' && c != '/')
        .trim_end_matches([':', '/'])
}

/// Span of the clause that starts at byte `start` of `text`: up to `max_words`
/// words, stopping before the first boundary word. Trailing punctuation is
/// left out of the span. Returns `None` when the clause would be empty.
pub fn take_clause(text: &str, start: usize, max_words: usize) -> Option<Range<usize>> {
    let rest = text.get(start..)?;
    let words: Vec<(usize, &str)> = words(rest).take(max_words + 1).collect();
    let mut end = start;

    for (index, (offset, word)) in words.iter().enumerate() {
        let next = words.get(index + 1).map(|(_, next)| *next);
        if index == max_words || is_boundary_word(word, next) {
            break;
        }
        end = start + offset + word.len();
        if word.ends_with([',', ';', '!', '?']) {
            break;
        }
    }

    let clause = text[start..end].trim_end_matches(|c: char| !c.is_alphanumeric());
    let end = start + clause.len();
    (end > start).then_some(start..end)
}
