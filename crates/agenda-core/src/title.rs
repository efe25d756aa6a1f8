//! Title resolution: category table first, cleaned-up text second, `"Evento"` last.
//!
//! Categories are checked top to bottom; the first one whose keyword occurs as
//! a whole word in the normalized text wins. When its complement pattern also
//! matches, the captured clause (copied from the original text, so accents and
//! capitals survive) is substituted into the template: `"reunião com João"` →
//! `"Reunião com João"`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lexicon::take_clause;
use crate::normalize::{normalize, NormalizedText};

/// Longest title handed to collaborators, in characters.
pub const MAX_TITLE_CHARS: usize = 60;

/// Title used when neither a category nor the leftover text is usable.
pub const FALLBACK_TITLE: &str = "Evento";

/// Leftover text must be within this many characters to become a title.
const LEFTOVER_CHARS: std::ops::RangeInclusive<usize> = 3..=50;

/// Most words copied into a complement ("Dr. João da Silva").
const MAX_COMPLEMENT_WORDS: usize = 4;

/// A category as plain data, suitable for loading from JSON.
///
/// Keywords may carry accents; they are normalized on compile. Complement
/// patterns run against the normalized text and must capture a named group
/// `obj` marking where the copied clause starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub keywords: Vec<String>,
    pub title: String,
    #[serde(default)]
    pub complement: Option<ComplementSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplementSpec {
    pub pattern: String,
    /// Title template with a single `{}` placeholder.
    pub template: String,
}

/// Where a resolved title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleSource {
    Category,
    Leftover,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    pub title: String,
    pub source: TitleSource,
}

#[derive(Debug, Clone)]
struct Category {
    title: String,
    keywords: Regex,
    complement: Option<Complement>,
}

#[derive(Debug, Clone)]
struct Complement {
    pattern: Regex,
    template: String,
}

impl Category {
    fn compile(spec: &CategorySpec) -> Result<Self, ConfigError> {
        if spec.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        let keywords: Vec<String> = spec
            .keywords
            .iter()
            .map(|k| normalize(k.trim()))
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(&k))
            .collect();
        if keywords.is_empty() {
            return Err(ConfigError::EmptyKeywords(spec.title.clone()));
        }
        let keywords = Regex::new(&format!(r"\b(?:{})\b", keywords.join("|"))).map_err(
            |source| ConfigError::InvalidPattern {
                title: spec.title.clone(),
                source,
            },
        )?;

        let complement = spec
            .complement
            .as_ref()
            .map(|c| Complement::compile(&spec.title, c))
            .transpose()?;

        Ok(Self {
            title: spec.title.clone(),
            keywords,
            complement,
        })
    }
}

impl Complement {
    fn compile(title: &str, spec: &ComplementSpec) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&spec.pattern).map_err(|source| ConfigError::InvalidPattern {
            title: title.to_string(),
            source,
        })?;
        if !pattern.capture_names().any(|name| name == Some("obj")) {
            return Err(ConfigError::MissingObjectGroup(title.to_string()));
        }
        if !spec.template.contains("{}") {
            return Err(ConfigError::MissingPlaceholder(title.to_string()));
        }
        Ok(Self {
            pattern,
            template: spec.template.clone(),
        })
    }

    /// The template filled with the first non-empty clause the pattern finds.
    fn fill(&self, text: &NormalizedText<'_>) -> Option<String> {
        let normalized = text.as_str();
        self.pattern.captures_iter(normalized).find_map(|caps| {
            let start = caps.name("obj")?.start();
            let clause = take_clause(normalized, start, MAX_COMPLEMENT_WORDS)?;
            let object = collapse_whitespace(text.original_slice(clause));
            Some(self.template.replacen("{}", &object, 1))
        })
    }
}

/// `(keywords, canonical title, optional (complement pattern, template))`.
type BuiltinRow = (
    &'static [&'static str],
    &'static str,
    Option<(&'static str, &'static str)>,
);

const BUILTIN_CATEGORIES: &[BuiltinRow] = &[
    (&["comprar"], "Compras", Some((r"\bcomprar\s+(?P<obj>\S)", "Comprar {}"))),
    (&["pagar"], "Pagamento", Some((r"\bpagar\s+(?P<obj>\S)", "Pagar {}"))),
    (
        &["ligar", "ligacao"],
        "Ligação",
        Some((r"\bligar\s+(?:para|pra)\s+(?P<obj>\S)", "Ligar para {}")),
    ),
    (
        &["reuniao", "reunir"],
        "Reunião",
        Some((r"\bcom\s+(?P<obj>\S)", "Reunião com {}")),
    ),
    (
        &["consulta"],
        "Consulta",
        Some((
            r"\bcom\s+(?:dra?|doutora?)\b\.?\s+(?P<obj>\S)",
            "Consulta - {}",
        )),
    ),
    (&["dentista"], "Dentista", None),
    (
        &["exame"],
        "Exame",
        Some((r"\bexame\s+de\s+(?P<obj>\S)", "Exame de {}")),
    ),
    (&["jantar"], "Jantar", None),
    (&["almoco"], "Almoço", None),
    (&["cafe"], "Café", Some((r"\bcom\s+(?P<obj>\S)", "Café com {}"))),
    (
        &["aniversario"],
        "Aniversário",
        Some((r"\baniversario\s+(?P<obj>(?:de|da|do)\s)", "Aniversário {}")),
    ),
    (
        &["aula"],
        "Aula",
        Some((r"\baula\s+(?P<obj>(?:de|da|do)\s)", "Aula {}")),
    ),
    (&["academia", "treino", "malhar"], "Academia", None),
    (&["entrevista"], "Entrevista", None),
    (&["medico"], "Médico", None),
    (
        &["lembrar", "lembre", "lembrete"],
        "Lembrete",
        Some((
            r"\b(?:lembr(?:ar|e)(?:-me|\s+me)?(?:\s+de)?|lembrete:?)\s+(?P<obj>\S)",
            "{}",
        )),
    ),
];

static BUILTIN: LazyLock<Vec<Category>> = LazyLock::new(|| {
    BUILTIN_CATEGORIES
        .iter()
        .map(|(keywords, title, complement)| {
            let spec = CategorySpec {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                title: title.to_string(),
                complement: complement.map(|(pattern, template)| ComplementSpec {
                    pattern: pattern.to_string(),
                    template: template.to_string(),
                }),
            };
            Category::compile(&spec).expect("built-in category must compile")
        })
        .collect()
});

/// Ordered category table.
#[derive(Debug, Clone)]
pub struct TitleTable {
    categories: Vec<Category>,
}

impl Default for TitleTable {
    fn default() -> Self {
        Self {
            categories: BUILTIN.clone(),
        }
    }
}

impl TitleTable {
    /// The built-in table preceded by `extra` categories, in the given order.
    pub fn with_extra(extra: &[CategorySpec]) -> Result<Self, ConfigError> {
        let mut categories = extra
            .iter()
            .map(Category::compile)
            .collect::<Result<Vec<_>, _>>()?;
        categories.extend(BUILTIN.iter().cloned());
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Resolve the title of `text`. `consumed` lists normalized spans already
    /// claimed by the other resolvers; they are cut out before the leftover
    /// text is considered.
    pub fn resolve(&self, text: &NormalizedText<'_>, consumed: &[Range<usize>]) -> ResolvedTitle {
        let normalized = text.as_str();

        if let Some(category) = self
            .categories
            .iter()
            .find(|c| c.keywords.is_match(normalized))
        {
            let title = category
                .complement
                .as_ref()
                .and_then(|complement| complement.fill(text))
                .unwrap_or_else(|| category.title.clone());
            return ResolvedTitle {
                title: clamp_title(&capitalize_first(&title)),
                source: TitleSource::Category,
            };
        }

        match leftover_title(text, consumed) {
            Some(title) => ResolvedTitle {
                title,
                source: TitleSource::Leftover,
            },
            None => ResolvedTitle {
                title: FALLBACK_TITLE.to_string(),
                source: TitleSource::Fallback,
            },
        }
    }
}

/// The original text minus the consumed spans, if it has a usable length.
fn leftover_title(text: &NormalizedText<'_>, consumed: &[Range<usize>]) -> Option<String> {
    let original = text.original();
    let mut cuts: Vec<Range<usize>> = consumed
        .iter()
        .map(|span| text.original_span(span.clone()))
        .collect();
    cuts.sort_by_key(|span| span.start);

    let mut remainder = String::with_capacity(original.len());
    let mut cursor = 0;
    for cut in cuts {
        if cut.start > cursor {
            remainder.push_str(&original[cursor..cut.start]);
            remainder.push(' ');
        }
        cursor = cursor.max(cut.end);
    }
    remainder.push_str(&original[cursor.min(original.len())..]);

    let remainder = collapse_whitespace(&remainder);
    let remainder = remainder
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '-' | '!' | '?'));

    LEFTOVER_CHARS
        .contains(&remainder.chars().count())
        .then(|| capitalize_first(remainder))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cut to [`MAX_TITLE_CHARS`], preferring the last word boundary.
fn clamp_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let cut: String = title.chars().take(MAX_TITLE_CHARS).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(at) if at > 0 => &cut[..at],
        _ => cut.as_str(),
    };
    cut.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(text: &str) -> String {
        let normalized = NormalizedText::new(text);
        TitleTable::default().resolve(&normalized, &[]).title
    }

    /// Spans of each `needle` in the normalized form of `text`.
    fn spans(text: &NormalizedText<'_>, needles: &[&str]) -> Vec<Range<usize>> {
        needles
            .iter()
            .map(|needle| {
                let start = text.as_str().find(needle).unwrap();
                start..start + needle.len()
            })
            .collect()
    }

    #[test]
    fn test_reuniao_with_person() {
        assert_eq!(title_of("reunião com João amanhã às 15h"), "Reunião com João");
        assert_eq!(title_of("Reuniao com Maria Silva sexta"), "Reunião com Maria Silva");
    }

    #[test]
    fn test_reuniao_without_person() {
        assert_eq!(title_of("reunião amanhã às 15h"), "Reunião");
    }

    #[test]
    fn test_comprar() {
        assert_eq!(title_of("lembrar de comprar leite sexta às 10h"), "Comprar leite");
        assert_eq!(title_of("comprar pão na padaria amanhã"), "Comprar pão");
    }

    #[test]
    fn test_consulta() {
        assert_eq!(title_of("consulta médica terça-feira 9h"), "Consulta");
        assert_eq!(title_of("consulta com Dr. Silva amanhã"), "Consulta - Silva");
        assert_eq!(title_of("consulta com doutor Paulo amanhã"), "Consulta - Paulo");
        assert_eq!(title_of("consulta com dra Helena sexta 14h"), "Consulta - Helena");
        assert_eq!(title_of("consulta com dentista amanhã"), "Consulta");
    }

    #[test]
    fn test_jantar_is_plain() {
        assert_eq!(title_of("jantar com Ana sexta 20h"), "Jantar");
    }

    #[test]
    fn test_aniversario_keeps_connector() {
        assert_eq!(title_of("aniversário da Ana sábado"), "Aniversário da Ana");
    }

    #[test]
    fn test_ligar_para() {
        assert_eq!(title_of("ligar para mãe amanhã 18h"), "Ligar para mãe");
        assert_eq!(title_of("ligação importante hoje"), "Ligação");
    }

    #[test]
    fn test_generic_lembrete() {
        assert_eq!(title_of("lembrar de tomar remédio amanhã 8h"), "Tomar remédio");
        assert_eq!(
            title_of("lembre-me de regar as plantas hoje"),
            "Regar as plantas"
        );
        assert_eq!(title_of("lembrete hoje"), "Lembrete");
    }

    #[test]
    fn test_table_order_first_match_wins() {
        // "comprar" sits above "aniversario".
        assert_eq!(
            title_of("comprar presente aniversário amanhã"),
            "Comprar presente aniversário"
        );
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        let normalized = NormalizedText::new("aulas de canto hoje");
        let title = TitleTable::default().resolve(&normalized, &[]);
        assert_ne!(title.source, TitleSource::Category);
    }

    #[test]
    fn test_leftover_strips_consumed_spans() {
        let text = NormalizedText::new("Levar carro na oficina amanhã às 8h");
        let consumed = spans(&text, &["na oficina", "amanha", "as 8h"]);
        let title = TitleTable::default().resolve(&text, &consumed);
        assert_eq!(title.title, "Levar carro");
        assert_eq!(title.source, TitleSource::Leftover);
    }

    #[test]
    fn test_leftover_capitalizes() {
        let text = NormalizedText::new("buscar as crianças amanhã");
        let consumed = spans(&text, &["amanha"]);
        assert_eq!(
            TitleTable::default().resolve(&text, &consumed).title,
            "Buscar as crianças"
        );
    }

    #[test]
    fn test_leftover_too_short_uses_fallback() {
        let text = NormalizedText::new("ok amanhã");
        let consumed = spans(&text, &["amanha"]);
        let title = TitleTable::default().resolve(&text, &consumed);
        assert_eq!(title.title, FALLBACK_TITLE);
        assert_eq!(title.source, TitleSource::Fallback);
    }

    #[test]
    fn test_leftover_too_long_uses_fallback() {
        let long = "x".repeat(51);
        let text = NormalizedText::new(&long);
        assert_eq!(TitleTable::default().resolve(&text, &[]).title, FALLBACK_TITLE);
    }

    #[test]
    fn test_title_clamped_to_sixty_chars() {
        let name = "Bartolomeu ".repeat(3);
        let text = format!("reunião com {name}{}", "a".repeat(40));
        let title = title_of(&text);
        assert!(title.chars().count() <= MAX_TITLE_CHARS, "{title}");
        assert!(title.starts_with("Reunião com Bartolomeu"));
    }

    #[test]
    fn test_clamp_title_on_word_boundary() {
        let title = format!("{} fim", "palavra ".repeat(8));
        let clamped = clamp_title(&title);
        assert!(clamped.chars().count() <= MAX_TITLE_CHARS);
        assert!(clamped.ends_with("palavra"));
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("ébano"), "Ébano");
        assert_eq!(capitalize_first(""), "");
    }

    // ── extra categories ────────────────────────────────────────────────

    #[test]
    fn test_extra_category_precedes_builtin() {
        let extra = vec![CategorySpec {
            keywords: vec!["Reunião de Pais".to_string()],
            title: "Reunião escolar".to_string(),
            complement: None,
        }];
        let table = TitleTable::with_extra(&extra).unwrap();
        assert_eq!(table.len(), BUILTIN_CATEGORIES.len() + 1);

        let text = NormalizedText::new("reunião de pais sexta");
        assert_eq!(table.resolve(&text, &[]).title, "Reunião escolar");
    }

    #[test]
    fn test_extra_category_with_complement() {
        let extra = vec![CategorySpec {
            keywords: vec!["corte".to_string()],
            title: "Cabelo".to_string(),
            complement: Some(ComplementSpec {
                pattern: r"\bcom\s+(?P<obj>\S)".to_string(),
                template: "Cabelo com {}".to_string(),
            }),
        }];
        let table = TitleTable::with_extra(&extra).unwrap();
        let text = NormalizedText::new("corte com Zé amanhã");
        assert_eq!(table.resolve(&text, &[]).title, "Cabelo com Zé");
    }

    #[test]
    fn test_extra_category_rejects_bad_specs() {
        let no_title = CategorySpec {
            keywords: vec!["x".to_string()],
            title: " ".to_string(),
            complement: None,
        };
        assert!(matches!(
            TitleTable::with_extra(&[no_title]),
            Err(ConfigError::EmptyTitle)
        ));

        let no_keywords = CategorySpec {
            keywords: vec!["  ".to_string()],
            title: "Vazio".to_string(),
            complement: None,
        };
        assert!(matches!(
            TitleTable::with_extra(&[no_keywords]),
            Err(ConfigError::EmptyKeywords(_))
        ));

        let bad_regex = CategorySpec {
            keywords: vec!["x".to_string()],
            title: "X".to_string(),
            complement: Some(ComplementSpec {
                pattern: "(".to_string(),
                template: "{}".to_string(),
            }),
        };
        assert!(matches!(
            TitleTable::with_extra(&[bad_regex]),
            Err(ConfigError::InvalidPattern { .. })
        ));

        let no_group = CategorySpec {
            keywords: vec!["x".to_string()],
            title: "X".to_string(),
            complement: Some(ComplementSpec {
                pattern: r"\bcom\s+(\S)".to_string(),
                template: "{}".to_string(),
            }),
        };
        assert!(matches!(
            TitleTable::with_extra(&[no_group]),
            Err(ConfigError::MissingObjectGroup(_))
        ));

        let no_placeholder = CategorySpec {
            keywords: vec!["x".to_string()],
            title: "X".to_string(),
            complement: Some(ComplementSpec {
                pattern: r"\bcom\s+(?P<obj>\S)".to_string(),
                template: "X".to_string(),
            }),
        };
        assert!(matches!(
            TitleTable::with_extra(&[no_placeholder]),
            Err(ConfigError::MissingPlaceholder(_))
        ));
    }

    #[test]
    fn test_category_spec_from_json() {
        let json = r#"{"keywords": ["yoga"], "title": "Yoga"}"#;
        let spec: CategorySpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.complement, None);
        let table = TitleTable::with_extra(&[spec]).unwrap();
        let text = NormalizedText::new("yoga amanhã 7h");
        assert_eq!(table.resolve(&text, &[]).title, "Yoga");
    }
}
