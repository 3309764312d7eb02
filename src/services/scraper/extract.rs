use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, AppResult};
use crate::models::{MovieRecord, NOT_AVAILABLE};

/// How a field's value is read off a matched element
#[derive(Clone, Copy, Debug)]
pub enum ExtractMode {
    /// Concatenated text content, whitespace-collapsed
    Text,
    /// A named attribute of the element
    Attribute(&'static str),
}

/// How many elements a field expects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// First match only; an absent match degrades to [`NOT_AVAILABLE`]
    Single,
    /// Every match, in document order
    List,
}

/// One field of the detail-page schema
pub struct FieldSpec {
    pub name: &'static str,
    pub selector: &'static str,
    pub mode: ExtractMode,
    pub arity: Arity,
}

const MOVIE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        selector: r#"div[class="title_wrapper"] > h1"#,
        mode: ExtractMode::Text,
        arity: Arity::Single,
    },
    FieldSpec {
        name: "rating",
        selector: r#"span[itemprop="ratingValue"]"#,
        mode: ExtractMode::Text,
        arity: Arity::Single,
    },
    FieldSpec {
        name: "rating_count",
        selector: r#"span[itemprop="ratingCount"]"#,
        mode: ExtractMode::Text,
        arity: Arity::Single,
    },
    FieldSpec {
        name: "poster_url",
        selector: r#"div[class="poster"] > a > img"#,
        mode: ExtractMode::Attribute("src"),
        arity: Arity::Single,
    },
    FieldSpec {
        name: "summary",
        selector: r#"div[class="summary_text"]"#,
        mode: ExtractMode::Text,
        arity: Arity::Single,
    },
    FieldSpec {
        name: "director",
        selector: r#"div[class="credit_summary_item"] > a"#,
        mode: ExtractMode::Text,
        arity: Arity::Single,
    },
    FieldSpec {
        name: "cast_photos",
        selector: r#"td[class="primary_photo"] > a > img"#,
        mode: ExtractMode::Attribute("loadlate"),
        arity: Arity::List,
    },
    FieldSpec {
        name: "cast_roles",
        selector: r#"td[class="character"]"#,
        mode: ExtractMode::Text,
        arity: Arity::List,
    },
    FieldSpec {
        name: "cast_names",
        selector: "td:nth-child(2) > a",
        mode: ExtractMode::Text,
        arity: Arity::List,
    },
];

/// Declarative description of the fields read off a movie detail page
///
/// Extraction runs against a captured DOM snapshot rather than live page
/// handles, so the schema can be exercised without a browser.
pub struct ExtractionSchema {
    fields: &'static [FieldSpec],
}

impl ExtractionSchema {
    /// Schema covering the movie detail page
    pub fn movie_details() -> Self {
        Self {
            fields: MOVIE_FIELDS,
        }
    }

    /// Applies the schema to an HTML snapshot.
    ///
    /// Absent scalar fields degrade to [`NOT_AVAILABLE`]; list elements
    /// missing the requested attribute are skipped, so each list holds only
    /// the values actually present.
    pub fn extract(&self, html: &str) -> AppResult<MovieRecord> {
        let document = Html::parse_document(html);
        let mut extracted = ExtractedFields::default();

        for field in self.fields {
            let selector = Selector::parse(field.selector).map_err(|e| {
                AppError::Internal(format!("invalid selector '{}': {}", field.selector, e))
            })?;

            match field.arity {
                Arity::Single => {
                    let value = document
                        .select(&selector)
                        .next()
                        .and_then(|element| extract_value(&element, field.mode));
                    extracted.scalars.push((field.name, value));
                }
                Arity::List => {
                    let values = document
                        .select(&selector)
                        .filter_map(|element| extract_value(&element, field.mode))
                        .collect();
                    extracted.lists.push((field.name, values));
                }
            }
        }

        Ok(extracted.into_record())
    }
}

/// Field values pulled off a snapshot, keyed by schema field name
#[derive(Default)]
struct ExtractedFields {
    scalars: Vec<(&'static str, Option<String>)>,
    lists: Vec<(&'static str, Vec<String>)>,
}

impl ExtractedFields {
    fn scalar(&self, name: &str) -> String {
        self.scalars
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    fn take_list(&mut self, name: &str) -> Vec<String> {
        self.lists
            .iter_mut()
            .find(|(field, _)| *field == name)
            .map(|(_, values)| std::mem::take(values))
            .unwrap_or_default()
    }

    fn into_record(mut self) -> MovieRecord {
        MovieRecord {
            title: self.scalar("title"),
            rating: self.scalar("rating"),
            rating_count: self.scalar("rating_count"),
            poster_url: self.scalar("poster_url"),
            summary: self.scalar("summary"),
            director: self.scalar("director"),
            cast_photos: self.take_list("cast_photos"),
            cast_roles: self.take_list("cast_roles"),
            cast_names: self.take_list("cast_names"),
        }
    }
}

fn extract_value(element: &ElementRef<'_>, mode: ExtractMode) -> Option<String> {
    let value = match mode {
        ExtractMode::Text => {
            let text = element.text().collect::<String>();
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        }
        ExtractMode::Attribute(name) => element.value().attr(name)?.to_string(),
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
