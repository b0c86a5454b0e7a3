use super::body::{FootnoteMode, StatementBody};
use crate::parsing::error::ParserError;
use crate::parsing::utils::{TABLE_SELECTOR, TR_SELECTOR, collect_text, normalize_marker, row_cells};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

static FOOTNOTE_TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table.outerFootnotes").expect("valid footnote table selector")
});

/// Marker symbol → footnote text, read from the document's footnote table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FootnoteIndex {
    entries: HashMap<String, String>,
}

impl FootnoteIndex {
    pub fn from_document(document: &Html) -> Option<Self> {
        document
            .select(&FOOTNOTE_TABLE_SELECTOR)
            .next()
            .map(Self::from_table)
    }

    /// Each row whose first cell is a marker maps it to the sibling cell's text.
    /// Rows wrapping an inner table are skipped; the inner rows are visited on their own.
    pub fn from_table(table: ElementRef<'_>) -> Self {
        let mut entries = HashMap::new();
        for row in table.select(&TR_SELECTOR) {
            let cells = row_cells(row);
            if cells.len() < 2 || cells[0].select(&TABLE_SELECTOR).next().is_some() {
                continue;
            }
            let marker = collect_text(cells[0]);
            let marker = normalize_marker(&marker);
            if !marker.is_empty() {
                entries
                    .entry(marker.to_string())
                    .or_insert_with(|| collect_text(cells[1]));
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, marker: &str) -> Option<&str> {
        self.entries.get(normalize_marker(marker)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FootnoteIndex {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(marker, text)| (normalize_marker(marker).to_string(), text.to_string()))
                .collect(),
        }
    }
}

/// Footnote text for every (column, item) position of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Footnotes {
    None,
    /// One text per item, shared by all columns.
    Shared(Vec<String>),
    /// `[column][item]`.
    PerColumn(Vec<Vec<String>>),
}

impl Footnotes {
    pub fn get(&self, column: usize, item: usize) -> &str {
        let text = match self {
            Footnotes::None => None,
            Footnotes::Shared(items) => items.get(item),
            Footnotes::PerColumn(columns) => columns.get(column).and_then(|c| c.get(item)),
        };
        text.map(String::as_str).unwrap_or("")
    }
}

/// Resolved footnotes plus the markers that had no index entry.
#[derive(Debug, Clone)]
pub struct FootnoteResolution {
    pub footnotes: Footnotes,
    pub unresolved: Vec<String>,
}

/// Resolves footnotes under the mode detected for the document.
///
/// An unmatched marker resolves to empty text and is reported in
/// `unresolved`; footnote numbering in the index table is sparse.
pub fn resolve_footnotes(
    body: &StatementBody,
    index: Option<&FootnoteIndex>,
) -> Result<FootnoteResolution, ParserError> {
    let mut unresolved = Vec::new();

    let footnotes = match body.variant.footnotes {
        FootnoteMode::None => Footnotes::None,
        FootnoteMode::Shared => {
            let markers: usize = body.items.iter().map(|item| item.markers.len()).sum();
            if markers == 0 {
                Footnotes::None
            } else {
                let index = index.ok_or(ParserError::MissingFootnoteTable { markers })?;
                let texts = body
                    .items
                    .iter()
                    .map(|item| {
                        let mut resolved = Vec::new();
                        for marker in &item.markers {
                            match index.lookup(marker) {
                                Some(text) => resolved.push(text),
                                None => {
                                    tracing::debug!("No footnote entry for marker {}", marker);
                                    unresolved.push(marker.clone());
                                }
                            }
                        }
                        resolved.join(" ")
                    })
                    .collect();
                Footnotes::Shared(texts)
            }
        }
        FootnoteMode::ColumnFootnotes => {
            let ignored: usize = body.items.iter().map(|item| item.markers.len()).sum();
            if ignored > 0 {
                tracing::debug!("Ignoring {} row markers in a per-column footnote document", ignored);
            }
            let columns = body
                .column_footnotes
                .iter()
                .map(|column| {
                    column
                        .iter()
                        .map(|raw| match index {
                            Some(index) if !raw.is_empty() => index
                                .lookup(raw)
                                .map(str::to_string)
                                .unwrap_or_else(|| raw.clone()),
                            _ => raw.clone(),
                        })
                        .collect()
                })
                .collect();
            Footnotes::PerColumn(columns)
        }
    };

    Ok(FootnoteResolution {
        footnotes,
        unresolved,
    })
}
