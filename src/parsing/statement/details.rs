//! Tag metadata from the hidden `authRefData` tables of a rendered report.
//!
//! Each reported concept has a detail table with the concept's id:
//!
//! ```text
//! <table class="authRefData" id="defref_us-gaap_Cash">
//!   <tr><td class="hide">X</td></tr>
//!   <tr><td><div class="body">
//!     <a>- Definition</a><div><p>Amount of currency on hand ...</p></div>
//!     <a>+ References</a><div>...</div>
//!     <a>+ Details</a><div><table>
//!       <tr><td>Name:</td><td>us-gaap_Cash</td></tr>
//!       <tr><td>Namespace Prefix:</td><td>us-gaap_</td></tr>
//!       <tr><td>Data Type:</td><td>xbrli:monetaryItemType</td></tr>
//!       <tr><td>Balance Type:</td><td>debit</td></tr>
//!       <tr><td>Period Type:</td><td>instant</td></tr>
//!     </table></div>
//!   </div></td></tr>
//! </table>
//! ```

use super::body::LineItem;
use crate::parsing::error::ParserError;
use crate::parsing::utils::{
    P_SELECTOR, TABLE_SELECTOR, child_elements, collect_text, own_rows, row_cells,
};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.body").expect("valid body selector"));

/// Descriptive metadata of one reported concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMetadata {
    pub definition: String,
    pub data_type: String,
    pub balance_type: String,
    pub period_type: String,
}

/// Detail tables of one document, keyed by element id.
pub struct DetailIndex<'a> {
    tables: HashMap<&'a str, ElementRef<'a>>,
}

impl<'a> DetailIndex<'a> {
    pub fn build(document: &'a Html) -> Self {
        let mut tables = HashMap::new();
        for table in document.select(&TABLE_SELECTOR) {
            if let Some(id) = table.value().id() {
                tables.entry(id).or_insert(table);
            }
        }
        Self { tables }
    }

    pub fn resolve(&self, tag: &str) -> Result<TagMetadata, ParserError> {
        let table = self
            .tables
            .get(tag)
            .copied()
            .ok_or_else(|| ParserError::MissingDetails {
                tag: tag.to_string(),
            })?;

        let block = DetailBlock::locate(tag, table)?;
        Ok(TagMetadata {
            definition: block.definition(),
            data_type: block.data_type()?,
            balance_type: block.balance_type()?,
            period_type: block.period_type()?,
        })
    }

    /// Resolves every distinct tag once.
    pub fn resolve_all(&self, items: &[LineItem]) -> Result<HashMap<String, TagMetadata>, ParserError> {
        let mut resolved = HashMap::new();
        for item in items {
            if !resolved.contains_key(&item.tag) {
                let metadata = self.resolve(&item.tag)?;
                resolved.insert(item.tag.clone(), metadata);
            }
        }
        Ok(resolved)
    }
}

/// The descriptive block of one detail table.
///
/// The metadata fields sit at fixed rows of the nested "Details" table; the
/// row positions are kept here so a rendering change touches one place.
struct DetailBlock<'a> {
    tag: &'a str,
    definition: Option<ElementRef<'a>>,
    details: Vec<ElementRef<'a>>,
}

impl<'a> DetailBlock<'a> {
    const DATA_TYPE_ROW: usize = 2;
    const BALANCE_TYPE_ROW: usize = 3;
    const PERIOD_TYPE_ROW: usize = 4;
    const VALUE_CELL: usize = 1;

    fn locate(tag: &'a str, table: ElementRef<'a>) -> Result<Self, ParserError> {
        let missing = |field| ParserError::MissingDetailField {
            tag: tag.to_string(),
            field,
        };

        let body = table
            .select(&BODY_SELECTOR)
            .next()
            .ok_or_else(|| missing("body"))?;

        let definition = child_elements(body).find(|e| e.value().name() == "div");

        let details_div = details_region(body).ok_or_else(|| missing("details"))?;
        let details_table = details_div
            .select(&TABLE_SELECTOR)
            .next()
            .ok_or_else(|| missing("details table"))?;

        Ok(Self {
            tag,
            definition,
            details: own_rows(details_table),
        })
    }

    /// First paragraph of the definition block; empty when the filer gave none.
    fn definition(&self) -> String {
        self.definition
            .and_then(|div| div.select(&P_SELECTOR).next())
            .map(collect_text)
            .unwrap_or_default()
    }

    fn data_type(&self) -> Result<String, ParserError> {
        self.field(Self::DATA_TYPE_ROW, "data type")
    }

    fn balance_type(&self) -> Result<String, ParserError> {
        self.field(Self::BALANCE_TYPE_ROW, "balance type")
    }

    fn period_type(&self) -> Result<String, ParserError> {
        self.field(Self::PERIOD_TYPE_ROW, "period type")
    }

    fn field(&self, row: usize, field: &'static str) -> Result<String, ParserError> {
        self.details
            .get(row)
            .and_then(|r| row_cells(*r).get(Self::VALUE_CELL).copied())
            .map(collect_text)
            .ok_or_else(|| ParserError::MissingDetailField {
                tag: self.tag.to_string(),
                field,
            })
    }
}

/// The `div` directly following the "+ Details" toggle.
fn details_region(body: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut previous: Option<ElementRef<'_>> = None;
    for element in child_elements(body) {
        if element.value().name() == "div" {
            if let Some(toggle) = previous {
                if is_details_toggle(toggle) {
                    return Some(element);
                }
            }
        }
        previous = Some(element);
    }
    None
}

fn is_details_toggle(element: ElementRef<'_>) -> bool {
    let text = collect_text(element);
    text.trim_start_matches(['+', '-']).trim() == "Details"
}
