use super::StatementKind;
use super::body::StatementBody;
use super::details::TagMetadata;
use super::footnotes::Footnotes;
use crate::parsing::error::ParserError;
use crate::parsing::utils::parse_amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller-supplied identifiers copied verbatim into every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingContext {
    pub year: String,
    pub quarter: String,
    pub cik: String,
}

impl FilingContext {
    pub fn new(year: impl Into<String>, quarter: impl Into<String>, cik: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            quarter: quarter.into(),
            cik: cik.into(),
        }
    }
}

/// One value of one line item in one column of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub year: String,
    pub quarter: String,
    pub cik: String,
    pub statement: StatementKind,
    pub title: String,
    /// Column header as rendered (`Dec. 31, 2020`).
    pub column: String,
    pub period_end: Option<NaiveDate>,
    pub item: String,
    pub value: String,
    pub duration: Option<String>,
    pub axis: String,
    pub r#abstract: String,
    pub tag: String,
    pub definition: String,
    pub data_type: String,
    pub balance_type: String,
    pub period_type: String,
    pub footnote: String,
}

impl StatementRecord {
    /// The rendered value as a number, `None` for text or blank cells.
    pub fn amount(&self) -> Option<f64> {
        parse_amount(&self.value)
    }
}

/// Forms the columns × items cross product.
///
/// Records are ordered column by column, items in document order within each
/// column. Consistency is checked before the first record is built.
pub fn assemble(
    body: &StatementBody,
    metadata: &HashMap<String, TagMetadata>,
    footnotes: &Footnotes,
    context: &FilingContext,
    kind: StatementKind,
) -> Result<Vec<StatementRecord>, ParserError> {
    body.check_consistency()?;

    let mut records = Vec::with_capacity(body.columns.len() * body.items.len());
    for (c, column) in body.columns.iter().enumerate() {
        for (i, item) in body.items.iter().enumerate() {
            let meta = metadata
                .get(&item.tag)
                .ok_or_else(|| ParserError::MissingDetails {
                    tag: item.tag.clone(),
                })?;
            let value = body.values.get(c, i).ok_or(ParserError::ColumnLength {
                column: c,
                values: i,
                items: body.items.len(),
            })?;

            records.push(StatementRecord {
                year: context.year.clone(),
                quarter: context.quarter.clone(),
                cik: context.cik.clone(),
                statement: kind,
                title: body.title.clone(),
                column: column.label.clone(),
                period_end: column.period_end,
                item: item.label.clone(),
                value: value.to_string(),
                duration: column.duration.clone(),
                axis: item.context.axis.clone(),
                r#abstract: item.context.r#abstract.clone(),
                tag: item.tag.clone(),
                definition: meta.definition.clone(),
                data_type: meta.data_type.clone(),
                balance_type: meta.balance_type.clone(),
                period_type: meta.period_type.clone(),
                footnote: footnotes.get(c, i).to_string(),
            });
        }
    }

    Ok(records)
}
