//! Rendered financial statement parser.
//!
//! Turns one rendered report page (`R2.htm`, `R4.htm`, ...) into flat
//! [`StatementRecord`]s, one per (column, line item). A parse runs in stages:
//!
//! 1. locate the statement table and detect its [`FormatVariant`]
//! 2. walk the rows, collecting columns, line items and the value matrix
//! 3. resolve each distinct tag's metadata from its hidden detail table
//! 4. resolve footnotes under the detected footnote mode
//! 5. assemble the columns × items cross product
//!
//! Parsing is synchronous and owns nothing beyond the document it was given,
//! so documents can be parsed concurrently by the caller.

mod assemble;
mod body;
mod classify;
mod context;
mod details;
mod footnotes;

pub use assemble::{FilingContext, StatementRecord};
pub use body::{ColumnHeader, FootnoteMode, FormatVariant, HeaderLayout, LineItem};
pub use classify::{CellRole, LabelRow};
pub use context::{ContextTracker, ItemContext};
pub use details::{DetailIndex, TagMetadata};
pub use footnotes::{FootnoteIndex, Footnotes};

use super::error::ParserError;
use super::utils::{TABLE_SELECTOR, has_class, own_rows};
use crate::{Result, StatementError};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three primary financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlowStatement,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::BalanceSheet,
        StatementKind::IncomeStatement,
        StatementKind::CashFlowStatement,
    ];

    pub const VARIANTS: &'static [(&'static str, StatementKind)] = &[
        ("balance", StatementKind::BalanceSheet),
        ("income", StatementKind::IncomeStatement),
        ("cash", StatementKind::CashFlowStatement),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "balance_sheet",
            StatementKind::IncomeStatement => "income_statement",
            StatementKind::CashFlowStatement => "cash_flow_statement",
        }
    }

    /// Header rows the renderer normally emits: balance sheets report points
    /// in time, the other statements add a row of duration groups.
    pub fn expected_header_rows(&self) -> usize {
        match self {
            StatementKind::BalanceSheet => 1,
            StatementKind::IncomeStatement | StatementKind::CashFlowStatement => 2,
        }
    }

    /// Whether records of this statement normally carry a duration label.
    pub fn has_duration(&self) -> bool {
        self.expected_header_rows() > 1
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_lowercase();
        Self::VARIANTS
            .iter()
            .find(|(pattern, _)| lowered.contains(pattern))
            .map(|(_, kind)| *kind)
            .ok_or_else(|| StatementError::UnknownStatementKind(s.to_string()))
    }
}

/// Configuration for [`StatementParser`].
#[derive(Debug, Clone)]
pub struct StatementConfig {
    pub kind: StatementKind,
    /// Name reported in errors, typically the report URL.
    pub document: Option<String>,
}

impl StatementConfig {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            document: None,
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }
}

/// Full result of parsing one statement, including diagnostics.
#[derive(Debug, Clone)]
pub struct ParsedStatement {
    pub title: String,
    pub variant: FormatVariant,
    pub columns: Vec<ColumnHeader>,
    pub records: Vec<StatementRecord>,
    /// Footnote markers with no entry in the footnote index table.
    pub unresolved_markers: Vec<String>,
}

/// Parser for one rendered statement document.
///
/// # Examples
///
/// ```
/// use statementkit::parsing::statement::{
///     FilingContext, StatementConfig, StatementKind, StatementParser,
/// };
///
/// let parser = StatementParser::new(StatementConfig::new(StatementKind::BalanceSheet));
/// let context = FilingContext::new("2020", "QTR4", "320193");
///
/// // A document without a statement table is rejected, not panicked on.
/// let err = parser.parse("<html><body></body></html>", &context).unwrap_err();
/// assert!(err.is_document_error());
/// ```
pub struct StatementParser {
    config: StatementConfig,
}

impl StatementParser {
    pub fn new(config: StatementConfig) -> Self {
        Self { config }
    }

    pub fn kind(&self) -> StatementKind {
        self.config.kind
    }

    /// Parses a statement page into records ordered column by column.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::ParseFailed` naming the document when an
    /// expected structure is missing or the collected rows are inconsistent.
    pub fn parse(&self, html: &str, context: &FilingContext) -> Result<Vec<StatementRecord>> {
        self.parse_statement(html, context).map(|parsed| parsed.records)
    }

    /// Parses raw response bytes, which must be UTF-8.
    pub fn parse_bytes(&self, bytes: &[u8], context: &FilingContext) -> Result<Vec<StatementRecord>> {
        let html = std::str::from_utf8(bytes).map_err(|e| {
            StatementError::parse_failed(
                self.document_name(),
                ParserError::InvalidUtf8 {
                    valid_up_to: e.valid_up_to(),
                },
            )
        })?;
        self.parse(html, context)
    }

    /// Like [`parse`](Self::parse) but keeps the detected variant, columns and
    /// unresolved footnote markers.
    pub fn parse_statement(&self, html: &str, context: &FilingContext) -> Result<ParsedStatement> {
        self.run(html, context)
            .map_err(|source| StatementError::parse_failed(self.document_name(), source))
    }

    fn document_name(&self) -> String {
        self.config
            .document
            .clone()
            .unwrap_or_else(|| self.config.kind.to_string())
    }

    fn run(
        &self,
        html: &str,
        context: &FilingContext,
    ) -> std::result::Result<ParsedStatement, ParserError> {
        let kind = self.config.kind;
        let document = Html::parse_document(html);
        let table = statement_table(&document).ok_or(ParserError::MissingTable)?;
        let rows = own_rows(table);

        let footnote_index = FootnoteIndex::from_document(&document);
        let variant = FormatVariant::detect(&rows, footnote_index.is_some());
        tracing::debug!(
            "Parsing {} with {} header row(s), footnotes {:?}",
            kind,
            variant.header_rows,
            variant.footnotes
        );
        if variant.header_rows > 0 && variant.header_rows != kind.expected_header_rows() {
            tracing::warn!(
                "{} has {} header row(s), expected {}; using the detected layout",
                self.document_name(),
                variant.header_rows,
                kind.expected_header_rows()
            );
        }

        let body = body::parse_body(&rows, variant)?;
        body.check_consistency()?;

        let metadata = DetailIndex::build(&document).resolve_all(&body.items)?;
        let resolution = footnotes::resolve_footnotes(&body, footnote_index.as_ref())?;
        let records = assemble::assemble(&body, &metadata, &resolution.footnotes, context, kind)?;

        Ok(ParsedStatement {
            title: body.title,
            variant,
            columns: body.columns,
            records,
            unresolved_markers: resolution.unresolved,
        })
    }
}

/// The rendered report table, preferring `table.report` over the first table.
fn statement_table(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&TABLE_SELECTOR)
        .find(|table| has_class(*table, "report"))
        .or_else(|| document.select(&TABLE_SELECTOR).next())
}
