//! Statement retrieval for a single filing.
//!
//! This module implements [`StatementOperations`] for [`StatementClient`]: it reads
//! the filing's `FilingSummary.xml`, picks the three primary statement reports and
//! parses each into [`StatementRecord`]s.
//!
//! A filing directory looks like:
//!
//! ```text
//! https://www.sec.gov/Archives/edgar/data/320193/000032019320000096/
//! ├── FilingSummary.xml
//! ├── R1.htm          (cover page)
//! ├── R2.htm          (balance sheet)
//! ├── R4.htm          (income statement)
//! └── R7.htm          (cash flows)
//! ```

use super::StatementClient;
use super::error::{Result, StatementError};
use super::traits::StatementOperations;
use crate::parsing::statement::{
    FilingContext, StatementConfig, StatementKind, StatementParser, StatementRecord,
};
use crate::parsing::summary::{FilingSummary, StatementUrls};
use async_trait::async_trait;

const FILING_SUMMARY: &str = "FilingSummary.xml";

/// The parsed statements of one filing.
///
/// A statement is `None` when the manifest lists no matching report or when its
/// document failed to parse; parse failures are kept in `failures`.
#[derive(Debug, Default)]
pub struct FilingStatements {
    pub balance_sheet: Option<Vec<StatementRecord>>,
    pub income_statement: Option<Vec<StatementRecord>>,
    pub cash_flow: Option<Vec<StatementRecord>>,
    pub failures: Vec<(StatementKind, StatementError)>,
}

impl FilingStatements {
    pub fn get(&self, kind: StatementKind) -> Option<&[StatementRecord]> {
        match kind {
            StatementKind::BalanceSheet => self.balance_sheet.as_deref(),
            StatementKind::IncomeStatement => self.income_statement.as_deref(),
            StatementKind::CashFlowStatement => self.cash_flow.as_deref(),
        }
    }

    fn slot(&mut self, kind: StatementKind) -> &mut Option<Vec<StatementRecord>> {
        match kind {
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::IncomeStatement => &mut self.income_statement,
            StatementKind::CashFlowStatement => &mut self.cash_flow,
        }
    }

    /// All records, balance sheet first.
    pub fn records(&self) -> impl Iterator<Item = &StatementRecord> + '_ {
        StatementKind::ALL
            .iter()
            .filter_map(|&kind| self.get(kind))
            .flatten()
    }
}

impl StatementClient {
    fn parse_statement(
        &self,
        content: &str,
        config: StatementConfig,
        context: &FilingContext,
    ) -> Result<Vec<StatementRecord>> {
        StatementParser::new(config).parse(content, context)
    }
}

/// Statement operations for SEC EDGAR filings.
///
/// # Examples
///
/// ```ignore
/// use statementkit::{FilingContext, StatementClient, StatementKind, StatementOperations};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = StatementClient::new("MyApp contact@example.com")?;
///     let base = client.filing_directory_url("320193", "0000320193-20-000096");
///
///     let urls = client.statement_urls(&base).await?;
///     if let Some(url) = urls.get(StatementKind::IncomeStatement) {
///         let context = FilingContext::new("2020", "QTR4", "320193");
///         let records = client.statement(url, StatementKind::IncomeStatement, &context).await?;
///         println!("{} income statement records", records.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
impl StatementOperations for StatementClient {
    fn filing_directory_url(&self, cik: &str, accession_number: &str) -> String {
        format!(
            "{}/data/{}/{}",
            self.archives_url,
            cik,
            accession_number.replace('-', "")
        )
    }

    async fn filing_summary(&self, base_url: &str) -> Result<FilingSummary> {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), FILING_SUMMARY);
        let content = self.get(&url).await?;
        FilingSummary::from_xml(&content).map_err(|e| StatementError::parse_failed(url, e))
    }

    fn filing_summary_from_string(&self, content: &str) -> Result<FilingSummary> {
        FilingSummary::from_xml(content).map_err(|e| StatementError::parse_failed(FILING_SUMMARY, e))
    }

    async fn statement_urls(&self, base_url: &str) -> Result<StatementUrls> {
        let summary = self.filing_summary(base_url).await?;
        Ok(self.locator.locate_in_summary(&summary, base_url))
    }

    async fn statement(
        &self,
        url: &str,
        kind: StatementKind,
        context: &FilingContext,
    ) -> Result<Vec<StatementRecord>> {
        let content = self.get(url).await?;
        self.parse_statement(
            &content,
            StatementConfig::new(kind).with_document(url),
            context,
        )
    }

    fn statement_from_string(
        &self,
        content: &str,
        kind: StatementKind,
        context: &FilingContext,
    ) -> Result<Vec<StatementRecord>> {
        self.parse_statement(content, StatementConfig::new(kind), context)
    }

    async fn filing_statements(
        &self,
        base_url: &str,
        context: &FilingContext,
    ) -> Result<FilingStatements> {
        let urls = self.statement_urls(base_url).await?;
        let mut statements = FilingStatements::default();

        for kind in StatementKind::ALL {
            let Some(url) = urls.get(kind) else {
                tracing::debug!("No {} report listed in {}", kind, base_url);
                continue;
            };

            match self.statement(url, kind, context).await {
                Ok(records) => *statements.slot(kind) = Some(records),
                Err(e) if e.is_document_error() => {
                    tracing::warn!("Skipping {}: {}", kind, e);
                    statements.failures.push((kind, e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(statements)
    }
}
