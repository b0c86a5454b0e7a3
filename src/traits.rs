//! Trait definition for statement retrieval over the network.
//!
//! [`StatementOperations`] is implemented by [`StatementClient`](crate::StatementClient).
//! Every network method has a `*_from_string` companion (or is built on one) so the
//! same parsing path can be exercised against fixtures or custom download logic.

use super::error::Result;
use super::statements::FilingStatements;
use crate::parsing::statement::{FilingContext, StatementKind, StatementRecord};
use crate::parsing::summary::{FilingSummary, StatementUrls};
use async_trait::async_trait;

/// Operations for locating and parsing the financial statements of one filing.
///
/// A filing is addressed by its archive directory URL, e.g.
/// `https://www.sec.gov/Archives/edgar/data/320193/000032019320000096`, which
/// holds `FilingSummary.xml` and the rendered `R*.htm` reports.
#[async_trait]
pub trait StatementOperations {
    /// Builds the archive directory URL of a filing from its CIK and accession number.
    fn filing_directory_url(&self, cik: &str, accession_number: &str) -> String;
    /// Fetches and parses the filing's `FilingSummary.xml`.
    async fn filing_summary(&self, base_url: &str) -> Result<FilingSummary>;
    /// Parses a `FilingSummary.xml` document from a string.
    fn filing_summary_from_string(&self, content: &str) -> Result<FilingSummary>;
    /// Locates the balance sheet, income statement and cash-flow reports of a filing.
    async fn statement_urls(&self, base_url: &str) -> Result<StatementUrls>;
    /// Fetches one rendered statement report and parses it into records.
    async fn statement(
        &self,
        url: &str,
        kind: StatementKind,
        context: &FilingContext,
    ) -> Result<Vec<StatementRecord>>;
    /// Parses a rendered statement report from a string.
    fn statement_from_string(
        &self,
        content: &str,
        kind: StatementKind,
        context: &FilingContext,
    ) -> Result<Vec<StatementRecord>>;
    /// Locates and parses every primary statement of a filing.
    ///
    /// A statement whose document cannot be parsed is recorded in
    /// [`FilingStatements::failures`] while the others still load.
    async fn filing_statements(
        &self,
        base_url: &str,
        context: &FilingContext,
    ) -> Result<FilingStatements>;
}
