//! `FilingSummary.xml` manifest parsing and statement report location.
//!
//! Every XBRL filing on EDGAR ships a `FilingSummary.xml` listing the rendered
//! reports (`R1.htm`, `R2.htm`, ...) produced for it. Report names are chosen by
//! the filer, so the three primary statements are found by case-insensitive
//! keyword matching against each report's long name, in manifest order.
//!
//! ```text
//! <FilingSummary>
//!   <MyReports>
//!     <Report instance="aapl-20200926.htm">
//!       <HtmlFileName>R2.htm</HtmlFileName>
//!       <LongName>1002 - Statement - CONSOLIDATED BALANCE SHEETS</LongName>
//!       <ShortName>CONSOLIDATED BALANCE SHEETS</ShortName>
//!       ...
//! ```

use super::error::ParserError;
use super::statement::StatementKind;
use quick_xml::de::from_str;
use serde::{Deserialize, Serialize};

/// The parsed `FilingSummary.xml` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingSummary {
    #[serde(rename = "Version", default)]
    pub version: Option<String>,
    #[serde(rename = "ReportFormat", default)]
    pub report_format: Option<String>,
    #[serde(rename = "MyReports", default)]
    pub my_reports: MyReports,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyReports {
    #[serde(rename = "Report", default)]
    pub reports: Vec<ReportManifestEntry>,
}

/// One rendered report listed in the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportManifestEntry {
    #[serde(rename = "@instance", default)]
    pub instance: Option<String>,
    #[serde(rename = "LongName", default)]
    pub long_name: String,
    #[serde(rename = "ShortName", default)]
    pub short_name: String,
    /// Absent for legacy XML-rendered reports and for book entries.
    #[serde(rename = "HtmlFileName", default)]
    pub html_file_name: Option<String>,
    #[serde(rename = "MenuCategory", default)]
    pub menu_category: Option<String>,
    #[serde(rename = "Position", default)]
    pub position: Option<String>,
}

impl ReportManifestEntry {
    pub fn new(
        long_name: impl Into<String>,
        short_name: impl Into<String>,
        html_file_name: impl Into<String>,
    ) -> Self {
        Self {
            long_name: long_name.into(),
            short_name: short_name.into(),
            html_file_name: Some(html_file_name.into()),
            ..Default::default()
        }
    }
}

impl FilingSummary {
    /// Deserializes a `FilingSummary.xml` document.
    pub fn from_xml(content: &str) -> Result<Self, ParserError> {
        Ok(from_str(content)?)
    }

    pub fn reports(&self) -> &[ReportManifestEntry] {
        &self.my_reports.reports
    }
}

/// Keywords for one statement category.
///
/// A report name matches when it contains any `include` keyword and none of
/// the `exclude` keywords, both compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StatementKeywords {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl StatementKeywords {
    pub fn new(include: &[&str], exclude: &[&str]) -> Self {
        Self {
            include: include.iter().map(|s| s.to_lowercase()).collect(),
            exclude: exclude.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Tests a lowercased report name.
    fn matches(&self, name: &str) -> bool {
        if self.exclude.iter().any(|k| name.contains(k.as_str())) {
            return false;
        }
        self.include.iter().any(|k| name.contains(k.as_str()))
    }
}

/// Keyword lists used by [`ReportLocator`], one per statement.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub balance_sheet: StatementKeywords,
    pub income_statement: StatementKeywords,
    pub cash_flow: StatementKeywords,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            balance_sheet: StatementKeywords::new(
                &[
                    "balance sheet",
                    "statements of financial condition",
                    "statement of financial condition",
                    "statements of financial position",
                    "statement of financial position",
                    "statements of condition",
                ],
                // Parenthetical reports carry share counts and par values, not the statement.
                &["parenthetical"],
            ),
            income_statement: StatementKeywords::new(
                &[
                    "statements of income",
                    "statement of income",
                    "statements of operation",
                    "statement of operation",
                    "statements of earnings",
                    "statement of earnings",
                    "statements of comprehensive loss",
                    "statement of operations and comprehensive loss",
                ],
                &[],
            ),
            cash_flow: StatementKeywords::new(
                &["statements of cash flow", "statement of cash flow"],
                &[],
            ),
        }
    }
}

impl LocatorConfig {
    fn keywords(&self, kind: StatementKind) -> &StatementKeywords {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlowStatement => &self.cash_flow,
        }
    }
}

/// Resolved report URLs; `None` means no manifest entry matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementUrls {
    pub balance_sheet: Option<String>,
    pub income_statement: Option<String>,
    pub cash_flow: Option<String>,
}

impl StatementUrls {
    pub fn get(&self, kind: StatementKind) -> Option<&str> {
        match kind {
            StatementKind::BalanceSheet => self.balance_sheet.as_deref(),
            StatementKind::IncomeStatement => self.income_statement.as_deref(),
            StatementKind::CashFlowStatement => self.cash_flow.as_deref(),
        }
    }

    fn slot(&mut self, kind: StatementKind) -> &mut Option<String> {
        match kind {
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::IncomeStatement => &mut self.income_statement,
            StatementKind::CashFlowStatement => &mut self.cash_flow,
        }
    }

    pub fn is_complete(&self) -> bool {
        StatementKind::ALL.iter().all(|&kind| self.get(kind).is_some())
    }

    /// Located statements in [`StatementKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (StatementKind, &str)> + '_ {
        StatementKind::ALL
            .iter()
            .filter_map(|&kind| self.get(kind).map(|url| (kind, url)))
    }
}

/// Selects the balance sheet, income statement and cash-flow statement
/// reports from a filing manifest.
///
/// # Examples
///
/// ```
/// use statementkit::parsing::summary::{ReportLocator, ReportManifestEntry};
///
/// let reports = vec![
///     ReportManifestEntry::new("0002 - Statement - Balance Sheets", "Balance Sheets", "R2.htm"),
///     ReportManifestEntry::new("0004 - Statement - Statements of Cash Flows", "Cash Flows", "R4.htm"),
/// ];
/// let urls = ReportLocator::default().locate(&reports, "https://example.com/filing");
///
/// assert_eq!(urls.balance_sheet.as_deref(), Some("https://example.com/filing/R2.htm"));
/// assert!(urls.income_statement.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReportLocator {
    config: LocatorConfig,
}

impl ReportLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Scans `reports` in order; the first entry matching a category wins it.
    pub fn locate(&self, reports: &[ReportManifestEntry], base_url: &str) -> StatementUrls {
        let base = base_url.trim_end_matches('/');
        let mut urls = StatementUrls::default();

        for report in reports {
            let Some(file_name) = report.html_file_name.as_deref() else {
                tracing::trace!("Skipping report without html rendering: {}", report.long_name);
                continue;
            };
            let name = report.long_name.to_lowercase();

            for kind in StatementKind::ALL {
                let slot = urls.slot(kind);
                if slot.is_none() && self.config.keywords(kind).matches(&name) {
                    tracing::debug!("Located {} as {}", kind, report.long_name);
                    *slot = Some(format!("{}/{}", base, file_name));
                }
            }

            if urls.is_complete() {
                break;
            }
        }

        urls
    }

    /// Locates statements listed in a parsed `FilingSummary.xml`.
    pub fn locate_in_summary(&self, summary: &FilingSummary, base_url: &str) -> StatementUrls {
        self.locate(summary.reports(), base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.sec.gov/Archives/edgar/data/320193/000032019320000096";

    fn entry(long_name: &str, file: &str) -> ReportManifestEntry {
        ReportManifestEntry::new(long_name, long_name, file)
    }

    #[test]
    fn test_parenthetical_never_selected_as_balance_sheet() {
        let reports = vec![
            entry("0003 - Statement - Consolidated Balance Sheets (Parenthetical)", "R3.htm"),
            entry("0002 - Statement - Consolidated Balance Sheets", "R2.htm"),
        ];
        let urls = ReportLocator::default().locate(&reports, BASE);
        assert_eq!(urls.balance_sheet, Some(format!("{}/R2.htm", BASE)));
    }

    #[test]
    fn test_income_loss_selected_as_income_statement() {
        let reports = vec![entry(
            "0004 - Statement - Consolidated Statements of Income (Loss)",
            "R4.htm",
        )];
        let urls = ReportLocator::default().locate(&reports, BASE);
        assert_eq!(urls.income_statement, Some(format!("{}/R4.htm", BASE)));
        assert!(urls.balance_sheet.is_none());
        assert!(urls.cash_flow.is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let reports = vec![
            entry("Consolidated Statements of Operations", "R4.htm"),
            entry("Consolidated Statements of Comprehensive Loss", "R5.htm"),
        ];
        let urls = ReportLocator::default().locate(&reports, BASE);
        assert_eq!(urls.income_statement, Some(format!("{}/R4.htm", BASE)));
    }

    #[test]
    fn test_entries_without_html_are_skipped() {
        let mut legacy = entry("Balance Sheet", "");
        legacy.html_file_name = None;
        let reports = vec![legacy, entry("Condensed Balance Sheet", "R2.htm")];

        let urls = ReportLocator::default().locate(&reports, BASE);
        assert_eq!(urls.balance_sheet, Some(format!("{}/R2.htm", BASE)));
    }

    #[test]
    fn test_trailing_slash_and_empty_manifest() {
        let urls = ReportLocator::default().locate(&[], BASE);
        assert_eq!(urls, StatementUrls::default());

        let reports = vec![entry("STATEMENTS OF CASH FLOWS", "R7.htm")];
        let urls = ReportLocator::default().locate(&reports, "https://host/dir/");
        assert_eq!(urls.cash_flow.as_deref(), Some("https://host/dir/R7.htm"));
    }

    #[test]
    fn test_custom_keywords() {
        let config = LocatorConfig {
            balance_sheet: StatementKeywords::new(&["net assets"], &[]),
            ..Default::default()
        };
        let reports = vec![
            entry("Balance Sheets", "R2.htm"),
            entry("Statement of Net Assets", "R3.htm"),
        ];
        let urls = ReportLocator::new(config).locate(&reports, BASE);
        assert_eq!(urls.balance_sheet, Some(format!("{}/R3.htm", BASE)));
    }

    #[test]
    fn test_parse_summary_xml() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<FilingSummary>
  <Version>3.20.3</Version>
  <ReportFormat>Html</ReportFormat>
  <MyReports>
    <Report instance="abc-20201231.htm">
      <IsDefault>false</IsDefault>
      <HtmlFileName>R2.htm</HtmlFileName>
      <LongName>0002 - Statement - Balance Sheets</LongName>
      <ShortName>Balance Sheets</ShortName>
      <MenuCategory>Statements</MenuCategory>
      <Position>2</Position>
    </Report>
    <Report>
      <LongName>All Reports</LongName>
      <ShortName>All Reports</ShortName>
    </Report>
  </MyReports>
</FilingSummary>"#;

        let summary = FilingSummary::from_xml(xml).unwrap();
        assert_eq!(summary.version.as_deref(), Some("3.20.3"));
        assert_eq!(summary.reports().len(), 2);
        assert_eq!(summary.reports()[0].html_file_name.as_deref(), Some("R2.htm"));
        assert_eq!(summary.reports()[0].instance.as_deref(), Some("abc-20201231.htm"));
        assert!(summary.reports()[1].html_file_name.is_none());
    }

    #[test]
    fn test_malformed_summary_is_error() {
        let err = FilingSummary::from_xml("<FilingSummary><MyReports>").unwrap_err();
        assert!(matches!(err, ParserError::InvalidSummary(_)));
    }
}
