//! # StatementKit - Financial statements from SEC EDGAR rendered reports
//!
//! StatementKit extracts the three primary financial statements (balance sheet,
//! income statement, cash-flow statement) from the HTML reports EDGAR renders for
//! every XBRL filing, and flattens each into one record per (column, line item).
//!
//! ## Features
//!
//! - **Report location** - Finds the statement pages in a filing's `FilingSummary.xml`
//! - **Statement parsing** - Header layouts, axis/abstract context, tag metadata and footnotes
//! - **Rate-limited HTTP client** (feature `fetch`, on by default) - Complies with SEC.gov fair access rules
//!
//! The parsers in [`parsing`] are synchronous and network-free; the client is async
//! and requires a runtime such as [tokio](https://tokio.rs).
//!
//! ## Basic Usage
//!
//! ```ignore
//! use statementkit::{FilingContext, StatementClient, StatementOperations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize with a proper user agent (required by SEC.gov)
//!     let client = StatementClient::new("YourAppName contact@example.com")?;
//!     let context = FilingContext::new("2020", "QTR4", "320193");
//!
//!     let base = client.filing_directory_url("320193", "0000320193-20-000096");
//!     let statements = client.filing_statements(&base, &context).await?;
//!
//!     for record in statements.balance_sheet.unwrap_or_default() {
//!         println!("{} {} = {}", record.column, record.item, record.value);
//!     }
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "fetch")]
mod config;
#[cfg(feature = "fetch")]
mod core;
mod error;
pub mod parsing;
#[cfg(feature = "fetch")]
mod statements;
#[cfg(feature = "fetch")]
mod traits;

#[cfg(feature = "fetch")]
pub use config::{ClientConfig, ClientUrls};
#[cfg(feature = "fetch")]
pub use core::StatementClient;
pub use error::{Result, StatementError};
#[cfg(feature = "fetch")]
pub use statements::FilingStatements;
#[cfg(feature = "fetch")]
pub use traits::StatementOperations;

pub use parsing::error::{DefectKind, ParserError};
pub use parsing::statement::{
    FilingContext, StatementConfig, StatementKind, StatementParser, StatementRecord,
};
pub use parsing::summary::{FilingSummary, LocatorConfig, ReportLocator, StatementUrls};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
