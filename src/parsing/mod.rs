//! Synchronous parsers for the documents of one rendered filing.
//!
//! - [`summary`] reads `FilingSummary.xml` and locates the statement reports.
//! - [`statement`] turns one rendered statement page into records.
//!
//! Nothing here touches the network; feed the parsers documents fetched any way you like.

pub mod error;
pub mod statement;
pub mod summary;
pub mod utils;
