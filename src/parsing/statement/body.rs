//! Statement body parsing: header rows, line items and the value matrix.
//!
//! Rendered statements come in two header layouts:
//!
//! ```text
//! Single (balance sheets)            Split (income / cash-flow statements)
//! ┌────────────┬────────┬────────┐   ┌────────────┬─────────────────┬────────┐
//! │ title (tl) │ date   │ date   │   │ title (tl) │ 12 Months Ended │ 3 Mos. │  <- durations
//! ├────────────┼────────┼────────┤   │            ├────────┬────────┼────────┤
//! │ item (pl)  │ value  │ value  │   │            │ date   │ date   │ date   │  <- columns
//! └────────────┴────────┴────────┘   ├────────────┼────────┼────────┼────────┤
//!                                    │ item (pl)  │ value  │ value  │ value  │
//!                                    └────────────┴────────┴────────┴────────┘
//! ```
//!
//! The layout and the footnote convention are detected before any data row is
//! read, so every later row is interpreted against a fixed column set.

use super::classify::{CellRole, LabelRow};
use super::context::{ContextTracker, ItemContext};
use crate::parsing::error::ParserError;
use crate::parsing::utils::{collect_text, colspan, parse_column_date, row_cells};
use chrono::NaiveDate;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderLayout {
    /// One header row: title plus date columns.
    Single,
    /// Title and duration groups, then a row of date columns.
    Split,
}

/// How footnotes are attached to values in this document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FootnoteMode {
    None,
    /// Markers on item rows, resolved through a shared footnote index table.
    Shared,
    /// `fn` cells bound to individual (column, item) positions.
    ColumnFootnotes,
}

/// Rendering convention detected for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVariant {
    pub header_rows: usize,
    pub footnotes: FootnoteMode,
}

impl FormatVariant {
    /// Inspects the statement rows up front: counts the leading rows made only
    /// of `th` cells and looks for footnote-bearing cells.
    pub fn detect(rows: &[ElementRef<'_>], has_footnote_table: bool) -> FormatVariant {
        let header_rows = rows.iter().take_while(|row| is_header_row(**row)).count();

        let roles: Vec<CellRole> = rows
            .iter()
            .skip(header_rows)
            .flat_map(|row| row_cells(*row))
            .filter_map(CellRole::of)
            .collect();

        let footnotes = if roles.contains(&CellRole::ColumnFootnote) {
            FootnoteMode::ColumnFootnotes
        } else if has_footnote_table || roles.contains(&CellRole::Marker) {
            FootnoteMode::Shared
        } else {
            FootnoteMode::None
        };

        FormatVariant {
            header_rows,
            footnotes,
        }
    }

    pub fn layout(&self) -> Option<HeaderLayout> {
        match self.header_rows {
            0 => None,
            1 => Some(HeaderLayout::Single),
            _ => Some(HeaderLayout::Split),
        }
    }
}

fn is_header_row(row: ElementRef<'_>) -> bool {
    let cells = row_cells(row);
    !cells.is_empty() && cells.iter().all(|cell| cell.value().name() == "th")
}

/// One date column, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub label: String,
    /// Duration group spanning this column (`12 Months Ended`), split layout only.
    pub duration: Option<String>,
    pub period_end: Option<NaiveDate>,
}

impl ColumnHeader {
    pub fn new(label: impl Into<String>, duration: Option<String>) -> Self {
        let label = label.into();
        let period_end = parse_column_date(&label);
        Self {
            label,
            duration,
            period_end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub label: String,
    pub tag: String,
    pub context: ItemContext,
    /// Footnote markers found on the item's row.
    pub markers: Vec<String>,
}

/// Values collected per column; `values[column][item]` once consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMatrix {
    columns: Vec<Vec<String>>,
}

impl ValueMatrix {
    pub fn with_columns(width: usize) -> Self {
        Self {
            columns: vec![Vec::new(); width],
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    fn push(&mut self, column: usize, value: String) {
        self.columns[column].push(value);
    }

    pub fn get(&self, column: usize, item: usize) -> Option<&str> {
        self.columns.get(column)?.get(item).map(String::as_str)
    }

    /// Every column must hold exactly one value per item.
    pub fn check(&self, items: usize) -> Result<(), ParserError> {
        for (column, values) in self.columns.iter().enumerate() {
            if values.len() != items {
                return Err(ParserError::ColumnLength {
                    column,
                    values: values.len(),
                    items,
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Vec<String>>> for ValueMatrix {
    fn from(columns: Vec<Vec<String>>) -> Self {
        Self { columns }
    }
}

/// Everything recovered from the statement table itself.
#[derive(Debug, Clone)]
pub struct StatementBody {
    pub title: String,
    pub columns: Vec<ColumnHeader>,
    pub items: Vec<LineItem>,
    pub values: ValueMatrix,
    /// Raw `fn` cell text per (column, item); empty unless the document uses
    /// per-column footnotes.
    pub column_footnotes: Vec<Vec<String>>,
    pub variant: FormatVariant,
}

impl StatementBody {
    /// Verifies the value matrix against the columns and items before assembly.
    pub fn check_consistency(&self) -> Result<(), ParserError> {
        if self.values.width() != self.columns.len() {
            return Err(ParserError::MatrixWidth {
                columns: self.columns.len(),
                width: self.values.width(),
            });
        }
        self.values.check(self.items.len())
    }
}

/// Parses all rows of the statement table under a previously detected variant.
pub fn parse_body(
    rows: &[ElementRef<'_>],
    variant: FormatVariant,
) -> Result<StatementBody, ParserError> {
    let layout = variant.layout().ok_or(ParserError::MissingHeader)?;
    let (title, columns) = parse_header(&rows[..variant.header_rows], layout);

    let mut builder = BodyBuilder::new(columns.len(), variant.footnotes);
    for (index, row) in rows.iter().enumerate().skip(variant.header_rows) {
        builder.row(index, *row)?;
    }

    Ok(StatementBody {
        title,
        columns,
        items: builder.items,
        values: builder.values,
        column_footnotes: builder.column_footnotes,
        variant,
    })
}

fn parse_header(rows: &[ElementRef<'_>], layout: HeaderLayout) -> (String, Vec<ColumnHeader>) {
    let mut title = String::new();
    let mut first_row = Vec::new();

    for cell in row_cells(rows[0]) {
        match CellRole::of(cell) {
            Some(CellRole::Title) if title.is_empty() => title = collect_text(cell),
            Some(CellRole::ColumnHeader) => first_row.push(HeaderSpan::of(cell)),
            _ => {}
        }
    }

    let columns = match layout {
        HeaderLayout::Single => first_row
            .into_iter()
            .map(|span| ColumnHeader::new(span.label, None))
            .collect(),
        HeaderLayout::Split => {
            if rows.len() > 2 {
                tracing::warn!(
                    "Statement has {} header rows, ignoring all but the first and last",
                    rows.len()
                );
            }
            let dates: Vec<HeaderSpan> = row_cells(rows[rows.len() - 1])
                .into_iter()
                .filter(|cell| CellRole::of(*cell) != Some(CellRole::Title))
                .map(HeaderSpan::of)
                .collect();
            let durations = HeaderSpan::layout(first_row);

            HeaderSpan::layout(dates)
                .into_iter()
                .map(|date| {
                    // A date column takes the duration group spanning its first grid slot.
                    let duration = durations
                        .iter()
                        .find(|group| group.covers(date.start))
                        .map(|group| group.label.clone());
                    if duration.is_none() && !durations.is_empty() {
                        tracing::warn!("No duration group spans column {}", date.label);
                    }
                    ColumnHeader::new(date.label, duration)
                })
                .collect()
        }
    };

    (title, columns)
}

/// A header cell placed on the grid of column slots.
struct HeaderSpan {
    label: String,
    start: usize,
    width: usize,
}

impl HeaderSpan {
    fn of(cell: ElementRef<'_>) -> Self {
        Self {
            label: collect_text(cell),
            start: 0,
            width: colspan(cell),
        }
    }

    /// Assigns consecutive grid positions in document order.
    fn layout(mut spans: Vec<HeaderSpan>) -> Vec<HeaderSpan> {
        let mut next = 0;
        for span in &mut spans {
            span.start = next;
            next = next.saturating_add(span.width);
        }
        spans
    }

    fn covers(&self, slot: usize) -> bool {
        slot >= self.start && slot < self.start.saturating_add(self.width)
    }
}

/// Accumulates the parallel sequences while walking data rows.
struct BodyBuilder {
    width: usize,
    mode: FootnoteMode,
    tracker: ContextTracker,
    items: Vec<LineItem>,
    values: ValueMatrix,
    column_footnotes: Vec<Vec<String>>,
}

impl BodyBuilder {
    fn new(width: usize, mode: FootnoteMode) -> Self {
        let footnote_columns = match mode {
            FootnoteMode::ColumnFootnotes => width,
            _ => 0,
        };
        Self {
            width,
            mode,
            tracker: ContextTracker::new(),
            items: Vec::new(),
            values: ValueMatrix::with_columns(width),
            column_footnotes: vec![Vec::new(); footnote_columns],
        }
    }

    fn row(&mut self, index: usize, row: ElementRef<'_>) -> Result<(), ParserError> {
        let cells = row_cells(row);
        let mut column = 0;
        let mut row_item: Option<usize> = None;

        for cell in cells.iter().copied() {
            match CellRole::of(cell) {
                Some(CellRole::Label) => match LabelRow::from_cell(cell, index)? {
                    // Marker rows only move the context; their data cells are discarded.
                    LabelRow::Axis(tag) => {
                        self.tracker.enter_axis(tag);
                        return Ok(());
                    }
                    LabelRow::Abstract(tag) => {
                        self.tracker.enter_abstract(tag);
                        return Ok(());
                    }
                    LabelRow::Item { label, tag } => {
                        row_item = Some(self.push_item(label, tag));
                    }
                },
                Some(CellRole::Value) => {
                    if self.width == 0 {
                        return Err(ParserError::NoColumns { row: index });
                    }
                    if column >= self.width {
                        let found = cells
                            .iter()
                            .filter(|c| CellRole::of(**c) == Some(CellRole::Value))
                            .count();
                        return Err(ParserError::TooManyValues {
                            row: index,
                            found,
                            columns: self.width,
                        });
                    }
                    self.values.push(column, collect_text(cell));
                    column += 1;
                }
                Some(CellRole::Marker) => {
                    let marker = collect_text(cell);
                    match row_item {
                        Some(item) if !marker.is_empty() => self.items[item].markers.push(marker),
                        Some(_) => {}
                        None => tracing::debug!("Row {}: footnote marker without a line item", index),
                    }
                }
                Some(CellRole::ColumnFootnote) => {
                    let text = collect_text(cell);
                    if let (Some(item), false) = (row_item, text.is_empty()) {
                        self.attach_column_footnote(column.saturating_sub(1), item, text);
                    }
                }
                Some(CellRole::Title) | Some(CellRole::ColumnHeader) | None => {}
            }
        }

        Ok(())
    }

    fn push_item(&mut self, label: String, tag: String) -> usize {
        self.items.push(LineItem {
            label,
            tag,
            context: self.tracker.snapshot(),
            markers: Vec::new(),
        });
        for column in &mut self.column_footnotes {
            column.push(String::new());
        }
        self.items.len() - 1
    }

    fn attach_column_footnote(&mut self, column: usize, item: usize, text: String) {
        if self.mode != FootnoteMode::ColumnFootnotes {
            return;
        }
        if let Some(slot) = self
            .column_footnotes
            .get_mut(column)
            .and_then(|c| c.get_mut(item))
        {
            if slot.is_empty() {
                *slot = text;
            } else {
                slot.push(' ');
                slot.push_str(&text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::utils::{TABLE_SELECTOR, own_rows};
    use scraper::Html;

    fn item(tag: &str, label: &str) -> String {
        format!(
            "<td class=\"pl \"><a onclick=\"top.Show.showAR( this, '{}', window );\">{}</a></td>",
            tag, label
        )
    }

    fn parse(html: &str) -> Result<StatementBody, ParserError> {
        let doc = Html::parse_document(html);
        let table = doc.select(&TABLE_SELECTOR).next().unwrap();
        let rows = own_rows(table);
        let variant = FormatVariant::detect(&rows, false);
        parse_body(&rows, variant)
    }

    #[test]
    fn test_single_header_layout() {
        let html = format!(
            "<table>\
             <tr><th class=\"tl\">BALANCE SHEETS - USD ($)</th><th class=\"th\">Dec. 31, 2020</th><th class=\"th\">Dec. 31, 2019</th></tr>\
             <tr>{}<td class=\"nump\">$ 100</td><td class=\"nump\">$ 90</td></tr>\
             </table>",
            item("defref_us-gaap_Cash", "Cash")
        );
        let body = parse(&html).unwrap();

        assert_eq!(body.variant.layout(), Some(HeaderLayout::Single));
        assert_eq!(body.title, "BALANCE SHEETS - USD ($)");
        assert_eq!(body.columns.len(), 2);
        assert_eq!(body.columns[1].label, "Dec. 31, 2019");
        assert!(body.columns[0].duration.is_none());
        assert_eq!(body.values.get(0, 0), Some("$ 100"));
        assert_eq!(body.values.get(1, 0), Some("$ 90"));
    }

    #[test]
    fn test_split_header_expands_duration_groups() {
        let html = format!(
            "<table>\
             <tr><th class=\"tl\" rowspan=\"2\">INCOME - USD ($)</th><th class=\"th\" colspan=\"2\">3 Months Ended</th><th class=\"th\">9 Months Ended</th></tr>\
             <tr><th class=\"th\">Sep. 30, 2020</th><th class=\"th\">Sep. 30, 2019</th><th class=\"th\">Sep. 30, 2020</th></tr>\
             <tr>{}<td class=\"nump\">1</td><td class=\"nump\">2</td><td class=\"nump\">3</td></tr>\
             </table>",
            item("defref_us-gaap_Revenues", "Revenues")
        );
        let body = parse(&html).unwrap();

        assert_eq!(body.variant.header_rows, 2);
        let durations: Vec<_> = body
            .columns
            .iter()
            .map(|c| c.duration.as_deref().unwrap())
            .collect();
        assert_eq!(durations, ["3 Months Ended", "3 Months Ended", "9 Months Ended"]);
        assert_eq!(
            body.columns[1].period_end,
            NaiveDate::from_ymd_opt(2019, 9, 30)
        );
        assert_eq!(body.values.get(2, 0), Some("3"));
    }

    #[test]
    fn test_oversized_colspan_does_not_overflow() {
        let html = format!(
            "<table>\
             <tr><th class=\"tl\" rowspan=\"2\">INCOME - USD ($)</th>\
             <th class=\"th\" colspan=\"18446744073709551615\">3 Months Ended</th><th class=\"th\">9 Months Ended</th></tr>\
             <tr><th class=\"th\">Sep. 30, 2020</th><th class=\"th\">Sep. 30, 2019</th></tr>\
             <tr>{}<td class=\"nump\">1</td><td class=\"nump\">2</td></tr>\
             </table>",
            item("defref_us-gaap_Revenues", "Revenues")
        );
        let body = parse(&html).unwrap();

        assert_eq!(body.columns.len(), 2);
        assert!(
            body.columns
                .iter()
                .all(|c| c.duration.as_deref() == Some("3 Months Ended"))
        );
        body.check_consistency().unwrap();
    }

    #[test]
    fn test_intermediate_header_rows_are_ignored() {
        let html = format!(
            "<table>\
             <tr><th class=\"tl\" rowspan=\"3\">CASH FLOWS - USD ($)</th><th class=\"th\">12 Months Ended</th><th class=\"th\" colspan=\"2\">6 Months Ended</th></tr>\
             <tr><th class=\"th\">Restated</th><th class=\"th\" colspan=\"2\">As reported</th></tr>\
             <tr><th class=\"th\">Dec. 31, 2020</th><th class=\"th\">Jun. 30, 2020</th><th class=\"th\">Jun. 30, 2019</th></tr>\
             <tr>{}<td class=\"nump\">10</td><td class=\"nump\">20</td><td class=\"numn\">(30)</td></tr>\
             <tr>{}<td class=\"nump\">4</td><td class=\"nump\">5</td><td class=\"nump\">6</td></tr>\
             </table>",
            item("defref_us-gaap_NetIncomeLoss", "Net income"),
            item("defref_us-gaap_Depreciation", "Depreciation")
        );
        let body = parse(&html).unwrap();

        assert_eq!(body.variant.header_rows, 3);
        assert_eq!(body.variant.layout(), Some(HeaderLayout::Split));
        assert_eq!(body.title, "CASH FLOWS - USD ($)");

        let labels: Vec<_> = body.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Dec. 31, 2020", "Jun. 30, 2020", "Jun. 30, 2019"]);
        let durations: Vec<_> = body
            .columns
            .iter()
            .map(|c| c.duration.as_deref().unwrap())
            .collect();
        assert_eq!(durations, ["12 Months Ended", "6 Months Ended", "6 Months Ended"]);

        assert_eq!(body.items.len(), 2);
        assert_eq!(body.values.get(0, 0), Some("10"));
        assert_eq!(body.values.get(2, 0), Some("(30)"));
        assert_eq!(body.values.get(1, 1), Some("5"));
        body.check_consistency().unwrap();
    }

    #[test]
    fn test_marker_rows_set_context_and_discard_cells() {
        let html = format!(
            "<table>\
             <tr><th class=\"tl\">T</th><th class=\"th\">Dec. 31, 2020</th></tr>\
             <tr>{}<td class=\"text\">&#160;</td></tr>\
             <tr>{}<td class=\"nump\">5</td></tr>\
             <tr>{}<td class=\"text\">&#160;</td></tr>\
             <tr>{}<td class=\"nump\">6</td></tr>\
             </table>",
            item("defref_us-gaap_AssetsAbstract", "Assets"),
            item("defref_us-gaap_Cash", "Cash"),
            item("defref_us-gaap_SegmentsAxis", "Segments"),
            item("defref_us-gaap_Goodwill", "Goodwill"),
        );
        let body = parse(&html).unwrap();

        assert_eq!(body.items.len(), 2);
        assert_eq!(body.items[0].context.axis, "");
        assert_eq!(body.items[0].context.r#abstract, "defref_us-gaap_AssetsAbstract");
        assert_eq!(body.items[1].context.axis, "defref_us-gaap_SegmentsAxis");
        assert_eq!(body.items[1].context.r#abstract, "defref_us-gaap_AssetsAbstract");
        body.check_consistency().unwrap();
    }

    #[test]
    fn test_value_without_columns() {
        let html = format!(
            "<table><tr><th class=\"tl\">T</th></tr><tr>{}<td class=\"nump\">5</td></tr></table>",
            item("defref_us-gaap_Cash", "Cash")
        );
        assert_eq!(parse(&html).unwrap_err(), ParserError::NoColumns { row: 1 });
    }

    #[test]
    fn test_too_many_values() {
        let html = format!(
            "<table><tr><th class=\"tl\">T</th><th class=\"th\">Dec. 31, 2020</th></tr>\
             <tr>{}<td class=\"nump\">5</td><td class=\"nump\">6</td></tr></table>",
            item("defref_us-gaap_Cash", "Cash")
        );
        assert_eq!(
            parse(&html).unwrap_err(),
            ParserError::TooManyValues {
                row: 1,
                found: 2,
                columns: 1
            }
        );
    }

    #[test]
    fn test_missing_header() {
        let html = format!(
            "<table><tr>{}<td class=\"nump\">5</td></tr></table>",
            item("defref_us-gaap_Cash", "Cash")
        );
        assert_eq!(parse(&html).unwrap_err(), ParserError::MissingHeader);
    }

    #[test]
    fn test_column_values_exceeding_items_is_inconsistent() {
        let html = format!(
            "<table><tr><th class=\"tl\">T</th><th class=\"th\">Dec. 31, 2020</th></tr>\
             <tr>{}<td class=\"nump\">5</td></tr>\
             <tr><td class=\"nump\">7</td></tr></table>",
            item("defref_us-gaap_Cash", "Cash")
        );
        let body = parse(&html).unwrap();
        assert_eq!(
            body.check_consistency().unwrap_err(),
            ParserError::ColumnLength {
                column: 0,
                values: 2,
                items: 1
            }
        );
    }

    #[test]
    fn test_footnote_detection() {
        let shared = format!(
            "<table><tr><th class=\"tl\">T</th><th class=\"th\">D</th></tr>\
             <tr>{}<td class=\"nump\">5</td><td class=\"th\">[1]</td></tr></table>",
            item("defref_us-gaap_Cash", "Cash")
        );
        let body = parse(&shared).unwrap();
        assert_eq!(body.variant.footnotes, FootnoteMode::Shared);
        assert_eq!(body.items[0].markers, ["[1]"]);
        assert!(body.column_footnotes.is_empty());

        let per_column = format!(
            "<table><tr><th class=\"tl\">T</th><th class=\"th\">A</th><th class=\"th\">B</th></tr>\
             <tr>{}<td class=\"nump\">5</td><td class=\"nump\">6</td><td class=\"fn\">[2]</td></tr></table>",
            item("defref_us-gaap_Cash", "Cash")
        );
        let body = parse(&per_column).unwrap();
        assert_eq!(body.variant.footnotes, FootnoteMode::ColumnFootnotes);
        assert_eq!(body.column_footnotes[0][0], "");
        assert_eq!(body.column_footnotes[1][0], "[2]");
        body.check_consistency().unwrap();
    }
}
