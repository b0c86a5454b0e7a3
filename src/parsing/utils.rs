use chrono::NaiveDate;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

pub(crate) static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));
pub(crate) static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid tr selector"));
pub(crate) static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));
pub(crate) static P_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid p selector"));

/// Full text of an element with runs of whitespace (including `&nbsp;`)
/// collapsed to single spaces.
pub fn collect_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for word in element.text().flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Element children of `element`, skipping text and comment nodes.
pub(crate) fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// The `td`/`th` cells owned directly by a table row, in document order.
pub(crate) fn row_cells<'a>(row: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    child_elements(row)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .collect()
}

/// Rows belonging to `table` itself, excluding rows of nested tables.
pub(crate) fn own_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let table_id = table.id();
    table
        .select(&TR_SELECTOR)
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "table")
                .is_some_and(|owner| owner.id() == table_id)
        })
        .collect()
}

pub(crate) fn has_class(element: ElementRef<'_>, token: &str) -> bool {
    element.value().classes().any(|c| c == token)
}

/// Largest `colspan` browsers honour.
const MAX_COLSPAN: usize = 1000;

pub(crate) fn colspan(cell: ElementRef<'_>) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map(|n| n.min(MAX_COLSPAN))
        .unwrap_or(1)
}

/// Strips whitespace and enclosing brackets so `[1]`, ` 1 ` and `1` compare equal.
pub fn normalize_marker(marker: &str) -> &str {
    marker
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
}

/// Interprets a rendered amount such as `$ 1,234`, `(56)` or `$ (7.5)`.
///
/// Parentheses denote a negative value. Returns `None` for blank or textual cells.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let negative = trimmed.contains('(') && trimmed.contains(')');
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')' | '%') && !c.is_whitespace())
        .collect();

    if digits.is_empty() || !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = digits.parse::<f64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Parses a column label of the form `Dec. 31, 2020` (optionally preceded by
/// other words) into a calendar date.
pub fn parse_column_date(label: &str) -> Option<NaiveDate> {
    let cleaned = label.replace('.', "");
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() < 3 {
        return None;
    }
    let tail = words[words.len() - 3..].join(" ");

    NaiveDate::parse_from_str(&tail, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(&tail, "%B %d, %Y"))
        .ok()
}
