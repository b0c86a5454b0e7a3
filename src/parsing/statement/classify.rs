//! Presentation-class vocabulary of rendered statement tables.
//!
//! The renderer marks every cell with a class token. The union of the
//! spellings seen across rendering versions is accepted (`pl`, `pl `,
//! `pl custom` all denote a label cell).

use crate::parsing::error::ParserError;
use crate::parsing::utils::{ANCHOR_SELECTOR, collect_text};
use scraper::ElementRef;

/// What a single cell contributes to the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    /// `th.tl`: the statement title.
    Title,
    /// `th.th`: a date or duration label.
    ColumnHeader,
    /// `td.pl`: line item, axis marker or abstract marker.
    Label,
    /// `td.nump`, `td.num`, `td.numn`, `td.text`: one value.
    Value,
    /// `td.th`: footnote reference shared through the footnote index table.
    Marker,
    /// `td.fn`: footnote bound to the preceding value's column.
    ColumnFootnote,
}

impl CellRole {
    const HEADER_CLASSES: &'static [(&'static str, CellRole)] =
        &[("tl", CellRole::Title), ("th", CellRole::ColumnHeader)];

    const DATA_CLASSES: &'static [(&'static str, CellRole)] = &[
        ("pl", CellRole::Label),
        ("nump", CellRole::Value),
        ("num", CellRole::Value),
        ("numn", CellRole::Value),
        ("text", CellRole::Value),
        ("th", CellRole::Marker),
        ("fn", CellRole::ColumnFootnote),
    ];

    /// Classifies a `td`/`th` cell, or `None` for cells outside the vocabulary.
    pub fn of(cell: ElementRef<'_>) -> Option<CellRole> {
        let table = match cell.value().name() {
            "th" => Self::HEADER_CLASSES,
            "td" => Self::DATA_CLASSES,
            _ => return None,
        };
        let classes: Vec<&str> = cell.value().classes().collect();

        table
            .iter()
            .find(|(token, _)| classes.contains(token))
            .map(|(_, role)| *role)
    }
}

/// A classified label cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelRow {
    Axis(String),
    Abstract(String),
    Item { label: String, tag: String },
}

impl LabelRow {
    /// Reads the cell's inline reference and decides what kind of row it opens.
    pub fn from_cell(cell: ElementRef<'_>, row: usize) -> Result<LabelRow, ParserError> {
        let tag = cell
            .select(&ANCHOR_SELECTOR)
            .find_map(|a| a.value().attr("onclick").and_then(reference_id))
            .ok_or(ParserError::MissingReference { row })?;

        if tag.contains("Axis") {
            return Ok(LabelRow::Axis(tag));
        }
        if tag.contains("Abstract") {
            return Ok(LabelRow::Abstract(tag));
        }

        Ok(LabelRow::Item {
            label: collect_text(cell),
            tag,
        })
    }
}

/// Extracts the element id from a `top.Show.showAR( this, 'defref_...', window );` handler.
pub fn reference_id(onclick: &str) -> Option<String> {
    let start = onclick.find('\'')? + 1;
    let len = onclick[start..].find('\'')?;
    let id = onclick[start..start + len].trim();
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first_cell(html: &Html) -> ElementRef<'_> {
        let selector = Selector::parse("td, th").unwrap();
        html.select(&selector).next().unwrap()
    }

    fn table(row: &str) -> Html {
        Html::parse_document(&format!("<table><tr>{}</tr></table>", row))
    }

    #[test]
    fn test_roles_by_element_and_class() {
        let cases = [
            ("<th class=\"tl\">Title</th>", Some(CellRole::Title)),
            ("<th class=\"th\">Dec. 31, 2020</th>", Some(CellRole::ColumnHeader)),
            ("<td class=\"pl \">x</td>", Some(CellRole::Label)),
            ("<td class=\"pl custom\">x</td>", Some(CellRole::Label)),
            ("<td class=\"nump\">1</td>", Some(CellRole::Value)),
            ("<td class=\"num\">(1)</td>", Some(CellRole::Value)),
            ("<td class=\"text\">&#160;</td>", Some(CellRole::Value)),
            ("<td class=\"th\">[1]</td>", Some(CellRole::Marker)),
            ("<td class=\"fn\">[2]</td>", Some(CellRole::ColumnFootnote)),
            ("<td class=\"other\">?</td>", None),
            ("<td>plain</td>", None),
        ];

        for (cell, expected) in cases {
            let html = table(cell);
            assert_eq!(CellRole::of(first_cell(&html)), expected, "{}", cell);
        }
    }

    #[test]
    fn test_reference_id() {
        assert_eq!(
            reference_id("top.Show.showAR( this, 'defref_us-gaap_Assets', window );"),
            Some("defref_us-gaap_Assets".to_string())
        );
        assert_eq!(reference_id("top.Show.hideAR();"), None);
        assert_eq!(reference_id("f('')"), None);
    }

    #[test]
    fn test_label_rows() {
        let html = table(
            "<td class=\"pl \"><a onclick=\"top.Show.showAR( this, 'defref_us-gaap_SegmentsAxis', window );\">Segments [Axis]</a></td>",
        );
        assert_eq!(
            LabelRow::from_cell(first_cell(&html), 3).unwrap(),
            LabelRow::Axis("defref_us-gaap_SegmentsAxis".to_string())
        );

        let html = table(
            "<td class=\"pl \"><a onclick=\"top.Show.showAR( this, 'defref_us-gaap_AssetsAbstract', window );\">Assets [Abstract]</a></td>",
        );
        assert_eq!(
            LabelRow::from_cell(first_cell(&html), 3).unwrap(),
            LabelRow::Abstract("defref_us-gaap_AssetsAbstract".to_string())
        );

        let html = table(
            "<td class=\"pl custom\"><a onclick=\"top.Show.showAR( this, 'defref_us-gaap_Cash', window );\">Cash and   equivalents</a></td>",
        );
        assert_eq!(
            LabelRow::from_cell(first_cell(&html), 3).unwrap(),
            LabelRow::Item {
                label: "Cash and equivalents".to_string(),
                tag: "defref_us-gaap_Cash".to_string()
            }
        );
    }

    #[test]
    fn test_label_without_reference() {
        let html = table("<td class=\"pl \">Orphan label</td>");
        assert_eq!(
            LabelRow::from_cell(first_cell(&html), 5),
            Err(ParserError::MissingReference { row: 5 })
        );
    }
}
