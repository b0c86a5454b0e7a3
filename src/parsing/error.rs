use thiserror::Error;

/// Which part of the failure taxonomy a [`ParserError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectKind {
    /// An expected row, column or table is absent from the document.
    Structure,
    /// Collected sequences disagree in length.
    Consistency,
    /// The filing summary manifest could not be read.
    Summary,
}

/// Errors raised while turning a rendered document into structured data.
///
/// Every variant aborts the current document only. Row indices are zero-based
/// positions in the statement table, counting header rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("no statement table found")]
    MissingTable,

    #[error("statement table has no header row")]
    MissingHeader,

    #[error("row {row}: value cell appears before any column header")]
    NoColumns { row: usize },

    #[error("row {row}: line item label carries no inline reference")]
    MissingReference { row: usize },

    #[error("no detail table for tag {tag}")]
    MissingDetails { tag: String },

    #[error("detail table for tag {tag} has no {field} cell")]
    MissingDetailField { tag: String, field: &'static str },

    #[error("{markers} footnote marker(s) present but no footnote index table")]
    MissingFootnoteTable { markers: usize },

    #[error("row {row}: {found} values but only {columns} columns")]
    TooManyValues {
        row: usize,
        found: usize,
        columns: usize,
    },

    #[error("column {column} holds {values} values but {items} items were recorded")]
    ColumnLength {
        column: usize,
        values: usize,
        items: usize,
    },

    #[error("value matrix has {width} columns but the header defines {columns}")]
    MatrixWidth { columns: usize, width: usize },

    #[error("document is not valid UTF-8 after byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("invalid filing summary: {0}")]
    InvalidSummary(String),
}

impl ParserError {
    pub fn kind(&self) -> DefectKind {
        match self {
            ParserError::MissingTable
            | ParserError::MissingHeader
            | ParserError::NoColumns { .. }
            | ParserError::MissingReference { .. }
            | ParserError::MissingDetails { .. }
            | ParserError::MissingDetailField { .. }
            | ParserError::MissingFootnoteTable { .. }
            | ParserError::InvalidUtf8 { .. } => DefectKind::Structure,
            ParserError::TooManyValues { .. }
            | ParserError::ColumnLength { .. }
            | ParserError::MatrixWidth { .. } => DefectKind::Consistency,
            ParserError::InvalidSummary(_) => DefectKind::Summary,
        }
    }
}

impl From<quick_xml::DeError> for ParserError {
    fn from(error: quick_xml::DeError) -> Self {
        ParserError::InvalidSummary(error.to_string())
    }
}
