use std::fmt;

use serde::{Deserialize, Serialize};

/// Fatal errors that abort a single operation.
#[derive(Debug, thiserror::Error)]
pub enum TmdError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index {index} is out of range for a list of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("List is empty")]
    EmptyList,

    #[error("Item not found in list")]
    ItemNotFound,

    #[error("Markdown rendering failed: {message}")]
    Markdown { message: String },
}

/// Kind of a non-fatal problem found while loading or rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    ContentIsEmpty,
    EmptyBlockName,
    DuplicateBlockName,
    UnknownQualifier,
    EmptyQualifier,
    UnknownBlockNameLink,
    Exception,
}

impl WarningKind {
    /// Stable short code, e.g. `W003`.
    pub fn code(self) -> &'static str {
        match self {
            WarningKind::ContentIsEmpty => "W001",
            WarningKind::EmptyBlockName => "W002",
            WarningKind::DuplicateBlockName => "W003",
            WarningKind::UnknownQualifier => "W004",
            WarningKind::EmptyQualifier => "W005",
            WarningKind::UnknownBlockNameLink => "W006",
            WarningKind::Exception => "W007",
        }
    }
}

/// A diagnostic raised while loading or rendering a document.
///
/// Warnings never stop processing: the document is always fully loaded and
/// rendered, and success is reported as "no warnings".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// 0-based index of the offending block at the time of detection.
    pub block_index: usize,
    /// Starting line of the offending block.
    pub line_number: usize,
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Warning {
    pub fn new(block_index: usize, line_number: usize, kind: WarningKind) -> Self {
        Self {
            block_index,
            line_number,
            kind,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Human-readable description without the location prefix.
    pub fn message(&self) -> String {
        let context = self.context.as_deref().unwrap_or_default();
        match self.kind {
            WarningKind::ContentIsEmpty => "Block content is empty".to_string(),
            WarningKind::EmptyBlockName => "Block name is empty".to_string(),
            WarningKind::DuplicateBlockName => format!("Duplicate block name '{context}'"),
            WarningKind::UnknownQualifier => format!("Unknown block qualifier '{context}'"),
            WarningKind::EmptyQualifier => "Block qualifier is empty".to_string(),
            WarningKind::UnknownBlockNameLink => format!("Link to unknown block name '{context}'"),
            WarningKind::Exception => format!("Exception while rendering block: {context}"),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block {} (line {}): [{}] {}",
            self.block_index,
            self.line_number,
            self.kind.code(),
            self.message()
        )
    }
}
