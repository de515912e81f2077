use serde::{Deserialize, Serialize};

/// Classification of a block after qualification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    /// No content. Skipped by the renderer and the serializer.
    #[default]
    Empty,
    /// A table row carrying a sequential step number, optionally named.
    NumberedStep,
    /// Free-flowing content rendered outside the steps table.
    PlainText,
    Information,
    Warning,
    Download,
}

impl BlockType {
    /// Whether blocks of this type are rendered as rows of the steps table.
    pub fn is_table_row(self) -> bool {
        matches!(
            self,
            BlockType::NumberedStep | BlockType::Information | BlockType::Warning | BlockType::Download
        )
    }
}

/// One `- - -` delimited unit of a TMD document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Sequential number, present only for `NumberedStep` blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    /// 1-based source line where the block began.
    pub starting_line: usize,
    /// Anchor name of an explicitly named step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Block body with the qualifier line removed.
    pub markdown: String,
}

impl Default for Block {
    fn default() -> Self {
        Self {
            block_type: BlockType::Empty,
            step_number: None,
            starting_line: 1,
            name: None,
            markdown: String::new(),
        }
    }
}

impl Block {
    /// Create a block of the given type with the given body.
    ///
    /// Step numbers are not assigned here; call
    /// [`TmdDocument::number_blocks`](crate::TmdDocument::number_blocks) after editing.
    pub fn new(block_type: BlockType, markdown: impl Into<String>) -> Self {
        Self {
            block_type,
            markdown: markdown.into(),
            ..Default::default()
        }
    }

    /// Create a named numbered step.
    pub fn named_step(name: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            block_type: BlockType::NumberedStep,
            name: Some(name.into()),
            markdown: markdown.into(),
            ..Default::default()
        }
    }

    /// The block's name, treating whitespace-only names as absent.
    pub fn effective_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}
