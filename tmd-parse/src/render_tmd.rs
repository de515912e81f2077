//! TMD writer.
//!
//! Reconstructs TMD source from a block list, reinstating qualifier lines so
//! that loading the output yields the same blocks again.

use serde::{Deserialize, Serialize};

use crate::blocks::{
    QUALIFIER_DOWNLOAD, QUALIFIER_INFORMATION, QUALIFIER_LONG_PREFIX, QUALIFIER_LONG_SUFFIX,
    QUALIFIER_NAME, QUALIFIER_PLAIN_TEXT, QUALIFIER_SHORT_PREFIX, QUALIFIER_SHORT_SUFFIX,
    QUALIFIER_WARNING,
};
use crate::parse::BLOCK_SEPARATOR;
use crate::types::{Block, BlockType};

/// Notation used for qualifier lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualifierStyle {
    /// `(i)`
    #[default]
    Short,
    /// `<!-- i -->`
    Long,
}

impl QualifierStyle {
    fn wrap(self, qualifier: &str) -> String {
        match self {
            QualifierStyle::Short => {
                format!("{QUALIFIER_SHORT_PREFIX}{qualifier}{QUALIFIER_SHORT_SUFFIX}")
            }
            QualifierStyle::Long => {
                format!("{QUALIFIER_LONG_PREFIX} {qualifier} {QUALIFIER_LONG_SUFFIX}")
            }
        }
    }
}

/// The qualifier a block needs to be classified as its current type, if any.
fn qualifier_for(block: &Block) -> Option<String> {
    match block.block_type {
        BlockType::Empty => None,
        BlockType::NumberedStep => block
            .effective_name()
            .map(|name| format!("{QUALIFIER_NAME}{name}")),
        BlockType::PlainText if block.markdown.starts_with('#') => None,
        BlockType::PlainText => Some(QUALIFIER_PLAIN_TEXT.to_string()),
        BlockType::Information => Some(QUALIFIER_INFORMATION.to_string()),
        BlockType::Warning => Some(QUALIFIER_WARNING.to_string()),
        BlockType::Download => Some(QUALIFIER_DOWNLOAD.to_string()),
    }
}

/// Serialize `blocks` as TMD source.
///
/// Empty blocks produce no output. A separator line follows every non-empty
/// block except the final block of the list.
pub fn to_tmd(blocks: &[Block], style: QualifierStyle) -> String {
    let mut out = String::new();
    let last = blocks.len().saturating_sub(1);

    for (index, block) in blocks.iter().enumerate() {
        if block.block_type == BlockType::Empty {
            continue;
        }

        if let Some(qualifier) = qualifier_for(block) {
            out.push_str(&style.wrap(&qualifier));
            out.push('\n');
        }
        out.push_str(&block.markdown);
        out.push('\n');

        if index != last {
            out.push_str(BLOCK_SEPARATOR);
            out.push('\n');
        }
    }

    out
}
