//! Block loader: splits TMD source into raw, unqualified blocks.

use std::io::BufRead;

use crate::types::Block;

/// Line separating two blocks (surrounding whitespace is ignored).
pub const BLOCK_SEPARATOR: &str = "- - -";

/// Prefix of a line that opens or closes a fenced code region.
const CODE_FENCE: &str = "```";

/// Split `source` into blocks on separator lines outside fenced code.
///
/// The result is never empty: empty input yields one empty block starting at
/// line 1, and a trailing separator yields a trailing empty block.
pub fn load_blocks(source: &str) -> Vec<Block> {
    split_lines(source.lines())
}

/// Same as [`load_blocks`], reading lines from `reader`.
pub fn load_blocks_from<R: BufRead>(reader: R) -> std::io::Result<Vec<Block>> {
    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
    Ok(split_lines(lines.iter().map(String::as_str)))
}

fn split_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut buffer = String::new();
    let mut starting_line = 1;
    let mut in_code_fence = false;

    for (idx, line) in lines.enumerate() {
        let line_number = idx + 1;

        if !in_code_fence && line.trim() == BLOCK_SEPARATOR {
            blocks.push(finish_block(&buffer, starting_line));
            buffer.clear();
            starting_line = line_number + 1;
            continue;
        }

        // Any fence line flips the state; opening and closing fences are not matched.
        if line.starts_with(CODE_FENCE) {
            in_code_fence = !in_code_fence;
        }

        buffer.push_str(line);
        buffer.push('\n');
    }

    blocks.push(finish_block(&buffer, starting_line));
    blocks
}

fn finish_block(buffer: &str, starting_line: usize) -> Block {
    Block {
        starting_line,
        markdown: buffer.trim_matches('\n').to_string(),
        ..Default::default()
    }
}
