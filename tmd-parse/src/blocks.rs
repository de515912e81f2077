//! Block qualification: turns raw blocks into typed, numbered blocks.

use crate::error::{Warning, WarningKind};
use crate::types::{Block, BlockType};

pub const QUALIFIER_SHORT_PREFIX: &str = "(";
pub const QUALIFIER_SHORT_SUFFIX: &str = ")";
pub const QUALIFIER_LONG_PREFIX: &str = "<!--";
pub const QUALIFIER_LONG_SUFFIX: &str = "-->";
pub const QUALIFIER_NAME: &str = "#";
pub const QUALIFIER_INFORMATION: &str = "i";
pub const QUALIFIER_WARNING: &str = "!";
pub const QUALIFIER_DOWNLOAD: &str = "dl";
pub const QUALIFIER_PLAIN_TEXT: &str = "$";

/// Extract the trimmed qualifier from a block's first line.
///
/// Returns `None` when the line is not wrapped in `<!-- -->` or `( )`.
/// `Some("")` means a qualifier wrapper with nothing inside.
pub fn extract_qualifier(line: &str) -> Option<&str> {
    let wrapped = |prefix: &str, suffix: &str| {
        line.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .map(str::trim)
    };
    wrapped(QUALIFIER_LONG_PREFIX, QUALIFIER_LONG_SUFFIX)
        .or_else(|| wrapped(QUALIFIER_SHORT_PREFIX, QUALIFIER_SHORT_SUFFIX))
}

/// Classify every block in place, appending anomalies to `warnings`.
///
/// Step numbers are assigned as blocks are classified; only `NumberedStep`
/// blocks consume a number.
pub fn qualify_blocks(blocks: &mut [Block], warnings: &mut Vec<Warning>) {
    let mut step_number = 1;
    let last = blocks.len().saturating_sub(1);

    for index in 0..blocks.len() {
        let line = blocks[index].starting_line;

        if blocks[index].markdown.trim().is_empty() {
            let block = &mut blocks[index];
            block.block_type = BlockType::Empty;
            block.step_number = None;
            block.name = None;
            // A trailing empty block (empty input, trailing separator) is not a problem.
            if index != last {
                warnings.push(Warning::new(index, line, WarningKind::ContentIsEmpty));
            }
            continue;
        }

        let body = blocks[index].markdown.clone();
        let (first_line, rest) = match body.split_once('\n') {
            Some((first, rest)) => (first, Some(rest)),
            None => (body.as_str(), None),
        };
        let qualifier = extract_qualifier(first_line);

        if qualifier.is_some() {
            match rest {
                Some(rest) => blocks[index].markdown = rest.to_string(),
                None => {
                    let block = &mut blocks[index];
                    block.markdown.clear();
                    block.block_type = BlockType::Empty;
                    block.step_number = None;
                    block.name = None;
                    warnings.push(Warning::new(index, line, WarningKind::ContentIsEmpty));
                    continue;
                }
            }
        }

        let block_type = match qualifier {
            None if first_line.starts_with('#') => BlockType::PlainText,
            None => BlockType::NumberedStep,
            Some(q) if q.starts_with(QUALIFIER_NAME) => {
                let name = q[QUALIFIER_NAME.len()..].trim();
                if name.is_empty() {
                    blocks[index].name = None;
                    warnings.push(Warning::new(index, line, WarningKind::EmptyBlockName));
                } else {
                    let duplicate = blocks
                        .iter()
                        .enumerate()
                        .any(|(i, b)| i != index && b.name.as_deref() == Some(name));
                    if duplicate {
                        warnings.push(
                            Warning::new(index, line, WarningKind::DuplicateBlockName)
                                .with_context(name),
                        );
                    }
                    blocks[index].name = Some(name.to_string());
                }
                BlockType::NumberedStep
            }
            Some(q) if q.eq_ignore_ascii_case(QUALIFIER_INFORMATION) => BlockType::Information,
            Some(QUALIFIER_WARNING) => BlockType::Warning,
            Some(q) if q.eq_ignore_ascii_case(QUALIFIER_DOWNLOAD) => BlockType::Download,
            Some(QUALIFIER_PLAIN_TEXT) => BlockType::PlainText,
            Some("") => {
                warnings.push(Warning::new(index, line, WarningKind::EmptyQualifier));
                BlockType::NumberedStep
            }
            Some(q) => {
                warnings.push(Warning::new(index, line, WarningKind::UnknownQualifier).with_context(q));
                BlockType::NumberedStep
            }
        };

        let block = &mut blocks[index];
        block.block_type = block_type;
        if block_type == BlockType::NumberedStep {
            block.step_number = Some(step_number);
            step_number += 1;
        } else {
            block.step_number = None;
        }
    }
}

/// Assign 1, 2, 3, … to `NumberedStep` blocks in order and clear all other step numbers.
pub fn number_blocks(blocks: &mut [Block]) {
    let mut step_number = 1;
    for block in blocks {
        if block.block_type == BlockType::NumberedStep {
            block.step_number = Some(step_number);
            step_number += 1;
        } else {
            block.step_number = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::load_blocks;
    use pretty_assertions::assert_eq;

    fn qualify(source: &str) -> (Vec<Block>, Vec<Warning>) {
        let mut blocks = load_blocks(source);
        let mut warnings = Vec::new();
        qualify_blocks(&mut blocks, &mut warnings);
        (blocks, warnings)
    }

    fn kinds(warnings: &[Warning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn qualifier_forms() {
        assert_eq!(extract_qualifier("(i)"), Some("i"));
        assert_eq!(extract_qualifier("<!-- dl -->"), Some("dl"));
        assert_eq!(extract_qualifier("( #intro )"), Some("#intro"));
        assert_eq!(extract_qualifier("()"), Some(""));
        assert_eq!(extract_qualifier("<!---->"), Some(""));
        assert_eq!(extract_qualifier("<!-->"), None);
        assert_eq!(extract_qualifier("(i) text"), None);
        assert_eq!(extract_qualifier("Plain line"), None);
    }

    #[test]
    fn classifies_each_qualifier() {
        let (blocks, warnings) = qualify(
            "(i)\nInfo\n- - -\n(!)\nCareful\n- - -\n(dl)\nFile\n- - -\n($)\nText\n- - -\n# Heading\n- - -\nStep",
        );
        let types: Vec<_> = blocks.iter().map(|b| b.block_type).collect();
        assert_eq!(
            types,
            vec![
                BlockType::Information,
                BlockType::Warning,
                BlockType::Download,
                BlockType::PlainText,
                BlockType::PlainText,
                BlockType::NumberedStep,
            ]
        );
        assert!(warnings.is_empty());
        assert_eq!(blocks[0].markdown, "Info");
        assert_eq!(blocks[4].markdown, "# Heading");
        assert_eq!(blocks[5].step_number, Some(1));
    }

    #[test]
    fn information_and_download_are_case_insensitive() {
        let (blocks, warnings) = qualify("(I)\nA\n- - -\n<!-- DL -->\nB");
        assert_eq!(blocks[0].block_type, BlockType::Information);
        assert_eq!(blocks[1].block_type, BlockType::Download);
        assert!(warnings.is_empty());
    }

    #[test]
    fn named_steps_are_numbered_in_sequence() {
        let (blocks, warnings) = qualify("First\n- - -\n(#second)\nSecond\n- - -\n(i)\nNote\n- - -\nThird");
        assert!(warnings.is_empty());
        assert_eq!(blocks[0].step_number, Some(1));
        assert_eq!(blocks[1].step_number, Some(2));
        assert_eq!(blocks[1].name.as_deref(), Some("second"));
        assert_eq!(blocks[1].markdown, "Second");
        assert_eq!(blocks[2].step_number, None);
        assert_eq!(blocks[3].step_number, Some(3));
    }

    #[test]
    fn empty_name_is_cleared_but_still_numbered() {
        let (blocks, warnings) = qualify("(#  )\nBody");
        assert_eq!(kinds(&warnings), vec![WarningKind::EmptyBlockName]);
        assert_eq!(blocks[0].name, None);
        assert_eq!(blocks[0].block_type, BlockType::NumberedStep);
        assert_eq!(blocks[0].step_number, Some(1));
    }

    #[test]
    fn duplicate_name_flags_later_block() {
        let (blocks, warnings) = qualify("(#intro)\nA\n- - -\n(#intro)\nB");
        assert_eq!(kinds(&warnings), vec![WarningKind::DuplicateBlockName]);
        assert_eq!(warnings[0].block_index, 1);
        assert_eq!(warnings[0].line_number, 4);
        assert_eq!(warnings[0].context.as_deref(), Some("intro"));
        assert!(blocks.iter().all(|b| b.block_type == BlockType::NumberedStep));
    }

    #[test]
    fn empty_and_unknown_qualifiers_consume_step_numbers() {
        let (blocks, warnings) = qualify("()\nA\n- - -\n(xyz)\nB\n- - -\nC");
        assert_eq!(
            kinds(&warnings),
            vec![WarningKind::EmptyQualifier, WarningKind::UnknownQualifier]
        );
        assert_eq!(warnings[1].context.as_deref(), Some("xyz"));
        let numbers: Vec<_> = blocks.iter().map(|b| b.step_number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn qualifier_without_body_is_empty() {
        let (blocks, warnings) = qualify("(i)\n- - -\nStep");
        assert_eq!(blocks[0].block_type, BlockType::Empty);
        assert_eq!(blocks[0].markdown, "");
        assert_eq!(kinds(&warnings), vec![WarningKind::ContentIsEmpty]);
        assert_eq!(blocks[1].step_number, Some(1));
    }

    #[test]
    fn empty_middle_block_warns_but_trailing_does_not() {
        let (blocks, warnings) = qualify("A\n- - -\n\n- - -\nB\n- - -\n");
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1].block_type, BlockType::Empty);
        assert_eq!(blocks[3].block_type, BlockType::Empty);
        assert_eq!(kinds(&warnings), vec![WarningKind::ContentIsEmpty]);
        assert_eq!(warnings[0].block_index, 1);
    }

    #[test]
    fn emptied_named_block_loses_its_name() {
        let (mut blocks, _) = qualify("(#setup)\nSetup\n- - -\nSee [#setup]");
        assert_eq!(blocks[0].name.as_deref(), Some("setup"));

        blocks[0].markdown.clear();
        let mut warnings = Vec::new();
        qualify_blocks(&mut blocks, &mut warnings);
        assert_eq!(blocks[0].block_type, BlockType::Empty);
        assert_eq!(blocks[0].name, None);
        assert_eq!(crate::inline::find_step_number(&blocks, "setup"), None);
        assert_eq!(kinds(&warnings), vec![WarningKind::ContentIsEmpty]);
    }

    #[test]
    fn requalifying_plain_steps_is_stable() {
        let (mut blocks, _) = qualify("# Title\n- - -\nOne\n- - -\nTwo");
        let before = blocks.clone();
        let mut warnings = Vec::new();
        qualify_blocks(&mut blocks, &mut warnings);
        assert_eq!(blocks, before);
        assert!(warnings.is_empty());
    }

    #[test]
    fn number_blocks_skips_other_types() {
        let mut blocks = vec![
            Block::new(BlockType::PlainText, "# T"),
            Block::new(BlockType::NumberedStep, "a"),
            Block::new(BlockType::Warning, "w"),
            Block::new(BlockType::NumberedStep, "b"),
        ];
        blocks[2].step_number = Some(9);
        number_blocks(&mut blocks);
        let numbers: Vec<_> = blocks.iter().map(|b| b.step_number).collect();
        assert_eq!(numbers, vec![None, Some(1), None, Some(2)]);
    }
}
