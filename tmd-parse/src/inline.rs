//! Step link scanner.
//!
//! Resolves `[#name]` references in prose to links pointing at the numbered
//! step carrying that name. The Markdown engine feeds it only text outside
//! code, so references inside code blocks and code spans stay literal.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Warning, WarningKind};
use crate::render_html::format_template;
use crate::types::Block;

fn step_link_regex() -> &'static Regex {
    static STEP_LINK: OnceLock<Regex> = OnceLock::new();
    STEP_LINK.get_or_init(|| Regex::new(r"\[#([0-9A-Za-z_-]+)\]").expect("Invalid step link regex"))
}

/// Return the names referenced by `[#name]` links in `markdown`, in order.
pub fn scan_step_links(markdown: &str) -> Vec<&str> {
    step_link_regex()
        .captures_iter(markdown)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Find the step number of the block named `name`.
pub fn find_step_number(blocks: &[Block], name: &str) -> Option<u32> {
    blocks
        .iter()
        .find(|b| b.name.as_deref() == Some(name))
        .and_then(|b| b.step_number)
}

/// A run of text split at step links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPiece<'t> {
    /// Literal text, still to be escaped by the caller.
    Text(&'t str),
    /// Ready-made link markup.
    Link(String),
}

/// Resolves step links for one block during rendering.
///
/// Holds the block list, the link template and the warning sink for the
/// block being rendered. Unresolvable references are kept as text and
/// reported as [`WarningKind::UnknownBlockNameLink`].
pub struct StepLinks<'a> {
    blocks: &'a [Block],
    link_template: &'a str,
    block_index: usize,
    line_number: usize,
    warnings: &'a mut Vec<Warning>,
}

impl<'a> StepLinks<'a> {
    /// `link_template` takes `{0}` = `#name` and `{1}` = step number.
    pub fn new(
        blocks: &'a [Block],
        link_template: &'a str,
        block_index: usize,
        line_number: usize,
        warnings: &'a mut Vec<Warning>,
    ) -> Self {
        Self {
            blocks,
            link_template,
            block_index,
            line_number,
            warnings,
        }
    }

    /// Split `text` into literal runs and resolved links.
    pub fn split<'t>(&mut self, text: &'t str) -> Vec<LinkPiece<'t>> {
        let mut pieces = Vec::new();
        let mut last = 0;

        for caps in step_link_regex().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let name = &caps[1];
            let Some(number) = find_step_number(self.blocks, name) else {
                self.warnings.push(
                    Warning::new(self.block_index, self.line_number, WarningKind::UnknownBlockNameLink)
                        .with_context(name),
                );
                continue;
            };

            if whole.start() > last {
                pieces.push(LinkPiece::Text(&text[last..whole.start()]));
            }
            pieces.push(LinkPiece::Link(format_template(
                self.link_template,
                &[&format!("#{name}"), &number],
            )));
            last = whole.end();
        }

        if last < text.len() {
            pieces.push(LinkPiece::Text(&text[last..]));
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;
    use pretty_assertions::assert_eq;

    const LINK: &str = "<a href=\"{0}\">{1}</a>";

    fn named(name: &str, number: u32) -> Block {
        let mut block = Block::named_step(name, "x");
        block.step_number = Some(number);
        block
    }

    #[test]
    fn scans_names_in_order() {
        assert_eq!(
            scan_step_links("See [#a] and [#b-2_c], not [#] or [#sp ace] or [link](#x)"),
            vec!["a", "b-2_c"]
        );
    }

    #[test]
    fn resolves_known_names() {
        let blocks = vec![Block::new(BlockType::NumberedStep, "one"), named("setup", 2)];
        let mut warnings = Vec::new();
        let mut links = StepLinks::new(&blocks, LINK, 0, 1, &mut warnings);
        assert_eq!(
            links.split("Repeat [#setup]."),
            vec![
                LinkPiece::Text("Repeat "),
                LinkPiece::Link("<a href=\"#setup\">2</a>".into()),
                LinkPiece::Text("."),
            ]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_name_is_left_and_reported() {
        let blocks = vec![named("setup", 1)];
        let mut warnings = Vec::new();
        let mut links = StepLinks::new(&blocks, LINK, 3, 12, &mut warnings);
        assert_eq!(
            links.split("Go to [#missing] or [#setup]"),
            vec![
                LinkPiece::Text("Go to [#missing] or "),
                LinkPiece::Link("<a href=\"#setup\">1</a>".into()),
            ]
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnknownBlockNameLink);
        assert_eq!(warnings[0].block_index, 3);
        assert_eq!(warnings[0].line_number, 12);
        assert_eq!(warnings[0].context.as_deref(), Some("missing"));
    }

    #[test]
    fn text_without_links_is_one_piece() {
        let mut warnings = Vec::new();
        let mut links = StepLinks::new(&[], LINK, 0, 1, &mut warnings);
        assert_eq!(links.split("No links here"), vec![LinkPiece::Text("No links here")]);
        assert!(links.split("").is_empty());
    }

    #[test]
    fn name_without_step_number_is_unknown() {
        let blocks = vec![Block::named_step("orphan", "x")];
        let mut warnings = Vec::new();
        let mut links = StepLinks::new(&blocks, LINK, 0, 1, &mut warnings);
        assert_eq!(links.split("[#orphan]"), vec![LinkPiece::Text("[#orphan]")]);
        assert_eq!(warnings.len(), 1);
    }
}
