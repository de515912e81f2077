//! The `TmdDocument` facade: load, edit, render and save.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::blocks::{number_blocks, qualify_blocks};
use crate::error::{TmdError, Warning};
use crate::list::{ListExt, check_index};
use crate::markdown::{CmarkEngine, MarkdownEngine};
use crate::parse::{load_blocks, load_blocks_from};
use crate::render_html::{RenderOptions, render_blocks};
use crate::render_tmd::{QualifierStyle, to_tmd};
use crate::types::Block;

/// Result of rendering a document to HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub html: String,
    /// True when no warnings were raised by loading or rendering.
    pub succeeded: bool,
}

/// A Tutorial Markdown document: an ordered list of blocks plus the warnings
/// raised while loading and rendering it.
#[derive(Debug, Clone, Default)]
pub struct TmdDocument {
    blocks: Vec<Block>,
    warnings: Vec<Warning>,
    pub render_options: RenderOptions,
}

impl TmdDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(render_options: RenderOptions) -> Self {
        Self {
            render_options,
            ..Self::default()
        }
    }

    /// Parse `source` into a fresh document with default options.
    pub fn parse(source: &str) -> Self {
        let mut doc = Self::new();
        doc.load(source);
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access for editing. Call [`number_blocks`](Self::number_blocks)
    /// after changing block types.
    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Replace the document with `source`. Returns true when no warnings were raised.
    pub fn load(&mut self, source: &str) -> bool {
        self.replace_blocks(load_blocks(source))
    }

    pub fn load_reader<R: Read>(&mut self, reader: R) -> Result<bool, TmdError> {
        let blocks = load_blocks_from(BufReader::new(reader))?;
        Ok(self.replace_blocks(blocks))
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<bool, TmdError> {
        let file = File::open(path)?;
        self.load_reader(file)
    }

    fn replace_blocks(&mut self, blocks: Vec<Block>) -> bool {
        self.blocks = blocks;
        self.warnings.clear();
        qualify_blocks(&mut self.blocks, &mut self.warnings);
        number_blocks(&mut self.blocks);
        self.warnings.is_empty()
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Recompute step numbers from the current block types.
    pub fn number_blocks(&mut self) {
        number_blocks(&mut self.blocks);
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
        self.number_blocks();
    }

    /// Insert `block` before `index` (`index == len` appends).
    pub fn insert_block(&mut self, index: usize, block: Block) -> Result<(), TmdError> {
        if index > self.blocks.len() {
            return Err(TmdError::IndexOutOfRange {
                index,
                len: self.blocks.len(),
            });
        }
        self.blocks.insert(index, block);
        self.number_blocks();
        Ok(())
    }

    pub fn remove_block(&mut self, index: usize) -> Result<Block, TmdError> {
        check_index(index, self.blocks.len())?;
        let block = self.blocks.remove(index);
        self.number_blocks();
        Ok(block)
    }

    pub fn move_block(&mut self, old_index: usize, new_index: usize) -> Result<(), TmdError> {
        self.blocks.move_item(old_index, new_index)?;
        self.number_blocks();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render with the default `pulldown-cmark` engine built from
    /// `render_options.markdown`.
    pub fn render_html(&mut self) -> RenderOutput {
        let engine = CmarkEngine::new(&self.render_options.markdown);
        self.render_html_with(&engine)
    }

    /// Render with a caller-supplied Markdown engine.
    ///
    /// Step numbers are recomputed first; new warnings are appended to the
    /// ones raised while loading.
    pub fn render_html_with(&mut self, engine: &dyn MarkdownEngine) -> RenderOutput {
        self.number_blocks();
        let html = render_blocks(&self.blocks, &self.render_options, engine, &mut self.warnings);
        RenderOutput {
            html,
            succeeded: self.warnings.is_empty(),
        }
    }

    pub fn render_html_to<W: Write>(&mut self, mut writer: W) -> Result<bool, TmdError> {
        let output = self.render_html();
        writer.write_all(output.html.as_bytes())?;
        Ok(output.succeeded)
    }

    pub fn render_html_file(&mut self, path: impl AsRef<Path>) -> Result<bool, TmdError> {
        let output = self.render_html();
        std::fs::write(path, output.html)?;
        Ok(output.succeeded)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Serialize back to TMD source.
    pub fn save(&self, style: QualifierStyle) -> String {
        to_tmd(&self.blocks, style)
    }

    pub fn save_to<W: Write>(&self, mut writer: W, style: QualifierStyle) -> Result<(), TmdError> {
        writer.write_all(self.save(style).as_bytes())?;
        Ok(())
    }

    pub fn save_file(&self, path: impl AsRef<Path>, style: QualifierStyle) -> Result<(), TmdError> {
        std::fs::write(path, self.save(style))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;
    use crate::types::BlockType;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document() {
        let mut doc = TmdDocument::new();
        assert!(doc.load(""));
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.blocks()[0].block_type, BlockType::Empty);
        let output = doc.render_html();
        assert_eq!(output.html, "");
        assert!(output.succeeded);
        assert!(doc.warnings().is_empty());
    }

    #[test]
    fn information_scenario() {
        let mut doc = TmdDocument::parse("(i)\nHello");
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.blocks()[0].block_type, BlockType::Information);
        let output = doc.render_html();
        assert!(output.succeeded);
        assert!(output.html.starts_with("<table class=\"steps\">\n"));
        assert!(output.html.contains("<td><p>Hello</p></td>"));
        assert!(output.html.ends_with("</table>\n"));
    }

    #[test]
    fn load_replaces_previous_state() {
        let mut doc = TmdDocument::new();
        assert!(!doc.load("(xyz)\nA"));
        assert_eq!(doc.warnings().len(), 1);
        assert!(doc.load("B"));
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.blocks()[0].markdown, "B");
    }

    #[test]
    fn render_warnings_accumulate_after_load_warnings() {
        let mut doc = TmdDocument::new();
        assert!(!doc.load("(#a)\nA\n- - -\n(#a)\nB\n- - -\nSee [#nope]"));
        let output = doc.render_html();
        assert!(!output.succeeded);
        let kinds: Vec<_> = doc.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::DuplicateBlockName, WarningKind::UnknownBlockNameLink]
        );
        assert!(output.html.contains("See [#nope]"));
    }

    #[test]
    fn editing_renumbers_steps() {
        let mut doc = TmdDocument::parse("A\n- - -\n(i)\nNote\n- - -\nB");
        doc.move_block(2, 0).unwrap();
        let numbers: Vec<_> = doc.blocks().iter().map(|b| b.step_number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), None]);
        assert_eq!(doc.blocks()[0].markdown, "B");

        doc.insert_block(1, Block::new(BlockType::NumberedStep, "New")).unwrap();
        assert_eq!(doc.blocks()[2].step_number, Some(3));

        let removed = doc.remove_block(0).unwrap();
        assert_eq!(removed.markdown, "B");
        assert_eq!(doc.blocks()[0].step_number, Some(1));

        assert!(matches!(
            doc.remove_block(10),
            Err(TmdError::IndexOutOfRange { index: 10, .. })
        ));
        assert!(doc.insert_block(99, Block::default()).is_err());
    }

    #[test]
    fn render_renumbers_after_direct_edits() {
        let mut doc = TmdDocument::parse("A\n- - -\nB");
        doc.blocks_mut()[0].block_type = BlockType::Warning;
        let output = doc.render_html();
        assert_eq!(doc.blocks()[1].step_number, Some(1));
        assert!(output.html.contains("data-step-seqid=\"1\""));
    }

    #[test]
    fn save_round_trip() {
        let source = "# Intro\n- - -\n(#first)\nDo it\n- - -\n(!)\nCareful\n- - -\nThen [#first]\n";
        let doc = TmdDocument::parse(source);
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.save(QualifierStyle::Short), source);

        let long = doc.save(QualifierStyle::Long);
        let reloaded = TmdDocument::parse(&long);
        assert_eq!(reloaded.blocks(), doc.blocks());
    }

    #[test]
    fn reader_and_writer_variants() {
        let mut doc = TmdDocument::new();
        assert!(doc.load_reader("A\n- - -\n(dl)\nB".as_bytes()).unwrap());
        let mut html = Vec::new();
        assert!(doc.render_html_to(&mut html).unwrap());
        assert!(String::from_utf8(html).unwrap().contains("class=\"download\""));
        let mut tmd = Vec::new();
        doc.save_to(&mut tmd, QualifierStyle::Short).unwrap();
        assert_eq!(String::from_utf8(tmd).unwrap(), "A\n- - -\n(dl)\nB\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut doc = TmdDocument::new();
        assert!(matches!(
            doc.load_file("/definitely/not/here.md"),
            Err(TmdError::Io(_))
        ));
    }
}
