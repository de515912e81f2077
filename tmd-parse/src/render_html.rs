//! HTML renderer.
//!
//! Walks qualified blocks and lays them out as rows of a steps table, with
//! plain text blocks breaking out of the table. Block bodies go through a
//! [`MarkdownEngine`]; failures and empty output become warnings.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::{Warning, WarningKind};
use crate::hash::{HashAlgorithm, content_hash};
use crate::inline::StepLinks;
use crate::markdown::{MarkdownEngine, MarkdownOptions};
use crate::types::{Block, BlockType};

/// Templates and settings controlling HTML output.
///
/// Templates use positional placeholders (`{0}`, `{1}`, …), see
/// [`format_template`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Render plain text blocks as table rows instead of closing the table.
    pub single_table_layout: bool,
    pub table_begin_template: String,
    pub table_end_template: String,
    /// {0} step number, {1} content hash, {2} HTML, {3} block index.
    pub numbered_step_template: String,
    /// {0} name, {1} step number, {2} content hash, {3} HTML, {4} block index.
    pub named_step_template: String,
    /// {0} HTML, {1} block index.
    pub information_template: String,
    /// {0} HTML, {1} block index.
    pub warning_template: String,
    /// {0} HTML, {1} block index.
    pub download_template: String,
    /// {0} HTML, {1} block index. Used only with `single_table_layout`.
    pub plain_template: String,
    /// {0} block index. Written after every table row when non-empty.
    pub after_step_template: String,
    /// {0} anchor href (`#name`), {1} step number.
    pub step_link_template: String,
    pub hash_algorithm: HashAlgorithm,
    pub markdown: MarkdownOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            single_table_layout: false,
            table_begin_template: "<table class=\"steps\">".into(),
            table_end_template: "</table>".into(),
            numbered_step_template: "<tr data-block-index=\"{3}\" data-step-seqid=\"{0}\" data-step-hash=\"{1}\">\n\t<th>{0}.</th>\n\t<td>{2}</td>\n</tr>".into(),
            named_step_template: "<tr data-block-index=\"{4}\" id=\"{0}\" data-step-seqid=\"{1}\" data-step-hash=\"{2}\">\n\t<th>{1}.</th>\n\t<td>{3}</td>\n</tr>".into(),
            information_template: "<tr data-block-index=\"{1}\" class=\"information\">\n\t<th>&#x1F6C8;</th>\n\t<td>{0}</td>\n</tr>".into(),
            warning_template: "<tr data-block-index=\"{1}\" class=\"warning\">\n\t<th>&#x26A0;</th>\n\t<td>{0}</td>\n</tr>".into(),
            download_template: "<tr data-block-index=\"{1}\" class=\"download\">\n\t<th>&#x1F5AB;</th>\n\t<td>{0}</td>\n</tr>".into(),
            plain_template: "<tr data-block-index=\"{1}\" class=\"plain\">\n\t<td colspan=\"2\">{0}</td>\n</tr>".into(),
            after_step_template: String::new(),
            step_link_template: "<a href=\"{0}\">{1}</a>".into(),
            hash_algorithm: HashAlgorithm::default(),
            markdown: MarkdownOptions::default(),
        }
    }
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Substitute positional placeholders `{n}` in `template` with `args[n]`.
///
/// `{{` and `}}` produce literal braces. Placeholders whose index is out of
/// range, and any other brace text, are copied through unchanged.
pub fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(close) = tail.find('}') {
                let inner = &tail[1..close];
                if let Some(arg) = inner.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    out.push_str(&arg.to_string());
                    rest = &tail[close + 1..];
                    continue;
                }
            }
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

/// Open/closed state of the steps table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    Closed,
    Open,
}

/// Accumulates output lines and tracks whether the steps table is open.
struct HtmlWriter<'o> {
    options: &'o RenderOptions,
    html: String,
    table: TableState,
}

impl<'o> HtmlWriter<'o> {
    fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            html: String::new(),
            table: TableState::Closed,
        }
    }

    fn line(&mut self, s: &str) {
        self.html.push_str(s);
        self.html.push('\n');
    }

    fn open_table(&mut self) {
        if self.table == TableState::Closed {
            let options = self.options;
            self.line(&options.table_begin_template);
            self.table = TableState::Open;
        }
    }

    fn close_table(&mut self) {
        if self.table == TableState::Open {
            let options = self.options;
            self.line(&options.table_end_template);
            self.table = TableState::Closed;
        }
    }

    fn row(&mut self, row: String, block_index: usize) {
        self.open_table();
        self.line(&row);
        if !self.options.after_step_template.is_empty() {
            let after = format_template(&self.options.after_step_template, &[&block_index]);
            self.line(&after);
        }
    }

    fn finish(mut self) -> String {
        self.close_table();
        self.html
    }
}

/// Render `blocks` to HTML, appending any problems to `warnings`.
///
/// Never fails: engine errors are rendered inline and reported as
/// [`WarningKind::Exception`].
pub fn render_blocks(
    blocks: &[Block],
    options: &RenderOptions,
    engine: &dyn MarkdownEngine,
    warnings: &mut Vec<Warning>,
) -> String {
    let mut writer = HtmlWriter::new(options);

    for (index, block) in blocks.iter().enumerate() {
        if block.block_type == BlockType::Empty {
            continue;
        }
        let line = block.starting_line;

        let mut links = StepLinks::new(blocks, &options.step_link_template, index, line, warnings);
        let html = match engine.render(&block.markdown, &mut links) {
            Ok(html) => html.trim().to_string(),
            Err(e) => {
                warnings.push(
                    Warning::new(index, line, WarningKind::Exception).with_context(e.to_string()),
                );
                format!(
                    "<p><b>{}</b></p><pre>{}</pre>",
                    escape_html(&e.to_string()),
                    escape_html(&format!("{e:?}"))
                )
            }
        };

        if html.trim().is_empty() {
            warnings.push(Warning::new(index, line, WarningKind::ContentIsEmpty));
            continue;
        }

        let hash = content_hash(options.hash_algorithm, &html);

        match block.block_type {
            BlockType::Empty => unreachable!("empty blocks are skipped before rendering"),
            BlockType::PlainText if options.single_table_layout => {
                let row = format_template(&options.plain_template, &[&html, &index]);
                writer.row(row, index);
            }
            BlockType::PlainText => {
                writer.close_table();
                writer.line(&html);
            }
            BlockType::Information => {
                let row = format_template(&options.information_template, &[&html, &index]);
                writer.row(row, index);
            }
            BlockType::Warning => {
                let row = format_template(&options.warning_template, &[&html, &index]);
                writer.row(row, index);
            }
            BlockType::Download => {
                let row = format_template(&options.download_template, &[&html, &index]);
                writer.row(row, index);
            }
            BlockType::NumberedStep => {
                let number = StepNumber(block.step_number);
                let row = match block.effective_name() {
                    Some(name) => format_template(
                        &options.named_step_template,
                        &[&name, &number, &hash, &html, &index],
                    ),
                    None => format_template(
                        &options.numbered_step_template,
                        &[&number, &hash, &html, &index],
                    ),
                };
                writer.row(row, index);
            }
        }
    }

    writer.finish()
}

/// Displays an assigned step number, or `0` when none is assigned.
struct StepNumber(Option<u32>);

impl Display for StepNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.unwrap_or(0))
    }
}
