//! Markdown engine boundary.
//!
//! Block bodies are turned into HTML through a [`MarkdownEngine`]. The default
//! engine wraps `pulldown-cmark` and post-processes its event stream to render
//! code blocks as bare `<pre>` elements (with `edit` diff marking), to embed
//! media links and to resolve `[#name]` step links in prose.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use serde::{Deserialize, Serialize};

use crate::error::TmdError;
use crate::inline::{LinkPiece, StepLinks};
use crate::render_html::escape_html;

/// Fence info string that turns on added/removed line marking.
const EDIT_FENCE_INFO: &str = "edit";

/// Converts a Markdown body into an HTML fragment.
///
/// `links` resolves `[#name]` references for the block being rendered;
/// engines should pass it only text outside code. Implementations report
/// failure through [`TmdError::Markdown`]; the renderer turns that into inline
/// error markup and a warning instead of aborting.
pub trait MarkdownEngine {
    fn render(&self, markdown: &str, links: &mut StepLinks<'_>) -> Result<String, TmdError>;
}

impl<F> MarkdownEngine for F
where
    F: Fn(&str, &mut StepLinks<'_>) -> Result<String, TmdError>,
{
    fn render(&self, markdown: &str, links: &mut StepLinks<'_>) -> Result<String, TmdError> {
        self(markdown, links)
    }
}

/// Extensions enabled in the default Markdown pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    pub definition_lists: bool,
    /// `^sup^` and `~sub~`.
    pub superscript_subscript: bool,
    pub smart_punctuation: bool,
    /// Embed video/audio players for images pointing at media.
    pub media_links: bool,
    /// Render code blocks as `<pre>` with `edit` line marking.
    pub custom_code_blocks: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: false,
            strikethrough: true,
            task_lists: true,
            definition_lists: true,
            superscript_subscript: true,
            smart_punctuation: false,
            media_links: true,
            custom_code_blocks: true,
        }
    }
}

impl MarkdownOptions {
    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        let flags = [
            (self.tables, Options::ENABLE_TABLES),
            (self.footnotes, Options::ENABLE_FOOTNOTES),
            (self.strikethrough, Options::ENABLE_STRIKETHROUGH),
            (self.task_lists, Options::ENABLE_TASKLISTS),
            (self.definition_lists, Options::ENABLE_DEFINITION_LIST),
            (self.superscript_subscript, Options::ENABLE_SUPERSCRIPT),
            (self.superscript_subscript, Options::ENABLE_SUBSCRIPT),
            (self.smart_punctuation, Options::ENABLE_SMART_PUNCTUATION),
        ];
        for (enabled, flag) in flags {
            if enabled {
                options.insert(flag);
            }
        }
        options
    }
}

/// Default engine backed by `pulldown-cmark`.
///
/// Build once per render pass and reuse it for every block.
#[derive(Debug, Clone)]
pub struct CmarkEngine {
    options: Options,
    media_links: bool,
    custom_code_blocks: bool,
}

impl CmarkEngine {
    pub fn new(options: &MarkdownOptions) -> Self {
        Self {
            options: options.parser_options(),
            media_links: options.media_links,
            custom_code_blocks: options.custom_code_blocks,
        }
    }

    fn transform<'a>(
        &self,
        source: impl Iterator<Item = Event<'a>>,
        links: &mut StepLinks<'_>,
    ) -> Vec<Event<'a>> {
        let mut events = Vec::new();
        // (is_edit, accumulated text) of the code block being collected
        let mut code: Option<(bool, String)> = None;
        // inside a code block passed through unchanged
        let mut in_stock_code = false;
        let mut skipped_images = 0usize;

        for event in source {
            if skipped_images > 0 {
                match event {
                    Event::Start(Tag::Image { .. }) => skipped_images += 1,
                    Event::End(TagEnd::Image) => skipped_images -= 1,
                    _ => {}
                }
                continue;
            }

            if let Some((is_edit, text)) = code.as_mut() {
                match event {
                    Event::Text(t) => text.push_str(&t),
                    Event::End(TagEnd::CodeBlock) => {
                        events.push(Event::Html(render_code_block(text, *is_edit).into()));
                        code = None;
                    }
                    _ => {}
                }
                continue;
            }

            let embed = match &event {
                Event::Start(Tag::Image { dest_url, .. }) if self.media_links => media_embed(dest_url),
                _ => None,
            };
            if let Some(html) = embed {
                events.push(Event::InlineHtml(html.into()));
                skipped_images = 1;
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) if self.custom_code_blocks => {
                    let is_edit = match &kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next() == Some(EDIT_FENCE_INFO)
                        }
                        CodeBlockKind::Indented => false,
                    };
                    code = Some((is_edit, String::new()));
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_stock_code = true;
                    events.push(Event::Start(Tag::CodeBlock(kind)));
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_stock_code = false;
                    events.push(Event::End(TagEnd::CodeBlock));
                }
                Event::Text(text) if !in_stock_code => {
                    for piece in links.split(&text) {
                        events.push(match piece {
                            LinkPiece::Text(t) => Event::Text(t.to_string().into()),
                            LinkPiece::Link(html) => Event::InlineHtml(html.into()),
                        });
                    }
                }
                other => events.push(other),
            }
        }

        events
    }
}

impl Default for CmarkEngine {
    fn default() -> Self {
        Self::new(&MarkdownOptions::default())
    }
}

impl MarkdownEngine for CmarkEngine {
    fn render(&self, markdown: &str, links: &mut StepLinks<'_>) -> Result<String, TmdError> {
        // adjacent text events are merged so `[#name]` is never split
        let parser = TextMergeStream::new(Parser::new_ext(markdown, self.options));
        let events = self.transform(parser, links);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        Ok(html)
    }
}

/// Render collected code block text as `<pre>`.
///
/// In edit mode, lines starting with `+` become `<ins>` and lines starting
/// with `-` become `<del>`, with the marker removed.
fn render_code_block(text: &str, is_edit: bool) -> String {
    let body = text.trim_end_matches('\n');
    let mut html = String::from("<pre>");
    if is_edit {
        let lines: Vec<String> = body
            .split('\n')
            .map(|line| {
                if let Some(added) = line.strip_prefix('+') {
                    format!("<ins>{}</ins>", escape_html(added))
                } else if let Some(removed) = line.strip_prefix('-') {
                    format!("<del>{}</del>", escape_html(removed))
                } else {
                    escape_html(line)
                }
            })
            .collect();
        html.push_str(&lines.join("\n"));
    } else {
        html.push_str(&escape_html(body));
    }
    html.push_str("</pre>\n");
    html
}

/// Embedded player markup for a media URL, if it points at media.
fn media_embed(url: &str) -> Option<String> {
    if let Some(video_id) = youtube_id(url) {
        return Some(format!(
            "<iframe src=\"https://www.youtube.com/embed/{}\" width=\"500\" height=\"281\" frameborder=\"0\" allowfullscreen></iframe>",
            escape_html(video_id)
        ));
    }
    if let Some(video_id) = vimeo_id(url) {
        return Some(format!(
            "<iframe src=\"https://player.vimeo.com/video/{}\" width=\"500\" height=\"281\" frameborder=\"0\" allowfullscreen></iframe>",
            escape_html(video_id)
        ));
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let src = escape_html(url);
    match extension.as_str() {
        "mp4" | "webm" | "ogv" => Some(format!("<video src=\"{src}\" width=\"500\" controls></video>")),
        "mp3" | "ogg" | "wav" => Some(format!("<audio src=\"{src}\" controls></audio>")),
        _ => None,
    }
}

/// Split `url` into (host without `www.`/`m.`, remainder after the host).
fn host_and_path(url: &str) -> Option<(&str, &str)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let (host, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);
    Some((host, path))
}

fn youtube_id(url: &str) -> Option<&str> {
    let (host, path) = host_and_path(url)?;
    let id = match host {
        "youtu.be" => path.trim_start_matches('/').split(['?', '#', '/']).next()?,
        "youtube.com" => {
            let query = path.strip_prefix("/watch?")?;
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("v="))?
                .split('#')
                .next()?
        }
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

fn vimeo_id(url: &str) -> Option<&str> {
    let (host, path) = host_and_path(url)?;
    if host != "vimeo.com" {
        return None;
    }
    let id = path.trim_start_matches('/').split(['?', '#', '/']).next()?;
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}
