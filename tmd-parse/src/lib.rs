//! `tmd-parse` — parser and HTML renderer for Tutorial Markdown (TMD).
//!
//! A TMD document is plain text divided into blocks by `- - -` lines. Each
//! block may start with a qualifier line such as `(i)`, `(!)`, `(dl)`, `($)`
//! or `(#name)` (or the `<!-- i -->` comment form) that decides how it is
//! rendered. Unqualified blocks become numbered steps, laid out as rows of a
//! steps table; headings and `($)` blocks are plain text between tables.
//!
//! # Quick start
//!
//! ```
//! let mut doc = tmd_parse::TmdDocument::parse("(i)\nHello\n- - -\nFirst step");
//! assert!(doc.warnings().is_empty());
//! let output = doc.render_html();
//! assert!(output.succeeded);
//! assert!(output.html.contains("<p>Hello</p>"));
//! ```

pub mod blocks;
pub mod document;
pub mod error;
pub mod hash;
pub mod inline;
pub mod list;
pub mod markdown;
pub mod parse;
pub mod render_html;
pub mod render_tmd;
pub mod types;

pub use document::{RenderOutput, TmdDocument};
pub use error::*;
pub use hash::{HashAlgorithm, content_hash};
pub use inline::{LinkPiece, StepLinks};
pub use list::ListExt;
pub use markdown::{CmarkEngine, MarkdownEngine, MarkdownOptions};
pub use render_html::RenderOptions;
pub use render_tmd::QualifierStyle;
pub use types::*;
