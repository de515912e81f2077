//! HTML page templates wrapped around compiled document bodies.

use anyhow::{Context, Result};
use std::path::Path;

/// Default marker replaced by the compiled body.
pub const DEFAULT_PLACEHOLDER: &str = "<!--body-->";

/// Page used when no `--template` is given.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="generator" content="tmdc">
    <title>Tutorial</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; max-width: 60rem; margin: 0 auto; padding: 1rem 1.5rem 4rem; line-height: 1.5; }
        pre { background: #f4f4f4; border: 1px solid #ddd; padding: .5rem; overflow-x: auto; }
        pre ins { background: #dfd; text-decoration: none; }
        pre del { background: #fdd; }
        table.steps { width: 100%; border-collapse: collapse; margin: 1rem 0; }
        table.steps > tbody > tr > th, table.steps > tr > th { width: 3rem; vertical-align: top; text-align: right; padding: .5rem; font-size: 1.25rem; }
        table.steps > tbody > tr > td, table.steps > tr > td { vertical-align: top; padding: .5rem; border-bottom: 1px solid #eee; }
        table.steps tr.information { background: #eef6ff; }
        table.steps tr.warning { background: #fff4e0; }
        table.steps tr.download { background: #eefbea; }
        table.steps td > p:first-child { margin-top: 0; }
        table.steps td > p:last-child { margin-bottom: 0; }
    </style>
</head>
<body>
<!--body-->
</body>
</html>
"#;

/// An HTML page with a marker where the compiled body goes.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    html: String,
    placeholder: String,
}

impl PageTemplate {
    pub fn builtin(placeholder: &str) -> Result<Self> {
        Self::new(DEFAULT_TEMPLATE.to_string(), placeholder)
    }

    /// Read a template file, failing if it lacks `placeholder`.
    pub fn from_file(path: &Path, placeholder: &str) -> Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template '{}'", path.display()))?;
        Self::new(html, placeholder)
            .with_context(|| format!("Invalid template '{}'", path.display()))
    }

    fn new(html: String, placeholder: &str) -> Result<Self> {
        if placeholder.is_empty() {
            anyhow::bail!("Template placeholder must not be empty");
        }
        if !html.contains(placeholder) {
            anyhow::bail!("Template does not contain placeholder '{}'", placeholder);
        }
        Ok(Self {
            html,
            placeholder: placeholder.to_string(),
        })
    }

    /// Substitute `body` for every occurrence of the placeholder.
    pub fn apply(&self, body: &str) -> String {
        self.html.replace(&self.placeholder, body)
    }
}
