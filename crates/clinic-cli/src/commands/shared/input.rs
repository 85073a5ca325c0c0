use std::path::Path;

use anyhow::Context;

/// Text given inline or read from a file; clap guarantees at most one.
pub fn read_text(inline: Option<&str>, file: Option<&Path>, field: &str) -> anyhow::Result<String> {
    optional_text(inline, file)?.with_context(|| format!("{field} is required"))
}

/// Like [`read_text`], but neither source given is `None`.
pub fn optional_text(inline: Option<&str>, file: Option<&Path>) -> anyhow::Result<Option<String>> {
    if let Some(text) = inline {
        return Ok(Some(text.to_string()));
    }
    file.map(|path| {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    })
    .transpose()
}
