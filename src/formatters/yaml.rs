//! In-process YAML formatter: parse and re-emit, keeping mapping key order.

use anyhow::{Context, Result};
use std::fs;

use super::{FileRef, Formatter};

pub struct YamlFormatter;

/// Canonical form of a YAML document. Blank input is returned as is.
pub fn reformat_yaml(input: &[u8]) -> Result<Vec<u8>> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Ok(input.to_vec());
    }
    let value: serde_yaml::Value = serde_yaml::from_slice(input).context("parse YAML")?;
    let out = serde_yaml::to_string(&value).context("serialize YAML")?;
    Ok(out.into_bytes())
}

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn selectors(&self) -> Vec<String> {
        vec![".yml".to_string()]
    }

    fn is_available(&self) -> bool {
        true
    }

    fn format_to_buffer(&self, _args: &[String], _file: FileRef<'_>, input: &[u8]) -> Result<Vec<u8>> {
        reformat_yaml(input)
    }

    /// Only writes when the output differs, so an already formatted file keeps its mtime.
    fn format_in_place(&self, _args: &[String], file: FileRef<'_>) -> Result<()> {
        let original =
            fs::read(file.path).with_context(|| format!("read {}", file.path.display()))?;
        let formatted = reformat_yaml(&original)?;
        if formatted != original {
            fs::write(file.path, formatted)
                .with_context(|| format!("write {}", file.path.display()))?;
        }
        Ok(())
    }
}
