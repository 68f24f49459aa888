//! Load `.stylize.toml` (CLI only). Library callers build a [`RunContext`] directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::RunContext;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylizeToml {
    /// Selector (extension or bare filename) -> formatter name.
    formatters: Option<BTreeMap<String, String>>,
    /// Formatter name -> extra args.
    #[serde(default)]
    formatter_args: HashMap<String, Vec<String>>,
    exclude: Option<Vec<String>>,
    parallelism: Option<usize>,
    timeout_secs: Option<u64>,
    lines: Option<bool>,
}

/// Parse a config file's contents.
pub fn parse_stylize_toml(s: &str) -> Result<StylizeToml> {
    toml::from_str(s).context("parse config")
}

/// Load the config file.
///
/// With `explicit: Some(path)` a missing or invalid file is an error. Otherwise the default
/// `.stylize.toml` in `dir` is tried; missing is fine and invalid only warns.
pub fn load_stylize_toml(dir: &Path, explicit: Option<&Path>) -> Result<Option<StylizeToml>> {
    if let Some(path) = explicit {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let cfg = parse_stylize_toml(&s).with_context(|| path.display().to_string())?;
        log::info!("Loaded config from file {}", path.display());
        return Ok(Some(cfg));
    }
    let path: PathBuf = dir.join(PackagePaths::get().config_filename());
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Ok(None);
    };
    match parse_stylize_toml(&s) {
        Ok(cfg) => {
            log::info!("Loaded config from file {}", path.display());
            Ok(Some(cfg))
        }
        Err(e) => {
            log::warn!("{}: {:#}", path.display(), e);
            Ok(None)
        }
    }
}

/// Overwrite ctx field from file when present.
macro_rules! apply_file_opt {
    ($cfg:expr, $ctx:expr, $cfg_field:ident => $ctx_field:ident) => {
        if let Some(v) = $cfg.$cfg_field.clone() {
            $ctx.$ctx_field = v;
        }
    };
}

/// Apply file config to ctx (only fields present in the file). Call before applying CLI.
/// Exclude patterns are appended so CLI patterns can be added on top.
pub fn apply_file_to_ctx(file: &StylizeToml, ctx: &mut RunContext) {
    if let Some(ref v) = file.exclude {
        ctx.exclude.extend(v.iter().cloned());
    }
    if file.formatters.is_some() {
        ctx.formatters_by_ext = file.formatters.clone();
    }
    ctx.formatter_args.extend(
        file.formatter_args
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    apply_file_opt!(file, ctx, parallelism => parallelism);
    apply_file_opt!(file, ctx, lines => lines);
    if let Some(secs) = file.timeout_secs {
        ctx.timeout = Some(Duration::from_secs(secs));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg = parse_stylize_toml(
            r#"
exclude = ["third_party", "build/"]
parallelism = 3
timeout_secs = 30

[formatters]
".py" = "yapf"
"BUILD" = "buildifier"

[formatter_args]
clang = ["--style=file"]
"#,
        )
        .unwrap();
        let mut ctx = RunContext::new("/src");
        ctx.exclude.push("cli_pattern".into());
        apply_file_to_ctx(&cfg, &mut ctx);

        assert_eq!(ctx.exclude, vec!["cli_pattern", "third_party", "build/"]);
        assert_eq!(ctx.parallelism, 3);
        assert_eq!(ctx.timeout, Some(Duration::from_secs(30)));
        let mapping = ctx.formatters_by_ext.unwrap();
        assert_eq!(mapping.get(".py").map(String::as_str), Some("yapf"));
        assert_eq!(mapping.get("BUILD").map(String::as_str), Some("buildifier"));
        assert_eq!(ctx.formatter_args["clang"], vec!["--style=file"]);
    }

    #[test]
    fn empty_config_changes_nothing() {
        let cfg = parse_stylize_toml("").unwrap();
        let mut ctx = RunContext::new("/src");
        apply_file_to_ctx(&cfg, &mut ctx);
        assert!(ctx.formatters_by_ext.is_none());
        assert!(ctx.exclude.is_empty());
        assert_eq!(ctx.parallelism, crate::utils::config::DEFAULT_PARALLELISM);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_stylize_toml("exclude_dirs = [\"x\"]").is_err());
    }

    #[test]
    fn missing_default_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_stylize_toml(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(load_stylize_toml(dir.path(), Some(&path)).is_err());
    }
}
