//! Formatter registry: registration by name, then resolution into a selector -> formatter map.

use anyhow::{Result, bail};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::Formatter;
use crate::engine::tools::normalize_selector;

/// Selector (normalized extension or bare file name) -> formatter. Resolved once per run.
pub type FormatterMap = HashMap<String, Arc<dyn Formatter>>;

/// All known formatters, in registration order. Built explicitly and passed to the pipeline.
#[derive(Default, Clone)]
pub struct FormatterRegistry {
    formatters: Vec<Arc<dyn Formatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command-line formatter.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for formatter in super::builtin_formatters() {
            registry.register(formatter)?;
        }
        Ok(registry)
    }

    /// Add a formatter. Registering a second formatter under a taken name is an error.
    pub fn register(&mut self, formatter: Arc<dyn Formatter>) -> Result<()> {
        if self.get(formatter.name()).is_some() {
            bail!(
                "Attempt to double-register formatter '{}'",
                formatter.name()
            );
        }
        self.formatters.push(formatter);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Formatter>> {
        self.formatters.iter().find(|f| f.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formatters.iter().map(|f| f.name())
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    /// Resolve an explicit selector -> formatter-name mapping.
    ///
    /// Fails on an unknown name, an unavailable formatter, or two entries that normalize to
    /// the same selector (e.g. `.PY` and `.py`).
    pub fn resolve_mapping(&self, mapping: &BTreeMap<String, String>) -> Result<FormatterMap> {
        let mut by_ext = FormatterMap::new();
        for (selector, name) in mapping {
            let Some(formatter) = self.get(name) else {
                bail!("Unknown formatter: {}", name);
            };
            if !formatter.is_available() {
                bail!("Formatter {} not installed", name);
            }
            let key = normalize_selector(selector);
            if by_ext.contains_key(&key) {
                bail!("Multiple formatters for extension '{}'", key);
            }
            by_ext.insert(key, Arc::clone(formatter));
        }
        Ok(by_ext)
    }

    /// Map every selector claimed by an available formatter. Unavailable formatters are
    /// skipped. When two available formatters claim a selector the one registered first
    /// keeps it and the conflict is logged.
    pub fn resolve_available(&self) -> FormatterMap {
        let mut by_ext = FormatterMap::new();
        for formatter in &self.formatters {
            if !formatter.is_available() {
                info!(
                    "Skipping formatter {} b/c it's not installed",
                    formatter.name()
                );
                continue;
            }
            for selector in formatter.selectors() {
                let key = normalize_selector(&selector);
                match by_ext.get(&key) {
                    Some(owner) => warn!(
                        "Formatters {} and {} both handle '{}'; using {}",
                        owner.name(),
                        formatter.name(),
                        key,
                        owner.name()
                    ),
                    None => {
                        debug!("{} -> {}", key, formatter.name());
                        by_ext.insert(key, Arc::clone(formatter));
                    }
                }
            }
        }
        by_ext
    }

    /// Explicit mapping when one is given, auto-discovery otherwise.
    pub fn resolve(&self, mapping: Option<&BTreeMap<String, String>>) -> Result<FormatterMap> {
        match mapping {
            Some(m) => self.resolve_mapping(m),
            None => Ok(self.resolve_available()),
        }
    }
}

/// Sorted `(selector, formatter name)` pairs, for `--print-formatters` and logs.
pub fn describe(formatters: &FormatterMap) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = formatters
        .iter()
        .map(|(k, f)| (k.clone(), f.name().to_string()))
        .collect();
    pairs.sort();
    pairs
}
