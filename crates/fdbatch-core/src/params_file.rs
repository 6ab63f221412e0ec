//! Parser for the `name = value` parameter files written by the fitting tool.

use std::collections::HashMap;
use std::path::Path;

/// Parsed parameter file.
///
/// Keeps both the file order of names (first occurrence) and a name to value
/// lookup (last occurrence wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterFile {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl ParameterFile {
    /// Parse the contents of a parameter file.
    ///
    /// Blank lines and lines without `=` are ignored. The name is the text
    /// before the first `=` and the value the text after the last one, both
    /// trimmed.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut file = Self::default();
        for line in content.lines() {
            let (Some((name, _)), Some((_, value))) = (line.split_once('='), line.rsplit_once('='))
            else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if !file.values.contains_key(name) {
                file.order.push(name.to_string());
            }
            file.values.insert(name.to_string(), value.trim().to_string());
        }
        file
    }

    /// Read and parse a parameter file.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Parameter names in file order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Value recorded for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.values[name].as_str()))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the file held no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
