// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Weaver configuration

use crate::error::{WeaveError, WeaveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "IONAD_CONFIG";

/// How a replacement method is picked for a redirected call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodMatching {
    /// First method on the replacement type with the same name
    #[default]
    NameOnly,
    /// Static method with the same name, parameters and return type
    ExactSignature,
}

/// What to do when two types declare they replace the same source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Abort the run
    #[default]
    Reject,
    /// Keep the declaration that appears last in the type table
    LastWins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaverConfig {
    /// Library reference removed from every woven module
    pub reference_name: String,
    /// Full name of the attribute declaring a replacement
    pub attribute_type: String,
    pub method_matching: MethodMatching,
    pub duplicate_policy: DuplicatePolicy,
    /// Conditional compilation symbols of the host build; carried for the
    /// host, not consulted while weaving
    pub define_constants: Vec<String>,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            reference_name: "Ionad".to_string(),
            attribute_type: "Ionad.StaticReplacementAttribute".to_string(),
            method_matching: MethodMatching::default(),
            duplicate_policy: DuplicatePolicy::default(),
            define_constants: Vec::new(),
        }
    }
}

impl WeaverConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> WeaveResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| WeaveError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| WeaveError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Explicit path first, then `$IONAD_CONFIG`, then defaults
    pub fn resolve_config(cli_config: Option<PathBuf>) -> WeaveResult<Self> {
        if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)
        } else if let Ok(env_config) = std::env::var(CONFIG_ENV) {
            Self::load_from_file(env_config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_method_matching(mut self, method_matching: MethodMatching) -> Self {
        self.method_matching = method_matching;
        self
    }

    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WeaverConfig::default();
        assert_eq!(config.reference_name, "Ionad");
        assert_eq!(config.attribute_type, "Ionad.StaticReplacementAttribute");
        assert_eq!(config.method_matching, MethodMatching::NameOnly);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "method_matching = \"exact_signature\"").unwrap();
        writeln!(file, "define_constants = [\"DEBUG\", \"TRACE\"]").unwrap();

        let config = WeaverConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.method_matching, MethodMatching::ExactSignature);
        assert_eq!(config.define_constants, vec!["DEBUG", "TRACE"]);
        assert_eq!(config.reference_name, "Ionad");
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "duplicate_policy = \"sometimes\"").unwrap();

        match WeaverConfig::load_from_file(file.path()) {
            Err(WeaveError::ConfigParse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_path_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reference_name = \"Replacer\"").unwrap();

        let config = WeaverConfig::resolve_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.reference_name, "Replacer");
    }
}
