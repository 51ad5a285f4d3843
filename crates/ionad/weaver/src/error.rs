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

//! Error handling for the weaver

use ionad_core::ModuleError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a weaving run
///
/// A replacement method that cannot be found is not one of these: it is
/// reported through the diagnostic sink and the run carries on.
#[derive(Error, Debug)]
pub enum WeaveError {
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Malformed replacement attribute on {type_name}: {details}")]
    MalformedAttribute { type_name: String, details: String },

    #[error("Both {first} and {second} declare themselves the replacement for {source_type}")]
    DuplicateReplacement { source_type: String, first: String, second: String },

    #[error("Cannot read configuration {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl WeaveError {
    /// Create a malformed attribute error
    pub fn malformed_attribute(type_name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::MalformedAttribute {
            type_name: type_name.into(),
            details: details.into(),
        }
    }
}

/// Result type alias for weaving operations
pub type WeaveResult<T> = Result<T, WeaveError>;
