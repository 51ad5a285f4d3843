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

//! Error handling for the command-line tools

use ionad_core::{ErrorCategory, ModuleError};
use ionad_weaver::WeaveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Weaving failed: {0}")]
    Weave(#[from] WeaveError),

    #[error("Weaving reported {count} error(s); {path} was not written")]
    DiagnosticsReported { count: usize, path: PathBuf },

    #[error("Input and output are the same file: {0}")]
    SamePath(PathBuf),
}

impl ToolError {
    /// Category of the underlying module error, if any
    pub fn module_category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Module(error) | Self::Weave(WeaveError::Module(error)) => Some(error.category()),
            _ => None,
        }
    }

    /// Process exit status, following the sysexits convention
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::DiagnosticsReported { .. } => 1,
            Self::SamePath(_) => 64,
            Self::Weave(WeaveError::ConfigIo { .. } | WeaveError::ConfigParse { .. }) => 78,
            Self::Weave(WeaveError::MalformedAttribute { .. } | WeaveError::DuplicateReplacement { .. }) => 65,
            Self::Module(_) | Self::Weave(WeaveError::Module(_)) => match self.module_category() {
                Some(ErrorCategory::Io) => 74,
                _ => 65,
            },
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let missing = ToolError::from(ModuleError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)));
        assert_eq!(missing.module_category(), Some(ErrorCategory::Io));
        assert_eq!(missing.exit_code(), 74);

        let unresolved = ToolError::from(WeaveError::from(ModuleError::unresolved_type("App.Gone")));
        assert_eq!(unresolved.module_category(), Some(ErrorCategory::Resolution));
        assert_eq!(unresolved.exit_code(), 65);

        let denied = ToolError::DiagnosticsReported {
            count: 2,
            path: PathBuf::from("app.json"),
        };
        assert_eq!(denied.module_category(), None);
        assert_eq!(denied.exit_code(), 1);
    }
}
