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

//! Error handling for module resolution, validation and encoding

use thiserror::Error;

/// Errors raised by the module model
///
/// Resolution failures are structural: a module that references a type or
/// method it does not define cannot be woven safely, so callers propagate
/// these instead of downgrading them.
#[derive(Error, Debug)]
pub enum ModuleError {
    // Resolution errors
    #[error("Unresolved type reference: {type_name}")]
    UnresolvedType { type_name: String },

    #[error("Type {type_name} lives in external scope '{scope}' and cannot be resolved in module {module}")]
    ExternalType { type_name: String, scope: String, module: String },

    #[error("Unresolved method reference: {method}")]
    UnresolvedMethod { method: String },

    // Body validation errors
    #[error("Invalid operand for {opcode} at instruction {index}: {reason}")]
    InvalidOperand { opcode: String, index: usize, reason: String },

    #[error("Branch at instruction {index} targets {target} but the body has {len} instructions")]
    InvalidBranchTarget { index: usize, target: usize, len: usize },

    #[error("Invalid exception handler {index}: {details}")]
    InvalidExceptionHandler { index: usize, details: String },

    // Encoding errors
    #[error("Invalid module header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported module format version: {version} (expected {expected})")]
    UnsupportedVersion { version: u8, expected: u8 },

    #[error("Module payload is followed by {count} unexpected bytes")]
    TrailingBytes { count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary encoding failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Binary decoding failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

impl ModuleError {
    /// Create an unresolved type error
    pub fn unresolved_type(type_name: impl Into<String>) -> Self {
        Self::UnresolvedType { type_name: type_name.into() }
    }

    /// Create an unresolved method error
    pub fn unresolved_method(method: impl Into<String>) -> Self {
        Self::UnresolvedMethod { method: method.into() }
    }

    /// Create an invalid operand error
    pub fn invalid_operand(opcode: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidOperand {
            opcode: opcode.into(),
            index,
            reason: reason.into(),
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnresolvedType { .. } | Self::ExternalType { .. } | Self::UnresolvedMethod { .. } => ErrorCategory::Resolution,
            Self::InvalidOperand { .. } | Self::InvalidBranchTarget { .. } | Self::InvalidExceptionHandler { .. } => ErrorCategory::Validation,
            Self::InvalidHeader(_) | Self::UnsupportedVersion { .. } | Self::TrailingBytes { .. } | Self::Json(_) | Self::Encode(_) | Self::Decode(_) => ErrorCategory::Encoding,
            Self::Io(_) => ErrorCategory::Io,
        }
    }
}

/// Error categories for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Resolution,
    Validation,
    Encoding,
    Io,
}

impl ErrorCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolution => "resolution",
            Self::Validation => "validation",
            Self::Encoding => "encoding",
            Self::Io => "io",
        }
    }
}

/// Result type alias for module operations
pub type ModuleResult<T> = Result<T, ModuleError>;
