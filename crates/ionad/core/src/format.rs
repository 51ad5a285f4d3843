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

//! Module file encodings
//!
//! Modules are stored either as JSON, which is convenient to write by hand
//! and to diff, or as a compact binary container: a fixed [`ModuleHeader`]
//! followed by a bincode payload.

use crate::error::{ModuleError, ModuleResult};
use crate::model::Module;
use std::fs;
use std::path::Path;

/// Header of the binary module container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleHeader {
    /// Magic number, expected to be "IONMD"
    pub magic: [u8; 5],
    /// Container format version
    pub version: u8,
    /// Reserved bytes for future use
    pub reserved: [u8; 2],
}

impl ModuleHeader {
    pub const MAGIC_NUMBER: [u8; 5] = [b'I', b'O', b'N', b'M', b'D'];
    pub const CURRENT_VERSION: u8 = 1;

    /// Create a header for the current format version
    pub fn new() -> Self {
        Self {
            magic: Self::MAGIC_NUMBER,
            version: Self::CURRENT_VERSION,
            reserved: [0; 2],
        }
    }

    /// Serialize the header into a byte array
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0..5].copy_from_slice(&self.magic);
        bytes[5] = self.version;
        bytes[6..8].copy_from_slice(&self.reserved);
        bytes
    }

    /// Deserialize a header from the start of a byte slice
    pub fn from_bytes(bytes: &[u8]) -> ModuleResult<Self> {
        if bytes.len() < Self::size() {
            return Err(ModuleError::InvalidHeader("insufficient bytes to form a header".to_string()));
        }
        if bytes[0..5] != Self::MAGIC_NUMBER {
            return Err(ModuleError::InvalidHeader("invalid magic number".to_string()));
        }
        if bytes[5] != Self::CURRENT_VERSION {
            return Err(ModuleError::UnsupportedVersion {
                version: bytes[5],
                expected: Self::CURRENT_VERSION,
            });
        }
        Ok(Self {
            magic: Self::MAGIC_NUMBER,
            version: bytes[5],
            reserved: [bytes[6], bytes[7]],
        })
    }

    /// Size of the serialized header in bytes
    pub const fn size() -> usize {
        8
    }
}

impl Default for ModuleHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk encoding of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    Json,
    Binary,
}

impl ModuleFormat {
    /// Pick an encoding from a file extension; anything but `.json` is binary
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// Encode a module in the given format
pub fn encode(module: &Module, format: ModuleFormat) -> ModuleResult<Vec<u8>> {
    match format {
        ModuleFormat::Json => Ok(serde_json::to_vec_pretty(module)?),
        ModuleFormat::Binary => {
            let mut bytes = ModuleHeader::new().to_bytes().to_vec();
            bytes.extend(bincode::serde::encode_to_vec(module, bincode::config::standard())?);
            Ok(bytes)
        }
    }
}

/// Decode a module from bytes in the given format
pub fn decode(bytes: &[u8], format: ModuleFormat) -> ModuleResult<Module> {
    match format {
        ModuleFormat::Json => Ok(serde_json::from_slice(bytes)?),
        ModuleFormat::Binary => {
            ModuleHeader::from_bytes(bytes)?;
            let payload = &bytes[ModuleHeader::size()..];
            let (module, consumed) = bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
            if consumed != payload.len() {
                return Err(ModuleError::TrailingBytes {
                    count: payload.len() - consumed,
                });
            }
            Ok(module)
        }
    }
}

/// Read a module file, choosing the format from its extension
pub fn read_module(path: &Path) -> ModuleResult<Module> {
    let bytes = fs::read(path)?;
    let module = decode(&bytes, ModuleFormat::from_path(path))?;
    tracing::debug!(path = %path.display(), module = %module.name, types = module.types.len(), "read module");
    Ok(module)
}

/// Write a module file, choosing the format from its extension
pub fn write_module(path: &Path, module: &Module) -> ModuleResult<()> {
    let bytes = encode(module, ModuleFormat::from_path(path))?;
    fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote module");
    Ok(())
}
