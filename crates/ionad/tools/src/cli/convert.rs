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

//! `ionad convert`

use crate::error::{ToolError, ToolResult};
use clap::Args;
use ionad_core::{ModuleFormat, read_module, write_module};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the convert command
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Module file to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Module file to write; `.json` selects JSON, anything else binary
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

pub fn run_convert(args: &ConvertArgs) -> ToolResult<()> {
    if args.input == args.output {
        return Err(ToolError::SamePath(args.input.clone()));
    }
    let module = read_module(&args.input)?;
    module.validate()?;
    write_module(&args.output, &module)?;
    info!(
        from = ?ModuleFormat::from_path(&args.input),
        to = ?ModuleFormat::from_path(&args.output),
        "converted {}",
        module.name
    );
    Ok(())
}
