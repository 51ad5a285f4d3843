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

//! `ionad weave`

use crate::error::{ToolError, ToolResult};
use clap::Args;
use ionad_core::{read_module, write_module};
use ionad_weaver::{CollectingSink, ModuleWeaver, TracingSink, WeaveReport, WeaverConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the weave command
#[derive(Args, Debug, Clone)]
pub struct WeaveArgs {
    /// Module file to weave
    #[arg(value_name = "MODULE")]
    pub input: PathBuf,

    /// Where to write the woven module (defaults to rewriting the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Weaver configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Conditional compilation symbol of the host build
    #[arg(long = "define", value_name = "SYMBOL")]
    pub define_constants: Vec<String>,

    /// Fail, leaving the output unwritten, when any error is reported
    #[arg(long)]
    pub deny_errors: bool,
}

/// Read, weave and write one module file
pub struct WeavePipeline {
    args: WeaveArgs,
}

impl WeavePipeline {
    pub fn new(args: WeaveArgs) -> Self {
        Self { args }
    }

    fn output_path(&self) -> &Path {
        self.args.output.as_deref().unwrap_or(&self.args.input)
    }

    fn config(&self) -> ToolResult<WeaverConfig> {
        let mut config = WeaverConfig::resolve_config(self.args.config.clone())?;
        config.define_constants.extend(self.args.define_constants.iter().cloned());
        Ok(config)
    }

    pub fn execute(&self) -> ToolResult<WeaveReport> {
        let config = self.config()?;
        let mut module = read_module(&self.args.input)?;
        module.validate()?;
        info!(input = %self.args.input.display(), types = module.types.len(), "loaded module");

        let mut tracing_sink = TracingSink;
        let mut sink = CollectingSink::forwarding_to(&mut tracing_sink);
        let report = ModuleWeaver::new(config).execute(&mut module, &mut sink)?;

        let errors = sink.error_count();
        let output = self.output_path();
        if self.args.deny_errors && errors > 0 {
            return Err(ToolError::DiagnosticsReported {
                count: errors,
                path: output.to_path_buf(),
            });
        }

        write_module(output, &module)?;
        info!(
            output = %output.display(),
            redirected = report.rewrite.calls_redirected,
            errors,
            "wrote woven module"
        );
        Ok(report)
    }
}
