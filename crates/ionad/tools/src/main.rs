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

//! Ionad CLI
//!
//! Main entry point for the `ionad` command-line interface.

use clap::{Parser, Subcommand};
use ionad_tools::{ConvertArgs, InspectArgs, ToolError, WeaveArgs, WeavePipeline, run_convert, run_inspect};
use std::process::ExitCode;
use tracing::{Level, error};

#[derive(Parser)]
#[command(name = "ionad")]
#[command(about = "Ionad - static call replacement weaver")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Redirect static calls to their declared replacements
    Weave(WeaveArgs),
    /// Describe a module file
    Inspect(InspectArgs),
    /// Re-encode a module file as JSON or binary
    Convert(ConvertArgs),
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Weave(args) => {
            WeavePipeline::new(args).execute()?;
        }
        Commands::Inspect(args) => {
            print!("{}", run_inspect(&args)?);
        }
        Commands::Convert(args) => {
            run_convert(&args)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let tool_error = err.downcast_ref::<ToolError>();
            let category = tool_error.and_then(ToolError::module_category).map_or("tool", |category| category.as_str());
            error!(category, "{err:#}");
            ExitCode::from(tool_error.map_or(1, ToolError::exit_code))
        }
    }
}
