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

//! `ionad inspect`

use crate::error::ToolResult;
use clap::Args;
use ionad_core::{MethodDef, Module, read_module};
use std::fmt;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Module file to describe
    #[arg(value_name = "MODULE")]
    pub input: PathBuf,

    /// Disassemble every method body
    #[arg(long)]
    pub il: bool,
}

/// Human-readable listing of a module
pub struct ModuleSummary<'a> {
    module: &'a Module,
    show_il: bool,
}

impl<'a> ModuleSummary<'a> {
    pub fn new(module: &'a Module, show_il: bool) -> Self {
        Self { module, show_il }
    }

    fn write_method(&self, f: &mut fmt::Formatter<'_>, indent: &str, method: &MethodDef) -> fmt::Result {
        writeln!(
            f,
            "{indent}.method {}{}{} {}({})",
            if method.is_static { "static " } else { "" },
            if method.is_virtual { "virtual " } else { "" },
            method.signature.return_type,
            method.name,
            method.signature.parameters.join(", ")
        )?;
        if self.show_il
            && let Some(body) = &method.body
        {
            for line in body.to_string().lines() {
                writeln!(f, "{indent}    {line}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ModuleSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".module {}", self.module.name)?;
        for reference in &self.module.assembly_references {
            writeln!(f, ".assembly extern {} {}", reference.name, reference.version)?;
        }
        for (_, type_def) in self.module.iter_types() {
            writeln!(f, ".{} {}", if type_def.is_class { "class" } else { "struct" }, type_def.full_name())?;
            for attribute in &type_def.custom_attributes {
                let arguments: Vec<String> = attribute.arguments.iter().map(|argument| format!("{argument:?}")).collect();
                writeln!(f, "  .custom {}({})", attribute.attribute_type, arguments.join(", "))?;
            }
            for method in &type_def.methods {
                self.write_method(f, "  ", method)?;
            }
            for property in &type_def.properties {
                writeln!(f, "  .property {}", property.name)?;
                for accessor in property.getter.iter().chain(property.setter.iter()) {
                    self.write_method(f, "    ", accessor)?;
                }
            }
        }
        Ok(())
    }
}

/// Load a module and render its listing
pub fn run_inspect(args: &InspectArgs) -> ToolResult<String> {
    let module = read_module(&args.input)?;
    Ok(ModuleSummary::new(&module, args.il).to_string())
}
