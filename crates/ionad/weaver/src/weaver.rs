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

//! Weaving entry point

use crate::config::WeaverConfig;
use crate::diagnostics::{CallbackSink, DiagnosticSink};
use crate::error::WeaveResult;
use crate::pruner::remove_reference;
use crate::rewriter::{CallRewriter, RewriteStats};
use crate::scanner::find_replacements;
use crate::stripper::remove_replacement_attributes;
use ionad_core::Module;
use tracing::{debug, instrument};

/// Outcome of one weaving run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WeaveReport {
    /// Number of source types with a declared replacement
    pub replacements: usize,
    pub rewrite: RewriteStats,
    pub attributes_removed: usize,
    /// Whether the build-time library reference was dropped
    pub reference_removed: bool,
}

/// Applies static replacements to a module in place
#[derive(Debug, Clone, Default)]
pub struct ModuleWeaver {
    config: WeaverConfig,
}

impl ModuleWeaver {
    pub fn new(config: WeaverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.config
    }

    /// Scan, rewrite, strip and prune
    ///
    /// Missing replacement methods are reported to `sink` and do not fail
    /// the run. Malformed declarations and references that do not resolve
    /// abort it; the module may then be partly rewritten and should be
    /// discarded.
    #[instrument(skip_all, fields(module = %module.name))]
    pub fn execute(&self, module: &mut Module, sink: &mut dyn DiagnosticSink) -> WeaveResult<WeaveReport> {
        if !self.config.define_constants.is_empty() {
            debug!(constants = ?self.config.define_constants, "host define constants");
        }

        let mut report = WeaveReport::default();
        let replacements = find_replacements(module, &self.config)?;
        report.replacements = replacements.len();

        if replacements.is_empty() {
            sink.info("No static replacements found");
        } else {
            report.rewrite = CallRewriter::new(&self.config, &replacements).rewrite_module(module, sink)?;
            report.attributes_removed = remove_replacement_attributes(module, replacements.replacement_types(), &self.config);
            debug!(
                replacements = report.replacements,
                redirected = report.rewrite.calls_redirected,
                "rewrote module"
            );
        }

        report.reference_removed = remove_reference(module, &self.config.reference_name, sink);
        Ok(report)
    }
}

/// Weave a module with the default configuration, reporting through the two
/// host callbacks
pub fn weave<I, E>(module: &mut Module, log_info: I, log_error: E) -> WeaveResult<WeaveReport>
where
    I: FnMut(&str),
    E: FnMut(&str),
{
    let mut sink = CallbackSink::new(log_info, log_error);
    ModuleWeaver::default().execute(module, &mut sink)
}
