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

//! Call-site rewriting
//!
//! Every method body in the module, property accessors included, is
//! expanded to canonical encoding, has its static `call` instructions
//! redirected from source types to their replacements, and is re-compacted.
//! Only operands change: the instruction count and order of a body are the
//! same afterwards, so branch targets and handler ranges stay valid.

use crate::config::{MethodMatching, WeaverConfig};
use crate::diagnostics::DiagnosticSink;
use crate::error::WeaveResult;
use crate::scanner::ReplacementMap;
use ionad_core::{MethodBody, MethodDef, MethodRef, Module, Operand, TypeDef, TypeId, optimize_macros, simplify_macros};
use std::collections::HashSet;
use tracing::debug;

/// Counters collected while rewriting a module
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteStats {
    /// Bodies normalized and scanned
    pub bodies_processed: usize,
    /// `call` instructions looked at
    pub calls_inspected: usize,
    /// Calls now targeting a replacement method
    pub calls_redirected: usize,
    /// Calls to a source type left alone because the replacement lacks the method
    pub unresolved_calls: usize,
    /// Distinct source methods missing from their replacement type
    pub missing_methods: usize,
}

/// Rewrites static calls according to a replacement map
pub struct CallRewriter<'a> {
    config: &'a WeaverConfig,
    replacements: &'a ReplacementMap,
    /// Source methods already reported missing, so each is reported once
    reported: HashSet<(TypeId, String)>,
    stats: RewriteStats,
}

impl<'a> CallRewriter<'a> {
    pub fn new(config: &'a WeaverConfig, replacements: &'a ReplacementMap) -> Self {
        Self {
            config,
            replacements,
            reported: HashSet::new(),
            stats: RewriteStats::default(),
        }
    }

    /// Rewrite every method body in the module
    ///
    /// A replacement type without a like-named method is reported to `sink`
    /// and the call is left as it was. An operand that does not resolve at
    /// all is a structural error and ends the run.
    pub fn rewrite_module(mut self, module: &mut Module, sink: &mut dyn DiagnosticSink) -> WeaveResult<RewriteStats> {
        for slot in module.body_slots() {
            let Some(mut body) = module.take_body(slot) else {
                continue;
            };
            let result = self.rewrite_body(module, &mut body, sink);
            module.restore_body(slot, body);
            result?;
        }
        Ok(self.stats)
    }

    fn rewrite_body(&mut self, module: &Module, body: &mut MethodBody, sink: &mut dyn DiagnosticSink) -> WeaveResult<()> {
        simplify_macros(body);

        for instruction in body.instructions.iter_mut().filter(|instruction| instruction.opcode.is_call()) {
            self.stats.calls_inspected += 1;
            let redirect = match instruction.operand.as_method() {
                Some(target) => self.redirect(module, target, sink)?,
                None => None,
            };
            if let Some(replacement) = redirect {
                instruction.operand = Operand::Method(replacement);
                self.stats.calls_redirected += 1;
            }
        }

        body.init_locals = true;
        optimize_macros(body);
        self.stats.bodies_processed += 1;
        Ok(())
    }

    /// The reference a call should be redirected to, if any
    fn redirect(&mut self, module: &Module, target: &MethodRef, sink: &mut dyn DiagnosticSink) -> WeaveResult<Option<MethodRef>> {
        // Types from other modules are never replacement sources.
        if !module.is_local(&target.declaring_type) {
            return Ok(None);
        }
        let resolved = module.resolve_method(target)?;
        if !resolved.method.is_static {
            return Ok(None);
        }
        let Some(replacement) = self.replacements.get(resolved.declaring_type) else {
            return Ok(None);
        };

        let replacement_type = module.type_def(replacement);
        match self.find_replacement_method(replacement_type, resolved.method) {
            Some(method) => {
                let redirected = method.reference(replacement_type.reference());
                debug!(from = %target, to = %redirected, "redirecting call");
                Ok(Some(redirected))
            }
            None => {
                self.stats.unresolved_calls += 1;
                let source_type = module.type_def(resolved.declaring_type);
                if self.reported.insert((resolved.declaring_type, resolved.method.name.clone())) {
                    self.stats.missing_methods += 1;
                    sink.error(&format!(
                        "Missing '{}.{}()' in '{}'",
                        source_type.full_name(),
                        resolved.method.name,
                        replacement_type.full_name()
                    ));
                }
                Ok(None)
            }
        }
    }

    fn find_replacement_method<'t>(&self, replacement_type: &'t TypeDef, original: &MethodDef) -> Option<&'t MethodDef> {
        let mut candidates = replacement_type.all_methods().filter(|candidate| candidate.name == original.name);
        match self.config.method_matching {
            MethodMatching::NameOnly => candidates.next(),
            MethodMatching::ExactSignature => candidates.find(|candidate| candidate.is_static && candidate.signature == original.signature),
        }
    }
}
