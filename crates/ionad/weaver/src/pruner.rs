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

//! Removal of the build-time library reference

use crate::diagnostics::DiagnosticSink;
use ionad_core::Module;

/// Drop the library reference named `name` from the module
///
/// Matching is exact and case-sensitive. Returns whether a reference was
/// removed; either outcome is reported to `sink` as an info message.
pub fn remove_reference(module: &mut Module, name: &str, sink: &mut dyn DiagnosticSink) -> bool {
    match module.find_reference(name) {
        Some(index) => {
            sink.info(&format!("Removing reference to '{name}.dll'."));
            module.assembly_references.remove(index);
            true
        }
        None => {
            sink.info(&format!("No reference to '{name}.dll' found. References not modified."));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MockDiagnosticSink;
    use ionad_core::AssemblyReference;

    fn module_with(references: &[&str]) -> Module {
        let mut module = Module::new("App");
        for name in references {
            module.add_reference(AssemblyReference::new(*name, "1.0.0.0"));
        }
        module
    }

    #[test]
    fn test_removes_matching_reference() {
        let mut module = module_with(&["mscorlib", "Ionad", "System.Core"]);
        let mut sink = MockDiagnosticSink::new();
        sink.expect_info()
            .withf(|m| m == "Removing reference to 'Ionad.dll'.")
            .times(1)
            .return_const(());

        assert!(remove_reference(&mut module, "Ionad", &mut sink));
        let names: Vec<_> = module.assembly_references.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["mscorlib", "System.Core"]);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut module = module_with(&["ionad"]);
        let mut sink = MockDiagnosticSink::new();
        sink.expect_info()
            .withf(|m| m == "No reference to 'Ionad.dll' found. References not modified.")
            .times(1)
            .return_const(());

        assert!(!remove_reference(&mut module, "Ionad", &mut sink));
        assert_eq!(module.assembly_references.len(), 1);
    }
}
