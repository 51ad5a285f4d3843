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

//! Discovery of replacement declarations

use crate::config::{DuplicatePolicy, WeaverConfig};
use crate::error::{WeaveError, WeaveResult};
use ionad_core::{AttributeArgument, Module, TypeDef, TypeId, TypeRef};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Source type to replacement type, built once per run
///
/// Keys are types defined in the module; each value is the annotated type
/// that declared itself the key's replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: BTreeMap<TypeId, TypeId>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a replacement, returning the one it displaced
    pub fn insert(&mut self, source: TypeId, replacement: TypeId) -> Option<TypeId> {
        self.entries.insert(source, replacement)
    }

    /// Replacement declared for a source type
    pub fn get(&self, source: TypeId) -> Option<TypeId> {
        self.entries.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every replacement type that took part, in source order
    pub fn replacement_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.entries.values().copied()
    }
}

/// Build the replacement map from every annotated type in the module
pub fn find_replacements(module: &Module, config: &WeaverConfig) -> WeaveResult<ReplacementMap> {
    let mut replacements = ReplacementMap::new();

    for (replacement, type_def) in module.iter_types() {
        let Some(source_ref) = declared_source(type_def, &config.attribute_type)? else {
            continue;
        };
        let source = module.resolve_type(source_ref)?;
        debug!(source = %source_ref, replacement = %type_def.full_name(), "found replacement declaration");

        if let Some(previous) = replacements.insert(source, replacement) {
            let source_type = module.type_def(source).full_name();
            let first = module.type_def(previous).full_name();
            let second = type_def.full_name();
            match config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(WeaveError::DuplicateReplacement { source_type, first, second });
                }
                DuplicatePolicy::LastWins => {
                    warn!(source = %source_type, discarded = %first, kept = %second, "duplicate replacement declaration");
                }
            }
        }
    }

    Ok(replacements)
}

/// The source type named by a type's replacement attribute, if it has one
fn declared_source<'a>(type_def: &'a TypeDef, attribute_type: &str) -> WeaveResult<Option<&'a TypeRef>> {
    let Some(attribute) = type_def.attributes_of(attribute_type).next() else {
        return Ok(None);
    };
    match attribute.arguments.as_slice() {
        [AttributeArgument::Type(source)] => Ok(Some(source)),
        [other] => Err(WeaveError::malformed_attribute(
            type_def.full_name(),
            format!("expected a type argument, found {other:?}"),
        )),
        arguments => Err(WeaveError::malformed_attribute(
            type_def.full_name(),
            format!("expected exactly one constructor argument, found {}", arguments.len()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ionad_core::{CustomAttribute, ModuleError};

    fn replaces(source: TypeRef) -> CustomAttribute {
        CustomAttribute::new(TypeRef::external("Ionad", "Ionad", "StaticReplacementAttribute"), vec![AttributeArgument::Type(source)])
    }

    #[test]
    fn test_no_declarations() {
        let mut module = Module::new("App");
        module.add_type(TypeDef::new("App", "Util"));
        let map = find_replacements(&module, &WeaverConfig::default()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_maps_source_to_annotated_type() {
        let mut module = Module::new("App");
        let util = module.add_type(TypeDef::new("App", "Util"));
        let fake = module.add_type(TypeDef::new("App", "FakeUtil").with_attribute(replaces(TypeRef::new("App", "Util"))));

        let map = find_replacements(&module, &WeaverConfig::default()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(util), Some(fake));
        assert_eq!(map.get(fake), None);
        assert_eq!(map.replacement_types().collect::<Vec<_>>(), vec![fake]);
    }

    #[test]
    fn test_unresolved_source_is_fatal() {
        let mut module = Module::new("App");
        module.add_type(TypeDef::new("App", "FakeUtil").with_attribute(replaces(TypeRef::new("App", "Gone"))));
        let result = find_replacements(&module, &WeaverConfig::default());
        assert!(matches!(result, Err(WeaveError::Module(ModuleError::UnresolvedType { .. }))));
    }

    #[test]
    fn test_wrong_argument_is_malformed() {
        let mut module = Module::new("App");
        let attribute = CustomAttribute::new(TypeRef::new("Ionad", "StaticReplacementAttribute"), vec![AttributeArgument::String("App.Util".into())]);
        module.add_type(TypeDef::new("App", "FakeUtil").with_attribute(attribute));
        assert!(matches!(
            find_replacements(&module, &WeaverConfig::default()),
            Err(WeaveError::MalformedAttribute { .. })
        ));

        let mut module = Module::new("App");
        let attribute = CustomAttribute::new(TypeRef::new("Ionad", "StaticReplacementAttribute"), vec![]);
        module.add_type(TypeDef::new("App", "FakeUtil").with_attribute(attribute));
        match find_replacements(&module, &WeaverConfig::default()) {
            Err(WeaveError::MalformedAttribute { type_name, details }) => {
                assert_eq!(type_name, "App.FakeUtil");
                assert!(details.contains("found 0"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let mut module = Module::new("App");
        module.add_type(TypeDef::new("App", "Util"));
        let unrelated = CustomAttribute::new(TypeRef::new("Other", "StaticReplacementAttribute"), vec![AttributeArgument::Type(TypeRef::new("App", "Util"))]);
        module.add_type(TypeDef::new("App", "FakeUtil").with_attribute(unrelated));
        assert!(find_replacements(&module, &WeaverConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_declarations() {
        let mut module = Module::new("App");
        let util = module.add_type(TypeDef::new("App", "Util"));
        module.add_type(TypeDef::new("App", "FakeA").with_attribute(replaces(TypeRef::new("App", "Util"))));
        let fake_b = module.add_type(TypeDef::new("App", "FakeB").with_attribute(replaces(TypeRef::new("App", "Util"))));

        match find_replacements(&module, &WeaverConfig::default()) {
            Err(WeaveError::DuplicateReplacement { source_type, first, second }) => {
                assert_eq!((source_type.as_str(), first.as_str(), second.as_str()), ("App.Util", "App.FakeA", "App.FakeB"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let config = WeaverConfig::default().with_duplicate_policy(DuplicatePolicy::LastWins);
        let map = find_replacements(&module, &config).unwrap();
        assert_eq!(map.get(util), Some(fake_b));
    }

    #[test]
    fn test_attribute_type_is_configurable() {
        let mut module = Module::new("App");
        let util = module.add_type(TypeDef::new("App", "Util"));
        let attribute = CustomAttribute::new(TypeRef::new("Acme", "ReplacesAttribute"), vec![AttributeArgument::Type(TypeRef::new("App", "Util"))]);
        let fake = module.add_type(TypeDef::new("App", "FakeUtil").with_attribute(attribute));

        let config = WeaverConfig {
            attribute_type: "Acme.ReplacesAttribute".to_string(),
            ..WeaverConfig::default()
        };
        assert_eq!(find_replacements(&module, &config).unwrap().get(util), Some(fake));
        assert!(find_replacements(&module, &WeaverConfig::default()).unwrap().is_empty());
    }
}
