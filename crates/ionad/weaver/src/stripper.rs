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

//! Removal of replacement declarations from woven types

use crate::config::WeaverConfig;
use ionad_core::{Module, TypeId};
use tracing::debug;

/// Remove the replacement attribute from every given type
///
/// Returns the number of attributes removed. Running it again on the same
/// module removes nothing.
pub fn remove_replacement_attributes(module: &mut Module, replacement_types: impl IntoIterator<Item = TypeId>, config: &WeaverConfig) -> usize {
    let mut removed = 0;
    for type_id in replacement_types {
        let type_def = module.type_def_mut(type_id);
        let count = type_def.remove_attributes(&config.attribute_type);
        if count > 0 {
            debug!(type_name = %type_def.full_name(), count, "removed replacement attribute");
        }
        removed += count;
    }
    removed
}
