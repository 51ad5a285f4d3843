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

//! Ionad weaver
//!
//! Redirects static calls made on a source type to the like-named static
//! methods of a replacement type. A replacement type declares what it
//! replaces with an attribute:
//!
//! ```text
//! [StaticReplacement(typeof(Util))]
//! class FakeUtil { static void Format() { ... } }
//! ```
//!
//! A run scans the module for such declarations, rewrites every `call` to a
//! static method of a source type, removes the declarations and finally
//! drops the reference to the attribute's library, which is only needed at
//! build time.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pruner;
pub mod rewriter;
pub mod scanner;
pub mod stripper;
pub mod weaver;

pub use config::{CONFIG_ENV, DuplicatePolicy, MethodMatching, WeaverConfig};
pub use diagnostics::{CallbackSink, CollectingSink, Diagnostic, DiagnosticSink, Level, TracingSink};
pub use error::{WeaveError, WeaveResult};
pub use pruner::remove_reference;
pub use rewriter::{CallRewriter, RewriteStats};
pub use scanner::{ReplacementMap, find_replacements};
pub use stripper::remove_replacement_attributes;
pub use weaver::{ModuleWeaver, WeaveReport, weave};
