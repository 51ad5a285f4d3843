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

//! Ionad core
//!
//! In-memory representation of a compiled module: types, methods, property
//! accessors, method bodies and the library reference table, together with
//! the instruction encoding helpers the weaver relies on and the module file
//! formats used by the command-line tools.

pub mod body;
pub mod error;
pub mod format;
pub mod instruction;
pub mod macros;
pub mod model;
pub mod opcode;

pub use body::{ExceptionHandler, HandlerKind, MethodBody};
pub use error::{ErrorCategory, ModuleError, ModuleResult};
pub use format::{ModuleFormat, ModuleHeader, decode, encode, read_module, write_module};
pub use instruction::{Instruction, Operand};
pub use macros::{optimize_macros, simplify_macros};
pub use model::{
    AssemblyReference, AttributeArgument, BodySlot, CustomAttribute, MemberSlot, MethodDef, MethodRef, MethodSignature, Module, PropertyDef,
    ResolvedMethod, TypeDef, TypeId, TypeRef,
};
pub use opcode::{OpCode, OperandKind};
