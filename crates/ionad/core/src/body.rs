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

//! Method bodies

use crate::error::{ModuleError, ModuleResult};
use crate::instruction::{Instruction, Operand};
use crate::model::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a protected region handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerKind {
    Catch(TypeRef),
    Finally,
    Fault,
}

/// Exception handling clause; bounds are instruction indices, ends exclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionHandler {
    pub kind: HandlerKind,
    pub try_start: usize,
    pub try_end: usize,
    pub handler_start: usize,
    pub handler_end: usize,
}

/// Ordered instruction stream of one method plus its frame description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBody {
    pub instructions: Vec<Instruction>,
    /// Declared local variable types
    pub locals: Vec<String>,
    /// Whether locals must be zero-initialized on entry
    pub init_locals: bool,
    pub exception_handlers: Vec<ExceptionHandler>,
}

impl MethodBody {
    /// Create a body from an instruction list
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    /// Declare the local variable types of this body
    pub fn with_locals(mut self, locals: Vec<String>) -> Self {
        self.locals = locals;
        self
    }

    /// Add an exception handling clause
    pub fn with_handler(mut self, handler: ExceptionHandler) -> Self {
        self.exception_handlers.push(handler);
        self
    }

    /// Number of instructions in the body
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the body has no instructions
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Byte offset of every instruction under the current encoding
    pub fn offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.instructions.len());
        let mut offset = 0;
        for instruction in &self.instructions {
            offsets.push(offset);
            offset += instruction.size();
        }
        offsets
    }

    /// Total encoded size in bytes
    pub fn code_size(&self) -> usize {
        self.instructions.iter().map(Instruction::size).sum()
    }

    /// Check operand shapes, branch targets and handler ranges
    pub fn validate(&self) -> ModuleResult<()> {
        let len = self.instructions.len();
        for (index, instruction) in self.instructions.iter().enumerate() {
            if !instruction.is_well_formed() {
                return Err(ModuleError::invalid_operand(
                    instruction.opcode.to_mnemonic(),
                    index,
                    format!("operand {:?} does not fit {:?}", instruction.operand, instruction.opcode.operand_kind()),
                ));
            }
            if let Operand::Target(target) = instruction.operand {
                if target >= len {
                    return Err(ModuleError::InvalidBranchTarget { index, target, len });
                }
            }
        }

        for (index, handler) in self.exception_handlers.iter().enumerate() {
            let ordered = handler.try_start < handler.try_end && handler.handler_start < handler.handler_end;
            if !ordered || handler.try_end > len || handler.handler_end > len {
                return Err(ModuleError::InvalidExceptionHandler {
                    index,
                    details: format!(
                        "try {}..{} handler {}..{} in a body of {} instructions",
                        handler.try_start, handler.try_end, handler.handler_start, handler.handler_end, len
                    ),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offsets = self.offsets();
        if self.init_locals || !self.locals.is_empty() {
            let init = if self.init_locals { "init " } else { "" };
            writeln!(f, ".locals {init}({})", self.locals.join(", "))?;
        }
        for (index, instruction) in self.instructions.iter().enumerate() {
            write!(f, "IL_{:04x}: ", offsets[index])?;
            match instruction.operand {
                Operand::Target(target) => {
                    let label = offsets.get(target).copied().unwrap_or(self.code_size());
                    writeln!(f, "{} IL_{:04x}", instruction.opcode, label)?;
                }
                _ => writeln!(f, "{instruction}")?,
            }
        }
        Ok(())
    }
}
