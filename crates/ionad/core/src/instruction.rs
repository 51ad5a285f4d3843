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

//! Instructions and their operands

use crate::model::MethodRef;
use crate::opcode::{OpCode, OperandKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline operand of an instruction
///
/// Branch targets are instruction indices rather than byte displacements, so
/// an operand stays valid whichever encoding form its opcode currently uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    None,
    Int8(i8),
    Int32(i32),
    Int64(i64),
    /// Local or argument index
    Variable(u16),
    String(String),
    Method(MethodRef),
    /// Index of the instruction a branch jumps to
    Target(usize),
}

impl Operand {
    /// Check whether this operand fits the given operand kind
    pub fn fits(&self, kind: OperandKind) -> bool {
        match (kind, self) {
            (OperandKind::InlineNone, Self::None) => true,
            (OperandKind::ShortInlineI, Self::Int8(_)) => true,
            (OperandKind::InlineI, Self::Int32(_)) => true,
            (OperandKind::InlineI8, Self::Int64(_)) => true,
            (OperandKind::ShortInlineVar, Self::Variable(index)) => *index <= u8::MAX as u16,
            (OperandKind::InlineVar, Self::Variable(_)) => true,
            (OperandKind::InlineString, Self::String(_)) => true,
            (OperandKind::InlineMethod, Self::Method(_)) => true,
            (OperandKind::ShortInlineBrTarget | OperandKind::InlineBrTarget, Self::Target(_)) => true,
            _ => false,
        }
    }

    /// The method reference carried by this operand, if any
    pub fn as_method(&self) -> Option<&MethodRef> {
        match self {
            Self::Method(method) => Some(method),
            _ => None,
        }
    }

    /// The branch target carried by this operand, if any
    pub fn as_target(&self) -> Option<usize> {
        match self {
            Self::Target(target) => Some(*target),
            _ => None,
        }
    }
}

/// A single instruction in a method body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operand: Operand,
}

impl Instruction {
    /// Create an instruction with an operand
    pub fn new(opcode: OpCode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// Create an instruction without an operand
    pub fn simple(opcode: OpCode) -> Self {
        Self::new(opcode, Operand::None)
    }

    /// Create a non-virtual call
    pub fn call(method: MethodRef) -> Self {
        Self::new(OpCode::Call, Operand::Method(method))
    }

    /// Create a virtual call
    pub fn callvirt(method: MethodRef) -> Self {
        Self::new(OpCode::Callvirt, Operand::Method(method))
    }

    /// Create a branch to the instruction at `target`
    pub fn branch(opcode: OpCode, target: usize) -> Self {
        Self::new(opcode, Operand::Target(target))
    }

    /// Create a string load
    pub fn ldstr(value: impl Into<String>) -> Self {
        Self::new(OpCode::Ldstr, Operand::String(value.into()))
    }

    /// Encoded size of this instruction in bytes
    pub fn size(&self) -> usize {
        self.opcode.encoded_size()
    }

    /// Whether the operand matches the opcode's operand kind
    pub fn is_well_formed(&self) -> bool {
        self.operand.fits(self.opcode.operand_kind())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int8(value) => write!(f, "{value}"),
            Self::Int32(value) => write!(f, "{value}"),
            Self::Int64(value) => write!(f, "{value}"),
            Self::Variable(index) => write!(f, "V_{index}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Method(method) => write!(f, "{method}"),
            Self::Target(target) => write!(f, "#{target}"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            _ => write!(f, "{} {}", self.opcode, self.operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodSignature, TypeRef};

    #[test]
    fn test_operand_fits_kind() {
        assert!(Operand::Variable(255).fits(OperandKind::ShortInlineVar));
        assert!(!Operand::Variable(256).fits(OperandKind::ShortInlineVar));
        assert!(Operand::Variable(256).fits(OperandKind::InlineVar));
        assert!(!Operand::Int32(1).fits(OperandKind::ShortInlineI));
        assert!(Operand::Target(0).fits(OperandKind::ShortInlineBrTarget));
    }

    #[test]
    fn test_instruction_display() {
        let method = MethodRef::new(TypeRef::new("Acme", "Util"), "Format", false, MethodSignature::void());
        assert_eq!(Instruction::call(method).to_string(), "call System.Void Acme.Util::Format()");
        assert_eq!(Instruction::simple(OpCode::Ret).to_string(), "ret");
        assert_eq!(Instruction::ldstr("hi").to_string(), "ldstr \"hi\"");
    }

    #[test]
    fn test_well_formed() {
        assert!(Instruction::new(OpCode::LdcI4S, Operand::Int8(-3)).is_well_formed());
        assert!(!Instruction::new(OpCode::Call, Operand::None).is_well_formed());
    }
}
