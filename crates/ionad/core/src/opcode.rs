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

//! Opcodes understood by the module model
//!
//! The set is the subset of the CIL instruction set needed to express
//! method bodies that call, branch and shuffle locals and arguments. Values
//! are the real CIL encodings; two-byte opcodes carry the `0xFE` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the inline operand that follows an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// No operand
    InlineNone,
    /// Signed 8-bit immediate
    ShortInlineI,
    /// Signed 32-bit immediate
    InlineI,
    /// Signed 64-bit immediate
    InlineI8,
    /// 8-bit local or argument index
    ShortInlineVar,
    /// 16-bit local or argument index
    InlineVar,
    /// String token
    InlineString,
    /// Method token
    InlineMethod,
    /// 8-bit relative branch displacement
    ShortInlineBrTarget,
    /// 32-bit relative branch displacement
    InlineBrTarget,
}

impl OperandKind {
    /// Encoded operand size in bytes
    pub fn size(&self) -> usize {
        match self {
            Self::InlineNone => 0,
            Self::ShortInlineI | Self::ShortInlineVar | Self::ShortInlineBrTarget => 1,
            Self::InlineVar => 2,
            Self::InlineI | Self::InlineString | Self::InlineMethod | Self::InlineBrTarget => 4,
            Self::InlineI8 => 8,
        }
    }

    /// Whether the operand is a branch displacement
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::ShortInlineBrTarget | Self::InlineBrTarget)
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[repr(u16)]
pub enum OpCode {
    Nop = 0x00,
    Ldarg0 = 0x02,
    Ldarg1 = 0x03,
    Ldarg2 = 0x04,
    Ldarg3 = 0x05,
    Ldloc0 = 0x06,
    Ldloc1 = 0x07,
    Ldloc2 = 0x08,
    Ldloc3 = 0x09,
    Stloc0 = 0x0A,
    Stloc1 = 0x0B,
    Stloc2 = 0x0C,
    Stloc3 = 0x0D,
    LdargS = 0x0E,
    LdargaS = 0x0F,
    StargS = 0x10,
    LdlocS = 0x11,
    LdlocaS = 0x12,
    StlocS = 0x13,
    Ldnull = 0x14,
    LdcI4M1 = 0x15,
    LdcI4_0 = 0x16,
    LdcI4_1 = 0x17,
    LdcI4_2 = 0x18,
    LdcI4_3 = 0x19,
    LdcI4_4 = 0x1A,
    LdcI4_5 = 0x1B,
    LdcI4_6 = 0x1C,
    LdcI4_7 = 0x1D,
    LdcI4_8 = 0x1E,
    LdcI4S = 0x1F,
    LdcI4 = 0x20,
    LdcI8 = 0x21,
    Dup = 0x25,
    Pop = 0x26,
    Call = 0x28,
    Ret = 0x2A,
    BrS = 0x2B,
    BrfalseS = 0x2C,
    BrtrueS = 0x2D,
    BeqS = 0x2E,
    BgeS = 0x2F,
    BgtS = 0x30,
    BleS = 0x31,
    BltS = 0x32,
    BneUnS = 0x33,
    Br = 0x38,
    Brfalse = 0x39,
    Brtrue = 0x3A,
    Beq = 0x3B,
    Bge = 0x3C,
    Bgt = 0x3D,
    Ble = 0x3E,
    Blt = 0x3F,
    BneUn = 0x40,
    Add = 0x58,
    Sub = 0x59,
    Mul = 0x5A,
    Callvirt = 0x6F,
    Ldstr = 0x72,
    Newobj = 0x73,
    Throw = 0x7A,
    Endfinally = 0xDC,
    Leave = 0xDD,
    LeaveS = 0xDE,
    Ldarg = 0xFE09,
    Ldarga = 0xFE0A,
    Starg = 0xFE0B,
    Ldloc = 0xFE0C,
    Ldloca = 0xFE0D,
    Stloc = 0xFE0E,
}

/// Every opcode, in encoding order
pub const ALL_OPCODES: &[OpCode] = &[
    OpCode::Nop,
    OpCode::Ldarg0,
    OpCode::Ldarg1,
    OpCode::Ldarg2,
    OpCode::Ldarg3,
    OpCode::Ldloc0,
    OpCode::Ldloc1,
    OpCode::Ldloc2,
    OpCode::Ldloc3,
    OpCode::Stloc0,
    OpCode::Stloc1,
    OpCode::Stloc2,
    OpCode::Stloc3,
    OpCode::LdargS,
    OpCode::LdargaS,
    OpCode::StargS,
    OpCode::LdlocS,
    OpCode::LdlocaS,
    OpCode::StlocS,
    OpCode::Ldnull,
    OpCode::LdcI4M1,
    OpCode::LdcI4_0,
    OpCode::LdcI4_1,
    OpCode::LdcI4_2,
    OpCode::LdcI4_3,
    OpCode::LdcI4_4,
    OpCode::LdcI4_5,
    OpCode::LdcI4_6,
    OpCode::LdcI4_7,
    OpCode::LdcI4_8,
    OpCode::LdcI4S,
    OpCode::LdcI4,
    OpCode::LdcI8,
    OpCode::Dup,
    OpCode::Pop,
    OpCode::Call,
    OpCode::Ret,
    OpCode::BrS,
    OpCode::BrfalseS,
    OpCode::BrtrueS,
    OpCode::BeqS,
    OpCode::BgeS,
    OpCode::BgtS,
    OpCode::BleS,
    OpCode::BltS,
    OpCode::BneUnS,
    OpCode::Br,
    OpCode::Brfalse,
    OpCode::Brtrue,
    OpCode::Beq,
    OpCode::Bge,
    OpCode::Bgt,
    OpCode::Ble,
    OpCode::Blt,
    OpCode::BneUn,
    OpCode::Add,
    OpCode::Sub,
    OpCode::Mul,
    OpCode::Callvirt,
    OpCode::Ldstr,
    OpCode::Newobj,
    OpCode::Throw,
    OpCode::Endfinally,
    OpCode::Leave,
    OpCode::LeaveS,
    OpCode::Ldarg,
    OpCode::Ldarga,
    OpCode::Starg,
    OpCode::Ldloc,
    OpCode::Ldloca,
    OpCode::Stloc,
];

impl OpCode {
    /// Returns the opcode's encoded value.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Looks an opcode up by its encoded value.
    pub fn from_u16(value: u16) -> Option<Self> {
        ALL_OPCODES.iter().copied().find(|op| op.as_u16() == value)
    }

    /// Looks an opcode up by its mnemonic, case-insensitively.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        let wanted = mnemonic.to_ascii_lowercase();
        ALL_OPCODES.iter().copied().find(|op| op.to_mnemonic() == wanted)
    }

    /// Converts an `OpCode` to its mnemonic.
    pub fn to_mnemonic(&self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Ldarg0 => "ldarg.0",
            Self::Ldarg1 => "ldarg.1",
            Self::Ldarg2 => "ldarg.2",
            Self::Ldarg3 => "ldarg.3",
            Self::Ldloc0 => "ldloc.0",
            Self::Ldloc1 => "ldloc.1",
            Self::Ldloc2 => "ldloc.2",
            Self::Ldloc3 => "ldloc.3",
            Self::Stloc0 => "stloc.0",
            Self::Stloc1 => "stloc.1",
            Self::Stloc2 => "stloc.2",
            Self::Stloc3 => "stloc.3",
            Self::LdargS => "ldarg.s",
            Self::LdargaS => "ldarga.s",
            Self::StargS => "starg.s",
            Self::LdlocS => "ldloc.s",
            Self::LdlocaS => "ldloca.s",
            Self::StlocS => "stloc.s",
            Self::Ldnull => "ldnull",
            Self::LdcI4M1 => "ldc.i4.m1",
            Self::LdcI4_0 => "ldc.i4.0",
            Self::LdcI4_1 => "ldc.i4.1",
            Self::LdcI4_2 => "ldc.i4.2",
            Self::LdcI4_3 => "ldc.i4.3",
            Self::LdcI4_4 => "ldc.i4.4",
            Self::LdcI4_5 => "ldc.i4.5",
            Self::LdcI4_6 => "ldc.i4.6",
            Self::LdcI4_7 => "ldc.i4.7",
            Self::LdcI4_8 => "ldc.i4.8",
            Self::LdcI4S => "ldc.i4.s",
            Self::LdcI4 => "ldc.i4",
            Self::LdcI8 => "ldc.i8",
            Self::Dup => "dup",
            Self::Pop => "pop",
            Self::Call => "call",
            Self::Ret => "ret",
            Self::BrS => "br.s",
            Self::BrfalseS => "brfalse.s",
            Self::BrtrueS => "brtrue.s",
            Self::BeqS => "beq.s",
            Self::BgeS => "bge.s",
            Self::BgtS => "bgt.s",
            Self::BleS => "ble.s",
            Self::BltS => "blt.s",
            Self::BneUnS => "bne.un.s",
            Self::Br => "br",
            Self::Brfalse => "brfalse",
            Self::Brtrue => "brtrue",
            Self::Beq => "beq",
            Self::Bge => "bge",
            Self::Bgt => "bgt",
            Self::Ble => "ble",
            Self::Blt => "blt",
            Self::BneUn => "bne.un",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Callvirt => "callvirt",
            Self::Ldstr => "ldstr",
            Self::Newobj => "newobj",
            Self::Throw => "throw",
            Self::Endfinally => "endfinally",
            Self::Leave => "leave",
            Self::LeaveS => "leave.s",
            Self::Ldarg => "ldarg",
            Self::Ldarga => "ldarga",
            Self::Starg => "starg",
            Self::Ldloc => "ldloc",
            Self::Ldloca => "ldloca",
            Self::Stloc => "stloc",
        }
    }

    /// Operand shape that follows this opcode
    pub fn operand_kind(&self) -> OperandKind {
        match self {
            Self::LdargS | Self::LdargaS | Self::StargS | Self::LdlocS | Self::LdlocaS | Self::StlocS => OperandKind::ShortInlineVar,
            Self::Ldarg | Self::Ldarga | Self::Starg | Self::Ldloc | Self::Ldloca | Self::Stloc => OperandKind::InlineVar,
            Self::LdcI4S => OperandKind::ShortInlineI,
            Self::LdcI4 => OperandKind::InlineI,
            Self::LdcI8 => OperandKind::InlineI8,
            Self::Ldstr => OperandKind::InlineString,
            Self::Call | Self::Callvirt | Self::Newobj => OperandKind::InlineMethod,
            Self::BrS
            | Self::BrfalseS
            | Self::BrtrueS
            | Self::BeqS
            | Self::BgeS
            | Self::BgtS
            | Self::BleS
            | Self::BltS
            | Self::BneUnS
            | Self::LeaveS => OperandKind::ShortInlineBrTarget,
            Self::Br
            | Self::Brfalse
            | Self::Brtrue
            | Self::Beq
            | Self::Bge
            | Self::Bgt
            | Self::Ble
            | Self::Blt
            | Self::BneUn
            | Self::Leave => OperandKind::InlineBrTarget,
            _ => OperandKind::InlineNone,
        }
    }

    /// Size of the opcode itself, without its operand
    pub fn opcode_size(&self) -> usize {
        if self.as_u16() > 0xFF { 2 } else { 1 }
    }

    /// Total encoded size of the instruction
    pub fn encoded_size(&self) -> usize {
        self.opcode_size() + self.operand_kind().size()
    }

    /// Whether this is a branch with an inline target
    pub fn is_branch(&self) -> bool {
        self.operand_kind().is_branch()
    }

    /// Whether this is the non-virtual call opcode
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call)
    }

    /// The 32-bit displacement form of a short branch
    pub fn long_form(&self) -> Option<Self> {
        match self {
            Self::BrS => Some(Self::Br),
            Self::BrfalseS => Some(Self::Brfalse),
            Self::BrtrueS => Some(Self::Brtrue),
            Self::BeqS => Some(Self::Beq),
            Self::BgeS => Some(Self::Bge),
            Self::BgtS => Some(Self::Bgt),
            Self::BleS => Some(Self::Ble),
            Self::BltS => Some(Self::Blt),
            Self::BneUnS => Some(Self::BneUn),
            Self::LeaveS => Some(Self::Leave),
            _ => None,
        }
    }

    /// The 8-bit displacement form of a long branch
    pub fn short_form(&self) -> Option<Self> {
        match self {
            Self::Br => Some(Self::BrS),
            Self::Brfalse => Some(Self::BrfalseS),
            Self::Brtrue => Some(Self::BrtrueS),
            Self::Beq => Some(Self::BeqS),
            Self::Bge => Some(Self::BgeS),
            Self::Bgt => Some(Self::BgtS),
            Self::Ble => Some(Self::BleS),
            Self::Blt => Some(Self::BltS),
            Self::BneUn => Some(Self::BneUnS),
            Self::Leave => Some(Self::LeaveS),
            _ => None,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_mnemonic())
    }
}
