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

//! Instruction encoding normalization
//!
//! Compact ("macro") encodings pack an operand into the opcode itself
//! (`ldarg.1`, `ldc.i4.5`) or shrink it to a byte (`ldloc.s`, `br.s`). Code
//! that edits instructions works on the expanded form produced by
//! [`simplify_macros`]; [`optimize_macros`] packs the body back into the
//! smallest encoding that is still valid for its branch distances.
//!
//! Neither pass adds, removes or reorders instructions, so branch targets and
//! exception handler bounds (which are instruction indices) are untouched.

use crate::body::MethodBody;
use crate::instruction::{Instruction, Operand};
use crate::opcode::OpCode;

const LDARG_MACROS: [OpCode; 4] = [OpCode::Ldarg0, OpCode::Ldarg1, OpCode::Ldarg2, OpCode::Ldarg3];
const LDLOC_MACROS: [OpCode; 4] = [OpCode::Ldloc0, OpCode::Ldloc1, OpCode::Ldloc2, OpCode::Ldloc3];
const STLOC_MACROS: [OpCode; 4] = [OpCode::Stloc0, OpCode::Stloc1, OpCode::Stloc2, OpCode::Stloc3];
const LDC_I4_MACROS: [OpCode; 10] = [
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
];

/// Expand every compact encoding in the body to its canonical long form
pub fn simplify_macros(body: &mut MethodBody) {
    for instruction in &mut body.instructions {
        if let Some(expanded) = expand(instruction) {
            *instruction = expanded;
        }
    }
}

/// Re-encode the body in its most compact valid form
pub fn optimize_macros(body: &mut MethodBody) {
    for instruction in &mut body.instructions {
        if let Some(compacted) = compact(instruction) {
            *instruction = compacted;
        }
    }
    optimize_branches(body);
}

fn expand(instruction: &Instruction) -> Option<Instruction> {
    let opcode = instruction.opcode;
    if let Some(index) = LDARG_MACROS.iter().position(|op| *op == opcode) {
        return Some(Instruction::new(OpCode::Ldarg, Operand::Variable(index as u16)));
    }
    if let Some(index) = LDLOC_MACROS.iter().position(|op| *op == opcode) {
        return Some(Instruction::new(OpCode::Ldloc, Operand::Variable(index as u16)));
    }
    if let Some(index) = STLOC_MACROS.iter().position(|op| *op == opcode) {
        return Some(Instruction::new(OpCode::Stloc, Operand::Variable(index as u16)));
    }
    if let Some(position) = LDC_I4_MACROS.iter().position(|op| *op == opcode) {
        return Some(Instruction::new(OpCode::LdcI4, Operand::Int32(position as i32 - 1)));
    }

    let widened = match opcode {
        OpCode::LdargS => OpCode::Ldarg,
        OpCode::LdargaS => OpCode::Ldarga,
        OpCode::StargS => OpCode::Starg,
        OpCode::LdlocS => OpCode::Ldloc,
        OpCode::LdlocaS => OpCode::Ldloca,
        OpCode::StlocS => OpCode::Stloc,
        OpCode::LdcI4S => {
            let Operand::Int8(value) = instruction.operand else {
                return None;
            };
            return Some(Instruction::new(OpCode::LdcI4, Operand::Int32(value as i32)));
        }
        _ => opcode.long_form()?,
    };
    Some(Instruction::new(widened, instruction.operand.clone()))
}

fn compact(instruction: &Instruction) -> Option<Instruction> {
    match (instruction.opcode, &instruction.operand) {
        (OpCode::Ldarg, Operand::Variable(index)) => compact_variable(*index, &LDARG_MACROS, OpCode::LdargS),
        (OpCode::Ldloc, Operand::Variable(index)) => compact_variable(*index, &LDLOC_MACROS, OpCode::LdlocS),
        (OpCode::Stloc, Operand::Variable(index)) => compact_variable(*index, &STLOC_MACROS, OpCode::StlocS),
        (OpCode::Ldarga, Operand::Variable(index)) => short_variable(*index, OpCode::LdargaS),
        (OpCode::Starg, Operand::Variable(index)) => short_variable(*index, OpCode::StargS),
        (OpCode::Ldloca, Operand::Variable(index)) => short_variable(*index, OpCode::LdlocaS),
        (OpCode::LdcI4, Operand::Int32(value)) => compact_int(*value),
        _ => None,
    }
}

fn compact_variable(index: u16, macros: &[OpCode; 4], short: OpCode) -> Option<Instruction> {
    match macros.get(index as usize) {
        Some(opcode) => Some(Instruction::simple(*opcode)),
        None => short_variable(index, short),
    }
}

fn short_variable(index: u16, short: OpCode) -> Option<Instruction> {
    (index <= u8::MAX as u16).then(|| Instruction::new(short, Operand::Variable(index)))
}

fn compact_int(value: i32) -> Option<Instruction> {
    if (-1..=8).contains(&value) {
        return Some(Instruction::simple(LDC_I4_MACROS[(value + 1) as usize]));
    }
    i8::try_from(value)
        .ok()
        .map(|small| Instruction::new(OpCode::LdcI4S, Operand::Int8(small)))
}

/// Shorten every branch whose displacement fits in a signed byte
///
/// Starts from long forms and shortens to a fixpoint. Shortening a branch
/// only ever moves instructions closer together, so a displacement that fits
/// once keeps fitting on later iterations.
fn optimize_branches(body: &mut MethodBody) {
    for instruction in &mut body.instructions {
        if let Some(long) = instruction.opcode.long_form() {
            instruction.opcode = long;
        }
    }

    loop {
        let offsets = body.offsets();
        let mut changed = false;
        for index in 0..body.instructions.len() {
            let instruction = &body.instructions[index];
            let (Some(short), Some(target)) = (instruction.opcode.short_form(), instruction.operand.as_target()) else {
                continue;
            };
            let Some(&target_offset) = offsets.get(target) else {
                continue;
            };
            let long_size = instruction.size() as i64;
            let short_size = short.encoded_size() as i64;
            let origin = offsets[index] as i64;
            // Forward targets move back by the bytes this branch gives up.
            let shift = if target > index { long_size - short_size } else { 0 };
            let displacement = target_offset as i64 - shift - (origin + short_size);
            if i8::try_from(displacement).is_ok() {
                body.instructions[index].opcode = short;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
