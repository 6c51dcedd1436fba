//! Relative branch constructors and displacement calculation.
//!
//! Branch targets are given as absolute addresses; the displacement is the
//! word count between the branch instruction and its target. This module
//! only emits relative branches, so the absolute-addressing bit is always
//! clear.

use crate::error::{EncodeError, Field};
use crate::form::{
    check, check_signed, pack_b, pack_i, pack_x, B_FORM_DISPLACEMENT_BITS,
    I_FORM_DISPLACEMENT_BITS,
};
use crate::instruction::Instruction;

const OP_BC: u8 = 16;
const OP_B: u8 = 18;
const OP_XL: u8 = 19;
const XO_BCLR: u16 = 16;

/// `BO` value for "branch if condition bit is false".
pub const BO_IF_FALSE: u8 = 4;
/// `BO` value for "branch if condition bit is true".
pub const BO_IF_TRUE: u8 = 12;
/// `BO` value for "branch always".
pub const BO_ALWAYS: u8 = 20;
/// `BI` for the EQ bit of condition register field 0.
pub const CR0_EQ: u8 = 2;

/// Computes the signed word displacement from `from` to `target`.
///
/// Addresses wrap at 32 bits, so a branch at `0` to `0xFFFF_FFFC` is a
/// displacement of -1 word.
///
/// # Errors
///
/// Returns [`EncodeError::MisalignedDisplacement`] if the byte offset is not
/// a multiple of 4 and [`EncodeError::DisplacementOutOfRange`] if the word
/// count does not fit a signed field of `bits` bits. A width outside
/// `1..=32` is [`EncodeError::InvalidDisplacementWidth`].
#[allow(clippy::cast_possible_wrap)]
pub const fn branch_displacement(from: u32, target: u32, bits: u32) -> Result<i32, EncodeError> {
    let offset = target.wrapping_sub(from) as i32;
    if offset % 4 != 0 {
        return Err(EncodeError::MisalignedDisplacement { offset });
    }

    let words = offset >> 2;
    match check_signed(words, bits) {
        Ok(()) => Ok(words),
        Err(err) => Err(err),
    }
}

/// Encodes `b target` placed at `from`.
///
/// # Errors
///
/// Fails if the target is misaligned or outside ±32 MiB.
pub const fn b(from: u32, target: u32) -> Result<Instruction, EncodeError> {
    unconditional(from, target, false)
}

/// Encodes `bl target` placed at `from`, saving the return address in LR.
///
/// # Errors
///
/// Fails if the target is misaligned or outside ±32 MiB.
pub const fn bl(from: u32, target: u32) -> Result<Instruction, EncodeError> {
    unconditional(from, target, true)
}

/// Encodes `bne target` (branch if CR0 EQ is clear) placed at `from`.
///
/// # Errors
///
/// Fails if the target is misaligned or outside ±32 KiB.
pub const fn bne(from: u32, target: u32) -> Result<Instruction, EncodeError> {
    bc(BO_IF_FALSE, CR0_EQ, from, target, false)
}

/// Encodes `beq target` (branch if CR0 EQ is set) placed at `from`.
///
/// # Errors
///
/// Fails if the target is misaligned or outside ±32 KiB.
pub const fn beq(from: u32, target: u32) -> Result<Instruction, EncodeError> {
    bc(BO_IF_TRUE, CR0_EQ, from, target, false)
}

/// Encodes a relative conditional branch with explicit `BO`/`BI` fields.
///
/// # Errors
///
/// Returns [`EncodeError::FieldOverflow`] if `bo` or `bi` is wider than 5
/// bits, and fails if the target is misaligned or outside ±32 KiB.
pub const fn bc(
    bo: u8,
    bi: u8,
    from: u32,
    target: u32,
    link: bool,
) -> Result<Instruction, EncodeError> {
    if let Err(err) = check(Field::BranchOptions, bo as u32) {
        return Err(err);
    }
    if let Err(err) = check(Field::ConditionBit, bi as u32) {
        return Err(err);
    }

    match branch_displacement(from, target, B_FORM_DISPLACEMENT_BITS) {
        Ok(words) => Ok(Instruction::from_word(pack_b(OP_BC, bo, bi, words, false, link))),
        Err(err) => Err(err),
    }
}

/// Encodes `blr`.
#[must_use]
pub const fn blr() -> Instruction {
    Instruction::from_word(pack_x(OP_XL, BO_ALWAYS, 0, 0, XO_BCLR, false))
}

const fn unconditional(from: u32, target: u32, link: bool) -> Result<Instruction, EncodeError> {
    match branch_displacement(from, target, I_FORM_DISPLACEMENT_BITS) {
        Ok(words) => Ok(Instruction::from_word(pack_i(OP_B, words, false, link))),
        Err(err) => Err(err),
    }
}
