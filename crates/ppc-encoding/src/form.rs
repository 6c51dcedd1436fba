//! Bit-field packing for the PowerPC instruction forms.
//!
//! Bit numbering follows the architecture books: bit 0 is the most
//! significant bit of the big-endian word. Every form starts with a 6-bit
//! primary opcode in bits 0..=5.

use crate::error::{EncodeError, Field};
use crate::instruction::Instruction;
use crate::register::swap_spr_halves;

/// Width of the I-form (`b`/`bl`) word displacement.
pub const I_FORM_DISPLACEMENT_BITS: u32 = 24;
/// Width of the B-form (`bc`) word displacement.
pub const B_FORM_DISPLACEMENT_BITS: u32 = 14;

/// Discriminant for the supported instruction forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// `opcode · rt · ra · imm16`
    D,
    /// `opcode · a · b · c · xo10 · rc`
    X,
    /// `opcode · li24 · aa · lk`
    I,
    /// `opcode · bo · bi · bd14 · aa · lk`
    B,
    /// `opcode · rt · spr10 · xo10 · rc`
    Xfx,
}

/// Raw field values for one instruction in one of the supported forms.
///
/// Register fields are plain integers here; [`Form::encode`] checks every
/// field against its width. The typed constructors in [`crate::mnemonic`]
/// and [`crate::branch`] sit on top of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// Immediate form.
    D {
        /// Primary opcode.
        opcode: u8,
        /// Target (or source, for stores) register.
        rt: u8,
        /// Base / source register.
        ra: u8,
        /// 16-bit immediate or displacement.
        imm: u16,
    },
    /// Register form.
    X {
        /// Primary opcode.
        opcode: u8,
        /// Bits 6..=10.
        reg_a: u8,
        /// Bits 11..=15.
        reg_b: u8,
        /// Bits 16..=20.
        reg_c: u8,
        /// Extended opcode.
        xo: u16,
        /// Record bit (update CR0).
        rc: bool,
    },
    /// Unconditional branch form.
    I {
        /// Primary opcode.
        opcode: u8,
        /// Signed displacement in words.
        displacement: i32,
        /// Absolute addressing.
        absolute: bool,
        /// Save the return address in the link register.
        link: bool,
    },
    /// Conditional branch form.
    B {
        /// Primary opcode.
        opcode: u8,
        /// Branch options.
        bo: u8,
        /// Condition register bit tested.
        bi: u8,
        /// Signed displacement in words.
        displacement: i32,
        /// Absolute addressing.
        absolute: bool,
        /// Save the return address in the link register.
        link: bool,
    },
    /// Move to/from special-purpose register form.
    Xfx {
        /// Primary opcode.
        opcode: u8,
        /// General-purpose register.
        rt: u8,
        /// Special-purpose register number (unswapped).
        spr: u16,
        /// Extended opcode.
        xo: u16,
        /// Record bit.
        rc: bool,
    },
}

impl Form {
    /// Returns the form discriminant.
    #[must_use]
    pub const fn kind(&self) -> FormKind {
        match self {
            Self::D { .. } => FormKind::D,
            Self::X { .. } => FormKind::X,
            Self::I { .. } => FormKind::I,
            Self::B { .. } => FormKind::B,
            Self::Xfx { .. } => FormKind::Xfx,
        }
    }

    /// Packs the fields into an instruction word.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::FieldOverflow`] if any unsigned field is wider
    /// than its slot, or [`EncodeError::DisplacementOutOfRange`] if a branch
    /// displacement does not fit its signed slot. Values are never truncated.
    pub fn encode(self) -> Result<Instruction, EncodeError> {
        let word = match self {
            Self::D {
                opcode,
                rt,
                ra,
                imm,
            } => {
                check(Field::Opcode, u32::from(opcode))?;
                check(Field::RegisterA, u32::from(rt))?;
                check(Field::RegisterB, u32::from(ra))?;
                pack_d(opcode, rt, ra, imm)
            }
            Self::X {
                opcode,
                reg_a,
                reg_b,
                reg_c,
                xo,
                rc,
            } => {
                check(Field::Opcode, u32::from(opcode))?;
                check(Field::RegisterA, u32::from(reg_a))?;
                check(Field::RegisterB, u32::from(reg_b))?;
                check(Field::RegisterC, u32::from(reg_c))?;
                check(Field::ExtendedOpcode, u32::from(xo))?;
                pack_x(opcode, reg_a, reg_b, reg_c, xo, rc)
            }
            Self::I {
                opcode,
                displacement,
                absolute,
                link,
            } => {
                check(Field::Opcode, u32::from(opcode))?;
                check_signed(displacement, I_FORM_DISPLACEMENT_BITS)?;
                pack_i(opcode, displacement, absolute, link)
            }
            Self::B {
                opcode,
                bo,
                bi,
                displacement,
                absolute,
                link,
            } => {
                check(Field::Opcode, u32::from(opcode))?;
                check(Field::BranchOptions, u32::from(bo))?;
                check(Field::ConditionBit, u32::from(bi))?;
                check_signed(displacement, B_FORM_DISPLACEMENT_BITS)?;
                pack_b(opcode, bo, bi, displacement, absolute, link)
            }
            Self::Xfx {
                opcode,
                rt,
                spr,
                xo,
                rc,
            } => {
                check(Field::Opcode, u32::from(opcode))?;
                check(Field::RegisterA, u32::from(rt))?;
                check(Field::SpecialRegister, u32::from(spr))?;
                check(Field::ExtendedOpcode, u32::from(xo))?;
                pack_xfx(opcode, rt, spr, xo, rc)
            }
        };

        Ok(Instruction::from_word(word))
    }

    /// Splits a word back into the fields of the given form.
    ///
    /// This only inverts the bit layout; it does not check that the word
    /// actually is an instruction of that form.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn extract(kind: FormKind, word: u32) -> Self {
        let opcode = (word >> 26) as u8;
        let field_a = ((word >> 21) & 0x1F) as u8;
        let field_b = ((word >> 16) & 0x1F) as u8;
        let xo = ((word >> 1) & 0x3FF) as u16;
        let absolute = word & 0b10 != 0;
        let low_bit = word & 0b1 != 0;

        match kind {
            FormKind::D => Self::D {
                opcode,
                rt: field_a,
                ra: field_b,
                imm: (word & 0xFFFF) as u16,
            },
            FormKind::X => Self::X {
                opcode,
                reg_a: field_a,
                reg_b: field_b,
                reg_c: ((word >> 11) & 0x1F) as u8,
                xo,
                rc: low_bit,
            },
            FormKind::I => Self::I {
                opcode,
                displacement: sign_extend((word >> 2) & 0x00FF_FFFF, I_FORM_DISPLACEMENT_BITS),
                absolute,
                link: low_bit,
            },
            FormKind::B => Self::B {
                opcode,
                bo: field_a,
                bi: field_b,
                displacement: sign_extend((word >> 2) & 0x3FFF, B_FORM_DISPLACEMENT_BITS),
                absolute,
                link: low_bit,
            },
            FormKind::Xfx => Self::Xfx {
                opcode,
                rt: field_a,
                spr: swap_spr_halves(((word >> 11) & 0x3FF) as u16),
                xo,
                rc: low_bit,
            },
        }
    }
}

pub(crate) const fn check(field: Field, value: u32) -> Result<(), EncodeError> {
    if value > field.max_value() {
        return Err(EncodeError::FieldOverflow { field, value });
    }
    Ok(())
}

/// Checks that `words` fits a two's-complement field of `bits` bits.
pub(crate) const fn check_signed(words: i32, bits: u32) -> Result<(), EncodeError> {
    if bits == 0 || bits > 32 {
        return Err(EncodeError::InvalidDisplacementWidth { bits });
    }
    let min = i32::MIN >> (32 - bits);
    let max = i32::MAX >> (32 - bits);
    if words < min || words > max {
        return Err(EncodeError::DisplacementOutOfRange { words, bits });
    }
    Ok(())
}

#[allow(clippy::cast_possible_wrap)]
const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

#[allow(clippy::cast_sign_loss)]
const fn signed_field(value: i32, bits: u32) -> u32 {
    (value as u32) & ((1 << bits) - 1)
}

// The packers assume their inputs were already range checked, either by
// `Form::encode` or by the types the catalogue constructors take.

pub(crate) const fn pack_d(opcode: u8, rt: u8, ra: u8, imm: u16) -> u32 {
    (opcode as u32) << 26 | (rt as u32) << 21 | (ra as u32) << 16 | imm as u32
}

pub(crate) const fn pack_x(opcode: u8, reg_a: u8, reg_b: u8, reg_c: u8, xo: u16, rc: bool) -> u32 {
    (opcode as u32) << 26
        | (reg_a as u32) << 21
        | (reg_b as u32) << 16
        | (reg_c as u32) << 11
        | (xo as u32) << 1
        | rc as u32
}

pub(crate) const fn pack_i(opcode: u8, displacement: i32, absolute: bool, link: bool) -> u32 {
    (opcode as u32) << 26
        | signed_field(displacement, I_FORM_DISPLACEMENT_BITS) << 2
        | (absolute as u32) << 1
        | link as u32
}

pub(crate) const fn pack_b(
    opcode: u8,
    bo: u8,
    bi: u8,
    displacement: i32,
    absolute: bool,
    link: bool,
) -> u32 {
    (opcode as u32) << 26
        | (bo as u32) << 21
        | (bi as u32) << 16
        | signed_field(displacement, B_FORM_DISPLACEMENT_BITS) << 2
        | (absolute as u32) << 1
        | link as u32
}

pub(crate) const fn pack_xfx(opcode: u8, rt: u8, spr: u16, xo: u16, rc: bool) -> u32 {
    (opcode as u32) << 26
        | (rt as u32) << 21
        | (swap_spr_halves(spr) as u32) << 11
        | (xo as u32) << 1
        | rc as u32
}
