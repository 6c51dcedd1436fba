//! Named instruction constructors.
//!
//! Each constructor packs its operands through one of the instruction forms.
//! Operands are typed ([`Register`], `u16` immediates, [`SpecialRegister`]),
//! so every field already fits its slot and the constructors are total.
//! Memory operands follow assembler order: `lwz rt, d(ra)` is
//! `lwz(rt, d, ra)`.

use crate::error::EncodeError;
use crate::form::{pack_d, pack_x, pack_xfx};
use crate::instruction::Instruction;
use crate::register::{Register, SpecialRegister};

mod op {
    pub const CMPI: u8 = 11;
    pub const ADDI: u8 = 14;
    pub const ADDIS: u8 = 15;
    pub const XL: u8 = 19;
    pub const ORI: u8 = 24;
    pub const X: u8 = 31;
    pub const LWZ: u8 = 32;
    pub const STW: u8 = 36;
    pub const STWU: u8 = 37;
    pub const LHZ: u8 = 40;
    pub const STH: u8 = 44;
}

mod xo {
    pub const CRXOR: u16 = 193;
    pub const MFSPR: u16 = 339;
    pub const OR: u16 = 444;
    pub const MTSPR: u16 = 467;
    pub const SYNC: u16 = 598;
    pub const EIEIO: u16 = 854;
}

/// Largest magnitude [`subi`] accepts (`-0x8000` is the most negative `SIMM`).
pub const SUBI_MAX_MAGNITUDE: u16 = 0x8000;

const fn d_form(opcode: u8, rt: Register, ra: Register, imm: u16) -> Instruction {
    Instruction::from_word(pack_d(opcode, rt.bits(), ra.bits(), imm))
}

/// `lwz rt, d(ra)`: load word and zero.
#[must_use]
pub const fn lwz(rt: Register, d: u16, ra: Register) -> Instruction {
    d_form(op::LWZ, rt, ra, d)
}

/// `lhz rt, d(ra)`: load halfword and zero.
#[must_use]
pub const fn lhz(rt: Register, d: u16, ra: Register) -> Instruction {
    d_form(op::LHZ, rt, ra, d)
}

/// `stw rs, d(ra)`: store word.
#[must_use]
pub const fn stw(rs: Register, d: u16, ra: Register) -> Instruction {
    d_form(op::STW, rs, ra, d)
}

/// `stwu rs, d(ra)`: store word with update.
#[must_use]
pub const fn stwu(rs: Register, d: u16, ra: Register) -> Instruction {
    d_form(op::STWU, rs, ra, d)
}

/// `sth rs, d(ra)`: store halfword.
#[must_use]
pub const fn sth(rs: Register, d: u16, ra: Register) -> Instruction {
    d_form(op::STH, rs, ra, d)
}

/// `addi rt, ra, imm`.
///
/// With `ra = r0` this is `li`, since `r0` reads as zero in this slot.
#[must_use]
pub const fn addi(rt: Register, ra: Register, imm: u16) -> Instruction {
    d_form(op::ADDI, rt, ra, imm)
}

/// `li rt, imm` (`addi rt, 0, imm`).
#[must_use]
pub const fn li(rt: Register, imm: u16) -> Instruction {
    addi(rt, Register::R0, imm)
}

/// `subi rt, ra, magnitude` (`addi rt, ra, -magnitude`).
///
/// # Errors
///
/// Returns [`EncodeError::ImmediateOutOfRange`] if the negated magnitude
/// does not fit a signed 16-bit immediate, i.e. `magnitude > 0x8000`.
pub const fn subi(rt: Register, ra: Register, magnitude: u16) -> Result<Instruction, EncodeError> {
    if magnitude > SUBI_MAX_MAGNITUDE {
        return Err(EncodeError::ImmediateOutOfRange {
            value: -(magnitude as i32),
        });
    }
    Ok(addi(rt, ra, magnitude.wrapping_neg()))
}

/// `addis rt, ra, imm`: add immediate shifted.
#[must_use]
pub const fn addis(rt: Register, ra: Register, imm: u16) -> Instruction {
    d_form(op::ADDIS, rt, ra, imm)
}

/// `lis rt, imm` (`addis rt, 0, imm`).
#[must_use]
pub const fn lis(rt: Register, imm: u16) -> Instruction {
    addis(rt, Register::R0, imm)
}

/// `or ra, rs, rb`, or `or.` when `record` is set.
#[must_use]
pub const fn or(ra: Register, rs: Register, rb: Register, record: bool) -> Instruction {
    Instruction::from_word(pack_x(op::X, rs.bits(), ra.bits(), rb.bits(), xo::OR, record))
}

/// `mr ra, rs` (`or ra, rs, rs`).
#[must_use]
pub const fn mr(ra: Register, rs: Register) -> Instruction {
    or(ra, rs, rs, false)
}

/// `ori ra, rs, imm`.
#[must_use]
pub const fn ori(ra: Register, rs: Register, imm: u16) -> Instruction {
    d_form(op::ORI, rs, ra, imm)
}

/// `nop` (`ori r0, r0, 0`).
#[must_use]
pub const fn nop() -> Instruction {
    ori(Register::R0, Register::R0, 0)
}

/// `cmpwi ra, imm` against condition register field 0.
///
/// Other CR fields are not supported.
#[must_use]
pub const fn cmpwi(ra: Register, imm: u16) -> Instruction {
    d_form(op::CMPI, Register::R0, ra, imm)
}

/// `mtspr spr, rs`.
#[must_use]
pub const fn mtspr(spr: SpecialRegister, rs: Register) -> Instruction {
    Instruction::from_word(pack_xfx(op::X, rs.bits(), spr.id(), xo::MTSPR, false))
}

/// `mfspr rt, spr`.
#[must_use]
pub const fn mfspr(rt: Register, spr: SpecialRegister) -> Instruction {
    Instruction::from_word(pack_xfx(op::X, rt.bits(), spr.id(), xo::MFSPR, false))
}

/// `mtlr rs`.
#[must_use]
pub const fn mtlr(rs: Register) -> Instruction {
    mtspr(SpecialRegister::LR, rs)
}

/// `mflr rt`.
#[must_use]
pub const fn mflr(rt: Register) -> Instruction {
    mfspr(rt, SpecialRegister::LR)
}

/// `mtctr rs`.
#[must_use]
pub const fn mtctr(rs: Register) -> Instruction {
    mtspr(SpecialRegister::CTR, rs)
}

/// `sync 0`: full memory barrier.
#[must_use]
pub const fn sync() -> Instruction {
    Instruction::from_word(pack_x(op::X, 0, 0, 0, xo::SYNC, false))
}

/// `eieio`: enforce in-order execution of I/O.
#[must_use]
pub const fn eieio() -> Instruction {
    Instruction::from_word(pack_x(op::X, 0, 0, 0, xo::EIEIO, false))
}

/// `crxor 6, 6, 6` (`crclr 4*cr1+eq`).
///
/// Compilers emit this before calls to variadic functions to say that no
/// floating-point arguments are passed in registers, and it has no other
/// effect, which makes it a safe filler word.
#[must_use]
pub const fn crxor() -> Instruction {
    Instruction::from_word(pack_x(op::XL, 6, 6, 6, xo::CRXOR, false))
}
