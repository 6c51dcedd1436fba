//! PowerPC instruction encoder.
//!
//! Packs semantic operands into 32-bit big-endian instruction words using the
//! D, X, I, B and XFX instruction forms. Encoding never truncates: a value
//! that does not fit its field is an [`EncodeError`].

/// Encoding contract violations.
pub mod error;
pub use error::{EncodeError, Field};

/// General-purpose and special-purpose register identifiers.
pub mod register;
pub use register::{Register, SpecialRegister, GENERAL_REGISTER_COUNT};

/// Instruction words and instruction sequences.
pub mod instruction;
pub use instruction::{Instruction, Instructions, INSTRUCTION_BYTES, PADDING};

/// Bit-field layouts of the supported instruction forms.
pub mod form;
pub use form::{Form, FormKind, B_FORM_DISPLACEMENT_BITS, I_FORM_DISPLACEMENT_BITS};

/// Relative branches and displacement calculation.
pub mod branch;
pub use branch::{b, bc, beq, bl, blr, bne, branch_displacement};

/// Named instruction constructors.
pub mod mnemonic;
pub use mnemonic::{
    addi, addis, cmpwi, crxor, eieio, li, lis, lhz, lwz, mfspr, mflr, mr, mtctr, mtlr, mtspr, nop,
    or, ori, sth, stw, stwu, subi, sync,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
