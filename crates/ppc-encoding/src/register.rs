/// Number of general-purpose registers (`r0..r31`).
pub const GENERAL_REGISTER_COUNT: usize = 32;

/// General-purpose register identifier.
///
/// Register ids are only ever packed into 5-bit fields, so the closed enum is
/// the whole range check the encoder needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
    R16 = 16,
    R17 = 17,
    R18 = 18,
    R19 = 19,
    R20 = 20,
    R21 = 21,
    R22 = 22,
    R23 = 23,
    R24 = 24,
    R25 = 25,
    R26 = 26,
    R27 = 27,
    R28 = 28,
    R29 = 29,
    R30 = 30,
    R31 = 31,
}

impl Register {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
        Self::R15,
        Self::R16,
        Self::R17,
        Self::R18,
        Self::R19,
        Self::R20,
        Self::R21,
        Self::R22,
        Self::R23,
        Self::R24,
        Self::R25,
        Self::R26,
        Self::R27,
        Self::R28,
        Self::R29,
        Self::R30,
        Self::R31,
    ];

    /// Returns the 5-bit field value for this register.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes a 5-bit register field.
    #[must_use]
    pub const fn from_u5(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            8 => Some(Self::R8),
            9 => Some(Self::R9),
            10 => Some(Self::R10),
            11 => Some(Self::R11),
            12 => Some(Self::R12),
            13 => Some(Self::R13),
            14 => Some(Self::R14),
            15 => Some(Self::R15),
            16 => Some(Self::R16),
            17 => Some(Self::R17),
            18 => Some(Self::R18),
            19 => Some(Self::R19),
            20 => Some(Self::R20),
            21 => Some(Self::R21),
            22 => Some(Self::R22),
            23 => Some(Self::R23),
            24 => Some(Self::R24),
            25 => Some(Self::R25),
            26 => Some(Self::R26),
            27 => Some(Self::R27),
            28 => Some(Self::R28),
            29 => Some(Self::R29),
            30 => Some(Self::R30),
            31 => Some(Self::R31),
            _ => None,
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.bits())
    }
}

/// Special-purpose register number as used by `mtspr`/`mfspr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecialRegister(u16);

impl SpecialRegister {
    /// Fixed-point exception register.
    pub const XER: Self = Self(1);
    /// Link register.
    pub const LR: Self = Self(8);
    /// Count register.
    pub const CTR: Self = Self(9);

    /// Largest representable special-purpose register number.
    pub const MAX: u16 = 0x3FF;

    /// Creates a special-purpose register id, rejecting values wider than 10 bits.
    #[must_use]
    pub const fn new(id: u16) -> Option<Self> {
        if id <= Self::MAX {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Returns the architectural register number.
    #[must_use]
    pub const fn id(self) -> u16 {
        self.0
    }

    /// Returns the 10-bit field as stored in an XFX-form word: low five bits
    /// first, then the high five bits.
    #[must_use]
    pub const fn swapped_halves(self) -> u16 {
        swap_spr_halves(self.0)
    }

    /// Reassembles a register number from its stored XFX-form field.
    #[must_use]
    pub const fn from_swapped_halves(field: u16) -> Self {
        Self(swap_spr_halves(field))
    }
}

/// Exchanges the two 5-bit halves of a 10-bit SPR field. The operation is
/// its own inverse.
pub(crate) const fn swap_spr_halves(field: u16) -> u16 {
    ((field & 0x1F) << 5) | ((field >> 5) & 0x1F)
}

#[cfg(test)]
mod tests {
    use super::{Register, SpecialRegister, GENERAL_REGISTER_COUNT};

    #[test]
    fn register_field_roundtrip_covers_all_registers() {
        for (index, register) in Register::ALL.iter().enumerate() {
            assert_eq!(usize::from(register.bits()), index);
            assert_eq!(Register::from_u5(register.bits()), Some(*register));
        }
        assert_eq!(Register::ALL.len(), GENERAL_REGISTER_COUNT);
        assert_eq!(Register::from_u5(32), None);
    }

    #[test]
    fn register_display_uses_assembler_names() {
        assert_eq!(Register::R0.to_string(), "r0");
        assert_eq!(Register::R31.to_string(), "r31");
    }

    #[test]
    fn special_register_rejects_wide_ids() {
        assert_eq!(SpecialRegister::new(0x3FF).map(SpecialRegister::id), Some(0x3FF));
        assert_eq!(SpecialRegister::new(0x400), None);
    }

    #[test]
    fn link_register_halves_are_swapped() {
        assert_eq!(SpecialRegister::LR.swapped_halves(), 0x100);
        // SPR 287 (PVR): low half 0x1F, high half 0x08.
        let pvr = SpecialRegister::new(287).unwrap();
        assert_eq!(pvr.swapped_halves(), 0x3E8);
        assert_eq!(SpecialRegister::from_swapped_halves(0x3E8), pvr);
    }
}
