use thiserror::Error;

/// Named bit-fields of the supported instruction forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Primary opcode (bits 0..=5).
    Opcode,
    /// First 5-bit register field (bits 6..=10).
    RegisterA,
    /// Second 5-bit register field (bits 11..=15).
    RegisterB,
    /// Third 5-bit register field (bits 16..=20, X-form only).
    RegisterC,
    /// Extended opcode (bits 21..=30).
    ExtendedOpcode,
    /// Branch options (`BO`, B-form).
    BranchOptions,
    /// Condition register bit (`BI`, B-form).
    ConditionBit,
    /// Special-purpose register number (XFX-form).
    SpecialRegister,
}

impl Field {
    /// Width of the field in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Opcode => 6,
            Self::RegisterA
            | Self::RegisterB
            | Self::RegisterC
            | Self::BranchOptions
            | Self::ConditionBit => 5,
            Self::ExtendedOpcode | Self::SpecialRegister => 10,
        }
    }

    /// Largest unsigned value representable in the field.
    #[must_use]
    pub const fn max_value(self) -> u32 {
        (1 << self.bits()) - 1
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Opcode => "opcode",
            Self::RegisterA => "register A",
            Self::RegisterB => "register B",
            Self::RegisterC => "register C",
            Self::ExtendedOpcode => "extended opcode",
            Self::BranchOptions => "branch options",
            Self::ConditionBit => "condition bit",
            Self::SpecialRegister => "special-purpose register",
        };
        f.write_str(name)
    }
}

/// Encoding contract violations.
///
/// Every variant describes an input that would otherwise have been truncated
/// into a different, valid-looking instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum EncodeError {
    /// A raw field value does not fit its declared width.
    #[error("{field} value {value:#x} does not fit in {bits} bits", bits = .field.bits())]
    FieldOverflow {
        /// Offending field.
        field: Field,
        /// Value that was supplied.
        value: u32,
    },
    /// Branch source and target are not a whole number of words apart.
    #[error("branch offset {offset:#x} is not a multiple of 4")]
    MisalignedDisplacement {
        /// Byte offset `target - from`.
        offset: i32,
    },
    /// Word displacement does not fit the signed displacement field.
    #[error("branch displacement of {words} words does not fit in a signed {bits}-bit field")]
    DisplacementOutOfRange {
        /// Displacement in words.
        words: i32,
        /// Width of the displacement field.
        bits: u32,
    },
    /// Requested displacement field width is outside `1..=32` bits.
    #[error("displacement field width {bits} is outside 1..=32 bits")]
    InvalidDisplacementWidth {
        /// Width that was requested.
        bits: u32,
    },
    /// Immediate cannot be represented once negated or sign-interpreted.
    #[error("immediate {value} is out of range for a signed 16-bit field")]
    ImmediateOutOfRange {
        /// Value that was supplied.
        value: i32,
    },
}
