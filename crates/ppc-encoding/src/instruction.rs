/// Width of every PowerPC instruction in bytes.
pub const INSTRUCTION_BYTES: usize = 4;

/// A single big-endian 32-bit PowerPC instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction([u8; INSTRUCTION_BYTES]);

/// All-zero filler word. Not a real instruction.
pub const PADDING: Instruction = Instruction([0x00; INSTRUCTION_BYTES]);

impl Instruction {
    /// Wraps a 32-bit instruction word.
    #[must_use]
    pub const fn from_word(word: u32) -> Self {
        Self(word.to_be_bytes())
    }

    /// Wraps four big-endian instruction bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; INSTRUCTION_BYTES]) -> Self {
        Self(bytes)
    }

    /// Returns the instruction as a 32-bit word.
    #[must_use]
    pub const fn word(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Returns the big-endian instruction bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; INSTRUCTION_BYTES] {
        self.0
    }
}

impl AsRef<[u8]> for Instruction {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}", self.word())
    }
}

/// An ordered run of instructions.
///
/// PowerPC is fixed width, so [`Instructions::to_bytes`] always yields
/// `4 * len()` bytes in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Instructions(Vec<Instruction>);

impl Instructions {
    /// Creates an empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an instruction.
    pub fn push(&mut self, instruction: Instruction) {
        self.0.push(instruction);
    }

    /// Number of instructions in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the sequence holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the instructions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.0.iter()
    }

    /// Concatenates the instruction words.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|instruction| instruction.to_bytes()).collect()
    }
}

impl From<Vec<Instruction>> for Instructions {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self(instructions)
    }
}

impl<const N: usize> From<[Instruction; N]> for Instructions {
    fn from(instructions: [Instruction; N]) -> Self {
        Self(instructions.to_vec())
    }
}

impl FromIterator<Instruction> for Instructions {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Instructions {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Instruction> for Instructions {
    fn from(instruction: Instruction) -> Self {
        Self(vec![instruction])
    }
}

impl From<Instruction> for Vec<u8> {
    fn from(instruction: Instruction) -> Self {
        instruction.to_bytes().to_vec()
    }
}

impl From<&Instructions> for Vec<u8> {
    fn from(instructions: &Instructions) -> Self {
        instructions.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::{Instruction, Instructions, INSTRUCTION_BYTES, PADDING};

    #[test]
    fn word_and_bytes_are_big_endian() {
        let instruction = Instruction::from_word(0x4E80_0020);
        assert_eq!(instruction.to_bytes(), [0x4E, 0x80, 0x00, 0x20]);
        assert_eq!(Instruction::from_bytes([0x4E, 0x80, 0x00, 0x20]), instruction);
        assert_eq!(instruction.to_string(), "4E800020");
    }

    #[test]
    fn padding_is_all_zero() {
        assert_eq!(PADDING.word(), 0);
    }

    #[test]
    fn empty_sequence_has_no_bytes() {
        let instructions = Instructions::new();
        assert!(instructions.is_empty());
        assert!(instructions.to_bytes().is_empty());
    }

    #[test]
    fn sequence_bytes_preserve_declaration_order() {
        let instructions = Instructions::from([
            Instruction::from_word(0x6000_0000),
            Instruction::from_word(0x4E80_0020),
            PADDING,
        ]);

        let bytes = instructions.to_bytes();
        assert_eq!(bytes.len(), INSTRUCTION_BYTES * instructions.len());
        assert_eq!(
            bytes,
            [
                0x60, 0x00, 0x00, 0x00, 0x4E, 0x80, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn collect_and_push_build_the_same_sequence() {
        let mut pushed = Instructions::new();
        pushed.push(Instruction::from_word(1));
        pushed.push(Instruction::from_word(2));

        let collected: Instructions = (1..=2).map(Instruction::from_word).collect();
        assert_eq!(pushed, collected);
        assert_eq!(Vec::<u8>::from(&collected), collected.to_bytes());
    }
}
