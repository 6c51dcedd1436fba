//! Declarative byte patches and the routines that apply them.
//!
//! A [`Patch`] names the bytes it expects (`before`) and the bytes that
//! replace them (`after`). Anchored patches are verified in place before
//! anything is written; unanchored patches rewrite every occurrence of
//! `before` in the binary and cannot detect that they targeted the wrong
//! file, so prefer anchors wherever the offset is known.

use log::{debug, info, warn};
use ppc_encoding::{EncodeError, Instruction};

use crate::error::PatchError;

/// Where a patch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    /// Verify and replace `before` at this absolute byte offset.
    At(usize),
    /// Replace every non-overlapping occurrence of `before`, left to right.
    #[default]
    Anywhere,
}

/// A single edit to a binary image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Patch {
    /// Optional name, logged when the patch is applied.
    pub name: Option<String>,
    /// Where the patch applies.
    pub anchor: Anchor,
    /// Bytes expected in the original binary.
    pub before: Vec<u8>,
    /// Replacement bytes; must be as long as `before`.
    pub after: Vec<u8>,
}

impl Patch {
    /// Creates a patch verified and applied at `offset`.
    #[must_use]
    pub fn at(offset: usize, before: impl Into<Vec<u8>>, after: impl Into<Vec<u8>>) -> Self {
        Self {
            name: None,
            anchor: Anchor::At(offset),
            before: before.into(),
            after: after.into(),
        }
    }

    /// Creates a patch applied to every occurrence of `before`.
    #[must_use]
    pub fn anywhere(before: impl Into<Vec<u8>>, after: impl Into<Vec<u8>>) -> Self {
        Self {
            name: None,
            anchor: Anchor::Anywhere,
            before: before.into(),
            after: after.into(),
        }
    }

    /// Replaces the instruction `before` at file `offset` with a relative
    /// branch to `target`.
    ///
    /// `address` is where the instruction sits once the image is loaded; the
    /// branch displacement is computed from it, not from the file offset.
    /// With `link` set this emits `bl`, redirecting a call.
    ///
    /// # Errors
    ///
    /// Returns the [`EncodeError`] if `target` is not reachable from
    /// `address` with a single `b`/`bl`.
    pub fn branch(
        offset: usize,
        address: u32,
        before: Instruction,
        target: u32,
        link: bool,
    ) -> Result<Self, EncodeError> {
        let branch = if link {
            ppc_encoding::bl(address, target)?
        } else {
            ppc_encoding::b(address, target)?
        };
        Ok(Self::at(offset, before, branch))
    }

    /// Attaches a display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A named, ordered group of related patches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PatchSet {
    /// Optional name, logged before the set is applied.
    pub name: Option<String>,
    /// Patches in application order.
    pub patches: Vec<Patch>,
}

impl PatchSet {
    /// Creates an empty named set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            patches: Vec::new(),
        }
    }

    /// Appends a patch.
    #[must_use]
    pub fn with(mut self, patch: Patch) -> Self {
        self.patches.push(patch);
        self
    }
}

impl FromIterator<Patch> for PatchSet {
    fn from_iter<I: IntoIterator<Item = Patch>>(iter: I) -> Self {
        Self {
            name: None,
            patches: iter.into_iter().collect(),
        }
    }
}

/// Returns `len` zero bytes, for patches whose original content is empty space.
#[must_use]
pub fn empty_bytes(len: usize) -> Vec<u8> {
    vec![0x00; len]
}

/// Applies one patch to `binary` in place.
///
/// Returns the number of locations rewritten: always 1 for an anchored
/// patch, and the occurrence count (possibly 0) for an unanchored one.
///
/// # Errors
///
/// - [`PatchError::InconsistentLength`] if `before` and `after` differ in length.
/// - [`PatchError::OutOfRange`] if the anchored range does not fit in `binary`.
/// - [`PatchError::InvalidPatch`] if the anchored bytes differ from `before`.
///
/// `binary` is untouched whenever an error is returned.
pub fn apply_patch(patch: &Patch, binary: &mut [u8]) -> Result<usize, PatchError> {
    if let Some(name) = &patch.name {
        info!(" + Applying patch {name}");
    }

    if patch.before.len() != patch.after.len() {
        return Err(PatchError::InconsistentLength {
            before: patch.before.len(),
            after: patch.after.len(),
        });
    }

    match patch.anchor {
        Anchor::At(offset) => {
            apply_at(offset, &patch.before, &patch.after, binary)?;
            debug!("patched {} bytes at {offset:#x}", patch.after.len());
            Ok(1)
        }
        Anchor::Anywhere => {
            let occurrences = replace_all(binary, &patch.before, &patch.after);
            if occurrences == 0 {
                warn!("unanchored patch matched nothing");
            } else {
                debug!("replaced {occurrences} occurrence(s)");
            }
            Ok(occurrences)
        }
    }
}

/// Applies every patch of `set` in order, stopping at the first failure.
///
/// Returns the total number of locations rewritten.
///
/// # Errors
///
/// Returns the first [`PatchError`] unchanged. Patches before the failing
/// one remain applied to `binary`.
pub fn apply_patch_set(set: &PatchSet, binary: &mut [u8]) -> Result<usize, PatchError> {
    if let Some(name) = &set.name {
        info!("Handling patch set \"{name}\":");
    }

    set.patches
        .iter()
        .try_fold(0, |total, patch| Ok(total + apply_patch(patch, binary)?))
}

/// Applies each set in order, stopping at the first failing set.
///
/// # Errors
///
/// Returns the first [`PatchError`] unchanged; earlier sets and patches stay
/// applied.
pub fn apply_patch_sets(sets: &[PatchSet], binary: &mut [u8]) -> Result<usize, PatchError> {
    sets.iter()
        .try_fold(0, |total, set| Ok(total + apply_patch_set(set, binary)?))
}

fn apply_at(
    offset: usize,
    before: &[u8],
    after: &[u8],
    binary: &mut [u8],
) -> Result<(), PatchError> {
    let range = offset
        .checked_add(before.len())
        .filter(|end| *end <= binary.len())
        .map(|end| offset..end)
        .ok_or(PatchError::OutOfRange {
            offset,
            len: before.len(),
            binary_len: binary.len(),
        })?;

    let target = &mut binary[range];
    if target != before {
        return Err(PatchError::InvalidPatch { offset });
    }
    target.copy_from_slice(after);
    Ok(())
}

/// Replaces non-overlapping occurrences of `before` with the equally long
/// `after`, scanning left to right. Returns the number of replacements.
fn replace_all(binary: &mut [u8], before: &[u8], after: &[u8]) -> usize {
    let width = before.len();
    if width == 0 || width > binary.len() {
        return 0;
    }

    let mut occurrences = 0;
    let mut cursor = 0;
    while cursor + width <= binary.len() {
        let window = &mut binary[cursor..cursor + width];
        if window == before {
            window.copy_from_slice(after);
            occurrences += 1;
            cursor += width;
        } else {
            cursor += 1;
        }
    }
    occurrences
}
