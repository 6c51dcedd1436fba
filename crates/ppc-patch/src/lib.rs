//! Verified byte patching for PowerPC executable images.
//!
//! Patches carry the bytes they expect alongside the bytes that replace
//! them, typically built from [`ppc_encoding`] instruction sequences.

use env_logger as _;

/// Patch, patch set and application routines.
pub mod patch;
pub use patch::{
    apply_patch, apply_patch_set, apply_patch_sets, empty_bytes, Anchor, Patch, PatchSet,
};

/// Patch engine and manifest errors.
pub mod error;
pub use error::{ManifestError, PatchError};

/// JSON patch manifests.
pub mod manifest;
pub use manifest::{Manifest, PatchEntry, SetEntry};

#[cfg(test)]
use tempfile as _;
