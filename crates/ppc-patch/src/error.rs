use std::path::PathBuf;

use thiserror::Error;

/// Reasons a single patch could not be applied.
///
/// All checks run before the patch writes anything, so a failing patch never
/// leaves a partial edit behind. Patches applied earlier in the same set are
/// not rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum PatchError {
    /// `before` and `after` differ in length.
    #[error("before ({before} bytes) and after ({after} bytes) data are not the same size")]
    InconsistentLength {
        /// Length of the expected original bytes.
        before: usize,
        /// Length of the replacement bytes.
        after: usize,
    },
    /// The anchored range extends past the end of the binary.
    #[error("patch of {len} bytes at offset {offset:#x} lies past binary size {binary_len:#x}")]
    OutOfRange {
        /// Anchor offset.
        offset: usize,
        /// Patch length in bytes.
        len: usize,
        /// Length of the binary being patched.
        binary_len: usize,
    },
    /// The binary does not contain the expected `before` bytes at the anchor.
    #[error("before data did not match binary contents at offset {offset:#x}")]
    InvalidPatch {
        /// Anchor offset.
        offset: usize,
    },
}

/// Failures while loading a patch manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid JSON or does not match the manifest schema.
    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::PatchError;

    #[test]
    fn messages_include_offsets_in_hex() {
        let err = PatchError::OutOfRange {
            offset: 0x100,
            len: 4,
            binary_len: 0x80,
        };
        assert_eq!(
            err.to_string(),
            "patch of 4 bytes at offset 0x100 lies past binary size 0x80"
        );
        assert_eq!(
            PatchError::InvalidPatch { offset: 0x1A2C }.to_string(),
            "before data did not match binary contents at offset 0x1a2c"
        );
    }

    #[test]
    fn inconsistent_length_reports_both_sides() {
        let err = PatchError::InconsistentLength {
            before: 1,
            after: 2,
        };
        assert_eq!(
            err.to_string(),
            "before (1 bytes) and after (2 bytes) data are not the same size"
        );
    }
}
