//! JSON patch manifests.
//!
//! ```json
//! {
//!   "sets": [
//!     {
//!       "name": "Disable region check",
//!       "patches": [
//!         { "name": "skip bl", "offset": "0x1a2c", "before": "4bfffd8d", "after": "60000000" },
//!         { "before": "38600000 4e800020", "after": "38600001 4e800020" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `offset` is a JSON integer or a `0x`-prefixed hex string; leaving it out
//! makes the patch unanchored. Byte strings are hex with optional whitespace.

use std::path::Path;

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;

use crate::error::ManifestError;
use crate::patch::{Anchor, Patch, PatchSet};

/// A parsed manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Patch sets in application order.
    pub sets: Vec<SetEntry>,
}

/// One patch set as written in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEntry {
    /// Optional set name.
    #[serde(default)]
    pub name: Option<String>,
    /// Patches in application order.
    pub patches: Vec<PatchEntry>,
}

/// One patch as written in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchEntry {
    /// Optional patch name.
    #[serde(default)]
    pub name: Option<String>,
    /// Anchor offset; absent means unanchored.
    #[serde(default, deserialize_with = "offset")]
    pub offset: Option<usize>,
    /// Expected original bytes.
    #[serde(deserialize_with = "hex_bytes")]
    pub before: Vec<u8>,
    /// Replacement bytes.
    #[serde(deserialize_with = "hex_bytes")]
    pub after: Vec<u8>,
}

impl Manifest {
    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for malformed JSON, unknown fields,
    /// bad hex strings or bad offsets.
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file cannot be read, otherwise as
    /// [`Manifest::from_json`].
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Number of patches across all sets.
    #[must_use]
    pub fn patch_count(&self) -> usize {
        self.sets.iter().map(|set| set.patches.len()).sum()
    }

    /// Converts the manifest into patch sets ready for the engine.
    #[must_use]
    pub fn into_patch_sets(self) -> Vec<PatchSet> {
        self.sets.into_iter().map(PatchSet::from).collect()
    }
}

impl From<SetEntry> for PatchSet {
    fn from(entry: SetEntry) -> Self {
        Self {
            name: entry.name,
            patches: entry.patches.into_iter().map(Patch::from).collect(),
        }
    }
}

impl From<PatchEntry> for Patch {
    fn from(entry: PatchEntry) -> Self {
        Self {
            name: entry.name,
            anchor: entry.offset.map_or(Anchor::Anywhere, Anchor::At),
            before: entry.before,
            after: entry.after,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOffset {
    Number(u64),
    Text(String),
}

fn offset<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawOffset>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let value = match raw {
        RawOffset::Number(value) => value,
        RawOffset::Text(text) => {
            let digits = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
                .ok_or_else(|| D::Error::custom(format!("offset {text:?} must start with 0x")))?;
            u64::from_str_radix(&digits.replace('_', ""), 16)
                .map_err(|err| D::Error::custom(format!("invalid offset {text:?}: {err}")))?
        }
    };

    usize::try_from(value)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("offset {value:#x} does not fit in usize")))
}

fn hex_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_hex(&text).map_err(D::Error::custom)
}

/// Decodes a hex string, ignoring whitespace.
pub(crate) fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .map(|byte| match byte {
            b'0'..=b'9' => Ok(byte - b'0'),
            b'a'..=b'f' => Ok(byte - b'a' + 10),
            b'A'..=b'F' => Ok(byte - b'A' + 10),
            other => Err(format!("invalid hex digit {:?}", char::from(other))),
        })
        .collect::<Result<_, _>>()?;

    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {text:?}"));
    }

    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{parse_hex, Manifest};
    use crate::error::ManifestError;
    use crate::patch::{Anchor, Patch, PatchSet};

    const EXAMPLE: &str = r#"{
        "sets": [
            {
                "name": "Disable region check",
                "patches": [
                    { "name": "skip bl", "offset": "0x1a2c", "before": "4bfffd8d", "after": "60000000" },
                    { "before": "4e800020", "after": "38600001" }
                ]
            },
            { "patches": [ { "offset": 0, "before": "00", "after": "ff" } ] }
        ]
    }"#;

    #[test]
    fn example_manifest_converts_to_patch_sets() {
        let manifest = Manifest::from_json(EXAMPLE).expect("example manifest parses");
        assert_eq!(manifest.patch_count(), 3);

        let sets = manifest.into_patch_sets();
        assert_eq!(
            sets[0],
            PatchSet::new("Disable region check")
                .with(
                    Patch::at(0x1A2C, [0x4B, 0xFF, 0xFD, 0x8D], [0x60, 0x00, 0x00, 0x00])
                        .named("skip bl")
                )
                .with(Patch::anywhere(
                    [0x4E, 0x80, 0x00, 0x20],
                    [0x38, 0x60, 0x00, 0x01]
                ))
        );
        assert_eq!(sets[1].name, None);
        assert_eq!(sets[1].patches[0].anchor, Anchor::At(0));
    }

    #[rstest]
    #[case("", &[])]
    #[case("00ff", &[0x00, 0xFF])]
    #[case("4E80 0020", &[0x4E, 0x80, 0x00, 0x20])]
    #[case("60 00\n00 00", &[0x60, 0x00, 0x00, 0x00])]
    fn hex_strings_decode(#[case] text: &str, #[case] expected: &[u8]) {
        assert_eq!(parse_hex(text).as_deref(), Ok(expected));
    }

    #[rstest]
    #[case("abc")]
    #[case("0g")]
    #[case("0x00")]
    fn malformed_hex_is_rejected(#[case] text: &str) {
        assert!(parse_hex(text).is_err());
    }

    #[rstest]
    #[case::bare_hex_offset(r#"{"sets":[{"patches":[{"offset":"1a","before":"00","after":"00"}]}]}"#)]
    #[case::negative_offset(r#"{"sets":[{"patches":[{"offset":-4,"before":"00","after":"00"}]}]}"#)]
    #[case::unknown_field(r#"{"sets":[{"patches":[{"at":4,"before":"00","after":"00"}]}]}"#)]
    #[case::missing_after(r#"{"sets":[{"patches":[{"before":"00"}]}]}"#)]
    #[case::odd_hex(r#"{"sets":[{"patches":[{"before":"000","after":"000"}]}]}"#)]
    fn invalid_manifests_are_parse_errors(#[case] text: &str) {
        assert!(matches!(
            Manifest::from_json(text),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn length_mismatch_is_left_to_the_engine() {
        let manifest =
            Manifest::from_json(r#"{"sets":[{"patches":[{"before":"01","after":"0102"}]}]}"#)
                .expect("lengths are not checked at parse time");
        let patch = &manifest.sets[0].patches[0];
        assert_eq!(patch.before.len(), 1);
        assert_eq!(patch.after.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Manifest::load(std::path::Path::new("/nonexistent/patches.json"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ManifestError::Io { .. }));
        assert!(err.to_string().starts_with("failed to read manifest"));
    }
}
