//! Verification manifest and digests.
//!
//! Two digests cover the same serialized bytes: the keyed one authenticates
//! that this installation produced the file, the plain one supports
//! inspection without the installation secret. The manifest additionally
//! pins the byte size and the per-index cardinalities so truncation is
//! caught without re-hashing, and index-level tampering is caught even if
//! an attacker recomputes both digests.

use std::collections::BTreeMap;
use std::path::Path;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Keyed digest (HMAC-SHA256) over the serialized cache, hex-encoded.
pub fn keyed_digest(key: &[u8], bytes: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(bytes);
    hex::encode(mac.finalize().into_bytes())
}

/// Unkeyed content digest (SHA-256), hex-encoded.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// The small sidecar document validated before the data file is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationManifest {
    #[serde(rename = "expectLengths")]
    pub expect_lengths: BTreeMap<String, usize>,
    pub checksum: String,
    pub shasum: String,
    pub size: u64,
}

impl VerificationManifest {
    /// Build a manifest describing `bytes` as serialized under `key`.
    pub fn describe(expect_lengths: BTreeMap<String, usize>, key: &[u8], bytes: &[u8]) -> Self {
        Self {
            expect_lengths,
            checksum: keyed_digest(key, bytes),
            shasum: content_digest(bytes),
            size: bytes.len() as u64,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_digests_differ_by_key() {
        let bytes = b"cache bytes";
        let a = keyed_digest(b"install-a", bytes);
        let b = keyed_digest(b"install-b", bytes);
        assert_ne!(a, b, "different installations must not cross-verify");
        assert_eq!(a, keyed_digest(b"install-a", bytes));
    }

    #[test]
    fn test_content_digest_known_answer() {
        // SHA-256 of the empty string
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_keyed_and_content_digests_disagree() {
        let bytes = b"payload";
        assert_ne!(keyed_digest(b"key", bytes), content_digest(bytes));
    }

    #[test]
    fn test_describe_and_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".cache.json");

        let bytes = br#"{"all":{},"uniq":{},"fromId":{},"items":{},"__dirty":false}"#;
        let counts = BTreeMap::from([
            ("all".to_string(), 0),
            ("uniq".to_string(), 0),
            ("fromId".to_string(), 0),
            ("items".to_string(), 0),
        ]);

        let manifest = VerificationManifest::describe(counts, b"secret", bytes);
        assert_eq!(manifest.size, bytes.len() as u64);

        manifest.save(&path).unwrap();
        let loaded = VerificationManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);

        // Wire names match the original sidecar document
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("expectLengths"));
        assert!(raw.contains("checksum"));
        assert!(raw.contains("shasum"));
    }
}
