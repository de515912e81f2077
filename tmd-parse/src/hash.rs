//! Content fingerprints embedded in rendered rows for client-side change detection.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

/// Digest used for content hashes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

/// Hash the UTF-8 bytes of `content` and return the base64 digest without `=` padding.
pub fn content_hash(algorithm: HashAlgorithm, content: &str) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => STANDARD_NO_PAD.encode(Sha256::digest(content.as_bytes())),
        HashAlgorithm::Sha512 => STANDARD_NO_PAD.encode(Sha512::digest(content.as_bytes())),
    }
}
