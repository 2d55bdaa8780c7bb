//! Hash algorithm selection and incremental hash state.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2b512, Digest};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

/// BLAKE2b truncated to a 256-bit output (parameterised digest length, not a prefix).
type Blake2b256 = Blake2b<U32>;

/// Checksum algorithm used for every file in a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    /// BLAKE2b with a 512-bit digest.
    #[default]
    Blake2b,
    /// BLAKE2b with a 256-bit digest.
    #[serde(rename = "blake2b-256")]
    Blake2b256,
    /// SHA-256, for matching published SHA256SUMS files.
    Sha256,
}

impl HashAlgorithm {
    /// Label printed in report lines.
    pub fn label(self) -> &'static str {
        match self {
            HashAlgorithm::Blake2b => "BLAKE2b",
            HashAlgorithm::Blake2b256 => "BLAKE2b-256",
            HashAlgorithm::Sha256 => "SHA256",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Blake2b => 64,
            HashAlgorithm::Blake2b256 | HashAlgorithm::Sha256 => 32,
        }
    }

    fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Blake2b => "blake2b",
            HashAlgorithm::Blake2b256 => "blake2b-256",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown algorithm '{}' (expected blake2b, blake2b-256 or sha256)",
            self.0
        )
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake2b" | "blake2b-512" | "blake2b512" => Ok(HashAlgorithm::Blake2b),
            "blake2b-256" | "blake2b256" => Ok(HashAlgorithm::Blake2b256),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Running hash state for one file. Not shared between threads; chunks are
/// folded in strictly in read order.
pub enum HashState {
    Blake2b(Blake2b512),
    Blake2b256(Blake2b256),
    Sha256(Sha256),
}

impl HashState {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake2b => HashState::Blake2b(Blake2b512::new()),
            HashAlgorithm::Blake2b256 => HashState::Blake2b256(Blake2b256::new()),
            HashAlgorithm::Sha256 => HashState::Sha256(Sha256::new()),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            HashState::Blake2b(h) => h.update(chunk),
            HashState::Blake2b256(h) => h.update(chunk),
            HashState::Sha256(h) => h.update(chunk),
        }
    }

    /// Consume the state and return the digest as lowercase hex.
    pub fn finalize_hex(self) -> String {
        match self {
            HashState::Blake2b(h) => hex::encode(h.finalize()),
            HashState::Blake2b256(h) => hex::encode(h.finalize()),
            HashState::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(algorithm: HashAlgorithm, data: &[u8]) -> String {
        let mut state = HashState::new(algorithm);
        state.update(data);
        state.finalize_hex()
    }

    #[test]
    fn blake2b_empty_input() {
        assert_eq!(
            digest_of(HashAlgorithm::Blake2b, b""),
            "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419\
             d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce"
        );
    }

    #[test]
    fn blake2b_rfc7693_abc() {
        assert_eq!(
            digest_of(HashAlgorithm::Blake2b, b"abc"),
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
             7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
        );
    }

    #[test]
    fn blake2b_256_empty_input() {
        assert_eq!(
            digest_of(HashAlgorithm::Blake2b256, b""),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn sha256_known_content() {
        assert_eq!(
            digest_of(HashAlgorithm::Sha256, b"hello\n"),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn split_updates_match_single_update() {
        let data: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        let mut state = HashState::new(HashAlgorithm::Blake2b);
        for chunk in data.chunks(333) {
            state.update(chunk);
        }
        assert_eq!(state.finalize_hex(), digest_of(HashAlgorithm::Blake2b, &data));
    }

    #[test]
    fn hex_length_matches_output_len() {
        for algo in [
            HashAlgorithm::Blake2b,
            HashAlgorithm::Blake2b256,
            HashAlgorithm::Sha256,
        ] {
            assert_eq!(digest_of(algo, b"x").len(), algo.output_len() * 2);
        }
    }

    #[test]
    fn default_is_full_length_blake2b() {
        let algo = HashAlgorithm::default();
        assert_eq!(algo, HashAlgorithm::Blake2b);
        assert_eq!(algo.label(), "BLAKE2b");
        assert_eq!(algo.output_len(), 64);
    }

    #[test]
    fn parse_names_case_insensitive() {
        assert_eq!("BLAKE2b".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Blake2b));
        assert_eq!(
            "blake2b-256".parse::<HashAlgorithm>(),
            Ok(HashAlgorithm::Blake2b256)
        );
        assert_eq!("Sha256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
