use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;

use arbitrary::Arbitrary;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest as _;

use crate::digest::Digest;
use crate::error::MerkleTreeError;

/// A hash function with a fixed-width output, as consumed by the
/// [`MerkleTree`](crate::merkle_tree::MerkleTree).
///
/// Only [`hash_varlen`](MerkleHasher::hash_varlen) must be implemented. The
/// default [`hash_pair`](MerkleHasher::hash_pair) hashes the raw concatenation
/// `left ++ right` without any separator or domain tag.
pub trait MerkleHasher: Clone + Debug + Send + Sync {
    fn hash_varlen(&self, input: &[u8]) -> Digest;

    /// Hash one data item into a leaf digest.
    fn hash<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> Digest {
        self.hash_varlen(item.as_ref())
    }

    fn hash_pair(&self, left: &Digest, right: &Digest) -> Digest {
        self.hash_varlen(&concatenation(left, right))
    }
}

fn concatenation(left: &Digest, right: &Digest) -> [u8; 2 * Digest::BYTES] {
    let mut bytes = [0; 2 * Digest::BYTES];
    bytes[..Digest::BYTES].copy_from_slice(left.as_bytes());
    bytes[Digest::BYTES..].copy_from_slice(right.as_bytes());
    bytes
}

impl MerkleHasher for sha2::Sha256 {
    fn hash_varlen(&self, input: &[u8]) -> Digest {
        Digest::new(sha2::Sha256::digest(input).into())
    }
}

impl MerkleHasher for sha3::Sha3_256 {
    fn hash_varlen(&self, input: &[u8]) -> Digest {
        Digest::new(sha3::Sha3_256::digest(input).into())
    }
}

impl MerkleHasher for blake3::Hasher {
    fn hash_varlen(&self, input: &[u8]) -> Digest {
        Digest::new(blake3::hash(input).into())
    }
}

/// SHA-256 over text-encoded digests.
///
/// Leafs are plain SHA-256 of the item. Internal nodes hash the concatenation
/// of the children's [base64 renderings](Digest::to_base64) instead of their
/// raw bytes, which is how systems that pass digests around as base64 strings
/// build their trees. Roots agree with such systems byte for byte once decoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Base64Sha256;

impl MerkleHasher for Base64Sha256 {
    fn hash_varlen(&self, input: &[u8]) -> Digest {
        sha2::Sha256::default().hash_varlen(input)
    }

    fn hash_pair(&self, left: &Digest, right: &Digest) -> Digest {
        let text = left.to_base64() + &right.to_base64();
        self.hash_varlen(text.as_bytes())
    }
}

/// A hash function chosen at runtime, for example through
/// [configuration](crate::config).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Arbitrary,
)]
pub enum HashFunction {
    #[default]
    Sha256,
    Sha3_256,
    Blake3,
    Base64Sha256,
}

impl HashFunction {
    pub const ALL: [Self; 4] = [
        Self::Sha256,
        Self::Sha3_256,
        Self::Blake3,
        Self::Base64Sha256,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha3_256 => "sha3-256",
            Self::Blake3 => "blake3",
            Self::Base64Sha256 => "base64-sha256",
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashFunction {
    type Err = MerkleTreeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|function| function.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| MerkleTreeError::HashFunctionUnavailable(name.to_string()))
    }
}

impl MerkleHasher for HashFunction {
    fn hash_varlen(&self, input: &[u8]) -> Digest {
        match self {
            Self::Sha256 => sha2::Sha256::default().hash_varlen(input),
            Self::Sha3_256 => sha3::Sha3_256::default().hash_varlen(input),
            Self::Blake3 => blake3::Hasher::default().hash_varlen(input),
            Self::Base64Sha256 => Base64Sha256.hash_varlen(input),
        }
    }

    fn hash_pair(&self, left: &Digest, right: &Digest) -> Digest {
        match self {
            Self::Base64Sha256 => Base64Sha256.hash_pair(left, right),
            _ => self.hash_varlen(&concatenation(left, right)),
        }
    }
}
