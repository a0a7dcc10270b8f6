use thiserror::Error;

use crate::digest::Digest;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum MerkleTreeError {
    #[error("cannot build a Merkle tree from an empty sequence of items")]
    EmptyInput,

    #[error("leaf index {index} is out of range for a tree with {num_leafs} leafs")]
    LeafIndexOutOfRange { index: usize, num_leafs: usize },

    #[error("hash function `{0}` is not available")]
    HashFunctionUnavailable(String),
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum TryFromDigestError {
    #[error("expected {expected} bytes for digest, but got {0}", expected = Digest::BYTES)]
    InvalidLength(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TryFromHexDigestError {
    #[error("hex decoding error")]
    HexDecode(#[from] hex::FromHexError),

    #[error("digest error")]
    Digest(#[from] TryFromDigestError),
}
