pub use crate::config::configured_hash_function;
pub use crate::digest::Digest;
pub use crate::error::MerkleTreeError;
pub use crate::hasher::Base64Sha256;
pub use crate::hasher::HashFunction;
pub use crate::hasher::MerkleHasher;
pub use crate::merkle_tree::InclusionProof;
pub use crate::merkle_tree::MerkleTree;
pub use crate::merkle_tree::ProofElement;
pub use crate::merkle_tree::Side;
pub use sha2::Sha256;
pub use sha3::Sha3_256;
