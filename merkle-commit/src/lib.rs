//! Binary Merkle trees that commit an ordered sequence of items to a single
//! root [`Digest`](digest::Digest), together with self-describing
//! [inclusion proofs](merkle_tree::InclusionProof) for individual items.
//!
//! ```
//! use merkle_commit::prelude::*;
//!
//! let transactions = ["Transaction1", "Transaction2", "Transaction3", "Transaction4"];
//! let tree = MerkleTree::<Sha256>::new(&transactions)?;
//!
//! let proof = tree.inclusion_proof(2)?;
//! assert!(proof.verify(&Sha256::default(), "Transaction3", tree.root()));
//! assert!(!proof.verify(&Sha256::default(), "InvalidTransaction", tree.root()));
//! # Ok::<(), MerkleTreeError>(())
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![deny(clippy::shadow_unrelated)]
pub mod config;
pub mod digest;
pub mod error;
pub mod hasher;
pub mod merkle_tree;
pub mod prelude;

// re-export crates used in our public API
pub use blake3;
pub use sha2;
pub use sha3;
