//! This module contains various configuration options. The parallelization
//! cutoff impacts performance only; the hash function determines which
//! hasher [`MerkleTree::from_configured_hasher`] uses and therefore the roots
//! it produces.
//!
//! Each configuration option can also be set via an environment variable. The
//! environment variables take precedence over the options set in this module.
//!
//! [`MerkleTree::from_configured_hasher`]: crate::merkle_tree::MerkleTree::from_configured_hasher

use std::cell::RefCell;

use arbitrary::Arbitrary;
use tracing::debug;

use crate::error::MerkleTreeError;
use crate::hasher::HashFunction;

thread_local! {
    static CONFIG: RefCell<Config> = RefCell::new(Config::new());
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
struct Config {
    pub parallelization_cutoff: ParallelizationCutoff,
    pub hash_function: Option<HashFunction>,
}

impl Config {
    fn new() -> Self {
        Self {
            parallelization_cutoff: ParallelizationCutoff::new(None),
            hash_function: None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
struct ParallelizationCutoff(usize);

impl ParallelizationCutoff {
    const ENV_VAR: &'static str = "MERKLE_COMMIT_PARALLELIZATION_CUTOFF";
    const DEFAULT: usize = 512;
    const MINIMUM: usize = 2;

    /// Creates a new `ParallelizationCutoff` with the given value. Respects the
    /// precedence of the environment variable if set. Uses the default if no
    /// value is provided.
    fn new(config_value: Option<usize>) -> Self {
        let cutoff = std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .or(config_value)
            .unwrap_or(Self::DEFAULT)
            .max(Self::MINIMUM);

        Self(cutoff)
    }
}

const HASH_FUNCTION_ENV_VAR: &str = "MERKLE_COMMIT_HASH_FUNCTION";

/// Sets the cutoff for parallelizing Merkle tree construction.
///
/// For example, if the cutoff is set to 512, then every level of a Merkle tree
/// with 512 or more nodes is hashed in parallel, and every narrower level is
/// hashed sequentially. The resulting tree is identical either way.
///
/// Can also be set via the environment variable
/// `MERKLE_COMMIT_PARALLELIZATION_CUTOFF`. The environment variable has higher
/// precedence than this function.
///
/// The default is 512. The minimum is always 2.
pub fn set_parallelization_cutoff(cutoff: usize) {
    let cutoff = ParallelizationCutoff::new(Some(cutoff));
    CONFIG.with(|c| c.borrow_mut().parallelization_cutoff = cutoff);
}

pub(crate) fn parallelization_cutoff() -> usize {
    CONFIG.with(|c| c.borrow().parallelization_cutoff).0
}

/// Sets the hash function used by
/// [`MerkleTree::from_configured_hasher`](crate::merkle_tree::MerkleTree::from_configured_hasher).
///
/// Can also be set via the environment variable `MERKLE_COMMIT_HASH_FUNCTION`,
/// holding one of the [names](HashFunction::name) of the supported hash
/// functions. The environment variable has higher precedence than this
/// function.
///
/// The default is [`HashFunction::Sha256`].
pub fn set_hash_function(hash_function: HashFunction) {
    CONFIG.with(|c| c.borrow_mut().hash_function = Some(hash_function));
}

/// The currently configured hash function.
///
/// Unlike the performance options, a hash function named in the environment
/// that is not supported is not silently replaced by the default: it would
/// change every root computed from then on. Such a name results in
/// [`MerkleTreeError::HashFunctionUnavailable`].
pub fn configured_hash_function() -> Result<HashFunction, MerkleTreeError> {
    let hash_function = match std::env::var(HASH_FUNCTION_ENV_VAR) {
        Ok(name) => name.parse()?,
        Err(_) => CONFIG
            .with(|c| c.borrow().hash_function)
            .unwrap_or_default(),
    };
    debug!(%hash_function, "resolved configured hash function");

    Ok(hash_function)
}
