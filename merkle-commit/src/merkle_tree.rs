use std::fmt;
use std::ops::Deref;

use arbitrary::Arbitrary;
use get_size2::GetSize;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::instrument;
use tracing::trace;

use crate::config;
use crate::digest::Digest;
use crate::error::MerkleTreeError;
use crate::hasher::HashFunction;
use crate::hasher::MerkleHasher;

/// A binary Merkle tree over an ordered, non-empty sequence of items.
///
/// The tree is stored level by level. Level 0 holds the leafs, i.e., the
/// digests of the items in input order. If the number of items is odd and
/// greater than one, the last leaf is duplicated so the leaf level has even
/// length. Every following level hashes pairs `(0, 1), (2, 3), …` of the level
/// below. A level of odd length above the leafs pairs its last node with
/// itself. The last level holds exactly one node, the root.
///
/// ```markdown
///                 root
///               /      \
///        H(a+b)          H(c+c)
///        /    \          /    \
///    H(A)    H(B)    H(C)    H(C)
/// ```
///
/// A tree is immutable once built and can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct MerkleTree<H: MerkleHasher> {
    levels: Vec<Vec<Digest>>,
    num_items: usize,
    hasher: H,
}

/// Where a sibling digest goes when recomputing its parent.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, GetSize, Arbitrary,
)]
pub enum Side {
    /// The sibling is the left child: `parent = H(sibling ++ current)`.
    Left,

    /// The sibling is the right child: `parent = H(current ++ sibling)`.
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// One step of an [`InclusionProof`]: the digest of the sibling of the node
/// being authenticated, and the side that sibling is on.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, GetSize, Arbitrary,
)]
pub struct ProofElement {
    pub digest: Digest,
    pub side: Side,
}

impl ProofElement {
    pub fn new(digest: Digest, side: Side) -> Self {
        Self { digest, side }
    }
}

impl fmt::Display for ProofElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { digest, side } = self;
        write!(f, "ProofElement{{hash={digest}, position={side}}}")
    }
}

/// A membership proof for a single item, listing siblings from the leaf level
/// up to, but excluding, the root.
///
/// The proof is self-describing: the [sides](Side) fully determine the order
/// of concatenation, so a verifier needs neither the tree nor the leaf index,
/// only the claimed item, the proof, and the root.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, GetSize, Arbitrary,
)]
#[serde(transparent)]
pub struct InclusionProof {
    elements: Vec<ProofElement>,
}

impl InclusionProof {
    pub fn new(elements: Vec<ProofElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[ProofElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<ProofElement> {
        self.elements
    }

    /// Replay the proof, starting from the given leaf digest. Returns the root
    /// the proof commits to.
    pub fn root_from_leaf_digest<H: MerkleHasher>(
        &self,
        hasher: &H,
        leaf_digest: Digest,
    ) -> Digest {
        self.elements
            .iter()
            .fold(leaf_digest, |current, element| match element.side {
                Side::Left => hasher.hash_pair(&element.digest, &current),
                Side::Right => hasher.hash_pair(&current, &element.digest),
            })
    }

    pub fn verify_leaf_digest<H: MerkleHasher>(
        &self,
        hasher: &H,
        leaf_digest: Digest,
        root: Digest,
    ) -> bool {
        self.root_from_leaf_digest(hasher, leaf_digest) == root
    }

    /// Verify that `data` is committed to by `root`.
    pub fn verify<H, T>(&self, hasher: &H, data: &T, root: Digest) -> bool
    where
        H: MerkleHasher,
        T: AsRef<[u8]> + ?Sized,
    {
        self.verify_leaf_digest(hasher, hasher.hash(data), root)
    }

    /// The leaf index this proof was generated for, as encoded by its sides: a
    /// node is a right child exactly if its sibling is on the left.
    ///
    /// Returns `None` if the index does not fit a `usize`, which can only
    /// happen for proofs that were not generated by a [`MerkleTree`].
    pub fn implied_leaf_index(&self) -> Option<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.side == Side::Left)
            .try_fold(0_usize, |index, (height, _)| {
                let bit = 1_usize.checked_shl(u32::try_from(height).ok()?)?;
                Some(index | bit)
            })
    }
}

impl Deref for InclusionProof {
    type Target = [ProofElement];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

impl From<Vec<ProofElement>> for InclusionProof {
    fn from(elements: Vec<ProofElement>) -> Self {
        Self::new(elements)
    }
}

impl FromIterator<ProofElement> for InclusionProof {
    fn from_iter<I: IntoIterator<Item = ProofElement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for InclusionProof {
    type Item = ProofElement;
    type IntoIter = std::vec::IntoIter<ProofElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a InclusionProof {
    type Item = &'a ProofElement;
    type IntoIter = std::slice::Iter<'a, ProofElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for InclusionProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.elements.iter().join(", "))
    }
}

impl<H: MerkleHasher + Default> MerkleTree<H> {
    /// Build a Merkle tree over `items` using the default instance of `H`.
    pub fn new<T: AsRef<[u8]> + Sync>(items: &[T]) -> Result<Self, MerkleTreeError> {
        Self::with_hasher(H::default(), items)
    }
}

impl MerkleTree<HashFunction> {
    /// Build a Merkle tree over `items` using the
    /// [configured](config::configured_hash_function) hash function.
    pub fn from_configured_hasher<T: AsRef<[u8]> + Sync>(
        items: &[T],
    ) -> Result<Self, MerkleTreeError> {
        let hasher = config::configured_hash_function()?;
        Self::with_hasher(hasher, items)
    }
}

impl<H: MerkleHasher> MerkleTree<H> {
    /// Build a Merkle tree over `items`, hashing with `hasher`.
    pub fn with_hasher<T: AsRef<[u8]> + Sync>(
        hasher: H,
        items: &[T],
    ) -> Result<Self, MerkleTreeError> {
        if items.is_empty() {
            return Err(MerkleTreeError::EmptyInput);
        }

        let hash_item = |item: &T| hasher.hash(item);
        let leafs: Vec<Digest> = if items.len() >= config::parallelization_cutoff() {
            items.par_iter().map(hash_item).collect()
        } else {
            items.iter().map(hash_item).collect()
        };

        Ok(Self::build(hasher, leafs))
    }

    /// Build a Merkle tree whose leafs are the given, already hashed, digests.
    /// Padding and pairing follow the same rules as for
    /// [`with_hasher`](Self::with_hasher).
    pub fn from_leaf_digests(hasher: H, leaf_digests: &[Digest]) -> Result<Self, MerkleTreeError> {
        if leaf_digests.is_empty() {
            return Err(MerkleTreeError::EmptyInput);
        }

        Ok(Self::build(hasher, leaf_digests.to_vec()))
    }

    fn build(hasher: H, mut leafs: Vec<Digest>) -> Self {
        let num_items = leafs.len();
        if num_items > 1 && num_items % 2 == 1 {
            leafs.push(leafs[num_items - 1]);
        }

        let mut levels = vec![leafs];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let parents = Self::parent_level(&hasher, level);
            levels.push(parents);
        }

        let tree = Self {
            levels,
            num_items,
            hasher,
        };
        debug!(
            num_items,
            num_leafs = tree.num_leafs(),
            height = tree.height(),
            root = %tree.root(),
            "built Merkle tree"
        );

        tree
    }

    fn parent_level(hasher: &H, level: &[Digest]) -> Vec<Digest> {
        let hash_children = |children: &[Digest]| match children {
            [left, right] => hasher.hash_pair(left, right),
            [lone] => hasher.hash_pair(lone, lone),
            _ => unreachable!("children come in chunks of at most two"),
        };

        let parallel = level.len() >= config::parallelization_cutoff();
        trace!(width = level.len(), parallel, "hashing level");
        if parallel {
            level.par_chunks(2).map(hash_children).collect()
        } else {
            level.chunks(2).map(hash_children).collect()
        }
    }

    pub fn root(&self) -> Digest {
        self.levels[self.height()][0]
    }

    /// The number of leafs, including the duplicate that pads an odd number of
    /// items.
    pub fn num_leafs(&self) -> usize {
        self.levels[0].len()
    }

    /// The number of items the tree was built from.
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// The number of levels above the leafs, which is also the length of every
    /// [`InclusionProof`] for this tree.
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn leaf(&self, index: usize) -> Option<Digest> {
        self.levels[0].get(index).copied()
    }

    pub fn leafs(&self) -> &[Digest] {
        &self.levels[0]
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Generate the membership proof for the leaf at `leaf_index`, where
    /// `leaf_index` may also point at the padding leaf.
    ///
    /// ```markdown
    ///              root
    ///             /    \
    /// H(H(a)+H(b))      H(H(c)+H(d))
    ///   /      \        /      \
    /// H(a)    H(b)    H(c)    H(d)
    /// ```
    ///
    /// The proof for `c` (index: 2) is `[(H(d), right), (H(H(a)+H(b)), left)]`,
    /// i.e., a criss-cross of siblings upwards.
    #[instrument(level = "debug", skip(self))]
    pub fn inclusion_proof(&self, leaf_index: usize) -> Result<InclusionProof, MerkleTreeError> {
        let num_leafs = self.num_leafs();
        if leaf_index >= num_leafs {
            return Err(MerkleTreeError::LeafIndexOutOfRange {
                index: leaf_index,
                num_leafs,
            });
        }

        let mut node_index = leaf_index;
        let proof = self.levels[..self.height()]
            .iter()
            .map(|level| {
                // a node without a right sibling is paired with itself
                let sibling = level.get(node_index ^ 1).unwrap_or(&level[node_index]);
                let side = if node_index % 2 == 0 {
                    Side::Right
                } else {
                    Side::Left
                };
                node_index /= 2;
                ProofElement::new(*sibling, side)
            })
            .collect();

        Ok(proof)
    }

    /// Generate one membership proof per requested leaf index. Fails on the
    /// first index that is out of range.
    pub fn inclusion_proofs(
        &self,
        leaf_indices: &[usize],
    ) -> Result<Vec<InclusionProof>, MerkleTreeError> {
        leaf_indices
            .iter()
            .map(|&leaf_index| self.inclusion_proof(leaf_index))
            .collect()
    }

    /// Verify that `data` is committed to by this tree's root.
    pub fn verify_proof<T: AsRef<[u8]> + ?Sized>(&self, data: &T, proof: &InclusionProof) -> bool {
        proof.verify(&self.hasher, data, self.root())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod merkle_tree_test {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;
    use sha2::Sha256;
    use test_strategy::proptest;

    use super::*;
    use crate::digest::digest_tests::DigestCorruptor;
    use crate::hasher::Base64Sha256;

    const TRANSACTIONS: [&str; 4] = [
        "Transaction1",
        "Transaction2",
        "Transaction3",
        "Transaction4",
    ];

    fn digest(hex: &str) -> Digest {
        Digest::try_from_hex(hex).unwrap()
    }

    fn items_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
        vec(vec(any::<u8>(), 0..16), 1..70)
    }

    #[test]
    fn transaction_scenario() {
        let tree = MerkleTree::<Sha256>::new(&TRANSACTIONS).unwrap();
        assert_eq!(
            digest("5b00fef175f7ddb95455a3e2f76eaa3393c5f403c3a368bc986546290cd0a3a7"),
            tree.root()
        );

        let proof = tree.inclusion_proof(2).unwrap();
        let expected_proof = InclusionProof::new(vec![
            ProofElement::new(
                digest("0ccfba6352e95bdfeabb4d8db41fb67a3b48d7f3e8bfcd20d30610b70e1c7054"),
                Side::Right,
            ),
            ProofElement::new(
                digest("015f1f3b5a551399a998257840006062395279531a59b02fa00709f0c981f6f1"),
                Side::Left,
            ),
        ]);
        assert_eq!(expected_proof, proof);

        assert!(tree.verify_proof("Transaction3", &proof));
        assert!(!tree.verify_proof("InvalidTransaction", &proof));
    }

    #[test]
    fn proof_elements_are_siblings_criss_crossing_upwards() {
        //        ___root___
        //       /          \
        //      e            f
        //    /   \        /   \
        //   a     b      c     d
        //  / \   / \    / \   / \
        // 0   1 2   3  4   5 6   7
        let items = (0..8_u8).map(|i| [i]).collect_vec();
        let tree = MerkleTree::<Sha256>::new(&items).unwrap();
        let proof = tree.inclusion_proof(5).unwrap();

        assert_eq!(3, proof.len());
        assert_eq!(ProofElement::new(tree.levels[0][4], Side::Left), proof[0]);
        assert_eq!(ProofElement::new(tree.levels[1][3], Side::Right), proof[1]);
        assert_eq!(ProofElement::new(tree.levels[2][0], Side::Left), proof[2]);
    }

    #[test]
    fn odd_level_above_leafs_pairs_last_node_with_itself() {
        // 5 items → 6 leafs → 3 nodes → 2 nodes → root
        let items = ["a", "b", "c", "d", "e"];
        let tree = MerkleTree::<Sha256>::new(&items).unwrap();
        let widths = tree.levels.iter().map(Vec::len).collect_vec();
        assert_eq!(vec![6, 3, 2, 1], widths);

        let hasher = Sha256::default();
        let lone = tree.levels[1][2];
        assert_eq!(hasher.hash_pair(&lone, &lone), tree.levels[2][1]);

        let proof = tree.inclusion_proof(4).unwrap();
        assert_eq!(ProofElement::new(hasher.hash("e"), Side::Right), proof[0]);
        assert_eq!(ProofElement::new(lone, Side::Right), proof[1]);
        assert_eq!(ProofElement::new(tree.levels[2][0], Side::Left), proof[2]);
        assert!(tree.verify_proof("e", &proof));
    }

    #[test]
    fn odd_number_of_items_is_padded_with_last_item() {
        let three = MerkleTree::<Sha256>::new(&["a", "b", "c"]).unwrap();
        let four = MerkleTree::<Sha256>::new(&["a", "b", "c", "c"]).unwrap();

        assert_eq!(
            digest("d31a37ef6ac14a2db1470c4316beb5592e6afd4465022339adafda76a18ffabe"),
            three.root()
        );
        assert_eq!(four.root(), three.root());
        assert_eq!(3, three.num_items());
        assert_eq!(4, three.num_leafs());
        assert_eq!(three.leaf(2), three.leaf(3));
    }

    #[test]
    fn padding_leaf_has_a_proof() {
        let tree = MerkleTree::<Sha256>::new(&["a", "b", "c"]).unwrap();
        let proof = tree.inclusion_proof(3).unwrap();
        assert_eq!(Some(3), proof.implied_leaf_index());
        assert!(tree.verify_proof("c", &proof));
    }

    #[test]
    fn single_item_tree() {
        let tree = MerkleTree::<Sha256>::new(&["only"]).unwrap();
        assert_eq!(
            digest("f905b19542ed08c9a9c26543cca32e5711d207dcffb81b4cdb44ce0b989431c9"),
            tree.root()
        );
        assert_eq!(1, tree.num_leafs());
        assert_eq!(0, tree.height());

        let proof = tree.inclusion_proof(0).unwrap();
        assert!(proof.is_empty());
        assert_eq!(Some(0), proof.implied_leaf_index());
        assert!(tree.verify_proof("only", &proof));
        assert!(!tree.verify_proof("other", &proof));
    }

    #[test]
    fn empty_input_is_rejected() {
        let no_items: [&str; 0] = [];
        let err = MerkleTree::<Sha256>::new(&no_items).unwrap_err();
        assert_eq!(MerkleTreeError::EmptyInput, err);

        let digests_err = MerkleTree::from_leaf_digests(Sha256::default(), &[]).unwrap_err();
        assert_eq!(MerkleTreeError::EmptyInput, digests_err);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let tree = MerkleTree::<Sha256>::new(&["a", "b", "c"]).unwrap();
        let err = tree.inclusion_proof(4).unwrap_err();
        let expected = MerkleTreeError::LeafIndexOutOfRange {
            index: 4,
            num_leafs: 4,
        };
        assert_eq!(expected, err);

        let batch_err = tree.inclusion_proofs(&[0, 1, 7, 2]).unwrap_err();
        assert!(matches!(
            batch_err,
            MerkleTreeError::LeafIndexOutOfRange { index: 7, .. }
        ));
    }

    #[test]
    fn base64_text_digests_reproduce_text_based_roots() {
        let tree = MerkleTree::<Base64Sha256>::new(&TRANSACTIONS).unwrap();
        assert_eq!(
            "KdhwZlytEkhqAjV/bpJgnPPSYN2gKnCbjwEnOQ9PvxU=",
            tree.root().to_base64()
        );

        let proof = tree.inclusion_proof(2).unwrap();
        assert!(tree.verify_proof("Transaction3", &proof));
        assert!(!tree.verify_proof("InvalidTransaction", &proof));
    }

    #[test]
    fn flipping_side_of_self_paired_sibling_is_harmless() {
        let tree = MerkleTree::<Sha256>::new(&["a", "b", "c"]).unwrap();
        let mut elements = tree.inclusion_proof(2).unwrap().into_elements();
        assert_eq!(tree.leaf(2), Some(elements[0].digest));

        elements[0].side = elements[0].side.opposite();
        assert!(tree.verify_proof("c", &InclusionProof::new(elements)));
    }

    #[test]
    fn proof_element_display() {
        let element = ProofElement::new(Digest::default(), Side::Left);
        let expected = format!("ProofElement{{hash={}, position=left}}", "00".repeat(32));
        assert_eq!(expected, element.to_string());

        let proof = InclusionProof::new(vec![element, element]);
        assert_eq!(format!("[{expected}, {expected}]"), proof.to_string());
    }

    #[test]
    fn parallel_and_sequential_construction_agree() {
        let items = (0..1000_u32).map(u32::to_le_bytes).collect_vec();

        config::set_parallelization_cutoff(usize::MAX);
        let sequential = MerkleTree::<Sha256>::new(&items).unwrap();

        config::set_parallelization_cutoff(2);
        let parallel = MerkleTree::<Sha256>::new(&items).unwrap();

        assert_eq!(sequential.levels, parallel.levels);
    }

    #[test]
    fn tree_from_configured_hasher_uses_configured_hash_function() {
        if std::env::var("MERKLE_COMMIT_HASH_FUNCTION").is_ok() {
            return;
        }
        config::set_hash_function(HashFunction::Sha3_256);
        let tree = MerkleTree::from_configured_hasher(&TRANSACTIONS).unwrap();
        let expected = MerkleTree::<sha3::Sha3_256>::new(&TRANSACTIONS).unwrap();

        assert_eq!(HashFunction::Sha3_256, *tree.hasher());
        assert_eq!(expected.root(), tree.root());
    }

    #[test]
    fn proof_survives_json_and_bincode() {
        let tree = MerkleTree::<Sha256>::new(&TRANSACTIONS).unwrap();
        let proof = tree.inclusion_proof(1).unwrap();

        let json = serde_json::to_string(&proof).unwrap();
        let first_element = &json[..json.find('}').unwrap()];
        assert!(first_element.contains(&tree.leafs()[0].to_hex()));
        assert!(first_element.contains("\"Left\""));

        let from_json: InclusionProof = serde_json::from_str(&json).unwrap();
        assert_eq!(proof, from_json);
        assert!(tree.verify_proof("Transaction2", &from_json));

        let bytes = bincode::serialize(&proof).unwrap();
        let from_bincode: InclusionProof = bincode::deserialize(&bytes).unwrap();
        assert_eq!(proof, from_bincode);
    }

    #[proptest]
    fn construction_is_deterministic(
        #[strategy(items_strategy())] items: Vec<Vec<u8>>,
        #[strategy(arb())] hash_function: HashFunction,
    ) {
        let tree = MerkleTree::with_hasher(hash_function, &items)?;
        let tree_again = MerkleTree::with_hasher(hash_function, &items)?;
        prop_assert_eq!(tree.root(), tree_again.root());
    }

    #[proptest]
    fn tree_from_leaf_digests_agrees_with_tree_from_items(
        #[strategy(items_strategy())] items: Vec<Vec<u8>>,
    ) {
        let hasher = Sha256::default();
        let leaf_digests = items.iter().map(|item| hasher.hash(item)).collect_vec();
        let tree = MerkleTree::with_hasher(hasher.clone(), &items)?;
        let tree_from_digests = MerkleTree::from_leaf_digests(hasher, &leaf_digests)?;
        prop_assert_eq!(tree.root(), tree_from_digests.root());
    }

    #[proptest]
    fn every_leaf_verifies(
        #[strategy(items_strategy())] items: Vec<Vec<u8>>,
        #[strategy(arb())] hash_function: HashFunction,
    ) {
        let tree = MerkleTree::with_hasher(hash_function, &items)?;
        let expected_len = tree.num_leafs().next_power_of_two().ilog2() as usize;

        for (leaf_index, item) in items.iter().enumerate() {
            let proof = tree.inclusion_proof(leaf_index)?;
            prop_assert_eq!(expected_len, proof.len());
            prop_assert_eq!(tree.height(), proof.len());
            prop_assert_eq!(Some(leaf_index), proof.implied_leaf_index());
            prop_assert!(tree.verify_proof(item, &proof));
            prop_assert!(proof.verify(&hash_function, item, tree.root()));
        }
    }

    #[proptest]
    fn tampered_data_does_not_verify(
        #[strategy(items_strategy())] items: Vec<Vec<u8>>,
        #[strategy(0..#items.len())] leaf_index: usize,
        tamper: u8,
    ) {
        let tree = MerkleTree::<Sha256>::new(&items)?;
        let proof = tree.inclusion_proof(leaf_index)?;

        let mut tampered_item = items[leaf_index].clone();
        match tampered_item.first().copied() {
            Some(byte) if byte != tamper => tampered_item[0] = tamper,
            _ => tampered_item.push(tamper),
        }
        prop_assert!(!tree.verify_proof(&tampered_item, &proof));
    }

    #[proptest]
    fn tampered_proof_digest_does_not_verify(
        #[strategy(vec(vec(any::<u8>(), 0..16), 2..70))] items: Vec<Vec<u8>>,
        #[strategy(0..#items.len())] leaf_index: usize,
        element_index: prop::sample::Index,
        corruptor: DigestCorruptor,
    ) {
        let tree = MerkleTree::<Sha256>::new(&items)?;
        let mut elements = tree.inclusion_proof(leaf_index)?.into_elements();

        let element = &mut elements[element_index.index(tree.height())];
        element.digest = corruptor.corrupt_digest(element.digest)?;
        let tampered_proof = InclusionProof::new(elements);
        prop_assert!(!tree.verify_proof(&items[leaf_index], &tampered_proof));
    }

    #[proptest]
    fn flipped_side_does_not_verify(
        #[strategy(vec(vec(any::<u8>(), 0..16), 2..70))] items: Vec<Vec<u8>>,
        #[strategy(0..#items.len())] leaf_index: usize,
        element_index: prop::sample::Index,
    ) {
        let hasher = Sha256::default();
        let tree = MerkleTree::with_hasher(hasher.clone(), &items)?;
        let proof = tree.inclusion_proof(leaf_index)?;
        let flip_index = element_index.index(proof.len());

        // a node paired with itself hashes the same either way round
        let partial_proof = InclusionProof::new(proof[..flip_index].to_vec());
        let current = partial_proof.root_from_leaf_digest(&hasher, hasher.hash(&items[leaf_index]));
        prop_assume!(current != proof[flip_index].digest);

        let mut elements = proof.into_elements();
        elements[flip_index].side = elements[flip_index].side.opposite();
        let tampered_proof = InclusionProof::new(elements);
        prop_assert!(!tree.verify_proof(&items[leaf_index], &tampered_proof));
    }

    #[proptest]
    fn proof_does_not_verify_against_other_root(
        #[strategy(items_strategy())] items: Vec<Vec<u8>>,
        #[strategy(0..#items.len())] leaf_index: usize,
        corruptor: DigestCorruptor,
    ) {
        let tree = MerkleTree::<Sha256>::new(&items)?;
        let proof = tree.inclusion_proof(leaf_index)?;
        let bad_root = corruptor.corrupt_digest(tree.root())?;
        prop_assert!(!proof.verify(tree.hasher(), &items[leaf_index], bad_root));
    }

    #[proptest]
    fn implied_leaf_index_of_overlong_proof_does_not_overflow(
        #[strategy(vec(arb::<ProofElement>(), 65..80))] overlong: Vec<ProofElement>,
    ) {
        let mut elements = overlong;
        let far_index = 70_usize.min(elements.len() - 1);
        elements[far_index].side = Side::Left;
        prop_assert_eq!(None, InclusionProof::new(elements).implied_leaf_index());
    }
}
