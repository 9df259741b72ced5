//! # Proof Aggregation
//!
//! Collapses many leaf proofs into one by repeated `merge`. The shape of
//! the reduction is an explicit [`ProofTree`]: leaves are prover inputs,
//! internal nodes are merges. Because merge is associative and commutative,
//! every shape over the same leaves produces the same public output.
//!
//! The [`Aggregator`] evaluates a tree bottom-up on a bounded `rayon` pool,
//! running the two subtrees of each node with `rayon::join`. A balanced tree
//! therefore finishes in `O(log n)` sequential merge steps.
//!
//! ## Cancellation
//!
//! Each `create` and `merge` is atomic. The [`CancellationFlag`] is checked
//! before every step; once it is set, no new step starts and the reduction
//! returns [`RedactionError::Cancelled`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use redact_core::FieldElement;

use crate::circuits::map::{RedactedMap, RedactionProof};
use crate::circuits::tree::{RedactedTree, TreeRedactionProof};
use crate::config::ProverConfig;
use crate::disclosure::{DisclosureItem, TreeDisclosureItem};
use crate::error::RedactionError;

/// Deepest shape [`Aggregator`] evaluates. Each level is one nested
/// `rayon::join` frame on a worker stack.
pub const MAX_REDUCTION_DEPTH: usize = 1024;

/// Reduction shape over leaves of type `L`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofTree<L> {
    Leaf(L),
    Node(Box<ProofTree<L>>, Box<ProofTree<L>>),
}

impl<L> ProofTree<L> {
    /// Balanced binary shape, preserving leaf order.
    pub fn balanced(leaves: Vec<L>) -> Result<Self, RedactionError> {
        if leaves.is_empty() {
            return Err(RedactionError::EmptyAggregation);
        }
        Ok(Self::balanced_nonempty(leaves))
    }

    fn balanced_nonempty(mut leaves: Vec<L>) -> Self {
        if leaves.len() == 1 {
            if let Some(leaf) = leaves.pop() {
                return ProofTree::Leaf(leaf);
            }
        }
        let right = leaves.split_off(leaves.len() / 2);
        ProofTree::Node(
            Box::new(Self::balanced_nonempty(leaves)),
            Box::new(Self::balanced_nonempty(right)),
        )
    }

    /// Left-leaning fold `((l1 + l2) + l3) + ...`.
    ///
    /// The shape is as deep as it is long. [`Aggregator`] refuses shapes
    /// deeper than [`MAX_REDUCTION_DEPTH`], and dropping a very long chain
    /// recurses once per level, so keep this to equivalence checks on
    /// modest inputs and use [`balanced`](Self::balanced) for real work.
    pub fn left_fold(leaves: Vec<L>) -> Result<Self, RedactionError> {
        let mut iter = leaves.into_iter();
        let first = iter.next().ok_or(RedactionError::EmptyAggregation)?;
        Ok(iter.fold(ProofTree::Leaf(first), |acc, leaf| {
            ProofTree::Node(Box::new(acc), Box::new(ProofTree::Leaf(leaf)))
        }))
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&L> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                ProofTree::Leaf(leaf) => out.push(leaf),
                ProofTree::Node(l, r) => {
                    stack.push(&**r);
                    stack.push(&**l);
                }
            }
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                ProofTree::Leaf(_) => count += 1,
                ProofTree::Node(l, r) => {
                    stack.push(&**l);
                    stack.push(&**r);
                }
            }
        }
        count
    }

    /// Number of sequential merge steps on the longest path.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, d)) = stack.pop() {
            match node {
                ProofTree::Leaf(_) => max = max.max(d),
                ProofTree::Node(l, r) => {
                    stack.push((&**l, d + 1));
                    stack.push((&**r, d + 1));
                }
            }
        }
        max
    }
}

/// An engine that can prove leaves and merge proofs.
pub trait Aggregate: Sync {
    type Leaf: Sync;
    type Proof: Send;

    /// Key or index the leaf discloses. Leaves of one aggregate must not
    /// share a position.
    fn leaf_position(&self, leaf: &Self::Leaf) -> FieldElement;

    fn prove_leaf(&self, leaf: &Self::Leaf) -> Result<Self::Proof, RedactionError>;

    fn merge_proofs(
        &self,
        left: &Self::Proof,
        right: &Self::Proof,
    ) -> Result<Self::Proof, RedactionError>;
}

impl Aggregate for RedactedMap {
    type Leaf = DisclosureItem;
    type Proof = RedactionProof;

    fn leaf_position(&self, leaf: &DisclosureItem) -> FieldElement {
        leaf.element.key
    }

    fn prove_leaf(&self, leaf: &DisclosureItem) -> Result<RedactionProof, RedactionError> {
        self.create(&leaf.element, &leaf.original_witness, &leaf.redacted_witness)
    }

    fn merge_proofs(
        &self,
        left: &RedactionProof,
        right: &RedactionProof,
    ) -> Result<RedactionProof, RedactionError> {
        self.merge(left, right)
    }
}

impl Aggregate for RedactedTree {
    type Leaf = TreeDisclosureItem;
    type Proof = TreeRedactionProof;

    fn leaf_position(&self, leaf: &TreeDisclosureItem) -> FieldElement {
        FieldElement::from_u64(leaf.element.index)
    }

    fn prove_leaf(&self, leaf: &TreeDisclosureItem) -> Result<TreeRedactionProof, RedactionError> {
        self.create(&leaf.element, &leaf.original_witness, &leaf.redacted_witness)
    }

    fn merge_proofs(
        &self,
        left: &TreeRedactionProof,
        right: &TreeRedactionProof,
    ) -> Result<TreeRedactionProof, RedactionError> {
        self.merge(left, right)
    }
}

/// Shared cancellation switch, checked between steps.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RedactionError> {
        if self.is_cancelled() {
            return Err(RedactionError::Cancelled);
        }
        Ok(())
    }
}

/// Parallel evaluator for [`ProofTree`]s.
pub struct Aggregator {
    pool: rayon::ThreadPool,
    workers: usize,
    cancel: CancellationFlag,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("workers", &self.workers)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Aggregator {
    /// Build a pool of `config.workers` threads.
    pub fn new(config: &ProverConfig) -> Result<Self, RedactionError> {
        let workers = config.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("redact-prover-{i}"))
            .build()
            .map_err(|e| RedactionError::WorkerPool(e.to_string()))?;
        Ok(Self {
            pool,
            workers,
            cancel: CancellationFlag::new(),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Handle for cancelling in-flight and future reductions.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Evaluate `tree` with `engine`.
    ///
    /// The shape is checked before any step runs: it must be at most
    /// [`MAX_REDUCTION_DEPTH`] deep, and no two leaves may disclose the same
    /// position, since `merge` alone cannot tell a repeated leaf from a new
    /// one.
    pub fn aggregate<A: Aggregate>(
        &self,
        engine: &A,
        tree: &ProofTree<A::Leaf>,
    ) -> Result<A::Proof, RedactionError> {
        let depth = tree.depth();
        if depth > MAX_REDUCTION_DEPTH {
            return Err(RedactionError::ReductionTooDeep {
                depth,
                max: MAX_REDUCTION_DEPTH,
            });
        }
        let leaves = tree.leaves();
        let mut seen = HashSet::with_capacity(leaves.len());
        for leaf in &leaves {
            let position = engine.leaf_position(leaf);
            if !seen.insert(position) {
                return Err(RedactionError::DuplicateLeaf { position });
            }
        }

        info!(
            leaves = leaves.len(),
            depth,
            workers = self.workers,
            "aggregating proofs"
        );
        let cancel = &self.cancel;
        self.pool.install(|| reduce(engine, tree, cancel))
    }

    pub fn aggregate_map(
        &self,
        engine: &RedactedMap,
        tree: &ProofTree<DisclosureItem>,
    ) -> Result<RedactionProof, RedactionError> {
        self.aggregate(engine, tree)
    }

    pub fn aggregate_tree(
        &self,
        engine: &RedactedTree,
        tree: &ProofTree<TreeDisclosureItem>,
    ) -> Result<TreeRedactionProof, RedactionError> {
        self.aggregate(engine, tree)
    }
}

fn reduce<A: Aggregate>(
    engine: &A,
    tree: &ProofTree<A::Leaf>,
    cancel: &CancellationFlag,
) -> Result<A::Proof, RedactionError> {
    cancel.check()?;
    match tree {
        ProofTree::Leaf(leaf) => engine.prove_leaf(leaf),
        ProofTree::Node(left, right) => {
            let (l, r) = rayon::join(
                || reduce(engine, left, cancel),
                || reduce(engine, right, cancel),
            );
            let (l, r) = (l?, r?);
            cancel.check()?;
            let merged = engine.merge_proofs(&l, &r);
            if merged.is_err() {
                debug!("merge step rejected");
            }
            merged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::map::RedactedState;
    use crate::disclosure::{Disclosure, TreeDisclosure};
    use crate::record::Record;
    use crate::registry::CircuitRegistry;
    use redact_core::Metadata;
    use redact_crypto::{hash_text, TreeHeight};

    /// Adds leaf values; enough to exercise the shape checks.
    struct Summing;

    impl Aggregate for Summing {
        type Leaf = u64;
        type Proof = u64;

        fn leaf_position(&self, leaf: &u64) -> FieldElement {
            FieldElement::from_u64(*leaf)
        }

        fn prove_leaf(&self, leaf: &u64) -> Result<u64, RedactionError> {
            Ok(*leaf)
        }

        fn merge_proofs(&self, left: &u64, right: &u64) -> Result<u64, RedactionError> {
            Ok(left + right)
        }
    }

    fn config() -> ProverConfig {
        let mut c = ProverConfig::development(&[6]).unwrap();
        c.workers = 4;
        c
    }

    fn record(n: usize) -> Record {
        (0..n).fold(Record::new(), |r, i| r.with(&format!("attr{i}"), i as u64))
    }

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("attr{i}")).collect()
    }

    #[test]
    fn shapes() {
        let balanced = ProofTree::balanced((0..8).collect::<Vec<_>>()).unwrap();
        assert_eq!(balanced.leaf_count(), 8);
        assert_eq!(balanced.depth(), 3);
        let fold = ProofTree::left_fold((0..8).collect::<Vec<_>>()).unwrap();
        assert_eq!(fold.leaf_count(), 8);
        assert_eq!(fold.depth(), 7);
        assert_eq!(ProofTree::balanced(vec![1]).unwrap(), ProofTree::Leaf(1));
        assert_eq!(ProofTree::balanced(vec![1, 2, 3]).unwrap().leaf_count(), 3);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            ProofTree::<u8>::balanced(vec![]),
            Err(RedactionError::EmptyAggregation)
        ));
        assert!(matches!(
            ProofTree::<u8>::left_fold(vec![]),
            Err(RedactionError::EmptyAggregation)
        ));
    }

    #[test]
    fn balanced_and_left_fold_agree() {
        let registry = CircuitRegistry::init(&config()).unwrap();
        let engine = RedactedMap::new(registry);
        let aggregator = Aggregator::new(&config()).unwrap();
        let disclosure = Disclosure::build(&record(7), &names(7)).unwrap();

        let balanced = ProofTree::balanced(disclosure.items().to_vec()).unwrap();
        let folded = ProofTree::left_fold(disclosure.items().to_vec()).unwrap();
        let a = aggregator.aggregate_map(&engine, &balanced).unwrap();
        let b = aggregator.aggregate_map(&engine, &folded).unwrap();

        assert_eq!(a.public_output, b.public_output);
        assert_eq!(a.public_output.count, FieldElement::from_u64(7));
        assert_eq!(a.public_output.original_root, record(7).root());
        engine.verify(&a).unwrap();
    }

    #[test]
    fn aggregate_matches_sequential_state_merge() {
        let disclosure = Disclosure::build(&record(5), &names(5)).unwrap();
        let expected = disclosure
            .items()
            .iter()
            .map(|i| RedactedState::create(&i.element, &i.original_witness, &i.redacted_witness).unwrap())
            .reduce(|a, b| a.merge(&b).unwrap())
            .unwrap();

        let registry = CircuitRegistry::init(&config()).unwrap();
        let engine = RedactedMap::new(registry);
        let tree = ProofTree::balanced(disclosure.into_items()).unwrap();
        let proof = Aggregator::new(&config())
            .unwrap()
            .aggregate(&engine, &tree)
            .unwrap();
        assert_eq!(proof.public_output, expected);
    }

    #[test]
    fn failing_leaf_fails_the_aggregate() {
        let registry = CircuitRegistry::init(&config()).unwrap();
        let engine = RedactedMap::new(registry);
        let mut items = Disclosure::build(&record(4), &names(4)).unwrap().into_items();
        items[2].element.value = Metadata::new(hash_text("forged"), hash_text("string"));
        let tree = ProofTree::balanced(items).unwrap();
        let err = Aggregator::new(&config())
            .unwrap()
            .aggregate_map(&engine, &tree)
            .unwrap_err();
        assert!(matches!(err, RedactionError::WitnessMismatch { .. }));
    }

    #[test]
    fn cancelled_aggregator_stops() {
        let registry = CircuitRegistry::init(&config()).unwrap();
        let engine = RedactedMap::new(registry);
        let aggregator = Aggregator::new(&config()).unwrap();
        aggregator.cancellation().cancel();
        let tree = ProofTree::balanced(
            Disclosure::build(&record(3), &names(3)).unwrap().into_items(),
        )
        .unwrap();
        assert!(matches!(
            aggregator.aggregate_map(&engine, &tree),
            Err(RedactionError::Cancelled)
        ));
    }

    #[test]
    fn tree_variant_aggregates() {
        let height = TreeHeight::new(6).unwrap();
        let registry = CircuitRegistry::init(&config()).unwrap();
        let engine = RedactedTree::new(registry, height).unwrap();
        let values: Vec<Metadata> = (0..10u64)
            .map(|i| Metadata::new(FieldElement::from_u64(i), hash_text("number")))
            .collect();
        let disclosure = TreeDisclosure::build(height, &values, &[9, 0, 4, 5, 7]).unwrap();
        let redacted_root = disclosure.redacted_root();
        let tree = ProofTree::balanced(disclosure.into_items()).unwrap();
        let proof = Aggregator::new(&config())
            .unwrap()
            .aggregate_tree(&engine, &tree)
            .unwrap();
        assert_eq!(proof.public_output.count, FieldElement::from_u64(5));
        assert_eq!(proof.public_output.redacted_root, redacted_root);
        engine.verify(&proof).unwrap();
    }

    #[test]
    fn repeated_leaf_is_rejected() {
        let aggregator = Aggregator::new(&config()).unwrap();
        let tree = ProofTree::balanced(vec![1u64, 2, 1]).unwrap();
        assert!(matches!(
            aggregator.aggregate(&Summing, &tree),
            Err(RedactionError::DuplicateLeaf { position }) if position == FieldElement::ONE
        ));
        let tree = ProofTree::balanced(vec![1u64, 2, 3]).unwrap();
        assert_eq!(aggregator.aggregate(&Summing, &tree).unwrap(), 6);
    }

    #[test]
    fn repeated_map_attribute_cannot_inflate_count() {
        let registry = CircuitRegistry::init(&config()).unwrap();
        let engine = RedactedMap::new(registry);
        let mut items = Disclosure::build(&record(2), &names(2)).unwrap().into_items();
        items.push(items[0].clone());
        let tree = ProofTree::balanced(items).unwrap();
        assert!(matches!(
            Aggregator::new(&config()).unwrap().aggregate_map(&engine, &tree),
            Err(RedactionError::DuplicateLeaf { .. })
        ));
    }

    #[test]
    fn repeated_tree_index_is_rejected() {
        let height = TreeHeight::new(6).unwrap();
        let registry = CircuitRegistry::init(&config()).unwrap();
        let engine = RedactedTree::new(registry, height).unwrap();
        let values: Vec<Metadata> = (0..4u64)
            .map(|i| Metadata::new(FieldElement::from_u64(i), hash_text("number")))
            .collect();
        let mut items = TreeDisclosure::build(height, &values, &[1, 3]).unwrap().into_items();
        items.push(items[1].clone());
        let tree = ProofTree::left_fold(items).unwrap();
        assert!(matches!(
            Aggregator::new(&config()).unwrap().aggregate_tree(&engine, &tree),
            Err(RedactionError::DuplicateLeaf { position }) if position == FieldElement::from_u64(3)
        ));
    }

    #[test]
    fn long_chain_is_measured_without_recursion_and_refused() {
        let n = 5_000u64;
        let chain = ProofTree::left_fold((0..n).collect::<Vec<_>>()).unwrap();
        assert_eq!(chain.leaf_count(), n as usize);
        assert_eq!(chain.depth(), (n - 1) as usize);
        assert_eq!(chain.leaves().first().copied(), Some(&0));
        assert!(matches!(
            Aggregator::new(&config()).unwrap().aggregate(&Summing, &chain),
            Err(RedactionError::ReductionTooDeep { depth, max })
                if depth == (n - 1) as usize && max == MAX_REDUCTION_DEPTH
        ));

        let balanced = ProofTree::balanced((0..n).collect::<Vec<_>>()).unwrap();
        assert!(balanced.depth() <= 13);
        assert_eq!(
            Aggregator::new(&config()).unwrap().aggregate(&Summing, &balanced).unwrap(),
            n * (n - 1) / 2
        );
    }
}
