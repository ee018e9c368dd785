use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use super::ngram::MAX_NGRAM_ORDER;
use crate::error::{LanguageError, Result};

/// Pre-leaf nodes with up to this many children keep keys and values inline.
const MAX_INLINE_ARITY: usize = 6;

/// Key and value arrays up to this length go through the canonicalization cache.
const MAX_CANONICAL_LEN: usize = 64;

/// Branches wider than this check the key range before searching.
const WIDE_BRANCH: usize = 16;

/// Read-only map from ngram to relative frequency for one language and one order.
///
/// Built once through [`FrequencyStoreBuilder`], then frozen into a trie
/// whose node layout depends on its arity:
/// - `Leaf`: a node without children, holding a frequency
/// - `InlineN`: a node whose 1 to 6 children are all leaves; keys and values
///   live inline and are scanned linearly
/// - `Leaves`: a node with more leaf children; sorted keys with a parallel
///   value array, binary searched
/// - `Branch`: a node with non-leaf children; sorted keys with a parallel
///   array of subtrees, binary searched
///
/// Key and value arrays that occur more than once are shared between nodes.
///
/// # Invariants
/// - every stored ngram has exactly `order` characters
/// - the store is immutable; concurrent reads need no synchronization
#[derive(Debug)]
pub struct FrequencyStore {
	order: usize,
	len: usize,
	root: Option<Node>,
}

#[derive(Debug)]
enum Node {
	Leaf(f64),
	Inline1(InlineLeaves<1>),
	Inline2(InlineLeaves<2>),
	Inline3(InlineLeaves<3>),
	Inline4(InlineLeaves<4>),
	Inline5(InlineLeaves<5>),
	Inline6(InlineLeaves<6>),
	Leaves(SortedLeaves),
	Branch(Branch),
}

#[derive(Debug)]
struct InlineLeaves<const N: usize> {
	keys: [char; N],
	values: [f64; N],
}

impl<const N: usize> InlineLeaves<N> {
	fn new(keys: &[char], values: &[f64]) -> Self {
		Self {
			keys: std::array::from_fn(|i| keys[i]),
			values: std::array::from_fn(|i| values[i]),
		}
	}

	#[inline]
	fn get(&self, c: char) -> Option<f64> {
		self.keys.iter().position(|&key| key == c).map(|i| self.values[i])
	}
}

#[derive(Debug)]
struct SortedLeaves {
	keys: Arc<[char]>,
	values: Arc<[f64]>,
}

impl SortedLeaves {
	fn get(&self, c: char) -> Option<f64> {
		self.keys.binary_search(&c).ok().map(|i| self.values[i])
	}
}

#[derive(Debug)]
struct Branch {
	keys: Arc<[char]>,
	children: Box<[Node]>,
}

impl Branch {
	fn child(&self, c: char) -> Option<&Node> {
		if self.keys.len() > WIDE_BRANCH {
			let (first, last) = (self.keys[0], self.keys[self.keys.len() - 1]);
			if c < first || c > last {
				return None;
			}
		}
		self.keys.binary_search(&c).ok().map(|i| &self.children[i])
	}
}

impl Node {
	/// Value of the leaf child `c`, for pre-leaf nodes only.
	#[inline]
	fn leaf_child(&self, c: char) -> Option<f64> {
		match self {
			Node::Inline1(leaves) => leaves.get(c),
			Node::Inline2(leaves) => leaves.get(c),
			Node::Inline3(leaves) => leaves.get(c),
			Node::Inline4(leaves) => leaves.get(c),
			Node::Inline5(leaves) => leaves.get(c),
			Node::Inline6(leaves) => leaves.get(c),
			Node::Leaves(leaves) => leaves.get(c),
			Node::Leaf(_) | Node::Branch(_) => None,
		}
	}
}

impl FrequencyStore {
	/// Starts building a store for ngrams of `order` characters.
	///
	/// # Errors
	/// Returns [`LanguageError::InvalidNgramOrder`] if `order` is not in `1..=5`.
	pub fn builder(order: usize) -> Result<FrequencyStoreBuilder> {
		if !(1..=MAX_NGRAM_ORDER).contains(&order) {
			return Err(LanguageError::InvalidNgramOrder(order));
		}
		Ok(FrequencyStoreBuilder { order, len: 0, root: BuilderNode::default() })
	}

	/// A store holding nothing; every lookup yields 0.
	pub fn empty(order: usize) -> Self {
		Self { order, len: 0, root: None }
	}

	/// Builds a store from `(ngram, frequency)` pairs.
	pub fn from_entries<'a, I>(order: usize, entries: I) -> Result<Self>
	where
		I: IntoIterator<Item = (&'a str, f64)>,
	{
		let mut builder = Self::builder(order)?;
		for (ngram, frequency) in entries {
			builder.insert(ngram, frequency)?;
		}
		Ok(builder.build())
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of stored ngrams.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Relative frequency of `ngram`, or 0 if it is absent.
	///
	/// The walk consumes one character per level and only succeeds when the
	/// ngram ends exactly on a leaf.
	pub fn get(&self, ngram: &str) -> f64 {
		let Some(mut node) = self.root.as_ref() else {
			return 0.0;
		};
		let mut chars = ngram.chars();

		loop {
			if let Node::Leaf(frequency) = node {
				return if chars.next().is_none() { *frequency } else { 0.0 };
			}
			let Some(c) = chars.next() else {
				return 0.0;
			};
			match node {
				Node::Branch(branch) => match branch.child(c) {
					Some(child) => node = child,
					None => return 0.0,
				},
				pre_leaf => {
					return match (pre_leaf.leaf_child(c), chars.next()) {
						(Some(frequency), None) => frequency,
						_ => 0.0,
					};
				}
			}
		}
	}
}

/// Mutable prefix tree used while loading a store.
#[derive(Debug)]
pub struct FrequencyStoreBuilder {
	order: usize,
	len: usize,
	root: BuilderNode,
}

#[derive(Debug, Default)]
struct BuilderNode {
	frequency: Option<f64>,
	children: BTreeMap<char, BuilderNode>,
}

impl FrequencyStoreBuilder {
	/// Inserts or replaces the frequency of `ngram`.
	///
	/// # Errors
	/// Returns [`LanguageError::InvalidNgram`] if `ngram` does not have
	/// exactly `order` characters.
	pub fn insert(&mut self, ngram: &str, frequency: f64) -> Result<()> {
		if ngram.chars().count() != self.order {
			return Err(LanguageError::InvalidNgram(ngram.to_owned()));
		}

		let mut node = &mut self.root;
		for c in ngram.chars() {
			node = node.children.entry(c).or_default();
		}
		if node.frequency.replace(frequency).is_none() {
			self.len += 1;
		}
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Freezes the tree into its compact read-only layout.
	pub fn build(self) -> FrequencyStore {
		if self.root.children.is_empty() {
			return FrequencyStore::empty(self.order);
		}

		let mut cache = Canonicalizer::default();
		let root = freeze(self.root, &mut cache);
		debug!(
			order = self.order,
			entries = self.len,
			shared_arrays = cache.hits,
			"frequency store built"
		);

		FrequencyStore { order: self.order, len: self.len, root: Some(root) }
	}
}

fn freeze(node: BuilderNode, cache: &mut Canonicalizer) -> Node {
	if node.children.is_empty() {
		return Node::Leaf(node.frequency.unwrap_or_default());
	}

	if node.children.values().all(|child| child.children.is_empty()) {
		let (keys, values): (Vec<char>, Vec<f64>) = node
			.children
			.into_iter()
			.map(|(key, child)| (key, child.frequency.unwrap_or_default()))
			.unzip();

		return match keys.len() {
			n if n > MAX_INLINE_ARITY => {
				Node::Leaves(SortedLeaves { keys: cache.keys(keys), values: cache.values(values) })
			}
			1 => Node::Inline1(InlineLeaves::new(&keys, &values)),
			2 => Node::Inline2(InlineLeaves::new(&keys, &values)),
			3 => Node::Inline3(InlineLeaves::new(&keys, &values)),
			4 => Node::Inline4(InlineLeaves::new(&keys, &values)),
			5 => Node::Inline5(InlineLeaves::new(&keys, &values)),
			_ => Node::Inline6(InlineLeaves::new(&keys, &values)),
		};
	}

	let (keys, children): (Vec<char>, Vec<Node>) = node
		.children
		.into_iter()
		.map(|(key, child)| (key, freeze(child, cache)))
		.unzip();

	Node::Branch(Branch { keys: cache.keys(keys), children: children.into_boxed_slice() })
}

/// Build-time cache sharing identical small key and value arrays.
#[derive(Default)]
struct Canonicalizer {
	keys: HashMap<Vec<char>, Arc<[char]>>,
	values: HashMap<Vec<u64>, Arc<[f64]>>,
	hits: usize,
}

impl Canonicalizer {
	fn keys(&mut self, keys: Vec<char>) -> Arc<[char]> {
		if keys.len() > MAX_CANONICAL_LEN {
			return keys.into();
		}
		if let Some(shared) = self.keys.get(&keys) {
			self.hits += 1;
			return Arc::clone(shared);
		}
		let shared: Arc<[char]> = Arc::from(keys.as_slice());
		self.keys.insert(keys, Arc::clone(&shared));
		shared
	}

	fn values(&mut self, values: Vec<f64>) -> Arc<[f64]> {
		if values.len() > MAX_CANONICAL_LEN {
			return values.into();
		}
		// keyed by bit pattern, f64 is not Hash
		let bits: Vec<u64> = values.iter().map(|value| value.to_bits()).collect();
		if let Some(shared) = self.values.get(&bits) {
			self.hits += 1;
			return Arc::clone(shared);
		}
		let shared: Arc<[f64]> = values.into();
		self.values.insert(bits, Arc::clone(&shared));
		shared
	}
}
