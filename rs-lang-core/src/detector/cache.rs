use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{LanguageError, Result};
use crate::model::frequency_store::FrequencyStore;
use crate::model::language::Language;
use crate::model::resource::{JsonLanguageModel, resource_key};

/// Environment variable naming the default model directory.
pub const MODEL_DIRECTORY_ENV: &str = "LANGUAGE_MODELS_DIR";

/// Directory used when [`MODEL_DIRECTORY_ENV`] is not set.
pub const DEFAULT_MODEL_DIRECTORY: &str = "language-models";

/// Provides the raw bytes of model resources.
///
/// A resource is identified by a language and an ngram order; its
/// canonical key is `"{iso639-1}/{order name}s.json"` (see
/// [`resource_key`]).
pub trait ModelSource: Send + Sync + fmt::Debug {
	/// Returns the resource bytes, or `Ok(None)` if the resource does not exist.
	fn load(&self, language: Language, order: usize) -> Result<Option<Vec<u8>>>;
}

/// Reads resources from `<root>/<iso639-1>/<order name>s.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	root: PathBuf,
}

impl DirectorySource {
	pub fn new<P: AsRef<Path>>(root: P) -> Self {
		Self { root: root.as_ref().to_path_buf() }
	}

	/// Rooted at `$LANGUAGE_MODELS_DIR`, or `./language-models` when unset.
	pub fn from_env() -> Self {
		let root = std::env::var_os(MODEL_DIRECTORY_ENV)
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIRECTORY));
		Self { root }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl ModelSource for DirectorySource {
	fn load(&self, language: Language, order: usize) -> Result<Option<Vec<u8>>> {
		let path = self.root.join(resource_key(language, order)?);
		match std::fs::read(&path) {
			Ok(bytes) => Ok(Some(bytes)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(LanguageError::Io(e)),
		}
	}
}

/// Resources held in memory, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	resources: HashMap<(Language, usize), Vec<u8>>,
}

impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a resource, builder style.
	pub fn with_resource(mut self, language: Language, order: usize, bytes: impl Into<Vec<u8>>) -> Self {
		self.insert(language, order, bytes);
		self
	}

	pub fn insert(&mut self, language: Language, order: usize, bytes: impl Into<Vec<u8>>) {
		self.resources.insert((language, order), bytes.into());
	}
}

impl ModelSource for MemorySource {
	fn load(&self, language: Language, order: usize) -> Result<Option<Vec<u8>>> {
		Ok(self.resources.get(&(language, order)).cloned())
	}
}

/// Memoized frequency stores keyed by (language, order).
///
/// Every key owns a `OnceLock` cell. The first caller for a key loads and
/// publishes its store; callers racing for the same key block on that cell
/// and reuse the result, while loads of other keys run concurrently.
/// Published stores are immutable and handed out as `Arc`s, so they are
/// read without any lock.
///
/// A cache may be shared by several detectors reading the same source.
#[derive(Debug, Default)]
pub struct ModelCache {
	cells: RwLock<HashMap<(Language, usize), Arc<StoreCell>>>,
}

type StoreCell = OnceLock<Arc<FrequencyStore>>;

impl ModelCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the store of `(language, order)`, loading it from `source` on first use.
	///
	/// A missing or unreadable resource yields an empty store, which is
	/// cached like any other.
	pub fn get_or_load(&self, source: &dyn ModelSource, language: Language, order: usize) -> Arc<FrequencyStore> {
		let cell = self.cell(language, order);
		Arc::clone(cell.get_or_init(|| Arc::new(load_store(source, language, order))))
	}

	fn cell(&self, language: Language, order: usize) -> Arc<StoreCell> {
		let key = (language, order);
		if let Some(cell) = self.cells.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
			return Arc::clone(cell);
		}
		Arc::clone(self.cells.write().unwrap_or_else(PoisonError::into_inner).entry(key).or_default())
	}

	/// The published store of `(language, order)`, if any.
	pub fn get(&self, language: Language, order: usize) -> Option<Arc<FrequencyStore>> {
		self.cells
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&(language, order))
			.and_then(|cell| cell.get().cloned())
	}

	pub fn contains(&self, language: Language, order: usize) -> bool {
		self.get(language, order).is_some()
	}

	/// Number of published stores.
	pub fn len(&self) -> usize {
		self.cells
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.values()
			.filter(|cell| cell.get().is_some())
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops every store of the given languages.
	///
	/// A load still in flight for one of them completes for its callers but
	/// is not kept.
	pub fn unload<I: IntoIterator<Item = Language>>(&self, languages: I) {
		let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
		let before = cells.len();
		for language in languages {
			cells.retain(|(stored_language, _), _| *stored_language != language);
		}
		info!(unloaded = before - cells.len(), remaining = cells.len(), "language models unloaded");
	}
}

fn load_store(source: &dyn ModelSource, language: Language, order: usize) -> FrequencyStore {
	let started = Instant::now();

	let bytes = match source.load(language, order) {
		Ok(Some(bytes)) => bytes,
		Ok(None) => {
			warn!(%language, order, "language model resource missing, using an empty model");
			return FrequencyStore::empty(order);
		}
		Err(e) => {
			warn!(%language, order, error = %e, "language model resource unreadable, using an empty model");
			return FrequencyStore::empty(order);
		}
	};

	let parsed = JsonLanguageModel::from_json(&bytes).and_then(|model| {
		if model.language != language {
			return Err(LanguageError::InvalidInput(format!(
				"resource holds {} instead of {}",
				model.language, language
			)));
		}
		model.to_frequency_store(order)
	});

	match parsed {
		Ok(store) => {
			debug!(
				%language,
				order,
				entries = store.len(),
				elapsed_ms = started.elapsed().as_millis() as u64,
				"language model loaded"
			);
			store
		}
		Err(e) => {
			warn!(%language, order, error = %e, "language model resource corrupt, using an empty model");
			FrequencyStore::empty(order)
		}
	}
}
