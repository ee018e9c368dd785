use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use super::LanguageDetector;
use super::cache::{DirectorySource, ModelCache, ModelSource};
use crate::error::{LanguageError, Result};
use crate::model::language::Language;

/// Configures and builds a [`LanguageDetector`].
///
/// Setters never fail; every parameter is validated by [`build`](Self::build),
/// so no half-configured detector can exist.
///
/// # Defaults
/// - minimum relative distance: `0.0`
/// - models are loaded lazily, on first use
/// - all ngram orders are used
/// - models are read from [`DirectorySource::from_env`] into a fresh cache
#[derive(Clone, Debug)]
pub struct LanguageDetectorBuilder {
	languages: BTreeSet<Language>,
	minimum_relative_distance: f64,
	is_every_language_model_preloaded: bool,
	is_low_accuracy_mode_enabled: bool,
	source: Option<Arc<dyn ModelSource>>,
	cache: Option<Arc<ModelCache>>,
}

impl LanguageDetectorBuilder {
	fn new<I: IntoIterator<Item = Language>>(languages: I) -> Self {
		Self {
			languages: languages.into_iter().collect(),
			minimum_relative_distance: 0.0,
			is_every_language_model_preloaded: false,
			is_low_accuracy_mode_enabled: false,
			source: None,
			cache: None,
		}
	}

	/// Detector choosing among the given languages (at least two).
	pub fn from_languages(languages: &[Language]) -> Self {
		Self::new(languages.iter().copied())
	}

	pub fn from_all_languages() -> Self {
		Self::new(Language::all())
	}

	/// Every language except Latin.
	pub fn from_all_spoken_languages() -> Self {
		Self::new(Language::all_spoken_ones())
	}

	pub fn from_all_languages_with_latin_script() -> Self {
		Self::new(Language::all_with_latin_script())
	}

	pub fn from_all_languages_with_cyrillic_script() -> Self {
		Self::new(Language::all_with_cyrillic_script())
	}

	pub fn from_all_languages_with_arabic_script() -> Self {
		Self::new(Language::all_with_arabic_script())
	}

	pub fn from_all_languages_with_devanagari_script() -> Self {
		Self::new(Language::all_with_devanagari_script())
	}

	/// Every language except the given ones.
	pub fn from_all_languages_without(languages: &[Language]) -> Self {
		Self::new(Language::all().filter(|language| !languages.contains(language)))
	}

	/// Languages given by ISO 639-1 codes (case-insensitive).
	///
	/// # Errors
	/// Returns [`LanguageError::InvalidInput`] for an unknown code.
	pub fn from_iso_codes_639_1(codes: &[&str]) -> Result<Self> {
		Self::from_iso_codes(codes, Language::from_iso_code_639_1)
	}

	/// Languages given by ISO 639-3 codes (case-insensitive).
	///
	/// # Errors
	/// Returns [`LanguageError::InvalidInput`] for an unknown code.
	pub fn from_iso_codes_639_3(codes: &[&str]) -> Result<Self> {
		Self::from_iso_codes(codes, Language::from_iso_code_639_3)
	}

	fn from_iso_codes(codes: &[&str], lookup: fn(&str) -> Option<Language>) -> Result<Self> {
		let languages = codes
			.iter()
			.map(|code| lookup(code).ok_or_else(|| LanguageError::InvalidInput(format!("unknown ISO code '{}'", code))))
			.collect::<Result<Vec<_>>>()?;
		Ok(Self::new(languages))
	}

	/// Minimum gap between the two highest confidence values for a verdict.
	///
	/// Must lie in `0.0..=0.99`; checked by [`build`](Self::build).
	pub fn with_minimum_relative_distance(mut self, distance: f64) -> Self {
		self.minimum_relative_distance = distance;
		self
	}

	/// Loads every needed model when the detector is built.
	pub fn with_preloaded_language_models(mut self) -> Self {
		self.is_every_language_model_preloaded = true;
		self
	}

	/// Uses trigrams only, trading short-text accuracy for memory.
	pub fn with_low_accuracy_mode(mut self) -> Self {
		self.is_low_accuracy_mode_enabled = true;
		self
	}

	pub fn with_model_source(mut self, source: Arc<dyn ModelSource>) -> Self {
		self.source = Some(source);
		self
	}

	/// Reads models from `<directory>/<iso639-1>/<order name>s.json`.
	pub fn with_model_directory<P: AsRef<Path>>(self, directory: P) -> Self {
		self.with_model_source(Arc::new(DirectorySource::new(directory)))
	}

	/// Shares an existing cache, for instance between several detectors.
	pub fn with_model_cache(mut self, cache: Arc<ModelCache>) -> Self {
		self.cache = Some(cache);
		self
	}

	/// Validates the configuration and creates the detector.
	///
	/// # Errors
	/// - [`LanguageError::NotEnoughLanguages`] for fewer than two languages
	/// - [`LanguageError::InvalidMinimumRelativeDistance`] for a distance
	///   outside `0.0..=0.99`
	pub fn build(&self) -> Result<LanguageDetector> {
		if self.languages.len() < 2 {
			return Err(LanguageError::NotEnoughLanguages(self.languages.len()));
		}
		if !(0.0..=0.99).contains(&self.minimum_relative_distance) {
			return Err(LanguageError::InvalidMinimumRelativeDistance(self.minimum_relative_distance));
		}

		let source = self
			.source
			.clone()
			.unwrap_or_else(|| Arc::new(DirectorySource::from_env()));
		let cache = self.cache.clone().unwrap_or_default();

		let detector = LanguageDetector::new(
			self.languages.clone(),
			self.minimum_relative_distance,
			self.is_low_accuracy_mode_enabled,
			source,
			cache,
		);
		if self.is_every_language_model_preloaded {
			detector.preload_language_models();
		}
		Ok(detector)
	}
}
