//! Statistical language detection.
//!
//! A [`LanguageDetector`] is created through [`LanguageDetectorBuilder`]
//! and is immutable afterwards. Detecting a text goes through:
//! - cleanup and word splitting (`text`)
//! - the rule-based prefilter, which may decide on its own (`rules`)
//! - ngram scoring with backoff over the remaining candidates, one
//!   parallel task per ngram order
//! - normalisation into confidence values and the final verdict
//!
//! Models are fetched lazily through a shared [`cache::ModelCache`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::model::frequency_store::FrequencyStore;
use crate::model::language::Language;
use crate::model::ngram::{MAX_NGRAM_ORDER, Ngram};

/// Detector configuration and validation.
pub mod builder;

/// Model sources and the process-wide model cache.
pub mod cache;

/// Script rules deciding or narrowing the candidates before scoring.
pub(crate) mod rules;

/// Input cleanup, word splitting and ngram extraction.
pub(crate) mod text;

pub use builder::LanguageDetectorBuilder;
use cache::{ModelCache, ModelSource};
use rules::{detect_language_with_rules, filter_languages_by_rules};
use text::{clean_up_input_text, contains_letters, extract_ngrams, split_text_into_words};

/// Texts at least this long (in characters, after cleanup) are scored on
/// trigrams only.
const HIGH_ACCURACY_MODE_MAX_TEXT_LENGTH: usize = 120;

/// Shorter texts are left undecided in low accuracy mode.
const LOW_ACCURACY_MODE_MIN_TEXT_LENGTH: usize = 3;

/// The order sampled alone for long texts and in low accuracy mode.
const LOW_ACCURACY_MODE_ORDER: usize = 3;

/// Languages with their confidence values, highest first.
///
/// # Invariants
/// - every value lies in `(0.0, 1.0]`
/// - the first entry, if any, has a value of exactly `1.0`
/// - equal values are ordered by [`Language`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfidenceMap(Vec<(Language, f64)>);

impl ConfidenceMap {
	fn single(language: Language) -> Self {
		Self(vec![(language, 1.0)])
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &(Language, f64)> {
		self.0.iter()
	}

	/// The most likely language and its value.
	pub fn first(&self) -> Option<(Language, f64)> {
		self.0.first().copied()
	}

	/// Confidence value of `language`, if it survived scoring.
	pub fn get(&self, language: Language) -> Option<f64> {
		self.0.iter().find(|(candidate, _)| *candidate == language).map(|(_, value)| *value)
	}

	pub fn into_vec(self) -> Vec<(Language, f64)> {
		self.0
	}
}

impl IntoIterator for ConfidenceMap {
	type Item = (Language, f64);
	type IntoIter = std::vec::IntoIter<(Language, f64)>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Per-order result of the scoring stage.
struct OrderScores {
	/// Summed log-probabilities, zero sums left out
	probabilities: BTreeMap<Language, f64>,
	/// Unigram coverage, only computed for order 1
	unigram_counts: Option<BTreeMap<Language, usize>>,
}

/// Detects the language of texts among a fixed set of candidates.
///
/// # Responsibilities
/// - Decide trivially-decidable texts from their script alone
/// - Score the remaining candidates with the ngram models
/// - Report `None` for empty, letterless or ambiguous texts
///
/// A detector can be shared by any number of threads.
#[derive(Debug)]
pub struct LanguageDetector {
	languages: BTreeSet<Language>,
	minimum_relative_distance: f64,
	is_low_accuracy_mode_enabled: bool,
	source: Arc<dyn ModelSource>,
	cache: Arc<ModelCache>,
}

impl LanguageDetector {
	pub(crate) fn new(
		languages: BTreeSet<Language>,
		minimum_relative_distance: f64,
		is_low_accuracy_mode_enabled: bool,
		source: Arc<dyn ModelSource>,
		cache: Arc<ModelCache>,
	) -> Self {
		Self {
			languages,
			minimum_relative_distance,
			is_low_accuracy_mode_enabled,
			source,
			cache,
		}
	}

	pub fn languages(&self) -> &BTreeSet<Language> {
		&self.languages
	}

	pub fn minimum_relative_distance(&self) -> f64 {
		self.minimum_relative_distance
	}

	pub fn is_low_accuracy_mode_enabled(&self) -> bool {
		self.is_low_accuracy_mode_enabled
	}

	pub fn cache(&self) -> &Arc<ModelCache> {
		&self.cache
	}

	/// Most likely language of `text`, or `None` if it cannot be decided.
	///
	/// `None` is returned for texts without letters, when two languages
	/// are equally likely, and when the two best confidence values are
	/// closer than the minimum relative distance.
	pub fn detect_language_of<T: AsRef<str>>(&self, text: T) -> Option<Language> {
		let confidence_values = self.compute_language_confidence_values(text.as_ref());
		let verdict = self.verdict(&confidence_values);
		trace!(verdict = ?verdict, candidates = confidence_values.len(), "language detected");
		verdict
	}

	/// Detects every text in parallel; results keep the input order.
	pub fn detect_languages_of<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Vec<Option<Language>> {
		texts.par_iter().map(|text| self.detect_language_of(text)).collect()
	}

	/// Confidence values of the candidate languages for `text`.
	///
	/// Empty when the text cannot be scored at all. A language decided by
	/// the rules is returned alone with a value of `1.0`.
	pub fn compute_language_confidence_values<T: AsRef<str>>(&self, text: T) -> ConfidenceMap {
		let cleaned = clean_up_input_text(text.as_ref());
		if cleaned.is_empty() || !contains_letters(&cleaned) {
			return ConfidenceMap::default();
		}

		let words = split_text_into_words(&cleaned);
		if let Some(language) = detect_language_with_rules(&words, &self.languages) {
			return ConfidenceMap::single(language);
		}

		let candidates = filter_languages_by_rules(&words, &self.languages);
		if candidates.len() == 1 {
			if let Some(language) = candidates.first() {
				return ConfidenceMap::single(*language);
			}
		}

		let text_length = cleaned.chars().count();
		if self.is_low_accuracy_mode_enabled && text_length < LOW_ACCURACY_MODE_MIN_TEXT_LENGTH {
			return ConfidenceMap::default();
		}

		let orders: Vec<usize> =
			if text_length >= HIGH_ACCURACY_MODE_MAX_TEXT_LENGTH || self.is_low_accuracy_mode_enabled {
				vec![LOW_ACCURACY_MODE_ORDER]
			} else {
				(1..=text_length.min(MAX_NGRAM_ORDER)).collect()
			};

		let scores: Vec<OrderScores> = orders
			.par_iter()
			.map(|&order| self.score_order(&cleaned, order, &candidates))
			.collect();

		let summed = sum_up_probabilities(scores, &candidates);
		to_confidence_values(summed)
	}

	/// Confidence value of one language for `text`, `0.0` if it was ruled out.
	pub fn compute_language_confidence<T: AsRef<str>>(&self, text: T, language: Language) -> f64 {
		self.compute_language_confidence_values(text).get(language).unwrap_or(0.0)
	}

	/// Relative frequency of `ngram` in the model of `language`.
	///
	/// Loads the model of the ngram's order on first use; unknown ngrams
	/// have a frequency of `0.0`.
	///
	/// # Panics
	/// Panics for the zero-length ngram, which has no model.
	pub fn look_up_ngram_probability(&self, language: Language, ngram: &Ngram) -> f64 {
		assert!(!ngram.is_empty(), "zerogram detected");
		self.cache
			.get_or_load(self.source.as_ref(), language, ngram.len())
			.get(ngram.value())
	}

	/// Loads every model the detector may need.
	///
	/// Only trigram models in low accuracy mode, all five orders otherwise.
	pub(crate) fn preload_language_models(&self) {
		let orders: Vec<usize> = if self.is_low_accuracy_mode_enabled {
			vec![LOW_ACCURACY_MODE_ORDER]
		} else {
			(1..=MAX_NGRAM_ORDER).collect()
		};
		let keys: Vec<(Language, usize)> = self
			.languages
			.iter()
			.flat_map(|language| orders.iter().map(move |order| (*language, *order)))
			.collect();

		keys.par_iter().for_each(|(language, order)| {
			self.cache.get_or_load(self.source.as_ref(), *language, *order);
		});
		info!(languages = self.languages.len(), models = keys.len(), "language models preloaded");
	}

	/// Drops the cached models of this detector's languages.
	///
	/// Models of other languages in a shared cache are kept.
	pub fn unload_language_models(&self) {
		self.cache.unload(self.languages.iter().copied());
	}

	fn verdict(&self, confidence_values: &ConfidenceMap) -> Option<Language> {
		let mut values = confidence_values.iter();
		let (most_likely, most_likely_value) = *values.next()?;
		let Some((_, second_value)) = values.next() else {
			return Some(most_likely);
		};

		if most_likely_value == *second_value
			|| most_likely_value - *second_value < self.minimum_relative_distance
		{
			return None;
		}
		Some(most_likely)
	}

	fn score_order(&self, text: &str, order: usize, candidates: &BTreeSet<Language>) -> OrderScores {
		let ngrams = extract_ngrams(text, order);
		let mut probabilities = BTreeMap::new();
		let mut unigram_counts = (order == 1).then(BTreeMap::new);

		for language in candidates {
			let mut stores = LanguageStores::new(self, *language);
			let sum = sum_of_ngram_probabilities(&ngrams, |ngram| stores.look_up(ngram));
			if sum != 0.0 {
				probabilities.insert(*language, sum);
			}

			if let Some(counts) = unigram_counts.as_mut() {
				let covered = ngrams
					.iter()
					.filter(|unigram| stores.look_up(unigram) > 0.0)
					.count();
				if covered > 0 {
					counts.insert(*language, covered);
				}
			}
		}

		debug!(order, ngrams = ngrams.len(), scored = probabilities.len(), "ngram order scored");
		OrderScores { probabilities, unigram_counts }
	}
}

/// Stores of one language within a scoring task.
///
/// A store is fetched from the cache the first time a lookup reaches its
/// order, then kept for the rest of the task.
struct LanguageStores<'a> {
	detector: &'a LanguageDetector,
	language: Language,
	stores: [Option<Arc<FrequencyStore>>; MAX_NGRAM_ORDER],
}

impl<'a> LanguageStores<'a> {
	fn new(detector: &'a LanguageDetector, language: Language) -> Self {
		Self { detector, language, stores: Default::default() }
	}

	fn look_up(&mut self, ngram: &Ngram) -> f64 {
		let order = ngram.len();
		assert!(order > 0, "zerogram detected");

		let (detector, language) = (self.detector, self.language);
		self.stores[order - 1]
			.get_or_insert_with(|| detector.cache.get_or_load(detector.source.as_ref(), language, order))
			.get(ngram.value())
	}
}

/// Sum of the natural logarithms of each ngram's first nonzero backoff hit.
///
/// Ngrams without any hit contribute nothing. Shorter ngrams are only
/// looked up when the longer ones miss.
fn sum_of_ngram_probabilities<F>(ngrams: &BTreeSet<Ngram>, mut look_up: F) -> f64
where
	F: FnMut(&Ngram) -> f64,
{
	let mut sum = 0.0;
	for ngram in ngrams {
		let hit = ngram
			.lower_order_ngrams()
			.map(|lower| look_up(&lower))
			.find(|probability| *probability > 0.0);
		if let Some(probability) = hit {
			sum += probability.ln();
		}
	}
	sum
}

fn sum_up_probabilities(scores: Vec<OrderScores>, candidates: &BTreeSet<Language>) -> BTreeMap<Language, f64> {
	let unigram_counts = scores.iter().find_map(|scores| scores.unigram_counts.as_ref());

	let mut summed = BTreeMap::new();
	for language in candidates {
		let mut sum: f64 = scores
			.iter()
			.filter_map(|scores| scores.probabilities.get(language))
			.sum();
		if let Some(count) = unigram_counts.and_then(|counts| counts.get(language)) {
			sum /= *count as f64;
		}
		if sum != 0.0 {
			summed.insert(*language, sum);
		}
	}
	summed
}

/// Turns summed log-probabilities into values relative to the best one.
fn to_confidence_values(summed: BTreeMap<Language, f64>) -> ConfidenceMap {
	let Some(highest) = summed.values().copied().reduce(f64::max) else {
		return ConfidenceMap::default();
	};

	let mut values: Vec<(Language, f64)> = summed
		.into_iter()
		.map(|(language, probability)| (language, highest / probability))
		.collect();
	values.sort_by(|(a, a_value), (b, b_value)| b_value.total_cmp(a_value).then_with(|| a.cmp(b)));
	ConfidenceMap(values)
}

#[cfg(test)]
mod tests {
	use super::*;
	use Language::*;

	fn ngram(value: &str) -> Ngram {
		Ngram::new(value).unwrap()
	}

	fn stores(entries: &[&[(&str, f64)]]) -> Vec<Arc<FrequencyStore>> {
		entries
			.iter()
			.enumerate()
			.map(|(index, entries)| {
				Arc::new(FrequencyStore::from_entries(index + 1, entries.iter().copied()).unwrap())
			})
			.collect()
	}

	fn sum(stores: &[Arc<FrequencyStore>], ngrams: &BTreeSet<Ngram>) -> f64 {
		sum_of_ngram_probabilities(ngrams, |ngram| {
			stores.get(ngram.len() - 1).map_or(0.0, |store| store.get(ngram.value()))
		})
	}

	#[test]
	fn test_backoff_takes_first_nonzero_hit() {
		let ngrams: BTreeSet<Ngram> = [ngram("alter")].into_iter().collect();
		let unigram_only = stores(&[&[("a", 0.01)], &[], &[], &[], &[]]);
		assert_eq!(sum(&unigram_only, &ngrams), 0.01_f64.ln());

		let with_bigram = stores(&[&[("a", 0.01)], &[("al", 0.2)], &[], &[], &[]]);
		assert_eq!(sum(&with_bigram, &ngrams), 0.2_f64.ln());
	}

	#[test]
	fn test_unknown_ngrams_contribute_nothing() {
		let stores = stores(&[&[("a", 0.5)]]);
		let ngrams: BTreeSet<Ngram> = [ngram("a"), ngram("z")].into_iter().collect();
		assert_eq!(sum(&stores, &ngrams), 0.5_f64.ln());

		let ngrams: BTreeSet<Ngram> = [ngram("z")].into_iter().collect();
		assert_eq!(sum(&stores, &ngrams), 0.0);
	}

	#[test]
	#[should_panic(expected = "zerogram detected")]
	fn test_zerogram_lookup_panics() {
		let detector = detector(0.0);
		LanguageStores::new(&detector, English).look_up(&Ngram::zerogram());
	}

	#[test]
	fn test_backoff_loads_lower_orders_only_when_reached() {
		let source = cache::MemorySource::new()
			.with_resource(English, 3, r#"{"language":"ENGLISH","ngrams":{"1/5":"alt lte ter"}}"#)
			.with_resource(German, 3, r#"{"language":"GERMAN","ngrams":{"1/4":"alt lte ter"}}"#);
		let cache = Arc::new(ModelCache::new());
		let detector = LanguageDetector::new(
			[English, German].into_iter().collect(),
			0.0,
			true,
			Arc::new(source),
			Arc::clone(&cache),
		);
		detector.preload_language_models();
		assert_eq!(cache.len(), 2);

		assert_eq!(detector.detect_language_of("alter"), Some(German));
		assert_eq!(cache.len(), 2);
		assert!(!cache.contains(English, 1));
		assert!(!cache.contains(English, 2));

		// a trigram miss backs off to the bigram, then the unigram store
		assert_eq!(detector.detect_language_of("alz"), None);
		assert!(cache.contains(English, 2));
		assert!(cache.contains(German, 1));
	}

	#[test]
	fn test_unigram_counts_normalise_sums() {
		let scores = vec![
			OrderScores {
				probabilities: [(English, -4.0), (German, -3.0)].into_iter().collect(),
				unigram_counts: Some([(English, 2)].into_iter().collect()),
			},
			OrderScores {
				probabilities: [(English, -2.0)].into_iter().collect(),
				unigram_counts: None,
			},
		];
		let candidates: BTreeSet<Language> = [English, French, German].into_iter().collect();

		let summed = sum_up_probabilities(scores, &candidates);
		assert_eq!(summed.get(&English), Some(&-3.0));
		assert_eq!(summed.get(&German), Some(&-3.0));
		assert_eq!(summed.get(&French), None);
	}

	#[test]
	fn test_confidence_values_are_relative_and_sorted() {
		let summed: BTreeMap<Language, f64> =
			[(French, -8.0), (English, -4.0), (German, -8.0)].into_iter().collect();
		let values = to_confidence_values(summed);

		assert_eq!(values.clone().into_vec(), vec![(English, 1.0), (French, 0.5), (German, 0.5)]);
		assert_eq!(values.get(German), Some(0.5));
		assert_eq!(values.get(Spanish), None);
		assert_eq!(values.first(), Some((English, 1.0)));
		assert!(to_confidence_values(BTreeMap::new()).is_empty());
	}

	fn detector(minimum_relative_distance: f64) -> LanguageDetector {
		LanguageDetector::new(
			[English, German].into_iter().collect(),
			minimum_relative_distance,
			false,
			Arc::new(cache::MemorySource::new()),
			Arc::new(ModelCache::new()),
		)
	}

	#[test]
	fn test_verdict() {
		let clear = ConfidenceMap(vec![(German, 1.0), (English, 0.8)]);
		assert_eq!(detector(0.0).verdict(&clear), Some(German));
		assert_eq!(detector(0.15).verdict(&clear), Some(German));
		assert_eq!(detector(0.25).verdict(&clear), None);

		let tie = ConfidenceMap(vec![(English, 1.0), (German, 1.0)]);
		assert_eq!(detector(0.0).verdict(&tie), None);

		assert_eq!(detector(0.9).verdict(&ConfidenceMap::single(German)), Some(German));
		assert_eq!(detector(0.0).verdict(&ConfidenceMap::default()), None);
	}

	#[test]
	fn test_empty_models_leave_text_undecided() {
		let detector = detector(0.0);
		assert!(detector.compute_language_confidence_values("house").is_empty());
		assert_eq!(detector.detect_language_of("house"), None);
		assert_eq!(detector.compute_language_confidence("house", English), 0.0);
		assert_eq!(detector.cache().len(), 10);

		detector.unload_language_models();
		assert!(detector.cache().is_empty());
	}

	#[test]
	fn test_low_accuracy_mode_skips_short_texts() {
		let cache = Arc::new(ModelCache::new());
		let detector = LanguageDetector::new(
			[English, German].into_iter().collect(),
			0.0,
			true,
			Arc::new(cache::MemorySource::new()),
			Arc::clone(&cache),
		);
		assert!(detector.compute_language_confidence_values("ab").is_empty());
		assert!(cache.is_empty());

		detector.detect_language_of("abc");
		assert!(cache.contains(English, 3));
		assert!(!cache.contains(English, 4));
	}

	#[test]
	#[should_panic(expected = "zerogram detected")]
	fn test_public_lookup_rejects_zerogram() {
		detector(0.0).look_up_ngram_probability(English, &Ngram::zerogram());
	}
}
