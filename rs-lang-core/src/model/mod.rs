//! Language data and n-gram models.
//!
//! This module groups everything the detector reads and everything the
//! training side writes:
//! - Compiled-in language and alphabet tables (`Language`, `Alphabet`)
//! - Character windows with backoff (`Ngram`)
//! - Exact training-time arithmetic (`ExactFraction`)
//! - The compact read-only lookup structure (`FrequencyStore`)
//! - The JSON resource format, corpus counting and the file writer

/// Supported languages with their ISO codes, alphabets and unique characters.
pub mod language;

/// Writing systems, matched through the Unicode `Script` property.
///
/// Some alphabets are used by exactly one supported language, which lets
/// the rule-based prefilter decide without touching any model.
pub mod alphabet;

/// Character windows of length 0 to 5 and their backoff chain.
pub mod ngram;

/// Overflow-checked rational numbers in lowest terms.
pub mod fraction;

/// Arity-specialized trie mapping ngrams to relative frequencies.
///
/// One store exists per (language, order). Stores are immutable once built
/// and are shared between threads without locking.
pub mod frequency_store;

/// JSON form of a (language, order) model, grouped by exact frequency.
pub mod resource;

/// Absolute and relative ngram frequencies computed from corpus text.
///
/// Counting is split over worker threads and merged.
pub mod training;

/// Writes the five per-order resource files of a language.
pub mod files_writer;
