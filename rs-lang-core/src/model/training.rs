use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc;
use std::thread;

use regex::Regex;
use tracing::debug;

use super::fraction::ExactFraction;
use super::language::Language;
use super::ngram::{MAX_NGRAM_ORDER, Ngram};
use super::resource::JsonLanguageModel;
use crate::error::{FractionError, LanguageError, Result};

/// Character class used when none is given: any letter.
pub const DEFAULT_CHAR_CLASS: &str = r"\p{L}";

/// Absolute ngram counts of one order.
pub type NgramCounts = BTreeMap<Ngram, u64>;

/// Frequencies of one (language, order) pair computed from a corpus.
///
/// # Responsibilities
/// - Count every window of `order` characters matching a character class
/// - Turn the counts into exact conditional probabilities
/// - Convert to and from the grouped JSON resource format
///
/// # Invariants
/// - every ngram in both maps has exactly `order` characters
/// - for `order >= 2` with lower order counts, each relative frequency is
///   `count(ngram) / count(prefix)`; otherwise `count(ngram) / total`
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingDataLanguageModel {
	language: Language,
	order: usize,
	absolute_frequencies: NgramCounts,
	relative_frequencies: BTreeMap<Ngram, ExactFraction>,
}

impl TrainingDataLanguageModel {
	/// Counts and normalizes the ngrams of `lines`.
	///
	/// `char_class` is the body of a regex character class (for instance
	/// `\p{L}&&\p{Latin}`); only windows made of letters of that class count.
	///
	/// # Errors
	/// - invalid order or character class
	/// - a prefix missing from `lower_order_counts`
	/// - counts too large for exact arithmetic
	pub fn from_text(
		lines: &[String],
		language: Language,
		order: usize,
		char_class: &str,
		lower_order_counts: &NgramCounts,
	) -> Result<Self> {
		let absolute_frequencies = count_ngrams(lines, order, char_class)?;
		Self::from_counts(language, order, absolute_frequencies, lower_order_counts)
	}

	/// Normalizes counts computed beforehand.
	pub fn from_counts(
		language: Language,
		order: usize,
		absolute_frequencies: NgramCounts,
		lower_order_counts: &NgramCounts,
	) -> Result<Self> {
		check_order(order)?;
		let relative_frequencies = compute_relative_frequencies(order, &absolute_frequencies, lower_order_counts)?;

		Ok(Self { language, order, absolute_frequencies, relative_frequencies })
	}

	/// Reads a resource back. Absolute counts are not part of the format
	/// and stay empty.
	///
	/// # Errors
	/// Fails on malformed JSON, on a model without ngrams, or when the
	/// ngrams do not all share one length.
	pub fn from_json(json: &str) -> Result<Self> {
		let model = JsonLanguageModel::from_json(json.as_bytes())?;

		let mut relative_frequencies = BTreeMap::new();
		for (value, fraction) in model.entries() {
			relative_frequencies.insert(Ngram::new(value)?, fraction);
		}

		let order = relative_frequencies
			.keys()
			.next()
			.map(Ngram::len)
			.ok_or_else(|| LanguageError::InvalidInput(format!("{} model without ngrams", model.language)))?;
		if let Some(ngram) = relative_frequencies.keys().find(|ngram| ngram.len() != order) {
			return Err(LanguageError::InvalidNgram(ngram.to_string()));
		}
		check_order(order)?;

		Ok(Self { language: model.language, order, absolute_frequencies: NgramCounts::new(), relative_frequencies })
	}

	/// Serializes the relative frequencies, grouped by exact value.
	pub fn to_json(&self) -> Result<String> {
		JsonLanguageModel::from_relative_frequencies(self.language, &self.relative_frequencies).to_json()
	}

	pub fn language(&self) -> Language {
		self.language
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn absolute_frequencies(&self) -> &NgramCounts {
		&self.absolute_frequencies
	}

	pub fn relative_frequencies(&self) -> &BTreeMap<Ngram, ExactFraction> {
		&self.relative_frequencies
	}

	/// Relative frequency of `ngram` as a float, 0 if unseen.
	pub fn relative_frequency(&self, ngram: &Ngram) -> f64 {
		self.relative_frequencies.get(ngram).map_or(0.0, ExactFraction::to_f64)
	}
}

fn check_order(order: usize) -> Result<()> {
	if !(1..=MAX_NGRAM_ORDER).contains(&order) {
		return Err(LanguageError::InvalidNgramOrder(order));
	}
	Ok(())
}

/// Compiles the window filter for a character class body.
pub(crate) fn char_class_regex(char_class: &str) -> Result<Regex> {
	Regex::new(&format!(r"^[{}]+$", char_class)).map_err(|e| LanguageError::InvalidCharClass {
		class: char_class.to_owned(),
		message: e.to_string(),
	})
}

/// Counts the windows of `order` characters of every lowercased line that
/// match `char_class`.
///
/// Lines are split into chunks that are counted on their own thread, then
/// the partial counts are merged.
pub fn count_ngrams(lines: &[String], order: usize, char_class: &str) -> Result<NgramCounts> {
	check_order(order)?;
	let regex = char_class_regex(char_class)?;
	if lines.is_empty() {
		return Ok(NgramCounts::new());
	}

	let cpus = num_cpus::get();
	let factor = 4;
	let chunks = cpus * factor;
	let chunk_size = lines.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	let mut workers = Vec::new();
	for chunk in lines.chunks(chunk_size) {
		let tx = tx.clone();
		let chunk: Vec<String> = chunk.to_vec();
		let regex = regex.clone();

		workers.push(thread::spawn(move || {
			let mut partial_counts: HashMap<String, u64> = HashMap::new();
			for line in &chunk {
				count_line(line, order, &regex, &mut partial_counts);
			}
			// the receiver outlives every worker
			let _ = tx.send(partial_counts);
		}));
	}
	drop(tx);

	let mut merged: HashMap<String, u64> = HashMap::new();
	for partial_counts in rx.iter() {
		for (ngram, count) in partial_counts {
			*merged.entry(ngram).or_insert(0) += count;
		}
	}
	for worker in workers {
		worker
			.join()
			.map_err(|_| LanguageError::InvalidInput("ngram counting worker panicked".to_owned()))?;
	}

	let mut counts = NgramCounts::new();
	for (value, count) in merged {
		counts.insert(Ngram::new(&value)?, count);
	}

	debug!(order, lines = lines.len(), distinct = counts.len(), "ngrams counted");
	Ok(counts)
}

fn count_line(line: &str, order: usize, regex: &Regex, counts: &mut HashMap<String, u64>) {
	let chars: Vec<char> = line.chars().flat_map(char::to_lowercase).collect();
	if chars.len() < order {
		return;
	}

	let mut window = String::with_capacity(order * 4);
	for slice in chars.windows(order) {
		window.clear();
		window.extend(slice);
		if regex.is_match(&window) {
			*counts.entry(window.clone()).or_insert(0) += 1;
		}
	}
}

fn compute_relative_frequencies(
	order: usize,
	absolute_frequencies: &NgramCounts,
	lower_order_counts: &NgramCounts,
) -> Result<BTreeMap<Ngram, ExactFraction>> {
	let total = absolute_frequencies
		.values()
		.try_fold(0u64, |sum, count| sum.checked_add(*count))
		.ok_or_else(|| FractionError::Overflow("total ngram count".to_owned()))?;
	let total = to_i64(total)?;

	let mut relative_frequencies = BTreeMap::new();
	for (ngram, count) in absolute_frequencies {
		let denominator = if order == 1 || lower_order_counts.is_empty() {
			total
		} else {
			let prefix = ngram
				.decrement()
				.ok_or_else(|| LanguageError::InvalidNgram(ngram.to_string()))?;
			let prefix_count = lower_order_counts
				.get(&prefix)
				.ok_or_else(|| LanguageError::MissingLowerOrderNgram(prefix.to_string()))?;
			to_i64(*prefix_count)?
		};
		relative_frequencies.insert(ngram.clone(), ExactFraction::new(to_i64(*count)?, denominator)?);
	}

	Ok(relative_frequencies)
}

fn to_i64(count: u64) -> Result<i64> {
	i64::try_from(count).map_err(|_| LanguageError::from(FractionError::Overflow(format!("count {} exceeds i64", count))))
}
