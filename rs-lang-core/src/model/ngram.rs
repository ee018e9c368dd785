use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LanguageError, Result};

/// Highest supported ngram order.
pub const MAX_NGRAM_ORDER: usize = 5;

/// A contiguous window of 0 to 5 characters.
///
/// Ngrams are ordered by their length first. Values of the same length
/// are ordered lexicographically, so the ordering stays consistent with
/// equality.
///
/// # Invariants
/// - `len` is always in `0..=5`
/// - the zero-length ngram cannot be decremented and ends every backoff chain
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Ngram {
	value: String,
	len: usize,
}

impl Ngram {
	/// Creates a new ngram.
	///
	/// # Errors
	/// Returns an error if `value` is longer than five characters.
	pub fn new(value: &str) -> Result<Self> {
		let len = value.chars().count();
		if len > MAX_NGRAM_ORDER {
			return Err(LanguageError::InvalidNgram(value.to_owned()));
		}
		Ok(Self { value: value.to_owned(), len })
	}

	/// The zero-length sentinel.
	pub fn zerogram() -> Self {
		Self { value: String::new(), len: 0 }
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	/// Number of characters (not bytes).
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the next shorter prefix-ngram (the last character stripped).
	///
	/// Returns `None` for the zero-length ngram.
	pub fn decrement(&self) -> Option<Ngram> {
		if self.len == 0 {
			return None;
		}
		let mut value = self.value.clone();
		value.pop();
		Some(Self { value, len: self.len - 1 })
	}

	/// Iterates over this ngram and every shorter prefix down to length 1.
	///
	/// `"alter"` yields `alter`, `alte`, `alt`, `al`, `a`.
	pub fn lower_order_ngrams(&self) -> LowerOrderNgrams {
		LowerOrderNgrams { current: Some(self.clone()) }
	}

	/// Resource name of an ngram order, e.g. `3 -> "trigram"`.
	pub fn order_name(order: usize) -> Option<&'static str> {
		match order {
			1 => Some("unigram"),
			2 => Some("bigram"),
			3 => Some("trigram"),
			4 => Some("quadrigram"),
			5 => Some("fivegram"),
			_ => None,
		}
	}
}

impl Ord for Ngram {
	fn cmp(&self, other: &Self) -> Ordering {
		self.len.cmp(&other.len).then_with(|| self.value.cmp(&other.value))
	}
}

impl PartialOrd for Ngram {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl fmt::Display for Ngram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.value)
	}
}

impl TryFrom<String> for Ngram {
	type Error = LanguageError;

	fn try_from(value: String) -> Result<Self> {
		Ngram::new(&value)
	}
}

impl From<Ngram> for String {
	fn from(ngram: Ngram) -> Self {
		ngram.value
	}
}

/// Backoff chain produced by [`Ngram::lower_order_ngrams`].
pub struct LowerOrderNgrams {
	current: Option<Ngram>,
}

impl Iterator for LowerOrderNgrams {
	type Item = Ngram;

	fn next(&mut self) -> Option<Ngram> {
		let current = self.current.take().filter(|ngram| !ngram.is_empty())?;
		self.current = current.decrement();
		Some(current)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_length_bounds() {
		assert!(Ngram::new("").is_ok());
		assert!(Ngram::new("äöüßé").is_ok());
		assert!(matches!(Ngram::new("abcdef"), Err(LanguageError::InvalidNgram(_))));
		assert_eq!(Ngram::new("äö").unwrap().len(), 2);
	}

	#[test]
	fn test_decrement() {
		let ngram = Ngram::new("äbc").unwrap();
		let bigram = ngram.decrement().unwrap();
		assert_eq!(bigram.value(), "äb");
		let unigram = bigram.decrement().unwrap();
		let zerogram = unigram.decrement().unwrap();
		assert_eq!(zerogram, Ngram::zerogram());
		assert_eq!(zerogram.decrement(), None);
	}

	#[test]
	fn test_lower_order_ngrams() {
		let values: Vec<String> = Ngram::new("alter")
			.unwrap()
			.lower_order_ngrams()
			.map(String::from)
			.collect();
		assert_eq!(values, vec!["alter", "alte", "alt", "al", "a"]);
		assert_eq!(Ngram::zerogram().lower_order_ngrams().count(), 0);
	}

	#[test]
	fn test_ordering_by_length() {
		let trigram = Ngram::new("zzz").unwrap();
		let quadrigram = Ngram::new("aaaa").unwrap();
		assert!(quadrigram > trigram);
		assert!(Ngram::zerogram() < Ngram::new("a").unwrap());
	}

	#[test]
	fn test_order_names() {
		assert_eq!(Ngram::order_name(1), Some("unigram"));
		assert_eq!(Ngram::order_name(5), Some("fivegram"));
		assert_eq!(Ngram::order_name(0), None);
		assert_eq!(Ngram::order_name(6), None);
	}
}
