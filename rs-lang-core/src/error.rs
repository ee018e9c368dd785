//! Error types for the language detection engine.
//!
//! Detection itself never fails for ordinary input: an undecidable text
//! yields `None`. These errors cover configuration, training and resource
//! handling.

use thiserror::Error;

/// Main error type for detector configuration, training and resource I/O.
#[derive(Debug, Error)]
pub enum LanguageError {
	/// Fewer than two candidate languages were configured
	#[error("LanguageDetector needs at least 2 languages to choose from, got {0}")]
	NotEnoughLanguages(usize),

	/// Minimum relative distance outside of `[0.0, 0.99]`
	#[error("minimum relative distance must lie in between 0.0 and 0.99, got {0}")]
	InvalidMinimumRelativeDistance(f64),

	/// Ngram value longer than five characters
	#[error("length of ngram '{0}' is not in range 0..5")]
	InvalidNgram(String),

	/// Ngram order outside of `1..=5`
	#[error("ngram order {0} is not in range 1..5")]
	InvalidNgramOrder(usize),

	/// Character class that cannot be turned into a letter filter
	#[error("invalid character class '{class}': {message}")]
	InvalidCharClass { class: String, message: String },

	/// Lower-order counts do not contain the prefix of a counted ngram
	#[error("lower order counts do not contain prefix '{0}'")]
	MissingLowerOrderNgram(String),

	/// Invalid caller-supplied input (paths, unknown ISO codes, ...)
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	/// Exact fraction arithmetic errors
	#[error(transparent)]
	Fraction(#[from] FractionError),

	/// File I/O errors
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON resource errors
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Binary snapshot errors
	#[error("Serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

/// Errors raised by [`ExactFraction`](crate::model::fraction::ExactFraction).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FractionError {
	#[error("zero denominator in fraction '{numerator}/0'")]
	ZeroDenominator { numerator: i64 },

	#[error("overflow: {0}")]
	Overflow(String),

	#[error("cannot parse fraction from '{0}'")]
	Parse(String),
}

/// Result type alias for detector operations
pub type Result<T> = std::result::Result<T, LanguageError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_display() {
		let err = LanguageError::NotEnoughLanguages(1);
		assert_eq!(
			err.to_string(),
			"LanguageDetector needs at least 2 languages to choose from, got 1"
		);

		let err = LanguageError::from(FractionError::ZeroDenominator { numerator: 3 });
		assert_eq!(err.to_string(), "zero denominator in fraction '3/0'");
	}
}
