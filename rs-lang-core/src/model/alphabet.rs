use std::collections::HashMap;

use once_cell::sync::Lazy;
use unicode_script::{Script, UnicodeScript};

use super::language::Language;

/// Writing systems used to narrow down language candidates.
///
/// Membership is decided by the Unicode `Script` property of each
/// character, as reported by `unicode-script`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Alphabet {
	Arabic,
	Armenian,
	Bengali,
	Cyrillic,
	Devanagari,
	Ethiopic,
	Georgian,
	Greek,
	Gujarati,
	Gurmukhi,
	Han,
	Hangul,
	Hebrew,
	Hiragana,
	Katakana,
	Latin,
	Sinhala,
	Tamil,
	Telugu,
	Thai,
}

const ALL_ALPHABETS: [Alphabet; 20] = [
	Alphabet::Arabic,
	Alphabet::Armenian,
	Alphabet::Bengali,
	Alphabet::Cyrillic,
	Alphabet::Devanagari,
	Alphabet::Ethiopic,
	Alphabet::Georgian,
	Alphabet::Greek,
	Alphabet::Gujarati,
	Alphabet::Gurmukhi,
	Alphabet::Han,
	Alphabet::Hangul,
	Alphabet::Hebrew,
	Alphabet::Hiragana,
	Alphabet::Katakana,
	Alphabet::Latin,
	Alphabet::Sinhala,
	Alphabet::Tamil,
	Alphabet::Telugu,
	Alphabet::Thai,
];

/// Alphabets written by exactly one supported language.
static SINGLE_LANGUAGE_ALPHABETS: Lazy<HashMap<Alphabet, Language>> = Lazy::new(|| {
	let mut mapping = HashMap::new();
	for alphabet in ALL_ALPHABETS {
		let mut languages = Language::all_with_alphabet(alphabet);
		if let (Some(language), None) = (languages.next(), languages.next()) {
			mapping.insert(alphabet, language);
		}
	}
	mapping
});

impl Alphabet {
	pub fn all() -> impl Iterator<Item = Alphabet> {
		ALL_ALPHABETS.into_iter()
	}

	fn script(self) -> Script {
		match self {
			Alphabet::Arabic => Script::Arabic,
			Alphabet::Armenian => Script::Armenian,
			Alphabet::Bengali => Script::Bengali,
			Alphabet::Cyrillic => Script::Cyrillic,
			Alphabet::Devanagari => Script::Devanagari,
			Alphabet::Ethiopic => Script::Ethiopic,
			Alphabet::Georgian => Script::Georgian,
			Alphabet::Greek => Script::Greek,
			Alphabet::Gujarati => Script::Gujarati,
			Alphabet::Gurmukhi => Script::Gurmukhi,
			Alphabet::Han => Script::Han,
			Alphabet::Hangul => Script::Hangul,
			Alphabet::Hebrew => Script::Hebrew,
			Alphabet::Hiragana => Script::Hiragana,
			Alphabet::Katakana => Script::Katakana,
			Alphabet::Latin => Script::Latin,
			Alphabet::Sinhala => Script::Sinhala,
			Alphabet::Tamil => Script::Tamil,
			Alphabet::Telugu => Script::Telugu,
			Alphabet::Thai => Script::Thai,
		}
	}

	/// Returns `true` if `c` belongs to this alphabet.
	pub fn matches_char(self, c: char) -> bool {
		c.script() == self.script()
	}

	/// Returns `true` if `word` is non-empty and written exclusively in this alphabet.
	pub fn matches(self, word: &str) -> bool {
		!word.is_empty() && word.chars().all(|c| self.matches_char(c))
	}

	/// The language this alphabet maps to, if exactly one supported language uses it.
	pub fn single_language(self) -> Option<Language> {
		SINGLE_LANGUAGE_ALPHABETS.get(&self).copied()
	}

	/// Alphabets written by exactly one supported language, paired with that language.
	pub fn all_supporting_single_language() -> impl Iterator<Item = (Alphabet, Language)> {
		Self::all().filter_map(|alphabet| alphabet.single_language().map(|language| (alphabet, language)))
	}

	/// Returns the first alphabet (in declaration order) that matches the whole word.
	pub fn detect_word(word: &str) -> Option<Alphabet> {
		Self::all().find(|alphabet| alphabet.matches(word))
	}
}

/// Returns `true` for characters of the scripts used by Chinese, Japanese and Korean.
///
/// Such characters are treated as words of their own when tokenizing.
pub fn is_logogram(c: char) -> bool {
	if c.is_whitespace() {
		return false;
	}
	matches!(c.script(), Script::Han | Script::Hiragana | Script::Katakana | Script::Hangul)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_char_membership() {
		assert!(Alphabet::Latin.matches_char('ß'));
		assert!(Alphabet::Cyrillic.matches_char('ж'));
		assert!(Alphabet::Han.matches_char('語'));
		assert!(Alphabet::Hiragana.matches_char('の'));
		assert!(!Alphabet::Latin.matches_char('1'));
	}

	#[test]
	fn test_word_membership() {
		assert!(Alphabet::Greek.matches("σχέδια"));
		assert!(!Alphabet::Greek.matches("σχέδιαx"));
		assert!(!Alphabet::Latin.matches(""));
		assert_eq!(Alphabet::detect_word("сопротивление"), Some(Alphabet::Cyrillic));
		assert_eq!(Alphabet::detect_word("mixedжword"), None);
	}

	#[test]
	fn test_single_language_alphabets() {
		assert_eq!(Alphabet::Greek.single_language(), Some(Language::Greek));
		assert_eq!(Alphabet::Gurmukhi.single_language(), Some(Language::Punjabi));
		assert_eq!(Alphabet::Hiragana.single_language(), Some(Language::Japanese));
		assert_eq!(Alphabet::Han.single_language(), None);
		assert_eq!(Alphabet::Latin.single_language(), None);
		assert_eq!(Alphabet::Ethiopic.single_language(), None);
	}

	#[test]
	fn test_logograms() {
		assert!(is_logogram('中'));
		assert!(is_logogram('カ'));
		assert!(is_logogram('한'));
		assert!(!is_logogram('a'));
		assert!(!is_logogram(' '));
	}
}
