use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::alphabet::is_logogram;
use crate::model::ngram::Ngram;

static PUNCTUATION_AND_NUMBERS: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"[\p{P}\p{N}]").expect("punctuation pattern is valid"));
static MULTIPLE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}").expect("letter pattern is valid"));
static LETTERS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}+$").expect("letters pattern is valid"));

/// Lowercases `text`, removes punctuation and digits, and collapses
/// whitespace runs into single spaces.
pub fn clean_up_input_text(text: &str) -> String {
	let lowercase = text.trim().to_lowercase();
	let stripped = PUNCTUATION_AND_NUMBERS.replace_all(&lowercase, "");
	MULTIPLE_WHITESPACE.replace_all(&stripped, " ").trim().to_owned()
}

/// Returns `true` if `text` contains at least one letter.
pub fn contains_letters(text: &str) -> bool {
	LETTER.is_match(text)
}

/// Splits cleaned text into words.
///
/// Logograms (Han, Hiragana, Katakana, Hangul) always form a word of their
/// own, even inside a run of other characters.
///
/// `"日本語abc"` → `["日", "本", "語", "abc"]`
pub fn split_text_into_words(text: &str) -> Vec<String> {
	let mut words = Vec::new();
	let mut word = String::new();

	for c in text.chars() {
		if c.is_whitespace() || is_logogram(c) {
			if !word.is_empty() {
				words.push(std::mem::take(&mut word));
			}
			if !c.is_whitespace() {
				words.push(c.to_string());
			}
		} else {
			word.push(c);
		}
	}
	if !word.is_empty() {
		words.push(word);
	}

	words
}

/// Distinct ngrams of `order` characters made only of letters, sorted.
///
/// Windows spanning a space or any other non-letter are skipped. Orders
/// outside `1..=5` yield nothing.
pub fn extract_ngrams(text: &str, order: usize) -> BTreeSet<Ngram> {
	let chars: Vec<char> = text.chars().collect();
	if order == 0 || chars.len() < order {
		return BTreeSet::new();
	}

	chars
		.windows(order)
		.map(|window| window.iter().collect::<String>())
		.filter(|window| LETTERS_ONLY.is_match(window))
		.filter_map(|window| Ngram::new(&window).ok())
		.collect()
}
