use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;

use crate::model::alphabet::Alphabet;
use crate::model::language::Language::{self, *};

/// Clusters of characters each used by only a few supported languages.
const CHARS_TO_LANGUAGES_MAPPING: &[(&str, &[Language])] = &[
	("Ãã", &[Portuguese, Vietnamese]),
	("ĄąĘę", &[Lithuanian, Polish]),
	("Żż", &[Polish, Romanian]),
	("Îî", &[French, Romanian]),
	("Ññ", &[Basque, Spanish]),
	("ŇňŤť", &[Czech, Slovak]),
	("Ăă", &[Romanian, Vietnamese]),
	("İıĞğ", &[Azerbaijani, Turkish]),
	("ЈјЉљЊњ", &[Macedonian, Serbian]),
	("ẸẹỌọ", &[Vietnamese, Yoruba]),
	("ÐðÞþ", &[Icelandic, Turkish]),
	("Ûû", &[French, Hungarian]),
	("Ōō", &[Maori, Yoruba]),
	("ĀāĒēĪī", &[Latvian, Maori, Yoruba]),
	("Şş", &[Azerbaijani, Romanian, Turkish]),
	("Ďď", &[Czech, Romanian, Slovak]),
	("Ćć", &[Bosnian, Croatian, Polish]),
	("Đđ", &[Bosnian, Croatian, Vietnamese]),
	("Іі", &[Belarusian, Kazakh, Ukrainian]),
	("Ìì", &[Italian, Vietnamese, Yoruba]),
	("Øø", &[Bokmal, Danish, Nynorsk]),
	("Ūū", &[Latvian, Lithuanian, Maori, Yoruba]),
	("Ëë", &[Afrikaans, Albanian, Dutch, French]),
	("ÈèÙù", &[French, Italian, Vietnamese, Yoruba]),
	("Êê", &[Afrikaans, French, Portuguese, Vietnamese]),
	("Õõ", &[Estonian, Hungarian, Portuguese, Vietnamese]),
	("Ôô", &[French, Portuguese, Slovak, Vietnamese]),
	("ЁёЫыЭэ", &[Belarusian, Kazakh, Mongolian, Russian]),
	("ЩщЪъ", &[Bulgarian, Kazakh, Mongolian, Russian]),
	("Òò", &[Catalan, Italian, Vietnamese, Yoruba]),
	("Ææ", &[Bokmal, Danish, Icelandic, Nynorsk]),
	("Åå", &[Bokmal, Danish, Nynorsk, Swedish]),
	("Ýý", &[Czech, Icelandic, Slovak, Turkish, Vietnamese]),
	("Ää", &[Estonian, Finnish, German, Slovak, Swedish]),
	("Àà", &[Catalan, French, Italian, Portuguese, Vietnamese]),
	("Ââ", &[French, Portuguese, Romanian, Turkish, Vietnamese]),
	("Üü", &[Azerbaijani, Catalan, Estonian, German, Hungarian, Spanish, Turkish]),
	("ČčŠšŽž", &[Bosnian, Czech, Croatian, Latvian, Lithuanian, Slovak, Slovene]),
	("Çç", &[Albanian, Azerbaijani, Basque, Catalan, French, Portuguese, Turkish]),
	("Öö", &[Azerbaijani, Estonian, Finnish, German, Hungarian, Icelandic, Swedish, Turkish]),
	(
		"Óó",
		&[Catalan, Hungarian, Icelandic, Irish, Polish, Portuguese, Slovak, Spanish, Vietnamese, Yoruba],
	),
	(
		"ÁáÍíÚú",
		&[Catalan, Czech, Icelandic, Irish, Hungarian, Portuguese, Slovak, Spanish, Vietnamese, Yoruba],
	),
	(
		"Éé",
		&[
			Catalan, Czech, French, Hungarian, Icelandic, Irish, Italian, Portuguese, Slovak, Spanish, Vietnamese,
			Yoruba,
		],
	),
];

/// Languages carrying characters no other supported language uses.
static LANGUAGES_WITH_UNIQUE_CHARACTERS: Lazy<Vec<Language>> =
	Lazy::new(|| Language::all().filter(|language| !language.unique_characters().is_empty()).collect());

/// Alphabets whose unique-character tables are consulted per character.
const SHARED_ALPHABETS: [Alphabet; 3] = [Alphabet::Latin, Alphabet::Cyrillic, Alphabet::Devanagari];

/// Tries to decide the language of `words` from their characters alone.
///
/// Each character votes for a language when its alphabet is used by a
/// single language, when it is a Han character (Chinese, or Japanese if the
/// word also holds kana), or when it is unique to one language. A word
/// settles on its clear winner or counts as unknown. Unknown words are
/// ignored unless they make up at least half of the text.
///
/// Returns `None` when the rules are not decisive.
pub(crate) fn detect_language_with_rules(words: &[String], languages: &BTreeSet<Language>) -> Option<Language> {
	let mut total_language_counts: BTreeMap<Option<Language>, usize> = BTreeMap::new();
	let half_word_count = words.len() as f64 * 0.5;

	for word in words {
		let word_language_counts = count_word_languages(word);

		let verdict = match word_language_counts.len() {
			0 => None,
			1 => word_language_counts.keys().next().copied().filter(|language| languages.contains(language)),
			_ => {
				let mut ranked: Vec<(Language, usize)> = word_language_counts.into_iter().collect();
				ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
				let (most_frequent, count) = ranked[0];
				(count > ranked[1].1 && languages.contains(&most_frequent)).then_some(most_frequent)
			}
		};
		*total_language_counts.entry(verdict).or_insert(0) += 1;
	}

	let unknown_count = total_language_counts.get(&None).copied().unwrap_or(0);
	if (unknown_count as f64) < half_word_count {
		total_language_counts.remove(&None);
	}

	match total_language_counts.len() {
		0 => None,
		1 => total_language_counts.into_keys().next().flatten(),
		2 if total_language_counts.contains_key(&Some(Chinese)) && total_language_counts.contains_key(&Some(Japanese)) => {
			Some(Japanese)
		}
		_ => {
			let mut ranked: Vec<(Option<Language>, usize)> = total_language_counts.into_iter().collect();
			ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
			if ranked[0].1 == ranked[1].1 { None } else { ranked[0].0 }
		}
	}
}

fn count_word_languages(word: &str) -> HashMap<Language, usize> {
	let mut counts = HashMap::new();
	let contains_kana = word
		.chars()
		.any(|c| Alphabet::Hiragana.matches_char(c) || Alphabet::Katakana.matches_char(c));

	for c in word.chars() {
		if let Some((_, language)) = Alphabet::all_supporting_single_language().find(|(alphabet, _)| alphabet.matches_char(c)) {
			*counts.entry(language).or_insert(0) += 1;
		} else if Alphabet::Han.matches_char(c) {
			let language = if contains_kana { Japanese } else { Chinese };
			*counts.entry(language).or_insert(0) += 1;
		} else if SHARED_ALPHABETS.iter().any(|alphabet| alphabet.matches_char(c)) {
			for language in LANGUAGES_WITH_UNIQUE_CHARACTERS.iter() {
				if language.unique_characters().contains(c) {
					*counts.entry(*language).or_insert(0) += 1;
				}
			}
		}
	}

	counts
}

/// Narrows the candidate languages of `words`.
///
/// Candidates are restricted to the languages written in the most frequent
/// alphabet, unless no alphabet or no single dominant one is detected. Among
/// those, languages whose signature characters appear at least once per
/// two words are kept; if none qualifies the alphabet-based set is returned.
pub(crate) fn filter_languages_by_rules(words: &[String], languages: &BTreeSet<Language>) -> BTreeSet<Language> {
	let mut detected_alphabets: BTreeMap<Alphabet, usize> = BTreeMap::new();
	for word in words {
		if let Some(alphabet) = Alphabet::detect_word(word) {
			*detected_alphabets.entry(alphabet).or_insert(0) += 1;
		}
	}

	if detected_alphabets.is_empty() {
		return languages.clone();
	}
	if detected_alphabets.len() > 1 {
		let mut distinct_counts: Vec<usize> = detected_alphabets.values().copied().collect();
		distinct_counts.dedup();
		if distinct_counts.len() == 1 {
			return languages.clone();
		}
	}

	// first alphabet in declaration order wins a tie
	let mut most_frequent_alphabet = None;
	let mut highest_count = 0;
	for (alphabet, count) in &detected_alphabets {
		if *count > highest_count {
			most_frequent_alphabet = Some(*alphabet);
			highest_count = *count;
		}
	}
	let Some(most_frequent_alphabet) = most_frequent_alphabet else {
		return languages.clone();
	};

	let filtered_languages: BTreeSet<Language> = languages
		.iter()
		.copied()
		.filter(|language| language.alphabets().contains(&most_frequent_alphabet))
		.collect();

	let mut language_counts: BTreeMap<Language, usize> = BTreeMap::new();
	for word in words {
		for (characters, cluster_languages) in CHARS_TO_LANGUAGES_MAPPING {
			let hits = word.chars().filter(|c| characters.contains(*c)).count();
			if hits == 0 {
				continue;
			}
			for language in cluster_languages.iter().filter(|language| filtered_languages.contains(language)) {
				*language_counts.entry(*language).or_insert(0) += hits;
			}
		}
	}

	let half_word_count = words.len() as f64 * 0.5;
	let languages_subset: BTreeSet<Language> = language_counts
		.into_iter()
		.filter(|(_, count)| *count as f64 >= half_word_count)
		.map(|(language, _)| language)
		.collect();

	if languages_subset.is_empty() { filtered_languages } else { languages_subset }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(text: &str) -> Vec<String> {
		crate::detector::text::split_text_into_words(&crate::detector::text::clean_up_input_text(text))
	}

	fn configured(languages: &[Language]) -> BTreeSet<Language> {
		languages.iter().copied().collect()
	}

	fn everything() -> BTreeSet<Language> {
		Language::all().collect()
	}

	#[test]
	fn test_unique_character_decides() {
		assert_eq!(detect_language_with_rules(&words("groß"), &everything()), Some(German));
		assert_eq!(detect_language_with_rules(&words("Strauß"), &configured(&[English, German])), Some(German));
		assert_eq!(detect_language_with_rules(&words("ґрунт"), &everything()), Some(Ukrainian));
		assert_eq!(detect_language_with_rules(&words("zażółć"), &everything()), Some(Polish));
	}

	#[test]
	fn test_single_language_alphabet_decides() {
		assert_eq!(detect_language_with_rules(&words("σχέδια"), &everything()), Some(Greek));
		assert_eq!(detect_language_with_rules(&words("ਪੰਜਾਬੀ"), &everything()), Some(Punjabi));
		assert_eq!(detect_language_with_rules(&words("한국어"), &everything()), Some(Korean));
	}

	#[test]
	fn test_han_characters() {
		assert_eq!(detect_language_with_rules(&words("上海大学是一个好大学"), &everything()), Some(Chinese));
		assert_eq!(detect_language_with_rules(&words("ひらがなと漢字"), &everything()), Some(Japanese));
		// standalone Han words next to kana words resolve to Japanese
		assert_eq!(detect_language_with_rules(&words("東京 すし"), &everything()), Some(Japanese));
	}

	#[test]
	fn test_language_outside_configuration_is_unknown() {
		assert_eq!(detect_language_with_rules(&words("groß"), &configured(&[English, French])), None);
	}

	#[test]
	fn test_no_rule_applies() {
		assert_eq!(detect_language_with_rules(&words("house"), &everything()), None);
		assert_eq!(detect_language_with_rules(&words("the house groß"), &everything()), None);
		assert_eq!(detect_language_with_rules(&[], &everything()), None);
	}

	#[test]
	fn test_tie_is_undecided() {
		assert_eq!(detect_language_with_rules(&words("groß ґрунт"), &everything()), None);
	}

	#[test]
	fn test_filter_by_alphabet() {
		let candidates = filter_languages_by_rules(&words("сопротивление"), &everything());
		assert!(!candidates.is_empty());
		assert!(candidates.iter().all(|language| language.alphabets().contains(&Alphabet::Cyrillic)));
		assert!(candidates.contains(&Russian));
	}

	#[test]
	fn test_filter_by_character_cluster() {
		let candidates = filter_languages_by_rules(&words("mañana es un día"), &everything());
		assert_eq!(candidates, configured(&[Spanish]));

		let candidates = filter_languages_by_rules(&words("où"), &everything());
		assert_eq!(candidates, configured(&[French, Italian, Vietnamese, Yoruba]));
	}

	#[test]
	fn test_filter_keeps_everything_without_signal() {
		let all = configured(&[English, German, Russian]);
		assert_eq!(filter_languages_by_rules(&words("house дом"), &all), all);
		assert_eq!(filter_languages_by_rules(&words("domдом"), &all), all);
	}

	#[test]
	fn test_filter_falls_back_to_alphabet() {
		let all = configured(&[English, German, Russian]);
		assert_eq!(filter_languages_by_rules(&words("the house"), &all), configured(&[English, German]));
	}
}
