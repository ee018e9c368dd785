use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::fraction::ExactFraction;
use super::frequency_store::FrequencyStore;
use super::language::Language;
use super::ngram::Ngram;
use crate::error::{LanguageError, Result};

/// File name of the resource holding ngrams of `order`, e.g. `trigrams.json`.
pub fn resource_file_name(order: usize) -> Result<String> {
	let name = Ngram::order_name(order).ok_or(LanguageError::InvalidNgramOrder(order))?;
	Ok(format!("{}s.json", name))
}

/// Key of a resource relative to the model root, e.g. `de/trigrams.json`.
pub fn resource_key(language: Language, order: usize) -> Result<String> {
	Ok(format!("{}/{}", language.iso_code_639_1(), resource_file_name(order)?))
}

/// On-disk form of one (language, order) model.
///
/// Ngrams sharing the exact same relative frequency are grouped under one
/// `"numerator/denominator"` key, separated by single spaces:
///
/// ```json
/// {"language":"ENGLISH","ngrams":{"1/100":"a","3/100":"t"}}
/// ```
///
/// Keys naming the same value (`"1/2"` and `"2/4"`) are merged on reading.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JsonLanguageModel {
	pub language: Language,
	#[serde(deserialize_with = "merge_frequency_groups")]
	pub ngrams: BTreeMap<ExactFraction, String>,
}

impl JsonLanguageModel {
	/// Groups relative frequencies by their exact value.
	pub fn from_relative_frequencies(language: Language, frequencies: &BTreeMap<Ngram, ExactFraction>) -> Self {
		let mut groups: BTreeMap<ExactFraction, Vec<&str>> = BTreeMap::new();
		for (ngram, fraction) in frequencies {
			groups.entry(*fraction).or_default().push(ngram.value());
		}

		let ngrams = groups
			.into_iter()
			.map(|(fraction, ngrams)| (fraction, ngrams.join(" ")))
			.collect();

		Self { language, ngrams }
	}

	pub fn from_json(bytes: &[u8]) -> Result<Self> {
		Ok(serde_json::from_slice(bytes)?)
	}

	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Expands every group into `(ngram, fraction)` pairs.
	///
	/// Empty group members (doubled or trailing separators) are skipped.
	pub fn entries(&self) -> impl Iterator<Item = (&str, ExactFraction)> {
		self.ngrams
			.iter()
			.flat_map(|(fraction, ngrams)| ngrams.split(' ').filter(|ngram| !ngram.is_empty()).map(move |ngram| (ngram, *fraction)))
	}

	/// Expands the groups into a frequency store of the given order.
	///
	/// # Errors
	/// Fails if the order is invalid or an ngram does not have `order` characters.
	pub fn to_frequency_store(&self, order: usize) -> Result<FrequencyStore> {
		let mut builder = FrequencyStore::builder(order)?;
		for (ngram, fraction) in self.entries() {
			builder.insert(ngram, fraction.to_f64())?;
		}
		Ok(builder.build())
	}
}

fn merge_frequency_groups<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<ExactFraction, String>, D::Error>
where
	D: Deserializer<'de>,
{
	struct GroupsVisitor;

	impl<'de> Visitor<'de> for GroupsVisitor {
		type Value = BTreeMap<ExactFraction, String>;

		fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str("a map from fractions to space-separated ngrams")
		}

		fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
			let mut groups = BTreeMap::new();
			while let Some((fraction, ngrams)) = map.next_entry::<ExactFraction, String>()? {
				match groups.entry(fraction) {
					Entry::Vacant(entry) => {
						entry.insert(ngrams);
					}
					Entry::Occupied(mut entry) => {
						let group: &mut String = entry.get_mut();
						group.push(' ');
						group.push_str(&ngrams);
					}
				}
			}
			Ok(groups)
		}
	}

	deserializer.deserialize_map(GroupsVisitor)
}

#[cfg(test)]
mod tests {
	use super::*;

	const UNIGRAMS: &str = r#"{"language":"ENGLISH","ngrams":{"1/100":"a","1/50":"l","3/100":"t e"}}"#;

	fn fraction(numerator: i64, denominator: i64) -> ExactFraction {
		ExactFraction::new(numerator, denominator).unwrap()
	}

	#[test]
	fn test_resource_names() {
		assert_eq!(resource_file_name(1).unwrap(), "unigrams.json");
		assert_eq!(resource_file_name(4).unwrap(), "quadrigrams.json");
		assert_eq!(resource_key(Language::German, 3).unwrap(), "de/trigrams.json");
		assert!(matches!(resource_key(Language::German, 0), Err(LanguageError::InvalidNgramOrder(0))));
	}

	#[test]
	fn test_parse_and_expand() {
		let model = JsonLanguageModel::from_json(UNIGRAMS.as_bytes()).unwrap();
		assert_eq!(model.language, Language::English);
		assert_eq!(model.entries().count(), 4);

		let store = model.to_frequency_store(1).unwrap();
		assert_eq!(store.len(), 4);
		assert_eq!(store.get("a"), 0.01);
		assert_eq!(store.get("l"), 0.02);
		assert_eq!(store.get("e"), 0.03);
		assert_eq!(store.get("x"), 0.0);
	}

	#[test]
	fn test_grouping_by_exact_fraction() {
		let mut frequencies = BTreeMap::new();
		frequencies.insert(Ngram::new("al").unwrap(), fraction(1, 2));
		frequencies.insert(Ngram::new("te").unwrap(), fraction(2, 4));
		frequencies.insert(Ngram::new("er").unwrap(), fraction(1, 3));

		let model = JsonLanguageModel::from_relative_frequencies(Language::German, &frequencies);
		assert_eq!(model.ngrams.len(), 2);
		assert_eq!(model.ngrams[&fraction(1, 2)], "al te");
		assert_eq!(
			model.to_json().unwrap(),
			r#"{"language":"GERMAN","ngrams":{"1/3":"er","1/2":"al te"}}"#
		);
	}

	#[test]
	fn test_equal_fractions_are_merged_on_reading() {
		let json = r#"{"language":"ENGLISH","ngrams":{"1/2":"a b","2/4":"c","1/4":"d"}}"#;
		let model = JsonLanguageModel::from_json(json.as_bytes()).unwrap();
		assert_eq!(model.ngrams.len(), 2);
		assert_eq!(model.ngrams[&fraction(1, 2)], "a b c");

		let store = model.to_frequency_store(1).unwrap();
		assert_eq!(store.len(), 4);
		assert_eq!(store.get("a"), 0.5);
		assert_eq!(store.get("c"), 0.5);
		assert_eq!(store.get("d"), 0.25);
	}

	#[test]
	fn test_rejects_wrong_order_and_bad_input() {
		let model = JsonLanguageModel::from_json(UNIGRAMS.as_bytes()).unwrap();
		assert!(matches!(model.to_frequency_store(2), Err(LanguageError::InvalidNgram(_))));
		assert!(matches!(JsonLanguageModel::from_json(b"{not json"), Err(LanguageError::Json(_))));
		assert!(JsonLanguageModel::from_json(br#"{"language":"ENGLISH","ngrams":{"1/0":"a"}}"#).is_err());
	}
}
