use std::fmt;

use serde::{Deserialize, Serialize};

use super::alphabet::Alphabet;

/// The detectable languages.
///
/// Each variant carries compiled-in constant data: its ISO 639-1 and
/// ISO 639-3 codes, the alphabets it is written in and, for some languages,
/// characters that no other supported language uses.
///
/// The derived ordering (declaration order) is the fixed total order used
/// to break ties between equally confident languages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
	Afrikaans,
	Albanian,
	Amharic,
	Arabic,
	Armenian,
	Azerbaijani,
	Basque,
	Belarusian,
	Bengali,
	Bokmal,
	Bosnian,
	Bulgarian,
	Catalan,
	Chinese,
	Croatian,
	Czech,
	Danish,
	Dutch,
	English,
	Esperanto,
	Estonian,
	Finnish,
	French,
	Ganda,
	Georgian,
	German,
	Greek,
	Gujarati,
	Hebrew,
	Hindi,
	Hungarian,
	Icelandic,
	Indonesian,
	Irish,
	Italian,
	Japanese,
	Kazakh,
	Korean,
	Latin,
	Latvian,
	Lithuanian,
	Macedonian,
	Malay,
	Maori,
	Marathi,
	Mongolian,
	Nynorsk,
	Oromo,
	Persian,
	Polish,
	Portuguese,
	Punjabi,
	Romanian,
	Russian,
	Serbian,
	Shona,
	Sinhala,
	Slovak,
	Slovene,
	Somali,
	Sotho,
	Spanish,
	Swahili,
	Swedish,
	Tagalog,
	Tamil,
	Telugu,
	Thai,
	Tigrinya,
	Tsonga,
	Tswana,
	Turkish,
	Ukrainian,
	Urdu,
	Vietnamese,
	Welsh,
	Xhosa,
	Yoruba,
	Zulu,
}

use Language::*;

const ALL_LANGUAGES: [Language; 79] = [
	Afrikaans, Albanian, Amharic, Arabic, Armenian, Azerbaijani, Basque, Belarusian, Bengali,
	Bokmal, Bosnian, Bulgarian, Catalan, Chinese, Croatian, Czech, Danish, Dutch, English,
	Esperanto, Estonian, Finnish, French, Ganda, Georgian, German, Greek, Gujarati, Hebrew,
	Hindi, Hungarian, Icelandic, Indonesian, Irish, Italian, Japanese, Kazakh, Korean, Latin,
	Latvian, Lithuanian, Macedonian, Malay, Maori, Marathi, Mongolian, Nynorsk, Oromo, Persian,
	Polish, Portuguese, Punjabi, Romanian, Russian, Serbian, Shona, Sinhala, Slovak, Slovene,
	Somali, Sotho, Spanish, Swahili, Swedish, Tagalog, Tamil, Telugu, Thai, Tigrinya, Tsonga,
	Tswana, Turkish, Ukrainian, Urdu, Vietnamese, Welsh, Xhosa, Yoruba, Zulu,
];

const LATIN_ONLY: &[Alphabet] = &[Alphabet::Latin];
const CYRILLIC_ONLY: &[Alphabet] = &[Alphabet::Cyrillic];
const ARABIC_ONLY: &[Alphabet] = &[Alphabet::Arabic];
const DEVANAGARI_ONLY: &[Alphabet] = &[Alphabet::Devanagari];
const ETHIOPIC_ONLY: &[Alphabet] = &[Alphabet::Ethiopic];

/// Constant per-language record: (ISO 639-1, ISO 639-3, alphabets, unique characters).
type LanguageData = (&'static str, &'static str, &'static [Alphabet], &'static str);

impl Language {
	fn data(self) -> LanguageData {
		match self {
			Afrikaans => ("af", "afr", LATIN_ONLY, ""),
			Albanian => ("sq", "sqi", LATIN_ONLY, ""),
			Amharic => ("am", "amh", ETHIOPIC_ONLY, ""),
			Arabic => ("ar", "ara", ARABIC_ONLY, ""),
			Armenian => ("hy", "hye", &[Alphabet::Armenian], ""),
			Azerbaijani => ("az", "aze", LATIN_ONLY, "Əə"),
			Basque => ("eu", "eus", LATIN_ONLY, ""),
			Belarusian => ("be", "bel", CYRILLIC_ONLY, ""),
			Bengali => ("bn", "ben", &[Alphabet::Bengali], ""),
			Bokmal => ("nb", "nob", LATIN_ONLY, ""),
			Bosnian => ("bs", "bos", LATIN_ONLY, ""),
			Bulgarian => ("bg", "bul", CYRILLIC_ONLY, ""),
			Catalan => ("ca", "cat", LATIN_ONLY, "Ïï"),
			Chinese => ("zh", "zho", &[Alphabet::Han], ""),
			Croatian => ("hr", "hrv", LATIN_ONLY, ""),
			Czech => ("cs", "ces", LATIN_ONLY, "ĚěŘřŮů"),
			Danish => ("da", "dan", LATIN_ONLY, ""),
			Dutch => ("nl", "nld", LATIN_ONLY, ""),
			English => ("en", "eng", LATIN_ONLY, ""),
			Esperanto => ("eo", "epo", LATIN_ONLY, "ĈĉĜĝĤĥĴĵŜŝŬŭ"),
			Estonian => ("et", "est", LATIN_ONLY, ""),
			Finnish => ("fi", "fin", LATIN_ONLY, ""),
			French => ("fr", "fra", LATIN_ONLY, ""),
			Ganda => ("lg", "lug", LATIN_ONLY, ""),
			Georgian => ("ka", "kat", &[Alphabet::Georgian], ""),
			German => ("de", "deu", LATIN_ONLY, "ß"),
			Greek => ("el", "ell", &[Alphabet::Greek], ""),
			Gujarati => ("gu", "guj", &[Alphabet::Gujarati], ""),
			Hebrew => ("he", "heb", &[Alphabet::Hebrew], ""),
			Hindi => ("hi", "hin", DEVANAGARI_ONLY, ""),
			Hungarian => ("hu", "hun", LATIN_ONLY, "ŐőŰű"),
			Icelandic => ("is", "isl", LATIN_ONLY, ""),
			Indonesian => ("id", "ind", LATIN_ONLY, ""),
			Irish => ("ga", "gle", LATIN_ONLY, ""),
			Italian => ("it", "ita", LATIN_ONLY, ""),
			Japanese => (
				"ja",
				"jpn",
				&[Alphabet::Hiragana, Alphabet::Katakana, Alphabet::Han],
				"",
			),
			Kazakh => ("kk", "kaz", CYRILLIC_ONLY, "ӘәҒғҚқҢңҰұ"),
			Korean => ("ko", "kor", &[Alphabet::Hangul], ""),
			Latin => ("la", "lat", LATIN_ONLY, ""),
			Latvian => ("lv", "lav", LATIN_ONLY, "ĢģĶķĻļŅņ"),
			Lithuanian => ("lt", "lit", LATIN_ONLY, "ĖėĮįŲų"),
			Macedonian => ("mk", "mkd", CYRILLIC_ONLY, "ЃѓЅѕЌќЏџ"),
			Malay => ("ms", "msa", LATIN_ONLY, ""),
			Maori => ("mi", "mri", LATIN_ONLY, ""),
			Marathi => ("mr", "mar", DEVANAGARI_ONLY, "ळ"),
			Mongolian => ("mn", "mon", CYRILLIC_ONLY, "ӨөҮү"),
			Nynorsk => ("nn", "nno", LATIN_ONLY, ""),
			Oromo => ("om", "orm", LATIN_ONLY, ""),
			Persian => ("fa", "fas", ARABIC_ONLY, ""),
			Polish => ("pl", "pol", LATIN_ONLY, "ŁłŃńŚśŹź"),
			Portuguese => ("pt", "por", LATIN_ONLY, ""),
			Punjabi => ("pa", "pan", &[Alphabet::Gurmukhi], ""),
			Romanian => ("ro", "ron", LATIN_ONLY, "Țţ"),
			Russian => ("ru", "rus", CYRILLIC_ONLY, ""),
			Serbian => ("sr", "srp", CYRILLIC_ONLY, "ЂђЋћ"),
			Shona => ("sn", "sna", LATIN_ONLY, ""),
			Sinhala => ("si", "sin", &[Alphabet::Sinhala], ""),
			Slovak => ("sk", "slk", LATIN_ONLY, "ĹĺĽľŔŕ"),
			Slovene => ("sl", "slv", LATIN_ONLY, ""),
			Somali => ("so", "som", LATIN_ONLY, ""),
			Sotho => ("st", "sot", LATIN_ONLY, ""),
			Spanish => ("es", "spa", LATIN_ONLY, "¿¡"),
			Swahili => ("sw", "swa", LATIN_ONLY, ""),
			Swedish => ("sv", "swe", LATIN_ONLY, ""),
			Tagalog => ("tl", "tgl", LATIN_ONLY, ""),
			Tamil => ("ta", "tam", &[Alphabet::Tamil], ""),
			Telugu => ("te", "tel", &[Alphabet::Telugu], ""),
			Thai => ("th", "tha", &[Alphabet::Thai], ""),
			Tigrinya => ("ti", "tir", ETHIOPIC_ONLY, ""),
			Tsonga => ("ts", "tso", LATIN_ONLY, ""),
			Tswana => ("tn", "tsn", LATIN_ONLY, ""),
			Turkish => ("tr", "tur", LATIN_ONLY, ""),
			Ukrainian => ("uk", "ukr", CYRILLIC_ONLY, "ҐґЄєЇї"),
			Urdu => ("ur", "urd", ARABIC_ONLY, ""),
			Vietnamese => (
				"vi",
				"vie",
				LATIN_ONLY,
				"ẰằẦầẲẳẨẩẴẵẪẫẮắẤấẠạẶặẬậỀềẺẻỂểẼẽỄễẾếỆệỈỉĨĩỊịƠơỒồỜờỎỏỔổỞởỖỗỠỡỐốỚớỘộỢợƯưỪừỦủỬửŨũỮữỨứỤụỰựỲỳỶỷỸỹỴỵ",
			),
			Welsh => ("cy", "cym", LATIN_ONLY, ""),
			Xhosa => ("xh", "xho", LATIN_ONLY, ""),
			Yoruba => ("yo", "yor", LATIN_ONLY, "Ṣṣ"),
			Zulu => ("zu", "zul", LATIN_ONLY, ""),
		}
	}

	/// Two-letter ISO 639-1 code, lowercase.
	pub fn iso_code_639_1(self) -> &'static str {
		self.data().0
	}

	/// Three-letter ISO 639-3 code, lowercase.
	pub fn iso_code_639_3(self) -> &'static str {
		self.data().1
	}

	/// Alphabets this language is written in.
	pub fn alphabets(self) -> &'static [Alphabet] {
		self.data().2
	}

	/// Characters used by no other supported language (may be empty).
	pub fn unique_characters(self) -> &'static str {
		self.data().3
	}

	/// Every supported language, in declaration order.
	pub fn all() -> impl Iterator<Item = Language> {
		ALL_LANGUAGES.into_iter()
	}

	/// Every language except Latin, which is no longer spoken.
	pub fn all_spoken_ones() -> impl Iterator<Item = Language> {
		Self::all().filter(|language| *language != Latin)
	}

	/// Languages written in the given alphabet.
	pub fn all_with_alphabet(alphabet: Alphabet) -> impl Iterator<Item = Language> {
		Self::all().filter(move |language| language.alphabets().contains(&alphabet))
	}

	pub fn all_with_latin_script() -> impl Iterator<Item = Language> {
		Self::all_with_alphabet(Alphabet::Latin)
	}

	pub fn all_with_cyrillic_script() -> impl Iterator<Item = Language> {
		Self::all_with_alphabet(Alphabet::Cyrillic)
	}

	pub fn all_with_arabic_script() -> impl Iterator<Item = Language> {
		Self::all_with_alphabet(Alphabet::Arabic)
	}

	pub fn all_with_devanagari_script() -> impl Iterator<Item = Language> {
		Self::all_with_alphabet(Alphabet::Devanagari)
	}

	/// Languages whose (only) alphabet is used by no other language.
	pub fn all_with_single_unique_script() -> impl Iterator<Item = Language> {
		Self::all().filter(|language| {
			language
				.alphabets()
				.iter()
				.any(|alphabet| alphabet.single_language() == Some(*language))
		})
	}

	/// Looks a language up by its ISO 639-1 code (case-insensitive).
	pub fn from_iso_code_639_1(code: &str) -> Option<Language> {
		let code = code.to_lowercase();
		Self::all().find(|language| language.iso_code_639_1() == code)
	}

	/// Looks a language up by its ISO 639-3 code (case-insensitive).
	pub fn from_iso_code_639_3(code: &str) -> Option<Language> {
		let code = code.to_lowercase();
		Self::all().find(|language| language.iso_code_639_3() == code)
	}
}

impl fmt::Display for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}", self)
	}
}
