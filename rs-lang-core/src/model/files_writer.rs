use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::language::Language;
use super::ngram::MAX_NGRAM_ORDER;
use super::resource::resource_file_name;
use super::training::{NgramCounts, TrainingDataLanguageModel, count_ngrams};
use crate::error::Result;
use crate::io::{build_output_path, check_input_file, check_output_directory, read_file};

/// Absolute counts of every order for one corpus, cached next to it.
///
/// The snapshot is only reused when it was computed with the same character
/// class from a corpus of the same byte length.
#[derive(Serialize, Deserialize, Debug)]
struct CountsSnapshot {
	char_class: String,
	source_len: u64,
	counts: Vec<NgramCounts>,
}

/// Writes the five per-order resources of a language from a corpus file.
pub struct LanguageModelFilesWriter;

impl LanguageModelFilesWriter {
	/// Creates the language model files of `language` from `input_file` and
	/// writes them to `output_directory/<iso639-1>/`.
	///
	/// - `input_file`: absolute path to a UTF-8 text file, one sentence per line
	/// - `output_directory`: absolute path to an existing directory
	/// - `char_class`: body of a regex character class restricting the
	///   characters models are built from (see [`super::training::DEFAULT_CHAR_CLASS`])
	///
	/// Counting is the expensive step, so the counts are cached as a postcard
	/// binary beside the input (`<stem>.bin`) and reused on later runs.
	///
	/// # Returns
	/// The directory the five files were written to.
	///
	/// # Errors
	/// Fails on invalid paths or character class, I/O failures and counts
	/// too large for exact arithmetic.
	pub fn create_and_write_language_model_files<PI, PO>(
		input_file: PI,
		output_directory: PO,
		language: Language,
		char_class: &str,
	) -> Result<PathBuf>
	where
		PI: AsRef<Path>,
		PO: AsRef<Path>,
	{
		check_input_file(&input_file)?;
		check_output_directory(&output_directory)?;

		let counts = Self::load_or_count(&input_file, char_class)?;

		let language_directory = output_directory.as_ref().join(language.iso_code_639_1());
		fs::create_dir_all(&language_directory)?;

		let empty = NgramCounts::new();
		for order in 1..=MAX_NGRAM_ORDER {
			let lower_order_counts = if order == 1 { &empty } else { &counts[order - 2] };
			let model = TrainingDataLanguageModel::from_counts(
				language,
				order,
				counts[order - 1].clone(),
				lower_order_counts,
			)?;

			let path = language_directory.join(resource_file_name(order)?);
			fs::write(&path, model.to_json()?)?;
			debug!(%language, order, ngrams = model.relative_frequencies().len(), path = %path.display(), "model file written");
		}

		info!(%language, directory = %language_directory.display(), "language model files written");
		Ok(language_directory)
	}

	fn load_or_count<P: AsRef<Path>>(input_file: P, char_class: &str) -> Result<Vec<NgramCounts>> {
		let snapshot_path = build_output_path(&input_file, "bin")?;
		let source_len = fs::metadata(&input_file)?.len();

		if snapshot_path.exists() {
			match Self::read_snapshot(&snapshot_path) {
				Ok(snapshot)
					if snapshot.char_class == char_class
						&& snapshot.source_len == source_len
						&& snapshot.counts.len() == MAX_NGRAM_ORDER =>
				{
					debug!(path = %snapshot_path.display(), "reusing ngram counts snapshot");
					return Ok(snapshot.counts);
				}
				Ok(_) => debug!(path = %snapshot_path.display(), "stale ngram counts snapshot"),
				Err(e) => warn!(path = %snapshot_path.display(), error = %e, "unreadable ngram counts snapshot"),
			}
		}

		let lines = read_file(&input_file)?;
		let counts = (1..=MAX_NGRAM_ORDER)
			.map(|order| count_ngrams(&lines, order, char_class))
			.collect::<Result<Vec<_>>>()?;

		let snapshot = CountsSnapshot { char_class: char_class.to_owned(), source_len, counts };
		let bytes = postcard::to_stdvec(&snapshot)?;
		fs::write(&snapshot_path, bytes)?;

		Ok(snapshot.counts)
	}

	fn read_snapshot(path: &Path) -> Result<CountsSnapshot> {
		let bytes = fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::LanguageError;
	use crate::model::fraction::ExactFraction;
	use crate::model::resource::JsonLanguageModel;

	const CORPUS: &str = "These sentences are intended for testing purposes.\n\
		Do not use them in production!\n\
		By the way, they consist of 23 words in total.\n";

	fn corpus_file(dir: &Path) -> PathBuf {
		let path = dir.join("english.txt");
		fs::write(&path, CORPUS).unwrap();
		path
	}

	#[test]
	fn test_writes_five_resources() {
		let dir = tempfile::tempdir().unwrap();
		let input = corpus_file(dir.path());
		let output = dir.path().join("models");
		fs::create_dir(&output).unwrap();

		let written = LanguageModelFilesWriter::create_and_write_language_model_files(
			&input,
			&output,
			Language::English,
			r"\p{L}&&\p{Latin}",
		)
		.unwrap();
		assert_eq!(written, output.join("en"));

		for (order, name) in ["unigrams", "bigrams", "trigrams", "quadrigrams", "fivegrams"].iter().enumerate() {
			let bytes = fs::read(written.join(format!("{}.json", name))).unwrap();
			let model = JsonLanguageModel::from_json(&bytes).unwrap();
			assert_eq!(model.language, Language::English);
			assert!(model.entries().all(|(ngram, _)| ngram.chars().count() == order + 1));
		}

		let unigrams = JsonLanguageModel::from_json(&fs::read(written.join("unigrams.json")).unwrap()).unwrap();
		let thirteen_percent = ExactFraction::new(13, 100).unwrap();
		assert_eq!(unigrams.ngrams[&thirteen_percent], "t");
		assert!(input.with_extension("bin").exists());
	}

	#[test]
	fn test_reuses_counts_snapshot() {
		let dir = tempfile::tempdir().unwrap();
		let input = corpus_file(dir.path());

		let first = LanguageModelFilesWriter::load_or_count(&input, r"\p{L}").unwrap();
		let snapshot = input.with_extension("bin");
		let written = fs::metadata(&snapshot).unwrap().modified().unwrap();

		let second = LanguageModelFilesWriter::load_or_count(&input, r"\p{L}").unwrap();
		assert_eq!(first, second);
		assert_eq!(fs::metadata(&snapshot).unwrap().modified().unwrap(), written);

		// another char class invalidates the snapshot
		let latin = LanguageModelFilesWriter::load_or_count(&input, r"\p{L}&&\p{Latin}").unwrap();
		assert_eq!(latin[0].len(), first[0].len());
	}

	#[test]
	fn test_corrupt_snapshot_is_recomputed() {
		let dir = tempfile::tempdir().unwrap();
		let input = corpus_file(dir.path());
		fs::write(input.with_extension("bin"), b"\xff\xff\xff").unwrap();

		let counts = LanguageModelFilesWriter::load_or_count(&input, r"\p{L}").unwrap();
		assert_eq!(counts.len(), MAX_NGRAM_ORDER);
		assert_eq!(counts[0].values().sum::<u64>(), 100);
	}

	#[test]
	fn test_rejects_invalid_paths() {
		let dir = tempfile::tempdir().unwrap();
		let input = corpus_file(dir.path());

		let relative = LanguageModelFilesWriter::create_and_write_language_model_files(
			"english.txt",
			dir.path(),
			Language::English,
			r"\p{L}",
		);
		assert!(matches!(relative, Err(LanguageError::Io(_))));

		let not_a_directory =
			LanguageModelFilesWriter::create_and_write_language_model_files(&input, &input, Language::English, r"\p{L}");
		assert!(matches!(not_a_directory, Err(LanguageError::Io(_))));
	}
}
