//! N-gram-based natural language detection library.
//!
//! This crate identifies which of up to 79 natural languages a piece of
//! text is written in:
//! - Rule-based shortcuts on scripts and unique characters
//! - Character n-gram scoring (orders 1 to 5) with backoff
//! - Lazily loaded, shared per-language models
//! - Training of new models from plain-text corpora
//!
//! ```no_run
//! use rs_lang_core::{Language, LanguageDetectorBuilder};
//!
//! let detector = LanguageDetectorBuilder::from_languages(&[Language::English, Language::German])
//!     .with_model_directory("language-models")
//!     .build()?;
//! assert_eq!(detector.detect_language_of("groß"), Some(Language::German));
//! # Ok::<(), rs_lang_core::LanguageError>(())
//! ```

/// Error types shared by every module.
pub mod error;

/// Tracing subscriber initialization for binaries.
pub mod logging;

/// Language data, n-gram models and training.
pub mod model;

/// The detector, its builder and the model cache.
pub mod detector;

/// I/O utilities (file loading, path checks).
///
/// Not exposed
pub(crate) mod io;

pub use detector::cache::{DirectorySource, MemorySource, ModelCache, ModelSource};
pub use detector::{ConfidenceMap, LanguageDetector, LanguageDetectorBuilder};
pub use error::{FractionError, LanguageError, Result};
pub use model::alphabet::Alphabet;
pub use model::files_writer::LanguageModelFilesWriter;
pub use model::language::Language;
pub use model::ngram::Ngram;
