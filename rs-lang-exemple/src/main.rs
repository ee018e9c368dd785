use std::path::PathBuf;

use rs_lang_core::logging::init_tracing;
use rs_lang_core::model::training::DEFAULT_CHAR_CLASS;
use rs_lang_core::{Language, LanguageDetectorBuilder, LanguageError, LanguageModelFilesWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Events are filtered with RUST_LOG (default "info")
    init_tracing();

    // Usage:
    //   rs-lang-exemple                                  detect with ./language-models
    //   rs-lang-exemple train <corpus> <iso> <output>    write the five model files of a language
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("train") {
        return train(&args[1..]);
    }

    // Models are read lazily from $LANGUAGE_MODELS_DIR (or ./language-models)
    // Missing model files only make the detector less accurate
    let detector = LanguageDetectorBuilder::from_languages(&[
        Language::English,
        Language::French,
        Language::German,
        Language::Spanish,
    ])
    .with_minimum_relative_distance(0.05)
    .build()?;
    tracing::info!(languages = detector.languages().len(), "detector ready");

    // A detector needs at least two languages
    match LanguageDetectorBuilder::from_languages(&[Language::English]).build() {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    // Unknown ISO codes are rejected
    match LanguageDetectorBuilder::from_iso_codes_639_1(&["en", "xx"]) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    let texts = [
        "languages are awesome",
        "Die Straße ist groß",
        "Ceci est un texte écrit en français",
        "¿Dónde está la biblioteca?",
        "3<856%)§",
    ];

    // Single texts: the verdict and the full confidence ranking
    for text in &texts {
        let verdict = detector
            .detect_language_of(text)
            .map_or_else(|| "unknown".to_owned(), |language| language.to_string());
        println!("{:<40} -> {}", text, verdict);
        for (language, confidence) in detector.compute_language_confidence_values(text) {
            println!("    {:<10} {:.3}", language, confidence);
        }
    }

    // Many texts at once, detected in parallel
    let verdicts = detector.detect_languages_of(&texts);
    println!("{:?}", verdicts);

    // Release the models of this detector's languages
    detector.unload_language_models();

    Ok(())
}

fn train(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let [corpus, iso, output] = args else {
        return Err("usage: train <corpus> <iso639-1> <output directory>".into());
    };
    let language = Language::from_iso_code_639_1(iso)
        .ok_or_else(|| LanguageError::InvalidInput(format!("unknown ISO code '{}'", iso)))?;

    // Paths must be absolute
    let corpus = std::path::absolute(PathBuf::from(corpus))?;
    let output = std::path::absolute(PathBuf::from(output))?;

    // Counts are cached next to the corpus (<stem>.bin) and reused on later runs
    let directory =
        LanguageModelFilesWriter::create_and_write_language_model_files(&corpus, &output, language, DEFAULT_CHAR_CLASS)?;
    println!("{} models written to {}", language, directory.display());

    Ok(())
}
