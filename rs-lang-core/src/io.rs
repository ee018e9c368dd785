use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Builds a sibling path of `input_path` with another extension.
///
/// Example:
/// `corpus/english.txt` + `"bin"` → `corpus/english.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Ensures `path` is an absolute path to an existing regular file.
pub(crate) fn check_input_file<P: AsRef<Path>>(path: P) -> io::Result<()> {
	let path = path.as_ref();
	if !path.is_absolute() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Input file path '{}' is not absolute", path.display()),
		));
	}
	let metadata = fs::metadata(path).map_err(|e| {
		io::Error::new(e.kind(), format!("Input file '{}' does not exist", path.display()))
	})?;
	if !metadata.is_file() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Input file path '{}' does not represent a regular file", path.display()),
		));
	}
	Ok(())
}

/// Ensures `path` is an absolute path to an existing directory.
pub(crate) fn check_output_directory<P: AsRef<Path>>(path: P) -> io::Result<()> {
	let path = path.as_ref();
	if !path.is_absolute() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Output directory path '{}' is not absolute", path.display()),
		));
	}
	let metadata = fs::metadata(path).map_err(|e| {
		io::Error::new(e.kind(), format!("Output directory '{}' does not exist", path.display()))
	})?;
	if !metadata.is_dir() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Output directory path '{}' does not represent a directory", path.display()),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_build_output_path() {
		let path = build_output_path("corpus/english.txt", "bin").unwrap();
		assert_eq!(path, PathBuf::from("corpus/english.bin"));
		assert!(build_output_path("/", "bin").is_err());
	}

	#[test]
	fn test_read_file_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("lines.txt");
		fs::write(&path, "first\r\nsecond\nthird").unwrap();
		assert_eq!(read_file(&path).unwrap(), vec!["first", "second", "third"]);
	}

	#[test]
	fn test_path_checks() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("corpus.txt");
		fs::write(&file, "text").unwrap();

		assert!(check_input_file(&file).is_ok());
		assert!(check_input_file("relative.txt").is_err());
		assert!(check_input_file(dir.path()).is_err());
		assert!(check_input_file(dir.path().join("missing.txt")).is_err());

		assert!(check_output_directory(dir.path()).is_ok());
		assert!(check_output_directory(&file).is_err());
		assert!(check_output_directory("relative").is_err());
		assert!(check_output_directory(dir.path().join("missing")).is_err());
	}
}
