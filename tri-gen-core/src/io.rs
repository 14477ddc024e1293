use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a whole training corpus into memory.
///
/// Line breaks are kept; the segmenter turns them into spaces.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/shakespeare.txt"` → `"shakespeare"`
/// - `"shakespeare.txt"` → `"shakespeare"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scratch_dir(name: &str) -> PathBuf {
		let dir = env::temp_dir().join(format!("tri-gen-io-{}-{}", name, std::process::id()));
		let _ = fs::remove_dir_all(&dir);
		fs::create_dir_all(&dir).unwrap();
		dir
	}

	#[test]
	fn test_get_filename() {
		assert_eq!(get_filename("./data/robots.txt").unwrap(), "robots");
		assert_eq!(get_filename("robots.txt").unwrap(), "robots");
		assert!(get_filename("/").is_err());
	}

	#[test]
	fn test_normalize_folder() {
		assert_eq!(normalize_folder("data"), PathBuf::from("data"));
		assert_eq!(normalize_folder("."), env::current_dir().unwrap());
	}

	#[test]
	fn test_list_and_read_corpus() {
		let dir = scratch_dir("list");
		fs::write(dir.join("b.txt"), "Second corpus.").unwrap();
		fs::write(dir.join("a.txt"), "First corpus.\nTwo lines.").unwrap();
		fs::write(dir.join("notes.md"), "ignored").unwrap();
		fs::create_dir(dir.join("nested.txt")).unwrap();

		assert_eq!(list_files(&dir, "txt").unwrap(), vec!["a.txt", "b.txt"]);
		assert_eq!(read_corpus(dir.join("a.txt")).unwrap(), "First corpus.\nTwo lines.");
		assert!(read_corpus(dir.join("missing.txt")).is_err());

		fs::remove_dir_all(&dir).unwrap();
	}
}
