use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::tokens::{END_TOKEN, START_TOKEN, is_special};

/// Runs of sentence-final punctuation.
static SENTENCE_BREAK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence pattern"));

/// Maximal runs of word characters (Unicode aware).
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid word pattern"));

/// Output of the preprocessing pipeline, ready for counting.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PreparedCorpus {
	/// One padded sequence per usable sentence: `[<s>, <s>, t1, ..., tn, </s>]`.
	pub sequences: Vec<Vec<String>>,
	/// Distinct tokens across all usable sentences, special tokens excluded.
	pub vocabulary: HashSet<String>,
}

impl PreparedCorpus {
	pub fn is_empty(&self) -> bool {
		self.sequences.is_empty()
	}
}

/// Splits raw text into sentence-like units.
///
/// - Line breaks are turned into spaces
/// - Splits on runs of `.`, `!` or `?`
/// - Pieces are trimmed, empty ones dropped
pub fn split_into_sentences(text: &str) -> Vec<String> {
	let text = text.replace('\n', " ");
	SENTENCE_BREAK
		.split(&text)
		.map(str::trim)
		.filter(|sentence| !sentence.is_empty())
		.map(str::to_owned)
		.collect()
}

/// Lower-cases a sentence and extracts its word tokens.
///
/// Punctuation and whitespace are dropped, never tokenized.
pub fn tokenize(sentence: &str) -> Vec<String> {
	let sentence = sentence.to_lowercase();
	WORD.find_iter(&sentence).map(|m| m.as_str().to_owned()).collect()
}

/// Union of every token of every sentence, reserved tokens left out.
pub fn build_vocabulary(tokenized: &[Vec<String>]) -> HashSet<String> {
	tokenized
		.iter()
		.flatten()
		.filter(|token| !is_special(token))
		.cloned()
		.collect()
}

/// Wraps a tokenized sentence with two start markers and one end marker.
fn pad(tokens: Vec<String>) -> Vec<String> {
	let mut sequence = Vec::with_capacity(tokens.len() + 3);
	sequence.push(START_TOKEN.to_owned());
	sequence.push(START_TOKEN.to_owned());
	sequence.extend(tokens);
	sequence.push(END_TOKEN.to_owned());
	sequence
}

/// Full pipeline: segment, tokenize, drop empty sentences, build the
/// vocabulary and pad every sentence.
///
/// Text without any usable sentence gives an empty corpus, not an error.
pub fn prepare_sequences(text: &str) -> PreparedCorpus {
	let tokenized: Vec<Vec<String>> = split_into_sentences(text)
		.iter()
		.map(|sentence| tokenize(sentence))
		.filter(|tokens| !tokens.is_empty())
		.collect();

	if tokenized.is_empty() {
		return PreparedCorpus::default();
	}

	let vocabulary = build_vocabulary(&tokenized);
	let sequences = tokenized.into_iter().map(pad).collect();

	PreparedCorpus { sequences, vocabulary }
}
