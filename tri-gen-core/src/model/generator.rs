use log::{debug, trace};
use rand::Rng;

use super::tokens::Context;
use super::trigram_model::{Sample, TrigramModel};

/// Why a generation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
	/// The model has nothing to generate from.
	Untrained,
	/// The current context was never observed during training.
	UnseenContext,
	/// The end marker was drawn.
	EndOfSentence,
	/// The requested number of tokens was produced.
	MaxLength,
}

/// Tokens produced by one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
	pub tokens: Vec<String>,
	pub stop: StopReason,
}

impl Generation {
	/// Tokens joined with single spaces, or an empty string if there are none.
	pub fn text(&self) -> String {
		self.tokens.join(" ")
	}
}

/// Drives the sampler from the start context until the sentence ends.
///
/// # Phases
/// - Init: an untrained model yields nothing; otherwise the context is `(<s>, <s>)`
/// - Step: sample, stop on an unseen context or the end marker, else append
///   the word and slide the context
/// - Finalize: join the words, empty output gives an empty string
///
/// `max_length` is a hard cap, so a cycle of contexts that never draws
/// the end marker still terminates.
pub struct Generator<'m> {
	model: &'m TrigramModel,
}

impl<'m> Generator<'m> {
	pub fn new(model: &'m TrigramModel) -> Self {
		Self { model }
	}

	/// Generates at most `max_length` tokens.
	pub fn run<R: Rng + ?Sized>(&self, max_length: usize, rng: &mut R) -> Generation {
		let mut tokens: Vec<String> = Vec::new();

		if !self.model.is_trained() {
			return Generation { tokens, stop: StopReason::Untrained };
		}

		let mut context = Context::start();
		let mut stop = StopReason::MaxLength;

		while tokens.len() < max_length {
			match self.model.sample_next(&context, rng) {
				Sample::Unseen => {
					stop = StopReason::UnseenContext;
					break;
				}
				Sample::End => {
					stop = StopReason::EndOfSentence;
					break;
				}
				Sample::Word(word) => {
					trace!("{context} -> {word}");
					tokens.push(word.to_owned());
					context = context.shift(word);
				}
			}
		}

		debug!("Generated {} token(s), stopped on {:?}", tokens.len(), stop);
		Generation { tokens, stop }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::tokens::{END_TOKEN, START_TOKEN};
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn trained(text: &str) -> TrigramModel {
		let mut model = TrigramModel::new();
		model.fit(text);
		model
	}

	#[test]
	fn test_untrained_model_generates_nothing() {
		let model = TrigramModel::new();
		let generation = Generator::new(&model).run(50, &mut StdRng::seed_from_u64(1));
		assert_eq!(generation.stop, StopReason::Untrained);
		assert_eq!(generation.text(), "");
	}

	#[test]
	fn test_stops_on_end_marker() {
		let model = trained("The cat sat.");
		let generation = Generator::new(&model).run(50, &mut StdRng::seed_from_u64(1));
		assert_eq!(generation.tokens, vec!["the", "cat", "sat"]);
		assert_eq!(generation.stop, StopReason::EndOfSentence);
	}

	#[test]
	fn test_stops_on_cap() {
		let model = trained("The cat sat.");
		let generation = Generator::new(&model).run(2, &mut StdRng::seed_from_u64(1));
		assert_eq!(generation.text(), "the cat");
		assert_eq!(generation.stop, StopReason::MaxLength);
	}

	#[test]
	fn test_zero_length() {
		let model = trained("The cat sat.");
		let generation = Generator::new(&model).run(0, &mut StdRng::seed_from_u64(1));
		assert!(generation.tokens.is_empty());
		assert_eq!(generation.text(), "");
	}

	#[test]
	fn test_cycle_is_bounded() {
		// "a a" follows "a a" forever unless the end marker is drawn
		let model = trained("a a a a a a a a a a a a a a a a a a a a a a a a a a a a a a.");
		let mut rng = StdRng::seed_from_u64(5);
		for _ in 0..20 {
			let generation = Generator::new(&model).run(10, &mut rng);
			assert!(generation.tokens.len() <= 10);
			assert!(generation.tokens.iter().all(|token| token == "a"));
		}
	}

	#[test]
	fn test_output_never_contains_markers() {
		let model = trained("I am a robot. I am a student. You are a robot too! Are you a student?");
		let mut rng = StdRng::seed_from_u64(99);
		for _ in 0..50 {
			let generation = Generator::new(&model).run(50, &mut rng);
			assert!(!generation.tokens.is_empty());
			assert_eq!(generation.stop, StopReason::EndOfSentence);
			assert!(generation.tokens.iter().all(|token| token != START_TOKEN && token != END_TOKEN));
		}
	}

	#[test]
	fn test_same_seed_same_output() {
		let model = trained("I am a robot. I am a student. You are a robot too! Are you a student?");
		let first = Generator::new(&model).run(50, &mut StdRng::seed_from_u64(2024));
		let second = Generator::new(&model).run(50, &mut StdRng::seed_from_u64(2024));
		assert_eq!(first, second);
	}
}
