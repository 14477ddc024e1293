use std::collections::{HashMap, HashSet};

use log::debug;
use rand::Rng;
use serde::Serialize;

use super::generator::Generator;
use super::preprocess::{PreparedCorpus, prepare_sequences};
use super::state::State;
use super::tokens::{Context, END_TOKEN};

/// Generation length used when the caller has no preference.
pub const DEFAULT_MAX_LENGTH: usize = 50;

/// Outcome of drawing one token for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample<'a> {
	/// A regular token to append to the output.
	Word(&'a str),
	/// The end marker was drawn: the sentence is complete.
	End,
	/// The context was never observed during training.
	Unseen,
}

/// Figures describing the last training run.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingSummary {
	/// Usable sentences (at least one token).
	pub sentences: usize,
	/// Distinct tokens, special tokens excluded.
	pub vocabulary_size: usize,
	/// Distinct two-token contexts.
	pub contexts: usize,
	/// Trigram observations, i.e. the sum of every context total.
	pub trigrams: usize,
}

/// Everything a single `fit` call produces.
///
/// Built in full before it replaces the previous one, so the model is
/// never seen half rebuilt.
#[derive(Debug, Default, Clone)]
struct TrainedState {
	/// Next-token statistics per context.
	states: HashMap<Context, State>,
	vocabulary: HashSet<String>,
	summary: TrainingSummary,
	is_trained: bool,
}

impl TrainedState {
	/// Counts every trigram of every padded sequence.
	fn from_corpus(corpus: PreparedCorpus) -> Self {
		let mut states: HashMap<Context, State> = HashMap::new();
		let mut trigrams = 0;

		for sequence in &corpus.sequences {
			// Iterate over triples (w1, w2, w3)
			for window in sequence.windows(3) {
				let context = Context::new(window[0].as_str(), window[1].as_str());
				states.entry(context).or_default().add_transition(&window[2]);
				trigrams += 1;
			}
		}

		let summary = TrainingSummary {
			sentences: corpus.sequences.len(),
			vocabulary_size: corpus.vocabulary.len(),
			contexts: states.len(),
			trigrams,
		};

		Self {
			is_trained: !states.is_empty(),
			states,
			vocabulary: corpus.vocabulary,
			summary,
		}
	}
}

/// Word-level trigram language model.
///
/// Learns, for every pair of consecutive words, how often each word
/// followed it, then generates sentences by sampling from those counts.
///
/// # Responsibilities
/// - Turn raw text into padded token sequences
/// - Count `(w1, w2) -> w3` observations
/// - Sample the next word of a context proportionally to its counts
/// - Generate whole sentences from the start context
///
/// # Invariants
/// - Every count is >= 1
/// - For every context, its total equals the sum of its counts
/// - Each `fit` replaces the whole trained state, nothing accumulates across calls
#[derive(Debug, Default, Clone)]
pub struct TrigramModel {
	trained: TrainedState,
}

impl TrigramModel {
	/// Creates an untrained model.
	pub fn new() -> Self {
		Self::default()
	}

	/// Trains the model on `text`, discarding anything learned before.
	///
	/// Text without a usable sentence (empty, whitespace only, only
	/// punctuation) leaves the model untrained. Never fails.
	pub fn fit(&mut self, text: &str) {
		let corpus = if text.trim().is_empty() {
			PreparedCorpus::default()
		} else {
			prepare_sequences(text)
		};

		self.trained = TrainedState::from_corpus(corpus);
		debug!("Model trained: {:?}", self.trained.summary);
	}

	/// Whether the last `fit` observed at least one trigram.
	pub fn is_trained(&self) -> bool {
		self.trained.is_trained
	}

	/// Tokens seen during the last `fit`, special tokens excluded.
	pub fn vocabulary(&self) -> &HashSet<String> {
		&self.trained.vocabulary
	}

	pub fn summary(&self) -> TrainingSummary {
		self.trained.summary
	}

	/// Every observed context, in no particular order.
	pub fn contexts(&self) -> impl Iterator<Item = &Context> {
		self.trained.states.keys()
	}

	/// Next-token counts of a context, in first-observation order.
	///
	/// Returns `None` if the context was never observed.
	pub fn counts(&self, context: &Context) -> Option<Vec<(&str, usize)>> {
		self.trained.states.get(context).map(|state| state.transitions().collect())
	}

	/// How many times a context was observed (sum of its counts).
	pub fn context_total(&self, context: &Context) -> Option<usize> {
		self.trained.states.get(context).map(State::total)
	}

	/// Draws the word following `context`, weighted by its counts.
	pub fn sample_next<'a, R: Rng + ?Sized>(&'a self, context: &Context, rng: &mut R) -> Sample<'a> {
		match self.trained.states.get(context).and_then(|state| state.predict(rng)) {
			None => Sample::Unseen,
			Some(END_TOKEN) => Sample::End,
			Some(word) => Sample::Word(word),
		}
	}

	/// Generates one sentence of at most `max_length` words.
	///
	/// Returns an empty string if the model is untrained or nothing
	/// could be generated.
	pub fn generate(&self, max_length: usize) -> String {
		self.generate_with_rng(max_length, &mut rand::rng())
	}

	/// Same as [`generate`](Self::generate) with a caller-supplied random source.
	pub fn generate_with_rng<R: Rng + ?Sized>(&self, max_length: usize, rng: &mut R) -> String {
		Generator::new(self).run(max_length, rng).text()
	}
}
