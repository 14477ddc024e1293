use rand::Rng;

/// Next-token statistics for a single context.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during training
/// - Pick the next token using weighted random sampling
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - `total` is the sum of all occurrence counts
/// - Transitions are kept in the order their token was first observed
#[derive(Clone, Debug, Default)]
pub struct State {
	/// Outgoing transitions in first-observation order.
	/// Example: [("a", 2), ("robot", 1)]
	transitions: Vec<(String, usize)>,
	/// Sum of every occurrence count above.
	total: usize,
}

impl State {
	/// Records an occurrence of a transition toward `next`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is appended with an initial count of 1.
	///
	/// The total is updated in the same call.
	pub fn add_transition(&mut self, next: &str) {
		match self.transitions.iter_mut().find(|(token, _)| token == next) {
			Some((_, occurrence)) => *occurrence += 1,
			None => self.transitions.push((next.to_owned(), 1)),
		}
		self.total += 1;
	}

	/// Number of times this context was observed.
	pub fn total(&self) -> usize {
		self.total
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Transitions as `(token, occurrence)`, in first-observation order.
	pub fn transitions(&self) -> impl Iterator<Item = (&str, usize)> {
		self.transitions.iter().map(|(token, occurrence)| (token.as_str(), *occurrence))
	}

	/// Picks the next token using weighted random sampling.
	///
	/// Draws `r` in `[0, 1)` and walks the transitions in order, accumulating
	/// `occurrence / total`, until the accumulated mass reaches `r`.
	/// If rounding leaves every candidate below `r`, the last one is returned.
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.pick(rng.random::<f64>())
	}

	/// Cumulative walk for an already drawn `r`.
	fn pick(&self, r: f64) -> Option<&str> {
		if self.is_empty() {
			return None;
		}

		let total = self.total as f64;
		let mut cumulative = 0.0;
		for (token, occurrence) in &self.transitions {
			cumulative += *occurrence as f64 / total;
			if r <= cumulative {
				return Some(token.as_str());
			}
		}

		// Floating point fallback
		self.transitions.last().map(|(token, _)| token.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn state_of(tokens: &[&str]) -> State {
		let mut state = State::default();
		for token in tokens {
			state.add_transition(token);
		}
		state
	}

	#[test]
	fn test_total_tracks_counts() {
		let state = state_of(&["a", "b", "a", "c", "a"]);
		let sum: usize = state.transitions().map(|(_, occurrence)| occurrence).sum();
		assert_eq!(state.total(), 5);
		assert_eq!(sum, state.total());
	}

	#[test]
	fn test_first_observation_order() {
		let state = state_of(&["robot", "student", "robot", "apple"]);
		let order: Vec<&str> = state.transitions().map(|(token, _)| token).collect();
		assert_eq!(order, vec!["robot", "student", "apple"]);
	}

	#[test]
	fn test_empty_state_predicts_nothing() {
		let state = State::default();
		assert!(state.is_empty());
		assert_eq!(state.predict(&mut StdRng::seed_from_u64(7)), None);
	}

	#[test]
	fn test_single_candidate_always_chosen() {
		let state = state_of(&["only"]);
		let mut rng = StdRng::seed_from_u64(42);
		for _ in 0..200 {
			assert_eq!(state.predict(&mut rng), Some("only"));
		}
		assert_eq!(state.pick(0.0), Some("only"));
		assert_eq!(state.pick(0.999_999), Some("only"));
	}

	#[test]
	fn test_cumulative_walk_boundaries() {
		// a: 1/4, b: 3/4
		let state = state_of(&["a", "b", "b", "b"]);
		assert_eq!(state.pick(0.0), Some("a"));
		assert_eq!(state.pick(0.25), Some("a"));
		assert_eq!(state.pick(0.26), Some("b"));
		assert_eq!(state.pick(0.99), Some("b"));
	}

	#[test]
	fn test_fallback_returns_last_candidate() {
		let state = state_of(&["x", "y", "z"]);
		// Larger than any accumulated mass can reach
		assert_eq!(state.pick(1.5), Some("z"));
	}

	#[test]
	fn test_sampling_roughly_follows_counts() {
		let state = state_of(&["a", "b", "b", "b"]);
		let mut rng = StdRng::seed_from_u64(1234);
		let picks_b = (0..4000).filter(|_| state.predict(&mut rng) == Some("b")).count();
		assert!((2700..3300).contains(&picks_b), "b picked {picks_b} times");
	}
}
