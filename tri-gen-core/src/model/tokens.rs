use std::fmt;

/// Marker placed twice in front of every training sentence.
///
/// Two of them seed the first context, so even a one-word sentence
/// produces a well-formed trigram.
pub const START_TOKEN: &str = "<s>";

/// Marker appended to every training sentence.
/// Sampling it ends the generated sentence.
pub const END_TOKEN: &str = "</s>";

/// Placeholder for out-of-vocabulary words.
///
/// Reserved only: training text is closed-vocabulary by construction,
/// so nothing is ever mapped to it and generation never substitutes it.
pub const UNK_TOKEN: &str = "<unk>";

/// Returns `true` for the three reserved tokens.
pub fn is_special(token: &str) -> bool {
	token == START_TOKEN || token == END_TOKEN || token == UNK_TOKEN
}

/// Two consecutive tokens used as the lookup key for next-token statistics.
///
/// Equality and hashing are by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Context(String, String);

impl Context {
	/// Builds a context from two consecutive tokens.
	pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
		Self(first.into(), second.into())
	}

	/// The context every sentence starts from: `(<s>, <s>)`.
	pub fn start() -> Self {
		Self::new(START_TOKEN, START_TOKEN)
	}

	pub fn first(&self) -> &str {
		&self.0
	}

	pub fn second(&self) -> &str {
		&self.1
	}

	/// Slides the window one token forward: `(a, b)` + `c` → `(b, c)`.
	pub fn shift(self, next: impl Into<String>) -> Self {
		Self(self.1, next.into())
	}
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.0, self.1)
	}
}
