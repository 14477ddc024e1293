//! Top-level module for the trigram generation system.
//!
//! This module provides a word-level trigram text generator, including:
//! - Reserved tokens and the two-word lookup key (`Context`)
//! - Text preprocessing (segmentation, tokenization, padding)
//! - Internal next-token statistics (`State`)
//! - The trainable model (`TrigramModel`)
//! - The sentence generation loop (`Generator`)

/// Reserved boundary tokens and the `Context` key type.
pub mod tokens;

/// Sentence segmentation, tokenization, vocabulary and sequence padding.
///
/// Turns raw text into the padded sequences the trainer counts.
pub mod preprocess;

/// Internal representation of the statistics of a single context.
///
/// Tracks outgoing transitions in first-observation order and supports
/// weighted random sampling.
/// This module is not exposed publicly.
mod state;

/// Word-level trigram model.
///
/// Handles training, trained-state replacement, inspection
/// and next-word sampling.
pub mod trigram_model;

/// Sentence generation from a trained model.
///
/// Runs the sampler from the start context with a hard length cap.
pub mod generator;
