//! Trigram-based text generation library.
//!
//! This crate provides:
//! - A word-level trigram language model trained from raw text
//! - Probabilistic sentence generation with an injectable random source
//! - A scaled dot-product attention function over dense matrices
//! - Small I/O utilities to load training corpora
//!
//! The model is single-threaded: callers sharing it across threads
//! must serialize access themselves (e.g. behind a `Mutex`).

/// Trigram model, preprocessing and generation.
///
/// Exposes the high-level model interface while keeping
/// internal statistics representations private.
pub mod model;

/// Scaled dot-product attention.
pub mod attention;

/// I/O utilities (corpus loading, path helpers).
pub mod io;
