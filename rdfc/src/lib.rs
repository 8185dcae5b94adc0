//! This crate implements [RDFC-1.0], the W3C RDF dataset canonicalization
//! algorithm (formerly known as URDNA2015), together with the canonical
//! [N-Quads] reader and writer it operates on.
//!
//! The entry points are in the [`canon`] module:
//! [`normalize`](canon::normalize) writes the canonical N-Quads form of a
//! dataset, and [`relabel`](canon::relabel) returns the relabelled dataset
//! along with the mapping from input blank node labels to canonical ones.
//!
//! The algorithm is cooperative: it consults a [`Ticker`](ticker::Ticker) at
//! every bounded step, so pathological (maliciously symmetric) inputs abort
//! with an error instead of hanging.
//!
//! [RDFC-1.0]: https://www.w3.org/TR/rdf-canon/
//! [N-Quads]: https://www.w3.org/TR/n-quads/

#![deny(missing_docs)]

mod _permutations;

pub mod canon;
pub mod hash;
pub mod nquads;
pub mod quad;
pub mod term;
pub mod ticker;

pub use canon::{normalize, relabel};
pub use quad::{Dataset, Quad};
pub use term::{BaseDirection, Literal, Term};
pub use ticker::Ticker;

use thiserror::Error;

/// Canonicalization error.
#[derive(Debug, Error)]
pub enum CanonError {
    /// An IO error occurred while writing the canonical form
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The configured time budget expired before the algorithm completed
    #[error("canonicalization timed out")]
    Timeout,
    /// The dataset was deemed too complex by the configured safeguards
    #[error("toxic graph detected: {0}")]
    ToxicGraph(String),
    /// An internal invariant was violated; this is a bug
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
