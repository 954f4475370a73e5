//! Content-addressed store of synthesized speech samples.

/// Sample cache keyed by voice id and text hash.
pub mod sample_cache;
