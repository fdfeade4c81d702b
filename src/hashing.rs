//! Deterministic hashing helpers. The hashing data structures in the standard library are
//! seeded randomly per process, which would make iteration order (and therefore any random
//! draws that follow it) differ between runs. Everything in this crate that is iterated
//! while drawing random numbers uses these aliases instead.
//!
//! `hash_str` is used to derive a per-stream seed offset in `crate::random`.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// A convenience method to compute a platform-stable hash of a `&str`.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings() {
        let a = hash_str("hello");
        let b = hash_str("hello");
        let c = hash_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
