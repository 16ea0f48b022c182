#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
extern crate std;

/// A fixed-capacity hash map using linear probing.
///
/// This module provides a `HashMap` that stores its entries inline, tracks
/// the occupied slot range for bounded iteration, and exposes cursors over
/// slot positions.
pub mod hash_map;

mod hash_table;
mod scopeguard;

/// A fixed-capacity hash set.
///
/// This module provides a `HashSet` that wraps the `HashMap` with unit
/// values.
pub mod hash_set;

pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_map::InsertError;
pub use hash_set::HashSet;
#[cfg(feature = "stats")]
pub use hash_table::DISPLACEMENT_BUCKETS;
#[cfg(feature = "stats")]
pub use hash_table::DebugStats;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hash builder used when none is specified.
        ///
        /// foldhash's fixed-seed fast hasher, so slot layouts are the same from
        /// run to run.
        pub type DefaultHashBuilder = foldhash::fast::FixedState;
    } else if #[cfg(feature = "std")] {
        /// The hash builder used when none is specified.
        pub type DefaultHashBuilder =
            core::hash::BuildHasherDefault<std::collections::hash_map::DefaultHasher>;
    } else {
        /// Placeholder used when neither `foldhash` nor `std` is enabled. It has
        /// no values; build maps with [`HashMap::with_hasher`].
        #[derive(Debug, Clone, Copy)]
        pub enum DefaultHashBuilder {}
    }
}
