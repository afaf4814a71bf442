//! Unopinionated standalone utilities.

mod geom;
pub use geom::{bresenham_line, VecExt, DIR_8};

mod grid;
pub use grid::Grid;

mod rng;
pub use rng::srng;

pub mod text;
pub use text::StrExt;

pub type FastHasher = rustc_hash::FxHasher;

/// Map with an efficient hash function.
pub use rustc_hash::FxHashMap as HashMap;

/// Set with an efficient hash function.
pub use rustc_hash::FxHashSet as HashSet;
