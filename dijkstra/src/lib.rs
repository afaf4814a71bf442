//! Incremental cost-weighted shortest path fields over a bounded 2D grid.
//!
//! A "Dijkstra map" stores, for every cell, the minimum total movement cost
//! to reach any of a set of source cells. Creatures follow the map downhill
//! to pursue sources or, with the distances negated and rescanned, to flee
//! them. The whole field is recomputed per query instead of maintaining an
//! online path structure, which is cheap on roguelike-sized grids and
//! serves every creature at once.

mod field;
pub use field::{Cost, DistanceField, DEFAULT_COST, MAX_DISTANCE};
