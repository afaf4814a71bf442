//! Dungeon level datatypes: terrain, tiles with visibility memory, and the
//! bindings that feed terrain to the distance field and field of view
//! engines.

mod level;
pub use level::Level;

mod terrain;
pub use terrain::{Terrain, TerrainFlags};

mod tile;
pub use tile::Tile;
