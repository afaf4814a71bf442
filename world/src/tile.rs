use serde::{Deserialize, Serialize};

use crate::Terrain;

/// One map cell plus the player's visibility memory of it.
///
/// `visible` is transient per-turn state and is not serialized, `explored`
/// is the persistent map memory and only goes away with a full level
/// reset.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
pub struct Tile {
    terrain: Terrain,
    #[serde(skip)]
    visible: bool,
    explored: bool,
}

impl Tile {
    pub fn new(terrain: Terrain) -> Self {
        Tile {
            terrain,
            visible: false,
            explored: false,
        }
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
    }

    /// Is the player seeing the cell right now?
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Has the player ever seen the cell?
    pub fn is_explored(&self) -> bool {
        self.explored
    }

    /// Seeing a tile also commits it to map memory.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.explored = true;
        }
    }

    /// Clear per-turn state, map memory persists.
    pub fn reset_for_turn(&mut self) {
        self.visible = false;
    }
}
