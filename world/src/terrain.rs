use bitflags::bitflags;
use dijkstra::DEFAULT_COST;
use serde::{Deserialize, Serialize};

bitflags! {
    /// How a terrain type interacts with movement and light.
    #[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
    pub struct TerrainFlags: u32 {
        /// Creatures cannot enter the cell.
        const OBSTRUCTS_PASSABILITY = 1 << 0;
        /// Light does not pass through the cell.
        const OBSTRUCTS_SIGHT = 1 << 1;
        /// The cell also seals adjacent corners against diagonal steps.
        const OBSTRUCTS_DIAGONAL = 1 << 2;
        /// Enterable but harmful, pathing treats the cell as forbidden.
        const HAZARD = 1 << 3;
    }
}

/// Specific terrain in a single map cell.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(try_from = "char", into = "char")]
pub enum Terrain {
    #[default]
    Wall,
    Floor,
    Door,
    Rubble,
    Lava,
    Chasm,
}

use Terrain::*;

impl Terrain {
    pub fn flags(self) -> TerrainFlags {
        match self {
            Wall => {
                TerrainFlags::OBSTRUCTS_PASSABILITY
                    | TerrainFlags::OBSTRUCTS_SIGHT
                    | TerrainFlags::OBSTRUCTS_DIAGONAL
            }
            Floor | Rubble => TerrainFlags::empty(),
            // Closed doors block light but open when walked into.
            Door => TerrainFlags::OBSTRUCTS_SIGHT,
            Lava | Chasm => TerrainFlags::HAZARD,
        }
    }

    pub fn blocks_sight(self) -> bool {
        self.flags().contains(TerrainFlags::OBSTRUCTS_SIGHT)
    }

    pub fn blocks_movement(self) -> bool {
        self.flags().contains(TerrainFlags::OBSTRUCTS_PASSABILITY)
    }

    pub fn is_walkable(self) -> bool {
        !self.blocks_movement()
    }

    /// Movement cost of stepping into the cell, for passable terrain.
    pub fn step_cost(self) -> i32 {
        match self {
            // Clambering over rubble takes twice as long as open floor.
            Rubble => 2 * DEFAULT_COST,
            _ => DEFAULT_COST,
        }
    }
}

impl TryFrom<char> for Terrain {
    type Error = &'static str;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '#' => Ok(Wall),
            '.' | '@' => Ok(Floor),
            '+' => Ok(Door),
            '%' => Ok(Rubble),
            '&' => Ok(Lava),
            '^' => Ok(Chasm),
            _ => Err("invalid terrain char"),
        }
    }
}

impl From<Terrain> for char {
    fn from(val: Terrain) -> Self {
        // NB. This must match Terrain's TryFrom inputs above.
        match val {
            Wall => '#',
            Floor => '.',
            Door => '+',
            Rubble => '%',
            Lava => '&',
            Chasm => '^',
        }
    }
}
