use std::str::FromStr;

use anyhow::{anyhow, bail};
use dijkstra::{Cost, DistanceField};
use fov::FovSource;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use util::{bresenham_line, Grid, StrExt, DIR_8};

use crate::{Terrain, TerrainFlags, Tile};

/// A single dungeon level: a fixed-size grid of tiles.
///
/// Owns all visibility and exploration state. The distance field and field
/// of view engines read the level through cost and opacity predicates and
/// never touch tiles directly.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Level {
    tiles: Grid<Tile>,
}

impl Level {
    /// Create a level of solid wall.
    pub fn new(width: i32, height: i32) -> Self {
        Level {
            tiles: Grid::new(width, height, Tile::default()),
        }
    }

    pub fn width(&self) -> i32 {
        self.tiles.width()
    }

    pub fn height(&self) -> i32 {
        self.tiles.height()
    }

    pub fn in_bounds(&self, p: impl Into<IVec2>) -> bool {
        self.tiles.contains(p)
    }

    pub fn tile(&self, p: impl Into<IVec2>) -> Option<&Tile> {
        self.tiles.get(p)
    }

    pub fn tile_mut(&mut self, p: impl Into<IVec2>) -> Option<&mut Tile> {
        self.tiles.get_mut(p)
    }

    pub fn terrain(&self, p: impl Into<IVec2>) -> Option<Terrain> {
        self.tiles.get(p).map(|t| t.terrain())
    }

    /// Set terrain at a cell, silently ignoring out-of-bounds positions.
    pub fn set_terrain(&mut self, p: impl Into<IVec2>, terrain: Terrain) {
        if let Some(tile) = self.tiles.get_mut(p) {
            tile.set_terrain(terrain);
        }
    }

    pub fn is_visible(&self, p: impl Into<IVec2>) -> bool {
        self.tiles.get(p).map_or(false, |t| t.is_visible())
    }

    pub fn is_explored(&self, p: impl Into<IVec2>) -> bool {
        self.tiles.get(p).map_or(false, |t| t.is_explored())
    }

    /// Clear transient per-turn tile state, exploration memory persists.
    pub fn begin_turn(&mut self) {
        for (_, tile) in self.tiles.iter_mut() {
            tile.reset_for_turn();
        }
    }

    /// Wipe the level back to solid wall, dropping exploration memory.
    pub fn reset(&mut self) {
        self.tiles.fill(Tile::default());
    }

    /// Recompute the player's field of view for this turn.
    ///
    /// Clears all transient visibility first, then marks every tile the
    /// shadowcast reaches. Seeing a tile also commits it to exploration
    /// memory.
    pub fn compute_fov(&mut self, origin: IVec2, radius: i32) {
        self.begin_turn();

        let visible = fov::field_of_view(self, origin, radius);
        let count = visible.len();
        for p in visible {
            if let Some(tile) = self.tiles.get_mut(p) {
                tile.set_visible(true);
            }
        }

        log::debug!("FOV from {origin}, {count} tiles visible.");
    }

    /// Iterate the walkable 8-neighbors of a cell.
    pub fn walk_neighbors(
        &self,
        p: IVec2,
    ) -> impl Iterator<Item = IVec2> + '_ {
        DIR_8
            .iter()
            .map(move |&d| p + d)
            .filter(|&n| self.terrain(n).map_or(false, |t| t.is_walkable()))
    }

    /// Unobstructed straight line between two cells, for creature vision
    /// checks. The endpoints themselves do not block.
    pub fn line_of_sight(&self, a: IVec2, b: IVec2) -> bool {
        if !self.in_bounds(a) || !self.in_bounds(b) {
            return false;
        }
        bresenham_line(a, b)
            .skip(1)
            .all(|p| self.terrain(p).map_or(false, |t| !t.blocks_sight()))
    }

    /// Distance field over the level from the given source cells.
    ///
    /// `blocking` names extra terrain flags that should be treated as
    /// impassable for this scan on top of genuinely movement-blocking
    /// terrain.
    pub fn scan_distance(
        &self,
        sources: &[IVec2],
        blocking: TerrainFlags,
        use_diagonals: bool,
    ) -> DistanceField {
        let mut field = DistanceField::new(self.width(), self.height());
        field.scan(
            |p| self.cost_at(p, blocking),
            sources.iter().copied(),
            use_diagonals,
        );
        field
    }

    /// Flee map away from a threat.
    ///
    /// Scans from the threat, weights the distances toward distant cells
    /// and smooths the gradients back downhill, so a creature descending
    /// the result runs for open escape routes instead of backing into the
    /// nearest dead end.
    pub fn safety_map(
        &self,
        threat: IVec2,
        use_diagonals: bool,
    ) -> DistanceField {
        let mut field =
            self.scan_distance(&[threat], TerrainFlags::empty(), use_diagonals);
        field.map_distances(|d| d * -12 / 10);
        field.rescan(use_diagonals);
        field
    }

    fn cost_at(&self, p: IVec2, blocking: TerrainFlags) -> Cost {
        let Some(terrain) = self.terrain(p) else {
            return Cost::Obstruction;
        };

        let flags = terrain.flags();
        if flags.contains(TerrainFlags::OBSTRUCTS_PASSABILITY) {
            if flags.contains(TerrainFlags::OBSTRUCTS_DIAGONAL) {
                Cost::Obstruction
            } else {
                Cost::Forbidden
            }
        } else if flags.contains(TerrainFlags::HAZARD)
            || flags.intersects(blocking)
        {
            Cost::Forbidden
        } else {
            Cost::Step(terrain.step_cost())
        }
    }
}

impl FovSource for Level {
    fn contains(&self, p: IVec2) -> bool {
        self.in_bounds(p)
    }

    fn blocks_sight(&self, p: IVec2) -> bool {
        self.terrain(p).map_or(true, |t| t.blocks_sight())
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells: Vec<(IVec2, char)> = s.char_grid().collect();
        if cells.is_empty() {
            bail!("empty map");
        }

        let width = cells.iter().map(|(p, _)| p.x).max().unwrap() + 1;
        let height = cells.iter().map(|(p, _)| p.y).max().unwrap() + 1;
        // Every cell of the bounding rectangle must be present, a short or
        // gappy row would otherwise silently pad out with wall.
        if cells.len() != (width * height) as usize {
            bail!("ragged {width}x{height} map");
        }

        let mut tiles = Grid::new(width, height, Tile::default());
        for (p, c) in cells {
            let terrain = Terrain::try_from(c)
                .map_err(|e| anyhow!("{e} {c:?} at {p}"))?;
            tiles[p] = Tile::new(terrain);
        }

        Ok(Level { tiles })
    }
}

#[cfg(test)]
mod tests {
    use dijkstra::{DEFAULT_COST, MAX_DISTANCE};
    use glam::ivec2;
    use pretty_assertions::assert_eq;
    use util::{srng, VecExt};

    use super::*;

    #[test]
    fn wall_blocks_sight_and_exploration() {
        let mut level: Level = "@#...".parse().unwrap();
        level.compute_fov(ivec2(0, 0), 5);

        assert!(level.is_visible(ivec2(0, 0)));
        // The wall face itself shows.
        assert!(level.is_visible(ivec2(1, 0)));
        // The floor in its shadow is neither seen nor remembered.
        assert!(!level.is_visible(ivec2(2, 0)));
        assert!(!level.is_explored(ivec2(2, 0)));
    }

    #[test]
    fn exploration_persists_across_turns() {
        let mut level: Level = "
            #######
            #.....#
            #..#..#
            #.....#
            #######"
            .parse()
            .unwrap();

        level.compute_fov(ivec2(1, 1), 10);
        assert!(level.is_visible(ivec2(5, 1)));
        // The pillar at (3, 2) shadows the far cell along its sightline.
        assert!(!level.is_visible(ivec2(5, 3)));

        // Everything seen was also committed to memory.
        for (p, tile) in level.tiles.iter() {
            assert!(!tile.is_visible() || tile.is_explored(), "bad tile {p}");
        }

        // Walkable neighbors skip the pillar and the walls.
        let ns: Vec<_> = level.walk_neighbors(ivec2(2, 2)).collect();
        assert_eq!(ns.len(), 7);
        assert!(!ns.contains(&ivec2(3, 2)));

        // A minimal second scan elsewhere hides the room but memory stays.
        level.compute_fov(ivec2(5, 3), 1);
        assert!(!level.is_visible(ivec2(1, 1)));
        assert!(level.is_explored(ivec2(1, 1)));
        assert!(level.is_explored(ivec2(5, 1)));

        // A plain turn reset also keeps memory.
        level.begin_turn();
        assert!(level.is_explored(ivec2(1, 1)));

        // Only the full level reset wipes it.
        level.reset();
        assert!(!level.is_explored(ivec2(1, 1)));
        assert_eq!(level.terrain(ivec2(1, 1)), Some(Terrain::Wall));
    }

    #[test]
    fn door_blocks_sight_but_not_movement() {
        let level: Level = "
            #######
            #.+.#.#
            #######"
            .parse()
            .unwrap();

        // Light stops at the door.
        assert!(!level.line_of_sight(ivec2(1, 1), ivec2(3, 1)));
        // But walking through works.
        let field =
            level.scan_distance(&[ivec2(1, 1)], TerrainFlags::empty(), true);
        assert_eq!(field.distance(ivec2(2, 1)), DEFAULT_COST);
        assert_eq!(field.distance(ivec2(3, 1)), 2 * DEFAULT_COST);
        // The walled-off cell stays unreached.
        assert_eq!(field.distance(ivec2(5, 1)), MAX_DISTANCE);
    }

    #[test]
    fn hazards_are_avoided() {
        let level: Level = "
            ######
            #.&..#
            ######"
            .parse()
            .unwrap();

        let field =
            level.scan_distance(&[ivec2(1, 1)], TerrainFlags::empty(), true);
        // Lava is never entered, so nothing past it is reachable here.
        assert_eq!(field.distance(ivec2(2, 1)), MAX_DISTANCE);
        assert_eq!(field.distance(ivec2(3, 1)), MAX_DISTANCE);
    }

    #[test]
    fn rubble_slows_pathing() {
        let level: Level = "
            ######
            #.%..#
            ######"
            .parse()
            .unwrap();

        let field =
            level.scan_distance(&[ivec2(1, 1)], TerrainFlags::empty(), true);
        assert_eq!(field.distance(ivec2(2, 1)), 2 * DEFAULT_COST);
        assert_eq!(field.distance(ivec2(3, 1)), 3 * DEFAULT_COST);
    }

    #[test]
    fn safety_map_leads_away_from_threat() {
        let level: Level = "
            #########
            #.......#
            #.......#
            #.......#
            #########"
            .parse()
            .unwrap();

        let threat = ivec2(1, 1);
        let field = level.safety_map(threat, true);

        let start = ivec2(2, 2);
        let step = field.next_step(start, &mut srng("run away"));
        assert!((step - threat).len2() > (start - threat).len2());
    }

    #[test]
    fn pursuit_descends_toward_source() {
        let level: Level = "
            #########
            #.......#
            #.......#
            #.......#
            #########"
            .parse()
            .unwrap();

        let player = ivec2(1, 1);
        let field =
            level.scan_distance(&[player], TerrainFlags::empty(), true);

        // A monster in the far corner closes in step by step.
        let mut rng = srng("chase");
        let mut monster = ivec2(7, 3);
        for _ in 0..10 {
            let next = field.next_step(monster, &mut rng);
            if next == monster {
                break;
            }
            assert!(field.distance(next) < field.distance(monster));
            monster = next;
        }
        assert_eq!(monster, player);
    }

    #[test]
    fn bad_maps_fail_to_parse() {
        assert!("".parse::<Level>().is_err());
        assert!("..Z..".parse::<Level>().is_err());

        // Ragged rows are rejected, not padded.
        assert!("
            ####
            ##"
            .parse::<Level>()
            .is_err());
    }
}
