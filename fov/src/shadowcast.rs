use glam::{ivec2, IVec2};
use util::HashSet;

/// Terrain access needed by the field of view scan.
pub trait FovSource {
    /// Whether a cell exists on the map.
    fn contains(&self, p: IVec2) -> bool;

    /// Whether the cell's terrain stops light.
    fn blocks_sight(&self, p: IVec2) -> bool;

    /// Cells outside the map count as opaque so unseen terrain never
    /// leaks light.
    fn is_opaque(&self, p: IVec2) -> bool {
        !self.contains(p) || self.blocks_sight(p)
    }
}

/// Sign and axis-swap transforms `[xx, xy, yx, yy]` mapping the canonical
/// scan octant (`dx <= 0`, `dy <= 0`) onto each of the 8 octants.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [0, 1, 1, 0],
    [0, -1, 1, 0],
    [-1, 0, 0, 1],
    [-1, 0, 0, -1],
    [0, -1, -1, 0],
    [0, 1, -1, 0],
    [1, 0, 0, -1],
];

/// Compute the set of cells visible from `origin` out to `radius`.
///
/// Vision is clipped to a disc, a cell is in range when its squared
/// distance from the origin is strictly below `radius²`. The origin itself
/// is always visible, and a `radius` of zero or less shows nothing else.
pub fn field_of_view(
    src: &impl FovSource,
    origin: IVec2,
    radius: i32,
) -> HashSet<IVec2> {
    let mut visible = HashSet::default();
    visible.insert(origin);

    for xform in OCTANTS {
        cast_light(src, &mut visible, origin, radius, 1, 1.0, 0.0, xform);
    }

    visible
}

/// Scan one octant recursively.
///
/// Rows march away from the origin; each row sweeps cells whose center
/// slope falls inside the `(start_slope, end_slope)` window. Hitting a
/// blocker splits the window: the part before the blocker continues in a
/// recursive call, the part after resumes when the blocking run ends.
#[allow(clippy::too_many_arguments)]
fn cast_light(
    src: &impl FovSource,
    visible: &mut HashSet<IVec2>,
    origin: IVec2,
    radius: i32,
    row: i32,
    mut start_slope: f32,
    end_slope: f32,
    xform: [i32; 4],
) {
    if start_slope < end_slope {
        return;
    }

    let mut next_start_slope = start_slope;
    for i in row..=radius {
        let mut blocked = false;
        let dy = -i;

        for dx in -i..=0 {
            let l_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
            let r_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);

            if start_slope < r_slope {
                continue;
            } else if end_slope > l_slope {
                break;
            }

            let p = origin
                + ivec2(
                    dx * xform[0] + dy * xform[1],
                    dx * xform[2] + dy * xform[3],
                );

            if dx * dx + dy * dy < radius * radius && src.contains(p) {
                visible.insert(p);
            }

            if blocked {
                if src.is_opaque(p) {
                    next_start_slope = r_slope;
                    continue;
                } else {
                    blocked = false;
                    start_slope = next_start_slope;
                }
            } else if src.is_opaque(p) && i < radius {
                // Shadow starts here; scan the unshadowed cone before the
                // blocker in deeper rows, then resume past it.
                blocked = true;
                cast_light(
                    src,
                    visible,
                    origin,
                    radius,
                    i + 1,
                    start_slope,
                    l_slope,
                    xform,
                );
                next_start_slope = r_slope;
            }
        }

        if blocked {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use util::StrExt;

    use super::*;

    struct AsciiMap {
        walls: HashSet<IVec2>,
        width: i32,
        height: i32,
    }

    impl AsciiMap {
        fn new(map: &str) -> Self {
            let mut walls = HashSet::default();
            let (mut width, mut height) = (0, 0);
            for (p, c) in map.char_grid() {
                width = width.max(p.x + 1);
                height = height.max(p.y + 1);
                if c == '#' {
                    walls.insert(p);
                }
            }
            AsciiMap {
                walls,
                width,
                height,
            }
        }
    }

    impl FovSource for AsciiMap {
        fn contains(&self, p: IVec2) -> bool {
            p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
        }

        fn blocks_sight(&self, p: IVec2) -> bool {
            self.walls.contains(&p)
        }
    }

    fn open_map(dim: i32) -> AsciiMap {
        AsciiMap {
            walls: HashSet::default(),
            width: dim,
            height: dim,
        }
    }

    #[test]
    fn open_ground_gives_filled_disc() {
        let map = open_map(15);
        let origin = ivec2(7, 7);
        let radius = 5;

        let visible = field_of_view(&map, origin, radius);

        for y in 0..15 {
            for x in 0..15 {
                let p = ivec2(x, y);
                let d2 = (p - origin).length_squared();
                assert_eq!(
                    visible.contains(&p),
                    d2 < radius * radius || p == origin,
                    "wrong visibility at {p}"
                );
            }
        }
    }

    #[test]
    fn wall_casts_shadow() {
        let map = AsciiMap::new(
            "
            @#....",
        );
        let visible = field_of_view(&map, ivec2(0, 0), 5);

        // The wall face shows, the cells in its shadow do not.
        assert!(visible.contains(&ivec2(0, 0)));
        assert!(visible.contains(&ivec2(1, 0)));
        assert!(!visible.contains(&ivec2(2, 0)));
        assert!(!visible.contains(&ivec2(5, 0)));
    }

    #[test]
    fn pillar_shadow_widens_with_distance() {
        let map = AsciiMap::new(
            "
            .......
            .......
            ...#...
            .......
            .......
            .......
            .......",
        );
        let origin = ivec2(3, 0);
        let visible = field_of_view(&map, origin, 7);

        assert!(visible.contains(&ivec2(3, 2)));
        // Cells straight behind the pillar are in shadow.
        assert!(!visible.contains(&ivec2(3, 3)));
        assert!(!visible.contains(&ivec2(3, 4)));
        // The cone stays narrow near the pillar and the flanks show.
        assert!(visible.contains(&ivec2(2, 3)));
        assert!(visible.contains(&ivec2(4, 3)));
    }

    #[test]
    fn zero_radius_shows_only_origin() {
        let map = open_map(9);
        let origin = ivec2(4, 4);

        for radius in [-1, 0] {
            let visible = field_of_view(&map, origin, radius);
            assert_eq!(visible.len(), 1);
            assert!(visible.contains(&origin));
        }
    }

    #[test]
    fn map_edge_stays_dark() {
        // Scanning from a corner must not mark cells off the map; nothing
        // outside the grid shows up in the result set.
        let map = open_map(3);
        let visible = field_of_view(&map, ivec2(0, 0), 8);

        assert!(visible.iter().all(|p| map.contains(*p)));
        assert!(visible.contains(&ivec2(2, 2)));
    }
}
