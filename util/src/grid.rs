use std::ops::{Index, IndexMut};

use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// A fixed-size 2D container with bounds-checked access.
///
/// Cells are stored row-major. Out-of-bounds reads through `get` return
/// `None` rather than panicking, direct indexing panics like slice indexing
/// does.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        assert!(width > 0 && height > 0, "degenerate grid");
        Grid {
            width,
            height,
            data: vec![fill; (width * height) as usize],
        }
    }

    /// Overwrite every cell with the given value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    pub fn from_fn(
        width: i32,
        height: i32,
        mut f: impl FnMut(IVec2) -> T,
    ) -> Self {
        assert!(width > 0 && height > 0, "degenerate grid");
        let data = (0..width * height)
            .map(|i| f(ivec2(i % width, i / width)))
            .collect();
        Grid {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, p: impl Into<IVec2>) -> bool {
        let p = p.into();
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    fn idx(&self, p: IVec2) -> usize {
        (p.x + p.y * self.width) as usize
    }

    pub fn get(&self, p: impl Into<IVec2>) -> Option<&T> {
        let p = p.into();
        self.contains(p).then(|| &self.data[self.idx(p)])
    }

    pub fn get_mut(&mut self, p: impl Into<IVec2>) -> Option<&mut T> {
        let p = p.into();
        if self.contains(p) {
            let i = self.idx(p);
            Some(&mut self.data[i])
        } else {
            None
        }
    }

    /// Iterate all cells in row-major order with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, t)| (ivec2(i as i32 % w, i as i32 / w), t))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (IVec2, &mut T)> {
        let w = self.width;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(i, t)| (ivec2(i as i32 % w, i as i32 / w), t))
    }
}

impl<T> Index<IVec2> for Grid<T> {
    type Output = T;

    fn index(&self, p: IVec2) -> &T {
        assert!(self.contains(p), "grid index out of bounds");
        &self.data[self.idx(p)]
    }
}

impl<T> IndexMut<IVec2> for Grid<T> {
    fn index_mut(&mut self, p: IVec2) -> &mut T {
        assert!(self.contains(p), "grid index out of bounds");
        let i = self.idx(p);
        &mut self.data[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        let mut g = Grid::new(3, 2, 0);
        assert!(g.contains(ivec2(0, 0)));
        assert!(g.contains(ivec2(2, 1)));
        assert!(!g.contains(ivec2(3, 0)));
        assert!(!g.contains(ivec2(0, 2)));
        assert!(!g.contains(ivec2(-1, 0)));

        assert_eq!(g.get(ivec2(5, 5)), None);
        assert_eq!(g.get_mut(ivec2(-1, -1)), None);

        g[ivec2(2, 1)] = 7;
        assert_eq!(g.get(ivec2(2, 1)), Some(&7));
    }

    #[test]
    fn iteration() {
        let g = Grid::from_fn(2, 2, |p| p.x + 10 * p.y);
        let cells: Vec<(IVec2, i32)> =
            g.iter().map(|(p, &v)| (p, v)).collect();
        assert_eq!(
            cells,
            vec![
                (ivec2(0, 0), 0),
                (ivec2(1, 0), 1),
                (ivec2(0, 1), 10),
                (ivec2(1, 1), 11),
            ]
        );
    }
}
