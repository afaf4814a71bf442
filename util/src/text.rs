//! String utilities.

use glam::{ivec2, IVec2};

pub trait StrExt {
    /// Number of whitespace characters shared at the start of every
    /// nonempty line.
    fn indentation(&self) -> usize;

    /// Iterate non-whitespace chars and their cell positions on a
    /// multi-line ASCII map string.
    ///
    /// Shared indentation and leading blank lines are skipped so map
    /// literals can be indented in source code.
    fn char_grid(&self) -> impl Iterator<Item = (IVec2, char)> + '_;
}

impl StrExt for str {
    fn indentation(&self) -> usize {
        self.lines()
            .filter(|a| !a.trim().is_empty())
            .map(|a| a.chars().take_while(|c| c.is_whitespace()).count())
            .min()
            .unwrap_or(0)
    }

    fn char_grid(&self) -> impl Iterator<Item = (IVec2, char)> + '_ {
        let x_skip = self.indentation();

        self.lines()
            .skip_while(|a| a.trim().is_empty())
            .enumerate()
            .flat_map(move |(y, line)| {
                line.chars()
                    .skip(x_skip)
                    .enumerate()
                    .filter(|(_, c)| !c.is_whitespace())
                    .map(move |(x, c)| (ivec2(x as i32, y as i32), c))
            })
    }
}
