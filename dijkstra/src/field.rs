use glam::{ivec2, IVec2};
use rand::{seq::SliceRandom, Rng};

/// Sentinel distance for cells no path has reached.
pub const MAX_DISTANCE: i32 = 30000;

/// Standard movement cost of an open cell.
///
/// Using a coarse unit instead of 1 leaves room for terrain to nudge costs
/// up or down without switching to fractional arithmetic.
pub const DEFAULT_COST: i32 = 100;

// Raw cost sentinels stored in the node arena.
const OBSTRUCTION: i32 = -2;
const FORBIDDEN: i32 = -1;

/// Movement cost classification of a single cell.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cost {
    /// Impassable, and also seals the corner against diagonal movement
    /// past it.
    Obstruction,
    /// Impassable, but diagonal movement may still brush past it.
    Forbidden,
    /// Passable at the given non-negative step cost.
    Step(i32),
}

impl Cost {
    fn raw(self) -> i32 {
        match self {
            Cost::Obstruction => OBSTRUCTION,
            Cost::Forbidden => FORBIDDEN,
            Cost::Step(n) => {
                debug_assert!(n >= 0, "negative step cost");
                n
            }
        }
    }
}

/// One cell of the field plus its membership in the working queue.
///
/// The queue is an intrusive doubly-linked list threaded through the node
/// arena with indices instead of pointers. A node outside the queue has
/// both links `None`.
#[derive(Copy, Clone, Debug, Default)]
struct Node {
    distance: i32,
    cost: i32,
    prev: Option<u32>,
    next: Option<u32>,
}

/// Neighbor offsets, cardinals first so a 4-way scan is a prefix of the
/// 8-way one.
const NEIGHBORS: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([-1, -1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 1]),
];

/// A whole-grid shortest path field from a set of source cells.
///
/// The node arena is allocated once and reused across scans, a scan only
/// rewrites distances, costs and queue links. The queue is kept sorted by
/// nondecreasing distance; because cell costs are small near-uniform
/// integers, a relaxed cell lands close to the front and the linear splice
/// search stays effectively constant time.
pub struct DistanceField {
    width: i32,
    height: i32,
    nodes: Vec<Node>,
    head: Option<u32>,
}

impl DistanceField {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 2 && height > 2, "field too small for border ring");
        let mut ret = DistanceField {
            width,
            height,
            nodes: vec![Node::default(); (width * height) as usize],
            head: None,
        };
        ret.clear(MAX_DISTANCE);
        ret
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

    /// The outermost cell ring is reserved as a sentinel wall so the relax
    /// loop never needs per-neighbor bounds checks.
    fn on_border(&self, p: IVec2) -> bool {
        p.x <= 0 || p.y <= 0 || p.x >= self.width - 1 || p.y >= self.height - 1
    }

    fn idx(&self, p: IVec2) -> usize {
        (p.x + p.y * self.width) as usize
    }

    fn pos(&self, i: u32) -> IVec2 {
        ivec2(i as i32 % self.width, i as i32 / self.width)
    }

    /// Reset every cell to unreached and empty the queue.
    ///
    /// Costs are left alone, they are rewritten by `load_costs`.
    pub fn clear(&mut self, max_distance: i32) {
        self.head = None;
        for node in &mut self.nodes {
            node.distance = max_distance;
            node.prev = None;
            node.next = None;
        }
    }

    /// Load per-cell traversal costs from the caller's terrain.
    ///
    /// The border ring is forced to `Obstruction` no matter what the cost
    /// function says.
    pub fn load_costs(&mut self, cost_at: impl Fn(IVec2) -> Cost) {
        for i in 0..self.nodes.len() {
            let p = self.pos(i as u32);
            self.nodes[i].cost = if self.on_border(p) {
                OBSTRUCTION
            } else {
                cost_at(p).raw()
            };
        }
    }

    /// Relaxation entry point for a single cell.
    ///
    /// A no-op unless the new distance strictly improves on the cell's
    /// current one; distances only ever decrease between scans. On success
    /// the cell is (re)queued at its sorted position.
    pub fn set_distance(&mut self, p: impl Into<IVec2>, distance: i32) {
        let p = p.into();
        if self.on_border(p) {
            return;
        }

        let i = self.idx(p) as u32;
        if distance >= self.nodes[i as usize].distance {
            return;
        }
        self.nodes[i as usize].distance = distance;

        self.unlink(i);
        self.insert_sorted(i);
    }

    fn unlink(&mut self, i: u32) {
        let Node { prev, next, .. } = self.nodes[i as usize];
        if let Some(n) = next {
            self.nodes[n as usize].prev = prev;
        }
        if let Some(pv) = prev {
            self.nodes[pv as usize].next = next;
        }
        if self.head == Some(i) {
            self.head = next;
        }
        self.nodes[i as usize].prev = None;
        self.nodes[i as usize].next = None;
    }

    /// Splice an unlinked node in before the first queued node with a
    /// distance no smaller than its own.
    ///
    /// Always searches forward from the queue head. Relaxations during the
    /// main loop land near the front anyway since new distances stay close
    /// to the popped node's, and external seeds at distance zero belong at
    /// the front outright.
    fn insert_sorted(&mut self, i: u32) {
        debug_assert!(
            self.nodes[i as usize].prev.is_none()
                && self.nodes[i as usize].next.is_none(),
            "inserting a node that is still linked"
        );

        let d = self.nodes[i as usize].distance;

        let mut prev = None;
        let mut cur = self.head;
        while let Some(c) = cur {
            if self.nodes[c as usize].distance >= d {
                break;
            }
            prev = cur;
            cur = self.nodes[c as usize].next;
        }

        self.nodes[i as usize].prev = prev;
        self.nodes[i as usize].next = cur;
        match prev {
            Some(pv) => self.nodes[pv as usize].next = Some(i),
            None => self.head = Some(i),
        }
        if let Some(c) = cur {
            self.nodes[c as usize].prev = Some(i);
        }

        debug_assert!(
            prev.map_or(true, |pv| self.nodes[pv as usize].distance <= d)
                && cur.map_or(true, |c| d <= self.nodes[c as usize].distance),
            "queue order violated"
        );
    }

    /// Run the relaxation loop until the queue drains.
    ///
    /// Pops the lowest-distance cell and relaxes its 4 or 8 neighbors. A
    /// popped cell is final and never revisited; with non-negative costs
    /// this is Dijkstra's algorithm with the sorted queue standing in for
    /// the heap. Diagonal steps are refused when either cell orthogonally
    /// adjacent to the step is an obstruction, so paths cannot cut through
    /// wall corners.
    pub fn relax(&mut self, use_diagonals: bool) {
        let dirs = if use_diagonals { 8 } else { 4 };

        while let Some(i) = self.head {
            let next = self.nodes[i as usize].next;
            self.head = next;
            if let Some(n) = next {
                self.nodes[n as usize].prev = None;
            }
            self.nodes[i as usize].prev = None;
            self.nodes[i as usize].next = None;

            let p = self.pos(i);
            let d = self.nodes[i as usize].distance;

            for (dir, &offset) in NEIGHBORS[..dirs].iter().enumerate() {
                let n = p + offset;
                let cost = self.nodes[self.idx(n)].cost;
                if cost < 0 {
                    continue;
                }

                if dir >= 4 {
                    let way1 = self.idx(p + ivec2(offset.x, 0));
                    let way2 = self.idx(p + ivec2(0, offset.y));
                    if self.nodes[way1].cost == OBSTRUCTION
                        || self.nodes[way2].cost == OBSTRUCTION
                    {
                        continue;
                    }
                }

                self.set_distance(n, d + cost);
            }
        }
    }

    /// Full recomputation: reset, load costs, seed the sources at zero and
    /// relax to completion.
    pub fn scan(
        &mut self,
        cost_at: impl Fn(IVec2) -> Cost,
        sources: impl IntoIterator<Item = impl Into<IVec2>>,
        use_diagonals: bool,
    ) {
        self.clear(MAX_DISTANCE);
        self.load_costs(cost_at);
        for s in sources {
            self.set_distance(s, 0);
        }
        self.relax(use_diagonals);

        log::debug!(
            "Dijkstra scan reached {} / {} cells.",
            self.nodes.iter().filter(|n| n.distance < MAX_DISTANCE).count(),
            self.nodes.len()
        );
    }

    /// Requeue every reached passable cell at its current distance and
    /// relax again.
    ///
    /// Lets a caller rewrite distances in place, e.g. negate an approach
    /// map into a flee map, and smooth the result back into a consistent
    /// field without reseeding.
    pub fn rescan(&mut self, use_diagonals: bool) {
        self.head = None;
        for node in &mut self.nodes {
            node.prev = None;
            node.next = None;
        }
        for i in 0..self.nodes.len() as u32 {
            let node = &self.nodes[i as usize];
            if node.cost > 0 && node.distance < MAX_DISTANCE {
                self.insert_sorted(i);
            }
        }
        self.relax(use_diagonals);
    }

    /// Apply a function to every reached cell's distance.
    pub fn map_distances(&mut self, f: impl Fn(i32) -> i32) {
        for node in &mut self.nodes {
            if node.distance < MAX_DISTANCE {
                node.distance = f(node.distance);
            }
        }
    }

    /// Distance of the cell, `MAX_DISTANCE` when out of bounds or
    /// unreached.
    pub fn distance(&self, p: impl Into<IVec2>) -> i32 {
        let p = p.into();
        if !self.contains(p) {
            return MAX_DISTANCE;
        }
        self.nodes[self.idx(p)].distance
    }

    /// Whether any path from a source has reached the cell.
    pub fn reached(&self, p: impl Into<IVec2>) -> bool {
        self.distance(p) < MAX_DISTANCE
    }

    /// Best single step descending the field from `p`.
    ///
    /// Looks at all 8 neighbors, takes the minimum reached distance and
    /// breaks ties uniformly with the supplied rng. Returns `p` unchanged
    /// when no neighbor strictly improves on its distance, so a creature
    /// standing in a local minimum stays put instead of jittering.
    pub fn next_step(&self, p: impl Into<IVec2>, rng: &mut impl Rng) -> IVec2 {
        let p = p.into();
        if !self.contains(p) {
            return p;
        }

        let mut best = self.nodes[self.idx(p)].distance;
        let mut candidates: Vec<IVec2> = Vec::new();

        for &offset in &NEIGHBORS {
            let n = p + offset;
            if !self.contains(n) {
                continue;
            }
            let d = self.nodes[self.idx(n)].distance;
            if d >= MAX_DISTANCE {
                continue;
            }

            if d < best {
                best = d;
                candidates.clear();
                candidates.push(n);
            } else if d == best && !candidates.is_empty() {
                // A tie only counts once some neighbor has already beaten
                // the starting cell's own distance.
                candidates.push(n);
            }
        }

        candidates.choose(rng).copied().unwrap_or(p)
    }

    #[cfg(test)]
    fn queue_distances(&self) -> Vec<i32> {
        let mut ret = Vec::new();
        let mut cur = self.head;
        while let Some(c) = cur {
            ret.push(self.nodes[c as usize].distance);
            cur = self.nodes[c as usize].next;
        }
        ret
    }
}
