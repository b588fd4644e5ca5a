use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

/// Axis-aligned square of the layout plane.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Square {
    mid: Vec2,
    half: f32,
}

impl Square {
    fn enclosing(points: impl Iterator<Item = Vec2>) -> Option<Self> {
        let (min, max) = points.fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(point), max.max(point)),
        );
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let span = (max - min).max(Vec2::splat(1.0));
        Some(Self {
            mid: (min + max) * 0.5,
            half: (span.max_elem() * 0.5) + 1.0,
        })
    }

    fn contains(self, point: Vec2) -> bool {
        (point.x - self.mid.x).abs() <= self.half && (point.y - self.mid.y).abs() <= self.half
    }

    /// Quadrant bits: 1 for the right half, 2 for the lower half.
    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.mid.x) | (usize::from(point.y >= self.mid.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
        let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
        Self {
            mid: self.mid + vec2(dx, dy),
            half: quarter,
        }
    }

    fn side(self) -> f32 {
        self.half * 2.0
    }

    /// Squared gap between the two squares, zero when they touch.
    fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half + other.half;
        let gap_x = ((self.mid.x - other.mid.x).abs() - reach).max(0.0);
        let gap_y = ((self.mid.y - other.mid.y).abs() - reach).max(0.0);
        (gap_x * gap_x) + (gap_y * gap_y)
    }
}

struct Cell {
    square: Square,
    centroid: Vec2,
    weight: f32,
    /// Slice of `QuadTree::order` holding this cell's nodes.
    members: Range<usize>,
    /// Children are stored next to each other; empty for leaves.
    children: Range<usize>,
}

impl Cell {
    fn new(square: Square) -> Self {
        Self {
            square,
            centroid: Vec2::ZERO,
            weight: 0.0,
            members: 0..0,
            children: 0..0,
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// What a node sees when it looks at the rest of the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Body {
    Node(usize),
    /// A distant cell collapsed onto its centroid.
    Cluster { centroid: Vec2, weight: f32 },
}

/// Flat Barnes–Hut quadtree over a subset of node indices.
///
/// Node indices are reordered so that every cell owns a contiguous run of
/// `order`; cell 0 is the root.
pub(super) struct QuadTree<'a> {
    positions: &'a [Vec2],
    order: Vec<usize>,
    cells: Vec<Cell>,
}

impl<'a> QuadTree<'a> {
    /// Builds the tree over `indices`, which must all refer to finite
    /// positions. Returns `None` for an empty subset.
    pub(super) fn build(positions: &'a [Vec2], indices: &[usize]) -> Option<Self> {
        let square = Square::enclosing(indices.iter().map(|&index| positions[index]))?;
        let mut tree = Self {
            positions,
            order: indices.to_vec(),
            cells: vec![Cell::new(square)],
        };
        tree.subdivide(0, 0..indices.len(), 0);
        Some(tree)
    }

    fn subdivide(&mut self, cell: usize, members: Range<usize>, depth: usize) {
        let positions = self.positions;
        let square = self.cells[cell].square;
        let slice = &mut self.order[members.clone()];

        let weight = slice.len() as f32;
        let sum = slice
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index]);
        let target = &mut self.cells[cell];
        target.centroid = sum / weight;
        target.weight = weight;
        target.members = members.clone();

        if slice.len() <= LEAF_CAPACITY || depth >= MAX_DEPTH {
            return;
        }

        let mut counts = [0usize; 4];
        for &index in slice.iter() {
            counts[square.quadrant(positions[index])] += 1;
        }
        if counts.iter().filter(|&&count| count > 0).count() <= 1 {
            return;
        }
        slice.sort_by_key(|&index| square.quadrant(positions[index]));

        let first_child = self.cells.len();
        let mut spans = Vec::with_capacity(4);
        let mut start = members.start;
        for (quadrant, count) in counts.into_iter().enumerate() {
            if count == 0 {
                continue;
            }
            self.cells.push(Cell::new(square.child(quadrant)));
            spans.push(start..start + count);
            start += count;
        }
        self.cells[cell].children = first_child..self.cells.len();

        for (offset, span) in spans.into_iter().enumerate() {
            self.subdivide(first_child + offset, span, depth + 1);
        }
    }

    fn members(&self, cell: &Cell) -> &[usize] {
        &self.order[cell.members.clone()]
    }

    /// Reports the layout as seen from `index`: cells whose side over
    /// distance falls below `theta` arrive as one [`Body::Cluster`], everything
    /// else node by node. `index` itself is never reported.
    pub(super) fn visit_from(&self, index: usize, theta: f32, visit: &mut impl FnMut(Body)) {
        self.visit_cell(0, index, self.positions[index], theta, visit);
    }

    fn visit_cell(
        &self,
        cell: usize,
        index: usize,
        point: Vec2,
        theta: f32,
        visit: &mut impl FnMut(Body),
    ) {
        let current = &self.cells[cell];
        if current.is_leaf() {
            for &other in self.members(current) {
                if other != index {
                    visit(Body::Node(other));
                }
            }
            return;
        }

        let distance = (point - current.centroid).length().max(1.0);
        let distant = current.weight > 1.0
            && !current.square.contains(point)
            && current.square.side() / distance < theta;
        if distant {
            visit(Body::Cluster {
                centroid: current.centroid,
                weight: current.weight,
            });
            return;
        }

        for child in current.children.clone() {
            self.visit_cell(child, index, point, theta, visit);
        }
    }

    /// Calls `visit` once per unordered pair of nodes whose cells come within
    /// `reach` of each other. Callers still check the exact distance.
    pub(super) fn for_each_pair_within(&self, reach: f32, visit: &mut impl FnMut(usize, usize)) {
        self.pairs_inside(0, reach * reach, visit);
    }

    fn pairs_inside(&self, cell: usize, reach_sq: f32, visit: &mut impl FnMut(usize, usize)) {
        let current = &self.cells[cell];
        if current.is_leaf() {
            let members = self.members(current);
            for (offset, &from) in members.iter().enumerate() {
                for &to in &members[offset + 1..] {
                    visit(from, to);
                }
            }
            return;
        }

        let children = current.children.clone();
        for first in children.clone() {
            self.pairs_inside(first, reach_sq, visit);
            for second in (first + 1)..children.end {
                self.pairs_between(first, second, reach_sq, visit);
            }
        }
    }

    fn pairs_between(
        &self,
        a: usize,
        b: usize,
        reach_sq: f32,
        visit: &mut impl FnMut(usize, usize),
    ) {
        let (cell_a, cell_b) = (&self.cells[a], &self.cells[b]);
        if cell_a.square.gap_sq(cell_b.square) > reach_sq {
            return;
        }

        let split_a = match (cell_a.is_leaf(), cell_b.is_leaf()) {
            (true, true) => {
                for &from in self.members(cell_a) {
                    for &to in self.members(cell_b) {
                        visit(from, to);
                    }
                }
                return;
            }
            (false, true) => true,
            (true, false) => false,
            (false, false) => cell_a.square.half >= cell_b.square.half,
        };

        if split_a {
            for child in cell_a.children.clone() {
                self.pairs_between(child, b, reach_sq, visit);
            }
        } else {
            for child in cell_b.children.clone() {
                self.pairs_between(a, child, reach_sq, visit);
            }
        }
    }
}
