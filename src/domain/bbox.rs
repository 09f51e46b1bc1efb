/// Axis-aligned bounding box in world pixels.
///
/// Every sprite in the game is one 64×64 tile, so the extent is fixed and
/// only the top-left corner moves. Edges follow the half-open convention:
/// `right = x + width`, `bottom = y + height`, and two boxes that merely
/// share an edge do NOT overlap.

pub const TILE_SIZE: i32 = 64;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
}

impl BoundingBox {
    pub const WIDTH: i32 = TILE_SIZE;
    pub const HEIGHT: i32 = TILE_SIZE;

    pub fn new(x: i32, y: i32) -> Self {
        BoundingBox { x, y }
    }

    pub fn left(&self) -> i32 { self.x }
    pub fn right(&self) -> i32 { self.x + Self::WIDTH }
    pub fn top(&self) -> i32 { self.y }
    pub fn bottom(&self) -> i32 { self.y + Self::HEIGHT }
    pub fn center_x(&self) -> i32 { self.x + Self::WIDTH / 2 }

    /// Strict AABB intersection. Zero-area contact is not an overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Copy of this box shifted by `(dx, dy)`. Used for contact probes.
    pub fn nudged(&self, dx: i32, dy: i32) -> BoundingBox {
        BoundingBox { x: self.x + dx, y: self.y + dy }
    }

    // ── Edge alignment ──

    pub fn align_right_to(&mut self, edge: i32) {
        self.x = edge - Self::WIDTH;
    }

    pub fn align_left_to(&mut self, edge: i32) {
        self.x = edge;
    }

    pub fn align_bottom_to(&mut self, edge: i32) {
        self.y = edge - Self::HEIGHT;
    }

    pub fn align_top_to(&mut self, edge: i32) {
        self.y = edge;
    }
}
