/// Kinetic actor: the shared movement + collision core for player and enemies.
///
/// Velocities are per-tick pixel deltas. Integration is discrete:
///   1. gravity adds to `vy` every tick (no terminal velocity)
///   2. world-edge clamp on the horizontal axis
///   3. axis-separated resolution against static blocks:
///        horizontal pass: move by `vx`, push out of every hit block
///        vertical pass  : move by `vy`, push out of every hit block
///
/// The vertical pass never looks at what the horizontal pass did, so a
/// diagonal move can't snag on a corner or resolve a wall as a floor.
///
/// What happens to `vx` on a wall hit differs per actor and is selected
/// with a [`ContactPolicy`] rather than a type hierarchy.

use super::bbox::BoundingBox;
use super::entity::Block;

/// `vx` change applied by a soft reversal.
pub const REVERSE_STEP: i32 = 1;

/// Read-only view of the static level geometry handed to actors each tick.
///
/// Blocks are resolved in slice order. The world sorts them by `(y, x)` at
/// construction, which makes multi-hit alignment deterministic.
#[derive(Clone, Copy, Debug)]
pub struct Terrain<'a> {
    pub blocks: &'a [Block],
    pub width: i32,
}

/// Reaction to a horizontal block hit (or world-edge clamp).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContactPolicy {
    /// Kill horizontal velocity (player).
    Stop,
    /// `vx += REVERSE_STEP`: decelerate, then turn around over several ticks (enemy).
    SoftReverse,
}

impl ContactPolicy {
    fn apply(self, vx: &mut i32) {
        match self {
            ContactPolicy::Stop => *vx = 0,
            ContactPolicy::SoftReverse => *vx += REVERSE_STEP,
        }
    }
}

/// What one resolution pass ran into.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Contacts {
    /// Number of times the contact policy fired in the horizontal pass.
    pub wall_hits: u32,
    /// Came down onto a block top (vy was > 0).
    pub landed: bool,
    /// Rose into a block bottom (vy was < 0).
    pub bumped_head: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KineticActor {
    pub bbox: BoundingBox,
    pub vx: i32,
    pub vy: i32,
}

impl KineticActor {
    pub fn new(x: i32, y: i32) -> Self {
        KineticActor { bbox: BoundingBox::new(x, y), vx: 0, vy: 0 }
    }

    pub fn with_velocity(x: i32, y: i32, vx: i32, vy: i32) -> Self {
        KineticActor { bbox: BoundingBox::new(x, y), vx, vy }
    }

    pub fn apply_gravity(&mut self, gravity: i32) {
        self.vy += gravity;
    }

    /// Keep the box inside `[0, world_width]` horizontally.
    /// Returns true if a clamp happened.
    pub fn clamp_to_world(&mut self, world_width: i32) -> bool {
        if self.bbox.left() < 0 {
            self.bbox.align_left_to(0);
            true
        } else if self.bbox.right() > world_width {
            self.bbox.align_right_to(world_width);
            true
        } else {
            false
        }
    }

    /// Move by `(vx, vy)` one axis at a time, pushing out of blocks after each.
    ///
    /// Hits for an axis are collected right after that axis' move, then
    /// corrected in block order. The direction test is re-read per hit, so
    /// once `Stop` zeroes `vx` later hits in the same pass are left alone.
    pub fn resolve_against(&mut self, blocks: &[Block], policy: ContactPolicy) -> Contacts {
        let mut contacts = Contacts::default();

        // Horizontal
        self.bbox.translate(self.vx, 0);
        for block in hits(&self.bbox, blocks) {
            if self.vx > 0 {
                self.bbox.align_right_to(block.bbox.left());
                policy.apply(&mut self.vx);
                contacts.wall_hits += 1;
            } else if self.vx < 0 {
                self.bbox.align_left_to(block.bbox.right());
                policy.apply(&mut self.vx);
                contacts.wall_hits += 1;
            }
        }

        // Vertical
        self.bbox.translate(0, self.vy);
        for block in hits(&self.bbox, blocks) {
            if self.vy > 0 {
                self.bbox.align_bottom_to(block.bbox.top());
                self.vy = 0;
                contacts.landed = true;
            } else if self.vy < 0 {
                self.bbox.align_top_to(block.bbox.bottom());
                self.vy = 0;
                contacts.bumped_head = true;
            }
        }

        contacts
    }

    /// Is there a block directly underneath (box shifted down one pixel)?
    pub fn standing_on(&self, blocks: &[Block]) -> bool {
        let probe = self.bbox.nudged(0, 1);
        blocks.iter().any(|b| probe.overlaps(&b.bbox))
    }
}

fn hits<'a>(bbox: &BoundingBox, blocks: &'a [Block]) -> Vec<&'a Block> {
    blocks.iter().filter(|b| bbox.overlaps(&b.bbox)).collect()
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
