/// Entities: Block and Coin (static), Player and Enemy (kinetic).
///
/// Player and Enemy both wrap a `KineticActor`; they differ only in how
/// they react to walls (`ContactPolicy`) and in what extra steps they run
/// per tick (jump probe + coin pickup for the player).

use super::bbox::BoundingBox;
use super::physics::{ContactPolicy, Contacts, KineticActor, Terrain, REVERSE_STEP};
use crate::config::PhysicsConfig;

/// Horizontal movement request (continuous while held).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

/// Frame input: movement is held state, jump is edge-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<MoveDir>,
    pub jump: bool,
    pub quit: bool,
}

impl FrameInput {
    /// Build from raw held/pressed flags. Left wins when both are held.
    pub fn from_keys(left: bool, right: bool, jump: bool, quit: bool) -> Self {
        let movement = if left {
            Some(MoveDir::Left)
        } else if right {
            Some(MoveDir::Right)
        } else {
            None
        };
        FrameInput { movement, jump, quit }
    }
}

// ── Static entities ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Block {
    pub bbox: BoundingBox,
}

impl Block {
    pub fn new(x: i32, y: i32) -> Self {
        Block { bbox: BoundingBox::new(x, y) }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Coin {
    pub bbox: BoundingBox,
}

impl Coin {
    pub fn new(x: i32, y: i32) -> Self {
        Coin { bbox: BoundingBox::new(x, y) }
    }
}

// ── Player ──

/// Result of one `Player::update`.
#[derive(Clone, Debug, Default)]
pub struct PlayerTick {
    pub contacts: Contacts,
    pub collected: Vec<Coin>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: KineticActor,
    pub speed: i32,
    pub jump_power: i32,
}

impl Player {
    pub fn new(x: i32, y: i32, physics: &PhysicsConfig) -> Self {
        Player {
            body: KineticActor::new(x, y),
            speed: physics.player_speed,
            jump_power: physics.jump_power,
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.body.bbox
    }

    pub fn move_left(&mut self) {
        self.body.vx = -self.speed;
    }

    pub fn move_right(&mut self) {
        self.body.vx = self.speed;
    }

    pub fn stop(&mut self) {
        self.body.vx = 0;
    }

    pub fn apply_movement(&mut self, movement: Option<MoveDir>) {
        match movement {
            Some(MoveDir::Left) => self.move_left(),
            Some(MoveDir::Right) => self.move_right(),
            None => self.stop(),
        }
    }

    /// Jump if standing on a block. Mid-air presses are ignored.
    /// Returns true if the jump took effect.
    pub fn jump(&mut self, blocks: &[Block]) -> bool {
        if self.body.standing_on(blocks) {
            self.body.vy = -self.jump_power;
            true
        } else {
            false
        }
    }

    /// Remove every coin overlapping the player and hand them back.
    pub fn consume_coins(&self, coins: &mut Vec<Coin>) -> Vec<Coin> {
        let mut collected = Vec::new();
        coins.retain(|c| {
            if self.body.bbox.overlaps(&c.bbox) {
                collected.push(*c);
                false
            } else {
                true
            }
        });
        collected
    }

    /// gravity → world edges → blocks → coins
    pub fn update(&mut self, terrain: &Terrain, coins: &mut Vec<Coin>, physics: &PhysicsConfig) -> PlayerTick {
        self.body.apply_gravity(physics.gravity);
        self.body.clamp_to_world(terrain.width);
        let contacts = self.body.resolve_against(terrain.blocks, ContactPolicy::Stop);
        let collected = self.consume_coins(coins);
        PlayerTick { contacts, collected }
    }
}

// ── Enemy ──

/// Result of one `Enemy::update`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnemyTick {
    pub contacts: Contacts,
    /// Edge clamps + wall hits, i.e. how many times `reverse()` ran.
    pub reversals: u32,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: usize,
    pub body: KineticActor,
}

impl Enemy {
    pub fn new(id: usize, x: i32, y: i32, physics: &PhysicsConfig) -> Self {
        Enemy {
            id,
            body: KineticActor::with_velocity(x, y, physics.enemy_speed, 0),
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.body.bbox
    }

    /// Soft reversal: a single step toward the opposite direction.
    pub fn reverse(&mut self) {
        self.body.vx += REVERSE_STEP;
    }

    /// gravity → world edges (reverse on clamp) → blocks (reverse on wall)
    pub fn update(&mut self, terrain: &Terrain, physics: &PhysicsConfig) -> EnemyTick {
        self.body.apply_gravity(physics.gravity);
        let mut reversals = 0;
        if self.body.clamp_to_world(terrain.width) {
            self.reverse();
            reversals += 1;
        }
        let contacts = self.body.resolve_against(terrain.blocks, ContactPolicy::SoftReverse);
        reversals += contacts.wall_hits;
        EnemyTick { contacts, reversals }
    }
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn floor(y: i32, from_x: i32, to_x: i32) -> Vec<Block> {
        (from_x..=to_x).step_by(64).map(|x| Block::new(x, y)).collect()
    }

    // ── Input ──

    #[test]
    fn left_wins_over_right() {
        assert_eq!(FrameInput::from_keys(true, true, false, false).movement, Some(MoveDir::Left));
        assert_eq!(FrameInput::from_keys(false, true, false, false).movement, Some(MoveDir::Right));
        assert_eq!(FrameInput::from_keys(false, false, true, false).movement, None);
    }

    // ── Player movement ──

    #[test]
    fn movement_sets_vx_from_speed() {
        let mut p = Player::new(0, 0, &physics());
        p.move_left();
        assert_eq!(p.body.vx, -5);
        p.move_right();
        assert_eq!(p.body.vx, 5);
        p.stop();
        assert_eq!(p.body.vx, 0);
        p.apply_movement(Some(MoveDir::Left));
        assert_eq!(p.body.vx, -5);
        p.apply_movement(None);
        assert_eq!(p.body.vx, 0);
    }

    // ── Jump probe ──

    #[test]
    fn jump_from_ground_sets_vy() {
        let blocks = floor(576, 0, 640);
        let mut p = Player::new(500, 512, &physics());
        assert!(p.jump(&blocks));
        assert_eq!(p.body.vy, -20);
        assert_eq!(p.body.bbox, BoundingBox::new(500, 512));
    }

    #[test]
    fn jump_in_mid_air_is_ignored() {
        let blocks = floor(576, 0, 640);
        let mut p = Player::new(500, 400, &physics());
        p.body.vy = 7;
        assert!(!p.jump(&blocks));
        assert_eq!(p.body.vy, 7);
        assert_eq!(p.body.bbox, BoundingBox::new(500, 400));
    }

    #[test]
    fn jump_with_no_blocks_is_ignored() {
        let mut p = Player::new(0, 0, &physics());
        assert!(!p.jump(&[]));
        assert_eq!(p.body.vy, 0);
    }

    // ── Coins ──

    #[test]
    fn overlapping_coins_are_removed_once() {
        let p = Player::new(100, 100, &physics());
        let mut coins = vec![Coin::new(120, 100), Coin::new(164, 100), Coin::new(400, 400)];

        let first = p.consume_coins(&mut coins);
        assert_eq!(first, vec![Coin::new(120, 100)]);
        assert_eq!(coins.len(), 2);

        let second = p.consume_coins(&mut coins);
        assert!(second.is_empty());
        assert_eq!(coins.len(), 2);
    }

    #[test]
    fn consuming_from_empty_set_is_noop() {
        let p = Player::new(0, 0, &physics());
        let mut coins = vec![];
        assert!(p.consume_coins(&mut coins).is_empty());
    }

    // ── Player update ──

    #[test]
    fn player_update_falls_lands_and_collects() {
        let blocks = floor(576, 0, 640);
        let terrain = Terrain { blocks: &blocks, width: 1920 };
        let mut coins = vec![Coin::new(0, 500)];
        let mut p = Player::new(0, 480, &physics());

        let mut landed = false;
        let mut got = 0;
        for _ in 0..20 {
            let t = p.update(&terrain, &mut coins, &physics());
            landed |= t.contacts.landed;
            got += t.collected.len();
        }
        assert!(landed);
        assert_eq!(got, 1);
        assert!(coins.is_empty());
        assert_eq!(p.body.bbox.bottom(), 576);
        // Resting: gravity re-zeroed every tick by the floor.
        assert_eq!(p.body.vy, 0);
    }

    #[test]
    fn player_is_clamped_to_world() {
        let terrain = Terrain { blocks: &[], width: 640 };
        let mut p = Player::new(600, 0, &physics());
        p.move_right();
        p.update(&terrain, &mut vec![], &physics());
        // Clamp runs before the move, so the box can poke past for one tick.
        assert_eq!(p.body.bbox.x, 576 + 5);
        p.update(&terrain, &mut vec![], &physics());
        assert_eq!(p.body.bbox.right(), 640 + 5);
        p.body.clamp_to_world(terrain.width);
        assert_eq!(p.body.bbox.right(), 640);
    }

    // ── Enemy ──

    #[test]
    fn enemy_starts_patrolling_left() {
        let e = Enemy::new(0, 640, 256, &physics());
        assert_eq!(e.body.vx, -2);
        assert_eq!(e.body.vy, 0);
    }

    #[test]
    fn enemy_wall_contacts_decelerate_to_rest() {
        // Wall immediately to the left; floor underneath so only walls matter.
        let mut blocks = floor(128, 0, 640);
        blocks.push(Block::new(0, 64));
        let terrain = Terrain { blocks: &blocks, width: 1920 };
        let mut e = Enemy::new(0, 64, 64, &physics());

        let t1 = e.update(&terrain, &physics());
        assert_eq!(t1.reversals, 1);
        assert_eq!(e.body.vx, -1);

        let t2 = e.update(&terrain, &physics());
        assert_eq!(t2.reversals, 1);
        assert_eq!(e.body.vx, 0);

        // vx == 0 moves nowhere, so the wall is no longer struck.
        let t3 = e.update(&terrain, &physics());
        assert_eq!(t3.reversals, 0);
        assert_eq!(e.body.vx, 0);
    }

    #[test]
    fn enemy_reverse_steps_toward_positive() {
        let mut e = Enemy::new(0, 0, 0, &physics());
        e.reverse();
        assert_eq!(e.body.vx, -1);
        e.reverse();
        assert_eq!(e.body.vx, 0);
        e.reverse();
        assert!(e.body.vx > 0);
    }

    #[test]
    fn enemy_reverses_on_world_edge() {
        let blocks = floor(64, 0, 640);
        let terrain = Terrain { blocks: &blocks, width: 1920 };
        let mut e = Enemy::new(0, -3, 0, &physics());
        let t = e.update(&terrain, &physics());
        assert!(t.reversals >= 1);
        assert!(e.body.bbox.left() >= -2);
        assert_eq!(e.body.vx, -1);
    }

    #[test]
    fn enemy_lands_like_any_actor() {
        let blocks = floor(320, 0, 640);
        let terrain = Terrain { blocks: &blocks, width: 1920 };
        let mut e = Enemy::new(0, 640 - 64, 0, &physics());
        let mut landed = false;
        for _ in 0..40 {
            landed |= e.update(&terrain, &physics()).contacts.landed;
        }
        assert!(landed);
        assert_eq!(e.body.bbox.bottom(), 320);
    }
}
