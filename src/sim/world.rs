/// World: everything in the level except the player.
///
///   - `blocks`: static geometry. Never mutated after construction.
///   - `coins`: shrinks as the player collects them. Never grows.
///   - `enemies`: mutated in place by their own update each tick.
///   - `width` / `height`: world bounds in pixels, fixed.
///
/// Blocks are kept sorted by `(y, x)`. Resolution walks them in that order,
/// so which block wins when an actor hits several in one pass is fixed by
/// position rather than by load order.

use crate::config::PhysicsConfig;
use crate::domain::entity::{Block, Coin, Enemy};
use crate::domain::physics::Terrain;

use super::level::{LevelDef, PlacementKind};

#[derive(Clone, Debug)]
pub struct World {
    pub blocks: Vec<Block>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
    pub width: i32,
    pub height: i32,
    pub coins_total: usize,
}

impl World {
    pub fn new(mut blocks: Vec<Block>, coins: Vec<Coin>, enemies: Vec<Enemy>, width: i32, height: i32) -> Self {
        blocks.sort_by_key(|b| (b.bbox.y, b.bbox.x));
        let coins_total = coins.len();
        World { blocks, coins, enemies, width, height, coins_total }
    }

    /// Build from level placements. Player spawns are ignored here;
    /// the session owns the player.
    pub fn from_level(def: &LevelDef, physics: &PhysicsConfig) -> Self {
        let mut blocks = vec![];
        let mut coins = vec![];
        let mut enemies = vec![];

        for p in &def.placements {
            match p.kind {
                PlacementKind::Block => blocks.push(Block::new(p.x, p.y)),
                PlacementKind::Coin => coins.push(Coin::new(p.x, p.y)),
                PlacementKind::Enemy => {
                    let id = enemies.len();
                    enemies.push(Enemy::new(id, p.x, p.y, physics));
                }
                PlacementKind::PlayerSpawn => {}
            }
        }

        World::new(blocks, coins, enemies, def.width, def.height)
    }

    /// Split into the read-only terrain and the two mutable entity sets,
    /// so actors can resolve against blocks while coins/enemies change.
    pub fn split_mut(&mut self) -> (Terrain<'_>, &mut Vec<Coin>, &mut Vec<Enemy>) {
        let terrain = Terrain { blocks: &self.blocks, width: self.width };
        (terrain, &mut self.coins, &mut self.enemies)
    }

    pub fn coins_collected(&self) -> usize {
        self.coins_total - self.coins.len()
    }
}
