/// Session: the player plus the world it runs through.
///
/// Owns both exclusively. Entities get borrowed views of the world per call
/// and never keep them across ticks. The camera is not state: it's derived
/// from the player's position whenever a snapshot is taken.
///
/// Rendering never touches the session directly. It gets a [`Snapshot`]:
/// a flat list of sprites in draw order plus the camera offset.

use crate::config::{GameConfig, PhysicsConfig};
use crate::domain::bbox::BoundingBox;
use crate::domain::camera::camera_offset;
use crate::domain::entity::Player;

use super::level::{self, LevelDef, LevelError};
use super::world::World;

/// Everything the simulation needs from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub viewport_width: i32,
    pub physics: PhysicsConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig { viewport_width: 960, physics: PhysicsConfig::default() }
    }
}

impl From<&GameConfig> for SessionConfig {
    fn from(cfg: &GameConfig) -> Self {
        SessionConfig {
            viewport_width: cfg.display.viewport_width,
            physics: cfg.physics,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub player: Player,
    pub world: World,
    pub config: SessionConfig,
    pub level_name: String,
    pub tick: u64,
}

impl Session {
    pub fn new(def: &LevelDef, config: SessionConfig) -> Result<Self, LevelError> {
        level::validate(def)?;
        let (sx, sy) = def.player_spawn().ok_or(LevelError::NoPlayerSpawn)?;

        let session = Session {
            player: Player::new(sx, sy, &config.physics),
            world: World::from_level(def, &config.physics),
            config,
            level_name: def.name.clone(),
            tick: 0,
        };
        log::info!(
            "Session started: \"{}\", player at ({sx}, {sy}), {} blocks, {} coins, {} enemies",
            session.level_name,
            session.world.blocks.len(),
            session.world.coins.len(),
            session.world.enemies.len(),
        );
        Ok(session)
    }

    /// Horizontal scroll for the current player position.
    pub fn camera_offset(&self) -> (i32, i32) {
        camera_offset(self.player.bbox(), self.world.width, self.config.viewport_width)
    }

    /// Read-only view for the renderer. Draw order: blocks, coins,
    /// enemies, then the player on top.
    pub fn snapshot(&self) -> Snapshot {
        let w = &self.world;
        let mut sprites = Vec::with_capacity(w.blocks.len() + w.coins.len() + w.enemies.len() + 1);
        sprites.extend(w.blocks.iter().map(|b| Sprite { kind: SpriteKind::Block, bbox: b.bbox }));
        sprites.extend(w.coins.iter().map(|c| Sprite { kind: SpriteKind::Coin, bbox: c.bbox }));
        sprites.extend(w.enemies.iter().map(|e| Sprite { kind: SpriteKind::Enemy, bbox: e.body.bbox }));
        sprites.push(Sprite { kind: SpriteKind::Player, bbox: self.player.body.bbox });

        Snapshot {
            sprites,
            offset: self.camera_offset(),
            world_width: w.width,
            world_height: w.height,
            coins_collected: w.coins_collected(),
            coins_total: w.coins_total,
            tick: self.tick,
            level_name: self.level_name.clone(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpriteKind {
    Block,
    Coin,
    Enemy,
    Player,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub bbox: BoundingBox,
}

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub sprites: Vec<Sprite>,
    /// Added to world coordinates to get viewport coordinates.
    pub offset: (i32, i32),
    pub world_width: i32,
    pub world_height: i32,
    pub coins_collected: usize,
    pub coins_total: usize,
    pub tick: u64,
    pub level_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{embedded_level, parse_level, Placement, PlacementKind};

    fn classic() -> Session {
        Session::new(&embedded_level().unwrap(), SessionConfig::default()).unwrap()
    }

    #[test]
    fn new_session_spawns_player() {
        let s = classic();
        assert_eq!(*s.player.bbox(), BoundingBox::new(500, 512));
        assert_eq!(s.player.speed, 5);
        assert_eq!(s.player.jump_power, 20);
        assert_eq!(s.tick, 0);
        assert_eq!(s.world.coins_total, 2);
    }

    #[test]
    fn session_rejects_level_without_spawn() {
        let def = LevelDef {
            name: "broken".into(),
            width: 640,
            height: 640,
            placements: vec![Placement { x: 0, y: 0, kind: PlacementKind::Block }],
        };
        assert!(matches!(
            Session::new(&def, SessionConfig::default()),
            Err(LevelError::NoPlayerSpawn)
        ));
    }

    #[test]
    fn session_rejects_negative_world() {
        let def = LevelDef { name: "neg".into(), width: -64, height: 640, placements: vec![] };
        assert!(Session::new(&def, SessionConfig::default()).is_err());
    }

    #[test]
    fn config_conversion_takes_viewport_and_physics() {
        let mut cfg = GameConfig::default();
        cfg.display.viewport_width = 1280;
        cfg.physics.jump_power = 12;
        let sc = SessionConfig::from(&cfg);
        assert_eq!(sc.viewport_width, 1280);
        assert_eq!(sc.physics.jump_power, 12);
    }

    #[test]
    fn camera_tracks_player_center() {
        let mut s = classic();
        // spawn center x = 532
        assert_eq!(s.camera_offset(), (480 - 532, 0));
        s.player.body.bbox.x = 0;
        assert_eq!(s.camera_offset(), (0, 0));
        s.player.body.bbox.x = 1856;
        assert_eq!(s.camera_offset(), (960 - 1920, 0));
    }

    #[test]
    fn snapshot_lists_sprites_with_player_last() {
        let s = classic();
        let snap = s.snapshot();
        assert_eq!(snap.sprites.len(), 35 + 2 + 1 + 1);
        assert_eq!(snap.sprites.last().map(|sp| sp.kind), Some(SpriteKind::Player));
        assert_eq!(snap.sprites.iter().filter(|sp| sp.kind == SpriteKind::Coin).count(), 2);
        assert_eq!(snap.offset, s.camera_offset());
        assert_eq!((snap.world_width, snap.world_height), (1920, 640));
        assert_eq!((snap.coins_collected, snap.coins_total), (0, 2));
    }

    #[test]
    fn snapshot_of_minimal_level() {
        let s = Session::new(&parse_level("P").unwrap(), SessionConfig::default()).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.sprites.len(), 1);
        assert_eq!(snap.level_name, "Unnamed Level");
    }
}
