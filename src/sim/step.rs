/// The step function: advances the session by one tick.
///
/// Processing order:
///   1. Input resolution (jump probe on a fresh press, then move/stop)
///   2. Player update (gravity → world edges → blocks → coins)
///   3. Enemy updates, in world order (gravity → world edges → blocks)
///
/// The camera is read afterwards from `Session::snapshot`, so it always
/// reflects the player's post-update position.
///
/// Enemies don't collide with each other or with the player. Quit is the
/// frame loop's business; `step` ignores it.

use crate::domain::entity::FrameInput;
use super::event::GameEvent;
use super::session::Session;

pub fn step(session: &mut Session, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;

    resolve_input(session, input, &mut events);
    resolve_player(session, &mut events);
    resolve_enemies(session, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

fn resolve_input(session: &mut Session, input: FrameInput, events: &mut Vec<GameEvent>) {
    let player = &mut session.player;

    if input.jump && player.jump(&session.world.blocks) {
        log::debug!("tick {}: jump from ({}, {})", session.tick, player.body.bbox.x, player.body.bbox.y);
        events.push(GameEvent::PlayerJumped);
    }
    player.apply_movement(input.movement);
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(session: &mut Session, events: &mut Vec<GameEvent>) {
    let physics = session.config.physics;
    let falling_before = session.player.body.vy > 0;
    let had_coins = !session.world.coins.is_empty();

    let (terrain, coins, _) = session.world.split_mut();
    let result = session.player.update(&terrain, coins, &physics);

    if result.contacts.landed && falling_before {
        events.push(GameEvent::PlayerLanded);
    }
    if result.contacts.bumped_head {
        log::debug!("tick {}: head bump at y={}", session.tick, session.player.body.bbox.y);
    }

    for coin in &result.collected {
        log::debug!("tick {}: coin at ({}, {})", session.tick, coin.bbox.x, coin.bbox.y);
        events.push(GameEvent::CoinCollected { x: coin.bbox.x, y: coin.bbox.y });
    }

    if had_coins && session.world.coins.is_empty() {
        log::info!("All {} coins collected on tick {}", session.world.coins_total, session.tick);
        events.push(GameEvent::AllCoinsCollected);
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(session: &mut Session, events: &mut Vec<GameEvent>) {
    let physics = session.config.physics;
    let tick = session.tick;
    let (terrain, _, enemies) = session.world.split_mut();

    for enemy in enemies.iter_mut() {
        let falling_before = enemy.body.vy > 0;
        let result = enemy.update(&terrain, &physics);
        if result.contacts.landed && falling_before {
            log::debug!("tick {tick}: enemy {} landed at y={}", enemy.id, enemy.body.bbox.y);
        }
        if result.reversals > 0 {
            log::debug!("tick {tick}: enemy {} reversed x{} -> vx={}", enemy.id, result.reversals, enemy.body.vx);
            events.push(GameEvent::EnemyReversed { id: enemy.id, vx: enemy.body.vx });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
