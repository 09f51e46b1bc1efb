/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and HUD messages.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    CoinCollected { x: i32, y: i32 },
    AllCoinsCollected,
    PlayerJumped,
    /// Came down onto a block after being airborne.
    PlayerLanded,
    /// `vx` is the enemy's velocity after all reversals this tick.
    EnemyReversed { id: usize, vx: i32 },
}
