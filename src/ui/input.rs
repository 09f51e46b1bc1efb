/// Keyboard input tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous left/right movement while a key is held
///   - Edge-triggered jump (only fires on initial press)
///   - Movement + jump in the same tick
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;
use super::gamepad::GamepadState;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key bindings ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// `drain_events()`. Drives the edge-triggered jump.
    fresh_presses: Vec<KeyCode>,

    /// Ctrl+C seen during the most recent drain.
    interrupt: bool,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            interrupt: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per loop iteration, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.interrupt = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Fold one key event into the hold table.
    fn record(&mut self, key: KeyEvent, at: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.interrupt = true;
            return;
        }

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Release not trusted: the timeout expires the key instead.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, at);
                self.last_active.insert(key.code, at);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|c| self.is_held_at(*c, now))
    }

    /// Was any of these keys freshly pressed since the last `take_frame`?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn quit_requested(&self) -> bool {
        self.interrupt || self.any_pressed(KEYS_QUIT)
    }

    /// Combine keyboard and gamepad into one tick's input and consume the
    /// pending edge triggers. Presses that arrive between ticks are kept
    /// until the next tick reads them, so a quick tap is never lost.
    pub fn take_frame(&mut self, gp: &GamepadState) -> FrameInput {
        let input = FrameInput::from_keys(
            self.any_held(KEYS_LEFT) || self.any_pressed(KEYS_LEFT) || gp.left_held(),
            self.any_held(KEYS_RIGHT) || self.any_pressed(KEYS_RIGHT) || gp.right_held(),
            self.any_pressed(KEYS_JUMP) || gp.jump_pressed(),
            self.quit_requested() || gp.quit_pressed(),
        );
        self.fresh_presses.clear();
        input
    }

    // ── Internal ──

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::MoveDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn held_key_moves_and_tap_jumps_once() {
        let mut kb = InputState::new();
        let gp = GamepadState::new();
        let now = Instant::now();
        kb.record(press(KeyCode::Right), now);
        kb.record(press(KeyCode::Char(' ')), now);

        let first = kb.take_frame(&gp);
        assert_eq!(first.movement, Some(MoveDir::Right));
        assert!(first.jump);

        // Space still held (repeat), but the edge was consumed.
        kb.record(press(KeyCode::Char(' ')), Instant::now());
        let second = kb.take_frame(&gp);
        assert!(!second.jump);
        assert_eq!(second.movement, Some(MoveDir::Right));
    }

    #[test]
    fn release_honored_only_when_enabled() {
        let mut kb = InputState::new();
        kb.record(press(KeyCode::Left), Instant::now());
        kb.record(release(KeyCode::Left), Instant::now());
        assert!(kb.any_held(KEYS_LEFT));

        kb.honor_release = true;
        kb.record(release(KeyCode::Left), Instant::now());
        assert!(!kb.any_held(KEYS_LEFT));
    }

    #[test]
    fn ctrl_c_and_escape_request_quit() {
        let mut kb = InputState::new();
        kb.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(kb.quit_requested());

        let mut kb = InputState::new();
        kb.record(press(KeyCode::Esc), Instant::now());
        assert!(kb.take_frame(&GamepadState::new()).quit);
    }

    #[test]
    fn stale_hold_expires() {
        let mut kb = InputState::new();
        let long_ago = Instant::now() - Duration::from_secs(1);
        kb.record(press(KeyCode::Left), long_ago);
        assert!(!kb.any_held(KEYS_LEFT));
    }
}
