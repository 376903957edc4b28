/// Keyboard input: raw key tracking and translation to `Command`s.
///
/// Tracks which keys are currently held down, enabling:
///   - Edge-triggered commands (one per fresh press, in arrival order)
///   - Auto-repeat of a held arrow key where a screen wants continuous input
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::command::Command;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Tab];
const KEYS_SKIP: &[KeyCode] = &[KeyCode::Char('k'), KeyCode::Char('K')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// The command a single key maps to, if any.
pub fn command_for(code: KeyCode) -> Option<Command> {
    let is = |set: &[KeyCode]| set.contains(&code);
    if is(KEYS_LEFT) {
        Some(Command::Left)
    } else if is(KEYS_RIGHT) {
        Some(Command::Right)
    } else if is(KEYS_UP) {
        Some(Command::Up)
    } else if is(KEYS_DOWN) {
        Some(Command::Down)
    } else if is(KEYS_CONFIRM) {
        Some(Command::Confirm)
    } else if is(KEYS_NEXT) {
        Some(Command::Next)
    } else if is(KEYS_SKIP) {
        Some(Command::Skip)
    } else if is(KEYS_QUIT) {
        Some(Command::Quit)
    } else if code == KeyCode::Esc {
        Some(Command::Cancel)
    } else if let KeyCode::Char(c) = code {
        // 1–9 → 0–8, 0 → 9
        let d = c.to_digit(10)? as u8;
        Some(Command::Pick(if d == 0 { 9 } else { d - 1 }))
    } else {
        None
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl-C handling.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Commands for this frame's fresh presses, in arrival order.
    pub fn commands(&self) -> Vec<Command> {
        self.fresh_presses.iter().filter_map(|&c| command_for(c)).collect()
    }

    /// A held arrow key that was not freshly pressed this frame.
    pub fn repeat_direction(&self) -> Option<Command> {
        [KEYS_UP, KEYS_DOWN, KEYS_LEFT, KEYS_RIGHT]
            .into_iter()
            .flat_map(|set| set.iter())
            .find(|&&c| self.is_held(c) && !self.fresh_presses.contains(&c))
            .and_then(|&c| command_for(c))
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_pick_zero_based() {
        assert_eq!(command_for(KeyCode::Char('1')), Some(Command::Pick(0)));
        assert_eq!(command_for(KeyCode::Char('9')), Some(Command::Pick(8)));
        assert_eq!(command_for(KeyCode::Char('0')), Some(Command::Pick(9)));
    }

    #[test]
    fn named_keys_map() {
        assert_eq!(command_for(KeyCode::Enter), Some(Command::Confirm));
        assert_eq!(command_for(KeyCode::Esc), Some(Command::Cancel));
        assert_eq!(command_for(KeyCode::Tab), Some(Command::Next));
        assert_eq!(command_for(KeyCode::Char('w')), Some(Command::Up));
        assert_eq!(command_for(KeyCode::Char('q')), Some(Command::Quit));
        assert_eq!(command_for(KeyCode::Char('z')), None);
        assert_eq!(command_for(KeyCode::F(1)), None);
    }

    #[test]
    fn repeated_press_is_one_command() {
        let mut kb = InputState::new();
        kb.record(press(KeyCode::Char('2')));
        kb.record(press(KeyCode::Char('2')));
        kb.record(press(KeyCode::Enter));
        assert_eq!(kb.commands(), vec![Command::Pick(1), Command::Confirm]);
        // Held but fresh this frame: no repeat yet.
        kb.record(press(KeyCode::Left));
        assert_eq!(kb.repeat_direction(), None);
        kb.fresh_presses.clear();
        assert_eq!(kb.repeat_direction(), Some(Command::Left));
    }

    #[test]
    fn ctrl_c_is_seen() {
        let mut kb = InputState::new();
        kb.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(kb.ctrl_c_pressed());
    }
}
