/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Up / Down / Left / Right
///   A / Start             →  Confirm
///   B / Select            →  Cancel
///   R1 / X                →  Next
///   Y                     →  Skip

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::command::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-input state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Command-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    next: Vec<Btn>,
    skip: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::A, Btn::Start],
            cancel:  vec![Btn::B, Btn::Select],
            next:    vec![Btn::R1, Btn::X],
            skip:    vec![Btn::Y],
        }
    }
}

/// D-pad and stick folded into four directions, in `Command` order.
#[derive(Clone, Copy, Debug, Default)]
struct Directions {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

impl Directions {
    fn iter(&self) -> [(Command, BtnState); 4] {
        [
            (Command::Up, self.up),
            (Command::Down, self.down),
            (Command::Left, self.left),
            (Command::Right, self.right),
        ]
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    dpad: Directions,
    stick: Directions,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "gamepad support unavailable");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad: Directions::default(),
            stick: Directions::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Lists with no known button name keep
    /// the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String], into: &mut Vec<Btn>) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *into = parsed;
            }
        }
        let map = &mut self.action_map;
        parse_list(&cfg.confirm, &mut map.confirm);
        parse_list(&cfg.cancel, &mut map.cancel);
        parse_list(&cfg.next, &mut map.next);
        parse_list(&cfg.skip, &mut map.skip);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    tracing::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states
        self.stick.left.set(self.stick_x < -STICK_DEADZONE);
        self.stick.right.set(self.stick_x > STICK_DEADZONE);
        self.stick.up.set(self.stick_y > STICK_DEADZONE);
        self.stick.down.set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp => return self.dpad.up.set(held),
            Button::DPadDown => return self.dpad.down.set(held),
            Button::DPadLeft => return self.dpad.left.set(held),
            Button::DPadRight => return self.dpad.right.set(held),
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)].set(held);
        }
    }

    // ── Command queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    /// Commands for buttons pressed since the last update.
    pub fn commands(&self) -> Vec<Command> {
        let mut out: Vec<Command> = self
            .dpad
            .iter()
            .into_iter()
            .zip(self.stick.iter())
            .filter(|((_, d), (_, s))| d.just_pressed || s.just_pressed)
            .map(|((cmd, _), _)| cmd)
            .collect();
        let map = &self.action_map;
        for (btns, cmd) in [
            (&map.confirm, Command::Confirm),
            (&map.cancel, Command::Cancel),
            (&map.next, Command::Next),
            (&map.skip, Command::Skip),
        ] {
            if self.any_just_pressed(btns) {
                out.push(cmd);
            }
        }
        out
    }

    /// A direction held down but not pressed this update.
    pub fn repeat_direction(&self) -> Option<Command> {
        self.dpad
            .iter()
            .into_iter()
            .zip(self.stick.iter())
            .find(|((_, d), (_, s))| (d.held && !d.just_pressed) || (s.held && !s.just_pressed))
            .map(|((cmd, _), _)| cmd)
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }
        for d in [&mut self.dpad, &mut self.stick] {
            d.up.just_pressed = false;
            d.down.just_pressed = false;
            d.left.just_pressed = false;
            d.right.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons {
            *b = BtnState::default();
        }
        self.dpad = Directions::default();
        self.stick = Directions::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 10],
            dpad: Directions::default(),
            stick: Directions::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    #[test]
    fn buttons_map_through_config() {
        let mut gp = pad();
        gp.load_button_config(&GamepadConfig {
            confirm: vec!["x".into()],
            cancel: vec!["nonsense".into()],
            next: vec![],
            skip: vec!["north".into()],
        });
        gp.buttons[btn_index(Btn::X)].set(true);
        gp.buttons[btn_index(Btn::B)].set(true);
        gp.buttons[btn_index(Btn::Y)].set(true);
        // X is now confirm, and still next by default; B keeps its default cancel.
        assert_eq!(
            gp.commands(),
            vec![Command::Confirm, Command::Cancel, Command::Next, Command::Skip]
        );
    }

    #[test]
    fn dpad_press_then_hold() {
        let mut gp = pad();
        gp.dpad.left.set(true);
        assert_eq!(gp.commands(), vec![Command::Left]);
        assert_eq!(gp.repeat_direction(), None);
        gp.update();
        assert!(gp.commands().is_empty());
        assert_eq!(gp.repeat_direction(), Some(Command::Left));
        gp.release_all();
        assert_eq!(gp.repeat_direction(), None);
    }
}
