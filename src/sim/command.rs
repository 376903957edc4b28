/// Device-independent user commands.
///
/// Keyboard and gamepad input are both translated into these before they
/// reach a screen, so screens never see key codes.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    /// Enter / Space / gamepad confirm.
    Confirm,
    /// Esc / gamepad cancel.
    Cancel,
    /// Tab: "ready", move on to the next step of a multi-step phase.
    Next,
    /// Digit keys 1–9 map to 0–8, `0` maps to 9.
    Pick(u8),
    /// Skip a cinematic.
    Skip,
    Quit,
}
