/// Events emitted by screens while they tick or handle commands.
/// The presentation layer consumes these for sound; nothing in the
/// simulation reads them back.

#[derive(Clone, Debug, PartialEq)]
pub enum ScreenEvent {
    /// The intro's laser phase began.
    AmbientStart,
    /// A laser beam appeared; `index` counts from 0 up to `total - 1`.
    Beam { index: u64, total: u64 },
    /// A scoring action landed.
    Hit,
    /// A scoring action backfired.
    Miss,
    /// A new cue appeared that the player should react to.
    Cue,
    /// The current screen's sequence finished.
    Completed,
}
