/// Results: staged reveal of the last trial's outcome.
///
/// Score card → visa card (after a beat) → return prompt. Confirm hurries
/// the reveal along; on the prompt it returns to the hub. Esc returns at once.
///
/// The screen does not own the GameResult; the controller does. This screen
/// only carries the reveal timeline.

use crate::domain::tables::results::*;

use super::command::Command;
use super::event::ScreenEvent;
use super::screen::{Outcome, Screen};
use super::sequencer::{Cue, PhaseSequencer, SequenceError, Step};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reveal {
    Score,
    Visa,
    Prompt,
}

pub struct ResultsScreen {
    seq: PhaseSequencer<Reveal, ()>,
    anim_ms: u64,
}

impl ResultsScreen {
    pub fn new() -> Result<Self, SequenceError> {
        let seq = PhaseSequencer::new(vec![
            Step::after_or_action(Reveal::Score, VISA_REVEAL_MS),
            Step::after_or_action(Reveal::Visa, PROMPT_REVEAL_MS),
            Step::on_action(Reveal::Prompt),
        ])?;
        Ok(ResultsScreen { seq, anim_ms: 0 })
    }

    /// How far the reveal has progressed. `None` after return.
    pub fn reveal(&self) -> Option<Reveal> {
        self.seq.current()
    }

    pub fn anim_ms(&self) -> u64 {
        self.anim_ms
    }

    fn on_cue(&mut self, cue: Cue<Reveal, ()>, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match cue {
            Cue::Completed => {
                events.push(ScreenEvent::Completed);
                Some(Outcome::ReturnToHub)
            }
            Cue::Entered(Reveal::Visa) => {
                events.push(ScreenEvent::Cue);
                None
            }
            Cue::Entered(_) | Cue::Effect(()) => None,
        }
    }
}

impl Screen for ResultsScreen {
    fn tick(&mut self, dt: u64, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        self.anim_ms = self.anim_ms.wrapping_add(dt);
        let cues = self.seq.tick(dt);
        cues.into_iter().find_map(|cue| self.on_cue(cue, events))
    }

    fn command(&mut self, cmd: Command, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match cmd {
            Command::Confirm => {
                let cue = self.seq.act()?;
                self.on_cue(cue, events)
            }
            Command::Cancel => {
                let cue = self.seq.finish()?;
                self.on_cue(cue, events)
            }
            _ => None,
        }
    }

    fn teardown(&mut self) -> usize {
        self.seq.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_stages_then_waits_for_confirm() {
        let mut r = ResultsScreen::new().unwrap();
        let mut ev = vec![];
        assert_eq!(r.tick(0, &mut ev), None);
        assert_eq!(r.reveal(), Some(Reveal::Score));
        r.tick(VISA_REVEAL_MS, &mut ev);
        assert_eq!(r.reveal(), Some(Reveal::Visa));
        r.tick(PROMPT_REVEAL_MS, &mut ev);
        assert_eq!(r.reveal(), Some(Reveal::Prompt));
        assert_eq!(r.tick(60_000, &mut ev), None);
        assert_eq!(r.command(Command::Confirm, &mut ev), Some(Outcome::ReturnToHub));
        assert_eq!(r.command(Command::Confirm, &mut ev), None);
    }

    #[test]
    fn confirm_hurries_the_reveal() {
        let mut r = ResultsScreen::new().unwrap();
        let mut ev = vec![];
        assert_eq!(r.command(Command::Confirm, &mut ev), None);
        assert_eq!(r.command(Command::Confirm, &mut ev), None);
        assert_eq!(r.reveal(), Some(Reveal::Prompt));
        assert_eq!(r.command(Command::Confirm, &mut ev), Some(Outcome::ReturnToHub));
    }

    #[test]
    fn escape_returns_immediately() {
        let mut r = ResultsScreen::new().unwrap();
        assert_eq!(r.command(Command::Cancel, &mut vec![]), Some(Outcome::ReturnToHub));
    }
}
