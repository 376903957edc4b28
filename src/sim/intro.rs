/// Intro cinematic.
///
/// Loader → Enter (waits for confirm) → Laser → Blackout → Welcome → done.
/// Loader progress is derived from time in phase; laser beams are individual
/// phase-scoped timers so a skip cancels the ones not yet shown.

use crate::domain::tables::intro::*;

use super::command::Command;
use super::event::ScreenEvent;
use super::screen::{Outcome, Screen};
use super::sequencer::{Cue, PhaseSequencer, SequenceError, Step};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IntroPhase {
    Loader,
    Enter,
    Laser,
    Blackout,
    Welcome,
}

#[derive(Clone, Debug)]
pub enum IntroFx {
    Beam(u64),
}

pub struct IntroScreen {
    seq: PhaseSequencer<IntroPhase, IntroFx>,
    beams: u64,
}

impl IntroScreen {
    pub fn new() -> Result<Self, SequenceError> {
        let seq = PhaseSequencer::new(vec![
            Step::after(IntroPhase::Loader, LOADER_MS),
            Step::on_action(IntroPhase::Enter),
            Step::after(IntroPhase::Laser, LASER_MS),
            Step::after(IntroPhase::Blackout, BLACKOUT_MS),
            Step::after(IntroPhase::Welcome, WELCOME_MS),
        ])?;
        Ok(IntroScreen { seq, beams: 0 })
    }

    pub fn phase(&self) -> Option<IntroPhase> {
        self.seq.current()
    }

    /// Loader fill, 0–100.
    pub fn progress(&self) -> u64 {
        match self.seq.current() {
            Some(IntroPhase::Loader) => {
                (self.seq.elapsed() / LOADER_STEP_MS * LOADER_STEP_PCT).min(100)
            }
            _ => 100,
        }
    }

    /// Laser beams revealed so far.
    pub fn beams(&self) -> u64 {
        self.beams
    }

    /// Milliseconds spent in the current phase, for blink timing.
    pub fn phase_elapsed(&self) -> u64 {
        self.seq.elapsed()
    }

    fn on_cue(&mut self, cue: Cue<IntroPhase, IntroFx>, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match cue {
            Cue::Entered(IntroPhase::Laser) => {
                events.push(ScreenEvent::AmbientStart);
                let spacing = LASER_MS / BEAMS;
                for i in 0..BEAMS {
                    self.seq.schedule(i * spacing, IntroFx::Beam(i));
                }
                None
            }
            Cue::Entered(_) => None,
            Cue::Effect(IntroFx::Beam(i)) => {
                self.beams = i + 1;
                events.push(ScreenEvent::Beam { index: i, total: BEAMS });
                None
            }
            Cue::Completed => {
                events.push(ScreenEvent::Completed);
                tracing::info!("intro complete");
                Some(Outcome::IntroComplete)
            }
        }
    }
}

impl Screen for IntroScreen {
    fn tick(&mut self, dt: u64, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        self.seq.advance(dt);
        while let Some(cue) = self.seq.poll() {
            if let Some(out) = self.on_cue(cue, events) {
                return Some(out);
            }
        }
        None
    }

    fn command(&mut self, cmd: Command, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match cmd {
            Command::Confirm if self.seq.current() == Some(IntroPhase::Enter) => {
                let cue = self.seq.act()?;
                self.on_cue(cue, events)
            }
            Command::Skip | Command::Cancel => {
                tracing::debug!(phase = ?self.seq.current(), "intro skipped");
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

    fn run(intro: &mut IntroScreen, ms: u64) -> Option<Outcome> {
        let mut events = vec![];
        for _ in 0..ms / 50 {
            if let Some(o) = intro.tick(50, &mut events) {
                return Some(o);
            }
        }
        None
    }

    #[test]
    fn loader_fills_then_waits_for_enter() {
        let mut intro = IntroScreen::new().unwrap();
        run(&mut intro, 2500);
        assert_eq!(intro.phase(), Some(IntroPhase::Loader));
        assert_eq!(intro.progress(), 50);
        assert_eq!(run(&mut intro, 3000), None);
        assert_eq!(intro.phase(), Some(IntroPhase::Enter));
        // Nothing happens without the key.
        assert_eq!(run(&mut intro, 60_000), None);
        assert_eq!(intro.phase(), Some(IntroPhase::Enter));
    }

    #[test]
    fn full_cinematic_completes_once() {
        let mut intro = IntroScreen::new().unwrap();
        let mut events = vec![];
        run(&mut intro, LOADER_MS);
        assert_eq!(intro.command(Command::Confirm, &mut events), None);
        assert_eq!(intro.phase(), Some(IntroPhase::Laser));

        run(&mut intro, LASER_MS - 50);
        assert_eq!(intro.beams(), BEAMS);

        let out = run(&mut intro, BLACKOUT_MS + WELCOME_MS + 100);
        assert_eq!(out, Some(Outcome::IntroComplete));
        assert_eq!(run(&mut intro, 10_000), None);
        assert_eq!(intro.command(Command::Skip, &mut events), None);
    }

    #[test]
    fn skip_cancels_pending_beams() {
        let mut intro = IntroScreen::new().unwrap();
        let mut events = vec![];
        run(&mut intro, LOADER_MS);
        intro.command(Command::Confirm, &mut events);
        run(&mut intro, 1000);
        let shown = intro.beams();
        assert!(shown > 0 && shown < BEAMS);

        assert_eq!(intro.command(Command::Skip, &mut events), Some(Outcome::IntroComplete));
        run(&mut intro, LASER_MS);
        assert_eq!(intro.beams(), shown);
    }

    #[test]
    fn teardown_stops_the_clock() {
        let mut intro = IntroScreen::new().unwrap();
        run(&mut intro, LOADER_MS);
        intro.command(Command::Confirm, &mut vec![]);
        run(&mut intro, 100);
        assert!(intro.teardown() > 0);
        assert_eq!(run(&mut intro, 20_000), None);
    }
}
