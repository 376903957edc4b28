/// Top-level flow: intro → hub → game(category) → results → hub.
///
/// The controller owns exactly one mounted screen and the last GameResult.
/// It feeds ticks and commands to the screen, applies whatever outcome comes
/// back, and on every transition tears the outgoing screen down before
/// dropping it. Outcomes that make no sense in the current state are logged
/// and ignored.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::category::Category;
use crate::domain::result::GameResult;

use super::command::Command;
use super::event::ScreenEvent;
use super::games::GameScreen;
use super::hub::HubScreen;
use super::intro::IntroScreen;
use super::results::ResultsScreen;
use super::screen::{Outcome, Screen};
use super::sequencer::SequenceError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Intro,
    Hub,
    Game(Category),
    Results,
}

pub enum ActiveScreen {
    Intro(IntroScreen),
    Hub(HubScreen),
    Game(GameScreen),
    Results(ResultsScreen),
}

impl ActiveScreen {
    pub fn state(&self) -> State {
        match self {
            ActiveScreen::Intro(_) => State::Intro,
            ActiveScreen::Hub(_) => State::Hub,
            ActiveScreen::Game(g) => State::Game(g.category()),
            ActiveScreen::Results(_) => State::Results,
        }
    }

    fn screen(&mut self) -> &mut dyn Screen {
        match self {
            ActiveScreen::Intro(s) => s,
            ActiveScreen::Hub(s) => s,
            ActiveScreen::Game(s) => s,
            ActiveScreen::Results(s) => s,
        }
    }
}

pub struct Controller {
    screen: ActiveScreen,
    result: Option<GameResult>,
    rng: ChaCha8Rng,
    quit: bool,
}

impl Controller {
    pub fn new(seed: u64, skip_intro: bool) -> Result<Self, SequenceError> {
        let screen = if skip_intro {
            ActiveScreen::Hub(HubScreen::new())
        } else {
            ActiveScreen::Intro(IntroScreen::new()?)
        };
        tracing::info!(seed, state = ?screen.state(), "controller started");
        Ok(Controller {
            screen,
            result: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            quit: false,
        })
    }

    pub fn state(&self) -> State {
        self.screen.state()
    }

    pub fn screen(&self) -> &ActiveScreen {
        &self.screen
    }

    /// The result of the last finished trial, until the next one starts.
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// True while the mounted screen takes auto-repeated directions.
    pub fn continuous_input(&self) -> bool {
        match &self.screen {
            ActiveScreen::Game(g) => g.wants_repeat(),
            _ => false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn tick(&mut self, dt: u64, events: &mut Vec<ScreenEvent>) -> Result<(), SequenceError> {
        if self.quit {
            return Ok(());
        }
        let outcome = self.screen.screen().tick(dt, events);
        outcome.map_or(Ok(()), |o| self.apply(o))
    }

    pub fn command(&mut self, cmd: Command, events: &mut Vec<ScreenEvent>) -> Result<(), SequenceError> {
        if self.quit {
            return Ok(());
        }
        let outcome = self.screen.screen().command(cmd, events);
        outcome.map_or(Ok(()), |o| self.apply(o))
    }

    /// Move to the next state, or log and ignore an outcome that does not
    /// belong to the current one.
    pub fn apply(&mut self, outcome: Outcome) -> Result<(), SequenceError> {
        match (self.state(), outcome) {
            (State::Intro, Outcome::IntroComplete) => {
                self.mount(ActiveScreen::Hub(HubScreen::new()));
            }
            (State::Hub, Outcome::CardSelected(category)) => {
                self.result = None;
                let rng = Box::new(ChaCha8Rng::seed_from_u64(self.rng.next_u64()));
                let game = GameScreen::new(category, rng)?;
                self.mount(ActiveScreen::Game(game));
            }
            (State::Game(category), Outcome::GameComplete(result)) if result.category() == category => {
                tracing::info!(
                    %category,
                    score = result.score(),
                    profile = result.profile(),
                    "result recorded"
                );
                self.result = Some(result);
                self.mount(ActiveScreen::Results(ResultsScreen::new()?));
            }
            (State::Results, Outcome::ReturnToHub) => {
                let hub = match &self.result {
                    Some(r) => HubScreen::focused(r.category()),
                    None => HubScreen::new(),
                };
                self.mount(ActiveScreen::Hub(hub));
            }
            (State::Hub, Outcome::Quit) => {
                let cancelled = self.screen.screen().teardown();
                tracing::info!(cancelled, "quit");
                self.quit = true;
            }
            (state, outcome) => {
                tracing::warn!(?state, ?outcome, "outcome ignored");
            }
        }
        Ok(())
    }

    fn mount(&mut self, next: ActiveScreen) {
        let from = self.state();
        let cancelled = self.screen.screen().teardown();
        self.screen = next;
        tracing::info!(?from, to = ?self.state(), cancelled, "screen changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tables::{intro, spades};

    fn ticks(c: &mut Controller, ms: u64) {
        let mut ev = vec![];
        for _ in 0..ms / 50 {
            c.tick(50, &mut ev).unwrap();
        }
    }

    fn cmd(c: &mut Controller, command: Command) {
        c.command(command, &mut vec![]).unwrap();
    }

    fn through_intro(c: &mut Controller) {
        assert_eq!(c.state(), State::Intro);
        ticks(c, intro::LOADER_MS);
        cmd(c, Command::Confirm);
        ticks(c, intro::LASER_MS + intro::BLACKOUT_MS + intro::WELCOME_MS + 100);
        assert_eq!(c.state(), State::Hub);
    }

    /// intro → hub → spades (wait on the final choice) → results → hub.
    fn full_run(seed: u64) -> (GameResult, State) {
        let mut c = Controller::new(seed, false).unwrap();
        through_intro(&mut c);

        cmd(&mut c, Command::Pick(0));
        assert_eq!(c.state(), State::Game(Category::Spades));
        ticks(&mut c, spades::ROUND_MS[..4].iter().sum());
        cmd(&mut c, Command::Pick(1));
        assert_eq!(c.state(), State::Results);
        let result = c.result().cloned().unwrap();

        for _ in 0..3 {
            cmd(&mut c, Command::Confirm);
        }
        (result, c.state())
    }

    #[test]
    fn full_run_is_deterministic() {
        let (a, end) = full_run(42);
        let (b, _) = full_run(42);
        assert_eq!(end, State::Hub);
        assert_eq!(a, b);
        assert_eq!(a.category(), Category::Spades);
        assert!(a.score() >= spades::WAIT_BONUS as u32);
    }

    #[test]
    fn hub_selection_mounts_that_game() {
        for category in Category::ALL {
            let mut c = Controller::new(1, true).unwrap();
            cmd(&mut c, Command::Pick(category.index() as u8));
            assert_eq!(c.state(), State::Game(category));
        }
    }

    #[test]
    fn skip_intro_starts_at_hub() {
        let c = Controller::new(0, true).unwrap();
        assert_eq!(c.state(), State::Hub);
        assert!(c.result().is_none());
    }

    #[test]
    fn result_lives_until_next_game_starts() {
        let mut c = Controller::new(5, true).unwrap();
        cmd(&mut c, Command::Pick(0));
        ticks(&mut c, spades::ROUND_MS.iter().sum::<u64>() + 100);
        assert_eq!(c.state(), State::Results);
        assert_eq!(c.result().map(|r| r.category()), Some(Category::Spades));

        cmd(&mut c, Command::Cancel);
        assert_eq!(c.state(), State::Hub);
        assert!(c.result().is_some());

        cmd(&mut c, Command::Pick(1));
        assert_eq!(c.state(), State::Game(Category::Diamonds));
        assert!(c.result().is_none());
        for _ in 0..6 {
            cmd(&mut c, Command::Pick(0));
        }
        assert_eq!(c.state(), State::Results);
        assert_eq!(c.result().map(|r| r.category()), Some(Category::Diamonds));
    }

    #[test]
    fn mismatched_outcomes_are_ignored() {
        let mut c = Controller::new(3, true).unwrap();
        c.apply(Outcome::IntroComplete).unwrap();
        c.apply(Outcome::ReturnToHub).unwrap();
        assert_eq!(c.state(), State::Hub);

        cmd(&mut c, Command::Pick(2));
        let stray = GameResult::new(Category::Clubs, 100.0, Default::default());
        c.apply(Outcome::GameComplete(stray)).unwrap();
        assert_eq!(c.state(), State::Game(Category::Hearts));
        assert!(c.result().is_none());
    }

    #[test]
    fn skipping_the_intro_cancels_its_timers() {
        let mut c = Controller::new(9, false).unwrap();
        ticks(&mut c, 1000);
        cmd(&mut c, Command::Skip);
        assert_eq!(c.state(), State::Hub);
        // The intro's loader deadline would otherwise still be pending.
        ticks(&mut c, 60_000);
        assert_eq!(c.state(), State::Hub);
    }

    #[test]
    fn quit_from_hub_stops_everything() {
        let mut c = Controller::new(0, true).unwrap();
        cmd(&mut c, Command::Quit);
        assert!(c.should_quit());
        cmd(&mut c, Command::Pick(0));
        assert_eq!(c.state(), State::Hub);
    }

    #[test]
    fn only_spades_motion_rounds_take_held_directions() {
        let mut c = Controller::new(4, true).unwrap();
        assert!(!c.continuous_input());
        cmd(&mut c, Command::Pick(0));
        assert!(c.continuous_input());
        ticks(&mut c, spades::ROUND_MS[0]);
        // Flash round wants discrete presses.
        assert!(!c.continuous_input());
        ticks(&mut c, spades::ROUND_MS[1]);
        assert!(c.continuous_input());
    }
}
