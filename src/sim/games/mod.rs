/// The four trials, one per suit.
///
/// Each trial is a `Screen` built on a `PhaseSequencer` and a
/// `ScoreAggregator`. Randomness comes in through the boxed generator handed
/// over by the controller, so a fixed seed replays a run exactly.

pub mod clubs;
pub mod diamonds;
pub mod hearts;
pub mod spades;

use rand::RngCore;

use crate::domain::category::Category;

use super::command::Command;
use super::event::ScreenEvent;
use super::screen::{Outcome, Screen};
use super::sequencer::SequenceError;

pub use clubs::ClubsGame;
pub use diamonds::DiamondsGame;
pub use hearts::HeartsGame;
pub use spades::{SpadesGame, SpadesPhase};

/// Random source injected into a trial.
pub type GameRng = Box<dyn RngCore>;

pub enum GameScreen {
    Spades(SpadesGame),
    Diamonds(DiamondsGame),
    Hearts(HeartsGame),
    Clubs(ClubsGame),
}

impl GameScreen {
    pub fn new(category: Category, rng: GameRng) -> Result<Self, SequenceError> {
        Ok(match category {
            Category::Spades => GameScreen::Spades(SpadesGame::new(rng)?),
            Category::Diamonds => GameScreen::Diamonds(DiamondsGame::new()?),
            Category::Hearts => GameScreen::Hearts(HeartsGame::new(rng)?),
            Category::Clubs => GameScreen::Clubs(ClubsGame::new(rng)?),
        })
    }

    pub fn category(&self) -> Category {
        match self {
            GameScreen::Spades(_) => Category::Spades,
            GameScreen::Diamonds(_) => Category::Diamonds,
            GameScreen::Hearts(_) => Category::Hearts,
            GameScreen::Clubs(_) => Category::Clubs,
        }
    }

    /// Whether a held direction should keep moving the player's marker.
    pub fn wants_repeat(&self) -> bool {
        match self {
            GameScreen::Spades(g) => matches!(
                g.phase(),
                Some(SpadesPhase::Tracking) | Some(SpadesPhase::Slider)
            ),
            _ => false,
        }
    }

    fn inner(&mut self) -> &mut dyn Screen {
        match self {
            GameScreen::Spades(g) => g,
            GameScreen::Diamonds(g) => g,
            GameScreen::Hearts(g) => g,
            GameScreen::Clubs(g) => g,
        }
    }
}

impl Screen for GameScreen {
    fn tick(&mut self, dt: u64, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        self.inner().tick(dt, events)
    }

    fn command(&mut self, cmd: Command, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        self.inner().command(cmd, events)
    }

    fn teardown(&mut self) -> usize {
        self.inner().teardown()
    }
}
