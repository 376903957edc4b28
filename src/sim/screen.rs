/// The contract between a screen and the controller.
///
/// A screen owns all of its state, including its timers. The only way it
/// talks upward is by returning an `Outcome` from `tick` or `command`.

use crate::domain::category::Category;
use crate::domain::result::GameResult;

use super::command::Command;
use super::event::ScreenEvent;

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// intro → hub
    IntroComplete,
    /// hub → game(category)
    CardSelected(Category),
    /// game → results
    GameComplete(GameResult),
    /// results → hub
    ReturnToHub,
    /// hub → exit
    Quit,
}

pub trait Screen {
    /// Advance the screen's clock by `dt` ms and fire whatever became due.
    fn tick(&mut self, dt: u64, events: &mut Vec<ScreenEvent>) -> Option<Outcome>;

    /// React to one user command.
    fn command(&mut self, cmd: Command, events: &mut Vec<ScreenEvent>) -> Option<Outcome>;

    /// Cancel every pending timer. Called by the controller right before the
    /// screen is dropped. Returns how many timers were cancelled.
    fn teardown(&mut self) -> usize;
}
