/// Hub: pick one of the four trials.
///
/// No timers. The animation clock only drives cosmetic blinking.

use crate::domain::category::Category;

use super::command::Command;
use super::event::ScreenEvent;
use super::screen::{Outcome, Screen};

pub struct HubScreen {
    cursor: usize,
    anim_ms: u64,
}

impl HubScreen {
    pub fn new() -> Self {
        HubScreen { cursor: 0, anim_ms: 0 }
    }

    /// Hub that opens with `category` highlighted.
    pub fn focused(category: Category) -> Self {
        HubScreen { cursor: category.index(), anim_ms: 0 }
    }

    pub fn highlighted(&self) -> Category {
        Category::from_index(self.cursor).unwrap_or(Category::Spades)
    }

    pub fn anim_ms(&self) -> u64 {
        self.anim_ms
    }

    fn select(&self, category: Category) -> Option<Outcome> {
        tracing::info!(%category, "trial selected");
        Some(Outcome::CardSelected(category))
    }
}

impl Screen for HubScreen {
    fn tick(&mut self, dt: u64, _events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        self.anim_ms = self.anim_ms.wrapping_add(dt);
        None
    }

    fn command(&mut self, cmd: Command, _events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        let count = Category::ALL.len();
        match cmd {
            Command::Left | Command::Up => {
                self.cursor = (self.cursor + count - 1) % count;
                None
            }
            Command::Right | Command::Down => {
                self.cursor = (self.cursor + 1) % count;
                None
            }
            Command::Confirm => self.select(self.highlighted()),
            Command::Pick(i) => {
                let category = Category::from_index(i as usize)?;
                self.cursor = category.index();
                self.select(category)
            }
            Command::Cancel | Command::Quit => Some(Outcome::Quit),
            _ => None,
        }
    }

    fn teardown(&mut self) -> usize {
        0
    }
}
