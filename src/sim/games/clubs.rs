/// ♣ Sync or Sink: solve a split puzzle with three simulated teammates.
///
/// Briefing, then three rounds of Puzzle → Communication → Submission, with a
/// Regroup between rounds that deals the fragments again. A submission is
/// scored when the Submission phase is left, whether by the countdown or by
/// submitting early.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::category::Category;
use crate::domain::result::{GameResult, MAX_METRIC};
use crate::domain::score::{ratio, ScoreAggregator};
use crate::domain::tables::clubs::*;

use super::GameRng;
use crate::sim::command::Command;
use crate::sim::event::ScreenEvent;
use crate::sim::screen::{Outcome, Screen};
use crate::sim::sequencer::{Cue, PhaseSequencer, SequenceError, Step};

pub const EMOJIS: [&str; 10] = ["👍", "👎", "❓", "🔥", "🔴", "🟢", "⭕", "✅", "❌", "💡"];

pub const TEAMMATES: [&str; 3] = ["Alex", "Sam", "Jordan"];

pub const HINTS: [(&str, &str); 3] = [
    ("Alex", "I see numbers increasing..."),
    ("Sam", "Something about patterns..."),
    ("Jordan", "The third rule seems wrong..."),
];

const FRAGMENTS: [(&str, bool, bool); 6] = [
    ("The sequence starts with 2", true, true),
    ("Every third number is doubled", false, true),
    ("Add 3 to get the next number", true, false),
    ("The pattern repeats every 5 numbers", false, false),
    ("Multiply by 2 then subtract 1", true, true),
    ("The sequence is: 2, 5, 11, 23, 47...", true, false),
];

const ATTEMPTS: &str = "attempts";
const SYNCS: &str = "syncs";
const SENT: &str = "messages_sent";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClubsPhase {
    Briefing,
    Puzzle,
    Communication,
    Submission,
    Regroup,
}

#[derive(Clone, Debug)]
enum ClubsFx {
    Chatter,
}

#[derive(Clone, Debug)]
pub struct Fragment {
    pub text: &'static str,
    pub correct: bool,
    /// Only fragments the player holds are visible and selectable.
    pub held: bool,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub from: &'static str,
    pub emoji: &'static str,
}

/// How the last submission went.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncCheck {
    pub share: f64,
    pub team_accuracy: f64,
    pub success: bool,
}

pub struct ClubsGame {
    seq: PhaseSequencer<ClubsPhase, ClubsFx>,
    rng: GameRng,
    agg: ScoreAggregator,
    fragments: Vec<Fragment>,
    messages: Vec<Message>,
    last: Option<ClubsPhase>,
    last_sync: Option<SyncCheck>,
    round: u32,
    cursor: usize,
}

impl ClubsGame {
    pub fn new(rng: GameRng) -> Result<Self, SequenceError> {
        let mut steps = vec![Step::after(ClubsPhase::Briefing, BRIEFING_MS)];
        for r in 0..ROUNDS {
            steps.push(Step::on_action(ClubsPhase::Puzzle));
            steps.push(Step::on_action(ClubsPhase::Communication));
            steps.push(Step::after_or_action(ClubsPhase::Submission, SUBMIT_MS));
            if r + 1 < ROUNDS {
                steps.push(Step::after(ClubsPhase::Regroup, REGROUP_MS));
            }
        }
        let fragments = FRAGMENTS
            .iter()
            .map(|&(text, correct, held)| Fragment { text, correct, held, selected: false })
            .collect();
        Ok(ClubsGame {
            seq: PhaseSequencer::new(steps)?,
            rng,
            agg: ScoreAggregator::new(Category::Clubs),
            fragments,
            messages: Vec::new(),
            last: None,
            last_sync: None,
            round: 1,
            cursor: 0,
        })
    }

    // ── View ──

    pub fn phase(&self) -> Option<ClubsPhase> {
        self.seq.current()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Indices of the fragments the player holds.
    pub fn hand(&self) -> Vec<usize> {
        (0..self.fragments.len()).filter(|&i| self.fragments[i].held).collect()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_sync(&self) -> Option<SyncCheck> {
        self.last_sync
    }

    pub fn syncs(&self) -> (u32, u32) {
        (self.agg.get(SYNCS) as u32, self.agg.get(ATTEMPTS) as u32)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.seq.remaining().unwrap_or(0)
    }

    // ── Rules ──

    fn toggle(&mut self, slot: usize) {
        if let Some(&i) = self.hand().get(slot) {
            self.fragments[i].selected = !self.fragments[i].selected;
        }
    }

    fn send(&mut self, slot: usize, events: &mut Vec<ScreenEvent>) {
        if let Some(&emoji) = EMOJIS.get(slot) {
            self.messages.push(Message { from: "You", emoji });
            self.agg.incr(SENT);
            events.push(ScreenEvent::Cue);
        }
    }

    fn chatter(&mut self) {
        if !self.rng.gen_bool(CHATTER_P) {
            return;
        }
        let from = TEAMMATES.choose(&mut self.rng).copied();
        let emoji = EMOJIS.choose(&mut self.rng).copied();
        if let (Some(from), Some(emoji)) = (from, emoji) {
            self.messages.push(Message { from, emoji });
        }
    }

    fn submit(&mut self, events: &mut Vec<ScreenEvent>) {
        let total = self.fragments.iter().filter(|f| f.correct).count();
        let mine = self.fragments.iter().filter(|f| f.correct && f.selected).count();
        let share = ratio(mine as f64, total as f64);
        let team_accuracy = self.rng.gen::<f64>() * (1.0 - TEAM_ACCURACY_MIN) + TEAM_ACCURACY_MIN;
        let success = share > SYNC_SHARE && team_accuracy > TEAM_ACCURACY_PASS;

        self.agg.incr(ATTEMPTS);
        if success {
            self.agg.incr(SYNCS);
            events.push(ScreenEvent::Hit);
        } else {
            events.push(ScreenEvent::Miss);
        }
        tracing::debug!(round = self.round, share, team_accuracy, success, "sync submitted");
        self.last_sync = Some(SyncCheck { share, team_accuracy, success });
    }

    fn reshuffle(&mut self) {
        for f in self.fragments.iter_mut() {
            f.held = self.rng.gen_bool(RESHUFFLE_HOLD_P);
            f.correct = self.rng.gen_bool(RESHUFFLE_CORRECT_P);
            f.selected = false;
        }
    }

    fn seal(&mut self) -> GameResult {
        let agg = std::mem::replace(&mut self.agg, ScoreAggregator::new(Category::Clubs));
        let sync_rate = agg.ratio_of(SYNCS, ATTEMPTS) * MAX_METRIC;
        let communication = (agg.get(SENT) * MESSAGE_POINTS).min(MAX_METRIC);
        let solving = ratio(agg.get(SYNCS), ROUNDS as f64) * MAX_METRIC;
        let mean = (communication + solving + sync_rate) / 3.0;
        agg.seal(
            mean * SCORE_SCALE,
            [
                ("Sync Success Rate", sync_rate),
                ("Communication", communication),
                ("Problem Solving", solving),
                ("Team Collaboration", sync_rate),
            ],
        )
    }

    fn on_cue(&mut self, cue: Cue<ClubsPhase, ClubsFx>, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        if matches!(cue, Cue::Entered(_) | Cue::Completed) && self.last == Some(ClubsPhase::Submission) {
            self.submit(events);
        }
        match cue {
            Cue::Entered(phase) => {
                self.last = Some(phase);
                self.cursor = 0;
                match phase {
                    ClubsPhase::Communication => self.seq.every(CHATTER_MS, ClubsFx::Chatter),
                    ClubsPhase::Regroup => {
                        self.reshuffle();
                        self.round += 1;
                    }
                    ClubsPhase::Briefing | ClubsPhase::Puzzle | ClubsPhase::Submission => {}
                }
                None
            }
            Cue::Effect(ClubsFx::Chatter) => {
                self.chatter();
                None
            }
            Cue::Completed => {
                self.last = None;
                let result = self.seal();
                tracing::info!(score = result.score(), profile = result.profile(), "clubs complete");
                events.push(ScreenEvent::Completed);
                Some(Outcome::GameComplete(result))
            }
        }
    }

    fn ready(&mut self, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        let cue = self.seq.act()?;
        self.on_cue(cue, events)
    }
}

impl Screen for ClubsGame {
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
        let rows = match self.seq.current()? {
            ClubsPhase::Puzzle => self.hand().len(),
            ClubsPhase::Communication => EMOJIS.len(),
            _ => 0,
        };
        match (self.seq.current()?, cmd) {
            (ClubsPhase::Puzzle | ClubsPhase::Communication, Command::Left | Command::Up) if rows > 0 => {
                self.cursor = (self.cursor + rows - 1) % rows;
                None
            }
            (ClubsPhase::Puzzle | ClubsPhase::Communication, Command::Right | Command::Down) if rows > 0 => {
                self.cursor = (self.cursor + 1) % rows;
                None
            }
            (ClubsPhase::Puzzle, Command::Confirm) => {
                self.toggle(self.cursor);
                None
            }
            (ClubsPhase::Puzzle, Command::Pick(i)) => {
                self.toggle(i as usize);
                None
            }
            (ClubsPhase::Communication, Command::Confirm) => {
                self.send(self.cursor, events);
                None
            }
            (ClubsPhase::Communication, Command::Pick(i)) => {
                self.send(i as usize, events);
                None
            }
            (ClubsPhase::Puzzle | ClubsPhase::Communication, Command::Next) => self.ready(events),
            (ClubsPhase::Submission, Command::Confirm | Command::Next) => self.ready(events),
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
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn game(seed: u64) -> ClubsGame {
        ClubsGame::new(Box::new(ChaCha8Rng::seed_from_u64(seed))).unwrap()
    }

    /// Play every round: select the whole hand, send `messages` emoji, submit.
    fn play(g: &mut ClubsGame, messages: usize, early: bool) -> GameResult {
        play_logged(g, messages, early, &mut vec![])
    }

    fn play_logged(g: &mut ClubsGame, messages: usize, early: bool, ev: &mut Vec<ScreenEvent>) -> GameResult {
        for _ in 0..10_000 {
            match g.phase() {
                Some(ClubsPhase::Puzzle) => {
                    for slot in 0..g.hand().len() {
                        g.command(Command::Pick(slot as u8), ev);
                    }
                    g.command(Command::Next, ev);
                }
                Some(ClubsPhase::Communication) => {
                    for i in 0..messages {
                        g.command(Command::Pick(i as u8), ev);
                    }
                    g.command(Command::Next, ev);
                }
                Some(ClubsPhase::Submission) if early => {
                    if let Some(Outcome::GameComplete(r)) = g.command(Command::Confirm, ev) {
                        return r;
                    }
                }
                _ => {}
            }
            if let Some(Outcome::GameComplete(r)) = g.tick(50, ev) {
                return r;
            }
        }
        panic!("clubs never finished");
    }

    #[test]
    fn briefing_then_puzzle() {
        let mut g = game(1);
        g.tick(BRIEFING_MS - 50, &mut vec![]);
        assert_eq!(g.phase(), Some(ClubsPhase::Briefing));
        g.tick(50, &mut vec![]);
        assert_eq!(g.phase(), Some(ClubsPhase::Puzzle));
        assert_eq!(g.hand(), vec![0, 1, 4]);
    }

    #[test]
    fn only_held_fragments_toggle() {
        let mut g = game(1);
        g.tick(BRIEFING_MS, &mut vec![]);
        g.command(Command::Pick(2), &mut vec![]);
        assert!(g.fragments()[4].selected);
        g.command(Command::Pick(2), &mut vec![]);
        assert!(!g.fragments()[4].selected);
        g.command(Command::Pick(5), &mut vec![]);
        assert!(g.fragments().iter().all(|f| !f.selected));
    }

    #[test]
    fn every_round_is_submitted_once() {
        for early in [false, true] {
            let mut g = game(2);
            let mut ev = vec![];
            let r = play_logged(&mut g, 0, early, &mut ev);
            let submitted = ev
                .iter()
                .filter(|e| matches!(e, ScreenEvent::Hit | ScreenEvent::Miss))
                .count();
            assert_eq!(submitted, ROUNDS as usize);
            assert_eq!(r.category(), Category::Clubs);
            let solving = r.breakdown().get("Problem Solving").unwrap();
            let rate = r.breakdown().get("Team Collaboration").unwrap();
            // With three attempts both are successes/3.
            assert!((solving - rate).abs() < 1e-9);
            assert_eq!(r.breakdown().get("Communication"), Some(0.0));
        }
    }

    #[test]
    fn first_deal_cannot_reach_the_share() {
        let mut g = game(3);
        g.tick(BRIEFING_MS, &mut vec![]);
        for slot in 0..3 {
            g.command(Command::Pick(slot), &mut vec![]);
        }
        g.command(Command::Next, &mut vec![]);
        g.command(Command::Next, &mut vec![]);
        let mut ev = vec![];
        g.command(Command::Confirm, &mut ev);
        let sync = g.last_sync().unwrap();
        assert_eq!(sync.share, 0.5);
        assert!(!sync.success);
        assert_eq!(ev, vec![ScreenEvent::Miss]);
        assert_eq!(g.phase(), Some(ClubsPhase::Regroup));
    }

    #[test]
    fn messages_count_toward_communication() {
        let mut g = game(4);
        let r = play(&mut g, 4, true);
        // Four messages in each of three rounds, capped at 100.
        assert_eq!(r.breakdown().get("Communication"), Some(100.0));
        let own = g.messages().iter().filter(|m| m.from == "You").count();
        assert_eq!(own, 12);
    }

    #[test]
    fn score_is_twice_the_mean() {
        let mut g = game(5);
        let r = play(&mut g, 1, true);
        let b = r.breakdown();
        let mean = (b.get("Communication").unwrap()
            + b.get("Problem Solving").unwrap()
            + b.get("Team Collaboration").unwrap())
            / 3.0;
        assert_eq!(r.score(), (mean * SCORE_SCALE).round() as u32);
    }

    #[test]
    fn teammates_only_talk_during_communication() {
        let mut g = game(6);
        g.tick(BRIEFING_MS, &mut vec![]);
        g.tick(CHATTER_MS * 20, &mut vec![]);
        assert!(g.messages().is_empty());
        g.command(Command::Next, &mut vec![]);
        assert_eq!(g.phase(), Some(ClubsPhase::Communication));
        for _ in 0..50 {
            g.tick(CHATTER_MS, &mut vec![]);
        }
        assert!(!g.messages().is_empty());
        assert!(g.messages().iter().all(|m| TEAMMATES.contains(&m.from)));
    }
}
