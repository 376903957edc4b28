/// ♥ Trustfall: find the traitors among four simulated players.
///
/// Lobby, then up to five rounds of Question → Voting → Reveal. The player
/// votes, the others vote at random, the most-voted player is eliminated.
/// The game ends early once nobody is left to accuse, or when the player is
/// the one voted out.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::category::Category;
use crate::domain::result::{GameResult, MAX_METRIC};
use crate::domain::score::{ratio, ScoreAggregator};
use crate::domain::tables::hearts::*;

use super::GameRng;
use crate::sim::command::Command;
use crate::sim::event::ScreenEvent;
use crate::sim::screen::{Outcome, Screen};
use crate::sim::sequencer::{Cue, PhaseSequencer, SequenceError, Step};

pub const PROMPTS: [&str; 5] = [
    "Who would you trust with your life?",
    "Who seems most nervous right now?",
    "Who would betray the group for personal gain?",
    "Who is hiding something important?",
    "Who would you eliminate if you had to choose?",
];

const NAMES: [&str; 5] = ["You", "Alex", "Sam", "Jordan", "Casey"];

/// Index of the human player in the roster.
pub const YOU: usize = 0;

const TRUST: &str = "trust";
const BETRAYAL: &str = "betrayal";
const CAUGHT: &str = "traitors_caught";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HeartsPhase {
    Lobby,
    Question,
    Voting,
    Reveal,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub name: &'static str,
    pub traitor: bool,
    pub alive: bool,
    /// Shown to the player; 0–50, carries no information.
    pub suspicion: f64,
}

/// One ballot: voter index → target index.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Vote {
    pub voter: usize,
    pub target: usize,
}

/// Build the roster. Each simulated player turns traitor with `TRAITOR_P`;
/// with none, one random player gets a second, weaker roll.
/// Share of cast traitors voted out. A roster with no traitors leaves
/// nothing to catch, which reads as full marks.
fn social_intuition(caught: f64, total_traitors: usize) -> f64 {
    if total_traitors == 0 {
        return MAX_METRIC;
    }
    ratio(caught, total_traitors as f64) * MAX_METRIC
}

pub fn cast<R: Rng + ?Sized>(rng: &mut R) -> Vec<Player> {
    let mut players: Vec<Player> = NAMES
        .iter()
        .enumerate()
        .map(|(i, &name)| {
            if i == YOU {
                Player { name, traitor: false, alive: true, suspicion: 0.0 }
            } else {
                Player {
                    name,
                    traitor: rng.gen_bool(TRAITOR_P),
                    alive: true,
                    suspicion: rng.gen::<f64>() * SUSPICION_MAX,
                }
            }
        })
        .collect();
    if !players.iter().any(|p| p.traitor) {
        let pick = rng.gen_range(1..players.len());
        players[pick].traitor = rng.gen_bool(FALLBACK_TRAITOR_P);
    }
    players
}

/// The most-voted target. Targets are counted in order of first appearance;
/// a tie goes to the one counted later.
pub fn tally(votes: &[Vote]) -> Option<usize> {
    let mut counts: Vec<(usize, u32)> = Vec::new();
    for v in votes {
        match counts.iter_mut().find(|(t, _)| *t == v.target) {
            Some((_, n)) => *n += 1,
            None => counts.push((v.target, 1)),
        }
    }
    counts
        .into_iter()
        .reduce(|a, b| if a.1 > b.1 { a } else { b })
        .map(|(t, _)| t)
}

pub struct HeartsGame {
    seq: PhaseSequencer<HeartsPhase, ()>,
    rng: GameRng,
    agg: ScoreAggregator,
    players: Vec<Player>,
    total_traitors: usize,
    round: usize,
    cursor: usize,
    suspect: Option<usize>,
    votes: Vec<Vote>,
    eliminated: Option<usize>,
}

impl HeartsGame {
    pub fn new(mut rng: GameRng) -> Result<Self, SequenceError> {
        let mut steps = vec![Step::after(HeartsPhase::Lobby, LOBBY_MS)];
        for _ in PROMPTS {
            steps.push(Step::on_action(HeartsPhase::Question));
            steps.push(Step::on_action(HeartsPhase::Voting));
            steps.push(Step::after(HeartsPhase::Reveal, REVEAL_MS));
        }
        let players = cast(&mut rng);
        let total_traitors = players.iter().filter(|p| p.traitor).count();
        tracing::debug!(traitors = total_traitors, "roster cast");
        let mut agg = ScoreAggregator::new(Category::Hearts);
        agg.add(TRUST, TRUST_START);
        Ok(HeartsGame {
            seq: PhaseSequencer::new(steps)?,
            rng,
            agg,
            players,
            total_traitors,
            round: 0,
            cursor: 0,
            suspect: None,
            votes: Vec::new(),
            eliminated: None,
        })
    }

    // ── View ──

    pub fn phase(&self) -> Option<HeartsPhase> {
        self.seq.current()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// 0-based round index.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn prompt(&self) -> &'static str {
        PROMPTS[self.round.min(PROMPTS.len() - 1)]
    }

    /// Alive players the user can point at, in roster order.
    pub fn candidates(&self) -> Vec<usize> {
        (0..self.players.len())
            .filter(|&i| i != YOU && self.players[i].alive)
            .collect()
    }

    /// Roster index under the cursor.
    pub fn highlighted(&self) -> Option<usize> {
        self.candidates().get(self.cursor).copied()
    }

    pub fn suspect(&self) -> Option<usize> {
        self.suspect
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn eliminated(&self) -> Option<usize> {
        self.eliminated
    }

    pub fn trust(&self) -> f64 {
        self.agg.get(TRUST)
    }

    pub fn betrayal(&self) -> f64 {
        self.agg.get(BETRAYAL)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.seq.remaining().unwrap_or(0)
    }

    fn over(&self) -> bool {
        !self.players[YOU].alive || self.candidates().is_empty()
    }

    // ── Rules ──

    fn vote(&mut self, target: usize, events: &mut Vec<ScreenEvent>) {
        let alive: Vec<usize> = (0..self.players.len()).filter(|&i| self.players[i].alive).collect();
        let mut votes = Vec::with_capacity(alive.len());
        for &voter in alive.iter().filter(|&&i| i != YOU) {
            let choices: Vec<usize> = alive.iter().copied().filter(|&i| i != voter).collect();
            if let Some(&t) = choices.choose(&mut self.rng) {
                votes.push(Vote { voter, target: t });
            }
        }
        votes.push(Vote { voter: YOU, target });

        let out = tally(&votes).unwrap_or(target);
        self.players[out].alive = false;
        if self.players[out].traitor {
            self.agg.add(TRUST, TRUST_CAUGHT);
            self.agg.incr(CAUGHT);
            events.push(ScreenEvent::Hit);
        } else {
            self.agg.add(BETRAYAL, BETRAYAL_MISSED);
            self.agg.add(TRUST, TRUST_MISSED);
            events.push(ScreenEvent::Miss);
        }
        tracing::debug!(round = self.round + 1, eliminated = self.players[out].name, "vote resolved");
        self.votes = votes;
        self.eliminated = Some(out);
    }

    fn seal(&mut self) -> GameResult {
        let agg = std::mem::replace(&mut self.agg, ScoreAggregator::new(Category::Hearts));
        let trust = agg.get(TRUST);
        let betrayal = agg.get(BETRAYAL);
        let traitors_left = self.players.iter().filter(|p| p.alive && p.traitor).count();
        let bonus = if traitors_left == 0 { CLEAN_BONUS } else { TRAITOR_PENALTY };
        let intuition = social_intuition(agg.get(CAUGHT), self.total_traitors);
        agg.seal(
            trust - betrayal + bonus,
            [
                ("Trust Level", trust),
                ("Betrayal Score", betrayal),
                ("Social Intuition", intuition),
                ("Emotional Control", MAX_METRIC - betrayal),
            ],
        )
    }

    fn on_cue(&mut self, cue: Cue<HeartsPhase, ()>, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match cue {
            Cue::Entered(HeartsPhase::Question) => {
                if self.eliminated.is_some() {
                    self.round += 1;
                }
                if self.over() {
                    let cue = self.seq.finish()?;
                    return self.on_cue(cue, events);
                }
                self.cursor = 0;
                self.suspect = None;
                self.votes.clear();
                self.eliminated = None;
                events.push(ScreenEvent::Cue);
                None
            }
            Cue::Entered(HeartsPhase::Voting) => {
                self.cursor = 0;
                None
            }
            Cue::Entered(_) | Cue::Effect(()) => None,
            Cue::Completed => {
                let result = self.seal();
                tracing::info!(score = result.score(), profile = result.profile(), "hearts complete");
                events.push(ScreenEvent::Completed);
                Some(Outcome::GameComplete(result))
            }
        }
    }

    fn confirm(&mut self, target: usize, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match self.seq.current()? {
            HeartsPhase::Question => self.suspect = Some(target),
            HeartsPhase::Voting => self.vote(target, events),
            HeartsPhase::Lobby | HeartsPhase::Reveal => return None,
        }
        let cue = self.seq.act()?;
        self.on_cue(cue, events)
    }
}

impl Screen for HeartsGame {
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
        let candidates = self.candidates();
        if candidates.is_empty() {
            return None;
        }
        let n = candidates.len();
        match cmd {
            Command::Left | Command::Up => {
                self.cursor = (self.cursor + n - 1) % n;
                None
            }
            Command::Right | Command::Down => {
                self.cursor = (self.cursor + 1) % n;
                None
            }
            Command::Confirm => {
                let target = candidates.get(self.cursor).copied()?;
                self.confirm(target, events)
            }
            Command::Pick(i) => {
                let target = candidates.get(i as usize).copied()?;
                self.cursor = i as usize;
                self.confirm(target, events)
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
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn game(seed: u64) -> HeartsGame {
        HeartsGame::new(Box::new(ChaCha8Rng::seed_from_u64(seed))).unwrap()
    }

    fn play_out(g: &mut HeartsGame) -> GameResult {
        let mut ev = vec![];
        for _ in 0..1000 {
            if let Some(Outcome::GameComplete(r)) = g.tick(50, &mut ev) {
                return r;
            }
            if let Some(Outcome::GameComplete(r)) = g.command(Command::Confirm, &mut ev) {
                return r;
            }
        }
        panic!("hearts never finished");
    }

    #[test]
    fn tally_prefers_later_target_on_tie() {
        let votes = [
            Vote { voter: 1, target: 2 },
            Vote { voter: 2, target: 3 },
            Vote { voter: 3, target: 2 },
            Vote { voter: 0, target: 3 },
        ];
        assert_eq!(tally(&votes), Some(3));
        let votes = [
            Vote { voter: 1, target: 2 },
            Vote { voter: 2, target: 2 },
            Vote { voter: 0, target: 3 },
        ];
        assert_eq!(tally(&votes), Some(2));
        assert_eq!(tally(&[]), None);
    }

    #[test]
    fn user_is_never_a_traitor() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let players = cast(&mut rng);
            assert_eq!(players.len(), 5);
            assert!(!players[YOU].traitor);
            assert!(players.iter().all(|p| p.suspicion >= 0.0 && p.suspicion <= SUSPICION_MAX));
        }
    }

    #[test]
    fn lobby_waits_then_asks() {
        let mut g = game(1);
        g.tick(LOBBY_MS - 50, &mut vec![]);
        assert_eq!(g.phase(), Some(HeartsPhase::Lobby));
        assert_eq!(g.command(Command::Confirm, &mut vec![]), None);
        assert_eq!(g.phase(), Some(HeartsPhase::Lobby));
        g.tick(50, &mut vec![]);
        assert_eq!(g.phase(), Some(HeartsPhase::Question));
    }

    #[test]
    fn vote_eliminates_and_scores() {
        let mut g = game(2);
        g.tick(LOBBY_MS, &mut vec![]);
        g.command(Command::Pick(0), &mut vec![]);
        assert_eq!(g.phase(), Some(HeartsPhase::Voting));
        assert_eq!(g.suspect(), Some(1));

        let mut ev = vec![];
        g.command(Command::Pick(0), &mut ev);
        assert_eq!(g.phase(), Some(HeartsPhase::Reveal));
        let out = g.eliminated().unwrap();
        assert!(!g.players()[out].alive);
        assert!(g.votes().iter().any(|v| v.voter == YOU && v.target == 1));
        if g.players()[out].traitor {
            assert_eq!(g.trust(), TRUST_START + TRUST_CAUGHT);
            assert_eq!(ev, vec![ScreenEvent::Hit]);
        } else {
            assert_eq!(g.trust(), TRUST_START + TRUST_MISSED);
            assert_eq!(g.betrayal(), BETRAYAL_MISSED);
            assert_eq!(ev, vec![ScreenEvent::Miss]);
        }

        // Reveal is timed; confirm does nothing.
        assert_eq!(g.command(Command::Confirm, &mut vec![]), None);
        assert_eq!(g.phase(), Some(HeartsPhase::Reveal));
    }

    #[test]
    fn full_game_scores_by_formula() {
        for seed in 0..20 {
            let mut g = game(seed);
            let r = play_out(&mut g);
            assert_eq!(r.category(), Category::Hearts);
            assert!(r.score() <= 200);
            let b = r.breakdown();
            let trust = b.get("Trust Level").unwrap();
            let betrayal = b.get("Betrayal Score").unwrap();
            assert_eq!(b.get("Emotional Control"), Some((MAX_METRIC - betrayal).max(0.0)));
            let intuition = b.get("Social Intuition").unwrap();
            assert!((0.0..=100.0).contains(&intuition));
            assert!(trust <= 100.0);
        }
    }

    #[test]
    fn intuition_is_full_without_traitors() {
        assert_eq!(social_intuition(0.0, 0), MAX_METRIC);
        assert_eq!(social_intuition(1.0, 2), 50.0);
        assert_eq!(social_intuition(0.0, 2), 0.0);

        let mut g = game(4);
        for p in g.players.iter_mut() {
            p.traitor = false;
        }
        g.total_traitors = 0;
        let r = play_out(&mut g);
        assert_eq!(r.breakdown().get("Social Intuition"), Some(MAX_METRIC));
    }

    #[test]
    fn game_ends_once_nobody_is_left() {
        let mut g = game(3);
        let _ = play_out(&mut g);
        assert!(g.over());
        assert!(g.round() < PROMPTS.len());
        assert_eq!(g.phase(), None);
    }

    #[test]
    fn same_seed_same_game() {
        let a = play_out(&mut game(8));
        let b = play_out(&mut game(8));
        assert_eq!(a, b);
    }
}
