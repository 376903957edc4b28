/// ♠ Adrenaline Lockdown: five rounds of reflex under stress.
///
/// 1. Tracking: keep the cursor on a dot that jumps every 500 ms.
/// 2. Flash: confirm on green, hold still on red.
/// 3. Slider: keep a drifting slider inside a drifting zone.
/// 4. Chaos: pick the green cells of a re-rolling 3×3 grid.
/// 5. Final choice: exit with the score, or wait for a bonus.
///    The round times out; a timeout counts as exit.

use rand::Rng;

use crate::domain::category::Category;
use crate::domain::result::{GameResult, MAX_METRIC};
use crate::domain::score::ScoreAggregator;
use crate::domain::tables::spades::*;

use super::GameRng;
use crate::sim::command::Command;
use crate::sim::event::ScreenEvent;
use crate::sim::screen::{Outcome, Screen};
use crate::sim::sequencer::{Cue, PhaseSequencer, SequenceError, Step};

const SCORE: &str = "score";
const TRACK_HITS: &str = "track_hits";
const FLASH_HITS: &str = "flash_hits";
const FLASH_MISSES: &str = "flash_misses";
const SLIDER_HITS: &str = "slider_hits";
const CHAOS_HITS: &str = "chaos_hits";
const CHAOS_MISSES: &str = "chaos_misses";

pub const GRID: usize = 9;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpadesPhase {
    Tracking,
    Flash,
    Slider,
    Chaos,
    Final,
}

#[derive(Clone, Debug)]
enum SpadesFx {
    DotJump,
    TrackSample,
    FlashOn,
    FlashOff,
    Jitter,
    ChaosRoll,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FinalChoice {
    Exit,
    Wait,
}

#[derive(Clone, Copy, Debug)]
pub struct Flash {
    pub green: bool,
    answered: bool,
}

pub struct SpadesGame {
    seq: PhaseSequencer<SpadesPhase, SpadesFx>,
    rng: GameRng,
    agg: ScoreAggregator,
    dot: (f64, f64),
    cursor: (f64, f64),
    flash: Option<Flash>,
    slider: f64,
    zone: (f64, f64),
    grid: [bool; GRID],
    highlight: FinalChoice,
}

impl SpadesGame {
    pub fn new(rng: GameRng) -> Result<Self, SequenceError> {
        let seq = PhaseSequencer::new(vec![
            Step::after(SpadesPhase::Tracking, ROUND_MS[0]),
            Step::after(SpadesPhase::Flash, ROUND_MS[1]),
            Step::after(SpadesPhase::Slider, ROUND_MS[2]),
            Step::after(SpadesPhase::Chaos, ROUND_MS[3]),
            Step::after_or_action(SpadesPhase::Final, ROUND_MS[4]),
        ])?;
        Ok(SpadesGame {
            seq,
            rng,
            agg: ScoreAggregator::new(Category::Spades),
            dot: (50.0, 50.0),
            cursor: (50.0, 50.0),
            flash: None,
            slider: 50.0,
            zone: (40.0, 60.0),
            grid: [false; GRID],
            highlight: FinalChoice::Exit,
        })
    }

    // ── Read-only view for the renderer ──

    pub fn phase(&self) -> Option<SpadesPhase> {
        self.seq.current()
    }

    /// 1-based round number.
    pub fn round(&self) -> usize {
        self.seq.position() + 1
    }

    pub fn time_left_ms(&self) -> u64 {
        self.seq.remaining().unwrap_or(0)
    }

    pub fn score(&self) -> f64 {
        self.agg.get(SCORE)
    }

    pub fn dot(&self) -> (f64, f64) {
        self.dot
    }

    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    pub fn on_target(&self) -> bool {
        let (dx, dy) = (self.cursor.0 - self.dot.0, self.cursor.1 - self.dot.1);
        (dx * dx + dy * dy).sqrt() < TRACK_RADIUS
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash
    }

    pub fn slider(&self) -> f64 {
        self.slider
    }

    pub fn zone(&self) -> (f64, f64) {
        self.zone
    }

    pub fn in_zone(&self) -> bool {
        self.slider >= self.zone.0 && self.slider <= self.zone.1
    }

    pub fn grid(&self) -> &[bool; GRID] {
        &self.grid
    }

    pub fn highlight(&self) -> FinalChoice {
        self.highlight
    }

    // ── Rules ──

    fn roll_dot(&mut self) {
        self.dot = (self.rng.gen_range(10.0..90.0), self.rng.gen_range(10.0..90.0));
    }

    fn roll_grid(&mut self) {
        for cell in self.grid.iter_mut() {
            *cell = self.rng.gen_bool(CHAOS_GREEN_P);
        }
    }

    fn jitter(&mut self) {
        let drift = (self.rng.gen::<f64>() - 0.5) * JITTER_SPAN;
        self.slider = (self.slider + drift).clamp(0.0, 100.0);
        let min = self.rng.gen::<f64>() * 30.0 + 20.0;
        let max = self.rng.gen::<f64>() * 30.0 + 50.0;
        self.zone = (min, max);
    }

    fn score_delta(&mut self, delta: f64, events: &mut Vec<ScreenEvent>) {
        self.agg.add(SCORE, delta);
        events.push(if delta >= 0.0 { ScreenEvent::Hit } else { ScreenEvent::Miss });
    }

    fn answer_flash(&mut self, events: &mut Vec<ScreenEvent>) {
        let Some(flash) = self.flash.as_mut() else { return };
        if flash.answered {
            return;
        }
        flash.answered = true;
        let green = flash.green;
        if green {
            self.agg.incr(FLASH_HITS);
            self.score_delta(FLASH_GREEN, events);
        } else {
            self.agg.incr(FLASH_MISSES);
            self.score_delta(FLASH_RED, events);
        }
    }

    fn pick_cell(&mut self, i: usize, events: &mut Vec<ScreenEvent>) {
        let Some(&green) = self.grid.get(i) else { return };
        if green {
            self.agg.incr(CHAOS_HITS);
            self.score_delta(CHAOS_GREEN, events);
        } else {
            self.agg.incr(CHAOS_MISSES);
            self.score_delta(CHAOS_RED, events);
        }
    }

    fn choose(&mut self, choice: FinalChoice, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        self.highlight = choice;
        if choice == FinalChoice::Wait {
            self.score_delta(WAIT_BONUS, events);
        }
        tracing::debug!(?choice, "final choice");
        let cue = self.seq.act()?;
        self.on_cue(cue, events)
    }

    fn seal(&mut self) -> GameResult {
        let agg = std::mem::replace(&mut self.agg, ScoreAggregator::new(Category::Spades));
        let score = agg.get(SCORE);
        let focus = score / FOCUS_DIV;
        let reaction = score / REACTION_DIV;
        let stress = score * MAX_METRIC / STRESS_SCALE;
        agg.seal(
            score,
            [
                ("Focus Duration", focus),
                ("Reaction Speed", reaction),
                ("Stress Resistance", stress),
            ],
        )
    }

    fn on_cue(&mut self, cue: Cue<SpadesPhase, SpadesFx>, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match cue {
            Cue::Entered(phase) => {
                self.flash = None;
                match phase {
                    SpadesPhase::Tracking => {
                        self.roll_dot();
                        self.seq.every(DOT_JUMP_MS, SpadesFx::DotJump);
                        self.seq.every(TRACK_SAMPLE_MS, SpadesFx::TrackSample);
                    }
                    SpadesPhase::Flash => self.seq.every(FLASH_EVERY_MS, SpadesFx::FlashOn),
                    SpadesPhase::Slider => {
                        self.slider = 50.0;
                        self.seq.every(JITTER_MS, SpadesFx::Jitter);
                    }
                    SpadesPhase::Chaos => {
                        self.roll_grid();
                        self.seq.every(CHAOS_ROLL_MS, SpadesFx::ChaosRoll);
                    }
                    SpadesPhase::Final => events.push(ScreenEvent::Cue),
                }
                None
            }
            Cue::Effect(fx) => {
                match fx {
                    SpadesFx::DotJump => self.roll_dot(),
                    SpadesFx::TrackSample => {
                        if self.on_target() {
                            self.agg.incr(TRACK_HITS);
                            self.agg.add(SCORE, TRACK_HIT);
                        }
                    }
                    SpadesFx::FlashOn => {
                        let green = self.rng.gen_bool(0.5);
                        self.flash = Some(Flash { green, answered: false });
                        self.seq.schedule(FLASH_LEN_MS, SpadesFx::FlashOff);
                        events.push(ScreenEvent::Cue);
                    }
                    SpadesFx::FlashOff => self.flash = None,
                    SpadesFx::Jitter => {
                        self.jitter();
                        if self.in_zone() {
                            self.agg.incr(SLIDER_HITS);
                            self.agg.add(SCORE, SLIDER_HIT);
                        }
                    }
                    SpadesFx::ChaosRoll => self.roll_grid(),
                }
                None
            }
            Cue::Completed => {
                let result = self.seal();
                tracing::info!(score = result.score(), profile = result.profile(), "spades complete");
                events.push(ScreenEvent::Completed);
                Some(Outcome::GameComplete(result))
            }
        }
    }
}

impl Screen for SpadesGame {
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
        let clamp = |v: f64| v.clamp(0.0, 100.0);
        match (self.seq.current()?, cmd) {
            (SpadesPhase::Tracking, Command::Left) => self.cursor.0 = clamp(self.cursor.0 - CURSOR_STEP),
            (SpadesPhase::Tracking, Command::Right) => self.cursor.0 = clamp(self.cursor.0 + CURSOR_STEP),
            (SpadesPhase::Tracking, Command::Up) => self.cursor.1 = clamp(self.cursor.1 - CURSOR_STEP),
            (SpadesPhase::Tracking, Command::Down) => self.cursor.1 = clamp(self.cursor.1 + CURSOR_STEP),
            (SpadesPhase::Flash, Command::Confirm) => self.answer_flash(events),
            (SpadesPhase::Slider, Command::Left | Command::Down) => {
                self.slider = clamp(self.slider - SLIDER_STEP)
            }
            (SpadesPhase::Slider, Command::Right | Command::Up) => {
                self.slider = clamp(self.slider + SLIDER_STEP)
            }
            (SpadesPhase::Chaos, Command::Pick(i)) => self.pick_cell(i as usize, events),
            (SpadesPhase::Final, Command::Left | Command::Right) => {
                self.highlight = match self.highlight {
                    FinalChoice::Exit => FinalChoice::Wait,
                    FinalChoice::Wait => FinalChoice::Exit,
                };
            }
            (SpadesPhase::Final, Command::Confirm) => return self.choose(self.highlight, events),
            (SpadesPhase::Final, Command::Pick(0)) => return self.choose(FinalChoice::Exit, events),
            (SpadesPhase::Final, Command::Pick(1)) => return self.choose(FinalChoice::Wait, events),
            _ => {}
        }
        None
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

    fn game(seed: u64) -> SpadesGame {
        SpadesGame::new(Box::new(ChaCha8Rng::seed_from_u64(seed))).unwrap()
    }

    fn run(g: &mut SpadesGame, ms: u64, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        for _ in 0..ms / 50 {
            if let Some(o) = g.tick(50, events) {
                return Some(o);
            }
        }
        None
    }

    fn until_final(g: &mut SpadesGame) {
        let ms: u64 = ROUND_MS[..4].iter().sum();
        assert_eq!(run(g, ms, &mut vec![]), None);
        assert_eq!(g.phase(), Some(SpadesPhase::Final));
    }

    fn result_of(out: Option<Outcome>) -> GameResult {
        match out {
            Some(Outcome::GameComplete(r)) => r,
            other => panic!("expected a result, got {other:?}"),
        }
    }

    #[test]
    fn rounds_follow_their_durations() {
        let mut g = game(1);
        run(&mut g, ROUND_MS[0] - 50, &mut vec![]);
        assert_eq!(g.phase(), Some(SpadesPhase::Tracking));
        run(&mut g, 100, &mut vec![]);
        assert_eq!(g.phase(), Some(SpadesPhase::Flash));
        assert_eq!(g.round(), 2);
        run(&mut g, ROUND_MS[1] + ROUND_MS[2], &mut vec![]);
        assert_eq!(g.phase(), Some(SpadesPhase::Chaos));
        run(&mut g, ROUND_MS[3] - 200, &mut vec![]);
        assert_eq!(g.phase(), Some(SpadesPhase::Chaos));
    }

    #[test]
    fn timeout_on_final_counts_as_exit() {
        let mut exit = game(9);
        until_final(&mut exit);
        let exited = result_of(run(&mut exit, ROUND_MS[4] + 100, &mut vec![]));

        let mut wait = game(9);
        until_final(&mut wait);
        let waited = result_of(wait.command(Command::Pick(1), &mut vec![]));

        assert_eq!(exited.category(), Category::Spades);
        assert_eq!(waited.score(), (exited.score() + WAIT_BONUS as u32).min(200));
    }

    #[test]
    fn completion_is_reported_once() {
        let mut g = game(2);
        until_final(&mut g);
        assert!(g.command(Command::Confirm, &mut vec![]).is_some());
        assert_eq!(g.command(Command::Confirm, &mut vec![]), None);
        assert_eq!(run(&mut g, 30_000, &mut vec![]), None);
    }

    #[test]
    fn each_flash_is_answered_once() {
        let mut g = game(3);
        run(&mut g, ROUND_MS[0], &mut vec![]);
        assert_eq!(g.phase(), Some(SpadesPhase::Flash));
        run(&mut g, FLASH_EVERY_MS + 50, &mut vec![]);
        let flash = g.flash().expect("flash is showing");

        let before = g.score();
        let mut events = vec![];
        g.command(Command::Confirm, &mut events);
        let expected = if flash.green { FLASH_GREEN } else { FLASH_RED };
        assert_eq!(g.score() - before, expected);
        g.command(Command::Confirm, &mut events);
        assert_eq!(g.score() - before, expected);
        assert_eq!(events.len(), 1);

        run(&mut g, FLASH_LEN_MS, &mut vec![]);
        assert!(g.flash().is_none());
        g.command(Command::Confirm, &mut events);
        assert_eq!(g.score() - before, expected);
    }

    #[test]
    fn chaos_cells_score_by_colour() {
        let mut g = game(4);
        run(&mut g, ROUND_MS[0] + ROUND_MS[1] + ROUND_MS[2], &mut vec![]);
        assert_eq!(g.phase(), Some(SpadesPhase::Chaos));
        let grid = *g.grid();
        for (i, green) in grid.iter().enumerate() {
            let before = g.score();
            g.command(Command::Pick(i as u8), &mut vec![]);
            let expected = if *green { CHAOS_GREEN } else { CHAOS_RED };
            assert_eq!(g.score() - before, expected);
        }
    }

    #[test]
    fn tracking_scores_only_on_target() {
        let mut g = game(5);
        g.tick(0, &mut vec![]);
        g.cursor = g.dot;
        g.tick(TRACK_SAMPLE_MS, &mut vec![]);
        assert_eq!(g.score(), TRACK_HIT);

        g.cursor = (g.dot.0 + 50.0, g.dot.1);
        g.tick(TRACK_SAMPLE_MS, &mut vec![]);
        assert_eq!(g.score(), TRACK_HIT);
    }

    #[test]
    fn same_seed_same_result() {
        let play = |seed| {
            let mut g = game(seed);
            let mut events = vec![];
            for _ in 0..5_000 {
                let out = g
                    .command(Command::Confirm, &mut events)
                    .or_else(|| g.command(Command::Pick(4), &mut events))
                    .or_else(|| g.tick(50, &mut events));
                if let Some(o) = out {
                    return o;
                }
            }
            panic!("spades never completed");
        };
        assert_eq!(play(11), play(11));
    }

    #[test]
    fn confirm_on_final_completes_the_run() {
        let mut g = game(12);
        let mut events = vec![];
        let mut finished = None;
        for _ in 0..5_000 {
            if let Some(o) = g.command(Command::Confirm, &mut events) {
                finished = Some(o);
                break;
            }
            assert_eq!(g.tick(50, &mut events), None);
        }
        assert_eq!(result_of(finished).category(), Category::Spades);
        assert_eq!(g.phase(), None);
        assert_eq!(run(&mut g, 30_000, &mut events), None);
    }

    #[test]
    fn teardown_silences_effects() {
        let mut g = game(6);
        g.tick(0, &mut vec![]);
        assert!(g.teardown() > 0);
        assert_eq!(run(&mut g, 60_000, &mut vec![]), None);
        assert_eq!(g.score(), 0.0);
    }
}
