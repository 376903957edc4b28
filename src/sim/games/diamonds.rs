/// ♦ The Last Choice: five questions, then delete one answer.
///
/// Logic questions have a right answer; moral questions only have a
/// conventional one. The deleted answer takes no part in scoring.

use crate::domain::category::Category;
use crate::domain::result::{GameResult, MAX_METRIC};
use crate::domain::score::{ratio, ScoreAggregator};
use crate::domain::tables::diamonds::*;

use crate::sim::command::Command;
use crate::sim::event::ScreenEvent;
use crate::sim::screen::{Outcome, Screen};
use crate::sim::sequencer::{Cue, PhaseSequencer, SequenceError, Step};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Kind {
    Logic,
    Morality,
}

impl Kind {
    pub fn label(self) -> &'static str {
        match self {
            Kind::Logic => "LOGIC",
            Kind::Morality => "MORALITY",
        }
    }
}

pub struct Question {
    pub kind: Kind,
    pub text: &'static str,
    pub options: [&'static str; 4],
    /// Points for a correct logic answer.
    pub weight: f64,
    /// The most predictable pick. For logic questions this is also the correct one.
    pub expected: usize,
}

pub static QUESTIONS: [Question; 5] = [
    Question {
        kind: Kind::Logic,
        text: "A man lives on the 20th floor but only takes the elevator to the 10th floor on sunny days. Why?",
        options: [
            "He's short and can't reach the button",
            "He likes the exercise",
            "The elevator is broken",
            "He's superstitious",
        ],
        weight: 20.0,
        expected: 0,
    },
    Question {
        kind: Kind::Morality,
        text: "You can save 5 strangers by sacrificing 1 friend. What do you do?",
        options: ["Save the 5 strangers", "Save your friend", "Find another way", "Do nothing"],
        weight: 30.0,
        expected: 1,
    },
    Question {
        kind: Kind::Logic,
        text: "What comes next in the sequence: 2, 6, 12, 20, 30, ?",
        options: ["42", "40", "38", "36"],
        weight: 25.0,
        expected: 0,
    },
    Question {
        kind: Kind::Morality,
        text: "You witness a crime but reporting it would destroy an innocent family. What do you do?",
        options: [
            "Report immediately",
            "Stay silent",
            "Confront the criminal privately",
            "Seek advice first",
        ],
        weight: 35.0,
        expected: 2,
    },
    Question {
        kind: Kind::Logic,
        text: "If all Bloops are Razzles and all Razzles are Lazzles, then...",
        options: [
            "All Bloops are Lazzles",
            "Some Lazzles are Bloops",
            "No Bloops are Lazzles",
            "Cannot be determined",
        ],
        weight: 15.0,
        expected: 0,
    },
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DiamondsPhase {
    Question,
    Deletion,
}

/// Sub-scores of one answer sheet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub consistency: f64,
    pub unpredictability: f64,
    pub logic: f64,
    pub moral_flexibility: f64,
}

impl Evaluation {
    pub fn total(&self) -> f64 {
        self.consistency + self.unpredictability + self.logic
    }
}

/// Score `answers` (one option index per question), leaving out `deleted`.
pub fn evaluate(answers: &[usize], deleted: Option<usize>) -> Evaluation {
    let kept: Vec<(&Question, usize)> = QUESTIONS
        .iter()
        .zip(answers.iter().copied())
        .enumerate()
        .filter(|(i, _)| Some(*i) != deleted)
        .map(|(_, qa)| qa)
        .collect();

    let moral: Vec<(&Question, usize)> =
        kept.iter().copied().filter(|(q, _)| q.kind == Kind::Morality).collect();

    let consistency = if moral.is_empty() {
        0.0
    } else {
        let mean = moral.iter().map(|(_, a)| *a as f64).sum::<f64>() / moral.len() as f64;
        let spread: f64 = moral.iter().map(|(_, a)| (*a as f64 - mean).abs()).sum();
        (MAX_METRIC - spread * CONSISTENCY_PENALTY).max(0.0)
    };

    let unpredictability = kept
        .iter()
        .filter(|(q, a)| *a != q.expected)
        .count() as f64
        * UNPREDICTABLE_POINTS;

    let logic = kept
        .iter()
        .filter(|(q, a)| q.kind == Kind::Logic && *a == q.expected)
        .map(|(q, _)| q.weight)
        .sum();

    let unconventional = moral.iter().filter(|(q, a)| *a != q.expected).count();
    let moral_flexibility = ratio(unconventional as f64, moral.len() as f64) * MAX_METRIC;

    Evaluation { consistency, unpredictability, logic, moral_flexibility }
}

pub struct DiamondsGame {
    seq: PhaseSequencer<DiamondsPhase, ()>,
    answers: Vec<usize>,
    deleted: Option<usize>,
    cursor: usize,
}

impl DiamondsGame {
    pub fn new() -> Result<Self, SequenceError> {
        let mut steps: Vec<_> = QUESTIONS.iter().map(|_| Step::on_action(DiamondsPhase::Question)).collect();
        steps.push(Step::on_action(DiamondsPhase::Deletion));
        Ok(DiamondsGame {
            seq: PhaseSequencer::new(steps)?,
            answers: Vec::with_capacity(QUESTIONS.len()),
            deleted: None,
            cursor: 0,
        })
    }

    pub fn phase(&self) -> Option<DiamondsPhase> {
        self.seq.current()
    }

    /// The question on screen, while answering.
    pub fn question(&self) -> Option<(usize, &'static Question)> {
        match self.seq.current()? {
            DiamondsPhase::Question => {
                let i = self.seq.position();
                QUESTIONS.get(i).map(|q| (i, q))
            }
            DiamondsPhase::Deletion => None,
        }
    }

    pub fn answers(&self) -> &[usize] {
        &self.answers
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Options in the current list: four answers, or one row per question.
    fn rows(&self) -> usize {
        match self.seq.current() {
            Some(DiamondsPhase::Question) => 4,
            Some(DiamondsPhase::Deletion) => self.answers.len(),
            None => 0,
        }
    }

    fn pick(&mut self, i: usize, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match self.seq.current()? {
            DiamondsPhase::Question => {
                if i >= 4 {
                    return None;
                }
                self.answers.push(i);
            }
            DiamondsPhase::Deletion => {
                if i >= self.answers.len() {
                    return None;
                }
                tracing::debug!(question = i + 1, "answer deleted");
                self.deleted = Some(i);
            }
        }
        self.cursor = 0;
        let cue = self.seq.act()?;
        self.on_cue(cue, events)
    }

    fn seal(&self) -> GameResult {
        let e = evaluate(&self.answers, self.deleted);
        ScoreAggregator::new(Category::Diamonds).seal(
            e.total(),
            [
                ("Consistency", e.consistency),
                ("Unpredictability", e.unpredictability),
                ("Logic Score", e.logic),
                ("Moral Flexibility", e.moral_flexibility),
            ],
        )
    }

    fn on_cue(&mut self, cue: Cue<DiamondsPhase, ()>, events: &mut Vec<ScreenEvent>) -> Option<Outcome> {
        match cue {
            Cue::Entered(DiamondsPhase::Deletion) => {
                events.push(ScreenEvent::Cue);
                None
            }
            Cue::Entered(_) | Cue::Effect(()) => None,
            Cue::Completed => {
                let result = self.seal();
                tracing::info!(score = result.score(), profile = result.profile(), "diamonds complete");
                events.push(ScreenEvent::Completed);
                Some(Outcome::GameComplete(result))
            }
        }
    }
}

impl Screen for DiamondsGame {
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
        let rows = self.rows();
        if rows == 0 {
            return None;
        }
        match cmd {
            Command::Up | Command::Left => {
                self.cursor = (self.cursor + rows - 1) % rows;
                None
            }
            Command::Down | Command::Right => {
                self.cursor = (self.cursor + 1) % rows;
                None
            }
            Command::Confirm => self.pick(self.cursor, events),
            Command::Pick(i) => self.pick(i as usize, events),
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

    fn play(answers: [u8; 5], delete: u8) -> GameResult {
        let mut g = DiamondsGame::new().unwrap();
        let mut ev = vec![];
        g.tick(0, &mut ev);
        for a in answers {
            assert_eq!(g.command(Command::Pick(a), &mut ev), None);
        }
        assert_eq!(g.phase(), Some(DiamondsPhase::Deletion));
        match g.command(Command::Pick(delete), &mut ev) {
            Some(Outcome::GameComplete(r)) => r,
            other => panic!("expected a result, got {other:?}"),
        }
    }

    #[test]
    fn predictable_sheet() {
        // Every answer is the expected one; delete the last logic question.
        let e = evaluate(&[0, 1, 0, 2, 0], Some(4));
        assert_eq!(e.unpredictability, 0.0);
        assert_eq!(e.logic, 45.0);
        // Moral answers 1 and 2: mean 1.5, spread 1.0.
        assert_eq!(e.consistency, 80.0);
        assert_eq!(e.moral_flexibility, 0.0);
        assert_eq!(e.total(), 125.0);
    }

    #[test]
    fn deleted_answer_is_not_scored() {
        let with = evaluate(&[0, 1, 0, 2, 0], None);
        let without = evaluate(&[0, 1, 0, 2, 0], Some(0));
        assert_eq!(with.logic - without.logic, QUESTIONS[0].weight);
    }

    #[test]
    fn no_moral_answers_means_zero_consistency() {
        let e = evaluate(&[3, 0, 3, 0, 3], Some(1));
        assert_eq!(e.consistency, 100.0);
        // A one-answer sheet has no moral answers at all.
        let e = evaluate(&[3], None);
        assert_eq!(e.consistency, 0.0);
        assert_eq!(e.moral_flexibility, 0.0);
        assert!(!e.moral_flexibility.is_nan());
    }

    #[test]
    fn moral_flexibility_counts_unconventional_choices() {
        let e = evaluate(&[0, 0, 0, 2, 0], None);
        assert_eq!(e.moral_flexibility, 50.0);
    }

    #[test]
    fn full_run_produces_classified_result() {
        let r = play([0, 1, 0, 2, 0], 4);
        assert_eq!(r.category(), Category::Diamonds);
        assert_eq!(r.score(), 125);
        assert_eq!(r.profile(), "♦ Calculated Thinker");
        assert_eq!(r.breakdown().get("Logic Score"), Some(45.0));
        assert_eq!(r.breakdown().iter().count(), 4);
    }

    #[test]
    fn cursor_and_confirm_answer() {
        let mut g = DiamondsGame::new().unwrap();
        let mut ev = vec![];
        g.command(Command::Up, &mut ev);
        assert_eq!(g.cursor(), 3);
        g.command(Command::Confirm, &mut ev);
        assert_eq!(g.answers(), &[3]);
        assert_eq!(g.question().map(|(i, _)| i), Some(1));
        assert_eq!(g.command(Command::Pick(7), &mut ev), None);
        assert_eq!(g.answers().len(), 1);
    }
}
