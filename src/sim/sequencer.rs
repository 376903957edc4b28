/// PhaseSequencer: a screen's scripted timeline.
///
/// An ordered list of steps, each a phase tag plus an advance rule. Exactly
/// one step is current. The sequencer owns the screen's clock and a scoped
/// `TimerSet`; besides its own phase deadlines it carries *effects*, timers
/// the screen schedules for the current phase only. Every transition clears
/// them, so an effect can never fire in a phase it was not scheduled for.
///
/// Driving it:
///   1. `advance(dt)` once per tick
///   2. `while let Some(cue) = seq.poll() { .. }` to drain due cues in order
///   3. `act()` / `short_circuit()` / `finish()` on user actions
///
/// `Cue::Completed` is reported exactly once; afterwards every call is a no-op.

use std::collections::VecDeque;
use std::fmt::Debug;

use thiserror::Error;

use super::timer::TimerSet;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Advance {
    /// Leaves automatically after the delay.
    After(u64),
    /// Waits for a user action.
    OnAction,
    /// Leaves after the delay, or earlier on a user action.
    AfterOrAction(u64),
}

#[derive(Clone, Copy, Debug)]
pub struct Step<P> {
    pub phase: P,
    pub advance: Advance,
}

impl<P> Step<P> {
    pub fn after(phase: P, ms: u64) -> Self {
        Step { phase, advance: Advance::After(ms) }
    }

    pub fn on_action(phase: P) -> Self {
        Step { phase, advance: Advance::OnAction }
    }

    pub fn after_or_action(phase: P, ms: u64) -> Self {
        Step { phase, advance: Advance::AfterOrAction(ms) }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("a phase sequence needs at least one step")]
    Empty,
    #[error("cannot short-circuit to {target}: it is not ahead of the current phase")]
    NotAhead { target: String },
    #[error("the sequence has already finished")]
    Finished,
}

/// What the owner must react to.
#[derive(Clone, Debug, PartialEq)]
pub enum Cue<P, A> {
    Entered(P),
    Completed,
    Effect(A),
}

#[derive(Clone, Debug)]
enum Signal<A> {
    Advance,
    Effect(A),
}

#[derive(Debug)]
pub struct PhaseSequencer<P, A> {
    steps: Vec<Step<P>>,
    index: usize,
    entered_at: u64,
    timers: TimerSet<Signal<A>>,
    pending: VecDeque<Cue<P, A>>,
    done: bool,
}

impl<P, A> PhaseSequencer<P, A>
where
    P: Copy + PartialEq + Debug,
    A: Clone,
{
    /// Build and enter the first step. The first `poll()` reports `Entered(first)`.
    pub fn new(steps: Vec<Step<P>>) -> Result<Self, SequenceError> {
        let first = steps.first().ok_or(SequenceError::Empty)?.phase;
        let mut seq = PhaseSequencer {
            steps,
            index: 0,
            entered_at: 0,
            timers: TimerSet::new(),
            pending: VecDeque::new(),
            done: false,
        };
        seq.arm();
        seq.pending.push_back(Cue::Entered(first));
        Ok(seq)
    }

    // ── Queries ──

    /// The current phase, or `None` once the sequence has completed.
    pub fn current(&self) -> Option<P> {
        if self.done {
            None
        } else {
            Some(self.steps[self.index].phase)
        }
    }

    /// Index of the current step in the step list.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Milliseconds spent in the current phase.
    pub fn elapsed(&self) -> u64 {
        self.timers.now().saturating_sub(self.entered_at)
    }

    /// Milliseconds left before a timed phase leaves on its own.
    pub fn remaining(&self) -> Option<u64> {
        if self.done {
            return None;
        }
        match self.steps[self.index].advance {
            Advance::After(ms) | Advance::AfterOrAction(ms) => {
                Some(ms.saturating_sub(self.elapsed()))
            }
            Advance::OnAction => None,
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    // ── Phase-scoped effects ──

    pub fn schedule(&mut self, delay: u64, effect: A) {
        if !self.done {
            self.timers.schedule(delay, Signal::Effect(effect));
        }
    }

    pub fn every(&mut self, interval: u64, effect: A) {
        if !self.done {
            self.timers.every(interval, Signal::Effect(effect));
        }
    }

    // ── Driving ──

    pub fn advance(&mut self, dt: u64) {
        self.timers.advance(dt);
    }

    /// Next cue due at or before the current horizon.
    pub fn poll(&mut self) -> Option<Cue<P, A>> {
        if let Some(cue) = self.pending.pop_front() {
            return Some(cue);
        }
        if self.done {
            return None;
        }
        match self.timers.poll()? {
            Signal::Advance => Some(self.step_forward()),
            Signal::Effect(a) => Some(Cue::Effect(a)),
        }
    }

    /// `advance` then drain. For owners that never touch the timeline while
    /// reacting to a cue; the rest drive `advance`/`poll` themselves.
    pub fn tick(&mut self, dt: u64) -> Vec<Cue<P, A>> {
        self.advance(dt);
        std::iter::from_fn(|| self.poll()).collect()
    }

    /// User action. Advances only if the current step accepts one.
    pub fn act(&mut self) -> Option<Cue<P, A>> {
        if self.done {
            return None;
        }
        match self.steps[self.index].advance {
            Advance::OnAction | Advance::AfterOrAction(_) => Some(self.step_forward()),
            Advance::After(_) => None,
        }
    }

    /// Jump forward to the next step tagged `target`.
    pub fn short_circuit(&mut self, target: P) -> Result<Cue<P, A>, SequenceError> {
        if self.done {
            return Err(SequenceError::Finished);
        }
        let idx = self.steps[self.index + 1..]
            .iter()
            .position(|s| s.phase == target)
            .map(|off| self.index + 1 + off)
            .ok_or_else(|| SequenceError::NotAhead { target: format!("{target:?}") })?;
        Ok(self.enter(idx))
    }

    /// Short-circuit straight to completion.
    pub fn finish(&mut self) -> Option<Cue<P, A>> {
        if self.done {
            None
        } else {
            Some(self.complete())
        }
    }

    /// Cancel every pending timer and stop. No cue is reported afterwards.
    pub fn teardown(&mut self) -> usize {
        self.done = true;
        self.pending.clear();
        self.timers.teardown()
    }

    // ── Internal ──

    fn step_forward(&mut self) -> Cue<P, A> {
        if self.index + 1 < self.steps.len() {
            self.enter(self.index + 1)
        } else {
            self.complete()
        }
    }

    fn enter(&mut self, idx: usize) -> Cue<P, A> {
        self.index = idx;
        self.entered_at = self.timers.now();
        self.arm();
        let phase = self.steps[idx].phase;
        tracing::debug!(?phase, at = self.entered_at, "phase entered");
        Cue::Entered(phase)
    }

    fn complete(&mut self) -> Cue<P, A> {
        self.done = true;
        self.timers.clear();
        tracing::debug!(at = self.timers.now(), "sequence completed");
        Cue::Completed
    }

    /// Drop the previous phase's timers and schedule this phase's deadline.
    fn arm(&mut self) {
        self.timers.clear();
        match self.steps[self.index].advance {
            Advance::After(ms) | Advance::AfterOrAction(ms) => {
                self.timers.schedule(ms, Signal::Advance);
            }
            Advance::OnAction => {}
        }
    }
}
