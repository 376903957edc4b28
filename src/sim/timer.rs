/// Scoped timer registry.
///
/// Every timer a screen starts lives in that screen's `TimerSet`. Dropping or
/// tearing down the set cancels everything, so no callback can outlive the
/// screen that scheduled it.
///
/// Time is simulated: the owner calls `advance(dt)` once per tick and then
/// drains due actions one at a time with `poll()`. Draining one at a time lets
/// a handler cancel or reschedule timers before the next one fires.
///
/// Ordering: earlier due time fires first; equal due times fire in
/// scheduling order. Repeating timers keep their slot in that order.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Timer<A> {
    id: TimerId,
    due: u64,
    seq: u64,
    every: Option<u64>,
    action: A,
}

#[derive(Clone, Debug)]
pub struct TimerSet<A> {
    /// Time of the most recently fired timer (or the horizon once drained).
    now: u64,
    /// Time the owner has advanced to; `poll` fires timers up to here.
    horizon: u64,
    next_id: u64,
    next_seq: u64,
    timers: Vec<Timer<A>>,
    torn_down: bool,
}

impl<A: Clone> TimerSet<A> {
    pub fn new() -> Self {
        TimerSet {
            now: 0,
            horizon: 0,
            next_id: 0,
            next_seq: 0,
            timers: Vec::new(),
            torn_down: false,
        }
    }

    /// Current simulated time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Fire `action` once, `delay` ms from now.
    pub fn schedule(&mut self, delay: u64, action: A) -> Option<TimerId> {
        self.insert(delay, None, action)
    }

    /// Fire `action` every `interval` ms, first after one interval.
    /// A zero interval is treated as 1 ms.
    pub fn every(&mut self, interval: u64, action: A) -> Option<TimerId> {
        let interval = interval.max(1);
        self.insert(interval, Some(interval), action)
    }

    fn insert(&mut self, delay: u64, every: Option<u64>, action: A) -> Option<TimerId> {
        if self.torn_down {
            tracing::warn!("timer scheduled after teardown; ignored");
            return None;
        }
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.timers.push(Timer { id, due: self.now + delay, seq, every, action });
        Some(id)
    }

    fn bump_seq(&mut self) -> u64 {
        let s = self.next_seq;
        self.next_seq += 1;
        s
    }

    /// Cancel one timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every pending timer. Returns how many were cancelled.
    pub fn clear(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        n
    }

    /// Cancel everything and refuse further scheduling.
    pub fn teardown(&mut self) -> usize {
        self.torn_down = true;
        self.clear()
    }

    /// Move the horizon forward. Due actions are then drained with `poll`.
    pub fn advance(&mut self, dt: u64) {
        if self.torn_down {
            return;
        }
        self.horizon = self.horizon.max(self.now) + dt;
    }

    /// Pop the next due action, if any, and move `now` to its due time.
    /// When nothing else is due, `now` catches up with the horizon.
    pub fn poll(&mut self) -> Option<A> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= self.horizon)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now = self.now.max(self.horizon);
            return None;
        };

        self.now = self.timers[idx].due;
        match self.timers[idx].every {
            Some(interval) => {
                let seq = self.bump_seq();
                let t = &mut self.timers[idx];
                t.due += interval;
                t.seq = seq;
                Some(t.action.clone())
            }
            None => Some(self.timers.swap_remove(idx).action),
        }
    }
}

impl<A: Clone> Default for TimerSet<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(t: &mut TimerSet<&'static str>) -> Vec<(u64, &'static str)> {
        let mut out = vec![];
        while let Some(a) = t.poll() {
            out.push((t.now(), a));
        }
        out
    }

    #[test]
    fn shorter_delay_fires_first() {
        let mut t = TimerSet::new();
        t.schedule(300, "late");
        t.schedule(100, "early");
        t.schedule(100, "early-second");
        t.advance(500);
        assert_eq!(
            drain(&mut t),
            vec![(100, "early"), (100, "early-second"), (300, "late")]
        );
        assert_eq!(t.now(), 500);
        assert_eq!(t.pending(), 0);
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut t = TimerSet::new();
        t.schedule(100, "x");
        t.advance(99);
        assert!(drain(&mut t).is_empty());
        t.advance(1);
        assert_eq!(drain(&mut t), vec![(100, "x")]);
    }

    #[test]
    fn repeating_timer_catches_up() {
        let mut t = TimerSet::new();
        t.every(200, "beat");
        t.advance(650);
        assert_eq!(drain(&mut t), vec![(200, "beat"), (400, "beat"), (600, "beat")]);
        assert_eq!(t.pending(), 1);
    }

    #[test]
    fn handler_can_cancel_before_next_fires() {
        let mut t = TimerSet::new();
        t.schedule(100, "first");
        let second = t.schedule(200, "second").unwrap();
        t.advance(300);
        assert_eq!(t.poll(), Some("first"));
        assert!(t.cancel(second));
        assert_eq!(t.poll(), None);
    }

    #[test]
    fn schedule_inside_handler_is_relative_to_fire_time() {
        let mut t = TimerSet::new();
        t.schedule(100, "a");
        t.advance(1000);
        assert_eq!(t.poll(), Some("a"));
        t.schedule(50, "b");
        assert_eq!(t.poll(), Some("b"));
        assert_eq!(t.now(), 150);
    }

    #[test]
    fn teardown_cancels_and_blocks() {
        let mut t = TimerSet::new();
        t.schedule(10, "a");
        t.every(10, "b");
        assert_eq!(t.teardown(), 2);
        assert!(t.schedule(10, "c").is_none());
        t.advance(100);
        assert_eq!(t.poll(), None);
        assert!(t.is_torn_down());
    }
}
