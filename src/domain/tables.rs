/// Gameplay tables: every timing and scoring weight used by the screens.
///
/// Durations are milliseconds of simulated time. Score deltas are raw
/// points before the final clamp in `ScoreAggregator::seal`.

pub mod intro {
    pub const LOADER_STEP_MS: u64 = 100;
    pub const LOADER_STEP_PCT: u64 = 2;
    /// Loader fills in 5 s, then holds at 100% briefly.
    pub const LOADER_MS: u64 = LOADER_STEP_MS * 100 / LOADER_STEP_PCT + 500;
    pub const LASER_MS: u64 = 5000;
    pub const BEAMS: u64 = 24;
    pub const BLACKOUT_MS: u64 = 200;
    pub const WELCOME_MS: u64 = 5000;
}

pub mod spades {
    /// Rounds 1–4 are timed; round 5 is the final choice with a timeout.
    pub const ROUND_MS: [u64; 5] = [10_000, 10_000, 10_000, 20_000, 10_000];

    // Round 1: tracking
    pub const DOT_JUMP_MS: u64 = 500;
    pub const TRACK_SAMPLE_MS: u64 = 100;
    pub const TRACK_RADIUS: f64 = 5.0;
    pub const TRACK_HIT: f64 = 1.0;
    pub const CURSOR_STEP: f64 = 5.0;

    // Round 2: color flash
    pub const FLASH_EVERY_MS: u64 = 2000;
    pub const FLASH_LEN_MS: u64 = 1000;
    pub const FLASH_GREEN: f64 = 20.0;
    pub const FLASH_RED: f64 = -10.0;

    // Round 3: shaky slider
    pub const JITTER_MS: u64 = 200;
    pub const JITTER_SPAN: f64 = 10.0;
    pub const SLIDER_STEP: f64 = 5.0;
    pub const SLIDER_HIT: f64 = 1.0;

    // Round 4: chaos grid
    pub const CHAOS_ROLL_MS: u64 = 400;
    pub const CHAOS_GREEN_P: f64 = 0.3;
    pub const CHAOS_GREEN: f64 = 5.0;
    pub const CHAOS_RED: f64 = -5.0;

    // Round 5: final choice
    pub const WAIT_BONUS: f64 = 50.0;

    // Breakdown divisors
    pub const FOCUS_DIV: f64 = 2.0;
    pub const REACTION_DIV: f64 = 2.0;
    pub const STRESS_SCALE: f64 = 150.0;
}

pub mod diamonds {
    pub const CONSISTENCY_PENALTY: f64 = 20.0;
    pub const UNPREDICTABLE_POINTS: f64 = 20.0;
}

pub mod hearts {
    pub const LOBBY_MS: u64 = 3000;
    pub const REVEAL_MS: u64 = 3000;
    pub const TRAITOR_P: f64 = 0.3;
    pub const FALLBACK_TRAITOR_P: f64 = 0.5;
    pub const SUSPICION_MAX: f64 = 50.0;

    pub const TRUST_START: f64 = 100.0;
    pub const TRUST_CAUGHT: f64 = 20.0;
    pub const TRUST_MISSED: f64 = -15.0;
    pub const BETRAYAL_MISSED: f64 = 25.0;
    pub const CLEAN_BONUS: f64 = 50.0;
    pub const TRAITOR_PENALTY: f64 = -30.0;
}

pub mod clubs {
    pub const ROUNDS: u32 = 3;
    pub const BRIEFING_MS: u64 = 3000;
    pub const CHATTER_MS: u64 = 2000;
    pub const CHATTER_P: f64 = 0.3;
    pub const SUBMIT_MS: u64 = 5000;
    pub const REGROUP_MS: u64 = 2000;

    pub const SYNC_SHARE: f64 = 0.6;
    pub const TEAM_ACCURACY_MIN: f64 = 0.2;
    pub const TEAM_ACCURACY_PASS: f64 = 0.5;
    pub const MESSAGE_POINTS: f64 = 10.0;

    pub const RESHUFFLE_HOLD_P: f64 = 0.5;
    pub const RESHUFFLE_CORRECT_P: f64 = 0.6;

    /// Clubs sub-scores are 0–100; the mean is doubled onto the 0–200 scale.
    pub const SCORE_SCALE: f64 = 2.0;
}

pub mod results {
    pub const VISA_REVEAL_MS: u64 = 500;
    pub const PROMPT_REVEAL_MS: u64 = 500;
}
