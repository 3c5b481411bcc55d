//! Pluggable request pacing and identity policies
//!
//! Both are policy knobs rather than correctness concerns; tests swap in
//! [`FixedDelay`] and [`FixedIdentity`] to make runs deterministic.

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

/// Browser identities rotated through by default
pub const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/114.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/100.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 Chrome/91.0.4472.124 Safari/537.36",
];

/// Produces the pause taken before each request
pub trait DelayStrategy: Send + Sync {
    fn next_delay(&self) -> Duration;
}

/// Produces the `User-Agent` sent with each request
pub trait IdentityRotation: Send + Sync {
    fn next_identity(&self) -> String;
}

/// Uniform random delay in `[1, ceiling]` milliseconds
///
/// A ceiling of 0 means no delay at all, unless `floor` is set, in which case
/// every request still waits 1ms.
#[derive(Debug, Clone, Copy)]
pub struct RandomJitter {
    ceiling_ms: u64,
    floor: bool,
}

impl RandomJitter {
    pub fn new(ceiling_ms: u64) -> Self {
        Self {
            ceiling_ms,
            floor: false,
        }
    }

    /// Keeps a 1ms minimum even when the ceiling is 0
    pub fn with_floor(mut self, floor: bool) -> Self {
        self.floor = floor;
        self
    }
}

impl DelayStrategy for RandomJitter {
    fn next_delay(&self) -> Duration {
        match self.ceiling_ms {
            0 if self.floor => Duration::from_millis(1),
            0 => Duration::ZERO,
            ceiling => Duration::from_millis(rand::thread_rng().gen_range(1..=ceiling)),
        }
    }
}

/// The same delay before every request
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay(pub Duration);

impl DelayStrategy for FixedDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// Picks a user agent uniformly at random from a fixed pool
#[derive(Debug, Clone)]
pub struct RandomUserAgent {
    agents: Vec<String>,
}

impl RandomUserAgent {
    /// An empty pool falls back to [`DEFAULT_USER_AGENTS`]
    pub fn new(agents: Vec<String>) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        Self { agents }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for RandomUserAgent {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl IdentityRotation for RandomUserAgent {
    fn next_identity(&self) -> String {
        self.agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENTS[0].to_string())
    }
}

/// Always the same user agent
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub String);

impl IdentityRotation for FixedIdentity {
    fn next_identity(&self) -> String {
        self.0.clone()
    }
}
