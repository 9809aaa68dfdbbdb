use std::cmp::Ordering;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of the current instant for expiry computation.
///
/// Stores take a `Clock` so tests can drive expiry deterministically with
/// [`ManualClock`] instead of sleeping.
pub trait Clock: Send + Sync {
    /// The current monotonic instant.
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Start the clock at the current real instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Absolute expiry of an address entry.
///
/// Ordering: any [`Expiry::At`] instant sorts before [`Expiry::Never`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiry {
    /// Expires once the clock reaches this instant.
    At(Instant),
    /// Never expires.
    Never,
}

impl Expiry {
    /// Expiry `ttl` after `now`. A ttl too large to represent never expires,
    /// which is how `Duration::MAX` acts as the "permanent" sentinel.
    pub fn after(now: Instant, ttl: Duration) -> Self {
        match now.checked_add(ttl) {
            Some(at) => Self::At(at),
            None => Self::Never,
        }
    }

    /// Returns `true` if the entry is expired at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self {
            Self::At(at) => *at <= now,
            Self::Never => false,
        }
    }

    /// Returns `true` for the "never expires" sentinel.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Never)
    }
}

impl PartialOrd for Expiry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expiry {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::At(a), Self::At(b)) => a.cmp(b),
            (Self::At(_), Self::Never) => Ordering::Less,
            (Self::Never, Self::At(_)) => Ordering::Greater,
            (Self::Never, Self::Never) => Ordering::Equal,
        }
    }
}

impl fmt::Debug for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(at) => {
                let left = at.saturating_duration_since(Instant::now());
                write!(f, "Expiry(in {left:?})")
            }
            Self::Never => write!(f, "Expiry(never)"),
        }
    }
}
