use std::cell::Cell;
use std::time::{Duration, Instant};

/// A cooperative, poll based time budget.
///
/// The diff algorithms call [`is_valid`](Timeout::is_valid) once per iteration
/// of their outer loop. Once it returns `false` they stop and return a coarser
/// (but still valid) result with `hit_timeout` set.
#[derive(Debug, Clone)]
pub struct Timeout {
    kind: TimeoutKind,
    disabled: Cell<bool>,
    expired: Cell<bool>,
}

#[derive(Debug, Clone, Copy)]
enum TimeoutKind {
    Infinite,
    Deadline(Instant),
}

impl Timeout {
    /// A timeout that never expires.
    pub fn infinite() -> Timeout {
        Timeout::with_kind(TimeoutKind::Infinite)
    }

    /// A timeout that expires `budget` after now.
    ///
    /// # Panics
    ///
    /// If `budget` is zero.
    pub fn after(budget: Duration) -> Timeout {
        assert!(!budget.is_zero(), "timeout must be positive");
        Timeout::with_kind(TimeoutKind::Deadline(Instant::now() + budget))
    }

    /// Like [`after`](Timeout::after), except that a zero `budget` means
    /// the computation is unlimited.
    pub fn from_budget(budget: Duration) -> Timeout {
        if budget.is_zero() {
            Timeout::infinite()
        } else {
            Timeout::after(budget)
        }
    }

    fn with_kind(kind: TimeoutKind) -> Timeout {
        Timeout {
            kind,
            disabled: Cell::new(false),
            expired: Cell::new(false),
        }
    }

    pub fn is_valid(&self) -> bool {
        let deadline = match self.kind {
            TimeoutKind::Infinite => return true,
            TimeoutKind::Deadline(deadline) => deadline,
        };
        if self.disabled.get() || Instant::now() < deadline {
            return true;
        }
        if !self.expired.replace(true) {
            tracing::debug!("diff computation ran out of time");
        }
        false
    }

    /// Permanently disables expiry. Useful when debugging a computation
    /// that would otherwise be cut short.
    pub fn disable(&self) {
        self.disabled.set(true);
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.kind, TimeoutKind::Infinite)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::infinite()
    }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;
    use std::time::Duration;

    use super::Timeout;

    #[test]
    fn zero_budget_is_infinite() {
        let timeout = Timeout::from_budget(Duration::ZERO);
        assert!(timeout.is_infinite());
        assert!(timeout.is_valid());
    }

    #[test]
    fn deadline_expires_and_can_be_disabled() {
        let timeout = Timeout::after(Duration::from_millis(1));
        sleep(Duration::from_millis(5));
        assert!(!timeout.is_valid());
        timeout.disable();
        assert!(timeout.is_valid());
    }

    #[test]
    #[should_panic = "timeout must be positive"]
    fn zero_deadline_is_rejected() {
        Timeout::after(Duration::ZERO);
    }
}
