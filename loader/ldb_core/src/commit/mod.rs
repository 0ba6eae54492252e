//! Periodic commit and flush counters.
//!
//! The controller only counts; the session performs the exchange, commit
//! and flush it asks for.

mod interrupt;

pub use interrupt::{InterruptFlag, InterruptMode};

/// What the session must do after an instance was inserted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CommitTick {
    /// The periodic commit threshold was reached.
    pub commit: bool,
    /// The flush interval was reached.
    pub flush: bool,
}

/// Countdown to the next periodic commit plus the flush counter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitController {
    /// Instances per commit; 0 disables periodic commits.
    periodic: u32,
    countdown: u32,
    /// Instances per flush; 0 disables flushing.
    flush_interval: u32,
    since_flush: u32,
    /// Inserted since the last commit.
    uncommitted: u64,
    commits: u64,
}

impl CommitController {
    pub fn new(periodic: u32, flush_interval: u32) -> Self {
        CommitController {
            periodic,
            countdown: periodic,
            flush_interval,
            since_flush: 0,
            uncommitted: 0,
            commits: 0,
        }
    }

    /// Count one inserted instance.
    pub fn record_insert(&mut self) -> CommitTick {
        self.uncommitted += 1;

        let mut tick = CommitTick::default();
        if self.flush_interval > 0 {
            self.since_flush += 1;
            if self.since_flush >= self.flush_interval {
                self.since_flush = 0;
                tick.flush = true;
            }
        }
        if self.periodic > 0 {
            self.countdown = self.countdown.saturating_sub(1);
            tick.commit = self.countdown == 0;
        }
        tick
    }

    /// Record a commit. Returns how many instances it made durable.
    pub fn committed(&mut self) -> u64 {
        let now = self.uncommitted;
        self.uncommitted = 0;
        self.countdown = self.periodic;
        self.commits += 1;
        now
    }

    /// Record a rollback. Returns how many instances were lost.
    pub fn rolled_back(&mut self) -> u64 {
        let lost = self.uncommitted;
        self.uncommitted = 0;
        self.countdown = self.periodic;
        lost
    }

    pub fn periodic(&self) -> u32 {
        self.periodic
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn uncommitted(&self) -> u64 {
        self.uncommitted
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }
}
