//! Cooperative interrupt flag shared with a signal handler or another thread.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// What a raised interrupt asks the loader to do.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptMode {
    #[default]
    None,
    /// Roll back everything since the last commit and stop.
    AbortAndRollback,
    /// Commit the work done so far and stop.
    StopAndCommit,
}

impl InterruptMode {
    const fn to_raw(self) -> u8 {
        match self {
            InterruptMode::None => 0,
            InterruptMode::AbortAndRollback => 1,
            InterruptMode::StopAndCommit => 2,
        }
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => InterruptMode::AbortAndRollback,
            2 => InterruptMode::StopAndCommit,
            _ => InterruptMode::None,
        }
    }
}

/// Interrupt request, cheap to clone and safe to raise from any thread.
///
/// The loader samples it only when an instance or a class finishes.
#[derive(Clone, Debug)]
pub struct InterruptFlag {
    state: Arc<AtomicU8>,
    default_mode: InterruptMode,
}

impl InterruptFlag {
    /// `default_mode` is what [`raise`](Self::raise) requests.
    pub fn new(default_mode: InterruptMode) -> Self {
        InterruptFlag {
            state: Arc::new(AtomicU8::new(0)),
            default_mode,
        }
    }

    pub fn raise(&self) {
        self.raise_with(self.default_mode);
    }

    pub fn raise_with(&self, mode: InterruptMode) {
        if mode != InterruptMode::None {
            self.state.store(mode.to_raw(), Ordering::SeqCst);
        }
    }

    pub fn is_raised(&self) -> bool {
        self.state.load(Ordering::SeqCst) != 0
    }

    /// Read and clear the pending request.
    pub fn take(&self) -> InterruptMode {
        InterruptMode::from_raw(self.state.swap(0, Ordering::SeqCst))
    }
}
