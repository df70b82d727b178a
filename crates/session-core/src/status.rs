//! Per-operation status tracking with generation fencing.
//!
//! Each asynchronous operation family (check/recheck, persona review,
//! release) owns one [`OpSlot`]. Requests are not cancellable, so two
//! invocations of the same family can be in flight at once; the slot's
//! generation counter decides which completion is still current and
//! drops the rest instead of letting the last response win.

use serde::{Deserialize, Serialize};

/// Lifecycle of one operation family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpStatus {
    #[default]
    Idle,
    Running,
    Success,
    Error,
}

/// Fence token handed out by [`OpSlot::begin`]; a completion must
/// present it to be allowed to write results.
pub type Generation = u64;

#[derive(Debug, Default)]
pub struct OpSlot {
    status: OpStatus,
    generation: Generation,
}

impl OpSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> OpStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == OpStatus::Running
    }

    pub fn is_idle(&self) -> bool {
        self.status == OpStatus::Idle
    }

    /// Start a new invocation: bump the generation (superseding any
    /// request still in flight) and enter `Running`.
    pub fn begin(&mut self) -> Generation {
        self.generation += 1;
        self.status = OpStatus::Running;
        self.generation
    }

    /// Finish the invocation identified by `token`. Returns `false`
    /// and changes nothing when the token has been superseded.
    pub fn finish(&mut self, token: Generation, outcome: OpStatus) -> bool {
        if token != self.generation {
            return false;
        }
        self.status = outcome;
        true
    }

    /// Drop any cached outcome and return to `Idle`. Also bumps the
    /// generation so an in-flight completion for the old state can
    /// never land.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.status = OpStatus::Idle;
    }
}
