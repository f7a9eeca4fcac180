//! The component behavior contract.
//!
//! Every component kind implements the same four lifecycle operations. The
//! engine calls `on_start` once per run, `evaluate` whenever a net touching
//! the component changed (or a requested wakeup came due), `interact`
//! between iterations for user input, and `on_stop` at shutdown. Calling an
//! operation out of lifecycle order is an error.

use relaysim_core::{ComponentKind, Id, PropertyMap};

use crate::context::SimContext;
use crate::error::{Error, Result};

/// Runtime behavior of one component instance.
pub trait Behavior: Send {
    /// The component this behavior animates.
    fn component_id(&self) -> Id;

    /// The component kind, for diagnostics and snapshots.
    fn kind(&self) -> ComponentKind;

    /// Initialize pin drives and allocate bridges. Called once per run
    /// before the first iteration; no behavior observes another's output
    /// until the phase completes.
    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()>;

    /// React to the current net states. Must be idempotent when nothing
    /// changed.
    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()>;

    /// Apply an external stimulus. Returns whether internal state changed
    /// (a change makes the engine re-run the component).
    fn interact(&mut self, action: &str, params: &PropertyMap) -> Result<bool>;

    /// Clear transient state. Bridges owned by the component are destroyed
    /// by the engine.
    fn on_stop(&mut self) -> Result<()>;
}

/// Lifecycle guard shared by the behavior implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Lifecycle {
    #[default]
    Idle,
    Running,
}

impl Lifecycle {
    pub(crate) fn expect_idle(self, component: Id, operation: &'static str) -> Result<()> {
        match self {
            Lifecycle::Idle => Ok(()),
            Lifecycle::Running => Err(Error::InvalidState {
                component,
                operation,
                actual: "already running",
            }),
        }
    }

    pub(crate) fn expect_running(self, component: Id, operation: &'static str) -> Result<()> {
        match self {
            Lifecycle::Running => Ok(()),
            Lifecycle::Idle => Err(Error::InvalidState {
                component,
                operation,
                actual: "not started",
            }),
        }
    }
}
