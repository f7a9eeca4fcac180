//! Error types for relaysim-engine.

use std::time::Duration;

use thiserror::Error;

use relaysim_core::netbuilder::DanglingEndpoint;
use relaysim_core::Id;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{operation} is not valid while the engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("document structure: {0}")]
    Structure(#[from] relaysim_core::Error),

    #[error("component setup: {0}")]
    Component(#[from] relaysim_components::Error),

    #[error("{count} dangling wire endpoint(s), first: {first}")]
    DanglingWires { count: usize, first: DanglingEndpoint },

    #[error("no convergence after {iterations} iterations; most active nets: {nets:?}")]
    Oscillation { iterations: u64, nets: Vec<Id> },

    #[error("watchdog expired after {elapsed:?}")]
    Timeout { elapsed: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;
