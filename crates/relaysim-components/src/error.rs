//! Error types for relaysim-components.

use thiserror::Error;

use relaysim_core::Id;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{operation} called on component {component} while {actual}")]
    InvalidState {
        component: Id,
        operation: &'static str,
        actual: &'static str,
    },

    #[error("component {component} is missing pin {role} (index {index})")]
    MissingPin {
        component: Id,
        role: &'static str,
        index: usize,
    },

    #[error("component {component} has a pin without tabs")]
    MissingTab { component: Id },

    #[error("no instance record for sub-circuit component {0}")]
    MissingInstance(Id),

    #[error("instance link component {link} of {component} not found in document")]
    MissingInstanceLink { component: Id, link: Id },
}

pub type Result<T> = std::result::Result<T, Error>;
