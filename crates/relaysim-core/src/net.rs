//! Virtual electrical nets (VNETs).
//!
//! A net is the runtime equivalence class of tabs joined by wires on one
//! page. Link names and bridges widen the equipotential beyond the page at
//! evaluation time without merging the net records themselves, so attaching
//! or removing a link or bridge never rebuilds the partition.
//!
//! Nets exist only while an engine runs; they are never serialized.

use std::collections::BTreeSet;

use crate::id::Id;
use crate::state::Signal;

/// Runtime net: a set of electrically connected tabs plus its current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Net {
    pub id: Id,
    /// Page the tabs live on.
    pub page: Id,
    /// Link-name scope: `None` on ordinary pages, the instance id on pages
    /// cloned for a sub-circuit instance. Names only join nets within one
    /// scope, so two instances of the same template stay isolated even
    /// though their cloned link names are identical.
    pub scope: Option<Id>,
    /// Member tabs, ordered by id.
    pub tabs: BTreeSet<Id>,
    /// Link names joining this net to same-named nets on any page.
    pub links: BTreeSet<String>,
    /// Bridges currently attached to this net.
    pub bridges: BTreeSet<Id>,
    /// Resolved state as of the last evaluation.
    pub state: Signal,
    /// Whether the state must be re-evaluated. New nets start dirty.
    pub dirty: bool,
}

impl Net {
    pub fn new(id: Id, page: Id) -> Self {
        Self {
            id,
            page,
            scope: None,
            tabs: BTreeSet::new(),
            links: BTreeSet::new(),
            bridges: BTreeSet::new(),
            state: Signal::Float,
            dirty: true,
        }
    }

    /// Whether the net contains a tab.
    pub fn has_tab(&self, tab: Id) -> bool {
        self.tabs.contains(&tab)
    }

    /// Whether the net carries a link name.
    pub fn has_link(&self, name: &str) -> bool {
        self.links.contains(name)
    }

    /// Number of member tabs.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}
