//! Net builder: compile a page's wire forest into nets.
//!
//! An undirected connectivity search over wires and junctions. Tabs of the
//! same pin are implicitly connected; waypoints are skipped. Every tab on
//! the page ends up in exactly one net, with unwired tabs forming singleton
//! nets. Wires that reference tabs missing from the page are reported as
//! structural issues and otherwise ignored, so a malformed page degrades
//! instead of failing the build.

use std::collections::{HashMap, HashSet};

use crate::id::{Id, IdAllocator};
use crate::net::Net;
use crate::page::Page;

/// A wire endpoint that does not resolve to a tab on its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEndpoint {
    pub page: Id,
    pub wire: Id,
    pub tab: Id,
}

impl std::fmt::Display for DanglingEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "wire {} on page {} references unknown tab {}",
            self.wire, self.page, self.tab
        )
    }
}

/// Result of building nets for one page.
#[derive(Debug, Default)]
pub struct NetBuildResult {
    pub nets: Vec<Net>,
    pub issues: Vec<DanglingEndpoint>,
}

/// Build all nets for a page.
///
/// The partition of tabs is deterministic: tabs are seeded in component
/// layout order and the flood fill is order-independent, so the same page
/// always yields the same grouping.
pub fn build_page_nets(page: &Page, ids: &mut IdAllocator) -> NetBuildResult {
    let mut result = NetBuildResult::default();

    let page_tabs: Vec<Id> = page.tab_ids().collect();
    let tab_set: HashSet<Id> = page_tabs.iter().copied().collect();

    let mut adjacency: HashMap<Id, Vec<Id>> = HashMap::new();
    let connect = |adjacency: &mut HashMap<Id, Vec<Id>>, group: &[Id]| {
        for &a in group {
            for &b in group {
                if a != b {
                    adjacency.entry(a).or_default().push(b);
                }
            }
        }
    };

    // Tabs of one pin are electrically the same point.
    for component in page.components() {
        for pin in &component.pins {
            let tabs: Vec<Id> = pin.tab_ids().collect();
            connect(&mut adjacency, &tabs);
        }
    }

    // Each wire tree joins every tab it reaches. A shared visited set keeps
    // circular junction paths from recursing forever.
    let mut visited_wires = HashSet::new();
    for wire in &page.wires {
        let mut reached = Vec::new();
        wire.collect_tabs(&mut reached, &mut visited_wires);

        let mut known = Vec::with_capacity(reached.len());
        for tab in reached {
            if tab_set.contains(&tab) {
                known.push(tab);
            } else {
                result.issues.push(DanglingEndpoint {
                    page: page.id,
                    wire: wire.id,
                    tab,
                });
            }
        }
        connect(&mut adjacency, &known);
    }

    // Flood fill from each unassigned tab.
    let mut assigned: HashSet<Id> = HashSet::new();
    for &seed in &page_tabs {
        if assigned.contains(&seed) {
            continue;
        }
        let mut net = Net::new(ids.allocate(), page.id);
        net.scope = page.instance_of.map(|r| r.instance_id);
        let mut stack = vec![seed];
        while let Some(tab) = stack.pop() {
            if !assigned.insert(tab) {
                continue;
            }
            net.tabs.insert(tab);
            if let Some(neighbors) = adjacency.get(&tab) {
                for &neighbor in neighbors {
                    if !assigned.contains(&neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }
        result.nets.push(net);
    }

    result
}
