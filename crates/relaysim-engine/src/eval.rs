//! Equipotential grouping and state evaluation.
//!
//! Links and bridges widen a net's equipotential beyond its page without
//! merging net records. Evaluation therefore works on the closure of a net
//! over both relations: the group's state is the OR of the driven
//! contributions of every member, and that state is applied to every member
//! at once. Evaluating whole groups is what lets a bridge move settle
//! without ping-ponging between the two sides.

use std::collections::BTreeSet;

use relaysim_core::{Id, Signal};

use crate::bridge::BridgeManager;
use crate::netmap::NetMap;

/// The closure of `start` over link names and bridges.
pub(crate) fn equipotential_group(
    nets: &NetMap,
    bridges: &BridgeManager,
    start: Id,
) -> BTreeSet<Id> {
    let mut group = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        if !group.insert(current) {
            continue;
        }
        let Some(net) = nets.net(current) else {
            continue;
        };
        for name in &net.links {
            for &linked in nets.nets_with_link(net.scope, name) {
                if !group.contains(&linked) {
                    stack.push(linked);
                }
            }
        }
        for &bridge_id in &net.bridges {
            if let Some(other) = bridges.get(bridge_id).and_then(|b| b.other(current)) {
                if !group.contains(&other) {
                    stack.push(other);
                }
            }
        }
    }
    group
}

/// OR of the driven contributions over all group members.
pub(crate) fn group_state(nets: &NetMap, group: &BTreeSet<Id>) -> Signal {
    let mut state = Signal::Float;
    for &net in group {
        state |= nets.driven_state_of_net(net);
        if state.is_high() {
            break;
        }
    }
    state
}

/// Partition the dirty nets into disjoint equipotential groups, in the
/// given (ascending) order.
pub(crate) fn partition_groups(
    nets: &NetMap,
    bridges: &BridgeManager,
    dirty: &[Id],
) -> Vec<BTreeSet<Id>> {
    let mut processed: BTreeSet<Id> = BTreeSet::new();
    let mut groups = Vec::new();
    for &net in dirty {
        if processed.contains(&net) {
            continue;
        }
        let group = equipotential_group(nets, bridges, net);
        processed.extend(group.iter().copied());
        groups.push(group);
    }
    groups
}
