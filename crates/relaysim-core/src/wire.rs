//! Wires, junctions and waypoints.
//!
//! A wire joins two tabs on one page, or runs from a tab into a junction.
//! Junctions carry child wires, so a wire is the root of a small tree; every
//! tab reachable through that tree is electrically one net. Waypoints only
//! shape the drawn polyline.

use std::collections::HashSet;

use crate::geom::Point;
use crate::id::Id;

/// Visual-only routing point on a wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub id: Id,
    pub position: Point,
}

/// Branch point joining all wires that meet it.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub id: Id,
    pub position: Point,
    pub child_wires: Vec<Wire>,
}

impl Junction {
    pub fn new(id: Id, position: Point) -> Self {
        Self {
            id,
            position,
            child_wires: Vec::new(),
        }
    }
}

/// A page-local electrical connection between tabs.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub id: Id,
    pub start_tab: Id,
    /// Absent when the wire terminates at a junction.
    pub end_tab: Option<Id>,
    pub waypoints: Vec<Waypoint>,
    pub junctions: Vec<Junction>,
}

impl Wire {
    pub fn new(id: Id, start_tab: Id, end_tab: Option<Id>) -> Self {
        Self {
            id,
            start_tab,
            end_tab,
            waypoints: Vec::new(),
            junctions: Vec::new(),
        }
    }

    /// Collect every tab id reachable through this wire tree, following
    /// junctions recursively. `visited` guards against wire cycles.
    pub fn collect_tabs(&self, tabs: &mut Vec<Id>, visited: &mut HashSet<Id>) {
        if !visited.insert(self.id) {
            return;
        }
        tabs.push(self.start_tab);
        if let Some(end) = self.end_tab {
            tabs.push(end);
        }
        for junction in &self.junctions {
            for child in &junction.child_wires {
                child.collect_tabs(tabs, visited);
            }
        }
    }

    /// Iterate over this wire and all child wires, depth first.
    pub fn visit_wires<'a>(&'a self, out: &mut Vec<&'a Wire>, visited: &mut HashSet<Id>) {
        if !visited.insert(self.id) {
            return;
        }
        out.push(self);
        for junction in &self.junctions {
            for child in &junction.child_wires {
                child.visit_wires(out, visited);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> Id {
        Id::from_raw(raw)
    }

    #[test]
    fn test_collect_tabs_simple() {
        let wire = Wire::new(id(1), id(10), Some(id(11)));
        let mut tabs = Vec::new();
        wire.collect_tabs(&mut tabs, &mut HashSet::new());
        assert_eq!(tabs, vec![id(10), id(11)]);
    }

    #[test]
    fn test_collect_tabs_through_junction() {
        let mut wire = Wire::new(id(1), id(10), None);
        let mut junction = Junction::new(id(2), Point::default());
        junction.child_wires.push(Wire::new(id(3), id(11), None));
        junction.child_wires.push(Wire::new(id(4), id(12), Some(id(13))));
        wire.junctions.push(junction);

        let mut tabs = Vec::new();
        wire.collect_tabs(&mut tabs, &mut HashSet::new());
        assert_eq!(tabs, vec![id(10), id(11), id(12), id(13)]);
    }

    #[test]
    fn test_collect_tabs_survives_cycle() {
        // Wire 1 -> junction -> wire 2 -> junction -> wire 1 again.
        let mut inner = Wire::new(id(1), id(10), None);
        let mut j2 = Junction::new(id(20), Point::default());
        j2.child_wires.push(Wire::new(id(1), id(10), None)); // same id as root
        let mut child = Wire::new(id(2), id(11), None);
        child.junctions.push(j2);
        let mut j1 = Junction::new(id(21), Point::default());
        j1.child_wires.push(child);
        inner.junctions.push(j1);

        let mut tabs = Vec::new();
        inner.collect_tabs(&mut tabs, &mut HashSet::new());
        assert_eq!(tabs, vec![id(10), id(11)]);
    }
}
