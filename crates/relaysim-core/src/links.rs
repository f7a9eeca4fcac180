//! Link resolver: join nets across pages by component link names.
//!
//! Components carrying the same (exact, case-sensitive) link name are made
//! equipotential at evaluation time. The resolver only annotates nets with
//! names; it never merges net records, so editing a link name does not force
//! a net rebuild.

use std::collections::BTreeMap;

use crate::document::Document;
use crate::id::Id;
use crate::net::Net;

/// Scope a link name resolves within: the main document (`None`) or one
/// sub-circuit instance. Clones of a template keep their link names
/// verbatim, so without the scope two instances would short together.
pub type LinkScope = Option<Id>;

/// Outcome of a link resolution pass.
#[derive(Debug, Default)]
pub struct LinkResolution {
    /// (scope, link name) -> ids of nets carrying it, in resolution order.
    pub members: BTreeMap<(LinkScope, String), Vec<Id>>,
    /// Names attached to exactly one net (probably an authoring mistake).
    pub unconnected: Vec<String>,
    /// Names spanning more than one page.
    pub cross_page: usize,
}

impl LinkResolution {
    /// Number of distinct (scope, name) pairs seen.
    pub fn total_names(&self) -> usize {
        self.members.len()
    }

    /// Nets joined under a name in the main document scope.
    pub fn main_members(&self, name: &str) -> &[Id] {
        self.members
            .get(&(None, name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Annotate `nets` with the link names of every component in the document,
/// instance pages included.
///
/// A name carried by a single net is reported (and logged) as unconnected
/// but is not an error; a name on a component with no tabs in any net is
/// ignored.
pub fn resolve_links(document: &Document, nets: &mut [Net]) -> LinkResolution {
    let mut resolution = LinkResolution::default();

    for page in document.pages() {
        let scope: LinkScope = page.instance_of.map(|r| r.instance_id);
        for component in page.components() {
            // Bus-style components name each pin individually.
            for (name, pin) in component.link_mappings() {
                let Some(tab) = pin.first_tab() else {
                    continue;
                };
                attach(&mut resolution, nets, scope, &name, tab.id);
            }

            // The component-level name attaches through any one tab.
            let Some(name) = component.effective_link_name() else {
                continue;
            };
            let Some(tab) = component.tabs().next() else {
                continue;
            };
            attach(&mut resolution, nets, scope, name, tab.id);
        }
    }

    for ((_, name), net_ids) in &resolution.members {
        if net_ids.len() == 1 {
            log::warn!("link {name:?} is attached to a single net; nothing to join");
            resolution.unconnected.push(name.clone());
        } else {
            let pages: std::collections::BTreeSet<_> = net_ids
                .iter()
                .filter_map(|id| nets.iter().find(|n| n.id == *id))
                .map(|n| n.page)
                .collect();
            if pages.len() > 1 {
                resolution.cross_page += 1;
            }
        }
    }

    resolution
}

/// Put `name` on the net containing `tab` and record the membership.
fn attach(
    resolution: &mut LinkResolution,
    nets: &mut [Net],
    scope: LinkScope,
    name: &str,
    tab: Id,
) {
    let Some(net) = nets.iter_mut().find(|n| n.has_tab(tab)) else {
        return;
    };
    let entry = resolution
        .members
        .entry((scope, name.to_string()))
        .or_default();
    if !entry.contains(&net.id) {
        entry.push(net.id);
    }
    net.links.insert(name.to_string());
}
