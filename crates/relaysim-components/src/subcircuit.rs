//! Sub-circuit instance: transparent wrapper over cloned pages.
//!
//! Each external pin is bridged at start to the net of the corresponding
//! Link on the instance's cloned FOOTPRINT page; after that the contained
//! circuit does all the work.

use relaysim_core::{ComponentKind, Id, PropertyMap};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::Result;

/// One external pin's wiring: the tab on the wrapper component and the tab
/// of the matching Link inside the instance pages.
#[derive(Debug, Clone, Copy)]
pub struct PinWiring {
    pub external_tab: Id,
    pub internal_tab: Id,
}

#[derive(Debug)]
pub struct SubCircuitInstance {
    component: Id,
    wiring: Vec<PinWiring>,
    bridges: Vec<Id>,
    lifecycle: Lifecycle,
}

impl SubCircuitInstance {
    pub fn new(component: Id, wiring: Vec<PinWiring>) -> Self {
        Self {
            component,
            wiring,
            bridges: Vec::new(),
            lifecycle: Lifecycle::Idle,
        }
    }

    /// Bridges currently tying the wrapper to its instance pages.
    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }
}

impl Behavior for SubCircuitInstance {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::SubCircuit
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        self.bridges.clear();

        for wiring in &self.wiring {
            let external = ctx.net_of_tab(wiring.external_tab);
            let internal = ctx.net_of_tab(wiring.internal_tab);
            match (external, internal) {
                (Some(a), Some(b)) if a != b => {
                    if let Some(bridge) = ctx.create_bridge(a, b) {
                        self.bridges.push(bridge);
                    }
                }
                _ => {
                    log::warn!(
                        "sub-circuit {}: pin tab {} has no net to bridge",
                        self.component,
                        wiring.external_tab
                    );
                }
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, _ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
        // Transparent: the contained circuit does the work.
        Ok(())
    }

    fn interact(&mut self, _action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        Ok(false)
    }

    fn on_stop(&mut self) -> Result<()> {
        // The engine destroys owned bridges; only drop the references.
        self.bridges.clear();
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }
}
