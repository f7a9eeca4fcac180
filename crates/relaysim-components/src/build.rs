//! Document-side component constructors.
//!
//! These build `Component` entities with the canonical pin/tab layout for
//! each kind. The editor and tests use them; the instantiator synthesizes
//! SubCircuit components itself from a FOOTPRINT page.

use relaysim_core::component::{Component, ComponentKind, PropertyValue};
use relaysim_core::geom::Point;
use relaysim_core::id::IdAllocator;
use relaysim_core::pin::{Pin, Tab};

/// Tab offsets at the 12, 3, 6 and 9 o'clock positions.
fn clock_tabs(ids: &mut IdAllocator, pin: &mut Pin, radius: f64) {
    for offset in [
        Point::new(0.0, -radius),
        Point::new(radius, 0.0),
        Point::new(0.0, radius),
        Point::new(-radius, 0.0),
    ] {
        pin.tabs.push(Tab::new(ids.allocate(), offset));
    }
}

fn single_pin(ids: &mut IdAllocator, component: &mut Component, radius: f64) {
    let mut pin = Pin::new(ids.allocate());
    clock_tabs(ids, &mut pin, radius);
    component.pins.push(pin);
}

/// A toggle switch: one pin, four tabs on a 40 px circle.
pub fn switch(ids: &mut IdAllocator, position: Point) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Switch, position);
    single_pin(ids, &mut component, 20.0);
    component
        .properties
        .insert("mode".to_string(), PropertyValue::Text("toggle".to_string()));
    component
}

/// A momentary pushbutton: a switch in pushbutton mode.
pub fn pushbutton(ids: &mut IdAllocator, position: Point) -> Component {
    let mut component = switch(ids, position);
    component.properties.insert(
        "mode".to_string(),
        PropertyValue::Text("pushbutton".to_string()),
    );
    component
}

/// An indicator LED: one pin, four tabs on a 30 px circle.
pub fn indicator(ids: &mut IdAllocator, position: Point) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Indicator, position);
    single_pin(ids, &mut component, 15.0);
    component
}

/// A Vcc source: one pin, one tab below the symbol.
pub fn vcc(ids: &mut IdAllocator, position: Point) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Vcc, position);
    let mut pin = Pin::new(ids.allocate());
    pin.tabs.push(Tab::new(ids.allocate(), Point::new(0.0, 20.0)));
    component.pins.push(pin);
    component
}

/// A DPDT relay: COIL, COM1, NO1, NC1, COM2, NO2, NC2, four tabs each.
pub fn dpdt_relay(ids: &mut IdAllocator, position: Point) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::DpdtRelay, position);
    // Pin anchors in a coil-on-top column, poles below.
    let anchors = [
        Point::new(0.0, -60.0),  // COIL
        Point::new(-20.0, -20.0), // COM1
        Point::new(20.0, -40.0),  // NO1
        Point::new(20.0, 0.0),    // NC1
        Point::new(-20.0, 40.0),  // COM2
        Point::new(20.0, 20.0),   // NO2
        Point::new(20.0, 60.0),   // NC2
    ];
    for anchor in anchors {
        let mut pin = Pin::new(ids.allocate());
        for offset in [
            Point::new(0.0, -10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(-10.0, 0.0),
        ] {
            pin.tabs.push(Tab::new(
                ids.allocate(),
                Point::new(anchor.x + offset.x, anchor.y + offset.y),
            ));
        }
        component.pins.push(pin);
    }
    component
}

/// A named link attachment: one pin, one tab.
pub fn link(ids: &mut IdAllocator, position: Point, name: impl Into<String>) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Link, position);
    let mut pin = Pin::new(ids.allocate());
    pin.tabs.push(Tab::new(ids.allocate(), Point::new(10.0, 0.0)));
    component.pins.push(pin);
    component.link_name = Some(name.into());
    component
}

/// A clock source: one pin, four tabs, 1 Hz and disabled by default.
pub fn clock(ids: &mut IdAllocator, position: Point) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Clock, position);
    single_pin(ids, &mut component, 20.0);
    component
        .properties
        .insert("frequency".to_string(), PropertyValue::Text("1Hz".to_string()));
    component.properties.insert(
        "enable_on_sim_start".to_string(),
        PropertyValue::Bool(false),
    );
    component
}

/// A diode: anode and cathode pins, one tab each.
pub fn diode(ids: &mut IdAllocator, position: Point) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Diode, position);
    for x in [-30.0, 30.0] {
        let mut pin = Pin::new(ids.allocate());
        pin.tabs.push(Tab::new(ids.allocate(), Point::new(x, 0.0)));
        component.pins.push(pin);
    }
    component
}

/// A bus: `count` pins stacked vertically, pin `i` named
/// `{bus_name}_{start_pin + i}` by the link resolver.
pub fn bus(
    ids: &mut IdAllocator,
    position: Point,
    bus_name: impl Into<String>,
    start_pin: i64,
    count: usize,
) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Bus, position);
    let count = count.max(1);
    let span = (count - 1) as f64 * 20.0;
    for i in 0..count {
        let mut pin = Pin::new(ids.allocate());
        pin.tabs.push(Tab::new(
            ids.allocate(),
            Point::new(0.0, i as f64 * 20.0 - span / 2.0),
        ));
        component.pins.push(pin);
    }
    component.properties.insert(
        "bus_name".to_string(),
        PropertyValue::Text(bus_name.into()),
    );
    component
        .properties
        .insert("start_pin".to_string(), PropertyValue::Int(start_pin));
    component
        .properties
        .insert("number_of_pins".to_string(), PropertyValue::Int(count as i64));
    component
}

/// A thumbwheel: four hidden bit pins driving `{bus_name}_{start_pin + bit}`.
pub fn thumbwheel(
    ids: &mut IdAllocator,
    position: Point,
    bus_name: impl Into<String>,
    start_pin: i64,
) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Thumbwheel, position);
    // Tabs sit well off the body so they stay clear of the buttons.
    for bit in 0..4 {
        let mut pin = Pin::new(ids.allocate());
        pin.tabs.push(Tab::new(
            ids.allocate(),
            Point::new(0.0, 1000.0 + bit as f64 * 20.0),
        ));
        component.pins.push(pin);
    }
    component.properties.insert(
        "bus_name".to_string(),
        PropertyValue::Text(bus_name.into()),
    );
    component
        .properties
        .insert("start_pin".to_string(), PropertyValue::Int(start_pin));
    component
}

/// A memory: Enable/Read/Write control pins on the left, one data pin per
/// bit on the right; the address bus is link-only.
pub fn memory(
    ids: &mut IdAllocator,
    position: Point,
    address_bits: i64,
    data_bits: usize,
) -> Component {
    let mut component = Component::new(ids.allocate(), ComponentKind::Memory, position);
    let data_bits = data_bits.clamp(1, 16);

    for row in 0..3 {
        let mut pin = Pin::new(ids.allocate());
        pin.tabs.push(Tab::new(
            ids.allocate(),
            Point::new(-440.0, -40.0 + row as f64 * 70.0),
        ));
        component.pins.push(pin);
    }
    let data_span = (data_bits - 1) as f64 * 20.0;
    for bit in 0..data_bits {
        let mut pin = Pin::new(ids.allocate());
        pin.tabs.push(Tab::new(
            ids.allocate(),
            Point::new(360.0, bit as f64 * 20.0 - data_span / 2.0),
        ));
        component.pins.push(pin);
    }

    component.properties.insert(
        "address_bits".to_string(),
        PropertyValue::Int(address_bits.clamp(3, 16)),
    );
    component
        .properties
        .insert("data_bits".to_string(), PropertyValue::Int(data_bits as i64));
    component.properties.insert(
        "address_bus_name".to_string(),
        PropertyValue::Text("ADDR".to_string()),
    );
    component.properties.insert(
        "data_bus_name".to_string(),
        PropertyValue::Text("DATA".to_string()),
    );
    component
        .properties
        .insert("is_volatile".to_string(), PropertyValue::Bool(false));
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::pins;

    #[test]
    fn test_switch_layout() {
        let mut ids = IdAllocator::new();
        let component = switch(&mut ids, Point::new(5.0, 5.0));
        assert_eq!(component.kind, ComponentKind::Switch);
        assert_eq!(component.pins.len(), 1);
        assert_eq!(component.pins[0].tabs.len(), 4);
        assert_eq!(component.text_property("mode"), Some("toggle"));
    }

    #[test]
    fn test_relay_layout() {
        let mut ids = IdAllocator::new();
        let component = dpdt_relay(&mut ids, Point::default());
        assert_eq!(component.pins.len(), pins::COUNT);
        assert!(component.pins.iter().all(|p| p.tabs.len() == 4));
    }

    #[test]
    fn test_bus_and_thumbwheel_layouts() {
        let mut ids = IdAllocator::new();
        let b = bus(&mut ids, Point::default(), "Data", 4, 8);
        assert_eq!(b.pins.len(), 8);
        assert_eq!(b.link_mappings().len(), 8);
        assert_eq!(b.link_mappings()[0].0, "Data_4");

        let tw = thumbwheel(&mut ids, Point::default(), "Data", 0);
        assert_eq!(tw.pins.len(), 4);
        assert_eq!(tw.link_mappings()[3].0, "Data_3");
    }

    #[test]
    fn test_memory_layout() {
        let mut ids = IdAllocator::new();
        let m = memory(&mut ids, Point::default(), 8, 4);
        // Three controls plus four data bits.
        assert_eq!(m.pins.len(), 7);
        let mappings = m.link_mappings();
        assert_eq!(mappings.len(), 4);
        assert_eq!(mappings[0].0, "DATA_0");
        assert_eq!(m.int_property("address_bits"), Some(8));
    }

    #[test]
    fn test_clock_and_diode_layouts() {
        let mut ids = IdAllocator::new();
        let c = clock(&mut ids, Point::default());
        assert_eq!(c.pins.len(), 1);
        assert_eq!(c.pins[0].tabs.len(), 4);
        assert_eq!(c.text_property("frequency"), Some("1Hz"));

        let d = diode(&mut ids, Point::default());
        assert_eq!(d.pins.len(), 2);
        assert!(d.pins.iter().all(|p| p.tabs.len() == 1));
    }

    #[test]
    fn test_vcc_and_link_have_one_tab() {
        let mut ids = IdAllocator::new();
        assert_eq!(vcc(&mut ids, Point::default()).pins[0].tabs.len(), 1);
        let l = link(&mut ids, Point::default(), "A");
        assert_eq!(l.pins[0].tabs.len(), 1);
        assert_eq!(l.effective_link_name(), Some("A"));
    }

    #[test]
    fn test_all_ids_are_fresh() {
        let mut ids = IdAllocator::new();
        let a = switch(&mut ids, Point::default());
        let b = switch(&mut ids, Point::default());
        let ids_a: std::collections::HashSet<_> =
            std::iter::once(a.id).chain(a.tabs().map(|t| t.id)).collect();
        let ids_b: std::collections::HashSet<_> =
            std::iter::once(b.id).chain(b.tabs().map(|t| t.id)).collect();
        assert!(ids_a.is_disjoint(&ids_b));
    }
}
