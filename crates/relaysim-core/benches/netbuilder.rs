//! Net builder benchmarks: wide junction fan-outs and long wire chains.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use relaysim_core::component::{Component, ComponentKind};
use relaysim_core::geom::Point;
use relaysim_core::id::{Id, IdAllocator};
use relaysim_core::netbuilder::build_page_nets;
use relaysim_core::page::Page;
use relaysim_core::pin::{Pin, Tab};
use relaysim_core::wire::Wire;

/// Build a page with `n` single-tab components chained by wires.
fn chained_page(n: u32) -> Page {
    let mut page = Page::new(Id::from_raw(1), "bench");
    let mut next = 100u32;
    let mut id = move || {
        next += 1;
        Id::from_raw(next)
    };

    let mut tabs = Vec::with_capacity(n as usize);
    for _ in 0..n {
        let mut component = Component::new(id(), ComponentKind::Indicator, Point::default());
        let mut pin = Pin::new(id());
        let tab = id();
        pin.tabs.push(Tab::new(tab, Point::default()));
        component.pins.push(pin);
        page.add_component(component);
        tabs.push(tab);
    }
    for pair in tabs.windows(2) {
        page.wires.push(Wire::new(id(), pair[0], Some(pair[1])));
    }
    page
}

fn bench_netbuilder(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_page_nets");
    for size in [100u32, 1_000, 10_000] {
        let page = chained_page(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, page| {
            b.iter(|| {
                let mut ids = IdAllocator::new();
                build_page_nets(page, &mut ids)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_netbuilder);
criterion_main!(benches);
