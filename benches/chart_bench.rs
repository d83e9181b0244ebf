use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use sysdash::chart::{ChartConfig, build_draw_list, build_snapshot};
use sysdash::metrics::EntityRegistry;
use sysdash::metrics::rate::RatePoint;
use sysdash::metrics::registry::{Channel, EntityClass, SeriesCapacities};

const WINDOW: usize = 60;

fn make_registry(cores: usize) -> EntityRegistry {
    let mut reg = EntityRegistry::new(
        8,
        SeriesCapacities {
            cpu: WINDOW,
            disk: 60,
            network: 15,
        },
    );
    for core in 0..cores {
        let key = format!("cpu{core}");
        reg.ensure_entity(&key, EntityClass::Cpu, 0.0);
        for i in 0..WINDOW {
            reg.append_rate(
                &key,
                Channel::Usage,
                RatePoint {
                    at_secs: i as f64,
                    value: ((i * 7 + core * 13) % 100) as f64,
                },
            )
            .unwrap();
        }
    }
    reg
}

fn cpu_config() -> ChartConfig {
    ChartConfig {
        title: "CPU Cores",
        class: EntityClass::Cpu,
        capacity: WINDOW,
        unit: "%",
    }
}

fn bench_build_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_snapshot_8_32_128");
    for cores in [8usize, 32, 128] {
        let reg = make_registry(cores);
        let chart = cpu_config();
        group.bench_with_input(BenchmarkId::from_parameter(cores), &cores, |b, _| {
            b.iter(|| black_box(build_snapshot(&reg, &chart)));
        });
    }
    group.finish();
}

fn bench_build_draw_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_draw_list_8_32_128");
    for cores in [8usize, 32, 128] {
        let reg = make_registry(cores);
        let snapshot = build_snapshot(&reg, &cpu_config());
        group.bench_with_input(BenchmarkId::from_parameter(cores), &cores, |b, _| {
            b.iter(|| black_box(build_draw_list(&snapshot)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_snapshot, bench_build_draw_list);
criterion_main!(benches);
