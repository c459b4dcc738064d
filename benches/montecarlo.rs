use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use options_advisor::prelude::*;

fn iron_condor(spot: f64, t: f64, r: f64, vol: f64) -> Vec<OptionLeg> {
    [
        (OptionType::Call, LegAction::Sell, 66_000.0),
        (OptionType::Call, LegAction::Buy, 79_500.0),
        (OptionType::Put, LegAction::Sell, 38_000.0),
        (OptionType::Put, LegAction::Buy, 31_500.0),
    ]
    .into_iter()
    .filter_map(|(option_type, action, strike)| OptionLeg::priced(option_type, action, strike, spot, t, r, vol).ok())
    .collect()
}

fn bench_estimate_pop(c: &mut Criterion) {
    let (spot, t, r, vol) = (50_000.0, 30.0 / 365.0, 0.05, 0.65);
    let legs = iron_condor(spot, t, r, vol);
    let mc = MonteCarloEngine::new(Some(42));

    let mut group = c.benchmark_group("estimate_pop");
    for paths in [10_000, 20_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(paths), &paths, |b, &paths| {
            b.iter(|| black_box(mc.estimate_pop(&legs, spot, vol, t, r, paths)));
        });
    }
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let config = EngineConfig::default();
    let snapshot = MarketSnapshot::new(50_000.0, 0.65, chrono::Utc::now()).unwrap();
    let selector = StrategySelector::default();

    c.bench_function("select_six_templates", |b| {
        b.iter(|| black_box(selector.select(Regime::Ranging, 80.0, &snapshot, 5_000.0, &config)));
    });
}

criterion_group!(benches, bench_estimate_pop, bench_select);
criterion_main!(benches);
