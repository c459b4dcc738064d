use criterion::{black_box, criterion_group, criterion_main, Criterion};
use options_advisor::prelude::*;
use rand::prelude::*;

fn bench_black_scholes(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 100_000;

    let spots: Vec<f64> = (0..n).map(|_| rng.gen_range(80.0..120.0)).collect();
    let strikes: Vec<f64> = (0..n).map(|_| rng.gen_range(90.0..110.0)).collect();
    let vols: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..0.9)).collect();
    let rates: Vec<f64> = (0..n).map(|_| rng.gen_range(0.01..0.05)).collect();
    let times: Vec<f64> = (0..n).map(|_| rng.gen_range(0.02..1.0)).collect();

    c.bench_function("price_call_with_greeks_100k", |b| {
        b.iter(|| {
            for i in 0..n {
                let _ = black_box(price(
                    OptionType::Call,
                    spots[i],
                    strikes[i],
                    times[i],
                    rates[i],
                    vols[i],
                ));
            }
        });
    });
}

fn bench_implied_vol(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1337);
    let n = 10_000;

    let spots: Vec<f64> = (0..n).map(|_| rng.gen_range(90.0..110.0)).collect();
    let strikes: Vec<f64> = (0..n).map(|_| rng.gen_range(90.0..110.0)).collect();
    let vols: Vec<f64> = (0..n).map(|_| rng.gen_range(0.15..1.2)).collect();

    let market_prices: Vec<f64> = spots
        .iter()
        .zip(&strikes)
        .zip(&vols)
        .map(|((&s, &k), &v)| {
            price(OptionType::Call, s, k, 0.5, 0.05, v).map_or(0.0, |q| q.fair_value)
        })
        .collect();

    c.bench_function("implied_vol_10k", |b| {
        b.iter(|| {
            for i in 0..n {
                let _ = black_box(implied_volatility(
                    market_prices[i],
                    OptionType::Call,
                    spots[i],
                    strikes[i],
                    0.5,
                    0.05,
                ));
            }
        });
    });
}

fn bench_templates(c: &mut Criterion) {
    let config = EngineConfig::default();
    let selector = StrategySelector::default();
    let now = chrono::Utc::now();
    let snapshot = MarketSnapshot::new(50_000.0, 0.65, now).unwrap();

    c.bench_function("build_iron_condor", |b| {
        b.iter(|| black_box(selector.build_candidate(StrategyKind::IronCondor, &snapshot, &config)));
    });
}

criterion_group!(benches, bench_black_scholes, bench_implied_vol, bench_templates);
criterion_main!(benches);
