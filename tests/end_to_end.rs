use chrono::{TimeZone, Utc};
use options_advisor::prelude::*;

fn snapshot() -> MarketSnapshot {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
    MarketSnapshot::new(50_000.0, 0.65, now).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig {
        max_capital_per_trade_pct: 0.10,
        min_probability_of_profit: 0.55,
        ..EngineConfig::default()
    }
}

#[test]
fn test_ranging_market_recommendation() {
    let rec = StrategySelector::default()
        .select(Regime::Ranging, 80.0, &snapshot(), 5_000.0, &config())
        .unwrap()
        .expect("expected a trade");

    println!("{rec}");
    for alt in &rec.alternatives {
        println!("  alternative {} score {:.3} pop {:.3}", alt.strategy, alt.score, alt.probability_of_profit);
    }

    assert!(matches!(rec.strategy, StrategyKind::IronCondor | StrategyKind::CreditSpread));
    assert!(rec.max_loss <= 500.0, "max loss {}", rec.max_loss);
    assert!(rec.capital_at_risk <= 5_000.0 * 0.10);
    assert!(rec.probability_of_profit >= 0.55);
    assert!(rec.net_premium > 0.0);
    assert_eq!(rec.regime, Regime::Ranging);
    assert_eq!(rec.regime_confidence, 80.0);
    assert_eq!(rec.trading_window, TradingWindow::Optimal);
    assert!(rec.risk.level != RiskLevel::High);
    assert!(rec.next_optimal_window > rec.generated_at);
    assert!((rec.risk.stop_loss - 0.5 * rec.capital_at_risk).abs() < 1e-9);

    // directional spreads rank below the chosen premium seller
    let ranked = StrategySelector::default()
        .evaluate(Regime::Ranging, 80.0, &snapshot(), &config())
        .unwrap();
    let position = |kind| ranked.iter().position(|s| s.candidate.kind == kind).unwrap();
    let chosen = position(rec.strategy);
    assert!(chosen < position(StrategyKind::BullCallSpread));
    assert!(chosen < position(StrategyKind::BearPutSpread));
}

#[test]
fn test_no_trade_when_floor_unreachable() {
    let strict = EngineConfig {
        min_probability_of_profit: 0.95,
        ..config()
    };
    for regime in Regime::ALL {
        let rec = StrategySelector::default()
            .select(regime, 80.0, &snapshot(), 5_000.0, &strict)
            .unwrap();
        assert!(rec.is_none(), "{regime}");
    }
}

#[test]
fn test_recommendation_respects_floor_in_every_regime() {
    for regime in Regime::ALL {
        if let Some(rec) = StrategySelector::default()
            .select(regime, 60.0, &snapshot(), 5_000.0, &config())
            .unwrap()
        {
            assert!(rec.probability_of_profit >= 0.55);
            assert!(rec.capital_at_risk <= 500.0);
        }
    }
}

#[test]
fn test_capital_too_small() {
    let result = PositionSizer::contracts_for(500.0, 10.0, 0.10);
    assert!(matches!(
        result,
        Err(EngineError::CapitalTooSmall { risk_budget, max_loss_per_contract })
            if (risk_budget - 1.0).abs() < 1e-12 && max_loss_per_contract == 500.0
    ));

    let selected = StrategySelector::default().select(Regime::Ranging, 80.0, &snapshot(), 10.0, &config());
    assert!(matches!(selected, Err(EngineError::CapitalTooSmall { .. })));
}

#[test]
fn test_serializes_to_json() {
    let rec = StrategySelector::default()
        .select(Regime::Ranging, 80.0, &snapshot(), 5_000.0, &config())
        .unwrap()
        .expect("expected a trade");

    let json = serde_json::to_string(&rec).unwrap();
    assert!(json.contains("\"regime\":\"RANGING\""));
    let back: Recommendation = serde_json::from_str(&json).unwrap();
    assert_eq!(back.strategy, rec.strategy);
    assert_eq!(back.contracts, rec.contracts);
}
