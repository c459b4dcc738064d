use options_advisor::prelude::*;

#[test]
fn test_integration_smoke() {
    // Pricing
    let quote = price(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
    assert!((quote.fair_value - 10.4506).abs() < 1e-3);

    // Config round trip through JSON
    let config = EngineConfig::from_json_str(r#"{ "monteCarloPaths": 10000 }"#).unwrap();
    assert_eq!(config.monte_carlo_paths, 10_000);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);

    // Sizing
    let size = PositionSizer::contracts_for(120.0, 5_000.0, 0.10).unwrap();
    assert_eq!(size.contracts, 4);
}
