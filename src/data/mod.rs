pub mod bar;
pub mod quality;

pub use bar::{historical_volatility, MarketSnapshot, PriceBar};
pub use quality::{inspect_bar, validate_bars, BarDefect};
