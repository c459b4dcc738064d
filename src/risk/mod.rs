pub mod sizing;

pub use sizing::{PositionSize, PositionSizer};
