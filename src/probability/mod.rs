pub mod montecarlo;
pub mod stochastic;
pub mod utils;

pub use montecarlo::{MonteCarloEngine, PayoffStatistics};
pub use stochastic::GBM;

pub trait Process {
    /// Evolves one step forward given the current state and a standard normal sample.
    fn step(&self, state: f64, z: f64) -> f64;
}
