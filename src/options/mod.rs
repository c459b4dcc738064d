pub mod leg;
pub mod pricing;

pub use leg::*;
pub use pricing::*;
