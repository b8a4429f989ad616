pub mod generation;
pub mod metrics;
pub mod providers;
pub mod speech;
