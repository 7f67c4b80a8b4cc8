pub mod analyzers;
pub mod chart;
pub mod error;
pub mod loader;
pub mod output;
