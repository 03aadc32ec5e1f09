//! Backend services

pub mod registry;

pub use registry::StrategyRegistry;
