// =============================================================================
// Indicator Service — remote HTTP collaborator
// =============================================================================

pub mod client;

pub use client::{FetchFailure, IndicatorClient};
