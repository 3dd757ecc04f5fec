//! Cost-plus pricing engine.
//!
//! Pure and deterministic: given a [`PricingConfig`] and a [`PricingInput`],
//! [`compute_cost_plus`] returns the full [`PricingBreakdown`]. No I/O, no
//! clock, no global state — callers own both inputs.

pub use makershop_core::pricing_config::{PricingConfig, RoundingStrategy};

mod engine;
mod input;

pub use engine::{apply_rounding, compute_cost_plus, PricingBreakdown};
pub use input::PricingInput;
