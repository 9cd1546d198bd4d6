mod cache;
mod gate;
mod record;

pub use cache::TokenCache;
pub use gate::{GateOutcome, RefreshGate, RefreshOrigin};
pub use record::{SAFETY_MARGIN, TokenRecord};
