//! Domain layer: fingerprints, decision caches and the decision flow.

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod pipeline;

pub use cache::{CacheMetrics, DecisionCache};
pub use error::HookError;
pub use fingerprint::{Fingerprint, FingerprintScheme};
pub use pipeline::DecisionPipeline;
