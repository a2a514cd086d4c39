#![allow(clippy::must_use_candidate)]

pub mod cache;
mod env;
pub mod flags;
mod loader;
pub mod pipeline;
pub mod server;
pub mod synthesis;
pub mod throttle;

use serde::Deserialize;

pub use cache::*;
pub use flags::*;
pub use pipeline::*;
pub use server::*;
pub use synthesis::*;
pub use throttle::*;

/// Top-level voxgate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Synthesis backend and provider selection
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Segmenter and batcher tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Per-user throttle limits
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Operator feature flags
    #[serde(default)]
    pub flags: FlagsConfig,
    /// Audio cache keyed by canonical hash
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}
