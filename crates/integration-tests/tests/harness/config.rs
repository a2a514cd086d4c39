//! Configuration builder for integration tests

use voxgate_config::{Config, ThrottleLimits};

/// Builds a gateway configuration pointed at a mock backend
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(synthesis_url: &str) -> Self {
        let mut config = Config::default();
        config.synthesis.base_url = synthesis_url.parse().expect("valid mock URL");
        // Keep transient-failure retries out of call-count assertions
        config.synthesis.retries = 0;
        Self { config }
    }

    #[allow(dead_code)]
    pub fn with_throttle(mut self, per_minute: u32, per_day: u32) -> Self {
        self.config.throttle.default = ThrottleLimits { per_minute, per_day };
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
