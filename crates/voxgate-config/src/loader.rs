use std::path::Path;
use std::time::Duration;

use crate::{Config, SpeechProvider};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if any section carries values the pipeline cannot
    /// operate with
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_synthesis()?;
        self.validate_pipeline()?;
        self.validate_throttle()?;
        self.validate_durations()?;
        Ok(())
    }

    fn validate_synthesis(&self) -> anyhow::Result<()> {
        if self.synthesis.preferred_provider == SpeechProvider::Disabled {
            anyhow::bail!("synthesis.preferred_provider cannot be 'disabled'; use the hard-cap flag instead");
        }
        if self.synthesis.emergency_bitrate == 0 {
            anyhow::bail!("synthesis.emergency_bitrate must be greater than 0");
        }
        Ok(())
    }

    fn validate_pipeline(&self) -> anyhow::Result<()> {
        let segmenter = &self.pipeline.segmenter;
        if segmenter.max_words == 0 {
            anyhow::bail!("pipeline.segmenter.max_words must be greater than 0");
        }
        if segmenter.max_segments == 0 {
            anyhow::bail!("pipeline.segmenter.max_segments must be greater than 0");
        }
        if segmenter.words_per_second <= 0.0 {
            anyhow::bail!("pipeline.segmenter.words_per_second must be positive");
        }

        let batcher = &self.pipeline.batcher;
        if batcher.max_batch_size == 0 {
            anyhow::bail!("pipeline.batcher.max_batch_size must be greater than 0");
        }
        if batcher.max_word_count == 0 {
            anyhow::bail!("pipeline.batcher.max_word_count must be greater than 0");
        }
        Ok(())
    }

    fn validate_throttle(&self) -> anyhow::Result<()> {
        let all_limits =
            std::iter::once(&self.throttle.default).chain(self.throttle.tiers.values());

        for limits in all_limits {
            if limits.per_minute == 0 || limits.per_day == 0 {
                anyhow::bail!("throttle limits must be greater than 0");
            }
        }
        Ok(())
    }

    /// Durations are kept as humane strings in the file; fail fast if any
    /// of them cannot be parsed
    fn validate_durations(&self) -> anyhow::Result<()> {
        parse_duration("synthesis.timeout", &self.synthesis.timeout)?;
        parse_duration("flags.cache_ttl", &self.flags.cache_ttl)?;
        if let Some(ref cache) = self.cache {
            parse_duration("cache.default_ttl", &cache.default_ttl)?;
        }
        Ok(())
    }
}

/// Parse a humane duration string ("30s", "24h") from config
pub fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} ('{value}'): {e}"))
}
