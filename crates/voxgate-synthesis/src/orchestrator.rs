//! Speech pipeline orchestration
//!
//! Drives one request through the full pipeline: decide, segment or
//! batch, throttle, resolve the provider, consult the audio cache, and
//! fan the surviving units out to the synthesis backend concurrently.
//! Units are isolated from each other; one failing never takes down the
//! rest of the request.

use std::sync::Arc;

use futures::future::join_all;
use voxgate_batch::{Batch, BatchItem, Batcher, ItemSpan};
use voxgate_cache::{AudioCache, CachedAudio, SingleFlight};
use voxgate_config::{Config, FlagStorage, SpeechProvider, SynthesisConfig};
use voxgate_core::HttpError;
use voxgate_provider::{
    FlagClient, FlagStore, MemoryFlagStore, ProviderDecision, RedisFlagStore, select,
};
use voxgate_segment::{AudioSegment, Segmenter};
use voxgate_throttle::ThrottleGuard;

use crate::{
    client::{SynthesisClient, TtsResponse},
    error::{Result, SynthesisError},
    types::{SpeakItem, SpeakRequest, SpeakResponse, SpeechUnit, TtsResult, UnitKind, UnitStatus},
};

/// One planned synthesis call
enum Job {
    Batch(Batch),
    Segment {
        segment: AudioSegment,
        voice: Option<String>,
    },
}

/// Coordinates the full decide/segment/batch/synthesize pipeline
pub struct Orchestrator {
    segmenter: Segmenter,
    batcher: Batcher,
    client: SynthesisClient,
    flags: FlagClient,
    throttle: ThrottleGuard,
    cache: Option<AudioCache>,
    flight: SingleFlight,
    synthesis: SynthesisConfig,
}

impl Orchestrator {
    /// Build from configuration, including the configured flag store
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn FlagStore> = match &config.flags.storage {
            FlagStorage::Memory => Arc::new(MemoryFlagStore::new()),
            FlagStorage::Redis(redis) => Arc::new(
                RedisFlagStore::new(redis.url.as_str())
                    .map_err(|e| SynthesisError::Config(e.to_string()))?,
            ),
        };

        Self::with_flag_store(config, store)
    }

    /// Build with an explicit flag store, keeping the rest configured
    pub fn with_flag_store(config: Config, store: Arc<dyn FlagStore>) -> Result<Self> {
        let Config {
            synthesis,
            pipeline,
            throttle,
            flags,
            cache,
            ..
        } = config;

        let client = SynthesisClient::new(&synthesis)?;
        let throttle = ThrottleGuard::new(throttle)?;

        let cache = cache
            .as_ref()
            .map(AudioCache::new)
            .transpose()
            .map_err(|e| SynthesisError::Config(e.to_string()))?;

        let cache_ttl = duration_str::parse(&flags.cache_ttl)
            .map_err(|e| SynthesisError::Config(format!("invalid flags.cache_ttl: {e}")))?;

        Ok(Self {
            segmenter: Segmenter::new(pipeline.segmenter),
            batcher: Batcher::new(pipeline.batcher),
            client,
            flags: FlagClient::new(store, cache_ttl),
            throttle,
            cache,
            flight: SingleFlight::new(),
            synthesis,
        })
    }

    /// Voice one ordered list of assistant replies
    ///
    /// Units come back in input order regardless of which synthesis call
    /// finished first. A request whose items are all muted succeeds with
    /// an empty unit list.
    pub async fn speak(&self, request: SpeakRequest) -> Result<SpeakResponse> {
        if request.items.is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        let user = request.user_id.as_deref();
        let tier = request.tier.as_deref();

        let jobs = self.plan(request.items);
        tracing::debug!(units = jobs.len(), "speech request planned");

        let units = join_all(jobs.iter().map(|job| self.run_job(job, user, tier))).await;

        Ok(SpeakResponse { units })
    }

    /// Turn items into synthesis jobs: mutes dropped, long replies
    /// segmented, consecutive short replies batched
    fn plan(&self, items: Vec<SpeakItem>) -> Vec<Job> {
        let mut jobs = Vec::new();
        let mut pending: Vec<BatchItem> = Vec::new();

        for item in items {
            let context = item.context.clone().unwrap_or_default();
            let decision = voxgate_decision::decide(&item.text, &context);

            if !decision.speak {
                tracing::debug!(reason = %decision.reason, "reply muted");
                continue;
            }

            if self.segmenter.is_too_long(&item.text) {
                // A long reply interrupts the batchable run around it
                self.flush_pending(&mut pending, &mut jobs);

                let result = self.segmenter.segment(&item.text, decision.mode);
                if result.was_truncated {
                    tracing::debug!("brief reply condensed to fit the word budget");
                }

                for segment in result.segments {
                    jobs.push(Job::Segment {
                        segment,
                        voice: item.voice.clone(),
                    });
                }
            } else {
                pending.push(BatchItem {
                    text: item.text,
                    voice: item.voice,
                    mode: Some(decision.mode),
                    context: item.context,
                    metadata: item.metadata,
                });
            }
        }

        self.flush_pending(&mut pending, &mut jobs);
        jobs
    }

    fn flush_pending(&self, pending: &mut Vec<BatchItem>, jobs: &mut Vec<Job>) {
        if pending.is_empty() {
            return;
        }
        for batch in self.batcher.plan(std::mem::take(pending)) {
            jobs.push(Job::Batch(batch));
        }
    }

    /// Run one job, folding any error into the unit instead of the
    /// request
    async fn run_job(&self, job: &Job, user: Option<&str>, tier: Option<&str>) -> SpeechUnit {
        let kind = match job {
            Job::Batch(_) => UnitKind::Batch,
            Job::Segment { .. } => UnitKind::Segment,
        };

        let status = match self.run_job_inner(job, user, tier).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "synthesis unit failed");
                UnitStatus::Failed {
                    reason: e.client_message(),
                }
            }
        };

        SpeechUnit { kind, status }
    }

    async fn run_job_inner(
        &self,
        job: &Job,
        user: Option<&str>,
        tier: Option<&str>,
    ) -> Result<UnitStatus> {
        // Throttle before any network work; a skipped unit must not
        // consume backend capacity
        let throttle = self.throttle.check(user, tier).await?;
        if !throttle.allowed {
            let reason = throttle.reason.unwrap_or_else(|| "Throttled".to_owned());
            tracing::debug!(user = user.unwrap_or("anonymous"), %reason, "synthesis skipped");
            return Ok(UnitStatus::Skipped { reason });
        }

        let flags = self.flags.load().await;
        let decision = select(&flags, &self.synthesis);

        if decision.provider == SpeechProvider::Disabled {
            let reason = decision
                .reason
                .unwrap_or_else(|| "Synthesis disabled".to_owned());
            return Ok(UnitStatus::Skipped { reason });
        }

        if let Some(reason) = &decision.reason {
            tracing::debug!(provider = %decision.provider, reason, "provider fallback active");
        }

        let results = match job {
            Job::Batch(batch) => self.run_batch(batch, &decision).await?,
            Job::Segment { segment, voice } => {
                vec![self.run_segment(segment, voice.as_deref(), &decision).await?]
            }
        };

        Ok(UnitStatus::Synthesized { results })
    }

    /// Voice one segment: markup text first, plain text as fallback
    async fn run_segment(
        &self,
        segment: &AudioSegment,
        voice: Option<&str>,
        decision: &ProviderDecision,
    ) -> Result<TtsResult> {
        let voice = decision.voice.as_deref().or(voice);

        let hash = match &segment.hash {
            Some(hash) => hash.clone(),
            None => voxgate_canonical::canonicalize(&segment.plain_text).hash,
        };

        let mut attempts = vec![segment.text.as_str()];
        if segment.plain_text != segment.text {
            attempts.push(segment.plain_text.as_str());
        }

        let span = ItemSpan {
            text: segment.plain_text.clone(),
            start_index: 0,
            end_index: segment.plain_text.chars().count(),
        };

        self.synthesize_cached(&hash, &attempts, voice, decision, vec![span])
            .await
    }

    /// Voice one batch: the combined call first, then each item on its
    /// own so one bad member cannot silence the rest
    async fn run_batch(&self, batch: &Batch, decision: &ProviderDecision) -> Result<Vec<TtsResult>> {
        let separator = &self.batcher.config().separator;
        let combined = batch.combined_text(separator);
        let spans = batch.item_spans(separator);

        let batch_voice = decision
            .voice
            .clone()
            .or_else(|| batch.voice().map(str::to_owned));
        let hash = voxgate_canonical::canonicalize(&combined).hash;

        let combined_err = match self
            .synthesize_cached(&hash, &[combined.as_str()], batch_voice.as_deref(), decision, spans)
            .await
        {
            Ok(result) => return Ok(vec![result]),
            Err(e) if batch.len() > 1 => e,
            Err(e) => return Err(e),
        };

        tracing::warn!(error = %combined_err, items = batch.len(), "combined call failed, retrying items individually");

        let mut results = Vec::new();
        for item in batch.items() {
            let item_voice = decision.voice.as_deref().or(item.voice.as_deref());
            let item_hash = voxgate_canonical::canonicalize(&item.text).hash;
            let span = ItemSpan {
                text: item.text.clone(),
                start_index: 0,
                end_index: item.text.chars().count(),
            };

            match self
                .synthesize_cached(&item_hash, &[item.text.as_str()], item_voice, decision, vec![span])
                .await
            {
                Ok(result) => results.push(result),
                Err(item_err) => {
                    tracing::warn!(error = %item_err, "item synthesis failed, dropping item");
                }
            }
        }

        if results.is_empty() {
            Err(combined_err)
        } else {
            Ok(results)
        }
    }

    /// Serve from the cache when possible, synthesize and fill it
    /// otherwise
    ///
    /// The single-flight guard spans lookup, synthesis, and write, so
    /// concurrent units with the same canonical hash pay for one call.
    async fn synthesize_cached(
        &self,
        hash: &str,
        attempts: &[&str],
        voice: Option<&str>,
        decision: &ProviderDecision,
        spans: Vec<ItemSpan>,
    ) -> Result<TtsResult> {
        let _guard = self.flight.acquire(hash).await;

        if let Some(cache) = &self.cache {
            match cache.get(hash).await {
                Ok(Some(entry)) => {
                    return Ok(TtsResult {
                        audio_url: entry.audio_url,
                        cached: true,
                        provider: entry.provider,
                        expires_at: entry.expires_at,
                        items: spans,
                    });
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "cache lookup failed, synthesizing"),
            }
        }

        let response = self.synthesize_attempts(attempts, voice, decision).await?;

        if let Some(cache) = &self.cache {
            let entry = CachedAudio {
                audio_url: response.audio_url.clone(),
                provider: response.provider.clone(),
                expires_at: response.expires_at.clone(),
            };
            if let Err(e) = cache.put(hash, &entry).await {
                tracing::warn!(error = %e, "cache write failed");
            }
        }

        Ok(TtsResult {
            audio_url: response.audio_url,
            cached: false,
            provider: response.provider,
            expires_at: response.expires_at,
            items: spans,
        })
    }

    /// Try each text rendition in order; the first success wins
    async fn synthesize_attempts(
        &self,
        attempts: &[&str],
        voice: Option<&str>,
        decision: &ProviderDecision,
    ) -> Result<TtsResponse> {
        let provider = decision.provider.to_string();
        let mut last: Option<SynthesisError> = None;

        for (attempt, text) in attempts.iter().enumerate() {
            match self
                .client
                .synthesize(text, voice, Some(&provider), decision.bitrate)
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempt + 1 < attempts.len() {
                        tracing::debug!(error = %e, "synthesis attempt failed, trying next rendition");
                    }
                    last = Some(e);
                }
            }
        }

        Err(last.unwrap_or_else(|| SynthesisError::Config("no synthesis attempts".to_owned())))
    }
}
