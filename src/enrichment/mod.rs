//! Trip summaries from a text-generation service.
//!
//! [`Enricher::enrich`] always resolves with a usable trip: service failures
//! are logged and replaced with a fixed fallback summary.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::EnrichmentError;
use crate::models::Trip;

/// Used when the service answered but produced no text.
pub const NO_SUMMARY_FALLBACK: &str = "No summary available for this trip.";
/// Used when the service call failed.
pub const FAILURE_FALLBACK: &str = "Could not generate AI summary at this time.";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends a free-text prompt. `Ok(None)` means the service returned no text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, EnrichmentError>;
}

#[async_trait]
impl<G: TextGenerator + ?Sized> TextGenerator for Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, EnrichmentError> {
        (**self).generate(prompt).await
    }
}

pub fn build_prompt(trip: &Trip) -> String {
    format!(
        "Analyze this GPS trip data and provide a concise, friendly summary (2 sentences max).\n\
         Distance: {:.2} km,\n\
         Duration: {} to {},\n\
         Avg Speed: {:.1} km/h.\n\
         Mention if it was likely a walk, run, or drive and provide one health or efficiency tip.",
        trip.distance, trip.start_time, trip.end_time, trip.avg_speed
    )
}

pub struct Enricher<G> {
    generator: G,
    timeout: Duration,
}

impl<G: TextGenerator> Enricher<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches a generated summary to `trip`. Never fails.
    pub async fn enrich(&self, trip: Trip) -> Trip {
        if trip.is_summarized() {
            debug!("Trip {} already has a summary", trip.id);
            return trip;
        }

        let summary = match self.summarize(&trip).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                info!("Generated summary for trip {}", trip.id);
                text.trim().to_string()
            }
            Ok(_) => NO_SUMMARY_FALLBACK.to_string(),
            Err(e) => {
                error!("Summary generation failed for trip {}: {}", trip.id, e);
                FAILURE_FALLBACK.to_string()
            }
        };

        trip.with_summary(summary)
    }

    async fn summarize(&self, trip: &Trip) -> Result<Option<String>, EnrichmentError> {
        let prompt = build_prompt(trip);
        tokio::time::timeout(self.timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| EnrichmentError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use chrono::Utc;
    use std::sync::Mutex;

    struct Canned(Option<&'static str>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, EnrichmentError> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, EnrichmentError> {
            Err(EnrichmentError::Service {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    struct Slow;

    #[async_trait]
    impl TextGenerator for Slow {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, EnrichmentError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Some("too late".to_string()))
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl TextGenerator for Recording {
        async fn generate(&self, prompt: &str) -> Result<Option<String>, EnrichmentError> {
            self.0.lock().unwrap().push(prompt.to_string());
            Ok(Some("ok".to_string()))
        }
    }

    fn draft() -> Trip {
        let path = (0..3)
            .map(|i| Coordinate::new(55.0 + i as f64 * 0.01, 12.0, i * 60_000))
            .collect();
        Trip::record(path, Utc::now())
    }

    #[tokio::test]
    async fn test_success_sets_summary() {
        let trip = Enricher::new(Canned(Some("  A brisk walk. Stay hydrated!  ")))
            .enrich(draft())
            .await;
        assert_eq!(trip.summary.as_deref(), Some("A brisk walk. Stay hydrated!"));
    }

    #[tokio::test]
    async fn test_empty_response_uses_no_summary_fallback() {
        for canned in [None, Some(""), Some("   ")] {
            let trip = Enricher::new(Canned(canned)).enrich(draft()).await;
            assert_eq!(trip.summary.as_deref(), Some(NO_SUMMARY_FALLBACK));
        }
    }

    #[tokio::test]
    async fn test_failure_uses_failure_fallback() {
        let original = draft();
        let trip = Enricher::new(Failing).enrich(original.clone()).await;
        assert_eq!(trip.summary.as_deref(), Some(FAILURE_FALLBACK));
        assert_eq!(trip.path, original.path);
        assert_eq!(trip.id, original.id);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let trip = Enricher::new(Slow)
            .with_timeout(Duration::from_millis(20))
            .enrich(draft())
            .await;
        assert_eq!(trip.summary.as_deref(), Some(FAILURE_FALLBACK));
    }

    #[tokio::test]
    async fn test_summarized_trip_is_left_alone() {
        let generator = Arc::new(Recording::default());
        let trip = Enricher::new(generator.clone())
            .enrich(draft().with_summary("kept"))
            .await;
        assert_eq!(trip.summary.as_deref(), Some("kept"));
        assert!(generator.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_carries_trip_figures() {
        let generator = Arc::new(Recording::default());
        let mut trip = draft();
        trip.distance = 5.234;
        trip.avg_speed = 12.46;
        trip.start_time = "08:30".to_string();
        trip.end_time = "09:15".to_string();

        Enricher::new(generator.clone()).enrich(trip).await;

        let prompts = generator.0.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Distance: 5.23 km"));
        assert!(prompts[0].contains("Duration: 08:30 to 09:15"));
        assert!(prompts[0].contains("Avg Speed: 12.5 km/h"));
    }
}
