use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::enrichment::{Enricher, TextGenerator, FAILURE_FALLBACK};
use crate::models::Trip;
use crate::repository::Repository;

/// Enriches a draft trip in the background and prepends the result to the
/// repository once the summary (or its fallback) is attached.
///
/// The repository only ever sees the trip the summary was generated for. A
/// generator that panics is treated like a failed request.
pub fn spawn_enrichment<G>(
    enricher: Arc<Enricher<G>>,
    repository: Arc<Repository>,
    draft: Trip,
) -> JoinHandle<Trip>
where
    G: TextGenerator + 'static,
{
    tokio::spawn(async move {
        let fallback = draft.clone();
        let enrichment = tokio::spawn(async move { enricher.enrich(draft).await });

        let trip = match enrichment.await {
            Ok(trip) => trip,
            Err(e) => {
                error!("Summary generation aborted for trip {}: {}", fallback.id, e);
                fallback.with_summary(FAILURE_FALLBACK)
            }
        };

        info!("Saving trip {} ({} trips in history)", trip.id, repository.trip_count() + 1);
        repository.add_trip(trip.clone());
        trip
    })
}
