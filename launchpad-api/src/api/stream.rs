//! Server-sent event framing for mining runs

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;
use vanity_miner::{MiningEvent, MiningStream};

/// Each mining event becomes one SSE message named after its kind
pub fn mining_events(
    run_id: Uuid,
    events: MiningStream,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = events.map(move |event| {
        log_event(run_id, &event);
        Event::default()
            .event(event.kind())
            .id(run_id.to_string())
            .json_data(&event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn log_event(run_id: Uuid, event: &MiningEvent) {
    match event {
        MiningEvent::Complete(summary) => info!(
            "Mining run {} complete: found={}, attempts={}",
            run_id, summary.found, summary.attempts
        ),
        MiningEvent::Error { message, .. } => info!("Mining run {} failed: {}", run_id, message),
        other => debug!("Mining run {} event: {}", run_id, other.kind()),
    }
}
