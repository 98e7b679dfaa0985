//! Aggregating consumption of an upstream event stream.
//!
//! Used when the caller needs one finished text instead of a live stream,
//! such as story summarization. The body is parsed as server-sent events;
//! each `data:` payload looks like `{"type":"text","content":"..."}` and only
//! `text` records contribute.

use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use hogwarts_types::error::RelayError;
use hogwarts_types::relay::{DONE_SENTINEL, EVENT_KIND_ERROR, EVENT_KIND_TEXT, UpstreamEvent};

use super::dispatcher::ByteStream;

/// What a single `data:` payload contributes to the aggregate.
#[derive(Debug, PartialEq, Eq)]
enum Record {
    Text(String),
    Done,
    Ignored,
}

fn decode_record(data: &str) -> Record {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return Record::Done;
    }
    if data.is_empty() {
        return Record::Ignored;
    }

    match serde_json::from_str::<UpstreamEvent>(data) {
        Ok(event) if event.kind == EVENT_KIND_TEXT => Record::Text(event.text),
        Ok(event) if event.kind == EVENT_KIND_ERROR => {
            tracing::warn!(content = %event.text, "inference service reported an error in-band");
            Record::Ignored
        }
        Ok(_) => Record::Ignored,
        Err(e) => {
            tracing::debug!(error = %e, "skipping undecodable event record");
            Record::Ignored
        }
    }
}

/// Drain `source` until `[DONE]` or end of stream and return the
/// concatenated text fragments.
pub async fn aggregate_events(
    source: ByteStream,
    cancel: &CancellationToken,
) -> Result<String, RelayError> {
    let mut events = source.eventsource();
    let mut text = String::new();
    let mut records = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RelayError::ClientDisconnected),
            next = events.next() => next,
        };

        let event = match next {
            Some(Ok(event)) => event,
            Some(Err(EventStreamError::Transport(e))) => return Err(e),
            Some(Err(e)) => return Err(RelayError::UpstreamRead(e.to_string())),
            None => break,
        };

        // Records sent without a blank line between them arrive as one
        // event with several data lines.
        for line in event.data.lines() {
            match decode_record(line) {
                Record::Text(fragment) => {
                    records += 1;
                    text.push_str(&fragment);
                }
                Record::Done => return Ok(finish(text, records)),
                Record::Ignored => {}
            }
        }
    }

    Ok(finish(text, records))
}

fn finish(text: String, records: usize) -> String {
    tracing::debug!(records, chars = text.len(), "event stream aggregated");
    text
}
