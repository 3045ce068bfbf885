//! Replays recorded transport events through a loopback transport.
//!
//! # File format
//!
//! One raw transport event per line, in the JSON form described in
//! `chat_realtime_core::protocol::signals`.  Blank lines and lines starting
//! with `#` are ignored:
//!
//! ```text
//! # thread 19:abc, morning session
//! {"event":"connectionChanged","data":"Connected"}
//! {"event":"participantsAdded","data":{"threadId":"19:abc","participantsAdded":[{"id":"u1"}]}}
//! {"event":"connectionChanged","data":"Disconnected"}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chat_realtime_core::TransportEvent;
use thiserror::Error;
use tracing::debug;

use super::loopback::LoopbackTransport;

/// Errors raised while reading a replay file.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The replay file could not be opened.
    #[error("failed to open replay file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading from the replay input failed.
    #[error("I/O error reading replay input: {0}")]
    Io(#[from] std::io::Error),
    /// A line is not a valid transport event.
    #[error("line {line}: invalid transport event: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of [`replay`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Number of events raised on the transport.
    pub raised: usize,
    /// Total number of transport handlers those events reached.
    pub handlers_invoked: usize,
}

/// Parses JSON-lines transport events from `reader`.
///
/// # Errors
///
/// [`ReplayError::Io`] if reading fails, [`ReplayError::Parse`] (with the
/// 1-based line number) for the first malformed line.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<TransportEvent>, ReplayError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
            line: index + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Reads and parses the replay file at `path`.
///
/// # Errors
///
/// [`ReplayError::Open`] if the file cannot be opened, otherwise as
/// [`parse_events`].
pub fn read_events_from(path: &Path) -> Result<Vec<TransportEvent>, ReplayError> {
    let file = File::open(path).map_err(|source| ReplayError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let events = parse_events(BufReader::new(file))?;
    debug!("read {} transport events from {}", events.len(), path.display());
    Ok(events)
}

/// Raises each event on `transport`, in order.
pub fn replay(
    transport: &LoopbackTransport,
    events: impl IntoIterator<Item = TransportEvent>,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for event in events {
        summary.handlers_invoked += transport.raise(event);
        summary.raised += 1;
    }
    summary
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::SignalingTransport;
    use chat_realtime_core::{ConnectionState, TransportEventName};
    use std::sync::Arc;

    const SAMPLE: &str = r#"
# header comment
{"event":"connectionChanged","data":"Connected"}

{"event":"participantsRemoved","data":{"threadId":"19:t","participantsRemoved":[{"id":"u2"}]}}
"#;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let events = parse_events(SAMPLE.as_bytes()).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            TransportEvent::ConnectionChanged(ConnectionState::Connected)
        );
        assert_eq!(events[1].name(), TransportEventName::ParticipantsRemoved);
    }

    #[test]
    fn test_parse_reports_line_number_of_bad_event() {
        // Arrange: line 3 names an event the transport never raises
        let input = "{\"event\":\"connectionChanged\",\"data\":\"Connected\"}\n\n{\"event\":\"typing\"}\n";

        // Act
        let result = parse_events(input.as_bytes());

        // Assert
        assert!(matches!(result, Err(ReplayError::Parse { line: 3, .. })));
    }

    #[test]
    fn test_read_missing_file_is_open_error() {
        let path = std::env::temp_dir().join(format!("missing-{}.jsonl", uuid::Uuid::new_v4()));
        assert!(matches!(
            read_events_from(&path),
            Err(ReplayError::Open { .. })
        ));
    }

    #[test]
    fn test_replay_counts_raised_events_and_handler_hits() {
        // Arrange
        let transport = LoopbackTransport::new();
        transport.on(
            TransportEventName::ConnectionChanged,
            Arc::new(|_: TransportEvent| {}),
        );
        let events = parse_events(SAMPLE.as_bytes()).unwrap();

        // Act
        let summary = replay(&transport, events);

        // Assert: both events raised, only connectionChanged had a handler
        assert_eq!(
            summary,
            ReplaySummary {
                raised: 2,
                handlers_invoked: 1
            }
        );
    }
}
