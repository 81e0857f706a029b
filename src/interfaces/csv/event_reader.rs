use crate::domain::message::{EventPayload, InboundEvent, Upload};
use crate::error::{BotError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Text,
    Photo,
    Document,
    Button,
}

/// One row of an event script: `session,name,kind,payload,size,mime`.
///
/// For uploads `payload` is the file reference; for buttons it is the action string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRecord {
    pub session: String,
    pub name: Option<String>,
    pub kind: EventKind,
    #[serde(default)]
    pub payload: String,
    pub size: Option<u64>,
    pub mime: Option<String>,
}

impl TryFrom<EventRecord> for InboundEvent {
    type Error = BotError;

    fn try_from(record: EventRecord) -> Result<Self> {
        if record.session.is_empty() {
            return Err(BotError::Validation("event without a session".to_string()));
        }
        let payload = match record.kind {
            EventKind::Text => EventPayload::Text(record.payload),
            EventKind::Button => EventPayload::Button(record.payload),
            EventKind::Photo | EventKind::Document if record.payload.is_empty() => {
                return Err(BotError::Validation(
                    "upload event without a file reference".to_string(),
                ));
            }
            EventKind::Photo => EventPayload::Upload(Upload::Photo {
                file_id: record.payload,
                size: record.size.unwrap_or_default(),
            }),
            EventKind::Document => EventPayload::Upload(Upload::Document {
                file_id: record.payload,
                size: record.size.unwrap_or_default(),
                mime_type: record.mime,
            }),
        };

        let mut event = InboundEvent::new(record.session, payload);
        event.display_name = record.name;
        Ok(event)
    }
}

/// Reads inbound events from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths, so
/// trailing upload columns may be left off text and button rows.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts events, one `Result` per row.
    pub fn events(self) -> impl Iterator<Item = Result<InboundEvent>> {
        self.reader
            .into_deserialize::<EventRecord>()
            .map(|record| -> Result<InboundEvent> { InboundEvent::try_from(record?) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "session,name,kind,payload,size,mime\n";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}1, alice, text, /start\n1,,button,buy_btc\n1,,text,0.5\n1,,photo,file-1,2048\n2,bob,document,file-2,100,application/pdf\n"
        );
        let events: Vec<InboundEvent> = EventReader::new(data.as_bytes())
            .events()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].display_name.as_deref(), Some("alice"));
        assert_eq!(events[0].payload, EventPayload::Text("/start".into()));
        assert_eq!(events[1].display_name, None);
        assert_eq!(events[1].payload, EventPayload::Button("buy_btc".into()));
        assert_eq!(
            events[3].payload,
            EventPayload::Upload(Upload::Photo {
                file_id: "file-1".into(),
                size: 2048
            })
        );
        assert_eq!(
            events[4].payload,
            EventPayload::Upload(Upload::Document {
                file_id: "file-2".into(),
                size: 100,
                mime_type: Some("application/pdf".into())
            })
        );
    }

    #[test]
    fn test_reader_malformed_lines() {
        let data = format!("{HEADER}1,,sticker,x\n1,,photo,\n,,text,hi\n1,,text,ok\n");
        let results: Vec<Result<InboundEvent>> = EventReader::new(data.as_bytes()).events().collect();

        assert_eq!(results.len(), 4);
        assert!(matches!(results[0], Err(BotError::Csv(_))));
        assert!(matches!(results[1], Err(BotError::Validation(_))));
        assert!(matches!(results[2], Err(BotError::Validation(_))));
        assert!(results[3].is_ok());
    }
}
