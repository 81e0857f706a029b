use crate::domain::message::OutboundMessage;
use crate::domain::ports::Notifier;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

#[derive(Serialize)]
struct TranscriptRecord<'a> {
    session: &'a str,
    kind: &'a str,
    text: &'a str,
    /// Button actions, rows separated by `;`, buttons within a row by `|`.
    buttons: String,
}

/// A [`Notifier`] that records every outbound action as a CSV row
/// (`session,kind,text,buttons`).
pub struct TranscriptWriter<W: Write + Send> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write + Send> TranscriptWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(sink)),
        }
    }

    fn write(&self, record: TranscriptRecord<'_>) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| BotError::Delivery("transcript writer poisoned".to_string()))?;
        writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| BotError::Delivery("transcript writer poisoned".to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> Notifier for TranscriptWriter<W> {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        let buttons = message
            .keyboard
            .iter()
            .flatten()
            .map(|row| {
                row.iter()
                    .map(|button| button.action.as_str())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join(";");
        self.write(TranscriptRecord {
            session: &message.session_id,
            kind: "message",
            text: &message.text,
            buttons,
        })
    }

    async fn acknowledge(&self, session_id: &str, text: Option<&str>) -> Result<()> {
        self.write(TranscriptRecord {
            session: session_id,
            kind: "ack",
            text: text.unwrap_or_default(),
            buttons: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::Button;

    #[tokio::test]
    async fn test_transcript_rows() {
        let writer = TranscriptWriter::new(Vec::new());
        writer
            .send(
                OutboundMessage::new("1", "Choose:\nnow").with_keyboard(vec![
                    vec![Button::new("A", "a"), Button::new("B", "b")],
                    vec![Button::new("C", "c")],
                ]),
            )
            .await
            .unwrap();
        writer.acknowledge("1", Some("Unknown action.")).await.unwrap();
        writer.acknowledge("2", None).await.unwrap();

        let bytes = writer.writer.into_inner().unwrap().into_inner().unwrap();
        let out = String::from_utf8(bytes).unwrap();
        assert_eq!(
            out,
            "session,kind,text,buttons\n1,message,\"Choose:\nnow\",a|b;c\n1,ack,Unknown action.,\n2,ack,,\n"
        );
    }
}
