//! CSV transport: a script of inbound events in, a transcript of outbound actions out.

pub mod event_reader;
pub mod transcript_writer;
