//! Application layer: the conversation engine and the plumbing it runs on.
//!
//! `ConversationEngine` is the entry point for every inbound event. It owns the
//! per-session dialogue stores and the rate limiter, and hands completed dialogues to
//! `TransactionWorkflow`.

pub mod dialogue;
pub mod engine;
pub mod menu;
pub mod outbox;
pub mod rate_limiter;
pub mod session;
pub mod settings_cache;
pub mod workflow;
