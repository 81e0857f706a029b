//! Domain types, validation rules, and the ports the application depends on.

pub mod asset;
pub mod message;
pub mod ports;
pub mod settings;
pub mod transaction;
pub mod user;
pub mod validation;
