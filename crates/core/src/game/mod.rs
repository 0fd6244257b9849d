//! Quiz rounds keyed by session

pub mod ports;
pub mod service;

pub use service::GameService;
