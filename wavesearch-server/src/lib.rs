//! HTTP service exposing the Wavesearch web-search chat pipeline.
//!
//! Endpoints:
//!
//! - `GET /chat?prompt=&chatId=` - memory-backed chat, streamed as SSE
//! - `GET /chatMemory/memory?prompt=&chatId=` - alias of `/chat`
//! - `DELETE /chatMemory/{chatId}` - clear one conversation
//! - `GET /search?query=` - one-shot answer without memory
//! - `GET /web/search?query=&chatId=` - the full web-search pipeline

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use routes::router;
pub use state::AppState;
