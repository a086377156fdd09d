pub mod error;
pub mod events;
pub mod fetcher;
pub mod log_buffer;
pub mod orchestrator;
pub mod session;
pub mod sse;
pub mod stream;
pub mod transport;
