pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod storage;
pub mod stream;
pub mod tts;
