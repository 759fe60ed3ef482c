// Adapters layer: concrete implementations for external systems (storage, renderers).

#[cfg(feature = "chrome")]
pub mod chrome;
pub mod http;
pub mod storage;
