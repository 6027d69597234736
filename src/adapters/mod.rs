// Adapters layer: concrete implementations of the domain ports (model provider, storage).

pub mod gemini;
pub mod storage;

pub use gemini::GeminiClient;
pub use storage::LocalStorage;
