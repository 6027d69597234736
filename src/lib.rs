pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;

pub use adapters::{GeminiClient, LocalStorage};
pub use config::AppConfig;
pub use core::assistant::{LeadAssistant, ModelSettings};
pub use core::lead_book::{LeadBook, LeadBookStore};
pub use domain::model::{Lead, SearchCriteria};
pub use utils::error::{LeadError, Result};
