pub mod assistant;
pub mod lead_book;
pub mod prompt;
pub mod sanitize;

pub use crate::domain::model::{Lead, SearchCriteria};
pub use crate::domain::ports::{GenerativeModel, Storage};
pub use crate::utils::error::Result;
