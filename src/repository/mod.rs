//! Database repository layer

pub mod news_repo;
pub mod user_repo;

pub use news_repo::*;
pub use user_repo::*;
