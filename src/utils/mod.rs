pub mod database;
pub mod error;
pub mod pagination;
pub mod validation;
