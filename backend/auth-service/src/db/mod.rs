/// Database access layer
pub mod token_repo;
pub mod user_repo;
