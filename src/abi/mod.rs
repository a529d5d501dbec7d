pub mod discovery;
pub mod templates;
pub mod types;
