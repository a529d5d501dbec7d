pub mod chains;
pub mod reader;
pub mod registry;
