pub mod abi;
pub mod api;
pub mod calls;
pub mod chain;
pub mod config;
pub mod error;
pub mod explorer;
pub mod logs;
pub mod stats;
