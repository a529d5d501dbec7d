pub mod engine;

pub use engine::{ClaimEngine, ClaimStats};
