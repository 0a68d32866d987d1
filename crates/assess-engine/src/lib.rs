pub mod balance;
pub mod catalog;
pub mod error;
pub mod eval;
pub mod extract;
pub mod format;
pub mod index;
pub mod model;
pub mod oracle;
pub mod pipeline;
pub mod rerank;
pub mod retrieve;
pub mod strategy;
