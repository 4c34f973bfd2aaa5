//! Command handlers. Each returns the JSON `result` of its envelope.

pub mod account;
pub mod audit;
pub mod wallet;
