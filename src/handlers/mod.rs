//! HTTP handlers

pub mod health;
pub mod schema;
pub mod engine;
pub mod predict;

#[cfg(test)]
mod tests;
