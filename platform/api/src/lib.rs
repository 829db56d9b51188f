pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod global;
pub mod telemetry;

#[cfg(test)]
mod tests;
