pub mod api;
pub mod app;
pub mod config;
pub mod error;

#[cfg(test)]
mod testing;
