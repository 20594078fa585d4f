pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod output;
pub mod selector;
pub mod session;
pub mod shell;
pub mod utils;
pub mod viewer;

#[cfg(test)]
mod tests;
