pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod query;
pub mod remote;
pub mod render;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;
