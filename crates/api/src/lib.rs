//! HTTP dashboard service: session resolution, route guarding, navigation.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
