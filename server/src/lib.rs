// Library exports for the server binary, the probe and integration tests

pub mod app;
pub mod auth_token;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mode;
pub mod policy;
pub mod service;
