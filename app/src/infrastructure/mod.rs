pub mod database;
pub mod ioc;
mod repository;
pub mod service;
pub mod telemetry;
