pub mod agent;
pub mod cache;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod geo;
pub mod identity;
pub mod influx;
pub mod point;
pub mod registry;
pub mod sensor;

#[cfg(test)]
mod testing;
