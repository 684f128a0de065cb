#[macro_use]
extern crate rocket;

pub mod app;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;
