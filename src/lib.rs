pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod menu;
pub mod notify;
pub mod reports;
pub mod screens;
pub mod session;
pub mod table;
pub mod types;
