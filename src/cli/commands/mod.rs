pub mod auth;
pub mod dashboard;
pub mod entity;
pub mod menu;
pub mod report;
