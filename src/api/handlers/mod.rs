pub mod analytics;
pub mod auth;
pub mod interactions;
pub mod movies;
pub mod recommendations;
