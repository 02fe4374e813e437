pub mod analytics;
pub mod catalog;
pub mod recommendations;
