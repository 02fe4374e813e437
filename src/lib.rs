//! Backend for a movie and TV discovery app: a catalog proxy over TMDB,
//! per-user ratings, favorites and watch history, viewing analytics and
//! rule-based recommendations.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
