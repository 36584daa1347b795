pub mod error;
pub mod hevy;
pub mod models;
