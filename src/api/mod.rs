pub mod routes;
pub mod sensors;
