pub mod coordinator;
pub mod normalizer;
pub mod snapshot;
