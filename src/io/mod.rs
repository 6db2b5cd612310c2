pub mod config_io;
pub mod lock;
pub mod migrate;
pub mod repository;
pub mod store;
