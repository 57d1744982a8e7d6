pub mod area_paths;
pub mod config;
pub mod context;
pub mod file_writer;
pub mod logging;
