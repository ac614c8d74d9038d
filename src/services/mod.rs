pub mod catalog;
pub mod file_loader;
