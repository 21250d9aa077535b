//! Document loading implementations

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;

pub use composite_loader::CompositeLoader;
pub use file_loader::FileLoader;
pub use http_loader::HttpLoader;
