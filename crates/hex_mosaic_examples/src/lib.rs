#![forbid(unsafe_code)]

mod export;
mod http;
mod logging;
mod synthetic;

pub use export::{Export, ExportSource};
pub use http::{default_cache_dir, HttpImages};
pub use logging::init_tracing;
pub use synthetic::{SolidColorImages, SyntheticSource};
