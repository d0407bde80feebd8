/// Name used for XDG config/state directories and the log file.
pub const APP_NAME: &str = "imgfetch";

pub mod config;
pub mod logging;

pub mod fetch;
pub mod headers;
pub mod raster;
pub mod retry;
pub mod transport;

pub use fetch::{FetchError, FetchEvent, FetchSettings, FetchedImage, Fetcher};
