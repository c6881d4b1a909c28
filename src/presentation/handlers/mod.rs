mod download;
mod error_response;
mod health;
mod status;
mod upload;

pub use download::{DOWNLOAD_FILENAME, download_handler};
pub use health::health_handler;
pub use status::status_handler;
pub use upload::upload_handler;
