pub mod logging;
pub mod staged_file;
pub mod validating_http_body;
pub mod validating_http_downloader;
pub mod walk;
