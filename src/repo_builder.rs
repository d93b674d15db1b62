pub mod artifact_fetcher;
pub mod checksums;
pub mod fs_transport;
pub mod http_transport;
pub mod report;
pub mod transport;
