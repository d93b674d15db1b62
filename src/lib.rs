pub mod artifact_list;
pub mod config;
pub mod maven;
pub mod orchestrator;
pub mod origin;
pub mod repo_builder;
pub mod util;
