pub mod builder;
pub mod filter;
pub mod layered_index;
pub mod repository_lister;
pub mod resolver;
