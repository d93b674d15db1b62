pub mod coordinates;
pub mod dependency_list;
pub mod paths;
pub mod patterns;

pub use coordinates::{Gat, MavenArtifactId, MavenClassifier, MavenCoordinates, MavenGroupId, MavenVersion, SnapshotSuffix};
