use std::fmt::{Display, Formatter};

/// file type of the descriptor that is fetched alongside every artifact
pub const POM_TYPE: &str = "pom";

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum MavenVersion {
    Release(String),
    Snapshot {
        version: String, // ending in '-SNAPSHOT'
        timestamp: Option<String>,
        build_number: Option<u32>,
    }
}
impl MavenVersion {
    /// the version as it appears in the repository's directory structure
    pub fn base_version(&self) -> &str {
        match self {
            MavenVersion::Release(v) => v,
            MavenVersion::Snapshot { version, .. } => version,
        }
    }

    /// timestamp and build number of a snapshot file that carries them instead of 'SNAPSHOT'
    pub fn snapshot_suffix(&self) -> Option<SnapshotSuffix> {
        match self {
            MavenVersion::Snapshot { timestamp: Some(timestamp), build_number: Some(build_number), .. } => Some(SnapshotSuffix {
                timestamp: timestamp.clone(),
                build_number: *build_number,
            }),
            _ => None,
        }
    }
}

/// Identifies one deployment of a snapshot version, e.g. '20230102.123456-5'. Later deployments
///  compare greater.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct SnapshotSuffix {
    pub timestamp: String,
    pub build_number: u32,
}
impl Display for SnapshotSuffix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.build_number)
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct MavenArtifactId(pub String);

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct MavenGroupId(pub String);

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub enum MavenClassifier {
    Unclassified,
    Classified(String),
}
impl MavenClassifier {
    pub fn is_classified(&self) -> bool {
        matches!(self, MavenClassifier::Classified(_))
    }
}
impl From<&str> for MavenClassifier {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            MavenClassifier::Unclassified
        }
        else {
            MavenClassifier::Classified(s.to_string())
        }
    }
}
impl Display for MavenClassifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MavenClassifier::Unclassified => Ok(()),
            MavenClassifier::Classified(c) => write!(f, "{}", c),
        }
    }
}

/// group:artifact:type - identifies a package family across versions and classifiers, and is the
///  key under which sources are merged and reduced
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct Gat {
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
    pub artifact_type: String,
}
impl Gat {
    pub fn new(group_id: &str, artifact_id: &str, artifact_type: &str) -> Gat {
        Gat {
            group_id: MavenGroupId(group_id.to_string()),
            artifact_id: MavenArtifactId(artifact_id.to_string()),
            artifact_type: artifact_type.to_string(),
        }
    }

    pub fn with_version(&self, version: &str, classifier: MavenClassifier) -> MavenCoordinates {
        MavenCoordinates {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            artifact_type: self.artifact_type.clone(),
            classifier,
            version: version.to_string(),
            snapshot_suffix: None,
        }
    }
}
impl Display for Gat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id.0, self.artifact_id.0, self.artifact_type)
    }
}

/// Fully specified identity of a single file in a Maven repository.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct MavenCoordinates {
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
    pub artifact_type: String,
    pub classifier: MavenClassifier,
    /// base version, i.e. ending in '-SNAPSHOT' for snapshots
    pub version: String,
    /// set for snapshots whose files are named with a timestamp and build number rather than
    ///  'SNAPSHOT' in the remote repository
    pub snapshot_suffix: Option<SnapshotSuffix>,
}
impl MavenCoordinates {
    pub fn new(group_id: &str, artifact_id: &str, artifact_type: &str, classifier: &str, version: &str) -> MavenCoordinates {
        Gat::new(group_id, artifact_id, artifact_type)
            .with_version(version, classifier.into())
    }

    pub fn gat(&self) -> Gat {
        Gat {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            artifact_type: self.artifact_type.clone(),
        }
    }

    /// group:artifact:version, the string that GAV patterns are matched against
    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id.0, self.artifact_id.0, self.version)
    }

    pub fn is_pom(&self) -> bool {
        self.artifact_type == POM_TYPE
    }

    /// the same artifact with a different classifier
    pub fn with_classifier(&self, classifier: MavenClassifier) -> MavenCoordinates {
        MavenCoordinates {
            classifier,
            ..self.clone()
        }
    }

    pub fn with_snapshot_suffix(self, snapshot_suffix: Option<SnapshotSuffix>) -> MavenCoordinates {
        MavenCoordinates {
            snapshot_suffix,
            ..self
        }
    }

    /// the descriptor belonging to this artifact
    pub fn pom(&self) -> MavenCoordinates {
        MavenCoordinates {
            artifact_type: POM_TYPE.to_string(),
            classifier: MavenClassifier::Unclassified,
            ..self.clone()
        }
    }
}

/// group:artifact:type[:classifier]:version, i.e. the format that is read from artifact list files.
///  A snapshot suffix is not part of it.
impl Display for MavenCoordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.classifier {
            MavenClassifier::Unclassified => write!(f, "{}:{}", self.gat(), self.version),
            MavenClassifier::Classified(c) => write!(f, "{}:{}:{}", self.gat(), c, self.version),
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::unclassified(MavenCoordinates::new("org.example", "lib", "jar", "", "1.0"), "org.example:lib:jar:1.0")]
    #[case::classified(MavenCoordinates::new("org.example", "lib", "jar", "sources", "1.0"), "org.example:lib:jar:sources:1.0")]
    #[case::pom(MavenCoordinates::new("a", "b", "pom", "", "2-SNAPSHOT"), "a:b:pom:2-SNAPSHOT")]
    fn test_display(#[case] coordinates: MavenCoordinates, #[case] expected: &str) {
        assert_eq!(coordinates.to_string(), expected);
    }

    #[test]
    fn test_pom_drops_classifier_and_type() {
        let coordinates = MavenCoordinates::new("a", "b", "war", "javadoc", "1.0");
        assert_eq!(coordinates.pom(), MavenCoordinates::new("a", "b", "pom", "", "1.0"));
        assert!(coordinates.pom().is_pom());
        assert!(!coordinates.is_pom());
    }

    #[test]
    fn test_classifier_conversion() {
        assert_eq!(MavenClassifier::from(""), MavenClassifier::Unclassified);
        assert_eq!(MavenClassifier::from("sources"), MavenClassifier::Classified("sources".to_string()));
        assert!(MavenClassifier::Unclassified < MavenClassifier::from("a"));
    }

    #[test]
    fn test_snapshot_suffix() {
        let timestamped = MavenVersion::Snapshot { version: "1.0-SNAPSHOT".to_string(), timestamp: Some("20230102.123456".to_string()), build_number: Some(5) };
        let plain = MavenVersion::Snapshot { version: "1.0-SNAPSHOT".to_string(), timestamp: None, build_number: None };

        assert_eq!(timestamped.snapshot_suffix().unwrap().to_string(), "20230102.123456-5");
        assert_eq!(plain.snapshot_suffix(), None);
        assert_eq!(MavenVersion::Release("1.0".to_string()).snapshot_suffix(), None);
    }

    #[test]
    fn test_later_snapshot_suffix_is_greater() {
        let suffix = |t: &str, b| SnapshotSuffix { timestamp: t.to_string(), build_number: b };
        assert!(suffix("20230102.123456", 12) > suffix("20230102.123456", 9));
        assert!(suffix("20230103.000000", 1) > suffix("20230102.235959", 9));
        assert!(Some(suffix("20230102.123456", 1)) > None);
    }

    #[test]
    fn test_pom_keeps_snapshot_suffix() {
        let suffix = SnapshotSuffix { timestamp: "20230102.123456".to_string(), build_number: 5 };
        let coordinates = MavenCoordinates::new("g", "a", "jar", "", "1.0-SNAPSHOT").with_snapshot_suffix(Some(suffix.clone()));
        assert_eq!(coordinates.pom().snapshot_suffix, Some(suffix));
        assert_eq!(coordinates.to_string(), "g:a:jar:1.0-SNAPSHOT");
    }

    #[test]
    fn test_gat_ignores_classifier() {
        let a = MavenCoordinates::new("g", "a", "jar", "", "1");
        let b = MavenCoordinates::new("g", "a", "jar", "sources", "1");
        assert_ne!(a, b);
        assert_eq!(a.gat(), b.gat());
        assert_eq!(a.gav(), "g:a:1");
    }
}
