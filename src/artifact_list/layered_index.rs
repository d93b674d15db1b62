use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::maven::coordinates::{Gat, MavenClassifier, MavenCoordinates, SnapshotSuffix};

/// Where an artifact version was found, and which of its classifiers exist there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    /// root of the repository the artifact was found in
    pub url: String,
    pub classifiers: BTreeSet<MavenClassifier>,
    /// newest timestamped deployment, for snapshots that have no 'SNAPSHOT' named files
    pub snapshot_suffix: Option<SnapshotSuffix>,
}
impl ArtifactSpec {
    /// spec for the main artifact only
    pub fn new(url: &str) -> ArtifactSpec {
        ArtifactSpec::with_classifiers(url, [MavenClassifier::Unclassified])
    }

    pub fn with_classifiers(url: &str, classifiers: impl IntoIterator<Item = MavenClassifier>) -> ArtifactSpec {
        ArtifactSpec {
            url: url.to_string(),
            classifiers: classifiers.into_iter().collect(),
            snapshot_suffix: None,
        }
    }
}

/// Key of a layered index entry. The field order defines iteration order: all entries of a GAT
///  are adjacent, ordered by priority and then by version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexKey {
    pub gat: Gat,
    /// rank of the source the entry comes from - lower ranks take precedence
    pub priority: u32,
    pub version: String,
}
impl IndexKey {
    pub fn new(gat: Gat, priority: u32, version: &str) -> IndexKey {
        IndexKey {
            gat,
            priority,
            version: version.to_string(),
        }
    }
}

/// Artifact versions found by all sources, keyed by GAT, source priority and version.
///
/// This is a flat ordered map, so all traversals are deterministic and independent of the order in
///  which sources were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeredIndex {
    entries: BTreeMap<IndexKey, ArtifactSpec>,
}
impl LayeredIndex {
    pub fn new() -> LayeredIndex {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn gat_count(&self) -> usize {
        self.entries.keys()
            .map(|k| &k.gat)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn get(&self, key: &IndexKey) -> Option<&ArtifactSpec> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &ArtifactSpec)> {
        self.entries.iter()
    }

    /// Adds the spec unless there is an entry for the key already - within a priority, the first
    ///  repository an artifact version is found in wins.
    pub fn insert_if_absent(&mut self, key: IndexKey, spec: ArtifactSpec) -> bool {
        match self.entries.entry(key) {
            Entry::Vacant(e) => {
                e.insert(spec);
                true
            }
            Entry::Occupied(e) => {
                trace!("{}:{} at priority {} already found in {}, ignoring {}", e.key().gat, e.key().version, e.key().priority, e.get().url, spec.url);
                false
            }
        }
    }

    /// Records a single artifact file. Classifiers of the same version in the same priority and
    ///  repository are merged, keeping the newest snapshot suffix.
    pub fn add_artifact(&mut self, priority: u32, coordinates: &MavenCoordinates, url: &str) {
        let key = IndexKey::new(coordinates.gat(), priority, &coordinates.version);
        match self.entries.entry(key) {
            Entry::Vacant(e) => {
                let mut spec = ArtifactSpec::with_classifiers(url, [coordinates.classifier.clone()]);
                spec.snapshot_suffix = coordinates.snapshot_suffix.clone();
                e.insert(spec);
            }
            Entry::Occupied(mut e) => {
                if e.get().url == url {
                    let spec = e.get_mut();
                    spec.classifiers.insert(coordinates.classifier.clone());
                    if coordinates.snapshot_suffix > spec.snapshot_suffix {
                        spec.snapshot_suffix = coordinates.snapshot_suffix.clone();
                    }
                }
                else {
                    debug!("{} at priority {} already found in {}, ignoring {}", coordinates, priority, e.get().url, url);
                }
            }
        }
    }

    pub fn retain(&mut self, f: impl FnMut(&IndexKey, &mut ArtifactSpec) -> bool) {
        self.entries.retain(f);
    }

    /// Debug output of the contents, one line per artifact
    pub fn log_contents(&self, title: &str) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        debug!("{}:", title);
        for (key, spec) in &self.entries {
            for classifier in &spec.classifiers {
                match classifier {
                    MavenClassifier::Unclassified => debug!("  {}:{} (priority {}, {})", key.gat, key.version, key.priority, spec.url),
                    MavenClassifier::Classified(c) => debug!("  {}:{}:{} (priority {}, {})", key.gat, c, key.version, key.priority, spec.url),
                }
            }
        }
    }
}

impl FromIterator<(IndexKey, ArtifactSpec)> for LayeredIndex {
    fn from_iter<T: IntoIterator<Item = (IndexKey, ArtifactSpec)>>(iter: T) -> Self {
        LayeredIndex {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LayeredIndex {
    type Item = (IndexKey, ArtifactSpec);
    type IntoIter = std::collections::btree_map::IntoIter<IndexKey, ArtifactSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a LayeredIndex {
    type Item = (&'a IndexKey, &'a ArtifactSpec);
    type IntoIter = std::collections::btree_map::Iter<'a, IndexKey, ArtifactSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_add_artifact_merges_classifiers_within_priority() {
        let mut index = LayeredIndex::new();
        index.add_artifact(1, &MavenCoordinates::new("g", "a", "jar", "", "1.0"), "https://r/");
        index.add_artifact(1, &MavenCoordinates::new("g", "a", "jar", "sources", "1.0"), "https://r/");
        index.add_artifact(2, &MavenCoordinates::new("g", "a", "jar", "javadoc", "1.0"), "https://r/");

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(&IndexKey::new(Gat::new("g", "a", "jar"), 1, "1.0")),
            Some(&ArtifactSpec::with_classifiers("https://r/", ["".into(), "sources".into()])),
        );
        assert_eq!(
            index.get(&IndexKey::new(Gat::new("g", "a", "jar"), 2, "1.0")),
            Some(&ArtifactSpec::with_classifiers("https://r/", ["javadoc".into()])),
        );
    }

    #[test]
    fn test_add_artifact_keeps_newest_snapshot_suffix() {
        let suffix = |b| Some(SnapshotSuffix { timestamp: "20230102.123456".to_string(), build_number: b });
        let snapshot = |c: &str, b| MavenCoordinates::new("g", "a", "jar", c, "1.0-SNAPSHOT").with_snapshot_suffix(suffix(b));

        let mut index = LayeredIndex::new();
        index.add_artifact(1, &snapshot("", 7), "https://r/");
        index.add_artifact(1, &snapshot("sources", 11), "https://r/");
        index.add_artifact(1, &snapshot("javadoc", 3), "https://r/");

        let spec = index.get(&IndexKey::new(Gat::new("g", "a", "jar"), 1, "1.0-SNAPSHOT")).unwrap();
        assert_eq!(spec.snapshot_suffix, suffix(11));
        assert_eq!(spec.classifiers.len(), 3);
    }

    #[test]
    fn test_first_repository_wins_within_priority() {
        let mut index = LayeredIndex::new();
        index.add_artifact(1, &MavenCoordinates::new("g", "a", "jar", "", "1.0"), "https://first/");
        index.add_artifact(1, &MavenCoordinates::new("g", "a", "jar", "sources", "1.0"), "https://second/");

        let key = IndexKey::new(Gat::new("g", "a", "jar"), 1, "1.0");
        assert_eq!(index.get(&key), Some(&ArtifactSpec::new("https://first/")));

        assert!(!index.insert_if_absent(key.clone(), ArtifactSpec::new("https://third/")));
        assert_eq!(index.get(&key).unwrap().url, "https://first/");
    }

    #[test]
    fn test_iteration_is_ordered_by_gat_priority_version() {
        let index: LayeredIndex = vec![
            (IndexKey::new(Gat::new("g", "b", "jar"), 1, "1.0"), ArtifactSpec::new("u")),
            (IndexKey::new(Gat::new("g", "a", "jar"), 2, "1.0"), ArtifactSpec::new("u")),
            (IndexKey::new(Gat::new("g", "a", "jar"), 1, "2.0"), ArtifactSpec::new("u")),
            (IndexKey::new(Gat::new("g", "a", "jar"), 1, "1.0"), ArtifactSpec::new("u")),
        ].into_iter().collect();

        let keys: Vec<(String, u32, String)> = index.iter()
            .map(|(k, _)| (k.gat.artifact_id.0.clone(), k.priority, k.version.clone()))
            .collect();
        assert_eq!(keys, vec![
            ("a".to_string(), 1, "1.0".to_string()),
            ("a".to_string(), 1, "2.0".to_string()),
            ("a".to_string(), 2, "1.0".to_string()),
            ("b".to_string(), 1, "1.0".to_string()),
        ]);
        assert_eq!(index.gat_count(), 2);
    }
}
