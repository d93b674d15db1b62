use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

use tracing::{debug, trace};

use crate::artifact_list::layered_index::{ArtifactSpec, IndexKey, LayeredIndex};
use crate::maven::coordinates::{Gat, MavenClassifier, MavenCoordinates};

/// Reduces the index to a single entry per GAT and version: the one from the source with the
///  lowest priority rank. Classifier sets of different priorities are not merged, the winning
///  entry is kept as it is.
pub fn reduce_priorities(index: LayeredIndex) -> LayeredIndex {
    let mut winners: HashMap<(Gat, String), IndexKey> = HashMap::new();
    for (key, _) in &index {
        match winners.entry((key.gat.clone(), key.version.clone())) {
            Entry::Vacant(e) => {
                e.insert(key.clone());
            }
            Entry::Occupied(mut e) => {
                if key.priority < e.get().priority {
                    e.insert(key.clone());
                }
            }
        }
    }

    let before = index.len();
    let reduced: LayeredIndex = index.into_iter()
        .filter(|(key, spec)| {
            let is_winner = winners.get(&(key.gat.clone(), key.version.clone())) == Some(key);
            if !is_winner {
                trace!("{}:{} from {} (priority {}) is shadowed by a higher priority source", key.gat, key.version, spec.url, key.priority);
            }
            is_winner
        })
        .collect();
    debug!("priority reduction kept {} of {} artifact versions", reduced.len(), before);
    reduced
}

/// The final list of artifacts, grouped by the repository they are retrieved from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArtifactList {
    by_origin: BTreeMap<String, Vec<MavenCoordinates>>,
}
impl ResolvedArtifactList {
    pub fn new() -> ResolvedArtifactList {
        Default::default()
    }

    pub fn push(&mut self, origin: &str, coordinates: MavenCoordinates) {
        self.by_origin.entry(origin.to_string())
            .or_default()
            .push(coordinates);
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.by_origin.keys().map(|o| o.as_str())
    }

    pub fn artifacts(&self, origin: &str) -> &[MavenCoordinates] {
        self.by_origin.get(origin)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MavenCoordinates])> {
        self.by_origin.iter().map(|(o, a)| (o.as_str(), a.as_slice()))
    }

    /// total number of artifacts over all origins
    pub fn len(&self) -> usize {
        self.by_origin.values().map(|a| a.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One '# <origin>' comment line per repository, followed by that repository's artifacts in the
///  format of artifact list files, so the output can be fed back as a list.
impl Display for ResolvedArtifactList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (origin, artifacts) in &self.by_origin {
            writeln!(f, "# {}", origin)?;
            for artifact in artifacts {
                writeln!(f, "{}", artifact)?;
            }
        }
        Ok(())
    }
}

/// Expands every entry into coordinates and groups them by the entry's repository. Only the main
///  artifact is emitted per entry unless `all_classifiers` is set, in which case there is one
///  coordinate per classifier recorded for the entry.
pub fn flatten(index: &LayeredIndex, all_classifiers: bool) -> ResolvedArtifactList {
    let mut result = ResolvedArtifactList::new();
    for (key, spec) in index {
        push_spec(&mut result, key, spec, all_classifiers);
    }
    result
}

fn push_spec(result: &mut ResolvedArtifactList, key: &IndexKey, spec: &ArtifactSpec, all_classifiers: bool) {
    for classifier in &spec.classifiers {
        if all_classifiers || *classifier == MavenClassifier::Unclassified {
            let coordinates = key.gat.with_version(&key.version, classifier.clone())
                .with_snapshot_suffix(spec.snapshot_suffix.clone());
            result.push(&spec.url, coordinates);
        }
    }
}
