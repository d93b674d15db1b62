use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::artifact_list::layered_index::LayeredIndex;
use crate::config::Configuration;
use crate::maven::coordinates::MavenClassifier;
use crate::maven::patterns::GavPattern;

/// A stage that narrows down the artifact index. Implementations may drop versions or whole GATs,
///  and they may remove classifiers, but every entry they keep has at least one classifier.
pub trait ArtifactFilter {
    fn filter(&self, index: LayeredIndex) -> LayeredIndex;
}

/// keeps everything
pub struct NoFilter;
impl ArtifactFilter for NoFilter {
    fn filter(&self, index: LayeredIndex) -> LayeredIndex {
        index
    }
}

/// Exclusion rules from the configuration
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    excluded_gav_patterns: Vec<GavPattern>,
    excluded_types: BTreeSet<String>,
    excluded_classifiers: BTreeSet<MavenClassifier>,
    all_classifiers: bool,
}
impl PatternFilter {
    pub fn from_config(config: &Configuration) -> anyhow::Result<PatternFilter> {
        Ok(PatternFilter {
            excluded_gav_patterns: GavPattern::parse_all(&config.excluded_gav_patterns)?,
            excluded_types: config.excluded_types.iter().cloned().collect(),
            excluded_classifiers: config.excluded_classifiers.iter()
                .map(|c| c.as_str().into())
                .collect(),
            all_classifiers: config.all_classifiers,
        })
    }
}
impl ArtifactFilter for PatternFilter {
    fn filter(&self, mut index: LayeredIndex) -> LayeredIndex {
        let before = index.len();

        index.retain(|key, spec| {
            if self.excluded_types.contains(&key.gat.artifact_type) {
                trace!("excluding {}:{} by type", key.gat, key.version);
                return false;
            }

            let gav = format!("{}:{}:{}", key.gat.group_id.0, key.gat.artifact_id.0, key.version);
            if let Some(pattern) = self.excluded_gav_patterns.iter().find(|p| p.matches(&gav)) {
                trace!("excluding {} by GAV pattern {}", gav, pattern.as_str());
                return false;
            }

            // requesting all classifiers overrides classifier exclusions
            if !self.all_classifiers {
                spec.classifiers.retain(|c| !self.excluded_classifiers.contains(c));
                if spec.classifiers.is_empty() {
                    trace!("excluding {}:{}, no classifiers left", key.gat, key.version);
                    return false;
                }
            }
            true
        });

        debug!("filtering kept {} of {} artifact versions", index.len(), before);
        index
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::artifact_list::layered_index::{ArtifactSpec, IndexKey};
    use crate::maven::coordinates::Gat;

    fn index() -> LayeredIndex {
        vec![
            (IndexKey::new(Gat::new("org.x", "lib", "jar"), 1, "1.0"), ArtifactSpec::with_classifiers("u", ["".into(), "tests".into()])),
            (IndexKey::new(Gat::new("org.x", "lib", "jar"), 1, "2.0-SNAPSHOT"), ArtifactSpec::new("u")),
            (IndexKey::new(Gat::new("org.x", "app", "war"), 1, "1.0"), ArtifactSpec::new("u")),
            (IndexKey::new(Gat::new("org.y", "only-tests", "jar"), 2, "1.0"), ArtifactSpec::with_classifiers("u", ["tests".into()])),
        ].into_iter().collect()
    }

    fn config(all_classifiers: bool) -> Configuration {
        Configuration {
            excluded_gav_patterns: vec!["r/.*-SNAPSHOT/".to_string()],
            excluded_types: vec!["war".to_string()],
            excluded_classifiers: vec!["tests".to_string()],
            all_classifiers,
            ..Default::default()
        }
    }

    #[test]
    fn test_exclusions() {
        let filtered = PatternFilter::from_config(&config(false)).unwrap().filter(index());

        let expected: LayeredIndex = vec![
            (IndexKey::new(Gat::new("org.x", "lib", "jar"), 1, "1.0"), ArtifactSpec::new("u")),
        ].into_iter().collect();
        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_all_classifiers_bypasses_classifier_exclusion() {
        let filtered = PatternFilter::from_config(&config(true)).unwrap().filter(index());

        assert_eq!(filtered.len(), 2);
        assert_eq!(
            filtered.get(&IndexKey::new(Gat::new("org.x", "lib", "jar"), 1, "1.0")),
            Some(&ArtifactSpec::with_classifiers("u", ["".into(), "tests".into()])),
        );
    }

    #[test]
    fn test_every_remaining_entry_has_a_classifier() {
        let filtered = PatternFilter::from_config(&config(false)).unwrap().filter(index());
        assert!(filtered.iter().all(|(_, spec)| !spec.classifiers.is_empty()));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = Configuration {
            excluded_gav_patterns: vec!["r/[/".to_string()],
            ..Default::default()
        };
        assert!(PatternFilter::from_config(&config).is_err());
    }

    #[test]
    fn test_no_filter() {
        assert_eq!(NoFilter.filter(index()), index());
    }
}
