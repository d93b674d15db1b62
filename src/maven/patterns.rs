use std::collections::BTreeSet;

use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref READABLE_PREFIX_REGEX: Regex = Regex::new(r"^(([a-zA-Z0-9-]+|\\\.|:)+)").unwrap();
}

/// A pattern over `groupId:artifactId:version` strings. Either a glob where '*' matches any
///  sequence of characters, or a regular expression written as `r/<regex>/`.
#[derive(Debug, Clone)]
pub struct GavPattern {
    source: String,
    regex: Regex,
}
impl GavPattern {
    pub fn parse(pattern: &str) -> anyhow::Result<GavPattern> {
        let regex = match as_regex_pattern(pattern) {
            Some(r) => Regex::new(&format!("^(?:{})$", r)),
            None => {
                let escaped = pattern.split('*')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(".*");
                Regex::new(&format!("^{}$", escaped))
            }
        }.map_err(|e| anyhow!("invalid GAV pattern {:?}: {}", pattern, e))?;

        Ok(GavPattern {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn parse_all(patterns: &[String]) -> anyhow::Result<Vec<GavPattern>> {
        patterns.iter()
            .map(|p| GavPattern::parse(p))
            .collect()
    }

    pub fn matches(&self, gav: &str) -> bool {
        self.regex.is_match(gav)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

pub fn any_matches(patterns: &[GavPattern], gav: &str) -> bool {
    patterns.iter().any(|p| p.matches(gav))
}

fn as_regex_pattern(pattern: &str) -> Option<&str> {
    pattern.strip_prefix("r/")
        .and_then(|p| p.strip_suffix('/'))
}

/// Computes the repository directories (relative, with trailing '/') that have to be listed to
///  find all artifacts matching at least one of the patterns. An empty string stands for the
///  repository root. Nested prefixes are collapsed into their parent.
pub fn listing_prefixes(patterns: &[String]) -> BTreeSet<String> {
    let root = || BTreeSet::from(["".to_string()]);
    if patterns.is_empty() {
        return root();
    }

    let mut candidates = BTreeSet::new();
    for pattern in patterns {
        let pattern = match as_regex_pattern(pattern) {
            Some(regex) => {
                // only the literal start of a regex (e.g. "org\.example:core-.*") is usable
                match READABLE_PREFIX_REGEX.captures(regex) {
                    Some(c) => format!("{}*", c[1].replace('\\', "")),
                    None => return root(),
                }
            }
            None => pattern.clone(),
        };

        let parts: Vec<&str> = pattern.split(':').collect();
        let mut path = format!("{}/", parts[0].replace('.', "/"));
        for part in parts.iter().skip(1).take(2) {
            path.push_str(part);
            path.push('/');
        }
        if let Some(star) = path.find('*') {
            path.truncate(star);
        }

        match path.rfind('/') {
            Some(last_slash) if last_slash > 0 => {
                candidates.insert(path[..=last_slash].to_string());
            }
            _ => return root(),
        }
    }

    // BTreeSet order puts every prefix before the paths it is a prefix of
    let mut prefixes: BTreeSet<String> = BTreeSet::new();
    for candidate in candidates {
        if !prefixes.iter().any(|p| candidate.starts_with(p.as_str())) {
            prefixes.insert(candidate);
        }
    }
    prefixes
}
