//! Parsing of artifact list files.
//!
//! Each line names one artifact as `groupId:artifactId:type[:classifier]:version[:scope]`. The
//!  coordinate may be embedded in other text, so the output of `mvn dependency:list` can be used
//!  as an artifact list without post-processing. Anything after a '#' is a comment. Lines without
//!  a recognizable coordinate are skipped.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::maven::coordinates::MavenCoordinates;

lazy_static! {
    static ref COMMENT_REGEX: Regex = Regex::new(r"#.*$").unwrap();
    static ref GAV_REGEX: Regex = Regex::new(
        r"([\w\-.]+):([\w\-.]+):([\w\-.]+):(?:([\w\-.]+):)?(\d[\w\-.]*)(?::\w*\S)?"
    ).unwrap();
}

pub fn parse_line(line: &str) -> Option<MavenCoordinates> {
    let line = COMMENT_REGEX.replace(line, "");
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let captures = GAV_REGEX.captures(line)?;
    Some(MavenCoordinates::new(
        &captures[1],
        &captures[2],
        &captures[3],
        captures.get(4).map(|m| m.as_str()).unwrap_or(""),
        &captures[5],
    ))
}

pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<MavenCoordinates> {
    lines.into_iter()
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                trace!("skipping line without artifact coordinates: {:?}", line);
            }
            parsed
        })
        .collect()
}

pub async fn read_list_file(path: &Path) -> anyhow::Result<Vec<MavenCoordinates>> {
    let content = tokio::fs::read_to_string(path).await?;
    let artifacts = parse_lines(content.lines());
    debug!("read {} artifacts from {}", artifacts.len(), path.display());
    Ok(artifacts)
}
