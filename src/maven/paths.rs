use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;
use crate::maven::coordinates::*;

lazy_static! {
    static ref SNAPSHOT_TIMESTAMP_REGEX: Regex = Regex::new(r"^(\d{8}\.\d{6})-(\d+)").unwrap();
}

/// <group path>/<artifactId>/<version>, relative to the repository root
pub fn dir_path(coordinates: &MavenCoordinates) -> String {
    format!(
        "{}/{}/{}",
        coordinates.group_id.0.replace('.', "/"),
        coordinates.artifact_id.0,
        coordinates.version,
    )
}

pub fn as_maven_path(coordinates: &MavenCoordinates) -> String {
    format!("{}/{}", dir_path(coordinates), maven_file_name(coordinates))
}

/// The path a file has in the remote repository it is retrieved from. This differs from
///  [as_maven_path] only for snapshots that were found with a timestamp and build number.
pub fn as_remote_maven_path(coordinates: &MavenCoordinates) -> String {
    format!("{}/{}", dir_path(coordinates), remote_file_name(coordinates))
}

/// <artifactId>-<version>[-<classifier>].<type>
pub fn maven_file_name(coordinates: &MavenCoordinates) -> String {
    file_name_with_version(coordinates, &coordinates.version)
}

/// <artifactId>-<base>-<timestamp>-<buildNumber>[-<classifier>].<type> for timestamped snapshots
pub fn remote_file_name(coordinates: &MavenCoordinates) -> String {
    let snapshot_base = coordinates.version.strip_suffix("SNAPSHOT")
        .filter(|b| b.ends_with('-'));
    match (&coordinates.snapshot_suffix, snapshot_base) {
        (Some(suffix), Some(base)) => file_name_with_version(coordinates, &format!("{}{}", base, suffix)),
        _ => maven_file_name(coordinates),
    }
}

fn file_name_with_version(coordinates: &MavenCoordinates, version: &str) -> String {
    let classifier_string = match &coordinates.classifier {
        MavenClassifier::Unclassified => "".to_string(),
        MavenClassifier::Classified(c) => format!("-{}", c),
    };

    format!("{}-{}{}.{}",
            coordinates.artifact_id.0,
            version,
            classifier_string,
            coordinates.artifact_type,
    )
}

/// Splits off the extension, treating compressed tarballs ('.tar.gz' etc.) as a single extension
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(last_dot) => {
            let head = &file_name[..last_dot];
            if head.ends_with(".tar") {
                let tar_dot = last_dot - ".tar".len();
                (&file_name[..tar_dot], &file_name[tar_dot+1..])
            }
            else {
                (head, &file_name[last_dot+1..])
            }
        }
        None => (file_name, ""),
    }
}

fn parse_classifier<'a>(remainder: &'a str, full_file_name: &str) -> anyhow::Result<Option<&'a str>> {
    if remainder.is_empty() {
        return Ok(None);
    }

    match remainder.strip_prefix('-') {
        Some(classifier) if !classifier.is_empty() && !classifier.contains('.') => Ok(Some(classifier)),
        _ => Err(anyhow!("not a valid maven file name - invalid classifier format: {}", full_file_name)),
    }
}

pub(crate) fn parse_maven_filename<'a>(file_name: &'a str, artifact_id: &str, version_string: &str) -> anyhow::Result<ParseFilenameResult<'a>> {
    let full_file_name = file_name;
    if file_name.len() < artifact_id.len() + version_string.len() + 2 {
        return Err(anyhow!("not a valid maven file name: {}", full_file_name));
    }

    let file_name = file_name.strip_prefix(artifact_id)
        .and_then(|s| s.strip_prefix('-'))
        .ok_or_else(|| anyhow!("{} is not a valid maven file name: expected to start with artifact id {}", full_file_name, artifact_id))?;

    let (file_name, extension) = split_extension(file_name);

    if let Some(snapshot_prefix) = version_string.strip_suffix("SNAPSHOT").filter(|p| p.ends_with('-')) {
        // <artifactId>-<base>-SNAPSHOT[-<classifier>].<extension>
        // <artifactId>-<base>-<timestamp>-<buildNumber>[-<classifier>].<extension>

        let file_name = file_name.strip_prefix(snapshot_prefix)
            .ok_or_else(|| anyhow!("{} is not a valid maven file name: expected to have version string {}", full_file_name, version_string))?;

        if let Some(remainder) = file_name.strip_prefix("SNAPSHOT") {
            return Ok(ParseFilenameResult {
                version: MavenVersion::Snapshot {
                    version: version_string.to_string(),
                    timestamp: None,
                    build_number: None,
                },
                classifier: parse_classifier(remainder, full_file_name)?,
                extension,
            });
        }

        let captures = SNAPSHOT_TIMESTAMP_REGEX.captures(file_name)
            .ok_or_else(|| anyhow!("snapshot file name has neither 'SNAPSHOT' nor a timestamp: {}", full_file_name))?;
        let build_number = captures[2].parse::<u32>()?;
        let remainder = &file_name[captures[0].len()..];

        Ok(ParseFilenameResult {
            version: MavenVersion::Snapshot {
                version: version_string.to_string(),
                timestamp: Some(captures[1].to_string()),
                build_number: Some(build_number),
            },
            classifier: parse_classifier(remainder, full_file_name)?,
            extension,
        })
    }
    else {
        //  <artifactId>-<version>[-<classifier>].<extension>

        let remainder = file_name.strip_prefix(version_string)
            .ok_or_else(|| anyhow!("{} is not a valid maven file name: expected to have version string {}", full_file_name, version_string))?;

        Ok(ParseFilenameResult {
            version: MavenVersion::Release(version_string.to_string()),
            classifier: parse_classifier(remainder, full_file_name)?,
            extension,
        })
    }
}

/// path is the relative path inside a maven repository, i.e. it starts with something like
///  "org/..." or "com/..."
pub fn parse_maven_path(path: &str) -> anyhow::Result<MavenCoordinates> {
    let path = path.trim_start_matches('/');

    if let Some(last_slash) = path.rfind('/') {
        let (without_filename, file_name) = path.split_at(last_slash);
        let file_name = &file_name[1..];

        if let Some(last_slash) = without_filename.rfind('/') {
            let (without_version, version) = without_filename.split_at(last_slash);
            let version = &version[1..];

            if let Some(last_slash) = without_version.rfind('/') {
                let (group_id, artifact_id) = without_version.split_at(last_slash);
                let artifact_id = &artifact_id[1..];

                let parsed_filename = parse_maven_filename(file_name, artifact_id, version)?;
                if parsed_filename.extension.is_empty() {
                    return Err(anyhow!("maven file without extension: {:?}", path));
                }

                return Ok(MavenCoordinates {
                    group_id: MavenGroupId(group_id.replace('/', ".")),
                    artifact_id: MavenArtifactId(artifact_id.to_string()),
                    artifact_type: parsed_filename.extension.to_string(),
                    classifier: parsed_filename.classifier.unwrap_or("").into(),
                    version: parsed_filename.version.base_version().to_string(),
                    snapshot_suffix: parsed_filename.version.snapshot_suffix(),
                });
            }
        }
    }

    Err(anyhow::Error::msg(format!("not a valid Maven artifact path: {:?}", path)))
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) struct ParseFilenameResult<'a> {
    pub version: MavenVersion,
    pub classifier: Option<&'a str>,
    pub extension: &'a str, // without leading '.', e.g. "jar"
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    fn release(v: &str, classifier: Option<&'static str>, extension: &'static str) -> Option<ParseFilenameResult<'static>> {
        Some(ParseFilenameResult { version: MavenVersion::Release(v.to_string()), classifier, extension })
    }

    fn snapshot(v: &str, timestamp: Option<&str>, build_number: Option<u32>, classifier: Option<&'static str>, extension: &'static str) -> Option<ParseFilenameResult<'static>> {
        Some(ParseFilenameResult {
            version: MavenVersion::Snapshot { version: v.to_string(), timestamp: timestamp.map(|s| s.to_string()), build_number },
            classifier,
            extension,
        })
    }

    #[rstest]
    #[case::release("a-1.0.0.jar", "a", "1.0.0", release("1.0.0", None, "jar"))]
    #[case::release_with_dash("x-y-1.0.0.jar", "x-y", "1.0.0", release("1.0.0", None, "jar"))]
    #[case::release_version_with_dash_prefix("x-y-1.0.0.jar", "x", "y-1.0.0", release("y-1.0.0", None, "jar"))]
    #[case::release_version_with_dash_suffix("x-1.0.0-y.jar", "x", "1.0.0-y", release("1.0.0-y", None, "jar"))]
    #[case::release_extension("q-1.0.0.abc", "q", "1.0.0", release("1.0.0", None, "abc"))]
    #[case::release_tarball("q-1.0.0-bin.tar.gz", "q", "1.0.0", release("1.0.0", Some("bin"), "tar.gz"))]
    #[case::release_classifier("a-1.0.0-cla.jar", "a", "1.0.0", release("1.0.0", Some("cla"), "jar"))]
    #[case::release_classifier_with_dash("a-1.0.0-cla-rst.jar", "a", "1.0.0", release("1.0.0", Some("cla-rst"), "jar"))]
    #[case::release_classifier_with_dash_suffix("a-1.0.0-cla-rst.jar", "a", "1.0.0-cla", release("1.0.0-cla", Some("rst"), "jar"))]
    #[case::release_invalid_too_short_1("xxxxxx", "a", "1.0.0", None)]
    #[case::release_invalid_too_short_2("", "a", "1.0.0", None)]
    #[case::release_invalid_wrong_artifact("a-1.0.0.jar", "b", "1.0.0", None)]
    #[case::release_invalid_no_dash_after_artifact("a1.0.0.jar", "a", "1.0.0", None)]
    #[case::release_invalid_wrong_version("a-1.0.0.jar", "a", "1.0.1", None)]
    #[case::release_invalid_no_version("a.jar", "a", "1.0.0", None)]
    #[case::release_invalid_no_dash_before_classifier("a-1.0.0xyz.jar", "a", "1.0.0", None)]
    #[case::release_invalid_checksum_sidecar("a-1.0.0.jar.sha1", "a", "1.0.0", None)]
    #[case::release_invalid_classified_checksum_sidecar("a-1.0.0-sources.jar.md5", "a", "1.0.0", None)]

    #[case::snapshot("a-1.0.0-SNAPSHOT.jar", "a", "1.0.0-SNAPSHOT", snapshot("1.0.0-SNAPSHOT", None, None, None, "jar"))]
    #[case::snapshot_classifier("a-1.0.0-SNAPSHOT-sources.jar", "a", "1.0.0-SNAPSHOT", snapshot("1.0.0-SNAPSHOT", None, None, Some("sources"), "jar"))]
    #[case::snapshot_timestamp("a-1.0.0-20230102.123456-5.jar", "a", "1.0.0-SNAPSHOT", snapshot("1.0.0-SNAPSHOT", Some("20230102.123456"), Some(5), None, "jar"))]
    #[case::snapshot_timestamp_classifier("a-1.0.0-20230102.123456-5-cla.jar", "a", "1.0.0-SNAPSHOT", snapshot("1.0.0-SNAPSHOT", Some("20230102.123456"), Some(5), Some("cla"), "jar"))]
    #[case::snapshot_timestamp_classifier_with_dash("a-1.0.0-20230102.123456-17-a-b-c.pom", "a", "1.0.0-SNAPSHOT", snapshot("1.0.0-SNAPSHOT", Some("20230102.123456"), Some(17), Some("a-b-c"), "pom"))]
    #[case::snapshot_invalid_no_build_number("a-1.0.0-20230102.123456.jar", "a", "1.0.0-SNAPSHOT", None)]
    #[case::snapshot_invalid_too_short("xxxxxxxxxxxxxxx", "a", "1.0.0-SNAPSHOT", None)]
    #[case::snapshot_invalid_wrong_artifact("a-1.0.0-SNAPSHOT.jar", "b", "1.0.0-SNAPSHOT", None)]
    #[case::snapshot_invalid_wrong_version("a-1.0.0-SNAPSHOT.jar", "a", "1.0.1-SNAPSHOT", None)]
    #[case::snapshot_invalid_no_version("a.jar", "a", "1.0.0-SNAPSHOT", None)]

    #[case::snapshot_lowercase_snapshot("a-1.0.0-snapshot-x.jar", "a", "1.0.0-snapshot", release("1.0.0-snapshot", Some("x"), "jar"))]
    fn test_parse_filename(#[case] file_name: &str, #[case] artifact_id: &str, #[case] version_string: &str, #[case] expected: Option<ParseFilenameResult>) {
        let actual = parse_maven_filename(file_name, artifact_id, version_string);

        if let Some(expected) = expected {
            let actual = actual.unwrap();
            assert_eq!(actual, expected);
        }
        else {
            assert!(actual.is_err());
        }
    }

    #[rstest]
    #[case::main(MavenCoordinates::new("org.example.deep", "lib", "jar", "", "1.2.3"), "org/example/deep/lib/1.2.3/lib-1.2.3.jar")]
    #[case::classifier(MavenCoordinates::new("org.example", "lib", "jar", "sources", "1.2.3"), "org/example/lib/1.2.3/lib-1.2.3-sources.jar")]
    #[case::pom(MavenCoordinates::new("g", "a", "pom", "", "1-SNAPSHOT"), "g/a/1-SNAPSHOT/a-1-SNAPSHOT.pom")]
    fn test_as_maven_path(#[case] coordinates: MavenCoordinates, #[case] expected: &str) {
        assert_eq!(as_maven_path(&coordinates), expected);
    }

    #[rstest]
    #[case::main("org/example/lib/1.2.3/lib-1.2.3.jar", Some(MavenCoordinates::new("org.example", "lib", "jar", "", "1.2.3")))]
    #[case::leading_slash("/org/example/lib/1.2.3/lib-1.2.3-sources.jar", Some(MavenCoordinates::new("org.example", "lib", "jar", "sources", "1.2.3")))]
    #[case::timestamped_snapshot("g/a/1.0-SNAPSHOT/a-1.0-20230102.123456-5.pom", Some(MavenCoordinates::new("g", "a", "pom", "", "1.0-SNAPSHOT").with_snapshot_suffix(Some(suffix("20230102.123456", 5)))))]
    #[case::plain_snapshot("g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.pom", Some(MavenCoordinates::new("g", "a", "pom", "", "1.0-SNAPSHOT")))]
    #[case::metadata("org/example/lib/maven-metadata.xml", None)]
    #[case::too_shallow("lib/lib-1.0.jar", None)]
    fn test_parse_maven_path(#[case] path: &str, #[case] expected: Option<MavenCoordinates>) {
        let actual = parse_maven_path(path);
        match expected {
            Some(expected) => assert_eq!(actual.unwrap(), expected),
            None => assert!(actual.is_err()),
        }
    }

    fn suffix(timestamp: &str, build_number: u32) -> SnapshotSuffix {
        SnapshotSuffix { timestamp: timestamp.to_string(), build_number }
    }

    #[rstest]
    #[case::release(MavenCoordinates::new("g", "a", "jar", "", "1.0"), "g/a/1.0/a-1.0.jar")]
    #[case::plain_snapshot(MavenCoordinates::new("g", "a", "jar", "", "1.0-SNAPSHOT"), "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar")]
    #[case::timestamped(MavenCoordinates::new("g", "a", "jar", "", "1.0-SNAPSHOT").with_snapshot_suffix(Some(suffix("20230102.123456", 5))), "g/a/1.0-SNAPSHOT/a-1.0-20230102.123456-5.jar")]
    #[case::timestamped_classifier(MavenCoordinates::new("g", "a", "jar", "sources", "1.0-SNAPSHOT").with_snapshot_suffix(Some(suffix("20230102.123456", 5))), "g/a/1.0-SNAPSHOT/a-1.0-20230102.123456-5-sources.jar")]
    fn test_as_remote_maven_path(#[case] coordinates: MavenCoordinates, #[case] expected: &str) {
        assert_eq!(as_remote_maven_path(&coordinates), expected);
    }

    #[test]
    fn test_timestamped_snapshot_is_stored_under_base_version() {
        let coordinates = parse_maven_path("g/a/1.0-SNAPSHOT/a-1.0-20230102.123456-5-sources.jar").unwrap();
        assert_eq!(as_maven_path(&coordinates), "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT-sources.jar");
        assert_eq!(as_remote_maven_path(&coordinates), "g/a/1.0-SNAPSHOT/a-1.0-20230102.123456-5-sources.jar");
    }

    #[test]
    fn test_path_round_trip_for_classified_tarball() {
        let coordinates = MavenCoordinates::new("g.h", "dist", "tar.gz", "bin", "2.0");
        assert_eq!(parse_maven_path(&as_maven_path(&coordinates)).unwrap(), coordinates);
    }
}
