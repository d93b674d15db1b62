use std::path::PathBuf;

/// Where a repository root lives, determined from its URL's scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// http:// or https://, normalized to end with '/'
    Http(String),
    /// file:// URL or a plain path
    Filesystem(PathBuf),
    Unsupported { scheme: String },
}
impl Origin {
    pub fn parse(url: &str) -> Origin {
        match url.split_once("://") {
            Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
                "http" | "https" => {
                    let mut base = url.to_string();
                    if !base.ends_with('/') {
                        base.push('/');
                    }
                    Origin::Http(base)
                }
                "file" => Origin::Filesystem(PathBuf::from(rest)),
                _ => Origin::Unsupported { scheme: scheme.to_string() },
            },
            None => Origin::Filesystem(PathBuf::from(url)),
        }
    }
}
