use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use hex::FromHex;
use hyper::{Body, Client, Request, Response, StatusCode, Uri};
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::{HeaderMap, LOCATION, USER_AGENT};
use hyper_tls::HttpsConnector;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::util::validating_http_body::{HttpBodyValidator, Md5HttpBodyValidator, Sha1HttpBodyValidator, ValidatingHttpBody};

const MAX_REDIRECTS: usize = 5;

/// how long to wait for response headers, and for each chunk of a body
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Maven Central returns a 403 for requests without a user agent
const USER_AGENT_VALUE: &str = concat!("maven-repo-builder/", env!("CARGO_PKG_VERSION"));

/// Result of a download that is not known to have failed yet: the body still has to be consumed,
///  and it fails at the end if it does not match a checksum announced by the server, or as soon as
///  the server stalls.
pub enum Download {
    Found(BoxStream<'static, anyhow::Result<Bytes>>),
    NotFound,
}

/// Downloads files over HTTP(S), checking the body's integrity against a hashcode if one is
///  returned in a header.
///
/// Instances do HTTP connection caching internally, so keeping them alive has performance benefits.
pub struct ValidatingHttpDownloader {
    client: Client<HttpsConnector<HttpConnector>>,
    timeout: Duration,
}
impl ValidatingHttpDownloader {
    pub fn new() -> ValidatingHttpDownloader {
        ValidatingHttpDownloader::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> ValidatingHttpDownloader {
        ValidatingHttpDownloader {
            client: Client::builder()
                .build::<_, Body>(HttpsConnector::new()),
            timeout,
        }
    }

    /// GET with redirects followed
    async fn request(&self, url: &str) -> anyhow::Result<Response<Body>> {
        let mut url = url.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let uri = Uri::try_from(url.clone())?;
            let request = Request::builder()
                .method("GET")
                .uri(uri.clone())
                .header(USER_AGENT, USER_AGENT_VALUE)
                .body(Body::empty())?;

            trace!("getting {:?}", request);

            let response = timeout(self.timeout, self.client.request(request))
                .await
                .map_err(|_| anyhow::anyhow!("no response from {} within {:?}", url, self.timeout))??;

            if !response.status().is_redirection() {
                return Ok(response);
            }

            let location = response.headers().get(LOCATION)
                .ok_or_else(|| anyhow::anyhow!("redirect without location from {}", url))?
                .to_str()?;
            url = resolve_location(&uri, location);
            debug!("following redirect to {}", url);
        }

        Err(anyhow::anyhow!("too many redirects for {}", url))
    }

    pub async fn download(&self, url: &str) -> anyhow::Result<Download> {
        let response = self.request(url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Download::NotFound);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("request for {} failed: {}", url, response.status()));
        }

        let validators = announced_checksum_validators(response.headers())?;
        let body = ValidatingHttpBody::new(response.into_body(), validators);
        Ok(Download::Found(with_idle_timeout(body, url, self.timeout)))
    }

    /// the whole body as a string, e.g. for directory listings
    pub async fn get_text(&self, url: &str) -> anyhow::Result<String> {
        let response = self.request(url).await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("request for {} failed: {}", url, response.status()));
        }

        let bytes = timeout(self.timeout, to_bytes(response.into_body()))
            .await
            .map_err(|_| anyhow::anyhow!("reading {} timed out after {:?}", url, self.timeout))??;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
impl Default for ValidatingHttpDownloader {
    fn default() -> Self {
        ValidatingHttpDownloader::new()
    }
}

/// Fails the stream if the next chunk does not arrive in time. Nothing is polled after a failure.
fn with_idle_timeout<S>(body: S, url: &str, idle_timeout: Duration) -> BoxStream<'static, anyhow::Result<Bytes>>
where S: Stream<Item = anyhow::Result<Bytes>> + Send + 'static
{
    let url = url.to_string();
    futures::stream::unfold(Some(Box::pin(body)), move |body| {
        let url = url.clone();
        async move {
            let mut body = body?;
            match timeout(idle_timeout, body.next()).await {
                Ok(Some(chunk)) => Some((chunk, Some(body))),
                Ok(None) => None,
                Err(_) => Some((Err(anyhow::anyhow!("no data from {} within {:?}", url, idle_timeout)), None)),
            }
        }
    })
        .boxed()
}

fn resolve_location(base: &Uri, location: &str) -> String {
    if location.contains("://") {
        return location.to_string();
    }

    let scheme = base.scheme_str().unwrap_or("http");
    let authority = base.authority().map(|a| a.as_str()).unwrap_or("");
    if location.starts_with('/') {
        format!("{}://{}{}", scheme, authority, location)
    }
    else {
        let path = base.path();
        let dir = &path[..path.rfind('/').map(|i| i + 1).unwrap_or(0)];
        format!("{}://{}{}{}", scheme, authority, dir, location)
    }
}

fn announced_checksum_validators(headers: &HeaderMap) -> anyhow::Result<Vec<Box<dyn HttpBodyValidator>>> {
    let header_str = |name: &str| headers.get(name)
        .and_then(|h| h.to_str().ok());

    // only a quoted 40 character ETag is a SHA1 hash (Maven Central / Nexus style)
    let sha1_string = header_str("x-checksum-sha1")
        .or_else(|| header_str("x-goog-meta-checksum-sha1"))
        .or_else(|| header_str("etag").filter(|s| s.len() == 42).map(|s| &s[1..41]));

    let md5_string = header_str("x-checksum-md5")
        .or_else(|| header_str("x-goog-meta-checksum-md5"));

    let mut validators: Vec<Box<dyn HttpBodyValidator>> = vec![];
    if let Some(sha1) = sha1_string {
        // an ETag may be some other 40 character token, so unparsable values are ignored
        if let Ok(expected_hash) = <[u8;20]>::from_hex(sha1) {
            validators.push(Box::new(Sha1HttpBodyValidator::new(expected_hash)));
        }
    }
    if let Some(md5) = md5_string {
        let expected_hash = <[u8;16]>::from_hex(md5)?;
        validators.push(Box::new(Md5HttpBodyValidator::new(expected_hash)));
    }
    Ok(validators)
}

#[cfg(test)]
mod test {
    use hyper::header::HeaderValue;
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::absolute("https://a/x/y", "https://b/z", "https://b/z")]
    #[case::host_relative("https://a/x/y", "/z", "https://a/z")]
    #[case::path_relative("http://a:8080/x/y", "z/w", "http://a:8080/x/z/w")]
    fn test_resolve_location(#[case] base: &str, #[case] location: &str, #[case] expected: &str) {
        let base = Uri::try_from(base).unwrap();
        assert_eq!(resolve_location(&base, location), expected);
    }

    #[test]
    fn test_validators_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(announced_checksum_validators(&headers).unwrap().len(), 0);

        headers.insert("etag", HeaderValue::from_static("\"aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\""));
        assert_eq!(announced_checksum_validators(&headers).unwrap().len(), 1);

        headers.insert("x-checksum-md5", HeaderValue::from_static("5d41402abc4b2a76b9719d911017c592"));
        assert_eq!(announced_checksum_validators(&headers).unwrap().len(), 2);

        headers.insert("x-checksum-md5", HeaderValue::from_static("no hex"));
        assert!(announced_checksum_validators(&headers).is_err());
    }

    async fn collect(mut body: BoxStream<'static, anyhow::Result<Bytes>>) -> Vec<anyhow::Result<Bytes>> {
        let mut result = Vec::new();
        while let Some(chunk) = body.next().await {
            result.push(chunk);
        }
        result
    }

    #[tokio::test]
    async fn test_stalled_body_fails_once() {
        let stalled = futures::stream::iter(vec![Ok(Bytes::from_static(b"partial"))])
            .chain(futures::stream::pending());
        let chunks = collect(with_idle_timeout(stalled, "http://host/a.jar", Duration::from_millis(50))).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap(), &Bytes::from_static(b"partial"));
        assert!(chunks[1].as_ref().unwrap_err().to_string().contains("http://host/a.jar"));
    }

    #[tokio::test]
    async fn test_complete_body_passes_idle_timeout() {
        let body = futures::stream::iter(vec![Ok(Bytes::from_static(b"a")), Ok(Bytes::from_static(b"b"))]);
        let chunks = collect(with_idle_timeout(body, "http://host/a.jar", Duration::from_millis(50))).await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.is_ok()));
    }

    #[test]
    fn test_weak_etag_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("etag", HeaderValue::from_static("\"not-a-sha1-but-exactly-forty-characters!\""));
        assert_eq!(announced_checksum_validators(&headers).unwrap().len(), 0);
    }
}
