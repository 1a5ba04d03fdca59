use std::{path::Path, pin::Pin};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Url;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

use crate::{error::CrawlError, transform::sanitize};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, CrawlError>> + Send>>;

/// Something that can hand back the body of a plain GET as a byte stream.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<ByteStream, CrawlError>;
}

/// Extension of the URL's last path segment, dot included, or `""` if it has none.
pub fn extension_of(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_owned(),
        Err(_) => url.to_owned(),
    };
    let segment = path.rsplit('/').next().unwrap_or_default();

    segment
        .rfind('.')
        .map(|i| segment[i..].to_owned())
        .unwrap_or_default()
}

/// Streams `url` into `dir/<sanitized name><extension>` and returns `name` untouched.
///
/// The file is created before the request goes out, so a failed fetch or an
/// interrupted transfer leaves an empty or partial file behind.
pub async fn download<F: Fetcher>(
    fetcher: &F,
    dir: &Path,
    url: &str,
    name: &str,
) -> Result<String, CrawlError> {
    let path = dir.join(format!("{}{}", sanitize(name), extension_of(url)));

    let mut file = File::create(&path)
        .await
        .map_err(|source| CrawlError::FileCreate {
            path: path.clone(),
            source,
        })?;

    let copied = async {
        let mut stream = fetcher.fetch(url).await?;
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|source| CrawlError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
        Ok::<_, CrawlError>(written)
    }
    .await;

    // Writes still queued on the blocking pool must land before we return,
    // on the error path too.
    let flushed = file.flush().await.map_err(|source| CrawlError::Write {
        path: path.clone(),
        source,
    });

    let written = copied?;
    flushed?;

    debug!(path = %path.display(), bytes = written, "saved thumbnail");
    Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    struct StaticFetcher(Vec<Result<&'static [u8], &'static str>>);

    impl Fetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<ByteStream, CrawlError> {
            let chunks: Vec<Result<Bytes, CrawlError>> = self
                .0
                .iter()
                .map(|chunk| match chunk {
                    Ok(data) => Ok(Bytes::from_static(*data)),
                    Err(msg) => Err(CrawlError::Network((*msg).to_owned())),
                })
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    struct Unreachable;

    impl Fetcher for Unreachable {
        async fn fetch(&self, _url: &str) -> Result<ByteStream, CrawlError> {
            Err(CrawlError::Network("connection refused".into()))
        }
    }

    #[test]
    fn extension_from_url_path() {
        assert_eq!(extension_of("https://i.ytimg.com/vi/abc/maxresdefault.jpg"), ".jpg");
        assert_eq!(extension_of("https://i.ytimg.com/vi/abc/maxresdefault.jpg?v=2"), ".jpg");
        assert_eq!(extension_of("https://i.ytimg.com/vi/abc/"), "");
        assert_eq!(extension_of("https://example.com/a.b/image"), "");
        assert_eq!(extension_of("relative/file.webp"), ".webp");
    }

    #[tokio::test]
    async fn writes_sanitized_file_and_returns_raw_name() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher(vec![Ok(&b"\xff\xd8"[..]), Ok(&b"jpeg-bytes"[..])]);

        let name = download(
            &fetcher,
            dir.path(),
            "https://i.ytimg.com/vi/abc123/maxresdefault.jpg",
            "20230501-abc123-Hello/World",
        )
        .await
        .unwrap();

        assert_eq!(name, "20230501-abc123-Hello/World");
        let written = std::fs::read(dir.path().join("20230501-abc123-Hello／World.jpg")).unwrap();
        assert_eq!(written, b"\xff\xd8jpeg-bytes");
    }

    #[tokio::test]
    async fn interrupted_transfer_leaves_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher(vec![Ok(&b"partial"[..]), Err("reset by peer")]);

        let err = download(&fetcher, dir.path(), "http://host/x.png", "name")
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Network(_)));
        assert_eq!(std::fs::read(dir.path().join("name.png")).unwrap(), b"partial");
    }

    struct LargeThenFail;

    impl Fetcher for LargeThenFail {
        async fn fetch(&self, _url: &str) -> Result<ByteStream, CrawlError> {
            let chunks = vec![
                Ok(Bytes::from(vec![0xAB; 1024 * 1024])),
                Err(CrawlError::Network("reset by peer".into())),
            ];
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    #[tokio::test]
    async fn partial_file_is_complete_when_error_returns() {
        let dir = tempfile::tempdir().unwrap();

        for i in 0..50 {
            let name = format!("big-{i}");
            let err = download(&LargeThenFail, dir.path(), "http://host/x.jpg", &name)
                .await
                .unwrap_err();

            assert!(matches!(err, CrawlError::Network(_)));
            let len = std::fs::metadata(dir.path().join(format!("{name}.jpg")))
                .unwrap()
                .len();
            assert_eq!(len, 1024 * 1024, "run {i} returned before its write landed");
        }
    }

    #[tokio::test]
    async fn failed_fetch_leaves_empty_file() {
        let dir = tempfile::tempdir().unwrap();

        let err = download(&Unreachable, dir.path(), "http://host/x.jpg", "name")
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Network(_)));
        assert!(std::fs::read(dir.path().join("name.jpg")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_directory_is_a_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = download(&Unreachable, &missing, "http://host/x.jpg", "name")
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::FileCreate { .. }));
    }
}
