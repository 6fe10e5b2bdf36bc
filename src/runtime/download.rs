//! Installer artifact acquisition.

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BootstrapError, Result};

/// Default timeout for installer downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Capability for retrieving an installer artifact.
pub trait ArtifactFetcher {
    /// Download `url` into `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Fetches artifacts over HTTPS.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create an HTTPS-only fetcher with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_options(DOWNLOAD_TIMEOUT, true)
    }

    /// Create a fetcher with a custom timeout and scheme policy.
    pub fn with_options(timeout: Duration, https_only: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("print-bootstrap/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .https_only(https_only)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { client, timeout })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let failed = |reason: String| BootstrapError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        tracing::info!("Downloading {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let file = File::create(dest).map_err(|e| failed(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        let written = response
            .copy_to(&mut writer)
            .map_err(|e| failed(e.to_string()))?;
        writer.flush().map_err(|e| failed(e.to_string()))?;

        tracing::debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }
}

/// File name for an artifact URL.
pub fn artifact_file_name(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("runtime-installer")
        .to_string()
}

/// Download an artifact into `dir` and check it.
///
/// Transfer errors, missing or empty files, and hash mismatches all count as
/// acquisition failures.
pub fn acquire_artifact(
    fetcher: &dyn ArtifactFetcher,
    url: &str,
    dir: &Path,
    expected_sha256: Option<&str>,
) -> Result<PathBuf> {
    let dest = dir.join(artifact_file_name(url));
    let failed = |reason: &str| BootstrapError::DownloadFailed {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    fetcher.fetch(url, &dest)?;

    let size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(failed("downloaded file is missing or empty"));
    }

    if let Some(expected) = expected_sha256 {
        let actual = sha256_file(&dest).map_err(|e| failed(&e.to_string()))?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(failed(&format!(
                "checksum mismatch (expected {}, got {})",
                expected, actual
            )));
        }
        tracing::debug!("Checksum verified for {}", dest.display());
    }

    Ok(dest)
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn test_fetcher() -> HttpFetcher {
        HttpFetcher::with_options(Duration::from_secs(5), false).unwrap()
    }

    /// Writes fixed content, or fails.
    struct StaticFetcher(Option<&'static [u8]>);

    impl ArtifactFetcher for StaticFetcher {
        fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
            match self.0 {
                Some(bytes) => {
                    std::fs::write(dest, bytes)?;
                    Ok(bytes.len() as u64)
                }
                None => Err(BootstrapError::DownloadFailed {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                }),
            }
        }
    }

    #[test]
    fn default_timeout_is_five_minutes() {
        let fetcher = HttpFetcher::new().unwrap();
        assert_eq!(fetcher.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn file_name_from_url() {
        assert_eq!(
            artifact_file_name("https://www.python.org/ftp/python/3.11.9/python-3.11.9-amd64.exe"),
            "python-3.11.9-amd64.exe"
        );
        assert_eq!(
            artifact_file_name("https://example.com/dl/python.pkg?token=abc"),
            "python.pkg"
        );
        assert_eq!(artifact_file_name("https://example.com/"), "runtime-installer");
    }

    #[test]
    fn http_fetch_writes_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/python.exe");
            then.status(200).body("MZ installer bytes");
        });
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("python.exe");

        let written = test_fetcher().fetch(&server.url("/python.exe"), &dest).unwrap();

        mock.assert();
        assert_eq!(written, 18);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "MZ installer bytes");
    }

    #[test]
    fn http_error_status_is_download_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.exe");
            then.status(404);
        });
        let temp = TempDir::new().unwrap();

        let err = test_fetcher()
            .fetch(&server.url("/missing.exe"), &temp.path().join("x"))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::DownloadFailed { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn https_only_fetcher_rejects_plain_http() {
        let temp = TempDir::new().unwrap();
        let err = HttpFetcher::new()
            .unwrap()
            .fetch("http://127.0.0.1:9/python.exe", &temp.path().join("x"))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::DownloadFailed { .. }));
    }

    #[test]
    fn acquire_rejects_empty_artifact() {
        let temp = TempDir::new().unwrap();
        let err = acquire_artifact(
            &StaticFetcher(Some(b"")),
            "https://example.com/python.exe",
            temp.path(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert_eq!(err.exit_code(), crate::error::EXIT_DOWNLOAD_FAILED);
    }

    #[test]
    fn acquire_checks_sha256() {
        let temp = TempDir::new().unwrap();
        // sha256("abc")
        let good = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        let path = acquire_artifact(
            &StaticFetcher(Some(b"abc")),
            "https://example.com/python.exe",
            temp.path(),
            Some(good),
        )
        .unwrap();
        assert_eq!(path, temp.path().join("python.exe"));

        let err = acquire_artifact(
            &StaticFetcher(Some(b"abd")),
            "https://example.com/python.exe",
            temp.path(),
            Some(good),
        )
        .unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn acquire_propagates_transfer_error() {
        let temp = TempDir::new().unwrap();
        let err = acquire_artifact(
            &StaticFetcher(None),
            "https://example.com/python.exe",
            temp.path(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
