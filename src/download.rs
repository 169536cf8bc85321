//! HTTP file downloads
//!
//! Downloads are synchronous. Data goes to a `.part` file next to the
//! destination and is renamed into place once the transfer completed; the
//! final name only ever holds a complete body.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use crate::error::{Error, Result};
use crate::files;
use crate::settings::DownloadSettings;

/// Outcome of a successful download
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// Where the body was written
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes: u64,
    /// Response headers as `Name: value` lines
    pub headers: String,
}

/// File name for a URL: its last path segment without query string
pub fn filename_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download")
        .to_string()
}

/// HTTP download client
pub struct Downloader {
    client: Client,
    retries: u32,
    show_progress: bool,
}

impl Downloader {
    /// Create a downloader using the `[DOWNLOAD]` settings
    pub fn new(settings: &DownloadSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(format!("cpplibhub/{}", env!("CARGO_PKG_VERSION")));
        if settings.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.timeout_secs));
        } else {
            builder = builder.timeout(None);
        }

        let client = builder
            .build()
            .map_err(|e| Error::DownloadFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retries: settings.retries.max(1),
            show_progress: settings.show_progress,
        })
    }

    /// Download `url` and save the body into `dest`.
    ///
    /// If `dest` is an existing directory the file is named after the URL.
    /// An existing file at the destination is overwritten.
    pub fn download_to_file(&self, url: &str, dest: &Path) -> Result<DownloadResult> {
        let dest_path = if files::dir_exists(dest) {
            dest.join(filename_from_url(url))
        } else {
            dest.to_path_buf()
        };

        let mut last_error: Option<Error> = None;

        for attempt in 1..=self.retries {
            if attempt > 1 {
                tracing::info!("Retry attempt {} of {}", attempt, self.retries);
                std::thread::sleep(Duration::from_secs(2_u64.pow(attempt - 2)));
            }

            match self.download_single(url, &dest_path) {
                Ok(result) => {
                    tracing::info!("Downloaded {} ({} bytes)", url, result.bytes);
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!("Attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::DownloadFailed(format!("No attempt was made to download {}", url))
        }))
    }

    /// Perform a single download attempt
    fn download_single(&self, url: &str, dest: &Path) -> Result<DownloadResult> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadFailed(format!("Failed to connect to {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::DownloadFailed(format!(
                "HTTP error {}: {}",
                response.status(),
                url
            )));
        }

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("<binary>")))
            .collect::<Vec<_>>()
            .join("\n");
        let total_size = response.content_length();

        let progress = self.progress_bar(total_size);
        let temp_path = part_path(dest);

        let written = File::create(&temp_path)
            .map_err(Error::from)
            .and_then(|file| write_body(BufReader::new(response), file, progress.as_ref()))
            .and_then(|bytes| {
                fs::rename(&temp_path, dest)?;
                Ok(bytes)
            });

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        let downloaded = match written {
            Ok(bytes) => bytes,
            Err(e) => {
                fs::remove_file(&temp_path).ok();
                return Err(e);
            }
        };

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            bytes: downloaded,
            headers,
        })
    }

    fn progress_bar(&self, total_size: Option<u64>) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let total = total_size?;

        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        ) {
            bar.set_style(style);
        }
        Some(bar)
    }
}

/// Copy the response body into `file`, returning the number of bytes written
fn write_body<R: Read, W: Write>(
    mut reader: R,
    mut file: W,
    progress: Option<&ProgressBar>,
) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| Error::DownloadFailed(format!("Failed to read from network: {}", e)))?;
        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;

        if let Some(bar) = progress {
            bar.set_position(downloaded);
        }
    }

    file.flush()?;
    Ok(downloaded)
}

/// `foo.tar.gz` downloads into `foo.tar.gz.part`
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
