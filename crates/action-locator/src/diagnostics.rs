//! Failure snapshots written when every selector for a key failed

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::errors::DiagnosticError;

/// Destination for failure snapshots
#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    /// Persist `markup` annotated with the selector that failed
    async fn capture(
        &self,
        key: &str,
        failed_selector: &str,
        markup: &str,
    ) -> Result<PathBuf, DiagnosticError>;
}

/// Writes `failure-<key>-<timestamp>.html` files into a directory
#[derive(Debug, Clone)]
pub struct FsDiagnosticSink {
    dir: PathBuf,
}

impl FsDiagnosticSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DiagnosticSink for FsDiagnosticSink {
    async fn capture(
        &self,
        key: &str,
        failed_selector: &str,
        markup: &str,
    ) -> Result<PathBuf, DiagnosticError> {
        self.capture_at(key, failed_selector, markup, Utc::now())
            .await
    }
}

impl FsDiagnosticSink {
    /// Capture with an explicit timestamp; never overwrites an earlier snapshot
    pub async fn capture_at(
        &self,
        key: &str,
        failed_selector: &str,
        markup: &str,
        at: DateTime<Utc>,
    ) -> Result<PathBuf, DiagnosticError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DiagnosticError::Io {
                path: self.dir.clone(),
                source,
            })?;
        let body = annotate_markup(failed_selector, markup);

        let mut attempt = 0;
        loop {
            let path = self.dir.join(numbered_file_name(key, at, attempt));
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match opened {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    attempt += 1;
                    continue;
                }
                Err(source) => return Err(DiagnosticError::Io { path, source }),
            };
            let written = match file.write_all(body.as_bytes()).await {
                Ok(()) => file.flush().await,
                Err(err) => Err(err),
            };
            return written
                .map(|()| path.clone())
                .map_err(|source| DiagnosticError::Io { path, source });
        }
    }
}

/// Snapshot body: the failed selector as a leading comment, then the markup
pub fn annotate_markup(failed_selector: &str, markup: &str) -> String {
    // "--" would terminate the comment early
    let selector = failed_selector.replace("--", "- -");
    format!("<!-- Failed selector: {} -->\n{}", selector, markup)
}

/// Unique file name for a key and capture time
pub fn snapshot_file_name(key: &str, at: DateTime<Utc>) -> String {
    let key: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("failure-{}-{}.html", key, at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// `snapshot_file_name` with `-<attempt>` appended for collisions
fn numbered_file_name(key: &str, at: DateTime<Utc>, attempt: u32) -> String {
    let name = snapshot_file_name(key, at);
    match (attempt, name.strip_suffix(".html")) {
        (0, _) | (_, None) => name,
        (n, Some(stem)) => format!("{}-{}.html", stem, n),
    }
}
