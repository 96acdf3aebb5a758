// Report sink - where a rendered report ends up
//
// Reports go to stdout by default so they can be piped. Diagnostics never
// share that stream: logging writes to stderr. Saving to a file creates the
// parent directory and replaces any earlier report at the same path.
//
// Every write logs a SHA-256 digest of the content, which makes it easy to
// confirm two runs over the same snapshot produced identical output.

use super::{OutputFormat, ReportKind};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for a rendered report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSink {
    Stdout,
    File(PathBuf),
}

impl ReportSink {
    /// File sink named after the report inside `dir`, e.g. `reports/retention.csv`
    pub fn in_dir(dir: &Path, kind: ReportKind, format: OutputFormat) -> Self {
        Self::File(dir.join(format!("{}.{}", kind.as_str(), format.extension())))
    }

    /// Write the full report
    pub fn write(&self, content: &str) -> Result<()> {
        let digest = digest(content);

        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(content.as_bytes())
                    .context("Failed to write report to stdout")?;
                handle.flush()?;
                tracing::info!(bytes = content.len(), sha256 = %digest, "Report written to stdout");
            }
            Self::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create output directory {}", parent.display())
                        })?;
                    }
                }
                fs::write(path, content)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                tracing::info!(
                    path = %path.display(),
                    bytes = content.len(),
                    sha256 = %digest,
                    "Report saved"
                );
            }
        }
        Ok(())
    }
}

/// Hex-encoded SHA-256 of the rendered report
pub fn digest(content: &str) -> String {
    let hash = Sha256::digest(content.as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_names_file_after_report() {
        let sink = ReportSink::in_dir(Path::new("reports"), ReportKind::Retention, OutputFormat::Csv);
        assert_eq!(sink, ReportSink::File(PathBuf::from("reports/retention.csv")));

        let sink = ReportSink::in_dir(Path::new("out"), ReportKind::All, OutputFormat::Text);
        assert_eq!(sink, ReportSink::File(PathBuf::from("out/all.txt")));
    }

    #[test]
    fn test_file_sink_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ReportSink::File(dir.path().join("nested").join("report.json"));

        sink.write("{\"a\": 1}\n").unwrap();
        sink.write("{}\n").unwrap();

        let ReportSink::File(path) = &sink else {
            unreachable!()
        };
        assert_eq!(fs::read_to_string(path).unwrap(), "{}\n");
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(
            digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(digest("abc"), digest("abc"));
        assert_ne!(digest("abc"), digest("abd"));
    }
}
