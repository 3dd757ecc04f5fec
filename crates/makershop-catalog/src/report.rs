//! Import error-report artifacts.
//!
//! The object store holding downloadable reports is an external
//! collaborator; [`ReportSink`] is the seam, with a filesystem
//! implementation for single-host deployments (the directory is typically a
//! bucket mount).

use std::path::PathBuf;

use makershop_core::RowError;

/// Destination for the per-import CSV error report.
pub trait ReportSink: Send + Sync {
    /// Write `errors` as a CSV document under `key`; returns the stored
    /// location for surfacing in the job result.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the artifact cannot be written.
    fn put_csv(&self, key: &str, errors: &[RowError]) -> Result<String, std::io::Error>;
}

/// Filesystem-backed report sink.
#[derive(Debug, Clone)]
pub struct FsReportSink {
    root: PathBuf,
}

impl FsReportSink {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ReportSink for FsReportSink {
    fn put_csv(&self, key: &str, errors: &[RowError]) -> Result<String, std::io::Error> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(key);

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["line", "sku", "reason", "raw"])
            .map_err(std::io::Error::other)?;
        for error in errors {
            writer
                .write_record([
                    error.line.to_string().as_str(),
                    error.sku.as_str(),
                    error.reason.as_str(),
                    error.raw.as_str(),
                ])
                .map_err(std::io::Error::other)?;
        }
        let data = writer.into_inner().map_err(std::io::Error::other)?;
        std::fs::write(&path, data)?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_contains_one_row_per_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path().to_path_buf());
        let errors = vec![RowError {
            line: 4,
            sku: "INVALID".to_string(),
            reason: "unparsable price".to_string(),
            raw: "price=abc;sku=INVALID".to_string(),
        }];
        let location = sink.put_csv("import-errors-batch1.csv", &errors).unwrap();

        let content = std::fs::read_to_string(&location).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "line,sku,reason,raw");
        assert!(lines[1].contains("INVALID"));
        assert!(lines[1].contains("unparsable price"));
    }
}
