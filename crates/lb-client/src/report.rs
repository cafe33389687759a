//! Saving downloaded Excel reports.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use lb_api_types::ReportKind;

/// A downloaded report before it hits the disk.
#[derive(Debug, Clone)]
pub struct Report {
    pub kind: ReportKind,
    /// Filename from `Content-Disposition`, if the server sent one.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl Report {
    /// `Content-Disposition` name, else `{kind}_report_{YYYYMMDD}.xlsx`.
    pub fn file_name(&self, today: NaiveDate) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| default_file_name(self.kind, today))
    }

    /// Write the report into `dir` and return the full path.
    pub fn save(&self, dir: &Path, today: NaiveDate) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(today));
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "report saved");
        Ok(path)
    }

    /// Write the report to an explicit file path.
    pub fn save_as(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.bytes)
    }
}

pub fn default_file_name(kind: ReportKind, today: NaiveDate) -> String {
    format!("{}_report_{}.xlsx", kind.as_str(), today.format("%Y%m%d"))
}

/// Extract a safe file name from a `Content-Disposition` header value.
///
/// Prefers `filename*=UTF-8''...` over `filename=...`. Any directory part is
/// stripped.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let value = value.trim();
                let encoded = value.split_once("''").map(|(_, v)| v).unwrap_or(value);
                extended = Some(percent_decode(encoded));
            }
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            _ => {}
        }
    }
    let raw = extended.or(plain)?;
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn default_name_uses_kind_and_date() {
        assert_eq!(default_file_name(ReportKind::Leads, day()), "leads_report_20240501.xlsx");
        assert_eq!(
            default_file_name(ReportKind::Appointments, day()),
            "appointments_report_20240501.xlsx"
        );
    }

    #[test]
    fn disposition_variants() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="leads_2024.xlsx""#).as_deref(),
            Some("leads_2024.xlsx")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''relat%C3%B3rio.xlsx").as_deref(),
            Some("relatório.xlsx")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn save_writes_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let report = Report {
            kind: ReportKind::Leads,
            filename: None,
            bytes: b"PK\x03\x04".to_vec(),
        };
        let path = report.save(&dir.path().join("out"), day()).unwrap();
        assert!(path.ends_with("leads_report_20240501.xlsx"));
        assert_eq!(std::fs::read(path).unwrap(), b"PK\x03\x04");
    }
}
