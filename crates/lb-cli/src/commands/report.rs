use std::path::{Path, PathBuf};

use chrono::Local;

use lb_client::ApiClient;
use lb_core::api::ReportKind;

use super::friendly_error;

/// Run the `report` subcommand: download the spreadsheet and write it to
/// `output`, or into `reports_dir` under the server's filename.
pub async fn run(
    client: &ApiClient,
    kind: ReportKind,
    output: Option<PathBuf>,
    reports_dir: &Path,
) -> anyhow::Result<()> {
    let path = download(client, kind, output, reports_dir).await?;
    println!("Saved {} report to {}", kind.as_str(), path.display());
    Ok(())
}

pub async fn download(
    client: &ApiClient,
    kind: ReportKind,
    output: Option<PathBuf>,
    reports_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let report = client.download_report(kind).await.map_err(friendly_error)?;
    let path = match output {
        Some(path) => {
            report.save_as(&path)?;
            path
        }
        None => report.save(reports_dir, Local::now().date_naive())?,
    };
    Ok(path)
}
