use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use portal_api::prelude::*;
use tracing::info;

use crate::cli::AppContext;

pub async fn handle(ctx: &AppContext, args: super::DownloadArgs) -> Result<()> {
    let request = ctx.client.download(args.key.clone());
    info!(url = %request.url()?, "downloading");
    let bytes = request
        .bytes()
        .await
        .with_context(|| format!("download of {}", args.key))?;

    let path = destination(&args.key, args.dest.as_deref());
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    ctx.output
        .emit_text(&format!("saved {} bytes to {}", bytes.len(), path.display()))
}

/// `dest` if it names a file, `dest/<label>.csv` if it is a directory,
/// `<label>.csv` in the working directory if absent.
pub fn destination(key: &str, dest: Option<&Path>) -> PathBuf {
    let file_name = download_file_name(&derive_label(key));
    match dest {
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(file) => file.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_defaults_to_label_file_name() {
        assert_eq!(
            destination("HR_Employees", None),
            PathBuf::from("HR_Employees.csv")
        );
        assert_eq!(
            destination("Bloomberg_User_ReportTable", None),
            PathBuf::from("Bloomberg_User_ReportTable.csv")
        );
    }

    #[test]
    fn destination_directory_or_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            destination("HR_Employees", Some(dir.path())),
            dir.path().join("HR_Employees.csv")
        );
        let file = dir.path().join("hr.csv");
        assert_eq!(destination("HR_Employees", Some(&file)), file);
    }
}
