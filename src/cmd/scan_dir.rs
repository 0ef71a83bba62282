//! The `scan-dir` subcommand.
//!
//! Looks at every `.txt` file in a directory of extracted document text, and
//! writes a prediction file for each one.

use clap::Args;

use crate::{
    async_utils::io::{read_json_or_toml, read_text_lossy, write_json_pretty},
    config::ExtractorOpts,
    expiry::Extractor,
    prelude::*,
    records::PredictionRecord,
    ui::{ProgressConfig, Ui},
};

/// Scan-dir command line arguments.
#[derive(Debug, Args)]
pub struct ScanDirOpts {
    /// Directory containing extracted `.txt` files.
    pub input_dir: PathBuf,

    /// Directory to write `<name>.json` prediction files to. Existing files
    /// keep their other fields, such as `report_type`.
    #[clap(long, default_value = "preds")]
    pub preds_dir: PathBuf,

    #[clap(flatten)]
    pub extractor_opts: ExtractorOpts,
}

/// Run the `scan-dir` subcommand.
#[instrument(level = "debug", skip_all, fields(input_dir = %opts.input_dir.display()))]
pub async fn cmd_scan_dir(ui: Ui, opts: &ScanDirOpts) -> Result<()> {
    let extractor = opts.extractor_opts.build_extractor().await?;
    let paths = list_text_files(&opts.input_dir).await?;
    tokio::fs::create_dir_all(&opts.preds_dir)
        .await
        .with_context(|| format!("Failed to create directory {:?}", opts.preds_dir))?;

    let pb = ui.new_from_count(
        &ProgressConfig {
            emoji: "📂",
            msg: "Scanning text files",
            done_msg: "Scanned text files",
        },
        Some(paths.len()),
    );
    let mut found = 0;
    for path in &paths {
        let record = predict_file(&extractor, path, &opts.preds_dir).await?;
        if record.expiring_date.date().is_some() {
            found += 1;
        }
        pb.inc(1);
    }
    pb.finish_using_style();

    ui.display_message(
        "📅",
        &format!("Found expiry dates in {found}/{} files", paths.len()),
    );
    Ok(())
}

/// Every `.txt` file directly inside `dir`, sorted by name.
async fn list_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory {:?}", dir))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to read directory {:?}", dir))?
    {
        let path = entry.path();
        let is_txt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_txt && path.is_file() {
            paths.push(path);
        } else {
            trace!(path = %path.display(), "skipping non-text entry");
        }
    }
    paths.sort();
    Ok(paths)
}

/// Extract the expiry date from `path`, and update its prediction file.
#[instrument(level = "debug", skip(extractor, preds_dir), fields(path = %path.display()))]
async fn predict_file(
    extractor: &Extractor,
    path: &Path,
    preds_dir: &Path,
) -> Result<PredictionRecord> {
    let stem = path
        .file_stem()
        .with_context(|| format!("No file name in {:?}", path))?;
    let mut pred_name = stem.to_owned();
    pred_name.push(".json");
    let pred_path = preds_dir.join(pred_name);

    let mut record = if pred_path.is_file() {
        match read_json_or_toml::<PredictionRecord>(&pred_path).await {
            Ok(record) => record,
            Err(err) => {
                warn!(pred_path = %pred_path.display(), "replacing unreadable prediction: {err:#}");
                PredictionRecord::default()
            }
        }
    } else {
        PredictionRecord::default()
    };

    let text = read_text_lossy(Some(path)).await?;
    record.expiring_date = extractor.extract(&text);
    debug!(expiring_date = %record.expiring_date, pred_path = %pred_path.display(), "writing prediction");
    write_json_pretty(&pred_path, &record).await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;

    #[tokio::test]
    async fn existing_predictions_are_merged() {
        let extractor = ExtractorConfig::default()
            .build(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
            .unwrap();
        let input_dir = tempfile::tempdir().unwrap();
        let preds_dir = tempfile::tempdir().unwrap();
        let txt = input_dir.path().join("report.v2.txt");
        tokio::fs::write(&txt, "Geldig tot: 31/12/2030.").await.unwrap();
        tokio::fs::write(
            preds_dir.path().join("report.v2.json"),
            r#"{"report_type": "EPC", "expiring_date": "None"}"#,
        )
        .await
        .unwrap();

        let record = predict_file(&extractor, &txt, preds_dir.path()).await.unwrap();
        assert_eq!(record.report_type.as_deref(), Some("EPC"));
        assert_eq!(record.expiring_date.to_string(), "2030-12-31");

        let written = tokio::fs::read_to_string(preds_dir.path().join("report.v2.json"))
            .await
            .unwrap();
        assert_eq!(
            written,
            "{\n    \"report_type\": \"EPC\",\n    \"expiring_date\": \"2030-12-31\"\n}\n"
        );
    }

    #[tokio::test]
    async fn null_and_unreadable_predictions_do_not_stop_the_scan() {
        let extractor = ExtractorConfig::default()
            .build(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
            .unwrap();
        let input_dir = tempfile::tempdir().unwrap();
        let preds_dir = tempfile::tempdir().unwrap();
        for name in ["a", "b"] {
            tokio::fs::write(input_dir.path().join(format!("{name}.txt")), "Geldig tot: 31/12/2030.")
                .await
                .unwrap();
        }
        tokio::fs::write(
            preds_dir.path().join("a.json"),
            r#"{"report_type": "EPC", "expiring_date": null}"#,
        )
        .await
        .unwrap();
        tokio::fs::write(preds_dir.path().join("b.json"), "{ not json")
            .await
            .unwrap();

        let a = predict_file(&extractor, &input_dir.path().join("a.txt"), preds_dir.path())
            .await
            .unwrap();
        assert_eq!(a.report_type.as_deref(), Some("EPC"));
        assert_eq!(a.expiring_date.to_string(), "2030-12-31");

        let b = predict_file(&extractor, &input_dir.path().join("b.txt"), preds_dir.path())
            .await
            .unwrap();
        assert_eq!(b.report_type, None);
        assert_eq!(b.expiring_date.to_string(), "2030-12-31");
        let written = tokio::fs::read_to_string(preds_dir.path().join("b.json"))
            .await
            .unwrap();
        assert_eq!(written, "{\n    \"expiring_date\": \"2030-12-31\"\n}\n");
    }

    #[tokio::test]
    async fn only_text_files_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.TXT", "c.pdf"] {
            tokio::fs::write(dir.path().join(name), "").await.unwrap();
        }
        tokio::fs::create_dir(dir.path().join("d.txt")).await.unwrap();
        let names = list_text_files(dir.path())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);
    }
}
