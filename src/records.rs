//! Input and output records.
//!
//! Batch input is a stream of [`ExtractInput`] records, each naming a
//! document either by its `text` or by the `path` of a text file. Each input
//! produces exactly one [`ExtractOutput`]. A record we cannot process is
//! reported as [`WorkStatus::Failed`] rather than aborting the run, and
//! [`OutputCounters`] decides at the end whether too many records failed.
//!
//! [`PredictionRecord`] is the per-document JSON file written next to a
//! separately computed document classification.

use std::sync::{Arc, Mutex};

use futures::StreamExt as _;
use schemars::JsonSchema;

use crate::{
    async_utils::{
        BoxedStream,
        io::{JsonObject, read_text_lossy},
    },
    expiry::{ExpiryDate, ExtractError, Extractor},
    prelude::*,
    ui::Ui,
};

/// A document to search for an expiry date.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ExtractInput {
    /// The unique ID of the record.
    pub id: Value,

    /// The document text. Mutually exclusive with `path`.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub text: Option<Value>,

    /// A UTF-8 text file containing the document. Mutually exclusive with
    /// `text`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// The document type, if it has already been classified. Copied to the
    /// output.
    #[serde(default)]
    pub report_type: Option<String>,
}

/// Where to find a record's document.
#[derive(Debug)]
enum Document<'a> {
    /// Inline text, not yet checked to be a string.
    Text(&'a Value),
    /// A text file.
    Path(&'a Path),
}

impl ExtractInput {
    /// Figure out where our document is.
    ///
    /// CSV input can't leave a field out, so empty strings count as absent.
    fn document(&self) -> Result<Document<'_>, ExtractError> {
        let path = self
            .path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty());
        let text = self
            .text
            .as_ref()
            .filter(|text| !text.is_null())
            .filter(|text| path.is_none() || text.as_str() != Some(""));
        match (text, path) {
            (Some(text), None) => Ok(Document::Text(text)),
            (None, Some(path)) => Ok(Document::Path(path)),
            (None, None) => Err(ExtractError::InvalidRecord(
                "expected either a `text` or a `path` field",
            )),
            (Some(_), Some(_)) => Err(ExtractError::InvalidRecord(
                "`text` and `path` cannot both be given",
            )),
        }
    }

    /// Our report type, ignoring empty CSV fields.
    fn report_type(&self) -> Option<String> {
        self.report_type
            .as_deref()
            .filter(|report_type| !report_type.is_empty())
            .map(str::to_owned)
    }

    /// Find the expiry date of our document.
    #[instrument(level = "debug", skip_all, fields(id = %self.id))]
    pub async fn process(self, extractor: &Extractor) -> ExtractOutput {
        let report_type = self.report_type();
        let result = match self.document() {
            Ok(Document::Text(text)) => extractor.extract_value(text).map_err(Into::into),
            Ok(Document::Path(path)) => read_text_lossy(Some(path))
                .await
                .map(|text| extractor.extract(&text)),
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(expiring_date) => ExtractOutput {
                id: self.id,
                status: WorkStatus::Ok,
                errors: vec![],
                report_type,
                expiring_date: Some(expiring_date),
            },
            Err(err) => {
                warn!(id = %self.id, "could not process record: {err:#}");
                ExtractOutput::new_failed(self.id, report_type, format!("{err:#}"))
            }
        }
    }
}

/// Output status of a record.
#[derive(Clone, Copy, Debug, Deserialize, JsonSchema, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    /// The record was processed. This includes records where no date was
    /// found.
    Ok,

    /// The record could not be processed.
    Failed,
}

/// The expiry date found for an [`ExtractInput`].
#[derive(Clone, Debug, Deserialize, JsonSchema, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtractOutput {
    /// The ID of the input record.
    pub id: Value,

    /// Did we process this record?
    pub status: WorkStatus,

    /// Any errors that occurred during processing.
    pub errors: Vec<String>,

    /// The document type, copied from the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,

    /// The expiry date as `YYYY-MM-DD`, or `Not found`. Absent if the record
    /// failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiring_date: Option<ExpiryDate>,
}

impl ExtractOutput {
    /// Create a new failed output record.
    pub fn new_failed(id: Value, report_type: Option<String>, error: String) -> Self {
        Self {
            id,
            status: WorkStatus::Failed,
            errors: vec![error],
            report_type,
            expiring_date: None,
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).context("failed to serialize output")
    }
}

/// Parse a raw input record and process it.
///
/// A record we can't even find an `id` in is a hard error, because we would
/// have no way to report its failure.
pub async fn process_record(extractor: &Extractor, value: Value) -> Result<ExtractOutput> {
    let id = value
        .get("id")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("input record has no `id` field: {value}"))?;
    match serde_json::from_value::<ExtractInput>(value) {
        Ok(input) => Ok(input.process(extractor).await),
        Err(err) => {
            warn!(%id, "could not parse input record: {err}");
            Ok(ExtractOutput::new_failed(
                id,
                None,
                format!("invalid input record: {err}"),
            ))
        }
    }
}

/// Counts of processed records.
#[derive(Clone, Debug, Default)]
pub struct OutputCounters {
    /// How many records did we process?
    pub total_record_count: usize,

    /// How many records did we fail to process?
    pub failure_count: usize,

    /// How many records had an expiry date?
    pub found_count: usize,
}

impl OutputCounters {
    /// Wrap a stream of outputs, counting them as they go by.
    pub fn wrap_stream(
        stream: BoxedStream<Result<ExtractOutput>>,
    ) -> (BoxedStream<Result<ExtractOutput>>, Arc<Mutex<OutputCounters>>) {
        let counters = Arc::new(Mutex::new(Self::default()));
        let counters_clone = counters.clone();
        let stream = stream
            .map(move |output| {
                let output = output?;
                counters_clone.update(&output);
                Ok(output)
            })
            .boxed();
        (stream, counters)
    }

    /// Record one output.
    pub fn record(&mut self, output: &ExtractOutput) {
        self.total_record_count += 1;
        match (output.status, output.expiring_date) {
            (WorkStatus::Failed, _) => self.failure_count += 1,
            (WorkStatus::Ok, Some(ExpiryDate::Found(_))) => self.found_count += 1,
            (WorkStatus::Ok, _) => {}
        }
    }

    /// The fraction of records which failed.
    pub fn failure_rate(&self) -> f32 {
        if self.total_record_count == 0 {
            0.0
        } else {
            self.failure_count as f32 / self.total_record_count as f32
        }
    }

    /// Report our counts, and fail if more than `allowed_failure_rate` of
    /// records failed.
    pub fn finish(&self, ui: &Ui, allowed_failure_rate: f32) -> Result<()> {
        ui.display_message(
            "📅",
            &format!(
                "Found expiry dates in {}/{} records",
                self.found_count, self.total_record_count
            ),
        );
        let failure_rate = self.failure_rate();
        if failure_rate > allowed_failure_rate {
            return Err(anyhow::anyhow!(
                "{}/{} ({:.2}%) of outputs were failures, but only {:.2}% were allowed",
                self.failure_count,
                self.total_record_count,
                failure_rate * 100.0,
                allowed_failure_rate * 100.0
            ));
        }
        if self.failure_count > 0 {
            ui.display_message(
                "❌",
                &format!("{} records could not be processed", self.failure_count),
            );
        }
        Ok(())
    }
}

/// We want to put methods on `Mutex<OutputCounters>`, because that's the type
/// we share with the stream, so we need an extension trait.
pub trait OutputCountersExt {
    /// Update counters for an output record.
    fn update(&self, output: &ExtractOutput);

    /// Report counts. See [`OutputCounters::finish`].
    fn finish(&self, ui: &Ui, allowed_failure_rate: f32) -> Result<()>;
}

impl OutputCountersExt for Mutex<OutputCounters> {
    fn update(&self, output: &ExtractOutput) {
        // Hold a sync lock, but just for an instant to update counters.
        self.lock().expect("lock poisoned").record(output);
    }

    fn finish(&self, ui: &Ui, allowed_failure_rate: f32) -> Result<()> {
        let counters = self.lock().expect("lock poisoned").to_owned();
        counters.finish(ui, allowed_failure_rate)
    }
}

/// A per-document prediction file, as read by the document viewer.
///
/// Fields we don't know about are preserved when we update a file.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct PredictionRecord {
    /// The document type, from a separate classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,

    /// The expiry date as `YYYY-MM-DD`, or `Not found`.
    #[serde(default)]
    pub expiring_date: ExpiryDate,

    /// Any other fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}
