//! Extraction settings.
//!
//! The built-in settings live in `config/default_config.toml`. Users can
//! override any part of them with a TOML or JSON file of the same shape, and
//! a few values can also be overridden on the command line.

use std::collections::BTreeMap;

use clap::Args;
use schemars::JsonSchema;

use crate::{
    async_utils::io::read_json_or_toml,
    expiry::{
        CandidateScanner, DateParser, ExtractError, Extractor, KeywordContext, Locale,
    },
    prelude::*,
};

/// The built-in configuration, as TOML.
pub const DEFAULT_CONFIG: &str = include_str!("config/default_config.toml");

/// Complete extraction settings.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfig {
    /// How many characters on each side of a date to search for an expiry
    /// keyword.
    pub window: usize,

    /// Locales whose keywords and month names we use.
    pub locales: Vec<Locale>,

    /// Expiry keywords for each locale. Matched case-insensitively, as
    /// substrings.
    pub keywords: BTreeMap<Locale, Vec<String>>,

    /// Regular expressions matching date-shaped text.
    pub patterns: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("failed to parse built-in configuration")
    }
}

impl ExtractorConfig {
    /// Load the built-in configuration, overridden by the file at `path`.
    #[instrument(level = "debug")]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::default();
        match path {
            Some(path) => {
                let file = read_json_or_toml::<ExtractorConfigFile>(path).await?;
                Ok(config.merge(file))
            }
            None => Ok(config),
        }
    }

    /// Apply the settings in `file` on top of ours.
    ///
    /// Keyword lists replace ours locale by locale, so a file which only lists
    /// Dutch keywords keeps the built-in French ones.
    pub fn merge(mut self, file: ExtractorConfigFile) -> Self {
        if let Some(window) = file.window {
            self.window = window;
        }
        if let Some(locales) = file.locales {
            self.locales = locales;
        }
        if let Some(keywords) = file.keywords {
            self.keywords.extend(keywords);
        }
        if let Some(patterns) = file.patterns {
            self.patterns = patterns;
        }
        self
    }

    /// Compile these settings into an [`Extractor`].
    ///
    /// Fails if a pattern does not compile or if no locales are configured.
    pub fn build(&self, reference_date: NaiveDate) -> Result<Extractor, ExtractError> {
        if self.locales.is_empty() {
            return Err(ExtractError::NoLocales);
        }
        let scanner = CandidateScanner::new(&self.patterns[..])?;
        let keywords = self
            .locales
            .iter()
            .filter_map(|locale| self.keywords.get(locale))
            .flatten();
        let context = KeywordContext::new(keywords, self.window);
        let parser = DateParser::new(&self.locales, reference_date);
        debug!(
            window = context.window(),
            locales = ?self.locales,
            patterns = self.patterns.len(),
            "built extractor"
        );
        Ok(Extractor::new(scanner, context, parser))
    }
}

/// A user configuration file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfigFile {
    /// How many characters on each side of a date to search for an expiry
    /// keyword.
    #[serde(default)]
    pub window: Option<usize>,

    /// Locales whose keywords and month names we use.
    #[serde(default)]
    pub locales: Option<Vec<Locale>>,

    /// Expiry keywords, replacing the built-in list for each locale given.
    #[serde(default)]
    pub keywords: Option<BTreeMap<Locale, Vec<String>>>,

    /// Regular expressions matching date-shaped text. Replaces the built-in
    /// list entirely.
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
}

/// Command-line options for building an [`Extractor`].
#[derive(Args, Clone, Debug, Default)]
pub struct ExtractorOpts {
    /// A TOML or JSON file overriding the built-in extraction settings.
    #[clap(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Characters to search on each side of a date for an expiry keyword.
    #[clap(long)]
    pub window: Option<usize>,

    /// Fill in missing years from this date (YYYY-MM-DD). Defaults to today.
    #[clap(long, value_name = "DATE")]
    pub reference_date: Option<NaiveDate>,
}

impl ExtractorOpts {
    /// Load our configuration and build an [`Extractor`].
    #[instrument(level = "debug", skip_all)]
    pub async fn build_extractor(&self) -> Result<Extractor> {
        let mut config = ExtractorConfig::load(self.config_path.as_deref()).await?;
        if let Some(window) = self.window {
            config.window = window;
        }
        let reference_date = self
            .reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        config
            .build(reference_date)
            .context("invalid extraction settings")
    }
}
