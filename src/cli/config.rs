use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MatchError;
use crate::page::extractor::ExtractConfig;
use crate::scenario::step::OperationKind;
use crate::scoring::vectors::{HttpVectors, InMemoryVectors, VectorLookup};
use crate::search::config::{MatcherConfig, SearchConfig, SessionPolicy};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "scenario-matcher",
    version,
    about = "Resolve free-text scenario steps to page elements and emit test scripts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: scenario-matcher.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve scenarios against live pages and write a test script
    Resolve {
        /// Path to the scenario suite YAML file
        #[arg(long)]
        suite: String,

        /// Only resolve these scenarios (repeatable; default: all)
        #[arg(long = "scenario")]
        scenarios: Vec<String>,

        /// Directory for generated files
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Also write the locator audit CSV
        #[arg(long)]
        write_locators: bool,

        /// Output format: script or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Script)]
        format: OutputFormat,

        /// How the browser returns to a search state's page
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// States kept per page
        #[arg(long)]
        beam_width: Option<usize>,

        /// Variations kept per kind and per state
        #[arg(long)]
        search_width: Option<usize>,

        /// Append search diagnostics to this JSONL file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Rank the elements of a saved page against one target
    Rank {
        /// HTML file to extract candidates from
        #[arg(long)]
        markup: String,

        /// Free-text target, as written in a step
        #[arg(long)]
        target: String,

        /// Operation kind whose candidates are ranked
        #[arg(long, value_enum, default_value_t = KindArg::Enter)]
        kind: KindArg,
    },

    /// Validate a suite and print its steps grouped by page
    Parse {
        /// Path to the scenario suite YAML file
        #[arg(long)]
        suite: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Script,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    ResetPerBranch,
    Persistent,
}

impl From<PolicyArg> for SessionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::ResetPerBranch => SessionPolicy::ResetPerBranch,
            PolicyArg::Persistent => SessionPolicy::Persistent,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Enter,
    Select,
    Click,
}

impl From<KindArg> for OperationKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Enter => OperationKind::Enter,
            KindArg::Select => OperationKind::Select,
            KindArg::Click => OperationKind::Click,
        }
    }
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `scenario-matcher.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub vectors: VectorsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_program")]
    pub program: String,

    /// Browser server script spoken to over NDJSON
    #[serde(default = "default_script")]
    pub script: String,

    #[serde(default)]
    pub step_delay_ms: u64,

    #[serde(default)]
    pub transition_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script: default_script(),
            step_delay_ms: 0,
            transition_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorsConfig {
    /// HTTP word-vector service
    pub endpoint: Option<String>,

    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// word2vec text file, loaded instead of querying `endpoint`
    pub file: Option<String>,
}

impl Default for VectorsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            dimension: default_dimension(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,

    #[serde(default)]
    pub write_locators: bool,

    pub trace: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_locators: false,
            trace: None,
        }
    }
}

// Serde default helpers
fn default_program() -> String { "node".to_string() }
fn default_script() -> String { "browser_server.js".to_string() }
fn default_dimension() -> usize { 300 }
fn default_output_dir() -> String { "test_script".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("scenario-matcher.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "ignoring malformed config file");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// CLI overrides for the `resolve` command; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ResolveOverrides {
    pub policy: Option<SessionPolicy>,
    pub beam_width: Option<usize>,
    pub search_width: Option<usize>,
    pub output_dir: Option<String>,
    pub write_locators: bool,
    pub trace: Option<String>,
}

impl AppConfig {
    /// Apply CLI overrides on top of the file values.
    pub fn with_overrides(mut self, overrides: &ResolveOverrides) -> Self {
        if let Some(policy) = overrides.policy {
            self.search.policy = policy;
        }
        if let Some(width) = overrides.beam_width {
            self.search.beam_width = width;
        }
        if let Some(width) = overrides.search_width {
            self.search.search_width = width;
        }
        if let Some(dir) = &overrides.output_dir {
            self.output.dir = dir.clone();
        }
        if overrides.write_locators {
            self.output.write_locators = true;
        }
        if overrides.trace.is_some() {
            self.output.trace = overrides.trace.clone();
        }
        self
    }

    /// Validated settings for the matching engine.
    pub fn matcher_config(&self) -> Result<MatcherConfig, MatchError> {
        self.search.validate()?;
        if self.vectors.dimension == 0 {
            return Err(MatchError::Config("vectors.dimension must be at least 1".into()));
        }
        Ok(MatcherConfig {
            search: self.search.clone(),
            extract: self.extract.clone(),
            step_delay: Duration::from_millis(self.browser.step_delay_ms),
            transition_delay: Duration::from_millis(self.browser.transition_delay_ms),
        })
    }
}

/// Build the configured word-vector provider; a local file wins over the service.
pub fn build_vectors(config: &VectorsConfig) -> Result<Box<dyn VectorLookup>, MatchError> {
    if let Some(path) = &config.file {
        let file = File::open(path).map_err(|e| MatchError::Io {
            context: format!("opening vector file {}", path),
            source: e,
        })?;
        let vectors = InMemoryVectors::from_reader(BufReader::new(file))?;
        if vectors.dimension() != config.dimension {
            warn!(
                file = vectors.dimension(),
                configured = config.dimension,
                "vector file dimension differs from config; using the file's"
            );
        }
        return Ok(Box::new(vectors));
    }

    match &config.endpoint {
        Some(endpoint) => Ok(Box::new(HttpVectors::new(endpoint, config.dimension))),
        None => Err(MatchError::Config(
            "no word vector source: set vectors.file or vectors.endpoint".into(),
        )),
    }
}
