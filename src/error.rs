use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    /// Browser server subprocess failed to spawn
    #[error("Failed to spawn {program} (is it installed?): {source}")]
    SubprocessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the browser server failed
    #[error("Browser session I/O: {0}")]
    SessionIO(String),

    /// Browser server answered, but not with what the command expects
    #[error("Browser session command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    /// A single interaction (enter/select/click) could not be performed
    #[error("Interaction '{command}' failed: {error}")]
    Interaction { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Step text did not match the scenario grammar
    #[error("Invalid step in scenario '{scenario}': {raw}")]
    InvalidStep { scenario: String, raw: String },

    #[error("Scenario '{scenario}' must start with an open step")]
    MissingOpen { scenario: String },

    #[error("Scenario '{scenario}' has no steps")]
    EmptyScenario { scenario: String },

    #[error("Failed to load suite {path}: {reason}")]
    SuiteLoad { path: String, reason: String },

    #[error("Word vector service error ({context}): {source}")]
    VectorService {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Vector for '{word}' has dimension {actual}, expected {expected}")]
    VectorDimension {
        word: String,
        expected: usize,
        actual: usize,
    },

    #[error("No page variation could be built at depth {depth}")]
    SearchExhausted { depth: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl MatchError {
    /// Recoverable during exploration: the step is treated as a no-op.
    pub fn is_interaction(&self) -> bool {
        matches!(self, MatchError::Interaction { .. })
    }
}
