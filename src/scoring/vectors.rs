use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MatchError;

/// Word embedding lookup.
pub trait VectorLookup {
    fn dimension(&self) -> usize;

    /// Vector of a word, or `None` when the model does not know it.
    fn vector_of(&self, word: &str) -> Result<Option<Vec<f32>>, MatchError>;

    /// Hint that these words are about to be looked up.
    fn prefetch(&self, _words: &[String]) -> Result<(), MatchError> {
        Ok(())
    }
}

// ============================================================================
// In-memory table
// ============================================================================

/// A fixed word table, e.g. loaded from a word2vec text export.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectors {
    dimension: usize,
    table: HashMap<String, Vec<f32>>,
}

impl InMemoryVectors {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            table: HashMap::new(),
        }
    }

    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) -> Result<(), MatchError> {
        let word = word.into();
        if vector.len() != self.dimension {
            return Err(MatchError::VectorDimension {
                word,
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.table.insert(word, vector);
        Ok(())
    }

    pub fn with(mut self, word: &str, vector: &[f32]) -> Result<Self, MatchError> {
        self.insert(word, vector.to_vec())?;
        Ok(self)
    }

    /// Read the word2vec text format: `word v1 v2 ... vn` per line, with an
    /// optional leading `count dimension` header.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, MatchError> {
        let mut vectors: Option<InMemoryVectors> = None;
        let mut first_entry = true;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| MatchError::Io {
                context: "reading word vectors".into(),
                source: e,
            })?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let values = fields
                .map(|f| f.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| {
                    MatchError::Config(format!("word vector file line {}: {}", line_no + 1, e))
                })?;

            let header = first_entry && values.len() == 1 && word.parse::<usize>().is_ok();
            first_entry = false;
            if header {
                vectors = Some(InMemoryVectors::new(values[0] as usize));
                continue;
            }

            let table = vectors.get_or_insert_with(|| InMemoryVectors::new(values.len()));
            table.insert(word, values)?;
        }

        vectors.ok_or_else(|| MatchError::Config("word vector file is empty".into()))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl VectorLookup for InMemoryVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector_of(&self, word: &str) -> Result<Option<Vec<f32>>, MatchError> {
        Ok(self.table.get(word).cloned())
    }
}

// ============================================================================
// HTTP embedding service
// ============================================================================

#[derive(Serialize)]
struct VectorRequest<'a> {
    words: &'a [String],
}

#[derive(Deserialize)]
struct VectorResponse {
    vectors: HashMap<String, Option<Vec<f32>>>,
}

/// Client for an external word-vector service.
///
/// `POST {endpoint}` with `{"words": [...]}`, answered by
/// `{"vectors": {"word": [..] | null}}`. Answers are memoised per word.
pub struct HttpVectors {
    endpoint: String,
    dimension: usize,
    client: reqwest::blocking::Client,
    cache: Mutex<HashMap<String, Option<Vec<f32>>>>,
}

impl HttpVectors {
    pub fn new(endpoint: &str, dimension: usize) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            dimension,
            client: reqwest::blocking::Client::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn fetch(&self, words: &[String]) -> Result<HashMap<String, Option<Vec<f32>>>, MatchError> {
        debug!(count = words.len(), endpoint = %self.endpoint, "fetching word vectors");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VectorRequest { words })
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| MatchError::VectorService {
                context: format!("POST {}", self.endpoint),
                source: e,
            })?;

        let body: VectorResponse = response.json().map_err(|e| MatchError::VectorService {
            context: "decoding vector response".into(),
            source: e,
        })?;

        for (word, vector) in &body.vectors {
            if let Some(v) = vector {
                if v.len() != self.dimension {
                    return Err(MatchError::VectorDimension {
                        word: word.clone(),
                        expected: self.dimension,
                        actual: v.len(),
                    });
                }
            }
        }
        Ok(body.vectors)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<Vec<f32>>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VectorLookup for HttpVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector_of(&self, word: &str) -> Result<Option<Vec<f32>>, MatchError> {
        if let Some(hit) = self.lock_cache().get(word) {
            return Ok(hit.clone());
        }
        let fetched = self.fetch(&[word.to_string()])?;
        let vector = fetched.get(word).cloned().flatten();
        self.lock_cache().insert(word.to_string(), vector.clone());
        Ok(vector)
    }

    fn prefetch(&self, words: &[String]) -> Result<(), MatchError> {
        let missing: Vec<String> = {
            let cache = self.lock_cache();
            let mut missing: Vec<String> = words
                .iter()
                .filter(|w| !cache.contains_key(w.as_str()))
                .cloned()
                .collect();
            missing.sort();
            missing.dedup();
            missing
        };
        if missing.is_empty() {
            return Ok(());
        }

        let mut fetched = self.fetch(&missing)?;
        let mut cache = self.lock_cache();
        for word in missing {
            let vector = fetched.remove(&word).flatten();
            cache.insert(word, vector);
        }
        Ok(())
    }
}
