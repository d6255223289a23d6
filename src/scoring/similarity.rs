use crate::error::MatchError;
use crate::page::element::PageElement;
use crate::scoring::idf::IdfWeights;
use crate::scoring::vectors::VectorLookup;

/// Component value substituted for words the model does not know.
pub const NEUTRAL_COMPONENT: f32 = 0.5;

/// Scores free-text queries against the elements of one snapshot.
pub struct SimilarityScorer<'a> {
    lookup: &'a dyn VectorLookup,
    idf: &'a IdfWeights,
    text_weight: f64,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(lookup: &'a dyn VectorLookup, idf: &'a IdfWeights, text_weight: f64) -> Self {
        Self {
            lookup,
            idf,
            text_weight,
        }
    }

    /// Fill in the attribute and text vectors of an element.
    pub fn embed(&self, el: &mut PageElement) -> Result<(), MatchError> {
        el.attr_vector = self.weighted_vector(&el.attr_words)?;
        el.text_vector = if el.text_words.is_empty() {
            None
        } else {
            Some(self.weighted_vector(&el.text_words)?)
        };
        Ok(())
    }

    /// Unweighted mean of the query words' vectors.
    ///
    /// Query words are not part of the page corpus, so IDF does not apply.
    pub fn query_vector(&self, words: &[String]) -> Result<Vec<f32>, MatchError> {
        let weights = vec![1.0; words.len()];
        self.average(words, &weights)
    }

    /// Cosine against the attribute vector, blended with the text vector
    /// when the element has text: `(attr + w * text) / (1 + w)`.
    pub fn similarity(&self, query: &[f32], el: &PageElement) -> f64 {
        let attr = cosine_similarity(query, &el.attr_vector);
        match &el.text_vector {
            Some(text) if el.has_text() => {
                let text = cosine_similarity(query, text);
                (attr + self.text_weight * text) / (1.0 + self.text_weight)
            }
            _ => attr,
        }
    }

    fn weighted_vector(&self, words: &[String]) -> Result<Vec<f32>, MatchError> {
        let weights: Vec<f64> = words.iter().map(|w| self.idf.weight(w)).collect();
        self.average(words, &weights)
    }

    /// Weighted mean; a zero total weight yields the zero vector.
    fn average(&self, words: &[String], weights: &[f64]) -> Result<Vec<f32>, MatchError> {
        let dimension = self.lookup.dimension();
        let mut sum = vec![0.0f64; dimension];
        let total: f64 = weights.iter().sum();

        if words.is_empty() || total == 0.0 || !total.is_finite() {
            return Ok(vec![0.0; dimension]);
        }

        for (word, weight) in words.iter().zip(weights) {
            let vector = self
                .lookup
                .vector_of(word)?
                .unwrap_or_else(|| vec![NEUTRAL_COMPONENT; dimension]);
            if vector.len() != dimension {
                return Err(MatchError::VectorDimension {
                    word: word.clone(),
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            for (acc, v) in sum.iter_mut().zip(&vector) {
                *acc += weight * f64::from(*v);
            }
        }

        Ok(sum.into_iter().map(|s| (s / total) as f32).collect())
    }
}

/// Cosine similarity; 0.0 when either side has zero norm or the result is
/// not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    if cosine.is_finite() { cosine } else { 0.0 }
}
