use std::collections::{HashMap, HashSet};

use crate::page::element::PageElement;

/// Inverse document frequency of every word seen in one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdfWeights {
    weights: HashMap<String, f64>,
}

impl IdfWeights {
    /// Weight of a word; words outside the snapshot weigh nothing.
    pub fn weight(&self, word: &str) -> f64 {
        self.weights.get(word).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Compute `log_base(N / df(word))` over the attribute and text words of
/// every element, each word counted once per element.
///
/// `base` close to 1 exaggerates differences between rare and common words.
pub fn compute_idf(elements: &[PageElement], base: f64) -> IdfWeights {
    let mut document_frequency: HashMap<&str, usize> = HashMap::new();

    for el in elements {
        let distinct: HashSet<&str> = el
            .attr_words
            .iter()
            .chain(el.text_words.iter())
            .map(String::as_str)
            .collect();
        for word in distinct {
            *document_frequency.entry(word).or_insert(0) += 1;
        }
    }

    let total = elements.len() as f64;
    let weights = document_frequency
        .into_iter()
        .map(|(word, df)| (word.to_string(), (total / df as f64).log(base)))
        .collect();

    IdfWeights { weights }
}
