use std::rc::Rc;

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::MatchError;
use crate::page::element::PageElement;
use crate::page::markup::{MarkupDocument, element_text, positional_path};
use crate::scenario::step::OperationKind;
use crate::scoring::idf::{IdfWeights, compute_idf};
use crate::scoring::similarity::SimilarityScorer;
use crate::scoring::vectors::VectorLookup;
use crate::text::words::{filter_words, split_words};

/// `<input type=...>` values that are clicked rather than typed into.
pub const CLICK_INPUT_TYPES: &[&str] = &["radio", "checkbox", "submit", "image", "button"];

/// Attributes whose values describe presentation, not purpose.
pub const EXCLUDED_ATTRIBUTES: &[&str] = &[
    "class",
    "autocorrect",
    "spellcheck",
    "tabindex",
    "style",
    "pattern",
    "aria-hidden",
    "maxlength",
    "minlength",
    "max",
    "min",
    "height",
    "width",
    "size",
    "step",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_click_tags")]
    pub click_tags: Vec<String>,

    #[serde(default = "default_excluded_attributes")]
    pub excluded_attributes: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            click_tags: default_click_tags(),
            excluded_attributes: default_excluded_attributes(),
        }
    }
}

fn default_click_tags() -> Vec<String> {
    ["button", "img", "a"].iter().map(|t| t.to_string()).collect()
}

fn default_excluded_attributes() -> Vec<String> {
    EXCLUDED_ATTRIBUTES.iter().map(|a| a.to_string()).collect()
}

impl ExtractConfig {
    /// Every tag that can yield a candidate.
    pub fn candidate_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = ["input", "textarea", "select"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        for tag in &self.click_tags {
            if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                tags.push(tag.to_lowercase());
            }
        }
        tags
    }

    /// Operation kind an element of this tag/type serves.
    pub fn classify(&self, tag: &str, input_type: Option<&str>) -> Option<OperationKind> {
        match tag {
            "input" => {
                let clicked = input_type
                    .is_some_and(|t| CLICK_INPUT_TYPES.iter().any(|c| c.eq_ignore_ascii_case(t)));
                Some(if clicked {
                    OperationKind::Click
                } else {
                    OperationKind::Enter
                })
            }
            "textarea" => Some(OperationKind::Enter),
            "select" => Some(OperationKind::Select),
            t if self.click_tags.iter().any(|c| c.eq_ignore_ascii_case(t)) => {
                Some(OperationKind::Click)
            }
            _ => None,
        }
    }

    fn is_excluded(&self, attribute: &str) -> bool {
        self.excluded_attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(attribute))
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Turn page markup into classified candidate elements (vectors not yet set).
///
/// Hidden inputs and anchors without text are skipped, as are elements whose
/// attribute words all get filtered away.
pub fn extract_elements(markup: &str, config: &ExtractConfig) -> Vec<PageElement> {
    let doc = MarkupDocument::parse(markup);
    let mut elements = Vec::new();

    for (index, el) in doc.elements_with_tags(&config.candidate_tags()).iter().enumerate() {
        let tag = el.value().name().to_lowercase();
        let input_type = el.value().attr("type").map(str::to_string);
        let text = element_text(el);

        if is_invisible(&tag, input_type.as_deref(), &text) {
            continue;
        }
        let Some(kind) = config.classify(&tag, input_type.as_deref()) else {
            continue;
        };

        let attr_words = attribute_words(el, &text, config);
        if attr_words.is_empty() {
            continue;
        }
        let text_words = text_words(el, &text, &doc);

        elements.push(PageElement {
            index,
            tag,
            kind,
            id_attr: el.value().attr("id").map(str::to_string),
            name_attr: el.value().attr("name").map(str::to_string),
            input_type,
            positional_path: positional_path(el),
            attr_words,
            text_words,
            attr_vector: Vec::new(),
            text_vector: None,
        });
    }

    elements
}

fn is_invisible(tag: &str, input_type: Option<&str>, text: &str) -> bool {
    input_type.is_some_and(|t| t.eq_ignore_ascii_case("hidden")) || (tag == "a" && text.is_empty())
}

fn attribute_words(el: &ElementRef<'_>, text: &str, config: &ExtractConfig) -> Vec<String> {
    let mut words = Vec::new();
    for (name, value) in el.value().attrs() {
        if config.is_excluded(name) || value.is_empty() {
            continue;
        }
        words.extend(split_words(value));
    }
    words.extend(split_words(text));
    filter_words(&words)
}

fn text_words(el: &ElementRef<'_>, text: &str, doc: &MarkupDocument) -> Vec<String> {
    let mut words = Vec::new();
    if let Some(id) = el.value().attr("id").filter(|id| !id.is_empty()) {
        for label in doc.label_texts(id) {
            words.extend(split_words(&label));
        }
    }
    words.extend(split_words(text));
    filter_words(&words)
}

// ============================================================================
// Snapshot
// ============================================================================

/// Scored candidates of one page as it looked at one moment.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    elements: Vec<Rc<PageElement>>,
    idf: IdfWeights,
    fingerprint: String,
}

impl PageSnapshot {
    /// Extract, weight and embed every candidate of `markup`.
    pub fn build(
        markup: &str,
        config: &ExtractConfig,
        lookup: &dyn VectorLookup,
        idf_base: f64,
        text_weight: f64,
    ) -> Result<Self, MatchError> {
        let mut elements = extract_elements(markup, config);
        let idf = compute_idf(&elements, idf_base);

        let vocabulary: Vec<String> = elements
            .iter()
            .flat_map(|e| e.attr_words.iter().chain(e.text_words.iter()).cloned())
            .collect();
        lookup.prefetch(&vocabulary)?;

        let scorer = SimilarityScorer::new(lookup, &idf, text_weight);
        for el in elements.iter_mut() {
            scorer.embed(el)?;
        }

        debug!(
            elements = elements.len(),
            vocabulary = idf.len(),
            "built page snapshot"
        );

        Ok(Self {
            elements: elements.into_iter().map(Rc::new).collect(),
            idf,
            fingerprint: markup_fingerprint(markup),
        })
    }

    pub fn elements(&self) -> &[Rc<PageElement>] {
        &self.elements
    }

    /// Candidates serving one operation kind, in extraction order.
    pub fn of_kind(&self, kind: OperationKind) -> Vec<Rc<PageElement>> {
        self.elements
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    pub fn idf(&self) -> &IdfWeights {
        &self.idf
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

pub fn markup_fingerprint(markup: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(markup.as_bytes());
    format!("{:x}", hasher.finalize())
}
