use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scenario::step::OperationKind;

/// How a locator finds its element in a live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    Id,
    Name,
    /// Partial link text match
    LinkText,
    #[serde(rename = "xpath")]
    XPath,
}

impl LocatorKind {
    /// Suffix of the WebDriver `find_element_by_*` family.
    pub fn strategy(&self) -> &'static str {
        match self {
            LocatorKind::Id => "id",
            LocatorKind::Name => "name",
            LocatorKind::LinkText => "partial_link_text",
            LocatorKind::XPath => "xpath",
        }
    }
}

/// A resolvable reference to one concrete element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub kind: LocatorKind,
    pub value: String,
}

impl Locator {
    pub fn new(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Id, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Name, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::XPath, value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::LinkText, value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind.strategy(), self.value)
    }
}

/// One candidate element of a page snapshot.
///
/// `index` is the element's position among all candidate tags of the
/// snapshot it came from; it has no meaning across snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct PageElement {
    pub index: usize,
    pub tag: String,
    pub kind: OperationKind,
    pub id_attr: Option<String>,
    pub name_attr: Option<String>,
    pub input_type: Option<String>,
    pub positional_path: String,
    pub attr_words: Vec<String>,
    pub text_words: Vec<String>,
    pub attr_vector: Vec<f32>,
    pub text_vector: Option<Vec<f32>>,
}

impl PageElement {
    /// Preferred locator: id, then name (radio buttons share a name, so
    /// they fall through), then the positional path.
    pub fn locator(&self) -> Locator {
        if let Some(id) = non_empty(&self.id_attr) {
            return Locator::id(id);
        }
        if let Some(name) = non_empty(&self.name_attr) {
            if !self.is_radio() {
                return Locator::name(name);
            }
        }
        self.positional_locator()
    }

    pub fn positional_locator(&self) -> Locator {
        Locator::xpath(self.positional_path.clone())
    }

    pub fn is_radio(&self) -> bool {
        self.input_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
    }

    pub fn has_text(&self) -> bool {
        !self.text_words.is_empty()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
