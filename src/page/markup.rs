use scraper::{ElementRef, Html, Selector};

/// Parsed page markup with the two queries element extraction needs.
pub struct MarkupDocument {
    html: Html,
}

impl MarkupDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// All elements whose tag is in `tags`, in document order.
    pub fn elements_with_tags(&self, tags: &[String]) -> Vec<ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| tags.iter().any(|t| t.eq_ignore_ascii_case(el.value().name())))
            .collect()
    }

    /// Text of every `<label for="id">` on the page.
    pub fn label_texts(&self, id: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse("label[for]") else {
            return Vec::new();
        };
        self.html
            .select(&selector)
            .filter(|label| label.value().attr("for") == Some(id))
            .map(|label| label.text().collect::<String>())
            .collect()
    }

    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
    }
}

/// Own text content of an element, descendants included.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// Absolute positional path of an element, e.g. `/html/body/form/input[2]`.
///
/// At every level the element is indexed among same-tag siblings only when
/// more than one such sibling exists.
pub fn positional_path(el: &ElementRef<'_>) -> String {
    let mut components = Vec::new();
    let mut child = **el;

    while let Some(parent) = child.parent() {
        let Some(name) = child.value().as_element().map(|e| e.name()) else {
            break;
        };
        let siblings: Vec<_> = parent
            .children()
            .filter(|n| n.value().as_element().is_some_and(|e| e.name() == name))
            .collect();

        if siblings.len() == 1 {
            components.push(name.to_string());
        } else {
            let position = siblings
                .iter()
                .position(|s| s.id() == child.id())
                .map_or(1, |p| p + 1);
            components.push(format!("{}[{}]", name, position));
        }
        child = parent;
    }

    components.reverse();
    format!("/{}", components.join("/"))
}
