mod common;

use scenario_matcher::page::element::{Locator, LocatorKind};
use scenario_matcher::page::extractor::{ExtractConfig, PageSnapshot, extract_elements, markup_fingerprint};
use scenario_matcher::page::markup::MarkupDocument;
use scenario_matcher::scenario::step::OperationKind;

use crate::common::{LOGIN_PAGE, vectors};

const FORM: &str = r#"<html><head><title> Sign up </title></head><body>
<form id="signup">
  <label for="mail">E-mail address</label>
  <input type="email" id="mail" name="userMail" class="wide">
  <input type="hidden" name="csrfToken" value="abc">
  <input type="radio" name="plan" value="free">
  <input type="radio" name="plan" value="paid">
  <input type="checkbox" name="newsletter">
  <select name="country"><option>Japan</option></select>
  <textarea name="comment"></textarea>
  <a href="/terms"></a>
  <a href="/help">Need help?</a>
  <button type="submit">Create account</button>
</form>
</body></html>"#;

fn sorted(words: &[String]) -> Vec<String> {
    let mut words = words.to_vec();
    words.sort();
    words
}

#[test]
fn hidden_inputs_and_empty_anchors_are_skipped() {
    let elements = extract_elements(FORM, &ExtractConfig::default());
    let names: Vec<Option<&str>> = elements.iter().map(|e| e.name_attr.as_deref()).collect();

    assert!(!names.contains(&Some("csrfToken")));
    assert!(!elements.iter().any(|e| e.positional_path.ends_with("a[1]")));
    assert_eq!(elements.len(), 8);
}

#[test]
fn elements_are_classified_by_tag_and_type() {
    let elements = extract_elements(FORM, &ExtractConfig::default());
    let kinds: Vec<(String, OperationKind)> =
        elements.iter().map(|e| (e.tag.clone(), e.kind)).collect();

    assert_eq!(kinds[0], ("input".to_string(), OperationKind::Enter));
    assert_eq!(kinds[1].1, OperationKind::Click); // radio
    assert_eq!(kinds[3].1, OperationKind::Click); // checkbox
    assert_eq!(kinds[4], ("select".to_string(), OperationKind::Select));
    assert_eq!(kinds[5], ("textarea".to_string(), OperationKind::Enter));
    assert_eq!(kinds[6], ("a".to_string(), OperationKind::Click));
    assert_eq!(kinds[7], ("button".to_string(), OperationKind::Click));
}

#[test]
fn index_counts_every_candidate_tag_including_skipped_ones() {
    let elements = extract_elements(FORM, &ExtractConfig::default());
    let indexes: Vec<usize> = elements.iter().map(|e| e.index).collect();
    // hidden input is candidate 1, empty anchor candidate 7; labels and forms are not candidates
    assert_eq!(indexes, vec![0, 2, 3, 4, 5, 6, 8, 9]);
}

#[test]
fn attribute_and_label_words() {
    let elements = extract_elements(FORM, &ExtractConfig::default());
    let mail = &elements[0];

    // class is excluded, type/id/name are not
    assert_eq!(sorted(&mail.attr_words), vec!["email", "mail", "mail", "user"]);
    assert_eq!(mail.text_words, vec!["mail", "address"]);

    let help = elements.iter().find(|e| e.tag == "a").unwrap();
    assert_eq!(sorted(&help.attr_words), vec!["help", "help", "need"]);
    assert_eq!(help.text_words, vec!["need", "help"]);
}

#[test]
fn locator_prefers_id_then_name_except_radio() {
    let elements = extract_elements(FORM, &ExtractConfig::default());

    assert_eq!(elements[0].locator(), Locator::id("mail"));
    assert_eq!(elements[4].locator(), Locator::name("country"));

    let radio = &elements[1];
    assert!(radio.is_radio());
    assert_eq!(radio.locator().kind, LocatorKind::XPath);
    assert_eq!(radio.locator().value, "/html/body/form/input[3]");

    let button = &elements[7];
    assert_eq!(button.locator(), Locator::xpath("/html/body/form/button"));
}

#[test]
fn positional_path_indexes_only_repeated_siblings() {
    let elements = extract_elements(FORM, &ExtractConfig::default());
    let paths: Vec<&str> = elements.iter().map(|e| e.positional_path.as_str()).collect();

    assert_eq!(paths[0], "/html/body/form/input[1]");
    assert_eq!(paths[2], "/html/body/form/input[4]");
    assert_eq!(paths[4], "/html/body/form/select");
    assert_eq!(paths[5], "/html/body/form/textarea");
    assert_eq!(paths[6], "/html/body/form/a[2]");
}

#[test]
fn elements_without_attribute_words_are_dropped() {
    let markup = r#"<html><body><input class="x" style="y"><input name="city"></body></html>"#;
    let elements = extract_elements(markup, &ExtractConfig::default());
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].name_attr.as_deref(), Some("city"));
    assert_eq!(elements[0].index, 1);
}

#[test]
fn click_tags_are_configurable() {
    let config = ExtractConfig {
        click_tags: vec!["button".into()],
        ..ExtractConfig::default()
    };
    let elements = extract_elements(FORM, &config);
    assert!(elements.iter().all(|e| e.tag != "a"));
}

#[test]
fn markup_queries() {
    let doc = MarkupDocument::parse(FORM);
    assert_eq!(doc.title().as_deref(), Some("Sign up"));
    assert_eq!(doc.label_texts("mail"), vec!["E-mail address"]);
    assert!(doc.label_texts("nothing").is_empty());
}

#[test]
fn snapshot_embeds_every_element() {
    let vectors = vectors();
    let snapshot = PageSnapshot::build(LOGIN_PAGE, &ExtractConfig::default(), &vectors, 1.5, 3.0).unwrap();

    assert_eq!(snapshot.elements().len(), 3);
    assert!(snapshot.elements().iter().all(|e| e.attr_vector.len() == 4));
    assert_eq!(snapshot.of_kind(OperationKind::Enter).len(), 2);
    assert_eq!(snapshot.of_kind(OperationKind::Click).len(), 1);
    assert!(snapshot.of_kind(OperationKind::Select).is_empty());

    let button = &snapshot.of_kind(OperationKind::Click)[0];
    assert_eq!(button.attr_words, vec!["submit", "login"]);
    assert!(button.text_vector.is_some());

    assert_eq!(snapshot.fingerprint(), markup_fingerprint(LOGIN_PAGE));
    assert_eq!(snapshot.fingerprint().len(), 40);
}
