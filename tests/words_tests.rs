use scenario_matcher::text::words::{NOISE_WORDS, STOP_WORDS, filter_words, normalize, split_words};

#[test]
fn identifier_with_camel_case_and_separators() {
    assert_eq!(normalize("myButton-Submit_1"), vec!["my", "button", "submit"]);
}

#[test]
fn split_keeps_case_and_digits() {
    assert_eq!(split_words("firstName last_name2"), vec!["first", "Name", "last", "name2"]);
    assert_eq!(split_words("  --  "), Vec::<String>::new());
}

#[test]
fn acronyms_split_before_the_next_word() {
    assert_eq!(normalize("loginHTMLForm"), vec!["login", "html"]);
}

#[test]
fn stop_and_noise_words_are_dropped() {
    assert_eq!(normalize("Search for the item"), vec!["search", "item"]);
    assert_eq!(normalize("submit-btn js link"), vec!["submit"]);
    for word in STOP_WORDS.iter().chain(NOISE_WORDS) {
        assert!(normalize(word).is_empty(), "{} should be filtered", word);
    }
}

#[test]
fn short_fragments_are_dropped() {
    assert_eq!(filter_words(&["a", "B", "ok", "x1"]), vec!["ok", "x1"]);
}

#[test]
fn duplicates_are_kept_in_order() {
    assert_eq!(normalize("password Password"), vec!["password", "password"]);
}

#[test]
fn non_ascii_letters_count_as_word_characters() {
    assert_eq!(normalize("prénom nom"), vec!["prénom", "nom"]);
}
