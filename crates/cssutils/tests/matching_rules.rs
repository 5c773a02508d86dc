//! Integration tests for rule matching.
//!
//! Matching looks only at the rightmost compound selector:
//! - Type queries are case-insensitive, class and id queries are not
//! - Attribute and pseudo parts of the compound are skipped over
//! - A lone `*` matches every type query
//! - Nested LESS selectors match in their `&`-expanded form

use cssutils::{
    CssError, Dialect, RuleMatch, extract_all_selectors, extract_all_selectors_with_dialect,
    find_matching_rules,
};

fn count(css: &str, query: &str) -> usize {
    let records = extract_all_selectors(css);
    find_matching_rules(query, &records).unwrap().len()
}

fn count_less(less: &str, query: &str) -> usize {
    let records = extract_all_selectors_with_dialect(less, Dialect::Less);
    find_matching_rules(query, &records).unwrap().len()
}

// ============================================================================
// SIMPLE SELECTORS
// ============================================================================

#[test]
fn test_lone_type_selector() {
    let css = "div { color:red }";
    assert_eq!(count(css, "div"), 1);
    assert_eq!(count(css, "span"), 0);
    assert_eq!(count(css, "divfoo"), 0);
    assert_eq!(count(css, "di"), 0);
}

#[test]
fn test_lone_class_selector() {
    let css = ".foo { color:red }";
    assert_eq!(count(css, ".foo"), 1);
    assert_eq!(count(css, ".bar"), 0);
    assert_eq!(count(css, ".foobar"), 0);
    assert_eq!(count(css, ".fo"), 0);
    assert_eq!(count(css, "..foo"), 0);
}

#[test]
fn test_lone_id_selector() {
    let css = "#foo { color:red }";
    assert_eq!(count(css, "#foo"), 1);
    assert_eq!(count(css, "#bar"), 0);
    assert_eq!(count(css, "#fo"), 0);
    assert_eq!(count(css, "##foo"), 0);
}

#[test]
fn test_type_class_and_id_are_distinct() {
    let css = "div { color:red } \n.foo { color:green } \n#bar { color:blue }";
    assert_eq!(count(css, "div"), 1);
    assert_eq!(count(css, "foo"), 0);
    assert_eq!(count(css, "bar"), 0);
    assert_eq!(count(css, ".div"), 0);
    assert_eq!(count(css, ".foo"), 1);
    assert_eq!(count(css, "#foo"), 0);
    assert_eq!(count(css, "#bar"), 1);
}

#[test]
fn test_case_sensitive_for_all_but_types() {
    let css = "div { color:red } \n\
               DIV { color:red } \n\
               .foo { color:green } \n\
               .Foo { color:black } \n\
               #bar { color:blue } \n\
               #baR { color:white }";
    assert_eq!(count(css, "div"), 2);
    assert_eq!(count(css, "Div"), 2);
    assert_eq!(count(css, ".foo"), 1);
    assert_eq!(count(css, ".Foo"), 1);
    assert_eq!(count(css, ".FOO"), 0);
    assert_eq!(count(css, "#bar"), 1);
    assert_eq!(count(css, "#baR"), 1);
    assert_eq!(count(css, "#BAR"), 0);
}

#[test]
fn test_match_permissively_within_compound() {
    let css = "div.foo { color:red } \n\
               div#bar { color:green } \n\
               div.foo#bar { color:blue } \n\
               .foo#bar { color:black } \n\
               div.foo.class2 { color: white } \n\
               .foo.class2 { color: yellow } \n\
               .foo#bar.class2 { color: cyan }";
    assert_eq!(count(css, "div"), 4);
    assert_eq!(count(css, ".foo"), 6);
    assert_eq!(count(css, ".class2"), 3);
    assert_eq!(count(css, "#bar"), 4);
}

#[test]
fn test_universal_selector() {
    let css = "* { color:red } \n\
               *.foo { color:green } \n\
               *#bar { color:blue } \n\
               *.foo#bar { color:yellow }";
    assert_eq!(count(css, "div"), 1);
    assert_eq!(count(css, ".foo"), 2);
    assert_eq!(count(css, "#bar"), 2);
    assert_eq!(count(css, ".otherClass"), 0);
    assert_eq!(count(css, "#otherId"), 0);

    assert_eq!(count("div * { color:red }", "span"), 0);
    assert_eq!(count(".foo * { color:red }", "span"), 0);
    assert_eq!(count(".foo * { color:red }", ".foo"), 0);
    assert_eq!(count("#bar * { color:red }", "#bar"), 0);
}

// ============================================================================
// PSEUDO AND ATTRIBUTE PARTS
// ============================================================================

#[test]
fn test_pseudo_classes_and_elements() {
    let css = ":focus { color:red; } \n\
               div:hover { color:blue; } \n\
               ::selection { color:green; } \n\
               p::first-line { color:black } \n\
               a:not(.x)::after { }";
    assert_eq!(count(css, "div"), 1);
    assert_eq!(count(css, "p"), 1);
    assert_eq!(count(css, "a"), 1);
    assert_eq!(count(css, ".x"), 0);
}

#[test]
fn test_attribute_selectors() {
    let css = "a[href] { } \n\
               input[type=\"text\"].wide { } \n\
               [data-x='1'] { }";
    assert_eq!(count(css, "a"), 1);
    assert_eq!(count(css, "input"), 1);
    assert_eq!(count(css, ".wide"), 1);
    assert_eq!(count(css, "span"), 0);
}

// ============================================================================
// COMBINATORS AND GROUPS
// ============================================================================

#[test]
fn test_only_rightmost_compound_matches() {
    let css = "div .foo { } \n\
               ul > li { } \n\
               h1 + p { } \n\
               h2 ~ span { }";
    assert_eq!(count(css, ".foo"), 1);
    assert_eq!(count(css, "div"), 0);
    assert_eq!(count(css, "li"), 1);
    assert_eq!(count(css, "ul"), 0);
    assert_eq!(count(css, "p"), 1);
    assert_eq!(count(css, "h1"), 0);
    assert_eq!(count(css, "span"), 1);
    assert_eq!(count(css, "h2"), 0);
}

#[test]
fn test_groups_match_per_selector() {
    let css = "h1, .title, #main h1 { }";
    let records = extract_all_selectors(css);
    let matches = find_matching_rules("h1", &records).unwrap();
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|r| r.selector_group.as_deref() == Some(css.trim_end_matches(" { }"))));
}

#[test]
fn test_keyframe_selectors_never_match() {
    let css = "div { color:red } \n\
               @keyframes slide { \n\
                 from { left: 0; } \n\
                 to { left: 100px; } \n\
               } \n\
               .foo { color:green }";
    assert_eq!(count(css, "div"), 1);
    assert_eq!(count(css, ".foo"), 1);
    assert_eq!(count(css, "slide"), 0);
    assert_eq!(count(css, "from"), 0);
}

#[test]
fn test_escaped_selectors_match_decoded_queries() {
    let css = ".\\31 0 { } \n\
               .md\\:flex { } \n\
               #\\#hash { }";
    assert_eq!(count(css, ".10"), 1);
    assert_eq!(count(css, ".md:flex"), 1);
    assert_eq!(count(css, ".md"), 0);
    assert_eq!(count(css, "##hash"), 1);
}

// ============================================================================
// NESTED RULES
// ============================================================================

#[test]
fn test_parent_reference_suffix() {
    let less = ".button {\n  &-custom { color: red; }\n  &:hover { }\n}";
    assert_eq!(count_less(less, ".button-custom"), 1);
    assert_eq!(count_less(less, ".button"), 2);
}

#[test]
fn test_parent_reference_after_ancestor() {
    let less = ".header {\n  .menu {\n    .no-borderradius & { }\n  }\n}";
    assert_eq!(count_less(less, ".menu"), 2);
    assert_eq!(count_less(less, ".header"), 1);
    assert_eq!(count_less(less, ".no-borderradius"), 0);
}

#[test]
fn test_nested_child_combinators() {
    let less = ".dropup > .btn {\n  > .caret { }\n}\n.nav {\n  > li { }\n}";
    assert_eq!(count_less(less, ".caret"), 1);
    assert_eq!(count_less(less, ".btn"), 1);
    assert_eq!(count_less(less, ".dropup"), 0);
    assert_eq!(count_less(less, "li"), 1);
}

#[test]
fn test_parent_reference_in_group() {
    let less = ".a, .b {\n  &.on { }\n}";
    assert_eq!(count_less(less, ".on"), 1);
    assert_eq!(count_less(less, ".a"), 2);
    assert_eq!(count_less(less, ".b"), 2);
}

#[test]
fn test_nested_match_names_carry_parents() {
    let less = ".nav {\n  > li,\n  > a { }\n}";
    let records = extract_all_selectors_with_dialect(less, Dialect::Less);
    let matches = find_matching_rules("li", &records).unwrap();
    assert_eq!(matches.len(), 1);

    let rule = RuleMatch::from_record("nav.less", matches[0], 0);
    assert_eq!(rule.name, ".nav / > li, > a");
    assert_eq!((rule.line_start, rule.line_end), (1, 2));
}

// ============================================================================
// QUERY VALIDATION
// ============================================================================

#[test]
fn test_invalid_queries_are_rejected() {
    let records = extract_all_selectors("div { }");
    assert_eq!(find_matching_rules("", &records), Err(CssError::EmptyQuery));
    assert!(matches!(
        find_matching_rules("div p", &records),
        Err(CssError::UnsupportedQuery(q)) if q == "div p"
    ));
    assert!(find_matching_rules("a,b", &records).is_err());
    assert_eq!(find_matching_rules("  div  ", &records).map(|m| m.len()), Ok(1));
}

#[test]
fn test_no_records_no_matches() {
    assert!(find_matching_rules("div", &[]).unwrap().is_empty());
}
