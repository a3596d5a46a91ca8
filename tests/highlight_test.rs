use assert2::check;
use docview::{HighlightConfig, Highlighter, Query, RenderTree, SearchIndex, SearchConfig};
use rstest::rstest;

const DOCUMENT: &str = "# Brown Fox\n\n\
    The quick brown fox jumps over the lazy dog. A fox is quick.\n\n\
    ```js\nconst fox = quick();\n```\n\n\
    ```mermaid\ngraph quick --> fox\n```\n\n\
    Inline `fox` code and the final fox.\n";

/// Test: highlighted words agree with the terms the search matched on.
#[rstest]
#[case("fox")]
#[case("quick fox")]
#[case("\"brown fox\"")]
#[case("de fox")]
fn highlight_agrees_with_search(#[case] query: &str) {
    let mut tree = RenderTree::from_markdown(DOCUMENT);
    Highlighter::default().highlight_term(query, &mut tree);

    let terms: Vec<String> = Query::parse(query)
        .terms()
        .into_iter()
        .map(str::to_string)
        .collect();
    for marked in tree.marked_texts() {
        check!(terms.contains(&marked.to_lowercase()), "unexpected mark {marked:?}");
    }

    // The index sees the same prose, so the search finds the document too
    let mut index = SearchIndex::new();
    index.index_document("doc.md", "doc.md", DOCUMENT);
    let results = docview::search::search(&index, query, &SearchConfig::default());
    check!(results.len() == 1);
}

/// Test: code blocks, inline code and diagrams are never marked.
#[test]
fn excluded_regions_are_verbatim() {
    let mut tree = RenderTree::from_markdown(DOCUMENT);
    let report = Highlighter::default().highlight_term("fox", &mut tree);

    // Heading, two in the first paragraph, one at the end of the last
    check!(report.marks == 4);
    let html = tree.to_html();
    check!(html.contains("const fox = quick();"));
    check!(html.contains("graph quick --&gt; fox"));
    check!(html.contains("<code>fox</code>"));
}

/// Test: every term of a multi-term query is marked in one pass with its own class.
#[test]
fn multi_term_single_pass() {
    let mut tree = RenderTree::from_markdown("mark the class of the fox");
    Highlighter::default().highlight_term("fox mark class", &mut tree);

    check!(tree.marked_texts() == ["mark", "class", "fox"]);
    let html = tree.to_html();
    check!(html.contains("<mark class=\"search-highlight search-highlight-1\">mark</mark>"));
    check!(html.contains("<mark class=\"search-highlight search-highlight-2\">class</mark>"));
    check!(html.contains("<mark class=\"search-highlight search-highlight-0\">fox</mark>"));
}

/// Test: a new query replaces the previous highlights entirely.
#[test]
fn new_query_replaces_marks() {
    let mut tree = RenderTree::from_markdown(DOCUMENT);
    let original = tree.to_html();
    let highlighter = Highlighter::default();

    highlighter.highlight_term("fox", &mut tree);
    let report = highlighter.highlight_term("lazy", &mut tree);
    check!(report.removed == 4);
    check!(tree.marked_texts() == ["lazy"]);

    let report = highlighter.highlight_term("e", &mut tree);
    check!(report.removed == 1);
    check!(tree.to_html() == original);
}

/// Test: custom exclusions from the configuration are honoured.
#[test]
fn configured_exclusions() {
    let config = HighlightConfig {
        excluded_tags: vec!["h1".into()],
        excluded_classes: vec![],
        ..HighlightConfig::default()
    };
    let mut tree = RenderTree::from_markdown(DOCUMENT);
    let report = Highlighter::new(config).highlight_term("fox", &mut tree);

    // Heading skipped; code blocks and diagrams are now fair game
    check!(report.marks == 6);
}
