use labsite_markup::{
    markdown_to_html, parse_extra_links, parse_labeled_links, Citation, LinkResolver, PaperFields,
    DOCUMENTS_BASE_PATH, PDF_BASE_PATH,
};
use labsite_sheets::Row;

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn paper_citation_from_a_spreadsheet_row() {
    let paper = row(&[
        ("authors", "Heusser AC, Manning JR"),
        ("year", "2021"),
        ("title", "Memory"),
        ("journal", "Cognition"),
        ("volume", "10"),
        ("issue", "2"),
        ("pages", "1-5"),
        ("unrelated", "ignored"),
    ]);
    assert_eq!(
        PaperFields::from(&paper).to_html(),
        "Heusser AC, Manning JR (2021). Memory. <em>Cognition</em>, 10(2): 1-5."
    );

    let in_press = row(&[
        ("authors", "Manning JR"),
        ("year", "2025"),
        ("title", "Forthcoming"),
        ("journal", "Neuron"),
        ("status", "In press"),
    ]);
    assert_eq!(
        PaperFields::from(&in_press).to_html(),
        "Manning JR (2025). Forthcoming. <em>Neuron</em>: In press."
    );
}

#[test]
fn cell_links_resolve_against_the_site() {
    let resolver = LinkResolver::default();
    let pdfs = parse_extra_links("Slides:talk.pdf;Demo:/demos/viz.html");
    assert_eq!(
        resolver.build_links_html(&pdfs, PDF_BASE_PATH),
        concat!(
            r#"[<a href="https://github.com/ContextLab/contextlab.github.io/blob/main/data/pdfs/talk.pdf" target="_blank">Slides</a>] "#,
            r#"[<a href="https://contextlab.github.io/demos/viz.html" target="_blank">Demo</a>]"#
        )
    );

    let people = parse_labeled_links(r#""CV, 2024":JRM_CV.pdf, Empty:"#);
    assert_eq!(
        resolver.build_links_html(&people, DOCUMENTS_BASE_PATH),
        r#"[<a href="https://github.com/ContextLab/contextlab.github.io/blob/main/documents/JRM_CV.pdf" target="_blank">CV, 2024</a>]"#
    );
}

#[test]
fn news_style_markdown() {
    assert_eq!(
        markdown_to_html("See the *new* `hypertools_v2` release at [docs](https://x.org/hyper_tools)"),
        r#"See the <em>new</em> `hypertools_v2` release at <a href="https://x.org/hyper_tools" target="_blank">docs</a>"#
    );
}
