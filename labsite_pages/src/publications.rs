use crate::{external_link, Replacements};
use labsite_markup::{
    parse_extra_links, ChapterFields, Citation, CourseFields, DissertationFields, LinkResolver,
    LinkSpec, PaperFields, PosterFields, TalkFields, PDF_BASE_PATH,
};
use labsite_sheets::{Row, Workbook};

/// The kinds of publication, each with its own sheet, citation style and links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationKind {
    /// journal articles
    Paper,
    /// chapters in edited books
    Chapter,
    /// dissertations and theses
    Dissertation,
    /// invited talks
    Talk,
    /// courses taught
    Course,
    /// conference posters
    Poster,
}

/// Every publications sheet, in page order, with its marker
pub static PUBLICATION_SECTIONS: [(&str, &str, PublicationKind); 6] = [
    ("papers", "PAPERS_CONTENT", PublicationKind::Paper),
    ("chapters", "CHAPTERS_CONTENT", PublicationKind::Chapter),
    ("dissertations", "DISSERTATIONS_CONTENT", PublicationKind::Dissertation),
    ("talks", "TALKS_CONTENT", PublicationKind::Talk),
    ("courses", "COURSES_CONTENT", PublicationKind::Course),
    ("posters", "POSTERS_CONTENT", PublicationKind::Poster),
];

fn push_if_set(links: &mut Vec<LinkSpec>, row: &Row, label: &str, field: &str) {
    if row.has(field) {
        links.push(LinkSpec::new(label, row.get_str(field)));
    }
}

impl PublicationKind {
    /// The citation paragraph for a row of this kind
    pub fn citation(self, row: &Row) -> String {
        use PublicationKind::*;
        match self {
            Paper => PaperFields::from(row).to_html(),
            Chapter => ChapterFields::from(row).to_html(),
            Dissertation => DissertationFields::from(row).to_html(),
            Talk => TalkFields::from(row).to_html(),
            Course => CourseFields::from(row).to_html(),
            Poster => PosterFields::from(row).to_html(),
        }
    }

    /// The labelled links for a row of this kind, extra links last
    pub fn links(self, row: &Row) -> Vec<LinkSpec> {
        use PublicationKind::*;
        let mut links = Vec::new();
        match self {
            Paper => {
                push_if_set(&mut links, row, "PDF", "pdf_link");
                let code = row.get_str("code_link");
                let data = row.get_str("data_link");
                if row.has("code_link") {
                    if data == code {
                        links.push(LinkSpec::new("CODE + DATA", &*code));
                    } else {
                        links.push(LinkSpec::new("CODE", &*code));
                        push_if_set(&mut links, row, "DATA", "data_link");
                    }
                } else {
                    push_if_set(&mut links, row, "DATA", "data_link");
                }
            }
            Chapter | Dissertation => push_if_set(&mut links, row, "PDF", "pdf_link"),
            Talk => {
                push_if_set(&mut links, row, "PAPER", "paper_link");
                push_if_set(&mut links, row, "CODE", "code_link");
                push_if_set(&mut links, row, "DATA", "data_link");
            }
            Course => push_if_set(&mut links, row, "GitHub", "github_link"),
            // the title of a poster already links to it
            Poster => {}
        }
        links.extend(parse_extra_links(&row.get_str("extra_links")));
        links
    }
}

/// One publication card
pub fn publication_card(row: &Row, kind: PublicationKind, resolver: &LinkResolver) -> String {
    let image = row.get_str("image");
    let image_src = if image.is_empty() {
        String::new()
    } else {
        format!("images/publications/{}", image)
    };

    let title = row.get_str("title");
    let title_html = if row.has("title_url") {
        external_link(&resolver.resolve(&row.get_str("title_url"), PDF_BASE_PATH), &title)
    } else {
        title.into_owned()
    };

    let citation = kind.citation(row);
    let citation_p = if citation.is_empty() {
        String::new()
    } else {
        format!("\n                        <p>{}</p>", citation)
    };

    let links = resolver.build_links_html(&kind.links(row), PDF_BASE_PATH);
    let links_p = if links.is_empty() {
        String::new()
    } else {
        format!("\n                        <p class=\"publication-links\">{}</p>", links)
    };

    format!(
        r#"                <div class="publication-card">
                    <img src="{}" alt="Publication thumbnail">
                    <div>
                        <h4>{}</h4>{}{}
                    </div>
                </div>"#,
        image_src, title_html, citation_p, links_p
    )
}

/// Every card in one section, separated by blank lines
pub fn publication_section(rows: &[Row], kind: PublicationKind, resolver: &LinkResolver) -> String {
    rows.iter()
        .map(|row| publication_card(row, kind, resolver))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Html for every publications marker; missing sheets produce empty sections
pub fn publications_replacements(workbook: &Workbook, resolver: &LinkResolver) -> Replacements {
    PUBLICATION_SECTIONS
        .iter()
        .map(|(sheet, marker, kind)| (*marker, publication_section(workbook.rows(sheet), *kind, resolver)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsite_sheets::CellValue;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn labels(links: &[LinkSpec]) -> Vec<&str> {
        links.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn paper_links_combine_identical_code_and_data() {
        let r = row(&[("pdf_link", "a.pdf"), ("code_link", "https://g/x"), ("data_link", "https://g/x")]);
        assert_eq!(labels(&PublicationKind::Paper.links(&r)), vec!["PDF", "CODE + DATA"]);
    }

    #[test]
    fn paper_links_code_then_data() {
        let r = row(&[("code_link", "https://g/x"), ("data_link", "https://osf/y")]);
        assert_eq!(labels(&PublicationKind::Paper.links(&r)), vec!["CODE", "DATA"]);
        let only_data = row(&[("code_link", ""), ("data_link", "https://osf/y")]);
        assert_eq!(labels(&PublicationKind::Paper.links(&only_data)), vec!["DATA"]);
    }

    #[test]
    fn extra_links_come_last() {
        let r = row(&[("paper_link", "p.pdf"), ("extra_links", "Slides:s.pdf;Video:https://v")]);
        assert_eq!(labels(&PublicationKind::Talk.links(&r)), vec!["PAPER", "Slides", "Video"]);
        let poster = row(&[("pdf_link", "p.pdf"), ("extra_links", "Abstract:a.pdf")]);
        assert_eq!(labels(&PublicationKind::Poster.links(&poster)), vec!["Abstract"]);
    }

    #[test]
    fn card_layout() {
        let r = row(&[
            ("image", "thumb.png"),
            ("title", "A paper"),
            ("title_url", "paper.pdf"),
            ("authors", "Manning JR"),
            ("year", "2020"),
            ("journal", "J"),
            ("pdf_link", "paper.pdf"),
        ]);
        let card = publication_card(&r, PublicationKind::Paper, &LinkResolver::default());
        let url = "https://github.com/ContextLab/contextlab.github.io/blob/main/data/pdfs/paper.pdf";
        let expected = format!(
            r#"                <div class="publication-card">
                    <img src="images/publications/thumb.png" alt="Publication thumbnail">
                    <div>
                        <h4><a href="{0}" target="_blank">A paper</a></h4>
                        <p>Manning JR (2020). A paper. <em>J</em>.</p>
                        <p class="publication-links">[<a href="{0}" target="_blank">PDF</a>]</p>
                    </div>
                </div>"#,
            url
        );
        assert_eq!(card, expected);
    }

    #[test]
    fn course_card_without_image_or_links() {
        let r = row(&[("title", "Storytelling with Data"), ("description", "Learn *things*.")]);
        let card = publication_card(&r, PublicationKind::Course, &LinkResolver::default());
        assert!(card.contains(r#"<img src="" alt="Publication thumbnail">"#));
        assert!(card.contains("<h4>Storytelling with Data</h4>\n                        <p>Learn <em>things</em>.</p>\n"));
        assert!(!card.contains("publication-links"));
    }

    #[test]
    fn numeric_cells_render_without_decimals() {
        let mut r = row(&[("title", "T"), ("authors", "A"), ("journal", "J")]);
        let _ = r.set("year", CellValue::Float(2019.0)).set("volume", CellValue::Float(7.0));
        assert!(publication_card(&r, PublicationKind::Paper, &LinkResolver::default())
            .contains("A (2019). T. <em>J</em>, 7."));
    }

    #[test]
    fn every_marker_is_produced() {
        let mut wb = Workbook::new();
        let _ = wb.add_sheet("papers", vec![row(&[("title", "A")]), row(&[("title", "B")])]);
        let reps = publications_replacements(&wb, &LinkResolver::default());
        let markers: Vec<_> = reps.iter().map(|(m, _)| *m).collect();
        assert_eq!(
            markers,
            vec![
                "PAPERS_CONTENT",
                "CHAPTERS_CONTENT",
                "DISSERTATIONS_CONTENT",
                "TALKS_CONTENT",
                "COURSES_CONTENT",
                "POSTERS_CONTENT"
            ]
        );
        assert_eq!(reps[0].1.matches("publication-card").count(), 2);
        assert!(reps[0].1.contains("</div>\n\n                <div"));
        assert_eq!(reps[1].1, "");
    }
}
