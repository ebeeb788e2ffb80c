use crate::Replacements;
use labsite_markup::{markdown_to_html, parse_extra_links, LinkResolver, LinkSpec, PDF_BASE_PATH};
use labsite_sheets::{Row, Workbook};

/// Every software sheet with its marker
pub static SOFTWARE_SECTIONS: [(&str, &str); 3] = [
    ("python", "PYTHON_CONTENT"),
    ("javascript", "JAVASCRIPT_CONTENT"),
    ("matlab", "MATLAB_CONTENT"),
];

static LINK_FIELDS: [(&str, &str); 4] = [
    ("GitHub", "github_link"),
    ("PyPI", "pypi_link"),
    ("Docs", "docs_link"),
    ("MATLAB Central File Exchange", "fileexchange_link"),
];

/// The links for one software item, extra links last
pub fn software_links(row: &Row) -> Vec<LinkSpec> {
    let mut links: Vec<LinkSpec> = LINK_FIELDS
        .iter()
        .filter(|(_, field)| row.has(field))
        .map(|(label, field)| LinkSpec::new(*label, row.get_str(field)))
        .collect();
    links.extend(parse_extra_links(&row.get_str("extra_links")));
    links
}

/// `<p><strong>Name.</strong> description [links]</p>`, leaving out absent parts
pub fn software_item(row: &Row, resolver: &LinkResolver) -> String {
    let mut parts = Vec::new();
    let name = row.get_str("name");
    if !name.is_empty() {
        parts.push(format!("<strong>{}.</strong>", name));
    }
    let description = markdown_to_html(&row.get_str("description"));
    if !description.is_empty() {
        parts.push(description);
    }
    let links = resolver.build_links_html(&software_links(row), PDF_BASE_PATH);
    if !links.is_empty() {
        parts.push(links);
    }
    format!("<p>{}</p>", parts.join(" "))
}

/// Html for every software marker
pub fn software_replacements(workbook: &Workbook, resolver: &LinkResolver) -> Replacements {
    SOFTWARE_SECTIONS
        .iter()
        .map(|(sheet, marker)| {
            let items: Vec<String> = workbook
                .rows(sheet)
                .iter()
                .map(|row| software_item(row, resolver))
                .collect();
            (*marker, items.join("\n\n                "))
        })
        .collect()
}
