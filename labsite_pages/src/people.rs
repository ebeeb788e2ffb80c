use crate::{external_link, Replacements};
use labsite_common::escape_attribute;
use labsite_markup::{parse_labeled_links, LinkResolver, DOCUMENTS_BASE_PATH};
use labsite_sheets::{Row, Workbook};
use lazy_static::lazy_static;
use regex::Regex;

/// Member cards per grid row
pub const CARDS_PER_GRID: usize = 3;

static PLACEHOLDER_IMAGE: &str = "images/people/placeholder.png";

lazy_static! {
    static ref POSITION_PREFIX: Regex = Regex::new(r"^(now|then)\s+(at?)\s+(.+)").unwrap();
}

fn person_image(row: &Row) -> String {
    let image = row.get_str("image");
    if image.is_empty() {
        PLACEHOLDER_IMAGE.to_string()
    } else {
        format!("images/people/{}", image)
    }
}

fn linked_name(row: &Row, name: &str) -> String {
    if row.has("name_url") {
        external_link(&row.get_str("name_url"), name)
    } else {
        name.to_string()
    }
}

fn role_suffix(row: &Row) -> String {
    let role = row.get_str("role");
    if role.is_empty() {
        String::new()
    } else {
        format!(" | {}", role)
    }
}

/// The lab director's block. `links_html` holds `Label:URL` pairs, with
/// bare filenames resolved under `documents/`.
pub fn director_block(row: &Row, resolver: &LinkResolver) -> String {
    let name = row.get_str("name");
    let links = resolver.build_links_html(&parse_labeled_links(&row.get_str("links_html")), DOCUMENTS_BASE_PATH);
    let links_p = if links.is_empty() {
        String::new()
    } else {
        format!("\n                    <p>{}</p>", links)
    };
    format!(
        r#"            <div class="two-column lab-director">
                <figure>
                    <img src="{}" alt="{}">
                </figure>
                <div>
                    <h3>{}{}</h3>
                    <p>{}</p>{}
                </div>
            </div>"#,
        person_image(row),
        escape_attribute(&*name),
        linked_name(row, &name),
        role_suffix(row),
        row.get_str("bio"),
        links_p
    )
}

/// A single lab member's card
pub fn member_card(row: &Row) -> String {
    let name = row.get_str("name");
    format!(
        r#"                <div class="person-card">
                    <img src="{}" alt="{}">
                    <h3>{}{}</h3>
                    <p>{}</p>
                </div>"#,
        person_image(row),
        escape_attribute(&*name),
        linked_name(row, &name),
        role_suffix(row),
        row.get_str("bio")
    )
}

/// Member cards, in grids of `CARDS_PER_GRID`
pub fn members_content(rows: &[Row]) -> String {
    rows.chunks(CARDS_PER_GRID)
        .map(|chunk| {
            let cards: Vec<String> = chunk.iter().map(member_card).collect();
            format!(
                "            <div class=\"people-grid\">\n{}\n            </div>",
                cards.join("\n")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Link the destination in a position like `now at Google` or `then a grad student`,
/// leaving the prefix as plain text; any other position is linked whole.
pub fn linked_position(position: &str, url: &str) -> String {
    match POSITION_PREFIX.captures(position) {
        Some(caps) => format!("{} {} {}", &caps[1], &caps[2], external_link(url, &caps[3])),
        None => external_link(url, position),
    }
}

/// `Name (years; position)`, with whichever parts are present
pub fn alumni_entry(row: &Row) -> String {
    let name = row.get_str("name");
    let position = row.get_str("current_position");
    let position_display = if !position.is_empty() && row.has("current_position_url") {
        linked_position(&position, &row.get_str("current_position_url"))
    } else {
        position.into_owned()
    };

    let mut paren = Vec::new();
    let years = row.get_str("years");
    if !years.is_empty() {
        paren.push(years.into_owned());
    }
    if !position_display.is_empty() {
        paren.push(position_display);
    }

    let mut entry = linked_name(row, &name);
    if !paren.is_empty() {
        entry.push_str(&format!(" ({})", paren.join("; ")));
    }
    entry
}

/// Postdoc, graduate and staff alumni, one per line
pub fn alumni_content(rows: &[Row]) -> String {
    rows.iter()
        .map(alumni_entry)
        .collect::<Vec<_>>()
        .join("<br>\n                    ")
}

/// `Name (years)`
pub fn undergrad_entry(row: &Row) -> String {
    let name = row.get_str("name");
    let years = row.get_str("years");
    if years.is_empty() {
        name.into_owned()
    } else {
        format!("{} ({})", name, years)
    }
}

/// Undergraduate alumni, one per line
pub fn undergrads_content(rows: &[Row]) -> String {
    rows.iter()
        .map(undergrad_entry)
        .collect::<Vec<_>>()
        .join("<br>\n                        ")
}

/// A collaborator's paragraph. When there is a url, the name at the start of the
/// description is linked; a description which does not start with the name is
/// replaced by the linked name alone.
pub fn collaborator_entry(row: &Row) -> String {
    let name = row.get_str("name");
    let description = row.get_str("description");
    let body = if row.has("url") {
        let url = row.get_str("url");
        match description.strip_prefix(&*name) {
            Some(rest) => format!("{}{}", external_link(&url, &name), rest),
            None => external_link(&url, &name),
        }
    } else {
        description.into_owned()
    };
    format!("<p>{}</p>", body)
}

/// Every collaborator paragraph
pub fn collaborators_content(rows: &[Row]) -> String {
    rows.iter()
        .map(collaborator_entry)
        .collect::<Vec<_>>()
        .join("\n                ")
}

/// Html for every people marker; only the first director row is used
pub fn people_replacements(workbook: &Workbook, resolver: &LinkResolver) -> Replacements {
    let director = workbook
        .rows("director")
        .first()
        .map(|row| director_block(row, resolver))
        .unwrap_or_default();
    vec![
        ("DIRECTOR_CONTENT", director),
        ("MEMBERS_CONTENT", members_content(workbook.rows("members"))),
        ("ALUMNI_POSTDOCS_CONTENT", alumni_content(workbook.rows("alumni_postdocs"))),
        ("ALUMNI_GRADS_CONTENT", alumni_content(workbook.rows("alumni_grads"))),
        ("ALUMNI_MANAGERS_CONTENT", alumni_content(workbook.rows("alumni_managers"))),
        ("ALUMNI_UNDERGRADS_CONTENT", undergrads_content(workbook.rows("alumni_undergrads"))),
        ("COLLABORATORS_CONTENT", collaborators_content(workbook.rows("collaborators"))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn now_at_links_only_the_destination() {
        let r = row(&[
            ("name", "Ada"),
            ("years", "2015-2018"),
            ("current_position", "now at Google"),
            ("current_position_url", "https://google.com"),
        ]);
        assert_eq!(
            alumni_entry(&r),
            r#"Ada (2015-2018; now at <a href="https://google.com" target="_blank">Google</a>)"#
        );
    }

    #[test]
    fn then_a_links_only_the_destination() {
        assert_eq!(
            linked_position("then a CDL grad student!", "https://cdl"),
            r#"then a <a href="https://cdl" target="_blank">CDL grad student!</a>"#
        );
    }

    #[test]
    fn other_positions_are_linked_whole() {
        assert_eq!(
            linked_position("Professor at MIT", "https://mit.edu"),
            r#"<a href="https://mit.edu" target="_blank">Professor at MIT</a>"#
        );
    }

    #[test]
    fn alumni_entry_parts_are_optional() {
        assert_eq!(alumni_entry(&row(&[("name", "Bo")])), "Bo");
        assert_eq!(
            alumni_entry(&row(&[("name", "Bo"), ("name_url", "https://bo"), ("current_position", "now at X")])),
            r#"<a href="https://bo" target="_blank">Bo</a> (now at X)"#
        );
    }

    #[test]
    fn members_grid_in_threes() {
        let rows: Vec<Row> = (0..7).map(|i| row(&[("name", format!("P{}", i).as_str())])).collect();
        let html = members_content(&rows);
        assert_eq!(html.matches("people-grid").count(), 3);
        assert_eq!(html.matches("person-card").count(), 7);
        assert!(html.starts_with("            <div class=\"people-grid\">\n                <div class=\"person-card\">"));
        assert!(html.contains("            </div>\n\n            <div class=\"people-grid\">"));
        assert!(html.contains(PLACEHOLDER_IMAGE));
        assert_eq!(members_content(&[]), "");
    }

    #[test]
    fn member_card_layout() {
        let r = row(&[("name", "Ada \"The\" Byron"), ("role", "grad student"), ("image", "ada.png"), ("bio", "Hi.")]);
        assert_eq!(
            member_card(&r),
            r#"                <div class="person-card">
                    <img src="images/people/ada.png" alt="Ada &quot;The&quot; Byron">
                    <h3>Ada "The" Byron | grad student</h3>
                    <p>Hi.</p>
                </div>"#
        );
    }

    #[test]
    fn director_links_resolve_under_documents() {
        let r = row(&[
            ("name", "Jeremy"),
            ("links_html", "CV:JRM_CV.pdf, \"Google Scholar\":https://scholar"),
        ]);
        let html = director_block(&r, &LinkResolver::default());
        assert!(html.contains("lab-director"));
        assert!(html.contains(
            r#"<p>[<a href="https://github.com/ContextLab/contextlab.github.io/blob/main/documents/JRM_CV.pdf" target="_blank">CV</a>] [<a href="https://scholar" target="_blank">Google Scholar</a>]</p>"#
        ));
    }

    #[test]
    fn undergrads() {
        let rows = vec![row(&[("name", "A"), ("years", "2019")]), row(&[("name", "B")])];
        assert_eq!(undergrads_content(&rows), "A (2019)<br>\n                        B");
    }

    #[test]
    fn collaborators_link_leading_name() {
        let linked = row(&[("name", "Memory Lab"), ("url", "https://m"), ("description", "Memory Lab at Penn")]);
        assert_eq!(
            collaborator_entry(&linked),
            r#"<p><a href="https://m" target="_blank">Memory Lab</a> at Penn</p>"#
        );
        let mismatch = row(&[("name", "X Lab"), ("url", "https://x"), ("description", "Another lab")]);
        assert_eq!(collaborator_entry(&mismatch), r#"<p><a href="https://x" target="_blank">X Lab</a></p>"#);
        let plain = row(&[("name", "Y"), ("description", "Y group")]);
        assert_eq!(collaborator_entry(&plain), "<p>Y group</p>");
    }

    #[test]
    fn only_first_director_is_used() {
        let mut wb = Workbook::new();
        let _ = wb.add_sheet("director", vec![row(&[("name", "First")]), row(&[("name", "Second")])]);
        let reps = people_replacements(&wb, &LinkResolver::default());
        assert_eq!(reps.len(), 7);
        assert!(reps[0].1.contains("First"));
        assert!(!reps[0].1.contains("Second"));
        assert_eq!(reps[1].1, "");
    }
}
