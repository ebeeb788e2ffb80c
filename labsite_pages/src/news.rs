use crate::{external_link, Replacements};
use labsite_common::escape_attribute;
use labsite_sheets::Row;
use std::cmp::Reverse;

/// Sort news rows newest first.
/// Rows whose `date` is blank or not `YYYY-MM-DD` go last; ties keep their sheet order.
pub fn sort_news(rows: &mut [Row]) {
    rows.sort_by_key(|row| Reverse(row.get("date").and_then(|d| d.as_date())));
}

/// One news item
pub fn news_item(row: &Row) -> String {
    let image = row.get_str("image");
    let image_src = if image.is_empty() {
        String::new()
    } else {
        format!("images/news/{}", image)
    };
    let title = row.get_str("title");
    let title_display = if row.has("title_url") {
        external_link(&row.get_str("title_url"), &title)
    } else {
        title.to_string()
    };
    let links = row.get_str("links_html");
    let links_p = if links.is_empty() {
        String::new()
    } else {
        format!("\n                        <p>{}</p>", links)
    };
    format!(
        r#"                <div class="news-item">
                    <img src="{}" alt="{}" class="news-thumbnail">
                    <div class="news-content">
                        <h3>{}</h3>
                        <p>{}</p>{}
                    </div>
                </div>"#,
        image_src,
        escape_attribute(&*title),
        title_display,
        row.get_str("content"),
        links_p
    )
}

/// Html for the news marker, newest item first
pub fn news_replacements(rows: &[Row]) -> Replacements {
    let mut rows = rows.to_vec();
    sort_news(&mut rows);
    let items: Vec<String> = rows.iter().map(news_item).collect();
    vec![("NEWS_CONTENT", items.join("\n\n"))]
}
