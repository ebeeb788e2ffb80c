use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;

static STRONG_STARS: &str = r#"\*\*([^*]+)\*\*"#;
static STRONG_UNDERSCORES: &str = r#"__([^_]+)__"#;
static LINK: &str = r#"\[([^\]]+)\]\(([^)]+)\)"#;
static SHIELDED_LINK: &str = r#"\[([^\]]+)\]\(\x{E000}(\d+)\x{E001}\)"#;

const SHIELD_OPEN: char = '\u{E000}';
const SHIELD_CLOSE: char = '\u{E001}';

lazy_static! {
    static ref STRONG_STARS_REGEX: Regex = Regex::new(STRONG_STARS).unwrap();
    static ref STRONG_UNDERSCORES_REGEX: Regex = Regex::new(STRONG_UNDERSCORES).unwrap();
    static ref LINK_REGEX: Regex = Regex::new(LINK).unwrap();
    static ref SHIELDED_LINK_REGEX: Regex = Regex::new(SHIELDED_LINK).unwrap();
}

fn replace_strong(caps: &Captures) -> String {
    format!("<strong>{}</strong>", &caps[1])
}

fn replace<'a>(
    text: Cow<'a, str>,
    regex: &Regex,
    replace_func: fn(&Captures) -> String,
) -> Cow<'a, str> {
    match regex.replace_all(&text, replace_func) {
        Cow::Borrowed(_) => text,
        Cow::Owned(o) => Cow::Owned(o),
    }
}

/// Wrap `marker`-delimited spans in `<em>`.
/// The closing marker is always the next occurrence after the opener;
/// `can_open` and `can_close` are given the byte index of the candidate marker.
fn emphasise<'a, O, C>(text: Cow<'a, str>, marker: u8, can_open: O, can_close: C) -> Cow<'a, str>
where
    O: Fn(&str, usize) -> bool,
    C: Fn(&str, usize) -> bool,
{
    let bytes = text.as_bytes();
    let mut out = String::new();
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == marker && can_open(&text, i) {
            let close = bytes[i + 1..]
                .iter()
                .position(|&b| b == marker)
                .map(|offset| i + 1 + offset);
            if let Some(close) = close {
                if close > i + 1 && can_close(&text, close) {
                    out.push_str(&text[copied..i]);
                    out.push_str("<em>");
                    out.push_str(&text[i + 1..close]);
                    out.push_str("</em>");
                    copied = close + 1;
                    i = close + 1;
                    continue;
                }
            }
        }
        i += 1;
    }
    if copied == 0 {
        return text;
    }
    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

fn byte_at(text: &str, i: Option<usize>) -> Option<u8> {
    i.and_then(|i| text.as_bytes().get(i).copied())
}

fn star_can_open(text: &str, i: usize) -> bool {
    byte_at(text, i.checked_sub(1)) != Some(b'*') && byte_at(text, Some(i + 1)) != Some(b'*')
}

fn star_can_close(text: &str, i: usize) -> bool {
    byte_at(text, Some(i + 1)) != Some(b'*')
}

fn underscore_can_open(text: &str, i: usize) -> bool {
    let after_alnum = byte_at(text, i.checked_sub(1))
        .map(|b| b.is_ascii_alphanumeric())
        .unwrap_or(false);
    let content_ok = text[i + 1..]
        .chars()
        .next()
        .map(|c| c != '_' && !c.is_whitespace())
        .unwrap_or(false);
    !after_alnum && content_ok
}

fn underscore_can_close(text: &str, i: usize) -> bool {
    !byte_at(text, Some(i + 1))
        .map(|b| b.is_ascii_alphanumeric())
        .unwrap_or(false)
}

/// Convert the small subset of markdown used in spreadsheet descriptions to html.
///
/// `**bold**` and `__bold__` become `<strong>`, `*italic*` becomes `<em>`, and so does
/// `_italic_` when the underscores are not part of a word (so `snake_case` survives).
/// `[text](url)` becomes a link opening in a new tab. Link targets are set aside before
/// any emphasis is recognised, so underscores in urls are never touched.
///
/// ```
/// # use labsite_markup::markdown_to_html;
/// assert_eq!(
///     markdown_to_html("**New** paper in [Nature](https://example.com/a_b_c)!"),
///     r#"<strong>New</strong> paper in <a href="https://example.com/a_b_c" target="_blank">Nature</a>!"#
/// );
/// ```
pub fn markdown_to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut urls: Vec<String> = Vec::new();
    let shielded = LINK_REGEX.replace_all(text, |caps: &Captures| {
        urls.push(caps[2].to_string());
        format!(
            "[{}]({}{}{})",
            &caps[1],
            SHIELD_OPEN,
            urls.len() - 1,
            SHIELD_CLOSE
        )
    });

    let mut html = replace(shielded, &STRONG_STARS_REGEX, replace_strong);
    html = replace(html, &STRONG_UNDERSCORES_REGEX, replace_strong);
    html = emphasise(html, b'*', star_can_open, star_can_close);
    html = emphasise(html, b'_', underscore_can_open, underscore_can_close);

    if urls.is_empty() {
        return html.into_owned();
    }
    SHIELDED_LINK_REGEX
        .replace_all(&html, |caps: &Captures| {
            let url = caps[2]
                .parse::<usize>()
                .ok()
                .and_then(|i| urls.get(i))
                .map(String::as_str)
                .unwrap_or_default();
            format!(r#"<a href="{}" target="_blank">{}</a>"#, url, &caps[1])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_empty() {
        assert_eq!(markdown_to_html(""), "");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(markdown_to_html("Just some text."), "Just some text.");
    }

    #[test]
    fn bold() {
        assert_eq!(markdown_to_html("a **b** c"), "a <strong>b</strong> c");
        assert_eq!(markdown_to_html("a __b__ c"), "a <strong>b</strong> c");
    }

    #[test]
    fn italics() {
        assert_eq!(markdown_to_html("a *b* c"), "a <em>b</em> c");
        assert_eq!(markdown_to_html("a _b c_ d"), "a <em>b c</em> d");
    }

    #[test]
    fn bold_and_italic_together() {
        assert_eq!(
            markdown_to_html("**Bold** and *italic*"),
            "<strong>Bold</strong> and <em>italic</em>"
        );
    }

    #[test]
    fn underscores_inside_words_survive() {
        assert_eq!(markdown_to_html("use snake_case_names here"), "use snake_case_names here");
        assert_eq!(markdown_to_html("_ not emphasis_"), "_ not emphasis_");
    }

    #[test]
    fn unmatched_markers_survive() {
        assert_eq!(markdown_to_html("2 * 3 = 6"), "2 * 3 = 6");
        assert_eq!(markdown_to_html("a_b"), "a_b");
    }

    #[test]
    fn links() {
        assert_eq!(
            markdown_to_html("See [our repo](https://github.com/ContextLab)."),
            r#"See <a href="https://github.com/ContextLab" target="_blank">our repo</a>."#
        );
    }

    #[test]
    fn emphasis_inside_link_text() {
        assert_eq!(
            markdown_to_html("[**bold** link](https://x.org)"),
            r#"<a href="https://x.org" target="_blank"><strong>bold</strong> link</a>"#
        );
    }

    #[test]
    fn urls_are_never_emphasised() {
        assert_eq!(
            markdown_to_html("[docs](https://x.org/_private_/page) and _this_"),
            r#"<a href="https://x.org/_private_/page" target="_blank">docs</a> and <em>this</em>"#
        );
        assert_eq!(
            markdown_to_html("[a](https://x.org/*star*) [b](https://y.org/__init__)"),
            r#"<a href="https://x.org/*star*" target="_blank">a</a> <a href="https://y.org/__init__" target="_blank">b</a>"#
        );
    }

    #[test]
    fn emphasis_spanning_a_link() {
        assert_eq!(
            markdown_to_html("**see [here](https://x.org/a_b)**"),
            r#"<strong>see <a href="https://x.org/a_b" target="_blank">here</a></strong>"#
        );
    }
}
