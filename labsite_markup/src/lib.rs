#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Text formatting shared by the page builders: a minimal markdown converter,
//! the link mini-languages found in spreadsheet cells, link resolution,
//! and fixed-pattern citations for each kind of publication.

mod citation;
mod links;
mod markdown;

pub use citation::{
    ChapterFields, Citation, CourseFields, DissertationFields, PaperFields, PosterFields,
    PreprintFields, TalkFields,
};
pub use links::{
    parse_extra_links, parse_labeled_links, LinkResolver, LinkSpec, DOCUMENTS_BASE_PATH,
    PDF_BASE_PATH,
};
pub use markdown::markdown_to_html;
