#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Maintain the Context Lab website.
//!
//! The site's pages are generated from spreadsheets under `data/` and templates
//! under `templates/`; the director's cv is kept as LaTeX under `documents/`
//! and published as both pdf and html. This crate ties the pieces together
//! behind the `labsite` command, reading any layout overrides from `site.toml`.
//!
//! ```no_run
//! use labsite::{commands, Site};
//! let site = Site::open(".", None).unwrap();
//! commands::validate(&site).unwrap();
//! commands::build(&site, None).unwrap();
//! ```
//!
//! Each of the underlying crates can also be used on its own:
//! `labsite_pages` for the pages, `labsite_cv` for the cv and its trainees,
//! and `labsite_borders` for framing images.

mod config;
pub mod commands;
pub use commands::{BorderArgs, Failed, SyncArgs};
pub use config::{ConfigError, Site, SiteConfig, CONFIG_FILE};
pub use labsite_pages::Page;
