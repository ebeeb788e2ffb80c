//! Fixed-pattern html citations, one per kind of publication.
//!
//! Each kind has a plain struct of fields, buildable from a spreadsheet `Row`
//! whose columns share the field names. Blank fields are empty strings.

use crate::markdown::markdown_to_html;
use labsite_sheets::Row;

/// Something which renders as a one-paragraph html citation
pub trait Citation {
    /// the citation, as html
    fn to_html(&self) -> String;
}

macro_rules! fields_from_row {
    ($name:ident { $($field:ident),* $(,)? }) => {
        impl From<&Row> for $name {
            fn from(row: &Row) -> Self {
                $name {
                    $($field: row.get_str(stringify!($field)).into_owned()),*
                }
            }
        }
    };
}

/// A journal article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFields {
    /// e.g. `Fitzpatrick PC, Heusser AC, Manning JR`
    pub authors: String,
    /// year of publication
    pub year: String,
    /// title
    pub title: String,
    /// journal name
    pub journal: String,
    /// volume
    pub volume: String,
    /// issue within the volume
    pub issue: String,
    /// page range
    pub pages: String,
    /// used in place of pages by online-only journals
    pub article_number: String,
    /// e.g. `In press`; used when there is no volume
    pub status: String,
    /// preprint identifier, e.g. `2510.21958`; replaces volume, issue and pages
    pub preprint_id: String,
}

fields_from_row!(PaperFields {
    authors,
    year,
    title,
    journal,
    volume,
    issue,
    pages,
    article_number,
    status,
    preprint_id,
});

impl Citation for PaperFields {
    fn to_html(&self) -> String {
        let mut parts = Vec::new();
        if !self.authors.is_empty() {
            parts.push(format!("{} ({}).", self.authors.trim(), self.year));
        }
        if !self.title.is_empty() {
            parts.push(format!("{}.", self.title));
        }

        let mut journal = format!("<em>{}</em>", self.journal);
        if !self.preprint_id.is_empty() {
            journal.push_str(": ");
            journal.push_str(&self.preprint_id);
        } else if !self.volume.is_empty() {
            journal.push_str(", ");
            journal.push_str(&self.volume);
            if !self.issue.is_empty() {
                journal.push_str(&format!("({})", self.issue));
            }
            if !self.pages.is_empty() {
                journal.push_str(": ");
                journal.push_str(&self.pages);
            } else if !self.article_number.is_empty() {
                journal.push_str(": ");
                journal.push_str(&self.article_number);
            }
        } else if !self.status.is_empty() {
            journal.push_str(": ");
            journal.push_str(&self.status);
        }
        journal.push('.');
        parts.push(journal);
        parts.join(" ")
    }
}

/// A preprint on an archive server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprintFields {
    /// authors
    pub authors: String,
    /// year
    pub year: String,
    /// title
    pub title: String,
    /// e.g. `arXiv`, `bioRxiv`, `PsyArXiv`
    pub archive: String,
    /// the archive's identifier
    pub archive_id: String,
}

fields_from_row!(PreprintFields {
    authors,
    year,
    title,
    archive,
    archive_id
});

impl Citation for PreprintFields {
    fn to_html(&self) -> String {
        format!(
            "{} ({}). {}. <em>{}</em>: {}.",
            self.authors.trim(),
            self.year,
            self.title,
            self.archive,
            self.archive_id
        )
    }
}

/// A chapter in an edited book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterFields {
    /// authors
    pub authors: String,
    /// year
    pub year: String,
    /// chapter title
    pub title: String,
    /// e.g. `Kahana MJ and Wagner AD`
    pub editors: String,
    /// title of the book
    pub book_title: String,
    /// e.g. `Oxford, UK`
    pub publisher_location: String,
    /// publisher
    pub publisher: String,
}

fields_from_row!(ChapterFields {
    authors,
    year,
    title,
    editors,
    book_title,
    publisher_location,
    publisher,
});

impl Citation for ChapterFields {
    fn to_html(&self) -> String {
        let mut parts = vec![format!("{} ({}) {}.", self.authors.trim(), self.year, self.title)];
        if !self.editors.is_empty() {
            parts.push(format!("Appears in {}, Ed.", self.editors));
        }
        parts.push(format!("<em>{}.</em>", self.book_title));
        if !self.publisher_location.is_empty() && !self.publisher.is_empty() {
            parts.push(format!("{}: {}.", self.publisher_location, self.publisher));
        } else if !self.publisher.is_empty() {
            parts.push(format!("{}.", self.publisher));
        }
        parts.join(" ")
    }
}

/// A dissertation or thesis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DissertationFields {
    /// author
    pub authors: String,
    /// year
    pub year: String,
    /// title
    pub title: String,
    /// e.g. `Doctoral dissertation`, `Senior thesis`
    pub degree_type: String,
    /// awarding institution
    pub institution: String,
    /// city and state
    pub location: String,
}

fields_from_row!(DissertationFields {
    authors,
    year,
    title,
    degree_type,
    institution,
    location,
});

impl Citation for DissertationFields {
    fn to_html(&self) -> String {
        format!(
            "{} ({}) {}. <em>{}: {}</em>, {}.",
            self.authors.trim(),
            self.year,
            self.title,
            self.degree_type,
            self.institution,
            self.location
        )
    }
}

/// An invited talk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkFields {
    /// speakers
    pub authors: String,
    /// year
    pub year: String,
    /// title
    pub title: String,
    /// the event
    pub venue_name: String,
    /// optional link for the event
    pub venue_url: String,
}

fields_from_row!(TalkFields {
    authors,
    year,
    title,
    venue_name,
    venue_url,
});

impl Citation for TalkFields {
    fn to_html(&self) -> String {
        let venue = if self.venue_url.is_empty() {
            format!("<em>{}</em>", self.venue_name)
        } else {
            format!(
                r#"<a href="{}" target="_blank"><em>{}</em></a>"#,
                self.venue_url, self.venue_name
            )
        };
        format!(
            "{} ({}) {}. Talk given at the {}.",
            self.authors.trim(),
            self.year,
            self.title,
            venue
        )
    }
}

/// A conference poster or abstract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosterFields {
    /// authors
    pub authors: String,
    /// year
    pub year: String,
    /// title
    pub title: String,
    /// conference name
    pub conference: String,
    /// conference location
    pub location: String,
    /// optional session or poster number
    pub session_number: String,
}

fields_from_row!(PosterFields {
    authors,
    year,
    title,
    conference,
    location,
    session_number,
});

impl Citation for PosterFields {
    fn to_html(&self) -> String {
        let mut out = format!(
            "{} ({}) {}. <em>{}.</em> {}.",
            self.authors.trim(),
            self.year,
            self.title,
            self.conference,
            self.location
        );
        if !self.session_number.is_empty() {
            out.push(' ');
            out.push_str(&self.session_number);
            out.push('.');
        }
        out
    }
}

/// A course; the citation is just its markdown description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFields {
    /// markdown description
    pub description: String,
}

fields_from_row!(CourseFields { description });

impl Citation for CourseFields {
    fn to_html(&self) -> String {
        markdown_to_html(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> PaperFields {
        PaperFields {
            authors: "Fitzpatrick PC, Manning JR ".into(),
            year: "2024".into(),
            title: "A study".into(),
            journal: "Journal of Things".into(),
            ..Default::default()
        }
    }

    #[test]
    fn paper_with_volume_issue_pages() {
        let p = PaperFields {
            volume: "12".into(),
            issue: "3".into(),
            pages: "45-67".into(),
            ..paper()
        };
        assert_eq!(
            p.to_html(),
            "Fitzpatrick PC, Manning JR (2024). A study. <em>Journal of Things</em>, 12(3): 45-67."
        );
    }

    #[test]
    fn paper_with_article_number() {
        let p = PaperFields {
            volume: "9".into(),
            article_number: "e101".into(),
            ..paper()
        };
        assert!(p.to_html().ends_with("<em>Journal of Things</em>, 9: e101."));
    }

    #[test]
    fn preprint_id_suppresses_volume() {
        let p = PaperFields {
            journal: "arXiv".into(),
            volume: "12".into(),
            preprint_id: "2510.21958".into(),
            ..paper()
        };
        assert!(p.to_html().ends_with("<em>arXiv</em>: 2510.21958."));
    }

    #[test]
    fn status_without_volume() {
        let p = PaperFields {
            status: "In press".into(),
            ..paper()
        };
        assert!(p.to_html().ends_with("<em>Journal of Things</em>: In press."));
        let v = PaperFields {
            status: "In press".into(),
            volume: "1".into(),
            ..paper()
        };
        assert!(v.to_html().ends_with("<em>Journal of Things</em>, 1."));
    }

    #[test]
    fn paper_without_authors_or_title() {
        let p = PaperFields {
            journal: "J".into(),
            ..Default::default()
        };
        assert_eq!(p.to_html(), "<em>J</em>.");
    }

    #[test]
    fn preprint() {
        let p = PreprintFields {
            authors: "Manning JR".into(),
            year: "2025".into(),
            title: "Stuff".into(),
            archive: "bioRxiv".into(),
            archive_id: "10.1101/x".into(),
        };
        assert_eq!(p.to_html(), "Manning JR (2025). Stuff. <em>bioRxiv</em>: 10.1101/x.");
    }

    #[test]
    fn chapter() {
        let c = ChapterFields {
            authors: "Manning JR".into(),
            year: "2020".into(),
            title: "Episodic memory".into(),
            editors: "Kahana MJ and Wagner AD".into(),
            book_title: "Handbook of Memory".into(),
            publisher_location: "Oxford, UK".into(),
            publisher: "Oxford University Press".into(),
        };
        assert_eq!(
            c.to_html(),
            "Manning JR (2020) Episodic memory. Appears in Kahana MJ and Wagner AD, Ed. \
             <em>Handbook of Memory.</em> Oxford, UK: Oxford University Press."
        );
        let bare = ChapterFields {
            editors: String::new(),
            publisher_location: String::new(),
            ..c
        };
        assert_eq!(
            bare.to_html(),
            "Manning JR (2020) Episodic memory. <em>Handbook of Memory.</em> Oxford University Press."
        );
    }

    #[test]
    fn dissertation() {
        let d = DissertationFields {
            authors: "Manning JR".into(),
            year: "2009".into(),
            title: "Acquiring memories".into(),
            degree_type: "Doctoral dissertation".into(),
            institution: "University of Pennsylvania".into(),
            location: "Philadelphia, PA".into(),
        };
        assert_eq!(
            d.to_html(),
            "Manning JR (2009) Acquiring memories. <em>Doctoral dissertation: University of Pennsylvania</em>, Philadelphia, PA."
        );
    }

    #[test]
    fn talk_with_and_without_venue_link() {
        let t = TalkFields {
            authors: "Manning JR".into(),
            year: "2022".into(),
            title: "Memory".into(),
            venue_name: "Annual Meeting".into(),
            venue_url: String::new(),
        };
        assert_eq!(t.to_html(), "Manning JR (2022) Memory. Talk given at the <em>Annual Meeting</em>.");
        let linked = TalkFields {
            venue_url: "https://meeting.org".into(),
            ..t
        };
        assert_eq!(
            linked.to_html(),
            r#"Manning JR (2022) Memory. Talk given at the <a href="https://meeting.org" target="_blank"><em>Annual Meeting</em></a>."#
        );
    }

    #[test]
    fn poster_with_session() {
        let p = PosterFields {
            authors: "Heusser AC".into(),
            year: "2018".into(),
            title: "Trajectories".into(),
            conference: "Society for Neuroscience".into(),
            location: "San Diego, CA".into(),
            session_number: "512.03".into(),
        };
        assert_eq!(
            p.to_html(),
            "Heusser AC (2018) Trajectories. <em>Society for Neuroscience.</em> San Diego, CA. 512.03."
        );
    }

    #[test]
    fn course_is_markdown() {
        let c = CourseFields {
            description: "An *introduction*.".into(),
        };
        assert_eq!(c.to_html(), "An <em>introduction</em>.");
    }

    #[test]
    fn fields_from_a_row() {
        let row = Row::from_iter(vec![
            ("authors", "A"),
            ("year", "2021"),
            ("title", "T"),
            ("journal", "J"),
            ("volume", "3"),
        ]);
        let p = PaperFields::from(&row);
        assert_eq!(p.volume, "3");
        assert_eq!(p.pages, "");
        assert_eq!(p.to_html(), "A (2021). T. <em>J</em>, 3.");
    }
}
