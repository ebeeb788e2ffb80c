use image::{Rgba, RgbaImage};
use labsite::{commands, BorderArgs, Failed, Page, Site, SiteConfig, SyncArgs};
use labsite_sheets::{load_workbook, save_workbook, Row, Workbook};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

static CV: &str = r"\documentclass{article}
\begin{document}
{\LARGE Jeremy R. Manning}\\
Dartmouth College
\section*{Employment}
Professor
\section*{Education}
Ph.D.
\section*{Publications}
\begin{etaremune}
\item A paper.
\end{etaremune}
\section*{Mentorship}
\textit{Postdoctoral Advisees}
\begin{etaremune}
\item Paxton Fitzpatrick (2024 -- )
\end{etaremune}
\textit{Graduate Advisees}
\begin{etaremune}
\item Will Baxley (Doctoral student; 2022 -- )
\end{etaremune}
\textit{Undergraduate Advisees}
\begin{etaremune}
\item Jane Doe (2019 -- 2020)
\end{etaremune}
\end{document}
";

fn row(pairs: &[(&str, &str)]) -> Row {
	pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn write_site(root: &Path) {
	let templates = root.join("templates");
	fs::create_dir_all(&templates).unwrap();
	let markers: [(&str, &[&str]); 4] = [
		(
			"publications",
			&[
				"PAPERS_CONTENT",
				"CHAPTERS_CONTENT",
				"DISSERTATIONS_CONTENT",
				"TALKS_CONTENT",
				"COURSES_CONTENT",
				"POSTERS_CONTENT",
			],
		),
		(
			"people",
			&[
				"DIRECTOR_CONTENT",
				"MEMBERS_CONTENT",
				"ALUMNI_POSTDOCS_CONTENT",
				"ALUMNI_GRADS_CONTENT",
				"ALUMNI_MANAGERS_CONTENT",
				"ALUMNI_UNDERGRADS_CONTENT",
				"COLLABORATORS_CONTENT",
			],
		),
		("software", &["PYTHON_CONTENT", "JAVASCRIPT_CONTENT", "MATLAB_CONTENT"]),
		("news", &["NEWS_CONTENT"]),
	];
	for (page, names) in markers.iter() {
		let body: Vec<String> = names.iter().map(|m| format!("<!-- {} -->", m)).collect();
		fs::write(templates.join(format!("{}.html", page)), body.join("\n")).unwrap();
	}

	let data = root.join("data");
	fs::create_dir_all(&data).unwrap();
	let mut publications = Workbook::new();
	let _ = publications.add_sheet(
		"papers",
		vec![row(&[("title", "Memory"), ("authors", "Manning JR"), ("year", "2021"), ("journal", "Cognition")])],
	);
	save_workbook(data.join("publications.xlsx"), &publications).unwrap();

	let mut people = Workbook::new();
	let _ = people
		.add_sheet("director", vec![row(&[("name", "Jeremy R. Manning")])])
		.add_sheet(
			"members",
			vec![
				row(&[("name", "Paxton Fitzpatrick"), ("role", "postdoc")]),
				row(&[("name", "William Baxley"), ("role", "grad student")]),
				row(&[("name", "Sam Unlisted"), ("role", "grad student")]),
			],
		)
		.add_sheet("alumni_undergrads", vec![row(&[("name", "Jane Doe"), ("years", "2019-2020")])]);
	save_workbook(data.join("people.xlsx"), &people).unwrap();

	let mut software = Workbook::new();
	let _ = software.add_sheet("python", vec![row(&[("name", "hypertools"), ("description", "Plots.")])]);
	save_workbook(data.join("software.xlsx"), &software).unwrap();

	let mut news = Workbook::new();
	let _ = news.add_sheet("news", vec![row(&[("title", "Hello"), ("date", "2024-01-02")])]);
	save_workbook(data.join("news.xlsx"), &news).unwrap();

	fs::create_dir_all(root.join("documents")).unwrap();
	fs::write(root.join("documents/JRM_CV.tex"), CV).unwrap();
}

fn site(root: &Path) -> Site {
	Site::new(root, SiteConfig::default())
}

#[test]
fn validate_and_build() {
	let dir = tempdir().unwrap();
	write_site(dir.path());
	let site = site(dir.path());

	commands::validate(&site).unwrap();
	commands::pre_push(&site).unwrap();
	for page in Page::ALL.iter() {
		assert!(dir.path().join(page.output_file()).exists());
	}

	fs::remove_file(dir.path().join("news.html")).unwrap();
	commands::build(&site, Some(Page::News)).unwrap();
	let news = fs::read_to_string(dir.path().join("news.html")).unwrap();
	assert!(news.contains("Hello"));
	assert!(!news.contains("<!-- NEWS_CONTENT -->"));
}

#[test]
fn broken_template_fails_the_build() {
	let dir = tempdir().unwrap();
	write_site(dir.path());
	fs::write(dir.path().join("templates/software.html"), "<!-- PYTHON_CONTENT -->").unwrap();
	let site = site(dir.path());

	let err = commands::build(&site, None).unwrap_err();
	assert!(err.downcast_ref::<Failed>().is_some());
	assert!(commands::pre_push(&site).is_err());
	// the other pages are still written
	assert!(dir.path().join("people.html").exists());
	assert!(!dir.path().join("software.html").exists());
}

#[test]
fn cv_commands() {
	let dir = tempdir().unwrap();
	write_site(dir.path());
	let site = site(dir.path());

	commands::extract_cv(&site, None, None).unwrap();
	let html = fs::read_to_string(dir.path().join("documents/JRM_CV.html")).unwrap();
	assert!(html.contains("JRM_CV.pdf"));

	let elsewhere = dir.path().join("out/cv.html");
	commands::extract_cv(&site, Some(dir.path().join("documents/JRM_CV.tex")), Some(elsewhere.clone())).unwrap();
	assert!(elsewhere.exists());

	commands::trainees(&site).unwrap();
	commands::sync_trainees(&site, SyncArgs::default()).unwrap();
	commands::sync_trainees(&site, SyncArgs { json: true, ..Default::default() }).unwrap();
	// a dry run leaves the workbook alone
	let people = dir.path().join("data/people.xlsx");
	assert_eq!(load_workbook(&people).unwrap().rows("members").len(), 3);
}

#[test]
fn sync_applies_to_the_people_workbook() {
	let dir = tempdir().unwrap();
	write_site(dir.path());
	let site = site(dir.path());
	let people = dir.path().join("data/people.xlsx");
	let mut workbook = load_workbook(&people).unwrap();
	if let Some(sheet) = workbook.get_mut("alumni_undergrads") {
		sheet.rows = vec![row(&[("name", "Pat Earlier"), ("years", "2015")])];
	}
	save_workbook(&people, &workbook).unwrap();

	commands::sync_trainees(&site, SyncArgs { apply: true, sort: true, ..Default::default() }).unwrap();
	let workbook = load_workbook(&people).unwrap();
	let undergrads = workbook.rows("alumni_undergrads");
	assert_eq!(undergrads.len(), 2);
	assert_eq!(undergrads[1].get_str("name"), "Jane Doe");
	assert_eq!(undergrads[1].get_str("years"), "2019-2020");
	let roles: Vec<String> = workbook.rows("members").iter().map(|r| r.get_trimmed("role")).collect();
	assert_eq!(roles, vec!["postdoc", "grad student", "grad student"]);
}

#[test]
fn configured_layout() {
	let dir = tempdir().unwrap();
	write_site(dir.path());
	fs::rename(dir.path().join("documents"), dir.path().join("tex")).unwrap();
	fs::write(
		dir.path().join("site.toml"),
		"documents_dir = \"tex\"\noutput_dir = \"public\"\n",
	)
	.unwrap();
	fs::create_dir_all(dir.path().join("public")).unwrap();
	let site = Site::open(dir.path(), None).unwrap();

	commands::extract_cv(&site, None, None).unwrap();
	assert!(dir.path().join("tex/JRM_CV.html").exists());
	commands::build(&site, Some(Page::Software)).unwrap();
	assert!(dir.path().join("public/software.html").exists());
}

#[test]
fn borders_with_explicit_artwork() {
	let dir = tempdir().unwrap();
	let photo = dir.path().join("photo.png");
	RgbaImage::from_pixel(64, 48, Rgba([40, 90, 200, 255])).save(&photo).unwrap();
	let svg = dir.path().join("art.svg");
	let mut art = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg" width="932.84" height="2493.86">"#);
	for (x, y) in labsite_borders::BORDER_ORIGINS.iter() {
		art.push_str(&format!(
			r#"<rect x="{}" y="{}" width="388" height="388" fill="none" stroke="black" stroke-width="24"/>"#,
			x + 12.0,
			y + 12.0
		));
	}
	art.push_str("</svg>");
	fs::write(&svg, art).unwrap();

	let site = site(dir.path());
	let out = dir.path().join("framed");
	commands::borders(
		&site,
		BorderArgs {
			inputs: vec![photo],
			output_dir: out.clone(),
			border_svg: Some(svg),
			output_size: Some(200),
			face: false,
			seed: Some(1),
		},
	)
	.unwrap();
	let framed = image::open(out.join("photo.png")).unwrap();
	assert_eq!((framed.width(), framed.height()), (200, 200));

	// the configured artwork does not exist in this project
	let missing = BorderArgs {
		inputs: vec![dir.path().join("photo.png")],
		output_dir: out,
		..Default::default()
	};
	assert!(commands::borders(&site, missing).is_err());
}
