use labsite_borders::BorderOptions;
use labsite_cv::{CvError, CvPaths, NicknameTable, Xelatex};
use labsite_markup::LinkResolver;
use labsite_pages::SitePaths;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The file looked for in the project root when no config is named
pub const CONFIG_FILE: &str = "site.toml";

/// Optional overrides of the project layout, read from `site.toml`.
///
/// Every field may be omitted; relative paths are taken from the project root.
///
/// ```
/// # use labsite::SiteConfig;
/// let config = SiteConfig::from_toml_str("cv_stem = \"CV\"\nlatex_timeout_secs = 30").unwrap();
/// assert_eq!(config.cv_stem, "CV");
/// assert_eq!(config.data_dir, std::path::PathBuf::from("data"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
	/// page workbooks
	pub data_dir: PathBuf,
	/// page templates
	pub templates_dir: PathBuf,
	/// where generated pages go
	pub output_dir: PathBuf,
	/// the cv's source and renditions
	pub documents_dir: PathBuf,
	/// thumbnails and photos
	pub images_dir: PathBuf,
	/// file stem of the cv, as in `JRM_CV.tex`
	pub cv_stem: String,
	/// root of the published site
	pub site_url: String,
	/// root of the repository's file browser
	pub repo_blob_url: String,
	/// artwork holding the image borders
	pub border_svg: PathBuf,
	/// replaces the built-in nickname table when set
	pub nicknames: Option<PathBuf>,
	/// how long a single xelatex pass may run
	pub latex_timeout_secs: u64,
}

impl Default for SiteConfig {
	fn default() -> Self {
		let links = LinkResolver::default();
		SiteConfig {
			data_dir: "data".into(),
			templates_dir: "templates".into(),
			output_dir: ".".into(),
			documents_dir: "documents".into(),
			images_dir: "images".into(),
			cv_stem: "JRM_CV".to_string(),
			site_url: links.site_url,
			repo_blob_url: links.repo_blob_url,
			border_svg: "images/templates/WebsiteDoodles_Posters_v1.svg".into(),
			nicknames: None,
			latex_timeout_secs: 120,
		}
	}
}

/// A config file which could not be used
#[derive(Debug)]
pub enum ConfigError {
	/// the file could not be read
	Read {
		/// the file concerned
		path: PathBuf,
		/// the underlying error
		source: std::io::Error,
	},
	/// the file is not a valid config
	Parse {
		/// the file concerned
		path: PathBuf,
		/// the underlying error
		source: toml::de::Error,
	},
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Read { path, source } => write!(f, "Could not read {}: {}", path.display(), source),
			ConfigError::Parse { path, source } => write!(f, "Invalid config {}: {}", path.display(), source),
		}
	}
}

impl Error for ConfigError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			ConfigError::Read { source, .. } => Some(source),
			ConfigError::Parse { source, .. } => Some(source),
		}
	}
}

impl SiteConfig {
	/// Parse a config from toml text
	pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	/// Read a config file
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}
}

/// A project root together with its configuration
#[derive(Debug, Clone)]
pub struct Site {
	/// the directory everything else is relative to
	pub root: PathBuf,
	/// the layout and settings in force
	pub config: SiteConfig,
}

impl Site {
	/// A site with the given configuration
	pub fn new<P: Into<PathBuf>>(root: P, config: SiteConfig) -> Self {
		Site {
			root: root.into(),
			config,
		}
	}

	/// Open the site at `root`, reading `config` if given, otherwise `site.toml`
	/// in the root if there is one, otherwise using the defaults
	pub fn open<P: Into<PathBuf>>(root: P, config: Option<&Path>) -> Result<Self, ConfigError> {
		let root = root.into();
		let config = match config {
			Some(path) => SiteConfig::load(path)?,
			None => {
				let default_file = root.join(CONFIG_FILE);
				if default_file.is_file() {
					SiteConfig::load(default_file)?
				} else {
					SiteConfig::default()
				}
			}
		};
		Ok(Site::new(root, config))
	}

	/// `path` taken relative to the root, unless it is absolute
	pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
		self.root.join(path)
	}

	/// Where each page's inputs and outputs live
	pub fn site_paths(&self) -> SitePaths {
		SitePaths {
			data_dir: self.resolve(&self.config.data_dir),
			templates_dir: self.resolve(&self.config.templates_dir),
			output_dir: self.resolve(&self.config.output_dir),
			images_dir: self.resolve(&self.config.images_dir),
			resolver: LinkResolver::new(self.config.site_url.as_str(), self.config.repo_blob_url.as_str()),
		}
	}

	/// The cv's source and renditions
	pub fn cv_paths(&self) -> CvPaths {
		CvPaths::new(self.resolve(&self.config.documents_dir), self.config.cv_stem.as_str())
	}

	/// The workbook listing lab members and alumni
	pub fn people_workbook(&self) -> PathBuf {
		self.resolve(&self.config.data_dir).join("people.xlsx")
	}

	/// The typesetter, with the configured timeout
	pub fn xelatex(&self) -> Xelatex {
		Xelatex::with_timeout(Duration::from_secs(self.config.latex_timeout_secs))
	}

	/// The configured nickname table, or the built-in one
	pub fn nicknames(&self) -> Result<NicknameTable, CvError> {
		match self.config.nicknames {
			Some(ref path) => NicknameTable::load(self.resolve(path)),
			None => NicknameTable::builtin(),
		}
	}

	/// Options for framing `inputs` into `output_dir` with the configured artwork
	pub fn border_options(&self, inputs: Vec<PathBuf>, output_dir: PathBuf) -> BorderOptions {
		BorderOptions::new(inputs, output_dir, self.resolve(&self.config.border_svg))
	}
}
