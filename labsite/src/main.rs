use clap::{Parser, Subcommand};
use env_logger::Env;
use labsite::{commands, BorderArgs, Page, Site, SyncArgs};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process;

/// Build, check and maintain the lab website
#[derive(Debug, Parser)]
#[command(name = "labsite", version)]
struct Cli {
	/// project root
	#[arg(long, global = true, default_value = ".")]
	root: PathBuf,
	/// config file to use instead of `site.toml` in the root
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Build the pages from their spreadsheets and templates
	Build {
		/// build only this page (publications, people, software or news)
		#[arg(long)]
		page: Option<Page>,
	},
	/// Typeset the cv with xelatex, convert it to html and check both
	BuildCv,
	/// Convert the cv to html without typesetting it
	ExtractCv {
		/// LaTeX source, defaults to the configured cv
		input: Option<PathBuf>,
		/// html page to write, defaults to beside the source
		output: Option<PathBuf>,
	},
	/// Check the spreadsheets and templates
	Validate,
	/// Validate, then build every page
	PrePush,
	/// Frame images with randomly chosen hand-drawn borders
	Borders {
		/// image files, or directories of them
		#[arg(required = true)]
		inputs: Vec<PathBuf>,
		/// where framed images are written
		output_dir: PathBuf,
		/// centre square crops on a detected face
		#[arg(long)]
		face: bool,
		/// border artwork to use instead of the configured one
		#[arg(long)]
		border_svg: Option<PathBuf>,
		/// side of each finished image in pixels
		#[arg(long)]
		output_size: Option<u32>,
		/// seed for repeatable border choices
		#[arg(long)]
		seed: Option<u64>,
	},
	/// List the trainees found in the cv
	Trainees,
	/// Compare the cv's trainees with the people spreadsheet
	SyncTrainees {
		/// print the actions as json
		#[arg(long)]
		json: bool,
		/// add the missing trainees to the spreadsheet (default: dry run)
		#[arg(long)]
		apply: bool,
		/// sort the members sheet by role
		#[arg(long, requires = "apply")]
		sort: bool,
	},
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
	let site = Site::open(cli.root, cli.config.as_deref())?;
	match cli.command {
		Command::Build { page } => commands::build(&site, page),
		Command::BuildCv => commands::build_cv(&site),
		Command::ExtractCv { input, output } => commands::extract_cv(&site, input, output),
		Command::Validate => commands::validate(&site),
		Command::PrePush => commands::pre_push(&site),
		Command::Borders {
			inputs,
			output_dir,
			face,
			border_svg,
			output_size,
			seed,
		} => commands::borders(
			&site,
			BorderArgs {
				inputs,
				output_dir,
				border_svg,
				output_size,
				face,
				seed,
			},
		),
		Command::Trainees => commands::trainees(&site),
		Command::SyncTrainees { json, apply, sort } => {
			commands::sync_trainees(&site, SyncArgs { json, apply, sort })
		}
	}
}

fn main() {
	let cli = Cli::parse();
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
	if let Err(e) = run(cli) {
		error!("{}", e);
		process::exit(1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_is_well_formed() {
		Cli::command().debug_assert();
	}

	#[test]
	fn borders_takes_inputs_then_output() {
		let cli = Cli::try_parse_from(["labsite", "borders", "a.png", "dir", "out", "--seed", "3"]).unwrap();
		match cli.command {
			Command::Borders {
				inputs,
				output_dir,
				seed,
				face,
				..
			} => {
				assert_eq!(inputs, vec![PathBuf::from("a.png"), PathBuf::from("dir")]);
				assert_eq!(output_dir, PathBuf::from("out"));
				assert_eq!(seed, Some(3));
				assert!(!face);
			}
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn pages_and_global_flags() {
		let cli = Cli::try_parse_from(["labsite", "build", "--page", "news", "--root", "/site"]).unwrap();
		assert_eq!(cli.root, PathBuf::from("/site"));
		assert!(matches!(cli.command, Command::Build { page: Some(Page::News) }));
		assert!(Cli::try_parse_from(["labsite", "build", "--page", "blog"]).is_err());
		assert!(Cli::try_parse_from(["labsite", "borders", "only_one"]).is_err());
	}

	#[test]
	fn sorting_needs_apply() {
		let cli = Cli::try_parse_from(["labsite", "sync-trainees", "--apply", "--sort"]).unwrap();
		assert!(matches!(
			cli.command,
			Command::SyncTrainees {
				json: false,
				apply: true,
				sort: true
			}
		));
		let dry = Cli::try_parse_from(["labsite", "sync-trainees"]).unwrap();
		assert!(matches!(dry.command, Command::SyncTrainees { apply: false, .. }));
		assert!(Cli::try_parse_from(["labsite", "sync-trainees", "--sort"]).is_err());
	}
}
