use anyhow::{Context, Result};
use clap::{crate_version, App, Arg};
use quire::{build_site, Config};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let matches = App::new("quire")
        .version(crate_version!())
        .about("Builds a static site from a content tree and a template tree")
        .arg(
            Arg::with_name("project")
                .long("project")
                .value_name("DIR")
                .takes_value(true)
                .help("The project directory (searched upward for quire.yaml)"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .value_name("DIR")
                .takes_value(true)
                .help("Overrides the output directory"),
        )
        .arg(
            Arg::with_name("drafts")
                .long("drafts")
                .help("Includes pages marked as drafts"),
        )
        .arg(
            Arg::with_name("base-url")
                .long("base-url")
                .value_name("HOST")
                .takes_value(true)
                .help("Overrides the host feed links point at"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .help("Logs every discovered template and page"),
        )
        .get_matches();

    let default_filter = if matches.is_present("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let project = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("Getting the current directory")?,
    };
    let mut config = Config::from_directory(&project)
        .with_context(|| format!("Loading configuration from {}", project.display()))?;
    if let Some(output) = matches.value_of("output") {
        config.output_directory = Path::new(output).to_owned();
    }
    if matches.is_present("drafts") {
        config.include_drafts = true;
    }
    if let Some(base_url) = matches.value_of("base-url") {
        config.base_url = base_url.to_owned();
    }

    build_site(&config).context("Building site")?;
    log::info!("Site written to {}", config.output_directory.display());
    Ok(())
}
