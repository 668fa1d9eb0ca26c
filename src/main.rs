use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use sideloader::config::SiteConfig;
use sideloader::deploy::DeployOverrides;
use sideloader::sideloader::{RunOptions, Sideloader};
use sideloader::StderrLogger;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "sideloader")]
#[command(version = VERSION)]
#[command(about = "Build and package a git repository as a native package")]
struct Cli {
    /// URL of the git repository to build
    git_url: String,

    /// Branch to check out (defaults to the site config's default branch)
    #[arg(long)]
    branch: Option<String>,

    /// Build number, used for the default package version
    #[arg(long)]
    build: Option<u32>,

    /// Workspace identifier (defaults to the repository name)
    #[arg(long)]
    id: Option<String>,

    /// Deploy file to read from the repository
    #[arg(long, default_value = ".deploy.yaml")]
    deploy_file: String,

    /// Override the package name
    #[arg(long)]
    name: Option<String>,

    /// Override the build script
    #[arg(long)]
    build_script: Option<String>,

    /// Override the postinstall script
    #[arg(long)]
    postinst_script: Option<String>,

    /// Deploy type: dir, python or virtualenv
    #[arg(long, default_value = "virtualenv")]
    dtype: String,

    /// Package format to produce
    #[arg(long, default_value = "deb", value_parser = ["deb", "rpm"])]
    packman: String,

    /// Site configuration file
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Skip GPG signing of the built packages
    #[arg(long)]
    no_sign: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log = StderrLogger::new(cli.debug);

    match run(&cli, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error[{}]: {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, log: &StderrLogger) -> sideloader::Result<()> {
    let config = SiteConfig::load(Path::new(&cli.config))?;

    let overrides = DeployOverrides {
        name: cli.name.clone(),
        buildscript: cli.build_script.clone(),
        postinstall: cli.postinst_script.clone(),
        ..DeployOverrides::default()
    };

    let options = RunOptions {
        deploy_file: cli.deploy_file.clone(),
        deploy_type: cli.dtype.clone(),
        target: cli.packman.clone(),
        build_number: cli.build,
        sign: !cli.no_sign,
        debug: cli.debug,
        overrides,
    };

    Sideloader::new(
        config,
        &cli.git_url,
        cli.branch.clone(),
        cli.id.clone(),
        log,
    )?
    .run(&options)
}
