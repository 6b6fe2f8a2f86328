use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gitrefs::git::{Ref, RefType, Repository, is_fatal};
use gitrefs::styling::{
    BOLD, DIM, ERROR, ERROR_EMOJI, SUCCESS, SUCCESS_EMOJI, WARNING, WARNING_EMOJI, eprintln,
    println,
};

#[derive(Parser)]
#[command(name = "grf")]
#[command(about = "Inspect and manage git refs", long_about = None)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', global = true, value_name = "PATH")]
    directory: Option<PathBuf>,

    /// Log every git invocation (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show uncommitted and untracked changes
    Status,
    /// Resolve a name to a ref
    Show { name: String },
    /// List all refs
    List,
    /// Check if every commit of OTHER is reachable from REF
    Contains {
        #[arg(value_name = "REF")]
        target: String,
        other: String,
    },
    /// Create a branch
    Branch { name: String, base: Option<String> },
    /// Create a tag
    Tag { name: String, base: Option<String> },
    /// Delete a branch or tag
    Delete { name: String },
    /// Check out a ref
    Checkout { name: String },
    /// Show the remote a branch tracks
    Tracks { branch: String },
    /// Make a branch track the same-named branch on a remote
    Track { branch: String, remote: String },
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{ERROR_EMOJI} {ERROR}{e:#}{ERROR:#}");
            ExitCode::from(if is_fatal(&e) { 2 } else { 1 })
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let path = cli.directory.unwrap_or_else(|| PathBuf::from("."));
    let repo = Repository::open(&path)
        .with_context(|| format!("Failed to open repository at {}", path.display()))?;

    match cli.command {
        Commands::Status => status(&repo)?,
        Commands::Show { name } => print_ref(&repo.find_ref(&name)?),
        Commands::List => {
            for r in repo.refs()? {
                print_ref(&r);
            }
        }
        Commands::Contains { target, other } => return contains(&repo, &target, &other),
        Commands::Branch { name, base } => create(&repo, RefType::Branch, &name, base)?,
        Commands::Tag { name, base } => create(&repo, RefType::Tag, &name, base)?,
        Commands::Delete { name } => {
            let r = repo.find_ref(&name)?;
            r.delete()?;
            println!("{SUCCESS_EMOJI} {SUCCESS}Deleted {}{SUCCESS:#}", r.path());
        }
        Commands::Checkout { name } => repo.find_ref(&name)?.checkout()?,
        Commands::Tracks { branch } => println!("{}", repo.find_ref(&branch)?.tracks()?),
        Commands::Track { branch, remote } => {
            let r = repo.find_ref(&branch)?;
            r.track_remote(&remote)?;
            if !r.has_remote_ref(&remote)? {
                eprintln!(
                    "{WARNING_EMOJI} {WARNING}{remote} has no branch {} yet{WARNING:#}",
                    r.name()
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Exits 1 when `other` has commits that `target` lacks.
fn contains(repo: &Repository, target: &str, other: &str) -> anyhow::Result<ExitCode> {
    let r = repo.find_ref(target)?;
    let other = repo.find_ref(other)?;
    if r.contains(&other)? {
        println!("{BOLD}{}{BOLD:#} contains {BOLD}{}{BOLD:#}", r.path(), other.path());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{BOLD}{}{BOLD:#} does not contain {BOLD}{}{BOLD:#}",
            r.path(),
            other.path()
        );
        Ok(ExitCode::FAILURE)
    }
}

fn status(repo: &Repository) -> anyhow::Result<()> {
    let (clean, lines) = repo.is_clean()?;
    if clean {
        println!("{SUCCESS_EMOJI} {SUCCESS}Working tree clean{SUCCESS:#}");
        return Ok(());
    }
    for line in &lines {
        println!("{line}");
    }
    Ok(())
}

fn create(
    repo: &Repository,
    ref_type: RefType,
    name: &str,
    base: Option<String>,
) -> anyhow::Result<()> {
    let base = base.unwrap_or_else(|| "HEAD".to_string());
    let created = repo.make_ref(ref_type, name, &base)?;
    println!(
        "{SUCCESS_EMOJI} {SUCCESS}Created {ref_type} {}{SUCCESS:#} {DIM}{}{DIM:#}",
        created.name(),
        created.sha()
    );
    Ok(())
}

fn print_ref(r: &Ref<'_>) {
    println!("{DIM}{}{DIM:#} {} {BOLD}{}{BOLD:#}", r.sha(), r.kind(), r.path());
}
