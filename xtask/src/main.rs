use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for lazyview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Replay every scroll scenario under scenarios/ through the CLI
    Scenarios {
        #[arg(long, default_value = "scenarios")]
        dir: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test()?;
            doc()?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Deny => cargo("cargo deny check", &["deny", "check", "licenses", "bans", "sources"])?,
        Commands::Doc => doc()?,
        Commands::Build => cargo("cargo build", &["build", "--workspace"])?,
        Commands::Scenarios { dir } => scenarios(Path::new(&dir))?,
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> Running {step}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{step} failed");
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo("cargo fmt --check", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "cargo clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Result<()> {
    cargo("cargo test", &["test", "--workspace"])
}

fn doc() -> Result<()> {
    cargo("cargo doc", &["doc", "--workspace", "--no-deps"])
}

fn scenarios(dir: &Path) -> Result<()> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "yaml" || ext == "yml"))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("no scenarios found in {}", dir.display());
    }

    for file in files {
        let path = file.to_string_lossy();
        cargo(
            &format!("scenario {path}"),
            &["run", "-q", "-p", "lazyview-cli", "--", "scroll", "--scenario", &path],
        )?;
    }
    Ok(())
}
