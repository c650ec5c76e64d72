use decomment_core::{
    FileOutcome, ProcessError, ProcessOptions, Reporter, Summary, WalkerConfig, resolve_targets,
    run, validate_root,
};
mod interaction;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use console::style;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser, Clone)]
pub struct DecommentArgs {
    #[clap(
        help = "Directories to process [default: ./frontend and ./backend if present, else .]"
    )]
    pub paths: Vec<PathBuf>,

    #[clap(short = 'y', long = "yes", help = "Skip the confirmation prompt")]
    pub yes: bool,

    #[clap(long, help = "Report which files would change without writing them")]
    pub dry_run: bool,

    #[clap(long, help = "Process files in parallel")]
    pub parallel: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    #[clap(about = "Generate shell completion scripts")]
    Completion(CompletionArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct CompletionArgs {
    #[clap(value_parser = clap::value_parser!(clap_complete::Shell))]
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "decomment",
    version,
    about = "Strip comments from JS/TS, Python, CSS and HTML sources in place",
    long_about = "Walks the project, removes comments from every supported source file and rewrites the files that changed.\nDependency, build and VCS directories are skipped.",
    args_conflicts_with_subcommands = true
)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<Command>,

    #[clap(flatten)]
    pub main_opts: DecommentArgs,
}

fn print_completions_cli(shell: clap_complete::Shell) {
    let mut cmd = CliArgs::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
}

fn print_banner(config: &WalkerConfig) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("  {}", style("REMOVE COMMENTS").bold());
    println!("{}", rule);
    println!();
    println!(
        "{}",
        style("⚠️  WARNING: This will remove ALL comments from code files!").yellow()
    );
    let extensions: Vec<String> = config.extensions().map(|e| format!(".{}", e)).collect();
    println!("   Supported: {}", extensions.join(" "));
    println!();
}

/// Console progress in the order files are visited.
struct ConsoleReporter {
    root: PathBuf,
    dry_run: bool,
}

impl ConsoleReporter {
    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

impl Reporter for ConsoleReporter {
    fn on_file_start(&mut self, path: &Path) {
        println!("Processing: {}", style(self.relative(path).display()).dim());
    }

    fn on_file_done(&mut self, outcome: &FileOutcome) {
        match (outcome.modified, self.dry_run) {
            (true, false) => println!("  {} Comments removed", style("✅").green()),
            (true, true) => println!("  {} Comments found (dry run)", style("✅").green()),
            (false, _) => println!("  {}  No comments found", style("⏭️").dim()),
        }
    }

    // The cause itself is already logged by the processor.
    fn on_file_error(&mut self, error: &ProcessError) {
        eprintln!(
            "  {} Failed: {}",
            style("⚠️").yellow(),
            style(self.relative(error.path()).display()).red()
        );
    }
}

fn print_summary(summary: &Summary) {
    println!("{}", "-".repeat(60));
    println!("\n📊 Summary:");
    println!("   Files processed: {}", style(summary.processed).cyan());
    println!("   Files modified: {}", style(summary.modified).green());
    println!("   Files unchanged: {}", summary.unchanged);
    if summary.failed > 0 {
        println!("   Files failed: {}", style(summary.failed).red());
    }
}

fn process_root(config: &WalkerConfig, root: &Path, options: ProcessOptions) -> Summary {
    println!("{}", style(format!("📦 Processing {}...", root.display())).bold());
    println!("🔍 Scanning for code files...");
    let absolute = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    println!("📁 Root directory: {}", absolute.display());
    println!("{}", "-".repeat(60));

    let mut reporter = ConsoleReporter {
        root: root.to_path_buf(),
        dry_run: options.dry_run,
    };
    let summary = run(config, root, options, &mut reporter);
    print_summary(&summary);
    summary
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli: CliArgs = CliArgs::parse();

    if let Some(command_enum_val) = cli.command {
        match command_enum_val {
            Command::Completion(args) => {
                print_completions_cli(args.shell);
                return Ok(ExitCode::SUCCESS);
            }
        }
    }

    let args = cli.main_opts;
    let config = WalkerConfig::default();
    print_banner(&config);

    match interaction::confirm_processing(args.yes) {
        Ok(true) => {}
        Ok(false) => return Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!(
                "{}",
                style(format!("Error during confirmation: {}", e)).red()
            );
            return Ok(ExitCode::FAILURE);
        }
    }

    let roots = if args.paths.is_empty() {
        resolve_targets(&config, Path::new("."))
    } else {
        args.paths
    };
    for root in &roots {
        if let Err(e) = validate_root(root) {
            eprintln!("{}", style(format!("Error: {}", e)).red());
            return Ok(ExitCode::FAILURE);
        }
    }

    let options = ProcessOptions {
        dry_run: args.dry_run,
        parallel: args.parallel,
    };
    log::debug!("processing {} root(s) with {:?}", roots.len(), options);

    let mut total = Summary::default();
    for root in &roots {
        println!();
        total += process_root(&config, root, options);
    }
    if roots.len() > 1 {
        println!(
            "\n🧮 Total: {} processed, {} modified, {} unchanged",
            total.processed, total.modified, total.unchanged
        );
    }
    println!("\n✨ Done!");

    Ok(ExitCode::SUCCESS)
}
