use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use changelog::{ChangelogError, EmptySectionPolicy, Extraction, Release};

#[derive(Parser)]
#[command(
    name = "changelog",
    version,
    about = "Get items from a CHANGELOG.md file for a specific release or that are unreleased"
)]
struct Cli {
    /// Path to the CHANGELOG.md file
    path: PathBuf,

    /// Release to extract: "unreleased", "latest" or a release name (case-insensitive)
    #[arg(short, long, env = "CHANGELOG_RELEASE", default_value = "unreleased")]
    release: Release,

    /// Fail when the release heading has no bullet list directly beneath it
    #[arg(long)]
    strict: bool,

    /// List every release heading and exit
    #[arg(long)]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Disable colored error output
    #[arg(long)]
    no_color: bool,
}

/// Initialize tracing on stderr. Silent unless `-v` is given; `RUST_LOG`
/// overrides the level derived from the flag count.
fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,changelog=info".to_string(),
            2 => "info,changelog=debug".to_string(),
            _ => "debug,changelog=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !cli.path.is_file() {
        Cli::command()
            .error(
                ErrorKind::ValueValidation,
                format!("Changelog does not exist at path {}", cli.path.display()),
            )
            .exit();
    }

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let mut reporter = Reporter::new(color_choice);

    // Read source
    let source = match std::fs::read(&cli.path) {
        Ok(bytes) => bytes,
        Err(source) => {
            let error = ChangelogError::Io {
                path: cli.path.clone(),
                source,
            };
            reporter.fail(&error, 0);
        }
    };

    let file_id = reporter.add_file(
        cli.path.display().to_string(),
        String::from_utf8_lossy(&source).into_owned(),
    );

    // Parse
    let changelog = match changelog::parser::Parser::new(source, file_id).parse() {
        Ok(changelog) => changelog,
        Err(error) => {
            let file_id = error.file_id;
            reporter.fail(&ChangelogError::from(error), file_id)
        }
    };

    // --list: print all release headings
    if cli.list {
        for title in changelog::section::releases(&changelog) {
            println!("{}", title);
        }
        return;
    }

    let policy = if cli.strict {
        EmptySectionPolicy::Strict
    } else {
        EmptySectionPolicy::Lenient
    };

    match changelog::extract_release(&changelog, &cli.release, policy) {
        Ok(Extraction::Entries(entries)) => {
            tracing::debug!(release = %cli.release, lines = entries.lines().count(), "extracted entries");
            println!("{}", entries);
        }
        Ok(Extraction::Empty { heading }) => {
            tracing::info!(
                offset = heading.start,
                "Changelog does not contain elements in the '{}' section",
                cli.release.display_name()
            );
            println!();
        }
        Err(error) => reporter.fail(&error, changelog.source_id),
    }
}

/// Renders errors to stderr as codespan diagnostics.
struct Reporter {
    writer: StandardStream,
    config: term::Config,
    files: SimpleFiles<String, String>,
}

impl Reporter {
    fn new(color_choice: ColorChoice) -> Self {
        Reporter {
            writer: StandardStream::stderr(color_choice),
            config: term::Config::default(),
            files: SimpleFiles::new(),
        }
    }

    fn add_file(&mut self, name: String, source: String) -> usize {
        self.files.add(name, source)
    }

    fn fail(&self, error: &ChangelogError, file_id: usize) -> ! {
        let diagnostic = error.to_diagnostic(file_id);
        if term::emit_to_write_style(&mut self.writer.lock(), &self.config, &self.files, &diagnostic).is_err() {
            eprintln!("error: {}", error);
        }
        process::exit(1);
    }
}
