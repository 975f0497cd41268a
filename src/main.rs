use clap::{CommandFactory, Parser, Subcommand};
use git_addp::mode::{self, Flavor};
use git_addp::{CommandEditor, GitRepository, RunOutcome, Session, StdioTerminal};
use std::io;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "git-addp")]
#[command(about = "Interactively select hunks to stage, stash, reset or check out")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through changed hunks and apply the chosen ones
    Patch {
        /// What to do with accepted hunks
        #[arg(short, long, value_enum, default_value_t = Flavor::Stage)]
        mode: Flavor,
        /// Revision to compare against (reset, checkout and worktree only)
        #[arg(short, long)]
        source: Option<String>,
        /// Limit the run to these paths
        paths: Vec<String>,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Print the man page
    Man,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Patch {
            mode: flavor,
            source,
            paths,
        } => {
            let (mode_name, revision) = mode::resolve(flavor, source.as_deref());
            debug!(mode = mode_name, ?revision, "starting patch session");

            let repo = GitRepository::open(".")?;
            let editor = CommandEditor::resolve(repo.config().editor.as_deref());
            let mut terminal = StdioTerminal::new();
            let mut session = Session::default();

            let outcome = session
                .selector(&repo, &mut terminal, &editor)
                .run(mode_name, revision.as_deref(), &paths)?;
            if outcome == RunOutcome::Aborted {
                debug!("session ended by quit");
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "git-addp", &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
    }

    Ok(())
}
