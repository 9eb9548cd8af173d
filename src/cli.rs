use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "composectl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Idempotent Docker Compose lifecycle management", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config directory (overrides COMPOSECTL_CONFIG_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create and start services (docker compose up)
    Up(UpArgs),

    /// Stop running services (docker compose stop)
    Stop(ProjectArgs),

    /// Restart services (docker compose restart)
    Restart(RestartArgs),

    /// Stop and remove services (docker compose down)
    Down(DownArgs),

    /// Reconcile captured `docker compose` stderr without running Docker
    Parse(ParseArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Project arguments
// ============================================================================

#[derive(Args, Clone)]
pub struct ProjectArgs {
    /// Directory containing the Compose file
    #[arg(default_value = ".")]
    pub project_src: String,

    /// Project name (defaults to the directory name)
    #[arg(short = 'p', long)]
    pub project_name: Option<String>,

    /// Environment file, relative to the project directory (repeatable)
    #[arg(long = "env-file", value_name = "FILE")]
    pub env_files: Vec<PathBuf>,

    /// Profile to enable (repeatable)
    #[arg(long = "profile", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Shutdown timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u32>,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct UpArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// When to recreate existing containers
    #[arg(long, value_enum)]
    pub recreate: Option<RecreateArg>,

    /// Don't start linked services
    #[arg(long)]
    pub no_deps: bool,

    /// Remove containers for services not in the Compose file
    #[arg(long)]
    pub remove_orphans: bool,
}

#[derive(Args)]
pub struct RestartArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Don't restart linked services
    #[arg(long)]
    pub no_deps: bool,
}

#[derive(Args)]
pub struct DownArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Remove images used by services
    #[arg(long, value_enum)]
    pub rmi: Option<RemoveImagesArg>,

    /// Remove named volumes
    #[arg(long)]
    pub volumes: bool,

    /// Remove containers for services not in the Compose file
    #[arg(long)]
    pub remove_orphans: bool,
}

#[derive(Args)]
pub struct ParseArgs {
    /// File with captured stderr (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Input was produced with --dry-run
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RecreateArg {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RemoveImagesArg {
    All,
    Local,
}

impl From<RecreateArg> for composekit::Recreate {
    fn from(arg: RecreateArg) -> Self {
        match arg {
            RecreateArg::Auto => Self::Auto,
            RecreateArg::Always => Self::Always,
            RecreateArg::Never => Self::Never,
        }
    }
}

impl From<RemoveImagesArg> for composekit::RemoveImages {
    fn from(arg: RemoveImagesArg) -> Self {
        match arg {
            RemoveImagesArg::All => Self::All,
            RemoveImagesArg::Local => Self::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_up_flags() {
        let cli = Cli::try_parse_from([
            "composectl",
            "up",
            "./flask",
            "--profile",
            "debug",
            "--env-file",
            ".env",
            "--recreate",
            "always",
            "--no-deps",
            "--check",
        ])
        .unwrap();
        let Command::Up(args) = cli.command else {
            panic!("expected up");
        };
        assert_eq!(args.project.project_src, "./flask");
        assert_eq!(args.project.profiles, vec!["debug"]);
        assert_eq!(args.project.env_files, vec![PathBuf::from(".env")]);
        assert!(matches!(args.recreate, Some(RecreateArg::Always)));
        assert!(args.no_deps);
        assert!(args.project.check);
    }

    #[test]
    fn test_project_src_defaults_to_cwd() {
        let cli = Cli::try_parse_from(["composectl", "-vv", "stop"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Stop(args) = cli.command else {
            panic!("expected stop");
        };
        assert_eq!(args.project_src, ".");
        assert!(args.timeout.is_none());
    }

    #[test]
    fn test_parse_down_flags() {
        let cli =
            Cli::try_parse_from(["composectl", "down", "--rmi", "local", "--volumes"]).unwrap();
        let Command::Down(args) = cli.command else {
            panic!("expected down");
        };
        assert!(matches!(args.rmi, Some(RemoveImagesArg::Local)));
        assert!(args.volumes);
        assert!(!args.remove_orphans);
    }
}
