//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::application::Group;

/// Lazy directory trees: depth-bounded, cycle-guarded, stoppable at marker files
#[derive(Parser, Debug)]
#[command(name = "treewalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every walking command.
#[derive(Args, Debug, Clone, Default)]
pub struct WalkArgs {
    /// Root directory of the walk
    #[arg(value_hint = ValueHint::DirPath, default_value = ".")]
    pub dir: PathBuf,

    /// Depth bound (overrides config)
    #[arg(short = 'L', long)]
    pub max_level: Option<usize>,

    /// Include hidden entries
    #[arg(long)]
    pub hidden: bool,

    /// Stop expanding below directories containing this entry (repeatable)
    #[arg(long = "stop-at", value_name = "NAME")]
    pub stop_at: Vec<String>,

    /// Revisits of the same entry before expansion is refused (overrides config)
    #[arg(long)]
    pub revisit_budget: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the directory tree
    Tree {
        #[command(flatten)]
        walk: WalkArgs,
    },

    /// Print the directory tree as JSON
    Json {
        #[command(flatten)]
        walk: WalkArgs,

        /// Output groups (overrides config, repeatable or comma separated)
        #[arg(short, long, value_delimiter = ',')]
        group: Vec<Group>,
    },

    /// List entries whose type chain contains TYPE (e.g. fs::File, fs::Container)
    Find {
        #[command(flatten)]
        walk: WalkArgs,

        /// Type or capability identifier
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_id: String,
    },

    /// Count the root's entries without listing them
    Count {
        #[command(flatten)]
        walk: WalkArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Directory whose local config is merged
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
