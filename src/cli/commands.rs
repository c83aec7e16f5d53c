//! Command dispatch: settings resolution, walker construction, output

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, info, instrument};

use crate::application::{Group, IoResultExt, TreeNodeConvert, WalkerNormalizer};
use crate::cli::args::{Cli, Commands, ConfigCommands, WalkArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings, WalkerSettings};
use crate::domain::{MaxLevel, Walker};
use crate::infrastructure::{FsContext, FsEntry, FsWalker};
use crate::util::path::{expand_path, relative_label};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree { walk }) => cmd_tree(walk),
        Some(Commands::Json { walk, group }) => cmd_json(walk, group),
        Some(Commands::Find { walk, type_id }) => cmd_find(walk, type_id),
        Some(Commands::Count { walk }) => cmd_count(walk),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".into(),
        )),
    }
}

/// A root walker over `walk.dir` plus the settings it was built from.
struct OpenedWalk {
    dir: PathBuf,
    settings: Settings,
    walker: Walker<FsWalker>,
}

/// CLI flags win over config; stop markers from `--stop-at` add to the configured ones.
#[instrument(level = "debug")]
fn open_walker(walk: &WalkArgs) -> CliResult<OpenedWalk> {
    let requested = expand_path(&walk.dir);
    let dir = requested
        .canonicalize()
        .with_path_context("resolve directory", &requested)?;
    let settings = Settings::load(Some(&dir))?;

    let root = FsEntry::from_path(&dir)?;
    if !root.is_dir() {
        return Err(CliError::InvalidArgs(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let context = FsContext {
        show_hidden: walk.hidden || settings.walker.show_hidden,
        stop_markers: WalkerSettings::merge_array(&settings.walker.stop_markers, &walk.stop_at),
    };
    let max_level = MaxLevel::from(walk.max_level.or(settings.walker.max_level));
    let revisit_budget = walk
        .revisit_budget
        .unwrap_or(settings.walker.revisit_budget);
    debug!(%max_level, revisit_budget, ?context, "opening walker");

    let walker = Walker::<FsWalker>::builder()
        .item(root)
        .context(context)
        .max_level(max_level)
        .revisit_budget(revisit_budget)
        .build();

    Ok(OpenedWalk {
        dir,
        settings,
        walker,
    })
}

fn cmd_tree(walk: &WalkArgs) -> CliResult<()> {
    let mut opened = open_walker(walk)?;
    let tree = opened.walker.to_tree_string()?;
    output::info(&tree);
    info!(nodes = opened.walker.nodes().len(), "tree rendered");
    Ok(())
}

fn cmd_json(walk: &WalkArgs, groups: &[Group]) -> CliResult<()> {
    let mut opened = open_walker(walk)?;
    let groups = if groups.is_empty() {
        opened.settings.output.groups.clone()
    } else {
        groups.to_vec()
    };
    let normalizer = WalkerNormalizer::new(groups)?;
    output::info(&normalizer.to_json_string(&mut opened.walker)?);
    Ok(())
}

fn cmd_find(walk: &WalkArgs, type_id: &str) -> CliResult<()> {
    let mut opened = open_walker(walk)?;
    let found = opened.walker.nodes_of_type(type_id)?;
    if found.is_empty() {
        output::warning(&format!("no entries of type '{type_id}'"));
        return Ok(());
    }
    for id in found {
        if let Some(entry) = opened.walker.item(id)? {
            output::info(&display_path(&opened.dir, &entry.path));
        }
    }
    Ok(())
}

fn cmd_count(walk: &WalkArgs) -> CliResult<()> {
    let mut opened = open_walker(walk)?;
    let root = opened.walker.root();
    let count = opened.walker.count(root)?;
    debug!(
        expanded = opened.walker.is_expanded(root),
        "counted without listing"
    );
    output::info(&count);
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { dir } => {
            let dir = dir.as_deref().map(expand_path);
            let settings = Settings::load(dir.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => show_config_path("global", &path),
                None => output::failure(&"global: no config directory on this platform"),
            }
            let cwd = std::env::current_dir().with_path_context("read", Path::new("."))?;
            show_config_path("local", &local_config_path(&cwd));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn show_config_path(label: &str, path: &Path) {
    let line = format!("{label}: {}", path.display());
    if path.exists() {
        output::success_detail(&line);
    } else {
        output::failure(&format!("{line} (not found)"));
    }
}

fn display_path(root: &Path, path: &Path) -> String {
    if path == root {
        ".".to_string()
    } else {
        relative_label(root, path)
    }
}
