use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use keymenu::dispatch::{Keymap, builtin_bindings};
use keymenu::instance::{InstanceContext, PrefixInstance};
use keymenu::layout::collect_suffixes;
use keymenu::model::format_args_line;
use keymenu::store::{FsBackend, LevelStore};
use keymenu::tui::{self, DemoOptions};
use keymenu::{EngineConfig, Registry, Session, Store};

#[derive(Parser)]
#[command(name = "keymenu")]
#[command(about = "Keyboard-driven command menus", long_about = None)]
struct Cli {
    /// Engine config (JSON); a missing file means defaults
    #[arg(long, global = true, default_value = "keymenu.json")]
    config: PathBuf,
    /// Directory holding values.json, history.json and levels.json
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a menu in the terminal demo host
    Demo {
        /// Menu definition files, loaded in order
        #[arg(long = "menu", required = true)]
        menus: Vec<PathBuf>,
        /// Prefix to open (defaults to the first one defined)
        #[arg(long)]
        prefix: Option<String>,
        /// Log file (defaults to keymenu.log in the store directory)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Compile menu files and report key conflicts
    Check {
        #[arg(required = true)]
        menus: Vec<PathBuf>,
    },

    /// Print the value a menu would start with
    Value {
        #[arg(long = "menu", required = true)]
        menus: Vec<PathBuf>,
        prefix: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change persisted levels
    Levels {
        #[command(subcommand)]
        command: Option<LevelCommands>,
    },
}

#[derive(Subcommand)]
enum LevelCommands {
    /// Show every level override
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the level of a prefix, or of one suffix with --suffix
    Set {
        prefix: String,
        level: u8,
        #[arg(long)]
        suffix: Option<String>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load(&cli.config)?;
    let store_dir = cli
        .store
        .clone()
        .or_else(|| config.store_dir.clone())
        .unwrap_or_else(|| PathBuf::from(".keymenu"));

    match cli.command {
        Commands::Demo {
            menus,
            prefix,
            log,
        } => {
            let log = log.unwrap_or_else(|| store_dir.join("keymenu.log"));
            init_tracing(Some(&log))?;

            let (mut registry, defined) = load_registry(&menus)?;
            register_demo_commands(&mut registry);
            let prefix = match prefix {
                Some(p) => p,
                None => defined
                    .into_iter()
                    .next()
                    .context("menu files define no prefix")?,
            };
            let store = open_store(&store_dir, &config);
            let mut session = Session::new(registry, config, store)?;
            tui::run(&mut session, &DemoOptions { prefix })?;
        }

        Commands::Check { menus } => {
            init_tracing(None)?;
            let (registry, _) = load_registry(&menus)?;
            check_menus(&registry, &config)?;
        }

        Commands::Value {
            menus,
            prefix,
            json,
        } => {
            init_tracing(None)?;
            let (registry, _) = load_registry(&menus)?;
            let store = open_store(&store_dir, &config);
            let session = Session::new(registry, config, store)?;
            let value = session.current_value(&prefix)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).context("serialize value json")?
                );
            } else {
                println!("{}", format_args_line(&value));
            }
        }

        Commands::Levels { command } => {
            init_tracing(None)?;
            let mut store = open_store(&store_dir, &config);
            match command.unwrap_or(LevelCommands::Show { json: false }) {
                LevelCommands::Show { json } => print_levels(&store.levels, json)?,
                LevelCommands::Set {
                    prefix,
                    level,
                    suffix,
                } => {
                    match &suffix {
                        Some(cmd) => store.levels.set_suffix_level(&prefix, cmd, level)?,
                        None => store.levels.set_prefix_level(&prefix, level)?,
                    }
                    store.save_levels()?;
                    match suffix {
                        Some(cmd) => println!("{} {} level {}", prefix, cmd, level),
                        None => println!("{} level {}", prefix, level),
                    }
                }
            }
        }
    }

    Ok(())
}

/// Logs go to `log_file` when the terminal belongs to the demo, else stderr.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env("KEYMENU_LOG")
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// The registry and the prefixes the files define, in file order.
fn load_registry(menus: &[PathBuf]) -> Result<(Registry, Vec<String>)> {
    let mut registry = Registry::new();
    let mut all = Vec::new();
    for path in menus {
        let src = fs::read_to_string(path)
            .with_context(|| format!("read menu file {}", path.display()))?;
        let defined = registry
            .load_menus(&src)
            .with_context(|| format!("load menu file {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?defined, "menus loaded");
        all.extend(defined);
    }
    Ok((registry, all))
}

fn open_store(dir: &Path, config: &EngineConfig) -> Store {
    Store::load(Box::new(FsBackend::new(dir)), config.history_limit)
}

/// Every suffix command nobody defined reports what it was called with.
fn register_demo_commands(registry: &mut Registry) {
    let mut missing = Vec::new();
    for def in registry.prefixes() {
        let tree = def.layout();
        let mut specs = Vec::new();
        collect_suffixes(&tree, &mut specs);
        for spec in specs {
            if registry.command_kind(&spec.command).is_none() && !missing.contains(&spec.command)
            {
                missing.push(spec.command.clone());
            }
        }
    }
    for name in missing {
        registry.define_command(name, |inv| {
            let args = format_args_line(inv.args);
            if args.is_empty() {
                inv.message(format!("ran {}", inv.command));
            } else {
                inv.message(format!("ran {} {}", inv.command, args));
            }
            Ok(())
        });
    }
}

/// Instantiate every prefix with all levels shown and bind its keys.
fn check_menus(registry: &Registry, config: &EngineConfig) -> Result<()> {
    let builtins = builtin_bindings(&config.builtin_keys)?;
    let levels = LevelStore::default();
    let variables = Default::default();
    let ctx = InstanceContext {
        registry,
        levels: &levels,
        variables: &variables,
        default_level: config.default_level,
        edit_mode: true,
    };

    let mut failed = 0;
    for def in registry.prefixes() {
        let checked = PrefixInstance::instantiate(&ctx, &def.command, def.init_value.as_deref())
            .and_then(|inst| {
                Keymap::build(&inst.command, &inst.suffixes, &builtins, true)?;
                Ok(inst.suffixes.len())
            });
        match checked {
            Ok(n) => println!("ok {} ({} suffixes)", def.command, n),
            Err(e) => {
                failed += 1;
                println!("error {}: {}", def.command, e);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{} menu(s) failed the check", failed);
    }
    Ok(())
}

fn print_levels(levels: &LevelStore, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(levels).context("serialize levels json")?
        );
        return Ok(());
    }
    let mut any = false;
    for (prefix, entry) in levels.iter() {
        any = true;
        match entry.prefix {
            Some(level) => println!("{} {}", prefix, level),
            None => println!("{} -", prefix),
        }
        for (cmd, level) in &entry.suffixes {
            println!("  {} {}", cmd, level);
        }
    }
    if !any {
        println!("No level overrides");
    }
    Ok(())
}
