use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use apilock_diff::{diff, render_message, surface_diff, Mismatch};
use apilock_gate::{ApiGate, GateConfig, GateDecision, GateError, GateResult};
use apilock_store::{FileSnapshotStore, SnapshotStore};
use apilock_types::{render_surface, AliasTable, StaticProvider, SymbolProvider, TypeNode};
use colored::Colorize;

use crate::cli::*;

/// Run a parsed command. The exit code is a failure when a diff is not
/// empty or a checked API type was rejected.
pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let Cli {
        command,
        store,
        config,
        format,
        ..
    } = cli;
    let store = FileSnapshotStore::new(store);

    let passed = match command {
        Command::Diff(args) => cmd_diff(args, format)?,
        Command::Check(args) => cmd_check(args, store, config.as_deref(), format)?,
        Command::Approve(args) => cmd_approve(args, store, format)?,
        Command::Show(args) => cmd_show(args, &store, format)?,
        Command::List(_) => cmd_list(&store, format)?,
    };
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_tree(path: &Path) -> anyhow::Result<TypeNode> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let tree: TypeNode = serde_json::from_str(&json)
        .with_context(|| format!("parsing symbol tree {}", path.display()))?;
    Ok(tree.linked())
}

fn load_provider(path: &Path) -> anyhow::Result<StaticProvider> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    StaticProvider::from_json(&json, AliasTable::CSHARP)
        .with_context(|| format!("parsing symbol manifest {}", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GateConfig> {
    let config = match path {
        Some(path) => GateConfig::load(path)?,
        None => GateConfig::default(),
    };
    Ok(config.with_env_overrides())
}

/// Build the trees for `names`, or for every type the provider knows.
fn build_trees(provider: &StaticProvider, names: Vec<String>) -> anyhow::Result<Vec<TypeNode>> {
    let names = if names.is_empty() {
        provider.type_names()
    } else {
        names
    };
    names
        .iter()
        .map(|name| {
            provider
                .build_tree(name)
                .with_context(|| format!("building symbol tree for {name}"))
        })
        .collect()
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<bool> {
    let original = load_tree(&args.original)?;
    let candidate = load_tree(&args.candidate)?;
    let changes = diff(&original, &candidate);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
        OutputFormat::Text => {
            if changes.is_empty() {
                println!("{} {} is compatible", "✓".green().bold(), original.name.bold());
            } else {
                println!(
                    "{} {} breaking change(s) in {}",
                    "✗".red().bold(),
                    changes.len(),
                    original.name.bold()
                );
                for mismatch in &changes {
                    print_mismatch(mismatch);
                }
            }
            if args.surface {
                let surface = surface_diff(&original, &candidate);
                print_unified(&surface.to_unified(
                    &args.original.display().to_string(),
                    &args.candidate.display().to_string(),
                ));
            }
        }
    }
    Ok(changes.is_empty())
}

fn cmd_check(
    args: CheckArgs,
    store: FileSnapshotStore,
    config: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let provider = load_provider(&args.symbols)?;
    let config = load_config(config)?;
    let trees = build_trees(&provider, args.types)?;

    let gate = ApiGate::new(store, config);
    let results = gate.check_all(&trees);
    let failed = results
        .iter()
        .filter(|r| !r.as_ref().is_ok_and(GateResult::is_accepted))
        .count();

    match format {
        OutputFormat::Json => {
            let entries = trees
                .iter()
                .zip(&results)
                .map(|(tree, result)| match result {
                    Ok(result) => serde_json::to_value(result),
                    Err(e) => Ok(serde_json::json!({
                        "api": tree.name,
                        "error": e.to_string()
                    })),
                })
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            for (tree, result) in trees.iter().zip(&results) {
                print_check(&tree.name, result);
            }
            println!("\n{} checked, {} failed", results.len(), failed);
        }
    }
    Ok(failed == 0)
}

fn cmd_approve(
    args: ApproveArgs,
    store: FileSnapshotStore,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let provider = load_provider(&args.symbols)?;
    let trees = build_trees(&provider, args.types)?;
    let gate = ApiGate::new(store, GateConfig::updating());

    let mut approved = Vec::new();
    for tree in &trees {
        let digest = gate.approve(tree)?;
        if format == OutputFormat::Text {
            println!(
                "{} Approved {} ({})",
                "✓".green().bold(),
                tree.name.bold(),
                digest.short_hex().dimmed()
            );
        }
        approved.push(serde_json::json!({ "api": tree.name, "digest": digest.to_hex() }));
    }
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&approved)?);
    }
    Ok(true)
}

fn cmd_show(
    args: ShowArgs,
    store: &FileSnapshotStore,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let Some(snapshot) = store.read(&args.name)? else {
        bail!("no snapshot recorded for {} in {}", args.name, store.root().display());
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot.api)?),
        OutputFormat::Text => {
            println!(
                "{} {}",
                snapshot.name().yellow().bold(),
                snapshot.digest()?.short_hex().dimmed()
            );
            print!("{}", render_surface(&snapshot.api));
        }
    }
    Ok(true)
}

fn cmd_list(store: &FileSnapshotStore, format: OutputFormat) -> anyhow::Result<bool> {
    let names = store.list()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text if names.is_empty() => {
            println!("No snapshots in {}.", store.root().display())
        }
        OutputFormat::Text => {
            for name in &names {
                println!("{name}");
            }
        }
    }
    Ok(true)
}

fn print_check(name: &str, result: &Result<GateResult, GateError>) {
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            println!("{} {} {}", "✗".red().bold(), name.bold(), e.to_string().red());
            return;
        }
    };
    match &result.decision {
        GateDecision::Accepted => println!("{} {} accepted", "✓".green().bold(), name.bold()),
        GateDecision::Recorded => {
            let digest = result.digest.map(|d| d.short_hex()).unwrap_or_default();
            println!("{} {} recorded ({})", "●".cyan().bold(), name.bold(), digest.dimmed());
        }
        GateDecision::Rejected { verdict } => {
            println!("{} {} rejected: {}", "✗".red().bold(), name.bold(), verdict);
            for mismatch in &result.mismatches {
                print_mismatch(mismatch);
            }
            let hidden = result.total_mismatches - result.mismatches.len();
            if hidden > 0 {
                println!("  {}", format!("... and {hidden} more").dimmed());
            }
        }
    }
}

fn print_mismatch(mismatch: &Mismatch) {
    println!(
        "  {} {}",
        format!("[{}]", mismatch.reason).yellow(),
        render_message(mismatch)
    );
}

fn print_unified(text: &str) {
    for line in text.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}
