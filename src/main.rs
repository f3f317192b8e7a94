use anyhow::{Context, Result};
use attrsync::attr::{AttributeSet, CompareInline, ValidMask};
use attrsync::cli::{Cli, Command, OutputFormat};
use attrsync::config::ReplayConfig;
use attrsync::replay;
use attrsync::stats::BrwStats;
use attrsync::translate::{Principal, SetAttrRequest};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn parse_mask(expr: &str) -> Result<ValidMask> {
    ValidMask::parse_expr(expr).with_context(|| format!("Invalid attribute mask: {}", expr))
}

fn run_brw_stats(
    trace: &Path,
    config: Option<PathBuf>,
    workers: Option<usize>,
    blocks_per_page: Option<usize>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let mut config = match config {
        Some(path) => ReplayConfig::from_toml(path)?,
        None => ReplayConfig::default(),
    };

    // Command-line flags win over the file
    if let Some(workers) = workers {
        config.workers = workers;
    }
    if let Some(bpp) = blocks_per_page {
        config.blocks_per_page = bpp;
    }
    if let Some(format) = format {
        config.format = format;
    }
    if let Err(msg) = config.validate() {
        anyhow::bail!(msg);
    }

    let records = replay::load_trace(trace)?;
    let stats = BrwStats::new();
    replay::replay(&stats, &records, config.blocks_per_page, config.workers)?;

    let report = stats.report();
    match config.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run_merge(dst: &Path, src: &Path, mask: &str) -> Result<()> {
    let mask = parse_mask(mask)?;
    let mut dst: AttributeSet = read_json(dst)?;
    let src: AttributeSet = read_json(src)?;

    dst.merge(&src, mask);
    println!("{}", serde_json::to_string_pretty(&dst)?);
    Ok(())
}

fn run_compare(a: &Path, b: &Path, mask: &str, inline: bool) -> Result<()> {
    let mask = parse_mask(mask)?;
    let a: AttributeSet = read_json(a)?;
    let b: AttributeSet = read_json(b)?;

    let inline = if inline {
        CompareInline::Yes
    } else {
        CompareInline::No
    };
    if a.compare_with(&b, mask, inline) {
        println!("changed");
    } else {
        println!("unchanged");
    }
    Ok(())
}

/// Principal from the config file, with command-line credentials taking precedence
fn resolve_principal(
    config: Option<PathBuf>,
    uid: Option<u32>,
    gid: Option<u32>,
    groups: Vec<u32>,
    override_capability: bool,
) -> Result<Principal> {
    let mut who = match config {
        Some(path) => ReplayConfig::from_toml(path)?.principal,
        None => Principal::default(),
    };

    if let Some(uid) = uid {
        who.uid = uid;
    }
    if let Some(gid) = gid {
        who.gid = gid;
    }
    if !groups.is_empty() {
        who.groups = groups;
    }
    if override_capability {
        who.override_capability = true;
    }
    Ok(who)
}

fn run_setattr(object: &Path, request: &Path, who: Principal) -> Result<()> {
    let mut set: AttributeSet = read_json(object)?;
    let req: SetAttrRequest = read_json(request)?;

    set.update_from_request(&req, &who);
    println!("{}", serde_json::to_string_pretty(&set)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    match args.command {
        Command::BrwStats {
            trace,
            config,
            workers,
            blocks_per_page,
            format,
        } => run_brw_stats(&trace, config, workers, blocks_per_page, format),
        Command::Merge { dst, src, mask } => run_merge(&dst, &src, &mask),
        Command::Compare { a, b, mask, inline } => run_compare(&a, &b, &mask, inline),
        Command::Setattr {
            object,
            request,
            config,
            uid,
            gid,
            groups,
            override_capability,
        } => {
            let who = resolve_principal(config, uid, gid, groups, override_capability)?;
            run_setattr(&object, &request, who)
        }
    }
}
