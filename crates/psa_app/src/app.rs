//! Command implementations.
//!
//! The foreground owns selections and variants, hands a validated request
//! to the worker and only renders the events it gets back.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

use psa_core::clips::{
    list_clips, ClipCategory, ClipListing, ClipSelection, OrderedSelection, SourceLayout,
};
use psa_core::config::{ConfigManager, ConfigSection};
use psa_core::destination::{create_destination_folder, list_destination_folders};
use psa_core::naming::default_date_token;
use psa_core::orchestrator::{RunRequest, RunStatus};
use psa_core::updates::{check_latest_release, load_token, UpdateStatus};
use psa_core::variants::VariantManager;
use psa_core::worker::{RunEvent, RunOptions, RunWorker, Submission};

/// Options of the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Folder under the destination root (campaign or off-week folder)
    #[arg(long)]
    pub folder: String,

    /// Week number (ignored for off-week folders)
    #[arg(long, default_value = "")]
    pub week: String,

    /// RS clip to copy (repeatable)
    #[arg(long = "rs")]
    pub rs: Vec<String>,

    /// Named MS version, as NAME=clip1,clip2 (repeatable, kept in order)
    #[arg(long = "variant", value_parser = parse_variant)]
    pub variants: Vec<VariantArg>,

    /// MS clip in stitch order, used when no --variant is given (repeatable)
    #[arg(long = "ms")]
    pub ms: Vec<String>,

    /// Date token for the output name (defaults to the next Saturday, MMDD)
    #[arg(long)]
    pub date: Option<String>,

    /// Initials for the output name
    #[arg(long, default_value = "")]
    pub initials: String,

    /// Output file name overriding the date/initials template
    #[arg(long, default_value = "")]
    pub output_name: String,

    /// Only print warnings, notices and errors instead of the full run log
    #[arg(short, long)]
    pub quiet: bool,
}

/// One `--variant NAME=clip1,clip2` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantArg {
    pub name: String,
    pub clips: Vec<String>,
}

fn parse_variant(value: &str) -> Result<VariantArg, String> {
    let (name, clips) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=clip1,clip2, got '{value}'"))?;
    let clips: Vec<String> = clips
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if clips.is_empty() {
        return Err(format!("version '{}' has no clips", name.trim()));
    }
    Ok(VariantArg {
        name: name.trim().to_string(),
        clips,
    })
}

fn print_listing(category: ClipCategory, dir: &Path, listing: &ClipListing, filter: &str) {
    match listing {
        ClipListing::Missing => println!("{} folder not found: {}", category, dir.display()),
        ClipListing::Available(_) => {
            let names = listing.filtered(filter);
            println!("{} clips ({}):", category, names.len());
            for name in names {
                println!("  {name}");
            }
        }
    }
}

/// `list`: RS and MS listings of the source folder.
pub fn list(config: &ConfigManager, filter: &str) -> Result<()> {
    let source = SourceLayout::new(config.source_dir());
    for category in [ClipCategory::Rs, ClipCategory::Ms] {
        let dir = source.category_dir(category);
        let listing = list_clips(&dir, category)?;
        print_listing(category, &dir, &listing, filter);
    }
    Ok(())
}

/// `folders`: destination sub-folders, optionally creating one first.
pub fn folders(config: &ConfigManager, create: Option<&str>) -> Result<()> {
    let root = config.dest_root();
    if let Some(name) = create {
        let path = create_destination_folder(&root, name)?;
        println!("Created {}", path.display());
    }

    let folders = list_destination_folders(&root)?;
    if folders.is_empty() {
        println!("No folders under {}", root.display());
    }
    for folder in folders {
        println!("  {folder}");
    }
    Ok(())
}

/// `settings`: show, edit and optionally persist the paths.
pub fn settings(
    config: &mut ConfigManager,
    source: Option<PathBuf>,
    dest_root: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let changed = source.is_some() || dest_root.is_some();
    if let Some(source) = source {
        config.settings_mut().paths.source = source.to_string_lossy().into_owned();
    }
    if let Some(dest_root) = dest_root {
        config.settings_mut().paths.dest_root = dest_root.to_string_lossy().into_owned();
    }

    let settings = config.settings();
    println!("Settings file: {}", config.path().display());
    println!("  source    = {}", settings.paths.source);
    println!("  dest_root = {}", settings.paths.dest_root);
    println!("  logs      = {}", config.logs_folder().display());
    println!("  ffmpeg    = {}", settings.tool.ffmpeg_path.as_deref().unwrap_or("(auto)"));

    if save {
        config
            .update_section(ConfigSection::Paths)
            .context("Failed to save settings")?;
        println!("Settings saved.");
    } else if changed {
        println!("Not saved (use --save to keep these paths).");
    }
    Ok(())
}

/// Drop names that are no longer in the listings and report them.
fn refresh_selections(
    config: &ConfigManager,
    rs: &mut ClipSelection,
    pending: &mut OrderedSelection,
    variants: &mut VariantManager,
) -> Result<()> {
    let source = SourceLayout::new(config.source_dir());

    let rs_listing = list_clips(&source.category_dir(ClipCategory::Rs), ClipCategory::Rs)?;
    if let ClipListing::Available(names) = &rs_listing {
        let removed = rs.prune(names);
        if !removed.is_empty() {
            eprintln!("Warning: RS selection no longer available: {}", removed.join(", "));
        }
    }

    let ms_listing = list_clips(&source.category_dir(ClipCategory::Ms), ClipCategory::Ms)?;
    if let ClipListing::Available(names) = &ms_listing {
        let removed = pending.prune(names);
        if !removed.is_empty() {
            eprintln!("Warning: MS order no longer available: {}", removed.join(", "));
        }
        for pruned in variants.prune_missing(names) {
            eprintln!(
                "Warning: MS version '{}' lost clips: {}",
                pruned.name,
                pruned.removed.join(", ")
            );
        }
    }
    Ok(())
}

fn run_name(folder: &str, week: &str) -> String {
    match week.trim() {
        "" => folder.trim().to_string(),
        week => format!("{}_Week_{}", folder.trim(), week),
    }
}

/// `run`: build selections, submit to the worker and render its events.
pub fn run(config: &ConfigManager, args: RunArgs) -> Result<()> {
    let mut rs = ClipSelection::new();
    for name in &args.rs {
        rs.set(name, true);
    }

    let mut pending = OrderedSelection::new();
    for name in &args.ms {
        if !pending.contains(name) {
            pending.toggle(name);
        }
    }

    let mut variants = VariantManager::new();
    for variant in args.variants {
        let index = variants.add(variant.clips)?;
        variants.rename(index, variant.name)?;
    }
    if !variants.is_empty() && !pending.is_empty() {
        eprintln!("Warning: --ms is ignored when --variant is given");
    }

    refresh_selections(config, &mut rs, &mut pending, &mut variants)?;

    let request = RunRequest {
        source_root: config.source_dir(),
        dest_root: config.dest_root(),
        folder: args.folder.clone(),
        week: args.week.clone(),
        rs_selected: rs.names(),
        variants: variants.run_targets(pending.order()),
        date_token: args.date.unwrap_or_else(default_date_token),
        initials: args.initials,
        custom_filename: args.output_name,
    };

    let mut worker = RunWorker::new();
    let submission = worker
        .submit(&request, &run_name(&args.folder, &args.week), RunOptions::from_config(config))
        .map_err(|e| anyhow!(e.user_message()))?;
    if submission == Submission::Ignored {
        bail!("A run is already in progress");
    }

    let status = worker
        .wait(|event| render_event(event, args.quiet))
        .ok_or_else(|| anyhow!("Run worker stopped without reporting a result"))?;

    match status {
        RunStatus::Completed(summary) => {
            for output in &summary.outputs {
                println!("{}: {}", output.variant, output.path.display());
            }
            Ok(())
        }
        RunStatus::NoWork => Ok(()),
        RunStatus::Failed(kind) => bail!("Run failed ({})", kind.as_str()),
    }
}

/// Print one worker event.
fn render_event(event: RunEvent, quiet: bool) {
    match event {
        RunEvent::Log(line) => {
            if !quiet {
                println!("{line}");
            }
        }
        RunEvent::Progress(percent) => tracing::debug!("Progress {}%", percent),
        RunEvent::Activity(label) => tracing::debug!("{}", label),
        RunEvent::Phase(phase) => tracing::debug!("Phase: {}", phase),
        // Already part of the run log unless quiet.
        RunEvent::Warning(message) => {
            if quiet {
                eprintln!("Warning: {message}");
            }
        }
        RunEvent::Info(message) => {
            if quiet {
                println!("{message}");
            }
        }
        RunEvent::Error { kind, message } => {
            eprintln!("Error ({}): {}", kind.as_str(), message);
        }
        RunEvent::Done(_) => {}
    }
}

/// `check-update`: compare the latest release with this build.
pub fn check_update(config: &ConfigManager) -> Result<()> {
    let repo = &config.settings().updates.repo;
    let token = load_token(&config.token_file());

    match check_latest_release(repo, token.as_deref(), psa_core::version())? {
        UpdateStatus::Available { tag, url } => {
            println!("Update available: {tag}");
            println!("Current version: {}", psa_core::version());
            println!("Download: {url}");
        }
        UpdateStatus::UpToDate { current, latest } => {
            println!("Up to date ({current}, latest release {latest})");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_argument_parses() {
        let parsed = parse_variant("Campus2=intro, main ,outro").unwrap();
        assert_eq!(parsed.name, "Campus2");
        assert_eq!(parsed.clips, vec!["intro", "main", "outro"]);
        assert_eq!(parse_variant("=a").unwrap().name, "");
        assert!(parse_variant("Campus2").is_err());
        assert!(parse_variant("Campus2=,").is_err());
    }

    #[test]
    fn run_name_includes_week() {
        assert_eq!(run_name("Fall", "3"), "Fall_Week_3");
        assert_eq!(run_name("Off Week", ""), "Off Week");
    }
}
