use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "labelstat", version)]
struct Cli {
    /// Log debug events (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a corpus and export class / change pixel statistics.
    Stats(StatsArgs),
    /// Compare two label directories and write their change raster.
    Change(ChangeArgs),
    /// Rewrite a label directory into the canonical vocabulary.
    Reconcile(ReconcileArgs),
    /// Report annotation labels outside the vocabulary.
    Audit(AuditArgs),
    /// Print the top-left corner of a patch inside a tiled image.
    Locate(LocateArgs),
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Corpus root directory.
    #[arg(long)]
    root: PathBuf,

    /// Run configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Statistics output (`.json` for JSON, CSV otherwise). Defaults to `<root>/statistics.csv`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Handling of labels outside the vocabulary.
    #[arg(long, value_enum)]
    policy: Option<PolicyChoice>,

    /// Count existing `*-change.png` rasters instead of deriving them.
    #[arg(long, default_value_t = false)]
    existing_change: bool,

    /// Do not write derived change rasters.
    #[arg(long, default_value_t = false)]
    no_write_change: bool,

    /// Also count rasters inside pairwise directories as class statistics
    /// (with or without --existing-change).
    #[arg(long, default_value_t = false)]
    descend_pairwise: bool,

    /// Process corpus items in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ChangeArgs {
    /// First label directory (or label.png).
    #[arg(long)]
    a: PathBuf,

    /// Second label directory (or label.png).
    #[arg(long)]
    b: PathBuf,

    /// Output change PNG.
    #[arg(long)]
    out: PathBuf,

    /// Run configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ReconcileArgs {
    /// Input label directory (or label.png).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for the canonical label.png and label_names.txt.
    #[arg(long)]
    out: PathBuf,

    /// Run configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write an RGB `label_viz.png`.
    #[arg(long, default_value_t = false)]
    viz: bool,
}

#[derive(Parser, Debug)]
struct AuditArgs {
    /// Directory holding annotation JSON files.
    #[arg(long)]
    root: PathBuf,

    /// Run configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct LocateArgs {
    /// Image shape as `HEIGHTxWIDTH`.
    #[arg(long, value_parser = parse_shape)]
    image: labelstat::Shape,

    /// Patch shape as `HEIGHTxWIDTH`.
    #[arg(long, value_parser = parse_shape)]
    patch: labelstat::Shape,

    /// Patch index (0-based, row-major).
    #[arg(long)]
    index: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Strict,
    Report,
}

impl From<PolicyChoice> for labelstat::VocabularyPolicy {
    fn from(p: PolicyChoice) -> Self {
        match p {
            PolicyChoice::Strict => Self::Strict,
            PolicyChoice::Report => Self::Report,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Stats(args) => cmd_stats(args),
        Command::Change(args) => cmd_change(args),
        Command::Reconcile(args) => cmd_reconcile(args),
        Command::Audit(args) => cmd_audit(args),
        Command::Locate(args) => cmd_locate(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<labelstat::RunConfig> {
    match path {
        Some(p) => labelstat::RunConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(labelstat::RunConfig::default()),
    }
}

fn parse_shape(s: &str) -> Result<labelstat::Shape, String> {
    let (h, w) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected HEIGHTxWIDTH, got '{s}'"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    Ok(labelstat::Shape::new(h, w))
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(p) = args.policy {
        cfg.vocabulary_policy = p.into();
    }
    if args.existing_change {
        cfg.change_source = labelstat::ChangeSource::Existing;
    }
    if args.no_write_change {
        cfg.write_change_rasters = false;
    }
    cfg.descend_into_pairwise |= args.descend_pairwise;
    cfg.parallel |= args.parallel;
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }
    cfg.validate()?;

    let walker = labelstat::CorpusWalker::new(cfg.vocabulary()?, cfg.walk_options())?;
    let outcome = walker.run(&args.root)?;

    let out = args
        .out
        .unwrap_or_else(|| args.root.join("statistics.csv"));
    labelstat::write_stats(&out, &outcome.totals)?;

    for class in &outcome.totals.classes {
        println!("{:<16} {}", class.name, class.pixels);
    }
    println!("{:<16} {}", "changed", outcome.totals.changed);
    println!("{:<16} {}", "all", outcome.totals.all);

    if !outcome.skipped.is_empty() {
        eprintln!("skipped {} item(s):", outcome.skipped.len());
        for item in &outcome.skipped {
            eprintln!("  {}: {}", item.path.display(), item.reason);
        }
    }
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn load_canonical(
    path: &Path,
    vocab: &labelstat::LabelVocabulary,
) -> anyhow::Result<labelstat::CanonicalRaster> {
    let loaded = labelstat::read_label(path)?;
    let canonical = labelstat::reconstruct_label(&loaded.raster, &loaded.names, vocab)
        .with_context(|| format!("reconcile '{}'", loaded.path.display()))?;
    Ok(canonical)
}

fn cmd_change(args: ChangeArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let vocab = cfg.vocabulary()?;

    let a = labelstat::mask_labels(&load_canonical(&args.a, &vocab)?, &vocab, &cfg.mask_pairs)?;
    let b = labelstat::mask_labels(&load_canonical(&args.b, &vocab)?, &vocab, &cfg.mask_pairs)?;
    let change = labelstat::detect_change(&a, &b)?;
    labelstat::write_change_png(&args.out, &change)?;

    println!("changed {}", change.changed_pixels());
    println!("all     {}", change.total_pixels());
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_reconcile(args: ReconcileArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let vocab = cfg.vocabulary()?;

    let canonical = load_canonical(&args.in_path, &vocab)?;
    let written = labelstat::save_label_dir(&args.out, &canonical, &vocab)?;
    eprintln!("wrote {}", written.display());

    if args.viz {
        let viz = args.out.join("label_viz.png");
        let image = labelstat::IndexImage {
            shape: canonical.shape(),
            data: canonical.data().to_vec(),
        };
        labelstat::save_colorized(&viz, &image, &labelstat::label_colormap())?;
        eprintln!("wrote {}", viz.display());
    }
    Ok(())
}

fn cmd_audit(args: AuditArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let vocab = cfg.vocabulary()?;

    let findings = labelstat::audit_annotations(&args.root, &vocab)?;
    for f in &findings {
        match &f.issue {
            labelstat::AuditIssue::UndefinedLabel { label } => {
                println!("undefined {label} in {}", f.file.display());
            }
            labelstat::AuditIssue::Unreadable { error } => {
                println!("unreadable {}: {error}", f.file.display());
            }
        }
    }
    eprintln!("check done ({} finding(s))", findings.len());
    Ok(())
}

fn cmd_locate(args: LocateArgs) -> anyhow::Result<()> {
    let (row, col) = labelstat::patch_origin(args.image, args.patch, args.index)?;
    println!("{row} {col}");
    Ok(())
}
