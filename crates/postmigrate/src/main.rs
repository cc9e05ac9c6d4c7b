use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use postmigrate_core::config::{MigrationConfig, load_config};
use postmigrate_core::corpus::{Corpus, load_corpus};
use postmigrate_core::descriptions::{find_missing_descriptions, set_description};
use postmigrate_core::driver::{
    BatchReport, build_index, diff_document, migrate_all, migrate_matching, prepare_document,
};
use postmigrate_core::error::MigrateError;
use postmigrate_core::rewrite::stage_names;
use postmigrate_core::runtime::{
    DataPaths, PathOverrides, ResolutionContext, ResolvedPaths, init_layout, resolve_paths,
};

#[derive(Debug, Parser)]
#[command(
    name = "postmigrate",
    version,
    about = "Migrate exported LessWrong posts into static-site markdown",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[arg(value_name = "TITLE", help = "Migrate the post whose title contains TITLE")]
    title: Option<String>,
    #[arg(long, global = true, value_name = "PATH")]
    project_root: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH", help = "Post export JSON")]
    corpus: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    output_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    overrides: PathOverrides,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            overrides: PathOverrides {
                project_root: cli.project_root.clone(),
                config: cli.config.clone(),
                corpus: cli.corpus.clone(),
                output_dir: cli.output_dir.clone(),
            },
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Migrate the single post matching QUERY")]
    Migrate(MigrateArgs),
    #[command(name = "migrate-all", about = "Migrate every post that has contents")]
    MigrateAll,
    #[command(about = "Show how a fresh migration differs from the file on disk")]
    Diff(DiffArgs),
    #[command(about = "Build the cross-reference index and report it")]
    Index(IndexArgs),
    #[command(about = "List the body rewrite stages in order")]
    Stages,
    Descriptions(DescriptionsArgs),
    #[command(about = "Write the default configuration file")]
    Init(InitArgs),
}

#[derive(Debug, Args)]
struct MigrateArgs {
    query: String,
    #[arg(long, help = "Print the migrated document instead of writing it")]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct DiffArgs {
    query: String,
}

#[derive(Debug, Args)]
struct IndexArgs {
    #[arg(long, help = "Print every hash and slug")]
    list: bool,
}

#[derive(Debug, Args)]
struct DescriptionsArgs {
    #[command(subcommand)]
    command: DescriptionsSubcommand,
}

#[derive(Debug, Subcommand)]
enum DescriptionsSubcommand {
    #[command(about = "List migrated files without a description")]
    Missing,
    #[command(about = "Set the description of one migrated file")]
    Set { file: PathBuf, text: String },
}

#[derive(Debug, Args)]
struct InitArgs {
    #[arg(long, help = "Overwrite an existing config file")]
    force: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = RuntimeOptions::from_cli(&cli);

    match (cli.command, cli.title) {
        (Some(Commands::Migrate(args)), _) => run_migrate(&runtime, &args.query, args.dry_run),
        (Some(Commands::MigrateAll), _) => run_migrate_all(&runtime),
        (Some(Commands::Diff(DiffArgs { query })), _) => run_diff(&runtime, &query),
        (Some(Commands::Index(args)), _) => run_index(&runtime, args),
        (Some(Commands::Stages), _) => run_stages(),
        (Some(Commands::Descriptions(DescriptionsArgs { command })), _) => match command {
            DescriptionsSubcommand::Missing => run_descriptions_missing(&runtime),
            DescriptionsSubcommand::Set { file, text } => {
                run_descriptions_set(&runtime, &file, &text)
            }
        },
        (Some(Commands::Init(args)), _) => run_init(&runtime, args),
        (None, Some(title)) => run_migrate(&runtime, &title, false),
        (None, None) => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Err(MigrateError::InvalidArgument(
                "expected a post title or a subcommand".to_string(),
            )
            .into())
        }
    }
}

struct Session {
    paths: ResolvedPaths,
    data: DataPaths,
    config: MigrationConfig,
}

impl Session {
    fn load(runtime: &RuntimeOptions) -> Result<Self> {
        let paths = resolve_runtime_paths(runtime)?;
        let config = load_config(&paths.config_path)?;
        let data = paths.locate(&runtime.overrides, &config);
        Ok(Self {
            paths,
            data,
            config,
        })
    }

    fn corpus(&self) -> Result<Corpus> {
        load_corpus(&self.data.corpus_path)
    }

    fn print_diagnostics(&self, runtime: &RuntimeOptions) {
        if runtime.diagnostics {
            println!("\n[diagnostics]\n{}", self.paths.diagnostics(&self.data));
        }
    }
}

fn run_migrate(runtime: &RuntimeOptions, query: &str, dry_run: bool) -> Result<()> {
    let session = Session::load(runtime)?;
    let corpus = session.corpus()?;

    if dry_run {
        let document = prepare_document(&corpus, query, &session.config)?;
        print!("{}", document.render());
        println!("\nProcessed post: {}", document.title);
        println!("dry_run: yes");
        print_warnings(&document.warnings);
        session.print_diagnostics(runtime);
        return Ok(());
    }

    let outcome = migrate_matching(&corpus, query, &session.config, &session.data.output_dir)?;
    println!("Processed post: {}", outcome.document.title);
    println!(
        "Output written to: {}",
        normalize_path(&outcome.report.path)
    );
    println!("bytes: {}", outcome.report.bytes);
    println!("content_hash: {}", outcome.report.content_hash);
    println!("changed: {}", format_flag(outcome.report.changed));
    print_warnings(&outcome.document.warnings);
    session.print_diagnostics(runtime);

    Ok(())
}

fn run_migrate_all(runtime: &RuntimeOptions) -> Result<()> {
    let session = Session::load(runtime)?;
    let corpus = session.corpus()?;
    let report = migrate_all(&corpus, &session.config, &session.data.output_dir)?;

    println!("migrate all");
    println!("corpus_path: {}", normalize_path(&session.data.corpus_path));
    println!("output_dir: {}", normalize_path(&session.data.output_dir));
    print_batch_report(&report);
    session.print_diagnostics(runtime);

    Ok(())
}

fn run_diff(runtime: &RuntimeOptions, query: &str) -> Result<()> {
    let session = Session::load(runtime)?;
    let corpus = session.corpus()?;
    let document = prepare_document(&corpus, query, &session.config)?;
    let diff = diff_document(&document, &session.data.output_dir)?;

    if diff.is_empty() {
        println!("no changes: {}", document.file_name());
    } else {
        print!("{diff}");
    }
    session.print_diagnostics(runtime);

    Ok(())
}

fn run_index(runtime: &RuntimeOptions, args: IndexArgs) -> Result<()> {
    let session = Session::load(runtime)?;
    let corpus = session.corpus()?;
    let index = build_index(&corpus, &session.config);

    println!("cross-reference index");
    println!("posts: {}", corpus.len());
    println!("posts_with_contents: {}", corpus.with_content().count());
    println!("hashes: {}", index.len());
    println!("domains: {}", index.domains().join(", "));
    if args.list {
        for (hash, slug) in index.entries() {
            println!("  {hash} -> /{slug}");
        }
    }
    session.print_diagnostics(runtime);

    Ok(())
}

fn run_stages() -> Result<()> {
    for (position, name) in stage_names().enumerate() {
        println!("{:>2}. {name}", position + 1);
    }
    Ok(())
}

fn run_descriptions_missing(runtime: &RuntimeOptions) -> Result<()> {
    let session = Session::load(runtime)?;
    let missing = find_missing_descriptions(&session.data.output_dir)?;

    println!("descriptions missing");
    println!("output_dir: {}", normalize_path(&session.data.output_dir));
    println!("files: {}", missing.len());
    for item in &missing {
        println!(
            "  - {} ({})",
            normalize_path(&item.path),
            item.status.as_str()
        );
    }
    session.print_diagnostics(runtime);

    Ok(())
}

fn run_descriptions_set(runtime: &RuntimeOptions, file: &Path, text: &str) -> Result<()> {
    let session = Session::load(runtime)?;
    let path = if file.is_absolute() || file.exists() {
        file.to_path_buf()
    } else {
        session.data.output_dir.join(file)
    };
    let changed = set_description(&path, text)?;

    println!("description set");
    println!("path: {}", normalize_path(&path));
    println!("changed: {}", format_flag(changed));
    session.print_diagnostics(runtime);

    Ok(())
}

fn run_init(runtime: &RuntimeOptions, args: InitArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let report = init_layout(&paths, args.force)?;

    println!("Initialized postmigrate runtime layout");
    println!("project_root: {}", normalize_path(&paths.project_root));
    println!("state_dir: {}", normalize_path(&paths.state_dir));
    println!("config_path: {}", normalize_path(&paths.config_path));
    println!("created_state_dir: {}", report.created_state_dir);
    println!("wrote_config: {}", report.wrote_config);
    if runtime.diagnostics {
        let config = load_config(&paths.config_path)?;
        let data = paths.locate(&runtime.overrides, &config);
        println!("\n[diagnostics]\n{}", paths.diagnostics(&data));
    }

    Ok(())
}

fn print_batch_report(report: &BatchReport) {
    println!("written: {}", report.written);
    println!("unchanged: {}", report.unchanged);
    println!("skipped: {}", report.skipped.len());
    for title in &report.skipped {
        println!("  - {title}");
    }
    print_warnings(&report.warnings);
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("warnings:");
    for warning in warnings {
        println!("  - {warning}");
    }
}

fn resolve_runtime_paths(runtime: &RuntimeOptions) -> Result<ResolvedPaths> {
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let initial = resolve_paths(&context, &runtime.overrides)?;
    let project_env = initial.project_root.join(".env");
    if project_env.exists() {
        let _ = dotenvy::from_path_override(&project_env);
    }

    resolve_paths(&context, &runtime.overrides)
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
