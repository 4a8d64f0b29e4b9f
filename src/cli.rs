//! Command-line interface

use crate::config::BundleConfig;
use crate::document::{self, Document};
use crate::opc::Package;
use crate::select::{self, normalize_path, HeaderStyle};
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

/// Bundle source files into a single Word document
#[derive(Parser, Debug)]
#[command(name = "docx-bundler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "DOCX_BUNDLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// More output; repeat for debug logging
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect the selected files and write the document
    Generate(GenerateArgs),

    /// Print the files that would be collected
    List(ListArgs),

    /// Print the parts and paragraph count of a generated document
    Inspect(InspectArgs),
}

/// Filters shared by `generate` and `list`; each one overrides the config file
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Folder to scan
    pub root: Option<PathBuf>,

    /// Extension to collect, without the dot (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Only collect below this top-level folder (repeatable)
    #[arg(long = "subfolder", value_name = "NAME")]
    pub subfolders: Vec<String>,

    /// Skip folders with this name at any depth (repeatable)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dir_names: Vec<String>,

    /// Skip relative paths matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Collect only this relative path (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<String>,
}

impl SelectionArgs {
    fn apply(self, config: &mut BundleConfig) {
        if let Some(root) = self.root {
            config.root = root;
        }
        let selection = &mut config.selection;
        if !self.extensions.is_empty() {
            selection.extensions = self.extensions;
        }
        if !self.subfolders.is_empty() {
            selection.include_all_subfolders = false;
            selection.subfolders = self.subfolders;
        }
        selection.exclude_dir_names.extend(self.exclude_dir_names);
        selection.exclude.extend(self.exclude);
        if !self.files.is_empty() {
            selection.files = Some(self.files.iter().map(|f| normalize_path(f)).collect());
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Folder the document is written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name; `.docx` is appended when missing
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub file_name: Option<String>,

    /// Header paragraph shown above each file
    #[arg(long, value_name = "STYLE")]
    pub header: Option<HeaderStyle>,

    /// Fail instead of replacing an existing document
    #[arg(long)]
    pub no_clobber: bool,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// List the top-level folders instead of files
    #[arg(long = "subfolders")]
    pub folders: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Document to inspect
    pub file: PathBuf,
}

/// Run a parsed command line; `main` and the integration tests both go through here
pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => BundleConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BundleConfig::default(),
    };

    match cli.command {
        Commands::Generate(args) => generate(config, args),
        Commands::List(args) => list(config, args),
        Commands::Inspect(args) => inspect(args),
    }
}

fn generate(mut config: BundleConfig, args: GenerateArgs) -> Result<()> {
    args.selection.apply(&mut config);
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(name) = args.file_name {
        config.file_name = name;
    }
    if let Some(header) = args.header {
        config.header = header;
    }
    config.validate()?;

    let files = select::resolve(&config.root, &config.selection)?;
    if files.is_empty() {
        bail!("no files matched under {}", config.root.display());
    }

    let destination = config.output_path();
    if args.no_clobber && destination.exists() {
        bail!("{} already exists", destination.display());
    }

    let entries = select::load_entries(&config.root, &files, config.header)?;
    if args.no_clobber {
        document::save_new(&entries, &destination)?;
    } else {
        document::save(&entries, &destination)?;
    }

    info!("wrote {}", destination.display());
    println!(
        "Collected {} file(s) into {}",
        entries.len(),
        destination.display()
    );
    Ok(())
}

fn list(mut config: BundleConfig, args: ListArgs) -> Result<()> {
    args.selection.apply(&mut config);

    let names = if args.folders {
        select::subfolders(&config.root)?
    } else {
        select::resolve(&config.root, &config.selection)?
    };
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let package = Package::open(&args.file)?;
    let doc = Document::from_package(&package)
        .with_context(|| format!("reading {}", args.file.display()))?;

    println!("{}", args.file.display());
    println!("  [Content_Types].xml");
    for rel in package.relationships().iter() {
        println!("  relationship {} -> {}", rel.id, rel.target);
    }
    for part in package.parts() {
        println!("  part {} ({})", part.uri(), part.content_type());
    }
    println!("  {} paragraph(s)", doc.paragraph_count());
    Ok(())
}
