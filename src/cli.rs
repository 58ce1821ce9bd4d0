//! Command-line interface for ifacegen.

use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use tracing::info;

use crate::config::Config;
use crate::dedup::DedupMode;
use crate::error::IfaceError;
use crate::generate::{expand_inputs, GenerateOptions, Generator, InterfaceRequest};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
/// The input sources could not be read or parsed.
pub const EXIT_FAILED: i32 = 1;
/// Configuration, synthesis, or output failure.
pub const EXIT_ERROR: i32 = 2;

/// Generate Go interfaces from the method sets of struct types.
///
/// ifacegen reads Go source files, collects every method declared on a
/// type (across all given files, plus methods promoted from embedded
/// types), and writes an interface declaration exposing them.
#[derive(Parser)]
#[command(name = "ifacegen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an interface for a type
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),
    /// Create an ifacegen config file from a template
    Init(InitArgs),
}

/// Arguments for the generate command.
#[derive(Parser)]
pub struct GenerateArgs {
    /// Go source file, directory, or glob pattern to read (repeatable)
    #[arg(short, long = "file", required = true)]
    pub files: Vec<String>,

    /// Generate an interface for this type name
    #[arg(short = 's', long = "struct")]
    pub struct_type: String,

    /// Name of the generated interface
    #[arg(short, long = "iface")]
    pub iface: String,

    /// Package name for the generated interface
    #[arg(short, long = "pkg")]
    pub pkg: String,

    /// Method name to leave out (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Copy docs from methods (default: true)
    #[arg(
        short = 'd',
        long = "doc",
        action = ArgAction::Set,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub copy_docs: Option<bool>,

    /// Output file name. If not provided, result is printed to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Doc comment for the generated interface
    #[arg(short = 'y', long)]
    pub iface_comment: Option<String>,

    /// Comment placed at the top of the generated file
    #[arg(short, long)]
    pub comment: Option<String>,

    /// Only include exported methods
    #[arg(long)]
    pub exported_only: bool,

    /// Method equality used for deduplication
    #[arg(long, value_enum)]
    pub dedup: Option<DedupMode>,

    /// Drop imports that no method signature references
    #[arg(long)]
    pub prune_imports: bool,

    /// Path to config file (default: auto-discover)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    /// Apply these flags over options loaded from config.
    pub fn apply(&self, mut options: GenerateOptions) -> GenerateOptions {
        if let Some(copy_docs) = self.copy_docs {
            options.copy_docs = copy_docs;
        }
        options.exclude.extend(self.exclude.iter().cloned());
        options.exported_only |= self.exported_only;
        if let Some(mode) = self.dedup {
            options.dedup = mode;
        }
        options.prune_imports |= self.prune_imports;
        if self.comment.is_some() {
            options.header = self.comment.clone();
        }
        if self.iface_comment.is_some() {
            options.iface_comment = self.iface_comment.clone();
        }
        options
    }

    fn request(&self) -> InterfaceRequest {
        InterfaceRequest {
            type_name: self.struct_type.clone(),
            interface_name: self.iface.clone(),
            package_name: self.pkg.clone(),
        }
    }
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "ifacegen.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Copy docs, textual dedup, keep every import",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "strict",
        description: "Exported methods only, structural dedup, prune unused imports",
        content: include_str!("templates/strict.yaml"),
    },
];

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over the verbosity count.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn report(err: &IfaceError) -> i32 {
    eprintln!("{} {}", "Error:".red().bold(), err);
    if err.is_input_error() {
        EXIT_FAILED
    } else {
        EXIT_ERROR
    }
}

/// Run the generate command.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir()?;
    let (config_path, config) = match Config::discover(&cwd, args.config.as_deref()) {
        Ok(found) => found,
        Err(e) => return Ok(report(&e)),
    };
    if let Some(path) = &config_path {
        info!(config = %path.display(), "loaded config");
    }

    let options = args.apply(config.to_options());
    let generator = Generator::new(options)?;

    let files = match expand_inputs(&args.files) {
        Ok(files) => files,
        Err(e) => return Ok(report(&e)),
    };

    let output = match generator.generate_files(&files, &args.request()) {
        Ok(text) => text,
        Err(e) => return Ok(report(&e)),
    };

    match &args.output {
        None => print!("{}", output),
        Some(path) => {
            if let Err(e) = std::fs::write(path, &output) {
                eprintln!(
                    "{} failed to write {}: {}",
                    "Error:".red().bold(),
                    path.display(),
                    e
                );
                return Ok(EXIT_ERROR);
            }
            info!(output = %path.display(), "wrote interface");
        }
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let Some(template) = TEMPLATES.iter().find(|t| t.name == args.template) else {
        eprintln!("{} unknown template {:?}", "Error:".red().bold(), args.template);
        eprintln!("Run 'ifacegen init --list' to see available templates");
        return Ok(EXIT_ERROR);
    };

    if args.output.exists() {
        eprintln!(
            "{} {} already exists, pass --output to write elsewhere",
            "Error:".red().bold(),
            args.output.display()
        );
        return Ok(EXIT_ERROR);
    }

    if let Err(err) = write_template(template, &args.output) {
        return Ok(report(&err));
    }

    info!(path = %args.output.display(), template = template.name, "wrote config");
    println!(
        "{} {} ({} template)",
        "Created".green(),
        args.output.display(),
        template.name
    );
    Ok(EXIT_SUCCESS)
}

fn write_template(template: &Template, path: &Path) -> Result<(), IfaceError> {
    let config_error = |err: io::Error| IfaceError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(config_error)?;
    }
    std::fs::write(path, template.content).map_err(config_error)
}

fn list_templates() -> anyhow::Result<i32> {
    for template in TEMPLATES {
        println!("{:<10} {}", template.name, template.description);
    }
    Ok(EXIT_SUCCESS)
}
