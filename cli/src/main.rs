use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use typeshape_core::{ErrorCatcher, Registry, ValidateOptions, WhitespaceFormatter};
use typeshape_defs::{DefinitionSet, GenerateConfig, OutputFormat};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Text => Self::Text,
            CliOutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "typeshape")]
#[command(about = "Compile structural type definitions into schemas, validators, and sanitizers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile definitions and emit the formatted artifact.
    Generate(GenerateArgs),
    /// Validate a JSON value against a named type.
    Check(CheckArgs),
    /// Validate a JSON value and print its sanitized form.
    Create(CreateArgs),
    /// Print the schema descriptor of a named type.
    Schema(SchemaArgs),
    /// List named types with their declarations.
    List(ListArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Definition files and/or directories of definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Path to a typeshape.yml generation config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format (overrides the config).
    #[arg(long)]
    format: Option<CliOutputFormat>,
    /// Omit the generation timestamp for reproducible output.
    #[arg(long)]
    no_timestamp: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Definition files and/or directories of definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Named type to check against.
    #[arg(long = "type")]
    type_name: String,
    /// JSON value file, or `-` for stdin.
    #[arg(long)]
    value: PathBuf,
    /// Tolerate undeclared object keys.
    #[arg(long)]
    allow_additional_properties: bool,
    /// Path to a typeshape.yml whose validation policy applies.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Definition files and/or directories of definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Named type to build.
    #[arg(long = "type")]
    type_name: String,
    /// JSON value file, or `-` for stdin.
    #[arg(long)]
    value: PathBuf,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Definition files and/or directories of definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Named type to describe.
    #[arg(long = "type")]
    type_name: String,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Definition files and/or directories of definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
        Command::Create(args) => run_create(args),
        Command::Schema(args) => run_schema(args),
        Command::List(args) => run_list(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let (set, registry) = load_registry(&args.inputs)?;

    let checksum = set.checksum().map_err(|e| e.to_string())?;
    let mut artifact = registry.artifact().with_source_hash(checksum);
    if let Some(header) = &config.output.header {
        artifact = artifact.with_header(header.clone());
    }
    if !args.no_timestamp {
        artifact = artifact.with_generated_at(
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        );
    }
    artifact.retain(|name| config.is_included(name));

    let format = args.format.map(OutputFormat::from).unwrap_or(config.output.format);
    let raw = match format {
        OutputFormat::Text => artifact.render(&WhitespaceFormatter),
        OutputFormat::Json => serde_json::to_string_pretty(&artifact)
            .map_err(|err| format!("Failed to serialize artifact: {err}"))?,
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!("Failed to create output directory '{}': {err}", parent.display())
                    })?;
                }
            }
            fs::write(path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            eprintln!(
                "Generated {} type(s) into '{}'.",
                artifact.types.len(),
                path.display()
            );
        }
        None => print!("{raw}"),
    }

    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let (_, registry) = load_registry(&args.inputs)?;
    let binding = registry
        .get(&args.type_name)
        .ok_or_else(|| format!("Unknown type '{}'", args.type_name))?;
    let value = read_value(&args.value)?;

    let mut catcher = ErrorCatcher::default();
    let options = ValidateOptions::default()
        .allow_additional_properties(
            args.allow_additional_properties || config.validation.allow_additional_properties,
        )
        .with_error_catcher(&mut catcher);
    let valid = binding.validate(&value, options).map_err(|err| err.to_string())?;

    if valid {
        println!("valid");
        Ok(())
    } else {
        Err(catcher
            .take()
            .unwrap_or_else(|| format!("value is not a valid {}", args.type_name)))
    }
}

fn run_create(args: CreateArgs) -> Result<(), String> {
    let (_, registry) = load_registry(&args.inputs)?;
    let binding = registry
        .get(&args.type_name)
        .ok_or_else(|| format!("Unknown type '{}'", args.type_name))?;
    let value = read_value(&args.value)?;

    let created = binding.create(&value).map_err(|err| err.to_string())?;
    let raw = serde_json::to_string_pretty(&created)
        .map_err(|err| format!("Failed to serialize value: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<(), String> {
    let (_, registry) = load_registry(&args.inputs)?;
    let binding = registry
        .get(&args.type_name)
        .ok_or_else(|| format!("Unknown type '{}'", args.type_name))?;

    let raw = serde_json::to_string_pretty(binding.schema())
        .map_err(|err| format!("Failed to serialize schema: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn run_list(args: ListArgs) -> Result<(), String> {
    let (_, registry) = load_registry(&args.inputs)?;
    for binding in registry.iter() {
        println!("{}: {}", binding.name(), binding.declaration());
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GenerateConfig, String> {
    match path {
        Some(path) => GenerateConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(GenerateConfig::default()),
    }
}

fn load_registry(inputs: &[PathBuf]) -> Result<(DefinitionSet, Registry), String> {
    let mut sets = Vec::with_capacity(inputs.len());
    for input in inputs {
        let set = DefinitionSet::from_path(input)
            .map_err(|err| format!("Failed to load '{}': {err}", input.display()))?;
        sets.push(set);
    }
    let set = DefinitionSet::merge(sets).map_err(|err| err.to_string())?;
    let registry = set.compile().map_err(|err| err.to_string())?;
    Ok((set, registry))
}

fn read_value(path: &Path) -> Result<Value, String> {
    let raw = if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        raw
    } else {
        fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?
    };
    serde_json::from_str(&raw).map_err(|err| format!("Invalid JSON value: {err}"))
}
