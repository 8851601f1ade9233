use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use keyschema_codegen::{CodegenOptions, DEFAULT_ROOT_NAME, generate_rust};
use keyschema_core::{Primitive, Value, key_templates, validate_schema};
use keyschema_document::KeySchemaDocument;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output formats for listings.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "keyschema", version)]
#[command(about = "Validate, inspect and generate code for key schema documents")]
struct Cli {
    /// Enable verbose logging. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Override the separator declared by the document.
    #[arg(long, global = true)]
    separator: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a document and lint its placeholder names.
    Validate(ValidateArgs),
    /// List every key with its template and arguments.
    Templates(TemplatesArgs),
    /// Build one key from argument values.
    Render(RenderArgs),
    /// Generate typed Rust key builders.
    Codegen(CodegenArgs),
    /// Print the key layout fingerprint.
    Fingerprint(FingerprintArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Key schema document (YAML or JSON).
    file: PathBuf,
}

#[derive(Debug, Args)]
struct TemplatesArgs {
    /// Key schema document (YAML or JSON).
    file: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Key schema document (YAML or JSON).
    file: PathBuf,
    /// Dot-separated mapping keys of the key, e.g. `posts.comments`.
    #[arg(required_unless_present = "segments", conflicts_with = "segments")]
    path: Option<String>,
    /// One mapping key per occurrence, for keys that contain `.`. Repeatable.
    #[arg(long = "segment", value_name = "KEY")]
    segments: Vec<String>,
    /// Argument value as NAME=VALUE. Repeatable.
    #[arg(long = "arg", value_name = "NAME=VALUE")]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CodegenArgs {
    /// Key schema document (YAML or JSON).
    file: PathBuf,
    /// Output Rust file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Name of the generated root struct.
    #[arg(long, default_value = DEFAULT_ROOT_NAME)]
    root: String,
}

#[derive(Debug, Args)]
struct FingerprintArgs {
    /// Key schema document (YAML or JSON).
    file: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let separator = cli.separator.as_deref();
    let result = match cli.command {
        Command::Validate(args) => run_validate(args, separator),
        Command::Templates(args) => run_templates(args, separator),
        Command::Render(args) => run_render(args, separator),
        Command::Codegen(args) => run_codegen(args, separator),
        Command::Fingerprint(args) => run_fingerprint(args, separator),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_document(path: &Path, separator: Option<&str>) -> Result<KeySchemaDocument, String> {
    let doc = KeySchemaDocument::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    debug!(path = %path.display(), entries = doc.schema.len(), "Loaded document");
    Ok(match separator {
        Some(separator) => doc.with_separator(separator),
        None => doc,
    })
}

fn run_validate(args: ValidateArgs, separator: Option<&str>) -> Result<(), String> {
    let doc = load_document(&args.file, separator)?;
    let findings = validate_schema(&doc.schema);
    if !findings.is_empty() {
        for finding in &findings {
            eprintln!("{finding}");
        }
        return Err(format!(
            "'{}' has {} problem(s)",
            args.file.display(),
            findings.len()
        ));
    }

    println!(
        "Validated '{}': {} key(s).",
        args.file.display(),
        key_templates(&doc.schema).len()
    );
    Ok(())
}

fn run_templates(args: TemplatesArgs, separator: Option<&str>) -> Result<(), String> {
    let layout = load_document(&args.file, separator)?.layout();
    let out = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&layout)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(&layout).map_err(|e| format!("YAML serialization failed: {e}"))?
        }
        CliOutputFormat::Table => layout.to_table(),
    };
    print!("{out}");
    if !out.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_render(args: RenderArgs, separator: Option<&str>) -> Result<(), String> {
    let doc = load_document(&args.file, separator)?;
    let segments: Vec<&str> = match &args.path {
        Some(path) => path.split('.').collect(),
        None => args.segments.iter().map(String::as_str).collect(),
    };
    let label = segments.join(".");

    let templates = key_templates(&doc.schema);
    let Some(template) = templates.iter().find(|t| t.path == segments) else {
        return Err(format!("No key at '{label}'"));
    };

    let mut values = keyschema_core::Args::new();
    for raw in &args.args {
        let (name, text) = split_assignment(raw)?;
        let Some(placeholder) = template.arguments().find(|p| p.name() == name) else {
            let expected: Vec<&str> = template.arguments().map(|p| p.name()).collect();
            return Err(format!(
                "Unknown argument '{name}' for '{label}' (expected: {})",
                if expected.is_empty() {
                    "none".to_string()
                } else {
                    expected.join(", ")
                }
            ));
        };
        values.insert(name, parse_value(text, placeholder.value_type())?);
    }

    let key = doc
        .compile()
        .resolve_key(&segments, &values)
        .map_err(|err| err.to_string())?;
    println!("{key}");
    Ok(())
}

fn run_codegen(args: CodegenArgs, separator: Option<&str>) -> Result<(), String> {
    let doc = load_document(&args.file, separator)?;
    let options = CodegenOptions::default()
        .with_root_name(args.root)
        .with_separator(doc.separator());
    let code = generate_rust(&doc.schema, &options).map_err(|err| err.to_string())?;

    let Some(output) = args.output else {
        print!("{code}");
        return Ok(());
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(&output, code)
        .map_err(|err| format!("Failed to write '{}': {err}", output.display()))?;
    println!("Generated key builders into '{}'.", output.display());
    Ok(())
}

fn run_fingerprint(args: FingerprintArgs, separator: Option<&str>) -> Result<(), String> {
    let layout = load_document(&args.file, separator)?.layout();
    println!("{}", layout.fingerprint);
    Ok(())
}

fn split_assignment(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(format!("Expected NAME=VALUE, got '{raw}'")),
    }
}

fn parse_value(text: &str, kind: Primitive) -> Result<Value, String> {
    match kind {
        Primitive::String => Ok(Value::String(text.to_string())),
        Primitive::Number => {
            if let Ok(n) = text.parse::<i64>() {
                Ok(Value::Int(n))
            } else if let Ok(n) = text.parse::<u64>() {
                Ok(Value::UInt(n))
            } else {
                text.parse::<f64>()
                    .map(Value::Number)
                    .map_err(|_| format!("Expected a number, got '{text}'"))
            }
        }
        Primitive::Boolean => text
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| format!("Expected true or false, got '{text}'")),
    }
}
