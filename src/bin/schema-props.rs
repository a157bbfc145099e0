//! Schema Props CLI
//!
//! Command-line interface for mapping JSON Schemas to entity properties,
//! checking property values and linting schema files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_props::{
    is_url, json_type_name, lint, load_schema_auto, navigate_fragment, parse_input,
    validate_value, DefaultResolver, EntityProperty, FileStatus, ResolverConfig,
    SchemaPropertyMapper, Severity, ValidateError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-props")]
#[command(about = "Map JSON Schemas to entity properties")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the schema comes from and how its types are resolved.
#[derive(clap::Args)]
struct SchemaArgs {
    /// Schema source: file path or URL (http:// or https://)
    schema: String,

    /// JSON Pointer to the node to map (e.g. "#/$defs/order")
    #[arg(long)]
    pointer: Option<String>,

    /// Name of the property produced for the node itself
    #[arg(long)]
    name: Option<String>,

    /// Prefix prepended to every property name
    #[arg(long, default_value = "")]
    prefix: String,

    /// Resolver configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a schema to entity properties and print them as JSON
    Map {
        #[command(flatten)]
        source: SchemaArgs,

        /// Include the originating schema node of each property
        #[arg(long)]
        with_model: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Parse and validate a value for one mapped property
    Check {
        #[command(flatten)]
        source: SchemaArgs,

        /// Name of the property to check (including prefix)
        #[arg(long)]
        property: String,

        /// Raw editor input (empty if omitted)
        #[arg(long, default_value = "")]
        value: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Lint schema files for errors (syntax, broken refs, dropped properties)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Map {
            source,
            with_model,
            output,
            pretty,
        } => run_map(&source, with_model, output, pretty),

        Commands::Check {
            source,
            property,
            value,
            json,
        } => run_check(&source, &property, &value, json),

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load the schema, pick the target node and map it.
///
/// Errors carry the message and the exit code.
fn map_source(args: &SchemaArgs) -> Result<Vec<EntityProperty>, (String, u8)> {
    let config = match &args.config {
        Some(path) => {
            ResolverConfig::load(path).map_err(|e| (e.to_string(), e.exit_code() as u8))?
        }
        None => ResolverConfig::default(),
    };

    let document =
        load_schema_auto(&args.schema).map_err(|e| (e.to_string(), e.exit_code() as u8))?;
    let node = match &args.pointer {
        Some(pointer) => navigate_fragment(&document, pointer)
            .map_err(|e| (e.to_string(), e.exit_code() as u8))?
            .clone(),
        None => document.clone(),
    };
    if !node.is_object() {
        return Err((
            format!("schema node must be an object, got {}", json_type_name(&node)),
            2,
        ));
    }

    let mut resolver = DefaultResolver::new(document).config(config);
    if !is_url(&args.schema) {
        let base_dir = Path::new(&args.schema).parent().unwrap_or(Path::new("."));
        resolver = resolver.base_dir(base_dir);
    }

    let mapper = SchemaPropertyMapper::new(resolver);
    Ok(mapper.map(&node, args.name.as_deref(), &args.prefix))
}

fn run_map(
    args: &SchemaArgs,
    with_model: bool,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let mut properties = map_source(args).map_err(|(message, code)| {
        eprintln!("Error: {}", message);
        code
    })?;

    if !with_model {
        for property in &mut properties {
            property.model = None;
        }
    }

    let json_output = if pretty {
        serde_json::to_string_pretty(&properties)
    } else {
        serde_json::to_string(&properties)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_check(
    args: &SchemaArgs,
    property_name: &str,
    input: &str,
    json_output: bool,
) -> Result<(), u8> {
    let properties = map_source(args).map_err(|(message, code)| {
        report_error(json_output, &message);
        code
    })?;

    let Some(property) = properties.iter().find(|p| p.name == property_name) else {
        report_error(json_output, &format!("no property named \"{}\"", property_name));
        return Err(2);
    };

    let result = parse_input(property, input)
        .and_then(|value| validate_value(property, value.as_ref()).map(|()| value));

    match result {
        Ok(value) => {
            if json_output {
                let output = serde_json::json!({ "valid": true, "value": value });
                println!("{}", output);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({ "valid": false, "errors": errors });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);
    let passed = result.is_ok() && (!strict || result.warnings == 0);

    if format == "json" {
        let output = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", output);
        return if passed { Ok(()) } else { Err(1) };
    }

    for file_result in &result.results {
        let shown: Vec<_> = file_result
            .diagnostics
            .iter()
            .filter(|d| !quiet || d.severity == Severity::Error)
            .collect();
        if shown.is_empty() {
            if !quiet {
                println!("{}: ok", file_result.file.display());
            }
            continue;
        }

        let marker = match file_result.status {
            FileStatus::Error => "\x1b[31mfails\x1b[0m",
            _ => "\x1b[33mlossy\x1b[0m",
        };
        println!("{}: {}", file_result.file.display(), marker);
        for diag in shown {
            let label = match diag.severity {
                Severity::Error => "\x1b[31merror\x1b[0m",
                Severity::Warning => "\x1b[33mwarning\x1b[0m",
            };
            println!("  {} {} at {}: {}", label, diag.code, diag.path, diag.message);
            println!("      -> {}", diag.impact());
        }
    }

    let summary = format!(
        "{} schema file(s): {} mapped cleanly, {} failed ({} errors, {} warnings)",
        result.files_checked, result.passed, result.failed, result.errors, result.warnings
    );
    if passed {
        println!("\x1b[32m{}\x1b[0m", summary);
        Ok(())
    } else {
        println!("\x1b[31m{}\x1b[0m", summary);
        Err(1)
    }
}
