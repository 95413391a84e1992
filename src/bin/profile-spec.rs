//! Profile Spec CLI
//!
//! Command-line interface for linting profile spec documents, resolving
//! operations and validating request parameters.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use profile_spec::{
    check_request, is_url, lint, load_document_auto, load_json, profile_from_path, FileStatus,
    LoadError, Method, ProfileRegistry, RegistryOptions, RequestVerdict, SpecDocument,
};
use serde_json::{json, Map, Value};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "profile-spec")]
#[command(about = "Lint profile spec documents, resolve operations and validate requests")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint spec files for errors (syntax, broken refs, structure, parser rejections)
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

    /// Print the operation declared for a method and request path
    Resolve {
        /// Spec source: file path, URL, or profile name to look up in --spec-dir
        spec: String,

        /// HTTP method (GET, PUT, POST, DELETE, ...)
        #[arg(long, short, value_parser = parse_method)]
        method: Method,

        /// Request path (e.g., /gotapi/battery/level)
        #[arg(long, short)]
        path: String,

        /// Directory to search for profile documents (repeatable, searched before ./api)
        #[arg(long = "spec-dir", value_name = "DIR")]
        spec_dirs: Vec<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate request parameters against the declared operation
    Validate {
        /// Spec source: file path, URL, or profile name to look up in --spec-dir
        spec: String,

        /// HTTP method (GET, PUT, POST, DELETE, ...)
        #[arg(long, short, value_parser = parse_method)]
        method: Method,

        /// Request path (e.g., /gotapi/battery/level)
        #[arg(long, short)]
        path: String,

        /// Parameter value as NAME=VALUE (repeatable)
        #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// JSON object of parameter values; --param entries override it
        #[arg(long)]
        params_file: Option<PathBuf>,

        /// Directory to search for profile documents (repeatable, searched before ./api)
        #[arg(long = "spec-dir", value_name = "DIR")]
        spec_dirs: Vec<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn parse_method(s: &str) -> Result<Method, String> {
    Method::parse(s).ok_or_else(|| format!("unknown HTTP method \"{}\"", s))
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{}\"", s))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),

        Commands::Resolve {
            spec,
            method,
            path,
            spec_dirs,
            output,
            pretty,
        } => run_resolve(&spec, method, &path, &spec_dirs, output, pretty),

        Commands::Validate {
            spec,
            method,
            path,
            params,
            params_file,
            spec_dirs,
            json,
        } => run_validate(ValidateArgs {
            spec,
            method,
            path,
            params,
            params_file,
            spec_dirs,
            json_output: json,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`; the default level is `warn`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Load the document named by `source` into a registry.
///
/// A URL or an existing file is loaded directly and registered under the
/// request path's profile segment (or the file stem). Anything else is a
/// profile name, discovered in `spec_dirs` and then `./api`.
fn load_spec(
    source: &str,
    request_path: &str,
    spec_dirs: &[PathBuf],
) -> Result<(String, Arc<SpecDocument>), LoadError> {
    let options = spec_dirs
        .iter()
        .fold(RegistryOptions::new(), |options, dir| {
            options.with_search_dir(dir)
        });
    let registry = ProfileRegistry::with_options(options);

    if is_url(source) || Path::new(source).is_file() {
        let document = load_document_auto(source)?;
        let profile = profile_from_path(request_path)
            .map(str::to_string)
            .or_else(|| {
                Path::new(source)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| source.to_string());
        debug!(source, profile = %profile, "loaded spec document");
        let document = registry.add_profile_document(&profile, document);
        return Ok((profile, document));
    }

    let document = registry.load_profile_spec(source)?;
    Ok((source.to_string(), document))
}

fn run_resolve(
    source: &str,
    method: Method,
    path: &str,
    spec_dirs: &[PathBuf],
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let (profile, document) = load_spec(source, path, spec_dirs).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let Some(operation) = profile_spec::find_shared_operation(&document, method, path) else {
        eprintln!(
            "No operation declared for {} {} in profile \"{}\"",
            method, path, profile
        );
        return Err(1);
    };

    let json_output = if pretty {
        serde_json::to_string_pretty(&*operation)
    } else {
        serde_json::to_string(&*operation)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(file) => {
            std::fs::write(&file, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", file.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

struct ValidateArgs {
    spec: String,
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    params_file: Option<PathBuf>,
    spec_dirs: Vec<PathBuf>,
    json_output: bool,
}

fn run_validate(args: ValidateArgs) -> Result<(), u8> {
    let ValidateArgs {
        spec,
        method,
        path,
        params,
        params_file,
        spec_dirs,
        json_output,
    } = args;

    let mut values = match &params_file {
        Some(file) => {
            let loaded = load_json(file).map_err(|e| {
                report_error(json_output, &format!("loading params: {}", e));
                e.exit_code() as u8
            })?;
            match loaded {
                Value::Object(map) => map,
                _ => {
                    report_error(json_output, "params file must contain a JSON object");
                    return Err(2);
                }
            }
        }
        None => Map::new(),
    };
    for (name, value) in params {
        values.insert(name, Value::String(value));
    }

    let (_, document) = load_spec(&spec, &path, &spec_dirs).map_err(|e| {
        report_error(json_output, &format!("loading spec: {}", e));
        e.exit_code() as u8
    })?;

    match check_request(&document, method, &path, &values) {
        RequestVerdict::Valid => {
            if json_output {
                println!("{}", json!({ "valid": true, "resolved": true }));
            } else {
                println!("Valid");
            }
            Ok(())
        }
        RequestVerdict::Unresolved => {
            if json_output {
                println!("{}", json!({ "valid": true, "resolved": false }));
            } else {
                println!("Valid (no operation declared for {} {})", method, path);
            }
            Ok(())
        }
        RequestVerdict::Invalid(parameters) => {
            let errors: Vec<Value> = parameters
                .iter()
                .map(|p| {
                    json!({
                        "name": p.name,
                        "in": p.location.as_str(),
                        "value": values.get(&p.name),
                    })
                })
                .collect();
            if json_output {
                println!("{}", json!({ "valid": false, "errors": errors }));
            } else {
                eprintln!("Validation failed:");
                for p in &parameters {
                    match values.get(&p.name) {
                        Some(value) => eprintln!(
                            "  {} ({}): invalid value {}",
                            p.name,
                            p.location.as_str(),
                            value
                        ),
                        None => eprintln!(
                            "  {} ({}): required but missing",
                            p.name,
                            p.location.as_str()
                        ),
                    }
                }
            }
            Err(1)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    use profile_spec::Severity;

    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        let output = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", output);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
