//! IDL compiler CLI
//!
//! Main entry point for the `idlc` command.

use clap::Parser as ClapParser;
use iborb_idl::codegen::{CppGenerator, GeneratorConfig};
use iborb_idl::diagnostics::CompileError;
use iborb_idl::preprocessor::Preprocessor;
use iborb_idl::Parser;
use miette::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(ClapParser)]
#[command(name = "idlc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "CORBA IDL to C++11 compiler",
    long_about = "Compiles CORBA IDL interface definitions to C++11 headers \
                  following the IDL to C++11 language mapping."
)]
struct Cli {
    /// IDL input files
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for generated files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Add an include search path for the preprocessor
    #[arg(short = 'I', long = "include", value_name = "PATH")]
    include_paths: Vec<PathBuf>,

    /// Define a preprocessor macro (NAME or NAME=VALUE)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    defines: Vec<String>,

    /// Skip the preprocessor and compile the raw IDL text
    #[arg(short = 'E', long)]
    no_preprocess: bool,

    /// Parse and resolve only; do not generate code
    #[arg(short = 'p', long)]
    parse_only: bool,

    /// Extension for the generated header
    #[arg(long, value_name = "EXT", default_value = ".hpp")]
    header_ext: String,

    /// Extension for the generated implementation file
    #[arg(long, value_name = "EXT", default_value = ".cpp")]
    source_ext: String,

    /// Prefix folded into the include guard
    #[arg(long, value_name = "PREFIX", default_value = "")]
    guard_prefix: String,

    /// Indent text for generated code
    #[arg(long, value_name = "TEXT", default_value = "    ")]
    indent: String,

    /// Do not generate the implementation file
    #[arg(long)]
    no_impl: bool,

    /// Do not emit shared_ptr aliases for interfaces
    #[arg(long)]
    no_smart_pointers: bool,

    /// Do not emit include guards
    #[arg(long)]
    no_include_guards: bool,

    /// Do not emit doxygen comments
    #[arg(long)]
    no_doxygen: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if !cli.parse_only {
        fs::create_dir_all(&cli.output).map_err(|source| CompileError::OutputDir {
            path: cli.output.clone(),
            source,
        })?;
    }

    let mut failures = 0usize;
    for input in &cli.inputs {
        match process_file(input, &cli) {
            Ok(true) => {}
            Ok(false) => failures += 1,
            Err(err) => {
                eprintln!("{:?}", miette::Report::new(err));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{failures} file(s) failed to process.");
        std::process::exit(1);
    }

    info!("processed {} file(s)", cli.inputs.len());
    Ok(())
}

/// Compile one file. `Ok(false)` means diagnostics were printed and the
/// file failed; hard errors (I/O, preprocessor) are returned.
fn process_file(input: &Path, cli: &Cli) -> std::result::Result<bool, CompileError> {
    info!(file = %input.display(), "processing");

    let source = if cli.no_preprocess {
        read_file(input)?
    } else {
        let preprocessor = build_preprocessor(cli);
        if preprocessor.is_available() {
            match preprocessor.preprocess_file(input) {
                Ok(expanded) => expanded,
                Err(err) => {
                    // A broken preprocessor run falls back to raw IDL
                    debug!(error = %err, "preprocessor failed, using raw IDL");
                    read_file(input)?
                }
            }
        } else {
            debug!("no C preprocessor found, using raw IDL");
            read_file(input)?
        }
    };

    let filename = input.display().to_string();
    let mut parser = Parser::new(&source, filename.clone());
    let unit = parser.parse();

    for diagnostic in parser.diagnostics() {
        eprintln!("{diagnostic}");
    }
    if parser.has_errors() {
        eprintln!("{filename}: parsing failed with {} error(s).", parser.error_count());
        return Ok(false);
    }

    debug!(definitions = unit.definitions.len(), "parsed");

    if cli.parse_only {
        return Ok(true);
    }

    let config = GeneratorConfig {
        output_dir: Some(cli.output.clone()),
        header_extension: cli.header_ext.clone(),
        source_extension: cli.source_ext.clone(),
        namespace_prefix: cli.guard_prefix.clone(),
        generate_implementation: !cli.no_impl,
        use_smart_pointers: !cli.no_smart_pointers,
        add_include_guards: !cli.no_include_guards,
        add_doxygen: !cli.no_doxygen,
        indent: cli.indent.clone(),
    };

    let mut generator = CppGenerator::new(config);
    let ok = generator.generate(&unit, parser.symbol_table());
    for error in generator.errors() {
        eprintln!("Generator error: {error}");
    }

    Ok(ok)
}

fn build_preprocessor(cli: &Cli) -> Preprocessor {
    let mut preprocessor = Preprocessor::new();
    for path in &cli.include_paths {
        preprocessor.add_include_path(path);
    }
    for define in &cli.defines {
        match define.split_once('=') {
            Some((name, value)) => preprocessor.add_define(name, value),
            None => preprocessor.add_define(define, "1"),
        }
    }
    preprocessor
}

fn read_file(path: &Path) -> std::result::Result<String, CompileError> {
    fs::read_to_string(path).map_err(|source| CompileError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}
