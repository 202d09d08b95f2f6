//! Command line interface: generate | classify.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fieldforge::codegen::{GeneratorConfig, generate_schema};
use fieldforge::schema::{FieldSchema, NameCase, ResolutionPass, parse_schema_file};
use std::path::{Path, PathBuf};

/// Generate editable field factories from field schemas.
#[derive(Parser, Debug)]
#[command(name = "fieldforge", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate field factories for every request in a schema
    Generate(GenerateArgs),
    /// print the classification of every declared type
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// field schema XML file
    #[arg(short, long)]
    schema: PathBuf,

    /// output .rs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// leave unsupported members to caller-supplied factories
    #[arg(long)]
    tolerate_unsupported: bool,

    /// runtime crate path used by generated code
    #[arg(long)]
    runtime: Option<String>,

    /// derive function names in lowerCamelCase
    #[arg(long)]
    camel_case: bool,

    /// omit doc comments from generated code
    #[arg(long)]
    no_docs: bool,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// field schema XML file
    #[arg(short, long)]
    schema: PathBuf,
}

impl Cli {
    /// Runs the selected command.
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Generate(args) => {
                let code = generate(&args)?;
                match &args.out {
                    Some(path) => {
                        std::fs::write(path, code)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        tracing::info!("Wrote {}", path.display());
                    }
                    None => print!("{code}"),
                }
                Ok(())
            }
            Command::Classify(args) => {
                let schema = load(&args.schema)?;
                print!("{}", classify_report(&schema));
                Ok(())
            }
        }
    }
}

fn load(path: &Path) -> Result<FieldSchema> {
    parse_schema_file(path).with_context(|| format!("failed to parse {}", path.display()))
}

fn generate(args: &GenerateArgs) -> Result<String> {
    let schema = load(&args.schema)?;

    let mut config = GeneratorConfig::from_schema(&schema);
    if args.tolerate_unsupported {
        config = config.tolerate_unsupported(true);
    }
    if let Some(runtime) = &args.runtime {
        config = config.runtime_path(runtime.clone());
    }
    if args.camel_case {
        config = config.name_case(NameCase::LowerCamel);
    }
    if args.no_docs {
        config = config.emit_docs(false);
    }

    generate_schema(&schema, config)
        .with_context(|| format!("failed to generate package '{}'", schema.package))
}

/// One line per declared type: `name: classification`.
fn classify_report(schema: &FieldSchema) -> String {
    let mut pass = ResolutionPass::new(&schema.catalog);
    let mut output = String::new();

    for descriptor in schema.catalog.declared() {
        let classification = pass.classify(descriptor);
        output.push_str(&format!("{}: {}\n", descriptor.name, classification));
    }

    output
}
