//! The `generate` command: fetch module schemas, generate GDScript
//! bindings, write the output tree.
//!
//! Every module is fetched and generated before the first file is written,
//! so a schema that fails generation leaves the output tree untouched.

use clap::Args;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::{Config, ConfigFile};
use crate::schema;
use crate::schema::ir::codegen::{codegen_reducer_index, Artifact};
use crate::schema::output::OutputWriter;
use crate::sources::remote;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Server address of the SpacetimeDB host
    #[arg(long, value_name = "ADDRESS")]
    pub server: Option<String>,

    /// Port of the SpacetimeDB host
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Module to generate bindings for (repeatable)
    #[arg(long = "module", value_name = "NAME")]
    pub modules: Vec<String>,

    /// Output directory, relative to the project root
    #[arg(long = "out", value_name = "DIR")]
    pub out_path: Option<PathBuf>,

    /// Path to the config file
    #[arg(long = "config", value_name = "FILE", default_value = ".env.json")]
    pub config: PathBuf,
}

pub async fn run(args: GenerateArgs) -> i32 {
    let file = match ConfigFile::read(&args.config) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let config = match Config::resolve(file, args.server, args.port, &args.modules, args.out_path)
    {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let mut fetched: Vec<(String, String)> = Vec::new();
    for module in config.modules() {
        match remote::fetch_schema(config.server_address(), config.port(), module).await {
            Ok(json) => fetched.push((module.clone(), json)),
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        }
    }

    // Generate everything up front; a generation failure in any module
    // aborts the run before a single file is written.
    let mut generated: Vec<(String, String, Vec<Artifact>)> = Vec::new();
    for (module, json) in fetched {
        match schema::generate(&json, &module) {
            Ok(artifacts) => {
                info!(%module, artifacts = artifacts.len(), "generated bindings");
                generated.push((module, json, artifacts));
            }
            Err(err) => {
                eprintln!("Failed to generate bindings for module '{module}': {err}");
                return 1;
            }
        }
    }

    let writer = OutputWriter::new(config.out_path());
    let mut failures = 0;
    for (module, json, artifacts) in &generated {
        failures += writer.write_artifacts(artifacts);
        if let Err(err) = writer.write_schema_snapshot(module, json) {
            error!(%module, %err, "failed to write schema snapshot");
            failures += 1;
        }
    }

    let modules: Vec<String> = generated.iter().map(|(m, _, _)| m.clone()).collect();
    let index = codegen_reducer_index(&modules, &config.out_path().to_string_lossy());
    failures += writer.write_artifacts(&[index]);

    if failures > 0 {
        eprintln!("{failures} file(s) failed to write");
        return 1;
    }
    println!(
        "Generated bindings for {} module(s) in {}",
        modules.len(),
        config.out_path().display()
    );
    0
}
