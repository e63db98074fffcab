// src/cli/args.rs
// 命令行参数解析

use std::env;
use std::path::PathBuf;

use crate::project::Target;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate {
        config: Option<PathBuf>,
        target: Option<Target>,
        quiet: bool,
    },
    List {
        config: Option<PathBuf>,
    },
    Help,
}

#[derive(Debug)]
pub struct CliArgs {
    pub command: Command,
}

impl CliArgs {
    pub fn parse() -> Result<Self, String> {
        Self::parse_from(env::args().skip(1).collect())
    }

    pub fn parse_from(args: Vec<String>) -> Result<Self, String> {
        let Some(first) = args.first() else {
            return Err("Usage: cblasgen <command> [options]".to_string());
        };

        let command = match first.as_str() {
            "generate" => {
                let mut config = None;
                let mut target = None;
                let mut quiet = false;
                let mut i = 1;
                while i < args.len() {
                    match args[i].as_str() {
                        "--quiet" => {
                            quiet = true;
                            i += 1;
                        }
                        "--config" => {
                            config = Some(PathBuf::from(value_of(&args, i)?));
                            i += 2;
                        }
                        "--target" => {
                            let t = value_of(&args, i)?;
                            target = Some(Target::parse(t).ok_or_else(|| {
                                format!("Unknown target `{t}`, use 'rust' or 'go'")
                            })?);
                            i += 2;
                        }
                        other => return Err(format!("Unknown argument: {other}")),
                    }
                }
                Command::Generate { config, target, quiet }
            }
            "list" => {
                let mut config = None;
                let mut i = 1;
                while i < args.len() {
                    match args[i].as_str() {
                        "--config" => {
                            config = Some(PathBuf::from(value_of(&args, i)?));
                            i += 2;
                        }
                        other => return Err(format!("Unknown argument: {other}")),
                    }
                }
                Command::List { config }
            }
            "--help" | "-h" | "help" => Command::Help,
            other => return Err(format!("Unknown command: {other}. Use --help for help")),
        };
        Ok(CliArgs { command })
    }

    pub fn print_help() {
        println!("cblasgen - safe BLAS bindings generated from a CBLAS header");
        println!();
        println!("Usage:");
        println!("  cblasgen generate [--config <path>] [--target rust|go] [--quiet]");
        println!("  cblasgen list [--config <path>]");
        println!("  cblasgen --help");
        println!();
        println!("Options:");
        println!("  --config <path>     Use this Cblasgen.toml instead of ./Cblasgen.toml");
        println!("  --target <lang>     Override [generate] target (rust, go)");
        println!("  --quiet             Quiet mode, only output result path");
        println!("  --help, -h          Show this help information");
        println!();
        println!("Environment:");
        println!("  CBLASGEN_DOCS       Reference source tree to crib doc comments from");
        println!("  CBLASGEN_LOG        Log filter, e.g. `cblasgen=debug` (default: warn)");
    }

    pub fn print_usage_error() {
        eprintln!("usage: cblasgen generate [--config <path>] [--target rust|go] [--quiet]");
        eprintln!("       cblasgen list [--config <path>]");
        eprintln!("       cblasgen --help");
    }
}

fn value_of(args: &[String], flag_at: usize) -> Result<&str, String> {
    args.get(flag_at + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires an argument", args[flag_at]))
}
