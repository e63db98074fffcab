// src/main.rs
use anyhow::{Context, Result};
use std::path::Path;
use std::process;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use cblasgen::backend::format::run_formatter;
use cblasgen::backend::orchestrate::{self, Selection};
use cblasgen::backend::persist::write_atomic;
use cblasgen::cli::{CliArgs, Command, OutputFormatter};
use cblasgen::diag::{DiagSink, SourceMap, render_diagnostics_colored};
use cblasgen::frontend::{self, ast::Header, docs::DocIndex};
use cblasgen::project::{self, GenConfig, Target};
use cblasgen::{RuleTables, dialect_for};

const LOG_ENV: &str = "CBLASGEN_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<GenConfig> {
    match path {
        Some(p) => project::load_file(p).with_context(|| format!("load config `{}` failed", p.display())),
        None => project::load_from_cwd().context("load Cblasgen.toml failed"),
    }
}

/// 解析头文件；有诊断就用 ariadne 打出来
fn load_header(cfg: &GenConfig) -> Result<Header> {
    let mut sm = SourceMap::new();
    let mut diags = DiagSink::new();
    let res = frontend::load_header(&cfg.header, &cfg.prefix, &mut sm, &mut diags);
    if !diags.is_empty() {
        render_diagnostics_colored(&diags.into_vec(), &sm);
    }
    res.with_context(|| format!("read declarations from `{}` failed", cfg.header.display()))
}

fn generate(config: Option<&Path>, target: Option<Target>, quiet: bool) -> Result<()> {
    let started = Instant::now();
    let out = OutputFormatter::new();

    let mut cfg = load_config(config)?;
    if let Some(t) = target {
        cfg.set_target(t);
    }

    let header = load_header(&cfg)?;

    let docs = match cfg.docs_location().context("locate docs failed")? {
        Some(root) => {
            let idx = DocIndex::load(&root, &cfg.docs.marker)
                .with_context(|| format!("crib docs from `{}` failed", root.display()))?;
            if !quiet {
                out.info(&format!("docs: {} entries under {}", idx.len(), root.display()));
            }
            Some(idx)
        }
        None => None,
    };

    let rules = RuleTables::cblas();
    let dialect = dialect_for(cfg.target);
    let generated = orchestrate::generate(&header, &cfg, docs.as_ref(), dialect.as_ref(), &rules)
        .context("synthesize wrappers failed")?;

    let text = match &cfg.format {
        Some(cmd) => run_formatter(cmd, &generated.text).context("format output failed")?,
        None => generated.text,
    };

    let output = cfg.output_path();
    write_atomic(&output, &text).with_context(|| format!("write `{}` failed", output.display()))?;

    if quiet {
        println!("{}", output.display());
        return Ok(());
    }
    if !generated.undocumented.is_empty() {
        out.warning(&format!("{} function(s) without docs", generated.undocumented.len()));
    }
    out.success(
        cfg.target.name(),
        &cfg.header,
        &output,
        generated.emitted,
        started.elapsed().as_secs_f64(),
        &OutputFormatter::human_size(text.len() as u64),
    );
    Ok(())
}

fn list(config: Option<&Path>) -> Result<()> {
    let cfg = load_config(config)?;
    let header = load_header(&cfg)?;
    let out = OutputFormatter::new();
    let text = orchestrate::listing(&header, &Selection::from_config(&cfg), &RuleTables::cblas());
    for line in text.lines() {
        if line.ends_with("(skipped)") {
            println!("{}", out.dim(line));
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

fn main() {
    init_logging();

    let args = match CliArgs::parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            CliArgs::print_usage_error();
            process::exit(2);
        }
    };

    let res = match args.command {
        Command::Help => {
            CliArgs::print_help();
            Ok(())
        }
        Command::Generate { config, target, quiet } => generate(config.as_deref(), target, quiet),
        Command::List { config } => list(config.as_deref()),
    };

    if let Err(e) = res {
        OutputFormatter::new().error(&format!("error: {e:#}"));
        process::exit(1);
    }
}
