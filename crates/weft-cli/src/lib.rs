//! The `weft` command-line renderer.
//!
//! Bindings are applied in this order, later ones replacing earlier ones of
//! the same name: config file `tags` and `includes`, the `--vars` file, then
//! each `--set`.

pub mod args;
pub mod vars;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use anyhow::{Context, Result};
use weft::{EngineConfig, IncludeTag, Registry};
use weft_extensions::{register_extensions, HtmlOptions, HtmlPage};

pub use args::Cli;
use vars::{load_vars, CliConfig};

/// Engine settings from the config file with command-line overrides applied.
pub fn engine_config(cli: &Cli, file: &CliConfig) -> EngineConfig {
    let mut config = file.engine.clone();
    if let Some(start) = &cli.start {
        config.start_delimiter = start.clone();
    }
    if let Some(end) = &cli.end {
        config.end_delimiter = end.clone();
    }
    if let Some(field) = &cli.field {
        config.field_delimiter = field.clone();
    }
    if cli.unbounded {
        config.max_repeat_iterations = None;
    } else if let Some(limit) = cli.max_iterations {
        config.max_repeat_iterations = Some(limit);
    }
    if let Some(timeout) = cli.exec_timeout_ms {
        config.exec_timeout_ms = Some(timeout);
    }
    config
}

/// Builds the registry described by `cli`.
pub fn build_registry(cli: &Cli) -> Result<Registry> {
    let file = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let config = engine_config(cli, &file);
    tracing::debug!(?config, "engine configuration");
    let mut registry = Registry::with_config(config).context("invalid engine configuration")?;

    if cli.extensions {
        register_extensions(&mut registry);
    }
    for (name, value) in file.tags {
        registry.set(name, value.into_text());
    }
    for (name, path) in file.includes {
        registry.add(IncludeTag::named(name, path));
    }
    if let Some(path) = &cli.vars {
        for (name, value) in load_vars(path)? {
            registry.set(name, value);
        }
    }
    for (name, value) in &cli.set {
        registry.set(name.clone(), value.clone());
    }
    Ok(registry)
}

/// Renders the template named by `cli` (or read from `input`) into `out`.
pub fn render(cli: &Cli, input: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    let mut registry = build_registry(cli)?;

    if cli.html_mode() {
        let options = HtmlOptions {
            header: true,
            no_cache: cli.no_cache,
        };
        let mut page = HtmlPage::with_registry(registry, options);
        for cookie in &cli.cookie {
            page.set_cookie(cookie.name.clone(), cookie.value.clone(), cookie.ttl);
        }
        registry = page.into_registry();
    }

    match cli.template_path() {
        Some(path) => registry
            .evaluate_file(path, out)
            .with_context(|| format!("failed to render {}", path.display())),
        None => {
            let mut template = Vec::new();
            input
                .read_to_end(&mut template)
                .context("failed to read template from stdin")?;
            registry
                .evaluate_bytes(&template, out)
                .context("failed to render template from stdin")
        }
    }
}

/// Runs the command against the real standard streams.
pub fn run(cli: &Cli) -> Result<()> {
    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let result = render(cli, &mut io::stdin().lock(), &mut out);
    // Whatever was rendered before a failure is still written.
    out.flush().context("failed to flush output")?;
    result
}
