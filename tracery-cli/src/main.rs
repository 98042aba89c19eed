//! Tracery CLI
//!
//! A debugging tool for the style compiler: reads a style set (JSON), compiles
//! it against the demo registry, and prints the resulting CSS.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use serde_json::Value;
use tracery_style::registry::demo::demo_registry;
use tracery_style::{StyleSet, compile};

/// Tracery CLI — compile a JSON style set to CSS
#[derive(Parser, Debug)]
#[command(name = "tracery")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Compile a style set file
    tracery styles.json

    # Compile inline JSON
    tracery --json '{"color": [{"value": "red"}]}'

    # Wrap the output in a selector
    tracery styles.json --selector ".hero"

    # Editor-mode compilation with document defaults
    tracery styles.json --editor --defaults defaults.json
"#)]
struct Cli {
    /// Path to a style set JSON file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse a style set JSON string directly instead of a file
    #[arg(long, value_name = "JSON")]
    json: Option<String>,

    /// Wrap the compiled body in this selector
    #[arg(short, long, value_name = "SELECTOR")]
    selector: Option<String>,

    /// Path to a JSON object of per-property default values
    #[arg(long, value_name = "FILE")]
    defaults: Option<PathBuf>,

    /// Compile in editor mode (visibility rendered as dimming, not removal)
    #[arg(short, long)]
    editor: bool,

    /// Print the parsed style set before the CSS
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = match (&cli.json, &cli.path) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("provide a style set file or --json"),
    };

    let style_set: StyleSet =
        serde_json::from_str(&source).context("style set is not valid JSON")?;

    let defaults: Option<BTreeMap<String, Value>> = match &cli.defaults {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(serde_json::from_str(&text).context("defaults are not a JSON object")?)
        }
        None => None,
    };

    let registry = demo_registry();

    if cli.verbose {
        println!("{}", "=== Style Set ===".bold());
        println!("{}", serde_json::to_string_pretty(&style_set)?);
        println!(
            "{} {} properties, {} registered renderers\n",
            "===".bold(),
            style_set.len(),
            registry.len()
        );
        println!("{}", "=== CSS ===".bold());
    }

    let body = compile(&registry, &style_set, defaults.as_ref(), cli.editor);
    match &cli.selector {
        Some(selector) => {
            println!("{selector} {{");
            for line in body.lines() {
                println!("  {line}");
            }
            println!("}}");
        }
        None => println!("{body}"),
    }

    Ok(())
}
