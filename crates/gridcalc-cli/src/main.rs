//! gridcalc CLI - evaluate grids and apply conditional formatting

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gridcalc::prelude::*;
use gridcalc::{extract_cell_references, extract_json_paths, rules_from_json, FormatProperty};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a tab-separated grid and print its display values
    Eval {
        /// Input grid (one row per line, cells separated by tabs)
        input: PathBuf,

        /// Print only this cell (e.g. B3)
        #[arg(short, long)]
        cell: Option<String>,

        /// JSON document bound to `data.*` references
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Apply conditional formatting rules and print the formatted cells
    Format {
        /// Input grid (one row per line, cells separated by tabs)
        input: PathBuf,

        /// JSON array of conditional rules
        #[arg(short, long)]
        rules: PathBuf,

        /// Test conditions against raw cell text instead of display values
        #[arg(long)]
        raw: bool,

        /// JSON rule engine options
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON document bound to `data.*` references
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// List the references a formula reads
    Refs {
        /// Formula text, with or without the leading '='
        formula: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval { input, cell, data } => eval(&input, cell.as_deref(), data.as_deref()),
        Commands::Format {
            input,
            rules,
            raw,
            config,
            data,
        } => format_grid(&input, &rules, raw, config.as_deref(), data.as_deref()),
        Commands::Refs { formula } => refs(&formula),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

/// Load a grid from tab-separated text; short rows are padded
fn load_grid(path: &Path) -> Result<Grid> {
    let text = read_file(path)?;
    let grid = Grid::from_rows(text.lines().map(|line| line.split('\t')));
    log::debug!(
        "loaded {}x{} grid from {}",
        grid.rows(),
        grid.cols(),
        path.display()
    );
    Ok(grid)
}

fn load_json(path: Option<&Path>) -> Result<Option<JsonData>> {
    path.map(|path| {
        let text = read_file(path)?;
        JsonData::parse(&text).with_context(|| format!("Invalid JSON in '{}'", path.display()))
    })
    .transpose()
}

fn eval(input: &Path, cell: Option<&str>, data: Option<&Path>) -> Result<()> {
    let grid = load_grid(input)?;
    let json = load_json(data)?;

    let mut engine = FormulaEngine::new(&grid);
    if let Some(json) = &json {
        engine = engine.with_json(json);
    }

    if let Some(cell) = cell {
        let addr = CellAddress::parse(cell).with_context(|| format!("Invalid cell '{}'", cell))?;
        if !grid.in_bounds(addr.row, addr.col) {
            bail!(
                "Cell {} is outside the {}x{} grid",
                addr,
                grid.rows(),
                grid.cols()
            );
        }
        println!("{}", engine.display_value(addr.row, addr.col));
        return Ok(());
    }

    let mut output = String::new();
    for row in 0..grid.rows() {
        let values: Vec<String> = (0..grid.cols())
            .map(|col| engine.display_value(row, col))
            .collect();
        output.push_str(&values.join("\t"));
        output.push('\n');
    }

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

fn format_grid(
    input: &Path,
    rules: &Path,
    raw: bool,
    config: Option<&Path>,
    data: Option<&Path>,
) -> Result<()> {
    let mut grid = load_grid(input)?;

    let mut options = match config {
        Some(path) => RuleEngineOptions::from_json(&read_file(path)?)
            .with_context(|| format!("Invalid options in '{}'", path.display()))?,
        None => RuleEngineOptions::default(),
    };
    if raw {
        options.condition_input = ConditionInput::RawText;
    }

    let rules = rules_from_json(&read_file(rules)?)
        .with_context(|| format!("Invalid rules in '{}'", rules.display()))?;

    let mut engine = RuleEngine::new().with_options(options);
    if let Some(json) = load_json(data)? {
        engine = engine.with_json(json);
    }
    for rule in rules {
        engine.push_rule(rule);
    }
    engine
        .settle(&mut grid)
        .context("Failed to apply conditional formatting")?;

    let mut output = String::new();
    for addr in engine.tracked_cells() {
        if let Some(formatting) = grid.formatting_at(addr.row, addr.col) {
            output.push_str(&format!("{}\t{}\n", addr, describe(formatting)));
        }
    }

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

/// The rule-set properties of a cell, e.g. `background=#F4CCCC bold`
fn describe(formatting: &CellFormatting) -> String {
    formatting
        .rule_origin
        .iter()
        .map(|property| match property {
            FormatProperty::Background => format!("background={}", formatting.background),
            FormatProperty::TextColor => format!("text={}", formatting.text_color),
            FormatProperty::Bold => flag("bold", formatting.bold),
            FormatProperty::Italic => flag("italic", formatting.italic),
            FormatProperty::Underline => flag("underline", formatting.underline),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn flag(name: &str, on: bool) -> String {
    if on {
        name.to_string()
    } else {
        format!("no-{}", name)
    }
}

fn refs(formula: &str) -> Result<()> {
    for reference in extract_cell_references(formula) {
        println!("cell\t{}", reference);
    }
    for path in extract_json_paths(formula) {
        println!("data\t{}", path);
    }
    Ok(())
}
