//! exampage CLI - exam document extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use exampage::render::{append_record, to_json};
use exampage::{
    EndnotesRecord, EquationMap, ExamPage, ExtractOptions, JsonFormat, PageSelection,
    PagesRecord, PositionsRecord,
};

#[derive(Parser)]
#[command(name = "exampage")]
#[command(version)]
#[command(about = "Extract problem regions and text from exam-document HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract problem positions and text
    Pages {
        /// Input HTML files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for the .jsonl records
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Equation identifier map (JSON object or .jsonl keyed by file name)
        #[arg(long, value_name = "FILE")]
        equations: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Image placeholder token
        #[arg(long, default_value = "[image]")]
        placeholder: String,

        /// Process pages on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Extract numbered answers from endnote pages
    Endnotes {
        /// Input HTML files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for the .jsonl records
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Equation identifier map (JSON object or .jsonl keyed by file name)
        #[arg(long, value_name = "FILE")]
        equations: Option<PathBuf>,

        /// Process pages on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Show document layout information
    Info {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pages {
            inputs,
            output,
            equations,
            pages,
            placeholder,
            sequential,
        } => cmd_pages(
            &inputs,
            &output,
            equations.as_deref(),
            pages.as_deref(),
            &placeholder,
            sequential,
        ),
        Commands::Endnotes {
            inputs,
            output,
            equations,
            sequential,
        } => cmd_endnotes(&inputs, &output, equations.as_deref(), sequential),
        Commands::Info { input, json } => cmd_info(&input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn progress(len: usize) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn file_name(input: &Path) -> String {
    input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Equations for one document.
///
/// A file holding one JSON value applies to every document; otherwise each
/// line is a `{"file_name", "uuid_to_eqn"}` record and the one matching
/// `name` is used.
fn load_equations(
    path: Option<&Path>,
    name: &str,
) -> Result<EquationMap, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(EquationMap::new());
    };
    let content = fs::read_to_string(path)?;

    if serde_json::from_str::<serde_json::Value>(&content).is_ok() {
        return Ok(EquationMap::from_json(&content)?);
    }

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(line)?;
        if value.get("file_name").and_then(|v| v.as_str()) == Some(name) {
            return Ok(EquationMap::from_json(line)?);
        }
    }

    log::warn!("No equation map for '{}' in {}", name, path.display());
    Ok(EquationMap::new())
}

fn cmd_pages(
    inputs: &[PathBuf],
    output: &Path,
    equations: Option<&Path>,
    pages: Option<&str>,
    placeholder: &str,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let options = ExtractOptions::new()
        .with_pages(page_selection)
        .with_placeholder(placeholder)
        .with_parallel(!sequential);

    fs::create_dir_all(output)?;
    let positions_path = output.join("positions.jsonl");
    let pages_path = output.join("pages.jsonl");

    let pb = progress(inputs.len())?;
    let mut problems = 0;
    for input in inputs {
        let name = file_name(input);
        pb.set_message(name.clone());

        let result = ExamPage::new()
            .with_options(options.clone())
            .with_equations(load_equations(equations, &name)?)
            .open(input)?
            .extract_pages();
        problems += result.problem_count();

        append_record(
            &positions_path,
            &PositionsRecord {
                file_name: name.clone(),
                positions: result.pages_positions,
            },
        )?;
        append_record(
            &pages_path,
            &PagesRecord {
                file_name: name,
                pages: result.pages,
            },
        )?;
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} problems from {} files",
        "Extracted".green().bold(),
        problems,
        inputs.len()
    );
    println!("  {} {}", "├─".dimmed(), positions_path.display());
    println!("  {} {}", "└─".dimmed(), pages_path.display());

    Ok(())
}

fn cmd_endnotes(
    inputs: &[PathBuf],
    output: &Path,
    equations: Option<&Path>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractOptions::new().with_parallel(!sequential);

    fs::create_dir_all(output)?;
    let positions_path = output.join("endnote_positions.jsonl");
    let endnotes_path = output.join("endnotes.jsonl");

    let pb = progress(inputs.len())?;
    let mut answers = 0;
    for input in inputs {
        let name = file_name(input);
        pb.set_message(name.clone());

        let result = ExamPage::new()
            .with_options(options.clone())
            .with_equations(load_equations(equations, &name)?)
            .open(input)?
            .extract_endnotes();
        answers += result.endnote_count();

        append_record(
            &positions_path,
            &PositionsRecord {
                file_name: name.clone(),
                positions: result.positions,
            },
        )?;
        append_record(
            &endnotes_path,
            &EndnotesRecord {
                file_name: name,
                endnotes: result.endnotes,
            },
        )?;
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} answers from {} files",
        "Extracted".green().bold(),
        answers,
        inputs.len()
    );
    println!("  {} {}", "├─".dimmed(), positions_path.display());
    println!("  {} {}", "└─".dimmed(), endnotes_path.display());

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = exampage::inspect_file(input)?;

    if json {
        println!("{}", to_json(&info, JsonFormat::Pretty)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), info.pages.len());
    println!(
        "{}: {}",
        "Problems".bold(),
        info.pages.iter().map(|p| p.problem_markers).sum::<usize>()
    );

    println!();
    println!("{}", "Stop Markers".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if info.stop_markers.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for marker in &info.stop_markers {
        println!("  {}", marker);
    }

    println!();
    println!("{}", "Class Runs".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for run in &info.class_runs {
        let label = run
            .classes
            .as_ref()
            .map(|c| c.join(" "))
            .unwrap_or_else(|| "(no class)".to_string());
        println!("  {} x{}", label, run.count);
    }

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for page in &info.pages {
        println!(
            "  {:>3}  {:.1} x {:.1} mm  {} problems",
            page.number, page.dimensions.width, page.dimensions.height, page.problem_markers
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "exampage".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam document problem extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_equations_single_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eq.json");
        fs::write(&path, r#"{"EQ1": "x"}"#).unwrap();
        let map = load_equations(Some(&path), "any").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_load_equations_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uuid_to_eqn.jsonl");
        fs::write(
            &path,
            "{\"file_name\":\"a\",\"uuid_to_eqn\":{\"EQ1\":\"x\"}}\n{\"file_name\":\"b\",\"uuid_to_eqn\":{\"EQ2\":\"y\",\"EQ3\":\"z\"}}\n",
        )
        .unwrap();
        assert_eq!(load_equations(Some(&path), "b").unwrap().len(), 2);
        assert!(load_equations(Some(&path), "c").unwrap().is_empty());
        assert!(load_equations(None, "a").unwrap().is_empty());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/data/모의고사.html")), "모의고사");
    }
}
