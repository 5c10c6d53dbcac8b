//! `lessonkit` command line entry point.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lessonkit_core::storage::{FileStorage, Storage};
use lessonkit_core::{BuilderConfig, Editor, ElementId, LessonDocument, Response};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Author and check LessonKit lessons
#[derive(Parser, Debug)]
#[command(name = "lessonkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding lessonkit.config.json (defaults to the working directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an empty lesson
    New {
        file: PathBuf,

        /// Lesson name
        #[arg(short, long, default_value = "Untitled")]
        name: String,
    },

    /// Print the element tree and check its integrity
    Inspect { file: PathBuf },

    /// Grade one response against an interactive element
    Grade {
        file: PathBuf,
        element: ElementId,

        /// Response JSON, e.g. '{"kind":"choice","value":0}'
        response: String,

        /// Show the result even when the element defers feedback
        #[arg(long)]
        reveal: bool,
    },

    /// Copy a lesson file into the configured lesson store
    Import { file: PathBuf },

    /// List lessons in the configured lesson store
    List,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot get current directory")?,
    };
    let config = BuilderConfig::load(&config_dir)?;
    log::debug!("Using config {config:?}");

    match cli.command {
        Command::New { file, name } => new_lesson(&file, name, &config),
        Command::Inspect { file } => {
            print!("{}", inspect(&file)?);
            Ok(())
        }
        Command::Grade {
            file,
            element,
            response,
            reveal,
        } => {
            println!("{}", grade(&file, element, &response, reveal, config)?);
            Ok(())
        }
        Command::Import { file } => {
            let storage = FileStorage::from_config(&config)?;
            let document = read_lesson(&file)?;
            pollster::block_on(storage.save(&document.id, &document))?;
            println!("Imported {} as {}", document.name, document.id);
            Ok(())
        }
        Command::List => {
            let storage = FileStorage::from_config(&config)?;
            for id in pollster::block_on(storage.list())? {
                println!("{id}");
            }
            Ok(())
        }
    }
}

fn new_lesson(file: &Path, name: String, config: &BuilderConfig) -> Result<()> {
    if file.exists() {
        bail!("{} already exists", file.display());
    }
    let mut document = LessonDocument::new();
    document.name = name;
    let json = if config.pretty_json {
        document.to_json()?
    } else {
        serde_json::to_string(&document)?
    };
    std::fs::write(file, json).with_context(|| format!("Failed to write {}", file.display()))?;
    println!("Created {}", file.display());
    Ok(())
}

fn read_lesson(file: &Path) -> Result<LessonDocument> {
    let json = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    LessonDocument::from_json(&json).with_context(|| format!("Invalid lesson {}", file.display()))
}

/// Render the containment tree, ownership and integrity status.
fn inspect(file: &Path) -> Result<String> {
    let json = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    // Parse without the integrity gate so broken lessons can still be shown.
    let document: LessonDocument =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", file.display()))?;

    let mut out = String::new();
    writeln!(out, "{} ({} elements)", document.name, document.len())?;
    for &root in document.roots() {
        write_tree(&mut out, &document, root, 1)?;
    }
    match document.check_integrity() {
        Ok(()) => writeln!(out, "integrity: ok")?,
        Err(err) => writeln!(out, "integrity: {err}")?,
    }
    Ok(out)
}

fn write_tree(out: &mut String, document: &LessonDocument, id: ElementId, depth: usize) -> Result<()> {
    let Ok(element) = document.get_element(id) else {
        writeln!(out, "{:indent$}<missing {id}>", "", indent = depth * 2)?;
        return Ok(());
    };
    write!(out, "{:indent$}{} {id}", "", element.kind(), indent = depth * 2)?;
    if let Some(owner) = document.owner_of(id) {
        write!(out, " [held by {owner}]")?;
    }
    let items = document.items_of(id);
    if !items.is_empty() {
        write!(out, " [holds {}]", items.len())?;
    }
    writeln!(out)?;
    for &child in element.children() {
        write_tree(out, document, child, depth + 1)?;
    }
    Ok(())
}

/// Submit one response and return the resulting feedback as JSON.
fn grade(file: &Path, element: ElementId, response: &str, reveal: bool, config: BuilderConfig) -> Result<String> {
    let response: Response = serde_json::from_str(response).context("Invalid response JSON")?;
    let mut editor = Editor::with_document(read_lesson(file)?).with_config(config);

    let outcome = editor.submit_answer(element, &response)?;
    log::info!("{element}: {outcome:?}");
    if reveal {
        editor.reveal_feedback(element)?;
    }
    let feedback = editor.feedback(element)?;
    Ok(serde_json::to_string_pretty(&feedback)?)
}
