//! Command-line shell for the quicknotes core.
//!
//! Each subcommand maps 1:1 onto the command surface, making the CLI the
//! reference consumer of the core: store mutations, the in-note find
//! widget, export, and the AI chat all run through the same paths a
//! desktop shell would use.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use quicknotes::ai::{ChatSession, ProviderRegistry};
use quicknotes::{
    config, logging, Command, Document, HeadlessHost, NoteId, NoteStore, Workspace,
};

#[derive(Parser)]
#[command(name = "quicknotes", version, about = "Always-available quick notes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes, pinned first, most recently updated first
    List {
        /// Case-insensitive filter over titles and content
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Create a new note and make it current
    New,
    /// Duplicate the current note
    Duplicate,
    /// Print a note (defaults to the current note)
    Show {
        /// Note index, id prefix, or title fragment
        note: Option<String>,
        /// Render as Markdown instead of markup
        #[arg(long)]
        markdown: bool,
    },
    /// Replace a note's content with markup from --content or stdin
    Edit {
        note: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a note (defaults to the current note)
    Delete { note: Option<String> },
    /// Toggle a note's pinned flag
    Pin { note: Option<String> },
    /// Make a note current
    Select { note: String },
    /// Find a term in the current note and walk its matches
    Find {
        term: String,
        /// Steps to take through the matches after the initial scan
        #[arg(short, long, default_value_t = 0)]
        jumps: usize,
        /// Walk backwards instead of forwards
        #[arg(long)]
        backwards: bool,
    },
    /// Export a note as Markdown
    Export {
        note: Option<String>,
        /// Output path (defaults to "<title>.md")
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print a note's deeplink
    Deeplink { note: Option<String> },
    /// Ask the AI chat a question and stream the reply
    Chat {
        /// The message to send
        message: Vec<String>,
        /// Provider override ("openai" or "google")
        #[arg(short, long)]
        provider: Option<String>,
        /// Attach a screenshot before sending
        #[arg(long)]
        attach_screenshot: bool,
    },
    /// Show or toggle screen-sharing visibility
    ScreenSharing {
        #[arg(long)]
        toggle: bool,
    },
}

fn main() {
    let _guard = logging::init();

    let cli = Cli::parse();
    let config = config::load_config();
    let mut workspace = Workspace::from_config(&config, Box::new(HeadlessHost::new()));

    if let Err(e) = run(cli.command, &mut workspace, &config) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, ws: &mut Workspace, config: &config::Config) -> Result<()> {
    match command {
        Commands::List { filter } => {
            let filter = filter.unwrap_or_default();
            let notes = ws.store().browse(&filter);
            let total = ws.store().len();
            print_note_list(ws.store(), &notes, total);
        }
        Commands::New => {
            ws.apply(Command::NewNote)?;
            let note = ws.store().current_note().expect("store is never empty");
            println!("Created {} ({})", note.title, note.id);
        }
        Commands::Duplicate => {
            ws.apply(Command::DuplicateNote)?;
            let note = ws.store().current_note().expect("store is never empty");
            println!("Duplicated as {} ({})", note.title, note.id);
        }
        Commands::Show { note, markdown } => {
            let id = resolve(ws.store(), note.as_deref())?;
            let note = ws.store().get(id).expect("resolved id exists");
            if markdown {
                println!("{}", note.content.to_markdown());
            } else {
                println!("{}", note.content.to_markup());
            }
            let words = note.content.word_count();
            let chars = note.content.char_count();
            println!(
                "-- {} {} · {} {}",
                words,
                plural(words, "word"),
                chars,
                plural(chars, "character")
            );
        }
        Commands::Edit { note, content } => {
            let id = resolve(ws.store(), note.as_deref())?;
            let markup = match content {
                Some(markup) => markup,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read content from stdin")?;
                    buf
                }
            };
            ws.apply(Command::SelectNote(id))?;
            let (editor, store) = ws.editor_mut();
            editor.set_content(Document::parse(&markup), Utc::now());
            editor.flush_now(store);
            let note = ws.store().get(id).expect("resolved id exists");
            println!("Saved {}", note.title);
        }
        Commands::Delete { note } => {
            let id = resolve(ws.store(), note.as_deref())?;
            ws.apply(Command::DeleteNote(id))?;
            let current = ws.store().current_note().expect("store is never empty");
            println!("Deleted. Current note is now {}", current.title);
        }
        Commands::Pin { note } => {
            let id = resolve(ws.store(), note.as_deref())?;
            ws.apply(Command::TogglePin(id))?;
            let note = ws.store().get(id).expect("resolved id exists");
            println!(
                "{} {}",
                if note.pinned { "Pinned" } else { "Unpinned" },
                note.title
            );
        }
        Commands::Select { note } => {
            let id = resolve(ws.store(), Some(&note))?;
            ws.apply(Command::SelectNote(id))?;
            let note = ws.store().current_note().expect("resolved id exists");
            println!("Now editing {}", note.title);
        }
        Commands::Find {
            term,
            jumps,
            backwards,
        } => {
            ws.apply(Command::SetSearchTerm(term))?;
            for _ in 0..jumps {
                ws.apply(if backwards {
                    Command::PreviousMatch
                } else {
                    Command::NextMatch
                })?;
            }
            let results = ws.find_results();
            println!("{}/{}", results.current, results.total);
            if let Some(surface) = ws.find_surface() {
                if results.total > 0 {
                    println!("{}", surface.render_marked());
                }
            }
            ws.apply(Command::ClearSearch)?;
        }
        Commands::Export { note, out } => {
            let id = resolve(ws.store(), note.as_deref())?;
            let note = ws.store().get(id).expect("resolved id exists");
            let path = out.unwrap_or_else(|| PathBuf::from(format!("{}.md", note.title)));
            std::fs::write(&path, note.content.to_markdown())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Commands::Deeplink { note } => {
            let id = resolve(ws.store(), note.as_deref())?;
            let note = ws.store().get(id).expect("resolved id exists");
            println!("{}", note.deeplink());
        }
        Commands::Chat {
            message,
            provider,
            attach_screenshot,
        } => {
            let provider = provider.unwrap_or_else(|| config.ai_provider.clone());
            let mut chat = ChatSession::new(ProviderRegistry::from_environment(), provider);

            if attach_screenshot {
                chat.attach_screenshot(ws.host())
                    .context("Could not attach a screenshot")?;
            }

            let input = message.join(" ");
            if input.trim().is_empty() {
                bail!("Nothing to send");
            }

            chat.send_with(&input, |chunk| {
                print!("{}", chunk);
                std::io::stdout().flush().ok();
            })?;

            // The reply streamed above; finish the line. On failure the
            // transcript carries the notice instead of streamed text.
            if let Some(reply) = chat.messages().last() {
                let text = reply.content.as_text();
                if text == quicknotes::ai::FAILURE_NOTICE {
                    println!("{}", text);
                } else {
                    println!();
                }
            }
        }
        Commands::ScreenSharing { toggle } => {
            if toggle {
                ws.apply(Command::ToggleScreenSharingVisibility)?;
            }
            let visible = ws
                .host()
                .screen_sharing_visible()
                .context("Could not read screen-sharing visibility")?;
            println!(
                "Window is {} while screen sharing",
                if visible { "visible" } else { "hidden" }
            );
        }
    }
    Ok(())
}

/// Resolve a note selector: none means the current note; otherwise a
/// 1-based list index, an id prefix, or a title fragment.
fn resolve(store: &NoteStore, selector: Option<&str>) -> Result<NoteId> {
    let Some(selector) = selector else {
        return store
            .current_note_id()
            .context("No current note");
    };

    if let Ok(index) = selector.parse::<usize>() {
        if index >= 1 && index <= store.len() {
            return Ok(store.notes()[index - 1].id);
        }
        bail!("No note at index {}", index);
    }

    let lowered = selector.to_lowercase();
    let mut matches = store.notes().iter().filter(|note| {
        note.id.as_str().starts_with(&lowered) || note.title.to_lowercase().contains(&lowered)
    });

    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(note.id),
        (Some(_), Some(_)) => bail!("'{}' matches more than one note", selector),
        (None, _) => bail!("No note matches '{}'", selector),
    }
}

fn print_note_list(store: &NoteStore, notes: &[&quicknotes::Note], total: usize) {
    if notes.is_empty() {
        println!("No notes found");
        return;
    }

    let now = Utc::now();
    let current = store.current_note_id();
    let pinned: Vec<_> = notes.iter().filter(|n| n.pinned).collect();
    let unpinned: Vec<_> = notes.iter().filter(|n| !n.pinned).collect();

    let mut index = 0;
    if !pinned.is_empty() {
        println!("Pinned");
        for note in &pinned {
            index += 1;
            print_note_row(note, index, current == Some(note.id), now);
        }
    }
    if !unpinned.is_empty() {
        println!("Notes ({}/{})", notes.len(), total);
        for note in &unpinned {
            index += 1;
            print_note_row(note, index, current == Some(note.id), now);
        }
    }
}

fn print_note_row(note: &quicknotes::Note, index: usize, is_current: bool, now: chrono::DateTime<Utc>) {
    let marker = if is_current { "*" } else { " " };
    let chars = note.content.char_count();
    println!(
        "{} {:>2}. {}  ·  {}  ·  {} {}",
        marker,
        index,
        note.title,
        note.time_ago(now),
        chars,
        plural(chars, "character")
    );
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
