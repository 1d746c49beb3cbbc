use anyhow::{Context, Result, bail};
use specnote_config::{Settings, SettingsPatch};
use specnote_engine::io::{ExportRequest, FileIo, FsFileIo, Prompt, SaveRequest};
use specnote_engine::model::{NATIVE_EXTENSION, display_name_for};
use specnote_engine::persistence::{JsonFileStore, SessionStore};
use specnote_engine::{
    Command, Document, DocumentUpdate, ExportFormat, Node, Pane, Session, SplitMode,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{env, fs, process};

const USAGE: &str = "\
Usage:
  specnote export <document> <md|txt> [output]
  specnote new <path> [name]
  specnote info <document>
  specnote settings [key value]
  specnote session
  specnote shell";

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["export", document, format, rest @ ..] if rest.len() <= 1 => {
            let format: ExportFormat = format.parse()?;
            export(Path::new(document), format, rest.first().map(PathBuf::from))
        }
        ["new", path, rest @ ..] if rest.len() <= 1 => {
            new_document(Path::new(path), rest.first().copied())
        }
        ["info", document] => info(Path::new(document)),
        ["settings"] => show_settings(&Settings::load_or_default()),
        ["settings", key, value] => update_settings(key, value),
        ["session"] => show_session(),
        ["shell"] => shell(),
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }
}

fn load_document(path: &Path) -> Result<Document> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Document::from_json(&json)
        .with_context(|| format!("{} is not a specnote document", path.display()))?;
    Ok(document.located_at(path.to_path_buf(), display_name_for(path)))
}

fn export(document: &Path, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    let document = load_document(document)?;
    let request = ExportRequest {
        content: format.render(document.content()),
        default_name: document.default_file_name(format.extension()),
        format,
    };

    let Some(output) = output else {
        println!("{}", request.content);
        return Ok(());
    };

    let mut files = FsFileIo::new(move |_: Prompt<'_>| Some(output.clone()));
    let exported = files.export_file(&request)?;
    log::info!("Exported to {}", exported.file_path.display());
    Ok(())
}

fn new_document(path: &Path, name: Option<&str>) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let name = name
        .map(str::to_string)
        .or_else(|| display_name_for(path))
        .unwrap_or_else(|| Pane::Left.untitled_name().to_string());
    let document = Document::new(name);

    let mut files = FsFileIo::new(|_: Prompt<'_>| None);
    let saved = files.save_file(&SaveRequest {
        content: document.to_json()?,
        file_path: Some(path.to_path_buf()),
        default_name: document.default_file_name(NATIVE_EXTENSION),
    })?;
    println!("Created {}", saved.file_path.display());
    Ok(())
}

fn info(path: &Path) -> Result<()> {
    let document = load_document(path)?;
    let text = document.content().text_content();

    println!("name:       {}", document.name());
    println!("id:         {}", document.id());
    println!("created:    {}", document.created_at().to_rfc3339());
    println!("updated:    {}", document.updated_at().to_rfc3339());
    println!("nodes:      {}", document.content().node_count());
    println!("words:      {}", text.split_whitespace().count());
    println!("characters: {}", text.chars().count());
    Ok(())
}

fn show_settings(settings: &Settings) -> Result<()> {
    println!("# {}", Settings::config_path().display());
    println!("autosave_enabled = {}", settings.autosave_enabled);
    println!("autosave_interval = {}", settings.autosave_interval);
    println!("show_line_numbers = {}", settings.show_line_numbers);
    println!("default_font_size = {:?}", settings.default_font_size);
    println!("line_spacing = {}", settings.line_spacing);
    Ok(())
}

fn update_settings(key: &str, value: &str) -> Result<()> {
    let patch = parse_patch(key, value)?;
    let settings = Settings::load_or_default().update(patch);
    settings.save()?;
    show_settings(&settings)
}

fn parse_patch(key: &str, value: &str) -> Result<SettingsPatch> {
    let mut patch = SettingsPatch::default();
    match key.replace('-', "_").as_str() {
        "autosave_enabled" => patch.autosave_enabled = Some(value.parse()?),
        "autosave_interval" => patch.autosave_interval = Some(value.parse()?),
        "show_line_numbers" => patch.show_line_numbers = Some(value.parse()?),
        "default_font_size" => patch.default_font_size = Some(value.to_string()),
        "line_spacing" => patch.line_spacing = Some(value.parse()?),
        other => bail!("Unknown setting `{other}`"),
    }
    Ok(patch)
}

fn show_session() -> Result<()> {
    let store = JsonFileStore::new(Settings::session_path());
    let Some(session) = store.load()? else {
        println!("No saved session at {}", store.path().display());
        return Ok(());
    };

    if let Some(saved_at) = session.saved_at {
        println!("saved at: {}", saved_at.to_rfc3339());
    }
    for (pane, document) in [
        (Pane::Left, session.left_document),
        (Pane::Right, session.right_document),
    ] {
        match document {
            Some(document) => println!("{pane}: {}", describe(&document)),
            None => println!("{pane}: (none)"),
        }
    }
    Ok(())
}

fn describe(document: &Document) -> String {
    match document.file_path() {
        Some(path) => format!("{} ({})", document.name(), path.display()),
        None => document.name().to_string(),
    }
}

/// Read a destination from stdin. A blank line takes the proposed name,
/// `-` or end of input backs out.
fn ask_path(prompt: Prompt<'_>) -> Option<PathBuf> {
    let default_name = match prompt {
        Prompt::Save { default_name } => {
            print!("Save as [{default_name}]: ");
            Some(default_name)
        }
        Prompt::Export {
            default_name,
            format,
        } => {
            print!("Export {format} to [{default_name}]: ");
            Some(default_name)
        }
        Prompt::Open => {
            print!("Open: ");
            None
        }
    };
    io::stdout().flush().ok()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).ok()? == 0 {
        return None;
    }
    match line.trim() {
        "-" => None,
        "" => default_name.map(PathBuf::from),
        path => Some(PathBuf::from(path)),
    }
}

fn shell() -> Result<()> {
    let settings = Settings::load_or_default();
    let store = JsonFileStore::new(Settings::session_path());
    let mut session = Session::restore(settings, store, Instant::now())
        .with_settings_path(Settings::config_path());
    let mut files = FsFileIo::new(ask_path);

    println!("Commands: {}", command_ids());
    println!("Also: append <text>, rename <name>, show, status, quit");
    print_status(&session);

    let stdin = io::stdin();
    loop {
        print!("{}> ", session.active_pane());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        for (pane, outcome) in session.tick_with(Instant::now(), &mut files) {
            log::info!("Autosave {pane}: {outcome:?}");
        }

        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let pane = session.active_pane();
        match word {
            "" => {}
            "quit" | "exit" => break,
            "status" => print_status(&session),
            "show" => println!(
                "{}",
                ExportFormat::PlainText.render(session.document(pane).content())
            ),
            "append" => {
                let mut blocks = session.document(pane).content().children().to_vec();
                blocks.push(Node::paragraph(vec![Node::text(rest)]));
                session.edit(pane, DocumentUpdate::content(Node::doc(blocks)));
            }
            "rename" if !rest.is_empty() => session.edit(pane, DocumentUpdate::rename(rest)),
            id => match id.parse::<Command>() {
                Ok(command) => {
                    if let Err(e) = session.execute(command, &mut files) {
                        eprintln!("{e}");
                    }
                }
                Err(e) => eprintln!("{e}"),
            },
        }
    }
    Ok(())
}

fn command_ids() -> String {
    Command::ALL
        .iter()
        .map(|command| command.id())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_status<S: SessionStore>(session: &Session<S>) {
    println!(
        "split: {}, scroll sync: {}, autosave: {}",
        session.split_mode(),
        if session.scroll_sync_enabled() { "on" } else { "off" },
        if session.autosave().is_running() { "on" } else { "off" },
    );
    for pane in Pane::BOTH {
        if !session.is_visible(pane) {
            continue;
        }
        let shared = session.split_mode() == SplitMode::SameDoc && pane == Pane::Right;
        println!(
            "{}{pane}: {} [{}]{}",
            if pane == session.active_pane() { "*" } else { " " },
            describe(session.document(pane)),
            session.save_state(pane),
            if shared { " (same document)" } else { "" },
        );
    }
}
