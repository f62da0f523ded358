use clap::Parser;
use magicpedia::config::ApiConfig;
use magicpedia::error::AppError;
use magicpedia::session::{spawn_time_ticker, Session};
use magicpedia::store::Store;
use magicpedia::types::{
    AnswerLength, ApiProvider, Character, CharacterStyle, Language, Role, Theme, Tone, VoiceName,
    VoiceProvider,
};
use std::io::Write;
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Four-digit parental gate. A literal comparison, by design not a
/// security boundary.
const PARENT_PIN: &str = "1234";

#[derive(Parser, Debug)]
#[command(
    name = "magicpedia",
    about = "Child-friendly conversational encyclopedia with cartoon companions"
)]
struct Args {
    /// Data directory for settings, characters, and history
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the configured language for this run (en, de, zh, ja, fr, es, it)
    #[arg(long)]
    language: Option<Language>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    env_logger::init();
    log::info!("🚀 Starting magicpedia");

    let args = Args::parse();

    let data_dir = args.data_dir.unwrap_or_else(Store::default_dir);
    let store = Store::open(&data_dir)?;
    log::info!("📦 Store opened at {}", data_dir.display());

    let credentials = ApiConfig::load();
    let mut session = Session::new(store.clone(), credentials);

    if let Some(language) = args.language {
        session.update_settings(|s| s.language = language);
    }

    // Screen-time countdown; cancelled when the handle drops at exit.
    let _ticker = spawn_time_ticker(session.settings_handle(), store);

    let character = session.selected_character();
    println!("✨ Welcome to Magicpedia!");
    println!(
        "   You are talking to {} - {}",
        character.name, character.persona
    );
    println!("   Type a question, or /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(&session.selected_character().name);
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break, // stdin closed
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_whitespace().next().unwrap_or_default() {
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/stop" => session.stop_speaking(),
            "/ask" => {
                let question = session.settings().language.demo_question().to_string();
                println!("You: {}", question);
                run_turn(&mut session, &question).await;
            }
            "/friends" => friends_command(&mut session, input),
            "/new" => new_character_command(&mut session, input).await,
            "/delete" => {
                let id = input.trim_start_matches("/delete").trim();
                let is_default = session
                    .characters()
                    .iter()
                    .any(|c| c.id == id && c.is_default);
                if id.is_empty() {
                    println!("Usage: /delete <character id>");
                } else if is_default {
                    // Stock friends stay; only user-made ones can go.
                    println!("{} is a built-in friend and can't be deleted.", id);
                } else if session.delete_character(id) {
                    println!("Said goodbye to '{}'.", id);
                } else {
                    println!("Can't delete '{}' (unknown, or the last friend left).", id);
                }
            }
            "/parents" => parental_portal(&mut session, &mut lines).await?,
            other if other.starts_with('/') => {
                println!("Unknown command '{}'. Try /help.", other);
            }
            _ => run_turn(&mut session, input).await,
        }
    }

    println!("👋 Bye!");
    Ok(())
}

fn prompt(name: &str) {
    print!("{}> ", name);
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("Commands:");
    println!("  <question>   ask your friend anything");
    println!("  /ask         play the demo question in your language");
    println!("  /friends     list friends; /friends <id> to switch");
    println!("  /new Name | persona | system prompt   create a friend");
    println!("  /delete <id> remove a friend (never the last one)");
    println!("  /stop        stop the current speech");
    println!("  /parents     parental portal (PIN required)");
    println!("  /quit        exit");
}

async fn run_turn(session: &mut Session, text: &str) {
    let reply = session.send(text).await;
    println!("{}: {}", session.selected_character().name, reply.content);
    if let Some(image_url) = &reply.image_url {
        match save_data_uri(session.store().dir(), image_url) {
            Ok(path) => println!("   🎨 Picture saved to {}", path.display()),
            Err(e) => log::warn!("Could not save picture: {}", e),
        }
    }
}

fn friends_command(session: &mut Session, input: &str) {
    let arg = input.trim_start_matches("/friends").trim();
    if arg.is_empty() {
        let selected = session.selected_character().id.clone();
        for character in session.characters() {
            let marker = if character.id == selected { "*" } else { " " };
            println!(
                " {} {:12} {} - {}",
                marker, character.id, character.name, character.persona
            );
        }
        return;
    }
    if session.select_character(arg) {
        let character = session.selected_character();
        println!("Now talking to {}!", character.name);
    } else {
        println!("No friend with id '{}'.", arg);
    }
}

async fn new_character_command(session: &mut Session, input: &str) {
    let definition = input.trim_start_matches("/new").trim();
    let parts: Vec<&str> = definition.split('|').map(str::trim).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        println!("Usage: /new Name | persona | system prompt");
        return;
    }

    let character = Character::new(
        parts[0],
        parts[1],
        parts[2],
        VoiceName::Puck,
        CharacterStyle {
            tone: Tone::Friendly,
            length: AnswerLength::Short,
        },
        format!("https://picsum.photos/seed/{}/400/400", parts[0]),
    );

    match session.add_character(character).await {
        Ok(()) => println!("New friend '{}' is ready to chat!", parts[0]),
        Err(AppError::Rejected(reason)) => {
            println!("That friend isn't suitable for children: {}", reason);
        }
        Err(e) => println!("Could not create the friend: {}", e),
    }
}

async fn parental_portal(
    session: &mut Session,
    lines: &mut Lines<BufReader<Stdin>>,
) -> std::io::Result<()> {
    print!("PIN: ");
    let _ = std::io::stdout().flush();
    let pin = match lines.next_line().await? {
        Some(pin) => pin,
        None => return Ok(()),
    };
    if pin.trim() != PARENT_PIN {
        println!("Wrong PIN.");
        return Ok(());
    }

    println!("Parental portal. Commands: show, history, clear, language <code>,");
    println!("theme <name>, limit <minutes>, reset, search on|off,");
    println!("provider google|custom, voice google|custom,");
    println!("customapi <url> <key> <model>, customtts <url> <key> <model> <voice>, back");

    loop {
        print!("parents> ");
        let _ = std::io::stdout().flush();
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => return Ok(()),
        };
        let input = line.trim();
        let mut words = input.split_whitespace();
        match words.next().unwrap_or_default() {
            "back" | "" => break,
            "show" => print_settings(session),
            "history" => print_history(session),
            "clear" => {
                session.clear_history();
                println!("History cleared.");
            }
            "language" => match words.next().map(str::parse::<Language>) {
                Some(Ok(language)) => session.update_settings(|s| s.language = language),
                _ => println!(
                    "Languages: {}",
                    Language::iter()
                        .map(|l| l.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
            "theme" => match words.next().map(str::parse::<Theme>) {
                Some(Ok(theme)) => session.update_settings(|s| s.theme = theme),
                _ => println!(
                    "Themes: {}",
                    Theme::iter()
                        .map(|t| t.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
            "limit" => match words.next().map(str::parse::<u32>) {
                Some(Ok(minutes)) => {
                    // Consumed time is not refunded by a new limit.
                    session.update_settings(|s| s.time_limit_minutes = minutes);
                }
                _ => println!("Usage: limit <minutes>"),
            },
            "reset" => {
                session.update_settings(|s| s.remaining_time = s.time_limit_minutes);
                println!("Screen-time budget refilled.");
            }
            "search" => match words.next() {
                Some("on") => session.update_settings(|s| s.search_enabled = true),
                Some("off") => session.update_settings(|s| s.search_enabled = false),
                _ => println!("Usage: search on|off"),
            },
            "provider" => match words.next().map(str::parse::<ApiProvider>) {
                Some(Ok(provider)) => session.update_settings(|s| s.api_provider = provider),
                _ => println!("Usage: provider google|custom"),
            },
            "voice" => match words.next().map(str::parse::<VoiceProvider>) {
                Some(Ok(provider)) => session.update_settings(|s| s.voice_provider = provider),
                _ => println!("Usage: voice google|custom"),
            },
            "customapi" => {
                let args: Vec<&str> = words.collect();
                if args.len() == 3 {
                    session.update_settings(|s| {
                        s.custom_api.base_url = args[0].to_string();
                        s.custom_api.api_key = args[1].to_string();
                        s.custom_api.model = args[2].to_string();
                    });
                } else {
                    println!("Usage: customapi <url> <key> <model>");
                }
            }
            "customtts" => {
                let args: Vec<&str> = words.collect();
                if args.len() == 4 {
                    session.update_settings(|s| {
                        s.custom_tts.base_url = args[0].to_string();
                        s.custom_tts.api_key = args[1].to_string();
                        s.custom_tts.model = args[2].to_string();
                        s.custom_tts.voice = args[3].to_string();
                    });
                } else {
                    println!("Usage: customtts <url> <key> <model> <voice>");
                }
            }
            other => println!("Unknown portal command '{}'.", other),
        }
    }
    Ok(())
}

fn print_settings(session: &Session) {
    let settings = session.settings();
    println!("language: {}   theme: {}", settings.language, settings.theme);
    println!(
        "time: {} of {} minutes left",
        settings.remaining_time, settings.time_limit_minutes
    );
    println!(
        "search: {}   provider: {}   voice: {}",
        if settings.search_enabled { "on" } else { "off" },
        settings.api_provider,
        settings.voice_provider
    );
    if !settings.custom_api.base_url.is_empty() {
        println!(
            "custom api: {} ({})",
            settings.custom_api.base_url, settings.custom_api.model
        );
    }
    if !settings.custom_tts.base_url.is_empty() {
        println!(
            "custom tts: {} ({}, voice {})",
            settings.custom_tts.base_url, settings.custom_tts.model, settings.custom_tts.voice
        );
    }
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        println!("No conversations yet.");
        return;
    }
    for message in session.history() {
        let who = match message.role {
            Role::User => "child",
            Role::Assistant => "friend",
        };
        println!("[{}] {}: {}", message.character_id, who, message.content);
    }
}

/// Write a `data:<mime>;base64,<payload>` URI to a file in `dir`.
fn save_data_uri(dir: &std::path::Path, uri: &str) -> Result<PathBuf, AppError> {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| AppError::General("not a data URI".to_string()))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::General("not a base64 data URI".to_string()))?;
    let extension = match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    };

    let bytes = BASE64
        .decode(payload)
        .map_err(|e| AppError::General(format!("bad image payload: {}", e)))?;
    let path = dir.join(format!(
        "picture-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        extension
    ));
    std::fs::write(&path, bytes)?;
    Ok(path)
}
