use anyhow::{anyhow, Result};
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;
use std::{env, io};

mod credentials;
mod logging;
mod ui;

use crate::{
    credentials::{clear_credentials, load_credentials, save_credentials, Credentials},
    ui::{ChatUI, UiAction},
};
use socialnetwork::{
    config::{self, ClientConfig},
    views::{bounded, ChatListView, ChatView, ProfileDirectory, UI_REQUEST_TIMEOUT},
    AccountContext, ApiClient, ApiError, ChatService, EntityId, PollConfig,
};

const ENV_USERNAME: &str = "SOCIALNETWORK_USERNAME";
const ENV_PASSWORD: &str = "SOCIALNETWORK_PASSWORD";

const TIMED_OUT: &str = "The server did not answer in time (Ctrl+R to reload)";

// Columns Ctrl+S walks through, each ascending then descending
const SORT_PREDICATES: [&str; 3] = ["id", "initiatorName", "accepted"];

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "socialnetwork: a terminal client for the social network chat backend.",
    long_about = "A terminal client for the social network backend: list your chats, read them live \
    and answer, accept chat requests and ask other profiles for a chat.\n\n\
    Login uses SOCIALNETWORK_USERNAME / SOCIALNETWORK_PASSWORD when set, otherwise a saved session \
    or an interactive prompt."
)]
struct Args {
    /// Backend base URL (overrides config.json and SOCIALNETWORK_URL)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Milliseconds between two refreshes of the open chat
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Apply every poll response, even one that arrives after a newer one
    #[arg(long)]
    keep_stale: bool,

    /// Directory for config.json, credentials.json and the log file
    #[arg(long, value_name = "PATH")]
    config_dir: Option<PathBuf>,

    /// Log file (default: socialnetwork.log, inside --config-dir when given)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, env = "SOCIALNETWORK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Forget the saved session and log in again
    #[arg(long)]
    logout: bool,
}

/// Everything the main loop acts on
struct App {
    context: AccountContext,
    service: Arc<dyn ChatService>,
    poll_config: PollConfig,
    chats: ChatListView,
    profiles: ProfileDirectory,
    open: Option<ChatView>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(dir) = &args.config_dir {
        config::set_config_dir_override(dir.clone());
    }

    let log_file_path = match (&args.log_file, &args.config_dir) {
        (Some(path), _) => path.clone(),
        (None, Some(_)) => config::config_dir()?.join("socialnetwork.log"),
        (None, None) => PathBuf::from("socialnetwork.log"),
    };
    let log_level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|e| anyhow!("Invalid log level {:?}: {}", args.log_level, e))?;
    logging::init(&log_file_path, log_level)?;
    info!("socialnetwork client starting up");
    info!("Logging to file: {}", log_file_path.display());

    let mut config = ClientConfig::load()?;
    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    if let Some(ms) = args.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    if args.keep_stale {
        config.discard_stale_responses = false;
    }
    info!("Using backend {}", config.base_url);

    if args.logout {
        clear_credentials()?;
    }

    println!("Connecting to {}... please wait...\n", config.base_url);
    let context = login(&config).await?;

    let service: Arc<dyn ChatService> = Arc::new(context.api.clone());
    let mut app = App {
        chats: ChatListView::new(context.api.clone()),
        profiles: ProfileDirectory::new(context.api.clone()),
        poll_config: config.poll_config(),
        service,
        context,
        open: None,
    };

    let mut chat_ui = ChatUI::new();
    match bounded(UI_REQUEST_TIMEOUT, app.chats.load()).await {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            error!("Loading chats failed: {}", e);
            chat_ui.set_status("Could not load your chats (Ctrl+R to retry)");
        }
        None => chat_ui.set_status(TIMED_OUT),
    }

    let mut terminal = ui::setup_terminal()?;
    let result = run_main_loop(&mut chat_ui, &mut terminal, &mut app).await;

    // Stop polling before the terminal goes back to normal
    if let Some(mut view) = app.open.take() {
        view.close();
    }
    ui::restore_terminal(terminal)?;

    if let Err(e) = &result {
        error!("Main loop failed: {}", e);
    }
    println!("Session ended.");
    result
}

/// Environment, then a saved session for the same server, then an interactive prompt
async fn login(config: &ClientConfig) -> Result<AccountContext> {
    let api = ApiClient::new(&config.base_url);

    if let (Ok(username), Ok(password)) = (env::var(ENV_USERNAME), env::var(ENV_PASSWORD)) {
        info!("Logging in as {} from the environment", username);
        return Ok(api.login(&username, &password, config.remember_me).await?);
    }

    let mut known_username = None;
    if let Some(creds) = load_credentials()? {
        if creds.server == api.base_url() {
            if let Some(token) = creds.get_token() {
                match api.clone().with_token(&token).resume_session().await {
                    Ok(context) => return Ok(context),
                    Err(ApiError::Unauthorized(_)) => {
                        warn!("Saved session for {} has expired", creds.username);
                        clear_credentials()?;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            known_username = Some(creds.username);
        } else {
            info!("Saved credentials belong to {}, ignoring them", creds.server);
        }
    }

    let username = match known_username {
        Some(username) => username,
        None => prompt("Enter username:")?,
    };
    let password = prompt(&format!("Enter password for {}:", username))?;

    let context = api.login(&username, &password, config.remember_me).await?;
    let token = context
        .api
        .token()
        .ok_or_else(|| anyhow!("Login succeeded without a token"))?;
    if config.remember_me {
        save_credentials(&Credentials::new(api.base_url(), &username, token))?;
    }
    Ok(context)
}

// Ask on stderr, answer on stdin; the answer is trimmed
fn prompt(question: &str) -> Result<String> {
    eprintln!("{}", question);
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Run the main event loop
async fn run_main_loop(
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| chat_ui.draw(f, &app.chats, app.open.as_ref(), &app.profiles))?;

        let Some(action) = chat_ui.handle_input()? else {
            continue;
        };

        match action {
            UiAction::Quit => break,
            UiAction::SelectNext => {
                if chat_ui.is_profiles_open() {
                    app.profiles.select_next();
                } else {
                    app.chats.select_next();
                }
            }
            UiAction::SelectPrevious => {
                if chat_ui.is_profiles_open() {
                    app.profiles.select_previous();
                } else {
                    app.chats.select_previous();
                }
            }
            UiAction::OpenSelected => open_selected(chat_ui, app),
            UiAction::Send(text) => match app.open.as_mut() {
                Some(view) => {
                    view.set_input(&text);
                    match bounded(UI_REQUEST_TIMEOUT, view.send_message()).await {
                        Some(true) => chat_ui.clear_input(),
                        Some(false) => {}
                        None => chat_ui.set_status(TIMED_OUT),
                    }
                }
                None => chat_ui.set_status("Open a chat first (Enter on the chat list)"),
            },
            UiAction::Accept => accept(chat_ui, app).await,
            UiAction::DeleteConfirmed => {
                let selected = app.chats.selected_chat().and_then(|c| c.id);
                match bounded(UI_REQUEST_TIMEOUT, app.chats.delete_selected()).await {
                    Some(Ok(Some(id))) => {
                        close_if_open(app, id);
                        chat_ui.set_status(&format!("Deleted chat #{}", id));
                    }
                    Some(Ok(None)) => {}
                    Some(Err(e)) => {
                        error!("Deleting chat failed: {}", e);
                        chat_ui.set_status("Could not delete the chat");
                    }
                    None => {
                        // The DELETE may have gone through; stop polling a chat that may be gone
                        if let Some(id) = selected {
                            close_if_open(app, id);
                        }
                        chat_ui.set_status(TIMED_OUT);
                    }
                }
            }
            UiAction::ShowProfiles => match bounded(UI_REQUEST_TIMEOUT, app.profiles.load()).await {
                Some(Ok(())) => chat_ui.show_profiles(),
                Some(Err(e)) => {
                    error!("Loading profiles failed: {}", e);
                    chat_ui.set_status("Could not load profiles");
                }
                None => chat_ui.set_status(TIMED_OUT),
            },
            UiAction::RequestChat => {
                match bounded(UI_REQUEST_TIMEOUT, app.profiles.request_chat()).await {
                    Some(Ok(Some(chat))) => {
                        chat_ui.close_profiles();
                        chat_ui.set_status(&format!("Requested {}", chat.label()));
                        reload(chat_ui, app).await;
                    }
                    Some(Ok(None)) => {}
                    Some(Err(e)) => {
                        error!("Requesting chat failed: {}", e);
                        chat_ui.set_status("Could not request a chat with this profile");
                    }
                    None => chat_ui.set_status(TIMED_OUT),
                }
            }
            UiAction::Reload => reload(chat_ui, app).await,
            UiAction::CycleSort => {
                let sort = app.chats.sort_state();
                let next = if sort.ascending {
                    sort.predicate.clone()
                } else {
                    let current = SORT_PREDICATES
                        .iter()
                        .position(|p| *p == sort.predicate)
                        .unwrap_or(0);
                    SORT_PREDICATES[(current + 1) % SORT_PREDICATES.len()].to_string()
                };
                app.chats.refine(&next);
            }
        }
    }
    Ok(())
}

fn open_selected(chat_ui: &mut ChatUI, app: &mut App) {
    let Some(chat) = app.chats.selected_chat().cloned() else {
        return;
    };
    if app.open.is_some() && app.open.as_ref().map(|v| v.chat_id()) == chat.id {
        chat_ui.focus_messages();
        return;
    }

    // Dropping the previous view stops its poll loop
    app.open = ChatView::open(
        app.context.clone(),
        chat,
        app.service.clone(),
        app.poll_config,
    );
    if app.open.is_some() {
        chat_ui.clear_input();
        chat_ui.focus_messages();
    }
}

// The open chat if there is one, otherwise the chat selected in the list
async fn accept(chat_ui: &mut ChatUI, app: &mut App) {
    let accepted = match app.open.as_mut() {
        Some(view) if view.can_accept() => bounded(UI_REQUEST_TIMEOUT, view.accept()).await,
        Some(_) => Some(false),
        None => bounded(UI_REQUEST_TIMEOUT, app.chats.accept_selected()).await,
    };
    match accepted {
        Some(true) => reload(chat_ui, app).await,
        Some(false) => {}
        None => chat_ui.set_status(TIMED_OUT),
    }
}

async fn reload(chat_ui: &mut ChatUI, app: &mut App) {
    match bounded(UI_REQUEST_TIMEOUT, app.chats.load()).await {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            error!("Reloading chats failed: {}", e);
            chat_ui.set_status("Could not reload your chats");
        }
        None => chat_ui.set_status(TIMED_OUT),
    }
}

// Dropping the view stops its poll loop
fn close_if_open(app: &mut App, chat_id: EntityId) {
    if app.open.as_ref().map(|v| v.chat_id()) == Some(chat_id) {
        app.open = None;
    }
}
