//! Startup helpers for the terminal chat front-end.
//!
//! Reads commands from stdin and drives a mounted [`ChatWidget`] against the
//! configured assistant API.

use std::io::Stdout;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::chat::adapters::{TerminalNavigator, TerminalViewport, init_tracing};
use crate::chat::core::config::ChatConfig;
use crate::chat::session::{
    FixedAnswer, IdentityProvider, SessionCollaborators, StaticIdentity, SubmitOutcome,
    UserIdentity,
};
use crate::chat::store::ConversationStore;
use crate::chat::transport::HttpAssistantClient;
use crate::chat::widget::ChatWidget;

/// Account id of the signed-in user; unset means guest.
pub const USER_ENV: &str = "STOREFRONT_CHAT_USER";
/// Bearer token sent with API requests.
pub const TOKEN_ENV: &str = "STOREFRONT_CHAT_TOKEN";
/// Answer the login prompt with yes.
pub const CONFIRM_LOGIN_ENV: &str = "STOREFRONT_CHAT_CONFIRM_LOGIN";

/// Command-line switches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LaunchOptions {
    /// Accept the login redirect prompt for guests.
    pub confirm_login: bool,
    /// Start with the chat panel open.
    pub start_open: bool,
}

impl LaunchOptions {
    /// Parse switches. Unknown arguments are logged and skipped.
    #[must_use]
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        for arg in args {
            match arg.as_ref() {
                "--yes-login" => options.confirm_login = true,
                "--open" => options.start_open = true,
                other => warn!("Ignoring unknown argument {other}"),
            }
        }
        options
    }
}

/// One line of user input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Leave the session.
    Quit,
    /// Show the panel.
    Open,
    /// Hide the panel.
    Close,
    /// Flip visibility.
    Toggle,
    /// Follow the numbered link.
    Link(usize),
    /// Send the line as a question.
    Ask(String),
    /// Unrecognized slash command.
    Unknown(String),
}

impl Command {
    /// Parse an input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let mut parts = trimmed.split_whitespace();
        match parts.next() {
            Some("/quit" | "/exit") => Self::Quit,
            Some("/open") => Self::Open,
            Some("/close") => Self::Close,
            Some("/toggle") => Self::Toggle,
            Some("/link") => parts
                .next()
                .and_then(|raw| raw.parse().ok())
                .map_or_else(|| Self::Unknown(trimmed.to_string()), Self::Link),
            Some(word) if word.starts_with('/') => Self::Unknown(trimmed.to_string()),
            _ => Self::Ask(line.to_string()),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

fn identity_from_env() -> StaticIdentity {
    match std::env::var(USER_ENV) {
        Ok(id) if !id.trim().is_empty() => {
            let user = UserIdentity::new(id.trim());
            match std::env::var(TOKEN_ENV) {
                Ok(token) => StaticIdentity::user(user.with_token(token)),
                Err(_) => StaticIdentity::user(user),
            }
        }
        _ => StaticIdentity::guest(),
    }
}

/// Run the terminal chat (used by the `storefront-chat` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` when the user quits, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();
    info!("Starting storefront chat v{}", env!("CARGO_PKG_VERSION"));

    let mut options = LaunchOptions::from_args(std::env::args().skip(1));
    options.confirm_login |= env_flag(CONFIRM_LOGIN_ENV);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(session(options)) {
        error!("Chat session failed: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

async fn session(options: LaunchOptions) -> anyhow::Result<()> {
    let mut config = ChatConfig::from_env().context("failed to load configuration")?;
    config.widget.start_open |= options.start_open;
    info!("Assistant endpoint: {}", config.api.base_url);

    let identity: Arc<dyn IdentityProvider> = Arc::new(identity_from_env());
    let client = HttpAssistantClient::new(&config.api, Arc::clone(&identity))
        .context("failed to build HTTP client")?;

    let store = Arc::new(ConversationStore::new(config.widget.start_open));
    let viewport: Arc<TerminalViewport<Stdout>> =
        Arc::new(TerminalViewport::new(Arc::clone(&store), std::io::stdout())?);
    let collaborators = SessionCollaborators {
        client: Arc::new(client),
        identity,
        navigator: Arc::new(TerminalNavigator::new(std::io::stdout())),
        login_prompt: Arc::new(FixedAnswer(options.confirm_login)),
    };

    let mut widget =
        ChatWidget::mount_with_store(store, &config, collaborators, viewport.clone())?;
    if let Some(outcome) = widget.ready().await {
        info!("Chat ready: {outcome:?}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Open => widget.open(),
            Command::Close => widget.close(),
            Command::Toggle => widget.toggle(),
            Command::Link(number) => match viewport.link_target(number) {
                Some(segment) => {
                    widget.controller().follow_link(&segment);
                }
                None => warn!("No link numbered {number}"),
            },
            Command::Ask(text) => {
                if !widget.snapshot().is_open() {
                    widget.open();
                }
                match widget.ask(text) {
                    SubmitOutcome::Ignored(reason) => warn!("Message not sent: {reason:?}"),
                    SubmitOutcome::LoginRequested { navigated } => {
                        info!("Sign-in required (redirected: {navigated})");
                    }
                    SubmitOutcome::Dispatched(_) => {}
                }
            }
            Command::Unknown(raw) => {
                warn!("Unknown command {raw}; try /open, /close, /toggle, /link <n> or /quit");
            }
        }
    }

    widget.teardown().await;
    Ok(())
}
