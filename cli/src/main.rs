use std::time::Duration;

use canvas::engine::{Effect, EngineCore};
use canvas::input::Tool;
use canvas::sync::{SyncAdapter, SyncError};
use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use scene::codec::{self, CodecError, ServerMsg};
use scene::credential::hash_secret;
use scene::{Action, ActorId, Document, Point};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::{COOKIE, InvalidHeaderValue};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Stream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing credentials; pass --user/--token or set PLAYHOUSE_USER/PLAYHOUSE_TOKEN")]
    MissingCredentials,
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("websocket failed: {0}")]
    Ws(Box<tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for server")]
    Timeout,
    #[error("protocol error: {0}")]
    Codec(#[from] CodecError),
    #[error("replica out of sync: {0}")]
    Sync(#[from] SyncError),
    #[error("server rejected action: {code} {message}")]
    Rejected { code: String, message: String },
    #[error("no action produced for this command")]
    NothingToSend,
    #[error("background {0} is not available")]
    InvalidBackground(u32),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tungstenite::Error> for CliError {
    fn from(error: tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "playhouse-cli", about = "Playhouse scene websocket CLI")]
struct Cli {
    #[arg(long, env = "PLAYHOUSE_URL", default_value = "ws://127.0.0.1:3000/connect")]
    url: String,

    #[arg(long, env = "PLAYHOUSE_USER")]
    user: Option<String>,

    #[arg(long, env = "PLAYHOUSE_TOKEN")]
    token: Option<String>,

    #[arg(long, default_value_t = 5, help = "Seconds to wait for each server reply")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the document on join and after every applied action.
    Watch,
    /// Print the digest to list in PLAYHOUSE_USERS for a secret.
    Hash { secret: String },
    #[command(flatten)]
    Send(SendCommand),
}

/// One action sent after the initial state arrives.
#[derive(Subcommand, Debug, Clone)]
enum SendCommand {
    /// Set an actor's speech bubble.
    Say { actor_ix: usize, msg: String },
    /// Move an actor to an absolute position.
    Move { actor_ix: usize, x: f64, y: f64 },
    /// Add an actor; the color is drawn from the palette unless given.
    Add {
        x: f64,
        y: f64,
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove an actor.
    Delete { actor_ix: usize },
    /// Switch the background.
    Bg { bg: u32 },
}

#[derive(Debug, Clone)]
struct CliContext {
    url: String,
    user: Option<String>,
    token: Option<String>,
    timeout: Duration,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext {
        url: cli.url,
        user: cli.user,
        token: cli.token,
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    match cli.command {
        Command::Hash { secret } => {
            println!("{}", hash_secret(&secret));
            Ok(())
        }
        Command::Watch => run_watch(&ctx).await,
        Command::Send(command) => run_send(&ctx, command).await,
    }
}

async fn run_watch(ctx: &CliContext) -> Result<(), CliError> {
    let (mut stream, mut adapter) = connect_synced(ctx).await?;
    print_document(&adapter.core().replica)?;

    loop {
        let Some(text) = recv_text(&mut stream).await? else {
            return Ok(());
        };
        for effect in adapter.on_server_text(&text)? {
            match effect {
                Effect::RenderNeeded => print_document(&adapter.core().replica)?,
                Effect::Rejected { code, message } => eprintln!("rejected: {code} {message}"),
                Effect::Send(_) | Effect::SetCursor(_) => {}
            }
        }
    }
}

async fn run_send(ctx: &CliContext, command: SendCommand) -> Result<(), CliError> {
    let (mut stream, mut adapter) = connect_synced(ctx).await?;

    let action = plan_action(adapter.core_mut(), &command)?;
    let text = codec::encode_action(&action)?;
    stream.send(Message::Text(text.clone().into())).await?;
    eprintln!("sent {}", action.name());

    // The echo is the original text; everything before it is someone else's.
    // An identical action sent by another client first is taken as ours. It
    // leaves the document in the same state, so the printed result holds.
    loop {
        let reply = recv_text_within(&mut stream, ctx.timeout).await?;
        let effects = adapter.on_server_text(&reply)?;
        if let Some(Effect::Rejected { code, message }) =
            effects.into_iter().find(|e| matches!(e, Effect::Rejected { .. }))
        {
            return Err(CliError::Rejected { code, message });
        }
        if reply == text {
            return print_document(&adapter.core().replica);
        }
    }
}

/// Build the action for `command` against the current replica. Index-addressed
/// actions carry the id of the actor the replica holds at that index.
fn plan_action(core: &mut EngineCore, command: &SendCommand) -> Result<Action, CliError> {
    match command {
        SendCommand::Say { actor_ix, msg } => Ok(Action::SetSpeech {
            actor_ix: *actor_ix,
            msg: msg.clone(),
            actor_id: guard(&core.replica, *actor_ix),
        }),
        SendCommand::Move { actor_ix, x, y } => Ok(Action::SetPos {
            actor_ix: *actor_ix,
            p: Point::new(*x, *y),
            actor_id: guard(&core.replica, *actor_ix),
        }),
        SendCommand::Delete { actor_ix } => {
            Ok(Action::DeleteActor { actor_ix: *actor_ix, actor_id: guard(&core.replica, *actor_ix) })
        }
        SendCommand::Add { x, y, color: Some(color) } => {
            Ok(Action::AddActor { p: Point::new(*x, *y), color: color.clone() })
        }
        SendCommand::Add { x, y, color: None } => {
            core.set_tool(Tool::Add);
            first_send(core.on_pointer_down(Point::new(*x, *y))).ok_or(CliError::NothingToSend)
        }
        SendCommand::Bg { bg } => {
            core.set_tool(Tool::Bg);
            first_send(core.select_background(*bg)).ok_or(CliError::InvalidBackground(*bg))
        }
    }
}

fn guard(doc: &Document, actor_ix: usize) -> Option<ActorId> {
    doc.actor(actor_ix).map(|actor| actor.id)
}

fn first_send(effects: Vec<Effect>) -> Option<Action> {
    effects.into_iter().find_map(|effect| match effect {
        Effect::Send(action) => Some(action),
        _ => None,
    })
}

/// Connect with cookie credentials and wait for `initState`.
async fn connect_synced(ctx: &CliContext) -> Result<(Stream, SyncAdapter), CliError> {
    let (Some(user), Some(token)) = (&ctx.user, &ctx.token) else {
        return Err(CliError::MissingCredentials);
    };

    let mut request = ctx.url.as_str().into_client_request()?;
    request.headers_mut().insert(COOKIE, HeaderValue::from_str(&format!("user={user}; token={token}"))?);
    let (mut stream, _) = connect_async(request).await?;

    let mut adapter = SyncAdapter::new(EngineCore::new());
    while !adapter.is_synced() {
        let text = recv_text_within(&mut stream, ctx.timeout).await?;
        // Only initState is expected first; anything else is a server bug.
        if !matches!(codec::decode_server_msg(&text)?, ServerMsg::Init(_)) {
            return Err(CliError::Sync(SyncError::NotSynced));
        }
        adapter.on_server_text(&text)?;
    }
    Ok((stream, adapter))
}

async fn recv_text_within(stream: &mut Stream, timeout: Duration) -> Result<String, CliError> {
    tokio::time::timeout(timeout, recv_text(stream))
        .await
        .map_err(|_| CliError::Timeout)??
        .ok_or(CliError::WsClosed)
}

/// Next text message, or `None` once the server closes.
async fn recv_text(stream: &mut Stream) -> Result<Option<String>, CliError> {
    loop {
        let Some(message) = stream.next().await else {
            return Ok(None);
        };
        match message? {
            Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
            Message::Close(_) => return Ok(None),
            _ => {}
        }
    }
}

fn print_document(doc: &Document) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(doc)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
