// ABOUTME: End-to-end listener example
// ABOUTME: Connects to a node, logs every event, and lists players once ready

use clap::Parser;
use lava::protocol::events::{
    PlayerUpdateEvent, ReadyEvent, StatsEvent, TrackEndEvent, TrackExceptionEvent,
    TrackStartEvent, TrackStuckEvent, WebSocketClosedEvent,
};
use lava::{ConnectionConfig, ConnectionStatus, Lavalink};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lavalink event monitor
#[derive(Parser, Debug)]
#[command(name = "listen")]
#[command(about = "Connect to a Lavalink node and print its events", long_about = None)]
struct Args {
    /// Node hostname
    #[arg(long, env = "LAVALINK_HOST", default_value = "localhost")]
    host: String,

    /// Node port
    #[arg(long, env = "LAVALINK_PORT", default_value_t = 2333)]
    port: u16,

    /// Node password
    #[arg(long, env = "LAVALINK_PASSWORD", default_value = "youshallnotpass")]
    password: String,

    /// Discord user id of the bot
    #[arg(long, env = "LAVALINK_BOT_ID")]
    bot_id: u64,

    /// Resume a previous session
    #[arg(long, env = "LAVALINK_RESUME_KEY")]
    resume_key: Option<String>,

    /// Use wss:// and https://
    #[arg(long, env = "LAVALINK_SSL")]
    ssl: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let mut config = ConnectionConfig::new(&args.host, args.port, &args.password, args.bot_id)
        .with_ssl(args.ssl)
        .with_trace(true);
    if let Some(key) = args.resume_key {
        config = config.with_resume_key(key);
    }

    let mut lavalink = Lavalink::new();
    let session_id = Arc::new(OnceCell::new());

    let ready_session = Arc::clone(&session_id);
    lavalink.listen(move |event: ReadyEvent| {
        let ready_session = Arc::clone(&ready_session);
        async move {
            println!("Ready: session={} resumed={}", event.session_id, event.resumed);
            let _ = ready_session.set(event.session_id);
            Ok(())
        }
    });
    lavalink.listen(|event: StatsEvent| async move {
        println!(
            "Stats: {}/{} players playing, uptime {:?}",
            event.playing_players, event.players, event.uptime
        );
        Ok(())
    });
    lavalink.listen(|event: PlayerUpdateEvent| async move {
        println!("Player {}: position {:?}", event.guild_id, event.state.position);
        Ok(())
    });
    lavalink.listen(|event: TrackStartEvent| async move {
        println!("Track started in {}", event.guild_id);
        Ok(())
    });
    lavalink.listen(|event: TrackEndEvent| async move {
        println!("Track ended in {}: {:?}", event.guild_id, event.reason);
        Ok(())
    });
    lavalink.listen(|event: TrackExceptionEvent| async move {
        println!("Track failed in {}: {}", event.guild_id, event.exception.cause);
        Ok(())
    });
    lavalink.listen(|event: TrackStuckEvent| async move {
        println!("Track stuck in {} for {:?}", event.guild_id, event.threshold);
        Ok(())
    });
    lavalink.listen(|event: WebSocketClosedEvent| async move {
        println!("Voice socket closed in {}: {} {}", event.guild_id, event.code, event.reason);
        Ok(())
    });

    println!("Connecting to {}...", config.websocket_url());
    lavalink.connect(config).await?;
    println!("Connected!");

    let mut status = lavalink.subscribe_status()?;
    let mut listed = false;

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                match current {
                    ConnectionStatus::Open => {}
                    ConnectionStatus::Closed => {
                        println!("Node closed the connection");
                        break;
                    }
                    ConnectionStatus::Errored(reason) => {
                        eprintln!("Connection failed: {reason}");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(std::time::Duration::from_secs(1)), if !listed => {
                if let Some(id) = session_id.get() {
                    listed = true;
                    match lavalink.get_players(id).await {
                        Ok(players) => {
                            println!("{} player(s) on session {id}", players.len());
                            for player in players {
                                println!("  guild {} volume {} paused {}", player.guild_id, player.volume, player.paused);
                            }
                        }
                        Err(e) => eprintln!("Failed to list players: {e}"),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Shutting down");
                lavalink.close().await?;
                break;
            }
        }
    }

    Ok(())
}
