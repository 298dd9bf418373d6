//! Terminal client for the tic-tac-toe lobby server.

use anyhow::{Context, Result};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tictac::client::{ClientInput, HELP, parse_input, render};
use tictac_protocol::ServerMessage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Parser, Debug)]
#[command(name = "tictac-client", version, about = "Play tic-tac-toe from the terminal")]
struct Args {
    /// Server host.
    #[arg(long, env = "TICTAC_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, env = "TICTAC_PORT", default_value_t = 8765)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tictac::logging::init_with_default("warn");
    let args = Args::parse();
    let url = format!("ws://{}:{}", args.host, args.port);

    let (ws, _) = connect_async(&url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    println!("connected to {url}\n{HELP}");
    let (mut write, mut read) = ws.split();

    let reader = tokio::spawn(async move {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(msg) => println!("{}\n", render(&msg)),
                    Err(e) => tracing::warn!(error = %e, "unreadable notification"),
                },
                Ok(Message::Close(_)) => {
                    println!("server closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("connection error: {e}");
                    break;
                }
            }
        }
    });

    write
        .send(Message::text(serde_json::to_string(
            &tictac_protocol::ClientCommand::GetTables,
        )?))
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if reader.is_finished() {
            break;
        }
        match parse_input(&line) {
            Ok(Some(ClientInput::Command(command))) => {
                let json = serde_json::to_string(&command)?;
                write.send(Message::text(json)).await?;
            }
            Ok(Some(ClientInput::Help)) => println!("{HELP}"),
            Ok(Some(ClientInput::Quit)) => break,
            Ok(None) => {}
            Err(e) => println!("{e}"),
        }
    }

    let _ = write.close().await;
    reader.abort();
    Ok(())
}
