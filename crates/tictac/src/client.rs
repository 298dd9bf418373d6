//! Line-oriented client helpers: turning typed input into commands and
//! notifications into text.
//!
//! The `tictac-client` binary is a thin loop around these two functions.

use std::fmt::Write as _;

use tictac_protocol::{
    ClientCommand, Outcome, ServerMessage, TableId, TableSnapshot, TableStatus, TableSummary,
};

/// Help text printed on `help` and after a parse error.
pub const HELP: &str = "\
commands:
  list                  show open tables
  create                create a table and sit at it
  join <table>          sit at a table
  move <table> <pos>    play a cell, 0..8 row by row
  quit                  leave";

/// What the user asked for on one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientInput {
    Command(ClientCommand),
    Help,
    Quit,
}

/// Why a line of input could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing {what} for '{command}'")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("unrecognized command '{0}', type 'help' for the list")]
    Unrecognized(String),
}

/// Parses one line typed by the user.
///
/// Returns `Ok(None)` for a blank line. Table ids may be given bare
/// (`3`) or the way they are displayed (`T-3`).
///
/// ```
/// use tictac::client::{ClientInput, parse_input};
/// use tictac_protocol::{ClientCommand, TableId};
///
/// assert_eq!(
///     parse_input("move 2 4").unwrap(),
///     Some(ClientInput::Command(ClientCommand::MakeMove {
///         table_id: TableId(2),
///         position: 4,
///     }))
/// );
/// ```
pub fn parse_input(line: &str) -> Result<Option<ClientInput>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let input = match head.to_ascii_lowercase().as_str() {
        "list" | "ls" => ClientInput::Command(ClientCommand::GetTables),
        "create" | "new" => ClientInput::Command(ClientCommand::CreateTable),
        "join" => {
            let table_id = table_id(words.next(), "join")?;
            ClientInput::Command(ClientCommand::JoinTable { table_id })
        }
        "move" | "play" => {
            let table_id = table_id(words.next(), "move")?;
            let position = words.next().ok_or(ParseError::MissingArgument {
                command: "move",
                what: "position",
            })?;
            let position = position
                .parse()
                .map_err(|_| ParseError::InvalidNumber(position.to_string()))?;
            ClientInput::Command(ClientCommand::MakeMove { table_id, position })
        }
        "help" | "?" => ClientInput::Help,
        "quit" | "exit" | "q" => ClientInput::Quit,
        other => return Err(ParseError::Unrecognized(other.to_string())),
    };
    Ok(Some(input))
}

fn table_id(word: Option<&str>, command: &'static str) -> Result<TableId, ParseError> {
    let word = word.ok_or(ParseError::MissingArgument {
        command,
        what: "table id",
    })?;
    let digits = word
        .strip_prefix("T-")
        .or_else(|| word.strip_prefix("t-"))
        .unwrap_or(word);
    digits
        .parse()
        .map(TableId)
        .map_err(|_| ParseError::InvalidNumber(word.to_string()))
}

/// Renders a notification for the terminal.
pub fn render(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::Error { message } => format!("error: {message}"),
        ServerMessage::Tables { tables } => render_lobby(tables),
        ServerMessage::TableJoined { table } => {
            format!("joined table {}\n{}", table.id, render_table(table))
        }
        ServerMessage::TableState { table } => render_table(table),
        ServerMessage::GameStart { table } => {
            format!("game started at table {}\n{}", table.id, render_table(table))
        }
        ServerMessage::GameEnd { table } => {
            let result = match table.winner {
                Some(Outcome::Draw) => "draw".to_string(),
                Some(mark) => format!("{mark} wins"),
                None => "no result".to_string(),
            };
            format!("game over at table {}: {result}", table.id)
        }
    }
}

fn render_lobby(tables: &[TableSummary]) -> String {
    if tables.is_empty() {
        return "no open tables".to_string();
    }
    let mut out = String::from("table  players  status   open");
    for t in tables {
        let status = match t.status {
            TableStatus::Waiting => "waiting",
            TableStatus::Playing => "playing",
        };
        let open = if t.available { "yes" } else { "no" };
        let _ = write!(out, "\n{:<5}  {}/2      {:<7}  {open}", t.id.to_string(), t.players, status);
    }
    out
}

/// The board as a 3×3 grid followed by a status line.
fn render_table(table: &TableSnapshot) -> String {
    let rows: Vec<String> = table
        .board
        .chunks(3)
        .map(|row| format!(" {} | {} | {} ", row[0], row[1], row[2]))
        .collect();
    let status = match table.winner {
        Some(Outcome::Draw) => "draw".to_string(),
        Some(mark) => format!("{mark} won"),
        None => format!("{} to move", table.turn),
    };
    format!(
        "{}\ntable {}  players {}/2  {status}",
        rows.join("\n---+---+---\n"),
        table.id,
        table.players
    )
}
