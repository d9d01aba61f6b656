//! Two bots play a short skirmish through an in-process Gambit server.
//!
//! ```text
//! cargo run -p skirmish [config.json]
//! ```
//!
//! Each side starts with a row of soldiers on its back rank. A soldier
//! steps one cell in any direction and captures by stepping onto an enemy.
//! Bots pick a random legal move, preferring captures.

use std::collections::HashSet;
use std::time::Duration;

use gambit::prelude::*;
use rand::seq::IndexedRandom;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Moves each bot makes before leaving.
const MAX_MOVES: usize = 20;

/// How long a bot waits on a silent opponent before giving up.
const IDLE_TIMEOUT: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Game types
// ---------------------------------------------------------------------------

struct Soldier(Team);

impl Piece for Soldier {
    fn team(&self) -> Team {
        self.0
    }

    fn valid_target_cells(&self, from: Coord, board: &Board<Self>) -> HashSet<Coord> {
        let mut out = HashSet::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let to = Coord::new(from.x + dx, from.y + dy);
                if (dx, dy) == (0, 0) || board.cell_at(to).is_none() {
                    continue;
                }
                if board.piece_at(to).is_none_or(|p| p.0 != self.0) {
                    out.insert(to);
                }
            }
        }
        out
    }
}

/// White on the first row, Black on the last.
fn setup_board(config: &BoardConfig) -> Result<Board<Soldier>, GambitError> {
    let mut board = Board::new(config.clone());
    let back = config.height as i32 - 1;
    for x in 0..config.width as i32 {
        board.place(Coord::new(x, 0), Soldier(Team::White))?;
        board.place(Coord::new(x, back), Soldier(Team::Black))?;
    }
    Ok(board)
}

// ---------------------------------------------------------------------------
// Bot
// ---------------------------------------------------------------------------

/// A random legal move for `team`, captures first.
fn pick_move(board: &Board<Soldier>, team: Team) -> Option<(Coord, Coord)> {
    let moves: Vec<(Coord, Coord)> = board
        .cells()
        .map(Cell::coord)
        .filter(|&c| board.piece_at(c).is_some_and(|p| p.0 == team))
        .flat_map(|from| {
            board
                .valid_targets(from)
                .unwrap_or_default()
                .into_iter()
                .map(move |to| (from, to))
        })
        .collect();

    let captures: Vec<(Coord, Coord)> = moves
        .iter()
        .copied()
        .filter(|&(_, to)| board.piece_at(to).is_some())
        .collect();

    let mut rng = rand::rng();
    let pool = if captures.is_empty() { &moves } else { &captures };
    pool.choose(&mut rng).copied()
}

async fn bot(name: &'static str, addr: String, board: Board<Soldier>) -> Result<usize, GambitError> {
    let mut client = GameClient::connect(&addr, board, Headless).await?;
    let mut moves = 0;

    while moves < MAX_MOVES {
        if client.is_local_turn() {
            let team = client.current_team();
            let Some((from, to)) = pick_move(client.board(), team) else {
                tracing::info!(bot = name, %team, "no legal moves left");
                break;
            };

            client.select(from).await?;
            if let SelectionOutcome::MoveAttempted(Ok(record)) = client.select(to).await? {
                moves += 1;
                tracing::info!(
                    bot = name,
                    %team,
                    %from,
                    %to,
                    captured = record.capture.is_some(),
                    "moved"
                );
            }
            continue;
        }

        let event = match tokio::time::timeout(IDLE_TIMEOUT, client.recv_event()).await {
            Ok(event) => event?,
            Err(_) => {
                tracing::info!(bot = name, "opponent went quiet");
                break;
            }
        };
        match event {
            Some(ClientEvent::Rejected(reason)) => {
                tracing::warn!(bot = name, %reason, "turned away");
                break;
            }
            Some(ClientEvent::Desync(e)) => {
                tracing::warn!(bot = name, error = %e, "board out of sync");
            }
            Some(event) => tracing::debug!(bot = name, ?event, "event"),
            None => break,
        }
    }

    let left = client
        .board()
        .cells()
        .filter(|c| client.board().piece_at(c.coord()).is_some_and(|p| p.0 == client.current_team()))
        .count();
    tracing::info!(bot = name, moves, pieces_left = left, "leaving");
    client.close().await?;
    Ok(moves)
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GambitConfig::from_json_file(path)?,
        None => GambitConfig::default(),
    };

    let server = GambitServer::builder()
        .config(config.server.clone())
        .build()
        .await?;
    let addr = server.local_addr()?.to_string();
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "server stopped");
        }
    });

    let first = tokio::spawn(bot("first", addr.clone(), setup_board(&config.board)?));
    let second = tokio::spawn(bot("second", addr, setup_board(&config.board)?));
    let (first, second) = tokio::join!(first, second);
    let (first, second) = (first??, second??);

    tracing::info!(first, second, "skirmish over");
    Ok(())
}
