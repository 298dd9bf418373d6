//! A single game table: board, seats, turn, and result.
//!
//! All mutation goes through one async mutex per table, so two moves on
//! the same table are strictly serialized and the loser of a race sees
//! a legality failure. After every mutation the table also publishes
//! its coarse [`TableInfo`] through a `watch` channel; the registry
//! reads that instead of the lock, so lobby listings never wait behind
//! an in-flight move.

use tictac_protocol::{Mark, Outcome, PlayerId, TableId, TableSnapshot, TableStatus, TableSummary};
use tokio::sync::{Mutex, watch};

use crate::board::{Board, CELLS};
use crate::{MoveRejection, TableError};

/// Seats per table.
pub const MAX_PLAYERS: usize = 2;

/// Coarse, lock-free view of a table used by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    pub table_id: TableId,
    pub player_count: usize,
    pub winner: Option<Outcome>,
    pub available: bool,
}

impl TableInfo {
    /// Fewer than two players seated.
    pub fn is_waiting(&self) -> bool {
        self.player_count < MAX_PLAYERS
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// The lobby row for this table.
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.table_id,
            available: self.available,
            players: self.player_count,
            status: TableStatus::from_player_count(self.player_count),
        }
    }
}

/// A snapshot plus the seated players, taken under one lock.
///
/// The player list is what notifications get routed by; it never goes
/// on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub snapshot: TableSnapshot,
    pub players: Vec<PlayerId>,
}

#[derive(Debug)]
struct TableState {
    board: Board,
    /// Seat order fixes the symbol: index 0 plays X, index 1 plays O.
    players: Vec<PlayerId>,
    turn: Mark,
    winner: Option<Outcome>,
    available: bool,
}

impl TableState {
    fn seat_of(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| *p == player_id)
    }
}

/// One game instance with at most two players.
#[derive(Debug)]
pub struct Table {
    id: TableId,
    state: Mutex<TableState>,
    info: watch::Sender<TableInfo>,
}

impl Table {
    /// Creates an empty table: blank board, X to move, no winner.
    pub fn new(id: TableId) -> Self {
        let (info, _) = watch::channel(TableInfo {
            table_id: id,
            player_count: 0,
            winner: None,
            available: true,
        });
        Self {
            id,
            state: Mutex::new(TableState {
                board: Board::new(),
                players: Vec::with_capacity(MAX_PLAYERS),
                turn: Mark::X,
                winner: None,
                available: true,
            }),
            info,
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    /// Latest published coarse state. Never waits on the table lock.
    pub fn info(&self) -> TableInfo {
        *self.info.borrow()
    }

    /// Seats a player. The first player plays X, the second O.
    ///
    /// # Errors
    /// [`TableError::AlreadySeated`] if the player already sits here,
    /// [`TableError::Full`] if both seats are taken.
    pub async fn add_player(&self, player_id: PlayerId) -> Result<(), TableError> {
        let mut state = self.state.lock().await;
        if state.seat_of(player_id).is_some() {
            return Err(TableError::AlreadySeated(player_id, self.id));
        }
        if state.players.len() >= MAX_PLAYERS {
            return Err(TableError::Full(self.id));
        }

        state.players.push(player_id);
        if state.players.len() == MAX_PLAYERS {
            state.available = false;
        }
        tracing::info!(
            table_id = %self.id,
            %player_id,
            players = state.players.len(),
            "player seated"
        );
        self.publish(&state);
        Ok(())
    }

    /// Vacates a player's seat.
    ///
    /// The table reopens even mid-game, so a newcomer can take the empty
    /// seat. A remaining O player slides into seat 0 and plays X from
    /// then on. A finished table stays unavailable.
    ///
    /// # Errors
    /// [`TableError::NotAPlayer`] if the player is not seated here.
    pub async fn remove_player(&self, player_id: PlayerId) -> Result<(), TableError> {
        let mut state = self.state.lock().await;
        let seat = state
            .seat_of(player_id)
            .ok_or(TableError::NotAPlayer(player_id, self.id))?;

        state.players.remove(seat);
        state.available = state.winner.is_none();
        tracing::info!(
            table_id = %self.id,
            %player_id,
            players = state.players.len(),
            "player left table"
        );
        self.publish(&state);
        Ok(())
    }

    /// Places the mover's symbol at `position`.
    ///
    /// The mover must be seated; then the position must be a board index,
    /// the cell empty, the game unfinished, and the mover's seat symbol
    /// must be the one whose turn it is. A lone player therefore only
    /// ever plays X, and after that move must wait for an opponent.
    ///
    /// On success the result is evaluated: a win or draw is recorded and
    /// closes the table, otherwise the turn passes.
    pub async fn make_move(&self, position: i64, player_id: PlayerId) -> Result<(), TableError> {
        let mut state = self.state.lock().await;
        let seat = state
            .seat_of(player_id)
            .ok_or(TableError::NotAPlayer(player_id, self.id))?;

        let index = usize::try_from(position)
            .ok()
            .filter(|i| *i < CELLS)
            .ok_or(MoveRejection::OutOfRange(position))?;
        if state.board.get(index).is_some_and(|c| !c.is_empty()) {
            return Err(MoveRejection::Occupied(index).into());
        }
        if state.winner.is_some() {
            return Err(MoveRejection::GameOver.into());
        }
        let mark = state.turn;
        if Mark::for_seat(seat) != Some(mark) {
            return Err(MoveRejection::NotYourTurn.into());
        }

        state.board.place(index, mark);
        match state.board.check_winner() {
            Some(outcome) => {
                state.winner = Some(outcome);
                state.available = false;
                tracing::info!(table_id = %self.id, %outcome, "game finished");
            }
            None => state.turn = mark.other(),
        }
        tracing::debug!(table_id = %self.id, %player_id, index, %mark, "move applied");
        self.publish(&state);
        Ok(())
    }

    /// Evaluates the current board. See [`Board::check_winner`].
    pub async fn check_winner(&self) -> Option<Outcome> {
        self.state.lock().await.board.check_winner()
    }

    /// An owned copy of the full state, safe to serialize after the lock
    /// is released.
    pub async fn snapshot(&self) -> TableSnapshot {
        let state = self.state.lock().await;
        self.snapshot_of(&state)
    }

    /// Snapshot and seated players, read atomically.
    pub async fn view(&self) -> TableView {
        let state = self.state.lock().await;
        TableView {
            snapshot: self.snapshot_of(&state),
            players: state.players.clone(),
        }
    }

    pub async fn players(&self) -> Vec<PlayerId> {
        self.state.lock().await.players.clone()
    }

    fn snapshot_of(&self, state: &TableState) -> TableSnapshot {
        TableSnapshot {
            id: self.id,
            board: state.board.cells(),
            turn: state.turn,
            winner: state.winner,
            players: state.players.len(),
            available: state.available,
        }
    }

    /// Pushes the coarse state out. Called with the lock held so the
    /// published value always matches a real state.
    fn publish(&self, state: &TableState) {
        self.info.send_replace(TableInfo {
            table_id: self.id,
            player_count: state.players.len(),
            winner: state.winner,
            available: state.available,
        });
    }
}

#[cfg(test)]
mod tests {
    use tictac_protocol::Cell;

    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const C: PlayerId = PlayerId(3);

    async fn seated(players: &[PlayerId]) -> Table {
        let table = Table::new(TableId(1));
        for p in players {
            table.add_player(*p).await.unwrap();
        }
        table
    }

    #[tokio::test]
    async fn test_new_table_is_blank() {
        let snap = Table::new(TableId(7)).snapshot().await;
        assert_eq!(snap.id, TableId(7));
        assert_eq!(snap.board, [Cell::Empty; 9]);
        assert_eq!(snap.turn, Mark::X);
        assert_eq!(snap.winner, None);
        assert_eq!(snap.players, 0);
        assert!(snap.available);
    }

    #[tokio::test]
    async fn test_third_player_is_rejected() {
        let table = seated(&[A, B]).await;
        assert_eq!(table.add_player(C).await, Err(TableError::Full(TableId(1))));
        assert_eq!(table.players().await, vec![A, B]);
        assert!(!table.snapshot().await.available);
    }

    #[tokio::test]
    async fn test_same_player_cannot_take_both_seats() {
        let table = seated(&[A]).await;
        assert_eq!(
            table.add_player(A).await,
            Err(TableError::AlreadySeated(A, TableId(1)))
        );
        assert_eq!(table.players().await, vec![A]);
    }

    #[tokio::test]
    async fn test_turn_alternates_from_x() {
        let table = seated(&[A, B]).await;
        table.make_move(0, A).await.unwrap();
        assert_eq!(table.snapshot().await.turn, Mark::O);
        table.make_move(4, B).await.unwrap();
        assert_eq!(table.snapshot().await.turn, Mark::X);

        let snap = table.snapshot().await;
        assert_eq!(snap.board[0], Cell::X);
        assert_eq!(snap.board[4], Cell::O);
    }

    #[tokio::test]
    async fn test_wrong_player_is_not_your_turn() {
        let table = seated(&[A, B]).await;
        assert_eq!(
            table.make_move(0, B).await,
            Err(TableError::IllegalMove(MoveRejection::NotYourTurn))
        );
        table.make_move(0, A).await.unwrap();
        assert_eq!(
            table.make_move(1, A).await,
            Err(TableError::IllegalMove(MoveRejection::NotYourTurn))
        );
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_and_occupied() {
        let table = seated(&[A, B]).await;
        for position in [-1, 9, 100] {
            assert_eq!(
                table.make_move(position, A).await,
                Err(TableError::IllegalMove(MoveRejection::OutOfRange(position)))
            );
        }
        table.make_move(4, A).await.unwrap();
        assert_eq!(
            table.make_move(4, B).await,
            Err(TableError::IllegalMove(MoveRejection::Occupied(4)))
        );
    }

    #[tokio::test]
    async fn test_outsider_is_not_a_player() {
        let table = seated(&[A, B]).await;
        assert_eq!(
            table.make_move(0, C).await,
            Err(TableError::NotAPlayer(C, TableId(1)))
        );
    }

    #[tokio::test]
    async fn test_lone_player_plays_x_once_then_waits() {
        let table = seated(&[A]).await;
        table.make_move(0, A).await.unwrap();
        assert_eq!(table.snapshot().await.turn, Mark::O);
        assert_eq!(
            table.make_move(1, A).await,
            Err(TableError::IllegalMove(MoveRejection::NotYourTurn))
        );

        // The opponent arrives and takes O.
        table.add_player(B).await.unwrap();
        table.make_move(1, B).await.unwrap();
        assert_eq!(table.snapshot().await.turn, Mark::X);
    }

    #[tokio::test]
    async fn test_win_closes_table_and_freezes_board() {
        let table = seated(&[A, B]).await;
        // X: 0, 3, 6 (left column). O: 1, 4.
        for (pos, who) in [(0, A), (1, B), (3, A), (4, B), (6, A)] {
            table.make_move(pos, who).await.unwrap();
        }
        let done = table.snapshot().await;
        assert_eq!(done.winner, Some(Outcome::X));
        assert!(!done.available);
        // Winner recorded; turn stays with the winning mark.
        assert_eq!(done.turn, Mark::X);

        for (pos, who) in [(8, B), (8, A), (2, A)] {
            assert_eq!(
                table.make_move(pos, who).await,
                Err(TableError::IllegalMove(MoveRejection::GameOver))
            );
        }
        assert_eq!(table.snapshot().await.board, done.board);
    }

    #[tokio::test]
    async fn test_draw_is_recorded() {
        let table = seated(&[A, B]).await;
        //  X | O | X
        //  X | O | O
        //  O | X | X
        for (pos, who) in [(0, A), (1, B), (2, A), (4, B), (3, A), (5, B), (7, A), (6, B), (8, A)] {
            table.make_move(pos, who).await.unwrap();
        }
        assert_eq!(table.snapshot().await.winner, Some(Outcome::Draw));
        assert_eq!(table.check_winner().await, Some(Outcome::Draw));
    }

    #[tokio::test]
    async fn test_remove_player_reopens_table_mid_game() {
        let table = seated(&[A, B]).await;
        table.make_move(0, A).await.unwrap();
        table.remove_player(A).await.unwrap();

        let snap = table.snapshot().await;
        assert_eq!(snap.players, 1);
        assert!(snap.available);
        // B now holds seat 0 and plays X; it is O's turn, so B must wait.
        assert_eq!(
            table.make_move(1, B).await,
            Err(TableError::IllegalMove(MoveRejection::NotYourTurn))
        );
        table.add_player(C).await.unwrap();
        table.make_move(1, C).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_unknown_player_fails() {
        let table = seated(&[A]).await;
        assert_eq!(
            table.remove_player(B).await,
            Err(TableError::NotAPlayer(B, TableId(1)))
        );
    }

    #[tokio::test]
    async fn test_finished_table_stays_unavailable_after_leave() {
        let table = seated(&[A, B]).await;
        for (pos, who) in [(0, A), (3, B), (1, A), (4, B), (2, A)] {
            table.make_move(pos, who).await.unwrap();
        }
        table.remove_player(B).await.unwrap();
        assert!(!table.snapshot().await.available);
    }

    #[tokio::test]
    async fn test_info_tracks_every_mutation() {
        let table = Table::new(TableId(2));
        assert!(table.info().is_waiting());

        table.add_player(A).await.unwrap();
        table.add_player(B).await.unwrap();
        let info = table.info();
        assert_eq!(info.player_count, 2);
        assert!(!info.available);
        assert!(!info.is_waiting());

        for (pos, who) in [(0, A), (3, B), (1, A), (4, B), (2, A)] {
            table.make_move(pos, who).await.unwrap();
        }
        assert!(table.info().is_finished());
        assert_eq!(table.info().winner, Some(Outcome::X));
    }

    #[tokio::test]
    async fn test_view_pairs_snapshot_with_seats() {
        let table = seated(&[B, A]).await;
        let view = table.view().await;
        assert_eq!(view.players, vec![B, A]);
        assert_eq!(view.snapshot.players, 2);
    }

    #[tokio::test]
    async fn test_marks_stay_balanced() {
        let table = seated(&[A, B]).await;
        for (pos, who) in [(4, A), (0, B), (8, A), (2, B)] {
            table.make_move(pos, who).await.unwrap();
            let board = crate::Board::from_cells(table.snapshot().await.board);
            let diff = board.count(Mark::X) - board.count(Mark::O);
            assert!(diff <= 1);
        }
    }
}
