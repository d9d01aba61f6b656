//! The client's view of the match: which team we are, whose turn it is,
//! and whether a relayed message is ours or the opponent's.

use std::fmt;

use gambit_board::{Board, MoveRecord, Piece, Presentation};
use gambit_protocol::{CaptureData, MoveData, RejectReason, Team, Welcome};

use crate::SessionError;

// ---------------------------------------------------------------------------
// MatchPhase
// ---------------------------------------------------------------------------

/// Where the client is in the match lifecycle.
///
/// ```text
/// AwaitingWelcome → AwaitingOpponent → InProgress
///        └──────────────┴──────────→ Rejected
/// ```
///
/// `Rejected` can be entered from any other phase and is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPhase {
    /// Connected, no team yet.
    #[default]
    AwaitingWelcome,
    /// Team assigned, waiting for the second player.
    AwaitingOpponent,
    /// Both players seated.
    InProgress,
    /// The server turned us away.
    Rejected,
}

impl MatchPhase {
    /// The phase that normally follows this one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AwaitingWelcome => Some(Self::AwaitingOpponent),
            Self::AwaitingOpponent => Some(Self::InProgress),
            Self::InProgress | Self::Rejected => None,
        }
    }

    /// Returns `true` if moving to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        match target {
            Self::Rejected => self != Self::Rejected,
            _ => self.next() == Some(target),
        }
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingWelcome => write!(f, "AwaitingWelcome"),
            Self::AwaitingOpponent => write!(f, "AwaitingOpponent"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMatchState
// ---------------------------------------------------------------------------

/// What happened to a relayed move or capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// It came from the opponent and is now on the local board.
    Applied,
    /// It was our own action coming back from the server. The local board
    /// already has it.
    EchoIgnored,
}

/// Match state held by one client.
#[derive(Debug, Default)]
pub struct ClientMatchState {
    ordinal: i32,
    team: Team,
    phase: MatchPhase,
    turn: Team,
}

impl ClientMatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The team the server assigned us, or `Team::None` before the Welcome.
    pub fn current_team(&self) -> Team {
        self.team
    }

    pub fn ordinal(&self) -> i32 {
        self.ordinal
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// The team to move. `Team::None` until the game starts.
    pub fn turn(&self) -> Team {
        self.turn
    }

    /// Returns `true` when the game is running and it's our move.
    pub fn is_local_turn(&self) -> bool {
        self.phase == MatchPhase::InProgress && self.team.is_playable() && self.turn == self.team
    }

    /// Stores the seat the server handed us.
    ///
    /// # Errors
    /// [`SessionError::InvalidWelcome`] if the payload is missing, names no
    /// team, disagrees with its own ordinal, or tries to change a team we
    /// already hold. State is unchanged in every error case.
    pub fn on_welcome(&mut self, welcome: Option<&Welcome>) -> Result<Team, SessionError> {
        let welcome =
            welcome.ok_or_else(|| SessionError::InvalidWelcome("missing payload".into()))?;

        if !welcome.team.is_playable() {
            return Err(SessionError::InvalidWelcome("no team assigned".into()));
        }
        if welcome.assigned_int_team != welcome.team.ordinal() {
            return Err(SessionError::InvalidWelcome(format!(
                "ordinal {} doesn't match team {}",
                welcome.assigned_int_team, welcome.team
            )));
        }
        if self.team.is_playable() && self.team != welcome.team {
            return Err(SessionError::InvalidWelcome(format!(
                "already playing {}, got {}",
                self.team, welcome.team
            )));
        }

        self.ordinal = welcome.assigned_int_team;
        self.team = welcome.team;
        if self.phase.can_transition_to(MatchPhase::AwaitingOpponent) {
            self.phase = MatchPhase::AwaitingOpponent;
        }
        tracing::info!(team = %self.team, ordinal = self.ordinal, "welcomed");
        Ok(self.team)
    }

    /// Both seats are filled: White moves first, and the camera turns to
    /// our side of the board.
    pub fn on_start_game<V: Presentation>(&mut self, presentation: &mut V) {
        if self.phase == MatchPhase::Rejected {
            tracing::debug!("start ignored after rejection");
            return;
        }
        if self.phase == MatchPhase::AwaitingWelcome {
            tracing::warn!("game started before we were welcomed");
        }

        self.phase = MatchPhase::InProgress;
        self.turn = Team::White;
        presentation.set_camera_for(self.team);
        tracing::info!(team = %self.team, "game started");
    }

    /// Applies a relayed move unless it's our own coming back.
    ///
    /// # Errors
    /// [`SessionError::Desync`] if the origin cell or piece is missing or
    /// the target is taken. The board is left untouched.
    pub fn on_make_move<P: Piece>(
        &mut self,
        mv: &MoveData,
        board: &mut Board<P>,
    ) -> Result<RemoteOutcome, SessionError> {
        if mv.team == self.team {
            tracing::debug!(from = %mv.original_coord, to = %mv.target_coord, "own move echoed");
            return Ok(RemoteOutcome::EchoIgnored);
        }

        board.ordered_make_move(mv.original_coord, mv.target_coord)?;
        self.turn = mv.team.opponent();
        tracing::debug!(
            team = %mv.team,
            from = %mv.original_coord,
            to = %mv.target_coord,
            "remote move applied"
        );
        Ok(RemoteOutcome::Applied)
    }

    /// Applies a relayed capture unless it's our own coming back.
    ///
    /// # Errors
    /// [`SessionError::Desync`] if there's no piece at the captured cell.
    pub fn on_get_captured<P: Piece>(
        &mut self,
        capture: &CaptureData,
        board: &mut Board<P>,
    ) -> Result<RemoteOutcome, SessionError> {
        if capture.team == self.team {
            tracing::debug!(at = %capture.captured_cell_coordinates, "own capture echoed");
            return Ok(RemoteOutcome::EchoIgnored);
        }

        board.ordered_get_captured(capture.captured_cell_coordinates)?;
        tracing::debug!(
            team = %capture.team,
            at = %capture.captured_cell_coordinates,
            "remote capture applied"
        );
        Ok(RemoteOutcome::Applied)
    }

    /// Hands the turn over after we applied our own move locally.
    pub fn record_local_move(&mut self, record: &MoveRecord) {
        self.turn = record.mv.team.opponent();
    }

    pub fn on_rejected(&mut self, reason: RejectReason) {
        tracing::warn!(%reason, "rejected by server");
        self.phase = MatchPhase::Rejected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use gambit_board::{BoardConfig, BoardError, Headless};
    use gambit_protocol::Coord;

    struct Pawn(Team);

    impl Piece for Pawn {
        fn team(&self) -> Team {
            self.0
        }

        fn valid_target_cells(&self, from: Coord, _board: &Board<Self>) -> HashSet<Coord> {
            HashSet::from([Coord::new(from.x, from.y + 1)])
        }
    }

    fn welcomed(team: Team) -> ClientMatchState {
        let mut state = ClientMatchState::new();
        state
            .on_welcome(Some(&Welcome {
                assigned_int_team: team.ordinal(),
                team,
            }))
            .unwrap();
        state
    }

    // =====================================================================
    // MatchPhase
    // =====================================================================

    #[test]
    fn test_phase_next_follows_order() {
        assert_eq!(
            MatchPhase::AwaitingWelcome.next(),
            Some(MatchPhase::AwaitingOpponent)
        );
        assert_eq!(
            MatchPhase::AwaitingOpponent.next(),
            Some(MatchPhase::InProgress)
        );
        assert_eq!(MatchPhase::InProgress.next(), None);
    }

    #[test]
    fn test_rejected_reachable_from_anywhere_but_itself() {
        assert!(MatchPhase::AwaitingWelcome.can_transition_to(MatchPhase::Rejected));
        assert!(MatchPhase::InProgress.can_transition_to(MatchPhase::Rejected));
        assert!(!MatchPhase::Rejected.can_transition_to(MatchPhase::Rejected));
        assert!(!MatchPhase::Rejected.can_transition_to(MatchPhase::InProgress));
    }

    // =====================================================================
    // Welcome
    // =====================================================================

    #[test]
    fn test_welcome_stores_team_and_waits_for_opponent() {
        let state = welcomed(Team::Black);
        assert_eq!(state.current_team(), Team::Black);
        assert_eq!(state.ordinal(), 2);
        assert_eq!(state.phase(), MatchPhase::AwaitingOpponent);
    }

    #[test]
    fn test_missing_welcome_is_rejected() {
        let mut state = ClientMatchState::new();
        assert!(matches!(
            state.on_welcome(None),
            Err(SessionError::InvalidWelcome(_))
        ));
        assert_eq!(state.phase(), MatchPhase::AwaitingWelcome);
    }

    #[test]
    fn test_welcome_without_team_is_rejected() {
        let mut state = ClientMatchState::new();
        let result = state.on_welcome(Some(&Welcome::default()));
        assert!(matches!(result, Err(SessionError::InvalidWelcome(_))));
        assert_eq!(state.current_team(), Team::None);
    }

    #[test]
    fn test_welcome_with_mismatched_ordinal_is_rejected() {
        let mut state = ClientMatchState::new();
        let result = state.on_welcome(Some(&Welcome {
            assigned_int_team: 2,
            team: Team::White,
        }));
        assert!(matches!(result, Err(SessionError::InvalidWelcome(_))));
    }

    #[test]
    fn test_welcome_cannot_change_team() {
        let mut state = welcomed(Team::White);
        let result = state.on_welcome(Some(&Welcome {
            assigned_int_team: 2,
            team: Team::Black,
        }));
        assert!(result.is_err());
        assert_eq!(state.current_team(), Team::White);
    }

    // =====================================================================
    // Start and turns
    // =====================================================================

    #[test]
    fn test_start_game_gives_white_the_first_move() {
        let mut white = welcomed(Team::White);
        let mut black = welcomed(Team::Black);
        white.on_start_game(&mut Headless);
        black.on_start_game(&mut Headless);

        assert_eq!(white.phase(), MatchPhase::InProgress);
        assert!(white.is_local_turn());
        assert!(!black.is_local_turn());
    }

    #[test]
    fn test_start_after_rejection_is_ignored() {
        let mut state = ClientMatchState::new();
        state.on_rejected(RejectReason::MatchFull);
        state.on_start_game(&mut Headless);
        assert_eq!(state.phase(), MatchPhase::Rejected);
        assert!(!state.is_local_turn());
    }

    // =====================================================================
    // Relayed moves and captures
    // =====================================================================

    #[test]
    fn test_own_move_echo_is_ignored() {
        let mut state = welcomed(Team::White);
        let mut board: Board<Pawn> = Board::new(BoardConfig::default());
        board.place(Coord::new(2, 3), Pawn(Team::White)).unwrap();

        let outcome = state
            .on_make_move(
                &MoveData {
                    team: Team::White,
                    original_coord: Coord::new(2, 2),
                    target_coord: Coord::new(2, 3),
                },
                &mut board,
            )
            .unwrap();

        assert_eq!(outcome, RemoteOutcome::EchoIgnored);
        assert!(board.piece_at(Coord::new(2, 3)).is_some());
    }

    #[test]
    fn test_opponent_move_is_applied_and_flips_turn() {
        let mut state = welcomed(Team::Black);
        state.on_start_game(&mut Headless);
        let mut board: Board<Pawn> = Board::new(BoardConfig::default());
        board.place(Coord::new(2, 2), Pawn(Team::White)).unwrap();

        let outcome = state
            .on_make_move(
                &MoveData {
                    team: Team::White,
                    original_coord: Coord::new(2, 2),
                    target_coord: Coord::new(2, 3),
                },
                &mut board,
            )
            .unwrap();

        assert_eq!(outcome, RemoteOutcome::Applied);
        assert!(board.piece_at(Coord::new(2, 3)).is_some());
        assert!(state.is_local_turn());
    }

    #[test]
    fn test_move_from_empty_cell_is_a_desync() {
        let mut state = welcomed(Team::Black);
        let mut board: Board<Pawn> = Board::new(BoardConfig::default());

        let err = state
            .on_make_move(
                &MoveData {
                    team: Team::White,
                    original_coord: Coord::new(4, 4),
                    target_coord: Coord::new(4, 5),
                },
                &mut board,
            )
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::Desync(BoardError::NoPiece(Coord::new(4, 4)))
        );
        assert_eq!(state.turn(), Team::None);
    }

    #[test]
    fn test_opponent_capture_removes_our_piece() {
        let mut state = welcomed(Team::White);
        let mut board: Board<Pawn> = Board::new(BoardConfig::default());
        board.place(Coord::new(5, 5), Pawn(Team::White)).unwrap();

        let outcome = state
            .on_get_captured(
                &CaptureData {
                    team: Team::Black,
                    captured_cell_coordinates: Coord::new(5, 5),
                },
                &mut board,
            )
            .unwrap();

        assert_eq!(outcome, RemoteOutcome::Applied);
        assert_eq!(board.piece_count(), 0);
    }

    #[test]
    fn test_own_capture_echo_is_ignored() {
        let mut state = welcomed(Team::Black);
        let mut board: Board<Pawn> = Board::new(BoardConfig::default());
        board.place(Coord::new(5, 5), Pawn(Team::Black)).unwrap();

        let outcome = state
            .on_get_captured(
                &CaptureData {
                    team: Team::Black,
                    captured_cell_coordinates: Coord::new(5, 5),
                },
                &mut board,
            )
            .unwrap();

        assert_eq!(outcome, RemoteOutcome::EchoIgnored);
        assert_eq!(board.piece_count(), 1);
    }

    #[test]
    fn test_record_local_move_passes_the_turn() {
        let mut state = welcomed(Team::White);
        state.on_start_game(&mut Headless);
        let mut board: Board<Pawn> = Board::new(BoardConfig::default());
        board.place(Coord::new(0, 0), Pawn(Team::White)).unwrap();

        let record = board.try_move(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        state.record_local_move(&record);

        assert_eq!(state.turn(), Team::Black);
        assert!(!state.is_local_turn());
    }
}
