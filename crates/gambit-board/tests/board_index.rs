//! Integration tests for board lookup and click-to-move selection.

use std::cell::Cell as Counter;
use std::collections::HashSet;

use gambit_board::{
    Board, BoardConfig, BoardError, Cell, Piece, Point3, Presentation, SelectionOutcome,
};
use gambit_protocol::{Coord, Team};

// =========================================================================
// Mock piece: a rook-like slider limited to one row, counting rule calls.
// =========================================================================

#[derive(Debug)]
struct Slider {
    team: Team,
    rule_calls: Counter<u32>,
}

impl Slider {
    fn new(team: Team) -> Self {
        Self {
            team,
            rule_calls: Counter::new(0),
        }
    }
}

impl Piece for Slider {
    fn team(&self) -> Team {
        self.team
    }

    fn valid_target_cells(&self, from: Coord, board: &Board<Self>) -> HashSet<Coord> {
        self.rule_calls.set(self.rule_calls.get() + 1);
        board
            .cells()
            .map(Cell::coord)
            .filter(|c| c.y == from.y && c.x != from.x)
            .collect()
    }
}

// =========================================================================
// Mock presentation: records every call.
// =========================================================================

#[derive(Debug, Default)]
struct Recorder {
    camera: Option<Team>,
    lit: Vec<Coord>,
    cleared: usize,
}

impl Presentation for Recorder {
    fn set_camera_for(&mut self, team: Team) {
        self.camera = Some(team);
    }

    fn highlight_cell(&mut self, cell: &Cell) {
        self.lit.push(cell.coord());
    }

    fn clear_highlight(&mut self, _cell: &Cell) {
        self.cleared += 1;
    }
}

fn ten_by_ten() -> Board<Slider> {
    Board::new(BoardConfig::default())
}

// =========================================================================
// Lookup
// =========================================================================

#[test]
fn test_cell_at_finds_every_coordinate() {
    let board = ten_by_ten();
    assert_eq!(board.len(), 100);
    for x in 0..10 {
        for y in 0..10 {
            let c = Coord::new(x, y);
            assert_eq!(board.cell_at(c).map(Cell::coord), Some(c));
        }
    }
}

#[test]
fn test_cell_at_off_board_is_none() {
    let board = ten_by_ten();
    assert!(board.cell_at(Coord::new(10, 0)).is_none());
    assert!(board.cell_at(Coord::new(0, -1)).is_none());
}

#[test]
fn test_oversized_config_is_clamped() {
    let board: Board<Slider> = Board::new(BoardConfig {
        width: 3_000_000_000,
        height: 1,
        ..BoardConfig::default()
    });
    let max = BoardConfig::MAX_SIDE as i32;
    assert_eq!(board.len(), BoardConfig::MAX_SIDE as usize);
    assert!(board.cell_at(Coord::new(max - 1, 0)).is_some());
    assert!(board.cell_at(Coord::new(max, 0)).is_none());
}

#[test]
fn test_closest_cell_to_world_point() {
    let board: Board<Slider> = Board::new(BoardConfig {
        cell_spacing: 2.0,
        ..BoardConfig::default()
    });
    let cell = board.closest_cell_to(Point3::new(6.3, 0.5, 3.9)).unwrap();
    assert_eq!(cell.coord(), Coord::new(3, 2));
}

#[test]
fn test_closest_cell_clamps_far_points_to_the_edge() {
    let board = ten_by_ten();
    let cell = board.closest_cell_to(Point3::new(100.0, 0.0, -50.0)).unwrap();
    assert_eq!(cell.coord(), Coord::new(9, 0));
}

// =========================================================================
// Selection
// =========================================================================

#[test]
fn test_click_on_empty_cell_is_ignored() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();

    let outcome = board.select(Coord::new(4, 4), &mut view);

    assert_eq!(outcome, SelectionOutcome::Ignored);
    assert_eq!(board.selected(), None);
    assert!(view.lit.is_empty());
}

#[test]
fn test_click_off_board_is_ignored() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();

    assert_eq!(
        board.select(Coord::new(-3, 20), &mut view),
        SelectionOutcome::Ignored
    );
}

#[test]
fn test_select_highlights_targets_and_asks_rules_once() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();
    let from = Coord::new(2, 5);
    board.place(from, Slider::new(Team::White)).unwrap();

    let outcome = board.select(from, &mut view);

    let SelectionOutcome::Selected { targets } = outcome else {
        panic!("expected Selected, got {outcome:?}");
    };
    assert_eq!(targets.len(), 9);
    assert_eq!(board.selected(), Some(from));
    assert_eq!(view.lit.len(), 9);
    assert_eq!(board.highlighted().len(), 9);
    assert_eq!(board.piece_at(from).unwrap().rule_calls.get(), 1);
}

#[test]
fn test_second_click_moves_and_clears_everything() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();
    let from = Coord::new(0, 0);
    let to = Coord::new(7, 0);
    board.place(from, Slider::new(Team::White)).unwrap();

    board.select(from, &mut view);
    let outcome = board.select(to, &mut view);

    let SelectionOutcome::MoveAttempted(Ok(record)) = outcome else {
        panic!("expected a successful move, got {outcome:?}");
    };
    assert_eq!(record.mv.original_coord, from);
    assert_eq!(record.mv.target_coord, to);
    assert_eq!(board.selected(), None);
    assert!(board.highlighted().is_empty());
    assert_eq!(view.cleared, 100);
    assert!(board.piece_at(to).is_some());
}

#[test]
fn test_failed_move_still_clears_selection() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();
    let from = Coord::new(3, 3);
    board.place(from, Slider::new(Team::Black)).unwrap();

    board.select(from, &mut view);
    let outcome = board.select(Coord::new(4, 4), &mut view);

    assert_eq!(
        outcome,
        SelectionOutcome::MoveAttempted(Err(BoardError::IllegalTarget {
            from,
            to: Coord::new(4, 4),
        }))
    );
    assert_eq!(board.selected(), None);
    assert!(board.highlighted().is_empty());
    assert!(board.piece_at(from).is_some());
}

#[test]
fn test_capture_through_selection() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();
    board.place(Coord::new(0, 9), Slider::new(Team::White)).unwrap();
    board.place(Coord::new(6, 9), Slider::new(Team::Black)).unwrap();

    board.select(Coord::new(0, 9), &mut view);
    let SelectionOutcome::MoveAttempted(Ok(record)) = board.select(Coord::new(6, 9), &mut view)
    else {
        panic!("capture should succeed");
    };

    let capture = record.capture.expect("opponent piece should be captured");
    assert_eq!(capture.team, Team::White);
    assert_eq!(capture.captured_cell_coordinates, Coord::new(6, 9));
    assert_eq!(board.piece_count(), 1);
}

#[test]
fn test_select_as_ignores_opponent_pieces() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();
    let black = Coord::new(2, 7);
    board.place(black, Slider::new(Team::Black)).unwrap();

    let outcome = board.select_as(Team::White, black, &mut view);

    assert_eq!(outcome, SelectionOutcome::Ignored);
    assert_eq!(board.selected(), None);
    assert!(view.lit.is_empty());
    assert_eq!(board.piece_at(black).unwrap().rule_calls.get(), 0);
}

#[test]
fn test_select_as_moves_own_piece_stamped_with_own_team() {
    let mut board = ten_by_ten();
    let mut view = Recorder::default();
    board.place(Coord::new(1, 3), Slider::new(Team::White)).unwrap();
    board.place(Coord::new(5, 3), Slider::new(Team::Black)).unwrap();

    assert!(matches!(
        board.select_as(Team::White, Coord::new(1, 3), &mut view),
        SelectionOutcome::Selected { .. }
    ));
    // Second click lands on an opponent: that's a capture, not a pick-up.
    let SelectionOutcome::MoveAttempted(Ok(record)) =
        board.select_as(Team::White, Coord::new(5, 3), &mut view)
    else {
        panic!("capture should succeed");
    };
    assert_eq!(record.mv.team, Team::White);
    assert_eq!(record.capture.map(|c| c.team), Some(Team::White));
}

// =========================================================================
// Replaying the other player's moves
// =========================================================================

#[test]
fn test_replay_capture_then_move() {
    let mut board = ten_by_ten();
    board.place(Coord::new(1, 1), Slider::new(Team::White)).unwrap();
    board.place(Coord::new(1, 8), Slider::new(Team::Black)).unwrap();

    // The sender's capture is replayed before its move.
    let lost = board.ordered_get_captured(Coord::new(1, 8)).unwrap();
    assert_eq!(lost.team, Team::Black);
    board
        .ordered_make_move(Coord::new(1, 1), Coord::new(1, 8))
        .unwrap();

    assert_eq!(board.piece_at(Coord::new(1, 8)).unwrap().team, Team::White);
    assert_eq!(board.piece_count(), 1);
}
