//! Click-to-move selection.
//!
//! Two states: nothing selected, or one piece selected with its targets
//! highlighted. The first click on a piece selects it; the next click
//! anywhere tries the move and always drops the selection, whether the
//! move went through or not.

use std::collections::HashSet;

use gambit_protocol::{Coord, Team};

use crate::{Board, BoardError, MoveRecord, Piece, Presentation};

/// What a call to [`Board::select`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Nothing was selected and the clicked cell had no piece (or didn't
    /// exist). Nothing changed.
    Ignored,

    /// The piece on the clicked cell is now selected; these cells are
    /// highlighted.
    Selected { targets: HashSet<Coord> },

    /// A piece was selected and this click tried to move it. The
    /// selection is cleared either way.
    MoveAttempted(Result<MoveRecord, BoardError>),
}

impl<P: Piece> Board<P> {
    /// The coordinate of the currently selected piece, if any.
    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    /// Feeds one click on `coord` through the selection state machine.
    pub fn select<V: Presentation>(
        &mut self,
        coord: Coord,
        presentation: &mut V,
    ) -> SelectionOutcome {
        match self.selected {
            None => self.select_piece(coord, presentation),
            Some(from) => {
                let result = self.try_move(from, coord);
                if let Err(e) = &result {
                    tracing::debug!(%from, to = %coord, error = %e, "move refused");
                }
                self.clear_selection(presentation);
                SelectionOutcome::MoveAttempted(result)
            }
        }
    }

    /// Like [`select`](Self::select), but only `team`'s own pieces can be
    /// picked up. A click on anything else while nothing is selected is
    /// [`Ignored`](SelectionOutcome::Ignored).
    pub fn select_as<V: Presentation>(
        &mut self,
        team: Team,
        coord: Coord,
        presentation: &mut V,
    ) -> SelectionOutcome {
        if self.selected.is_none() && self.piece_at(coord).is_none_or(|p| p.team() != team) {
            return SelectionOutcome::Ignored;
        }
        self.select(coord, presentation)
    }

    /// Drops the selection and clears every highlight.
    pub fn clear_selection<V: Presentation>(&mut self, presentation: &mut V) {
        self.selected = None;
        for cell in self.cells.iter_mut() {
            cell.highlighted = false;
            presentation.clear_highlight(cell);
        }
    }

    fn select_piece<V: Presentation>(
        &mut self,
        coord: Coord,
        presentation: &mut V,
    ) -> SelectionOutcome {
        let Ok(targets) = self.valid_targets(coord) else {
            return SelectionOutcome::Ignored;
        };

        for target in &targets {
            if let Some(&i) = self.index.get(target) {
                let cell = &mut self.cells[i];
                cell.highlighted = true;
                presentation.highlight_cell(cell);
            }
        }

        self.selected = Some(coord);
        SelectionOutcome::Selected { targets }
    }
}
