//! The board index: every cell of the match, addressable by coordinate.

use std::collections::{HashMap, HashSet};

use gambit_protocol::{CaptureData, Coord, MoveData, NetMessage};

use crate::{BoardConfig, BoardError, Cell, Piece, PieceId, Point3};

/// What a successful local move changed, in the shape the other player
/// needs to replay it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: MoveData,
    /// Set when the move removed an opposing piece from the target cell.
    pub capture: Option<CaptureData>,
}

impl MoveRecord {
    /// The frames to report this move with: the capture first (if any),
    /// then the move, so a peer replaying them never finds the target
    /// still occupied.
    pub fn messages(&self) -> Vec<NetMessage> {
        let mut out = Vec::with_capacity(2);
        if let Some(capture) = self.capture {
            out.push(NetMessage::GetCaptured(capture));
        }
        out.push(NetMessage::MakeMove(self.mv));
        out
    }
}

/// A fixed grid of cells plus the pieces standing on them.
///
/// Built once from a [`BoardConfig`] and never resized. The board owns
/// both the cells and the pieces; cells only hold a [`PieceId`].
///
/// Cells are stored column by column (x outer, y inner). That order is
/// what [`cells`](Self::cells) yields and what breaks distance ties in
/// [`closest_cell_to`](Self::closest_cell_to).
#[derive(Debug)]
pub struct Board<P> {
    config: BoardConfig,
    pub(crate) cells: Vec<Cell>,
    pub(crate) index: HashMap<Coord, usize>,
    pieces: HashMap<PieceId, P>,
    next_piece: u32,
    pub(crate) selected: Option<Coord>,
}

impl<P> Board<P> {
    /// Builds every cell in `[0, width) × [0, height)`.
    ///
    /// The config goes through [`BoardConfig::validated`] first, so sides
    /// above [`BoardConfig::MAX_SIDE`] are clamped.
    pub fn new(config: BoardConfig) -> Self {
        let config = config.validated();
        let mut cells = Vec::with_capacity(config.cell_count());
        let mut index = HashMap::with_capacity(config.cell_count());

        for x in 0..config.width as i32 {
            for y in 0..config.height as i32 {
                let coord = Coord::new(x, y);
                index.insert(coord, cells.len());
                cells.push(Cell::new(coord, config.cell_spacing));
            }
        }

        tracing::debug!(
            width = config.width,
            height = config.height,
            "board created"
        );

        Self {
            config,
            cells,
            index,
            pieces: HashMap::new(),
            next_piece: 0,
            selected: None,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, x outer, y inner.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// The cell at `coord`, or `None` if the coordinate is off the board.
    pub fn cell_at(&self, coord: Coord) -> Option<&Cell> {
        self.index.get(&coord).map(|&i| &self.cells[i])
    }

    /// The cell whose anchor is nearest to `point`.
    ///
    /// Ties go to the cell met first in iteration order. Returns `None`
    /// only for a board with no cells.
    pub fn closest_cell_to(&self, point: Point3) -> Option<&Cell> {
        let mut best: Option<(&Cell, f32)> = None;
        for cell in &self.cells {
            let distance = cell.anchor().distance(point);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((cell, distance)),
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Looks up a piece by id.
    pub fn piece(&self, id: PieceId) -> Option<&P> {
        self.pieces.get(&id)
    }

    /// The piece standing on `coord`, if any.
    pub fn piece_at(&self, coord: Coord) -> Option<&P> {
        self.cell_at(coord)
            .and_then(Cell::piece)
            .and_then(|id| self.pieces.get(&id))
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Puts a new piece on an empty cell. Used at match setup.
    pub fn place(&mut self, coord: Coord, piece: P) -> Result<PieceId, BoardError> {
        let i = self.index_of(coord)?;
        if self.cells[i].piece.is_some() {
            return Err(BoardError::Occupied(coord));
        }

        let id = PieceId(self.next_piece);
        self.next_piece += 1;
        self.pieces.insert(id, piece);
        self.cells[i].piece = Some(id);
        Ok(id)
    }

    /// Coordinates of every highlighted cell.
    pub fn highlighted(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .filter(|c| c.highlighted)
            .map(Cell::coord)
            .collect()
    }

    fn index_of(&self, coord: Coord) -> Result<usize, BoardError> {
        self.index
            .get(&coord)
            .copied()
            .ok_or(BoardError::CellNotFound(coord))
    }

    fn occupant(&self, i: usize) -> Result<PieceId, BoardError> {
        self.cells[i]
            .piece
            .ok_or(BoardError::NoPiece(self.cells[i].coord()))
    }
}

impl<P: Piece> Board<P> {
    /// Asks the piece on `from` where it may go.
    pub fn valid_targets(&self, from: Coord) -> Result<HashSet<Coord>, BoardError> {
        let i = self.index_of(from)?;
        let id = self.occupant(i)?;
        Ok(self.pieces[&id].valid_target_cells(from, self))
    }

    /// Moves the local player's piece from `from` to `to` if its rules
    /// allow it, capturing an opposing piece on `to`.
    ///
    /// The returned [`MoveRecord`] is what the other player needs to
    /// replay the move with [`ordered_get_captured`] and
    /// [`ordered_make_move`].
    ///
    /// [`ordered_get_captured`]: Self::ordered_get_captured
    /// [`ordered_make_move`]: Self::ordered_make_move
    pub fn try_move(&mut self, from: Coord, to: Coord) -> Result<MoveRecord, BoardError> {
        let from_i = self.index_of(from)?;
        let to_i = self.index_of(to)?;
        let id = self.occupant(from_i)?;

        let piece = &self.pieces[&id];
        let team = piece.team();
        if !piece.valid_target_cells(from, self).contains(&to) {
            return Err(BoardError::IllegalTarget { from, to });
        }

        let occupant = self.cells[to_i].piece;
        let capture = match occupant {
            None => None,
            Some(other) if self.pieces[&other].team() == team => {
                return Err(BoardError::Occupied(to));
            }
            Some(_) => {
                self.remove_piece(to_i);
                Some(CaptureData {
                    team,
                    captured_cell_coordinates: to,
                })
            }
        };

        self.relocate(from_i, to_i, id);

        Ok(MoveRecord {
            mv: MoveData {
                team,
                original_coord: from,
                target_coord: to,
            },
            capture,
        })
    }

    /// Replays a move the other player already made.
    ///
    /// No rules are checked. The target must be empty: a capture is
    /// replayed separately, before the move.
    pub fn ordered_make_move(&mut self, from: Coord, to: Coord) -> Result<(), BoardError> {
        let from_i = self.index_of(from)?;
        let to_i = self.index_of(to)?;
        let id = self.occupant(from_i)?;
        if self.cells[to_i].piece.is_some() {
            return Err(BoardError::Occupied(to));
        }

        self.relocate(from_i, to_i, id);
        Ok(())
    }

    /// Replays a capture the other player already made: removes the piece
    /// on `at` and hands it back.
    pub fn ordered_get_captured(&mut self, at: Coord) -> Result<P, BoardError> {
        let i = self.index_of(at)?;
        self.occupant(i)?;
        self.remove_piece(i).ok_or(BoardError::NoPiece(at))
    }

    fn relocate(&mut self, from_i: usize, to_i: usize, id: PieceId) {
        self.cells[from_i].piece = None;
        self.cells[to_i].piece = Some(id);
        let (from, to) = (self.cells[from_i].coord(), self.cells[to_i].coord());
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.on_moved(from, to);
        }
    }

    fn remove_piece(&mut self, i: usize) -> Option<P> {
        let id = self.cells[i].piece.take()?;
        let mut piece = self.pieces.remove(&id)?;
        piece.on_captured();
        Some(piece)
    }
}
