//! Board adapter with a push/pop move stack.
//!
//! `chess::Board` is an immutable value type: every move produces a new board.
//! The search, repetition detection and opening book all want a mutable
//! position that remembers how it got where it is, so `Position` layers a move
//! stack, a halfmove clock and a fullmove counter over it.

use std::fmt;
use std::str::FromStr;

use chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
    BitBoard, Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Rank, Square, EMPTY,
};

use crate::error::{EngineError, Result};

/// Standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Undo {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// A chess position plus the history needed to unmake moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    moves: Vec<ChessMove>,
    undo: Vec<Undo>,
}

impl Position {
    /// Create the standard starting position.
    pub fn new() -> Self {
        Self::from_board(Board::default())
    }

    /// Wrap an existing board with fresh clocks and an empty move stack.
    pub fn from_board(board: Board) -> Self {
        Position {
            board,
            halfmove_clock: 0,
            fullmove_number: 1,
            moves: Vec::new(),
            undo: Vec::new(),
        }
    }

    /// Parse a FEN string. The halfmove and fullmove fields are optional.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let board = Board::from_str(fen).map_err(|e| EngineError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e:?}"),
        })?;

        let mut fields = fen.split_whitespace().skip(4);
        let halfmove_clock = parse_counter(fen, fields.next(), 0)?;
        let fullmove_number = parse_counter(fen, fields.next(), 1)?.max(1);

        Ok(Position {
            board,
            halfmove_clock,
            fullmove_number,
            moves: Vec::new(),
            undo: Vec::new(),
        })
    }

    /// FEN of the current position, including both clocks.
    pub fn fen(&self) -> String {
        let board_fen = self.board.to_string();
        let placement: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Zobrist hash from the board collaborator.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.board.get_hash()
    }

    /// Key identifying a position for repetition purposes: placement, side to
    /// move, castling rights and capturable en passant square.
    #[inline]
    pub fn transposition_key(&self) -> u64 {
        self.board.get_hash()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Moves played since this position was created, oldest first.
    #[inline]
    pub fn move_stack(&self) -> &[ChessMove] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<ChessMove> {
        self.moves.last().copied()
    }

    /// Play a move. The move must be legal; use [`Position::push_checked`]
    /// for untrusted input.
    pub fn push(&mut self, mv: ChessMove) {
        let resets_clock = self.is_zeroing(mv);
        self.undo.push(Undo {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });
        self.moves.push(mv);

        if self.board.side_to_move() == Color::Black {
            self.fullmove_number += 1;
        }
        self.halfmove_clock = if resets_clock {
            0
        } else {
            self.halfmove_clock + 1
        };
        self.board = self.board.make_move_new(mv);
    }

    /// Play a move after verifying it is legal.
    pub fn push_checked(&mut self, mv: ChessMove) -> Result<()> {
        if !self.is_legal(mv) {
            return Err(EngineError::IllegalMove {
                notation: mv.to_string(),
            });
        }
        self.push(mv);
        Ok(())
    }

    /// Play a move given in coordinate notation such as `e2e4` or `e7e8q`.
    pub fn push_uci(&mut self, notation: &str) -> Result<ChessMove> {
        let mv = self
            .legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == notation)
            .ok_or_else(|| EngineError::IllegalMove {
                notation: notation.to_string(),
            })?;
        self.push(mv);
        Ok(mv)
    }

    /// Unmake the last move, returning it.
    pub fn pop(&mut self) -> Option<ChessMove> {
        let mv = self.moves.pop()?;
        if let Some(undo) = self.undo.pop() {
            self.board = undo.board;
            self.halfmove_clock = undo.halfmove_clock;
            self.fullmove_number = undo.fullmove_number;
        }
        Some(mv)
    }

    #[inline]
    pub fn is_legal(&self, mv: ChessMove) -> bool {
        self.board.legal(mv)
    }

    /// All legal moves in generation order.
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        MoveGen::new_legal(&self.board).len() > 0
    }

    /// Legal captures, en passant included, in generation order.
    pub fn captures(&self) -> Vec<ChessMove> {
        let mut targets = *self.board.color_combined(!self.side_to_move());
        if let Some(ep) = self.en_passant_target() {
            targets |= BitBoard::from_square(ep);
        }
        let mut generator = MoveGen::new_legal(&self.board);
        generator.set_iterator_mask(targets);
        generator.collect()
    }

    /// Square a pawn would land on when capturing en passant.
    pub fn en_passant_target(&self) -> Option<Square> {
        let pawn = self.board.en_passant()?;
        let rank = match self.side_to_move() {
            Color::White => Rank::Sixth,
            Color::Black => Rank::Third,
        };
        Some(Square::make_square(rank, pawn.get_file()))
    }

    pub fn is_en_passant(&self, mv: ChessMove) -> bool {
        self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            && mv.get_source().get_file() != mv.get_dest().get_file()
            && self.board.piece_on(mv.get_dest()).is_none()
    }

    pub fn is_capture(&self, mv: ChessMove) -> bool {
        self.board.piece_on(mv.get_dest()).is_some() || self.is_en_passant(mv)
    }

    /// Piece removed by the move, if any.
    pub fn captured_piece(&self, mv: ChessMove) -> Option<Piece> {
        if self.is_en_passant(mv) {
            Some(Piece::Pawn)
        } else {
            self.board.piece_on(mv.get_dest())
        }
    }

    /// Pawn moves and captures reset the halfmove clock.
    pub fn is_zeroing(&self, mv: ChessMove) -> bool {
        self.board.piece_on(mv.get_source()) == Some(Piece::Pawn) || self.is_capture(mv)
    }

    /// A move after which no earlier position can recur: pawn moves, captures
    /// and anything that changes castling rights.
    pub fn is_irreversible(&self, mv: ChessMove) -> bool {
        if self.is_zeroing(mv) {
            return true;
        }
        let next = self.board.make_move_new(mv);
        next.castle_rights(Color::White) != self.board.castle_rights(Color::White)
            || next.castle_rights(Color::Black) != self.board.castle_rights(Color::Black)
    }

    pub fn piece_at(&self, square: Square) -> Option<(Color, Piece)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((color, piece))
    }

    /// Pieces of `color` attacking `square` in the current occupancy.
    pub fn attackers(&self, color: Color, square: Square) -> BitBoard {
        let board = &self.board;
        let ours = *board.color_combined(color);
        let occupied = *board.combined();
        let diagonal = *board.pieces(Piece::Bishop) | *board.pieces(Piece::Queen);
        let straight = *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);

        let pawns = get_pawn_attacks(square, !color, *board.pieces(Piece::Pawn) & ours);
        let knights = get_knight_moves(square) & *board.pieces(Piece::Knight);
        let sliders_diag = get_bishop_moves(square, occupied) & diagonal;
        let sliders_straight = get_rook_moves(square, occupied) & straight;
        let king = get_king_moves(square) & *board.pieces(Piece::King);

        pawns | ((knights | sliders_diag | sliders_straight | king) & ours)
    }

    pub fn is_attacked_by(&self, color: Color, square: Square) -> bool {
        self.attackers(color, square) != EMPTY
    }

    pub fn in_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    /// Whether playing `mv` checkmates the opponent. Does not touch the stack.
    pub fn gives_checkmate(&self, mv: ChessMove) -> bool {
        self.board.make_move_new(mv).status() == BoardStatus::Checkmate
    }

    /// Total number of pieces on the board, kings included.
    pub fn piece_count(&self) -> u32 {
        self.board.combined().popcnt()
    }

    /// Neither side can possibly deliver mate: bare kings, a single minor
    /// piece, or only bishops all standing on one square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy = *board.pieces(Piece::Pawn)
            | *board.pieces(Piece::Rook)
            | *board.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = *board.pieces(Piece::Knight);
        let bishops = *board.pieces(Piece::Bishop);
        if (knights | bishops).popcnt() <= 1 {
            return true;
        }
        knights == EMPTY
            && ((bishops & LIGHT_SQUARES) == EMPTY || (bishops & DARK_SQUARES) == EMPTY)
    }
}

const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);
const DARK_SQUARES: BitBoard = BitBoard(0xAA55_AA55_AA55_AA55);

fn parse_counter(fen: &str, field: Option<&str>, default: u32) -> Result<u32> {
    match field {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| EngineError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("bad move counter '{text}'"),
        }),
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen())
    }
}
