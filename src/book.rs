//! Opening books.
//!
//! [`PolyglotBook`] reads the Polyglot entry layout: 16-byte big-endian records
//! of key, move, weight and learn value, sorted by key. Keys are the hash of
//! the board collaborator, so books must be built with the same hashing (see
//! [`BookEntry::new`]); the reference Polyglot Zobrist keys are not used.

use std::path::Path;

use chess::{ChessMove, File, Piece, Rank, Square};
use log::{debug, warn};
use rand::Rng;

use crate::error::{EngineError, Result};
use crate::position::Position;

const ENTRY_SIZE: usize = 16;

/// Something that can suggest a move for a position without searching.
pub trait OpeningBook {
    /// A legal move for `position`, or `None` when the book has nothing.
    fn probe(&self, position: &Position) -> Option<ChessMove>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BookEntry {
    pub key: u64,
    pub raw_move: u16,
    pub weight: u16,
    pub learn: u32,
}

impl BookEntry {
    pub const SIZE: usize = ENTRY_SIZE;

    /// Entry for `mv` played from `position`.
    pub fn new(position: &Position, mv: ChessMove, weight: u16) -> Self {
        BookEntry {
            key: position.hash(),
            raw_move: encode_move(position, mv),
            weight,
            learn: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let mut key = [0u8; 8];
        key.copy_from_slice(&bytes[0..8]);
        let mut learn = [0u8; 4];
        learn.copy_from_slice(&bytes[12..16]);
        BookEntry {
            key: u64::from_be_bytes(key),
            raw_move: u16::from_be_bytes([bytes[8], bytes[9]]),
            weight: u16::from_be_bytes([bytes[10], bytes[11]]),
            learn: u32::from_be_bytes(learn),
        }
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut out = [0u8; ENTRY_SIZE];
        out[0..8].copy_from_slice(&self.key.to_be_bytes());
        out[8..10].copy_from_slice(&self.raw_move.to_be_bytes());
        out[10..12].copy_from_slice(&self.weight.to_be_bytes());
        out[12..16].copy_from_slice(&self.learn.to_be_bytes());
        out
    }

    /// The legal move this entry stands for in `position`, if any.
    pub fn decode_move(&self, position: &Position) -> Option<ChessMove> {
        let raw = self.raw_move;
        let square = |file_bits: u16, rank_bits: u16| {
            Square::make_square(
                Rank::from_index(usize::from(rank_bits & 7)),
                File::from_index(usize::from(file_bits & 7)),
            )
        };
        let to = square(raw, raw >> 3);
        let from = square(raw >> 6, raw >> 9);
        let promotion = match (raw >> 12) & 7 {
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            _ => None,
        };

        // Castling is stored as king-takes-own-rook.
        let to = castling_destination(position, from, to).unwrap_or(to);
        let mv = ChessMove::new(from, to, promotion);
        position.is_legal(mv).then_some(mv)
    }
}

fn castling_destination(position: &Position, from: Square, to: Square) -> Option<Square> {
    let (color, piece) = position.piece_at(from)?;
    if piece != Piece::King || position.piece_at(to) != Some((color, Piece::Rook)) {
        return None;
    }
    let file = if to.get_file().to_index() > from.get_file().to_index() {
        File::G
    } else {
        File::C
    };
    Some(Square::make_square(from.get_rank(), file))
}

/// Polyglot move encoding, castling written as king-takes-rook.
pub fn encode_move(position: &Position, mv: ChessMove) -> u16 {
    let from = mv.get_source();
    let mut to = mv.get_dest();

    let is_king = position.piece_at(from).map(|(_, p)| p) == Some(Piece::King);
    let distance = from.get_file().to_index().abs_diff(to.get_file().to_index());
    if is_king && distance == 2 {
        let rook_file = if to.get_file().to_index() > from.get_file().to_index() {
            File::H
        } else {
            File::A
        };
        to = Square::make_square(from.get_rank(), rook_file);
    }

    let promotion = match mv.get_promotion() {
        Some(Piece::Knight) => 1,
        Some(Piece::Bishop) => 2,
        Some(Piece::Rook) => 3,
        Some(Piece::Queen) => 4,
        _ => 0,
    };
    let bits = |sq: Square| (sq.get_file().to_index() as u16, sq.get_rank().to_index() as u16);
    let (to_file, to_rank) = bits(to);
    let (from_file, from_rank) = bits(from);

    to_file | (to_rank << 3) | (from_file << 6) | (from_rank << 9) | (promotion << 12)
}

/// In-memory Polyglot-layout book.
#[derive(Clone, Debug, Default)]
pub struct PolyglotBook {
    entries: Vec<BookEntry>,
}

impl PolyglotBook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| EngineError::BookIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let book = Self::from_bytes(&bytes)?;
        debug!("loaded {} book entries from {}", book.len(), path.display());
        Ok(book)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % BookEntry::SIZE != 0 {
            return Err(EngineError::BookFormat { len: bytes.len() });
        }
        let entries = bytes
            .chunks_exact(BookEntry::SIZE)
            .filter_map(|chunk| <&[u8; ENTRY_SIZE]>::try_from(chunk).ok())
            .map(BookEntry::from_bytes)
            .collect();
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(mut entries: Vec<BookEntry>) -> Self {
        entries.sort_by_key(|e| e.key);
        PolyglotBook { entries }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.entries.iter().flat_map(BookEntry::to_bytes).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries stored under `key`.
    pub fn find_all(&self, key: u64) -> &[BookEntry] {
        let start = self.entries.partition_point(|e| e.key < key);
        let end = start + self.entries[start..].partition_point(|e| e.key == key);
        &self.entries[start..end]
    }

    /// Legal book moves for `position` with their weights.
    pub fn moves(&self, position: &Position) -> Vec<(ChessMove, u16)> {
        self.find_all(position.hash())
            .iter()
            .filter_map(|entry| match entry.decode_move(position) {
                Some(mv) => Some((mv, entry.weight)),
                None => {
                    warn!(
                        "book entry {:#06x} is not legal in {}",
                        entry.raw_move,
                        position.fen()
                    );
                    None
                }
            })
            .collect()
    }

    /// Pick a book move with probability proportional to its weight.
    /// Zero-weight entries are never chosen.
    pub fn weighted_choice<R: Rng>(
        &self,
        position: &Position,
        rng: &mut R,
    ) -> Option<ChessMove> {
        let moves = self.moves(position);
        let total: u32 = moves.iter().map(|&(_, w)| u32::from(w)).sum();
        if total == 0 {
            return None;
        }

        let mut pick = rng.gen_range(0..total);
        for (mv, weight) in moves {
            let weight = u32::from(weight);
            if pick < weight {
                return Some(mv);
            }
            pick -= weight;
        }
        None
    }
}

impl OpeningBook for PolyglotBook {
    fn probe(&self, position: &Position) -> Option<ChessMove> {
        self.weighted_choice(position, &mut rand::thread_rng())
    }
}
