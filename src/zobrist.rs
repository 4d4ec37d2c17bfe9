// This file is part of the chess-rules library.
// Copyright (C) 2017-2025 Niklas Fiekas <niklas.fiekas@backscattering.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Zobrist hashing for positions.
//!
//! The keys are generated at compile time by a fixed xorshift sequence, so
//! hashes are stable between runs and builds.
//!
//! # Warning: Forged collisions
//!
//! Zobrist hashes have good collision resistance, but can be
//! forged efficiently.
//!
//! # Examples
//!
//! ```
//! use chess_rules::{Move, Position, Square};
//!
//! let mut pos = Position::new();
//! let start = pos.zobrist_hash();
//! for (from, to) in [
//!     (Square::G1, Square::F3),
//!     (Square::G8, Square::F6),
//!     (Square::F3, Square::G1),
//!     (Square::F6, Square::G8),
//! ] {
//!     pos.make_move(Move::new(from, to))?;
//! }
//! assert_eq!(pos.zobrist_hash(), start);
//! # Ok::<_, chess_rules::PlayError>(())
//! ```

use crate::{
    board::Board,
    castling_side::CastlingSide,
    color::Color,
    position::Position,
    square::{File, Rank, Square},
    types::Piece,
};

struct Keys {
    pieces: [u64; 12 * 64],
    castling_rights: [u64; 4],
    en_passant_files: [u64; 8],
    white_turn: u64,
}

const SEED: u64 = 0x9e37_79b9_7f4a_7c15;

const fn xorshift(mut state: u64) -> u64 {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    state
}

const fn bootstrap_keys() -> Keys {
    let mut state = SEED;

    let mut pieces = [0; 12 * 64];
    let mut i = 0;
    while i < pieces.len() {
        state = xorshift(state);
        pieces[i] = state;
        i += 1;
    }

    let mut castling_rights = [0; 4];
    let mut i = 0;
    while i < castling_rights.len() {
        state = xorshift(state);
        castling_rights[i] = state;
        i += 1;
    }

    let mut en_passant_files = [0; 8];
    let mut i = 0;
    while i < en_passant_files.len() {
        state = xorshift(state);
        en_passant_files[i] = state;
        i += 1;
    }

    Keys {
        pieces,
        castling_rights,
        en_passant_files,
        white_turn: xorshift(state),
    }
}

static KEYS: Keys = bootstrap_keys();

#[inline]
fn piece_key(sq: Square, piece: Piece) -> u64 {
    let piece_idx = (piece.role as usize - 1) * 2 + piece.color as usize;
    KEYS.pieces[64 * piece_idx + sq.to_usize()]
}

#[inline]
fn castling_key(color: Color, side: CastlingSide) -> u64 {
    KEYS.castling_rights[match (color, side) {
        (Color::White, CastlingSide::KingSide) => 0,
        (Color::White, CastlingSide::QueenSide) => 1,
        (Color::Black, CastlingSide::KingSide) => 2,
        (Color::Black, CastlingSide::QueenSide) => 3,
    }]
}

#[inline]
fn en_passant_key(file: File) -> u64 {
    KEYS.en_passant_files[file as usize]
}

fn hash_board(board: &Board) -> u64 {
    board
        .iter()
        .fold(0, |zobrist, (sq, piece)| zobrist ^ piece_key(sq, piece))
}

impl Position {
    /// Computes the Zobrist hash of the position from scratch.
    ///
    /// The hash covers the pieces, the side to move, the usable castling
    /// rights and the en passant file, but only if en passant is actually
    /// possible. Clocks and the move stack are not included, so positions
    /// that count as the same for repetitions hash the same.
    pub fn zobrist_hash(&self) -> u64 {
        let mut zobrist = hash_board(&self.board);

        if self.turn.is_white() {
            zobrist ^= KEYS.white_turn;
        }

        for rook in self.clean_castling_rights() {
            let color = Color::from_white(rook.rank() == Rank::First);
            if let Some(king) = self.king_square(color) {
                zobrist ^= castling_key(color, CastlingSide::of(king, rook));
            }
        }

        if let Some(ep) = self.legal_ep_square() {
            zobrist ^= en_passant_key(ep.file());
        }

        zobrist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::m::Move;

    #[test]
    fn test_keys_distinct() {
        let mut keys: Vec<u64> = KEYS.pieces.to_vec();
        keys.extend(KEYS.castling_rights);
        keys.extend(KEYS.en_passant_files);
        keys.push(KEYS.white_turn);
        let len = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), len);
        assert!(!keys.contains(&0));
    }

    #[test]
    fn test_turn_and_rights() {
        let pos = Position::new();
        let mut other = pos.clone();
        other.turn = Color::Black;
        assert_ne!(pos.zobrist_hash(), other.zobrist_hash());

        let without_rights = Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kkq - 0 1")
            .expect("valid fen");
        assert_ne!(pos.zobrist_hash(), without_rights.zobrist_hash());
    }

    #[test]
    fn test_clocks_ignored() {
        let a = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("valid fen");
        let b = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 42 80").expect("valid fen");
        assert_eq!(a.zobrist_hash(), b.zobrist_hash());
    }

    #[test]
    fn test_en_passant_only_if_legal() {
        let mut pos = Position::new();
        pos.make_move(Move::new(Square::E2, Square::E4)).expect("legal");
        let without_ep = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
            .expect("valid fen");
        assert_eq!(pos.zobrist_hash(), without_ep.zobrist_hash());

        let with_ep = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").expect("valid fen");
        let no_ep = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1").expect("valid fen");
        assert_ne!(with_ep.zobrist_hash(), no_ep.zobrist_hash());
    }
}
