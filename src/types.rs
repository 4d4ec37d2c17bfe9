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

use std::{error::Error, fmt};

use crate::{color::Color, role::Role};

/// A piece with [`Color`] and [`Role`].
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
}

impl Piece {
    /// The FEN letter of the piece, uppercase for White.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::Color;
    ///
    /// assert_eq!(Color::White.knight().char(), 'N');
    /// assert_eq!(Color::Black.queen().char(), 'q');
    /// ```
    pub const fn char(self) -> char {
        match self.color {
            Color::White => self.role.upper_char(),
            Color::Black => self.role.char(),
        }
    }

    pub const fn from_char(ch: char) -> Option<Piece> {
        match Role::from_char(ch) {
            Some(role) => Some(role.of(Color::from_white(ch.is_ascii_uppercase()))),
            None => None,
        }
    }

    /// Parses a FEN piece letter.
    ///
    /// # Errors
    ///
    /// Returns [`ParsePieceError`] if `ch` is not one of `PNBRQKpnbrqk`.
    pub const fn try_from_char(ch: char) -> Result<Piece, ParsePieceError> {
        match Piece::from_char(ch) {
            Some(piece) => Ok(piece),
            None => Err(ParsePieceError { symbol: ch }),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// Error when parsing an invalid piece symbol.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsePieceError {
    symbol: char,
}

impl ParsePieceError {
    /// The character that is not a piece symbol.
    pub const fn symbol(&self) -> char {
        self.symbol
    }
}

impl fmt::Display for ParsePieceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid piece symbol: {:?}", self.symbol)
    }
}

impl Error for ParsePieceError {}

/// `Standard` or `Chess960`.
///
/// Determines how castling moves are written in UCI notation and returned
/// by move generation. Either encoding is accepted when reading. FEN
/// castling fields are written the same way in both modes: `KQkq` letters
/// for the outermost rooks, file letters otherwise.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Default)]
pub enum CastlingMode {
    /// Castling is written as the king moving two squares, e.g. `e1g1`.
    #[default]
    Standard,
    /// Castling is written as the king capturing its own rook, e.g. `e1h1`.
    Chess960,
}

impl CastlingMode {
    pub const fn from_chess960(chess960: bool) -> CastlingMode {
        if chess960 {
            CastlingMode::Chess960
        } else {
            CastlingMode::Standard
        }
    }

    pub const fn is_standard(self) -> bool {
        matches!(self, CastlingMode::Standard)
    }

    pub const fn is_chess960(self) -> bool {
        matches!(self, CastlingMode::Chess960)
    }
}

/// When to include the en passant square.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum EnPassantMode {
    /// Only if there is a fully legal en passant move.
    Legal,
    /// Whenever a pawn has been advanced by two steps.
    ///
    /// Follows the FEN specification.
    Always,
}
