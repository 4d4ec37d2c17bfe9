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

//! Parse and write moves in Universal Chess Interface representation.
//!
//! # Examples
//!
//! Parsing UCIs:
//!
//! ```
//! use chess_rules::{Move, Square};
//!
//! let m = Move::from_uci("g1f3")?;
//! assert_eq!(m, Move::new(Square::G1, Square::F3));
//! # Ok::<_, chess_rules::uci::ParseUciError>(())
//! ```
//!
//! Converting to a legal move in the context of a position, and writing
//! castling moves according to the [`CastlingMode`](crate::CastlingMode):
//!
//! ```
//! use chess_rules::{CastlingMode, Position};
//!
//! let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1")?;
//! let m = pos.parse_uci("e1h1")?;
//! assert_eq!(pos.uci(m), "e1g1");
//!
//! pos.set_castling_mode(CastlingMode::Chess960);
//! assert_eq!(pos.uci(m), "e1h1");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use std::{error::Error, fmt};

use crate::{m::Move, position::Position, role::Role, square::Square};

/// Error when parsing an invalid UCI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseUciError;

impl fmt::Display for ParseUciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid uci")
    }
}

impl Error for ParseUciError {}

/// Error when a UCI cannot be converted to a move in a position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UciError {
    /// The text is not a UCI move.
    Parse(ParseUciError),
    /// The move is not legal in the position.
    Illegal,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::Parse(err) => err.fmt(f),
            UciError::Illegal => f.write_str("illegal uci"),
        }
    }
}

impl Error for UciError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UciError::Parse(err) => Some(err),
            UciError::Illegal => None,
        }
    }
}

impl From<ParseUciError> for UciError {
    fn from(err: ParseUciError) -> UciError {
        UciError::Parse(err)
    }
}

impl Move {
    /// Parses a move in UCI notation: `e2e4`, `e7e8q`, `Q@e4` or `0000`
    /// for the null move.
    ///
    /// # Errors
    ///
    /// Returns [`ParseUciError`] if the text is not of one of these forms.
    pub fn from_uci(uci: &str) -> Result<Move, ParseUciError> {
        Move::from_ascii(uci.as_bytes())
    }

    /// Parses a move in UCI notation from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseUciError`] if the bytes are not a UCI move.
    pub fn from_ascii(uci: &[u8]) -> Result<Move, ParseUciError> {
        match uci {
            b"0000" => Ok(Move::NULL),
            [piece, b'@', to @ ..] if to.len() == 2 && piece.is_ascii_uppercase() => {
                let role = Role::from_char(char::from(piece.to_ascii_lowercase()))
                    .ok_or(ParseUciError)?;
                let to = Square::from_ascii(to).map_err(|_| ParseUciError)?;
                Ok(Move::new_drop(role, to))
            }
            [squares @ .., promotion] if squares.len() == 4 && promotion.is_ascii_lowercase() => {
                let role = Role::from_char(char::from(*promotion))
                    .filter(|role| Role::PROMOTIONS.contains(role))
                    .ok_or(ParseUciError)?;
                Ok(normal_from_ascii(squares)?.with_promotion(role))
            }
            _ => normal_from_ascii(uci),
        }
    }
}

fn normal_from_ascii(uci: &[u8]) -> Result<Move, ParseUciError> {
    if uci.len() != 4 {
        return Err(ParseUciError);
    }
    let from = Square::from_ascii(&uci[0..2]).map_err(|_| ParseUciError)?;
    let to = Square::from_ascii(&uci[2..4]).map_err(|_| ParseUciError)?;
    if from == to {
        return Err(ParseUciError);
    }
    Ok(Move::new(from, to))
}

impl Position {
    /// Writes a move in UCI notation, with castling encoded according to
    /// the position's [`CastlingMode`](crate::CastlingMode).
    pub fn uci(&self, m: Move) -> String {
        self.from_internal(self.to_internal(m)).to_string()
    }

    /// Parses a UCI move and checks that it is legal. Castling is accepted
    /// in both encodings and returned in the encoding of the position's
    /// [`CastlingMode`](crate::CastlingMode).
    ///
    /// `0000` gives [`Move::NULL`], which is not legal but can be played
    /// with [`Position::push_uci()`].
    ///
    /// # Errors
    ///
    /// Returns [`UciError`] if the text is not UCI or the move is illegal.
    pub fn parse_uci(&self, uci: &str) -> Result<Move, UciError> {
        let m = Move::from_uci(uci)?;
        if m.is_null() {
            return Ok(Move::NULL);
        }
        let internal = self.to_internal(m);
        if m.drop.is_none() && self.is_legal_internal(internal) {
            Ok(self.from_internal(internal))
        } else {
            Err(UciError::Illegal)
        }
    }

    /// Parses a UCI move, checks that it is legal and plays it. Returns the
    /// move as played.
    ///
    /// # Errors
    ///
    /// Returns [`UciError`] and leaves the position unchanged if the text
    /// is not UCI or the move is illegal.
    pub fn push_uci(&mut self, uci: &str) -> Result<Move, UciError> {
        let m = self.parse_uci(uci)?;
        self.make_move_unchecked(m);
        Ok(m)
    }
}
