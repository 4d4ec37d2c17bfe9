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

//! Read and write Standard Algebraic Notation.
//!
//! # Examples
//!
//! Parse and write SANs:
//!
//! ```
//! use chess_rules::san::San;
//!
//! let san: San = "Nf3".parse()?;
//! assert_eq!(san.to_string(), "Nf3");
//! # Ok::<_, chess_rules::san::ParseSanError>(())
//! ```
//!
//! Converting to a move:
//!
//! ```
//! use chess_rules::{san::San, Move, Position, Square};
//!
//! let pos = Position::new();
//! let san: San = "Nf3".parse()?;
//! let m = san.to_move(&pos)?;
//! assert_eq!(m, Move::new(Square::G1, Square::F3));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! Back to a (possibly disambiguated) SAN:
//!
//! ```
//! use chess_rules::{Move, Position, Square};
//!
//! let pos = Position::new();
//! assert_eq!(pos.san(Move::new(Square::G1, Square::F3))?, "Nf3");
//! # Ok::<_, chess_rules::san::SanError>(())
//! ```

use std::{error::Error, fmt, str::FromStr};

use crate::{
    bitboard::Bitboard,
    castling_side::CastlingSide,
    m::{Move, MoveList},
    position::Position,
    role::Role,
    square::{File, Rank, Square},
};

/// Error when parsing a syntactially invalid SAN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSanError;

impl fmt::Display for ParseSanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid san")
    }
}

impl Error for ParseSanError {}

/// Error when a SAN does not describe exactly one legal move.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SanError {
    /// The text is not SAN.
    Parse(ParseSanError),
    /// Standard algebraic notation does not match a legal move.
    Illegal,
    /// Standard algebraic notation matches multiple legal moves.
    Ambiguous,
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Parse(err) => err.fmt(f),
            SanError::Illegal => f.write_str("illegal san"),
            SanError::Ambiguous => f.write_str("ambiguous san"),
        }
    }
}

impl Error for SanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SanError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseSanError> for SanError {
    fn from(err: ParseSanError) -> SanError {
        SanError::Parse(err)
    }
}

/// A move in Standard Algebraic Notation.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum San {
    Normal {
        role: Role,
        file: Option<File>,
        rank: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
    Castle(CastlingSide),
    Put {
        role: Role,
        to: Square,
    },
    Null,
}

impl San {
    /// Parses a SAN. Ignores a possible check or checkmate suffix.
    ///
    /// Castling may be written with zeros (`0-0`), promotions without the
    /// equals sign (`e8Q`), and the null move as `--`, `Z0` or `0000`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if `san` is not syntactically valid.
    pub fn from_ascii(mut san: &[u8]) -> Result<San, ParseSanError> {
        if san.ends_with(b"#") || san.ends_with(b"+") {
            san = &san[0..(san.len() - 1)];
        }

        match san {
            b"--" | b"Z0" | b"0000" => return Ok(San::Null),
            b"O-O" | b"0-0" => return Ok(San::Castle(CastlingSide::KingSide)),
            b"O-O-O" | b"0-0-0" => return Ok(San::Castle(CastlingSide::QueenSide)),
            [b'@', to @ ..] if to.len() == 2 => {
                return Ok(San::Put {
                    role: Role::Pawn,
                    to: Square::from_ascii(to).map_err(|_| ParseSanError)?,
                })
            }
            [role, b'@', to @ ..] if to.len() == 2 => {
                return Ok(San::Put {
                    role: Role::from_char(char::from(*role)).ok_or(ParseSanError)?,
                    to: Square::from_ascii(to).map_err(|_| ParseSanError)?,
                })
            }
            _ => (),
        }

        let mut chars = san.iter().copied();

        let ch = chars.next().ok_or(ParseSanError)?;
        let (role, next) = if ch.is_ascii_uppercase() {
            (
                Role::from_char(char::from(ch)).ok_or(ParseSanError)?,
                chars.next().ok_or(ParseSanError)?,
            )
        } else {
            (Role::Pawn, ch)
        };

        let (file, next) = if let Some(file) = File::from_char(char::from(next)) {
            (Some(file), chars.next().ok_or(ParseSanError)?)
        } else {
            (None, next)
        };

        let (rank, next) = if let Some(rank) = Rank::from_char(char::from(next)) {
            (Some(rank), chars.next())
        } else {
            (None, Some(next))
        };

        let (capture, file, rank, to, next) = match next {
            Some(b'x') => {
                let to_file = chars
                    .next()
                    .and_then(|ch| File::from_char(char::from(ch)))
                    .ok_or(ParseSanError)?;
                let to_rank = chars
                    .next()
                    .and_then(|ch| Rank::from_char(char::from(ch)))
                    .ok_or(ParseSanError)?;
                (true, file, rank, Square::from_coords(to_file, to_rank), chars.next())
            }
            Some(next) if File::from_char(char::from(next)).is_some() => {
                let to_file = File::from_char(char::from(next)).ok_or(ParseSanError)?;
                let to_rank = chars
                    .next()
                    .and_then(|ch| Rank::from_char(char::from(ch)))
                    .ok_or(ParseSanError)?;
                (false, file, rank, Square::from_coords(to_file, to_rank), chars.next())
            }
            next => {
                // The square read so far is the target.
                let square =
                    Square::from_coords(file.ok_or(ParseSanError)?, rank.ok_or(ParseSanError)?);
                (false, None, None, square, next)
            }
        };

        let promotion = match next {
            Some(b'=') => Some(chars.next().ok_or(ParseSanError)?),
            Some(ch) => Some(ch),
            None => None,
        }
        .map(|ch| {
            Role::from_char(char::from(ch))
                .filter(|role| Role::PROMOTIONS.contains(role))
                .ok_or(ParseSanError)
        })
        .transpose()?;

        if chars.next().is_some() {
            return Err(ParseSanError);
        }

        Ok(San::Normal {
            role,
            file,
            rank,
            capture,
            to,
            promotion,
        })
    }

    /// Converts a move to Standard Algebraic Notation, disambiguating
    /// against the other legal moves.
    pub fn from_move(pos: &Position, m: Move) -> San {
        if m.is_null() {
            return San::Null;
        }
        if let Some(role) = m.drop {
            return San::Put { role, to: m.to };
        }
        if pos.is_castling(m) {
            return San::Castle(CastlingSide::from_king_side(pos.is_kingside_castling(m)));
        }

        let role = pos.board().role_at(m.from).unwrap_or(Role::Pawn);
        let capture = pos.is_capture(m);

        if role == Role::Pawn {
            return San::Normal {
                role,
                file: capture.then(|| m.from.file()),
                rank: None,
                capture,
                to: m.to,
                promotion: m.promotion,
            };
        }

        let candidates = pos.san_candidates(role, m.to);
        let (rank, file) = candidates
            .iter()
            .filter(|c| c.promotion == m.promotion && c.from != m.from)
            .fold((false, false), |(rank, file), c| {
                if m.from.rank() == c.from.rank() || m.from.file() != c.from.file() {
                    (rank, true)
                } else {
                    (true, file)
                }
            });

        San::Normal {
            role,
            file: file.then(|| m.from.file()),
            rank: rank.then(|| m.from.rank()),
            capture,
            to: m.to,
            promotion: m.promotion,
        }
    }

    /// Tries to convert the `San` to a legal move in the context of a
    /// position. The null move converts to [`Move::NULL`].
    ///
    /// # Errors
    ///
    /// Returns [`SanError`] if there is no unique matching legal move.
    pub fn to_move(&self, pos: &Position) -> Result<Move, SanError> {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                let mut legals = pos.san_candidates(role, to);
                legals.retain(|m| {
                    file.is_none_or(|f| f == m.from.file())
                        && rank.is_none_or(|r| r == m.from.rank())
                        && capture == pos.is_capture(*m)
                        && promotion == m.promotion
                });
                match legals.as_slice() {
                    [m] => Ok(*m),
                    [] => Err(SanError::Illegal),
                    _ => Err(SanError::Ambiguous),
                }
            }
            San::Castle(side) => pos
                .legal_moves()
                .into_iter()
                .find(|m| {
                    pos.is_castling(*m)
                        && pos.is_kingside_castling(*m) == side.is_king_side()
                })
                .ok_or(SanError::Illegal),
            San::Put { .. } => Err(SanError::Illegal),
            San::Null => Ok(Move::NULL),
        }
    }

    /// Test if the `San` can match the `Move` in the given position.
    pub fn matches(&self, pos: &Position, m: Move) -> bool {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                m.drop.is_none()
                    && !pos.is_castling(m)
                    && pos.board().role_at(m.from) == Some(role)
                    && file.is_none_or(|f| f == m.from.file())
                    && rank.is_none_or(|r| r == m.from.rank())
                    && capture == pos.is_capture(m)
                    && to == m.to
                    && promotion == m.promotion
            }
            San::Castle(side) => {
                pos.is_castling(m) && pos.is_kingside_castling(m) == side.is_king_side()
            }
            San::Put { role, to } => m.drop == Some(role) && m.to == to,
            San::Null => m.is_null(),
        }
    }
}

impl Position {
    /// Legal moves of a piece of `role` to `to`, not including castling.
    fn san_candidates(&self, role: Role, to: Square) -> MoveList {
        let mut moves =
            self.generate_legal_moves(self.board.by_piece(role.of(self.turn)), Bitboard::from(to));
        moves.retain(|m| !self.is_castling(*m));
        moves
    }

    /// Writes a legal move in SAN, with check or checkmate suffix.
    ///
    /// # Errors
    ///
    /// Returns [`SanError::Illegal`] if the move is not legal. The null
    /// move is written as `--`.
    pub fn san(&self, m: Move) -> Result<String, SanError> {
        if !m.is_null() && (m.drop.is_some() || !self.is_legal_internal(self.to_internal(m))) {
            return Err(SanError::Illegal);
        }
        Ok(SanPlus::from_move(self, m).to_string())
    }

    /// Parses a SAN in the context of this position.
    ///
    /// # Errors
    ///
    /// Returns [`SanError`] if the text is not SAN, or does not match
    /// exactly one legal move.
    pub fn parse_san(&self, san: &str) -> Result<Move, SanError> {
        Ok(San::from_str(san)?.to_move(self)?)
    }

    /// Parses a SAN and plays the move. The null move is played without
    /// further checks.
    ///
    /// # Errors
    ///
    /// Returns [`SanError`] and leaves the position unchanged if the text
    /// is not SAN or does not match exactly one legal move.
    pub fn push_san(&mut self, san: &str) -> Result<Move, SanError> {
        let m = self.parse_san(san)?;
        self.make_move_unchecked(m);
        Ok(m)
    }
}

impl FromStr for San {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<San, ParseSanError> {
        San::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                if role != Role::Pawn {
                    write!(f, "{}", role.upper_char())?;
                }
                if let Some(file) = file {
                    write!(f, "{}", file.char())?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank.char())?;
                }
                if capture {
                    write!(f, "x")?;
                }
                write!(f, "{to}")?;
                if let Some(promotion) = promotion {
                    write!(f, "={}", promotion.upper_char())?;
                }
                Ok(())
            }
            San::Castle(side) => f.write_str(side.san()),
            San::Put {
                role: Role::Pawn,
                to,
            } => write!(f, "@{to}"),
            San::Put { role, to } => write!(f, "{}@{}", role.upper_char(), to),
            San::Null => write!(f, "--"),
        }
    }
}

/// Check (`+`) or checkmate (`#`) suffix.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Suffix {
    Check,
    Checkmate,
}

impl Suffix {
    pub const fn char(self) -> char {
        match self {
            Suffix::Check => '+',
            Suffix::Checkmate => '#',
        }
    }

    pub const fn from_char(ch: char) -> Option<Suffix> {
        match ch {
            '+' => Some(Suffix::Check),
            '#' => Some(Suffix::Checkmate),
            _ => None,
        }
    }

    pub fn from_position(pos: &Position) -> Option<Suffix> {
        if pos.is_checkmate() {
            Some(Suffix::Checkmate)
        } else if pos.is_check() {
            Some(Suffix::Check)
        } else {
            None
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A [`San`] and possible check and checkmate suffixes.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct SanPlus {
    pub san: San,
    pub suffix: Option<Suffix>,
}

impl SanPlus {
    /// Parses a SAN and possible check and checkmate suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if `san` is not syntactically valid.
    pub fn from_ascii(san: &[u8]) -> Result<SanPlus, ParseSanError> {
        San::from_ascii(san).map(|result| SanPlus {
            san: result,
            suffix: san
                .last()
                .copied()
                .and_then(|ch| Suffix::from_char(char::from(ch))),
        })
    }

    /// Converts a move to Standard Algebraic Notation including possible
    /// check and checkmate suffixes. Also plays the move.
    ///
    /// It is the callers responsibility to ensure the move is legal.
    pub fn from_move_and_play_unchecked(pos: &mut Position, m: Move) -> SanPlus {
        let san = San::from_move(pos, m);
        pos.make_move_unchecked(m);
        SanPlus {
            san,
            suffix: Suffix::from_position(pos),
        }
    }

    /// Converts a move to Standard Algebraic Notation including possible
    /// check and checkmate suffixes.
    pub fn from_move(pos: &Position, m: Move) -> SanPlus {
        let mut after = pos.clone();
        SanPlus::from_move_and_play_unchecked(&mut after, m)
    }
}

impl FromStr for SanPlus {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<SanPlus, ParseSanError> {
        SanPlus::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for SanPlus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.san)?;
        if let Some(suffix) = self.suffix {
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}
