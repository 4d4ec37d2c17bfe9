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

use std::fmt::{self, Write as _};

use arrayvec::ArrayVec;

use crate::{role::Role, square::Square};

/// A move, given by origin and target square.
///
/// Castling is encoded according to the
/// [`CastlingMode`](crate::CastlingMode) of the position that produced it:
/// the king moving two squares (`e1g1`) in standard chess, or the king
/// moving onto its own rook (`e1h1`) in Chess960.
///
/// `drop` is reserved for variants with piece drops and is never set by
/// standard move generation.
///
/// # Display
///
/// `Move` implements [`Display`](fmt::Display) using UCI notation. If a
/// position is available for context, [SAN](crate::san) is more common for
/// human interfaces.
///
/// # Examples
///
/// ```
/// use chess_rules::{Move, Role, Square};
///
/// let m = Move::new(Square::E7, Square::E8).with_promotion(Role::Queen);
/// assert_eq!(m.to_string(), "e7e8q");
/// assert_eq!(Move::NULL.to_string(), "0000");
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    pub drop: Option<Role>,
}

impl Move {
    /// The null move, passing the turn to the opponent.
    pub const NULL: Move = Move {
        from: Square::A1,
        to: Square::A1,
        promotion: None,
        drop: None,
    };

    #[inline]
    pub const fn new(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
            drop: None,
        }
    }

    /// A drop of a piece from the hand onto `to`.
    #[inline]
    pub const fn new_drop(role: Role, to: Square) -> Move {
        Move {
            from: to,
            to,
            promotion: None,
            drop: Some(role),
        }
    }

    #[must_use]
    #[inline]
    pub const fn with_promotion(self, role: Role) -> Move {
        Move {
            promotion: Some(role),
            ..self
        }
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.from as u8 == self.to as u8 && self.drop.is_none() && self.promotion.is_none()
    }

    #[inline]
    pub const fn is_drop(self) -> bool {
        self.drop.is_some()
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion.is_some()
    }

    /// Mirrors both squares vertically.
    #[must_use]
    pub const fn to_mirrored(self) -> Move {
        Move {
            from: self.from.flip_vertical(),
            to: self.to.flip_vertical(),
            ..self
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(role) = self.drop {
            write!(f, "{}@{}", role.upper_char(), self.to)
        } else if self.is_null() {
            f.write_str("0000")
        } else {
            write!(f, "{}{}", self.from, self.to)?;
            if let Some(promotion) = self.promotion {
                f.write_char(promotion.char())?;
            }
            Ok(())
        }
    }
}

/// A container for moves that can be stored inline on the stack.
///
/// No piece has more than 27 moves from a single square (a queen in the
/// center, or a pawn with 3 promoting targets and 4 promotion roles), so
/// the capacity covers the pseudo-legal moves of any board, even one that
/// does not pass [`Position::validate()`](crate::Position::validate).
///
/// # Example
///
/// ```
/// use chess_rules::{Position, Role};
///
/// let pos = Position::new();
/// let mut moves = pos.legal_moves();
/// moves.retain(|m| pos.board().role_at(m.from) == Some(Role::Pawn));
/// assert_eq!(moves.len(), 16);
/// ```
pub type MoveList = ArrayVec<Move, { 64 * 27 }>;

#[cfg(feature = "serde")]
impl serde::Serialize for Move {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Move {
    fn deserialize<D>(deserializer: D) -> Result<Move, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let uci = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Move::from_uci(&uci).map_err(serde::de::Error::custom)
    }
}
