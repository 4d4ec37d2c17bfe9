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

//! A chess rules engine: position representation, legal move generation
//! and game state classification.
//!
//! # Examples
//!
//! Generate legal moves in the starting position:
//!
//! ```
//! use chess_rules::Position;
//!
//! let pos = Position::new();
//! let legals = pos.legal_moves();
//! assert_eq!(legals.len(), 20);
//! ```
//!
//! Play moves and take them back:
//!
//! ```
//! use chess_rules::{Move, Position, Square};
//!
//! let mut pos = Position::new();
//!
//! // 1. e4
//! pos.make_move(Move::new(Square::E2, Square::E4))?;
//! assert_eq!(pos.ep_square(), Some(Square::E3));
//!
//! assert_eq!(pos.pop(), Some(Move::new(Square::E2, Square::E4)));
//! assert_eq!(pos, Position::new());
//! # Ok::<_, chess_rules::PlayError>(())
//! ```
//!
//! Detect game end conditions:
//!
//! ```
//! use chess_rules::{Color, Position, Termination};
//!
//! let mut pos = Position::new();
//! for san in ["f3", "e5", "g4", "Qh4#"] {
//!     pos.push_san(san)?;
//! }
//!
//! assert!(pos.is_checkmate());
//! let outcome = pos.outcome(false).expect("game over");
//! assert_eq!(outcome.termination, Termination::Checkmate);
//! assert_eq!(outcome.winner, Some(Color::Black));
//! # Ok::<_, chess_rules::san::SanError>(())
//! ```
//!
//! Also supports [FEN](fen), [SAN](san) and [UCI](uci) formats for
//! positions and moves, both in standard chess and Chess960.
//!
//! # Feature flags
//!
//! * `serde`: Implements [`serde::Serialize`](https://docs.rs/serde/1/serde/trait.Serialize.html)
//!   and [`serde::Deserialize`](https://docs.rs/serde/1/serde/trait.Deserialize.html) for
//!   types with unique natural representations.
//! * `nohash-hasher`: Implements
//!   [`nohash_hasher::IsEnabled`](https://docs.rs/nohash-hasher/0.2/nohash_hasher/trait.IsEnabled.html)
//!   for sensible types.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]

#[macro_use]
mod util;
mod castling_side;
mod color;
mod m;
mod movegen;
mod outcome;
mod position;
mod role;
mod square;
mod types;

pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod fen;
pub mod perft;
pub mod san;
pub mod uci;
pub mod zobrist;

pub use bitboard::Bitboard;
pub use board::Board;
pub use castling_side::CastlingSide;
pub use color::{ByColor, Color, ParseColorError};
pub use fen::{FenField, ParseFenError};
pub use m::{Move, MoveList};
pub use outcome::{Outcome, Termination};
pub use position::{KingMissingError, PlayError, Position, PositionError, PositionErrorKinds};
pub use role::{ByRole, Role};
pub use square::{File, ParseSquareError, Rank, Square};
pub use types::{CastlingMode, EnPassantMode, ParsePieceError, Piece};

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for File {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Rank {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Square {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Role {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Color {}
