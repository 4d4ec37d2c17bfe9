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

//! Parse and write Forsyth-Edwards-Notation.
//!
//! # Examples
//!
//! ```
//! use chess_rules::{Position, Square};
//!
//! let pos = Position::from_fen("r1bqkbnr/ppp2Qpp/2np4/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")?;
//! assert!(pos.is_checkmate());
//! assert_eq!(pos.board().piece_at(Square::F7).map(|p| p.char()), Some('Q'));
//! # Ok::<_, chess_rules::ParseFenError>(())
//! ```
//!
//! Castling rights are written in X-FEN style: `KQkq` when the right
//! belongs to the outermost rook on that side, otherwise the file letter of
//! the rook. Shredder-FEN letters are accepted when parsing.

use std::{error::Error, fmt, num::NonZeroU32, str::FromStr};

use crate::{
    bitboard::Bitboard,
    board::Board,
    color::Color,
    position::Position,
    square::{File, Rank, Square},
    types::{CastlingMode, EnPassantMode, Piece},
};

/// The part of a FEN that failed to parse.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FenField {
    Board,
    Turn,
    Castling,
    EnPassant,
    HalfmoveClock,
    FullmoveNumber,
    /// Too few or too many fields.
    FieldCount,
}

impl fmt::Display for FenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FenField::Board => "board",
            FenField::Turn => "turn",
            FenField::Castling => "castling",
            FenField::EnPassant => "en passant",
            FenField::HalfmoveClock => "halfmove clock",
            FenField::FullmoveNumber => "fullmove number",
            FenField::FieldCount => "field count",
        })
    }
}

/// Error when parsing a FEN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseFenError {
    field: FenField,
}

impl ParseFenError {
    pub fn field(&self) -> FenField {
        self.field
    }
}

impl From<FenField> for ParseFenError {
    fn from(field: FenField) -> ParseFenError {
        ParseFenError { field }
    }
}

impl fmt::Display for ParseFenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fen: {}", self.field)
    }
}

impl Error for ParseFenError {}

impl Board {
    /// Parses the board part of a FEN, such as
    /// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
    ///
    /// # Errors
    ///
    /// Fails unless there are exactly 8 ranks, each describing exactly 8
    /// squares without consecutive digits.
    pub fn from_board_fen(board_fen: &str) -> Result<Board, ParseFenError> {
        let mut board = Board::empty();
        let mut ranks = 0;

        for (i, rank_fen) in board_fen.split('/').enumerate() {
            let rank = Rank::ALL
                .get(7usize.checked_sub(i).ok_or(FenField::Board)?)
                .copied()
                .ok_or(FenField::Board)?;
            let mut file = 0;
            let mut prev_digit = false;

            for ch in rank_fen.chars() {
                if let Some(empty) = ch.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    if prev_digit {
                        return Err(FenField::Board.into());
                    }
                    prev_digit = true;
                    file += empty;
                } else {
                    prev_digit = false;
                    let piece = Piece::from_char(ch).ok_or(FenField::Board)?;
                    if file >= 8 {
                        return Err(FenField::Board.into());
                    }
                    board.set_piece_at(Square::from_coords(File::new(file), rank), piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(FenField::Board.into());
                }
            }

            if file != 8 {
                return Err(FenField::Board.into());
            }
            ranks += 1;
        }

        if ranks == 8 {
            Ok(board)
        } else {
            Err(FenField::Board.into())
        }
    }

    /// Writes the board part of a FEN.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::Board;
    ///
    /// assert_eq!(Board::new().board_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
    /// ```
    pub fn board_fen(&self) -> String {
        let mut fen = String::with_capacity(64);

        for rank in Rank::ALL.into_iter().rev() {
            let mut empty = 0;
            for file in File::ALL {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > Rank::First {
                fen.push('/');
            }
        }

        fen
    }
}

/// The rook a castling letter refers to. `K` and `Q` select the outermost
/// rook on that side, or the corner if there is no rook at all.
fn castling_rook(board: &Board, color: Color, flag: char) -> Option<Square> {
    let candidates = board.by_piece(color.rook()) & Bitboard::from_rank(color.backrank());
    match flag {
        'k' => Some(
            candidates
                .last()
                .unwrap_or(Square::from_coords(File::H, color.backrank())),
        ),
        'q' => Some(
            candidates
                .first()
                .unwrap_or(Square::from_coords(File::A, color.backrank())),
        ),
        file => File::from_char(file).map(|file| Square::from_coords(file, color.backrank())),
    }
}

fn parse_castling(board: &Board, castling: &str) -> Result<Bitboard, ParseFenError> {
    let mut rights = Bitboard::EMPTY;
    if castling == "-" {
        return Ok(rights);
    }
    for ch in castling.chars() {
        let color = Color::from_white(ch.is_ascii_uppercase());
        let rook = castling_rook(board, color, ch.to_ascii_lowercase()).ok_or(FenField::Castling)?;
        rights.add(rook);
    }
    Ok(rights)
}

fn write_castling(board: &Board, castling_rights: Bitboard, fen: &mut String) {
    let len = fen.len();
    for color in [Color::White, Color::Black] {
        let backrank = Bitboard::from_rank(color.backrank());
        for rook in (castling_rights & backrank).into_iter().rev() {
            let ch = if castling_rook(board, color, 'k') == Some(rook) {
                'k'
            } else if castling_rook(board, color, 'q') == Some(rook) {
                'q'
            } else {
                rook.file().char()
            };
            fen.push(if color.is_white() {
                ch.to_ascii_uppercase()
            } else {
                ch
            });
        }
    }
    if fen.len() == len {
        fen.push('-');
    }
}

fn parse_clock(field: &str, which: FenField) -> Result<u32, ParseFenError> {
    btoi::btou(field.as_bytes()).map_err(|_| which.into())
}

impl Position {
    /// Parses a FEN with all six fields.
    ///
    /// The position is not validated. Use [`Position::status()`] to check
    /// that it could arise in a game.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] naming the first field that is malformed.
    pub fn from_fen(fen: &str) -> Result<Position, ParseFenError> {
        Position::from_fen_with_mode(fen, CastlingMode::Standard)
    }

    /// Parses a FEN and sets the given [`CastlingMode`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] naming the first field that is malformed.
    pub fn from_fen_with_mode(fen: &str, mode: CastlingMode) -> Result<Position, ParseFenError> {
        let fields: Vec<&str> = fen.split_ascii_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenField::FieldCount.into());
        }
        let mut pos = Position::parse_fields(&fields)?;
        pos.castling_mode = mode;
        Ok(pos)
    }

    /// Parses an EPD: board, turn, castling and en passant, optionally
    /// followed by the halfmove clock and fullmove number.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] naming the first field that is malformed.
    pub fn from_epd(epd: &str) -> Result<Position, ParseFenError> {
        let fields: Vec<&str> = epd.split_ascii_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenField::FieldCount.into());
        }
        Position::parse_fields(&fields)
    }

    fn parse_fields(fields: &[&str]) -> Result<Position, ParseFenError> {
        let board = Board::from_board_fen(fields[0])?;

        let turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenField::Turn.into()),
        };

        let castling_rights = parse_castling(&board, fields[2])?;

        let ep_square = match fields[3] {
            "-" => None,
            ep => Some(ep.parse::<Square>().map_err(|_| FenField::EnPassant)?),
        };

        let halfmoves = match fields.get(4) {
            Some(field) => parse_clock(field, FenField::HalfmoveClock)?,
            None => 0,
        };

        let fullmoves = match fields.get(5) {
            Some(field) => NonZeroU32::new(parse_clock(field, FenField::FullmoveNumber)?)
                .ok_or(FenField::FullmoveNumber)?,
            None => NonZeroU32::MIN,
        };

        Ok(Position {
            board,
            turn,
            castling_rights,
            ep_square,
            halfmoves,
            fullmoves,
            ..Position::empty()
        })
    }

    /// The board part of the FEN.
    pub fn board_fen(&self) -> String {
        self.board.board_fen()
    }

    /// Writes the FEN, including any en passant square that is set.
    ///
    /// `Position::from_fen(&pos.fen())` gives back an equal position.
    pub fn fen(&self) -> String {
        self.fen_with(EnPassantMode::Always)
    }

    /// Writes the FEN, with the en passant square according to `mode`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::{EnPassantMode, Move, Position, Square};
    ///
    /// let mut pos = Position::new();
    /// pos.make_move(Move::new(Square::E2, Square::E4))?;
    /// assert_eq!(
    ///     pos.fen_with(EnPassantMode::Legal),
    ///     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
    /// );
    /// # Ok::<_, chess_rules::PlayError>(())
    /// ```
    pub fn fen_with(&self, mode: EnPassantMode) -> String {
        let mut fen = self.epd_with(mode);
        fen.push(' ');
        fen.push_str(&self.halfmoves.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmoves.to_string());
        fen
    }

    /// Writes the first four fields of the FEN.
    pub fn epd(&self) -> String {
        self.epd_with(EnPassantMode::Always)
    }

    fn epd_with(&self, mode: EnPassantMode) -> String {
        let mut fen = self.board.board_fen();
        fen.push(' ');
        fen.push(self.turn.char());
        fen.push(' ');
        write_castling(&self.board, self.castling_rights, &mut fen);
        fen.push(' ');
        let ep_square = match mode {
            EnPassantMode::Always => self.ep_square,
            EnPassantMode::Legal => self.legal_ep_square(),
        };
        match ep_square {
            Some(ep) => fen.push_str(&ep.to_string()),
            None => fen.push('-'),
        }
        fen
    }
}

impl FromStr for Position {
    type Err = ParseFenError;

    fn from_str(fen: &str) -> Result<Position, ParseFenError> {
        Position::from_fen(fen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(fen: &str) -> Option<FenField> {
        Position::from_fen(fen).err().map(|err| err.field())
    }

    #[test]
    fn test_start_position() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let pos = Position::from_fen(start).expect("valid fen");
        assert_eq!(pos, Position::new());
        assert_eq!(pos.fen(), start);
        assert_eq!(Position::new().epd(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
    }

    #[test]
    fn test_round_trip() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "4k3/8/8/8/8/8/8/4K3 b - e3 12 40",
            "1r2k1r1/8/8/8/8/8/8/R1K2R2 w KQkq - 0 1",
            "4k3/8/8/8/8/8/8/RR2K2R w KB - 5 9",
        ] {
            assert_eq!(Position::from_fen(fen).expect("valid fen").fen(), fen);
        }
    }

    #[test]
    fn test_castling_letters() {
        let pos = Position::from_fen("rk2r3/8/8/8/8/8/8/1R2K2R w KQq - 0 1").expect("valid fen");
        assert_eq!(
            pos.castling_rights(),
            Bitboard::from(Square::B1) | Square::H1 | Square::A8
        );

        // Shredder letters for the outermost rooks are written as KQkq.
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w HAha - 0 1").expect("valid fen");
        assert_eq!(pos.castling_rights(), Bitboard::CORNERS);
        assert_eq!(pos.fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");

        // Inner rook needs its file letter.
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/RR2K3 w B - 0 1").expect("valid fen");
        assert_eq!(pos.castling_rights(), Bitboard::from(Square::B1));
        assert_eq!(pos.fen(), "4k3/8/8/8/8/8/8/RR2K3 w B - 0 1");
    }

    #[test]
    fn test_errors() {
        assert_eq!(field("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"), Some(FenField::FieldCount));
        assert_eq!(field("8/8/8/8/8/8/8 w - - 0 1"), Some(FenField::Board));
        assert_eq!(field("8/8/8/8/8/8/8/8/8 w - - 0 1"), Some(FenField::Board));
        assert_eq!(field("9/8/8/8/8/8/8/8 w - - 0 1"), Some(FenField::Board));
        assert_eq!(field("44/8/8/8/8/8/8/8 w - - 0 1"), Some(FenField::Board));
        assert_eq!(field("7/8/8/8/8/8/8/8 w - - 0 1"), Some(FenField::Board));
        assert_eq!(field("ppppppppp/8/8/8/8/8/8/8 w - - 0 1"), Some(FenField::Board));
        assert_eq!(field("x7/8/8/8/8/8/8/8 w - - 0 1"), Some(FenField::Board));
        assert_eq!(field("8/8/8/8/8/8/8/8 x - - 0 1"), Some(FenField::Turn));
        assert_eq!(field("8/8/8/8/8/8/8/8 w X - 0 1"), Some(FenField::Castling));
        assert_eq!(field("8/8/8/8/8/8/8/8 w - e9 0 1"), Some(FenField::EnPassant));
        assert_eq!(field("8/8/8/8/8/8/8/8 w - - -1 1"), Some(FenField::HalfmoveClock));
        assert_eq!(field("8/8/8/8/8/8/8/8 w - - 0 0"), Some(FenField::FullmoveNumber));
        assert_eq!(field("8/8/8/8/8/8/8/8 w - - 0 x"), Some(FenField::FullmoveNumber));
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 x")
                .expect_err("invalid")
                .to_string(),
            "invalid fen: fullmove number"
        );
    }

    #[test]
    fn test_epd() {
        let pos = Position::from_epd("4k3/8/8/8/8/8/8/4K2R w K -").expect("valid epd");
        assert_eq!(pos.halfmoves(), 0);
        assert_eq!(pos.fullmoves().get(), 1);
        assert_eq!(pos.epd(), "4k3/8/8/8/8/8/8/4K2R w K -");

        let pos = Position::from_epd("4k3/8/8/8/8/8/8/4K2R w K - 3 7").expect("valid epd");
        assert_eq!(pos.fullmoves().get(), 7);
        assert!(Position::from_epd("4k3/8/8/8/8/8/8/4K2R w K").is_err());
    }

    #[test]
    fn test_ep_modes() {
        let pos = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").expect("valid fen");
        assert_eq!(pos.fen(), "4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1");
        assert_eq!(pos.fen_with(EnPassantMode::Legal), "4k3/8/8/8/4P3/8/8/4K3 b - - 0 1");

        let pos = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").expect("valid fen");
        assert_eq!(pos.fen_with(EnPassantMode::Legal), "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1");
    }

    #[test]
    fn test_from_str() {
        let pos: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().expect("valid fen");
        assert_eq!(pos.board().occupied().count(), 2);
        assert_eq!(pos.castling_mode(), CastlingMode::Standard);

        let pos = Position::from_fen_with_mode("4k3/8/8/8/8/8/8/4K3 w - - 0 1", CastlingMode::Chess960)
            .expect("valid fen");
        assert!(pos.castling_mode().is_chess960());
    }
}
