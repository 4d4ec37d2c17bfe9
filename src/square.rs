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

use std::{error::Error, fmt, str::FromStr};

use crate::color::Color;

/// A file of the chessboard.
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    /// Gets a `File` from an integer index.
    ///
    /// # Panics
    ///
    /// Panics if the index is not in the range `0..=7`.
    #[track_caller]
    #[inline]
    pub const fn new(index: u32) -> File {
        assert!(index < 8);
        File::ALL[index as usize]
    }

    #[inline]
    pub const fn from_char(ch: char) -> Option<File> {
        match ch {
            'a'..='h' => Some(File::ALL[ch as usize - 'a' as usize]),
            _ => None,
        }
    }

    #[inline]
    pub const fn char(self) -> char {
        (b'a' + self as u8) as char
    }

    #[inline]
    pub const fn upper_char(self) -> char {
        (b'A' + self as u8) as char
    }

    #[inline]
    pub const fn distance(self, other: File) -> u32 {
        (self as u32).abs_diff(other as u32)
    }

    #[must_use]
    #[inline]
    pub const fn offset(self, delta: i32) -> Option<File> {
        let index = self as i32 + delta;
        if 0 <= index && index < 8 {
            Some(File::ALL[index as usize])
        } else {
            None
        }
    }

    /// `A`, ..., `H`.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

from_enum_as_int_impl! { File, u8 i8 u16 i16 u32 i32 u64 i64 usize isize }
try_from_int_impl! { File, 0, 8, u8 i8 u16 i16 u32 i32 u64 i64 usize isize }

/// A rank of the chessboard.
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    First = 0,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
}

impl Rank {
    /// Gets a `Rank` from an integer index.
    ///
    /// # Panics
    ///
    /// Panics if the index is not in the range `0..=7`.
    #[track_caller]
    #[inline]
    pub const fn new(index: u32) -> Rank {
        assert!(index < 8);
        Rank::ALL[index as usize]
    }

    #[inline]
    pub const fn from_char(ch: char) -> Option<Rank> {
        match ch {
            '1'..='8' => Some(Rank::ALL[ch as usize - '1' as usize]),
            _ => None,
        }
    }

    #[inline]
    pub const fn char(self) -> char {
        (b'1' + self as u8) as char
    }

    #[must_use]
    #[inline]
    pub const fn flip_vertical(self) -> Rank {
        Rank::ALL[7 - self as usize]
    }

    /// The rank as seen from the given side, i.e. `Rank::First` is the
    /// backrank of `color`.
    #[must_use]
    #[inline]
    pub const fn relative_to(self, color: Color) -> Rank {
        match color {
            Color::White => self,
            Color::Black => self.flip_vertical(),
        }
    }

    #[inline]
    pub const fn distance(self, other: Rank) -> u32 {
        (self as u32).abs_diff(other as u32)
    }

    #[must_use]
    #[inline]
    pub const fn offset(self, delta: i32) -> Option<Rank> {
        let index = self as i32 + delta;
        if 0 <= index && index < 8 {
            Some(Rank::ALL[index as usize])
        } else {
            None
        }
    }

    /// `First`, ..., `Eighth`.
    pub const ALL: [Rank; 8] = [
        Rank::First,
        Rank::Second,
        Rank::Third,
        Rank::Fourth,
        Rank::Fifth,
        Rank::Sixth,
        Rank::Seventh,
        Rank::Eighth,
    ];
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

from_enum_as_int_impl! { Rank, u8 i8 u16 i16 u32 i32 u64 i64 usize isize }
try_from_int_impl! { Rank, 0, 8, u8 i8 u16 i16 u32 i32 u64 i64 usize isize }

/// Error when parsing an invalid square name or coordinates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSquareError;

impl fmt::Display for ParseSquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid square")
    }
}

impl Error for ParseSquareError {}

/// A square of the chessboard.
///
/// Squares are indexed `rank * 8 + file`, so that `A1` is 0, `H1` is 7 and
/// `H8` is 63. There is no "no square" value: absence is expressed as
/// `Option<Square>`.
#[rustfmt::skip]
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[repr(u8)]
pub enum Square {
    A1 = 0, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Gets a `Square` from an integer index.
    ///
    /// # Panics
    ///
    /// Panics if the index is not in the range `0..=63`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::Square;
    ///
    /// assert_eq!(Square::new(0), Square::A1);
    /// assert_eq!(Square::new(63), Square::H8);
    /// ```
    #[track_caller]
    #[inline]
    pub const fn new(index: u32) -> Square {
        assert!(index < 64);
        Square::ALL[index as usize]
    }

    /// Combines a [`File`] and [`Rank`] into a square.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::{File, Rank, Square};
    ///
    /// assert_eq!(Square::from_coords(File::E, Rank::Fourth), Square::E4);
    /// ```
    #[inline]
    pub const fn from_coords(file: File, rank: Rank) -> Square {
        Square::ALL[file as usize | ((rank as usize) << 3)]
    }

    /// Combines untyped file and rank indexes into a square.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSquareError`] if `file` or `rank` is not in `0..=7`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::Square;
    ///
    /// assert_eq!(Square::try_from_coords(4, 3), Ok(Square::E4));
    /// assert!(Square::try_from_coords(8, 0).is_err());
    /// ```
    pub const fn try_from_coords(file: u32, rank: u32) -> Result<Square, ParseSquareError> {
        if file < 8 && rank < 8 {
            Ok(Square::from_coords(File::new(file), Rank::new(rank)))
        } else {
            Err(ParseSquareError)
        }
    }

    /// Parses a square name like `e4`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSquareError`] if the input is not exactly a file
    /// letter `a`-`h` followed by a rank digit `1`-`8`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::Square;
    ///
    /// assert_eq!(Square::from_ascii(b"e4"), Ok(Square::E4));
    /// assert!(Square::from_ascii(b"i9").is_err());
    /// ```
    pub const fn from_ascii(s: &[u8]) -> Result<Square, ParseSquareError> {
        if s.len() != 2 {
            return Err(ParseSquareError);
        }
        match (File::from_char(s[0] as char), Rank::from_char(s[1] as char)) {
            (Some(file), Some(rank)) => Ok(Square::from_coords(file, rank)),
            _ => Err(ParseSquareError),
        }
    }

    #[inline]
    pub const fn file(self) -> File {
        File::new(self as u32 & 7)
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::new(self as u32 >> 3)
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn to_usize(self) -> usize {
        self as usize
    }

    /// Moves the square by an index delta, without regard for wrapping
    /// around the edge of the board.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::Square;
    ///
    /// assert_eq!(Square::E2.offset(16), Some(Square::E4));
    /// assert_eq!(Square::H8.offset(1), None);
    /// ```
    #[must_use]
    #[inline]
    pub const fn offset(self, delta: i32) -> Option<Square> {
        let index = self as i32 + delta;
        if 0 <= index && index < 64 {
            Some(Square::ALL[index as usize])
        } else {
            None
        }
    }

    /// Bitwise XOR of the square indexes.
    #[must_use]
    #[inline]
    pub const fn xor(self, other: Square) -> Square {
        Square::ALL[(self as usize) ^ (other as usize)]
    }

    /// Mirrors the square over the horizontal axis, i.e. flips the rank.
    ///
    /// ```
    /// use chess_rules::Square;
    ///
    /// assert_eq!(Square::H1.flip_vertical(), Square::H8);
    /// assert_eq!(Square::D3.flip_vertical(), Square::D6);
    /// ```
    #[must_use]
    #[inline]
    pub const fn flip_vertical(self) -> Square {
        self.xor(Square::A8)
    }

    /// The square as seen from the given side.
    #[must_use]
    #[inline]
    pub const fn relative_to(self, color: Color) -> Square {
        match color {
            Color::White => self,
            Color::Black => self.flip_vertical(),
        }
    }

    /// Tests whether the square is a light square.
    ///
    /// ```
    /// use chess_rules::Square;
    ///
    /// assert!(Square::D1.is_light());
    /// assert!(!Square::D8.is_light());
    /// ```
    #[inline]
    pub const fn is_light(self) -> bool {
        (self.rank() as u8 + self.file() as u8) % 2 == 1
    }

    #[inline]
    pub const fn is_dark(self) -> bool {
        !self.is_light()
    }

    /// The distance between the two squares, i.e. the number of king steps
    /// to get from one square to the other (Chebyshev distance).
    ///
    /// ```
    /// use chess_rules::Square;
    ///
    /// assert_eq!(Square::A2.distance(Square::B5), 3);
    /// ```
    pub const fn distance(self, other: Square) -> u32 {
        let files = self.file().distance(other.file());
        let ranks = self.rank().distance(other.rank());
        if files > ranks {
            files
        } else {
            ranks
        }
    }

    /// All 64 squares, `A1` first.
    #[rustfmt::skip]
    pub const ALL: [Square; 64] = [
        Square::A1, Square::B1, Square::C1, Square::D1, Square::E1, Square::F1, Square::G1, Square::H1,
        Square::A2, Square::B2, Square::C2, Square::D2, Square::E2, Square::F2, Square::G2, Square::H2,
        Square::A3, Square::B3, Square::C3, Square::D3, Square::E3, Square::F3, Square::G3, Square::H3,
        Square::A4, Square::B4, Square::C4, Square::D4, Square::E4, Square::F4, Square::G4, Square::H4,
        Square::A5, Square::B5, Square::C5, Square::D5, Square::E5, Square::F5, Square::G5, Square::H5,
        Square::A6, Square::B6, Square::C6, Square::D6, Square::E6, Square::F6, Square::G6, Square::H6,
        Square::A7, Square::B7, Square::C7, Square::D7, Square::E7, Square::F7, Square::G7, Square::H7,
        Square::A8, Square::B8, Square::C8, Square::D8, Square::E8, Square::F8, Square::G8, Square::H8,
    ];
}

from_enum_as_int_impl! { Square, u8 i8 u16 i16 u32 i32 u64 i64 usize isize }
try_from_int_impl! { Square, 0, 64, u8 i8 u16 i16 u32 i32 u64 i64 usize isize }

impl From<(File, Rank)> for Square {
    #[inline]
    fn from((file, rank): (File, Rank)) -> Square {
        Square::from_coords(file, rank)
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Square, ParseSquareError> {
        Square::from_ascii(s.as_bytes())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file().char(), self.rank().char())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Square {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Square {
    fn deserialize<D>(deserializer: D) -> Result<Square, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SquareVisitor;

        impl serde::de::Visitor<'_> for SquareVisitor {
            type Value = Square;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("square name")
            }

            fn visit_str<E>(self, value: &str) -> Result<Square, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(SquareVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square() {
        for file in File::ALL {
            for rank in Rank::ALL {
                let square = Square::from_coords(file, rank);
                assert_eq!(square.file(), file);
                assert_eq!(square.rank(), rank);
            }
        }
    }

    #[test]
    fn test_index() {
        assert_eq!(u32::from(Square::E4), 28);
        assert_eq!(Square::try_from(28u8), Ok(Square::E4));
        assert!(Square::try_from(64u32).is_err());
        assert!(Square::try_from(-1i32).is_err());
    }

    #[test]
    fn test_names() {
        for square in Square::ALL {
            assert_eq!(square.to_string().parse::<Square>(), Ok(square));
        }
        assert_eq!("a1".parse::<Square>(), Ok(Square::A1));
        assert_eq!("h8".parse::<Square>(), Ok(Square::H8));
        assert!("".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!("a0".parse::<Square>().is_err());
        assert!("A1".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
    }

    #[test]
    fn test_coords() {
        assert_eq!(Square::try_from_coords(0, 0), Ok(Square::A1));
        assert_eq!(Square::try_from_coords(7, 7), Ok(Square::H8));
        assert_eq!(Square::try_from_coords(0, 8), Err(ParseSquareError));
    }

    #[test]
    fn test_distance() {
        assert_eq!(Square::D2.distance(Square::G3), 3);
        assert_eq!(Square::A1.distance(Square::H8), 7);
        assert_eq!(Square::E4.distance(Square::E4), 0);
    }

    #[test]
    fn test_mirror() {
        for square in Square::ALL {
            assert_eq!(square.flip_vertical().flip_vertical(), square);
            assert_eq!(square.flip_vertical().file(), square.file());
        }
        assert_eq!(Square::E2.relative_to(Color::Black), Square::E7);
    }

    #[test]
    fn test_colors() {
        assert!(Square::A1.is_dark());
        assert!(Square::H1.is_light());
        assert!(Square::H8.is_dark());
    }
}
