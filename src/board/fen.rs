use super::attacks::pawn_attacks;
use super::position::Position;
use super::types::*;
use crate::error::{EngineError, Result};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Parses Forsyth-Edwards Notation. Move clocks are accepted but not kept.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(EngineError::fen(fen, "expected at least 4 fields"));
        }

        let mut pieces = [[0u64; 6]; 2];
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(EngineError::fen(fen, "expected 8 ranks"));
        }
        for (i, row) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(d) = c.to_digit(10) {
                    file += d as u8;
                    if file > 8 {
                        return Err(EngineError::fen(fen, format!("rank {} overflows", rank + 1)));
                    }
                    continue;
                }
                let kind = PieceKind::from_char(c).ok_or_else(|| EngineError::fen(fen, format!("bad piece '{c}'")))?;
                if file >= 8 {
                    return Err(EngineError::fen(fen, format!("rank {} overflows", rank + 1)));
                }
                let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                pieces[color.index()][kind.index()] |= bit(rank * 8 + file);
                file += 1;
            }
            if file != 8 {
                return Err(EngineError::fen(fen, format!("rank {} has {file} files", rank + 1)));
            }
        }

        let side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(EngineError::fen(fen, format!("bad side '{other}'"))),
        };

        let mut castling = 0;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                castling |= match c {
                    'K' => WHITE_KINGSIDE,
                    'Q' => WHITE_QUEENSIDE,
                    'k' => BLACK_KINGSIDE,
                    'q' => BLACK_QUEENSIDE,
                    _ => return Err(EngineError::fen(fen, format!("bad castling '{c}'"))),
                };
            }
        }

        let en_passant = match fields[3] {
            "-" => None,
            s => Some(parse_square(s).ok_or_else(|| EngineError::fen(fen, format!("bad en passant '{s}'")))?),
        };

        Position::from_parts(pieces, side, castling, en_passant).map_err(|e| EngineError::fen(fen, e.to_string()))
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(rank * 8 + file) {
                    Some((color, kind)) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        let c = kind.to_char();
                        out.push(if color == Color::White { c.to_ascii_uppercase() } else { c });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push_str(if self.side_to_move() == Color::White { " w " } else { " b " });

        let rights = self.castling();
        if rights == 0 {
            out.push('-');
        }
        for (flag, c) in [(WHITE_KINGSIDE, 'K'), (WHITE_QUEENSIDE, 'Q'), (BLACK_KINGSIDE, 'k'), (BLACK_QUEENSIDE, 'q')] {
            if rights & flag != 0 {
                out.push(c);
            }
        }

        // Only written when a pawn could actually take.
        let side = self.side_to_move();
        match self.en_passant() {
            Some(ep) if pawn_attacks(!side, ep) & self.pieces(side, PieceKind::Pawn) != 0 => {
                out.push(' ');
                out.push_str(&square_name(ep));
            }
            _ => out.push_str(" -"),
        }
        out.push_str(" 0 1");
        out
    }
}
