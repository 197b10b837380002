//! Keyboard-geometry proximity metric.
//!
//! Translated from `TKeyboard` in `AutocompleteUtils.cpp`: a fixed
//! rectangular grid where every key position holds the set of characters
//! typed by pressing it (upper/lower case share a key, the space bar spans
//! several columns). Distance is Manhattan, with diagonal neighbours
//! compressed to 1 — this breaks the triangle inequality on purpose, it's
//! a proximity score calibrated to typing behaviour, not a metric.

const ROWS: usize = 5;
const COLS: usize = 12;
/// Returned for any character pair where either side doesn't appear on the
/// layout.
const UNKNOWN_DISTANCE: u32 = 20;

/// The reference QWERTY-style layout: 5 rows by 12 columns, each cell
/// listing every character reachable from that key.
const REFERENCE_LAYOUT: [[&str; COLS]; ROWS] = [
    ["`~", "1!", "2@", "3#", "4$", "5%", "6^", "7&", "8*", "9(", "0)", "-_"],
    ["", "Qq", "Ww", "Ee", "Rr", "Tt", "Yy", "Uu", "Ii", "Oo", "Pp", "[{"],
    ["", "Aa", "Ss", "Dd", "Ff", "Gg", "Hh", "Jj", "Kk", "Ll", ";:", "'\""],
    ["", "Zz", "Xx", "Cc", "Vv", "Bb", "Nn", "Mm", ",<", ".>", "/?", ""],
    ["", "", "", " ", " ", " ", " ", " ", " ", " ", "", ""],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pos {
    row: u8,
    col: u8,
}

/// Physical key layout used to turn typing into a noisy channel.
///
/// Built once (`Keyboard::default()` for the reference layout, or
/// `Keyboard::from_layout` for another locale) and shared read-only across
/// every query — immutable once built, so it's safe to share across
/// threads without synchronisation.
#[derive(Debug, Clone)]
pub struct Keyboard {
    /// positions[byte as usize] = every key that types that byte
    positions: Vec<Vec<Pos>>,
}

impl Keyboard {
    /// Builds a keyboard from row strings: each row is `COLS` comma-free
    /// cells, one per column, listing every character that key produces
    /// (use `" "` for the spacebar, `""` for a column with no key).
    pub fn from_layout(rows: &[[&str; COLS]]) -> Keyboard {
        let mut positions: Vec<Vec<Pos>> = vec![Vec::new(); 256];
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let pos = Pos {
                    row: row_idx as u8,
                    col: col_idx as u8,
                };
                for c in cell.bytes() {
                    positions[c as usize].push(pos);
                }
            }
        }
        Keyboard { positions }
    }

    /// Minimum keyboard distance between `a` and `b`, or `20` if either is
    /// absent from the layout.
    pub fn distance(&self, a: u8, b: u8) -> u32 {
        let a_positions = &self.positions[a as usize];
        let b_positions = &self.positions[b as usize];
        if a_positions.is_empty() || b_positions.is_empty() {
            return UNKNOWN_DISTANCE;
        }
        let mut best = UNKNOWN_DISTANCE;
        for &p in a_positions {
            for &q in b_positions {
                best = best.min(pos_distance(p, q));
            }
        }
        best
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Keyboard::from_layout(&REFERENCE_LAYOUT)
    }
}

fn pos_distance(p: Pos, q: Pos) -> u32 {
    let row_delta = (p.row as i32 - q.row as i32).unsigned_abs();
    let col_delta = (p.col as i32 - q.col as i32).unsigned_abs();
    let manhattan = row_delta + col_delta;
    if manhattan == 2 && p.row != q.row && p.col != q.col {
        1
    } else {
        manhattan
    }
}
