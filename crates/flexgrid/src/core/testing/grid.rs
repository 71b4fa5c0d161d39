//! Decode terminal output onto a character grid.

use crate::geom::Expanse;

/// The escape character that introduces control sequences.
const ESC: char = '\x1b';

/// A screen model that understands the sequences the engine emits: absolute
/// cursor moves (`ESC[r;cH`) and screen clears (`ESC[2J`). Other CSI
/// sequences, such as colors and cursor visibility, are skipped.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Screen size.
    size: Expanse,
    /// Rows of cells.
    cells: Vec<Vec<char>>,
    /// Cursor row.
    row: usize,
    /// Cursor column.
    col: usize,
    /// Number of characters printed, including ones off screen.
    printed: usize,
}

impl Grid {
    /// A blank grid. Empty cells hold `' '`.
    pub fn new(size: Expanse) -> Self {
        Self {
            size,
            cells: vec![vec![' '; size.w as usize]; size.h as usize],
            row: 0,
            col: 0,
            printed: 0,
        }
    }

    /// Apply a chunk of terminal output.
    pub fn apply(&mut self, s: &str) {
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c != ESC {
                self.put(c);
                continue;
            }
            if chars.peek() != Some(&'[') {
                continue;
            }
            chars.next();
            let mut params = String::new();
            let mut fin = None;
            for p in chars.by_ref() {
                if ('@'..='~').contains(&p) {
                    fin = Some(p);
                    break;
                }
                params.push(p);
            }
            match fin {
                Some('H') => self.move_to(&params),
                Some('J') if params == "2" => self.clear(),
                _ => {}
            }
        }
    }

    /// Handle `ESC[r;cH`.
    fn move_to(&mut self, params: &str) {
        let mut it = params.split(';').map(|p| p.parse::<usize>().unwrap_or(1));
        self.row = it.next().unwrap_or(1).saturating_sub(1);
        self.col = it.next().unwrap_or(1).saturating_sub(1);
    }

    /// Blank every cell.
    fn clear(&mut self) {
        for r in &mut self.cells {
            r.fill(' ');
        }
    }

    /// Print one character at the cursor and advance.
    fn put(&mut self, c: char) {
        if let Some(cell) = self.cells.get_mut(self.row).and_then(|r| r.get_mut(self.col)) {
            *cell = c;
        }
        self.col += 1;
        self.printed += 1;
    }

    /// Screen size.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// Characters printed so far, excluding control sequences.
    pub fn printed(&self) -> usize {
        self.printed
    }

    /// One row as a string. Out-of-range rows are empty.
    pub fn row(&self, i: usize) -> String {
        self.cells.get(i).map(|r| r.iter().collect()).unwrap_or_default()
    }

    /// Every row as a string.
    pub fn rows(&self) -> Vec<String> {
        self.cells.iter().map(|r| r.iter().collect()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_prints_and_clears() {
        let mut g = Grid::new(Expanse::new(4, 2));
        g.apply("\x1b[2;3Hab\x1b[1;1H\x1b[31mx\x1b[0m");
        assert_eq!(g.rows(), vec!["x   ", "  ab"]);
        assert_eq!(g.printed(), 3);
        g.apply("\x1b[?25l\x1b[H\x1b[2J");
        assert_eq!(g.rows(), vec!["    ", "    "]);
    }

    #[test]
    fn writes_past_the_edge_are_dropped() {
        let mut g = Grid::new(Expanse::new(2, 1));
        g.apply("\x1b[1;2Hxyz\x1b[5;1Hq");
        assert_eq!(g.row(0), " x");
        assert_eq!(g.row(3), "");
        assert_eq!(g.printed(), 4);
    }
}
