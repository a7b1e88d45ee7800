use anyhow::Context;
use anyhow::bail;

use crate::grid::Pos;
use crate::rle;

/// A finite set of alive cells, positioned relative to its own top left corner.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pattern {
    name: Option<String>,

    /// Offsets of the alive cells, row-major, without duplicates
    cells: Vec<Pos>,

    rows: usize,
    cols: usize,
}

impl Pattern {
    pub fn from_cells(cells: impl IntoIterator<Item = Pos>) -> Self {
        let mut cells: Vec<Pos> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();

        let rows = cells.iter().map(|p| p.row + 1).max().unwrap_or(0);
        let cols = cells.iter().map(|p| p.col + 1).max().unwrap_or(0);

        Self {
            name: None,
            cells,
            rows,
            cols,
        }
    }

    /// Parse the plaintext format: `.` is a dead cell, `O`, `*` or `#` an alive one. Lines starting
    /// with `!` are comments, and `!Name:` names the pattern.
    ///
    /// See: https://conwaylife.com/wiki/Plaintext
    pub fn from_plaintext(text: &str) -> anyhow::Result<Self> {
        let mut name = None;
        let mut cells = Vec::new();
        let (mut row, mut cols) = (0, 0);

        for (n, line) in text.lines().enumerate() {
            if let Some(comment) = line.strip_prefix('!') {
                if let Some(value) = comment.strip_prefix("Name:") {
                    name = Some(value.trim().to_string());
                }

                continue;
            }

            let line = line.trim_end();
            cols = cols.max(line.chars().count());

            for (col, c) in line.chars().enumerate() {
                match c {
                    '.' => {}
                    'O' | '*' | '#' => cells.push(Pos::new(row, col)),
                    c => bail!("Unrecognized character '{c}' on line {}", n + 1),
                }
            }

            row += 1;
        }

        let mut pattern = Self::from_cells(cells);
        pattern.name = name;
        pattern.rows = pattern.rows.max(row);
        pattern.cols = pattern.cols.max(cols);

        Ok(pattern)
    }

    /// Parse a pattern in the RLE format.
    pub fn from_rle(bytes: &[u8]) -> anyhow::Result<Self> {
        let mut cells = Vec::new();
        let file = rle::read_rle(bytes, |row, col| cells.push(Pos::new(row, col)))?;

        let mut pattern = Self::from_cells(cells);
        pattern.name = file.name.map(|n| String::from_utf8_lossy(n).into_owned());

        if let Some((width, height)) = file.size {
            pattern.cols = pattern.cols.max(width);
            pattern.rows = pattern.rows.max(height);
        }

        Ok(pattern)
    }

    /// Parse either format, RLE being recognized by its header line.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let is_rle_comment =
            |l: &str| l.starts_with('#') && l[1..].starts_with(['C', 'c', 'N', 'O', 'P', 'R', 'r']);

        let is_rle = text
            .lines()
            .map(str::trim_start)
            .find(|l| !l.is_empty() && !is_rle_comment(l))
            .is_some_and(|l| l.starts_with(['x', 'X']));

        if is_rle {
            Self::from_rle(text.as_bytes()).context("Failed to parse RLE pattern")
        } else {
            Self::from_plaintext(text).context("Failed to parse plaintext pattern")
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn cells(&self) -> &[Pos] {
        &self.cells
    }

    /// Height of the bounding box
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Width of the bounding box
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Origin that centers the pattern on a `rows` by `cols` grid, if it fits.
    pub fn centered_origin(&self, rows: usize, cols: usize) -> Option<Pos> {
        let row = rows.checked_sub(self.rows)? / 2;
        let col = cols.checked_sub(self.cols)? / 2;

        Some(Pos::new(row, col))
    }
}
