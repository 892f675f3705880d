use serde::{Deserialize, Serialize};

/// Physical key matrix dimensions
pub const ROWS: u8 = 4;
pub const COLS: u8 = 16;

/// Simulation grid the shipped layouts map into
pub const GRID_WIDTH: usize = 20;
pub const GRID_HEIGHT: usize = 8;

/// Translates a physical (row, col) into a row-major grid position.
///
/// Callers must reject `row >= rows()` or `col >= cols()` before asking;
/// implementations do not bounds-check.
pub trait CoordinateMapper {
    fn rows(&self) -> u8;
    fn cols(&self) -> u8;
    fn position(&self, row: u8, col: u8) -> usize;

    fn contains(&self, row: u8, col: u8) -> bool {
        row < self.rows() && col < self.cols()
    }
}

const fn pos(x: u16, y: u16) -> u16 {
    y * GRID_WIDTH as u16 + x
}

// Split halves, thumb arcs curving toward the centre, palm keys below.
// Column 6 and 9 are the inner columns, 7 and 8 the thumb keys.
const MODEL01_TABLE: [[u16; COLS as usize]; ROWS as usize] = [
    [
        pos(1, 1), pos(2, 1), pos(3, 1), pos(4, 1), pos(5, 1), pos(6, 1), pos(7, 1),
        pos(6, 5), pos(13, 5),
        pos(12, 1), pos(13, 1), pos(14, 1), pos(15, 1), pos(16, 1), pos(17, 1), pos(18, 1),
    ],
    [
        pos(1, 2), pos(2, 2), pos(3, 2), pos(4, 2), pos(5, 2), pos(6, 2), pos(7, 2),
        pos(7, 5), pos(12, 5),
        pos(12, 2), pos(13, 2), pos(14, 2), pos(15, 2), pos(16, 2), pos(17, 2), pos(18, 2),
    ],
    [
        pos(1, 3), pos(2, 3), pos(3, 3), pos(4, 3), pos(5, 3), pos(6, 3), pos(7, 3),
        pos(8, 6), pos(11, 6),
        pos(12, 3), pos(13, 3), pos(14, 3), pos(15, 3), pos(16, 3), pos(17, 3), pos(18, 3),
    ],
    [
        pos(1, 4), pos(2, 4), pos(3, 4), pos(4, 4), pos(5, 4), pos(6, 4), pos(4, 6),
        pos(9, 6), pos(10, 6),
        pos(15, 6), pos(13, 4), pos(14, 4), pos(15, 4), pos(16, 4), pos(17, 4), pos(18, 4),
    ],
];

const fn ortho_table() -> [[u16; COLS as usize]; ROWS as usize] {
    let mut table = [[0u16; COLS as usize]; ROWS as usize];
    let mut row = 0;
    while row < ROWS as usize {
        let mut col = 0;
        while col < COLS as usize {
            table[row][col] = pos(col as u16 + 2, row as u16 + 2);
            col += 1;
        }
        row += 1;
    }
    table
}

const ORTHO_TABLE: [[u16; COLS as usize]; ROWS as usize] = ortho_table();

/// Named physical arrangements of the key matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutKind {
    /// Split halves with staggered thumb arcs
    #[default]
    Model01,
    /// Single ortholinear block
    Ortho,
}

impl LayoutKind {
    pub fn name(&self) -> &str {
        match self {
            LayoutKind::Model01 => "Model01",
            LayoutKind::Ortho => "Ortho",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            LayoutKind::Model01 => LayoutKind::Ortho,
            LayoutKind::Ortho => LayoutKind::Model01,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ortho" | "ortholinear" | "grid" => LayoutKind::Ortho,
            _ => LayoutKind::Model01,
        }
    }

    pub fn layout(&self) -> KeyLayout {
        match self {
            LayoutKind::Model01 => KeyLayout::new(*self, &MODEL01_TABLE),
            LayoutKind::Ortho => KeyLayout::new(*self, &ORTHO_TABLE),
        }
    }
}

/// Static lookup from the 4x16 key matrix into the shared grid
#[derive(Debug, Clone, Copy)]
pub struct KeyLayout {
    pub kind: LayoutKind,
    table: &'static [[u16; COLS as usize]; ROWS as usize],
}

impl KeyLayout {
    fn new(kind: LayoutKind, table: &'static [[u16; COLS as usize]; ROWS as usize]) -> Self {
        Self { kind, table }
    }

    /// Grid (x, y) for a physical key
    pub fn grid_xy(&self, row: u8, col: u8) -> (usize, usize) {
        let p = self.position(row, col);
        (p % GRID_WIDTH, p / GRID_WIDTH)
    }
}

impl CoordinateMapper for KeyLayout {
    fn rows(&self) -> u8 {
        ROWS
    }

    fn cols(&self) -> u8 {
        COLS
    }

    fn position(&self, row: u8, col: u8) -> usize {
        self.table[row as usize][col as usize] as usize
    }
}

/// `x' = scale * col + offset`, `y' = scale * row + offset` on a grid `width` wide
#[derive(Debug, Clone, Copy)]
pub struct AffineLayout {
    pub rows: u8,
    pub cols: u8,
    pub width: usize,
    pub scale: usize,
    pub offset: usize,
}

impl CoordinateMapper for AffineLayout {
    fn rows(&self) -> u8 {
        self.rows
    }

    fn cols(&self) -> u8 {
        self.cols
    }

    fn position(&self, row: u8, col: u8) -> usize {
        let x = self.scale * col as usize + self.offset;
        let y = self.scale * row as usize + self.offset;
        y * self.width + x
    }
}
