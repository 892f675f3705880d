/// Largest height a disturbance can set
pub const MAX_HEIGHT: i8 = 0x7f;

/// Clamp for diffused heights, kept below `MAX_HEIGHT` to prevent clipping
pub const VMAX: i16 = 80;

/// Fixed-size height map, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid<const W: usize, const H: usize> {
    cells: [[i8; W]; H],
}

impl<const W: usize, const H: usize> Default for Grid<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> Grid<W, H> {
    pub fn new() -> Self {
        Self {
            cells: [[0; W]; H],
        }
    }

    /// Height at (x, y), None outside the grid
    pub fn get(&self, x: usize, y: usize) -> Option<i8> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Set height at (x, y); ignored outside the grid
    pub fn set(&mut self, x: usize, y: usize, value: i8) {
        if let Some(cell) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = value;
        }
    }

    /// Height at a row-major position (`y * W + x`)
    pub fn at(&self, position: usize) -> Option<i8> {
        self.get(position % W, position / W)
    }

    /// Set height at a row-major position
    pub fn set_at(&mut self, position: usize, value: i8) {
        self.set(position % W, position / W, value);
    }

    /// True for cells on the outermost ring
    pub fn is_border(x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 >= W || y + 1 >= H
    }

    /// Sum of absolute heights over the whole grid
    pub fn energy(&self) -> u32 {
        self.cells
            .iter()
            .flatten()
            .map(|&h| (h as i16).unsigned_abs() as u32)
            .sum()
    }

    pub fn is_still(&self) -> bool {
        self.cells.iter().flatten().all(|&h| h == 0)
    }

    pub fn clear(&mut self) {
        self.cells = [[0; W]; H];
    }

    /// One ripple step: reads `self`, writes the interior of `next`.
    ///
    /// The 9-point sum is divided by 4 rather than 9 and the stale value left
    /// in `next` is subtracted, which makes this a damped wave equation
    /// instead of a blur. The border ring of `next` is never touched.
    pub fn ripple_into(&self, next: &mut Grid<W, H>) {
        if W < 3 || H < 3 {
            return;
        }
        let src = &self.cells;
        for y in 1..H - 1 {
            for x in 1..W - 1 {
                let mut value: i16 = 0;
                for row in &src[y - 1..=y + 1] {
                    for &h in &row[x - 1..=x + 1] {
                        value += h as i16;
                    }
                }
                value = (value >> 2) - next.cells[y][x] as i16;

                // ~12.5% energy loss per frame
                value -= value >> 3;

                next.cells[y][x] = value.clamp(-VMAX, VMAX) as i8;
            }
        }
    }
}

/// Two alternating height pages.
/// `front` is the page read by the next step and drawn by the renderer,
/// `back` holds the step before it and receives the next result.
#[derive(Debug, Clone)]
pub struct PageBuffer<const W: usize, const H: usize> {
    pages: [Grid<W, H>; 2],
    active: usize,
}

impl<const W: usize, const H: usize> Default for PageBuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> PageBuffer<W, H> {
    pub fn new() -> Self {
        Self {
            pages: [Grid::new(), Grid::new()],
            active: 0,
        }
    }

    /// Index of the active page (0 or 1)
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn front(&self) -> &Grid<W, H> {
        &self.pages[self.active]
    }

    pub fn front_mut(&mut self) -> &mut Grid<W, H> {
        &mut self.pages[self.active]
    }

    pub fn back(&self) -> &Grid<W, H> {
        &self.pages[self.active ^ 1]
    }

    /// Run one ripple step from the front page into the back page
    pub fn step(&mut self) {
        let (first, second) = self.pages.split_at_mut(1);
        if self.active == 0 {
            first[0].ripple_into(&mut second[0]);
        } else {
            second[0].ripple_into(&mut first[0]);
        }
    }

    /// Make the back page active
    pub fn flip(&mut self) {
        self.active ^= 1;
    }

    pub fn clear(&mut self) {
        for page in &mut self.pages {
            page.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Small = PageBuffer<14, 5>;

    fn run(buffer: &mut Small, frames: usize) {
        for _ in 0..frames {
            buffer.step();
            buffer.flip();
        }
    }

    #[test]
    fn test_accessors_reject_out_of_range() {
        let mut grid: Grid<4, 3> = Grid::new();
        grid.set(4, 0, 9);
        grid.set(0, 3, 9);
        assert!(grid.is_still());
        assert_eq!(grid.get(4, 0), None);
        grid.set_at(2 * 4 + 3, 5);
        assert_eq!(grid.get(3, 2), Some(5));
        assert_eq!(grid.at(11), Some(5));
    }

    #[test]
    fn test_border_detection() {
        assert!(Grid::<14, 5>::is_border(0, 2));
        assert!(Grid::<14, 5>::is_border(13, 2));
        assert!(Grid::<14, 5>::is_border(6, 4));
        assert!(!Grid::<14, 5>::is_border(1, 1));
        assert!(!Grid::<14, 5>::is_border(12, 3));
    }

    #[test]
    fn test_first_step_values() {
        let mut buffer = Small::new();
        buffer.front_mut().set(6, 2, MAX_HEIGHT);
        buffer.step();
        // 127 >> 2 = 31, minus 31 >> 3 = 3
        assert_eq!(buffer.back().get(6, 2), Some(28));
        assert_eq!(buffer.back().get(5, 1), Some(28));
        assert_eq!(buffer.back().get(4, 2), Some(0));
    }

    #[test]
    fn test_flip_swaps_without_copy() {
        let mut buffer = Small::new();
        buffer.front_mut().set(3, 3, 7);
        assert_eq!(buffer.active_index(), 0);
        buffer.flip();
        assert_eq!(buffer.active_index(), 1);
        assert_eq!(buffer.back().get(3, 3), Some(7));
        assert_eq!(buffer.front().get(3, 3), Some(0));
    }

    #[test]
    fn test_heights_stay_clamped() {
        let mut buffer = Small::new();
        for frame in 0..200 {
            if frame % 3 == 0 {
                buffer.front_mut().set(1 + frame % 12, 1 + frame % 3, MAX_HEIGHT);
            }
            buffer.step();
            let written = buffer.back();
            for y in 1..4 {
                for x in 1..13 {
                    let h = written.get(x, y).unwrap() as i16;
                    assert!((-VMAX..=VMAX).contains(&h), "({x}, {y}) = {h}");
                }
            }
            buffer.flip();
        }
    }

    #[test]
    fn test_border_never_written() {
        let mut buffer = Small::new();
        buffer.front_mut().set(1, 1, MAX_HEIGHT);
        buffer.front_mut().set(12, 3, MAX_HEIGHT);
        run(&mut buffer, 40);
        for page in [buffer.front(), buffer.back()] {
            for y in 0..5 {
                for x in 0..14 {
                    if Grid::<14, 5>::is_border(x, y) {
                        assert_eq!(page.get(x, y), Some(0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_drop_settles() {
        let mut buffer = Small::new();
        buffer.front_mut().set(6, 2, MAX_HEIGHT);
        run(&mut buffer, 1);
        let early = buffer.front().energy();
        assert!(early > 0);
        run(&mut buffer, 59);
        assert!(buffer.front().is_still());
        assert!(buffer.back().is_still());
        run(&mut buffer, 10);
        assert!(buffer.front().is_still());
    }

    #[test]
    fn test_ripple_propagates_and_fades() {
        let mut buffer = Small::new();
        buffer.front_mut().set(6, 2, MAX_HEIGHT);

        run(&mut buffer, 1);
        let center_at_1 = buffer.front().get(6, 2).unwrap();

        run(&mut buffer, 1);
        let neighbours = [(5, 1), (6, 1), (7, 1), (5, 2), (7, 2), (5, 3), (6, 3), (7, 3)];
        assert!(neighbours
            .iter()
            .any(|&(x, y)| buffer.front().get(x, y) != Some(0)));

        run(&mut buffer, 18);
        let center_at_20 = buffer.front().get(6, 2).unwrap();
        assert!(center_at_20 < center_at_1);
    }
}
