//! The shared Minesweeper grid.
//!
//! A [`Board`] is the single piece of game state mutated by every connected
//! client. It has no notion of connections, locking, or the wire protocol —
//! those live in [`crate::connection`] and [`crate::server`]. Every public
//! method here is a plain, synchronous, panic-free operation so that callers
//! can hold a [`std::sync::Mutex`] across it without ever blocking on I/O.

use std::collections::VecDeque;

/// The three mutually exclusive, player-visible states a cell can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Untouched,
    Dug,
    Flagged,
}

/// A rectangular Minesweeper grid.
///
/// `mine` and `state` are both `height` rows of `width` columns, indexed
/// `[y][x]` to match the "row, then column" shape used throughout this
/// module's invariant checks.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    mine: Vec<Vec<bool>>,
    state: Vec<Vec<CellState>>,
}

impl Board {
    /// Builds a board from a pre-populated mine layout. All cells start
    /// `Untouched`. Panics if `mines` is not a non-empty rectangle — callers
    /// ([`crate::loader`]) are expected to have already validated shape.
    pub fn from_mines(mines: Vec<Vec<bool>>) -> Self {
        let height = mines.len();
        assert!(height > 0, "board must have at least one row");
        let width = mines[0].len();
        assert!(width > 0, "board must have at least one column");
        assert!(
            mines.iter().all(|row| row.len() == width),
            "every row must have the same width"
        );

        let state = vec![vec![CellState::Untouched; width]; height];
        let board = Self {
            width,
            height,
            mine: mines,
            state,
        };
        board.check_invariants();
        board
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Digs the cell at `(x, y)`. Returns `true` if a mine was hit.
    ///
    /// Out-of-bounds or already-touched cells are silent no-ops that return
    /// `false`.
    pub fn dig(&mut self, x: i64, y: i64) -> bool {
        let Some((x, y)) = self.in_bounds(x, y) else {
            return false;
        };

        if self.state[y][x] != CellState::Untouched {
            return false;
        }

        self.state[y][x] = CellState::Dug;

        let hit_mine = self.mine[y][x];
        if hit_mine {
            // Clear the mine before any neighbor count is read, so the
            // flood fill (and every subsequent render) sees the post-BOOM
            // grid rather than the one that still contains this mine.
            self.mine[y][x] = false;
        }

        if self.adjacent_mine_count(x, y) == 0 {
            self.propagate(x, y);
        }

        self.check_invariants();
        hit_mine
    }

    /// Flags the cell at `(x, y)` if it is untouched. No-op otherwise,
    /// including out-of-bounds coordinates.
    pub fn flag(&mut self, x: i64, y: i64) {
        let Some((x, y)) = self.in_bounds(x, y) else {
            return;
        };

        if self.state[y][x] == CellState::Untouched {
            self.state[y][x] = CellState::Flagged;
        }

        self.check_invariants();
    }

    /// Clears a flag at `(x, y)` if one is present. No-op otherwise,
    /// including out-of-bounds coordinates.
    pub fn deflag(&mut self, x: i64, y: i64) {
        let Some((x, y)) = self.in_bounds(x, y) else {
            return;
        };

        if self.state[y][x] == CellState::Flagged {
            self.state[y][x] = CellState::Untouched;
        }

        self.check_invariants();
    }

    /// Renders the board as `height` rows, top to bottom, each exactly
    /// `2 * width - 1` characters.
    pub fn render(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.render_cell(x, y))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    fn render_cell(&self, x: usize, y: usize) -> String {
        match self.state[y][x] {
            CellState::Untouched => "-".to_string(),
            CellState::Flagged => "F".to_string(),
            CellState::Dug => match self.adjacent_mine_count(x, y) {
                0 => " ".to_string(),
                n => n.to_string(),
            },
        }
    }

    /// Converts a signed, unbounded wire coordinate into in-bounds grid
    /// indices, or `None` if it falls outside the grid.
    fn in_bounds(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some((x, y))
        } else {
            None
        }
    }

    /// Number of the (up to) eight neighbors of `(x, y)` currently holding a
    /// mine. `(x, y)` must already be valid grid indices.
    fn adjacent_mine_count(&self, x: usize, y: usize) -> u8 {
        self.neighbors(x, y)
            .into_iter()
            .filter(|&(nx, ny)| self.mine[ny][nx])
            .count() as u8
    }

    fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(8);
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                    result.push((nx as usize, ny as usize));
                }
            }
        }
        result
    }

    /// Breadth-first reveal of the zero-count region reachable from
    /// `(x, y)`, which must already be `Dug` with an adjacent-mine count of
    /// zero. Uses an explicit queue rather than call-stack recursion so a
    /// large empty region cannot blow the stack.
    fn propagate(&mut self, x: usize, y: usize) {
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        queue.push_back((x, y));

        while let Some((cx, cy)) = queue.pop_front() {
            for (nx, ny) in self.neighbors(cx, cy) {
                if self.state[ny][nx] != CellState::Untouched {
                    continue;
                }

                self.state[ny][nx] = CellState::Dug;

                if self.adjacent_mine_count(nx, ny) == 0 {
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        debug_assert_eq!(self.mine.len(), self.height);
        debug_assert_eq!(self.state.len(), self.height);
        for row in &self.mine {
            debug_assert_eq!(row.len(), self.width);
        }
        for row in &self.state {
            debug_assert_eq!(row.len(), self.width);
        }
        for y in 0..self.height {
            for x in 0..self.width {
                if self.state[y][x] == CellState::Dug {
                    debug_assert!(!self.mine[y][x], "a dug cell must not hold a mine");
                }
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn check_invariants(&self) {}
}
