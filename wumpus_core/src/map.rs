use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::{Orientation, Position};

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Width and height of a rectangular world.
///
/// Shared by the agent (which reasons about bounds but never sees the cells)
/// and the environment's [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Checks if the given position is within the grid boundaries.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// The cell one step from `position` along `orientation`, if it is on the grid.
    pub fn forward(&self, position: Position, orientation: Orientation) -> Option<Position> {
        let (dx, dy) = orientation.delta();
        let x = position.x.checked_add_signed(dx)?;
        let y = position.y.checked_add_signed(dy)?;
        let next = Position { x, y };
        self.contains(next).then_some(next)
    }

    /// The cell one step behind `position` relative to `orientation`.
    pub fn backward(&self, position: Position, orientation: Orientation) -> Option<Position> {
        self.forward(position, orientation.turn_left().turn_left())
    }

    /// In-bounds orthogonal neighbours.
    ///
    /// Fixed order: North, East, South, West.
    pub fn neighbors(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        Orientation::ALL
            .into_iter()
            .filter_map(move |orientation| self.forward(position, orientation))
    }

    /// Every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position { x, y }))
    }
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Converts a position to a flat vector index, or `None` if it is out of bounds.
    #[inline]
    fn index_of(&self, position: Position) -> Option<usize> {
        if position.x < self.width && position.y < self.height {
            Some(position.y * self.width + position.x)
        } else {
            None
        }
    }

    pub fn get(&self, position: Position) -> Option<&T> {
        self.index_of(position).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        self.index_of(position).map(|index| &mut self.cells[index])
    }

    /// Sets the value of the cell at the given position.
    ///
    /// Returns `Err(GridError::OutOfBounds)` if the position is invalid.
    pub fn set(&mut self, position: Position, value: T) -> Result<(), GridError> {
        let index = self.index_of(position).ok_or(GridError::OutOfBounds {
            x: position.x,
            y: position.y,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let position = Position {
                x: index % width,
                y: index / width,
            };
            (position, cell)
        })
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.index_of(position) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                position.x, position.y, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, position: Position) -> &mut Self::Output {
        let (width, height) = (self.width, self.height);
        match self.index_of(position) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                position.x, position.y, width, height
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_two_neighbors() {
        let dims = Dimensions::new(4, 4);
        let neighbors: Vec<_> = dims.neighbors(Position::HOME).collect();
        assert_eq!(neighbors, vec![Position::new(1, 0), Position::new(0, 1)]);
    }

    #[test]
    fn neighbors_follow_compass_order() {
        let dims = Dimensions::new(4, 4);
        let neighbors: Vec<_> = dims.neighbors(Position::new(1, 1)).collect();
        assert_eq!(
            neighbors,
            vec![
                Position::new(1, 0),
                Position::new(2, 1),
                Position::new(1, 2),
                Position::new(0, 1),
            ]
        );
    }

    #[test]
    fn forward_off_the_edge_is_none() {
        let dims = Dimensions::new(4, 4);
        assert_eq!(dims.forward(Position::new(3, 0), Orientation::East), None);
        assert_eq!(dims.forward(Position::HOME, Orientation::North), None);
        assert_eq!(
            dims.forward(Position::HOME, Orientation::South),
            Some(Position::new(0, 1))
        );
    }

    #[test]
    fn backward_undoes_forward() {
        let dims = Dimensions::new(4, 4);
        let start = Position::new(1, 2);
        for orientation in Orientation::ALL {
            if let Some(next) = dims.forward(start, orientation) {
                assert_eq!(dims.backward(next, orientation), Some(start));
            }
        }
    }

    #[test]
    fn set_out_of_bounds_is_an_error() {
        let mut grid: Grid<bool> = Grid::new(2, 3);
        assert_eq!(
            grid.set(Position::new(2, 0), true),
            Err(GridError::OutOfBounds {
                x: 2,
                y: 0,
                width: 2,
                height: 3
            })
        );
        assert!(grid.set(Position::new(1, 2), true).is_ok());
        assert!(grid[Position::new(1, 2)]);
    }

    #[test]
    fn get_is_none_off_the_grid() {
        let mut grid: Grid<u8> = Grid::new(3, 2);
        assert_eq!(grid.get(Position::new(3, 0)), None);
        assert_eq!(grid.get(Position::new(0, 2)), None);
        assert!(grid.get_mut(Position::new(5, 5)).is_none());

        if let Some(cell) = grid.get_mut(Position::new(2, 1)) {
            *cell = 7;
        }
        grid[Position::new(0, 1)] = 3;
        assert_eq!(grid.get(Position::new(2, 1)), Some(&7));
        assert_eq!(grid[Position::new(0, 1)], 3);
    }

    #[test]
    fn enumerate_is_row_major() {
        let mut grid: Grid<u8> = Grid::new(3, 2);
        grid[Position::new(1, 1)] = 9;
        let cells: Vec<_> = grid.enumerate().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], (Position::new(0, 0), &0));
        assert_eq!(cells[2], (Position::new(2, 0), &0));
        assert_eq!(cells[3], (Position::new(0, 1), &0));
        assert_eq!(cells[4], (Position::new(1, 1), &9));
        let positions: Vec<_> = grid.enumerate().map(|(position, _)| position).collect();
        let expected: Vec<_> = grid.dimensions().positions().collect();
        assert_eq!(positions, expected);
    }
}
