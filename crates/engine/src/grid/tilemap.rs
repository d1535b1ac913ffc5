use thiserror::Error;

use super::TileCoord;

/// Tile layout of the walkable grid.
///
/// Tile ids are opaque to the simulation; a negative id marks an empty cell
/// that is still inside the grid extents. Row `y` of the layout holds the
/// tiles `(0..width, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tiles: Vec<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tilemap must be at least 1x1, got {width}x{height}")]
    Empty { width: u32, height: u32 },
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("invalid tile id '{value}' at row {row}, column {column}")]
    InvalidCell {
        row: usize,
        column: usize,
        value: String,
    },
}

impl Tilemap {
    pub fn new(width: u32, height: u32, tiles: Vec<i16>) -> Result<Self, TilemapError> {
        if width == 0 || height == 0 {
            return Err(TilemapError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn filled(width: u32, height: u32, tile_id: i16) -> Result<Self, TilemapError> {
        Self::new(width, height, vec![tile_id; width as usize * height as usize])
    }

    /// Parses a comma separated layout, one grid row per line.
    pub fn from_csv_str(raw: &str) -> Result<Self, TilemapError> {
        let mut tiles = Vec::new();
        let mut width = None::<usize>;
        let mut height = 0usize;

        for (row, line) in raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let mut cells = 0usize;
            for (column, cell) in line.split(',').map(str::trim).enumerate() {
                let tile_id = cell
                    .parse::<i16>()
                    .map_err(|_| TilemapError::InvalidCell {
                        row,
                        column,
                        value: cell.to_string(),
                    })?;
                tiles.push(tile_id);
                cells += 1;
            }

            match width {
                None => width = Some(cells),
                Some(expected) if expected != cells => {
                    return Err(TilemapError::RaggedRow {
                        row,
                        expected,
                        actual: cells,
                    });
                }
                Some(_) => {}
            }
            height += 1;
        }

        let width = width.unwrap_or(0);
        Self::new(width as u32, height as u32, tiles)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        self.index_of(tile).is_some()
    }

    pub fn index_of(&self, tile: TileCoord) -> Option<usize> {
        let x = u32::try_from(tile.x).ok()?;
        let y = u32::try_from(tile.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, tile: TileCoord) -> Option<i16> {
        self.index_of(tile)
            .and_then(|index| self.tiles.get(index).copied())
    }
}
