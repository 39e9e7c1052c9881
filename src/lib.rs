pub mod board;
pub mod game;
pub mod simulate;
pub mod tui;

use board::{MAX_TILE, Score, Tile};

/// Result of sliding a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slide {
    /// Sum of the tiles created by merges.
    pub score: Score,
    /// Whether any cell of the line changed.
    pub moved: bool,
}

/// Slide and merge a line towards index 0 in place.
///
/// Every tile takes part in at most one merge: once a merged tile is written the
/// write pointer moves past it. Tiles of `MAX_TILE` never merge.
pub fn slide_left(cells: &mut [Tile]) -> Slide {
    let mut slide = Slide::default();

    // Find first non empty cell
    let Some(current) = cells
        .iter()
        .enumerate()
        .find_map(|(i, &c)| (c != 0).then_some(i))
    else {
        return slide;
    };

    let mut last = 0; // Write ptr
    slide.moved = current != 0;
    cells.swap(last, current);

    for current in current + 1..cells.len() {
        if cells[current] == 0 {
            continue;
        } else if cells[current] == cells[last] && cells[last] < MAX_TILE {
            cells[last] *= 2;
            cells[current] = 0;
            slide.score += Score::from(cells[last]);
            slide.moved = true;
            last += 1;
        } else {
            (cells[last] != 0).then(|| last += 1);
            if last != current {
                cells.swap(last, current);
                slide.moved = true;
            }
        }
    }

    slide
}

pub fn slide_right(row: &mut [Tile]) -> Slide {
    row.reverse();
    let slide = slide_left(row);
    row.reverse();
    slide
}
