use std::fs;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::backtracking_search::Assignment;
use crate::errors::RenderError;
use crate::puzzle::Puzzle;
use crate::word_list::WordList;

/// Character used for wall cells in `render_grid`.
pub const WALL: char = '█';

/// Lay the assigned words onto the grid. Walls and open cells without a letter are `None`.
pub fn letter_grid(
    puzzle: &Puzzle,
    words: &WordList,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; puzzle.width()]; puzzle.height()];

    for (slot_id, word_id) in assignment.assigned() {
        let cells = puzzle.slot(slot_id).cells();
        for (&(row, col), &letter) in cells.iter().zip(&words.get(word_id).chars) {
            letters[row][col] = Some(letter);
        }
    }

    letters
}

/// Turn the given puzzle and assignment into a rendered string, one line per row.
pub fn render_grid(puzzle: &Puzzle, words: &WordList, assignment: &Assignment) -> String {
    let letters = letter_grid(puzzle, words, assignment);

    letters.iter().enumerate().map(|(row, row_letters)| {
        row_letters.iter().enumerate().map(|(col, letter)| {
            if puzzle.is_open(row, col) {
                letter.unwrap_or(' ')
            } else {
                WALL
            }
        }).collect::<String>()
    }).collect::<Vec<_>>().join("\n")
}

/// Side length in pixels of one cell in `render_image`.
pub const CELL_SIZE: u32 = 100;

/// Width of the black border painted around every cell.
pub const CELL_BORDER: u32 = 2;

const FONT_SIZE: f32 = 80.0;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Does the path's extension name an image format we can write?
pub fn is_image_path<P: AsRef<Path>>(path: P) -> bool {
    ImageFormat::from_path(path).is_ok()
}

/// Read a TrueType or OpenType font for drawing letters.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec, RenderError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| RenderError::FontIo {
        path: path.to_path_buf(),
        source,
    })?;

    FontVec::try_from_vec(data).map_err(|_| RenderError::InvalidFont { path: path.to_path_buf() })
}

/// Paint the grid: a black canvas with a white square for every open cell and the assigned
/// letter centred in it. Letters are only drawn when a font is given.
pub fn render_image(
    puzzle: &Puzzle,
    words: &WordList,
    assignment: &Assignment,
    font: Option<&FontVec>,
) -> RgbaImage {
    let letters = letter_grid(puzzle, words, assignment);
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;
    let scale = PxScale::from(FONT_SIZE);

    let mut image = RgbaImage::from_pixel(
        puzzle.width() as u32 * CELL_SIZE,
        puzzle.height() as u32 * CELL_SIZE,
        BLACK,
    );

    for (row, row_letters) in letters.iter().enumerate() {
        for (col, letter) in row_letters.iter().enumerate() {
            if !puzzle.is_open(row, col) {
                continue;
            }

            let left = (col as u32 * CELL_SIZE + CELL_BORDER) as i32;
            let top = (row as u32 * CELL_SIZE + CELL_BORDER) as i32;
            draw_filled_rect_mut(
                &mut image,
                Rect::at(left, top).of_size(interior_size, interior_size),
                WHITE,
            );

            if let (Some(letter), Some(font)) = (letter, font) {
                let text = letter.to_string();
                let (width, height) = text_size(scale, font, &text);
                let x = left + (interior_size as i32 - width as i32) / 2;
                let y = top + (interior_size as i32 - height as i32) / 2;
                draw_text_mut(&mut image, BLACK, x, y, scale, font, &text);
            }
        }
    }

    image
}

/// Write a rendered image, picking the format from the path's extension.
pub fn save_image<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<(), RenderError> {
    let path = path.as_ref();
    image.save(path).map_err(|source| RenderError::Image {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_solved_grid() {
        let puzzle = Puzzle::from_template_str("___\n#_#\n#_#").unwrap();
        let words = WordList::from_words(["art", "cat"]);
        let mut assignment = Assignment::new(puzzle.slot_count());
        assignment.assign(0, words.find("cat").unwrap());
        assignment.assign(1, words.find("art").unwrap());

        assert_eq!(render_grid(&puzzle, &words, &assignment), "CAT\n█R█\n█T█");
    }

    #[test]
    fn test_render_partial_grid_leaves_blanks() {
        let puzzle = Puzzle::from_template_str("___\n#_#\n#_#").unwrap();
        let words = WordList::from_words(["cat"]);
        let mut assignment = Assignment::new(puzzle.slot_count());
        assignment.assign(0, 0);

        let letters = letter_grid(&puzzle, &words, &assignment);
        assert_eq!(letters[0], vec![Some('C'), Some('A'), Some('T')]);
        assert_eq!(letters[1][1], None);

        assert_eq!(render_grid(&puzzle, &words, &assignment), "CAT\n█ █\n█ █");
    }

    fn solved_tee() -> (Puzzle, WordList, Assignment) {
        let puzzle = Puzzle::from_template_str("___\n#_#\n#_#").unwrap();
        let words = WordList::from_words(["art", "cat"]);
        let mut assignment = Assignment::new(puzzle.slot_count());
        assignment.assign(0, words.find("cat").unwrap());
        assignment.assign(1, words.find("art").unwrap());
        (puzzle, words, assignment)
    }

    #[test]
    fn test_render_image_paints_cells_and_walls() {
        let (puzzle, words, assignment) = solved_tee();

        let image = render_image(&puzzle, &words, &assignment, None);

        assert_eq!(image.dimensions(), (300, 300));
        // Open cell interiors are white, walls and cell borders black.
        assert_eq!(*image.get_pixel(150, 50), WHITE);
        assert_eq!(*image.get_pixel(150, 250), WHITE);
        assert_eq!(*image.get_pixel(50, 150), BLACK);
        assert_eq!(*image.get_pixel(250, 250), BLACK);
        assert_eq!(*image.get_pixel(100, 50), BLACK);
        assert_eq!(*image.get_pixel(0, 0), BLACK);
        assert_eq!(*image.get_pixel(2, 2), WHITE);
        assert_eq!(*image.get_pixel(97, 97), WHITE);
        assert_eq!(*image.get_pixel(98, 98), BLACK);
    }

    #[test]
    fn test_image_paths_are_recognised_by_extension() {
        assert!(is_image_path("grid.png"));
        assert!(is_image_path("out/grid.jpg"));
        assert!(!is_image_path("grid.txt"));
        assert!(!is_image_path("grid"));
    }

    #[test]
    fn test_load_font_errors() {
        let missing = std::env::temp_dir().join("crossword_csp_missing_font.ttf");
        assert!(matches!(load_font(&missing), Err(RenderError::FontIo { .. })));

        let garbage = std::env::temp_dir().join("crossword_csp_not_a_font.ttf");
        fs::write(&garbage, b"not a font").unwrap();
        assert!(matches!(load_font(&garbage), Err(RenderError::InvalidFont { .. })));
        fs::remove_file(&garbage).unwrap();
    }

    #[test]
    fn test_save_image_round_trip() {
        let (puzzle, words, assignment) = solved_tee();
        let path = std::env::temp_dir().join("crossword_csp_tee.png");

        save_image(&render_image(&puzzle, &words, &assignment, None), &path).unwrap();

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (300, 300));
        assert_eq!(*saved.get_pixel(150, 50), WHITE);
        fs::remove_file(&path).unwrap();
    }
}
