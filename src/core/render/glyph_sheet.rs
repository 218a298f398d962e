//=========================================================================
// Glyph Sheet Fonts
//=========================================================================
//
// Bitmap fonts for the software canvas.
//
// A glyph sheet is a PNG laid out as a 16 × 6 grid of equally sized
// cells covering ASCII 32..=127 in row-major order. The alpha channel of
// each cell is the glyph coverage. Text is rendered by nearest-neighbour
// scaling each cell to the requested pixel height.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::canvas::Bitmap;
use super::Color;

//=== Constants ===========================================================

const COLUMNS: u32 = 16;
const ROWS: u32 = 6;
const FIRST_CHAR: u32 = 32;
const LAST_CHAR: u32 = 127;
const FALLBACK_CHAR: char = '?';

//=== GlyphSheet ==========================================================

pub(crate) struct GlyphSheet {
    cell_width: u32,
    cell_height: u32,
    bitmap: Bitmap,
}

impl GlyphSheet {
    /// Wraps a decoded sheet, validating that it divides into cells.
    pub(crate) fn new(bitmap: Bitmap) -> Result<Self, String> {
        if bitmap.width < COLUMNS || bitmap.height < ROWS {
            return Err(format!(
                "glyph sheet {}x{} is smaller than the {}x{} cell grid",
                bitmap.width, bitmap.height, COLUMNS, ROWS
            ));
        }
        if bitmap.width % COLUMNS != 0 || bitmap.height % ROWS != 0 {
            return Err(format!(
                "glyph sheet {}x{} does not divide into {}x{} cells",
                bitmap.width, bitmap.height, COLUMNS, ROWS
            ));
        }

        Ok(Self {
            cell_width: bitmap.width / COLUMNS,
            cell_height: bitmap.height / ROWS,
            bitmap,
        })
    }

    /// Advance of one glyph at the given pixel height.
    pub(crate) fn advance(&self, size: u32) -> u32 {
        ((self.cell_width * size) as f64 / self.cell_height as f64).round().max(1.0) as u32
    }

    /// Renders a single line of text into a new bitmap `size` pixels tall.
    pub(crate) fn render(&self, text: &str, size: u32, color: Color) -> Bitmap {
        let advance = self.advance(size);
        let glyph_count = text.chars().count() as u32;
        let width = advance * glyph_count;
        let mut out = Bitmap::transparent(width, size);

        for (index, ch) in text.chars().enumerate() {
            let (cell_x, cell_y) = self.cell_origin(ch);
            let origin_x = index as u32 * advance;

            for y in 0..size {
                let src_y = cell_y + (y * self.cell_height / size).min(self.cell_height - 1);
                for x in 0..advance {
                    let src_x = cell_x + (x * self.cell_width / advance).min(self.cell_width - 1);
                    let coverage = self.bitmap.pixel(src_x, src_y)[3] as u32;
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (color.a as u32 * coverage / 255) as u8;
                    out.set_pixel(origin_x + x, y, [color.r, color.g, color.b, alpha]);
                }
            }
        }

        out
    }

    fn cell_origin(&self, ch: char) -> (u32, u32) {
        let code = match ch as u32 {
            c @ FIRST_CHAR..=LAST_CHAR => c,
            _ => FALLBACK_CHAR as u32,
        };
        let index = code - FIRST_CHAR;
        (
            (index % COLUMNS) * self.cell_width,
            (index / COLUMNS) * self.cell_height,
        )
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
