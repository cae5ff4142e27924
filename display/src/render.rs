use radar_core::{Palette, Rgb};

use crate::panel::Canvas;

const HALF_BLOCK: &str = "▄";
const BLACK: Rgb = Rgb::new(0, 0, 0);

/// Largest cell grid that fits the terminal and keeps the panel's aspect
/// ratio. Each cell shows two panel rows, so cells count as square.
pub fn fit_cells(term_cols: u16, term_rows: u16, width: u16, height: u16) -> (u16, u16) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let (w, h) = (width as u32, height as u32);
    let cols = (term_cols as u32).min(term_rows as u32 * 2 * w / h);
    let rows = (cols * h / w / 2).min(term_rows as u32);
    (cols as u16, rows as u16)
}

/// Render the canvas downscaled to `cols` x `rows` half-block cells.
/// Colors are only re-sent when they change from the previous cell.
pub fn render_canvas(canvas: &Canvas, palette: &Palette, cols: u16, rows: u16, buf: &mut Vec<u8>) {
    buf.clear();
    if cols == 0 || rows == 0 {
        return;
    }

    // Clear, then move cursor to top-left
    buf.extend_from_slice(b"\x1b[0m\x1b[2J\x1b[H");

    let (w, h) = (canvas.width() as u32, canvas.height() as u32);
    let sample = |col: u16, sub_row: u32| -> Rgb {
        let x = col as u32 * w / cols as u32;
        let y = sub_row * h / (rows as u32 * 2);
        canvas
            .pixel(x as u16, y as u16)
            .and_then(|idx| palette.get(idx))
            .unwrap_or(BLACK)
    };

    let mut prev_bg = BLACK;
    let mut prev_fg = BLACK;
    let mut first = true;

    for row in 0..rows {
        if row > 0 {
            buf.extend_from_slice(b"\r\n");
        }
        for col in 0..cols {
            let bg = sample(col, row as u32 * 2);
            let fg = sample(col, row as u32 * 2 + 1);

            if first || bg != prev_bg {
                write_bg(buf, bg);
                prev_bg = bg;
            }
            if first || fg != prev_fg {
                write_fg(buf, fg);
                prev_fg = fg;
            }
            first = false;

            buf.extend_from_slice(HALF_BLOCK.as_bytes());
        }
    }

    // Reset colors
    buf.extend_from_slice(b"\x1b[0m");
}

fn write_bg(buf: &mut Vec<u8>, c: Rgb) {
    buf.extend_from_slice(b"\x1b[48;2;");
    write_rgb(buf, c);
}

fn write_fg(buf: &mut Vec<u8>, c: Rgb) {
    buf.extend_from_slice(b"\x1b[38;2;");
    write_rgb(buf, c);
}

fn write_rgb(buf: &mut Vec<u8>, c: Rgb) {
    write_u16(buf, c.r as u16);
    buf.push(b';');
    write_u16(buf, c.g as u16);
    buf.push(b';');
    write_u16(buf, c.b as u16);
    buf.push(b'm');
}

/// Integer-to-ASCII without allocating.
fn write_u16(buf: &mut Vec<u8>, v: u16) {
    let mut digits = [0u8; 5];
    let mut n = v;
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[i..]);
}
