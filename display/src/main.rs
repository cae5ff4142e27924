mod panel;
mod refresh;
mod render;
mod snapshot;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use crossterm::terminal;
use radar_core::{ImageInfo, Palette};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::panel::Canvas;

#[derive(Parser)]
#[command(name = "radar-display", about = "Show a radar framebuffer on a simulated e-paper panel")]
struct Cli {
    /// Framebuffer file, or "-" for stdin
    #[arg(long, default_value = "images/quantized.bin")]
    framebuffer: PathBuf,

    /// Info file carrying the caption
    #[arg(long)]
    info: Option<PathBuf>,

    /// Panel width in pixels
    #[arg(long, default_value_t = radar_core::WIDTH)]
    width: u16,

    /// Panel height in pixels
    #[arg(long, default_value_t = radar_core::HEIGHT)]
    height: u16,

    /// Minutes between refreshes
    #[arg(long, default_value = "1")]
    interval_mins: u64,

    /// Refresh once, then wait for a key instead of looping
    #[arg(long)]
    once: bool,

    /// Also save each refresh as a PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Don't draw in the terminal
    #[arg(long)]
    no_terminal: bool,
}

enum Wake {
    Timeout,
    Resize,
    Quit,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs share the tty with the panel, so keep them quiet unless asked.
    let default_level = if cli.no_terminal { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let from_stdin = cli.framebuffer.as_os_str() == "-";
    let once = cli.once || from_stdin;
    let palette = Palette::inky7();

    if cli.no_terminal {
        loop {
            update(&cli, &palette, from_stdin);
            if once {
                return Ok(());
            }
            std::thread::sleep(Duration::from_secs(cli.interval_mins * 60));
        }
    }

    // Set up panic hook for terminal cleanup
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        cleanup_terminal();
        original_hook(info);
    }));

    terminal::enable_raw_mode()?;
    let stdout = io::stdout();
    let mut stdout = BufWriter::with_capacity(256 * 1024, stdout.lock());
    stdout.write_all(b"\x1b[?1049h")?; // enter alternate screen
    stdout.write_all(b"\x1b[?25l")?; // hide cursor
    stdout.flush()?;

    let result = run_terminal_loop(&cli, &palette, &mut stdout, from_stdin, once);

    stdout.write_all(b"\x1b[0m")?; // reset colors
    stdout.write_all(b"\x1b[?25h")?; // show cursor
    stdout.write_all(b"\x1b[?1049l")?; // leave alternate screen
    stdout.flush()?;
    terminal::disable_raw_mode()?;

    result
}

fn run_terminal_loop(
    cli: &Cli,
    palette: &Palette,
    stdout: &mut impl Write,
    from_stdin: bool,
    once: bool,
) -> anyhow::Result<()> {
    let interval = Duration::from_secs(cli.interval_mins * 60);
    let mut render_buf = Vec::with_capacity(256 * 1024);

    loop {
        let canvas = update(cli, palette, from_stdin);
        present(&canvas, palette, stdout, &mut render_buf)?;

        // A single refresh stays up until a key says otherwise.
        let deadline = if once { None } else { Some(Instant::now() + interval) };
        loop {
            match wait(deadline)? {
                Wake::Quit => return Ok(()),
                Wake::Resize => present(&canvas, palette, stdout, &mut render_buf)?,
                Wake::Timeout => break,
            }
        }
    }
}

/// Draw one refresh onto a fresh canvas. Failures end up on the panel
/// and in the log; they never stop the loop.
fn update(cli: &Cli, palette: &Palette, from_stdin: bool) -> Canvas {
    let started = Instant::now();
    let mut canvas = Canvas::new(cli.width, cli.height);
    let caption = cli.info.as_deref().and_then(load_caption);

    match refresh::refresh(&mut canvas, open_source(&cli.framebuffer, from_stdin), caption.as_deref()) {
        Ok(spans) => info!("refreshed panel: {} spans in {:?}", spans, started.elapsed()),
        Err(e) => warn!("refresh failed: {}", e),
    }

    if let Some(path) = &cli.snapshot {
        match snapshot::save_png(&canvas, palette, path) {
            Ok(()) => debug!("saved snapshot {}", path.display()),
            Err(e) => warn!("{:#}", e),
        }
    }
    canvas
}

fn open_source(path: &Path, from_stdin: bool) -> io::Result<Box<dyn Read>> {
    if from_stdin {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path)?;
    Ok(Box::new(BufReader::new(file)))
}

fn load_caption(path: &Path) -> Option<String> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match ImageInfo::parse(&text) {
        Ok(info) => Some(info.text),
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            None
        }
    }
}

fn present(canvas: &Canvas, palette: &Palette, stdout: &mut impl Write, buf: &mut Vec<u8>) -> anyhow::Result<()> {
    let (term_cols, term_rows) = terminal::size()?;
    let (cols, rows) = render::fit_cells(term_cols, term_rows, canvas.width(), canvas.height());
    render::render_canvas(canvas, palette, cols, rows, buf);
    stdout.write_all(buf)?;
    stdout.flush()?;
    Ok(())
}

/// Sleep until `deadline` (forever if `None`), waking early for q/Esc or
/// a terminal resize.
fn wait(deadline: Option<Instant>) -> anyhow::Result<Wake> {
    loop {
        let timeout = match deadline {
            Some(d) => match d.checked_duration_since(Instant::now()) {
                Some(left) => left.min(Duration::from_millis(250)),
                None => return Ok(Wake::Timeout),
            },
            None => Duration::from_millis(250),
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(KeyEvent {
                    code: KeyCode::Char('q') | KeyCode::Esc,
                    ..
                }) => return Ok(Wake::Quit),
                Event::Resize(..) => return Ok(Wake::Resize),
                _ => {}
            }
        }
    }
}

fn cleanup_terminal() {
    let _ = io::stdout().write_all(b"\x1b[0m\x1b[?25h\x1b[?1049l");
    let _ = io::stdout().flush();
    let _ = terminal::disable_raw_mode();
}
