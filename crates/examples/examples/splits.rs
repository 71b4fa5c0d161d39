use std::{
    fs::File,
    io::{self, Write},
    panic,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use clap::Parser;
use color_backtrace::{BacktracePrinter, default_output_stream};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyModifiers},
    execute, terminal,
};
use flexgrid::{Core, ResizeDebouncer, backend::crossterm::CrosstermTerminal, options::Options};
use flexgrid_examples::splits::build_splits;
use scopeguard::defer;
use tracing::info;

/// Split-pane flexgrid demo.
#[derive(Parser, Debug)]
struct Args {
    /// Write logs to this file.
    #[arg(long)]
    log: Option<PathBuf>,
    /// Quiet period after a resize before redrawing, in milliseconds.
    #[arg(long, default_value_t = 100)]
    debounce: u64,
    /// Render sibling subtrees concurrently.
    #[arg(long)]
    concurrent: bool,
    /// Draw on stderr, leaving stdout free.
    #[arg(long)]
    stderr: bool,
}

/// The stream the demo draws on.
fn stream(stderr: bool) -> Box<dyn Write> {
    if stderr {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    }
}

/// Leave the alternate screen and raw mode.
fn restore(stderr: bool) {
    let mut out = stream(stderr);
    drop(execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show
    ));
    drop(terminal::disable_raw_mode());
}

pub fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(File::create(path)?))
            .with_ansi(false)
            .init();
    }

    let backend = if args.stderr {
        CrosstermTerminal::stderr()
    } else {
        CrosstermTerminal::new()
    };
    let core = Arc::new(Core::with_options(
        backend,
        Options {
            debounce: Duration::from_millis(args.debounce),
            concurrent_render: args.concurrent,
            ..Options::default()
        },
    ));
    build_splits(&core)?;

    terminal::enable_raw_mode()?;
    let mut out = stream(args.stderr);
    execute!(out, terminal::EnterAlternateScreen)?;
    let stderr = args.stderr;
    defer! {
        restore(stderr);
    }
    panic::set_hook(Box::new(move |pi| {
        restore(stderr);
        drop(BacktracePrinter::new().print_panic_info(pi, &mut default_output_stream()));
    }));

    core.hide_cursor()?;
    core.clear_screen()?;
    core.redraw()?;
    info!("demo started");

    let debouncer = ResizeDebouncer::spawn(Arc::clone(&core));
    loop {
        match event::read()? {
            Event::Key(k)
                if k.code == KeyCode::Char('q')
                    || (k.code == KeyCode::Char('c')
                        && k.modifiers.contains(KeyModifiers::CONTROL)) =>
            {
                break;
            }
            Event::Resize(..) => debouncer.notify(),
            _ => {}
        }
    }
    drop(debouncer);
    core.shutdown()?;
    info!("demo finished");
    Ok(())
}
