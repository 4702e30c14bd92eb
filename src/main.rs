use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use ratatui::crossterm::execute;
use tracing::{error, info, warn};

use prodview::columns::ColumnKey;
use prodview::controller::Controller;
use prodview::domain::{TableConfig, ViewError};
use prodview::logging;
use prodview::model::{Model, Status};
use prodview::product::load_products;
use prodview::state::{TableState, parse_sort};
use prodview::ui::TableUI;

/// A tui based product table viewer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Product file to show (csv, parquet or arrow)
    path: String,

    /// Initial sort, `KEY`, `KEY:asc`, `KEY:desc` or `none`
    #[arg(long, default_value = "name:asc")]
    sort: String,

    /// Column to hide on start, can be repeated
    #[arg(long)]
    hide: Vec<String>,

    /// Pixels per terminal cell
    #[arg(long, default_value_t = 6)]
    cell_px: u16,

    /// Smallest width a column can be resized to, in pixels
    #[arg(long, default_value_t = 6)]
    min_width: u32,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Where to write the log
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn build_state(args: &Args, cfg: &TableConfig) -> Result<TableState, ViewError> {
    let sort = parse_sort(&args.sort).map_err(ViewError::InvalidArgument)?;
    let mut state = TableState::default()
        .with_sort(sort)
        .with_min_width(cfg.min_column_width);
    for name in args.hide.iter() {
        let key: ColumnKey = name.parse().map_err(ViewError::InvalidArgument)?;
        if !state.column(key).is_some_and(|c| c.hideable) {
            warn!("Column {key} can not be hidden");
        } else if state.is_visible(key) {
            state.toggle_visibility(key);
        }
    }
    Ok(state)
}

fn run(args: Args) -> Result<(), ViewError> {
    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("prodview.log"));
    logging::init(&log_file)?;
    info!("Starting prodview!");

    let path = shellexpand::full(&args.path)
        .map_err(|e| ViewError::InvalidArgument(e.to_string()))?
        .into_owned();

    let cfg = TableConfig::default()
        .with_event_poll_time(args.poll_ms)
        .with_cell_px(args.cell_px.max(1))
        .with_min_column_width(args.min_width);
    let state = build_state(&args, &cfg)?;
    let (file_info, products) = load_products(PathBuf::from(path))?;

    let mut terminal = ratatui::init();
    let result = execute!(stdout(), EnableMouseCapture, EnableFocusChange)
        .map_err(ViewError::from)
        .and_then(|_| {
            let size = terminal.size()?;
            let model = Model::init(
                &cfg,
                file_info.name(),
                products,
                state,
                usize::from(size.width),
                usize::from(size.height),
            );
            event_loop(&mut terminal, model, &cfg)
        });

    // The terminal has to be restored whatever happened in the loop
    if let Err(e) = execute!(stdout(), DisableMouseCapture, DisableFocusChange) {
        warn!("Failed to disable mouse capture: {e}");
    }
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    mut model: Model,
    cfg: &TableConfig,
) -> Result<(), ViewError> {
    let mut ui = TableUI::new(cfg);
    let controller = Controller::new(cfg);

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model, ui.layout())?;
        model.update(message);
    }
    info!("Bye!");
    Ok(())
}
