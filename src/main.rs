use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use crossword_csp::render::{is_image_path, load_font, save_image};
use crossword_csp::{
    render_grid, render_image, FillFailure, FillOptions, ParseError, Puzzle, RenderError, Solver,
    WordList,
};

/// Fill a crossword structure with words from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Structure file: one row per line, '_' for open cells, anything else for walls
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file: an image for image extensions such as .png,
    /// otherwise text
    output: Option<PathBuf>,

    /// Font used to draw letters when the output is an image
    #[arg(long)]
    font: Option<PathBuf>,

    /// Never use the same word in two different slots
    #[arg(long)]
    distinct: bool,

    /// Give up after this many backtracks
    #[arg(long)]
    max_backtracks: Option<u64>,

    /// Give up after this many seconds of searching
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enable debug logging (also enabled by CROSSWORD_DEBUG)
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug_enabled = cli.debug || std::env::var("CROSSWORD_DEBUG").is_ok();
    crossword_csp::log::init_logger(debug_enabled);

    if let Err(e) = try_main(&cli) {
        if let Some(parse_err) = e.downcast_ref::<ParseError>() {
            eprintln!("Error: {}", parse_err.display_detailed());
        } else if let Some(render_err) = e.downcast_ref::<RenderError>() {
            eprintln!("Error: {}", render_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let puzzle = Puzzle::load_from_path(&cli.structure)?;
    let words = WordList::load_from_path(&cli.words)?;
    log::info!(
        "Loaded a {}x{} grid with {} slots and {} words",
        puzzle.width(),
        puzzle.height(),
        puzzle.slot_count(),
        words.len()
    );

    let options = FillOptions {
        distinct_words: cli.distinct,
        max_backtracks: cli.max_backtracks,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    let mut solver = Solver::new(&puzzle, &words);
    let result = if solver.propagate() {
        solver.search(&options)
    } else {
        Err(FillFailure::HardFailure)
    };
    eprintln!("{:?}", solver.statistics());

    match result {
        Ok(assignment) => {
            let display_grid = render_grid(&puzzle, &words, &assignment);
            println!("{display_grid}");

            if let Some(output) = &cli.output {
                if is_image_path(output) {
                    let font = cli.font.as_ref().map(load_font).transpose()?;
                    if font.is_none() {
                        log::warn!("No --font given, so {} will have no letters", output.display());
                    }
                    save_image(&render_image(&puzzle, &words, &assignment, font.as_ref()), output)?;
                } else {
                    fs::write(output, display_grid + "\n")?;
                }
                log::info!("Wrote {}", output.display());
            }
            Ok(())
        }
        Err(FillFailure::HardFailure) => {
            println!("No solution.");
            Ok(())
        }
        Err(failure) => Err(failure.into()),
    }
}
