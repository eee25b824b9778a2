// Mon Oct 19 2026 - Alex

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use spritepal_core::{
    config::SearchConfig,
    engine::{PromptAnswer, PromptKind, PromptRequest, SearchCoordinator, SearchContext, SearchEvent, SearchRequest, StartOffset},
    graphics::{
        self, canvas::DEFAULT_TILES_PER_ROW, sprite_banks, unpack_color_table, ExtractionMetadata, OamTable,
        PaletteDocument, PixelCanvas,
    },
    memory::{DumpKind, MemoryDump},
    pattern::{CombineOp, PatternKind, SearchResult},
    utils::{self, logging, LoggingUtils},
};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version)]
#[command(about = "SNES sprite tile, palette and ROM pattern toolkit", long_about = None)]
struct Cli {
    /// Repeat for more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a ROM or dump for hex or regex patterns
    Search(SearchArgs),
    /// Decode 4bpp tiles from a VRAM dump into an image
    Tiles(TilesArgs),
    /// List CGRAM palettes and export sprite banks as JSON
    Palette(PaletteArgs),
    /// Show on-screen sprites and the palette banks they use
    Oam(OamArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Hex,
    Regex,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OpArg {
    Single,
    Or,
    And,
}

#[derive(Args, Debug)]
struct SearchArgs {
    rom: PathBuf,

    /// Pattern; repeat for OR/AND lists
    #[arg(short, long)]
    pattern: Vec<String>,

    /// JSON search configuration; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    kind: Option<KindArg>,

    #[arg(long, value_enum)]
    op: Option<OpArg>,

    #[arg(short, long)]
    ignore_case: bool,

    #[arg(short, long)]
    alignment: Option<usize>,

    #[arg(long)]
    context: Option<usize>,

    /// 0 for no limit
    #[arg(short, long)]
    max_results: Option<usize>,

    /// Start offset (0x.., ..h or decimal); "ask" prompts for it
    #[arg(long)]
    from: Option<String>,

    /// Answer scan prompts on stdin
    #[arg(long)]
    interactive: bool,

    /// Write results as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct TilesArgs {
    vram: PathBuf,

    #[arg(long, default_value = "0xC000")]
    offset: String,

    #[arg(short, long, default_value_t = 128)]
    tiles: usize,

    #[arg(long, default_value_t = DEFAULT_TILES_PER_ROW)]
    per_row: usize,

    /// Color with this CGRAM dump instead of the grayscale ramp
    #[arg(long)]
    cgram: Option<PathBuf>,

    #[arg(long, default_value_t = 8)]
    bank: usize,

    /// PGM (grayscale) or PPM (color) output
    #[arg(short, long)]
    output: PathBuf,

    /// Also write extraction metadata JSON next to the image
    #[arg(long)]
    metadata: bool,
}

#[derive(Args, Debug)]
struct PaletteArgs {
    cgram: PathBuf,

    /// Directory for per-bank palette JSON files
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print every bank, not just sprite banks
    #[arg(long)]
    all: bool,
}

#[derive(Args, Debug)]
struct OamArgs {
    oam: PathBuf,

    /// List every on-screen entry
    #[arg(long)]
    entries: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_from_env_or(LoggingUtils::level_from_verbosity(cli.verbose));

    let outcome = match cli.command {
        Command::Search(args) => run_search(args),
        Command::Tiles(args) => run_tiles(args),
        Command::Palette(args) => run_palette(args),
        Command::Oam(args) => run_oam(args),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn build_config(args: &SearchArgs) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };

    if !args.pattern.is_empty() {
        config = config.with_pattern(&args.pattern.join("\n"));
    }
    if let Some(kind) = args.kind {
        config = config.with_pattern_kind(match kind {
            KindArg::Hex => PatternKind::Hex,
            KindArg::Regex => PatternKind::Regex,
        });
    }
    if let Some(op) = args.op {
        config = config.with_combine_op(match op {
            OpArg::Single => CombineOp::Single,
            OpArg::Or => CombineOp::Or,
            OpArg::And => CombineOp::And,
        });
    } else if args.pattern.len() > 1 && config.combine_op == CombineOp::Single {
        config = config.with_combine_op(CombineOp::Or);
    }
    if args.ignore_case {
        config = config.with_case_sensitive(false);
    }
    if let Some(alignment) = args.alignment {
        config = config.with_alignment(alignment);
    }
    if let Some(context) = args.context {
        config = config.with_context_bytes(context);
    }
    if let Some(max) = args.max_results {
        config = config.with_max_results(max);
    }

    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn run_search(args: SearchArgs) -> Result<()> {
    let config = build_config(&args)?;
    let start = match args.from.as_deref() {
        None => StartOffset::At(0),
        Some("ask") => StartOffset::Ask,
        Some(text) => StartOffset::At(utils::parse_offset(text).with_context(|| format!("invalid offset '{}'", text))?),
    };

    let request = SearchRequest::from_config(&args.rom, &config)?
        .with_start(start)
        .interactive(args.interactive);

    let size = std::fs::metadata(&args.rom)
        .with_context(|| format!("cannot read {}", args.rom.display()))?
        .len();
    println!(
        "{} Searching {} [{}] ({} {})",
        "[*]".blue(),
        args.rom.display(),
        utils::format_bytes(size),
        config.combine_op,
        config.pattern_kind
    );
    let started = Instant::now();

    let coordinator = SearchCoordinator::new(SearchContext::new(config));
    let handle = coordinator.start(request);

    let progress = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let mut results: Vec<SearchResult> = Vec::new();
    while let Some(event) = handle.next_event() {
        match event {
            SearchEvent::Progress { current, total } => {
                if let Some(ref pb) = progress {
                    pb.set_length(total as u64);
                    pb.set_position(current as u64);
                }
            }
            SearchEvent::ResultFound(result) => {
                if let Some(ref pb) = progress {
                    pb.set_message(format!("{} found", utils::pluralize(handle.result_count(), "match", "matches")));
                }
                let line = format_result(&result);
                match progress {
                    Some(ref pb) => pb.println(line),
                    None => println!("{}", line),
                }
                results.push(result);
            }
            SearchEvent::Prompt(request) => {
                let answer = match progress {
                    Some(ref pb) => pb.suspend(|| answer_prompt(&request)),
                    None => answer_prompt(&request),
                };
                handle.answer(request.id, answer);
            }
            SearchEvent::Completed { limit_reached, .. } => {
                if limit_reached {
                    println!("{} Result limit reached", "[*]".yellow());
                }
                break;
            }
            SearchEvent::Cancelled { results } => {
                println!("{} Search cancelled after {} results", "[!]".yellow(), results);
                break;
            }
            SearchEvent::Failed { kind, message } => {
                if let Some(ref pb) = progress {
                    pb.abandon();
                }
                bail!("search failed ({}): {}", kind, message);
            }
        }
    }

    if let Some(ref pb) = progress {
        pb.finish_and_clear();
    }

    println!(
        "{} {} in {}",
        "[+]".green(),
        utils::pluralize(results.len(), "match", "matches"),
        utils::format_duration(started.elapsed())
    );

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &results)?;
        println!("{} Results saved to: {}", "[+]".green(), path.display());
    }

    Ok(())
}

fn format_result(result: &SearchResult) -> String {
    let mut line = format!(
        "{} {:#08X}  {:>4} bytes  {}",
        "[+]".green(),
        result.offset(),
        result.size(),
        utils::hex_string_spaced(&result.match_bytes()[..result.match_bytes().len().min(16)])
    );
    if let Some(text) = result.decoded_text() {
        line.push_str(&format!("  \"{}\"", text));
    }
    for sub in result.sub_matches().iter().skip(1) {
        line.push_str(&format!("  +{:#X}", sub.offset));
    }
    line
}

fn answer_prompt(request: &PromptRequest) -> Option<PromptAnswer> {
    println!("{} {}: {}", "[?]".cyan(), request.title.bold(), request.message);
    if request.kind == PromptKind::Info {
        return None;
    }

    print!("> ");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let line = line.trim();

    match request.kind {
        PromptKind::Input if line.is_empty() => None,
        PromptKind::Input => Some(PromptAnswer::Text(line.to_string())),
        PromptKind::Question if line.eq_ignore_ascii_case("y") || line.eq_ignore_ascii_case("yes") => {
            Some(PromptAnswer::Yes)
        }
        PromptKind::Question => Some(PromptAnswer::No),
        PromptKind::Info => None,
    }
}

fn run_tiles(args: TilesArgs) -> Result<()> {
    let offset = utils::parse_offset(&args.offset).with_context(|| format!("invalid offset '{}'", args.offset))?;
    let vram = MemoryDump::load(&args.vram, DumpKind::Vram)?;
    let byte_len = args.tiles * graphics::tile::BYTES_PER_TILE;

    println!("{} Decoding {} tiles at {:#06X}", "[*]".blue(), args.tiles, offset);
    let canvas = graphics::extract_canvas(vram.view().as_slice(), offset, byte_len, args.per_row);

    match &args.cgram {
        Some(path) => {
            let cgram = MemoryDump::load(path, DumpKind::Cgram)?;
            let banks = unpack_color_table(cgram.view().as_slice());
            let bank = banks
                .get(args.bank)
                .with_context(|| format!("bank {} out of range", args.bank))?;
            write_ppm(&args.output, &canvas, &canvas.to_rgb(bank))?;
            println!("{} Colored with {}", "[+]".green(), bank.label().name);
        }
        None => write_pgm(&args.output, &canvas)?,
    }
    println!(
        "{} Wrote {}x{} image to {}",
        "[+]".green(),
        canvas.width(),
        canvas.height(),
        args.output.display()
    );

    if args.metadata {
        let mut metadata = ExtractionMetadata::new(
            &args.vram.display().to_string(),
            offset,
            graphics::tile::tile_count(byte_len),
            byte_len,
        );
        if args.cgram.is_some() {
            metadata.add_palette_file(args.bank, &args.output.display().to_string());
        }
        let path = args.output.with_extension("metadata.json");
        metadata.write_to(&path)?;
        println!("{} Metadata saved to: {}", "[+]".green(), path.display());
    }

    Ok(())
}

fn write_pgm(path: &Path, canvas: &PixelCanvas) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    write!(out, "P5\n{} {}\n255\n", canvas.width(), canvas.height())?;
    out.write_all(&canvas.to_grayscale())?;
    Ok(())
}

fn write_ppm(path: &Path, canvas: &PixelCanvas, rgb: &[u8]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    write!(out, "P6\n{} {}\n255\n", canvas.width(), canvas.height())?;
    out.write_all(rgb)?;
    Ok(())
}

fn run_palette(args: PaletteArgs) -> Result<()> {
    let cgram = MemoryDump::load(&args.cgram, DumpKind::Cgram)?;
    let banks = unpack_color_table(cgram.view().as_slice());
    let shown = if args.all { &banks[..] } else { sprite_banks(&banks) };

    for bank in shown {
        let label = bank.label();
        let swatch: Vec<String> = bank.colors.iter().map(|c| c.to_string()).collect();
        println!("{} {:>2} {:<10} {}", "[*]".blue(), bank.index, label.name, swatch.join(" "));
    }

    if let Some(dir) = &args.export {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let source = args.cgram.display().to_string();
        for bank in sprite_banks(&banks) {
            let path = dir.join(format!("palette_{:02}.pal.json", bank.index));
            PaletteDocument::from_bank(bank, &source).write_to(&path)?;
            println!("{} Exported {}", "[+]".green(), path.display());
        }
    }

    Ok(())
}

fn run_oam(args: OamArgs) -> Result<()> {
    let dump = MemoryDump::load(&args.oam, DumpKind::Oam)?;
    let table = OamTable::parse(dump.view().as_slice());

    if args.entries {
        for entry in table.on_screen() {
            println!(
                "{} #{:<3} x={:<3} y={:<3} tile={:#04X} bank={} prio={}{}{}",
                "[*]".blue(),
                entry.index,
                entry.x,
                entry.y,
                entry.tile,
                entry.cgram_bank(),
                entry.priority(),
                if entry.flip_x() { " flipX" } else { "" },
                if entry.flip_y() { " flipY" } else { "" }
            );
        }
    }

    let usage = table.bank_usage();
    if usage.is_empty() {
        println!("{} No sprites on screen", "[*]".yellow());
    }
    for (bank, count) in &usage {
        println!(
            "{} Palette {:>2} ({}): {}",
            "[+]".green(),
            bank,
            spritepal_core::graphics::bank_label(*bank).name,
            utils::pluralize(*count, "sprite", "sprites")
        );
    }

    Ok(())
}
