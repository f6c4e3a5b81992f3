use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use console::style;
use flate2::read::GzDecoder;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use ukeire::algo::shanten::shanten_to_string;
use ukeire::algo::{Analysis13, Analysis14, Analyzer};
use ukeire::hand::{hand, parse_tiles};
use ukeire::state::PlayerInfo;
use ukeire::tile::Tile;

#[derive(Parser, Debug)]
#[command(
    name = "ukeire",
    version,
    about = "Shanten, waits and discard ranking for riichi mahjong hands"
)]
struct Args {
    /// Concealed tiles, e.g. "11357m 13579p 135s 1z". `0` is a red five.
    #[arg(required_unless_present = "batch")]
    hand: Option<String>,

    /// Called set, the called tile first, e.g. "4m56m" or "777z". Repeatable.
    #[arg(long)]
    meld: Vec<String>,

    /// Dora indicator. Repeatable.
    #[arg(long)]
    dora: Vec<Tile>,

    /// Own discards in order, for furiten.
    #[arg(long)]
    discards: Option<String>,

    /// Other tiles out of the wall: opponents' discards and melds.
    #[arg(long)]
    visible: Option<String>,

    #[arg(long, default_value = "E")]
    round_wind: Tile,

    #[arg(long, default_value = "E")]
    seat_wind: Tile,

    #[arg(long)]
    riichi: bool,

    /// Analyze calling this tile instead of drawing.
    #[arg(long)]
    call: Option<Tile>,

    /// The called tile is a red five.
    #[arg(long, requires = "call")]
    red: bool,

    /// Only consider pon, e.g. when the tile does not come from kamicha.
    #[arg(long, requires = "call")]
    no_chi: bool,

    /// Analyze discards in parallel.
    #[arg(long)]
    parallel: bool,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Analyze one hand per line of this file (plain or .gz) and print JSON
    /// lines. The other options apply to every hand.
    #[arg(long, conflicts_with = "hand")]
    batch: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Report {
    Draw(Analysis13),
    Discard(Analysis14),
    Call(Option<Analysis14>),
}

#[derive(Serialize)]
struct BatchLine<'a> {
    hand: &'a str,
    report: Report,
}

impl Args {
    fn player(&self, hand_str: &str) -> Result<PlayerInfo> {
        let mut player = PlayerInfo::from_hand_str(hand_str)?;
        for m in &self.meld {
            player.push_meld(m.parse()?)?;
        }
        ensure!(self.dora.len() <= 5, "at most five dora indicators, got {}", self.dora.len());
        player.dora_indicators.extend(self.dora.iter().copied());
        if let Some(discards) = &self.discards {
            player.discards = parse_tiles(discards)
                .context("parsing discards")?
                .into_iter()
                .map(|p| p.tile)
                .collect();
        }
        if let Some(visible) = &self.visible {
            player.visible = hand(visible).context("parsing visible tiles")?;
        }
        if let Some(called) = self.call {
            player.visible[called.as_usize()] += 1;
        }
        player.round_wind = self.round_wind;
        player.seat_wind = self.seat_wind;
        player.is_riichi = self.riichi;
        player.fill_left_tiles();

        let total = player.tile_count() as usize + player.melds().len() * 3;
        ensure!(total <= 14, "too many tiles: {player}");
        Ok(player)
    }

    fn analyze(&self, analyzer: &Analyzer<'_>, hand_str: &str) -> Result<Report> {
        let mut player = self.player(hand_str)?;
        let report = match (self.call, player.tile_count() % 3) {
            (Some(called), 1) => {
                Report::Call(analyzer.evaluate_call(&mut player, called, self.red, !self.no_chi))
            }
            (Some(_), _) => bail!("calling needs a 3n+1 hand, got {player}"),
            (None, 1) => Report::Draw(analyzer.analyze13(&mut player)),
            (None, 2) if self.parallel => Report::Discard(analyzer.analyze14_parallel(&player)),
            (None, 2) => Report::Discard(analyzer.analyze14(&mut player)),
            _ => bail!("expected 3n+1 or 3n+2 tiles, got {player}"),
        };
        Ok(report)
    }
}

fn print_discards(analysis: &Analysis14) {
    println!("{}", style(shanten_to_string(analysis.shanten)).bold());
    for (i, c) in analysis.preserving.iter().enumerate() {
        if i == 0 {
            println!("  {}", style(c).green().bold());
        } else {
            println!("  {c}");
        }
    }
    if !analysis.regressing.is_empty() {
        println!(
            "{}",
            style(format!("{} (regressing)", shanten_to_string(analysis.shanten + 1))).bold()
        );
        for c in &analysis.regressing {
            println!("  {}", style(c).dim());
        }
    }
}

fn print_report(report: &Report) {
    match report {
        Report::Draw(r) => {
            println!("{}", style(shanten_to_string(r.shanten)).bold());
            println!("  {r}");
        }
        Report::Discard(r) | Report::Call(Some(r)) => print_discards(r),
        Report::Call(None) => println!("{}", style("nothing to call").yellow()),
    }
}

fn read_batch(path: &Path) -> Result<Vec<String>> {
    let inner = || -> Result<String> {
        let file = File::open(path)?;
        let raw = if path.extension().is_some_and(|e| e == "gz") {
            io::read_to_string(GzDecoder::new(file))?
        } else {
            io::read_to_string(file)?
        };
        Ok(raw)
    };
    let raw = inner().with_context(|| format!("error when reading {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect())
}

fn run_batch(args: &Args, analyzer: &Analyzer<'_>, path: &Path) -> Result<()> {
    let hands = read_batch(path)?;
    let bar = ProgressBar::new(hands.len() as u64).with_style(
        ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} {per_sec}")?
            .progress_chars("=> "),
    );

    let start = Instant::now();
    let lines = hands
        .par_iter()
        .progress_with(bar.clone())
        .map(|h| -> Result<String> {
            let report = args.analyze(analyzer, h).with_context(|| format!("analyzing \"{h}\""))?;
            Ok(serde_json::to_string(&BatchLine { hand: h, report })?)
        })
        .collect::<Result<Vec<_>>>()?;
    bar.finish_and_clear();
    log::info!("analyzed {} hands in {:?}", lines.len(), start.elapsed());

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let analyzer = Analyzer::default();

    if let Some(path) = &args.batch {
        return run_batch(&args, &analyzer, path);
    }
    let Some(hand_str) = &args.hand else {
        bail!("no hand given");
    };

    let report = args.analyze(&analyzer, hand_str)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
