use std::env;
use std::time::Instant;

use lcparse::{ChunkedBuilder, Lps};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("parse_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!("\n{}", "=".repeat(72));
    eprintln!("LCP Parse Probe: scaling and shrink-rate measurements");
    eprintln!("{}", "=".repeat(72));
    eprintln!();
    eprintln!("Parses deterministic pseudo-random DNA at increasing lengths,");
    eprintln!("deepens to level {}, and reports per-level core counts,", options.max_level);
    eprintln!("wall-clock time and resident-memory deltas. The chunked path is");
    eprintln!("cross-checked against the whole-string parse at every size.");
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    for &len in &[10_000usize, 50_000, 100_000, 500_000, 1_000_000] {
        eprint!("  len={len} ... ");
        let sequence = deterministic_dna(len);

        let before = rss_kib(&mut sys);
        let start = Instant::now();
        let mut parse = Lps::new(&sequence);
        let level1 = parse.len();
        let mut shrink = vec![level1];
        for level in 2..=options.max_level {
            parse.deepen_to(level);
            shrink.push(parse.len());
        }
        let wall = start.elapsed().as_secs_f64();
        let after = rss_kib(&mut sys);

        let chunked = ChunkedBuilder::new(options.max_level, options.chunk_size).build(&sequence);
        let merge_ok = chunked == parse;

        eprintln!(
            "{} level1={level1}, level{}={}, time={wall:.3}s",
            if merge_ok { "ok" } else { "MERGE MISMATCH" },
            options.max_level,
            parse.len(),
        );

        measurements.push(Measurement {
            len,
            shrink,
            wall_s: wall,
            rss_delta_kib: after.saturating_sub(before),
            merge_ok,
        });
    }

    options.format.write(&measurements, options.max_level);

    if measurements.iter().any(|m| !m.merge_ok) {
        eprintln!("chunked/whole mismatch detected");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    max_level: u32,
    chunk_size: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut max_level = 6u32;
        let mut chunk_size = 65_536usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--level=") {
                max_level = value
                    .parse()
                    .map_err(|_| "level must be a positive integer".to_string())?;
            } else if let Some(value) = arg.strip_prefix("--chunk=") {
                chunk_size = value
                    .parse()
                    .map_err(|_| "chunk size must be a positive integer".to_string())?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        if max_level < 2 {
            return Err("level must be at least 2".to_string());
        }
        if chunk_size == 0 {
            return Err("chunk size must be positive".to_string());
        }

        Ok(Self {
            format,
            max_level,
            chunk_size,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin parse_probe [-- <options>]

Options:
  --format=<csv|table>   Output format (default: csv)
  --level=<N>            Deepen each parse to level N (default: 6)
  --chunk=<N>            Window size for the chunked cross-check (default: 65536)
  -h, --help             Print this help message
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement], max_level: u32) {
        match self {
            OutputFormat::Csv => {
                print!("len");
                for level in 1..=max_level {
                    print!(",cores_l{level}");
                }
                println!(",wall_s,rss_delta_kib,merge_ok");
                for m in measurements {
                    print!("{}", m.len);
                    for count in &m.shrink {
                        print!(",{count}");
                    }
                    println!(",{:.3},{},{}", m.wall_s, m.rss_delta_kib, m.merge_ok);
                }
            }
            OutputFormat::Table => {
                println!(
                    "{:>10}  {:>10}  {:>10}  {:>10}  {:>14}  {}",
                    "len", "cores_l1", "cores_top", "wall_s", "rss_delta_kib", "merge"
                );
                for m in measurements {
                    println!(
                        "{:>10}  {:>10}  {:>10}  {:>10.3}  {:>14}  {}",
                        m.len,
                        m.shrink.first().copied().unwrap_or(0),
                        m.shrink.last().copied().unwrap_or(0),
                        m.wall_s,
                        m.rss_delta_kib,
                        if m.merge_ok { "ok" } else { "MISMATCH" }
                    );
                }
            }
        }
    }
}

struct Measurement {
    len: usize,
    shrink: Vec<usize>,
    wall_s: f64,
    rss_delta_kib: u64,
    merge_ok: bool,
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

/// Deterministic DNA via a splitmix-style generator so runs are comparable
/// across machines without pulling a random-number dependency into the
/// library.
fn deterministic_dna(len: usize) -> Vec<u8> {
    const BASES: &[u8] = b"ACGT";
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    (0..len)
        .map(|_| {
            state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            z ^= z >> 31;
            BASES[(z & 3) as usize]
        })
        .collect()
}
