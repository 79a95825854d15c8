use anyhow::{bail, Context};
use clap::Parser;
use rayon::prelude::*;
use reservoscope::capacity::CapacityPolicy;
use reservoscope::config::Settings;
use reservoscope::ingest::{self, InputFormat};
use reservoscope::parser::{self, RawRecord, Reservation};
use reservoscope::report::{self, AnalysisRequest, Report};
use reservoscope::sample::{self, SampleConfig};
use reservoscope::slots::{HoursWindow, SLOTS_PER_HOUR};
use std::path::PathBuf;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

#[derive(Parser, Debug)]
#[command(name = "reservoscope", version, about = "Buffered reservation occupancy and capacity analysis")]
struct Cli {
    /// Input files (`-` for stdin). May be repeated.
    #[arg(required = false)]
    input: Vec<String>,

    /// Input format: jsonl | json | csv (default: by file extension)
    #[arg(long = "input-format")]
    input_format: Option<String>,

    /// Analyse generated sample data instead of input files
    #[arg(long = "sample", default_value_t = false)] sample: bool,
    /// Print generated sample records as JSON Lines and exit
    #[arg(long = "emit-sample", default_value_t = false)] emit_sample: bool,
    #[arg(long = "seed", default_value_t = 42)] seed: u64,

    /// JSON settings file (hours and capacity policy)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Location to analyse. May be repeated; default is every location.
    #[arg(long = "location")] location: Vec<String>,
    /// Single date filter: YYYY-MM-DD, M/D/YY or M/D/YYYY
    #[arg(long = "date")] date: Option<String>,

    #[arg(long = "start-hour")] start_hour: Option<u8>,
    #[arg(long = "end-hour")] end_hour: Option<u8>,
    #[arg(long = "default-cap")] default_cap: Option<u32>,
    /// Per-location cap override, NAME=N. May be repeated.
    #[arg(long = "cap")] cap: Vec<String>,

    /// Leave records with unparsable datetimes out of the occupancy rows
    #[arg(long = "skip-unparsed", default_value_t = false)] skip_unparsed: bool,
    /// Abort on the first unparsable datetime
    #[arg(long = "fail-fast", default_value_t = false)] fail_fast: bool,

    /// Print only a specific section: summary | dates | weekly | busiest
    #[arg(long = "only")] only: Option<String>,
    /// Output format: json | table
    #[arg(long = "format", default_value = "json")] format: String,

    #[arg(long = "verbose", short = 'v', default_value_t = false)] verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn build_policy(settings: &Settings, cli: &Cli) -> anyhow::Result<CapacityPolicy> {
    let mut policy = settings.capacity.clone();
    if let Some(d) = cli.default_cap {
        policy = policy.with_default(d)?;
    }
    for entry in &cli.cap {
        let Some((name, n)) = entry.rsplit_once('=') else {
            bail!("--cap expects NAME=N, got {entry:?}");
        };
        let n: u32 = n.trim().parse().with_context(|| format!("invalid cap in {entry:?}"))?;
        policy = policy.with_location(name.trim(), n)?;
    }
    Ok(policy)
}

fn load_raw(cli: &Cli) -> anyhow::Result<Vec<RawRecord>> {
    if cli.sample || cli.emit_sample {
        return Ok(sample::generate(&SampleConfig::default().with_seed(cli.seed)));
    }
    let inputs = if cli.input.is_empty() { vec!["-".to_string()] } else { cli.input.clone() };
    let format = cli.input_format.as_deref().map(InputFormat::parse).transpose()?;
    Ok(ingest::load_records(&inputs, format)?)
}

fn normalize(raws: &[RawRecord], fail_fast: bool) -> anyhow::Result<Vec<Reservation>> {
    if fail_fast {
        return raws
            .iter()
            .map(|r| parser::normalize_strict(r).map_err(anyhow::Error::from))
            .collect();
    }
    let batch = parser::normalize_all(raws);
    for u in batch.unparsed.iter().take(5) {
        tracing::warn!(index = u.index, id = u.id, location = %u.location, datetime = %u.datetime, "unparsable datetime");
    }
    if batch.degenerate_count() > 0 {
        tracing::info!(count = batch.degenerate_count(), "records degraded to 00:00 without a date");
    }
    Ok(batch.reservations)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    init_parallelism();

    let raws = load_raw(&cli)?;
    if cli.emit_sample {
        for r in &raws {
            println!("{}", serde_json::to_string(r)?);
        }
        return Ok(());
    }

    let settings = match &cli.config {
        Some(p) => Settings::from_path(p)?,
        None => Settings::default(),
    };
    let window = HoursWindow::new(
        cli.start_hour.unwrap_or(settings.hours.start),
        cli.end_hour.unwrap_or(settings.hours.end),
    )?;
    let policy = build_policy(&settings, &cli)?;
    let date = match cli.date.as_deref() {
        Some(s) => Some(parser::parse_date_arg(s).with_context(|| format!("unrecognised date {s:?}"))?),
        None => None,
    };

    let reservations = normalize(&raws, cli.fail_fast)?;
    tracing::info!(records = reservations.len(), "analysing reservations");

    let reports: Vec<Report> = if cli.location.is_empty() && date.is_none() {
        report::analyze_locations(&reservations, &policy, window, !cli.skip_unparsed)
    } else {
        let names = if cli.location.is_empty() { report::locations(&reservations) } else { cli.location.clone() };
        names
            .into_par_iter()
            .map(|name| {
                let mut req = AnalysisRequest::new(name, window).include_unparsed(!cli.skip_unparsed);
                if date.is_some() {
                    req = req.with_date(date);
                }
                report::analyze(&reservations, &policy, &req)
            })
            .collect()
    };

    if cli.format == "table" {
        for r in &reports {
            print_report_table(r, cli.only.as_deref());
        }
        return Ok(());
    }

    let out: Vec<serde_json::Value> = reports
        .iter()
        .map(|r| match cli.only.as_deref() {
            Some("summary") => serde_json::to_value(&r.summary),
            Some("dates") => Ok(serde_json::json!({"location": r.summary.location, "slots": r.slots, "date_rows": r.date_rows, "average": r.average})),
            Some("weekly") => Ok(serde_json::json!({"location": r.summary.location, "slots": r.slots, "weekly": r.weekly})),
            Some("busiest") => Ok(serde_json::json!({"location": r.summary.location, "busiest_hours": r.busiest_hours})),
            _ => serde_json::to_value(r),
        })
        .collect::<Result<_, _>>()?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

const CELL: usize = 3;

fn print_row(label: &str, cells: &[String], marked: &[bool]) {
    let line: String = cells.iter().map(|c| format!("{:>w$}", c, w = CELL)).collect();
    println!("{:<14}{}", label, line);
    if marked.iter().any(|m| *m) {
        let marks: String = marked.iter().map(|m| format!("{:>w$}", if *m { "^" } else { "" }, w = CELL)).collect();
        println!("{:<14}{}", "", marks);
    }
}

fn run_mask(len: usize, runs: &[reservoscope::analytics::Run]) -> Vec<bool> {
    let mut mask = vec![false; len];
    for run in runs {
        for m in &mut mask[run.start..run.end] {
            *m = true;
        }
    }
    mask
}

fn int_cells(values: &[u32]) -> Vec<String> {
    values.iter().map(|v| if *v > 0 { v.to_string() } else { ".".into() }).collect()
}

fn print_report_table(r: &Report, only: Option<&str>) {
    let s = &r.summary;
    println!("# {} (cap {}, {:02}:00-{:02}:00)", s.location, s.capacity, s.start_hour, s.end_hour);
    println!(
        "records={} in_range={} hidden={} degenerate={} groups={} max_overlap={}",
        s.total_records, s.in_range, s.hidden, s.degenerate, s.date_groups, s.max_overlap
    );
    if only == Some("summary") {
        return;
    }
    let n = r.slots.len();
    // hour marks over the first slot of each hour
    let header: Vec<String> = r
        .slots
        .iter()
        .map(|slot| if slot.index % SLOTS_PER_HOUR == 0 { slot.time[..2].to_string() } else { String::new() })
        .collect();

    if only.is_none() || only == Some("weekly") {
        println!("\nWeekly average (threshold {})", r.weekly.threshold);
        print_row("", &header, &[]);
        for row in &r.weekly.rows {
            let cells: Vec<String> = row.values.iter().map(|v| if *v > 0.0 { format!("{}", v.round() as u32) } else { ".".into() }).collect();
            let label = format!("{} {:>5.1}%", row.day, row.mean_utilization);
            print_row(&label, &cells, &run_mask(n, &row.over_threshold));
        }
        println!("overall utilization {:.1}%", r.weekly.overall_utilization);
    }

    if only.is_none() || only == Some("dates") {
        println!("\nBy date");
        print_row("", &header, &[]);
        print_row(&format!("avg ({})", r.average.groups), &int_cells(&r.average.values), &run_mask(n, &r.average.over_capacity));
        for row in &r.date_rows {
            let label = match row.day {
                Some(d) => format!("{} ({})", row.label, d),
                None => "(unparsed)".to_string(),
            };
            print_row(&label, &int_cells(&row.values), &run_mask(n, &row.over_capacity));
        }
    }

    if only.is_none() || only == Some("busiest") {
        println!("\nBusiest hours");
        println!("{:<16} {:<8} {:<6} {}", "Hour", "Total", "Max", "Busy");
        for b in &r.busiest_hours {
            println!("{:<16} {:<8} {:<6} {}", b.label, b.total_overlap, b.max_overlap, b.busy_slots);
        }
    }
    println!();
}
