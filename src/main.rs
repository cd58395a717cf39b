//! Command-line front end for the tracklet pipeline.
//!
//! Reads a delimited point file, runs the extraction pipeline, and writes
//! the labeled points as CSV or as a gnuplot script. Length-like options
//! accept either a plain number or a multiple of the characteristic
//! length dNN (e.g. `-r 2dNN`); the characteristic length is computed
//! only when some option actually needs it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use clap::ValueEnum;

use tracklet::io::{
    load_csv, write_cloud_csv, write_clusters_csv, write_clusters_gnuplot,
    write_smoothing_gnuplot,
};
use tracklet::spatial::characteristic_length;
use tracklet::{CutPolicy, Error, Linkage, PipelineConfig, Smoother};

const USAGE: &str = "Usage:
\ttracklet [options] <infile>
Options (defaults in brackets):
\t-r <radius>    radius for point smoothing [2dNN]
\t               (can be numeric or multiple of dNN)
\t-k <n>         number of neighbours in triplet creation [19]
\t-n <n>         number of the best triplets to use [2]
\t-a <alpha>     maximum value for the angle between the
\t               triplet branches [0.03]
\t-s <scale>     scaling factor for clustering [0.3dNN]
\t               (can be numeric or multiple of dNN)
\t-t <dist>      best cluster distance [auto]
\t               (can be numeric or 'auto')
\t-m <n>         minimum number of triplets for a cluster [5]
\t-dmax <n>      maximum gap width within a cluster [none]
\t               (can be numeric, multiple of dNN or 'none')
\t-link <method> linkage method for clustering [single]
\t               (can be 'single', 'complete', 'average')
\t-ordered       only build triplets along the input order
\t-oprefix <prefix>
\t               write result not to stdout, but to <prefix>.csv
\t               and (if -gnuplot is set) to <prefix>.gnuplot
\t-gnuplot       print result as a gnuplot command
\t-delim <char>  single char delimiter for csv input [' ']
\t-skip <n>      number of lines skipped at head of infile [0]
\t-v             be verbose
\t-vv            be more verbose and write debug trace files";

/// A length option that may be expressed as a multiple of dNN.
#[derive(Clone, Copy, Debug)]
struct ScaledValue {
    value: f64,
    dnn_relative: bool,
}

impl ScaledValue {
    fn resolve(&self, dnn: f64) -> f64 {
        if self.dnn_relative {
            self.value * dnn
        } else {
            self.value
        }
    }
}

/// Parse `2`, `2.5` or `2dNN` / `2dnn`.
fn parse_scaled(option: &str, value: &str) -> Result<ScaledValue, Error> {
    let (number, dnn_relative) = match value
        .strip_suffix("dNN")
        .or_else(|| value.strip_suffix("dnn"))
    {
        Some(prefix) => (prefix, true),
        None => (value, false),
    };
    let value_err = || Error::InvalidOption {
        option: option.to_string(),
        value: value.to_string(),
    };
    let parsed: f64 = number.parse().map_err(|_| value_err())?;
    Ok(ScaledValue {
        value: parsed,
        dnn_relative,
    })
}

struct CliOptions {
    infile: String,
    oprefix: Option<String>,
    gnuplot: bool,
    delimiter: char,
    skip: usize,
    verbosity: u8,

    smoothing_radius: ScaledValue,
    neighbors: usize,
    triplets_per_midpoint: usize,
    max_error: f64,
    scale: ScaledValue,
    cut_distance: Option<f64>,
    min_triplets: usize,
    max_gap: Option<ScaledValue>,
    linkage: Linkage,
    ordered: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            infile: String::new(),
            oprefix: None,
            gnuplot: false,
            delimiter: ' ',
            skip: 0,
            verbosity: 0,
            smoothing_radius: ScaledValue {
                value: 2.0,
                dnn_relative: true,
            },
            neighbors: 19,
            triplets_per_midpoint: 2,
            max_error: 0.03,
            scale: ScaledValue {
                value: 0.3,
                dnn_relative: true,
            },
            cut_distance: None,
            min_triplets: 5,
            max_gap: None,
            linkage: Linkage::Single,
            ordered: false,
        }
    }
}

impl CliOptions {
    fn needs_dnn(&self) -> bool {
        self.smoothing_radius.dnn_relative
            || self.scale.dnn_relative
            || self.max_gap.map_or(false, |g| g.dnn_relative)
    }
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut opt = CliOptions::default();
    let mut infile = None;

    let mut i = 1;
    while i < args.len() {
        let take_value = |i: &mut usize| -> Result<String, String> {
            *i += 1;
            args.get(*i)
                .cloned()
                .ok_or_else(|| format!("missing value for {}", args[*i - 1]))
        };

        match args[i].as_str() {
            "-v" => opt.verbosity = opt.verbosity.max(1),
            "-vv" => opt.verbosity = opt.verbosity.max(2),
            "-gnuplot" => opt.gnuplot = true,
            "-ordered" => opt.ordered = true,
            "-r" => {
                let value = take_value(&mut i)?;
                opt.smoothing_radius = parse_scaled("-r", &value).map_err(|e| e.to_string())?;
            }
            "-s" => {
                let value = take_value(&mut i)?;
                opt.scale = parse_scaled("-s", &value).map_err(|e| e.to_string())?;
            }
            "-k" => {
                let value = take_value(&mut i)?;
                opt.neighbors = value
                    .parse()
                    .map_err(|_| format!("invalid value for -k: '{value}'"))?;
            }
            "-n" => {
                let value = take_value(&mut i)?;
                opt.triplets_per_midpoint = value
                    .parse()
                    .map_err(|_| format!("invalid value for -n: '{value}'"))?;
            }
            "-a" => {
                let value = take_value(&mut i)?;
                opt.max_error = value
                    .parse()
                    .map_err(|_| format!("invalid value for -a: '{value}'"))?;
            }
            "-t" => {
                let value = take_value(&mut i)?;
                if value == "auto" || value == "automatic" {
                    opt.cut_distance = None;
                } else {
                    opt.cut_distance = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid value for -t: '{value}'"))?,
                    );
                }
            }
            "-m" => {
                let value = take_value(&mut i)?;
                opt.min_triplets = value
                    .parse()
                    .map_err(|_| format!("invalid value for -m: '{value}'"))?;
            }
            "-dmax" => {
                let value = take_value(&mut i)?;
                if value == "none" {
                    opt.max_gap = None;
                } else {
                    opt.max_gap =
                        Some(parse_scaled("-dmax", &value).map_err(|e| e.to_string())?);
                }
            }
            "-link" => {
                let value = take_value(&mut i)?;
                opt.linkage = Linkage::from_str(&value, true)
                    .map_err(|_| format!("'{value}' is not a valid linkage method"))?;
            }
            "-delim" => {
                let value = take_value(&mut i)?;
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => opt.delimiter = c,
                    _ => return Err("only a single character delimiter is allowed".to_string()),
                }
            }
            "-skip" => {
                let value = take_value(&mut i)?;
                opt.skip = value
                    .parse()
                    .map_err(|_| format!("invalid value for -skip: '{value}'"))?;
            }
            "-oprefix" => {
                let value = take_value(&mut i)?;
                if value.starts_with('-') {
                    return Err("please enter an outfile prefix".to_string());
                }
                opt.oprefix = Some(value);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option '{arg}'"));
            }
            arg => {
                if infile.is_some() {
                    return Err("multiple input files specified".to_string());
                }
                infile = Some(arg.to_string());
            }
        }
        i += 1;
    }

    match infile {
        Some(infile) => {
            opt.infile = infile;
            Ok(opt)
        }
        None => Err("no infile given".to_string()),
    }
}

fn run(opt: &CliOptions) -> Result<u8, (u8, String)> {
    let input_error = |e: Error| (2, format!("in file '{}': {e}", opt.infile));

    let mut cloud = load_csv(&opt.infile, opt.delimiter, opt.skip).map_err(input_error)?;
    if cloud.is_empty() {
        return Err((2, format!("empty cloud in file '{}'", opt.infile)));
    }

    // Resolve dNN-relative lengths against the characteristic length.
    let dnn = if opt.needs_dnn() {
        let dnn = characteristic_length(&cloud).map_err(|e| (3, e.to_string()))?;
        log::info!("computed characteristic length: {dnn}");
        dnn
    } else {
        1.0
    };

    let config = PipelineConfig {
        smoothing_radius: opt.smoothing_radius.resolve(dnn),
        neighbors: opt.neighbors,
        triplets_per_midpoint: opt.triplets_per_midpoint,
        max_error: opt.max_error,
        scale: opt.scale.resolve(dnn),
        cut: match opt.cut_distance {
            Some(t) => CutPolicy::Fixed(t),
            None => CutPolicy::Automatic,
        },
        linkage: opt.linkage,
        min_triplets: opt.min_triplets,
        max_gap: opt.max_gap.map(|g| g.resolve(dnn)),
        ordered: opt.ordered,
    };
    log::info!(
        "smoothing radius: {}, metric scale: {}",
        config.smoothing_radius,
        config.scale
    );

    if opt.verbosity > 1 {
        write_smoothing_debug(&cloud, &config).map_err(|e| (2, e.to_string()))?;
    }

    let group = tracklet::pipeline::run(&mut cloud, &config, opt.gnuplot)
        .map_err(|e| (2, e.to_string()))?;

    let io_error = |e: std::io::Error| (2, e.to_string());
    match &opt.oprefix {
        Some(prefix) => {
            let mut csv = BufWriter::new(File::create(format!("{prefix}.csv")).map_err(io_error)?);
            write_clusters_csv(&mut csv, &cloud).map_err(io_error)?;
            csv.flush().map_err(io_error)?;
            if opt.gnuplot {
                let mut script =
                    BufWriter::new(File::create(format!("{prefix}.gnuplot")).map_err(io_error)?);
                write_clusters_gnuplot(&mut script, &cloud, &group).map_err(io_error)?;
                script.flush().map_err(io_error)?;
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if opt.gnuplot {
                write_clusters_gnuplot(&mut out, &cloud, &group).map_err(io_error)?;
            } else {
                write_clusters_csv(&mut out, &cloud).map_err(io_error)?;
            }
        }
    }
    Ok(0)
}

/// `-vv` trace files: the smoothed cloud and an original-vs-smoothed
/// overlay script.
fn write_smoothing_debug(
    cloud: &tracklet::PointCloud,
    config: &PipelineConfig,
) -> std::io::Result<()> {
    let smoothed = Smoother::new(config.smoothing_radius).apply(cloud);

    let mut csv = BufWriter::new(File::create("debug_smoothed.csv")?);
    write_cloud_csv(&mut csv, &smoothed)?;
    csv.flush()?;

    let mut script = BufWriter::new(File::create("debug_smoothed.gnuplot")?);
    write_smoothing_gnuplot(&mut script, cloud, &smoothed)?;
    script.flush()
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let opt = match parse_args(&args) {
        Ok(opt) => opt,
        Err(message) => {
            eprintln!("[Error] {message}");
            eprintln!("{USAGE}");
            return ExitCode::from(1);
        }
    };

    let level = match opt.verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&opt) {
        Ok(code) => ExitCode::from(code),
        Err((code, message)) => {
            eprintln!("[Error] {message}");
            ExitCode::from(code)
        }
    }
}
