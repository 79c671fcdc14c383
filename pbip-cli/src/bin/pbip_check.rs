use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};

use anyhow::Error;
use clap::{App, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info, Level, LevelFilter, Record};
use serde::Deserialize;

use pbip_checker::{check, CheckStatus, CheckerConfig};
use pbip_dimacs::cnf::DimacsParser;
use pbip_dimacs::PbipParser;
use pbip_lrat::TextLratWriter;

/// The subset of [`CheckerConfig`] a `--config` TOML file may override.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigOverrides {
    bdd_only: Option<bool>,
    reorder: Option<bool>,
    sdp_reduce: Option<bool>,
    verbosity: Option<u8>,
    gc_threshold: Option<usize>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut CheckerConfig) {
        if let Some(v) = self.bdd_only {
            config.bdd_only = v;
        }
        if let Some(v) = self.reorder {
            config.reorder = v;
        }
        if let Some(v) = self.sdp_reduce {
            config.sdp_reduce = v;
        }
        if let Some(v) = self.verbosity {
            config.verbosity = v;
        }
        if let Some(v) = self.gc_threshold {
            config.gc_threshold = v;
        }
    }
}

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            2
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        use std::io::Write;
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("PBIP_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("pbip-check")
        .version(env!("PBIP_VERSION"))
        .arg(
            Arg::from_usage("-i, --input=<FILE> 'CNF input formula'"),
        )
        .arg(Arg::from_usage("-p, --proof=<FILE> 'PBIP proof to check'"))
        .arg(Arg::from_usage("-o, --output=[FILE] 'LRAT output (stdout if omitted)'"))
        .arg(Arg::from_usage("-v, --verbosity=[LEVEL] 'Verbosity level, 0-4'").default_value("1"))
        .arg(Arg::from_usage("-b 'Skip the clause shortcut, always build the full BDD'"))
        .arg(Arg::from_usage("-S 'Disable SDP, use the bucket-elimination reducer'"))
        .arg(Arg::from_usage("-R 'Disable extension-variable reordering'"))
        .arg_from_usage("[config-file] --config=[FILE] 'Read checker options from a TOML file'")
        .get_matches();

    init_logging();
    info!("pbip-check {}", env!("PBIP_VERSION"));

    let mut config = CheckerConfig::default();
    config.bdd_only = matches.is_present("b");
    config.sdp_reduce = !matches.is_present("S");
    config.reorder = !matches.is_present("R");
    config.verbosity = matches.value_of("verbosity").unwrap().parse()?;

    if let Some(config_path) = matches.value_of("config-file") {
        let contents = fs::read_to_string(config_path)?;
        let overrides: ConfigOverrides = toml::from_str(&contents)?;
        overrides.apply(&mut config);
    }

    let cnf_path = matches.value_of("input").unwrap();
    let cnf_file = fs::File::open(cnf_path)?;
    let cnf = DimacsParser::parse(cnf_file)?;
    info!("read {} clauses over {} variables", cnf.len(), cnf.var_count());

    let pbip_path = matches.value_of("proof").unwrap();
    let pbip_file = fs::File::open(pbip_path)?;
    let mut pbip = PbipParser::new(pbip_file);

    let (status, _sink) = match matches.value_of("output") {
        Some(path) => {
            let sink: TextLratWriter<Box<dyn Write>> =
                TextLratWriter::new(Box::new(BufWriter::new(fs::File::create(path)?)));
            check(&cnf, &mut pbip, config, sink)?
        }
        None => {
            let sink: TextLratWriter<Box<dyn Write>> = TextLratWriter::new(Box::new(io::stdout()));
            check(&cnf, &mut pbip, config, sink)?
        }
    };

    match status {
        CheckStatus::Unsat => {
            println!("PBIP UNSAT");
            Ok(0)
        }
        CheckStatus::Unknown => {
            println!("PBIP UNKNOWN");
            Ok(1)
        }
    }
}
