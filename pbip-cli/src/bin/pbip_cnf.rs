use std::env;
use std::fs;
use std::io::{self, BufWriter};

use anyhow::Error;
use clap::{App, Arg};
use env_logger::{fmt, Builder, Target};
use log::{info, Level, LevelFilter, Record};

use pbip_dimacs::{write_dimacs, write_pbip_line, PbipParser};
use pbip_gen::{generate, rename_extension_vars};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            log::error!("{}", err);
            2
        }
        Ok(()) => 0,
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

fn main_with_err() -> Result<(), Error> {
    let matches = App::new("pbip-cnf")
        .version(env!("PBIP_VERSION"))
        .arg(Arg::from_usage("-i, --input=<FILE> 'Hint-free PBIP proof (.ipbip)'"))
        .arg(Arg::from_usage("-c, --cnf=<FILE> 'Generated CNF output'"))
        .arg(Arg::from_usage("-o, --output=<FILE> 'Generated, fully-hinted PBIP output'"))
        .arg(Arg::from_usage("-r 'Renumber extension variables by lowest problem-variable partner'"))
        .arg(Arg::from_usage("-v, --verbosity=[LEVEL] 'Verbosity level, 0-4'").default_value("1"))
        .get_matches();

    init_logging();
    info!("pbip-cnf {}", env!("PBIP_VERSION"));

    let input_path = matches.value_of("input").unwrap();
    let input_file = fs::File::open(input_path)?;
    let mut pbip = PbipParser::new(input_file);

    let (mut cnf, lines) = generate(&mut pbip)?;
    let problem_var_count = problem_var_count_before_rename(&lines);
    info!("generated {} clauses over {} variables", cnf.len(), cnf.var_count());

    if matches.is_present("r") {
        rename_extension_vars(&mut cnf, problem_var_count);
    }

    let cnf_path = matches.value_of("cnf").unwrap();
    let mut cnf_out = BufWriter::new(fs::File::create(cnf_path)?);
    write_dimacs(&mut cnf_out, &cnf)?;

    let pbip_path = matches.value_of("output").unwrap();
    let mut pbip_out: Box<dyn io::Write> = if pbip_path == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(BufWriter::new(fs::File::create(pbip_path)?))
    };

    for line in &lines {
        for constraint in &line.constraints {
            write_pbip_line(&mut pbip_out, line.command, constraint, &line.hints)?;
        }
    }

    Ok(())
}

/// The problem-variable boundary the renamer should treat as fixed: the lowest variable index
/// any constraint in the proof mentions directly, below which nothing was ever an extension
/// variable this generator introduced.
fn problem_var_count_before_rename(lines: &[pbip_gen::GeneratedLine]) -> usize {
    lines
        .iter()
        .flat_map(|line| line.constraints.iter())
        .flat_map(|c| c.support())
        .map(|v| v.index() + 1)
        .max()
        .unwrap_or(0)
}
