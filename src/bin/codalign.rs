use clap::{App, Arg, SubCommand};
use codalign::{AlignConfig, AlignError, CodonMatrix, GapModel, MarginalModel, Mode};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
#[macro_use]
extern crate log;

fn model_args(app: App<'static, 'static>) -> App<'static, 'static> {
    app.arg(
        Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .help("Debug mode"),
    )
    .arg(
        Arg::with_name("fasta")
            .long("fasta")
            .short("f")
            .value_name("FASTA")
            .takes_value(true)
            .required(true)
            .help("Input sequences. FASTA format."),
    )
    .arg(
        Arg::with_name("rate")
            .long("rate")
            .short("r")
            .value_name("CSV")
            .takes_value(true)
            .help("Codon rate matrix. Branch length, then 4096 lines of codon,codon,rate."),
    )
    .arg(
        Arg::with_name("branch_length")
            .long("branch_length")
            .short("b")
            .takes_value(true)
            .default_value("0.0133")
            .help("Branch length of the MG94 model. Ignored with --rate."),
    )
}

fn subcommand_align() -> App<'static, 'static> {
    let app = SubCommand::with_name("align")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Align the second sequence to the first, a coding sequence.");
    model_args(app)
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .short("m")
                .takes_value(true)
                .default_value("marginal")
                .possible_values(&["marginal", "frame"])
                .help("marginal: gaps of any length. frame: gaps of whole codons."),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .value_name("PATH")
                .takes_value(true)
                .help("Alignment output, .fasta or .phy. [default: <input stem>.phy]"),
        )
        .arg(
            Arg::with_name("weight")
                .long("weight")
                .short("w")
                .value_name("PATH")
                .takes_value(true)
                .help("Append fasta,mode,weight to this file."),
        )
}

fn subcommand_score() -> App<'static, 'static> {
    let app = SubCommand::with_name("score")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Print the negative log-likelihood of an aligned pair.");
    model_args(app)
}

fn marginal_model(matches: &clap::ArgMatches) -> codalign::Result<MarginalModel> {
    let matrix = match matches.value_of("rate") {
        Some(path) => {
            let rdr = std::fs::File::open(path).map(BufReader::new)?;
            CodonMatrix::from_rate_csv(rdr)?
        }
        None => {
            let branch_length: f64 = matches
                .value_of("branch_length")
                .and_then(|e| e.parse().ok())
                .ok_or_else(|| AlignError::RateMatrix("invalid branch length".to_string()))?;
            CodonMatrix::mg94(branch_length)
        }
    };
    Ok(MarginalModel::new(&matrix))
}

fn output_path(matches: &clap::ArgMatches, fasta: &str) -> codalign::Result<PathBuf> {
    match matches.value_of("output") {
        Some(output) => match Path::new(output).extension().and_then(|x| x.to_str()) {
            Some("fasta") | Some("phy") => Ok(PathBuf::from(output)),
            _ => Err(AlignError::OutputFormat(output.to_string())),
        },
        None => {
            let stem = Path::new(fasta).file_stem().unwrap_or_default();
            Ok(PathBuf::from(stem).with_extension("phy"))
        }
    }
}

fn align(matches: &clap::ArgMatches) -> codalign::Result<()> {
    let fasta = matches.value_of("fasta").unwrap_or_default();
    let output = output_path(matches, fasta)?;
    let records = codalign::fasta::read_fasta(&Some(fasta))?;
    if records.len() < 2 {
        return Err(AlignError::TooFewSequences(records.len()));
    }
    let mode: Mode = matches
        .value_of("mode")
        .and_then(|e| e.parse().ok())
        .unwrap_or(Mode::Marginal);
    let model = marginal_model(matches)?;
    let config = AlignConfig::new(GapModel::default(), mode);
    debug!("Aligning {} to {}", records[1].0, records[0].0);
    let aln = codalign::align_with(&records[0].1, &records[1].1, &model, &config)?;
    info!("WEIGHT\t{}", aln.weight);
    if let Some(path) = matches.value_of("weight") {
        let mut wtr = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)?;
        writeln!(wtr, "{},{},{}", fasta, mode, aln.weight)?;
    }
    let records: Vec<_> = records
        .iter()
        .take(2)
        .zip(aln.seqs)
        .map(|((id, _), seq)| (id.clone(), seq))
        .collect();
    let mut wtr = std::fs::File::create(&output).map(BufWriter::new)?;
    match output.extension().and_then(|x| x.to_str()) {
        Some("fasta") => codalign::fasta::write_fasta(&mut wtr, &records)?,
        _ => codalign::fasta::write_phylip(&mut wtr, &records)?,
    }
    wtr.flush()?;
    Ok(())
}

fn score(matches: &clap::ArgMatches) -> codalign::Result<()> {
    let records = matches
        .value_of("fasta")
        .map(|e| codalign::fasta::read_fasta(&Some(e)))
        .unwrap_or_else(|| Ok(vec![]))?;
    let model = marginal_model(matches)?;
    let rows: Vec<_> = records.iter().map(|x| x.1.as_slice()).collect();
    let weight = codalign::alignment_score(&rows, &model, &GapModel::default())?;
    println!("{}", weight);
    Ok(())
}

fn main() -> codalign::Result<()> {
    let matches = App::new("codalign")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Codon-aware alignment:[FASTA]->[FASTA|PHYLIP] or Score:[FASTA]->weight")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .subcommand(subcommand_align())
        .subcommand(subcommand_score())
        .get_matches();
    if let Some(sub_m) = matches.subcommand().1 {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
    debug!("Start");
    match matches.subcommand() {
        ("align", Some(sub_m)) => align(sub_m),
        ("score", Some(sub_m)) => score(sub_m),
        _ => unreachable!(),
    }
}
