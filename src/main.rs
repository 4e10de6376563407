use anyhow::{bail, Context, Result};
use colored::Colorize;
use env_logger::{Builder, Target};
use gbtools::cli::{self, Commands};
use gbtools::extract::{self, Extractor, FastaRecord};
use gbtools::genbank::{Reader, RecordSource};
use gbtools::myio;
use gbtools::translate::GeneticCode;
use log::LevelFilter;
use needletail::parser::{write_fasta, LineEnding};
use std::fmt::Display;
use std::io::Write;
use std::time::Instant;

fn main() -> Result<()> {
    parse_cli()
}

/// Write each sequence as an unwrapped fasta record.
fn write_fasta_records<I>(records: I, out: &str) -> Result<usize>
where
    I: Iterator<Item = gbtools::error::Result<FastaRecord>>,
{
    let mut writer = myio::writer(out)?;
    let mut count = 0;
    for rec in records {
        let rec = rec?;
        write_fasta(
            rec.header.as_bytes(),
            &rec.seq,
            &mut writer,
            LineEnding::Unix,
        )
        .with_context(|| format!("Error writing {} to {}", rec.header, out))?;
        count += 1;
    }
    writer.flush()?;
    log::info!("Wrote {} sequences to {}", count, out);
    Ok(count)
}

/// Write one tab-separated row per line.
fn write_rows<I, T>(rows: I, out: &str) -> Result<usize>
where
    I: Iterator<Item = gbtools::error::Result<T>>,
    T: Display,
{
    let mut writer = myio::writer(out)?;
    let mut count = 0;
    for row in rows {
        writeln!(writer, "{}", row?)?;
        count += 1;
    }
    writer.flush()?;
    log::info!("Wrote {} rows to {}", count, out);
    Ok(count)
}

pub fn parse_cli() -> Result<()> {
    let pg_start = Instant::now();
    let args = cli::make_cli_parse();
    let matches = cli::make_cli_app().get_matches();
    let subcommand = matches.subcommand_name().unwrap_or_default().to_string();

    // set the logging level
    let min_log_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .target(Target::Stderr)
        .filter(None, min_log_level)
        .init();

    log::debug!("DEBUG logging enabled");
    log::trace!("TRACE logging enabled");

    match &args.command {
        //
        // Run Sequences
        //
        Some(Commands::Sequences {
            genbank,
            complex,
            aminoacids,
            nucleotide,
            orfs,
            table,
        }) => {
            let passes = [nucleotide, aminoacids, orfs]
                .iter()
                .filter(|out| out.is_some())
                .count();
            if passes == 0 {
                bail!("Please provide an output file with -n, -a, or -o (or any combination)");
            }
            let code = GeneticCode::try_from(*table)?;
            let extractor = Extractor::new(*complex, code);
            let source = RecordSource::open(genbank, passes)?;
            if let Some(out) = nucleotide {
                write_fasta_records(extract::extract_nucleotide(source.records()?), out)?;
            }
            if let Some(out) = aminoacids {
                write_fasta_records(extractor.proteins(source.records()?), out)?;
            }
            if let Some(out) = orfs {
                write_fasta_records(extractor.orfs(source.records()?), out)?;
            }
        }
        //
        // Run Ptt
        //
        Some(Commands::Ptt { genbank, output }) => {
            let rows = extract::to_ptt_table(Reader::from_path(genbank)?)?;
            write_rows(rows.into_iter().map(Ok), output)?;
        }
        //
        // Run PhageFinder
        //
        Some(Commands::PhageFinder { genbank, output }) => {
            let records = Reader::from_path(genbank)?;
            write_rows(extract::to_phage_finder_table(records), output)?;
        }
        //
        // Run Functions
        //
        Some(Commands::Functions { genbank, output }) => {
            let records = Reader::from_path(genbank)?;
            write_rows(extract::extract_functions(records), output)?;
        }
        //
        // no command opt
        //
        None => {}
    };

    let duration = pg_start.elapsed();
    log::info!(
        "{} done! Time elapsed: {}",
        subcommand.bright_green().bold(),
        format!("{:.2?}", duration).bright_yellow().bold()
    );
    Ok(())
}
