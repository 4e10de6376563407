use clap::{AppSettings, CommandFactory, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    propagate_version = true,
    subcommand_required = true,
    infer_subcommands = true,
    arg_required_else_help = true,
    help_expected = true
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
pub struct Cli {
    /// Logging level [-v: Info, -vv: Debug, -vvv: Trace].
    #[clap(short, long, parse(from_occurrences), help_heading = "DEBUG")]
    pub verbose: usize,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

///
/// This structure contains all the subcommands for gbtools and their help descriptions.
///
/// Because of naming conventions for rust enums the commands names have
/// different capitalization than on the command line.
/// For example, the `PhageFinder` enum is invoked using `gbtools phage-finder`.
///
/// Every subcommand reads a genbank file that may be plain text or gzipped;
/// compression is detected from the first two bytes, not the file name.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the nucleotide, protein, and/or ORF sequences of a genbank file as fasta.
    ///
    /// Proteins use the translation qualifier when it is present, otherwise the CDS is
    /// translated with the genetic code in the transl_table qualifier or `--table`.
    /// Output files ending in `.gz` are compressed.
    #[clap(visible_aliases = &["genbank2sequences", "g2s", "seqs"])]
    Sequences {
        /// Genbank file to read.
        #[clap(short, long, default_value = "-")]
        genbank: String,
        /// Write a complex identifier line with the contig, organism, location, and product.
        #[clap(short, long)]
        complex: bool,
        /// Output file for the amino acid sequences.
        #[clap(short, long)]
        aminoacids: Option<String>,
        /// Output file for the nucleotide sequences of each record.
        #[clap(short, long)]
        nucleotide: Option<String>,
        /// Output file for the nucleotide sequences of each CDS.
        #[clap(short, long)]
        orfs: Option<String>,
        /// NCBI genetic code used when a CDS has no translation (1, 4, or 11).
        #[clap(short, long, default_value_t = 11)]
        table: u8,
    },
    /// Convert a genbank file into a table with the columns of an NCBI ptt file.
    ///
    /// ## output columns:
    /// location, strand, length (codons - 1), GI, gene, synonym, COG, product
    Ptt {
        /// Genbank file to read.
        #[clap(default_value = "-")]
        genbank: String,
        /// Output file, `-` for stdout.
        #[clap(short, long, default_value = "-")]
        output: String,
    },
    /// Convert a genbank file into the tab-delimited gene table used by phage_finder.
    ///
    /// ## output columns:
    /// contig, contig length, gene id, start, end, function
    #[clap(visible_aliases = &["phagefinder", "pf"])]
    PhageFinder {
        /// Genbank file to read.
        #[clap(default_value = "-")]
        genbank: String,
        /// Output file, `-` for stdout.
        #[clap(short, long, default_value = "-")]
        output: String,
    },
    /// List the id and function (product) of every CDS in a genbank file.
    #[clap(visible_aliases = &["funcs"])]
    Functions {
        /// Genbank file to read.
        #[clap(default_value = "-")]
        genbank: String,
        /// Output file, `-` for stdout.
        #[clap(short, long, default_value = "-")]
        output: String,
    },
}

pub fn make_cli_parse() -> Cli {
    Cli::parse()
}

pub fn make_cli_app() -> clap::Command<'static> {
    Cli::command()
}
