use super::error::{FeatureError, Result};
use super::genbank::{strand_symbol, Feature, Record};
use super::translate::GeneticCode;
use bio::alphabets::dna::revcomp;
use bio_types::strand::Strand;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref GI_RE: Regex = Regex::new(r"^GI:(\d+)").unwrap();
    static ref COG_RE: Regex = Regex::new(r"^(COG\S+)").unwrap();
}

/// Function given to a CDS without a product.
pub static HYPOTHETICAL: &str = "hypothetical protein";

/// Qualifiers that name a CDS, in order of preference.
static ID_QUALIFIERS: [&str; 3] = ["protein_id", "locus_tag", "db_xref"];

/// A CDS whose location and strand have been checked against its record.
#[derive(Debug, Clone, Copy)]
pub struct CodingFeature<'a> {
    pub record: &'a Record,
    pub feature: &'a Feature,
}

impl<'a> CodingFeature<'a> {
    /// Validate a feature against its record, `index` is only used in messages.
    pub fn new(
        record: &'a Record,
        feature: &'a Feature,
        index: usize,
    ) -> std::result::Result<CodingFeature<'a>, FeatureError> {
        if !feature.has_location() {
            return Err(FeatureError::MissingLocation {
                record: record.id.clone(),
                index,
            });
        }
        let len = record.seq.len();
        for &(start, end) in &feature.segments {
            if start > end {
                return Err(FeatureError::InvertedBounds {
                    record: record.id.clone(),
                    index,
                    start,
                    end,
                });
            }
            if start < 0 || end > len as i64 {
                return Err(FeatureError::OutOfBounds {
                    record: record.id.clone(),
                    index,
                    start,
                    end,
                    len,
                });
            }
        }
        if feature.strand == Strand::Unknown {
            return Err(FeatureError::UnknownStrand {
                record: record.id.clone(),
                index,
            });
        }
        Ok(CodingFeature { record, feature })
    }

    pub fn is_reverse(&self) -> bool {
        self.feature.strand == Strand::Reverse
    }

    /// First of protein_id, locus_tag, or db_xref that is present (values joined
    /// with `|`), otherwise `<record>.<location>`.
    pub fn id(&self) -> String {
        ID_QUALIFIERS
            .iter()
            .filter_map(|key| self.feature.joined_qualifier(key, "|"))
            .find(|id| !id.is_empty())
            .unwrap_or_else(|| format!("{}.{}", self.record.id, self.feature.location_string()))
    }

    /// Start and stop in reading direction, swapped on the reverse strand.
    pub fn start_stop(&self) -> (i64, i64) {
        if self.is_reverse() {
            (self.feature.end, self.feature.start)
        } else {
            (self.feature.start, self.feature.end)
        }
    }

    /// The fasta header, optionally with the contig, organism, location, and product.
    pub fn header(&self, complex: bool) -> String {
        let mut header = self.id();
        if !complex {
            return header;
        }
        let rec_id = &self.record.id;
        let (start, stop) = self.start_stop();
        header.push_str(&format!(" [{}]", rec_id));
        if let Some(organism) = self.record.organism() {
            header.push_str(&format!(" [{}]", organism));
        }
        header.push_str(&format!(" [{}_{}_{}]", rec_id, start, stop));
        match self.feature.first_qualifier("product") {
            Some(product) => header.push_str(&format!(" {}", product)),
            None => header.push_str(&format!(" [{}]", HYPOTHETICAL)),
        }
        header
    }

    /// Bases of the CDS in reading direction.
    pub fn nucleotides(&self) -> Vec<u8> {
        let mut seq = Vec::with_capacity(self.feature.span_length() as usize);
        for &(start, end) in &self.feature.segments {
            seq.extend_from_slice(&self.record.seq[start as usize..end as usize]);
        }
        if self.is_reverse() {
            seq = revcomp(seq);
        }
        seq
    }

    /// Genetic code named by the transl_table qualifier, else `default`.
    pub fn genetic_code(&self, default: GeneticCode) -> GeneticCode {
        let table = match self.feature.first_qualifier("transl_table") {
            Some(table) => table,
            None => return default,
        };
        match table.trim().parse::<u8>().map(GeneticCode::try_from) {
            Ok(Ok(code)) => code,
            _ => {
                log::debug!(
                    "{}: transl_table {} is not supported, using table {}",
                    self.id(),
                    table,
                    default
                );
                default
            }
        }
    }

    /// The translation qualifier if present, otherwise the translated CDS.
    pub fn protein(&self, default: GeneticCode) -> Vec<u8> {
        match self.feature.first_qualifier("translation") {
            Some(translation) => translation.as_bytes().to_vec(),
            None => self
                .genetic_code(default)
                .translate(&self.nucleotides())
                .into_bytes(),
        }
    }

    /// Product values joined by `sep`.
    pub fn product(&self, sep: &str) -> Option<String> {
        self.feature.joined_qualifier("product", sep)
    }
}

/// Every CDS in a record, in order, either validated or with the reason it
/// cannot be used.
pub fn coding_features(
    record: &Record,
) -> impl Iterator<Item = std::result::Result<CodingFeature<'_>, FeatureError>> {
    record
        .features
        .iter()
        .filter(|feat| feat.is_cds())
        .enumerate()
        .map(move |(idx, feat)| CodingFeature::new(record, feat, idx + 1))
}

/// Usable CDSs of a record, unusable ones are logged and dropped.
fn usable_coding_features(record: &Record) -> impl Iterator<Item = CodingFeature<'_>> {
    coding_features(record).filter_map(|cds| match cds {
        Ok(cds) => Some(cds),
        Err(e) => {
            log::warn!("Skipping feature: {}", e);
            None
        }
    })
}

/// Lazily apply `f` to every usable CDS, one record at a time. Read errors are
/// passed through.
fn per_feature<I, T, F>(records: I, mut f: F) -> impl Iterator<Item = Result<T>>
where
    I: IntoIterator<Item = Result<Record>>,
    F: FnMut(&CodingFeature) -> T,
{
    records.into_iter().flat_map(move |rec| -> Vec<Result<T>> {
        match rec {
            Ok(rec) => usable_coding_features(&rec).map(|cds| Ok(f(&cds))).collect(),
            Err(e) => vec![Err(e)],
        }
    })
}

/// A sequence ready to be written as fasta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub record_id: String,
    pub header: String,
    pub seq: Vec<u8>,
}

impl fmt::Display for FastaRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            ">{}\n{}",
            self.header,
            String::from_utf8_lossy(&self.seq)
        )
    }
}

/// One line of a ptt style table.
///
/// `gi` and `cog` are only filled when the text starts with the tag: the
/// `db_xref` values joined by spaces must begin with `GI:<digits>` and the
/// product must begin with `COG<non-space>`. A tag later in the text gives `-`.
#[derive(Debug, Clone, PartialEq)]
pub struct PttRow {
    pub location: String,
    pub strand: char,
    /// `(length / 3) - 1`, not rounded.
    pub codons: f64,
    pub gi: String,
    pub gene: String,
    pub synonym: String,
    pub cog: String,
    pub product: String,
}

impl fmt::Display for PttRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.location,
            self.strand,
            self.codons,
            self.gi,
            self.gene,
            self.synonym,
            self.cog,
            self.product
        )
    }
}

impl PttRow {
    fn new(cds: &CodingFeature) -> PttRow {
        let feat = cds.feature;
        let db_xref = feat.joined_qualifier("db_xref", " ").unwrap_or_default();
        let gi = GI_RE
            .captures(&db_xref)
            .map_or_else(|| "-".to_string(), |caps| caps[1].to_string());
        let product = cds.product(" ");
        let cog = product
            .as_deref()
            .and_then(|p| COG_RE.captures(p))
            .map_or_else(|| "-".to_string(), |caps| caps[1].to_string());
        let gene = feat
            .joined_qualifier("gene", " ")
            .unwrap_or_else(|| feat.location_string());

        PttRow {
            location: format!("{}..{}", feat.start, feat.end),
            strand: strand_symbol(feat.strand),
            codons: (feat.span_length() as f64 / 3.0) - 1.0,
            gi,
            gene,
            synonym: cds.id(),
            cog,
            product: product.unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// One line of the gene table read by phage_finder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhageFinderRow {
    pub record_id: String,
    pub record_len: usize,
    pub id: String,
    pub start: i64,
    pub end: i64,
    pub function: String,
}

impl fmt::Display for PhageFinderRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.record_id, self.record_len, self.id, self.start, self.end, self.function
        )
    }
}

/// CDS id and its function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRow {
    pub id: String,
    pub function: String,
}

impl fmt::Display for FunctionRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", self.id, self.function)
    }
}

/// Settings shared by the sequence producers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    pub complex_header: bool,
    /// Used for a CDS without a translation or a supported transl_table.
    pub genetic_code: GeneticCode,
}

impl Extractor {
    pub fn new(complex_header: bool, genetic_code: GeneticCode) -> Extractor {
        Extractor {
            complex_header,
            genetic_code,
        }
    }

    pub fn proteins<I>(self, records: I) -> impl Iterator<Item = Result<FastaRecord>>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        per_feature(records, move |cds| FastaRecord {
            record_id: cds.record.id.clone(),
            header: cds.header(self.complex_header),
            seq: cds.protein(self.genetic_code),
        })
    }

    pub fn orfs<I>(self, records: I) -> impl Iterator<Item = Result<FastaRecord>>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        per_feature(records, move |cds| FastaRecord {
            record_id: cds.record.id.clone(),
            header: cds.header(self.complex_header),
            seq: cds.nucleotides(),
        })
    }
}

/// The id and full sequence of every record.
/// # Example
/// ```
/// use gbtools::genbank::Reader;
/// use gbtools::extract::extract_nucleotide;
/// let seqs: Vec<_> = extract_nucleotide(Reader::from_path(".test/small.gbk").unwrap())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(seqs[0].header, "NC_TEST1.1");
/// assert_eq!(seqs[0].seq.len(), 60);
/// ```
pub fn extract_nucleotide<I>(records: I) -> impl Iterator<Item = Result<FastaRecord>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    records.into_iter().map(|rec| {
        rec.map(|rec| FastaRecord {
            record_id: rec.id.clone(),
            header: rec.id,
            seq: rec.seq,
        })
    })
}

/// Protein sequence of every CDS, translated with table 11 when the
/// translation qualifier is missing.
pub fn extract_protein<I>(
    records: I,
    complex_header: bool,
) -> impl Iterator<Item = Result<FastaRecord>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    Extractor::new(complex_header, GeneticCode::Bacterial).proteins(records)
}

/// Nucleotide sequence of every CDS in reading direction.
pub fn extract_orfs<I>(records: I, complex_header: bool) -> impl Iterator<Item = Result<FastaRecord>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    Extractor::new(complex_header, GeneticCode::Bacterial).orfs(records)
}

/// Ptt style rows for every CDS, in file order.
pub fn to_ptt_table<I>(records: I) -> Result<Vec<PttRow>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    per_feature(records, PttRow::new).collect()
}

pub fn to_phage_finder_table<I>(records: I) -> impl Iterator<Item = Result<PhageFinderRow>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    per_feature(records, |cds| PhageFinderRow {
        record_id: cds.record.id.clone(),
        record_len: cds.record.seq.len(),
        id: cds.id(),
        start: cds.feature.start,
        end: cds.feature.end,
        function: cds.product(" ").unwrap_or_else(|| HYPOTHETICAL.to_string()),
    })
}

/// Id and product (values joined with `|`) of every CDS.
pub fn extract_functions<I>(records: I) -> impl Iterator<Item = Result<FunctionRow>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    per_feature(records, |cds| FunctionRow {
        id: cds.id(),
        function: cds.product("|").unwrap_or_else(|| HYPOTHETICAL.to_string()),
    })
}
