use super::error::{Error, Result};
use super::myio;
use bio_types::strand::Strand;
use gb_io::reader::SeqReader;
use gb_io::seq::{Location, Seq};
use itertools::Itertools;
use linear_map::LinearMap;
use std::io::BufRead;

/// Qualifier key to every value given for that key, in file order.
pub type Qualifiers = LinearMap<String, Vec<String>>;

/// One annotated region of a record. Coordinates are 0-based and half open.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    /// Pieces of a joined location in the order they are read on the forward
    /// strand. Empty when the location could not be resolved.
    pub segments: Vec<(i64, i64)>,
    pub qualifiers: Qualifiers,
}

impl Feature {
    /// # Example
    /// ```
    /// use bio_types::strand::Strand;
    /// use gbtools::genbank::Feature;
    /// let feat = Feature::new("CDS", 0, 12, Strand::Forward).with_qualifier("gene", "abc");
    /// assert_eq!(feat.location_string(), "[0:12](+)");
    /// assert_eq!(feat.first_qualifier("gene"), Some("abc"));
    /// ```
    pub fn new(kind: &str, start: i64, end: i64, strand: Strand) -> Feature {
        Feature {
            kind: kind.to_string(),
            start,
            end,
            strand,
            segments: vec![(start, end)],
            qualifiers: Qualifiers::new(),
        }
    }

    /// A feature whose location did not resolve to coordinates.
    pub fn unlocated(kind: &str) -> Feature {
        Feature {
            kind: kind.to_string(),
            start: 0,
            end: 0,
            strand: Strand::Unknown,
            segments: Vec::new(),
            qualifiers: Qualifiers::new(),
        }
    }

    /// Build a feature from ordered pieces, bounds are taken from the pieces.
    pub fn joined(kind: &str, segments: Vec<(i64, i64)>, strand: Strand) -> Feature {
        let start = segments.iter().map(|s| s.0).min().unwrap_or(0);
        let end = segments.iter().map(|s| s.1).max().unwrap_or(0);
        Feature {
            kind: kind.to_string(),
            start,
            end,
            strand,
            segments,
            qualifiers: Qualifiers::new(),
        }
    }

    pub fn with_qualifier(mut self, key: &str, value: &str) -> Feature {
        self.qualifiers
            .entry(key.to_string())
            .or_insert(Vec::new())
            .push(value.to_string());
        self
    }

    pub fn is_cds(&self) -> bool {
        self.kind == "CDS"
    }

    pub fn has_location(&self) -> bool {
        !self.segments.is_empty()
    }

    pub fn qualifier(&self, key: &str) -> Option<&[String]> {
        self.qualifiers.get(key).map(|v| v.as_slice())
    }

    pub fn first_qualifier(&self, key: &str) -> Option<&str> {
        self.qualifier(key)
            .and_then(|v| v.first())
            .map(|v| v.as_str())
    }

    /// All values of a qualifier joined by `sep`.
    pub fn joined_qualifier(&self, key: &str, sep: &str) -> Option<String> {
        self.qualifier(key).map(|v| v.iter().join(sep))
    }

    /// Number of bases covered by the location.
    pub fn span_length(&self) -> i64 {
        self.segments.iter().map(|(st, en)| en - st).sum()
    }

    /// Location in the `[start:end](strand)` notation.
    /// # Example
    /// ```
    /// use bio_types::strand::Strand;
    /// use gbtools::genbank::Feature;
    /// let feat = Feature::joined("CDS", vec![(0, 3), (6, 12)], Strand::Reverse);
    /// assert_eq!(feat.location_string(), "join{[0:3](-), [6:12](-)}");
    /// ```
    pub fn location_string(&self) -> String {
        let symbol = strand_symbol(self.strand);
        match self.segments.len() {
            0 => format!("[{}:{}]({})", self.start, self.end, symbol),
            1 => format!(
                "[{}:{}]({})",
                self.segments[0].0, self.segments[0].1, symbol
            ),
            _ => format!(
                "join{{{}}}",
                self.segments
                    .iter()
                    .map(|(st, en)| format!("[{}:{}]({})", st, en, symbol))
                    .join(", ")
            ),
        }
    }
}

/// One contig or chromosome from a genbank file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub seq: Vec<u8>,
    pub annotations: LinearMap<String, String>,
    pub features: Vec<Feature>,
}

impl Record {
    pub fn new(id: &str, seq: &[u8]) -> Record {
        Record {
            id: id.to_string(),
            seq: seq.to_vec(),
            annotations: LinearMap::new(),
            features: Vec::new(),
        }
    }

    pub fn organism(&self) -> Option<&str> {
        self.annotations.get("organism").map(|o| o.as_str())
    }
}

/// `+`, `-`, or `?` for a strand.
pub fn strand_symbol(strand: Strand) -> char {
    match strand {
        Strand::Forward => '+',
        Strand::Reverse => '-',
        Strand::Unknown => '?',
    }
}

fn flip(strand: Strand) -> Strand {
    match strand {
        Strand::Forward => Strand::Reverse,
        Strand::Reverse => Strand::Forward,
        Strand::Unknown => Strand::Unknown,
    }
}

/// Strand implied by the shape of a location, mixed joins are unknown.
fn location_strand(loc: &Location) -> Strand {
    match loc {
        Location::Range(..) | Location::Between(..) => Strand::Forward,
        Location::Complement(inner) => flip(location_strand(inner)),
        Location::Join(parts) | Location::Order(parts) => {
            let strands: Vec<Strand> = parts.iter().map(location_strand).dedup().collect();
            match strands.as_slice() {
                [single] => *single,
                _ => Strand::Unknown,
            }
        }
        Location::Bond(_) | Location::OneOf(_) | Location::External(..) | Location::Gap(_) => {
            Strand::Unknown
        }
    }
}

/// Pieces of a location ordered as they read on the forward strand, so the
/// reverse strand sequence is the reverse complement of their concatenation.
fn location_segments(loc: &Location) -> Option<Vec<(i64, i64)>> {
    match loc {
        Location::Range((st, _), (en, _)) => Some(vec![(*st, *en)]),
        Location::Complement(inner) => location_segments(inner),
        Location::Join(parts) | Location::Order(parts) => {
            let mut chunks = parts
                .iter()
                .map(location_segments)
                .collect::<Option<Vec<_>>>()?;
            if location_strand(loc) == Strand::Reverse {
                chunks.reverse();
            }
            Some(chunks.into_iter().flatten().collect())
        }
        Location::Between(..)
        | Location::Bond(_)
        | Location::OneOf(_)
        | Location::External(..)
        | Location::Gap(_) => None,
    }
}

/// Joins the continuation lines of a wrapped qualifier value with one space.
/// A wrapped `translation` is a single peptide and loses all whitespace.
/// # Example
/// ```
/// use gbtools::genbank::unwrap_qualifier;
/// assert_eq!(unwrap_qualifier("product", "tail fiber\n  protein"), "tail fiber protein");
/// assert_eq!(unwrap_qualifier("translation", "MKKL\n  PQRS"), "MKKLPQRS");
/// ```
pub fn unwrap_qualifier(key: &str, value: &str) -> String {
    if key == "translation" {
        value.split_whitespace().collect()
    } else {
        value
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .join(" ")
    }
}

impl From<&gb_io::seq::Feature> for Feature {
    fn from(feat: &gb_io::seq::Feature) -> Feature {
        let kind = feat.kind.to_string();
        let mut rtn = match location_segments(&feat.location) {
            Some(segments) if !segments.is_empty() => {
                Feature::joined(&kind, segments, location_strand(&feat.location))
            }
            _ => {
                log::debug!("unable to resolve {} location {:?}", kind, feat.location);
                Feature::unlocated(&kind)
            }
        };
        for (key, value) in &feat.qualifiers {
            let key = key.to_string();
            let value = unwrap_qualifier(&key, value.as_deref().unwrap_or_default());
            rtn.qualifiers.entry(key).or_insert(Vec::new()).push(value);
        }
        rtn
    }
}

fn first_token(text: &Option<String>) -> Option<String> {
    text.as_ref()
        .and_then(|t| t.split_whitespace().next())
        .map(|t| t.to_string())
}

impl From<Seq> for Record {
    /// The record id is the VERSION, then the first ACCESSION, then the LOCUS name.
    fn from(seq: Seq) -> Record {
        let id = first_token(&seq.version)
            .or_else(|| first_token(&seq.accession))
            .or_else(|| first_token(&seq.name))
            .unwrap_or_else(|| "unknown".to_string());

        let mut annotations = LinearMap::new();
        if let Some(organism) = seq.source.as_ref().and_then(|s| s.organism.as_ref()) {
            // the organism block also carries the lineage on later lines
            let name = organism.lines().next().unwrap_or_default().trim();
            annotations.insert("organism".to_string(), name.to_string());
        }

        let features = seq.features.iter().map(Feature::from).collect();
        Record {
            id,
            seq: seq.seq.to_ascii_uppercase(),
            annotations,
            features,
        }
    }
}

/// Streams `Record`s out of a plain or gzipped genbank file.
/// The stream ends after the first parse error.
pub struct Reader {
    path: String,
    records: SeqReader<Box<dyn BufRead>>,
    index: usize,
    failed: bool,
}

impl Reader {
    pub fn new(path: &str, handle: Box<dyn BufRead>) -> Reader {
        Reader {
            path: path.to_string(),
            records: SeqReader::new(handle),
            index: 0,
            failed: false,
        }
    }

    /// Open a genbank file, `-` reads from stdin.
    /// # Example
    /// ```
    /// use gbtools::genbank::Reader;
    /// let records: Vec<_> = Reader::from_path(".test/small.gbk").unwrap().collect();
    /// assert_eq!(records.len(), 2);
    /// ```
    pub fn from_path(path: &str) -> Result<Reader> {
        let handle = myio::reader(path)?;
        log::info!("Reading genbank file: {}", path);
        Ok(Reader::new(path, handle))
    }
}

impl Iterator for Reader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let rec = self.records.next()?;
        self.index += 1;
        match rec {
            Ok(seq) => {
                let rec = Record::from(seq);
                log::debug!(
                    "Parsed {} ({} bp, {} features)",
                    rec.id,
                    rec.seq.len(),
                    rec.features.len()
                );
                Some(Ok(rec))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(Error::Parse {
                    path: self.path.clone(),
                    index: self.index,
                    message: e.to_string(),
                }))
            }
        }
    }
}

/// Where the records for one or more passes over a genbank file come from.
/// A file can be reopened for every pass, stdin can only be read once and is
/// kept in memory when it has to be read more than once.
pub enum RecordSource {
    Stream(String),
    Buffered(Vec<Record>),
}

impl RecordSource {
    /// Prepare `passes` reads of `path`.
    pub fn open(path: &str, passes: usize) -> Result<RecordSource> {
        if path == "-" && passes > 1 {
            log::debug!("Keeping stdin in memory for {} passes", passes);
            RecordSource::buffer(Reader::from_path(path)?)
        } else {
            Ok(RecordSource::Stream(path.to_string()))
        }
    }

    /// Read every record now, stopping at the first parse error.
    pub fn buffer(reader: Reader) -> Result<RecordSource> {
        Ok(RecordSource::Buffered(reader.collect::<Result<Vec<_>>>()?))
    }

    /// One pass over the records.
    pub fn records(&self) -> Result<Box<dyn Iterator<Item = Result<Record>> + '_>> {
        match self {
            RecordSource::Stream(path) => Ok(Box::new(Reader::from_path(path)?)),
            RecordSource::Buffered(records) => Ok(Box::new(records.iter().cloned().map(Ok))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Vec<Record> {
        Reader::from_path(".test/small.gbk")
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_record_ids_and_annotations() {
        let recs = small();
        assert_eq!(recs[0].id, "NC_TEST1.1");
        assert_eq!(recs[0].seq.len(), 60);
        assert_eq!(recs[0].organism(), Some("Testus phagus"));
        assert_eq!(recs[0].annotations.keys().collect::<Vec<_>>(), vec!["organism"]);
        assert_eq!(recs[1].id, "SEQ2");
        assert_eq!(recs[1].seq.len(), 30);
        assert_eq!(recs[1].organism(), None);
    }

    #[test]
    fn test_feature_locations() {
        let recs = small();
        let cds: Vec<&Feature> = recs[0].features.iter().filter(|f| f.is_cds()).collect();
        assert_eq!(cds.len(), 4);

        assert_eq!((cds[0].start, cds[0].end, cds[0].strand), (0, 9, Strand::Forward));
        assert_eq!(cds[0].first_qualifier("locus_tag"), Some("geneA"));

        assert_eq!((cds[1].start, cds[1].end, cds[1].strand), (12, 21, Strand::Reverse));
        assert_eq!(cds[1].location_string(), "[12:21](-)");

        assert_eq!(cds[2].segments, vec![(30, 33), (36, 42)]);
        assert_eq!(cds[2].span_length(), 9);
        assert_eq!(cds[2].strand, Strand::Forward);

        // join(1..3,complement(10..12))
        assert_eq!(cds[3].strand, Strand::Unknown);
    }

    #[test]
    fn test_gzip_input() {
        let plain = small();
        let gz = Reader::from_path(".test/small.gbk.gz")
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(plain, gz);
    }

    #[test]
    fn test_wrapped_qualifiers_are_joined() {
        let recs = Reader::from_path(".test/wrapped.gbk")
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(recs[0].organism(), Some("Testus phagus"));
        let cds: Vec<&Feature> = recs[0].features.iter().filter(|f| f.is_cds()).collect();
        assert_eq!(
            cds[0].first_qualifier("product"),
            Some("a very long product name that wraps over more than one line in the file")
        );
        assert_eq!(
            cds[0].first_qualifier("translation"),
            Some("MKKLLPQRSTVWYACDEFGHIKLMNPQRSTVWYACDEFGHIKLMNPQRSTVWYACDEFGHIK")
        );
        for feat in cds {
            for value in feat.qualifiers.values().flatten() {
                assert!(!value.contains('\n'), "{:?}", value);
            }
        }
    }

    #[test]
    fn test_unwrap_qualifier() {
        assert_eq!(unwrap_qualifier("note", "one line"), "one line");
        assert_eq!(unwrap_qualifier("note", "first\r\n     second\n\n third"), "first second third");
        assert_eq!(unwrap_qualifier("translation", " MK\n   KL \n"), "MKKL");
        assert_eq!(unwrap_qualifier("codon_start", ""), "");
    }

    #[test]
    fn test_buffered_source_is_read_more_than_once() {
        let text = std::fs::read(".test/small.gbk").unwrap();
        let reader = Reader::new("-", Box::new(std::io::Cursor::new(text)));
        let source = RecordSource::buffer(reader).unwrap();
        let first = source.records().unwrap().collect::<Result<Vec<_>>>().unwrap();
        let second = source.records().unwrap().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(first, small());
    }

    #[test]
    fn test_files_are_streamed_on_every_pass() {
        let source = RecordSource::open(".test/small.gbk", 3).unwrap();
        assert!(matches!(source, RecordSource::Stream(_)));
        for _ in 0..3 {
            assert_eq!(source.records().unwrap().count(), 2);
        }
        assert!(matches!(
            RecordSource::open(".test/missing.gbk", 1).unwrap().records(),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_qualifier_order_and_join() {
        let feat = Feature::new("CDS", 0, 9, Strand::Forward)
            .with_qualifier("db_xref", "GI:1")
            .with_qualifier("note", "x")
            .with_qualifier("db_xref", "GeneID:2");
        assert_eq!(
            feat.joined_qualifier("db_xref", "|"),
            Some("GI:1|GeneID:2".to_string())
        );
        let keys: Vec<&String> = feat.qualifiers.keys().collect();
        assert_eq!(keys, vec!["db_xref", "note"]);
    }
}
