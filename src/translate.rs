use super::error::Error;
use std::fmt;

/// Amino acids for every codon, bases ordered T, C, A, G (NCBI layout).
static STANDARD_AAS: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
static MOLD_AAS: &[u8; 64] =
    b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// NCBI genetic codes that can be used to translate a CDS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneticCode {
    /// Table 1.
    Standard,
    /// Table 4, TGA reads through as tryptophan.
    MoldMycoplasma,
    /// Table 11, same codons as table 1 with more alternative starts.
    Bacterial,
}

impl Default for GeneticCode {
    fn default() -> Self {
        GeneticCode::Bacterial
    }
}

impl TryFrom<u8> for GeneticCode {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(GeneticCode::Standard),
            4 => Ok(GeneticCode::MoldMycoplasma),
            11 => Ok(GeneticCode::Bacterial),
            _ => Err(Error::UnsupportedTable(id)),
        }
    }
}

impl fmt::Display for GeneticCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.table_id())
    }
}

fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

impl GeneticCode {
    pub fn table_id(&self) -> u8 {
        match self {
            GeneticCode::Standard => 1,
            GeneticCode::MoldMycoplasma => 4,
            GeneticCode::Bacterial => 11,
        }
    }

    fn amino_acids(&self) -> &'static [u8; 64] {
        match self {
            GeneticCode::MoldMycoplasma => MOLD_AAS,
            GeneticCode::Standard | GeneticCode::Bacterial => STANDARD_AAS,
        }
    }

    /// Amino acid for a single codon, `X` if any base is ambiguous.
    /// # Example
    /// ```
    /// use gbtools::translate::GeneticCode;
    /// let code = GeneticCode::default();
    /// assert_eq!(code.codon(b"ATG"), b'M');
    /// assert_eq!(code.codon(b"tga"), b'*');
    /// assert_eq!(code.codon(b"ANG"), b'X');
    /// ```
    pub fn codon(&self, codon: &[u8; 3]) -> u8 {
        match (
            base_index(codon[0]),
            base_index(codon[1]),
            base_index(codon[2]),
        ) {
            (Some(a), Some(b), Some(c)) => self.amino_acids()[16 * a + 4 * b + c],
            _ => b'X',
        }
    }

    /// Translate every complete codon in `seq`. A trailing partial codon is ignored
    /// and stop codons are kept as `*`.
    /// # Example
    /// ```
    /// use gbtools::translate::GeneticCode;
    /// assert_eq!(GeneticCode::Bacterial.translate(b"ATGAAATAA"), "MK*");
    /// assert_eq!(GeneticCode::MoldMycoplasma.translate(b"ATGTGATAAGC"), "MW*");
    /// ```
    pub fn translate(&self, seq: &[u8]) -> String {
        seq.chunks_exact(3)
            .map(|c| self.codon(&[c[0], c[1], c[2]]) as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids() {
        for id in [1u8, 4, 11] {
            assert_eq!(GeneticCode::try_from(id).unwrap().table_id(), id);
        }
        assert!(matches!(
            GeneticCode::try_from(2),
            Err(Error::UnsupportedTable(2))
        ));
        assert_eq!(GeneticCode::default(), GeneticCode::Bacterial);
    }

    #[test]
    fn test_rna_and_lowercase() {
        let code = GeneticCode::Bacterial;
        assert_eq!(code.translate(b"augUUUggc"), "MFG");
    }

    #[test]
    fn test_short_sequences_translate_to_nothing() {
        let code = GeneticCode::Standard;
        assert_eq!(code.translate(b""), "");
        assert_eq!(code.translate(b"AT"), "");
        assert_eq!(code.translate(b"ATGN"), "M");
        assert_eq!(code.codon(b"NNN"), b'X');
    }

    #[test]
    fn test_tables_differ_only_where_expected() {
        let bases = b"TCAG";
        for a in bases {
            for b in bases {
                for c in bases {
                    let codon = [*a, *b, *c];
                    let std = GeneticCode::Standard.codon(&codon);
                    assert_eq!(std, GeneticCode::Bacterial.codon(&codon));
                    if &codon == b"TGA" {
                        assert_eq!(GeneticCode::MoldMycoplasma.codon(&codon), b'W');
                    } else {
                        assert_eq!(std, GeneticCode::MoldMycoplasma.codon(&codon));
                    }
                }
            }
        }
    }
}
