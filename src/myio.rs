use super::error::{Error, Result};
use flate2::read::MultiGzDecoder;
use flate2::write;
use flate2::Compression;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

const BUFFER_SIZE: usize = 128 * 1024;

/// First two bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Checks for the gzip signature at the start of a buffer.
/// # Example
/// ```
/// use gbtools::myio::is_gzip;
/// assert!(is_gzip(&[0x1f, 0x8b, 0x08]));
/// assert!(!is_gzip(b"LOCUS"));
/// assert!(!is_gzip(&[0x1f]));
/// ```
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Write normal or compressed files seamlessly
/// Uses the presence of a `.gz` extension to decide, `-` writes to stdout
pub fn writer(filename: &str) -> Result<Box<dyn Write>> {
    if filename == "-" {
        return Ok(Box::new(BufWriter::with_capacity(
            BUFFER_SIZE,
            io::stdout(),
        )));
    }
    let path = Path::new(filename);
    let file = File::create(path).map_err(|source| Error::Io {
        path: filename.to_string(),
        source,
    })?;

    if path.extension() == Some(OsStr::new("gz")) {
        Ok(Box::new(BufWriter::with_capacity(
            BUFFER_SIZE,
            write::GzEncoder::new(file, Compression::default()),
        )))
    } else {
        Ok(Box::new(BufWriter::with_capacity(BUFFER_SIZE, file)))
    }
}

/// Read normal or compressed files seamlessly
/// Sniffs the gzip magic bytes instead of trusting the extension, `-` reads stdin
pub fn reader(filename: &str) -> Result<Box<dyn BufRead>> {
    let handle: Box<dyn Read> = if filename == "-" {
        Box::new(io::stdin())
    } else {
        let file = File::open(filename).map_err(|source| Error::Io {
            path: filename.to_string(),
            source,
        })?;
        Box::new(file)
    };
    sniff(handle).map_err(|source| Error::Io {
        path: filename.to_string(),
        source,
    })
}

fn sniff(handle: Box<dyn Read>) -> io::Result<Box<dyn BufRead>> {
    let mut buffered = BufReader::with_capacity(BUFFER_SIZE, handle);
    if is_gzip(buffered.fill_buf()?) {
        log::debug!("gzip signature found, decompressing input");
        Ok(Box::new(BufReader::with_capacity(
            BUFFER_SIZE,
            MultiGzDecoder::new(buffered),
        )))
    } else {
        Ok(Box::new(buffered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;

    fn read_all(mut r: Box<dyn BufRead>) -> String {
        let mut s = String::new();
        r.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn test_sniff_plain_and_gzip() {
        let text = b"LOCUS       seq1\n//\n";
        let plain = sniff(Box::new(io::Cursor::new(text.to_vec()))).unwrap();
        assert_eq!(read_all(plain).as_bytes(), text);

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(text).unwrap();
        let gz = enc.finish().unwrap();
        assert!(is_gzip(&gz));
        let unzipped = sniff(Box::new(io::Cursor::new(gz))).unwrap();
        assert_eq!(read_all(unzipped).as_bytes(), text);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        match reader(".test/does-not-exist.gbk") {
            Err(Error::Io { path, .. }) => assert_eq!(path, ".test/does-not-exist.gbk"),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened a file that does not exist"),
        }
    }

    #[test]
    fn test_gz_fixture_matches_plain() {
        let plain = read_all(reader(".test/small.gbk").unwrap());
        let gz = read_all(reader(".test/small.gbk.gz").unwrap());
        assert_eq!(plain, gz);
    }
}
