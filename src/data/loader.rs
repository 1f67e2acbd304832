use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

use super::model::{Column, ColumnKind, Dataset, Value};
use crate::error::LoadError;

/// How many leading bytes the charset detector looks at.
pub const DETECTION_SAMPLE_BYTES: usize = 10_000;

/// Tried in order once UTF-8 and the detected charset have failed.
pub const FALLBACK_ENCODINGS: [&str; 3] = ["latin1", "iso-8859-1", "cp1252"];

/// Cell spellings treated as missing, matching the Pandas `read_csv` defaults.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// A parsed table plus the encoding that decoded it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub dataset: Dataset,
    pub encoding: &'static Encoding,
}

/// Load a CSV file with a header row, negotiating its text encoding.
///
/// Order of attempts:
/// * UTF-8 (BOM stripped)
/// * on a decode error only: the charset guessed from the first
///   [`DETECTION_SAMPLE_BYTES`] bytes
/// * [`FALLBACK_ENCODINGS`], skipping any encoding already tried
///
/// Each attempt starts from the raw bytes; nothing from a failed attempt is kept.
pub fn load_csv(path: &Path) -> Result<LoadedTable, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv_bytes(path, &bytes)
}

/// Same as [`load_csv`] for bytes already in memory. `path` is only used in errors.
pub fn load_csv_bytes(path: &Path, bytes: &[u8]) -> Result<LoadedTable, LoadError> {
    negotiate(path, bytes, detect_encoding)
}

/// The encoding chain with the charset guesser passed in.
fn negotiate(
    path: &Path,
    bytes: &[u8],
    detect: impl FnOnce(&[u8]) -> &'static Encoding,
) -> Result<LoadedTable, LoadError> {
    let mut attempts = Attempts::new(bytes);

    if let Some(table) = attempts.try_encoding(UTF_8) {
        log::info!("Loaded with UTF-8 encoding");
        return Ok(table);
    }

    if matches!(attempts.last_error, Some(AttemptError::Decode(_))) {
        let guess = detect(bytes);
        log::info!("Using detected encoding: {}", guess.name());
        if let Some(table) = attempts.try_encoding(guess) {
            return Ok(table);
        }
    }

    log::info!("Trying common alternative encodings...");
    for label in FALLBACK_ENCODINGS {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        if let Some(table) = attempts.try_encoding(encoding) {
            log::info!("Success with {label} encoding");
            return Ok(table);
        }
    }

    Err(LoadError::EncodingExhausted {
        path: path.to_path_buf(),
        tried: attempts.tried.iter().map(|e| e.name()).collect(),
        last_error: attempts
            .last_error
            .map(|e| e.to_string())
            .unwrap_or_default(),
    })
}

/// Guess the charset of `bytes` from a leading sample.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let sample = &bytes[..bytes.len().min(DETECTION_SAMPLE_BYTES)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}

// ---------------------------------------------------------------------------
// Attempt bookkeeping
// ---------------------------------------------------------------------------

/// Why a single encoding attempt was abandoned.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("input is not valid {0}")]
    Decode(&'static str),

    #[error("no columns to parse from file")]
    NoColumns,

    #[error("line {line}: expected {expected} fields, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

struct Attempts<'a> {
    bytes: &'a [u8],
    tried: Vec<&'static Encoding>,
    last_error: Option<AttemptError>,
}

impl<'a> Attempts<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Attempts {
            bytes,
            tried: Vec::new(),
            last_error: None,
        }
    }

    /// `None` when the encoding fails or was already tried.
    fn try_encoding(&mut self, encoding: &'static Encoding) -> Option<LoadedTable> {
        if self.tried.contains(&encoding) {
            log::debug!("{} already tried, skipping", encoding.name());
            return None;
        }
        self.tried.push(encoding);

        let result = decode(self.bytes, encoding).and_then(|text| parse_table(&text));
        match result {
            Ok(dataset) => Some(LoadedTable { dataset, encoding }),
            Err(e) => {
                log::warn!("{} attempt failed: {e}", encoding.name());
                self.last_error = Some(e);
                None
            }
        }
    }
}

fn decode<'b>(bytes: &'b [u8], encoding: &'static Encoding) -> Result<Cow<'b, str>, AttemptError> {
    let body = if encoding == UTF_8 {
        bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
    } else {
        bytes
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(AttemptError::Decode(encoding.name()))
}

// ---------------------------------------------------------------------------
// CSV parsing and type inference
// ---------------------------------------------------------------------------

/// Header row required. Short rows are padded with missing cells; long rows
/// abort the attempt.
fn parse_table(text: &str) -> Result<Dataset, AttemptError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = normalize_headers(reader.headers()?.iter());
    if headers.is_empty() {
        return Err(AttemptError::NoColumns);
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(AttemptError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: headers.len(),
                found: record.len(),
            });
        }
        for (idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, &cells))
        .collect();
    Ok(Dataset::new(columns))
}

/// Blank names become `Unnamed: {i}`; repeats get `.1`, `.2`, ...
fn normalize_headers<'h>(raw: impl Iterator<Item = &'h str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (idx, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    // a lone empty header means there were no columns at all
    if out.len() == 1 && out[0] == "Unnamed: 0" {
        out.clear();
    }
    out
}

pub fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Decide a column's kind from all of its cells, then convert them.
fn infer_column(name: String, cells: &[String]) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|s| !is_null_token(s))
        .collect();
    let has_null = present.len() < cells.len();

    let all_int = !present.is_empty() && present.iter().all(|s| s.trim().parse::<i64>().is_ok());
    let all_float = present.iter().all(|s| parse_float(s).is_some());
    let all_bool = !present.is_empty() && present.iter().all(|s| parse_bool(s).is_some());

    let kind = if all_int && !has_null {
        ColumnKind::Integer
    } else if all_float {
        ColumnKind::Float
    } else if all_bool && !has_null {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    };

    let values = cells
        .iter()
        .map(|s| {
            if is_null_token(s) {
                return Value::Null;
            }
            match kind {
                ColumnKind::Integer => s.trim().parse::<i64>().map_or(Value::Null, Value::Integer),
                ColumnKind::Float => match parse_float(s) {
                    Some(v) if !v.is_nan() => Value::Float(v),
                    _ => Value::Null,
                },
                ColumnKind::Bool => parse_bool(s).map_or(Value::Null, Value::Bool),
                ColumnKind::Text => Value::String(s.clone()),
            }
        })
        .collect();

    Column { name, kind, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, WINDOWS_1251, WINDOWS_1252};

    fn load(bytes: &[u8]) -> LoadedTable {
        load_csv_bytes(Path::new("test.csv"), bytes).expect("load")
    }

    #[test]
    fn utf8_input_keeps_shape() {
        let table = load("country,year,e_inc_num\nChad,2020,1\nPeru,2021,\n".as_bytes());
        assert_eq!(table.encoding, UTF_8);
        assert_eq!(table.dataset.shape(), (2, 3));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let table = load(b"\xEF\xBB\xBFa,b\n1,2\n");
        assert_eq!(table.dataset.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn latin1_bytes_fall_back() {
        // "Côte d'Ivoire" with ô as a single 0xF4 byte
        let bytes = b"country,value\nC\xF4te d'Ivoire,3\n";
        let table = load(bytes);
        assert_ne!(table.encoding, UTF_8);
        match &table.dataset.column("country").unwrap().values[0] {
            Value::String(s) => assert!(s.ends_with("te d'Ivoire") && s.chars().count() == 13),
            other => panic!("unexpected cell {other:?}"),
        }
    }

    #[test]
    fn cyrillic_is_decoded_with_the_detected_charset() {
        let body = "country,e_inc_100k\n\
            Российская Федерация,47\n\
            Республика Беларусь,27\n\
            Кыргызская Республика,105\n\
            Республика Таджикистан,83\n";
        let (encoded, _, unmappable) = WINDOWS_1251.encode(body);
        assert!(!unmappable);

        let table = load(&encoded);
        assert_eq!(table.encoding, WINDOWS_1251);
        assert_eq!(
            table.dataset.column("country").unwrap().values[0],
            Value::String("Российская Федерация".into())
        );
    }

    #[test]
    fn detected_charset_that_fails_gives_way_to_fallback() {
        // 0x81 is a Shift_JIS lead byte and ',' is not a valid trail byte
        let bytes = b"a,b\n\x81,2\n";
        let mut guessed = false;
        let table = negotiate(Path::new("sjis.csv"), bytes, |_| {
            guessed = true;
            SHIFT_JIS
        })
        .expect("fallback decodes");

        assert!(guessed);
        assert_eq!(table.encoding, WINDOWS_1252);
        assert_eq!(
            table.dataset.column("a").unwrap().values[0],
            Value::String("\u{81}".into())
        );
    }

    #[test]
    fn detector_is_skipped_when_utf8_decodes() {
        let table = negotiate(Path::new("plain.csv"), b"a,b\n1,2\n", |_| {
            panic!("detector consulted for valid UTF-8")
        })
        .unwrap();
        assert_eq!(table.encoding, UTF_8);
    }

    #[test]
    fn fallback_labels_share_one_encoding() {
        for label in FALLBACK_ENCODINGS {
            assert_eq!(Encoding::for_label(label.as_bytes()), Some(WINDOWS_1252));
        }
    }

    #[test]
    fn empty_input_exhausts_chain_without_retrying() {
        let err = load_csv_bytes(Path::new("empty.csv"), b"").unwrap_err();
        match err {
            LoadError::EncodingExhausted { tried, .. } => {
                let unique: HashSet<_> = tried.iter().collect();
                assert_eq!(unique.len(), tried.len());
                assert!(tried.contains(&"UTF-8"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn kinds_follow_pandas_rules() {
        let csv = "i,f,gap,flag,txt,empty\n1,1.5,1,True,x,\n2,2,,False,,\n";
        let ds = load(csv.as_bytes()).dataset;
        let kind = |n: &str| ds.column(n).unwrap().kind;
        assert_eq!(kind("i"), ColumnKind::Integer);
        assert_eq!(kind("f"), ColumnKind::Float);
        assert_eq!(kind("gap"), ColumnKind::Float);
        assert_eq!(kind("flag"), ColumnKind::Bool);
        assert_eq!(kind("txt"), ColumnKind::Text);
        assert_eq!(kind("empty"), ColumnKind::Float);
        assert_eq!(ds.column("txt").unwrap().values[1], Value::Null);
    }

    #[test]
    fn na_tokens_are_missing_but_sentinels_are_not() {
        let ds = load(b"a,b\nNA,-9\n2,3\n").dataset;
        assert_eq!(ds.column("a").unwrap().values[0], Value::Null);
        assert_eq!(ds.column("b").unwrap().values[0], Value::Integer(-9));
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_fail() {
        let ds = load(b"a,b,c\n1,2\n").dataset;
        assert_eq!(ds.column("c").unwrap().values, vec![Value::Null]);

        let err = load_csv_bytes(Path::new("wide.csv"), b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, LoadError::EncodingExhausted { .. }));
    }

    #[test]
    fn headers_are_normalized() {
        let ds = load(b"a,,a\n1,2,3\n").dataset;
        assert_eq!(ds.column_names(), vec!["a", "Unnamed: 1", "a.1"]);
    }
}
