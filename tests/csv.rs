#[path = "../demos/csv_grammar.rs"]
mod csv_grammar;

use csv_grammar::{csv_parser, CsvConfig, CsvFile};
use parser_peg::{any, many, Parser, Seq};
use std::io::{self, Read};

fn parse(config: CsvConfig, input: &str) -> CsvFile {
    let parser = csv_parser(config).unwrap();
    match parser.run("test.csv", Seq::from(input)) {
        Ok(file) => file,
        Err(err) => panic!("failed to parse {:?}:\n{}", input, err),
    }
}

fn no_header() -> CsvConfig {
    CsvConfig {
        parse_header: false,
        ..CsvConfig::default()
    }
}

fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|field| field.to_string()).collect())
        .collect()
}

const WITH_HEADER: &str = "Field1,Field2,Field3\r\naaa,bbb,ccc\r\nzzz,yyy,xxx\r\n";

#[test]
fn test_header() {
    let file = parse(CsvConfig::default(), WITH_HEADER);
    assert_eq!(
        file.header,
        Some(rows(&[&["Field1", "Field2", "Field3"]]).remove(0))
    );
    assert_eq!(
        file.records,
        rows(&[&["aaa", "bbb", "ccc"], &["zzz", "yyy", "xxx"]])
    );

    let file = parse(no_header(), WITH_HEADER);
    assert_eq!(file.header, None);
    assert_eq!(
        file.records,
        rows(&[
            &["Field1", "Field2", "Field3"],
            &["aaa", "bbb", "ccc"],
            &["zzz", "yyy", "xxx"]
        ])
    );
}

#[test]
fn test_line_endings() {
    let expected = rows(&[&["aaa", "bbb", "ccc"], &["zzz", "yyy", "xxx"]]);
    let file = parse(no_header(), "aaa,bbb,ccc\r\nzzz,yyy,xxx");
    assert_eq!(file.records, expected);
    let file = parse(no_header(), "aaa,bbb,ccc\nzzz,yyy,xxx\n");
    assert_eq!(file.records, expected);
}

#[test]
fn test_escaped_fields() {
    let file = parse(
        no_header(),
        "\"aaa\",\"b\r\nbb\",\"ccc\"\r\naaa,\"b\"\"bb\",ccc\r\nzzz,yyy,xxx",
    );
    assert_eq!(
        file.records,
        rows(&[
            &["aaa", "b\r\nbb", "ccc"],
            &["aaa", "b\"bb", "ccc"],
            &["zzz", "yyy", "xxx"]
        ])
    );

    let file = parse(CsvConfig::default(), "\"a,b\",\"\"\r\nc,d");
    assert_eq!(file.header, Some(vec!["a,b".to_owned(), "".to_owned()]));
    assert_eq!(file.records, rows(&[&["c", "d"]]));
}

#[test]
fn test_single_line_is_not_a_header() {
    let file = parse(CsvConfig::default(), "aaa,bbb");
    assert_eq!(file.header, None);
    assert_eq!(file.records, rows(&[&["aaa", "bbb"]]));
}

#[test]
fn test_empty_input() {
    let file = parse(no_header(), "");
    assert_eq!(file.header, None);
    assert!(file.records.is_empty());
}

#[test]
fn test_separator() {
    let config = CsvConfig {
        separator: ';',
        parse_header: false,
    };
    let file = parse(config, "a;b,c;\"d;e\"");
    assert_eq!(file.records, rows(&[&["a", "b,c", "d;e"]]));

    let config = CsvConfig {
        separator: '|',
        parse_header: false,
    };
    let file = parse(config, "x|y");
    assert_eq!(file.records, rows(&[&["x", "y"]]));
}

#[test]
fn test_reader_input() {
    let parser = csv_parser(no_header()).unwrap();
    let input = std::io::Cursor::new(b"one,two\nthree,four\n".to_vec());
    let (input, status) = Seq::from_reader(input);
    let file = parser.run("test.csv", input).unwrap();
    assert_eq!(file.records, rows(&[&["one", "two"], &["three", "four"]]));
    assert!(status.is_ok());
}

/// Hands out `data`, then fails.
struct CutOffReader {
    data: Vec<u8>,
}

impl Read for CutOffReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
        }
        let len = self.data.len().min(buf.len());
        buf[..len].copy_from_slice(&self.data[..len]);
        self.data.drain(..len);
        Ok(len)
    }
}

#[test]
fn test_reader_error_is_reported() {
    let parser = csv_parser(no_header()).unwrap();
    let (input, status) = Seq::from_reader(CutOffReader {
        data: b"a,b\n".to_vec(),
    });
    // The truncated input is still valid CSV on its own...
    let file = parser.run("test.csv", input).unwrap();
    assert_eq!(file.records, rows(&[&["a", "b"]]));
    // ...so the read error has to come from the status.
    let err = status.take_error().unwrap();
    assert_eq!(err.to_string(), "disk gone");

    let any_char = many(any::<char>()).map(|chars| chars.into_iter().collect::<String>());
    let (input, status) = Seq::from_reader(CutOffReader {
        data: b"a,b\n".to_vec(),
    });
    assert_eq!(any_char.run("test.csv", input), Ok("a,b\n".to_owned()));
    assert!(!status.is_ok());
}

#[test]
fn test_malformed() {
    colored::control::set_override(false);

    let parser = csv_parser(no_header()).unwrap();
    let err = parser
        .run("test.csv", Seq::from("aaa,\"bbb\nccc"))
        .unwrap_err();
    assert_eq!(err.message(), "EOS is expected");
    assert_eq!(err.offset(), 4);
    assert_eq!(
        format!("{}", err),
        "parse error: EOS is expected\n --> test.csv:1:5, found '\"'"
    );

    let err = parser
        .run("test.csv", Seq::from("a,b\nc,\"d"))
        .unwrap_err();
    assert_eq!(err.offset(), 6);
    assert_eq!(err.line_col(), Some((2, 3)));
}
