#![allow(dead_code)]

use parser_peg::{
    bind, eq, escape_char, many, matches, optional, or, result, seq, Parser,
};
use std::fmt;

// CSV as described by RFC 4180 (https://datatracker.ietf.org/doc/html/rfc4180), except that
// a bare LF is also accepted as a line ending. Shared by the `csv` demo and its tests.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub header: Option<Vec<String>>,
    pub records: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvConfig {
    /// The field separator.
    pub separator: char,
    /// Whether the first line is a header. If it is, but the input is only one line long, that
    /// line is read as a record instead.
    pub parse_header: bool,
}

impl Default for CsvConfig {
    fn default() -> CsvConfig {
        CsvConfig {
            separator: ',',
            parse_header: true,
        }
    }
}

impl fmt::Display for CsvFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(header) = &self.header {
            writeln!(f, "header: {:?}", header)?;
        }
        for (i, record) in self.records.iter().enumerate() {
            writeln!(f, "{:>4}: {:?}", i + 1, record)?;
        }
        Ok(())
    }
}

pub fn csv_parser(config: CsvConfig) -> Result<impl Parser<char, CsvFile> + Clone, regex::Error> {
    let cr = eq('\r');
    let lf = eq('\n');
    let crlf = or((seq((cr.clone(), lf.clone())), lf.clone()));
    let comma = eq(config.separator);
    let dquote = eq('"');
    let textdata = matches(&format!(
        r#"[\x20-\x7E&&[^"{}]]"#,
        escape_char(config.separator)
    ))?;

    // Fields
    let escaped_char = or((
        textdata.clone(),
        comma.clone(),
        cr,
        lf,
        seq((dquote.clone(), dquote.clone())),
    ));
    let escaped = many(escaped_char)
        .preceded(dquote.clone())
        .terminated(dquote)
        .map(|chars| chars.into_iter().collect::<String>());
    let non_escaped = many(textdata).map(|chars| chars.into_iter().collect::<String>());
    let field = or((escaped, non_escaped)).named("field");

    // Lines
    let record = field.many_sep1(comma).named("record");
    let header_line = if config.parse_header {
        optional(record.clone().terminated(crlf.clone())).boxed()
    } else {
        result::<char, Option<Vec<String>>>(None).boxed()
    };

    let file = bind(
        (header_line, record.clone(), many(seq((crlf.clone(), record)))),
        move |(header, first, rest): (Option<Vec<String>>, Vec<String>, Vec<Vec<String>>)| {
            let mut records = vec![first];
            records.extend(rest);
            // A final line ending leaves a single empty field behind it.
            while records.last().is_some_and(|last| last.len() == 1 && last[0].is_empty()) {
                records.pop();
            }
            optional(crlf.clone()).constant(CsvFile { header, records })
        },
    );
    Ok(file.named("CSV file"))
}
