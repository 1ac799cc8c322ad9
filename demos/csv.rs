mod csv_grammar;

use csv_grammar::{csv_parser, CsvConfig};
use parser_peg::{Parser, Seq};
use std::process::ExitCode;

// Reads CSV from stdin and prints its records. Parsing starts as soon as input arrives, but
// the whole input is held in memory until the parse finishes.
//
//     cat data.csv | cargo run --example csv
//     cat data.tsv | cargo run --example csv -- --separator '\t' --no-header

fn usage() -> ExitCode {
    eprintln!("usage: csv [--separator CHAR] [--no-header] < input.csv");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let mut config = CsvConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-header" => config.parse_header = false,
            "--separator" => {
                let sep = args.next().unwrap_or_default();
                let sep = if sep == "\\t" { "\t".to_owned() } else { sep };
                let mut chars = sep.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => config.separator = ch,
                    _ => return usage(),
                }
            }
            _ => return usage(),
        }
    }

    let parser = match csv_parser(config) {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("invalid separator: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let (input, status) = Seq::from_reader(std::io::stdin());
    let parsed = parser.run("stdin", input);
    // A read error ends the input early, which can look like a perfectly good (shorter) file.
    if let Some(err) = status.take_error() {
        eprintln!("error reading stdin: {}", err);
        return ExitCode::FAILURE;
    }
    match parsed {
        Ok(file) => {
            print!("{}", file);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
