use parser_peg::{
    any, contains, eos, eq, expected, many, matches, neq, offset, optional, or, result, seq,
    token, tuple, Parser, Recursive, Seq,
};
use std::fmt;

type Offset = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Ok,
    Err,
}

#[derive(Debug, Clone)]
enum Header {
    Parser,
    Input,
    Expect(Status, Offset),
}

#[derive(Debug, Clone)]
struct Section {
    header: Header,
    contents: String,
}

#[derive(Debug, Clone)]
struct TestCases {
    sections: Vec<Section>,
}

impl TestCases {
    fn num_tests(&self) -> usize {
        let mut count = 0;
        for section in &self.sections {
            if matches!(section.header, Header::Expect(_, _)) {
                count += 1;
            }
        }
        count
    }
}

fn keyword(word: &'static str) -> impl Parser<char, ()> + Clone {
    token(word.chars()).constant(()).named(word.to_owned())
}

fn make_test_case_parser() -> impl Parser<char, TestCases> + Clone {
    let line_end = or((eq('\n').constant(()), eos::<char>().constant(())));
    let comment = many(neq('\n')).preceded(eq('#')).then(line_end);
    let whitespace = many(or((contains([' ', '\t', '\n']).constant(()), comment))).constant(());

    let status_p = or((
        keyword("Ok").constant(Status::Ok),
        keyword("Err").constant(Status::Err),
    ));
    let header_p = or((
        keyword("Parser").constant(Header::Parser),
        keyword("Input").constant(Header::Input),
        tuple((
            offset::<char>(),
            status_p.preceded(keyword("Expect").then(whitespace.clone())),
        ))
        .map(|(offset, status)| Header::Expect(status, offset)),
    ));
    let line_p = optional(many(neq('\n')).preceded(eq(' ')))
        .preceded(eq('>'))
        .map(|line| {
            line.map(|chars| chars.into_iter().collect::<String>())
                .unwrap_or_default()
        })
        .terminated(whitespace.clone())
        .named("Line");
    let contents_p = line_p.many1().map(|lines| lines.join("\n"));
    let section_p = tuple((header_p.terminated(whitespace.clone()), contents_p))
        .map(|(header, contents)| Section { header, contents });
    many(section_p)
        .preceded(whitespace)
        .map(|sections| TestCases { sections })
}

type StringParser = Box<dyn Parser<char, String>>;

fn parse_parser(parser_description: &str) -> Result<StringParser, regex::Error> {
    let mut stack: Vec<StringParser> = Vec::new();
    let mut recursive = Some(Recursive::<char, String>::new("recursive"));

    for word in parser_description.split_whitespace() {
        let chars = word.chars().collect::<Vec<_>>();
        if chars.len() == 3 && chars[0] == '\'' && chars[2] == '\'' {
            let parser = eq(chars[1]).map(|ch| ch.to_string());
            stack.push(parser.boxed());
            continue;
        } else if chars.len() >= 2 && chars[0] == '"' && chars[chars.len() - 1] == '"' {
            let parser = token(chars[1..chars.len() - 1].to_vec())
                .map(|chars| chars.into_iter().collect::<String>());
            stack.push(parser.boxed());
            continue;
        } else if chars.len() >= 2 && chars[0] == '/' && chars[chars.len() - 1] == '/' {
            let parser = matches(&word[1..word.len() - 1])?.map(|ch| ch.to_string());
            stack.push(parser.boxed());
            continue;
        }
        match word {
            // Primitives
            "any" => {
                let parser = any::<char>().map(|ch| ch.to_string());
                stack.push(parser.boxed());
            }
            "eos" => {
                let parser = eos::<char>().constant("EOS".to_owned());
                stack.push(parser.boxed());
            }
            "result" => {
                let parser = result::<char, String>("result".to_owned());
                stack.push(parser.boxed());
            }
            "fail" => {
                let parser = expected::<char, String>("custom failure");
                stack.push(parser.boxed());
            }

            // Mapping
            "constant" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.constant("constant".to_owned());
                stack.push(parser.boxed());
            }
            "map" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.map(|s| format!("(map {})", s));
                stack.push(parser.boxed());
            }
            "named" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.named("thing");
                stack.push(parser.boxed());
            }

            // Repetition
            "optional" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .optional()
                    .map(|opt| opt.unwrap_or_else(|| ".".to_owned()));
                stack.push(parser.boxed());
            }
            "many" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .many()
                    .map(|vec| format!("(many {})", vec.join(" ")));
                stack.push(parser.boxed());
            }
            "many1" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .many1()
                    .map(|vec| format!("(many1 {})", vec.join(" ")));
                stack.push(parser.boxed());
            }
            "repeat2" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .repeat(2)
                    .map(|vec| format!("(repeat {})", vec.join(" ")));
                stack.push(parser.boxed());
            }
            "atmost2" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .many_between(0, 2)
                    .map(|vec| format!("(atmost {})", vec.join(" ")));
                stack.push(parser.boxed());
            }
            "many_sep0" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .many_sep0(parser_2)
                    .map(|vec| format!("(many_sep0 {})", vec.join(" ")));
                stack.push(parser.boxed());
            }
            "many_sep1" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .many_sep1(parser_2)
                    .map(|vec| format!("(many_sep1 {})", vec.join(" ")));
                stack.push(parser.boxed());
            }

            // Lookahead
            "peek" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.peek().map(|s| format!("(peek {})", s));
                stack.push(parser.boxed());
            }
            "not" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.not().map(|ch| format!("(not {})", ch));
                stack.push(parser.boxed());
            }

            // Junctions
            "and" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1
                    .and(parser_2)
                    .map(|(a, b)| format!("(and {} {})", a, b));
                stack.push(parser.boxed());
            }
            "then" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.then(parser_2);
                stack.push(parser.boxed());
            }
            "preceded" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.preceded(parser_2);
                stack.push(parser.boxed());
            }
            "terminated" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.terminated(parser_2);
                stack.push(parser.boxed());
            }
            "seq2" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = seq((parser_1, parser_2));
                stack.push(parser.boxed());
            }
            "seq3" => {
                let parser_3 = stack.pop().unwrap();
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = seq((parser_1, parser_2, parser_3));
                stack.push(parser.boxed());
            }
            "tuple2" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser =
                    tuple((parser_1, parser_2)).map(|(a, b)| format!("(tuple {} {})", a, b));
                stack.push(parser.boxed());
            }
            "tuple3" => {
                let parser_3 = stack.pop().unwrap();
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = tuple((parser_1, parser_2, parser_3))
                    .map(|(a, b, c)| format!("(tuple {} {} {})", a, b, c));
                stack.push(parser.boxed());
            }
            "or2" => {
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = or((parser_1, parser_2));
                stack.push(parser.boxed());
            }
            "or3" => {
                let parser_3 = stack.pop().unwrap();
                let parser_2 = stack.pop().unwrap();
                let parser_1 = stack.pop().unwrap();
                let parser = or((parser_1, parser_2, parser_3));
                stack.push(parser.boxed());
            }
            "bind_eq" => {
                let parser_1 = stack.pop().unwrap();
                let parser = parser_1.bind(|s: String| {
                    token(s.chars().collect::<Vec<_>>()).map(move |chars| {
                        format!("(bind {} {})", s, chars.into_iter().collect::<String>())
                    })
                });
                stack.push(parser.boxed());
            }

            // Recursion
            "refn" => {
                let parser = recursive.as_ref().unwrap().refn();
                stack.push(parser.boxed());
            }
            "define" => {
                let parser_1 = stack.pop().unwrap();
                let parser = recursive.take().unwrap().define(parser_1);
                stack.push(parser.boxed());
            }

            _ => panic!("Bad test case parser description: {} not recognized", word),
        }
    }
    assert_eq!(stack.len(), 1, "Bad parser test case");
    Ok(stack.into_iter().next().unwrap())
}

fn find_diff(string_1: &str, string_2: &str) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for (x, y) in string_1.chars().zip(string_2.chars()) {
        if x != y {
            break;
        }
        if x == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn line_number(file_contents: &str, offset: Offset) -> usize {
    file_contents
        .chars()
        .take(offset)
        .filter(|ch| *ch == '\n')
        .count()
        + 1
}

fn run_test_case(
    filename: &str,
    line_num: usize,
    parser_description: &str,
    input: &str,
    expected: (Status, String),
) {
    colored::control::set_override(false);

    let actual = match parse_parser(parser_description) {
        Ok(parser) => match parser.run(filename, Seq::from(input)) {
            Ok(succ) => (Status::Ok, succ),
            Err(err) => (Status::Err, format!("{}", err)),
        },
        Err(err) => (Status::Err, format!("{}", err)),
    };

    if actual != expected {
        let (diff_line, diff_col) = find_diff(&actual.1, &expected.1);

        println!("Parser");
        for line in parser_description.lines() {
            println!("> {}", line);
        }
        println!("Input");
        for line in input.lines() {
            println!("> {}", line);
        }
        if input.is_empty() {
            println!(">");
        }
        println!("Expected {}", expected.0);
        for line in expected.1.lines() {
            println!("> {}", line);
        }
        println!("Actual {}", actual.0);
        for line in actual.1.lines() {
            println!("> {}", line);
        }
        panic!(
            "Test case failure at {}, line {} (diff at {}:{}).",
            filename, line_num, diff_line, diff_col
        );
    }
}

fn run_test_cases(filename: &str, file_contents: &str, test_cases: TestCases) {
    let mut parser = String::new();
    let mut input = String::new();
    for section in test_cases.sections {
        match section.header {
            Header::Parser => parser = section.contents,
            Header::Input => input = section.contents,
            Header::Expect(status, offset) => {
                let expected = (status, section.contents);
                let line_num = line_number(file_contents, offset);
                run_test_case(filename, line_num, &parser, &input, expected);
            }
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "Ok"),
            Status::Err => write!(f, "Err"),
        }
    }
}

#[test]
fn run_parser_tests() {
    use std::fs;

    let test_case_parser = make_test_case_parser();

    for entry in fs::read_dir("tests/").unwrap() {
        let entry = entry.unwrap();
        let file_type = entry.file_type().unwrap();
        let file_name = entry.file_name().into_string().unwrap();
        if file_type.is_file() && file_name.ends_with(".tests.txt") {
            let file_contents = fs::read_to_string(entry.path()).unwrap();
            let test_cases =
                match test_case_parser.run(&file_name, Seq::from(file_contents.as_str())) {
                    Ok(test_cases) => test_cases,
                    Err(err) => panic!("{}", err),
                };
            let num_tests = test_cases.num_tests();
            assert!(num_tests > 0, "No test cases found in {}", file_name);
            run_test_cases(&file_name, &file_contents, test_cases);
            println!("Ran {} successful test cases from {}", num_tests, file_name);
        }
    }
}
