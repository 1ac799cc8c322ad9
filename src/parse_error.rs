use crate::parse_result::FailureKind;
use crate::seq::Seq;
#[cfg(doc)]
use crate::Parser;
use std::any::{Any, TypeId};
use std::fmt;

/*========================================*/
/*          Parse Error                   */
/*========================================*/

/// A failed parse, as reported by [`Parser::run`].
///
/// It records what the failing parser said, where in the input it happened, and which token
/// was found there. When the tokens are `char`s, the location is shown as `line:col`, like
/// a compiler would; otherwise it's the token offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: FailureKind,
    message: String,
    filename: String,
    offset: usize,
    line_col: Option<(usize, usize)>,
    found: String,
}

impl ParseError {
    /// `start` is where parsing began, and `at` is where it failed.
    pub(crate) fn new<T: fmt::Debug + 'static>(
        kind: FailureKind,
        message: String,
        filename: &str,
        start: &Seq<T>,
        at: &Seq<T>,
    ) -> ParseError {
        let found = match at.head() {
            Some(token) => format!("{:?}", token),
            None => "end of input".to_owned(),
        };
        ParseError {
            kind,
            message,
            filename: filename.to_owned(),
            offset: at.offset(),
            line_col: line_col(start, at),
            found,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Offset of the token the failure was reported at.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Line and column (both counting from 1) the failure was reported at. Only known for
    /// `char` input.
    pub fn line_col(&self) -> Option<(usize, usize)> {
        self.line_col
    }
}

/// Walks the already-read tokens between `start` and `at`, counting newlines.
fn line_col<T: 'static>(start: &Seq<T>, at: &Seq<T>) -> Option<(usize, usize)> {
    if TypeId::of::<T>() != TypeId::of::<char>() {
        return None;
    }
    let (mut line, mut col) = (1, 1);
    let mut cursor = start.clone();
    while cursor.offset() < at.offset() {
        let ch = cursor
            .head()
            .and_then(|token| (token as &dyn Any).downcast_ref::<char>())?;
        if *ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
        cursor = cursor.tail();
    }
    Some((line, col))
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use colored::Colorize;

        writeln!(
            f,
            "{}{} {}",
            "parse error".red().bold(),
            ":".bold(),
            self.message.bold(),
        )?;
        let location = match self.line_col {
            Some((line, col)) => format!("{}:{}:{}", self.filename, line, col),
            None => format!("{}:{}", self.filename, self.offset),
        };
        write!(
            f,
            " {} {}, found {}",
            "-->".blue().bold(),
            location,
            self.found,
        )
    }
}

impl std::error::Error for ParseError {}

#[test]
fn test_parse_error_display() {
    colored::control::set_override(false);

    let input = Seq::from("ab");
    let error = ParseError::new(
        FailureKind::Expected,
        "Satisfying 'a'".to_owned(),
        "input",
        &input,
        &input.tail(),
    );
    assert_eq!(error.kind(), FailureKind::Expected);
    assert_eq!(error.offset(), 1);
    assert_eq!(error.line_col(), Some((1, 2)));
    assert_eq!(
        format!("{}", error),
        "parse error: Satisfying 'a'\n --> input:1:2, found 'b'"
    );

    let error = ParseError::new(
        FailureKind::Unexpected,
        "EOS".to_owned(),
        "input",
        &input,
        &input.tail().tail(),
    );
    assert_eq!(
        format!("{}", error),
        "parse error: EOS\n --> input:1:3, found end of input"
    );
}

#[test]
fn test_parse_error_location() {
    colored::control::set_override(false);

    let input = Seq::from("ab\ncd\n\nx");
    let mut at = input.clone();
    for _ in 0..4 {
        at = at.tail();
    }
    let error = ParseError::new(FailureKind::Expected, "oops".to_owned(), "f", &input, &at);
    assert_eq!(error.line_col(), Some((2, 2)));
    assert_eq!(format!("{}", error), "parse error: oops\n --> f:2:2, found 'd'");

    let at = at.tail().tail().tail();
    let error = ParseError::new(FailureKind::Expected, "oops".to_owned(), "f", &input, &at);
    assert_eq!(error.line_col(), Some((4, 1)));

    // Tokens that aren't characters only have an offset.
    let numbers = Seq::new(vec![1, 2, 3].into_iter());
    let at = numbers.tail();
    let error = ParseError::new(FailureKind::Expected, "oops".to_owned(), "f", &numbers, &at);
    assert_eq!(error.line_col(), None);
    assert_eq!(error.offset(), 1);
    assert_eq!(format!("{}", error), "parse error: oops\n --> f:1, found 2");
}
