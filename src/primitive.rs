//! Parsers that look at single tokens (or nothing at all), from which everything else is built.

use crate::{ParseResult, Parser, Seq};
use regex::{escape, Error as RegexError, Regex};
use std::fmt;
use std::marker::PhantomData;

/// The value produced by [`eos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Eos;

fn end_of_input<T, U>(input: &Seq<T>) -> ParseResult<T, U> {
    ParseResult::UnexpectedFailure {
        message: "EOS".to_owned(),
        next: input.clone(),
    }
}

/*========================================*/
/*          Parser: Any                   */
/*========================================*/

#[derive(Clone)]
struct AnyP;

impl<T: Clone> Parser<T, T> for AnyP {
    fn name(&self) -> String {
        "any".to_owned()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, T> {
        match input.head() {
            Some(head) => ParseResult::Success {
                value: head.clone(),
                next: input.tail(),
            },
            None => end_of_input(input),
        }
    }
}

/// Consume any one token. Fails only at the end of input.
pub fn any<T: Clone>() -> impl Parser<T, T> + Clone {
    AnyP
}

/*========================================*/
/*          Parser: Eos                   */
/*========================================*/

#[derive(Clone)]
struct EosP;

impl<T> Parser<T, Eos> for EosP {
    fn name(&self) -> String {
        "EOS".to_owned()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, Eos> {
        if input.is_empty() {
            ParseResult::Success {
                value: Eos,
                next: input.clone(),
            }
        } else {
            ParseResult::ExpectedFailure {
                message: "EOS".to_owned(),
                next: input.clone(),
            }
        }
    }
}

/// Match the end of input, without consuming anything.
pub fn eos<T>() -> impl Parser<T, Eos> + Clone {
    EosP
}

/*========================================*/
/*          Parser: Satisfy               */
/*========================================*/

struct SatisfyP<T, F: Fn(&T) -> bool + Clone> {
    name: String,
    pred: F,
    phantom: PhantomData<T>,
}

impl<T, F: Fn(&T) -> bool + Clone> Clone for SatisfyP<T, F> {
    fn clone(&self) -> Self {
        SatisfyP {
            name: self.name.clone(),
            pred: self.pred.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T: Clone, F: Fn(&T) -> bool + Clone> Parser<T, T> for SatisfyP<T, F> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, T> {
        match input.head() {
            Some(head) if (self.pred)(head) => ParseResult::Success {
                value: head.clone(),
                next: input.tail(),
            },
            Some(_) => ParseResult::ExpectedFailure {
                message: format!("Satisfying {}", self.name),
                next: input.clone(),
            },
            None => end_of_input(input),
        }
    }
}

/// Consume one token if `pred` holds for it.
pub fn satisfy<T: Clone>(pred: impl Fn(&T) -> bool + Clone) -> impl Parser<T, T> + Clone {
    satisfy_named("predicate", pred)
}

/// Like [`satisfy`], but with a name to use in failure messages.
pub fn satisfy_named<T: Clone>(
    name: &str,
    pred: impl Fn(&T) -> bool + Clone,
) -> impl Parser<T, T> + Clone {
    SatisfyP {
        name: name.to_owned(),
        pred,
        phantom: PhantomData,
    }
}

/// Consume one token equal to `value`.
pub fn eq<T: PartialEq + Clone + fmt::Debug>(value: T) -> impl Parser<T, T> + Clone {
    let name = format!("{:?}", value);
    satisfy_named(&name, move |token: &T| *token == value)
}

/// Consume one token that is not equal to `value`.
pub fn neq<T: PartialEq + Clone + fmt::Debug>(value: T) -> impl Parser<T, T> + Clone {
    let name = format!("not {:?}", value);
    satisfy_named(&name, move |token: &T| *token != value)
}

/// Consume one token that is any of `values`.
pub fn contains<T: PartialEq + Clone + fmt::Debug>(
    values: impl IntoIterator<Item = T>,
) -> impl Parser<T, T> + Clone {
    let values = values.into_iter().collect::<Vec<_>>();
    let name = format!("one of {:?}", values);
    satisfy_named(&name, move |token: &T| values.contains(token))
}

fn new_regex(pattern: &str) -> Result<Regex, RegexError> {
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(regex) => Ok(regex),
        Err(err) => match Regex::new(pattern) {
            // This error message is better because it doesn't have the wrapper in it.
            Err(err) => Err(err),
            Ok(_) => Err(err),
        },
    }
}

/// Consume one character if it matches the regex `pattern` in its entirety, e.g. `"[a-z]"`
/// or `r"\p{Greek}"`. The regex syntax is that of the
/// [regex](https://docs.rs/regex/latest/regex/) crate.
pub fn matches(pattern: &str) -> Result<impl Parser<char, char> + Clone, RegexError> {
    let regex = new_regex(pattern)?;
    let name = format!("/{}/", pattern);
    Ok(satisfy_named(&name, move |ch: &char| {
        let mut buf = [0; 4];
        regex.is_match(ch.encode_utf8(&mut buf))
    }))
}

/// Escape `ch` for use inside a [`matches`] pattern.
pub fn escape_char(ch: char) -> String {
    escape(&ch.to_string())
}

/*========================================*/
/*          Parser: Token                 */
/*========================================*/

#[derive(Clone)]
struct TokenP<T: Clone> {
    name: String,
    items: Vec<T>,
}

impl<T: Clone + PartialEq> Parser<T, Vec<T>> for TokenP<T> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, Vec<T>> {
        let mut cursor = input.clone();
        for item in &self.items {
            if cursor.head() != Some(item) {
                return ParseResult::ExpectedFailure {
                    message: format!("{} is expected", self.name),
                    next: input.clone(),
                };
            }
            cursor = cursor.tail();
        }
        ParseResult::Success {
            value: self.items.clone(),
            next: cursor,
        }
    }
}

/// Match `items` exactly, in order. Produces the matched tokens.
pub fn token<T: PartialEq + Clone + fmt::Debug>(
    items: impl IntoIterator<Item = T>,
) -> impl Parser<T, Vec<T>> + Clone {
    let items = items.into_iter().collect::<Vec<_>>();
    TokenP {
        name: format!("{:?}", items),
        items,
    }
}

/*========================================*/
/*          Parser: Result & Expected     */
/*========================================*/

#[derive(Clone)]
struct ResultP<U: Clone>(U);

impl<T, U: Clone> Parser<T, U> for ResultP<U> {
    fn name(&self) -> String {
        "result".to_owned()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        ParseResult::Success {
            value: self.0.clone(),
            next: input.clone(),
        }
    }
}

/// Succeed with `value` without consuming anything.
pub fn result<T, U: Clone>(value: U) -> impl Parser<T, U> + Clone {
    ResultP(value)
}

#[derive(Clone)]
struct ExpectedP(String);

impl<T, U> Parser<T, U> for ExpectedP {
    fn name(&self) -> String {
        self.0.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        ParseResult::ExpectedFailure {
            message: self.0.clone(),
            next: input.clone(),
        }
    }
}

/// Always fail with an expected-failure carrying `message`.
pub fn expected<T, U>(message: &str) -> impl Parser<T, U> + Clone {
    ExpectedP(message.to_owned())
}

/*========================================*/
/*          Parser: Offset                */
/*========================================*/

#[derive(Clone)]
struct OffsetP;

impl<T> Parser<T, usize> for OffsetP {
    fn name(&self) -> String {
        "offset".to_owned()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, usize> {
        ParseResult::Success {
            value: input.offset(),
            next: input.clone(),
        }
    }
}

/// Produce the offset of the current position, without consuming anything.
pub fn offset<T>() -> impl Parser<T, usize> + Clone {
    OffsetP
}

/*========================================*/
/*          Parser: From Fn               */
/*========================================*/

struct FnP<T, U, F: Fn(&Seq<T>) -> ParseResult<T, U> + Clone> {
    name: String,
    func: F,
    phantom: PhantomData<(T, U)>,
}

impl<T, U, F: Fn(&Seq<T>) -> ParseResult<T, U> + Clone> Clone for FnP<T, U, F> {
    fn clone(&self) -> Self {
        FnP {
            name: self.name.clone(),
            func: self.func.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T, U, F: Fn(&Seq<T>) -> ParseResult<T, U> + Clone> Parser<T, U> for FnP<T, U, F> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        (self.func)(input)
    }
}

/// Turn a plain function into a parser. `name` is used in failure messages.
pub fn from_fn<T, U>(
    name: &str,
    func: impl Fn(&Seq<T>) -> ParseResult<T, U> + Clone,
) -> impl Parser<T, U> + Clone {
    FnP {
        name: name.to_owned(),
        func,
        phantom: PhantomData,
    }
}

#[test]
fn test_any() {
    let input = Seq::from("any");
    let result = any::<char>().parse(&input);
    assert_eq!(result.value(), Some(&'a'));
    assert_eq!(result.next().iter().collect::<String>(), "ny");

    let result = any::<char>().parse(&Seq::from(""));
    assert_eq!(result.failure_kind(), Some(crate::FailureKind::Unexpected));
    assert_eq!(result.message(), Some("EOS"));
}

#[test]
fn test_eos() {
    let input = Seq::from("not eos");
    let result = eos::<char>().parse(&input);
    assert_eq!(result.failure_kind(), Some(crate::FailureKind::Expected));
    assert_eq!(result.next(), &input);

    let input = Seq::<char>::from("");
    assert_eq!(eos::<char>().parse(&input).into_value(), Some(Eos));
}

#[test]
fn test_satisfy() {
    let input = Seq::from("satisfy");
    let result = satisfy(|c: &char| *c == 's').parse(&input);
    assert_eq!(result.value(), Some(&'s'));
    assert_eq!(result.next().iter().collect::<String>(), "atisfy");

    let result = satisfy(|c: &char| *c == 'n').parse(&input);
    assert_eq!(result.message(), Some("Satisfying predicate"));
    assert_eq!(result.next(), &input);

    assert_eq!(eq('s').parse(&input).into_value(), Some('s'));
    assert_eq!(neq('!').parse(&input).into_value(), Some('s'));
    assert_eq!(neq('s').parse(&input).message(), Some("Satisfying not 's'"));
    assert_eq!(contains(['x', 's']).parse(&input).into_value(), Some('s'));
    assert_eq!(
        contains(['x', 'y']).parse(&input).message(),
        Some("Satisfying one of ['x', 'y']")
    );
}

#[test]
fn test_matches() {
    let lower = matches("[a-z]").unwrap();
    assert_eq!(lower.parse(&Seq::from("q")).into_value(), Some('q'));
    assert!(!lower.parse(&Seq::from("Q")).is_success());
    assert_eq!(lower.name(), "/[a-z]/");

    let greek = matches(r"\p{Greek}").unwrap();
    assert_eq!(greek.parse(&Seq::from("λx")).into_value(), Some('λ'));

    // The pattern has to match the whole character, not just part of it.
    let either = matches("a|b").unwrap();
    assert!(either.parse(&Seq::from("b")).is_success());

    let dot = matches(&escape_char('.')).unwrap();
    assert!(dot.parse(&Seq::from(".")).is_success());
    assert!(!dot.parse(&Seq::from("x")).is_success());

    assert!(matches("[a-").is_err());
}

#[test]
fn test_token() {
    let input = Seq::from("token is here");
    let result = token("token".chars()).parse(&input);
    assert_eq!(result.value(), Some(&"token".chars().collect::<Vec<_>>()));
    assert_eq!(result.next().iter().collect::<String>(), " is here");

    let result = token("toke!".chars()).parse(&input);
    assert_eq!(
        result.message(),
        Some("['t', 'o', 'k', 'e', '!'] is expected")
    );
    assert_eq!(result.next(), &input);

    assert!(!token("too long".chars()).parse(&Seq::from("too")).is_success());
}

#[test]
fn test_result_and_expected() {
    let input = Seq::from("ignore this");
    let result = result::<char, char>('a').parse(&input);
    assert_eq!(result.value(), Some(&'a'));
    assert_eq!(result.next(), &input);

    let result = expected::<char, char>("nope").parse(&input);
    assert_eq!(result.failure_kind(), Some(crate::FailureKind::Expected));
    assert_eq!(result.message(), Some("nope"));
}

#[test]
fn test_offset_and_from_fn() {
    let input = Seq::from("abc").tail().tail();
    assert_eq!(offset::<char>().parse(&input).into_value(), Some(2));

    let skip_two = from_fn("skip two", |input: &Seq<char>| ParseResult::Success {
        value: (),
        next: input.tail().tail(),
    });
    assert_eq!(skip_two.name(), "skip two");
    assert_eq!(skip_two.parse(&Seq::from("abc")).next().first(), Some('c'));
}
