//! Parsers built out of other parsers: sequencing, alternation, repetition, lookahead.

use crate::{ParseResult, Parser, Seq};
use std::marker::PhantomData;

/*========================================*/
/*          Parser: Map                   */
/*========================================*/

pub(crate) struct MapP<T, U, P: Parser<T, U> + Clone, V, F: Fn(U) -> V + Clone> {
    pub(crate) parser: P,
    pub(crate) func: F,
    pub(crate) phantom: PhantomData<(T, U, V)>,
}

impl<T, U, P: Parser<T, U> + Clone, V, F: Fn(U) -> V + Clone> Clone for MapP<T, U, P, V, F> {
    fn clone(&self) -> Self {
        MapP {
            parser: self.parser.clone(),
            func: self.func.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T, U, P: Parser<T, U> + Clone, V, F: Fn(U) -> V + Clone> Parser<T, V>
    for MapP<T, U, P, V, F>
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, V> {
        self.parser.parse(input).map_value(&self.func)
    }
}

/*========================================*/
/*          Parser: Named                 */
/*========================================*/

pub(crate) struct NamedP<T, U, P: Parser<T, U> + Clone> {
    pub(crate) name: String,
    pub(crate) parser: P,
    pub(crate) phantom: PhantomData<(T, U)>,
}

impl<T, U, P: Parser<T, U> + Clone> Clone for NamedP<T, U, P> {
    fn clone(&self) -> Self {
        NamedP {
            name: self.name.clone(),
            parser: self.parser.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T, U, P: Parser<T, U> + Clone> Parser<T, U> for NamedP<T, U, P> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        self.parser.parse(input)
    }
}

/*========================================*/
/*          Parser: Seq                   */
/*========================================*/

// Failures inside a sequence are reported at the start of the whole sequence, not at the
// position where the failing element was tried. The message still names that element.

/// Parse a sequence of things in order, keeping only the output of the last one.
///
/// `parsers` is a tuple of 1 to 10 parsers, which may have different output types. If any of
/// them fails, the sequence fails with an [`ExpectedFailure`](ParseResult::ExpectedFailure)
/// naming it, and the remaining input is where the sequence started.
///
/// ```
/// use parser_peg::{eq, seq, Parser, Seq};
///
/// let ab = seq((eq('a'), eq('b')));
/// assert_eq!(ab.parse(&Seq::from("ab")).into_value(), Some('b'));
/// assert_eq!(ab.parse(&Seq::from("ax")).message(), Some("'b' is expected"));
/// ```
pub fn seq<T, U, S: SeqTuple<T, U>>(parsers: S) -> impl Parser<T, S::Last> + Clone {
    parsers.make_seq()
}

/// Parse a sequence of things in order, collecting their outputs in a tuple.
///
/// Fails like [`seq()`].
pub fn tuple<T, U, S: SeqTuple<T, U>>(parsers: S) -> impl Parser<T, U> + Clone {
    let name = format!("tuple({})", parsers.names().join(", "));
    parsers.make_tuple(name)
}

/// A tuple of parsers for [`seq()`], [`tuple()`] and [`bind()`](crate::bind()). Each tuple element
/// must be a parser; they may have different output types. Can have length up to 10.
pub trait SeqTuple<T, U> {
    /// The output type of the last parser.
    type Last;

    #[doc(hidden)]
    fn names(&self) -> Vec<String>;
    #[doc(hidden)]
    fn make_tuple(self, name: String) -> impl Parser<T, U> + Clone;
    #[doc(hidden)]
    fn make_seq(self) -> impl Parser<T, Self::Last> + Clone;
}

macro_rules! define_seq {
    ($struct:ident, $last:tt, $ltype:ident, $( ($idx:tt, $type:ident, $parser:ident) ),*) => {
        struct $struct<T, $( $type ),*, $( $parser ),*>
        where $( $parser: Parser<T, $type> + Clone ),*
        {
            name: String,
            parsers: ($( $parser, )*),
            phantom: PhantomData<(T, $( $type ),*)>,
        }

        impl<T, $( $type ),*, $( $parser ),*> Clone
        for $struct<T, $( $type ),*, $( $parser ),*>
        where $( $parser: Parser<T, $type> + Clone ),*
        {
            fn clone(&self) -> Self {
                $struct {
                    name: self.name.clone(),
                    parsers: self.parsers.clone(),
                    phantom: PhantomData,
                }
            }
        }

        impl<T, $( $type ),*, $( $parser ),*> Parser<T, ($( $type, )*)>
        for $struct<T, $( $type ),*, $( $parser ),*>
        where $( $parser: Parser<T, $type> + Clone ),*
        {
            fn name(&self) -> String {
                self.name.clone()
            }

            fn parse(&self, input: &Seq<T>) -> ParseResult<T, ($( $type, )*)> {
                let mut cursor = input.clone();
                let values = ( $(
                    match self.parsers.$idx.parse(&cursor) {
                        ParseResult::Success { value, next } => {
                            cursor = next;
                            value
                        }
                        _ => {
                            return ParseResult::ExpectedFailure {
                                message: format!("{} is expected", self.parsers.$idx.name()),
                                next: input.clone(),
                            }
                        }
                    },
                )* );
                ParseResult::Success {
                    value: values,
                    next: cursor,
                }
            }
        }

        impl<T, $( $type ),*, $( $parser ),*> SeqTuple<T, ($( $type, )*)> for ($( $parser, )*)
        where $( $parser: Parser<T, $type> + Clone ),*
        {
            type Last = $ltype;

            fn names(&self) -> Vec<String> {
                vec![$( self.$idx.name() ),*]
            }

            fn make_tuple(self, name: String) -> impl Parser<T, ($( $type, )*)> + Clone {
                $struct {
                    name,
                    parsers: self,
                    phantom: PhantomData,
                }
            }

            fn make_seq(self) -> impl Parser<T, $ltype> + Clone {
                let name = format!(
                    "seq({})",
                    <Self as SeqTuple<T, ($( $type, )*)>>::names(&self).join(", ")
                );
                <Self as SeqTuple<T, ($( $type, )*)>>::make_tuple(self, name)
                    .map(|values: ($( $type, )*)| values.$last)
            }
        }
    }
}

define_seq!(SeqP1, 0, U0, (0, U0, P0));
define_seq!(SeqP2, 1, U1, (0, U0, P0), (1, U1, P1));
define_seq!(SeqP3, 2, U2, (0, U0, P0), (1, U1, P1), (2, U2, P2));
define_seq!(
    SeqP4,
    3,
    U3,
    (0, U0, P0),
    (1, U1, P1),
    (2, U2, P2),
    (3, U3, P3)
);
define_seq!(
    SeqP5,
    4,
    U4,
    (0, U0, P0),
    (1, U1, P1),
    (2, U2, P2),
    (3, U3, P3),
    (4, U4, P4)
);
define_seq!(
    SeqP6,
    5,
    U5,
    (0, U0, P0),
    (1, U1, P1),
    (2, U2, P2),
    (3, U3, P3),
    (4, U4, P4),
    (5, U5, P5)
);
define_seq!(
    SeqP7,
    6,
    U6,
    (0, U0, P0),
    (1, U1, P1),
    (2, U2, P2),
    (3, U3, P3),
    (4, U4, P4),
    (5, U5, P5),
    (6, U6, P6)
);
define_seq!(
    SeqP8,
    7,
    U7,
    (0, U0, P0),
    (1, U1, P1),
    (2, U2, P2),
    (3, U3, P3),
    (4, U4, P4),
    (5, U5, P5),
    (6, U6, P6),
    (7, U7, P7)
);
define_seq!(
    SeqP9,
    8,
    U8,
    (0, U0, P0),
    (1, U1, P1),
    (2, U2, P2),
    (3, U3, P3),
    (4, U4, P4),
    (5, U5, P5),
    (6, U6, P6),
    (7, U7, P7),
    (8, U8, P8)
);
define_seq!(
    SeqP10,
    9,
    U9,
    (0, U0, P0),
    (1, U1, P1),
    (2, U2, P2),
    (3, U3, P3),
    (4, U4, P4),
    (5, U5, P5),
    (6, U6, P6),
    (7, U7, P7),
    (8, U8, P8),
    (9, U9, P9)
);

/*========================================*/
/*          Parser: Or                    */
/*========================================*/

/// Try each alternative in order on the same input; the first success wins.
///
/// `parsers` is a tuple of 1 to 10 parsers that all have the same output type. This is
/// ordered choice: a later alternative is never tried once an earlier one has succeeded, even
/// if the later one would have consumed more. If every alternative fails, so does this, with
/// the input left where it was.
///
/// ```
/// use parser_peg::{eq, or, Parser, Seq};
///
/// let a_or_x = or((eq('a'), eq('x')));
/// let result = a_or_x.parse(&Seq::from("xy"));
/// assert_eq!(result.value(), Some(&'x'));
/// assert_eq!(result.next().first(), Some('y'));
/// ```
pub fn or<T, U>(parsers: impl ChoiceTuple<T, U>) -> impl Parser<T, U> + Clone {
    parsers.make_choice()
}

/// A tuple of parsers for [`or()`] to try. Each tuple element must be a parser, and they must
/// all have the same output type. Can have length 1 to 10.
pub trait ChoiceTuple<T, U> {
    #[doc(hidden)]
    fn make_choice(self) -> impl Parser<T, U> + Clone;
}

macro_rules! define_choice {
    ($struct:ident, $( ($idx:tt, $parser:ident) ),*) => {
        struct $struct<T, U, $( $parser ),*>
        where $( $parser: Parser<T, U> + Clone ),*
        {
            alternatives: String,
            parsers: ($( $parser, )*),
            phantom: PhantomData<(T, U)>,
        }

        impl<T, U, $( $parser ),*> Clone
        for $struct<T, U, $( $parser ),*>
        where $( $parser: Parser<T, U> + Clone ),*
        {
            fn clone(&self) -> Self {
                $struct {
                    alternatives: self.alternatives.clone(),
                    parsers: self.parsers.clone(),
                    phantom: PhantomData,
                }
            }
        }

        impl<T, U, $( $parser ),*> Parser<T, U>
        for $struct<T, U, $( $parser ),*>
        where $( $parser: Parser<T, U> + Clone ),*
        {
            fn name(&self) -> String {
                format!("or({})", self.alternatives)
            }

            fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
                $(
                    let result = self.parsers.$idx.parse(input);
                    if result.is_success() {
                        return result;
                    }
                )*
                ParseResult::ExpectedFailure {
                    message: format!("One of {}", self.alternatives),
                    next: input.clone(),
                }
            }
        }

        impl<T, U, $( $parser ),*> ChoiceTuple<T, U> for ($( $parser, )*)
        where $( $parser: Parser<T, U> + Clone ),*
        {
            fn make_choice(self) -> impl Parser<T, U> + Clone {
                let alternatives = vec![$( self.$idx.name() ),*].join(", ");
                $struct {
                    alternatives,
                    parsers: self,
                    phantom: PhantomData,
                }
            }
        }
    }
}

define_choice!(OrP1, (0, P0));
define_choice!(OrP2, (0, P0), (1, P1));
define_choice!(OrP3, (0, P0), (1, P1), (2, P2));
define_choice!(OrP4, (0, P0), (1, P1), (2, P2), (3, P3));
define_choice!(OrP5, (0, P0), (1, P1), (2, P2), (3, P3), (4, P4));
define_choice!(
    OrP6,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5)
);
define_choice!(
    OrP7,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5),
    (6, P6)
);
define_choice!(
    OrP8,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5),
    (6, P6),
    (7, P7)
);
define_choice!(
    OrP9,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5),
    (6, P6),
    (7, P7),
    (8, P8)
);
define_choice!(
    OrP10,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5),
    (6, P6),
    (7, P7),
    (8, P8),
    (9, P9)
);

/*========================================*/
/*          Parser: Many                  */
/*========================================*/

struct ManyP<T, U, P: Parser<T, U> + Clone> {
    name: String,
    parser: P,
    at_least: usize,
    at_most: usize,
    phantom: PhantomData<(T, U)>,
}

impl<T, U, P: Parser<T, U> + Clone> Clone for ManyP<T, U, P> {
    fn clone(&self) -> Self {
        ManyP {
            name: self.name.clone(),
            parser: self.parser.clone(),
            at_least: self.at_least,
            at_most: self.at_most,
            phantom: PhantomData,
        }
    }
}

impl<T, U, P: Parser<T, U> + Clone> Parser<T, Vec<U>> for ManyP<T, U, P> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, Vec<U>> {
        let mut values = Vec::new();
        let mut cursor = input.clone();
        while values.len() < self.at_most {
            match self.parser.parse(&cursor) {
                ParseResult::Success { value, next } => {
                    let consumed = !next.same_position(&cursor);
                    values.push(value);
                    cursor = next;
                    // A match that consumes nothing would match forever.
                    if !consumed && values.len() >= self.at_least {
                        break;
                    }
                }
                _ => break,
            }
        }
        if values.len() < self.at_least {
            return ParseResult::ExpectedFailure {
                message: format!("At least {} of {}", self.at_least, self.parser.name()),
                next: input.clone(),
            };
        }
        ParseResult::Success {
            value: values,
            next: cursor,
        }
    }
}

/// Parse `parser` as many times as possible, zero or more.
pub fn many<T, U>(parser: impl Parser<T, U> + Clone) -> impl Parser<T, Vec<U>> + Clone {
    let name = format!("many({})", parser.name());
    make_many(name, parser, 0, usize::MAX)
}

/// Parse `parser` as many times as possible, at least once.
pub fn many1<T, U>(parser: impl Parser<T, U> + Clone) -> impl Parser<T, Vec<U>> + Clone {
    let name = format!("many1({})", parser.name());
    make_many(name, parser, 1, usize::MAX)
}

/// Parse `parser` as many times as possible, up to `at_most` times, failing if it matched
/// fewer than `at_least` times.
///
/// On failure, the remaining input is where the repetition started. If `at_least > at_most`
/// this can never succeed.
pub fn many_between<T, U>(
    parser: impl Parser<T, U> + Clone,
    at_least: usize,
    at_most: usize,
) -> impl Parser<T, Vec<U>> + Clone {
    let name = format!("many({}, {}..={})", parser.name(), at_least, at_most);
    make_many(name, parser, at_least, at_most)
}

/// Parse `parser` exactly `count` times.
pub fn repeat<T, U>(parser: impl Parser<T, U> + Clone, count: usize) -> impl Parser<T, Vec<U>> + Clone {
    let name = format!("repeat({}, {})", parser.name(), count);
    make_many(name, parser, count, count)
}

fn make_many<T, U>(
    name: String,
    parser: impl Parser<T, U> + Clone,
    at_least: usize,
    at_most: usize,
) -> impl Parser<T, Vec<U>> + Clone {
    ManyP {
        name,
        parser,
        at_least,
        at_most,
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Parser: Optional              */
/*========================================*/

struct OptP<T, U, P: Parser<T, U> + Clone>(P, PhantomData<(T, U)>);

impl<T, U, P: Parser<T, U> + Clone> Clone for OptP<T, U, P> {
    fn clone(&self) -> Self {
        OptP(self.0.clone(), PhantomData)
    }
}

impl<T, U, P: Parser<T, U> + Clone> Parser<T, Option<U>> for OptP<T, U, P> {
    fn name(&self) -> String {
        format!("optional({})", self.0.name())
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, Option<U>> {
        match self.0.parse(input) {
            ParseResult::Success { value, next } => ParseResult::Success {
                value: Some(value),
                next,
            },
            ParseResult::ExpectedFailure { .. } | ParseResult::UnexpectedFailure { .. } => {
                ParseResult::Success {
                    value: None,
                    next: input.clone(),
                }
            }
        }
    }
}

/// Either parse `parser`, or parse nothing. Never fails.
pub fn optional<T, U>(parser: impl Parser<T, U> + Clone) -> impl Parser<T, Option<U>> + Clone {
    OptP(parser, PhantomData)
}

/*========================================*/
/*          Parser: Peek & Not            */
/*========================================*/

struct PeekP<T, U, P: Parser<T, U> + Clone>(P, PhantomData<(T, U)>);

impl<T, U, P: Parser<T, U> + Clone> Clone for PeekP<T, U, P> {
    fn clone(&self) -> Self {
        PeekP(self.0.clone(), PhantomData)
    }
}

impl<T, U, P: Parser<T, U> + Clone> Parser<T, U> for PeekP<T, U, P> {
    fn name(&self) -> String {
        format!("peek({})", self.0.name())
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        match self.0.parse(input) {
            ParseResult::Success { value, .. } => ParseResult::Success {
                value,
                next: input.clone(),
            },
            failure => failure,
        }
    }
}

/// Parse `parser` but don't consume anything. Failures are passed through unchanged.
pub fn peek<T, U>(parser: impl Parser<T, U> + Clone) -> impl Parser<T, U> + Clone {
    PeekP(parser, PhantomData)
}

struct NotP<T, U, P: Parser<T, U> + Clone>(P, PhantomData<(T, U)>);

impl<T, U, P: Parser<T, U> + Clone> Clone for NotP<T, U, P> {
    fn clone(&self) -> Self {
        NotP(self.0.clone(), PhantomData)
    }
}

impl<T: Clone, U, P: Parser<T, U> + Clone> Parser<T, T> for NotP<T, U, P> {
    fn name(&self) -> String {
        format!("not({})", self.0.name())
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, T> {
        if self.0.parse(input).is_success() {
            return ParseResult::UnexpectedFailure {
                message: format!("Not {} is expected", self.0.name()),
                next: input.clone(),
            };
        }
        // There's no token to produce at the end of input, so `not` can't succeed there.
        match input.head() {
            Some(head) => ParseResult::Success {
                value: head.clone(),
                next: input.clone(),
            },
            None => ParseResult::UnexpectedFailure {
                message: "EOS".to_owned(),
                next: input.clone(),
            },
        }
    }
}

/// Succeed, without consuming anything, if `parser` would fail here. Produces the current
/// token.
///
/// At the end of input this fails with an
/// [`UnexpectedFailure`](ParseResult::UnexpectedFailure), whether or not `parser` would fail;
/// use [`eos`](crate::eos()) to test for the end of input.
pub fn not<T: Clone, U>(parser: impl Parser<T, U> + Clone) -> impl Parser<T, T> + Clone {
    NotP(parser, PhantomData)
}

/*========================================*/
/*          Parser: Debug                 */
/*========================================*/

struct DebugP<T, U, P, F>
where
    P: Parser<T, U> + Clone,
    F: Fn(&ParseResult<T, U>) + Clone,
{
    parser: P,
    observer: F,
    phantom: PhantomData<(T, U)>,
}

impl<T, U, P, F> Clone for DebugP<T, U, P, F>
where
    P: Parser<T, U> + Clone,
    F: Fn(&ParseResult<T, U>) + Clone,
{
    fn clone(&self) -> Self {
        DebugP {
            parser: self.parser.clone(),
            observer: self.observer.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T, U, P, F> Parser<T, U> for DebugP<T, U, P, F>
where
    P: Parser<T, U> + Clone,
    F: Fn(&ParseResult<T, U>) + Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        let result = self.parser.parse(input);
        (self.observer)(&result);
        result
    }
}

/// Parse `parser`, showing every result it produces to `observer`. The result itself is
/// returned unchanged.
pub fn debug<T, U>(
    parser: impl Parser<T, U> + Clone,
    observer: impl Fn(&ParseResult<T, U>) + Clone,
) -> impl Parser<T, U> + Clone {
    DebugP {
        parser,
        observer,
        phantom: PhantomData,
    }
}

/// The observer used by [`Parser::trace`]: one colored line on stderr per result.
pub(crate) fn trace_line<T, U: std::fmt::Debug>(name: &str, result: &ParseResult<T, U>) -> String {
    use colored::Colorize;

    let offset = result.next().offset();
    match result {
        ParseResult::Success { value, .. } => format!(
            "{} {} {:?} (next at {})",
            name.bold(),
            "matched".green(),
            value,
            offset
        ),
        ParseResult::ExpectedFailure { message, .. } => format!(
            "{} {} {} (at {})",
            name.bold(),
            "expected".yellow(),
            message,
            offset
        ),
        ParseResult::UnexpectedFailure { message, .. } => format!(
            "{} {} {} (at {})",
            name.bold(),
            "unexpected".red(),
            message,
            offset
        ),
    }
}

#[test]
fn test_many_stops_on_zero_width_matches() {
    let input = Seq::from("b");
    let result = many(optional(crate::eq('a'))).parse(&input);
    assert_eq!(result.value(), Some(&vec![None]));
    assert_eq!(result.next(), &input);

    let result = repeat(optional(crate::eq('a')), 3).parse(&input);
    assert_eq!(result.value(), Some(&vec![None, None, None]));
}

#[test]
fn test_or_with_one_alternative() {
    let only_a = or((crate::eq('a'),));
    assert_eq!(only_a.name(), "or('a')");
    assert_eq!(only_a.parse(&Seq::from("ab")).into_value(), Some('a'));

    let input = Seq::from("b");
    let result = only_a.parse(&input);
    assert_eq!(result.message(), Some("One of 'a'"));
    assert_eq!(result.next(), &input);
}

#[test]
fn test_many_with_impossible_bounds() {
    let result = many_between(crate::eq('a'), 3, 2).parse(&Seq::from("aaaa"));
    assert_eq!(result.message(), Some("At least 3 of 'a'"));
}

#[test]
fn test_trace_line() {
    colored::control::set_override(false);

    let input = Seq::from("ab");
    let result = crate::eq('a').parse(&input);
    assert_eq!(trace_line("'a'", &result), "'a' matched 'a' (next at 1)");
    let result = crate::eq('b').parse(&input);
    assert_eq!(
        trace_line("'b'", &result),
        "'b' expected Satisfying 'b' (at 0)"
    );
}
