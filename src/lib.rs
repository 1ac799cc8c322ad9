// This design achieves all of the following:
//
// - Backtracking is free: a parser is a function of a `Seq`, and a `Seq` is an immutable
//   position that any number of branches can hold onto.
// - The source is only read once per position, however many alternatives revisit it.
// - The types of parsers are nice: `impl Parser<T, U>`.
// - Parsers can be cloned without having the illegal `Box<Trait + Clone>`.
// - Implementing a parser combinator isn't too onerous.
// - No unnecessary boxing.
//
// Any change to the design is liable to break one of these properties, so if
// considering a change check this list first.

//! # parser_peg
//!
//! **Backtracking PEG parser combinators over a lazily read, replayable input.**
//!
//! ```
//! use parser_peg::{eq, many1, matches, Parser, Seq};
//!
//! let digit = matches("[0-9]").unwrap();
//! let number = many1(digit)
//!     .map(|digits| digits.into_iter().collect::<String>().parse::<u32>().unwrap_or(0));
//! let sum = number.many_sep1(eq('+')).map(|nums| nums.into_iter().sum::<u32>());
//!
//! assert_eq!(sum.run("test_case", Seq::from("1+2+3")), Ok(6));
//!
//! let err = sum.run("test_case", Seq::from("1+2+")).unwrap_err();
//! assert_eq!(err.message(), "EOS is expected");
//! assert_eq!(err.offset(), 3);
//! ```
//!
//! ## Overview
//!
//! This crate centers around the trait `Parser<T, U>`, which represents a parser that reads
//! tokens of type `T` and, if successful, produces a value of type `U`. Parsers are combined
//! together using _combinators_ to create larger parsers.
//!
//! ### Input
//!
//! Parsers read from a [`Seq<T>`], which is a position in a sequence of tokens. A `Seq` can be
//! made from a string, an iterator, or any [`std::io::Read`]er:
//!
//! - `Seq::from("text")` makes a `Seq<char>`.
//! - [`Seq::new`] takes any iterator (or anything else implementing [`Source`]).
//! - [`Seq::from_reader`] decodes UTF-8 from a reader, e.g. stdin. It also hands back a
//!   [`ReadStatus`]; check it after parsing, since an I/O error looks like the end of input to
//!   the parsers.
//!
//! Tokens are only pulled from the underlying source as parsers reach them, and each one is
//! pulled exactly once: when a parser backtracks and a different alternative re-reads the same
//! input, it gets the tokens that were already pulled. So you can start parsing stdin or a
//! socket before the input is complete, without worrying about who read what.
//!
//! What has been pulled is kept, though. [`Parser::run`] holds on to the start of the input,
//! and so does every failure (they're reported where the failing parser started), so by the
//! end of a parse all of the input it reached is in memory.
//!
//! ### Results
//!
//! Running a parser with [`Parser::parse`] produces a [`ParseResult`], which is one of:
//!
//! - `Success`: the parser matched, and produced a value.
//! - `ExpectedFailure`: the parser didn't match here, but something else might.
//!   [`or()`] responds to this by trying the next alternative.
//! - `UnexpectedFailure`: the input can't match, most commonly because it ran out.
//!
//! Every variant carries the remaining input. To parse a whole input and get a proper error
//! message out, use [`Parser::run`] instead, which also requires that all of the input be
//! consumed.
//!
//! ### Backtracking
//!
//! These are PEG semantics: [`or()`] tries its alternatives in order and commits to the first
//! one that succeeds, and [`many()`] is greedy. A parser that fails leaves the input where it
//! was, so there's no need for a `try` combinator.
//!
//! To see the docs for the combinators, take a look at:
//!
//! - [`Parser`]
//! - [`seq()`] and [`tuple()`]
//! - [`or()`]
//! - [`bind()`]
//! - [`Recursive`]
//!
//! ## Reference
//!
//! Here's a quick reference table of the types of all the parser combinators.
//!
//! ```text
//! COMBINATOR           OUTPUT-TYPE    NOTES
//!
//! ~~ primitives ~~
//! any()                T
//! eos()                Eos            zero-width
//! satisfy(f)           T              f: Fn(&T) -> bool
//! eq(v), neq(v)        T
//! contains(vs)         T
//! matches(regex)       char           a whole char must match
//! token(items)         Vec<T>
//! result(v)            V              zero-width
//! expected(msg)        V              always fails
//! offset()             usize          zero-width
//! from_fn(name, f)     V              f: Fn(&Seq<T>) -> ParseResult<T, V>
//!
//! ~~ mapping ~~
//! P.constant(V)        V
//! P.map(f)             f(P)
//! P.named(name)        P
//!
//! ~~ combination ~~
//! seq((P1, ..., Pn))   Pn
//! tuple((P1, ..., Pn)) (P1, ..., Pn)
//! or((P1, ..., Pn))    P              all Pi have the same output type
//! bind((P1, ..., Pn), f)
//!                      Q              f: Fn((P1, ..., Pn)) -> Q
//! P.then(Q)            Q
//! P.and(Q)             (P, Q)
//! P.preceded(Q)        P
//! P.terminated(Q)      P
//! P.or(Q)              P
//! P.bind(f)            Q              f: Fn(P) -> Q
//!
//! ~~ repetition ~~
//! optional(P)          Option<P>
//! many(P)              Vec<P>
//! many1(P)             Vec<P>
//! many_between(P, m, n)
//!                      Vec<P>
//! repeat(P, n)         Vec<P>
//! P.many_sep0(Q)       Vec<P>
//! P.many_sep1(Q)       Vec<P>
//!
//! ~~ lookahead ~~
//! peek(P)              P              zero-width
//! not(P)               T              zero-width
//!
//! ~~ debugging ~~
//! debug(P, f)          P              f: Fn(&ParseResult<T, P>)
//! P.trace()            P
//!
//! ~~ recursion ~~
//! see struct Recursive
//! ```

mod bind;
mod combinators;
mod parse_error;
mod parse_result;
mod parser_recur;
mod primitive;
mod seq;
mod source;

use combinators::{MapP, NamedP};
use dyn_clone::{clone_box, DynClone};
use std::fmt;
use std::marker::PhantomData;

/*========================================*/
/*          Interface                     */
/*========================================*/

pub use bind::bind;
pub use combinators::{
    debug, many, many1, many_between, not, optional, or, peek, repeat, seq, tuple, ChoiceTuple,
    SeqTuple,
};
pub use parse_error::ParseError;
pub use parse_result::{FailureKind, ParseResult};
pub use parser_recur::Recursive;
pub use primitive::{
    any, contains, eos, eq, escape_char, expected, from_fn, matches, neq, offset, result,
    satisfy, satisfy_named, token, Eos,
};
pub use seq::{Seq, SeqIter};
pub use source::{CharReader, ReadStatus, Source};

/// A parser that reads tokens of type `T` and, on a successful parse, outputs type `U`.
pub trait Parser<T, U>: DynClone {
    /// A descriptive name for this parser. Used in failure messages of enclosing parsers.
    fn name(&self) -> String;

    /// Parse starting at `input`. Never panics on bad input; failures are values.
    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U>;

    /// Parse all of `input`. `filename` is used solely in error messages.
    ///
    /// This fails if the parser fails, or if it succeeds without consuming all of `input`.
    fn run(&self, filename: &str, input: Seq<T>) -> Result<U, ParseError>
    where
        T: fmt::Debug + 'static,
    {
        match self.parse(&input) {
            ParseResult::Success { value, next } if next.is_empty() => Ok(value),
            ParseResult::Success { next, .. } => Err(ParseError::new(
                FailureKind::Expected,
                "EOS is expected".to_owned(),
                filename,
                &input,
                &next,
            )),
            ParseResult::ExpectedFailure { message, next } => Err(ParseError::new(
                FailureKind::Expected,
                message,
                filename,
                &input,
                &next,
            )),
            ParseResult::UnexpectedFailure { message, next } => Err(ParseError::new(
                FailureKind::Unexpected,
                message,
                filename,
                &input,
                &next,
            )),
        }
    }

    /// Erase this parser's type. Useful for picking between differently-typed parsers at
    /// runtime, or for storing parsers in a struct.
    fn boxed(self) -> Box<dyn Parser<T, U>>
    where
        Self: Clone + 'static,
    {
        Box::new(self)
    }

    // ========== Mapping ========== //

    /// Ignore this parser's output, replacing it with `value`.
    fn constant<V: Clone>(self, value: V) -> impl Parser<T, V> + Clone
    where
        Self: Clone,
    {
        self.map(move |_| value.clone())
    }

    /// Transform this parser's output value with `func`.
    fn map<V>(self, func: impl Fn(U) -> V + Clone) -> impl Parser<T, V> + Clone
    where
        Self: Clone,
    {
        MapP {
            parser: self,
            func,
            phantom: PhantomData,
        }
    }

    /// Give this parser a different name, for use in the failure messages of the parsers that
    /// contain it.
    fn named(self, name: impl Into<String>) -> impl Parser<T, U> + Clone
    where
        Self: Clone,
    {
        NamedP {
            name: name.into(),
            parser: self,
            phantom: PhantomData,
        }
    }

    // ========== Sequencing ========== //

    /// Parse `self` followed by `next`, keeping only the output of `next`.
    fn then<V>(self, next: impl Parser<T, V> + Clone) -> impl Parser<T, V> + Clone
    where
        Self: Clone,
    {
        seq((self, next))
    }

    /// Parse `self` followed by `next`, producing a tuple of their outputs.
    fn and<V>(self, next: impl Parser<T, V> + Clone) -> impl Parser<T, (U, V)> + Clone
    where
        Self: Clone,
    {
        tuple((self, next))
    }

    /// Parse `prev` followed by `self`, keeping only the output of `self`.
    fn preceded<V>(self, prev: impl Parser<T, V> + Clone) -> impl Parser<T, U> + Clone
    where
        Self: Clone,
    {
        seq((prev, self))
    }

    /// Parse `self` followed by `next`, keeping only the output of `self`.
    fn terminated<V>(self, next: impl Parser<T, V> + Clone) -> impl Parser<T, U> + Clone
    where
        Self: Clone,
    {
        tuple((self, next)).map(|(value, _)| value)
    }

    /// Parse `self`, then use its output to decide what to parse next. See [`bind()`].
    fn bind<V, Q: Parser<T, V>>(
        self,
        func: impl Fn(U) -> Q + Clone,
    ) -> impl Parser<T, V> + Clone
    where
        Self: Clone,
    {
        bind::bind::<T, (U,), V, _, _, _>((self,), move |(value,): (U,)| func(value))
    }

    // ========== Choice ========== //

    /// Parse `self`, or if it fails, `other`. See [`or()`].
    fn or(self, other: impl Parser<T, U> + Clone) -> impl Parser<T, U> + Clone
    where
        Self: Clone,
    {
        or((self, other))
    }

    // ========== Repetition ========== //

    /// Either parse `self`, or parse nothing.
    fn optional(self) -> impl Parser<T, Option<U>> + Clone
    where
        Self: Clone,
    {
        optional(self)
    }

    /// Parse `self` zero or more times.
    fn many(self) -> impl Parser<T, Vec<U>> + Clone
    where
        Self: Clone,
    {
        many(self)
    }

    /// Parse `self` one or more times.
    fn many1(self) -> impl Parser<T, Vec<U>> + Clone
    where
        Self: Clone,
    {
        many1(self)
    }

    /// Parse `self` between `at_least` and `at_most` times. See [`many_between()`].
    fn many_between(self, at_least: usize, at_most: usize) -> impl Parser<T, Vec<U>> + Clone
    where
        Self: Clone,
    {
        many_between(self, at_least, at_most)
    }

    /// Parse `self` exactly `count` times.
    fn repeat(self, count: usize) -> impl Parser<T, Vec<U>> + Clone
    where
        Self: Clone,
    {
        repeat(self, count)
    }

    /// Parse `self` zero or more times, separated by `sep`s.
    ///
    /// Collects the `self` outputs into a vector, and ignores the `sep` outputs. A trailing
    /// `sep` is not consumed.
    fn many_sep0<V>(self, sep: impl Parser<T, V> + Clone) -> impl Parser<T, Vec<U>> + Clone
    where
        Self: Clone,
    {
        let name = format!("{}.many_sep0({})", self.name(), sep.name());
        optional(self.many_sep1(sep))
            .map(|elems| elems.unwrap_or_default())
            .named(name)
    }

    /// Parse `self` one or more times, separated by `sep`s.
    ///
    /// Collects the `self` outputs into a vector, and ignores the `sep` outputs. A trailing
    /// `sep` is not consumed.
    fn many_sep1<V>(self, sep: impl Parser<T, V> + Clone) -> impl Parser<T, Vec<U>> + Clone
    where
        Self: Clone,
    {
        let name = format!("{}.many_sep1({})", self.name(), sep.name());
        tuple((self.clone(), many(seq((sep, self)))))
            .map(|(first, mut rest)| {
                rest.insert(0, first);
                rest
            })
            .named(name)
    }

    // ========== Lookahead ========== //

    /// Parse `self` without consuming anything. See [`peek()`].
    fn peek(self) -> impl Parser<T, U> + Clone
    where
        Self: Clone,
    {
        peek(self)
    }

    /// Succeed without consuming anything if `self` fails here. See [`not()`].
    fn not(self) -> impl Parser<T, T> + Clone
    where
        T: Clone,
        Self: Clone,
    {
        not(self)
    }

    // ========== Debugging ========== //

    /// Show every result of this parser to `observer`. See [`debug()`].
    fn debug(self, observer: impl Fn(&ParseResult<T, U>) + Clone) -> impl Parser<T, U> + Clone
    where
        Self: Clone,
    {
        debug(self, observer)
    }

    /// Print a line to stderr every time this parser is run, saying how it went.
    fn trace(self) -> impl Parser<T, U> + Clone
    where
        U: fmt::Debug,
        Self: Clone,
    {
        let name = self.name();
        debug(self, move |result: &ParseResult<T, U>| {
            eprintln!("{}", combinators::trace_line(&name, result))
        })
    }
}

impl<T, U> Clone for Box<dyn Parser<T, U>> {
    fn clone(&self) -> Self {
        clone_box(self.as_ref())
    }
}

impl<T, U> Parser<T, U> for Box<dyn Parser<T, U>> {
    fn name(&self) -> String {
        self.as_ref().name()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        self.as_ref().parse(input)
    }
}

#[test]
fn test_run_requires_all_input() {
    colored::control::set_override(false);

    let ab = eq('a').then(eq('b'));
    assert_eq!(ab.run("input", Seq::from("ab")), Ok('b'));

    let err = ab.run("input", Seq::from("abc")).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Expected);
    assert_eq!(
        format!("{}", err),
        "parse error: EOS is expected\n --> input:1:3, found 'c'"
    );

    let err = any::<char>().run("input", Seq::from("")).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unexpected);
    assert_eq!(err.message(), "EOS");
}

#[test]
fn test_boxed() {
    let parsers: Vec<Box<dyn Parser<char, char>>> =
        vec![eq('a').boxed(), any::<char>().boxed(), eq('b').boxed()];
    let input = Seq::from("abc");
    let mut cursor = input.clone();
    for parser in parsers.clone() {
        cursor = parser.parse(&cursor).next().clone();
    }
    assert_eq!(cursor.first(), Some('c'));
    assert_eq!(parsers[0].name(), "'a'");
}

#[test]
fn test_sep() {
    let list = eq('x').many_sep0(eq(','));
    let result = list.parse(&Seq::from("x,x,x,"));
    assert_eq!(result.value(), Some(&vec!['x', 'x', 'x']));
    assert_eq!(result.next().iter().collect::<String>(), ",");

    let result = list.parse(&Seq::from("y"));
    assert_eq!(result.value(), Some(&vec![]));

    let list = eq('x').many_sep1(eq(','));
    assert_eq!(list.name(), "'x'.many_sep1(',')");
    assert_eq!(
        list.parse(&Seq::from("y")).message(),
        Some("'x' is expected")
    );
}

#[test]
fn test_named() {
    let vowel = contains("aeiou".chars()).named("vowel");
    let result = seq((eq('x'), vowel)).parse(&Seq::from("xz"));
    assert_eq!(result.message(), Some("vowel is expected"));
    assert_eq!(result.next().offset(), 0);
}
