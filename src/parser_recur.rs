use crate::{ParseResult, Parser, Seq};
use std::cell::OnceCell;
use std::rc::{Rc, Weak};

/*========================================*/
/*          Parser: Recursion             */
/*========================================*/

/// Used to define recursive parsers.
///
/// The key is that you can [`Recursive::refn`] it before you [`Recursive::define`] it!
///
/// ```
/// use parser_peg::{eq, or, Parser, Recursive, Seq};
///
/// // Balanced parentheses, producing their nesting depth.
/// let nested = Recursive::<char, usize>::new("nested");
/// let parens = nested
///     .refn()
///     .preceded(eq('('))
///     .terminated(eq(')'))
///     .map(|depth| depth + 1);
/// let nested = nested.define(or((parens, eq('x').constant(0))));
///
/// assert_eq!(nested.run("input", Seq::from("((x))")), Ok(2));
/// assert!(nested.run("input", Seq::from("((x)")).is_err());
/// ```
pub struct Recursive<T, U>(Rc<RecurP<T, U>>);

impl<T, U> Recursive<T, U> {
    /// Declare a new recursive parser. **You must [`Recursive::define`] it later!**
    ///
    /// # Panics
    ///
    /// The recursive parser will panic if you attempt to parse with a [`Recursive::refn`] of
    /// it before it has been `define`d, or after the parser returned by `define` has been
    /// dropped.
    pub fn new(name: &str) -> Recursive<T, U> {
        Recursive(Rc::new(RecurP {
            name: name.to_owned(),
            parser: OnceCell::new(),
        }))
    }

    /// Construct a reference to this recursive parser. Importantly, you may use this
    /// reference _before_ `define`ing the parser.
    pub fn refn(&self) -> impl Parser<T, U> + Clone {
        RecurPWeak {
            name: self.0.name.clone(),
            weak: Rc::downgrade(&self.0),
        }
    }

    /// Define this recursive parser to be equal to `parser`. `parser` may make use
    /// of [`Recursive::refn`]s inside of itself (and indeed it ought to; otherwise
    /// there was no need to use `Recursive`).
    pub fn define(self, parser: impl Parser<T, U> + Clone + 'static) -> impl Parser<T, U> + Clone {
        match self.0.parser.set(Box::new(parser)) {
            Ok(()) => (),
            Err(_) => panic!("Bug in recur: failed to set OnceCell"),
        }
        RecurPStrong(self.0)
    }
}

struct RecurP<T, U> {
    name: String,
    parser: OnceCell<Box<dyn Parser<T, U>>>,
}

impl<T, U> RecurP<T, U> {
    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        match self.parser.get() {
            Some(parser) => parser.parse(input),
            None => panic!(
                "Recursive: you must call 'define()' before using recursive parser '{}'",
                self.name
            ),
        }
    }
}

/* ========== Recur: Weak ========== */

/// Private. The type returned by `Recursive.refn()`.
/// This is a _weak_ pointer so that if the outer `RecurPStrong` pointer is dropped,
/// the RecurP can be dropped. I.e., these are the self-references.
struct RecurPWeak<T, U> {
    name: String,
    weak: Weak<RecurP<T, U>>,
}

impl<T, U> Clone for RecurPWeak<T, U> {
    fn clone(&self) -> Self {
        RecurPWeak {
            name: self.name.clone(),
            weak: self.weak.clone(),
        }
    }
}

impl<T, U> Parser<T, U> for RecurPWeak<T, U> {
    // Known without upgrading, so refs can be named while the grammar is still being built.
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        match self.weak.upgrade() {
            None => panic!(
                "Recursive: you must call 'define()' before using recursive parser '{}'",
                self.name
            ),
            Some(rc) => rc.parse(input),
        }
    }
}

/* ========== Recur: Strong ========== */

/// Private. The type returned by `Recursive.define()`.
/// Once the Recursive has been defined, this is the unique strong pointer to its RecurP.
struct RecurPStrong<T, U>(Rc<RecurP<T, U>>);

impl<T, U> Clone for RecurPStrong<T, U> {
    fn clone(&self) -> Self {
        RecurPStrong(self.0.clone())
    }
}

impl<T, U> Parser<T, U> for RecurPStrong<T, U> {
    fn name(&self) -> String {
        self.0.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, U> {
        self.0.parse(input)
    }
}

#[test]
fn test_nested_lists() {
    use crate::{eq, matches, or};

    // A digit, or a bracketed comma-separated list; produces the sum of all digits.
    let expr = Recursive::<char, u32>::new("expr");
    let digit = matches("[0-9]")
        .unwrap()
        .map(|ch| ch.to_digit(10).unwrap_or(0));
    let list = expr
        .refn()
        .many_sep0(eq(','))
        .preceded(eq('['))
        .terminated(eq(']'))
        .map(|items| items.into_iter().sum::<u32>());
    let expr = expr.define(or((digit, list)));

    assert_eq!(expr.name(), "expr");
    assert_eq!(expr.run("input", Seq::from("[1,[2,3],[],[[4]]]")), Ok(10));
    assert_eq!(expr.run("input", Seq::from("7")), Ok(7));
    assert!(expr.run("input", Seq::from("[1,[2]")).is_err());
}

#[test]
#[should_panic(expected = "you must call 'define()'")]
fn test_undefined_recursive_parser() {
    let undefined = Recursive::<char, char>::new("undefined");
    let parser = undefined.refn();
    drop(undefined);
    parser.parse(&Seq::from("x"));
}
