use crate::{ParseResult, Parser, Seq, SeqTuple};
use std::marker::PhantomData;

/*========================================*/
/*          Parser: Bind                  */
/*========================================*/

struct BindP<T, U, V, P, Q, F>
where
    P: Parser<T, U> + Clone,
    Q: Parser<T, V>,
    F: Fn(U) -> Q + Clone,
{
    name: String,
    parser: P,
    func: F,
    phantom: PhantomData<(T, U, V, Q)>,
}

impl<T, U, V, P, Q, F> Clone for BindP<T, U, V, P, Q, F>
where
    P: Parser<T, U> + Clone,
    Q: Parser<T, V>,
    F: Fn(U) -> Q + Clone,
{
    fn clone(&self) -> Self {
        BindP {
            name: self.name.clone(),
            parser: self.parser.clone(),
            func: self.func.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T, U, V, P, Q, F> Parser<T, V> for BindP<T, U, V, P, Q, F>
where
    P: Parser<T, U> + Clone,
    Q: Parser<T, V>,
    F: Fn(U) -> Q + Clone,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, input: &Seq<T>) -> ParseResult<T, V> {
        match self.parser.parse(input) {
            ParseResult::Success { value, next } => (self.func)(value).parse(&next),
            ParseResult::ExpectedFailure { message, next } => {
                ParseResult::ExpectedFailure { message, next }
            }
            ParseResult::UnexpectedFailure { message, next } => {
                ParseResult::UnexpectedFailure { message, next }
            }
        }
    }
}

/// Parse `parsers` in sequence, then hand all of their outputs to `func` to pick the parser
/// that parses what comes next.
///
/// `parsers` is a tuple of 1 to 10 parsers, like for [`tuple()`](crate::tuple()). `func`
/// receives their outputs as a tuple, and whatever the parser it returns produces is the
/// result of the whole thing, failures included. If one of `parsers` fails, `func` isn't called
/// and the failure is reported the way [`seq()`](crate::seq()) reports it.
///
/// This is what lets a grammar depend on what it has already seen:
///
/// ```
/// use parser_peg::{any, bind, eq, Parser, Seq};
///
/// // A character, then the same character again.
/// let double = bind((any::<char>(),), |(c,): (char,)| eq(c));
/// assert!(double.parse(&Seq::from("aa")).is_success());
/// assert!(!double.parse(&Seq::from("ab")).is_success());
/// ```
pub fn bind<T, U, V, S, Q, F>(parsers: S, func: F) -> impl Parser<T, V> + Clone
where
    S: SeqTuple<T, U>,
    Q: Parser<T, V>,
    F: Fn(U) -> Q + Clone,
{
    let name = format!("bind({})", parsers.names().join(", "));
    BindP {
        name: name.clone(),
        parser: parsers.make_tuple(name),
        func,
        phantom: PhantomData,
    }
}

#[test]
fn test_bind_uses_all_outputs() {
    use crate::{any, eq, result, token};

    // A count digit, a separator, then that many copies of the separator.
    let counted = bind((any::<char>(), any::<char>()), |(count, sep): (char, char)| {
        let count = count.to_digit(10).unwrap_or(0) as usize;
        crate::repeat(eq(sep), count).map(|seps| seps.len())
    });
    let result_1 = counted.parse(&Seq::from("2,,,x"));
    assert_eq!(result_1.value(), Some(&2));
    assert_eq!(result_1.next().iter().collect::<String>(), "x");
    assert!(!counted.parse(&Seq::from("3,,x")).is_success());

    let input = Seq::from("ab");
    let failed = bind((token("ax".chars()),), |_| result::<char, ()>(()));
    let failed_result = failed.parse(&input);
    assert_eq!(failed_result.message(), Some("['a', 'x'] is expected"));
    assert_eq!(failed_result.next(), &input);
    assert_eq!(failed.name(), "bind(['a', 'x'])");
}
