//! A lazy, memoizing sequence of tokens over a single-pass [`Source`].
//!
//! A [`Seq`] is a position in an immutable cons-list. The list is built on demand: forcing
//! [`Seq::tail`] pulls one token from the source and caches the resulting node, so every later
//! call (from this branch or any other branch holding the same position) gets the identical node
//! back and the source is never asked for that position again. Backtracking is therefore just
//! "parse again from a `Seq` you kept around".

use crate::source::{CharReader, ReadStatus, Source};
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::io::Read;
use std::rc::Rc;

type SharedSource<T> = Rc<RefCell<dyn Source<T>>>;

/*========================================*/
/*          Seq                           */
/*========================================*/

/// A position in a lazily materialized token sequence.
///
/// Cloning a `Seq` is cheap (a reference count bump) and never touches the source.
pub struct Seq<T>(Rc<Node<T>>);

struct Node<T> {
    /// Index of this position, counting from the first token of the source.
    offset: usize,
    kind: NodeKind<T>,
}

enum NodeKind<T> {
    Cons {
        head: T,
        tail: OnceCell<Seq<T>>,
        source: SharedSource<T>,
    },
    Nil,
}

impl<T> Seq<T> {
    /// Start a sequence over `source`. The first token is pulled immediately.
    pub fn new(source: impl Source<T> + 'static) -> Seq<T> {
        let source: SharedSource<T> = Rc::new(RefCell::new(source));
        Seq::pull(&source, 0)
    }

    /// Start a sequence whose tokens come from calling `pull` until it returns `None`.
    pub fn from_fn(pull: impl FnMut() -> Option<T> + 'static) -> Seq<T> {
        Seq::new(std::iter::from_fn(pull))
    }

    /// A sequence with no tokens at all.
    pub fn empty() -> Seq<T> {
        Seq(Rc::new(Node {
            offset: 0,
            kind: NodeKind::Nil,
        }))
    }

    fn pull(source: &SharedSource<T>, offset: usize) -> Seq<T> {
        let token = source.borrow_mut().pull();
        let kind = match token {
            Some(head) => NodeKind::Cons {
                head,
                tail: OnceCell::new(),
                source: source.clone(),
            },
            None => NodeKind::Nil,
        };
        Seq(Rc::new(Node { offset, kind }))
    }

    /// The token at this position, or `None` at the end of the sequence.
    pub fn head(&self) -> Option<&T> {
        match &self.0.kind {
            NodeKind::Cons { head, .. } => Some(head),
            NodeKind::Nil => None,
        }
    }

    /// The sequence after this position.
    ///
    /// The first call pulls from the source; every later call returns the same cached node.
    /// The tail of an empty sequence is itself.
    pub fn tail(&self) -> Seq<T> {
        match &self.0.kind {
            NodeKind::Cons { tail, source, .. } => tail
                .get_or_init(|| Seq::pull(source, self.0.offset + 1))
                .clone(),
            NodeKind::Nil => self.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0.kind, NodeKind::Nil)
    }

    /// How many tokens precede this position.
    pub fn offset(&self) -> usize {
        self.0.offset
    }

    /// Whether `self` and `other` denote the same position. All empty sequences are the same
    /// position.
    pub fn same_position(&self, other: &Seq<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || (self.is_empty() && other.is_empty())
    }
}

impl<T: Clone> Seq<T> {
    /// A copy of the token at this position.
    pub fn first(&self) -> Option<T> {
        self.head().cloned()
    }

    /// Iterate over the tokens from this position on. The iterator walks (and memoizes) the
    /// same nodes as every other traversal of this sequence.
    pub fn iter(&self) -> SeqIter<T> {
        SeqIter { seq: self.clone() }
    }
}

impl Seq<char> {
    /// A sequence of the UTF-8 characters read from `reader`, along with the status of the
    /// read.
    ///
    /// Invalid byte sequences come out as `U+FFFD`. An I/O error ends the sequence, and is
    /// then available from the returned [`ReadStatus`].
    pub fn from_reader(reader: impl Read + 'static) -> (Seq<char>, ReadStatus) {
        let reader = CharReader::new(reader);
        let status = reader.status();
        (Seq::new(reader), status)
    }
}

impl From<&str> for Seq<char> {
    fn from(text: &str) -> Seq<char> {
        Seq::new(text.chars().collect::<Vec<_>>().into_iter())
    }
}

impl From<String> for Seq<char> {
    fn from(text: String) -> Seq<char> {
        Seq::from(text.as_str())
    }
}

impl<T> Clone for Seq<T> {
    fn clone(&self) -> Seq<T> {
        Seq(self.0.clone())
    }
}

impl<T> PartialEq for Seq<T> {
    fn eq(&self, other: &Seq<T>) -> bool {
        self.same_position(other)
    }
}

impl<T> Eq for Seq<T> {}

impl<T: fmt::Debug> fmt::Debug for Seq<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.head() {
            Some(head) => write!(f, "Seq@{}({:?}, ..)", self.0.offset, head),
            None => write!(f, "Seq@{}(EOS)", self.0.offset),
        }
    }
}

impl<T> Node<T> {
    fn take_tail(&mut self) -> Option<Seq<T>> {
        match &mut self.kind {
            NodeKind::Cons { tail, .. } => tail.take(),
            NodeKind::Nil => None,
        }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // Unlink the chain one node at a time so long inputs don't overflow the stack.
        let mut next = self.take_tail();
        while let Some(Seq(rc)) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut node) => next = node.take_tail(),
                Err(_) => break,
            }
        }
    }
}

/*========================================*/
/*          Iteration                     */
/*========================================*/

/// Iterator over the tokens of a [`Seq`], from [`Seq::iter`].
pub struct SeqIter<T> {
    seq: Seq<T>,
}

impl<T: Clone> Iterator for SeqIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let token = self.seq.first()?;
        self.seq = self.seq.tail();
        Some(token)
    }
}

#[cfg(test)]
fn counting_seq(text: &str) -> (Seq<char>, Rc<std::cell::Cell<usize>>) {
    let pulls = Rc::new(std::cell::Cell::new(0));
    let counter = pulls.clone();
    let mut chars = text.chars().collect::<Vec<_>>().into_iter();
    let seq = Seq::from_fn(move || {
        counter.set(counter.get() + 1);
        chars.next()
    });
    (seq, pulls)
}

#[test]
fn test_tail_is_cached() {
    let (seq, pulls) = counting_seq("ab");
    assert_eq!(pulls.get(), 1);

    let tail_1 = seq.tail();
    let tail_2 = seq.tail();
    assert!(Rc::ptr_eq(&tail_1.0, &tail_2.0));
    assert_eq!(pulls.get(), 2);

    assert_eq!(seq.iter().collect::<String>(), "ab");
    assert_eq!(seq.iter().collect::<String>(), "ab");
    assert_eq!(pulls.get(), 3);
}

#[test]
fn test_end_is_terminal() {
    let seq = Seq::from("a");
    let end = seq.tail();
    assert!(end.is_empty());
    assert_eq!(end.head(), None);
    assert_eq!(end.offset(), 1);
    assert!(Rc::ptr_eq(&end.0, &end.tail().0));
    assert!(Rc::ptr_eq(&end.0, &seq.tail().0));
    assert_eq!(end, Seq::empty());
}

#[test]
fn test_offsets() {
    let seq = Seq::from("xyz");
    assert_eq!(seq.offset(), 0);
    assert_eq!(seq.tail().offset(), 1);
    assert_eq!(seq.tail().tail().first(), Some('z'));
    assert_eq!(seq.tail().tail().tail().offset(), 3);
}

#[test]
fn test_positions() {
    let seq = Seq::from("aa");
    assert_eq!(seq, seq.clone());
    assert_ne!(seq, seq.tail());
    // Same token value at different positions is a different position.
    assert_ne!(seq.tail(), Seq::from("a"));
}

#[test]
fn test_reader_decodes_utf8() {
    let bytes = "né€😀".as_bytes().to_vec();
    let (seq, status) = Seq::from_reader(std::io::Cursor::new(bytes));
    assert_eq!(seq.iter().collect::<String>(), "né€😀");
    assert!(status.is_ok());

    let (seq, _) = Seq::from_reader(std::io::Cursor::new(vec![b'a', 0xFF, 0xC3, b'b']));
    assert_eq!(seq.iter().collect::<String>(), "a\u{FFFD}\u{FFFD}b");
}

#[test]
fn test_reader_error_is_kept() {
    use crate::source::FailingReader;

    let (seq, status) = Seq::from_reader(FailingReader {
        data: b"a,b\n".to_vec(),
    });
    // The sequence ends where the error happened...
    assert_eq!(seq.iter().collect::<String>(), "a,b\n");
    // ...but the error isn't lost.
    assert!(!status.is_ok());
    assert_eq!(
        status.take_error().map(|err| err.to_string()),
        Some("disk gone".to_owned())
    );
}

#[test]
fn test_long_sequence_drops() {
    let start = Seq::new(0..1_000_000);
    let mut cursor = start.clone();
    while !cursor.is_empty() {
        cursor = cursor.tail();
    }
    assert_eq!(cursor.offset(), 1_000_000);
    drop(cursor);
    drop(start);
}
