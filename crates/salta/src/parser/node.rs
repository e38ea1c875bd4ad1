//! Parser nodes: identity, description, children, and the compiled matcher.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::GrammarError;
use crate::input::Input;

use super::outcome::{terminal, Match, Steps};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique identity of a constructed parser.
///
/// Identity is assigned at construction and never derived from structure: two
/// structurally identical parsers are distinct memo keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserId(u32);

impl ParserId {
    fn fresh() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

pub(crate) type MatcherFn<I> = Box<dyn Fn(&I, usize) -> Result<Steps<I>, GrammarError>>;
type DescribeFn = Box<dyn Fn(&[String]) -> String>;

pub(crate) struct ParserCore<I: Input + ?Sized> {
    id: ParserId,
    name: &'static str,
    cacheable: bool,
    children: Vec<LazyParser<I>>,
    describe: DescribeFn,
    matcher: MatcherFn<I>,
    description: OnceCell<String>,
    describing: Cell<bool>,
}

impl<I: Input + ?Sized> ParserCore<I> {
    fn description(&self) -> String {
        if let Some(done) = self.description.get() {
            return done.clone();
        }
        // A cycle through the grammar falls back to the bare name.
        if self.describing.replace(true) {
            return self.name.to_string();
        }
        let child_descriptions: Vec<String> = self
            .children
            .iter()
            .map(|child| {
                child
                    .resolve()
                    .map_or_else(|_| String::from("?"), |parser| parser.description())
            })
            .collect();
        let rendered = (self.describe)(&child_descriptions);
        self.describing.set(false);
        let _ = self.description.set(rendered.clone());
        rendered
    }
}

/// Cloneable handle to an immutable parser node.
pub struct Parser<I: Input + ?Sized> {
    core: Rc<ParserCore<I>>,
}

impl<I: Input + ?Sized> Clone for Parser<I> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<I: Input + ?Sized> fmt::Debug for Parser<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("id", &self.core.id)
            .field("name", &self.core.name)
            .finish_non_exhaustive()
    }
}

impl<I: Input + ?Sized> Parser<I> {
    pub(crate) fn build(
        name: &'static str,
        cacheable: bool,
        children: Vec<LazyParser<I>>,
        describe: impl Fn(&[String]) -> String + 'static,
        matcher: impl Fn(&I, usize) -> Result<Steps<I>, GrammarError> + 'static,
    ) -> Self {
        Self {
            core: Rc::new(ParserCore {
                id: ParserId::fresh(),
                name,
                cacheable,
                children,
                describe: Box::new(describe),
                matcher: Box::new(matcher),
                description: OnceCell::new(),
                describing: Cell::new(false),
            }),
        }
    }

    /// Build a node whose matcher needs a back-reference to the node itself
    /// (for its description in failure messages). The matcher holds only a
    /// `Weak`, so grammar teardown is not blocked by the cycle.
    pub(crate) fn build_cyclic(
        name: &'static str,
        cacheable: bool,
        children: Vec<LazyParser<I>>,
        describe: impl Fn(&[String]) -> String + 'static,
        make_matcher: impl FnOnce(Weak<ParserCore<I>>) -> MatcherFn<I>,
    ) -> Self {
        Self {
            core: Rc::new_cyclic(|weak| ParserCore {
                id: ParserId::fresh(),
                name,
                cacheable,
                children,
                describe: Box::new(describe),
                matcher: make_matcher(weak.clone()),
                description: OnceCell::new(),
                describing: Cell::new(false),
            }),
        }
    }

    /// Build a leaf matcher.
    ///
    /// This is the contract external matchers implement: given the input and a
    /// position, return exactly one success or failure. Leaves cannot suspend
    /// and are always cacheable, so the closure must be a pure function of
    /// `(input, index)`.
    pub fn leaf(
        name: &'static str,
        description: impl Into<String>,
        matcher: impl Fn(&I, usize) -> Match + 'static,
    ) -> Self {
        let description = description.into();
        Self::build(
            name,
            true,
            Vec::new(),
            move |_| description.clone(),
            move |input, index| Ok(terminal(matcher(input, index))),
        )
    }

    #[must_use]
    pub fn id(&self) -> ParserId {
        self.core.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.core.name
    }

    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.core.cacheable
    }

    /// Human description used in `Expected …` messages. Memoized on the node.
    #[must_use]
    pub fn description(&self) -> String {
        self.core.description()
    }

    pub(crate) fn run_matcher(&self, input: &I, index: usize) -> Result<Steps<I>, GrammarError> {
        (self.core.matcher)(input, index)
    }
}

pub(crate) fn describe_weak<I: Input + ?Sized>(
    weak: &Weak<ParserCore<I>>,
    fallback: &str,
) -> String {
    weak.upgrade()
        .map_or_else(|| fallback.to_string(), |core| core.description())
}

/// A parser reference that may be supplied lazily, for cyclic grammars.
///
/// Thunks resolve exactly once; the resolved parser is memoized on the cell
/// and clones share it, so every use sees the same node (and the same memo
/// key).
pub struct LazyParser<I: Input + ?Sized> {
    inner: Rc<LazyInner<I>>,
}

struct LazyInner<I: Input + ?Sized> {
    resolved: OnceCell<Parser<I>>,
    thunk: RefCell<Option<Box<dyn FnOnce() -> Parser<I>>>>,
}

impl<I: Input + ?Sized> Clone for LazyParser<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<I: Input + ?Sized> LazyParser<I> {
    /// Wrap an already-built parser.
    #[must_use]
    pub fn eager(parser: Parser<I>) -> Self {
        let inner = LazyInner {
            resolved: OnceCell::new(),
            thunk: RefCell::new(None),
        };
        let _ = inner.resolved.set(parser);
        Self {
            inner: Rc::new(inner),
        }
    }

    /// Defer to `f`, called once at first use.
    #[must_use]
    pub fn thunk(f: impl FnOnce() -> Parser<I> + 'static) -> Self {
        Self {
            inner: Rc::new(LazyInner {
                resolved: OnceCell::new(),
                thunk: RefCell::new(Some(Box::new(f))),
            }),
        }
    }

    /// Resolve the reference, forcing the thunk on first use.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UnboundReference`] when resolution re-enters itself.
    pub fn resolve(&self) -> Result<Parser<I>, GrammarError> {
        if let Some(parser) = self.inner.resolved.get() {
            return Ok(parser.clone());
        }
        let taken = self.inner.thunk.borrow_mut().take();
        let Some(f) = taken else {
            return Err(GrammarError::UnboundReference);
        };
        let parser = f();
        let _ = self.inner.resolved.set(parser.clone());
        Ok(parser)
    }
}

impl<I: Input + ?Sized> From<Parser<I>> for LazyParser<I> {
    fn from(parser: Parser<I>) -> Self {
        Self::eager(parser)
    }
}

impl<I: Input + ?Sized> From<&Parser<I>> for LazyParser<I> {
    fn from(parser: &Parser<I>) -> Self {
        Self::eager(parser.clone())
    }
}

/// Convenience constructor for a lazily-supplied parser reference.
pub fn lazy<I: Input + ?Sized>(f: impl FnOnce() -> Parser<I> + 'static) -> LazyParser<I> {
    LazyParser::thunk(f)
}
