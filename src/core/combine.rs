//! Combinable listener results.
//!
//! A dispatch folds the results of every listener into one value, starting from
//! [`Combine::identity`]. With zero listeners the identity is the answer, which
//! is why dispatch results need an identity rather than just any type.

/// An associative combine operation with an identity element
pub trait Combine: Sized {
    fn identity() -> Self;
    fn combine(self, other: Self) -> Self;

    /// Left fold from the identity.
    fn concat<I: IntoIterator<Item = Self>>(items: I) -> Self {
        items
            .into_iter()
            .fold(Self::identity(), Self::combine)
    }
}

impl Combine for () {
    fn identity() -> Self {}
    fn combine(self, _other: Self) -> Self {}
}

impl Combine for String {
    fn identity() -> Self {
        String::new()
    }

    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<T> Combine for Vec<T> {
    fn identity() -> Self {
        Vec::new()
    }

    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

/// `None` is the identity; two `Some`s combine their contents.
impl<T: Combine> Combine for Option<T> {
    fn identity() -> Self {
        None
    }

    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Some(a), Some(b)) => Some(a.combine(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

impl<A: Combine, B: Combine> Combine for (A, B) {
    fn identity() -> Self {
        (A::identity(), B::identity())
    }

    fn combine(self, other: Self) -> Self {
        (self.0.combine(other.0), self.1.combine(other.1))
    }
}

/// True if any listener answered true
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnyTrue(pub bool);

impl Combine for AnyTrue {
    fn identity() -> Self {
        AnyTrue(false)
    }

    fn combine(self, other: Self) -> Self {
        AnyTrue(self.0 || other.0)
    }
}

/// True unless some listener answered false
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllTrue(pub bool);

impl Default for AllTrue {
    fn default() -> Self {
        AllTrue(true)
    }
}

impl Combine for AllTrue {
    fn identity() -> Self {
        AllTrue(true)
    }

    fn combine(self, other: Self) -> Self {
        AllTrue(self.0 && other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sum(pub i64);

impl Combine for Sum {
    fn identity() -> Self {
        Sum(0)
    }

    fn combine(self, other: Self) -> Self {
        Sum(self.0.saturating_add(other.0))
    }
}

/// Keeps the earliest answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct First<T>(pub Option<T>);

impl<T> Combine for First<T> {
    fn identity() -> Self {
        First(None)
    }

    fn combine(self, other: Self) -> Self {
        if self.0.is_some() { self } else { other }
    }
}

/// Keeps the latest answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Last<T>(pub Option<T>);

impl<T> Combine for Last<T> {
    fn identity() -> Self {
        Last(None)
    }

    fn combine(self, other: Self) -> Self {
        if other.0.is_some() { other } else { self }
    }
}
