//! Right-to-left function composition.
//!
//! `compose([f, g, h])(x)` is `f(g(h(x)))`. The middleware chain is built
//! with it: each middleware wraps the dispatch produced by the ones to its
//! right.
//!
//! # Example
//!
//! ```
//! use statecell_core::compose::compose;
//!
//! let square = |x: i64| x * x;
//! let double = |x: i64| x * 2;
//!
//! let composed = compose::<i64>(vec![Box::new(square), Box::new(double)]);
//! assert_eq!(composed(5), 100);
//! ```

/// A boxed unary function, the unit [`compose`] works on
pub type Composable<'a, T> = Box<dyn Fn(T) -> T + 'a>;

/// The identity function.
#[must_use]
pub const fn identity<T>(value: T) -> T {
    value
}

/// Compose unary functions right to left.
///
/// - no functions: the identity function
/// - one function: that function, unchanged
/// - several: `f1(f2(...fn(x)))`
#[must_use]
pub fn compose<'a, T: 'a>(functions: Vec<Composable<'a, T>>) -> Composable<'a, T> {
    let mut rightmost_first = functions.into_iter().rev();

    let Some(innermost) = rightmost_first.next() else {
        return Box::new(identity);
    };

    rightmost_first.fold(innermost, |inner, outer| -> Composable<'a, T> {
        Box::new(move |value: T| outer(inner(value)))
    })
}

/// Compose functions of heterogeneous types right to left.
///
/// `compose!(f, g, h)` expands to a closure equivalent to `|x| f(g(h(x)))`.
/// The rightmost function may take several arguments by accepting a tuple.
///
/// ```
/// use statecell_core::compose;
///
/// let to_string = |x: i64| x.to_string();
/// let sum = |(a, b): (i64, i64)| a + b;
///
/// let describe = compose!(to_string, sum);
/// assert_eq!(describe((2, 3)), "5");
///
/// let same = compose!();
/// assert_eq!(same(5), 5);
/// ```
#[macro_export]
macro_rules! compose {
    () => {
        $crate::compose::identity
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {{
        let outer = $f;
        let inner = $crate::compose!($($rest),+);
        move |value| outer(inner(value))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn square(x: i64) -> i64 {
        x * x
    }

    fn double(x: i64) -> i64 {
        x * 2
    }

    #[test]
    fn test_compose_nothing_is_identity() {
        let composed = compose::<i64>(vec![]);
        assert_eq!(composed(5), 5);
    }

    #[test]
    fn test_compose_single_returns_function() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let composed = compose::<i64>(vec![Box::new(move |x: i64| {
            counter.fetch_add(1, Ordering::SeqCst);
            x + 1
        })]);

        assert_eq!(composed(1), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_compose_applies_right_to_left() {
        let composed = compose::<i64>(vec![Box::new(square), Box::new(double)]);
        assert_eq!(composed(5), square(double(5)));

        let reversed = compose::<i64>(vec![Box::new(double), Box::new(square)]);
        assert_eq!(reversed(5), double(square(5)));
    }

    #[test]
    fn test_compose_preserves_order_of_many() {
        let push = |tag: &'static str| -> Composable<'static, Vec<&'static str>> {
            Box::new(move |mut seen: Vec<&'static str>| {
                seen.push(tag);
                seen
            })
        };

        let composed = compose(vec![push("a"), push("b"), push("c")]);
        assert_eq!(composed(Vec::new()), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_compose_macro() {
        let composed = compose!(square, double);
        assert_eq!(composed(5), 100);

        let single = compose!(double);
        assert_eq!(single(4), 8);

        let id = compose!();
        assert_eq!(id("x"), "x");

        let mixed = compose!(|s: String| s.len(), |x: i64| x.to_string(), square);
        assert_eq!(mixed(12), 3);
    }

    proptest! {
        #[test]
        fn prop_compose_matches_nested_calls(x in -1000i64..1000) {
            let composed = compose::<i64>(vec![Box::new(square), Box::new(double), Box::new(|v: i64| v + 3)]);
            prop_assert_eq!(composed(x), square(double(x + 3)));
        }
    }
}
