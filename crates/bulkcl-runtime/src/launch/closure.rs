use variadics_please::all_tuples;

use crate::device::KernelFootprint;

/// A function with its arguments, invoked once by every unit of every launched group.
pub trait Closure<G>: Clone + Send + Sync + 'static {
    /// Run the closure for the calling unit.
    fn invoke(&self, group: &G);

    /// Resources used by the closure, when known.
    fn footprint(&self) -> Option<KernelFootprint> {
        None
    }
}

/// A function bound to a tuple of arguments.
///
/// Every unit receives its own clone of the arguments.
#[derive(Clone, Debug)]
pub struct BoundClosure<F, Args> {
    function: F,
    arguments: Args,
    footprint: Option<KernelFootprint>,
}

/// Bind a function to a tuple of up to five arguments.
///
/// The function receives the group first, followed by the arguments in order.
pub fn make_closure<F, Args>(function: F, arguments: Args) -> BoundClosure<F, Args> {
    BoundClosure {
        function,
        arguments,
        footprint: None,
    }
}

impl<F, Args> BoundClosure<F, Args> {
    /// Declare the resources used by the function.
    pub fn with_footprint(mut self, footprint: KernelFootprint) -> Self {
        self.footprint = Some(footprint);
        self
    }

    /// The bound arguments.
    pub fn arguments(&self) -> &Args {
        &self.arguments
    }
}

macro_rules! impl_closure {
    ($(#[$meta:meta])* $($params:ident),*) => {
        $(#[$meta])*
        impl<G, F, $($params,)*> Closure<G> for BoundClosure<F, ($($params,)*)>
        where
            F: Fn(&G, $($params),*) + Clone + Send + Sync + 'static,
            $($params: Clone + Send + Sync + 'static,)*
        {
            #[allow(non_snake_case, clippy::unused_unit)]
            fn invoke(&self, group: &G) {
                let ($($params,)*) = self.arguments.clone();
                (self.function)(group, $($params),*)
            }

            fn footprint(&self) -> Option<KernelFootprint> {
                self.footprint
            }
        }
    };
}

all_tuples!(impl_closure, 0, 5, A);

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn arguments_are_passed_in_order() {
        let seen = Arc::new(AtomicUsize::new(0));
        let closure = make_closure(
            |group: &usize, a: usize, b: usize, seen: Arc<AtomicUsize>| {
                seen.store(group * 100 + a * 10 + b, Ordering::Relaxed);
            },
            (2usize, 3usize, seen.clone()),
        );

        closure.invoke(&1usize);

        assert_eq!(seen.load(Ordering::Relaxed), 123);
        assert_eq!(closure.footprint(), None);
    }

    #[test]
    fn closures_without_arguments_are_supported() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let closure = make_closure(
            move |group: &usize| {
                counter.fetch_add(*group, Ordering::Relaxed);
            },
            (),
        )
        .with_footprint(KernelFootprint::new(64, 128));

        closure.invoke(&4usize);
        closure.clone().invoke(&4usize);

        assert_eq!(seen.load(Ordering::Relaxed), 8);
        assert_eq!(closure.footprint(), Some(KernelFootprint::new(64, 128)));
    }
}
