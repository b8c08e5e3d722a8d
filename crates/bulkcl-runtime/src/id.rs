macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord)]
        pub struct $name {
            value: usize,
        }

        impl $name {
            /// Create a new unique ID.
            pub fn new() -> Self {
                use core::sync::atomic::{AtomicUsize, Ordering};

                static COUNTER: AtomicUsize = AtomicUsize::new(0);

                let value = COUNTER.fetch_add(1, Ordering::Relaxed);
                if value == usize::MAX {
                    core::panic!("{} overflowed", core::stringify!($name));
                }
                Self { value }
            }

            /// The raw value of the ID.
            pub fn value(&self) -> usize {
                self.value
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_fmt(format_args!("{}({})", core::stringify!($name), self.value))
            }
        }
    };
}

id_type!(
    /// Identifies a byte arena, either a group's on-chip memory or an off-chip buffer.
    StorageId
);

id_type!(
    /// Identifies an allocation made by an execution group.
    AllocationId
);
