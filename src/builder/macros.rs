//! Macros for ergonomic action declaration.

/// Generate an action enum and its `Action` trait implementation.
///
/// Variants may be unit or tuple variants; each reports its own name.
///
/// # Example
///
/// ```
/// use rewind::action_enum;
/// use rewind::core::Action;
///
/// action_enum! {
///     pub enum CounterAction {
///         Increment,
///         Decrement,
///         Add(i64),
///     }
/// }
///
/// assert_eq!(CounterAction::Add(2).name(), "Add");
/// ```
#[macro_export]
macro_rules! action_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(( $($field:ty),* $(,)? ))?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $(( $($field),* ))?
            ),*
        }

        impl $crate::core::Action for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant { .. } => stringify!($variant)),*
                }
            }
        }
    };
}
