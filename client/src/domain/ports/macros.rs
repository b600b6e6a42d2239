//! `define_port_error!`, the shared shape of adapter error enums.
//!
//! For every variant the macro emits a snake-case constructor whose field
//! parameters take `impl Into<T>`, plus an `is_<variant>()` predicate so
//! services can branch on a failure without naming the enum's fields. The
//! enum also gets `kind()`, the snake-case variant name logged as the `kind`
//! field.

macro_rules! define_port_error {
    (@items $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct a [`Self::" $variant "`] failure."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
        define_port_error!(@is $variant);
    };

    (@items $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor $variant [] [] $( $field : $ty, )*);
        define_port_error!(@is $variant);
    };

    (@is $variant:ident) => {
        ::paste::paste! {
            #[doc = "Whether this is a [`Self::" $variant "`] failure."]
            pub const fn [<is_ $variant:snake>](&self) -> bool {
                matches!(self, Self::$variant { .. })
            }
        }
    };

    (@ctor $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[doc = "Construct a [`Self::" $variant "`] failure."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@items $variant $( { $($field : $ty),* } )?);
            )*

            /// Snake-case variant name, for the `kind` log field.
            pub const fn kind(&self) -> &'static str {
                ::paste::paste! {
                    match self {
                        $( Self::$variant { .. } => stringify!([<$variant:snake>]), )*
                    }
                }
            }
        }
    };
}

pub(crate) use define_port_error;
