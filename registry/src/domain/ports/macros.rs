//! Helper macro for declaring port error enums with snake_case constructors.
//!
//! Each variant gets a constructor named after it (`Persistence` becomes
//! `persistence(..)`) whose parameters accept anything convertible into the
//! field type, so adapters can write `UserStoreError::persistence("disk full")`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build the `", stringify!($variant), "` variant.")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build the `", stringify!($variant), "` variant.")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( {
                    $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
                } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $( $(#[$field_meta])* $field : $ty ),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Errors used only to exercise the macro.
        pub enum LedgerPortError {
            /// Backing file vanished.
            Missing => "ledger file is missing",
            /// Write failed.
            Write {
                /// Adapter detail.
                message: String,
            } => "ledger write failed: {message}",
            /// Sequence gap detected.
            Gap {
                /// Expected position.
                expected: u64,
                /// Position found.
                found: u64,
            } => "expected position {expected}, found {found}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(LedgerPortError::missing(), LedgerPortError::Missing);
        assert_eq!(LedgerPortError::missing().to_string(), "ledger file is missing");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = LedgerPortError::write("disk full");
        assert_eq!(err.to_string(), "ledger write failed: disk full");
    }

    #[test]
    fn numeric_fields_keep_their_types() {
        let err = LedgerPortError::gap(3_u64, 5_u64);
        assert_eq!(
            err,
            LedgerPortError::Gap {
                expected: 3,
                found: 5
            }
        );
        assert_eq!(err.to_string(), "expected position 3, found 5");
    }
}
