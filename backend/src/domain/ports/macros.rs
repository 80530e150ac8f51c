//! `define_port_error!` generates port error enums with snake_case
//! constructors whose fields accept anything convertible into the field type.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
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
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SeatStoreError {
            Offline { message: String } => "seat store offline: {message}",
            Exhausted { remaining: u32 } => "only {remaining} seats left",
            Rejected { message: String, remaining: u32 } => "rejected: {message} ({remaining})",
            Locked => "seat store locked",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(
            SeatStoreError::offline("pool closed").to_string(),
            "seat store offline: pool closed"
        );
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(SeatStoreError::exhausted(3_u32).to_string(), "only 3 seats left");
    }

    #[test]
    fn mixed_and_unit_variants() {
        assert_eq!(
            SeatStoreError::rejected("late", 0_u32).to_string(),
            "rejected: late (0)"
        );
        assert_eq!(SeatStoreError::locked(), SeatStoreError::Locked);
    }
}
