//! `define_port_error!` declares a port error enum and its constructors.
//!
//! Every variant carries named fields. Each gets a snake_case constructor
//! whose parameters accept anything convertible into the field type, so
//! adapters can write `SeedLedgerRepositoryError::query(err.to_string())`
//! or pass a `&str` directly.

macro_rules! define_port_error {
    (
        $(#[$enum_attr:meta])*
        pub enum $error:ident {
            $(
                $(#[$case_attr:meta])*
                $case:ident { $($name:ident : $kind:ty),* $(,)? } => $display:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_attr])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $error {
            $(
                $(#[$case_attr])*
                #[error($display)]
                $case { $($name: $kind),* },
            )+
        }

        ::paste::paste! {
            #[allow(dead_code, reason = "not every adapter builds every variant")]
            impl $error {
                $(
                    #[doc = "Construct this variant, converting each field."]
                    pub fn [<$case:snake>]($($name: impl Into<$kind>),*) -> Self {
                        Self::$case { $($name: $name.into()),* }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;
