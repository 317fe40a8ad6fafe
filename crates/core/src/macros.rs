// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`]: `Display` impl mapping enum variants to string literals
//! - [`builder!`]: test-only builder over a plain data struct

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// ```ignore
/// crate::simple_display! {
///     JobState {
///         Queued => "queued",
///         Running => "running",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant => $str, )+
                })
            }
        }
    };
}

/// Generate a test-only builder that wraps a fully defaulted `$target`.
///
/// Each field names how its setter takes a value:
/// - `into field: Type = default`: setter takes `impl Into<Type>`
/// - `set field: Type = default`: setter takes `Type` as is
/// - `some field: Type`: the target field is `Option<Type>`, `None` by
///   default; the setter wraps `impl Into<Type>` in `Some`
///
/// Every field of `$target` must be listed.
///
/// ```ignore
/// crate::builder! {
///     JobSnapshotBuilder => JobSnapshot {
///         into id: JobId = "job-1",
///         set retry_count: u32 = 0,
///         some current_step: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! builder {
    (
        $builder:ident => $target:ident {
            $( $mode:ident $field:ident : $ty:ty $(= $default:expr)? ),* $(,)?
        }
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        #[derive(Debug, Clone)]
        pub struct $builder($target);

        #[cfg(any(test, feature = "test-support"))]
        impl Default for $builder {
            fn default() -> Self {
                Self($target {
                    $( $field: $crate::builder!(@default $mode $($default)?), )*
                })
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $( $crate::builder!(@setter $mode $field $ty); )*

            pub fn build(self) -> $target {
                self.0
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            pub fn builder() -> $builder {
                $builder::default()
            }
        }
    };

    (@default into $default:expr) => { ($default).into() };
    (@default set $default:expr) => { $default };
    (@default some) => { None };

    (@setter into $field:ident $ty:ty) => {
        pub fn $field(mut self, value: impl Into<$ty>) -> Self {
            self.0.$field = value.into();
            self
        }
    };
    (@setter set $field:ident $ty:ty) => {
        pub fn $field(mut self, value: $ty) -> Self {
            self.0.$field = value;
            self
        }
    };
    (@setter some $field:ident $ty:ty) => {
        pub fn $field(mut self, value: impl Into<$ty>) -> Self {
            self.0.$field = Some(value.into());
            self
        }
    };
}
