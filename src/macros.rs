//! # Internal Macros
//!
//! This module provides internal macros for reducing boilerplate in foxdbf.
//!
//! ## zerocopy_getters!
//!
//! Generates getter methods for zerocopy struct fields that use little-endian
//! wrapper types (U16, U32). On-disk structs are read-only, so no setters are
//! generated.
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::little_endian::{U16, U32};
//!
//! #[repr(C)]
//! struct Header {
//!     record_count: U32,
//!     header_size: U16,
//! }
//!
//! impl Header {
//!     zerocopy_getters! {
//!         record_count: u32,
//!         header_size: u16,
//!     }
//! }
//!
//! // Generates:
//! // pub fn record_count(&self) -> u32 { self.record_count.get() }
//! // pub fn header_size(&self) -> u16 { self.header_size.get() }
//! ```

/// Generates only getter methods for zerocopy little-endian fields (read-only).
#[macro_export]
macro_rules! zerocopy_getters {
    ($($field:ident : $native_ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $field(&self) -> $native_ty {
                self.$field.get()
            }
        )*
    };
}

/// Generates plain byte getters for `u8` fields of on-disk structs.
#[macro_export]
macro_rules! byte_getters {
    ($($field:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $field(&self) -> u8 {
                self.$field
            }
        )*
    };
}
