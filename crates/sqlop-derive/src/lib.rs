//! Derive macros for sqlop
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive `Record` and `Field` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqlop::Record;
///
/// #[derive(Record, Default)]
/// struct User {
///     id: i64,
///     #[orm(column = "user_name", omitempty)]
///     name: String,
///     #[orm(skip)]
///     password: String,
///     #[orm(column = "audit")]
///     audit: Audit,          // audit_created_by, audit_note
///     #[orm(column = "meta", notpropagate)]
///     meta: Meta,            // one `meta` column
///     base: Base,            // flattened without a prefix
/// }
/// ```
///
/// # Field attributes
///
/// - `#[orm(column = "name")]` - Column name, or the prefix of a nested record
/// - `#[orm(skip)]` - Leave the field out of every plan
/// - `#[orm(omitempty)]` / `#[orm(omitzero)]` - Elide on write while zero
/// - `#[orm(notpropagate)]` - Keep a nested record as one column
/// - `#[orm(tag = "name,omitempty")]` - Raw tag text
///
/// # Container attributes
///
/// - `#[orm(json)]` - When used as a field of another record, this type is a
///   single JSON column (requires `serde::Serialize` and `Deserialize`)
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
