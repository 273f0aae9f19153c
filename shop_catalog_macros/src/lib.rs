mod document;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Document)]
// ============================================================================

/// Derive macro that implements `shop_catalog::Document` for a struct.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(collection = "items")]
/// pub struct Item {
///     pub id: String,
///     pub title: String,
///     #[document(references = "categories")]
///     pub category: String,
/// }
/// ```
///
/// The macro supports:
/// - `#[document(collection = "...")]` on the struct (default: snake_case name + "s")
/// - `#[document(id)]` on a field to pick the id field (default: the field named `id`)
/// - `#[document(references = "...")]` on `String` or `Option<String>` fields that
///   point at a document in another collection
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
