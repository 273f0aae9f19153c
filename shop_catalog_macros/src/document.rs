use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr};

pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match named_fields(&input) {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error().into(),
    };

    // Extract #[document(collection = "...")] from struct-level attributes
    let collection = extract_collection(&input);

    let id_field = match extract_id_field(&fields) {
        Some(ident) => ident,
        None => {
            return syn::Error::new_spanned(
                name,
                "Document derive: no field marked with #[document(id)] and no field named `id`",
            )
            .to_compile_error()
            .into();
        }
    };

    let references = fields.iter().filter_map(|field| {
        let target = reference_target(field)?;
        let ident = field.ident.as_ref()?;
        Some(quote! {
            shop_catalog::ReferenceField::push_references(&self.#ident, #target, &mut refs);
        })
    });

    let expanded = quote! {
        impl shop_catalog::Document for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> &str {
                &self.#id_field
            }

            fn references(&self) -> Vec<shop_catalog::Reference> {
                #[allow(unused_mut)]
                let mut refs = Vec::new();
                #(#references)*
                refs
            }
        }
    };

    TokenStream::from(expanded)
}

fn named_fields(input: &DeriveInput) -> syn::Result<Vec<Field>> {
    if let Data::Struct(data_struct) = &input.data {
        if let Fields::Named(fields) = &data_struct.fields {
            return Ok(fields.named.iter().cloned().collect());
        }
    }
    Err(syn::Error::new_spanned(
        &input.ident,
        "Document derive: only structs with named fields are supported",
    ))
}

fn extract_collection(input: &DeriveInput) -> String {
    for attr in &input.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }

        let mut collection = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
            }
            Ok(())
        });

        if let Some(c) = collection {
            return c;
        }
    }

    // Default: snake_case struct name + "s"
    let name = input.ident.to_string();
    format!("{}s", to_snake_case(&name))
}

fn extract_id_field(fields: &[Field]) -> Option<syn::Ident> {
    for field in fields {
        for attr in &field.attrs {
            if attr.path().is_ident("document") {
                let mut is_id = false;
                let _ = attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("id") {
                        is_id = true;
                    } else if meta.path.is_ident("references") {
                        let _: LitStr = meta.value()?.parse()?;
                    }
                    Ok(())
                });
                if is_id {
                    return field.ident.clone();
                }
            }
        }
    }

    // Default: look for a field named "id"
    fields
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .find(|ident| *ident == "id")
        .cloned()
}

fn reference_target(field: &Field) -> Option<String> {
    for attr in &field.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }

        let mut target = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("references") {
                let value: LitStr = meta.value()?.parse()?;
                target = Some(value.value());
            }
            Ok(())
        });

        if target.is_some() {
            return target;
        }
    }
    None
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
