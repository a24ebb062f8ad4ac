//! Derive macro registering record fields for dal.
//!
//! This crate provides `#[derive(Record)]`, which implements
//! `dal_core::Record` for a struct with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::ParseStream;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Visibility};

/// Name of the field carrying the table name.
const TABLE_FIELD: &str = "dal_table";

/// Derives `dal_core::Record` for a struct.
///
/// # Field Attributes
///
/// - `#[dal("column,flag,...")]` - Column name and flags. An empty column
///   name keeps the field name; `-` leaves the field unmapped. Flags are
///   `auto` and `omitempty`.
/// - `#[dal(embed)]` - The field is itself a `Record` whose fields are
///   mapped in place.
///
/// Only `pub` fields are mapped. A field named `dal_table` of type
/// `dal_core::Table` names the table through its tag and may be private.
///
/// Mapped column fields must implement `dal_core::Scan` and
/// `dal_core::ToSqlValue`.
#[proc_macro_derive(Record, attributes(dal))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let record_name = struct_name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut field_infos: Vec<FieldInfo> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let attrs = parse_dal_attrs(&field.attrs)?;
        if attrs.embed && attrs.tag.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "an embedded record cannot carry a column tag",
            ));
        }

        field_infos.push(FieldInfo {
            name: ident.to_string(),
            ident,
            ty: field.ty.clone(),
            tag: attrs.tag,
            embed: attrs.embed,
            public: matches!(field.vis, Visibility::Public(_)),
        });
    }

    let field_defs: Vec<TokenStream2> = field_infos
        .iter()
        .map(|info| {
            let name = &info.name;
            let public = info.public;
            let tag = match &info.tag {
                Some(tag) => quote! { ::core::option::Option::Some(#tag) },
                None => quote! { ::core::option::Option::None },
            };
            let kind = if info.embed {
                let ty = &info.ty;
                quote! {
                    ::dal_core::FieldKind::Embedded(<#ty as ::dal_core::Record>::fields)
                }
            } else {
                quote! { ::dal_core::FieldKind::Column }
            };

            quote! {
                ::dal_core::FieldDef {
                    name: #name,
                    tag: #tag,
                    public: #public,
                    kind: #kind,
                }
            }
        })
        .collect();

    let mapped: Vec<&FieldInfo> = field_infos.iter().filter(|f| f.is_mapped()).collect();

    let push_targets: Vec<TokenStream2> = mapped
        .iter()
        .map(|info| {
            let ident = &info.ident;
            if info.embed {
                quote! { targets.extend(::dal_core::Record::targets(&mut self.#ident)); }
            } else {
                quote! { targets.push(&mut self.#ident); }
            }
        })
        .collect();

    let push_values: Vec<TokenStream2> = mapped
        .iter()
        .map(|info| {
            let ident = &info.ident;
            if info.embed {
                quote! { values.extend(::dal_core::Record::values(&self.#ident)); }
            } else {
                quote! { values.push(::dal_core::ToSqlValue::to_sql_value(&self.#ident)); }
            }
        })
        .collect();

    let expanded = quote! {
        impl ::dal_core::Record for #struct_name {
            const NAME: &'static str = #record_name;

            fn fields() -> &'static [::dal_core::FieldDef] {
                const FIELDS: &[::dal_core::FieldDef] = &[
                    #(#field_defs),*
                ];
                FIELDS
            }

            #[allow(unused_mut)]
            fn targets(&mut self) -> ::std::vec::Vec<&mut dyn ::dal_core::Scan> {
                let mut targets: ::std::vec::Vec<&mut dyn ::dal_core::Scan> =
                    ::std::vec::Vec::new();
                #(#push_targets)*
                targets
            }

            #[allow(unused_mut)]
            fn values(&self) -> ::std::vec::Vec<::dal_core::SqlValue> {
                let mut values: ::std::vec::Vec<::dal_core::SqlValue> = ::std::vec::Vec::new();
                #(#push_values)*
                values
            }
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    ident: Ident,
    name: String,
    ty: syn::Type,
    tag: Option<String>,
    embed: bool,
    public: bool,
}

impl FieldInfo {
    /// Mirrors `dal_core::FieldDef::is_mapped`.
    fn is_mapped(&self) -> bool {
        self.public
            && self.name != TABLE_FIELD
            && !self
                .tag
                .as_deref()
                .is_some_and(|tag| tag.split(',').next() == Some("-"))
    }
}

#[derive(Default)]
struct DalAttrs {
    tag: Option<String>,
    embed: bool,
}

fn parse_dal_attrs(attrs: &[Attribute]) -> syn::Result<DalAttrs> {
    let mut result = DalAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("dal") {
            continue;
        }

        attr.parse_args_with(|input: ParseStream| {
            if input.peek(LitStr) {
                let tag: LitStr = input.parse()?;
                if result.tag.is_some() {
                    return Err(syn::Error::new_spanned(&tag, "duplicate dal tag"));
                }
                result.tag = Some(tag.value());
            } else {
                let ident: Ident = input.parse()?;
                if ident != "embed" {
                    return Err(syn::Error::new_spanned(
                        &ident,
                        "expected a tag string or `embed`",
                    ));
                }
                result.embed = true;
            }
            Ok(())
        })?;
    }

    Ok(result)
}
