use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Type};

/// Derive macro for mappable record types.
///
/// Generates a `rowmap::RecordShape` impl: the field layout used to build
/// the mapper's field table, and a `set_field` that writes coerced values
/// by field name.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct Customer {
///     #[column(name = "cust_id")]
///     pub customer_id: i64,
///     pub name: String,
///
///     #[column(skip)]
///     pub cached: bool,
/// }
/// ```
///
/// Field types `i64`, `i32`, `String` and `Timestamp` are mapped. Any other
/// type is still declared, with an unsupported kind, and is never written.
#[proc_macro_derive(Record, attributes(column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let mut descriptor_tokens = Vec::new();
    let mut setter_tokens = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.to_string();
        let field_ty = &field.ty;

        // Parse #[column(...)] attribute.
        let mut tag: Option<String> = None;
        let mut skip = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("column") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    tag = Some(value.value());
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else {
                    return Err(meta.error("unknown column attribute (expected `name` or `skip`)"));
                }
                Ok(())
            })?;
        }

        if skip {
            continue;
        }

        let ty_name = type_ident_name(field_ty).unwrap_or_else(|| quote!(#field_ty).to_string());

        let (kind_expr, setter) = match ty_name.as_str() {
            "i64" => (quote! { ::rowmap::schema::FieldKind::Int64 }, true),
            "i32" => (quote! { ::rowmap::schema::FieldKind::Int32 }, true),
            "String" => (quote! { ::rowmap::schema::FieldKind::Text }, true),
            "Timestamp" => (quote! { ::rowmap::schema::FieldKind::Timestamp }, true),
            other => (quote! { ::rowmap::schema::FieldKind::Unsupported(#other) }, false),
        };

        descriptor_tokens.push(match &tag {
            Some(tag) => quote! {
                ::rowmap::schema::FieldDescriptor::tagged(#field_name_str, #kind_expr, #tag)
            },
            None => quote! {
                ::rowmap::schema::FieldDescriptor::new(#field_name_str, #kind_expr)
            },
        });

        setter_tokens.push(if setter {
            quote! {
                #field_name_str => ::rowmap::schema::FromTypedValue::assign(
                    &mut self.#field_name, __name, __value,
                ),
            }
        } else {
            quote! {
                #field_name_str => Err(::rowmap::error::WriteError::Unassignable(
                    __name.to_string(),
                )),
            }
        });
    }

    let expanded = quote! {
        impl ::rowmap::schema::RecordShape for #name {
            fn shape() -> ::rowmap::schema::Shape {
                fn __fields() -> Vec<::rowmap::schema::FieldDescriptor> {
                    vec![
                        #(#descriptor_tokens),*
                    ]
                }
                ::rowmap::schema::Shape::Record(
                    ::rowmap::schema::RecordType::of::<#name>(#name_str, __fields),
                )
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                __name: &str,
                __value: ::rowmap::value::TypedValue,
            ) -> Result<(), ::rowmap::error::WriteError> {
                match __name {
                    #(#setter_tokens)*
                    _ => Err(::rowmap::error::WriteError::UnknownField(__name.to_string())),
                }
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

/// Extract the last path segment ident name from a type (e.g. `i64`, `String`).
fn type_ident_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
    } else {
        None
    }
}
