use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::{DataEnum, DataStruct, DeriveInput, Field, Fields, LitStr, Result, Type};

fn parse_ignored_fields(ast: &DeriveInput) -> Result<Vec<String>> {
    let mut ignored_fields: Vec<String> = vec![];
    for attr in &ast.attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    ignored_fields.extend(
                        s.value()
                            .split(',')
                            .map(|field| field.trim().to_string())
                            .filter(|field| !field.is_empty()),
                    );
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?
        }
    }
    Ok(ignored_fields)
}

pub(crate) fn generate_convertible_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let ignored_fields = parse_ignored_fields(ast)?;

    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "only structs with named fields are supported",
            ))
        }
    };

    let mut stored_idents: Vec<&Ident> = Vec::with_capacity(fields.len());
    let mut stored_names: Vec<String> = Vec::with_capacity(fields.len());
    let mut initializers: Vec<proc_macro2::TokenStream> = Vec::with_capacity(fields.len());

    for field in &fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let name = ident.to_string();
        let ty: &Type = &field.ty;

        if ignored_fields.contains(&name) {
            initializers.push(quote! { #ident: ::core::default::Default::default() });
        } else {
            initializers.push(quote! {
                #ident: ::firestore_odm::common::from_value::<#ty>(
                    doc.get(#name).unwrap_or(&::firestore_odm::common::Value::Null),
                )?
            });
            stored_idents.push(ident);
            stored_names.push(name);
        }
    }

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics ::firestore_odm::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> ::firestore_odm::errors::OdmResult<::firestore_odm::common::Value> {
                let mut doc = ::firestore_odm::collection::Document::new();
                #(doc.insert(#stored_names, ::firestore_odm::common::Convertible::to_value(&self.#stored_idents)?);)*
                Ok(::firestore_odm::common::Value::Map(doc))
            }

            fn from_value(value: &::firestore_odm::common::Value) -> ::firestore_odm::errors::OdmResult<Self::Output> {
                match value {
                    ::firestore_odm::common::Value::Map(doc) => Ok(#name {
                        #(#initializers,)*
                    }),
                    other => Err(::firestore_odm::errors::OdmError::new(
                        &format!(
                            "Expected a map for {} but found {}",
                            stringify!(#name),
                            other.type_name()
                        ),
                        ::firestore_odm::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let mut variants: Vec<&Ident> = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                format!(
                    "variant '{}' carries data, only unit variants can be stored",
                    variant.ident
                ),
            ));
        }
        variants.push(&variant.ident);
    }

    let variant_names: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics ::firestore_odm::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> ::firestore_odm::errors::OdmResult<::firestore_odm::common::Value> {
                let variant = match self {
                    #(#name::#variants => #variant_names,)*
                };
                Ok(::firestore_odm::common::Value::String(variant.to_string()))
            }

            fn from_value(value: &::firestore_odm::common::Value) -> ::firestore_odm::errors::OdmResult<Self::Output> {
                match value {
                    ::firestore_odm::common::Value::String(variant) => match variant.as_str() {
                        #(#variant_names => Ok(#name::#variants),)*
                        unknown => Err(::firestore_odm::errors::OdmError::new(
                            &format!("Unknown {} variant '{}'", stringify!(#name), unknown),
                            ::firestore_odm::errors::ErrorKind::ObjectMappingError,
                        )),
                    },
                    other => Err(::firestore_odm::errors::OdmError::new(
                        &format!(
                            "Expected a string for {} but found {}",
                            stringify!(#name),
                            other.type_name()
                        ),
                        ::firestore_odm::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
