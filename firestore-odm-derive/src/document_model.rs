use crate::fields::{field_specs, parse_model_fields, reject_generics, schema_impl, FieldRole};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{DataStruct, DeriveInput, LitStr, Path, Result};

pub(crate) fn generate_model_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    reject_generics(ast)?;

    let name = &ast.ident;
    let vis = &ast.vis;
    let mut collection_name = name.to_string();
    let mut parent: Option<Path> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("model") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    let collection = s.value();
                    if collection.is_empty() || collection.contains('/') {
                        return Err(meta.error(format!(
                            "'{}' is not a valid collection name",
                            collection
                        )));
                    }
                    collection_name = collection;
                    Ok(())
                } else if meta.path.is_ident("parent") {
                    let value = meta.value()?;
                    parent = Some(value.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("Unknown model attribute"))
                }
            })?
        }
    }

    let fields = parse_model_fields(data)?;
    if !fields.iter().any(|field| matches!(field.role, FieldRole::Id)) {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "a document model needs an `id: Option<String>` field or a field marked #[model(id)]",
        ));
    }

    let model_name = name.to_string();
    let specs = field_specs(&fields);
    let spec_count = specs.len();
    let parent_descriptor = match &parent {
        Some(parent) => quote! {
            ::core::option::Option::Some(<#parent as ::firestore_odm::model::DocumentModel>::descriptor)
        },
        None => quote! { ::core::option::Option::None },
    };

    let fields_ty = format_ident!("{}Fields", name);
    let handle_idents: Vec<_> = fields
        .iter()
        .filter(|field| field.is_stored() || matches!(field.role, FieldRole::Id))
        .map(|field| &field.ident)
        .collect();
    let handle_values: Vec<_> = fields
        .iter()
        .filter_map(|field| match &field.role {
            FieldRole::Id => Some(quote! { ::firestore_odm::filter::FieldRef::document_id() }),
            FieldRole::Stored { alias, .. } => {
                let wire = alias.clone().unwrap_or_else(|| field.ident.to_string());
                Some(quote! { ::firestore_odm::filter::FieldRef::new(#wire) })
            }
            _ => None,
        })
        .collect();
    let fields_doc = format!("Query handles for the fields of [`{}`].", name);

    let schema = schema_impl(name, &fields);

    let gen = quote! {
        #[doc = #fields_doc]
        #[derive(Debug, Clone)]
        #vis struct #fields_ty {
            #(pub #handle_idents: ::firestore_odm::filter::FieldRef,)*
        }

        impl #name {
            #[doc = #fields_doc]
            #vis const FIELDS: #fields_ty = #fields_ty {
                #(#handle_idents: #handle_values,)*
            };
        }

        const _: () = {
            static FIELD_SPECS: [::firestore_odm::model::FieldSpec; #spec_count] = [#(#specs),*];

            static DESCRIPTOR: ::firestore_odm::model::ModelDescriptor =
                ::firestore_odm::model::ModelDescriptor::new(
                    #model_name,
                    #collection_name,
                    #parent_descriptor,
                    &FIELD_SPECS,
                );

            #schema

            impl ::firestore_odm::model::DocumentModel for #name {
                fn descriptor() -> &'static ::firestore_odm::model::ModelDescriptor {
                    &DESCRIPTOR
                }
            }
        };
    };

    Ok(TokenStream::from(gen))
}
