use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DataStruct, Field, Fields, LitStr, Result, Type};

/// What a struct field is to the mapper.
pub(crate) enum FieldRole {
    Id,
    Meta,
    Skip,
    Stored {
        alias: Option<String>,
        has_default: bool,
    },
}

pub(crate) struct ModelField {
    pub ident: Ident,
    pub ty: Type,
    pub role: FieldRole,
}

impl ModelField {
    pub fn is_stored(&self) -> bool {
        matches!(self.role, FieldRole::Stored { .. })
    }
}

#[derive(Default)]
struct FieldAttrs {
    id: bool,
    meta: bool,
    skip: bool,
    default: bool,
    rename: Option<String>,
}

fn parse_field_attrs(field: &Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if attr.path().is_ident("model") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    attrs.id = true;
                    Ok(())
                } else if meta.path.is_ident("meta") {
                    attrs.meta = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else if meta.path.is_ident("default") {
                    attrs.default = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    if s.value().is_empty() {
                        return Err(meta.error("rename must not be empty"));
                    }
                    attrs.rename = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("Unknown model field attribute"))
                }
            })?;
        }
    }

    let roles = [attrs.id, attrs.meta, attrs.skip]
        .iter()
        .filter(|flag| **flag)
        .count();
    if roles > 1 {
        return Err(syn::Error::new_spanned(
            field,
            "a field can only be one of id, meta or skip",
        ));
    }
    if roles == 1 && (attrs.default || attrs.rename.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "rename and default only apply to stored fields",
        ));
    }
    Ok(attrs)
}

/// Classifies the named fields of a struct.
///
/// Without explicit markers a field named `id` is the identifier and a field named
/// `meta` holds the document metadata.
pub(crate) fn parse_model_fields(data: &DataStruct) -> Result<Vec<ModelField>> {
    let named = match &data.fields {
        Fields::Named(fields) => &fields.named,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "only structs with named fields are supported",
            ))
        }
    };

    let mut parsed = Vec::with_capacity(named.len());
    for field in named {
        parsed.push((field, parse_field_attrs(field)?));
    }

    let explicit_ids = parsed.iter().filter(|(_, attrs)| attrs.id).count();
    let explicit_metas = parsed.iter().filter(|(_, attrs)| attrs.meta).count();
    if explicit_ids > 1 {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "only one field can be marked #[model(id)]",
        ));
    }
    if explicit_metas > 1 {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "only one field can be marked #[model(meta)]",
        ));
    }

    let mut fields = Vec::with_capacity(parsed.len());
    for (field, attrs) in parsed {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let unmarked = !attrs.id && !attrs.meta && !attrs.skip && attrs.rename.is_none() && !attrs.default;

        let role = if attrs.id || (explicit_ids == 0 && unmarked && ident == "id") {
            FieldRole::Id
        } else if attrs.meta || (explicit_metas == 0 && unmarked && ident == "meta") {
            FieldRole::Meta
        } else if attrs.skip {
            FieldRole::Skip
        } else {
            FieldRole::Stored {
                alias: attrs.rename,
                has_default: attrs.default,
            }
        };

        fields.push(ModelField {
            ident,
            ty: field.ty.clone(),
            role,
        });
    }
    Ok(fields)
}

/// `FieldSpec` constructors of the stored fields, in declaration order.
pub(crate) fn field_specs(fields: &[ModelField]) -> Vec<TokenStream> {
    fields
        .iter()
        .filter_map(|field| match &field.role {
            FieldRole::Stored { alias, has_default } => {
                let name = field.ident.to_string();
                let mut spec = quote! { ::firestore_odm::model::FieldSpec::new(#name) };
                if let Some(alias) = alias {
                    spec = quote! { #spec.with_alias(#alias) };
                }
                if *has_default {
                    spec = quote! { #spec.with_default() };
                }
                Some(spec)
            }
            _ => None,
        })
        .collect()
}

/// The `Schema` implementation over a static `FIELD_SPECS` array in scope.
pub(crate) fn schema_impl(name: &Ident, fields: &[ModelField]) -> TokenStream {
    let mut writes = Vec::new();
    let mut initializers = Vec::with_capacity(fields.len());
    let mut index = 0usize;

    for field in fields {
        let ident = &field.ident;
        let ty = &field.ty;
        match &field.role {
            FieldRole::Stored { has_default, .. } => {
                let default = if *has_default {
                    quote! {
                        Some(&::firestore_odm::common::Convertible::to_value(
                            &<#ty as ::core::default::Default>::default(),
                        )?)
                    }
                } else {
                    quote! { None }
                };
                writes.push(quote! {
                    options.write_field(
                        &mut document,
                        &FIELD_SPECS[#index],
                        ::firestore_odm::common::Convertible::to_value(&self.#ident)?,
                        #default,
                    );
                });
                let reader = if *has_default {
                    quote! { ::firestore_odm::model::read_or_default::<#ty> }
                } else {
                    quote! { ::firestore_odm::model::read_required::<#ty> }
                };
                initializers.push(quote! { #ident: #reader(document, &FIELD_SPECS[#index])? });
                index += 1;
            }
            FieldRole::Id => {
                initializers.push(quote! { #ident: ::core::option::Option::None });
            }
            FieldRole::Meta | FieldRole::Skip => {
                initializers.push(quote! { #ident: ::core::default::Default::default() });
            }
        }
    }

    let id_hooks = fields
        .iter()
        .find(|field| matches!(field.role, FieldRole::Id))
        .map(|field| {
            let ident = &field.ident;
            quote! {
                fn id(&self) -> ::core::option::Option<&str> {
                    self.#ident.as_deref()
                }

                fn set_id(&mut self, id: ::std::string::String) {
                    self.#ident = ::core::option::Option::Some(id);
                }
            }
        });

    let meta_hooks = fields
        .iter()
        .find(|field| matches!(field.role, FieldRole::Meta))
        .map(|field| {
            let ident = &field.ident;
            quote! {
                fn meta(&self) -> ::core::option::Option<&::firestore_odm::model::DocumentMeta> {
                    ::core::option::Option::Some(&self.#ident)
                }

                fn meta_mut(&mut self) -> ::core::option::Option<&mut ::firestore_odm::model::DocumentMeta> {
                    ::core::option::Option::Some(&mut self.#ident)
                }
            }
        });

    quote! {
        impl ::firestore_odm::model::Schema for #name {
            fn fields() -> &'static [::firestore_odm::model::FieldSpec] {
                &FIELD_SPECS
            }

            fn to_document(
                &self,
                options: &::firestore_odm::model::SerializeOptions,
            ) -> ::firestore_odm::errors::OdmResult<::firestore_odm::collection::Document> {
                let mut document = ::firestore_odm::collection::Document::new();
                #(#writes)*
                Ok(document)
            }

            fn from_document(
                document: &::firestore_odm::collection::Document,
            ) -> ::firestore_odm::errors::OdmResult<Self> {
                Ok(#name {
                    #(#initializers,)*
                })
            }

            #id_hooks

            #meta_hooks
        }
    }
}

pub(crate) fn reject_generics(ast: &syn::DeriveInput) -> Result<()> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "generic types are not supported",
        ));
    }
    Ok(())
}
