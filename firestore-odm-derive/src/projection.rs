use crate::fields::{field_specs, parse_model_fields, reject_generics, schema_impl};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Result};

pub(crate) fn generate_projection_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    reject_generics(ast)?;
    if let Some(attr) = ast.attrs.iter().find(|attr| attr.path().is_ident("model")) {
        return Err(syn::Error::new_spanned(
            attr,
            "a projection takes its collection from the model it is read from",
        ));
    }

    let name = &ast.ident;
    let fields = parse_model_fields(data)?;
    let specs = field_specs(&fields);
    let spec_count = specs.len();
    let schema = schema_impl(name, &fields);

    let gen = quote! {
        const _: () = {
            static FIELD_SPECS: [::firestore_odm::model::FieldSpec; #spec_count] = [#(#specs),*];

            #schema
        };
    };

    Ok(TokenStream::from(gen))
}
