use proc_macro2::TokenStream;
use proc_macro_error2::abort;
use quote::quote;
use syn::{DataStruct, DeriveInput, Fields, Ident, LitInt};

struct FieldSpec {
    ident: Ident,
    tag: u32,
}

pub fn derive_wire_struct(input: DeriveInput) -> TokenStream {
    let ident = input.ident.clone();

    let data = match &input.data {
        syn::Data::Struct(s) => s,
        _ => abort!(input.ident, "WireStruct can only be derived for structs"),
    };

    let fields = extract_fields(data);

    let encode_stmts = fields.iter().map(|f| {
        let field_ident = &f.ident;
        let tag = f.tag;
        quote! {
            hashgraph_common::wire::WireScalar::write_field(&self.#field_ident, #tag, w);
        }
    });

    let decode_arms = fields.iter().map(|f| {
        let field_ident = &f.ident;
        let tag = f.tag;
        quote! {
            #tag => hashgraph_common::wire::WireScalar::merge_field(&mut value.#field_ident, wire_type, r)?,
        }
    });

    quote! {
        impl hashgraph_common::wire::WireCodec for #ident {
            fn encode(&self, w: &mut hashgraph_common::wire::WireWriter) {
                #(#encode_stmts)*
            }

            fn decode(r: &mut hashgraph_common::wire::WireReader<'_>) -> Result<Self, hashgraph_common::DecodeError> {
                let mut value = Self::default();
                while let Some((field_number, wire_type)) = r.read_tag()? {
                    match field_number {
                        #(#decode_arms)*
                        _ => r.skip_field(wire_type)?,
                    }
                }
                Ok(value)
            }
        }
    }
}

fn extract_fields(data: &DataStruct) -> Vec<FieldSpec> {
    let named = match &data.fields {
        Fields::Named(named) => named,
        _ => abort!(
            proc_macro2::Span::call_site(),
            "WireStruct requires a struct with named fields"
        ),
    };

    named
        .named
        .iter()
        .map(|field| {
            let ident = field.ident.clone().expect("named field");
            let mut tag = None;

            for attr in &field.attrs {
                if !attr.path().is_ident("wire") {
                    continue;
                }
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("tag") {
                        let lit: LitInt = meta.value()?.parse()?;
                        tag = Some(lit.base10_parse::<u32>()?);
                        Ok(())
                    } else {
                        Err(meta.error("unsupported `wire` attribute, expected `tag = N`"))
                    }
                })
                .unwrap_or_else(|err| abort!(attr, "invalid `wire` attribute: {}", err));
            }

            let tag =
                tag.unwrap_or_else(|| abort!(ident, "field is missing a `#[wire(tag = N)]`"));

            FieldSpec { ident, tag }
        })
        .collect()
}
