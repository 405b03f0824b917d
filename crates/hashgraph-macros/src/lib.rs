use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{parse_macro_input, DeriveInput};

mod derive_wire_struct;

/// Derives `hashgraph_common::wire::WireCodec` for a struct whose fields are
/// all wire scalars (no nested messages, no repeated fields). Each field
/// needs a `#[wire(tag = N)]` attribute naming its field number; the struct
/// must also derive `Default`, since decoding builds up a value field by
/// field starting from the default.
#[proc_macro_derive(WireStruct, attributes(wire))]
#[proc_macro_error]
pub fn wire_struct(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_wire_struct::derive_wire_struct(input).into()
}
