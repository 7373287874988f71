use crate::decode_column::ColumnMetadata;
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn encode_column_descriptor(metadata: &ColumnMetadata) -> TokenStream {
    let name = &metadata.name;
    let primary_key = metadata.primary_key;
    let serial = metadata.serial;
    let read_only = metadata.read_only;
    quote! {
        ::tabula::ColumnDescriptor::new(#name)
            .primary_key(#primary_key)
            .serial(#serial)
            .read_only(#read_only)
    }
}
