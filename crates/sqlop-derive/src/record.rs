//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

use crate::attrs::{FieldAttr, is_json};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    // the field table is a `const` shared by every instantiation
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let json = is_json(&input.attrs)?;

    let mut defs = Vec::new();
    let mut idents = Vec::new();
    for field in fields {
        let attr = FieldAttr::from_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let field_name = ident.to_string();
        let tag = match attr.tag() {
            Some(tag) => quote! { ::core::option::Option::Some(#tag) },
            None => quote! { ::core::option::Option::None },
        };
        defs.push(quote! {
            ::sqlop::FieldDef {
                name: #field_name,
                tag: #tag,
                shape: <#ty as ::sqlop::Field>::shape,
            }
        });
        idents.push(ident.clone());
    }
    let indexes: Vec<usize> = (0..idents.len()).collect();
    let type_name = name.to_string();

    let record_impl = quote! {
        impl ::sqlop::Record for #name {
            fn fields() -> &'static [::sqlop::FieldDef] {
                const FIELDS: &[::sqlop::FieldDef] = &[#(#defs),*];
                FIELDS
            }

            fn field_defs(&self) -> &'static [::sqlop::FieldDef] {
                <Self as ::sqlop::Record>::fields()
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::sqlop::Field> {
                match index {
                    #(#indexes => ::core::option::Option::Some(&self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn ::sqlop::Field> {
                match index {
                    #(#indexes => ::core::option::Option::Some(&mut self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    let is_zero = quote! {
        fn is_zero(&self) -> bool {
            true #(&& ::sqlop::Field::is_zero(&self.#idents))*
        }
    };

    let field_impl = if json {
        quote! {
            impl ::sqlop::Field for #name {
                fn to_value(&self) -> ::sqlop::SqlResult<::sqlop::Value> {
                    ::sqlop::__private::json_value(self)
                }

                fn assign(&mut self, value: ::sqlop::Value) -> ::sqlop::SqlResult<()> {
                    *self = ::sqlop::__private::json_assign(value)?;
                    ::core::result::Result::Ok(())
                }

                #is_zero
            }
        }
    } else {
        quote! {
            impl ::sqlop::Field for #name {
                fn shape() -> ::sqlop::Shape {
                    ::sqlop::Shape::Record(<Self as ::sqlop::Record>::fields)
                }

                fn to_value(&self) -> ::sqlop::SqlResult<::sqlop::Value> {
                    ::core::result::Result::Err(::sqlop::__private::not_a_value(#type_name))
                }

                fn assign(&mut self, _value: ::sqlop::Value) -> ::sqlop::SqlResult<()> {
                    ::core::result::Result::Err(::sqlop::__private::not_a_value(#type_name))
                }

                #is_zero

                fn as_record(&self) -> ::core::option::Option<&dyn ::sqlop::Record> {
                    ::core::option::Option::Some(self)
                }

                fn as_record_mut(&mut self) -> ::core::option::Option<&mut dyn ::sqlop::Record> {
                    ::core::option::Option::Some(self)
                }
            }
        }
    };

    Ok(quote! {
        #record_impl
        #field_impl
    })
}
