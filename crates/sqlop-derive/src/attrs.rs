//! `#[orm(...)]` attribute parsing.

use syn::{Attribute, Result};

/// Field-level attributes.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub column: Option<String>,
    pub raw_tag: Option<String>,
    pub skip: bool,
    pub omit_zero: bool,
    pub notpropagate: bool,
}

impl FieldAttr {
    pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut out = FieldAttr::default();
        for attr in attrs {
            if !attr.path().is_ident("orm") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    out.column = Some(lit.value());
                } else if meta.path.is_ident("tag") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    out.raw_tag = Some(lit.value());
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                } else if meta.path.is_ident("omitempty") || meta.path.is_ident("omitzero") {
                    out.omit_zero = true;
                } else if meta.path.is_ident("notpropagate") {
                    out.notpropagate = true;
                } else {
                    return Err(meta.error("unknown orm field attribute"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }

    /// Tag text handed to the mapper, `None` for an untagged field.
    pub(crate) fn tag(&self) -> Option<String> {
        if let Some(raw) = &self.raw_tag {
            return Some(raw.clone());
        }
        if self.column.is_none() && !self.omit_zero && !self.notpropagate {
            return None;
        }
        let mut tag = self.column.clone().unwrap_or_default();
        if self.omit_zero {
            tag.push_str(",omitempty");
        }
        if self.notpropagate {
            tag.push_str(",notpropagate");
        }
        Some(tag)
    }
}

/// Whether the struct carries `#[orm(json)]`.
pub(crate) fn is_json(attrs: &[Attribute]) -> Result<bool> {
    let mut json = false;
    for attr in attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("json") {
                json = true;
                Ok(())
            } else {
                Err(meta.error("unknown orm container attribute"))
            }
        })?;
    }
    Ok(json)
}
