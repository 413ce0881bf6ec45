//! Field tag parsing: `name[,attr...]`.

/// Parsed field tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tag<'a> {
    pub name: Option<&'a str>,
    pub skip: bool,
    pub omit_zero: bool,
    pub notpropagate: bool,
}

impl<'a> Tag<'a> {
    /// Parse a tag. Unknown attributes are ignored.
    pub(crate) fn parse(tag: &'a str) -> Self {
        let mut parts = tag.split(',').map(str::trim);
        let name = parts.next().unwrap_or("");
        if name == "-" {
            return Self {
                skip: true,
                ..Self::default()
            };
        }

        let mut out = Self {
            name: (!name.is_empty()).then_some(name),
            ..Self::default()
        };
        for attr in parts {
            match attr {
                "omitempty" | "omitzero" => out.omit_zero = true,
                "notpropagate" => out.notpropagate = true,
                _ => {}
            }
        }
        out
    }
}
