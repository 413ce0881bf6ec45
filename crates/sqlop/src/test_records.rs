//! Hand-written records shared by unit tests.

use crate::error::SqlResult;
use crate::record::{Field, FieldDef, Record, Shape, not_a_value};
use crate::value::Value;

macro_rules! record {
    ($name:ident { $( $field:ident : $fty:ty => $tag:expr ),* $(,)? }) => {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub(crate) struct $name {
            $( pub $field: $fty, )*
        }

        impl Record for $name {
            fn fields() -> &'static [FieldDef] {
                const FIELDS: &[FieldDef] = &[
                    $( FieldDef {
                        name: stringify!($field),
                        tag: $tag,
                        shape: <$fty as Field>::shape,
                    }, )*
                ];
                FIELDS
            }

            fn field_defs(&self) -> &'static [FieldDef] {
                Self::fields()
            }

            fn field(&self, index: usize) -> Option<&dyn Field> {
                [$( &self.$field as &dyn Field ),*].get(index).copied()
            }

            fn field_mut(&mut self, index: usize) -> Option<&mut dyn Field> {
                [$( &mut self.$field as &mut dyn Field ),*].into_iter().nth(index)
            }
        }

        impl Field for $name {
            fn shape() -> Shape {
                Shape::Record(<$name as Record>::fields)
            }

            fn to_value(&self) -> SqlResult<Value> {
                Err(not_a_value(stringify!($name)))
            }

            fn assign(&mut self, _value: Value) -> SqlResult<()> {
                Err(not_a_value(stringify!($name)))
            }

            fn is_zero(&self) -> bool {
                *self == Self::default()
            }

            fn as_record(&self) -> Option<&dyn Record> {
                Some(self)
            }

            fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
                Some(self)
            }
        }
    };
}

record!(Audit {
    created_by: String => None,
    note: Option<String> => Some(",omitempty"),
});

record!(Meta {
    version: i32 => None,
    label: String => None,
});

record!(Base {
    created_at: i64 => None,
});

record!(User {
    id: i64 => Some("id"),
    name: String => Some("user_name,omitempty"),
    password: String => Some("-"),
    audit: Audit => Some("audit"),
    meta: Meta => Some("meta,notpropagate"),
    base: Base => None,
});

record!(Dup {
    a: i64 => Some("x"),
    b: i64 => Some("x"),
});
