/// Declares a string-tagged type enum.
///
/// Known tags become unit variants; any other string round-trips through the
/// generated `Other(String)` variant, so unrecognised data never fails to load.
macro_rules! type_tags {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Tag not known to this build, kept verbatim
            Other(String),
        }

        impl $name {
            /// Every known variant, in declaration order
            #[must_use]
            pub fn known() -> Vec<Self> {
                vec![$(Self::$variant),+]
            }

            /// The wire tag of this variant
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $tag,)+
                    Self::Other(tag) => tag.as_str(),
                }
            }

            #[must_use]
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl From<String> for $name {
            fn from(tag: String) -> Self {
                match tag.as_str() {
                    $($tag => Self::$variant,)+
                    _ => Self::Other(tag),
                }
            }
        }

        impl From<&str> for $name {
            fn from(tag: &str) -> Self {
                Self::from(tag.to_string())
            }
        }

        impl From<$name> for String {
            fn from(tag: $name) -> String {
                match tag {
                    $name::Other(tag) => tag,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use type_tags;
