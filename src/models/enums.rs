use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($(#[$vmeta:meta])* $variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
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

str_enum!(Location {
    #[default]
    Office => "office",
    Court => "court",
    Virtual => "virtual",
    Other => "other",
});

str_enum!(AppointmentKind {
    #[default]
    ClientMeeting => "client-meeting",
});

impl Location {
    pub const ALL: [Location; 4] = [
        Location::Office,
        Location::Court,
        Location::Virtual,
        Location::Other,
    ];

    /// Human label used by the legend and the form's select box.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Office => "Office",
            Self::Court => "Court",
            Self::Virtual => "Virtual",
            Self::Other => "Other",
        }
    }
}
