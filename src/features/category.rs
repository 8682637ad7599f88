//! Enumerated request fields.
//!
//! Every enumerated field implements [`Category`], which resolves a variant
//! to the scalar code the models were trained on. Textual categories travel
//! on the wire as their code string; [`Flag`] travels as the integer 0 or 1.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Underlying scalar of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryCode {
    /// String code, e.g. `"Male"`.
    Text(&'static str),
    /// Integer code, e.g. `1` for a set flag.
    Int(i64),
}

/// An enumerated field with a fixed set of variants.
pub trait Category: Copy + Sized + 'static {
    /// Name of the enumeration, used in error messages.
    const NAME: &'static str;

    /// All variants in declaration order.
    const ALL: &'static [Self];

    /// Scalar code of this variant.
    fn code(self) -> CategoryCode;

    /// Find the variant whose code is `code`.
    fn from_code(code: CategoryCode) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }
}

/// Unknown textual code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub category: &'static str,
    pub code: String,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid {}", self.code, self.category)
    }
}

impl std::error::Error for UnknownCode {}

macro_rules! text_category {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl Category for $name {
            const NAME: &'static str = stringify!($name);
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> CategoryCode {
                match self {
                    $(Self::$variant => CategoryCode::Text($code),)+
                }
            }
        }

        impl $name {
            /// String code of this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(UnknownCode {
                        category: <Self as Category>::NAME,
                        code: s.to_string(),
                    }),
                }
            }
        }
    };
}

text_category! {
    /// Gender.
    Gender {
        Female => "Female",
        Male => "Male",
        Other => "Other",
    }
}

text_category! {
    /// Ethnicity.
    Ethnicity {
        White => "White",
        Hispanic => "Hispanic",
        Black => "Black",
        Asian => "Asian",
        Other => "Other",
    }
}

text_category! {
    /// Highest completed education.
    Education {
        Highschool => "Highschool",
        Graduate => "Graduate",
        Postgraduate => "Postgraduate",
        NoFormal => "No formal",
    }
}

text_category! {
    /// Household income bracket.
    IncomeLevel {
        Middle => "Middle",
        LowerMiddle => "Lower-Middle",
        UpperMiddle => "Upper-Middle",
        Low => "Low",
        High => "High",
    }
}

text_category! {
    /// Self-reported smoking history.
    SmokingStatus {
        Never => "Never",
        Former => "Former",
        Current => "Current",
    }
}

text_category! {
    /// Employment status.
    EmploymentStatus {
        Employed => "Employed",
        Retired => "Retired",
        Unemployed => "Unemployed",
        Student => "Student",
    }
}

/// Binary history flag, encoded as 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i64")]
pub enum Flag {
    Zero,
    One,
}

impl Category for Flag {
    const NAME: &'static str = "Flag";
    const ALL: &'static [Self] = &[Self::Zero, Self::One];

    fn code(self) -> CategoryCode {
        CategoryCode::Int(i64::from(self))
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = super::integral::deserialize(deserializer)?;
        Self::try_from(value).map_err(de::Error::custom)
    }
}

impl From<Flag> for i64 {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Zero => 0,
            Flag::One => 1,
        }
    }
}

impl From<bool> for Flag {
    fn from(set: bool) -> Self {
        if set {
            Self::One
        } else {
            Self::Zero
        }
    }
}

impl TryFrom<i64> for Flag {
    type Error = UnknownCode;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            other => Err(UnknownCode {
                category: Self::NAME,
                code: other.to_string(),
            }),
        }
    }
}
