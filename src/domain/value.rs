//! Scalar views over leaf values.
//!
//! Leaves always store strings; typed access converts on the way in and out.

/// Leaf strings that read as `false`. Anything else reads as `true`.
pub const FALSE_VALUES: [&str; 3] = ["false", "no", "0"];

/// Reduces `raw` to a value the parser reads back unchanged.
///
/// Quote characters are dropped, line breaks become spaces, and the
/// result is trimmed.
pub fn leaf_text(raw: &str) -> String {
    raw.chars()
        .filter(|&c| c != '"')
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// A scalar that can be read from and written to a leaf value.
pub trait ConfigValue: Sized {
    /// Parses a leaf string, returning the failure reason on error.
    fn from_config_str(value: &str) -> Result<Self, String>;

    /// String stored in the leaf.
    fn to_config_string(&self) -> String;
}

/// Permissive: only a case-insensitive `false`, `no` or `0` is false.
impl ConfigValue for bool {
    fn from_config_str(value: &str) -> Result<Self, String> {
        let lowered = value.to_lowercase();
        Ok(!FALSE_VALUES.contains(&lowered.as_str()))
    }

    fn to_config_string(&self) -> String {
        self.to_string()
    }
}

impl ConfigValue for String {
    fn from_config_str(value: &str) -> Result<Self, String> {
        Ok(value.to_string())
    }

    fn to_config_string(&self) -> String {
        self.clone()
    }
}

macro_rules! lexical_config_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                fn from_config_str(value: &str) -> Result<Self, String> {
                    value.parse::<$ty>().map_err(|e| e.to_string())
                }

                fn to_config_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

lexical_config_value!(
    char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);
