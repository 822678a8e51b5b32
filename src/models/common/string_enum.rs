//! 以字符串形式落库的枚举
//!
//! 生成的枚举同时提供 `as_str`、`Display`、`FromStr` 以及带错误提示的反序列化。

#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($export:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, ts_rs::TS)]
        #[ts(export, export_to = $export)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {s}", stringify!($name))),
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(|_| {
                    serde::de::Error::custom(format!(
                        "无效的取值: '{s}'. 支持: {}",
                        [$($value),+].join(", ")
                    ))
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::string_enum! {
        enum Color("test_color.ts") {
            Red => "red",
            DarkBlue => "dark_blue",
        }
    }

    #[test]
    fn test_round_trip_through_str() {
        assert_eq!("dark_blue".parse::<Color>(), Ok(Color::DarkBlue));
        assert_eq!(Color::Red.to_string(), "red");
        assert!("blue".parse::<Color>().is_err());
    }

    #[test]
    fn test_deserialize_reports_supported_values() {
        let err = serde_json::from_str::<Color>("\"green\"").unwrap_err();
        assert!(err.to_string().contains("red, dark_blue"));
        assert_eq!(
            serde_json::from_str::<Color>("\"red\"").unwrap(),
            Color::Red
        );
    }

    #[test]
    fn test_serialize_uses_value() {
        assert_eq!(
            serde_json::to_string(&Color::DarkBlue).unwrap(),
            "\"dark_blue\""
        );
    }
}
