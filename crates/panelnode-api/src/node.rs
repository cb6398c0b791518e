use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::Error;

/// Proxy protocol a node serves. The panel keys node config on this.
///
/// Names parse case-insensitively (`"trojan"`, `"Trojan"`, `"TROJAN"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum NodeType {
    V2ray,
    Trojan,
    Shadowsocks,
}

impl NodeType {
    /// Validate a configured protocol name.
    pub fn from_name(value: &str) -> Result<Self, Error> {
        Self::from_str(value).map_err(|_| Error::UnsupportedNodeType {
            value: value.to_owned(),
        })
    }

    /// Lower-case form sent as the `node_type` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            Self::V2ray => "v2ray",
            Self::Trojan => "trojan",
            Self::Shadowsocks => "shadowsocks",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parses_any_case() {
        for raw in ["V2ray", "v2ray", "V2RAY", "trojan", "Shadowsocks", "SHADOWSOCKS"] {
            let node = NodeType::from_name(raw).unwrap();
            assert_eq!(node.query_value(), raw.to_ascii_lowercase());
        }
    }

    #[test]
    fn rejects_unknown_names() {
        for raw in ["", "vmess", "Hysteria2", " V2ray", "shadowsocks-r"] {
            match NodeType::from_name(raw) {
                Err(Error::UnsupportedNodeType { value }) => assert_eq!(value, raw),
                other => panic!("expected UnsupportedNodeType for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn query_value_is_lowercase_display() {
        for node in NodeType::iter() {
            assert_eq!(node.query_value(), node.to_string().to_lowercase());
            assert_eq!(node.as_ref(), node.to_string());
        }
    }
}
