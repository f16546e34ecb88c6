//! Admin API data types

use serde::Serialize;

use crate::XmlElement;

/// Parameters of the `FindUser` operation, in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindUserQuery {
    pub v501: bool,
    pub v700: bool,
    pub v800: bool,
    pub vx1000: bool,
    pub cn: Option<String>,
    pub h323: Option<String>,
    pub e164: Option<String>,
    pub count: u32,
    pub nonblock: bool,
    pub exact: bool,
}

impl FindUserQuery {
    /// Detailed listing of at most one enabled user matching the criteria
    pub fn detailed(cn: Option<&str>, h323: Option<&str>, e164: Option<&str>) -> Self {
        Self {
            v501: true,
            v700: true,
            v800: true,
            vx1000: true,
            cn: cn.map(str::to_string),
            h323: h323.map(str::to_string),
            e164: e164.map(str::to_string),
            count: 1,
            nonblock: false,
            exact: false,
        }
    }

    /// Human-readable criteria for logs and error messages
    pub fn describe(&self) -> String {
        let criteria: Vec<String> = [("cn", &self.cn), ("h323", &self.h323), ("e164", &self.e164)]
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
            .collect();
        if criteria.is_empty() {
            "<any>".to_string()
        } else {
            criteria.join(", ")
        }
    }
}

/// One `FindUser` result entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub cn: String,
    pub dn: Option<String>,
    pub guid: Option<String>,
    pub h323: Option<String>,
    pub e164: Option<String>,
}

impl UserInfo {
    /// Build from a result item; items without a common name are ignored
    pub(crate) fn from_item(item: &XmlElement) -> Option<Self> {
        let field = |name: &str| {
            item.child(name)
                .map(|c| c.text().trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Some(Self {
            cn: field("cn")?,
            dn: field("dn"),
            guid: field("guid"),
            h323: field("h323"),
            e164: field("e164"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detailed_query_flags() {
        let query = FindUserQuery::detailed(None, None, Some("4711"));
        assert!(query.v501 && query.v700 && query.v800 && query.vx1000);
        assert!(!query.nonblock && !query.exact);
        assert_eq!(query.count, 1);
        assert_eq!(query.describe(), "e164=4711");
        assert_eq!(FindUserQuery::detailed(None, None, None).describe(), "<any>");
    }

    #[test]
    fn test_user_info_from_item() {
        let item = XmlElement::parse(
            "<item><cn>Agent Smith</cn><dn>Smith</dn><h323></h323><e164>4711</e164></item>",
        )
        .unwrap();
        let info = UserInfo::from_item(&item).unwrap();
        assert_eq!(info.cn, "Agent Smith");
        assert_eq!(info.dn.as_deref(), Some("Smith"));
        assert_eq!(info.h323, None);
        assert_eq!(info.e164.as_deref(), Some("4711"));

        let nameless = XmlElement::parse("<item><e164>1</e164></item>").unwrap();
        assert!(UserInfo::from_item(&nameless).is_none());
    }
}
