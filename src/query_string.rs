use std::collections::HashMap;
use std::string::ToString;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn empty() -> Self {
        QueryString { items: HashMap::new() }
    }

    pub fn get_page(&self) -> u32 {
        let one = "1".to_string();
        let val = self.items.get("page").unwrap_or(&one);
        let val = val.parse().unwrap_or(1);
        if val == 0 { return 1; }
        val
    }

    /// Selected tag filter. Blank values count as no selection.
    pub fn get_tag(&self) -> Option<String> {
        self.items.get("tag")
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
    }

    pub fn is_set(&self, key: &str) -> bool {
        matches!(self.items.get(key).map(String::as_str), Some("true") | Some("1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_page() {
        assert_eq!(QueryString::from("page=3").get_page(), 3);
        assert_eq!(QueryString::from("page=0").get_page(), 1);
        assert_eq!(QueryString::from("page=abc").get_page(), 1);
        assert_eq!(QueryString::from("").get_page(), 1);
    }

    #[test]
    fn test_get_tag() {
        assert_eq!(QueryString::from("tag=rust").get_tag(), Some("rust".to_string()));
        assert_eq!(QueryString::from("tag=Street%20Photography").get_tag(), Some("Street Photography".to_string()));
        assert_eq!(QueryString::from("tag=").get_tag(), None);
        assert_eq!(QueryString::from("page=2").get_tag(), None);
    }

    #[test]
    fn test_is_set() {
        assert!(QueryString::from("success=true").is_set("success"));
        assert!(!QueryString::from("success=no").is_set("success"));
        assert!(!QueryString::empty().is_set("success"));
    }

    #[test]
    fn test_parse_query_str() {
        let buf = "bread=baguette&cheese=comt%C3%A9&meat=ham&fat=butter";
        let meal = vec![
            ("bread".to_owned(), "baguette".to_owned()),
            ("cheese".to_owned(), "comté".to_owned()),
            ("meat".to_owned(), "ham".to_owned()),
            ("fat".to_owned(), "butter".to_owned()),
        ].into_iter().collect::<HashMap<_, _>>();

        let expected = QueryString {
            items: meal,
        };

        assert_eq!(QueryString::from(buf), expected);
    }

    #[test]
    fn test_parse_key_only_query_str() {
        let buf = "key-only";
        let expected: HashMap<String, String> = vec![("key-only", "")].iter().map(|(x, y)| (x.to_string(), y.to_string())).collect::<HashMap<_, _>>();
        assert_eq!(QueryString::from(buf), QueryString { items: expected });
    }
}
