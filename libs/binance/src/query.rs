//! Query-string assembly for REST requests.
//!
//! The exchange expects camelCase keys, optional parameters omitted
//! entirely, symbol lists rendered as compact JSON arrays
//! (`["BTCUSDT","ETHUSDT"]`), and numbers without trailing zeros.

use std::fmt::Display;

/// Ordered set of query parameters for one request.
#[derive(Debug, Default, Clone)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string-valued parameter.
    pub fn push(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((key, value.into()));
        self
    }

    /// Append a string-valued parameter if it is present.
    pub fn push_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Append a numeric parameter, trimming trailing zeros.
    pub fn push_num(self, key: &'static str, value: impl Display) -> Self {
        let rendered = trim_number(&value.to_string());
        self.push(key, rendered)
    }

    /// Append a numeric parameter if it is present.
    pub fn push_num_opt(self, key: &'static str, value: Option<impl Display>) -> Self {
        match value {
            Some(v) => self.push_num(key, v),
            None => self,
        }
    }

    /// Append a symbol list as a compact JSON array.
    pub fn push_list(self, key: &'static str, values: Option<&[&str]>) -> Self {
        match values {
            Some(items) => {
                let mut rendered = String::from("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        rendered.push(',');
                    }
                    rendered.push('"');
                    rendered.push_str(item);
                    rendered.push('"');
                }
                rendered.push(']');
                self.push(key, rendered)
            }
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// Strip trailing zeros (and a dangling point) from a decimal rendering.
fn trim_number(rendered: &str) -> String {
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        rendered.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_opt_skips_none() {
        let query = Query::new()
            .push("symbol", "BTCUSDT")
            .push_opt("limit", None::<String>);
        assert_eq!(query.pairs(), &[("symbol", "BTCUSDT".to_string())]);
    }

    #[test]
    fn test_number_rendering_trims_zeros() {
        let query = Query::new()
            .push_num("quantity", 0.00103000)
            .push_num("price", 87398.39000000)
            .push_num("limit", 500);
        assert_eq!(query.pairs()[0].1, "0.00103");
        assert_eq!(query.pairs()[1].1, "87398.39");
        assert_eq!(query.pairs()[2].1, "500");
    }

    #[test]
    fn test_number_rendering_keeps_integers() {
        assert_eq!(trim_number("1000"), "1000");
        assert_eq!(trim_number("1.0"), "1");
        assert_eq!(trim_number("0.5000"), "0.5");
    }

    #[test]
    fn test_list_rendering_is_compact_json() {
        let query = Query::new().push_list("symbols", Some(&["BTCUSDT", "ETHUSDT"]));
        assert_eq!(query.pairs()[0].1, r#"["BTCUSDT","ETHUSDT"]"#);

        let single = Query::new().push_list("symbols", Some(&["LTCBTC"]));
        assert_eq!(single.pairs()[0].1, r#"["LTCBTC"]"#);
    }

    #[test]
    fn test_empty_query() {
        let query = Query::new().push_opt("symbol", None::<String>);
        assert!(query.is_empty());
    }
}
