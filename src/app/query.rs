//! Explicit, ordered request parameters
//!
//! Every request is described by a [`ShardQuery`]: the shard names, the extra
//! query parameters and any caller headers. Parameters keep insertion order and
//! a later `set` for the same key replaces the earlier value in place, so the
//! final query string can be read straight off the builder calls.

use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::constants::api;

/// Ordered key/value list of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set a parameter, replacing any earlier value for the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Value of a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Merge another list into this one; its values win on conflict
    pub fn merge(mut self, other: Params) -> Self {
        for (key, value) in other.pairs {
            self.set(key, value);
        }
        self
    }

    /// Iterate over the parameters in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Params::new(), |params, (key, value)| params.with(key, value))
    }
}

/// One shard request: shard names, extra parameters and caller headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardQuery {
    pub shards: Vec<String>,
    pub params: Params,
    pub headers: Vec<(String, String)>,
}

impl ShardQuery {
    /// Request the given shards
    pub fn new<I, S>(shards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shards: shards.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Add a shard, builder style
    pub fn shard(mut self, shard: impl Into<String>) -> Self {
        self.shards.push(shard.into());
        self
    }

    /// Set a query parameter, builder style
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.set(key, value);
        self
    }

    /// Merge a parameter list, builder style
    pub fn params(mut self, params: Params) -> Self {
        self.params = self.params.merge(params);
        self
    }

    /// Add a caller header, builder style
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build the request URL
    ///
    /// The entity key comes first, then the `q` shard list with shards joined
    /// by a literal `+`, then the extra parameters.
    pub fn to_url(&self, base: &Url, key: &Params) -> Url {
        let mut parts: Vec<String> = key.iter().map(encode_pair).collect();
        if !self.shards.is_empty() {
            let shards: Vec<String> = self.shards.iter().map(|s| encode(s)).collect();
            parts.push(format!(
                "{}={}",
                api::SHARD_PARAM,
                shards.join(api::SHARD_SEPARATOR)
            ));
        }
        parts.extend(self.params.iter().map(encode_pair));

        let mut url = base.clone();
        if parts.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&parts.join("&")));
        }
        url
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

fn encode_pair((key, value): (&str, &str)) -> String {
    format!("{}={}", encode(key), encode(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/cgi-bin/api.cgi").unwrap()
    }

    #[test]
    fn test_params_replace_in_place() {
        let params = Params::new()
            .with("a", 1)
            .with("b", "two")
            .with("a", 3);

        let pairs: Vec<(&str, &str)> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "two")]);
    }

    #[test]
    fn test_merge_prefers_later_values() {
        let defaults = Params::new().with("limit", 100).with("filter", "move");
        let merged = defaults.merge(Params::new().with("limit", 10));

        assert_eq!(merged.get("limit"), Some("10"));
        assert_eq!(merged.get("filter"), Some("move"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_url_layout() {
        let key = Params::new().with("nation", "Test Nation");
        let query = ShardQuery::new(["name", "wa"]).param("limit", 5);

        let url = query.to_url(&base(), &key);
        assert_eq!(url.query(), Some("nation=Test+Nation&q=name+wa&limit=5"));
    }

    #[test]
    fn test_shards_are_escaped_individually() {
        let query = ShardQuery::new(["a+b", "c&d"]);
        let url = query.to_url(&base(), &Params::new());
        assert_eq!(url.query(), Some("q=a%2Bb+c%26d"));
    }

    #[test]
    fn test_empty_query() {
        let url = ShardQuery::default().to_url(&base(), &Params::new());
        assert_eq!(url.query(), None);
    }
}
