//! Request DTOs for the image proxy API

/// Query string of `GET /api/proxy/image`
///
/// # Fields
/// - `url`: Remote image to proxy; required, checked by the handler
/// - `skip_cache`: `"true"` bypasses the cache lookup for this request
///
/// Repeated parameters are tolerated; the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageProxyQuery {
    pub url: Option<String>,
    pub skip_cache: Option<String>,
}

impl ImageProxyQuery {
    /// Parses a raw (still percent-encoded) query string.
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "url" if query.url.is_none() => query.url = Some(value.into_owned()),
                "skip_cache" if query.skip_cache.is_none() => {
                    query.skip_cache = Some(value.into_owned())
                }
                _ => {}
            }
        }
        query
    }

    /// Only the literal `true` enables the bypass.
    pub fn skip_cache(&self) -> bool {
        self.skip_cache.as_deref() == Some("true")
    }
}
