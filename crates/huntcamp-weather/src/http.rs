use crate::{WeatherConfig, WeatherError};
use std::io::Read;
use tracing::debug;

/// Decode `%XX` escapes, or `None` if an escape is malformed.
fn percent_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

/// Reject anything that could leave the location path segment.
///
/// Locations arrive still percent-encoded from the request query and are
/// forwarded as-is, so only unreserved characters, `%`, `+` and `,` pass.
/// The decoded form may not contain separators or a `..` sequence either.
pub fn validate_location(location: &str) -> Result<(), WeatherError> {
    if location.is_empty() || location.len() > 128 {
        return Err(WeatherError::InvalidLocation(
            "location must be 1-128 characters".to_owned(),
        ));
    }
    if !location
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"%+,._~-".contains(&b))
    {
        return Err(WeatherError::InvalidLocation(location.to_owned()));
    }
    let decoded = percent_decode(location)
        .ok_or_else(|| WeatherError::InvalidLocation(format!("bad escape in {location}")))?;
    let escapes_segment = decoded
        .iter()
        .any(|&b| matches!(b, b'/' | b'\\' | b'?' | b'#') || b.is_ascii_control())
        || decoded.windows(2).any(|w| w == b"..")
        || decoded == b".";
    if escapes_segment {
        return Err(WeatherError::InvalidLocation(location.to_owned()));
    }
    Ok(())
}

/// Client for a wttr.in-compatible upstream.
///
/// Requests `GET {base_url}/{location}?format=j1`.
pub struct WeatherClient {
    config: WeatherConfig,
    agent: ureq::Agent,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build();
        let agent = ureq::Agent::new_with_config(agent_config);
        Self { config, agent }
    }

    fn url(&self, location: &str) -> String {
        format!("{}/{location}?format=j1", self.config.base_url)
    }

    /// Fetch the upstream JSON for `location`, or the configured default.
    ///
    /// The body is checked to be JSON and returned byte-for-byte.
    pub fn fetch(&self, location: Option<&str>) -> Result<Vec<u8>, WeatherError> {
        let location = match location {
            Some(l) if !l.is_empty() => l,
            _ => self.config.default_location.as_str(),
        };
        validate_location(location)?;

        let url = self.url(location);
        debug!("GET {url}");
        let resp = match self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
        {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(code)) => {
                return Err(WeatherError::Http(format!("HTTP {code} for {url}")));
            }
            Err(e) => {
                return Err(WeatherError::Http(e.to_string()));
            }
        };

        let mut reader = resp.into_body().into_reader();
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .map_err(|e| WeatherError::Http(e.to_string()))?;

        serde_json::from_slice::<serde_json::Value>(&body)
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;
        Ok(body)
    }
}
