//! Endpoint resolution.

use url::Url;

use crate::JugglerError;

/// Picks the endpoint to connect to.
///
/// An explicit `address` is used as is. Otherwise the endpoint is
/// `ws[s]://<host>[:<port>]/ws` on the host that served `page`, secure when
/// the page was served over `https`. Without a page the host is `localhost`.
///
/// ```
/// use hat_juggler::address::resolve;
///
/// let url = resolve(None, Some("https://example.com:8443/app/index.html")).unwrap();
/// assert_eq!(url.as_str(), "wss://example.com:8443/ws");
/// ```
pub fn resolve(address: Option<&str>, page: Option<&str>) -> Result<Url, JugglerError> {
    if let Some(address) = address {
        let url = parse(address)?;
        return match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(JugglerError::Config(format!("unsupported scheme {other:?} in {address}"))),
        };
    }
    let page = page.map(parse).transpose()?;
    let scheme = match page.as_ref().map(Url::scheme) {
        Some("https") => "wss",
        _ => "ws",
    };
    let host = page.as_ref().and_then(Url::host_str).unwrap_or("localhost");
    let port = page.as_ref().and_then(Url::port).map(|port| format!(":{port}")).unwrap_or_default();
    parse(&format!("{scheme}://{host}{port}/ws"))
}

fn parse(text: &str) -> Result<Url, JugglerError> {
    Url::parse(text).map_err(|e| JugglerError::Config(format!("{text}: {e}")))
}
