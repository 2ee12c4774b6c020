use std::time::Duration;

use reqwest::Client;

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a client with the given request timeout.
pub fn try_new(timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Joins a base URL and a path without doubling or dropping the slash.
pub fn endpoint(
    base_url: &str,
    path: &str,
) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn endpoint_joins_with_single_slash() {
        assert_eq!(endpoint("https://cash-48v3.onrender.com", "calcular"), "https://cash-48v3.onrender.com/calcular");
        assert_eq!(endpoint("http://localhost:8000/", "/procesar-factura"), "http://localhost:8000/procesar-factura");
    }
}
