use ethers::prelude::*;
use std::sync::Arc;
use std::time::Duration;

pub fn create_provider(rpc_url: &str) -> Result<Arc<Provider<Http>>, Box<dyn std::error::Error>> {
    let provider = Provider::<Http>::try_from(rpc_url)?.interval(Duration::from_millis(2_000));
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_rejects_bad_url() {
        assert!(create_provider("not a url").is_err());
    }

    #[test]
    fn test_create_provider_accepts_http_url() {
        assert!(create_provider("http://localhost:8545").is_ok());
    }
}
