//! Smoke-check the live API: hit the public endpoints (and the private ones
//! when credentials are configured) and run the response checks against each.
//! Exits non-zero on the first failing check.

use anyhow::{Context, Result};
use exchange_api_client::{checks, ApiClient, ApiConfig};
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = ApiConfig::from_env()?;
    let has_credentials = config.key.is_some() && config.secret.is_some();
    let client = ApiClient::new(config);

    info!("checking server time");
    let resp = client.server_time()?;
    checks::check_elapsed_under(&resp, 2.0).context("Time: latency check")?;
    checks::http_checks(&resp).context("Time: http checks")?;
    checks::basic_api_checks(&resp).context("Time: api checks")?;
    checks::check_server_time(&resp).context("Time: field checks")?;

    info!("checking asset pairs");
    let resp = client.asset_pairs(&["XXBTZUSD", "XETHZUSD"])?;
    checks::http_checks(&resp).context("AssetPairs: http checks")?;
    checks::basic_api_checks(&resp).context("AssetPairs: api checks")?;
    checks::check_asset_pairs(&resp).context("AssetPairs: field checks")?;

    if has_credentials {
        info!("checking open orders");
        let resp = client.open_orders()?;
        checks::http_checks(&resp).context("OpenOrders: http checks")?;
        checks::basic_api_checks(&resp).context("OpenOrders: api checks")?;
        checks::check_open_orders(&resp).context("OpenOrders: field checks")?;
    } else {
        warn!("API_KEY/API_SEC not set, skipping private endpoints");
    }

    info!("all checks passed");
    Ok(())
}
