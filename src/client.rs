use std::cell::Cell;

use chrono::Utc;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::sign::sign_request;
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};

const API_VERSION: u32 = 0;
// Sent on private POSTs only; public GETs deliberately go out with the
// transport's default agent, matching the server's observed traffic.
const USER_AGENT: &str = "API Client";

/// Request parameters in insertion order. Order matters: the signature is
/// computed over the parameters exactly as they are sent.
pub type Params = Vec<(String, String)>;

/// Client for a subset of the exchange REST API.
///
/// Owns the connection parameters and a transport; every call is a single
/// blocking attempt with no retries. Responses come back raw for the caller
/// (or the response checks) to interpret, and transport failures propagate
/// unchanged. Not meant to be shared across threads: two near-simultaneous
/// private calls on the same credentials could race the nonce.
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    config: ApiConfig,
    transport: T,
    // Wall-clock nonces can repeat when calls land inside one clock tick, and
    // the server rejects a reused nonce. The last issued value is kept and
    // bumped past, a documented strengthening of plain clock reads. Cell
    // keeps the request methods on &self; single-threaded use only.
    last_nonce: Cell<u64>,
}

impl ApiClient<ReqwestTransport> {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn with_transport(config: ApiConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            last_nonce: Cell::new(0),
        }
    }

    /// The transport this client dispatches through. Handy for tests that
    /// script or record the HTTP layer.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Millisecond timestamp, strictly increasing across calls on this client.
    fn next_nonce(&self) -> u64 {
        let now = Utc::now().timestamp_millis() as u64;
        let nonce = now.max(self.last_nonce.get() + 1);
        self.last_nonce.set(nonce);
        nonce
    }

    /// GET a public endpoint. No authentication headers, ever.
    ///
    /// The server expects the literal comma-joined `k=v,k=v` query form here,
    /// not a percent-encoded query string. Values containing `,`, `&` or `=`
    /// would corrupt the query; that is the live server's contract, kept
    /// as-is rather than silently fixed.
    pub fn public_request(&self, action: &str, params: &Params) -> ApiResult<HttpResponse> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "https://{}/{}/public/{}?{}",
            self.config.host, API_VERSION, action, query
        );
        info!(action, "public request");
        self.transport.get(&url)
    }

    /// POST a private endpoint with `API-Key` and `API-Sign` headers.
    ///
    /// Injects the nonce and, when configured, the one time password into the
    /// form body. Requires both key and secret; that is checked before the
    /// params are touched and before any network I/O.
    pub fn private_request(&self, action: &str, params: &Params) -> ApiResult<HttpResponse> {
        let (Some(key), Some(secret)) = (&self.config.key, &self.config.secret) else {
            return Err(ApiError::Configuration(
                "an API key and secret are required for the private API".into(),
            ));
        };

        let mut data = params.clone();
        data.push(("nonce".into(), self.next_nonce().to_string()));
        if let Some(otp) = &self.config.otp {
            data.push(("otp".into(), otp.clone()));
        }

        let uri_path = format!("/{}/private/{}", API_VERSION, action);
        let signature = sign_request(&uri_path, secret, &data)?;
        let url = format!("https://{}{}", self.config.host, uri_path);
        let headers = vec![
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("API-Key".to_string(), key.clone()),
            ("API-Sign".to_string(), signature),
        ];
        info!(action, "private request");
        self.transport.post(&url, &headers, &data)
    }

    pub fn server_time(&self) -> ApiResult<HttpResponse> {
        self.public_request("Time", &Params::new())
    }

    pub fn asset_pair(&self, pair: &str) -> ApiResult<HttpResponse> {
        let params = vec![("pair".to_string(), pair.to_string())];
        self.public_request("AssetPairs", &params)
    }

    /// Fetch several pairs at once; the server takes them comma-joined in a
    /// single `pair` parameter.
    pub fn asset_pairs(&self, pairs: &[&str]) -> ApiResult<HttpResponse> {
        self.asset_pair(&pairs.join(","))
    }

    pub fn open_orders(&self) -> ApiResult<HttpResponse> {
        let params = vec![("trades".to_string(), "true".to_string())];
        self.private_request("OpenOrders", &params)
    }
}
