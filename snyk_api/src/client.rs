//! HTTP client for the Snyk REST and V1 APIs.

use std::{fmt, time::Duration};

use reqwest::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    error_response::check_response,
    paginator::Paginator,
    query::{ListOptions, Query},
    region::Region,
    response::Response,
    types::{decode_page, Page},
    user_agent::get_user_agent,
    Error,
};

/// Transport timeout applied when no custom HTTP client is supplied.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const REST_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Which of the client's base URLs a request is resolved against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Api {
    /// App endpoints (token exchange).
    App,
    /// REST API. Uses the JSON:API media type.
    #[default]
    Rest,
    /// Legacy V1 API.
    V1,
}

impl Api {
    fn media_type(self) -> &'static str {
        match self {
            Api::Rest => REST_API_MEDIA_TYPE,
            Api::App | Api::V1 => DEFAULT_MEDIA_TYPE,
        }
    }
}

/// HTTP client for the Snyk API.
///
/// Every request carries the static API token, the configured user agent and
/// the media type of the target API. The underlying `reqwest::Client` is
/// reference counted, so cloning a `Client` is cheap.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    token: String,
    user_agent: String,
    app_base_url: Url,
    rest_base_url: Url,
    v1_base_url: Url,
}

impl Client {
    /// Creates a client for the default region.
    pub fn new(token: &str) -> Result<Self, Error> {
        Self::builder(token).build()
    }

    /// Creates a client sending every API to the same base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self, Error> {
        Self::builder(token).base_url(base_url).build()
    }

    /// Creates a client from `SNYK_TOKEN` and, if set, `SNYK_REGION`.
    pub fn from_env() -> Result<Self, Error> {
        ClientBuilder::from_env()?.build()
    }

    pub fn builder(token: &str) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    /// The base URL requests for `api` are resolved against.
    pub fn base_url(&self, api: Api) -> &Url {
        match api {
            Api::App => &self.app_base_url,
            Api::Rest => &self.rest_base_url,
            Api::V1 => &self.v1_base_url,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Resolves a relative endpoint (e.g. `orgs/123`) against the base URL of `api`.
    pub fn endpoint_url(&self, api: Api, endpoint: &str) -> Result<Url, Error> {
        if endpoint.starts_with('/') {
            return Err(Error::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(self.base_url(api).join(endpoint)?)
    }

    /// Builds a request with authorization, media type and user agent headers.
    /// `body`, if any, is sent as JSON.
    pub fn prepare_request<B>(
        &self,
        method: Method,
        api: Api,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Request, Error>
    where
        B: Serialize + ?Sized,
    {
        let media_type = api.media_type();
        let mut builder = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, media_type)
            .header(CONTENT_TYPE, media_type)
            .header(USER_AGENT, &self.user_agent);
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body).map_err(Error::Encode)?);
        }
        Ok(builder.build()?)
    }

    /// Sends a request and reads the whole body.
    ///
    /// Non-2xx responses are turned into [`Error::Api`] or
    /// [`Error::UndecodableError`]. When `cancel` fires while the call is in
    /// flight the call is dropped and [`Error::Cancelled`] returned.
    pub async fn execute(
        &self,
        request: reqwest::Request,
        cancel: Option<&CancellationToken>,
    ) -> Result<(Response, Vec<u8>), Error> {
        let method = request.method().clone();
        tracing::debug!(%method, url = %request.url(), "sending request");

        let call = async {
            let resp = self.http.execute(request).await?;
            let response = Response::new(method, &resp);
            let body = match resp.bytes().await {
                Ok(body) => body.to_vec(),
                // An unreadable error body normalizes to an empty error list.
                Err(e) if !response.status.is_success() => {
                    tracing::debug!(status = response.status.as_u16(), error = %e, "failed to read error body");
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            };
            Ok::<_, Error>((response, body))
        };
        let (response, body) = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Error::Cancelled),
                result = call => result?,
            },
            None => call.await?,
        };

        tracing::debug!(
            status = response.status.as_u16(),
            request_id = response.snyk_request_id.as_deref().unwrap_or("-"),
            bytes = body.len(),
            "received response"
        );
        let response = check_response(response, &body)?;
        Ok((response, body))
    }

    /// Sends a request and decodes the JSON body into `T`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        api: Api,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<(T, Response), Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(api, endpoint)?;
        let request = self.prepare_request(method, api, url, body)?;
        let (response, body) = self.execute(request, None).await?;
        let value = serde_json::from_slice(&body)?;
        Ok((value, response))
    }

    /// Sends a request whose response body is ignored (e.g. `204 No Content`).
    pub async fn request_empty<B>(
        &self,
        method: Method,
        api: Api,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Response, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(api, endpoint)?;
        let request = self.prepare_request(method, api, url, body)?;
        let (response, _) = self.execute(request, None).await?;
        Ok(response)
    }

    /// Fetches a single document with the given query options.
    pub async fn get<T, Q>(&self, api: Api, endpoint: &str, query: &Q) -> Result<(T, Response), Error>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        let url = query.add_to_url(&self.endpoint_url(api, endpoint)?);
        let request = self.prepare_request(Method::GET, api, url, None::<&()>)?;
        let (response, body) = self.execute(request, None).await?;
        let value = serde_json::from_slice(&body)?;
        Ok((value, response))
    }

    /// Fetches one page of a collection. The page's links are exposed through
    /// [`Response::links`].
    pub async fn list_page<T>(
        &self,
        api: Api,
        endpoint: &str,
        opts: &ListOptions,
    ) -> Result<(Vec<T>, Response), Error>
    where
        T: DeserializeOwned,
    {
        let (page, response) = self.fetch_page(api, endpoint, opts, None).await?;
        Ok((page.data, response))
    }

    /// Returns a lazy paginator over every item of a collection.
    ///
    /// No request is made until the paginator is first advanced.
    pub fn paginate<T>(&self, api: Api, endpoint: &str, opts: ListOptions) -> Paginator<'_, T>
    where
        T: DeserializeOwned,
    {
        Paginator::new(self, api, endpoint, opts)
    }

    pub(crate) async fn fetch_page<T>(
        &self,
        api: Api,
        endpoint: &str,
        opts: &ListOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<(Page<T>, Response), Error>
    where
        T: DeserializeOwned,
    {
        if opts.version().is_empty() {
            return Err(Error::MissingVersion(endpoint.to_string()));
        }
        let url = opts.add_to_url(&self.endpoint_url(api, endpoint)?);
        let request = self.prepare_request(Method::GET, api, url, None::<&()>)?;
        let (mut response, body) = self.execute(request, cancel).await?;
        let page = decode_page::<T>(&body)?;
        tracing::debug!(
            url = %response.url,
            items = page.data.len(),
            has_next = page.links.as_ref().and_then(|l| l.next_link()).is_some(),
            "fetched page"
        );
        response.links = page.links.clone();
        Ok((page, response))
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("user_agent", &self.user_agent)
            .field("app_base_url", &self.app_base_url.as_str())
            .field("rest_base_url", &self.rest_base_url.as_str())
            .field("v1_base_url", &self.v1_base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Configures a [`Client`].
pub struct ClientBuilder {
    token: String,
    region: Region,
    region_alias: Option<String>,
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Duration,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            region: Region::default(),
            region_alias: None,
            base_url: None,
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            http_client: None,
        }
    }

    /// Starts from `SNYK_TOKEN` and, if set, `SNYK_REGION`. Later builder
    /// calls (e.g. [`region_alias`](Self::region_alias)) override the region.
    pub fn from_env() -> Result<Self, Error> {
        let token = env_var("SNYK_TOKEN").ok_or(Error::MissingToken)?;
        let mut builder = Self::new(&token);
        if let Some(alias) = env_var("SNYK_REGION") {
            builder = builder.region_alias(&alias);
        }
        Ok(builder)
    }

    /// Uses the base URLs of `region`.
    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self.region_alias = None;
        self
    }

    /// Uses the region registered under `alias`. Unknown aliases fail in [`build`](Self::build).
    pub fn region_alias(mut self, alias: &str) -> Self {
        self.region_alias = Some(alias.to_string());
        self
    }

    /// Sends App, REST and V1 requests to the same base URL, overriding the region.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    /// Transport timeout. Ignored when a custom HTTP client is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let region = match &self.region_alias {
            Some(alias) => Region::find(alias)?,
            None => self.region,
        };
        let (app, rest, v1) = match &self.base_url {
            Some(base) => (base.as_str(), base.as_str(), base.as_str()),
            None => (region.app_base_url, region.rest_base_url, region.v1_base_url),
        };
        let http = match self.http_client {
            Some(http) => http,
            None => reqwest::Client::builder().timeout(self.timeout).build()?,
        };
        Ok(Client {
            http,
            token: self.token,
            user_agent: self.user_agent.unwrap_or_else(get_user_agent),
            app_base_url: parse_base_url(app)?,
            rest_base_url: parse_base_url(rest)?,
            v1_base_url: parse_base_url(v1)?,
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Base URLs need a trailing slash for relative endpoints to resolve below them.
fn parse_base_url(base_url: &str) -> Result<Url, Error> {
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{}/", base_url))?)
    }
}
