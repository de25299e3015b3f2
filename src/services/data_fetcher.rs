//! Responsible for fetching every bus stop from DataMall, one page at a time
use crate::model::{bus_stop::BusStop, datamall_api_model::parse_page};
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue};
use tracing::{Instrument, error, info, info_span};

pub const DEFAULT_BASE_URL: &str = "http://datamall2.mytransport.sg/ltaodataservice/BusStops";

/// DataMall returns at most this many records per call.
pub const DEFAULT_PAGE_SIZE: u64 = 500;

/// Something that can hand out pages of bus stops by offset.
pub trait PageSource {
    /// Returns the records starting at `skip`. An empty page means there's nothing left.
    async fn fetch_page(&self, skip: u64) -> Result<Vec<BusStop>, FetchError>;
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// How far the `$skip` cursor moves after a non-empty page
    pub page_size: u64,
    /// Give up after this many pages. `None` keeps going until an empty page.
    pub max_pages: Option<u64>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataMallConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct DataMallClient {
    http: reqwest::Client,
    base_url: String,
}

impl DataMallClient {
    pub fn new(config: DataMallConfig) -> Result<Self, FetchError> {
        let mut api_key = HeaderValue::from_str(&config.api_key)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("AccountKey", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

impl PageSource for DataMallClient {
    #[tracing::instrument(err, skip(self))]
    async fn fetch_page(&self, skip: u64) -> Result<Vec<BusStop>, FetchError> {
        let url = format!("{}?$skip={}", self.base_url, skip);
        info!("{url}");

        let response = self
            .http
            .get(&url)
            .send()
            .instrument(info_span!("Fetching bus stops"))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| FetchError::Http { skip, source })?;

        let body = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await
            .map_err(|source| FetchError::Http { skip, source })?;

        let stops =
            parse_page(&body).map_err(|source| FetchError::Parsing { skip, source, body })?;

        info!("got {} bus stops", stops.len());

        Ok(stops)
    }
}

/// Fetches pages until one comes back empty and returns everything in the order it arrived.
///
/// The first failing page aborts the whole fetch, nothing fetched before it is returned.
#[tracing::instrument(skip(source))]
pub async fn fetch_all<S: PageSource>(
    source: &S,
    options: FetchOptions,
) -> Result<Vec<BusStop>, FetchError> {
    let mut accumulated = Vec::new();
    let mut offset = 0;
    let mut pages = 0;

    loop {
        if options.max_pages.is_some_and(|max| pages >= max) {
            return Err(FetchError::PageLimitExceeded { pages });
        }

        let page = source.fetch_page(offset).await?;
        pages += 1;

        if page.is_empty() {
            info!(
                "fetched {} bus stops in {} requests",
                accumulated.len(),
                pages
            );
            return Ok(accumulated);
        }

        accumulated.extend(page);
        offset += options.page_size;
    }
}

/// Like [`fetch_all`] but a failed fetch is logged and turned into an empty list.
pub async fn get_bus_stops<S: PageSource>(source: &S, options: FetchOptions) -> Vec<BusStop> {
    match fetch_all(source, options).await {
        Ok(stops) => stops,
        Err(e) => {
            error!("Discarding fetched bus stops: {e}");
            Vec::new()
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("the account key isn't a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),

    #[error("error building the http client \n{0}")]
    Client(#[source] reqwest::Error),

    #[error("error fetching bus stops at $skip={skip} \n{source}")]
    Http { skip: u64, source: reqwest::Error },

    #[error("error parsing bus stops at $skip={skip} \n{source} \n{body}")]
    Parsing {
        skip: u64,
        source: serde_json::Error,
        body: String,
    },

    #[error("gave up after {pages} pages without getting an empty one")]
    PageLimitExceeded { pages: u64 },
}
