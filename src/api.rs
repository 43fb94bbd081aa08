use std::future::Future;

use anyhow::Context;
use log::{debug, info};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Request,
};
use scraper::Html;

use crate::{
    parser,
    schema::{AppId, PlayerStats, TitleListing},
    search_filter::SearchFilter,
    Error,
};

const STATS_URL: &str = "https://steamcharts.com/app";
const SESSION_COOKIE: &str = "sessionid=cd46137aee87759ca68f1347";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Number of search-result pages scraped per filter.
pub const LISTING_PAGES: u32 = 7;

/// Anything that can tell the live player counts of a title.
pub trait StatsSource {
    fn fetch_stats(&self, id: &AppId) -> impl Future<Output = Result<PlayerStats, Error>> + Send;
}

pub struct StorefrontClient {
    client: reqwest::Client,
}

impl StorefrontClient {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connection_verbose(true)
            .build()?;
        Ok(Self { client })
    }

    /// A GET request with the given query and headers.
    pub fn request(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Request, Error> {
        self.client
            .get(url)
            .query(query)
            .headers(headers)
            .build()
            .map_err(|source| Error::Transport {
                url: url.to_owned(),
                source,
            })
    }

    /// Sends the request and returns the response body.  A non-success
    /// status counts as a transport failure.
    pub async fn send(&self, request: Request) -> Result<String, Error> {
        let url = request.url().to_string();
        debug!("GET {url}");
        let transport = |source| Error::Transport {
            url: url.clone(),
            source,
        };
        self.client
            .execute(request)
            .await
            .and_then(|response| response.error_for_status())
            .map_err(transport)?
            .text()
            .await
            .map_err(transport)
    }

    pub async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<String, Error> {
        self.send(self.request(url, query, headers)?).await
    }

    /// Page `page` of the search at `url`, with the session cookie set.
    pub fn listing_page_request(&self, url: &str, page: u32) -> Result<Request, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(SESSION_COOKIE));
        self.request(url, &[("term", ""), ("page", &page.to_string())], headers)
    }

    pub async fn fetch_listing_page(
        &self,
        filter: SearchFilter,
        page: u32,
    ) -> Result<Vec<TitleListing>, Error> {
        self.fetch_listing_page_at(filter.url(), page).await
    }

    async fn fetch_listing_page_at(&self, url: &str, page: u32) -> Result<Vec<TitleListing>, Error> {
        let markup = self.send(self.listing_page_request(url, page)?).await?;
        extract(&format!("{url} (page {page})"), &markup, |html| {
            parser::listing::parse(html)
        })
    }

    /// Pages `1..=pages` of the filter's search, concatenated.
    pub async fn fetch_listing(
        &self,
        filter: SearchFilter,
        pages: u32,
    ) -> Result<Vec<TitleListing>, Error> {
        let listings = self.fetch_listing_at(filter.url(), pages).await?;
        info!(">>> fetched {} {filter} titles.", listings.len());
        Ok(listings)
    }

    async fn fetch_listing_at(&self, url: &str, pages: u32) -> Result<Vec<TitleListing>, Error> {
        let mut listings = vec![];
        for page in 1..=pages {
            let rows = self.fetch_listing_page_at(url, page).await?;
            debug!("{url}: page {page} has {} rows", rows.len());
            listings.extend(rows);
        }
        Ok(listings)
    }

    pub fn reqwest(&self) -> &reqwest::Client {
        &self.client
    }
}

impl StatsSource for StorefrontClient {
    async fn fetch_stats(&self, id: &AppId) -> Result<PlayerStats, Error> {
        let url = format!("{STATS_URL}/{id}");
        let markup = self.fetch(&url, &[], HeaderMap::new()).await?;
        extract(&url, &markup, |html| {
            parser::stats::parse(html)
                .with_context(|| format!("While reading the player counts of title {id}"))
        })
    }
}

/// Runs a parser over freshly fetched markup, tagging failures with the URL.
fn extract<T>(
    url: &str,
    markup: &str,
    parse: impl FnOnce(&Html) -> anyhow::Result<T>,
) -> Result<T, Error> {
    parse(&Html::parse_document(markup)).map_err(|cause| Error::Extraction {
        url: url.to_owned(),
        cause,
    })
}

#[cfg(test)]
mod tests {
    use reqwest::header::{self, HeaderMap};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::{extract, StorefrontClient, SESSION_COOKIE};
    use crate::{parser, schema::PlayerStats, search_filter::SearchFilter, Error};

    /// Answers `count` requests, one connection each, and hands back the
    /// request heads it received.
    async fn serve(
        count: usize,
        status: &'static str,
        body: impl Fn(usize) -> String + Send + 'static,
    ) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let mut heads = vec![];
            for i in 0..count {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut head = vec![];
                let mut buf = [0; 1024];
                while !head.ends_with(b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&buf[..n]);
                }
                heads.push(String::from_utf8(head).unwrap());
                let body = body(i);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            heads
        });
        (base, server)
    }

    fn results_page(id: usize) -> String {
        format!(
            r#"<html><body><div id="search_resultsRows"><a href="https://store.steampowered.com/app/{id}/" data-ds-appid="{id}"><div class="search_name">Game {id}</div></a></div></body></html>"#
        )
    }

    #[test]
    fn listing_request_has_query_and_cookie() {
        let client = StorefrontClient::new().unwrap();
        let request = client
            .listing_page_request(SearchFilter::Base.url(), 3)
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://store.steampowered.com/search/results?term=&page=3"
        );
        assert_eq!(
            request.headers()[header::COOKIE].to_str().unwrap(),
            SESSION_COOKIE
        );

        let request = client
            .listing_page_request(SearchFilter::PopularNew.url(), 1)
            .unwrap();
        assert!(request
            .url()
            .as_str()
            .ends_with("filter=popularnew&ndl=1&term=&page=1"));
    }

    #[tokio::test]
    async fn listing_pages_are_fetched_in_order() {
        let (base, server) = serve(7, "200 OK", |i| results_page(100 + i)).await;
        let client = StorefrontClient::new().unwrap();
        let listings = client
            .fetch_listing_at(&format!("{base}/search/results"), 7)
            .await
            .unwrap();
        let ids: Vec<_> = listings.iter().map(|x| x.id().to_string()).collect();
        assert_eq!(ids, ["100", "101", "102", "103", "104", "105", "106"]);

        let heads = server.await.unwrap();
        assert_eq!(heads.len(), 7);
        for (i, head) in heads.iter().enumerate() {
            let request_line = format!("GET /search/results?term=&page={} HTTP/1.1", i + 1);
            assert!(head.starts_with(&request_line), "{head}");
            assert!(head
                .to_ascii_lowercase()
                .contains(&format!("cookie: {SESSION_COOKIE}")));
        }
    }

    #[tokio::test]
    async fn error_status_is_transport_failure() {
        let (base, server) = serve(1, "503 Service Unavailable", |_| String::new()).await;
        let client = StorefrontClient::new().unwrap();
        let e = client
            .fetch(&format!("{base}/app/440"), &[], HeaderMap::new())
            .await
            .unwrap_err();
        match e {
            Error::Transport { url, source } => {
                assert_eq!(url, format!("{base}/app/440"));
                assert_eq!(source.status().map(|s| s.as_u16()), Some(503));
            }
            e => panic!("Unexpected error: {e}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unexpected_page_is_extraction_failure() {
        let (base, server) = serve(1, "200 OK", |_| "<html></html>".to_owned()).await;
        let client = StorefrontClient::new().unwrap();
        let e = client
            .fetch_listing_at(&format!("{base}/search/results"), 1)
            .await
            .unwrap_err();
        assert!(matches!(e, Error::Extraction { .. }), "{e}");
        server.await.unwrap();
    }

    #[test]
    fn extract_tags_url() {
        let e = extract("https://steamcharts.com/app/1", "<html></html>", |html| {
            parser::stats::parse(html)
        })
        .unwrap_err();
        match e {
            Error::Extraction { url, .. } => assert_eq!(url, "https://steamcharts.com/app/1"),
            e => panic!("Unexpected error: {e}"),
        }
    }

    #[test]
    fn extract_passes_value_through() {
        let markup = r#"<div class="app-stat"><span>3</span></div><div class="app-stat"><span>2</span></div><div class="app-stat"><span>1</span></div>"#;
        let stats = extract("x", markup, |html| parser::stats::parse(html)).unwrap();
        assert_eq!(stats, PlayerStats::new(3, 2, 1));
    }
}
