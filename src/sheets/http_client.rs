use error_stack::{Result, ResultExt};
use google_sheets4::{hyper, hyper_rustls};
use thiserror::Error;

pub type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;

#[derive(Error, Debug)]
#[error("Failed to load native TLS root certificates")]
pub struct HttpClientError;

pub fn http_client() -> Result<hyper::Client<HttpsConnector>, HttpClientError> {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .change_context(HttpClientError)?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(hyper::Client::builder().build(connector))
}
