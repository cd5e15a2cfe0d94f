//! Image bytes over HTTP.
use std::path::PathBuf;
use std::time::Duration;

use hex_mosaic::prelude::*;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

/// Downloads references as URLs with a blocking client.
///
/// Anything but `200 OK` is a fetch error. Usually wrapped in a [`DiskCache`].
#[derive(Clone, Debug)]
pub struct HttpImages {
    client: Client,
}

impl HttpImages {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl ImageSource for HttpImages {
    fn load(&self, image: &ImageRef) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(image.as_str())
            .send()
            .map_err(|e| Error::fetch(image.as_str(), e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::fetch(
                image.as_str(),
                format!("status code {}", status.as_u16()),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::fetch(image.as_str(), e))?;
        debug!("Downloaded {image} ({} bytes).", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// `<user cache dir>/hex_mosaic/images`, falling back to the temp dir.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hex_mosaic")
        .join("images")
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Answers a single request with `response` and returns the URL to request.
    fn serve_once(path: &str, response: Vec<u8>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}{path}", listener.local_addr().expect("addr"));
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            while reader.read_line(&mut line).expect("read request") > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            stream.write_all(&response).expect("write response");
        });
        (url, handle)
    }

    fn local_client() -> HttpImages {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("client");
        HttpImages::from_client(client)
    }

    fn http_response(status: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn downloads_ok_responses() {
        let (url, server) = serve_once("/covers/1.png", http_response("200 OK", b"png-bytes"));
        let images = local_client();

        let bytes = images.load(&ImageRef::new(url)).expect("download");
        assert_eq!(bytes, b"png-bytes");
        server.join().expect("server thread");
    }

    #[test]
    fn non_ok_status_is_a_fetch_error() {
        let (url, server) = serve_once("/covers/2.png", http_response("404 Not Found", b""));
        let images = local_client();

        let err = images.load(&ImageRef::new(url)).expect_err("404");
        assert!(matches!(err, Error::Fetch { .. }));
        assert!(err.to_string().contains("status code 404"), "{err}");
        server.join().expect("server thread");
    }

    #[test]
    fn invalid_urls_are_fetch_errors() {
        let images = HttpImages::new().expect("client");
        assert!(matches!(
            images.load(&ImageRef::new("not a url")),
            Err(Error::Fetch { .. })
        ));
    }

    #[test]
    fn disk_cache_keeps_downloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (url, server) = serve_once("/covers/3.png", http_response("200 OK", b"cached"));
        let cache = DiskCache::new(dir.path(), local_client());
        let image = ImageRef::new(url);

        assert_eq!(cache.load(&image).expect("download"), b"cached");
        server.join().expect("server thread");
        // The server is gone; the second load must come from disk.
        assert_eq!(cache.load(&image).expect("cached"), b"cached");
        assert!(dir.path().join("3.png").is_file());
    }

    #[test]
    fn default_cache_dir_is_namespaced() {
        assert!(default_cache_dir().ends_with("hex_mosaic/images"));
    }
}
