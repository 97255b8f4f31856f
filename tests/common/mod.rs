//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use wechatmp2markdown::fetch::ImageSource;

/// Saved article page used by several tests.
pub const ARTICLE_PAGE: &str = include_str!("../fixtures/article.html");

/// Image source that records every request and answers with fixed bytes.
pub struct CountingSource {
    pub calls: RefCell<Vec<String>>,
    pub body: Option<Vec<u8>>,
}

impl CountingSource {
    pub fn answering(body: &[u8]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            body: Some(body.to_vec()),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            body: None,
        }
    }

    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ImageSource for CountingSource {
    fn acquire(&self, url: &str) -> Option<Vec<u8>> {
        self.calls.borrow_mut().push(url.to_string());
        self.body.clone()
    }
}

/// A route of the stub server: path, status code, body.
pub type Route = (String, u16, Vec<u8>);

/// Serve the routes built by `routes` over HTTP/1.1 on a local port until
/// the test process exits. `routes` receives the base URL. Unknown paths
/// answer 404. Returns the base URL.
pub fn serve(routes: impl FnOnce(&str) -> Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    let routes = routes(&base);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let request = String::from_utf8_lossy(&request);
            let path = request.split_whitespace().nth(1).unwrap_or("/");
            let (status, body) = routes
                .iter()
                .find(|(route, _, _)| *route == path)
                .map_or((404, Vec::new()), |(_, status, body)| (*status, body.clone()));

            let head = format!(
                "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                if status == 200 { "OK" } else { "Not Found" },
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });

    base
}
