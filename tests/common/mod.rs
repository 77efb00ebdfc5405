#![allow(dead_code)]

use futures::{stream, StreamExt};
use reqwest::Client;
use std::{
    io,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use warp::{
    filters::BoxedFilter,
    http::{
        header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE},
        Method, StatusCode,
    },
    hyper::Body,
    path::FullPath,
    reply::Response,
    Filter, Rejection,
};

pub const HEADER: &str = "VIN,City,State,ModelYear,Make,Model,VehicleType,Latitude,Longitude";

pub fn init_logging() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Client that never routes loopback traffic through an ambient proxy.
pub fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// warp server on an ephemeral loopback port serving the dataset path.
pub struct TestServer {
    pub origin: Url,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Answer every GET of the dataset with `status` and `body`, recording
    /// each request line seen.
    pub async fn respond(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        let routes = warp::method()
            .and(warp::path::full())
            .map(move |method: Method, path: FullPath| {
                seen.lock().unwrap().push(format!("{} {}", method, path.as_str()));
            })
            .untuple_one()
            .and(warp::path!("data" / "ev_population.csv"))
            .map(move || csv_response(status, Body::from(body.clone())))
            .boxed();

        Self {
            origin: serve(routes),
            requests,
        }
    }

    pub async fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::respond(StatusCode::OK, body).await
    }

    /// Accepts the request but never answers.
    pub async fn stalled() -> Self {
        let routes = warp::path!("data" / "ev_population.csv")
            .and_then(futures::future::pending::<Result<Response, Rejection>>)
            .boxed();

        Self {
            origin: serve(routes),
            requests: Arc::default(),
        }
    }

    /// Declares a `Content-Length` 500 bytes past `body`, sends `body`, then
    /// drops the connection.
    pub async fn truncated(body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let routes = warp::path!("data" / "ev_population.csv")
            .map(move || {
                let declared = body.len() + 500;
                // the pause lets hyper flush head and first chunk before the
                // stream error tears the connection down
                let chunks = stream::iter(vec![Ok::<_, io::Error>(body.clone())]).chain(
                    stream::once(async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(io::Error::new(io::ErrorKind::ConnectionAborted, "dropped"))
                    }),
                );
                let mut resp = csv_response(StatusCode::OK, Body::wrap_stream(chunks));
                resp.headers_mut()
                    .insert(CONTENT_LENGTH, HeaderValue::from(declared));
                resp
            })
            .boxed();

        Self {
            origin: serve(routes),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn csv_response(status: StatusCode, body: Body) -> Response {
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    resp
}

fn serve(routes: BoxedFilter<(Response,)>) -> Url {
    let (addr, server): (SocketAddr, _) =
        warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    Url::parse(&format!("http://{}/", addr)).unwrap()
}

/// Origin on a loopback port nothing listens on.
pub async fn refused_origin() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/", addr)).unwrap()
}
