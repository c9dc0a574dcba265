use super::rand_data;

use url::form_urlencoded;
use warp::http::StatusCode;
use warp::{filters::BoxedFilter, Filter, Reply};

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

/// A request as the handset decoded it
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub raw: String,
    pub params: HashMap<String, String>,
}

impl Request {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Stand-in for a handset's `/index.cgi`
#[derive(Debug, Clone)]
pub struct SimulatedHandset {
    inner: Arc<HandsetRef>,
}

#[derive(Debug)]
struct HandsetRef {
    username: String,
    password: String,
    /// Item codes answered with status 500
    rejected: HashSet<String>,
    sessions: RwLock<HashSet<String>>,
    items: RwLock<HashMap<String, String>>,
    assigned: RwLock<HashMap<String, String>>,
    logoffs: RwLock<u32>,
    reboots: RwLock<u32>,
    requests: RwLock<Vec<Request>>,
    cert: String,
    pkey: String,
}

impl SimulatedHandset {
    pub fn new() -> Self {
        Self::with_credentials(necsip::DEFAULT_USERNAME, necsip::DEFAULT_PASSWORD)
    }

    pub fn with_credentials(username: &str, password: &str) -> Self {
        Self::build(username, password, HashSet::new())
    }

    /// Handset answering writes to `codes` with status 500
    pub fn rejecting(codes: &[&str]) -> Self {
        Self::build(
            necsip::DEFAULT_USERNAME,
            necsip::DEFAULT_PASSWORD,
            codes.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn build(username: &str, password: &str, rejected: HashSet<String>) -> Self {
        let cert = rcgen::generate_simple_self_signed(vec![
            "127.0.0.1".to_string(),
            "localhost".to_string(),
        ])
        .unwrap();
        let pkey = cert.serialize_private_key_pem();
        let cert = cert.serialize_pem().unwrap();

        Self {
            inner: Arc::new(HandsetRef {
                username: username.to_string(),
                password: password.to_string(),
                rejected,
                sessions: RwLock::new(HashSet::new()),
                items: RwLock::new(HashMap::new()),
                assigned: RwLock::new(HashMap::new()),
                logoffs: RwLock::new(0),
                reboots: RwLock::new(0),
                requests: RwLock::new(Vec::new()),
                cert,
                pkey,
            }),
        }
    }

    /// Serve plain http on an ephemeral port
    pub fn serve(&self) -> SocketAddr {
        let (addr, server) = warp::serve(self.api()).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    /// Serve https with a self-signed certificate on an ephemeral port
    pub fn serve_tls(&self) -> SocketAddr {
        let (addr, server) = warp::serve(self.api())
            .tls()
            .key(self.inner.pkey.clone())
            .cert(self.inner.cert.clone())
            .bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    pub fn requests(&self) -> Vec<Request> {
        self.inner.requests.read().unwrap().clone()
    }

    pub fn item(&self, code: &str) -> Option<String> {
        self.inner.items.read().unwrap().get(code).cloned()
    }

    pub fn assigned(&self, key: &str) -> Option<String> {
        self.inner.assigned.read().unwrap().get(key).cloned()
    }

    pub fn logoffs(&self) -> u32 {
        *self.inner.logoffs.read().unwrap()
    }

    pub fn reboots(&self) -> u32 {
        *self.inner.reboots.read().unwrap()
    }

    pub fn open_sessions(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    fn api(&self) -> BoxedFilter<(impl Reply,)> {
        let handset = self.clone();
        warp::path("index.cgi")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::query::raw())
            .map(move |raw: String| {
                let (status, body) = handset.respond(raw);
                warp::reply::with_status(warp::reply::html(body), status)
            })
            .boxed()
    }

    fn respond(&self, raw: String) -> (StatusCode, String) {
        let params: HashMap<String, String> = form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect();
        let request = Request {
            raw,
            params: params.clone(),
        };
        log::info!(target: "test::handset", "GET /index.cgi?{}", request.raw);
        self.inner.requests.write().unwrap().push(request);

        if let (Some(username), Some(password)) = (params.get("username"), params.get("password")) {
            return self.login(username, password);
        }

        let session = match params.get("session") {
            Some(session) if self.inner.sessions.read().unwrap().contains(session) => session,
            Some(_) => return (StatusCode::FORBIDDEN, message_page!("Session expired")),
            None => return (StatusCode::BAD_REQUEST, message_page!("Bad request")),
        };

        match (params.get("set"), params.get("item")) {
            (Some(set), _) if set == "all" => {
                self.inner.sessions.write().unwrap().remove(session);
                *self.inner.logoffs.write().unwrap() += 1;
                (StatusCode::OK, message_page!("Saving configuration, restarting"))
            }
            (Some(code), Some(_)) if self.inner.rejected.contains(code) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                message_page!("Setting failed"),
            ),
            (Some(code), Some(value)) => {
                self.inner
                    .items
                    .write()
                    .unwrap()
                    .insert(code.clone(), value.clone());
                (StatusCode::OK, message_page!("OK"))
            }
            (Some(_), None) => (StatusCode::BAD_REQUEST, message_page!("Missing item")),
            (None, _) => {
                let mut assigned = self.inner.assigned.write().unwrap();
                for (key, value) in params.iter().filter(|(k, _)| k.as_str() != "session") {
                    assigned.insert(key.clone(), value.clone());
                }
                if params.contains_key("hard_reset") {
                    // Restart forgets every session
                    self.inner.sessions.write().unwrap().clear();
                    *self.inner.reboots.write().unwrap() += 1;
                    return (StatusCode::OK, message_page!("Restarting"));
                }
                (StatusCode::OK, message_page!("OK"))
            }
        }
    }

    fn login(&self, username: &str, password: &str) -> (StatusCode, String) {
        if username != self.inner.username || password != self.inner.password {
            return (StatusCode::OK, message_page!("Login failed"));
        }

        let token = rand_data::string(4);
        self.inner.sessions.write().unwrap().insert(token.clone());
        (StatusCode::OK, login_page!(token))
    }
}
