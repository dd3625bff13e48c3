use deepdig_lobby::{LobbyError, LobbySession, MemoryRoomStore, RoomRecord, RoomStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:7878";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = std::env::var("DEEPDIG_WEB_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let server = match Server::http(addr.as_str()) {
        Ok(server) => server,
        Err(err) => {
            eprintln!("cannot listen on {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!(%addr, "lobby host listening");
    let state = Arc::new(Mutex::new(AppState::default()));
    for request in server.incoming_requests() {
        let state = state.clone();
        if let Err(err) = handle_request(request, state) {
            warn!("request error: {err}");
        }
    }
}

#[derive(Debug, Default)]
struct AppState {
    store: MemoryRoomStore,
}

#[derive(Debug, Deserialize)]
struct CreateRoomRequest {
    host_name: String,
}

#[derive(Debug, Serialize)]
struct CreatedRoom {
    code: String,
    participant_id: String,
    room: RoomRecord,
}

/// Status code plus JSON body. Kept apart from the socket so routes can be
/// exercised directly.
#[derive(Debug, PartialEq)]
struct Reply {
    status: u16,
    body: Value,
}

impl Reply {
    fn ok(body: impl Serialize) -> Self {
        Self::with_status(200, body)
    }

    fn with_status(status: u16, body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(err) => Self::error(500, err.to_string()),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            status,
            body: serde_json::json!({ "error": message }),
        }
    }

    fn lobby(err: LobbyError) -> Self {
        let status = match err {
            LobbyError::RoomUnavailable(_) => 404,
            LobbyError::StaleWrite(_) => 409,
            LobbyError::EmptyName => 400,
            _ => 422,
        };
        Self::error(status, err.to_string())
    }
}

fn handle_request(
    mut request: tiny_http::Request,
    state: Arc<Mutex<AppState>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let method = request.method().clone();
    let url = request.url().to_string();
    let mut body = String::new();
    if matches!(method, Method::Post | Method::Put) {
        request.as_reader().read_to_string(&mut body)?;
    }
    let reply = {
        let mut guard = state.lock().map_err(|_| "state lock poisoned")?;
        route(&mut guard.store, &method, &url, &body)
    };
    info!(%method, %url, status = reply.status, "request");
    respond_json(request, reply)
}

fn route(store: &mut dyn RoomStore, method: &Method, url: &str, body: &str) -> Reply {
    let path = url.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        (Method::Get, ["api", "rooms"]) => Reply::ok(store.summaries()),
        (Method::Post, ["api", "rooms"]) => create_room(store, body),
        (Method::Get, ["api", "rooms", code]) => match store.get(&code.to_ascii_uppercase()) {
            Some(record) => Reply::ok(record),
            None => Reply::error(404, format!("room {code} not found")),
        },
        (Method::Put, ["api", "rooms", code]) => put_room(store, code, body),
        (Method::Delete, ["api", "rooms", code]) => match store.remove(&code.to_ascii_uppercase())
        {
            Some(record) => Reply::ok(record.summary()),
            None => Reply::error(404, format!("room {code} not found")),
        },
        _ => Reply::error(404, "no such route"),
    }
}

fn create_room(store: &mut dyn RoomStore, body: &str) -> Reply {
    let request: CreateRoomRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(err) => return Reply::error(400, err.to_string()),
    };
    let mut host = LobbySession::with_entropy(&request.host_name);
    let code = match host.create_room(store) {
        Ok(code) => code,
        Err(err) => return Reply::lobby(err),
    };
    match store.get(&code) {
        Some(room) => Reply::with_status(
            201,
            CreatedRoom {
                code,
                participant_id: host.id().to_string(),
                room,
            },
        ),
        None => Reply::error(500, format!("room {code} vanished after creation")),
    }
}

fn put_room(store: &mut dyn RoomStore, code: &str, body: &str) -> Reply {
    let record: RoomRecord = match serde_json::from_str(body) {
        Ok(record) => record,
        Err(err) => return Reply::error(400, err.to_string()),
    };
    if !record.code.eq_ignore_ascii_case(code) {
        return Reply::error(400, format!("body is for room {}", record.code));
    }
    if !store.contains(&record.code) {
        return Reply::error(404, format!("room {code} not found"));
    }
    match store.put(record.clone()) {
        Ok(()) => Reply::ok(record),
        Err(err) => Reply::lobby(err),
    }
}

fn respond_json(
    request: tiny_http::Request,
    reply: Reply,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_vec_pretty(&reply.body)?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| "invalid content type header")?;
    let response = Response::from_data(body)
        .with_header(header)
        .with_status_code(StatusCode(reply.status));
    request.respond(response)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepdig_lobby::{ManualClock, ROOM_TTL_MILLIS};

    fn store_at(clock: &ManualClock) -> MemoryRoomStore {
        MemoryRoomStore::new(Arc::new(clock.clone()))
    }

    fn create(store: &mut MemoryRoomStore, host: &str) -> String {
        let body = format!(r#"{{"host_name": "{host}"}}"#);
        let reply = route(store, &Method::Post, "/api/rooms", &body);
        assert_eq!(reply.status, 201);
        reply.body["code"].as_str().expect("code").to_string()
    }

    #[test]
    fn created_room_is_listed_and_fetched() {
        let clock = ManualClock::new(5_000);
        let mut store = store_at(&clock);
        let code = create(&mut store, "Ada");

        let list = route(&mut store, &Method::Get, "/api/rooms", "");
        assert_eq!(list.status, 200);
        assert_eq!(list.body[0]["code"], code.as_str());
        assert_eq!(list.body[0]["host_name"], "Ada");

        let url = format!("/api/rooms/{}", code.to_ascii_lowercase());
        let room = route(&mut store, &Method::Get, &url, "");
        assert_eq!(room.status, 200);
        assert_eq!(room.body["game_state"], "waiting");
    }

    #[test]
    fn stale_writes_conflict() {
        let clock = ManualClock::new(5_000);
        let mut store = store_at(&clock);
        let code = create(&mut store, "Ada");
        let mut record = store.get(&code).expect("room");
        let url = format!("/api/rooms/{code}");

        record.last_update += 10;
        let newer = serde_json::to_string(&record).expect("json");
        assert_eq!(route(&mut store, &Method::Put, &url, &newer).status, 200);

        record.last_update -= 5;
        let older = serde_json::to_string(&record).expect("json");
        assert_eq!(route(&mut store, &Method::Put, &url, &older).status, 409);
    }

    #[test]
    fn put_must_match_the_path() {
        let clock = ManualClock::new(5_000);
        let mut store = store_at(&clock);
        let code = create(&mut store, "Ada");
        let record = store.get(&code).expect("room");
        let body = serde_json::to_string(&record).expect("json");
        let reply = route(&mut store, &Method::Put, "/api/rooms/ZZZZZZ", &body);
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn expired_and_deleted_rooms_are_not_found() {
        let clock = ManualClock::new(5_000);
        let mut store = store_at(&clock);
        let first = create(&mut store, "Ada");
        let second = create(&mut store, "Bo");

        let url = format!("/api/rooms/{first}");
        assert_eq!(route(&mut store, &Method::Delete, &url, "").status, 200);
        assert_eq!(route(&mut store, &Method::Get, &url, "").status, 404);

        clock.advance(ROOM_TTL_MILLIS + 1);
        let url = format!("/api/rooms/{second}");
        assert_eq!(route(&mut store, &Method::Delete, &url, "").status, 404);
        assert_eq!(route(&mut store, &Method::Get, &url, "").status, 404);
    }

    #[test]
    fn rejects_bad_requests() {
        let mut store = MemoryRoomStore::default();
        assert_eq!(route(&mut store, &Method::Post, "/api/rooms", "{").status, 400);
        let blank = route(&mut store, &Method::Post, "/api/rooms", r#"{"host_name": " "}"#);
        assert_eq!(blank.status, 400);
        assert_eq!(route(&mut store, &Method::Get, "/nope", "").status, 404);
    }
}
