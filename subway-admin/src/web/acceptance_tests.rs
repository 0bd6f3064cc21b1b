//! End-to-end tests driving the router over real HTTP.

use chrono::NaiveTime;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use super::*;
use crate::domain::StationId;
use crate::store::{SnapshotFile, SubwayStore};

/// Serve a router over an ephemeral port and return its base URL.
async fn spawn_app(store: SubwayStore) -> String {
    let app = create_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

struct TestClient {
    base: String,
    http: Client,
}

impl TestClient {
    async fn new() -> Self {
        Self::with_store(SubwayStore::in_memory()).await
    }

    async fn with_store(store: SubwayStore) -> Self {
        Self {
            base: spawn_app(store).await,
            http: Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.http
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.http
            .put(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap()
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.http
            .delete(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap()
    }

    async fn create_station(&self, name: &str) -> StationResponse {
        let resp = self.post("/stations", json!({ "name": name })).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }

    async fn create_line(&self, name: &str) -> LineResponse {
        let resp = self.post("/lines", line_body(name)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }

    async fn create_line_station(
        &self,
        line_id: u64,
        station_id: &str,
        pre_station_id: &str,
    ) -> reqwest::Response {
        self.post(
            &format!("/lines/{line_id}/stations"),
            json!({
                "stationId": station_id,
                "preStationId": pre_station_id,
                "distance": "10",
                "duration": "10",
            }),
        )
        .await
    }

    async fn stations(&self) -> Vec<StationResponse> {
        let resp = self.get("/stations").await;
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }

    async fn lines(&self) -> Vec<LineResponse> {
        let resp = self.get("/lines").await;
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }

    async fn line_stations(&self, line_id: u64) -> Vec<LineStationResponse> {
        let resp = self.get(&format!("/lines/{line_id}/stations")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }
}

/// Form-style line body, every value a string.
fn line_body(name: &str) -> Value {
    json!({
        "name": name,
        "startTime": "05:30",
        "endTime": "23:30",
        "intervalTime": "10",
        "backgroundColor": "bg-red-800",
    })
}

fn station_ids(entries: &[LineStationResponse]) -> Vec<u64> {
    entries.iter().map(|e| e.station_id.0).collect()
}

#[tokio::test]
async fn health() {
    let client = TestClient::new().await;
    let resp = client.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn manage_stations() {
    let client = TestClient::new().await;
    for name in ["Jamsil", "Sports Complex", "Seolleung", "Gangnam"] {
        client.create_station(name).await;
    }

    let stations = client.stations().await;
    assert_eq!(stations.len(), 4);
    assert_eq!(client.stations().await, stations);

    let resp = client
        .delete(&format!("/stations/{}", stations[0].id))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(client.stations().await.len(), 3);
}

#[tokio::test]
async fn duplicate_station_name_is_bad_request() {
    let client = TestClient::new().await;
    client.create_station("Jonggak").await;

    let resp = client.post("/stations", json!({ "name": "Jonggak" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.error.contains("Jonggak"));

    assert_eq!(client.stations().await.len(), 1);
}

#[tokio::test]
async fn create_station_sets_location() {
    let client = TestClient::new().await;
    let resp = client.post("/stations", json!({ "name": "Jamsil" })).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        resp.headers().get(reqwest::header::LOCATION).unwrap(),
        "/stations/1"
    );
}

#[tokio::test]
async fn delete_missing_station_is_not_found() {
    let client = TestClient::new().await;
    let resp = client.delete("/stations/99").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_are_bad_request() {
    let client = TestClient::new().await;

    let resp = client
        .http
        .post(format!("{}/stations", client.base))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.post("/stations", json!({ "name": "   " })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut body = line_body("Line 1");
    body["intervalTime"] = json!("ten");
    let resp = client.post("/lines", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn line_round_trip() {
    let client = TestClient::new().await;
    let created = client.create_line("Line 1").await;

    let lines = client.lines().await;
    assert_eq!(lines.len(), 1);

    let resp = client.get(&format!("/lines/{}", lines[0].id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let line: LineResponse = resp.json().await.unwrap();

    assert_eq!(line, created);
    assert_eq!(line.name, "Line 1");
    assert_eq!(line.start_time, NaiveTime::from_hms_opt(5, 30, 0).unwrap());
    assert_eq!(line.end_time, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    assert_eq!(line.interval_time, 10);
    assert_eq!(line.background_color, "bg-red-800");
    assert_eq!(line.created_at, line.updated_at);
    assert!(line.stations.is_empty());
}

#[tokio::test]
async fn missing_line_is_not_found() {
    let client = TestClient::new().await;
    assert_eq!(client.get("/lines/7").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        client.get("/lines/7/stations").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn update_line() {
    let client = TestClient::new().await;
    let created = client.create_line("Line 1").await;

    let mut body = line_body("Line 1 Express");
    body["intervalTime"] = json!(4);
    body["backgroundColor"] = json!("bg-blue-600");
    let resp = client.put(&format!("/lines/{}", created.id), body).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: LineResponse = resp.json().await.unwrap();
    assert_eq!(updated.name, "Line 1 Express");
    assert_eq!(updated.interval_time, 4);
    assert_eq!(updated.background_color, "bg-blue-600");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn duplicate_line_name_is_bad_request() {
    let client = TestClient::new().await;
    client.create_line("Line 1").await;
    let resp = client.post("/lines", line_body("Line 1")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manage_line_stations() {
    let client = TestClient::new().await;
    for name in ["Jamsil", "Sports Complex", "Seolleung", "Gangnam"] {
        client.create_station(name).await;
    }
    client.create_line("Line 1").await;

    let lines = client.lines().await;
    let line_id = lines[0].id.0;

    let resp = client.create_line_station(line_id, "2", "1").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = client.create_line_station(line_id, "3", "2").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let entries = client.line_stations(line_id).await;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].station_id, StationId(1));
    assert_eq!(station_ids(&entries), vec![1, 2, 3]);

    let resp = client
        .delete(&format!("/lines/{line_id}/stations/{}", entries[0].station_id))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let rest = client.line_stations(line_id).await;
    assert_eq!(rest.len(), 2);
    assert_eq!(station_ids(&rest), vec![2, 3]);
    assert_eq!(rest[0].pre_station_id, None);
    assert_eq!(rest[1].pre_station_id, Some(StationId(2)));
}

#[tokio::test]
async fn line_view_lists_stations_in_order() {
    let client = TestClient::new().await;
    for name in ["Jamsil", "Sports Complex", "Seolleung"] {
        client.create_station(name).await;
    }
    let line = client.create_line("Line 2").await;
    let line_id = line.id.0;

    client.create_line_station(line_id, "3", "1").await;
    client.create_line_station(line_id, "2", "1").await;

    let resp = client.get(&format!("/lines/{line_id}")).await;
    let line: LineResponse = resp.json().await.unwrap();
    let names: Vec<_> = line.stations.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Jamsil", "Sports Complex", "Seolleung"]);
}

#[tokio::test]
async fn add_line_station_returns_entry() {
    let client = TestClient::new().await;
    client.create_station("Jamsil").await;
    client.create_station("Gangnam").await;
    let line = client.create_line("Line 2").await;

    let resp = client
        .post(
            &format!("/lines/{}/stations", line.id),
            json!({ "stationId": 2, "preStationId": 1, "distance": 7, "duration": 3 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        resp.headers().get(reqwest::header::LOCATION).unwrap(),
        &format!("/lines/{}/stations/2", line.id)
    );

    let entry: LineStationResponse = resp.json().await.unwrap();
    assert_eq!(
        entry,
        LineStationResponse {
            station_id: StationId(2),
            pre_station_id: Some(StationId(1)),
            distance: 7,
            duration: 3,
        }
    );
}

#[tokio::test]
async fn head_insert_without_predecessor() {
    let client = TestClient::new().await;
    client.create_station("Jamsil").await;
    let line = client.create_line("Line 2").await;

    let resp = client
        .post(
            &format!("/lines/{}/stations", line.id),
            json!({ "stationId": 1, "distance": 0, "duration": 0 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let entries = client.line_stations(line.id.0).await;
    assert_eq!(station_ids(&entries), vec![1]);
    assert_eq!(entries[0].pre_station_id, None);
}

#[tokio::test]
async fn line_station_reference_errors() {
    let client = TestClient::new().await;
    for name in ["Jamsil", "Sports Complex", "Seolleung", "Gangnam"] {
        client.create_station(name).await;
    }
    let line_id = client.create_line("Line 1").await.id.0;
    client.create_line_station(line_id, "2", "1").await;

    // Predecessor exists as a station but is not on the line
    let resp = client.create_line_station(line_id, "4", "3").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Predecessor that is not a station at all
    let resp = client.create_line_station(line_id, "4", "99").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Station already on the line
    let resp = client.create_line_station(line_id, "1", "2").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown station
    let resp = client.create_line_station(line_id, "99", "2").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Unknown line
    let resp = client.create_line_station(99, "3", "2").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Removing a station that is not on the line
    let resp = client
        .delete(&format!("/lines/{line_id}/stations/4"))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(station_ids(&client.line_stations(line_id).await), vec![1, 2]);
}

#[tokio::test]
async fn deleting_station_detaches_it_from_lines() {
    let client = TestClient::new().await;
    for name in ["Jamsil", "Sports Complex", "Seolleung"] {
        client.create_station(name).await;
    }
    let line_id = client.create_line("Line 2").await.id.0;
    client.create_line_station(line_id, "2", "1").await;
    client.create_line_station(line_id, "3", "2").await;

    let resp = client.delete("/stations/2").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let entries = client.line_stations(line_id).await;
    assert_eq!(station_ids(&entries), vec![1, 3]);
    assert_eq!(entries[1].pre_station_id, Some(StationId(1)));
    assert_eq!(entries[1].distance, 20);
}

#[tokio::test]
async fn deleting_line_drops_its_stations() {
    let client = TestClient::new().await;
    client.create_station("Jamsil").await;
    client.create_station("Gangnam").await;
    let line_id = client.create_line("Line 2").await.id.0;
    client.create_line_station(line_id, "2", "1").await;

    let resp = client.delete(&format!("/lines/{line_id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert!(client.lines().await.is_empty());
    assert_eq!(
        client.get(&format!("/lines/{line_id}/stations")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(client.stations().await.len(), 2);
}

#[tokio::test]
async fn records_survive_restart_with_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subway.json");

    let client = TestClient::with_store(SubwayStore::open(SnapshotFile::new(&path)).unwrap()).await;
    client.create_station("Jamsil").await;
    client.create_station("Gangnam").await;
    let line_id = client.create_line("Line 2").await.id.0;
    client.create_line_station(line_id, "2", "1").await;

    let restarted =
        TestClient::with_store(SubwayStore::open(SnapshotFile::new(&path)).unwrap()).await;
    assert_eq!(restarted.stations().await.len(), 2);
    assert_eq!(
        station_ids(&restarted.line_stations(line_id).await),
        vec![1, 2]
    );
    let station = restarted.create_station("Seolleung").await;
    assert_eq!(station.id, StationId(3));
}
