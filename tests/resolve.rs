//! End-to-end resolution against a mocked provider site

use eightstream::{Config, EightStream, MediaType, StreamResult};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "tmdb-key";

fn play_page(file: &str, key: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><script src="/assets/player.js"></script></head>
<body>
<div id="player"></div>
<script>
    let pc = {{"file":"{file}","key":"{key}","poster":"/p.jpg"}};
    window.player = new Playerjs(pc);
</script>
</body>
</html>"#
    )
}

fn master_manifest() -> &'static str {
    "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080
1080/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1280x720
720/index.m3u8
"
}

fn provider(server: &MockServer) -> EightStream {
    let config = Config::default()
        .with_api_base(server.uri())
        .with_lookup_base(format!("{}/3", server.uri()));
    EightStream::new(config).unwrap()
}

async fn mount_lookup(server: &MockServer, kind: &str, id: &str, imdb_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/3/{kind}/{id}/external_ids")))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "imdb_id": imdb_id,
            "tvdb_id": null
        })))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, native_id: &str, playlist: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/play/{native_id}")))
        .and(header("dnt", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(play_page("/pl/abc", "tok")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pl/abc"))
        .and(header("X-CSRF-TOKEN", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist))
        .mount(server)
        .await;
}

async fn mount_link(server: &MockServer, file: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/playlist/{file}.txt")))
        .and(header("X-CSRF-TOKEN", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_manifest(server: &MockServer, manifest_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(manifest_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

fn movie_playlist() -> Value {
    json!([
        {"title": "English", "file": "/f1"},
        {"title": "French", "file": "/f2"}
    ])
}

#[tokio::test]
async fn movie_master_manifest_lists_variants() {
    let server = MockServer::start().await;
    mount_lookup(&server, "movie", "42", "tt123").await;
    mount_page(&server, "tt123", movie_playlist()).await;
    mount_link(&server, "f1", format!("{}/cdn/x.m3u8", server.uri())).await;
    mount_manifest(&server, "/cdn/x.m3u8", master_manifest()).await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;

    assert_eq!(
        streams,
        vec![
            StreamResult::new(format!("{}/cdn/1080/index.m3u8", server.uri()), "1080p"),
            StreamResult::new(format!("{}/cdn/720/index.m3u8", server.uri()), "720p"),
        ]
    );
    assert!(streams.iter().all(|s| s.provider == "eightstream"));
}

#[tokio::test]
async fn missing_api_key_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider(&server);
    assert!(provider.get_streams("42", MediaType::Movie, None, None, None).await.is_empty());
    assert!(provider.get_streams("42", MediaType::Movie, None, None, Some("")).await.is_empty());
}

#[tokio::test]
async fn unknown_season_gives_no_streams() {
    let server = MockServer::start().await;
    mount_lookup(&server, "tv", "1399", "tt0944947").await;
    mount_page(
        &server,
        "tt0944947",
        json!([{"id": "1", "folder": [
            {"episode": "1", "folder": [{"title": "English", "file": "/s1e1"}]}
        ]}]),
    )
    .await;

    let streams = provider(&server)
        .get_streams("1399", MediaType::Tv, Some(2), Some(1), Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

#[tokio::test]
async fn series_episode_resolves() {
    let server = MockServer::start().await;
    mount_lookup(&server, "tv", "1399", "tt0944947").await;
    mount_page(
        &server,
        "tt0944947",
        json!([
            {"id": "1", "folder": [
                {"episode": "1", "folder": [{"title": "English", "file": "~s1e1"}]},
                {"episode": "2", "folder": [
                    {"title": "Russian", "file": "~s1e2ru"},
                    {"title": "English", "file": "~s1e2en"}
                ]}
            ]}
        ]),
    )
    .await;
    mount_link(&server, "s1e2en", format!("{}/cdn/s1e2.m3u8\n", server.uri())).await;
    mount_manifest(&server, "/cdn/s1e2.m3u8", master_manifest()).await;

    let streams = provider(&server)
        .get_streams("1399", MediaType::Tv, Some(1), Some(2), Some(API_KEY))
        .await;
    let qualities: Vec<&str> = streams.iter().map(|s| s.quality.as_str()).collect();
    assert_eq!(qualities, ["1080p", "720p"]);
}

#[tokio::test]
async fn non_hls_content_is_a_direct_link() {
    let server = MockServer::start().await;
    mount_lookup(&server, "movie", "42", "tt123").await;
    mount_page(&server, "tt123", movie_playlist()).await;
    let manifest_url = format!("{}/cdn/video", server.uri());
    mount_link(&server, "f1", manifest_url.clone()).await;
    mount_manifest(&server, "/cdn/video", "binary-ish payload, not a playlist").await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert_eq!(streams, vec![StreamResult::new(manifest_url, "Auto")]);
}

#[tokio::test]
async fn media_playlist_is_auto() {
    let server = MockServer::start().await;
    mount_lookup(&server, "movie", "42", "tt123").await;
    mount_page(&server, "tt123", movie_playlist()).await;
    let manifest_url = format!("{}/cdn/media.m3u8", server.uri());
    mount_link(&server, "f1", manifest_url.clone()).await;
    mount_manifest(
        &server,
        "/cdn/media.m3u8",
        "#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXTINF:6.0,\nseg0.ts\n#EXT-X-ENDLIST\n",
    )
    .await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert_eq!(streams, vec![StreamResult::new(manifest_url, "Auto")]);
}

#[tokio::test]
async fn manifest_link_that_is_not_a_url_fails() {
    let server = MockServer::start().await;
    mount_lookup(&server, "movie", "42", "tt123").await;
    mount_page(&server, "tt123", movie_playlist()).await;
    mount_link(&server, "f1", "<html>session expired</html>".to_string()).await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

#[tokio::test]
async fn playlist_that_is_not_json_fails() {
    let server = MockServer::start().await;
    mount_lookup(&server, "movie", "42", "tt123").await;
    Mock::given(method("GET"))
        .and(path("/play/tt123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(play_page("/pl/abc", "tok")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pl/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Forbidden</h1>"))
        .mount(&server)
        .await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

#[tokio::test]
async fn failed_lookup_gives_no_streams() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/42/external_ids"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"status_message": "Invalid API key"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/play/tt123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

async fn mount_unreachable_page(server: &MockServer, native_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/play/{native_id}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn lookup_body_that_is_not_json_gives_no_streams() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/42/external_ids"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    mount_unreachable_page(&server, "tt123").await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

#[tokio::test]
async fn lookup_without_imdb_id_gives_no_streams() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/42/external_ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "imdb_id": null})))
        .mount(&server)
        .await;
    mount_unreachable_page(&server, "tt123").await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

#[tokio::test]
async fn series_without_episode_makes_no_site_requests() {
    let server = MockServer::start().await;
    mount_lookup(&server, "tv", "1399", "tt0944947").await;
    mount_unreachable_page(&server, "tt0944947").await;

    let streams = provider(&server)
        .get_streams("1399", MediaType::Tv, Some(1), None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

#[tokio::test]
async fn slow_response_is_cut_off_by_timeout() {
    let server = MockServer::start().await;
    mount_lookup(&server, "movie", "42", "tt123").await;
    Mock::given(method("GET"))
        .and(path("/play/tt123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(play_page("/pl/abc", "tok"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = Config::default()
        .with_api_base(server.uri())
        .with_lookup_base(format!("{}/3", server.uri()))
        .with_timeout(Duration::from_millis(200));
    let provider = EightStream::new(config).unwrap();

    let started = Instant::now();
    let streams = provider
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
    assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
}

#[tokio::test]
async fn page_error_status_gives_no_streams() {
    let server = MockServer::start().await;
    mount_lookup(&server, "movie", "42", "tt123").await;
    Mock::given(method("GET"))
        .and(path("/play/tt123"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let streams = provider(&server)
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;
    assert!(streams.is_empty());
}

#[tokio::test]
async fn requests_go_through_the_proxy() {
    let server = MockServer::start().await;
    let site = "https://site.invalid";
    let proxy = format!("{}/proxy?url=", server.uri());

    let routes = [
        (
            "https://tmdb.invalid/3/movie/42/external_ids?api_key=tmdb-key".to_string(),
            ResponseTemplate::new(200).set_body_json(json!({"imdb_id": "tt123"})),
        ),
        (
            format!("{site}/play/tt123"),
            ResponseTemplate::new(200).set_body_string(play_page("/pl/abc", "tok")),
        ),
        (
            format!("{site}/pl/abc"),
            ResponseTemplate::new(200).set_body_json(movie_playlist()),
        ),
        (
            format!("{site}/playlist/f1.txt"),
            ResponseTemplate::new(200).set_body_string("https://cdn.invalid/x.m3u8"),
        ),
        (
            "https://cdn.invalid/x.m3u8".to_string(),
            ResponseTemplate::new(200).set_body_string(master_manifest()),
        ),
    ];
    for (target, response) in routes {
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .and(query_param("url", target.as_str()))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = Config::default()
        .with_api_base(site)
        .with_lookup_base("https://tmdb.invalid/3")
        .with_proxy(Some(proxy));
    let streams = EightStream::new(config)
        .unwrap()
        .get_streams("42", MediaType::Movie, None, None, Some(API_KEY))
        .await;

    assert_eq!(
        streams,
        vec![
            StreamResult::new("https://cdn.invalid/1080/index.m3u8", "1080p"),
            StreamResult::new("https://cdn.invalid/720/index.m3u8", "720p"),
        ]
    );
}
