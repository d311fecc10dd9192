use crate::e2e::helpers;

use chrono::{Duration, TimeZone, Utc};
use helpers::assertions::{assert_item_invariants, parse_feed};
use helpers::fixtures::{base_time, PENDING, PROCESSED};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_items_newest_first(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_processed("acme", &["A", "B", "C"])
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss").await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "application/rss+xml");

    let feed = parse_feed(&response.text());
    assert_eq!(feed.title, "RSS Feed for acme");
    assert_eq!(feed.titles(), vec!["C", "B", "A"]);
    for item in &feed.items {
        assert_item_invariants(item);
        assert_eq!(item.source, "Ocular8 Spider");
    }
    assert_eq!(feed.items[0].link, "https://acme.example/C");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_cap_items_at_limit(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_processed("acme", &["A", "B", "C"])
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss?limit=2").await.unwrap();

    response.assert_status(StatusCode::OK);
    let feed = parse_feed(&response.text());
    assert_eq!(feed.titles(), vec!["C", "B"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_use_first_limit_when_repeated(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_processed("acme", &["A", "B", "C"])
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss?limit=2&limit=5").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(parse_feed(&response.text()).titles(), vec!["C", "B"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_replace_characters_xml_cannot_carry(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_item(
            "acme",
            "https://acme.example/1",
            "Bad\u{1}\u{b}title",
            base_time(),
            PROCESSED,
        )
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss").await.unwrap();

    response.assert_status(StatusCode::OK);
    let xml = response.text();
    assert!(!xml.contains('\u{1}') && !xml.contains('\u{b}'));
    let feed = parse_feed(&xml);
    assert_eq!(feed.items[0].title, "Bad\u{FFFD}\u{FFFD}title");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_all_rows_when_limit_exceeds_them(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_processed("acme", &["A", "B", "C"])
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss?limit=10").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(parse_feed(&response.text()).items.len(), 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_default_to_fifty_items_for_unusable_limits(ctx: &TestContext) {
    ctx.fixtures.create_source("bulk").await.unwrap();
    ctx.fixtures.insert_many("bulk", 60).await.unwrap();

    for path in [
        "/bulk.rss",
        "/bulk.rss?limit=",
        "/bulk.rss?limit=0",
        "/bulk.rss?limit=-5",
        "/bulk.rss?limit=lots",
    ] {
        let response = ctx.client.get(path).await.unwrap();
        response.assert_status(StatusCode::OK);

        let feed = parse_feed(&response.text());
        assert_eq!(feed.items.len(), 50, "unexpected item count for {}", path);
        assert_eq!(feed.items[0].title, "item-59");
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_only_include_processed_rows(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    let t = base_time();
    ctx.fixtures
        .insert_item("acme", "https://acme.example/1", "Done", t, PROCESSED)
        .await
        .unwrap();
    ctx.fixtures
        .insert_item(
            "acme",
            "https://acme.example/2",
            "Queued",
            t + Duration::seconds(1),
            PENDING,
        )
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(parse_feed(&response.text()).titles(), vec!["Done"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_truncate_pub_dates_to_whole_seconds(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    let added = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 42).unwrap()
        + Duration::microseconds(987_654);
    ctx.fixtures
        .insert_item("acme", "https://acme.example/1", "Precise", added, PROCESSED)
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss").await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("last-modified", "Fri, 17 May 2024 09:30:42 +0000");
    let feed = parse_feed(&response.text());
    assert_eq!(feed.items[0].pub_date, "Fri, 17 May 2024 09:30:42 +0000");
    assert_item_invariants(&feed.items[0]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_set_last_modified_from_newest_item(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_processed("acme", &["A", "B", "C"])
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss").await.unwrap();

    // C was inserted two seconds after base_time()
    response.assert_header("last-modified", "Fri, 17 May 2024 09:30:02 +0000");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_empty_feed_with_zero_last_modified(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_item("acme", "https://acme.example/1", "Waiting", base_time(), PENDING)
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss").await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "application/rss+xml")
        .assert_header("last-modified", "Mon, 01 Jan 0001 00:00:00 +0000");
    let feed = parse_feed(&response.text());
    assert_eq!(feed.title, "RSS Feed for acme");
    assert!(feed.items.is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_missing_collection(ctx: &TestContext) {
    let response = ctx.client.get("/ghost.rss").await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Could not find RSS data for ghost");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unsafe_identifiers(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();

    for path in [
        "/.rss",
        "/acme%22%3B%20DROP%20TABLE%20acme%3B%20--.rss",
        "/acme%20OR%201%3D1.rss",
    ] {
        let response = ctx.client.get(path).await.unwrap();
        response.assert_status(StatusCode::NOT_FOUND);
    }

    // The table survived
    ctx.client
        .get("/acme.rss")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_without_rss_suffix(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();

    let response = ctx.client.get("/acme").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx.client.get("/acme.xml").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_with_server_error_on_malformed_rows(ctx: &TestContext) {
    ctx.fixtures.create_malformed_source("broken").await.unwrap();

    let response = ctx.client.get("/broken.rss").await.unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("Database error");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_escape_item_text(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_item(
            "acme",
            "https://acme.example/?a=1&b=2",
            "Fish & <Chips>",
            base_time(),
            PROCESSED,
        )
        .await
        .unwrap();

    let response = ctx.client.get("/acme.rss").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("Fish &amp; &lt;Chips&gt;"));
    let feed = parse_feed(&response.text());
    assert_eq!(feed.items[0].title, "Fish & <Chips>");
    assert_eq!(feed.items[0].link, "https://acme.example/?a=1&b=2");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_produce_identical_bodies_for_identical_requests(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_processed("acme", &["A", "B", "C"])
        .await
        .unwrap();

    let first = ctx.client.get("/acme.rss?limit=2").await.unwrap();
    let second = ctx.client.get("/acme.rss?limit=2").await.unwrap();

    assert_eq!(first.body_bytes, second.body_bytes);
    assert_eq!(first.header("last-modified"), second.header("last-modified"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_concurrent_requests_independently(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures
        .insert_processed("acme", &["A", "B", "C"])
        .await
        .unwrap();

    let requests = (0..20).map(|i| {
        let client = ctx.client.clone();
        let path = if i % 2 == 0 { "/acme.rss" } else { "/ghost.rss" };
        async move { (path, client.get(path).await.unwrap()) }
    });
    let responses = futures::future::join_all(requests).await;

    for (path, response) in responses {
        if path == "/acme.rss" {
            response.assert_status(StatusCode::OK);
            assert_eq!(parse_feed(&response.text()).titles(), vec!["C", "B", "A"]);
        } else {
            response.assert_status(StatusCode::NOT_FOUND);
        }
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_hide_collections_outside_the_allow_list(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();
    ctx.fixtures.create_source("internal").await.unwrap();
    let client = ctx.client_with_allow_list(&["acme"]).await;

    client
        .get("/acme.rss")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    client
        .get("/internal.rss")
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_on_feed_responses(ctx: &TestContext) {
    ctx.fixtures.create_source("acme").await.unwrap();

    ctx.client
        .get("/acme.rss")
        .await
        .unwrap()
        .assert_header_exists("x-request-id");
    ctx.client
        .get("/ghost.rss")
        .await
        .unwrap()
        .assert_header_exists("x-request-id");
}
