// tests/metrics_ranking.rs
#![cfg(feature = "strict-metrics")]
use chrono::NaiveDate;
use listing_ranker::{rank_payloads, Criterion, RankRequest};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;

#[test]
fn metrics_exposed_after_ranking() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    let ebay = json!({"items": [{"title": "a", "price": "N/A"}]});
    let amazon = json!({"products": [{"product_title": "b", "product_price": "$3.00",
        "product_delivery_info": "FREE delivery Dec 2"}]});
    let req = RankRequest::new(Criterion::Price, 2)
        .unwrap()
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 11, 28).unwrap());

    metrics::with_local_recorder(&recorder, || {
        rank_payloads(&ebay, &amazon, &req).unwrap();
    });

    let out = handle.render();
    assert!(out.contains("ingest_listings_total"));
    assert!(out.contains("ingest_price_unparsed_total"));
    assert!(out.contains("ingest_delivery_undated_total"));
    assert!(out.contains("engine_rank_requests_total"));
}
