// tests/ranking_e2e.rs
use chrono::NaiveDate;
use listing_ranker::ingest::normalize_sources;
use listing_ranker::{rank_payloads, Criterion, DeliveryCost, Marketplace, RankError, RankRequest};
use serde_json::{json, Value};

fn fixture(name: &str) -> Value {
    let raw = std::fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture");
    serde_json::from_str(&raw).expect("fixture json")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 28).unwrap()
}

fn request(c: Criterion, n: usize) -> RankRequest {
    RankRequest::new(c, n).unwrap().with_reference_date(today())
}

fn ranked_titles(c: Criterion, n: usize) -> Vec<String> {
    let ebay = fixture("ebay_items.json");
    let amazon = fixture("amazon_products.json");
    rank_payloads(&ebay, &amazon, &request(c, n))
        .unwrap()
        .iter()
        .map(|l| l.title().to_string())
        .collect()
}

#[test]
fn two_source_price_scenario() {
    let ebay = json!({"items": [
        {"title": "New set", "price": "USD 25.00", "condition": "New"},
        {"title": "Used set", "price": "USD 60.00", "condition": "Used"}
    ]});
    let amazon = json!({"products": [
        {"product_title": "Rated set", "product_price": 12.99, "product_star_rating": "4.5"}
    ]});
    let out = rank_payloads(&ebay, &amazon, &request(Criterion::Price, 2)).unwrap();
    let got: Vec<(Marketplace, f64)> = out.iter().map(|l| (l.source(), l.ranking_price())).collect();
    assert_eq!(got, vec![(Marketplace::Amazon, 12.99), (Marketplace::Ebay, 25.0)]);
}

#[test]
fn fixtures_normalize_cleanly() {
    let listings =
        normalize_sources(&fixture("ebay_items.json"), &fixture("amazon_products.json"), today(), None)
            .unwrap();
    assert_eq!(listings.len(), 10);
    assert!(listings[..5].iter().all(|l| l.source() == Marketplace::Ebay));
    assert!(listings[5..].iter().all(|l| l.source() == Marketplace::Amazon));

    assert_eq!(listings[1].title(), "Vintage Red Ranger 1993");
    assert_eq!(listings[2].title(), "Zord Lot of 40 & Manuals");
    assert_eq!(listings[2].price(), Some(1234.56));
    assert_eq!(listings[3].price(), None);
    assert_eq!(listings[4].delivery_cost(), DeliveryCost::Paid(4.99));
    assert_eq!(listings[5].delivery_cost(), DeliveryCost::Free);
    assert_eq!(listings[5].original_price(), Some(19.99));
    assert_eq!(listings[8].quality_score(), 0.0);
    assert!(!listings[8].delivery_window().is_dated());
    for l in &listings {
        assert!((0.0..=1.0).contains(&l.quality_score()));
        assert!(l.ranking_price() >= 0.0);
    }
}

#[test]
fn price_ranking_over_fixtures() {
    assert_eq!(
        ranked_titles(Criterion::Price, 3),
        vec!["Green Ranger Figure", "Red Ranger Figure", "Ranger Mask"]
    );
}

#[test]
fn delivery_ranking_over_fixtures() {
    assert_eq!(
        ranked_titles(Criterion::Delivery, 3),
        vec!["Red Ranger Figure", "Power Rangers Megazord", "Megazord Deluxe"]
    );
}

#[test]
fn quality_ranking_over_fixtures() {
    assert_eq!(
        ranked_titles(Criterion::Quality, 3),
        vec!["Power Rangers Megazord", "Megazord Deluxe", "Blue Ranger Figure"]
    );
}

#[test]
fn best_deal_ranking_over_fixtures() {
    assert_eq!(
        ranked_titles(Criterion::BestDeal, 3),
        vec!["Blue Ranger Figure", "Red Ranger Figure", "Power Rangers Megazord"]
    );
}

#[test]
fn per_source_limit_applies_before_ranking() {
    let req = request(Criterion::Price, 3).with_per_source_limit(Some(2));
    let out = rank_payloads(&fixture("ebay_items.json"), &fixture("amazon_products.json"), &req)
        .unwrap();
    let titles: Vec<_> = out.iter().map(|l| l.title()).collect();
    assert_eq!(
        titles,
        vec!["Red Ranger Figure", "Power Rangers Megazord", "Vintage Red Ranger 1993"]
    );
}

#[test]
fn missing_source_still_ranks() {
    let out = rank_payloads(
        &fixture("ebay_items.json"),
        &json!({"error": "upstream timeout"}),
        &request(Criterion::Quality, 3),
    )
    .unwrap();
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|l| l.source() == Marketplace::Ebay));
}

#[test]
fn serialized_shape() {
    let ebay = fixture("ebay_items.json");
    let amazon = fixture("amazon_products.json");
    let out = rank_payloads(&ebay, &amazon, &request(Criterion::Price, 2)).unwrap();
    let v = serde_json::to_value(&out).unwrap();

    assert_eq!(v[0]["source"], "eBay");
    assert_eq!(v[0]["price"], 0.0);
    assert_eq!(v[0]["delivery_window"]["earliest_date"], Value::Null);
    assert_eq!(v[1]["source"], "Amazon");
    assert_eq!(v[1]["delivery_window"]["earliest_date"], "2024-11-29");
    assert_eq!(v[1]["delivery_window"]["latest_date"], "2024-12-10");
    assert_eq!(v[1]["delivery_cost"]["kind"], "free");
    assert_eq!(v[1]["extra"]["is_prime"], true);
}

#[test]
fn malformed_payloads_are_rejected() {
    let req = request(Criterion::Price, 3);
    let err = rank_payloads(&json!({"items": "oops"}), &Value::Null, &req).unwrap_err();
    assert!(matches!(
        err,
        RankError::MalformedPayload { marketplace: Marketplace::Ebay, .. }
    ));
    let err = rank_payloads(&Value::Null, &json!("not an object"), &req).unwrap_err();
    assert!(matches!(
        err,
        RankError::MalformedPayload { marketplace: Marketplace::Amazon, .. }
    ));
}
