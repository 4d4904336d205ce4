use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;
use tourism_report::config::{
    DataPaths, ARRIVALS_FILE, EXPENDITURE_FILE, JAPAN_MONTHLY_FILE, KOREA_MONTHLY_FILE,
};
use tourism_report::routes::{router, AppState};
use tower::ServiceExt;

const HEADER: &str = "reporter_area_code,reporter_area_label,partner_area_code,partner_area_label,year,indicator_code,indicator_label,value,unit\n";

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("country_data")).unwrap();

    let arrivals = format!(
        "{HEADER}\
         156,China,0,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total arrivals,65000,Thousand trips\n\
         392,Japan,0,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total arrivals,31880,Thousand trips\n\
         392,Japan,0,World,2019,INBD_TRIP_REGN_TOUR,Regional,99999,Thousand trips\n\
         798,Tuvalu,0,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total arrivals,3,Thousand trips\n\
         999,Atlantis,0,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total arrivals,500,Thousand trips\n\
         156,China,150,Europe,2021,INBD_TRIP_AREA_TOUR_ABRD,By region,400,Thousand trips\n\
         156,China,019,Americas,2021,INBD_TRIP_AREA_TOUR_ABRD,By region,900,Thousand trips\n"
    );
    fs::write(dir.path().join(ARRIVALS_FILE), arrivals).unwrap();

    let expenditure = format!(
        "{HEADER}\
         392,Japan,0,World,2019,INBD_EXPD_BPAY_TOTL_VSTR,Total,300,million US dollars\n\
         392,Japan,0,World,2019,INBD_EXPD_BPAY_TRVL_VSTR,Travel,200,million US dollars\n\
         392,Japan,0,World,2019,INBD_EXPD_BPAY_PSTR_VSTR,Passenger transport,50,million US dollars\n\
         156,China,0,World,2019,INBD_EXPD_BPAY_TRVL_VSTR,Travel,35000,million US dollars\n\
         792,Türkiye,0,World,2019,INBD_EXPD_BPAY_TOTL_VSTR,Total,40000,million US dollars\n"
    );
    fs::write(dir.path().join(EXPENDITURE_FILE), expenditure).unwrap();

    fs::write(
        dir.path().join(JAPAN_MONTHLY_FILE),
        "Monthly ,Grand Total,%Change\n\
         2018\u{3000}Jan\u{ff0e},\"2,000\",\n\
         Feb\u{ff0e},\"2,500\",\n\
         2019\u{3000}Jan\u{ff0e},\"3,000\",50.0%\n\
         Feb\u{ff0e},\"2,000\",-20.0%\n\
         Mar\u{ff0e},\"4,000\",\n",
    )
    .unwrap();

    fs::write(
        dir.path().join(KOREA_MONTHLY_FILE),
        "date,nation,age,visitor\n\
         2023-1,China,20s,100\n\
         2023-1,Japan,20s,50\n\
         2023-2,China,20s,80\n\
         2024-1,China,20s,300\n",
    )
    .unwrap();

    dir
}

async fn get(dir: &TempDir, uri: &str) -> (StatusCode, Value) {
    let app = router(AppState::new(DataPaths::new(dir.path())));
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn visitor_map_for_year() {
    let dir = fixture();
    let (status, body) = get(&dir, "/world-map-data?year=2019").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"], "tourist_count");
    assert_eq!(body["data"]["countries"], serde_json::json!(["CHN", "JPN", "TUV"]));
    assert_eq!(body["data"]["values"][0], 65_000_000.0);
    assert_eq!(body["data"]["values"][1], 31_880_000.0);
    assert_eq!(body["stats"]["unmapped_countries"], 1);
    assert_eq!(body["stats"]["max_country"], "China");
}

#[tokio::test]
async fn visitor_map_uses_fallback_without_world_rows() {
    let dir = fixture();
    let (status, body) = get(&dir, "/world-map-data?year=2021").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["countries"], serde_json::json!(["CHN"]));
    assert_eq!(body["data"]["values"][0], 900_000.0);
}

#[tokio::test]
async fn absent_year_is_not_found_with_available_years() {
    let dir = fixture();
    let (status, body) = get(&dir, "/world-map-data").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["year"], 2023);
    assert_eq!(body["available_years"], serde_json::json!([2019, 2021]));
    assert_eq!(body["data"]["countries"], serde_json::json!([]));
}

#[tokio::test]
async fn expenditure_and_avg_spending_maps() {
    let dir = fixture();
    let (status, body) = get(&dir, "/world-map-expenditure").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 2019);
    assert_eq!(body["data"]["countries"], serde_json::json!(["TUR", "CHN", "JPN"]));
    assert_eq!(body["data"]["values"][2], 300.0);

    let (status, body) = get(&dir, "/world-map-avg-spending?year=2019").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["countries"], serde_json::json!(["CHN", "JPN"]));
    let china = body["data"]["values"][0].as_f64().unwrap();
    assert!((china - 35_000.0 / 65_000.0 * 1000.0).abs() < 1e-6);
}

#[tokio::test]
async fn crowd_score_map() {
    let dir = fixture();
    let (status, body) = get(&dir, "/world-map-crowd-score?year=2019").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"], "crowd_score");
    assert_eq!(body["data"]["values"][0], 100.0);
    assert_eq!(body["data"]["tourist_counts"][0], 65_000_000.0);
    // Tuvalu holds the minimum and scores 0, so it is dropped
    let countries = body["data"]["countries"].as_array().unwrap();
    assert!(!countries.iter().any(|c| c == "TUV"));
}

#[tokio::test]
async fn expenditure_breakdown_full_method() {
    let dir = fixture();
    let (status, body) = get(&dir, "/country/JPN/expenditure-breakdown?year=2019").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "Japan");
    assert_eq!(body["metadata"]["calculation_method"], "total_breakdown");
    assert_eq!(body["data"]["total"], 300.0);
    let cats = body["data"]["categories"].as_array().unwrap();
    assert_eq!(cats.len(), 3);
    assert_eq!(cats[0]["name_en"], "Travel Expenditure");
    let pct = cats[0]["percentage"].as_f64().unwrap();
    assert!((pct - 66.6667).abs() < 1e-3);
}

#[tokio::test]
async fn expenditure_breakdown_errors() {
    let dir = fixture();
    let (status, body) = get(&dir, "/country/XYZ/expenditure-breakdown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["country_code"], "XYZ");

    // Türkiye only reports a total
    let (status, body) = get(&dir, "/country/tur/expenditure-breakdown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["country"], "Turkey");
    assert_eq!(body["debug"]["has_total"], true);
    assert_eq!(body["debug"]["has_transport"], false);
}

#[tokio::test]
async fn japan_monthly_series() {
    let dir = fixture();
    let (status, body) = get(&dir, "/country/JPN/monthly-visitors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "Japan");
    assert_eq!(body["year"], 2019);
    assert_eq!(body["data"]["months"], serde_json::json!(["Jan", "Feb", "Mar"]));
    assert_eq!(body["data"]["values"], serde_json::json!([3000, 2000, 4000]));
    assert_eq!(body["data"]["changes"], serde_json::json!([50.0, -20.0, 0.0]));
    assert_eq!(body["stats"]["total_visitors"], 9000);
    assert_eq!(body["stats"]["max_month"]["month"], "Mar");
    assert_eq!(body["stats"]["available_years"], serde_json::json!([2018, 2019]));
}

#[tokio::test]
async fn korea_monthly_series() {
    let dir = fixture();
    let (status, body) = get(&dir, "/country/KOR/monthly-visitors?year=2024").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "South Korea");
    assert_eq!(body["data"]["values"], serde_json::json!([300]));
    assert_eq!(body["data"]["changes"], serde_json::json!([100.0]));

    let (status, body) = get(&dir, "/country/KOR/monthly-visitors?year=1999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["available_years"], serde_json::json!([2023, 2024]));

    let (status, _) = get(&dir, "/country/FRA/monthly-visitors").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_file_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(&dir, "/world-map-expenditure").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains(EXPENDITURE_FILE));
}

#[tokio::test]
async fn health_check() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(&dir, "/healthy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
