use visit_auditor::analysis::{compliance_ranking, store_delay_ranking, DashboardStats, DelayMetric, RankingOrder};
use visit_auditor::models::{AuditRecord, AuditStatus, RouteVisit, StoreLocation, TimeClockEntry};

fn record(consultant: &str, delay: Option<i64>, status: AuditStatus, store: Option<(&str, &str)>) -> AuditRecord {
    AuditRecord {
        date: "01/02/2024".to_string(),
        consultant: consultant.to_string(),
        time_clock: TimeClockEntry {
            original_date: "01/02/2024".to_string(),
            date: "01/02/2024".to_string(),
            check_in_time: "09:00".to_string(),
            check_out_time: None,
            location_address: None,
            street: None,
            store_label: None,
            consultant: Some(consultant.to_string()),
        },
        route_visit: None,
        resolved_store: store.map(|(brand, name)| StoreLocation {
            code: name.to_string(),
            name: name.to_string(),
            brand: Some(brand.to_string()),
            address: None,
            latitude: None,
            longitude: None,
        }),
        actual_vs_actual_delta_minutes: Some(0),
        actual_vs_predicted_delta_minutes: delay,
        check_in_coordinates: None,
        route_address_coordinates: None,
        store_coordinates: None,
        home_coordinates: None,
        distance_meters: None,
        status,
        manual_override: false,
    }
}

#[test]
fn test_dashboard_stats() {
    let mut records = vec![
        record("ANA", Some(5), AuditStatus::Ok, None),
        record("ANA", Some(-20), AuditStatus::DistanceError, None),
        record("BRUNO", None, AuditStatus::NoVisit, None),
        record("BRUNO", Some(15), AuditStatus::Ok, None),
    ];
    records[1].distance_meters = Some(900.0);
    records[3].distance_meters = Some(100.0);
    // Sin predicción: se usa el delta ponto vs realizado (0)
    records[2].actual_vs_actual_delta_minutes = None;

    let stats = DashboardStats::compute(&records, 500.0, 15);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.valid_time, 2);
    assert_eq!(stats.distance_errors, 1);
    assert_eq!(stats.valid_time_percent, 50.0);
    assert_eq!(stats.distance_error_percent, 25.0);

    let empty = DashboardStats::compute(&[], 500.0, 15);
    assert_eq!(empty.valid_time_percent, 0.0);
}

#[test]
fn test_compliance_ranking_scores() {
    let mut approved = record("BRUNO", Some(40), AuditStatus::DistanceError, None);
    approved.manual_override = true;

    let records = vec![
        record("ANA", Some(10), AuditStatus::Ok, None),
        record("ANA", Some(20), AuditStatus::DistanceError, None),
        approved,
        record("BRUNO", Some(-5), AuditStatus::TravelOk, None),
        record("N/A", Some(0), AuditStatus::Ok, None),
    ];

    let best = compliance_ranking(&records, 15, 30, RankingOrder::BestFirst);
    assert_eq!(best.len(), 2);

    // ANA: tiempo (1 + 0.6)/2 = 0.8, geo 1/2 = 0.5 → 65
    let ana = best.iter().find(|c| c.name == "ANA").unwrap();
    assert_eq!((ana.time_ok, ana.time_warning, ana.time_error), (1, 1, 0));
    assert_eq!((ana.geo_ok, ana.geo_error), (1, 1));
    assert_eq!(ana.score, 65);

    // BRUNO: tiempo 1/2 = 0.5, geo 2/2 (aprobación manual cuenta) → 75
    let bruno = best.iter().find(|c| c.name == "BRUNO").unwrap();
    assert_eq!(bruno.geo_ok, 2);
    assert_eq!(bruno.score, 75);

    assert_eq!(best[0].name, "BRUNO");
    let worst = compliance_ranking(&records, 15, 30, RankingOrder::WorstFirst);
    assert_eq!(worst[0].name, "ANA");
}

#[test]
fn test_store_delay_ranking() {
    let records = vec![
        record("ANA", Some(20), AuditStatus::Ok, Some(("REDE A", "Loja 1"))),
        record("ANA", Some(-40), AuditStatus::Ok, Some(("REDE A", "Loja 1"))),
        record("ANA", Some(31), AuditStatus::Ok, Some(("REDE A", "Loja 2"))),
        record("BRUNO", Some(90), AuditStatus::Ok, None),
        record("BRUNO", Some(10), AuditStatus::Ok, Some(("REDE A", "Loja 3"))),
    ];

    let by_count = store_delay_ranking(&records, 15, DelayMetric::Count);
    assert_eq!(by_count.len(), 2);
    assert_eq!(by_count[0].name, "REDE A");
    assert_eq!(by_count[0].count, 3);
    assert_eq!(by_count[0].average_delay_minutes, 30);
    assert_eq!(by_count[0].unique_stores(), 2);
    assert_eq!(by_count[0].stores[0].name, "Loja 1");
    assert_eq!(by_count[0].stores[0].average_delay_minutes, 30);

    let by_average = store_delay_ranking(&records, 15, DelayMetric::AverageDelay);
    assert_eq!(by_average[0].name, "DESCONHECIDO");
    assert_eq!(by_average[0].average_delay_minutes, 90);
}

#[test]
fn test_unresolved_stores_keep_route_label() {
    let labelled = |label: &str, delay: i64| {
        let mut r = record("ANA", Some(delay), AuditStatus::StoreNotFound, None);
        r.route_visit = Some(RouteVisit {
            original_date: "01/02/2024".to_string(),
            planned_date: "01/02/2024".to_string(),
            consultant: Some("ANA".to_string()),
            store_label: Some(label.to_string()),
            store_code: None,
            address: None,
            actual_check_in: Some("09:00".to_string()),
            predicted_check_in: None,
            check_in_original: None,
        });
        r
    };
    let records = vec![labelled("Loja A", 40), labelled("Loja B", 50)];

    let ranking = store_delay_ranking(&records, 15, DelayMetric::Count);
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].name, "DESCONHECIDO");
    assert_eq!(ranking[0].unique_stores(), 2);
    let mut names: Vec<&str> = ranking[0].stores.iter().map(|s| s.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Loja A", "Loja B"]);
}
