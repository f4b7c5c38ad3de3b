//! End-to-end tests of the level-by-level imputation pipeline.
//!
//! Each test builds synthetic monthly price tables, runs them through a
//! [`Pipeline`] in hierarchy order and checks the finalized tables.

use cascade_impute::config::ImputationConfig;
use cascade_impute::core::{AdminLevel, Hierarchy, PriceTable, YearMonth};
use cascade_impute::pipeline::{Pipeline, Stage};
use cascade_impute::ImputeError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn start() -> YearMonth {
    YearMonth::new(2019, 1).unwrap()
}

fn months(n: usize) -> Vec<YearMonth> {
    std::iter::successors(Some(start()), |m| Some(m.succ()))
        .take(n)
        .collect()
}

/// Random-walk price series around `base` with a mild yearly cycle.
fn price_series(n: usize, base: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = base;
    (0..n)
        .map(|i| {
            level += rng.gen_range(-0.02..0.03) * base;
            level + 0.05 * base * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
        })
        .collect()
}

fn with_gaps(values: &[f64], gaps: &[usize]) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (!gaps.contains(&i)).then_some(v))
        .collect()
}

/// Append one location's monthly series; `columns` holds one series per product.
fn push_location(table: &mut PriceTable, location: &str, columns: &[Vec<Option<f64>>]) {
    let mut month = start();
    for t in 0..columns[0].len() {
        let row = columns.iter().map(|c| c[t]).collect();
        table.push_row(location, month, row).unwrap();
        month = month.succ();
    }
}

fn national(n: usize) -> PriceTable {
    let mut table = PriceTable::new(AdminLevel::National, vec!["bread", "rice"]).unwrap();
    push_location(
        &mut table,
        "Syria",
        &[
            with_gaps(&price_series(n, 400.0, 1), &[9, 12]),
            with_gaps(&price_series(n, 2500.0, 2), &[15]),
        ],
    );
    table
}

fn region(n: usize) -> PriceTable {
    let mut table = PriceTable::new(AdminLevel::Region, vec!["bread", "rice"]).unwrap();
    // Month-major like a completed table.
    let series = [
        ("Aleppo", 410.0, 2600.0, vec![0, 11, 17]),
        ("Idleb", 430.0, 2700.0, vec![0, 20]),
        ("Hama", 390.0, 2450.0, vec![14]),
    ];
    let columns: Vec<(&str, Vec<Vec<Option<f64>>>)> = series
        .iter()
        .enumerate()
        .map(|(k, (name, bread, rice, gaps))| {
            let seed = 10 + k as u64;
            (
                *name,
                vec![
                    with_gaps(&price_series(n, *bread, seed), gaps),
                    with_gaps(&price_series(n, *rice, seed + 100), gaps),
                ],
            )
        })
        .collect();

    let mut month = start();
    for t in 0..n {
        for (name, cols) in &columns {
            table
                .push_row(*name, month, cols.iter().map(|c| c[t]).collect())
                .unwrap();
        }
        month = month.succ();
    }
    table
}

fn district(n: usize) -> PriceTable {
    let mut table = PriceTable::new(AdminLevel::District, vec!["bread", "rice"]).unwrap();
    let observed = n - 6;
    let tail: Vec<usize> = (observed..n).collect();
    push_location(
        &mut table,
        "Jebel Saman",
        &[
            with_gaps(&price_series(n, 420.0, 31), &tail),
            with_gaps(&price_series(n, 2650.0, 32), &[10]),
        ],
    );
    push_location(
        &mut table,
        "Harim",
        &[
            with_gaps(&price_series(n, 440.0, 33), &[]),
            with_gaps(&price_series(n, 2750.0, 34), &[]),
        ],
    );
    table
}

fn district_hierarchy() -> Hierarchy {
    Hierarchy::from_pairs([("Jebel Saman", "Aleppo"), ("Harim", "Idleb")])
}

fn run_through_region(pipeline: &mut Pipeline, n: usize) {
    pipeline.run_level(national(n)).unwrap();
    pipeline.run_level(region(n)).unwrap();
}

#[test]
fn national_series_becomes_gap_free() {
    let n = 24;
    let raw = national(n);
    let mut pipeline = Pipeline::new(ImputationConfig::default()).unwrap();
    let report = pipeline.run_level(raw.clone()).unwrap();

    assert_eq!(report.level, AdminLevel::National);
    assert_eq!(report.missing_before, 3);
    assert_eq!(report.missing_after, 0);
    assert_eq!(report.stages.len(), 2);
    assert_eq!(report.stages[0].stage, Stage::LocalRegression { half_window: 8 });
    for stage in &report.stages {
        assert!(stage.missing_after <= stage.missing_before);
    }

    let finalized = pipeline.finalized(AdminLevel::National).unwrap();
    assert_eq!(finalized.len(), n);
    for (raw_row, row) in raw.rows().iter().zip(finalized.rows()) {
        assert_eq!(raw_row.location(), row.location());
        assert_eq!(raw_row.month(), row.month());
        for (before, after) in raw_row.values().iter().zip(row.values()) {
            assert!(after.is_some());
            if before.is_some() {
                assert_eq!(before, after);
            }
        }
    }
    assert_eq!(pipeline.next_level(), Some(AdminLevel::Region));
}

#[test]
fn region_level_fills_edges_from_neighbors_and_refines() {
    let n = 30;
    let mut pipeline = Pipeline::new(ImputationConfig::default()).unwrap();
    pipeline.run_level(national(n)).unwrap();

    let raw = region(n);
    let report = pipeline.run_level(raw.clone()).unwrap();
    assert_eq!(report.missing_after, 0);
    let kinds: Vec<Stage> = report.stages.iter().map(|s| s.stage).collect();
    assert_eq!(kinds.len(), 4);
    assert_eq!(kinds[3], Stage::Refinement);

    // Only the first month of Aleppo and Idleb is out of reach of the
    // local fits; the geographic stage closes both products there.
    assert_eq!(report.stages[0].missing_after, 4);
    assert_eq!(report.stages[1].changed, 4);

    // Idleb, Aleppo's nearest neighbor, is missing in January too, so
    // Hama's value is copied as is.
    let finalized = pipeline.finalized(AdminLevel::Region).unwrap();
    let jan = start();
    for product in 0..2 {
        assert_eq!(
            finalized.value("Aleppo", jan, product),
            raw.value("Hama", jan, product)
        );
    }

    // Positions observed in the raw table are never rewritten.
    for (raw_row, row) in raw.rows().iter().zip(finalized.rows()) {
        for (before, after) in raw_row.values().iter().zip(row.values()) {
            if before.is_some() {
                assert_eq!(before, after);
            }
        }
    }
}

#[test]
fn district_tail_comes_from_parent_region() {
    let n = 30;
    let mut pipeline = Pipeline::new(ImputationConfig::default())
        .unwrap()
        .with_hierarchy(AdminLevel::District, district_hierarchy());
    run_through_region(&mut pipeline, n);

    let report = pipeline.run_level(district(n)).unwrap();
    assert_eq!(report.missing_after, 0);
    assert_eq!(
        report.stages[2].stage,
        Stage::Propagation {
            parent: AdminLevel::Region
        }
    );
    assert_eq!(report.stages[2].changed, 6);

    let region = pipeline.finalized(AdminLevel::Region).unwrap();
    let district = pipeline.finalized(AdminLevel::District).unwrap();
    let months = months(n);
    for &month in &months[n - 6..] {
        assert_eq!(
            district.value("Jebel Saman", month, 0),
            region.value("Aleppo", month, 0)
        );
    }
    // The interior rice gap is closed by the local fit, not the parent.
    assert_ne!(
        district.value("Jebel Saman", months[10], 1),
        region.value("Aleppo", months[10], 1)
    );
}

#[test]
fn levels_must_run_in_order() {
    let n = 24;
    let mut pipeline = Pipeline::new(ImputationConfig::default()).unwrap();

    let err = pipeline.run_level(district(n)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "admin level District cannot run now (expected National)"
    );

    pipeline.run_level(national(n)).unwrap();
    // No re-entry.
    assert!(matches!(
        pipeline.run_level(national(n)),
        Err(ImputeError::LevelOrder {
            got: AdminLevel::National,
            ..
        })
    ));
    // No skipping.
    assert!(matches!(
        pipeline.run_level(district(n)),
        Err(ImputeError::LevelOrder { .. })
    ));
    assert_eq!(pipeline.next_level(), Some(AdminLevel::Region));
}

#[test]
fn missing_required_product_fails_before_running() {
    let config = ImputationConfig::from_str("required_products = [\"bread\", \"sugar\"]\n").unwrap();
    let mut pipeline = Pipeline::new(config).unwrap();
    let err = pipeline.run_level(national(24)).unwrap_err();
    assert!(matches!(err, ImputeError::MissingProduct(ref p) if p == "sugar"));
    assert!(pipeline.finalized(AdminLevel::National).is_none());
    assert_eq!(pipeline.next_level(), Some(AdminLevel::National));
}

#[test]
fn unmapped_district_is_fatal() {
    let n = 30;
    let mut pipeline = Pipeline::new(ImputationConfig::default())
        .unwrap()
        .with_hierarchy(
            AdminLevel::District,
            Hierarchy::from_pairs([("Harim", "Idleb")]),
        );
    run_through_region(&mut pipeline, n);

    let err = pipeline.run_level(district(n)).unwrap_err();
    assert!(matches!(err, ImputeError::MissingParentMapping(ref l) if l == "Jebel Saman"));
    assert!(pipeline.finalized(AdminLevel::District).is_none());
    assert_eq!(pipeline.next_level(), Some(AdminLevel::District));
}

#[test]
fn blank_district_rows_are_dropped() {
    let n = 30;
    let mut pipeline = Pipeline::new(ImputationConfig::default())
        .unwrap()
        .with_hierarchy(AdminLevel::District, district_hierarchy());
    run_through_region(&mut pipeline, n);

    let mut table = district(n);
    push_location(&mut table, " ", &[vec![None; n], vec![None; n]]);
    let report = pipeline.run_level(table).unwrap();
    assert_eq!(report.dropped_rows, n);
    assert_eq!(report.rows, 2 * n);
    assert_eq!(report.missing_after, 0);
}

#[test]
fn gapped_months_must_be_completed_first() {
    let mut table = PriceTable::new(AdminLevel::National, vec!["bread"]).unwrap();
    let values = price_series(24, 400.0, 5);
    let mut month = start();
    for (t, v) in values.iter().enumerate() {
        // Month 7 was never recorded.
        if t != 7 {
            table.push_row("Syria", month, vec![Some(*v)]).unwrap();
        }
        month = month.succ();
    }

    let mut pipeline = Pipeline::new(ImputationConfig::default()).unwrap();
    assert!(matches!(
        pipeline.run_level(table.clone()),
        Err(ImputeError::NonContiguousMonths { .. })
    ));

    let completed = table
        .complete_months(start(), months(24)[23], &["Syria"])
        .unwrap();
    assert_eq!(completed.missing_count(), 1);
    let report = pipeline.run_level(completed).unwrap();
    assert_eq!(report.missing_after, 0);
}

#[test]
fn invalid_config_is_rejected() {
    let err = ImputationConfig::from_str("[geographic]\nneighbor_count = 0\n").unwrap_err();
    let err: ImputeError = err.into();
    assert!(matches!(err, ImputeError::Config(_)));

    let mut config = ImputationConfig::default();
    config.global.min_points = 2;
    assert!(matches!(Pipeline::new(config), Err(ImputeError::Config(_))));
}

#[test]
fn config_from_file_drives_the_plan() {
    let dir = std::env::temp_dir().join(format!("cascade-impute-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("impute.toml");
    std::fs::write(&path, "[local]\nhalf_window = 6\n\n[refinement]\nenabled = false\n").unwrap();

    let config = ImputationConfig::from_file(&path).unwrap();
    let mut pipeline = Pipeline::new(config).unwrap();
    let report = pipeline.run_level(national(24)).unwrap();
    assert_eq!(report.stages[0].stage, Stage::LocalRegression { half_window: 6 });
    let report = pipeline.run_level(region(24)).unwrap();
    assert!(report.stages.iter().all(|s| s.stage != Stage::Refinement));

    std::fs::remove_dir_all(&dir).unwrap();
}
