mod common;

use std::{sync::atomic::Ordering, time::Duration};

use common::{fake_score, MockEnricher};
use polars::{
    df,
    prelude::{DataFrame, DataType, NamedFrom, Series},
};
use proptest::prelude::*;
use sentiscope::enrich::{
    enrich_frame, enrich_texts, project_score, EnrichOptions, ProjectionOptions, RowOutcome,
};

fn customers() -> DataFrame {
    df!(
        "Product ID" => [101i64, 102, 103, 104],
        "State" => ["WA", "OR", "CA", "NV"],
        "store comments" => [
            Some("awesome staff"),
            None,
            Some("waste of a trip"),
            Some("hello again"),
        ],
    )
    .unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[tokio::test]
async fn enrichment_attaches_structured_and_error_columns() {
    let enricher = MockEnricher::failing(&["3"]);
    let df = customers();
    let enriched = enrich_frame(&enricher, &df, &EnrichOptions::default())
        .await
        .unwrap();

    assert_eq!(enriched.height(), df.height());
    assert!(matches!(
        enriched.column("StoreCommentSentimentObj").unwrap().dtype(),
        DataType::Struct(_)
    ));
    let errors = enriched.column("Errors").unwrap().str().unwrap();
    assert_eq!(errors.get(0), None);
    assert_eq!(errors.get(1), None);
    assert_eq!(errors.get(2), None);
    assert!(errors.get(3).unwrap().contains("injected failure"));

    let ids = enriched.column("Product ID").unwrap().i64().unwrap();
    assert_eq!(
        ids.into_iter().collect::<Vec<_>>(),
        vec![Some(101), Some(102), Some(103), Some(104)]
    );
    // The null comment is skipped, not sent.
    assert_eq!(enricher.calls(), 3);
}

#[tokio::test]
async fn projection_extracts_scores_and_drops_intermediate_columns() {
    let enricher = MockEnricher::failing(&["3"]);
    let enriched = enrich_frame(&enricher, &customers(), &EnrichOptions::default())
        .await
        .unwrap();
    let projected = project_score(&enriched, &ProjectionOptions::default()).unwrap();

    let names: Vec<String> = projected
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "Product ID",
            "State",
            "store comments",
            "StoreCommentSentimentScore"
        ]
    );
    let scores = projected
        .column("StoreCommentSentimentScore")
        .unwrap()
        .f64()
        .unwrap();
    assert_eq!(
        scores.into_iter().collect::<Vec<_>>(),
        vec![Some(1.0), None, Some(0.11), None]
    );
}

#[tokio::test]
async fn projection_is_idempotent_and_pure() {
    let enriched = enrich_frame(
        &MockEnricher::default(),
        &customers(),
        &EnrichOptions::default(),
    )
    .await
    .unwrap();
    let before = enriched.clone();

    let first = project_score(&enriched, &ProjectionOptions::default()).unwrap();
    let second = project_score(&enriched, &ProjectionOptions::default()).unwrap();
    assert!(first.equals_missing(&second));
    assert!(enriched.equals_missing(&before));
}

#[tokio::test]
async fn missing_text_column_is_a_configuration_error() {
    let options = EnrichOptions {
        text_col: "comments".into(),
        ..EnrichOptions::default()
    };
    let err = enrich_frame(&MockEnricher::default(), &customers(), &options)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("comments"));
}

#[tokio::test]
async fn non_string_text_columns_are_cast() {
    let df = df!("store comments" => [1i64, 22, 333]).unwrap();
    let outcomes_df = enrich_frame(&MockEnricher::default(), &df, &EnrichOptions::default())
        .await
        .unwrap();
    let projected = project_score(&outcomes_df, &ProjectionOptions::default()).unwrap();
    let scores = projected
        .column("StoreCommentSentimentScore")
        .unwrap()
        .f64()
        .unwrap();
    assert_eq!(scores.get(2), Some(fake_score("333")));
}

#[tokio::test]
async fn in_flight_requests_respect_the_concurrency_bound() {
    let enricher = MockEnricher::with_delay(Duration::from_millis(20));
    let texts: Vec<Option<String>> = (0..12).map(|i| Some(format!("row {i}"))).collect();
    let outcomes = enrich_texts(&enricher, texts, "en", 3).await;

    assert_eq!(outcomes.len(), 12);
    assert_eq!(enricher.calls(), 12);
    let peak = enricher.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in-flight {peak}");
    assert!(peak > 1, "requests were not overlapped");
}

#[tokio::test]
async fn outcomes_stay_aligned_with_rows() {
    let enricher = MockEnricher::with_delay(Duration::from_millis(1));
    let texts: Vec<Option<String>> = (0..30).map(|i| Some("x".repeat(i))).collect();
    let outcomes = enrich_texts(&enricher, texts, "en", 8).await;
    for (i, outcome) in outcomes.iter().enumerate() {
        if i == 0 {
            assert_eq!(outcome, &RowOutcome::Skipped);
        } else {
            assert_eq!(outcome, &RowOutcome::Scored(fake_score(&"x".repeat(i))));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn enrichment_preserves_row_count_and_order(
        texts in prop::collection::vec(prop::option::of("[a-z ]{0,16}"), 1..40),
        concurrency in 1usize..8,
    ) {
        let ids: Vec<i64> = (0..texts.len() as i64).collect();
        let df = DataFrame::new(vec![
            Series::new("row".into(), ids.clone()),
            Series::new("store comments".into(), texts.clone()),
        ]).unwrap();
        let options = EnrichOptions { concurrency, ..EnrichOptions::default() };

        let enriched = runtime()
            .block_on(enrich_frame(&MockEnricher::default(), &df, &options))
            .unwrap();
        prop_assert_eq!(enriched.height(), df.height());
        let rows: Vec<Option<i64>> = enriched
            .column("row")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        prop_assert_eq!(rows, ids.into_iter().map(Some).collect::<Vec<_>>());

        let projected = project_score(&enriched, &ProjectionOptions::default()).unwrap();
        prop_assert_eq!(projected.height(), df.height());
    }

    #[test]
    fn one_failing_row_leaves_siblings_untouched(
        texts in prop::collection::vec(prop::option::of("[a-z]{1,10}"), 1..25),
        pick in any::<prop::sample::Index>(),
        concurrency in 1usize..6,
    ) {
        let failed = pick.index(texts.len());
        let rt = runtime();
        let baseline = rt.block_on(enrich_texts(
            &MockEnricher::default(),
            texts.clone(),
            "en",
            concurrency,
        ));
        let injected = rt.block_on(enrich_texts(
            &MockEnricher::failing(&[failed.to_string().as_str()]),
            texts.clone(),
            "en",
            concurrency,
        ));

        prop_assert_eq!(baseline.len(), injected.len());
        for (i, (a, b)) in baseline.iter().zip(&injected).enumerate() {
            if i != failed {
                prop_assert_eq!(a, b);
            }
        }
        match &texts[failed] {
            Some(_) => prop_assert!(matches!(injected[failed], RowOutcome::Failed(_))),
            None => prop_assert_eq!(&injected[failed], &RowOutcome::Skipped),
        }
    }
}
