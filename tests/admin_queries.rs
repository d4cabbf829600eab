mod common;

use pegrio_backend::store::{self, QuoteQuery};
use pegrio_backend::utils::time::{time_days_ago, time_now};

use common::{seed_order, test_state};

fn query(limit: i64, offset: i64, sort: &str, order: &str) -> QuoteQuery {
    QuoteQuery {
        limit,
        offset,
        sort: sort.to_string(),
        order: order.to_string(),
        status: None,
        search: None,
    }
}

#[tokio::test]
async fn default_sort_returns_newest_first_with_full_total() {
    let state = test_state().await;

    // q01 oldest .. q15 newest
    for i in 1..=15 {
        seed_order(
            &state.sdb,
            &format!("q{:02}", i),
            &format!("Customer {:02}", i),
            &format!("c{:02}@example.com", i),
            "Biz",
            "pending",
            "pending",
            None,
            &time_days_ago(30 - i),
        )
        .await;
    }

    let (rows, total) = store::list_quotes(&state.sdb, &query(10, 0, "created_at", "DESC"))
        .await
        .unwrap();
    assert_eq!(total, 15);
    assert_eq!(rows.len(), 10);
    let names: Vec<_> = rows.iter().map(|o| o.customer_name.clone()).collect();
    let expected: Vec<_> = (6..=15).rev().map(|i| format!("Customer {:02}", i)).collect();
    assert_eq!(names, expected);

    // second page picks up exactly the remainder
    let (rest, total) = store::list_quotes(&state.sdb, &query(10, 10, "created_at", "DESC"))
        .await
        .unwrap();
    assert_eq!(total, 15);
    assert_eq!(rest.len(), 5);
    let names: Vec<_> = rest.iter().map(|o| o.customer_name.clone()).collect();
    let expected: Vec<_> = (1..=5).rev().map(|i| format!("Customer {:02}", i)).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn duplicate_sort_values_tie_break_on_id() {
    let state = test_state().await;

    let same_instant = time_now();
    for key in ["a1", "b2", "c3", "d4"] {
        seed_order(
            &state.sdb,
            key,
            "Same Time",
            "same@example.com",
            "Biz",
            "pending",
            "pending",
            None,
            &same_instant,
        )
        .await;
    }

    let (desc, _) = store::list_quotes(&state.sdb, &query(10, 0, "created_at", "DESC"))
        .await
        .unwrap();
    let keys: Vec<_> = desc.iter().map(|o| o.id.to_string()).collect();
    assert_eq!(keys, vec!["orders:d4", "orders:c3", "orders:b2", "orders:a1"]);

    // repeated identical queries page identically
    let (again, _) = store::list_quotes(&state.sdb, &query(10, 0, "created_at", "DESC"))
        .await
        .unwrap();
    assert_eq!(
        again.iter().map(|o| o.id.to_string()).collect::<Vec<_>>(),
        keys
    );

    // paging across the tie never duplicates or drops a row
    let (page1, _) = store::list_quotes(&state.sdb, &query(2, 0, "created_at", "DESC"))
        .await
        .unwrap();
    let (page2, _) = store::list_quotes(&state.sdb, &query(2, 2, "created_at", "DESC"))
        .await
        .unwrap();
    let mut seen: Vec<_> = page1.iter().chain(page2.iter()).map(|o| o.id.to_string()).collect();
    seen.dedup();
    assert_eq!(seen, keys);
}

#[tokio::test]
async fn status_filter_is_exact_and_all_means_none() {
    let state = test_state().await;
    let now = time_now();
    seed_order(&state.sdb, "s1", "A", "a@x.com", "B1", "pending", "pending", None, &now).await;
    seed_order(&state.sdb, "s2", "B", "b@x.com", "B2", "paid", "paid", Some(100), &now).await;
    seed_order(&state.sdb, "s3", "C", "c@x.com", "B3", "in_progress", "paid", Some(200), &now).await;

    let mut q = query(10, 0, "created_at", "DESC");
    q.status = Some("paid".to_string());
    let (rows, total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].customer_name, "B");

    q.status = Some("all".to_string());
    let (_, total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(total, 3);

    q.status = Some("bogus".to_string());
    let (rows, total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(total, 0);
    assert!(rows.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive_substring_over_identity_fields() {
    let state = test_state().await;
    let now = time_now();
    seed_order(&state.sdb, "s1", "Ada Lovelace", "ada@engines.dev", "Analytical Engines", "pending", "pending", None, &now).await;
    seed_order(&state.sdb, "s2", "Grace Hopper", "grace@compilers.io", "Compilers Inc", "pending", "pending", None, &now).await;
    seed_order(&state.sdb, "s3", "Alan Turing", "alan@bombe.uk", "Bletchley", "pending", "pending", None, &now).await;

    let mut q = query(10, 0, "created_at", "DESC");

    q.search = Some("LOVELACE".to_string());
    let (rows, total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].customer_name, "Ada Lovelace");

    q.search = Some("compilers".to_string()); // matches email and business
    let (_, total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(total, 1);

    q.search = Some("a".to_string());
    let (_, total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(total, 3);

    q.search = Some("zzz".to_string());
    let (_, total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn sort_field_is_whitelisted_and_name_sort_works() {
    let state = test_state().await;
    let now = time_now();
    seed_order(&state.sdb, "s1", "Charlie", "c@x.com", "B", "pending", "pending", None, &now).await;
    seed_order(&state.sdb, "s2", "Alice", "a@x.com", "B", "pending", "pending", None, &now).await;
    seed_order(&state.sdb, "s3", "Bob", "b@x.com", "B", "pending", "pending", None, &now).await;

    let (rows, _) = store::list_quotes(&state.sdb, &query(10, 0, "customer_name", "ASC"))
        .await
        .unwrap();
    let names: Vec<_> = rows.iter().map(|o| o.customer_name.clone()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Charlie"]);

    // an unexpected sort field silently falls back to created_at
    let (rows, _) = store::list_quotes(
        &state.sdb,
        &query(10, 0, "portal_token; DROP TABLE orders", "ASC"),
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn stats_cover_the_unfiltered_set() {
    let state = test_state().await;
    let now = time_now();
    seed_order(&state.sdb, "s1", "A", "a@x.com", "B", "pending", "pending", None, &now).await;
    seed_order(&state.sdb, "s2", "B", "b@x.com", "B", "paid", "paid", Some(475_000), &now).await;
    seed_order(&state.sdb, "s3", "C", "c@x.com", "B", "in_progress", "paid", Some(250_000), &now).await;
    seed_order(&state.sdb, "s4", "D", "d@x.com", "B", "pending", "failed", None, &time_days_ago(10)).await;

    let stats = store::dashboard_stats(&state.sdb).await.unwrap();
    assert_eq!(stats.total_quotes, 4);
    assert_eq!(stats.paid_quotes, 2);
    assert_eq!(stats.pending_quotes, 1);
    assert_eq!(stats.total_revenue, 725_000);
    assert_eq!(stats.quotes_last_7_days, 3);
    assert_eq!(stats.quotes_last_30_days, 4);
    assert!((stats.conversion_rate - 0.5).abs() < f64::EPSILON);

    // the stats do not shrink when the table view is filtered
    let mut q = query(10, 0, "created_at", "DESC");
    q.status = Some("paid".to_string());
    let (_, filtered_total) = store::list_quotes(&state.sdb, &q).await.unwrap();
    assert_eq!(filtered_total, 1);
    let stats_again = store::dashboard_stats(&state.sdb).await.unwrap();
    assert_eq!(stats_again.total_quotes, 4);
}

#[tokio::test]
async fn empty_table_stats_do_not_divide_by_zero() {
    let state = test_state().await;

    let stats = store::dashboard_stats(&state.sdb).await.unwrap();
    assert_eq!(stats.total_quotes, 0);
    assert_eq!(stats.total_revenue, 0);
    assert_eq!(stats.conversion_rate, 0.0);
}
