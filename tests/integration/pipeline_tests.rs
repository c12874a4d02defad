use super::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_only_unseen_items_are_notified() -> anyhow::Result<()> {
    let server = start_marketplace().await;
    mount_search(&server, "shirt", vec![item_json(111, "Old shirt"), item_json(222, "Shirt")]).await;

    let dir = TempDir::new()?;
    let items_file = dir.path().join("items.txt");
    std::fs::write(&items_file, "111\n")?;

    let log = new_log();
    let dispatcher = recording_dispatcher(&[("email", false), ("slack", false)], &log);
    let mut scanner = build_scanner(&server.uri(), vec![text_query("shirt")], &items_file, dispatcher);

    let summary = scanner.run().await?;

    assert_eq!(deliveries(&log), vec!["email:222", "slack:222"]);
    assert_eq!(read_ids(&items_file), vec!["111", "222"]);
    assert!(scanner.store().contains("111"));
    assert!(scanner.store().contains("222"));
    assert_eq!(summary.queries_attempted, 1);
    assert_eq!(summary.items_fetched, 2);
    assert_eq!(summary.items_new, 1);
    assert_eq!(summary.deliveries_failed, 0);

    Ok(())
}

#[tokio::test]
async fn test_second_run_is_idempotent() -> anyhow::Result<()> {
    let server = start_marketplace().await;
    mount_search(&server, "lamp", vec![item_json(1, "Lamp"), item_json(2, "Desk lamp")]).await;

    let dir = TempDir::new()?;
    let items_file = dir.path().join("items.txt");

    let first_log = new_log();
    let mut first = build_scanner(
        &server.uri(),
        vec![text_query("lamp")],
        &items_file,
        recording_dispatcher(&[("email", false)], &first_log),
    );
    let first_summary = first.run().await?;
    assert_eq!(first_summary.items_new, 2);
    assert_eq!(deliveries(&first_log), vec!["email:1", "email:2"]);

    let second_log = new_log();
    let mut second = build_scanner(
        &server.uri(),
        vec![text_query("lamp")],
        &items_file,
        recording_dispatcher(&[("email", false)], &second_log),
    );
    let second_summary = second.run().await?;

    assert_eq!(second_summary.items_fetched, 2);
    assert_eq!(second_summary.items_new, 0);
    assert!(deliveries(&second_log).is_empty());
    assert_eq!(read_ids(&items_file), vec!["1", "2"]);

    Ok(())
}

#[tokio::test]
async fn test_empty_result_leaves_store_untouched() -> anyhow::Result<()> {
    let server = start_marketplace().await;
    mount_search(&server, "nothing", vec![]).await;

    let dir = TempDir::new()?;
    let items_file = dir.path().join("items.txt");

    let log = new_log();
    let mut scanner = build_scanner(
        &server.uri(),
        vec![text_query("nothing")],
        &items_file,
        recording_dispatcher(&[("email", false)], &log),
    );
    let summary = scanner.run().await?;

    assert_eq!(summary.items_fetched, 0);
    assert!(deliveries(&log).is_empty());
    assert!(!items_file.exists());

    Ok(())
}

#[tokio::test]
async fn test_item_found_by_two_queries_is_notified_once() -> anyhow::Result<()> {
    let server = start_marketplace().await;
    mount_search(&server, "boots", vec![item_json(7, "Boots")]).await;
    mount_search(&server, "leather", vec![item_json(7, "Boots"), item_json(8, "Belt")]).await;

    let dir = TempDir::new()?;
    let items_file = dir.path().join("items.txt");

    let log = new_log();
    let mut scanner = build_scanner(
        &server.uri(),
        vec![text_query("boots"), text_query("leather")],
        &items_file,
        recording_dispatcher(&[("telegram", false)], &log),
    );
    let summary = scanner.run().await?;

    assert_eq!(deliveries(&log), vec!["telegram:7", "telegram:8"]);
    assert_eq!(summary.items_new, 2);
    assert_eq!(read_ids(&items_file), vec!["7", "8"]);

    Ok(())
}

#[tokio::test]
async fn test_malformed_item_does_not_abort_batch() -> anyhow::Result<()> {
    let server = start_marketplace().await;
    let mut no_photo = item_json(2, "No photo");
    no_photo.as_object_mut().unwrap().remove("photo");
    mount_search(&server, "mixed", vec![item_json(1, "Good"), no_photo, item_json(3, "Also good")]).await;

    let dir = TempDir::new()?;
    let items_file = dir.path().join("items.txt");

    let log = new_log();
    let mut scanner = build_scanner(
        &server.uri(),
        vec![text_query("mixed")],
        &items_file,
        recording_dispatcher(&[("email", false)], &log),
    );
    let summary = scanner.run().await?;

    assert_eq!(deliveries(&log), vec!["email:1", "email:3"]);
    assert_eq!(summary.items_fetched, 2);
    assert_eq!(read_ids(&items_file), vec!["1", "3"]);

    Ok(())
}

#[tokio::test]
async fn test_ids_outside_history_grammar_are_dropped() -> anyhow::Result<()> {
    let server = start_marketplace().await;
    let mut split = item_json(0, "Split id");
    split["id"] = serde_json::json!("7\n8");
    let mut dotted = item_json(0, "Dotted id");
    dotted["id"] = serde_json::json!("abc.123");
    mount_search(&server, "odd", vec![split, dotted, item_json(9, "Plain")]).await;

    let dir = TempDir::new()?;
    let items_file = dir.path().join("items.txt");

    let log = new_log();
    let mut first = build_scanner(
        &server.uri(),
        vec![text_query("odd")],
        &items_file,
        recording_dispatcher(&[("email", false)], &log),
    );
    first.run().await?;

    assert_eq!(deliveries(&log), vec!["email:9"]);
    assert_eq!(read_ids(&items_file), vec!["9"]);

    // Genuinely new items 7 and 8 must not be suppressed by the rejected id
    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_search(&server, "odd", vec![item_json(7, "Seven"), item_json(8, "Eight")]).await;

    let second_log = new_log();
    let mut second = build_scanner(
        &server.uri(),
        vec![text_query("odd")],
        &items_file,
        recording_dispatcher(&[("email", false)], &second_log),
    );
    second.run().await?;

    assert_eq!(deliveries(&second_log), vec!["email:7", "email:8"]);
    assert_eq!(read_ids(&items_file), vec!["9", "7", "8"]);

    Ok(())
}

#[tokio::test]
async fn test_no_channels_still_records_items() -> anyhow::Result<()> {
    let server = start_marketplace().await;
    mount_search(&server, "quiet", vec![item_json(5, "Quiet")]).await;

    let dir = TempDir::new()?;
    let items_file = dir.path().join("items.txt");

    let mut scanner = build_scanner(
        &server.uri(),
        vec![text_query("quiet")],
        &items_file,
        NotificationDispatcher::new(),
    );
    let summary = scanner.run().await?;

    assert_eq!(summary.items_new, 1);
    assert_eq!(read_ids(&items_file), vec!["5"]);

    Ok(())
}
