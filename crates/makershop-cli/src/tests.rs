use super::*;

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["makershop-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Migrate));
}

#[test]
fn parses_import_csv_with_batch() {
    let cli = Cli::try_parse_from([
        "makershop-cli",
        "import-csv",
        "--file",
        "/tmp/list.xlsx",
        "--batch",
        "b-1",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::ImportCsv {
            file,
            batch,
            prune_staging,
        } => {
            assert_eq!(file, PathBuf::from("/tmp/list.xlsx"));
            assert_eq!(batch.as_deref(), Some("b-1"));
            assert!(!prune_staging);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn import_csv_requires_a_file() {
    assert!(Cli::try_parse_from(["makershop-cli", "import-csv"]).is_err());
}

#[test]
fn parses_sync_media_with_preference() {
    let cli = Cli::try_parse_from([
        "makershop-cli",
        "sync-media",
        "--sku",
        "SKU-1",
        "--prefer",
        "https://cdn.test/hero.jpg",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::SyncMedia { sku, prefer } => {
            assert_eq!(sku, "SKU-1");
            assert_eq!(prefer.as_deref(), Some("https://cdn.test/hero.jpg"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn url_job_attributes_must_be_a_json_object() {
    let err = import::build_url_job(
        "https://maker.example/part.stl".to_string(),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        Some("not-json".to_string()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("JSON object"));

    let job = import::build_url_job(
        "https://maker.example/part.stl".to_string(),
        Some("SKU-1".to_string()),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        Some(r#"{"material": "PLA"}"#.to_string()),
    )
    .expect("object payload parses");
    assert_eq!(job.attributes["material"], "PLA");
}
