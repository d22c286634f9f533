use super::*;

use chrono::Utc;
use laundrygo_core::{FilterKind, Platform, RankedRecord, ShopForm, ShopRecord};
use laundrygo_discovery::{DiscoveryModel, LocationFix, LocationProvider};

fn shop(id: &str, name: &str) -> ShopRecord {
    ShopRecord {
        id: id.to_string(),
        name: name.to_string(),
        coordinates: Some("-7.8,110.4".to_string()),
        phone: Some("tel:08123".to_string()),
        price_per_kg: Some("7000".to_string()),
        ..ShopRecord::default()
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["laundrygo"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_list_with_location() {
    let cli = Cli::try_parse_from([
        "laundrygo", "list", "--filter", "nearest", "--lat", "-7.8", "--lng", "110.4",
    ])
    .expect("expected valid cli args");

    let Some(Commands::List(args)) = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(FilterKind::parse(&args.filter), FilterKind::Nearest);
    assert_eq!(args.lat, Some(-7.8));
    assert_eq!(args.lng, Some(110.4));
    assert!(!args.json);
}

#[test]
fn list_defaults_to_all() {
    let cli = Cli::try_parse_from(["laundrygo", "watch", "--json"]).unwrap();
    let Some(Commands::Watch(args)) = cli.command else {
        panic!("expected watch command");
    };
    assert_eq!(FilterKind::parse(&args.filter), FilterKind::All);
    assert!(args.json);
    assert!(args.snapshot.is_none());
}

#[test]
fn latitude_requires_longitude() {
    let result = Cli::try_parse_from(["laundrygo", "list", "--lat", "-7.8"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn missing_location_args_mean_unavailable() {
    let cli = Cli::try_parse_from(["laundrygo", "list"]).unwrap();
    let Some(Commands::List(args)) = cli.command else {
        panic!("expected list command");
    };
    assert!(discover::location(&args).current_location().await.is_err());
}

#[tokio::test]
async fn location_args_become_a_fixed_fix() {
    let cli = Cli::try_parse_from(["laundrygo", "list", "--lat", "-7.8", "--lng", "110.4"]).unwrap();
    let Some(Commands::List(args)) = cli.command else {
        panic!("expected list command");
    };
    let fix = discover::location(&args).current_location().await.unwrap();
    assert_eq!(fix, LocationFix::new(-7.8, 110.4));
}

#[test]
fn parses_add_with_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "laundrygo",
        "add",
        "--name",
        "Marta Laundry",
        "--coordinates",
        "-7.8,110.4",
        "--phone",
        "6281234",
        "--accuracy",
        "12.5",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Add(args)) = cli.command else {
        panic!("expected add command");
    };
    let draft = args.to_form().validate_new().expect("valid form");
    assert_eq!(draft.coordinates, "-7.8,110.4");
    assert_eq!(draft.accuracy, "12.50");
    assert_eq!(draft.phone, "6281234");
}

#[test]
fn add_without_phone_fails_to_parse() {
    let result = Cli::try_parse_from([
        "laundrygo",
        "add",
        "--name",
        "Marta Laundry",
        "--coordinates",
        "-7.8,110.4",
    ]);
    assert!(result.is_err());
}

#[test]
fn edit_overlays_only_given_fields() {
    let cli = Cli::try_parse_from(["laundrygo", "edit", "--price", "8000", "--", "-N1"]).unwrap();
    let Some(Commands::Edit(args)) = cli.command else {
        panic!("expected edit command");
    };
    assert_eq!(args.id, "-N1");

    let mut form = ShopForm::from_record(&shop("-N1", "Marta Laundry"));
    args.apply(&mut form);
    assert_eq!(form.price_per_kg, "8000");
    assert_eq!(form.name, "Marta Laundry");
    assert_eq!(form.phone, "08123");

    let draft = form.validate_edit(&args.id).expect("valid edit");
    assert_eq!(draft.phone, "tel:08123");
}

#[test]
fn parses_delete_and_links() {
    let cli = Cli::try_parse_from(["laundrygo", "delete", "abc"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Delete { id }) if id == "abc"));

    let cli = Cli::try_parse_from(["laundrygo", "links", "abc", "--platform", "ios"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Links { id, platform }) if id == "abc" && platform == "ios"
    ));
}

#[test]
fn render_state_shows_title_prices_and_distance() {
    let mut model = DiscoveryModel::new(FilterKind::Nearest);
    model.apply_snapshot(vec![shop("m", "Marta Laundry")], Utc::now());
    model.apply_location(Ok(LocationFix::new(-7.8, 110.4)));

    let lines = discover::render_state(&model.state());
    assert_eq!(lines[0], "== Nearest ==");
    assert!(lines[1].contains("Marta Laundry"), "{lines:?}");
    assert!(lines[1].contains("Rp 7.000"), "{lines:?}");
    assert!(lines[1].ends_with("0.00 km"), "{lines:?}");
}

#[test]
fn render_state_reports_notices_and_empty_results() {
    let mut model = DiscoveryModel::new(FilterKind::Cheapest);
    model.apply_snapshot(Vec::new(), Utc::now());
    model.apply_feed_error("offline");

    let lines = discover::render_state(&model.state());
    assert_eq!(lines[0], "== Cheapest ==");
    assert!(lines.contains(&"! Failed to load laundry data: offline".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("no laundries found"));
}

#[test]
fn render_state_omits_unknown_distance() {
    let state = laundrygo_discovery::DiscoveryState {
        filter: FilterKind::Nearest,
        loading: false,
        records: vec![RankedRecord {
            record: shop("m", "Marta Laundry"),
            distance_km: Some(f64::INFINITY),
        }],
        location: None,
        location_notice: None,
        feed_error: None,
        updated_at: None,
    };
    let lines = discover::render_state(&state);
    assert!(!lines[1].contains("km"), "{lines:?}");
}

#[test]
fn render_groups_lists_members_under_titles() {
    let groups = laundrygo_core::group_by_name(&[shop("a", "Marta Laundry"), shop("b", "")]);
    let lines = points::render_groups(&groups);
    assert_eq!(lines[0], "Laundry Lainnya (1)");
    assert!(lines[1].trim_start().starts_with('b'));
    assert_eq!(lines[2], "Marta Laundry (1)");
}

#[test]
fn shop_links_cover_every_usable_field() {
    let links = links::shop_links(&shop("m", "Marta Laundry"), Platform::Android);
    let labels: Vec<&str> = links.iter().map(|(label, _)| *label).collect();
    assert_eq!(labels, vec!["map", "directions", "phone", "whatsapp"]);

    let (_, phone) = &links[2];
    assert_eq!(phone.fallback, "tel:08123");
    let (_, whatsapp) = &links[3];
    assert_eq!(whatsapp.fallback, "https://wa.me/628123");
}

#[test]
fn shop_links_skip_missing_fields() {
    let record = ShopRecord {
        id: "x".to_string(),
        coordinates: Some("not a place".to_string()),
        ..ShopRecord::default()
    };
    let links = links::shop_links(&record, Platform::Web);
    let labels: Vec<&str> = links.iter().map(|(label, _)| *label).collect();
    assert_eq!(labels, vec!["map"]);
}

#[test]
fn read_snapshot_decodes_an_export() {
    let path = std::env::temp_dir().join(format!("laundrygo-snapshot-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"-N1":{"name":"Exo Laundry","hargaPerKg":"4000"}}"#).unwrap();

    let records = discover::read_snapshot(&path).expect("valid export");
    std::fs::remove_file(&path).ok();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "-N1");
    assert_eq!(records[0].name, "Exo Laundry");
}
