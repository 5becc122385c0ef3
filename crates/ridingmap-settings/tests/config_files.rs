use ridingmap_core::Color;
use ridingmap_settings::RenderSettings;

fn customised() -> RenderSettings {
    RenderSettings {
        margin: 6.0,
        worker_threads: 2,
        outline_color: Color::rgb(10, 20, 30),
        ..RenderSettings::default()
    }
}

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.toml");

    let settings = customised();
    settings.save_to_file(&path).unwrap();
    let loaded = RenderSettings::load_from_file(&path).unwrap();
    assert_eq!(loaded, settings);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("outline_color = \"#0a141e\""));
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("render.json");

    let settings = customised();
    settings.save_to_file(&path).unwrap();
    let loaded = RenderSettings::load_from_file(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.yaml");
    assert!(RenderSettings::default().save_to_file(&path).is_err());

    std::fs::write(&path, "margin: 1").unwrap();
    assert!(RenderSettings::load_from_file(&path).is_err());
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.toml");
    std::fs::write(&path, "flatten_tolerance = 0.0\n").unwrap();

    let err = RenderSettings::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Flatten tolerance"));
}

#[test]
fn test_bad_color_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.toml");
    std::fs::write(&path, "outline_color = \"grey\"\n").unwrap();

    assert!(RenderSettings::load_from_file(&path).is_err());
}
