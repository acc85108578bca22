//! Integration tests for loading, mutating and saving pet state.

use chrono::{Duration, Local, Utc};
use walkfeed_core::storage::data_dir;
use walkfeed_core::{
    Config, Database, EconomyConfig, FoodCatalog, PetEconomy, PetGender, PetIdentity, PetKind,
    StateStore,
};

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("walkfeed.db");
    let catalog = FoodCatalog::default();

    {
        let db = Database::open_at(&path).unwrap();
        let mut eco = PetEconomy::new(EconomyConfig::default());
        eco.adopt(PetIdentity::new(PetKind::Pufferfish, "Puff", PetGender::Male).unwrap());
        eco.ingest_steps(3_000);
        eco.tick_decay(40.0);
        assert!(eco.feed(catalog.find("cake").unwrap()).success);
        db.save(eco.state()).unwrap();
        db.record_daily_steps(Local::now().date_naive(), eco.state().today_steps)
            .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let state = StateStore::load(&db).unwrap().expect("state was saved");
    assert_eq!(state.hunger_points, 250);
    assert_eq!(state.hunger_level, 100.0);
    assert_eq!(state.pet.as_ref().map(|p| p.name.as_str()), Some("Puff"));
    assert_eq!(db.steps_on(Local::now().date_naive()).unwrap(), 3_000);
    assert_eq!(db.lifetime_steps().unwrap(), 3_000);
}

#[test]
fn offline_catch_up_after_reload() {
    let db = Database::open_memory().unwrap();
    let config = EconomyConfig {
        decay_per_tick: 1.0,
        ..Default::default()
    };

    let mut eco = PetEconomy::new(config.clone());
    let then = Utc::now() - Duration::seconds(30);
    eco.catch_up(then, config.tick_interval());
    db.save(eco.state()).unwrap();

    let stored = StateStore::load(&db).unwrap().unwrap();
    let mut eco = PetEconomy::from_state(stored, config.clone());
    let out = eco.catch_up(then + Duration::seconds(30), config.tick_interval());
    assert_eq!(out.ticks, 30);
    assert!((eco.state().hunger_level - 70.0).abs() < 1e-9);
}

#[test]
fn config_file_drives_the_economy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[economy]
decay_per_tick = 2.0
points_per_step = 0.5

[[catalog]]
name = "Kibble"
price = 4
gain = 8
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let mut eco = PetEconomy::new(config.economy.clone());
    eco.ingest_steps(9);
    assert_eq!(eco.state().hunger_points, 4);
    eco.tick();
    assert_eq!(eco.state().hunger_level, 98.0);

    let kibble = config.catalog.find("kibble").unwrap();
    let out = eco.feed(kibble);
    assert!(out.success);
    assert_eq!(out.hunger_points, 0);
    assert_eq!(out.hunger_level, 100.0);
    assert!(config.catalog.find("steak").is_none());
}

#[test]
fn data_dir_honours_override() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested");
    std::env::set_var("WALKFEED_DATA_DIR", &target);
    let resolved = data_dir().unwrap();
    std::env::remove_var("WALKFEED_DATA_DIR");
    assert_eq!(resolved, target);
    assert!(target.is_dir());
}
