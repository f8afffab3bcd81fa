//! End-to-end tests over the fixture catalogs in `fixtures/catalog/`.
//!
//! Each test writes a config file into a temp directory that points at the
//! fixtures, loads everything the way the CLI does, and drives a session.

use feature_scripts::catalog::{self, CatalogPaths, Catalogs};
use feature_scripts::config::{self, AppConfig};
use feature_scripts::placeholders::{PlaceholderFamily, ReviewState, ScriptSlot};
use feature_scripts::session::{CopyOutcome, ScriptSession};
use feature_scripts::settings::{FileSettings, MemorySettings, SettingsStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog")
}

fn load_fixture_config(tmp: &TempDir) -> AppConfig {
    let dir = fixtures();
    let path = tmp.path().join(config::CONFIG_FILENAME);
    fs::write(
        &path,
        format!(
            "[catalog]\npages = {:?}\ntemplates = {:?}\ndisallow_lists = {:?}\ncaution_lists = {:?}\n",
            dir.join("pages.json").display().to_string(),
            dir.join("templates.json").display().to_string(),
            dir.join("disallow_lists.json").display().to_string(),
            dir.join("caution_lists.json").display().to_string(),
        ),
    )
    .unwrap();
    config::load_config(&path).unwrap()
}

fn load_catalogs(config: &AppConfig) -> Catalogs {
    let paths = &config.catalog;
    catalog::load_catalogs(CatalogPaths {
        pages: &paths.pages,
        templates: &paths.templates,
        disallow_lists: Some(&paths.disallow_lists),
        caution_lists: Some(&paths.caution_lists),
    })
    .unwrap()
}

fn session_on(page: &str) -> ScriptSession<MemorySettings> {
    let tmp = TempDir::new().unwrap();
    let config = load_fixture_config(&tmp);
    let catalogs = load_catalogs(&config);
    let mut session = ScriptSession::new(catalogs, config, MemorySettings::new());
    session.set_page(page);
    session.set_user_name("alice");
    session.set_membership("Snap VIP Member");
    session.set_your_name("bob");
    session.set_your_first_name("Bob");
    session
}

#[test]
fn first_raw_feature_on_long_exposure() {
    let mut session = session_on("snap:longexposure");
    session.set_first_for_page(true);
    session.set_raw_tag(true);
    assert_eq!(
        session.scripts().feature,
        "First feature on Long Exposure for @alice, unedited! Shot in [[LOCATION]]."
    );
}

#[test]
fn bare_feature_substitutes_every_field() {
    let session = session_on("snap:longexposure");
    assert_eq!(
        session.scripts().feature,
        "Congratulations @alice, your photo is featured on long_exposure! Level: VIP Member\n\
         Shot in [[LOCATION]].\n[{STORY}]\nBob (@bob), Mod of snap_longexposure"
    );
}

#[test]
fn raw_is_preferred_over_raw_community() {
    let mut session = session_on("snap:longexposure");
    session.set_raw_tag(true);
    session.set_community_tag(true);
    assert_eq!(session.scripts().feature, "Raw feature for @alice");
}

#[test]
fn hub_tag_only_applies_on_click() {
    let mut session = session_on("click:macro");
    session.set_membership("Click Gold Member");
    assert_eq!(session.scripts().feature, "Featured on Macro: @alice (Click Gold Member)");
    session.set_hub_tag(true);
    assert_eq!(session.scripts().feature, "Hub feature on Macro: @alice");
    // Raw is not a click tag.
    session.set_hub_tag(false);
    session.set_raw_tag(true);
    assert_eq!(session.scripts().feature, "Featured on Macro: @alice (Click Gold Member)");
}

#[test]
fn location_is_shared_across_scripts() {
    let mut session = session_on("snap:longexposure");

    assert_eq!(session.prepare_copy(ScriptSlot::Feature, false), CopyOutcome::NeedsEditor);
    session.set_placeholder_value(ScriptSlot::Feature, PlaceholderFamily::Short, "LOCATION", "Paris");
    session.set_placeholder_value(
        ScriptSlot::Feature,
        PlaceholderFamily::Long,
        "STORY",
        "  Waited an hour for the light.  ",
    );
    let CopyOutcome::Ready(feature) = session.finish_editing(ScriptSlot::Feature) else {
        panic!("feature should be ready");
    };
    assert!(feature.contains("Shot in Paris.\nWaited an hour for the light.\n"));

    // The comment discovers LOCATION and gets it pre-filled.
    assert_eq!(session.prepare_copy(ScriptSlot::Comment, false), CopyOutcome::NeedsEditor);
    assert_eq!(
        session
            .placeholders()
            .map(ScriptSlot::Comment, PlaceholderFamily::Short)
            .resolved_value("LOCATION"),
        "Paris"
    );
    assert_eq!(
        session.finish_editing(ScriptSlot::Comment),
        CopyOutcome::Ready("Congrats on your feature @alice! Lovely Paris shot. #snap_longexposure".into())
    );
}

#[test]
fn transfer_on_copy_updates_siblings() {
    let mut session = session_on("snap:longexposure");
    session.prepare_copy(ScriptSlot::Feature, false);
    session.finish_editing(ScriptSlot::Feature);
    session.prepare_copy(ScriptSlot::OriginalPost, false);
    session.set_placeholder_value(ScriptSlot::OriginalPost, PlaceholderFamily::Short, "LOCATION", "Oslo");
    assert_eq!(
        session.finish_editing(ScriptSlot::OriginalPost),
        CopyOutcome::Ready("Featured: @alice in Oslo\n#snap_longexposure".into())
    );

    let feature_map = session
        .placeholders()
        .map(ScriptSlot::Feature, PlaceholderFamily::Short);
    assert_eq!(feature_map.resolved_value("LOCATION"), "Oslo");
}

#[test]
fn user_change_during_editing_asks_again() {
    let mut session = session_on("snap:longexposure");
    assert_eq!(session.prepare_copy(ScriptSlot::OriginalPost, false), CopyOutcome::NeedsEditor);
    session.set_placeholder_value(ScriptSlot::OriginalPost, PlaceholderFamily::Short, "LOCATION", "Oslo");
    session.set_user_name("carol");

    // The marker is not stripped; the editor comes back with an empty value.
    assert_eq!(session.finish_editing(ScriptSlot::OriginalPost), CopyOutcome::NeedsEditor);
    let map = session.placeholders().map(ScriptSlot::OriginalPost, PlaceholderFamily::Short);
    assert_eq!(map.resolved_value("LOCATION"), "");
}

#[test]
fn changing_the_user_resets_placeholders() {
    let mut session = session_on("snap:longexposure");
    for slot in ScriptSlot::ALL {
        session.prepare_copy(slot, false);
    }
    session.set_user_name("carol");
    for slot in ScriptSlot::ALL {
        assert_eq!(session.placeholders().state(slot), ReviewState::Clean);
        for family in PlaceholderFamily::ALL {
            assert!(session.placeholders().map(slot, family).is_empty());
        }
    }
}

#[test]
fn disallow_and_caution_lists_from_files() {
    let mut session = session_on("snap:longexposure");
    session.set_user_name("Spammer");
    assert_eq!(session.scripts().feature, "User: User is on the disallow list\n");

    // The flat caution list applies to every hub.
    session.set_page("click:macro");
    session.set_user_name("borderline");
    assert!(session.can_copy_scripts());
    assert_eq!(session.validation().user.message(), "User is on the caution list");
}

#[test]
fn new_membership_script_from_special_templates() {
    let mut session = session_on("snap:longexposure");
    assert_eq!(session.new_memberships(), vec!["None", "member", "vip member"]);
    session.set_new_membership("VIP Member");
    assert_eq!(session.new_membership_script(), "You're now a snap VIP member, @alice!");
}

#[test]
fn include_space_applies_to_generated_scripts() {
    let mut session = session_on("click:macro");
    session.set_membership("Click Gold Member");
    session.set_include_space(true);
    let scripts = session.scripts();
    assert_eq!(scripts.feature, "Featured on Macro: @ alice (Click Gold Member)");
    // "@alice!" isn't followed by a mention terminator.
    assert_eq!(scripts.comment, "Congrats @alice!");
}

#[test]
fn settings_survive_between_sessions() {
    let tmp = TempDir::new().unwrap();
    let config = load_fixture_config(&tmp);
    let settings_path = tmp.path().join("settings.toml");

    {
        let store = FileSettings::open(&settings_path).unwrap();
        let mut session = ScriptSession::new(load_catalogs(&config), config.clone(), store);
        session.set_page("click:street");
        session.set_your_name("bob");
        session.set_your_first_name("Bob");
        session.set_staff_level("Admin");
        session.store_mut().save().unwrap();
    }

    let store = FileSettings::open(&settings_path).unwrap();
    assert_eq!(store.get("YourName").as_deref(), Some("bob"));
    let session = ScriptSession::new(load_catalogs(&config), config, store);
    assert_eq!(session.fields().page, "click:street");
    assert_eq!(session.fields().your_first_name, "Bob");
    assert_eq!(session.fields().staff_level, "Admin");
}

#[test]
fn empty_catalogs_never_fail() {
    let session = ScriptSession::new(Catalogs::default(), AppConfig::default(), MemorySettings::new());
    let scripts = session.scripts();
    assert!(scripts.feature.starts_with("User: Required value\n"));
    assert_eq!(scripts.comment, "");
    assert_eq!(scripts.original_post, "");
}
