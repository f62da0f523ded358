use magicpedia::store::{Store, CHARACTERS_KEY, HISTORY_KEY, SETTINGS_KEY};
use magicpedia::types::{default_characters, Character, Message, Settings};

#[test]
fn each_key_persists_independently() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let roster = default_characters();
    assert!(store.save(CHARACTERS_KEY, &roster));

    let mut settings = Settings::default();
    settings.remaining_time = 5;
    assert!(store.save(SETTINGS_KEY, &settings));

    let history = vec![
        Message::user("why is grass green?", "sparky"),
        Message::assistant("Chlorophyll!", "sparky", None),
    ];
    assert!(store.save(HISTORY_KEY, &history));

    // Reopen and read everything back.
    let store = Store::open(dir.path()).unwrap();
    let loaded_roster: Vec<Character> = store.load(CHARACTERS_KEY, Vec::new());
    assert_eq!(loaded_roster, roster);
    let loaded_settings: Settings = store.load(SETTINGS_KEY, Settings::default());
    assert_eq!(loaded_settings.remaining_time, 5);
    let loaded_history: Vec<Message> = store.load(HISTORY_KEY, Vec::new());
    assert_eq!(loaded_history, history);
}

#[test]
fn corrupt_key_does_not_poison_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    assert!(store.save(SETTINGS_KEY, &Settings::default()));
    std::fs::write(dir.path().join("characters.json"), "][").unwrap();

    let roster: Vec<Character> = store.load(CHARACTERS_KEY, default_characters());
    assert_eq!(roster, default_characters());
    let settings: Settings = store.load(SETTINGS_KEY, Settings::default());
    assert_eq!(settings, Settings::default());
}

#[test]
fn removing_the_history_key_clears_it_for_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let history = vec![Message::user("hi", "luna")];
    assert!(store.save(HISTORY_KEY, &history));
    assert!(store.remove(HISTORY_KEY));

    let loaded: Vec<Message> = store.load(HISTORY_KEY, Vec::new());
    assert!(loaded.is_empty());
}
