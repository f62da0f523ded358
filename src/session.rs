//! Conversation orchestrator: owns the roster, settings, and history,
//! sequences one user turn end-to-end, and keeps the persistent store in
//! sync after every mutation.
//!
//! Turns are serialized by `&mut self`: a stale provider response can
//! never be applied after a newer turn has started, because a newer turn
//! cannot start while one is in flight.

use crate::audio::{self, Player};
use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::router;
use crate::safety;
use crate::speech;
use crate::store::{
    Store, CHARACTERS_KEY, HISTORY_KEY, SELECTED_CHARACTER_KEY, SETTINGS_KEY,
};
use crate::types::{default_characters, Character, Message, Settings};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

fn lock(settings: &Mutex<Settings>) -> MutexGuard<'_, Settings> {
    // A poisoned lock only means a panicked tick; the data is still good.
    settings.lock().unwrap_or_else(|e| e.into_inner())
}

/// One minute elapsed: burn one minute of the budget, never below zero.
pub fn tick_minute(settings: &mut Settings) {
    settings.remaining_time = settings.remaining_time.saturating_sub(1);
}

/// Abort-on-drop handle for the background minute ticker.
pub struct TimeTicker {
    handle: JoinHandle<()>,
}

impl TimeTicker {
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for TimeTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start the once-per-minute budget countdown. The tick mutates the shared
/// settings and persists them; dropping the returned handle cancels it.
pub fn spawn_time_ticker(settings: Arc<Mutex<Settings>>, store: Store) -> TimeTicker {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        // The first tick of a tokio interval fires immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = {
                let mut guard = lock(&settings);
                tick_minute(&mut guard);
                guard.clone()
            };
            store.save(SETTINGS_KEY, &snapshot);
            if snapshot.remaining_time == 0 {
                log::info!("Screen-time budget used up");
            }
        }
    });
    TimeTicker { handle }
}

pub struct Session {
    store: Store,
    credentials: ApiConfig,
    characters: Vec<Character>,
    selected_id: String,
    settings: Arc<Mutex<Settings>>,
    history: Vec<Message>,
    player: Option<Player>,
}

impl Session {
    /// Load all state from the store, seeding defaults on first run.
    pub fn new(store: Store, credentials: ApiConfig) -> Self {
        let mut characters: Vec<Character> = store.load(CHARACTERS_KEY, Vec::new());
        if characters.is_empty() {
            characters = default_characters();
        }

        let selected_id: String = store.load(SELECTED_CHARACTER_KEY, String::new());
        let selected_id = if characters.iter().any(|c| c.id == selected_id) {
            selected_id
        } else {
            characters[0].id.clone()
        };

        let settings: Settings = store.load(SETTINGS_KEY, Settings::default());
        let history: Vec<Message> = store.load(HISTORY_KEY, Vec::new());

        let player = match Player::new() {
            Ok(player) => Some(player),
            Err(e) => {
                log::warn!("No audio output available, speech disabled: {}", e);
                None
            }
        };

        Self {
            store,
            credentials,
            characters,
            selected_id,
            settings: Arc::new(Mutex::new(settings)),
            history,
            player,
        }
    }

    /// Shared settings handle for the background ticker.
    pub fn settings_handle(&self) -> Arc<Mutex<Settings>> {
        Arc::clone(&self.settings)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Snapshot of the current settings, passed by value into the router
    /// and adapters.
    pub fn settings(&self) -> Settings {
        lock(&self.settings).clone()
    }

    /// Mutate the settings and persist the result.
    pub fn update_settings(&self, apply: impl FnOnce(&mut Settings)) {
        let snapshot = {
            let mut guard = lock(&self.settings);
            apply(&mut guard);
            guard.clone()
        };
        self.store.save(SETTINGS_KEY, &snapshot);
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn selected_character(&self) -> &Character {
        self.characters
            .iter()
            .find(|c| c.id == self.selected_id)
            .unwrap_or(&self.characters[0])
    }

    pub fn select_character(&mut self, id: &str) -> bool {
        if !self.characters.iter().any(|c| c.id == id) {
            return false;
        }
        self.selected_id = id.to_string();
        self.store.save(SELECTED_CHARACTER_KEY, &self.selected_id);
        true
    }

    /// Add a user-authored character. The safety gate runs first and
    /// blocks persistence of flagged content.
    pub async fn add_character(&mut self, character: Character) -> Result<()> {
        self.check_character(&character).await?;
        let id = character.id.clone();
        self.characters.push(character);
        self.store.save(CHARACTERS_KEY, &self.characters);
        self.select_character(&id);
        Ok(())
    }

    /// Update an existing character, re-running the safety gate.
    pub async fn update_character(&mut self, character: Character) -> Result<()> {
        let index = match self.characters.iter().position(|c| c.id == character.id) {
            Some(index) => index,
            None => return Err(AppError::UnknownCharacter(character.id)),
        };
        self.check_character(&character).await?;
        self.characters[index] = character;
        self.store.save(CHARACTERS_KEY, &self.characters);
        Ok(())
    }

    async fn check_character(&self, character: &Character) -> Result<()> {
        let text = format!("{}\n{}", character.persona, character.system_prompt);
        let verdict = safety::classify(&text, &self.settings(), &self.credentials).await;
        if !verdict.safe {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "not suitable for children".to_string());
            return Err(AppError::Rejected(reason));
        }
        Ok(())
    }

    /// Delete a character. Deleting the last remaining one is a no-op.
    pub fn delete_character(&mut self, id: &str) -> bool {
        if self.characters.len() <= 1 {
            return false;
        }
        let index = match self.characters.iter().position(|c| c.id == id) {
            Some(index) => index,
            None => return false,
        };
        self.characters.remove(index);
        if self.selected_id == id {
            self.selected_id = self.characters[0].id.clone();
            self.store.save(SELECTED_CHARACTER_KEY, &self.selected_id);
        }
        self.store.save(CHARACTERS_KEY, &self.characters);
        true
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The per-character view of the log.
    pub fn history_for(&self, character_id: &str) -> Vec<&Message> {
        self.history
            .iter()
            .filter(|m| m.character_id == character_id)
            .collect()
    }

    /// Empty the whole conversation log.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.store.remove(HISTORY_KEY);
    }

    /// One full user turn: persist the question, obtain an answer, persist
    /// it, then speak it. Failures after the append stage never roll back
    /// what is already persisted.
    pub async fn send(&mut self, text: &str) -> Message {
        if let Some(player) = &self.player {
            player.stop();
        }

        let character = self.selected_character().clone();

        let user_msg = Message::user(text, character.id.clone());
        self.history.push(user_msg);
        self.store.save(HISTORY_KEY, &self.history);

        let settings = self.settings();
        let answer =
            router::answer(text, &character.system_prompt, &settings, &self.credentials).await;

        for source in &answer.sources {
            log::info!("Source: {} ({})", source.title, source.uri);
        }

        let assistant_msg =
            Message::assistant(answer.text.clone(), character.id.clone(), answer.image_url);
        self.history.push(assistant_msg.clone());
        self.store.save(HISTORY_KEY, &self.history);

        self.speak(&answer.text).await;

        assistant_msg
    }

    /// Synthesize and play `text` with the selected character's voice.
    /// Silently skips on any failure.
    pub async fn speak(&self, text: &str) {
        let player = match &self.player {
            Some(player) => player,
            None => return,
        };

        let settings = self.settings();
        let voice = self.selected_character().voice.to_string();
        let result = match speech::synthesize(text, &voice, &settings, &self.credentials).await {
            Some(result) => result,
            None => return,
        };

        match audio::decode(&result) {
            Ok(buffer) => player.play(buffer),
            Err(e) => log::warn!("Audio decode failed: {}", e),
        }
    }

    /// Stop any current speech output.
    pub fn stop_speaking(&self) {
        if let Some(player) = &self.player {
            player.stop();
        }
    }
}
