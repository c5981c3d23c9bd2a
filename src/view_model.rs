use std::collections::VecDeque;

use crate::db::NoteStore;
use crate::error::Result;
use crate::models::{Note, NoteId, UiState};
use crate::state::StateFlow;

enum Intent {
    Remove(NoteId),
}

/// Owns the home screen state and applies the user's intents to the store.
pub struct HomeViewModel {
    store: Box<dyn NoteStore>,
    ui_state: StateFlow<UiState>,
    pending: VecDeque<Intent>,
}

impl HomeViewModel {
    pub fn new(store: impl NoteStore + 'static) -> Result<Self> {
        let notes = store.list()?;
        tracing::info!("Loaded {} notes", notes.len());

        Ok(Self {
            store: Box::new(store),
            ui_state: StateFlow::new(UiState {
                notes,
                item_to_delete: None,
            }),
            pending: VecDeque::new(),
        })
    }

    pub fn ui_state(&self) -> StateFlow<UiState> {
        self.ui_state.clone()
    }

    /// Marks `note` for a delete confirmation, or clears the mark with `None`.
    /// Notes that are not currently listed are ignored.
    pub fn set_item_to_delete(&mut self, note: Option<Note>) {
        if let Some(note) = &note {
            if !self.ui_state.value().contains(&note.id) {
                tracing::warn!("Ignoring delete mark for unlisted note {}", note.id);
                return;
            }
        }
        self.ui_state.update(|state| state.item_to_delete = note);
    }

    /// Queues the removal. The list changes once [`Self::process_pending`] runs.
    pub fn remove_note(&mut self, id: NoteId) {
        tracing::debug!("Queued removal of note {id}");
        self.pending.push_back(Intent::Remove(id));
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Applies queued intents and republishes the list. Returns whether
    /// anything was applied.
    pub fn process_pending(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        while let Some(intent) = self.pending.pop_front() {
            match intent {
                Intent::Remove(id) => match self.store.delete(&id) {
                    Ok(()) => tracing::info!("Removed note {id}"),
                    Err(error) => tracing::error!("Failed to remove note {id}: {error}"),
                },
            }
        }
        self.refresh();
        true
    }

    /// Reloads the list from the store.
    pub fn refresh(&mut self) {
        match self.store.list() {
            Ok(notes) => self.publish_notes(notes),
            Err(error) => tracing::error!("Failed to load notes: {error}"),
        }
    }

    pub fn note(&self, id: &NoteId) -> Result<Option<Note>> {
        self.store.get(id)
    }

    pub fn add_note(&mut self, note: &Note) -> Result<()> {
        self.store.insert(note)?;
        tracing::info!("Added note {}", note.id);
        self.refresh();
        Ok(())
    }

    pub fn update_note(&mut self, note: &Note) -> Result<()> {
        self.store.update(note)?;
        tracing::info!("Updated note {}", note.id);
        self.refresh();
        Ok(())
    }

    fn publish_notes(&self, notes: Vec<Note>) {
        self.ui_state.update(|state| {
            state.notes = notes;
            let dangling = state
                .item_to_delete
                .as_ref()
                .is_some_and(|pending| !state.contains(&pending.id));
            if dangling {
                state.item_to_delete = None;
            }
        });
    }
}
