//! Window-side half of the settings round trip: load once, save whole
//! documents, and replace the local copy with every broadcast.

use crate::host::{HostEvent, HostLink};
use crate::settings::SettingsDocument;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Synced,
    /// At least one of this window's saves has not come back as a broadcast
    /// yet.
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Loading failed; the session runs on the built-in defaults.
    FellBack { error: String },
}

pub struct SettingsSync {
    link: Box<dyn HostLink>,
    document: SettingsDocument,
    state: SyncState,
    revision: u64,
    /// Documents this window sent, oldest first, not yet echoed by the host.
    unanswered: VecDeque<SettingsDocument>,
}

impl SettingsSync {
    pub fn new(link: Box<dyn HostLink>) -> Self {
        Self {
            link,
            document: SettingsDocument::default(),
            state: SyncState::Uninitialized,
            revision: 0,
            unanswered: VecDeque::new(),
        }
    }

    pub fn initialize(&mut self) -> LoadOutcome {
        let outcome = match self.link.load_settings() {
            Ok(doc) => {
                tracing::info!(widgets = doc.active_widgets.len(), "settings loaded");
                self.document = doc;
                LoadOutcome::Loaded
            }
            Err(e) => {
                tracing::error!("failed to load settings, using defaults: {e:#}");
                self.document = SettingsDocument::default();
                LoadOutcome::FellBack {
                    error: format!("{e:#}"),
                }
            }
        };
        self.revision += 1;
        self.state = SyncState::Synced;
        outcome
    }

    pub fn document(&self) -> &SettingsDocument {
        &self.document
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Bumped on every local mutation and every applied broadcast.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mutate the local copy without saving.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut SettingsDocument) -> R) -> R {
        let out = f(&mut self.document);
        self.revision += 1;
        out
    }

    /// Mutate the local copy and immediately save the whole document.
    pub fn update_and_save<R>(&mut self, f: impl FnOnce(&mut SettingsDocument) -> R) -> R {
        let out = self.update(f);
        self.save();
        out
    }

    /// Send the whole document to the host. The answer arrives later as a
    /// broadcast.
    pub fn save(&mut self) {
        if self.state == SyncState::Uninitialized {
            tracing::warn!("save requested before settings were loaded; ignored");
            return;
        }
        match self.link.save_settings(self.document.clone()) {
            Ok(()) => {
                self.unanswered.push_back(self.document.clone());
                self.state = SyncState::Saving;
                tracing::debug!(revision = self.revision, "settings save sent");
            }
            Err(e) => tracing::error!("failed to save settings: {e:#}"),
        }
    }

    /// Replace the local copy with the host's canonical one. Never merges:
    /// whatever the window changed locally since is discarded.
    ///
    /// The host answers saves in the order it receives them, so an echo of
    /// this window's own save settles it and every older save still queued
    /// (those failed on the host and will never be echoed). A document not
    /// in the queue came from another window.
    pub fn receive_broadcast(&mut self, document: SettingsDocument) {
        match self.unanswered.iter().position(|sent| *sent == document) {
            Some(index) => {
                self.unanswered.drain(..=index);
            }
            None => tracing::debug!("settings changed by another window"),
        }
        self.document = document;
        self.revision += 1;
        self.state = if self.unanswered.is_empty() {
            SyncState::Synced
        } else {
            SyncState::Saving
        };
    }

    pub fn next_event(&self) -> Option<HostEvent> {
        self.link.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeLink {
        saved: Rc<RefCell<Vec<SettingsDocument>>>,
        fail_load: bool,
    }

    impl HostLink for FakeLink {
        fn load_settings(&self) -> anyhow::Result<SettingsDocument> {
            if self.fail_load {
                Err(anyhow!("store unreadable"))
            } else {
                Ok(SettingsDocument::default())
            }
        }

        fn save_settings(&self, document: SettingsDocument) -> anyhow::Result<()> {
            self.saved.borrow_mut().push(document);
            Ok(())
        }

        fn next_event(&self) -> Option<HostEvent> {
            None
        }
    }

    #[test]
    fn load_failure_falls_back_to_defaults() {
        let mut sync = SettingsSync::new(Box::new(FakeLink {
            fail_load: true,
            ..FakeLink::default()
        }));
        let outcome = sync.initialize();
        assert!(matches!(outcome, LoadOutcome::FellBack { .. }));
        assert_eq!(sync.state(), SyncState::Synced);
        assert_eq!(sync.document(), &SettingsDocument::default());
    }

    #[test]
    fn save_before_load_is_ignored() {
        let link = FakeLink::default();
        let mut sync = SettingsSync::new(Box::new(link.clone()));
        sync.save();
        assert!(link.saved.borrow().is_empty());
        assert_eq!(sync.state(), SyncState::Uninitialized);
    }

    #[test]
    fn saving_until_every_save_is_answered() {
        let link = FakeLink::default();
        let mut sync = SettingsSync::new(Box::new(link.clone()));
        sync.initialize();
        sync.update_and_save(|d| d.welcome_message = "one".into());
        sync.update_and_save(|d| d.welcome_message = "two".into());
        assert_eq!(sync.state(), SyncState::Saving);
        assert_eq!(link.saved.borrow().len(), 2);

        let first = link.saved.borrow()[0].clone();
        sync.receive_broadcast(first);
        assert_eq!(sync.state(), SyncState::Saving);
        let second = link.saved.borrow()[1].clone();
        sync.receive_broadcast(second);
        assert_eq!(sync.state(), SyncState::Synced);
        assert_eq!(sync.document().welcome_message, "two");
    }

    #[test]
    fn broadcast_from_another_window_keeps_own_save_pending() {
        let link = FakeLink::default();
        let mut sync = SettingsSync::new(Box::new(link.clone()));
        sync.initialize();
        sync.update_and_save(|d| d.welcome_message = "mine".into());

        let mut foreign = SettingsDocument::default();
        foreign.welcome_message = "theirs".into();
        sync.receive_broadcast(foreign);
        assert_eq!(sync.state(), SyncState::Saving);
        assert_eq!(sync.document().welcome_message, "theirs");

        let mine = link.saved.borrow()[0].clone();
        sync.receive_broadcast(mine);
        assert_eq!(sync.state(), SyncState::Synced);
        assert_eq!(sync.document().welcome_message, "mine");
    }

    #[test]
    fn echo_of_a_later_save_settles_one_the_host_dropped() {
        let link = FakeLink::default();
        let mut sync = SettingsSync::new(Box::new(link.clone()));
        sync.initialize();
        sync.update_and_save(|d| d.welcome_message = "lost".into());
        sync.update_and_save(|d| d.welcome_message = "kept".into());

        let kept = link.saved.borrow()[1].clone();
        sync.receive_broadcast(kept);
        assert_eq!(sync.state(), SyncState::Synced);
        assert_eq!(sync.document().welcome_message, "kept");
    }
}
