use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{DefaultTerminal, Frame};

use crate::config::Config;
use crate::editor::{EditorOutcome, EditorScreen};
use crate::home::{HomeNavigator, HomeScreen};
use crate::image_loader::ImageLoader;
use crate::models::NoteId;
use crate::profile::ProfileScreen;
use crate::view_model::HomeViewModel;

enum Screen {
    Home,
    Editor(EditorScreen),
    Profile(ProfileScreen),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    AddNote,
    OpenNote(NoteId),
    Profile,
}

/// Collects the home screen's navigation requests until the loop applies them.
#[derive(Default)]
struct Router {
    next: Option<Route>,
}

impl HomeNavigator for Router {
    fn on_add_new_note(&mut self) {
        self.next = Some(Route::AddNote);
    }

    fn on_open_note(&mut self, id: &NoteId) {
        self.next = Some(Route::OpenNote(id.clone()));
    }

    fn on_open_profile(&mut self) {
        self.next = Some(Route::Profile);
    }
}

pub struct App {
    config: Config,
    view_model: HomeViewModel,
    home: HomeScreen,
    screen: Screen,
    router: Router,
    images: ImageLoader,
    running: bool,
}

impl App {
    pub fn new(view_model: HomeViewModel, config: Config) -> Self {
        let ui_state = view_model.ui_state();
        ui_state.subscribe(|state| {
            tracing::trace!(
                notes = state.notes.len(),
                pending_delete = state.item_to_delete.is_some(),
                "ui state emitted"
            );
        });

        Self {
            home: HomeScreen::new(&ui_state, config.long_press_timeout),
            config,
            view_model,
            screen: Screen::Home,
            router: Router::default(),
            images: ImageLoader::new(),
            running: true,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> std::io::Result<()> {
        while self.running {
            if self.view_model.has_pending() {
                self.view_model.process_pending();
            }
            self.images.poll();
            self.home.sync();
            terminal.draw(|f| self.draw(f))?;

            let timeout = match self.home.deadline() {
                Some(deadline) => deadline
                    .saturating_duration_since(Instant::now())
                    .min(self.config.tick_rate),
                None => self.config.tick_rate,
            };
            if event::poll(timeout)? {
                let event = event::read()?;
                self.handle_event(&event, Instant::now());
            }
            self.home.tick(Instant::now(), &mut self.view_model);
            self.apply_route();
        }

        Ok(())
    }

    fn handle_event(&mut self, event: &Event, now: Instant) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press
                && key.modifiers == KeyModifiers::CONTROL
                && key.code == KeyCode::Char('c')
            {
                self.running = false;
                return;
            }
        }

        match &mut self.screen {
            Screen::Home => {
                let consumed =
                    self.home
                        .handle_event(event, now, &mut self.view_model, &mut self.router);
                if !consumed {
                    if let Event::Key(key) = event {
                        if key.kind == KeyEventKind::Press
                            && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                        {
                            self.running = false;
                        }
                    }
                }
            }
            Screen::Editor(editor) => {
                if editor.handle_event(event, &mut self.view_model) == EditorOutcome::Close {
                    self.screen = Screen::Home;
                }
            }
            Screen::Profile(profile) => {
                if profile.handle_event(event) {
                    self.screen = Screen::Home;
                }
            }
        }
    }

    fn apply_route(&mut self) {
        let Some(route) = self.router.next.take() else {
            return;
        };
        tracing::debug!("Navigating to {route:?}");

        self.screen = match route {
            Route::AddNote => Screen::Editor(EditorScreen::new_note()),
            Route::OpenNote(id) => match self.view_model.note(&id) {
                Ok(Some(note)) => Screen::Editor(EditorScreen::edit(note)),
                Ok(None) => {
                    tracing::warn!("Note {id} disappeared before it could be opened");
                    Screen::Home
                }
                Err(error) => {
                    tracing::error!("Failed to open note {id}: {error}");
                    Screen::Home
                }
            },
            Route::Profile => {
                let note_count = self.view_model.ui_state().value().notes.len();
                Screen::Profile(ProfileScreen::new(&self.config, note_count))
            }
        };
    }

    fn draw(&mut self, frame: &mut Frame) {
        match &self.screen {
            Screen::Home => self.home.draw(frame, &mut self.images),
            Screen::Editor(editor) => editor.draw(frame),
            Screen::Profile(profile) => profile.draw(frame),
        }
    }
}
