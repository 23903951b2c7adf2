use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::fetch::{Fetcher, HttpFetcher};

const SPINNER_INTERVAL_MS: u64 = 100;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Fetch and extract one page, reporting the outcome as a message.
pub fn load_page(fetcher: &dyn Fetcher, url: &str) -> Message {
    match fetcher.fetch(url) {
        Ok(bytes) => Message::Loaded(Box::new(crate::extract::extract(&bytes, url))),
        Err(err) => {
            tracing::warn!(url, error = %err, "page load failed");
            Message::LoadFailed(err.to_string())
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or terminal cannot be set up,
    /// or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let fetcher: Box<dyn Fetcher + Send> = match self.fetcher.take() {
            Some(fetcher) => fetcher,
            None => Box::new(HttpFetcher::new().context("Failed to build HTTP client")?),
        };

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - getwebsite requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model = Model::new(
            self.url.clone(),
            (size.width, size.height),
            Rc::clone(&self.engine),
        )
        .with_max_width(self.max_width);

        // The fetch thread is never joined; quitting abandons it.
        let (tx, rx) = mpsc::channel();
        let url = self.url.clone();
        let spawned = thread::Builder::new()
            .name("fetch".into())
            .spawn(move || {
                let _ = tx.send(load_page(&*fetcher, &url));
            });

        let result = match spawned {
            Ok(_) => self.event_loop(&mut terminal, &mut model, &rx),
            Err(err) => Err(anyhow::Error::new(err).context("Failed to start fetch thread")),
        };

        ratatui::restore();
        result
    }

    pub(super) fn dispatch(&self, model: &mut Model, msg: Message) {
        tracing::trace!(?msg, "message");
        *model = update(std::mem::take(model), msg);
        self.handle_message_side_effects(model);
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        rx: &Receiver<Message>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut last_tick = 0_u64;
        let mut needs_render = true;

        loop {
            while let Ok(msg) = rx.try_recv() {
                self.dispatch(model, msg);
                needs_render = true;
            }

            let now_ms = elapsed_ms(start);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::debug!(width, height, "resize applied");
                self.dispatch(model, Message::Resize(width, height));
                needs_render = true;
            }

            if model.is_loading() && now_ms.saturating_sub(last_tick) >= SPINNER_INTERVAL_MS {
                self.dispatch(model, Message::Tick);
                last_tick = now_ms;
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else if model.is_loading() {
                SPINNER_INTERVAL_MS / 2
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debouncer uses accurate times.
                let event_ms = elapsed_ms(start);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    self.dispatch(model, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms(start);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        self.dispatch(model, msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                let _draw_scope = crate::perf::scope("frame.draw");
                terminal.draw(|frame| Self::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
