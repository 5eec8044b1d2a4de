/// Async driver for the story player
///
/// Owns the one and only story timer. The timer lives inside the loop body
/// for a single story, so moving to another story (or leaving) drops it
/// before the next one is armed.
use crate::api::SocialApi;
use crate::config::Config;
use crate::routes::Route;
use crate::story::player::{ExitReason, StoryPlayer, Transition};
use crate::types::{Story, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    Next,
    Prev,
    /// Tap at `x` on a viewport `width` wide
    Click { x: f64, width: f64 },
    /// Open the delete confirmation (owner only)
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    Close,
}

/// Everything a view needs to draw the current story
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerFrame {
    pub index: usize,
    pub total: usize,
    pub story: Story,
    pub bars: Vec<f64>,
    pub has_prev: bool,
    pub has_next: bool,
    pub can_delete: bool,
    pub confirming_delete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Frame(ViewerFrame),
    /// User-visible, non-fatal message
    Notice(String),
    Exited(Route),
}

pub struct StoryViewer<A: SocialApi> {
    api: Arc<A>,
    player: StoryPlayer,
    tick: Duration,
    viewer_id: Option<UserId>,
    confirming: bool,
    events: mpsc::UnboundedSender<ViewerEvent>,
}

impl<A: SocialApi> StoryViewer<A> {
    /// `viewer_id` is the signed-in user; only their own stories can be deleted.
    pub fn new(
        api: Arc<A>,
        config: &Config,
        viewer_id: Option<UserId>,
    ) -> (Self, mpsc::UnboundedReceiver<ViewerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let viewer = Self {
            api,
            player: StoryPlayer::new(config.story_duration, config.story_tick),
            tick: config.story_tick,
            viewer_id,
            confirming: false,
            events,
        };
        (viewer, rx)
    }

    /// Play the stories of `user_id` until the viewer exits.
    pub async fn run(
        mut self,
        user_id: UserId,
        mut commands: mpsc::UnboundedReceiver<ViewerCommand>,
    ) -> ExitReason {
        let fetched = self.api.list_stories_for_user(user_id).await;
        if let Err(e) = &fetched {
            self.notice(format!("Could not load stories: {}", e));
        }
        let mut transition = self.player.load(fetched);

        loop {
            if let Transition::Exit(reason) = transition {
                info!("story viewer for user {} exited: {:?}", user_id, reason);
                self.emit(ViewerEvent::Exited(Route::Feed));
                return reason;
            }
            self.confirming = false;

            let generation = self.player.timer_generation();
            let mut timer = interval_at(Instant::now() + self.tick, self.tick);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.emit_frame();

            transition = loop {
                let step = tokio::select! {
                    _ = timer.tick(), if !self.confirming => self.player.tick(generation),
                    cmd = commands.recv() => match cmd {
                        Some(cmd) => self.handle(cmd).await,
                        None => self.player.close(),
                    },
                };
                match step {
                    Transition::Stay => self.emit_frame(),
                    other => break other,
                }
            };
        }
    }

    async fn handle(&mut self, cmd: ViewerCommand) -> Transition {
        match cmd {
            ViewerCommand::Next => self.player.next(),
            ViewerCommand::Prev => self.player.prev(),
            ViewerCommand::Click { x, width } => {
                if self.confirming {
                    // tap on the overlay dismisses the dialog only
                    self.confirming = false;
                    Transition::Stay
                } else {
                    self.player.click(x, width)
                }
            }
            ViewerCommand::RequestDelete => {
                if self.can_delete() {
                    self.confirming = true;
                } else {
                    self.notice("Only the author can delete this story".to_string());
                }
                Transition::Stay
            }
            ViewerCommand::CancelDelete => {
                self.confirming = false;
                Transition::Stay
            }
            ViewerCommand::ConfirmDelete => {
                if !self.confirming {
                    return Transition::Stay;
                }
                self.confirming = false;
                self.delete_current().await
            }
            ViewerCommand::Close => self.player.close(),
        }
    }

    async fn delete_current(&mut self) -> Transition {
        let Some(story_id) = self.player.current_story().map(|s| s.story_id) else {
            return Transition::Stay;
        };
        match self.api.delete_story(story_id).await {
            Ok(()) => {
                info!("deleted story {}", story_id);
                self.player.remove_current().1
            }
            Err(e) => {
                error!("deleting story {} failed: {}", story_id, e);
                self.notice("Failed to delete the story".to_string());
                Transition::Stay
            }
        }
    }

    fn can_delete(&self) -> bool {
        match (self.viewer_id, self.player.current_story()) {
            (Some(me), Some(story)) => story.user_id == me,
            _ => false,
        }
    }

    fn emit_frame(&self) {
        let Some(story) = self.player.current_story() else {
            return;
        };
        let frame = ViewerFrame {
            index: self.player.current_index(),
            total: self.player.stories().len(),
            story: story.clone(),
            bars: self.player.progress_bars(),
            has_prev: self.player.has_prev(),
            has_next: self.player.has_next(),
            can_delete: self.can_delete(),
            confirming_delete: self.confirming,
        };
        self.emit(ViewerEvent::Frame(frame));
    }

    fn notice(&self, msg: String) {
        self.emit(ViewerEvent::Notice(msg));
    }

    fn emit(&self, event: ViewerEvent) {
        // receiver gone means the view is being torn down
        let _ = self.events.send(event);
    }
}
