/// Story viewer timing and delete flow on a paused clock
mod common;

use common::{story, FakeApi};
use gram_core::routes::Route;
use gram_core::story::{ExitReason, StoryViewer, ViewerCommand, ViewerEvent};
use gram_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

struct Harness {
    commands: mpsc::UnboundedSender<ViewerCommand>,
    events: mpsc::UnboundedReceiver<ViewerEvent>,
    handle: JoinHandle<ExitReason>,
}

fn start(api: Arc<FakeApi>, user_id: i64, viewer_id: Option<i64>) -> Harness {
    let (viewer, events) = StoryViewer::new(api, &Config::default(), viewer_id);
    let (commands, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(viewer.run(user_id, rx));
    Harness {
        commands,
        events,
        handle,
    }
}

fn drain(events: &mut mpsc::UnboundedReceiver<ViewerEvent>) -> Vec<ViewerEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn assert_close_to(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let slack = Duration::from_millis(60);
    assert!(
        actual + slack >= expected && actual <= expected + slack,
        "took {:?}, expected about {:?}",
        actual,
        expected
    );
}

#[tokio::test(start_paused = true)]
async fn single_story_plays_for_five_seconds() {
    let api = Arc::new(FakeApi::with_stories(vec![story(1, 7)]));
    let started = Instant::now();
    let mut h = start(api, 7, None);

    assert_eq!(h.handle.await.unwrap(), ExitReason::Finished);
    assert_close_to(started.elapsed(), 5000);

    let events = drain(&mut h.events);
    assert_eq!(events.last(), Some(&ViewerEvent::Exited(Route::Feed)));
    let fills: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            ViewerEvent::Frame(f) => Some(f.bars[0]),
            _ => None,
        })
        .collect();
    assert_eq!(fills.first(), Some(&0.0));
    assert!(fills.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn manual_next_restarts_the_clock() {
    let api = Arc::new(FakeApi::with_stories(vec![story(1, 7), story(2, 7)]));
    let started = Instant::now();
    let mut h = start(api, 7, None);

    sleep(Duration::from_millis(2000)).await;
    h.commands.send(ViewerCommand::Next).unwrap();

    assert_eq!(h.handle.await.unwrap(), ExitReason::Finished);
    assert_close_to(started.elapsed(), 7000);

    let second = drain(&mut h.events).into_iter().find_map(|e| match e {
        ViewerEvent::Frame(f) if f.index == 1 => Some(f),
        _ => None,
    });
    let second = second.unwrap();
    assert_eq!(second.bars[0], 100.0);
    assert!(second.has_prev);
    assert!(!second.has_next);
}

#[tokio::test(start_paused = true)]
async fn prev_on_first_story_exits() {
    let api = Arc::new(FakeApi::with_stories(vec![story(1, 7), story(2, 7)]));
    let h = start(api, 7, None);
    h.commands
        .send(ViewerCommand::Click { x: 10.0, width: 300.0 })
        .unwrap();
    assert_eq!(h.handle.await.unwrap(), ExitReason::BackAtStart);
}

#[tokio::test(start_paused = true)]
async fn load_failure_and_empty_list_exit_to_feed() {
    let mut failing = FakeApi::with_stories(vec![story(1, 7)]);
    failing.fail_stories = true;
    let mut h = start(Arc::new(failing), 7, None);
    assert!(matches!(
        h.handle.await.unwrap(),
        ExitReason::LoadFailed(_)
    ));
    let events = drain(&mut h.events);
    assert!(matches!(events.first(), Some(ViewerEvent::Notice(_))));
    assert_eq!(events.last(), Some(&ViewerEvent::Exited(Route::Feed)));

    let mut h = start(Arc::new(FakeApi::default()), 7, None);
    assert_eq!(h.handle.await.unwrap(), ExitReason::Empty);
    assert_eq!(drain(&mut h.events), vec![ViewerEvent::Exited(Route::Feed)]);
}

#[tokio::test(start_paused = true)]
async fn owner_deletes_after_confirming() {
    let api = Arc::new(FakeApi::with_stories(vec![story(1, 7), story(2, 7)]));
    let mut h = start(api.clone(), 7, Some(7));

    h.commands.send(ViewerCommand::RequestDelete).unwrap();
    h.commands.send(ViewerCommand::ConfirmDelete).unwrap();
    h.commands.send(ViewerCommand::Close).unwrap();
    assert_eq!(h.handle.await.unwrap(), ExitReason::Closed);

    assert_eq!(*api.deleted.lock().unwrap(), vec![1]);
    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        ViewerEvent::Frame(f) if f.confirming_delete && f.can_delete
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        ViewerEvent::Frame(f) if f.total == 1 && f.story.story_id == 2
    )));
}

#[tokio::test(start_paused = true)]
async fn deleting_the_last_story_exits() {
    let api = Arc::new(FakeApi::with_stories(vec![story(1, 7)]));
    let h = start(api.clone(), 7, Some(7));
    h.commands.send(ViewerCommand::RequestDelete).unwrap();
    h.commands.send(ViewerCommand::ConfirmDelete).unwrap();
    assert_eq!(h.handle.await.unwrap(), ExitReason::Empty);
    assert_eq!(*api.deleted.lock().unwrap(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn only_the_author_can_delete() {
    let api = Arc::new(FakeApi::with_stories(vec![story(1, 7)]));
    let mut h = start(api.clone(), 7, Some(99));

    h.commands.send(ViewerCommand::RequestDelete).unwrap();
    h.commands.send(ViewerCommand::ConfirmDelete).unwrap();
    h.commands.send(ViewerCommand::Close).unwrap();
    assert_eq!(h.handle.await.unwrap(), ExitReason::Closed);

    assert!(api.deleted.lock().unwrap().is_empty());
    assert!(drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, ViewerEvent::Notice(_))));
}

#[tokio::test(start_paused = true)]
async fn failed_delete_keeps_the_story() {
    let mut api = FakeApi::with_stories(vec![story(1, 7), story(2, 7)]);
    api.fail_delete = true;
    let api = Arc::new(api);
    let mut h = start(api.clone(), 7, Some(7));

    h.commands.send(ViewerCommand::RequestDelete).unwrap();
    h.commands.send(ViewerCommand::ConfirmDelete).unwrap();
    h.commands.send(ViewerCommand::Close).unwrap();
    assert_eq!(h.handle.await.unwrap(), ExitReason::Closed);

    let events = drain(&mut h.events);
    assert!(events
        .iter()
        .any(|e| e == &ViewerEvent::Notice("Failed to delete the story".to_string())));
    assert!(events
        .iter()
        .all(|e| !matches!(e, ViewerEvent::Frame(f) if f.total != 2)));
}

#[tokio::test(start_paused = true)]
async fn confirmation_pauses_the_timer() {
    let api = Arc::new(FakeApi::with_stories(vec![story(1, 7)]));
    let started = Instant::now();
    let h = start(api, 7, Some(7));

    h.commands.send(ViewerCommand::RequestDelete).unwrap();
    sleep(Duration::from_secs(10)).await;
    assert!(!h.handle.is_finished());

    h.commands.send(ViewerCommand::CancelDelete).unwrap();
    assert_eq!(h.handle.await.unwrap(), ExitReason::Finished);
    assert_close_to(started.elapsed(), 15000);
}
