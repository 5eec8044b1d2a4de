/// Story playback state machine
///
/// Pure state: no clocks, no I/O. The driver feeds it timer ticks tagged
/// with the generation it read when it armed the timer; a tick from an
/// older generation is ignored, so a superseded timer can never advance
/// the view.
use crate::error::Result;
use crate::types::Story;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// Timer or "next" ran past the last story
    Finished,
    /// "Previous" on the first story
    BackAtStart,
    /// Nothing (left) to show
    Empty,
    LoadFailed(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Viewing,
    Exiting(ExitReason),
}

/// What a driver must do after an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Same story, timer keeps running
    Stay,
    /// Show the story at this index with a fresh timer
    Show(usize),
    Exit(ExitReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickZone {
    Left,
    Middle,
    Right,
}

impl ClickZone {
    /// Thirds of the viewport; the exact boundaries belong to the middle.
    pub fn of(x: f64, width: f64) -> Self {
        if x < width / 3.0 {
            ClickZone::Left
        } else if x > width * 2.0 / 3.0 {
            ClickZone::Right
        } else {
            ClickZone::Middle
        }
    }
}

#[derive(Debug)]
pub struct StoryPlayer {
    stories: Vec<Story>,
    current: usize,
    elapsed_ticks: u32,
    ticks_per_story: u32,
    phase: Phase,
    timer_generation: u64,
}

impl StoryPlayer {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        let ticks = duration.as_nanos().div_ceil(tick.as_nanos().max(1));
        Self {
            stories: Vec::new(),
            current: 0,
            elapsed_ticks: 0,
            ticks_per_story: u32::try_from(ticks).unwrap_or(u32::MAX).max(1),
            phase: Phase::Loading,
            timer_generation: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_viewing(&self) -> bool {
        self.phase == Phase::Viewing
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_story(&self) -> Option<&Story> {
        if self.is_viewing() {
            self.stories.get(self.current)
        } else {
            None
        }
    }

    pub fn has_prev(&self) -> bool {
        self.is_viewing() && self.current > 0
    }

    pub fn has_next(&self) -> bool {
        self.is_viewing() && self.current + 1 < self.stories.len()
    }

    /// 0..=100 for the current story
    pub fn progress_percent(&self) -> f64 {
        let pct = 100.0 * f64::from(self.elapsed_ticks) / f64::from(self.ticks_per_story);
        pct.min(100.0)
    }

    /// Tag the driver must attach to ticks of the current timer
    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    /// Fill of the progress segment for story `k`
    pub fn fill_for(&self, k: usize) -> f64 {
        if k < self.current {
            100.0
        } else if k == self.current {
            self.progress_percent()
        } else {
            0.0
        }
    }

    pub fn progress_bars(&self) -> Vec<f64> {
        (0..self.stories.len()).map(|k| self.fill_for(k)).collect()
    }

    /// Leave `Loading` with the fetched sequence.
    pub fn load(&mut self, fetched: Result<Vec<Story>>) -> Transition {
        if self.phase != Phase::Loading {
            return Transition::Stay;
        }
        match fetched {
            Ok(stories) if stories.is_empty() => self.exit(ExitReason::Empty),
            Ok(stories) => {
                debug!("loaded {} stories", stories.len());
                self.stories = stories;
                self.phase = Phase::Viewing;
                self.show(0)
            }
            Err(e) => {
                warn!("story fetch failed: {}", e);
                self.exit(ExitReason::LoadFailed(e.to_string()))
            }
        }
    }

    /// One timer tick. Ticks from a superseded timer are ignored.
    pub fn tick(&mut self, generation: u64) -> Transition {
        if !self.is_viewing() || generation != self.timer_generation {
            return Transition::Stay;
        }
        self.elapsed_ticks = (self.elapsed_ticks + 1).min(self.ticks_per_story);
        if self.elapsed_ticks >= self.ticks_per_story {
            self.next()
        } else {
            Transition::Stay
        }
    }

    pub fn next(&mut self) -> Transition {
        if !self.is_viewing() {
            return Transition::Stay;
        }
        if self.current + 1 < self.stories.len() {
            self.show(self.current + 1)
        } else {
            self.exit(ExitReason::Finished)
        }
    }

    pub fn prev(&mut self) -> Transition {
        if !self.is_viewing() {
            return Transition::Stay;
        }
        if self.current > 0 {
            self.show(self.current - 1)
        } else {
            self.exit(ExitReason::BackAtStart)
        }
    }

    /// Screen tap: left third goes back, right third forward.
    pub fn click(&mut self, x: f64, width: f64) -> Transition {
        match ClickZone::of(x, width) {
            ClickZone::Left => self.prev(),
            ClickZone::Right => self.next(),
            ClickZone::Middle => Transition::Stay,
        }
    }

    /// Drop the current story after the server confirmed the delete.
    pub fn remove_current(&mut self) -> (Option<Story>, Transition) {
        if !self.is_viewing() || self.current >= self.stories.len() {
            return (None, Transition::Stay);
        }
        let removed = self.stories.remove(self.current);
        if self.stories.is_empty() {
            return (Some(removed), self.exit(ExitReason::Empty));
        }
        let index = self.current.min(self.stories.len() - 1);
        (Some(removed), self.show(index))
    }

    pub fn close(&mut self) -> Transition {
        if matches!(self.phase, Phase::Exiting(_)) {
            return Transition::Stay;
        }
        self.exit(ExitReason::Closed)
    }

    fn show(&mut self, index: usize) -> Transition {
        self.current = index;
        self.elapsed_ticks = 0;
        self.timer_generation += 1;
        Transition::Show(index)
    }

    fn exit(&mut self, reason: ExitReason) -> Transition {
        self.phase = Phase::Exiting(reason.clone());
        self.elapsed_ticks = 0;
        self.timer_generation += 1;
        Transition::Exit(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GramError;

    fn story(id: i64) -> Story {
        Story {
            story_id: id,
            user_id: 1,
            user_name: "kim".to_string(),
            user_avatar: None,
            story_image: format!("/s/{}.jpg", id),
            created_at: "2025-12-11T10:00:00Z".to_string(),
            expires_at: None,
        }
    }

    fn player_with(n: i64) -> StoryPlayer {
        let mut p = StoryPlayer::new(Duration::from_millis(5000), Duration::from_millis(50));
        assert_eq!(p.load(Ok((1..=n).map(story).collect())), Transition::Show(0));
        p
    }

    fn run_ticks(p: &mut StoryPlayer, n: usize) -> Transition {
        let mut last = Transition::Stay;
        for _ in 0..n {
            let gen = p.timer_generation();
            last = p.tick(gen);
            if last != Transition::Stay {
                break;
            }
        }
        last
    }

    #[test]
    fn load_outcomes() {
        let mut p = StoryPlayer::new(Duration::from_secs(5), Duration::from_millis(50));
        assert_eq!(p.load(Ok(vec![])), Transition::Exit(ExitReason::Empty));

        let mut p = StoryPlayer::new(Duration::from_secs(5), Duration::from_millis(50));
        let t = p.load(Err(GramError::Network("offline".into())));
        assert!(matches!(t, Transition::Exit(ExitReason::LoadFailed(_))));
        assert!(p.current_story().is_none());
    }

    #[test]
    fn timer_advances_after_full_duration() {
        let mut p = player_with(3);
        assert_eq!(run_ticks(&mut p, 99), Transition::Stay);
        assert!((p.progress_percent() - 99.0).abs() < 1e-9);
        assert_eq!(run_ticks(&mut p, 1), Transition::Show(1));
        assert_eq!(p.current_index(), 1);
        assert_eq!(p.progress_percent(), 0.0);
    }

    #[test]
    fn timer_on_last_story_exits() {
        let mut p = player_with(1);
        assert_eq!(run_ticks(&mut p, 100), Transition::Exit(ExitReason::Finished));
        assert_eq!(p.phase(), &Phase::Exiting(ExitReason::Finished));
    }

    #[test]
    fn stale_timer_ticks_are_ignored() {
        let mut p = player_with(3);
        let old = p.timer_generation();
        run_ticks(&mut p, 10);
        assert_eq!(p.next(), Transition::Show(1));
        for _ in 0..200 {
            assert_eq!(p.tick(old), Transition::Stay);
        }
        assert_eq!(p.current_index(), 1);
        assert_eq!(p.progress_percent(), 0.0);
    }

    #[test]
    fn prev_on_first_story_exits() {
        let mut p = player_with(2);
        assert_eq!(p.prev(), Transition::Exit(ExitReason::BackAtStart));
    }

    #[test]
    fn click_zones() {
        assert_eq!(ClickZone::of(10.0, 300.0), ClickZone::Left);
        assert_eq!(ClickZone::of(150.0, 300.0), ClickZone::Middle);
        assert_eq!(ClickZone::of(100.0, 300.0), ClickZone::Middle);
        assert_eq!(ClickZone::of(200.0, 300.0), ClickZone::Middle);
        assert_eq!(ClickZone::of(250.0, 300.0), ClickZone::Right);

        let mut p = player_with(3);
        assert_eq!(p.click(250.0, 300.0), Transition::Show(1));
        assert_eq!(p.click(150.0, 300.0), Transition::Stay);
        assert_eq!(p.click(10.0, 300.0), Transition::Show(0));
    }

    #[test]
    fn progress_bars_follow_index() {
        let mut p = player_with(3);
        p.next();
        run_ticks(&mut p, 40);
        assert_eq!(p.progress_bars(), vec![100.0, 40.0, 0.0]);
    }

    #[test]
    fn deleting_only_story_exits() {
        let mut p = player_with(1);
        let (removed, t) = p.remove_current();
        assert_eq!(removed.map(|s| s.story_id), Some(1));
        assert_eq!(t, Transition::Exit(ExitReason::Empty));
    }

    #[test]
    fn deleting_last_of_three_clamps_index() {
        let mut p = player_with(3);
        p.next();
        p.next();
        run_ticks(&mut p, 30);
        let (_, t) = p.remove_current();
        assert_eq!(t, Transition::Show(1));
        assert_eq!(p.current_index(), 1);
        assert_eq!(p.progress_percent(), 0.0);
        assert_eq!(p.stories().len(), 2);
    }

    #[test]
    fn deleting_middle_story_shows_its_successor() {
        let mut p = player_with(3);
        p.next();
        let (_, t) = p.remove_current();
        assert_eq!(t, Transition::Show(1));
        assert_eq!(p.current_story().map(|s| s.story_id), Some(3));
    }

    #[test]
    fn uneven_tick_ratio_still_finishes() {
        let mut p = StoryPlayer::new(Duration::from_millis(3000), Duration::from_millis(70));
        p.load(Ok(vec![story(1)]));
        // ceil(3000 / 70) = 43 ticks
        assert_eq!(run_ticks(&mut p, 42), Transition::Stay);
        assert_eq!(run_ticks(&mut p, 1), Transition::Exit(ExitReason::Finished));
    }

    #[test]
    fn operations_after_exit_are_inert() {
        let mut p = player_with(1);
        p.close();
        assert_eq!(p.next(), Transition::Stay);
        assert_eq!(p.prev(), Transition::Stay);
        assert_eq!(p.remove_current().1, Transition::Stay);
        assert_eq!(p.close(), Transition::Stay);
    }
}
