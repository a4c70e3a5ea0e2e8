use tracing::debug;

use crate::models::Story;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoriesState {
    pub data: Vec<Story>,
    pub is_loading: bool,
    pub is_error: bool,
    // Bumped whenever `data` is replaced or trimmed, used to memoize derived values
    revision: u64,
}

impl StoriesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoriesAction {
    FetchInit,
    FetchSuccess(Vec<Story>),
    FetchFailure,
    RemoveStory(String),
}

impl StoriesAction {
    fn name(&self) -> &'static str {
        match self {
            StoriesAction::FetchInit => "FETCH_INIT",
            StoriesAction::FetchSuccess(_) => "FETCH_SUCCESS",
            StoriesAction::FetchFailure => "FETCH_FAILURE",
            StoriesAction::RemoveStory(_) => "REMOVE_STORY",
        }
    }
}

/// Applies one transition and returns the next state.
///
/// The match is exhaustive on purpose: adding an action without handling it
/// here is a compile error rather than a silently ignored case.
pub fn stories_reducer(state: StoriesState, action: StoriesAction) -> StoriesState {
    debug!(action = action.name(), "reducing stories state");

    match action {
        StoriesAction::FetchInit => StoriesState {
            is_loading: true,
            is_error: false,
            ..state
        },
        StoriesAction::FetchSuccess(payload) => StoriesState {
            data: payload,
            is_loading: false,
            is_error: false,
            revision: state.revision + 1,
        },
        StoriesAction::FetchFailure => StoriesState {
            is_loading: false,
            is_error: true,
            ..state
        },
        StoriesAction::RemoveStory(id) => {
            if !state.data.iter().any(|story| story.id == id) {
                return state;
            }

            let data = state
                .data
                .into_iter()
                .filter(|story| story.id != id)
                .collect();

            StoriesState {
                data,
                revision: state.revision + 1,
                ..state
            }
        }
    }
}

pub fn sum_comments(stories: &[Story]) -> u64 {
    stories
        .iter()
        .map(|story| u64::from(story.comment_count))
        .sum()
}

/// Case-insensitive substring match of `term` against each title.
pub fn filter_by_title<'a>(stories: &'a [Story], term: &str) -> Vec<&'a Story> {
    let term = term.to_lowercase();

    stories
        .iter()
        .filter(|story| story.title.to_lowercase().contains(&term))
        .collect()
}
