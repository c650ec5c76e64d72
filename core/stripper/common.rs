#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripError {
    #[error("comment range {from}..{to} is outside of a {len} byte input")]
    OutOfBounds { from: usize, to: usize, len: usize },

    #[error("comment ranges overlap at byte {at}")]
    Overlapping { at: usize },

    #[error("scanner reached an impossible state: {0}")]
    UnbalancedState(&'static str),
}

/// Half-open byte range `from..to` that must be deleted from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentMatch {
    pub from: usize,
    pub to: usize,
}

impl CommentMatch {
    pub fn new(from: usize, to: usize) -> Self {
        CommentMatch { from, to }
    }
}

pub trait Start: Sized {
    fn start() -> Self;
}

pub trait End: Sized {
    fn end() -> Self;
}

/// Drives a character level state machine over `input`.
///
/// `state_transition` maps the current parse state and character (`None` at
/// end of input) to the next state plus an action. `do_action` turns the
/// actions into comment ranges, tracking where a pending comment began.
pub fn find_comments_impl<ParseState, ParseAction, CommentState, StateTransitionFn, DoActionFn>(
    input: &str,
    state_transition: StateTransitionFn,
    do_action: DoActionFn,
) -> Result<Vec<CommentMatch>, StripError>
where
    ParseState: Start + End + Copy + Eq,
    ParseAction: Copy + Eq,
    CommentState: Start + Copy + Eq,
    StateTransitionFn: Fn(ParseState, Option<char>) -> (ParseState, ParseAction),
    DoActionFn: Fn(
        ParseAction,
        CommentState,
        usize,
        Vec<CommentMatch>,
    ) -> Result<(CommentState, Vec<CommentMatch>), StripError>,
{
    let mut matches = Vec::new();
    let mut parse_state = ParseState::start();
    let mut comment_state = CommentState::start();
    let mut char_indices = input.char_indices();

    loop {
        let char_info = char_indices.next();
        let current_char = char_info.map(|(_, c)| c);
        let position = char_info.map_or(input.len(), |(idx, _)| idx);

        let (next_parse_state, action) = state_transition(parse_state, current_char);
        let (next_comment_state, next_matches) =
            do_action(action, comment_state, position, matches)?;

        parse_state = next_parse_state;
        comment_state = next_comment_state;
        matches = next_matches;

        if current_char.is_none() || parse_state == ParseState::end() {
            break;
        }
    }
    Ok(matches)
}

pub fn remove_matches(
    mut input: String,
    mut matches: Vec<CommentMatch>,
) -> Result<String, StripError> {
    if matches.is_empty() {
        return Ok(input);
    }
    check_matches_bounds(&input, &matches)?;

    matches.sort_by_key(|m| m.from);
    check_sorted_matches_overlap(&matches)?;

    for m in matches.into_iter().rev() {
        input.drain(m.from..m.to);
    }
    Ok(input)
}

fn check_matches_bounds(input: &str, matches: &[CommentMatch]) -> Result<(), StripError> {
    let len = input.len();
    for m in matches {
        let in_range = m.from <= m.to && m.to <= len;
        if !in_range || !input.is_char_boundary(m.from) || !input.is_char_boundary(m.to) {
            log::debug!("rejecting range {}..{} on {} bytes", m.from, m.to, len);
            return Err(StripError::OutOfBounds {
                from: m.from,
                to: m.to,
                len,
            });
        }
    }
    Ok(())
}

fn check_sorted_matches_overlap(matches: &[CommentMatch]) -> Result<(), StripError> {
    let mut last_to = 0;
    for m in matches {
        if m.from < last_to {
            log::debug!("overlap: from={}, last_to={}", m.from, last_to);
            return Err(StripError::Overlapping { at: m.from });
        }
        last_to = m.to;
    }
    Ok(())
}
