use super::common::{CommentMatch, End, Start, StripError, find_comments_impl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Text,
    SawOpenBracket,
    SawOpenBracketBang,
    SawOpenBracketBangDash,
    InComment,
    InCommentSawDash1,
    InCommentSawDash2,
    InTag,
    InTagStringDbl,
    InTagStringSgl,
    End,
}
impl Start for ParseState {
    fn start() -> Self {
        ParseState::Text
    }
}
impl End for ParseState {
    fn end() -> Self {
        ParseState::End
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseAction {
    Nothing,
    MaybeCommentStart,
    CommentStart,
    ResetPotential,
    CommentEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentTrackState {
    NotInComment,
    MaybeComment(usize),
    InComment(usize),
}
impl Start for CommentTrackState {
    fn start() -> Self {
        CommentTrackState::NotInComment
    }
}

// Quotes only delimit attribute values, so they are tracked inside tags and
// ignored in text content where apostrophes are ordinary prose.
fn state_transition(from: ParseState, current_char: Option<char>) -> (ParseState, ParseAction) {
    let Some(c) = current_char else {
        return (ParseState::End, ParseAction::ResetPotential);
    };
    match from {
        ParseState::Text => match c {
            '<' => (ParseState::SawOpenBracket, ParseAction::MaybeCommentStart),
            _ => (ParseState::Text, ParseAction::Nothing),
        },
        ParseState::SawOpenBracket => match c {
            '!' => (ParseState::SawOpenBracketBang, ParseAction::Nothing),
            '<' => (ParseState::SawOpenBracket, ParseAction::MaybeCommentStart),
            '/' | '?' => (ParseState::InTag, ParseAction::ResetPotential),
            c if c.is_ascii_alphabetic() => (ParseState::InTag, ParseAction::ResetPotential),
            _ => (ParseState::Text, ParseAction::ResetPotential),
        },
        ParseState::SawOpenBracketBang => match c {
            '-' => (ParseState::SawOpenBracketBangDash, ParseAction::Nothing),
            '<' => (ParseState::SawOpenBracket, ParseAction::MaybeCommentStart),
            '>' => (ParseState::Text, ParseAction::ResetPotential),
            _ => (ParseState::InTag, ParseAction::ResetPotential),
        },
        ParseState::SawOpenBracketBangDash => match c {
            '-' => (ParseState::InComment, ParseAction::CommentStart),
            '<' => (ParseState::SawOpenBracket, ParseAction::MaybeCommentStart),
            '>' => (ParseState::Text, ParseAction::ResetPotential),
            _ => (ParseState::InTag, ParseAction::ResetPotential),
        },
        ParseState::InComment => match c {
            '-' => (ParseState::InCommentSawDash1, ParseAction::Nothing),
            _ => (ParseState::InComment, ParseAction::Nothing),
        },
        ParseState::InCommentSawDash1 => match c {
            '-' => (ParseState::InCommentSawDash2, ParseAction::Nothing),
            _ => (ParseState::InComment, ParseAction::Nothing),
        },
        ParseState::InCommentSawDash2 => match c {
            '>' => (ParseState::Text, ParseAction::CommentEnd),
            '-' => (ParseState::InCommentSawDash2, ParseAction::Nothing),
            _ => (ParseState::InComment, ParseAction::Nothing),
        },
        ParseState::InTag => match c {
            '"' => (ParseState::InTagStringDbl, ParseAction::Nothing),
            '\'' => (ParseState::InTagStringSgl, ParseAction::Nothing),
            '>' => (ParseState::Text, ParseAction::Nothing),
            _ => (ParseState::InTag, ParseAction::Nothing),
        },
        ParseState::InTagStringDbl => match c {
            '"' => (ParseState::InTag, ParseAction::Nothing),
            _ => (ParseState::InTagStringDbl, ParseAction::Nothing),
        },
        ParseState::InTagStringSgl => match c {
            '\'' => (ParseState::InTag, ParseAction::Nothing),
            _ => (ParseState::InTagStringSgl, ParseAction::Nothing),
        },
        ParseState::End => (ParseState::End, ParseAction::Nothing),
    }
}

fn do_action(
    action: ParseAction,
    mut comment_state: CommentTrackState,
    position: usize,
    mut matches: Vec<CommentMatch>,
) -> Result<(CommentTrackState, Vec<CommentMatch>), StripError> {
    match action {
        ParseAction::Nothing => {}
        ParseAction::MaybeCommentStart => {
            comment_state = CommentTrackState::MaybeComment(position);
        }
        ParseAction::CommentStart => {
            if let CommentTrackState::MaybeComment(from) = comment_state {
                comment_state = CommentTrackState::InComment(from);
            } else {
                return Err(StripError::UnbalancedState(
                    "html comment opened without a pending '<!-'",
                ));
            }
        }
        ParseAction::CommentEnd => {
            if let CommentTrackState::InComment(from) = comment_state {
                matches.push(CommentMatch::new(from, position + 1));
            }
            comment_state = CommentTrackState::NotInComment;
        }
        ParseAction::ResetPotential => {
            comment_state = CommentTrackState::NotInComment;
        }
    }
    Ok((comment_state, matches))
}

pub fn find_comments(input: &str) -> Result<Vec<CommentMatch>, StripError> {
    find_comments_impl(input, state_transition, do_action)
}
