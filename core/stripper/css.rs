use super::common::{CommentMatch, End, Start, StripError, find_comments_impl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Normal,
    SawSlash,
    InComment,
    InCommentSawStar,
    StringDbl,
    StringDblEsc,
    StringSgl,
    StringSglEsc,
    End,
}
impl Start for ParseState {
    fn start() -> Self {
        ParseState::Normal
    }
}
impl End for ParseState {
    fn end() -> Self {
        ParseState::End
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CssParseAction {
    Nothing,
    CommentMightStart,
    ConfirmComment,
    DismissPotential,
    CommentEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentTrackState {
    NotIn,
    SawSlash(usize),
    InComment(usize),
}
impl Start for CommentTrackState {
    fn start() -> Self {
        CommentTrackState::NotIn
    }
}

fn state_transition(from: ParseState, current_char: Option<char>) -> (ParseState, CssParseAction) {
    let Some(c) = current_char else {
        return match from {
            ParseState::Normal | ParseState::End => (ParseState::End, CssParseAction::Nothing),
            _ => (ParseState::End, CssParseAction::DismissPotential),
        };
    };
    match from {
        ParseState::Normal => match c {
            '/' => (ParseState::SawSlash, CssParseAction::CommentMightStart),
            '"' => (ParseState::StringDbl, CssParseAction::Nothing),
            '\'' => (ParseState::StringSgl, CssParseAction::Nothing),
            _ => (ParseState::Normal, CssParseAction::Nothing),
        },
        ParseState::SawSlash => match c {
            '*' => (ParseState::InComment, CssParseAction::ConfirmComment),
            '/' => (ParseState::SawSlash, CssParseAction::CommentMightStart),
            '"' => (ParseState::StringDbl, CssParseAction::DismissPotential),
            '\'' => (ParseState::StringSgl, CssParseAction::DismissPotential),
            _ => (ParseState::Normal, CssParseAction::DismissPotential),
        },
        ParseState::InComment => match c {
            '*' => (ParseState::InCommentSawStar, CssParseAction::Nothing),
            _ => (ParseState::InComment, CssParseAction::Nothing),
        },
        ParseState::InCommentSawStar => match c {
            '/' => (ParseState::Normal, CssParseAction::CommentEnd),
            '*' => (ParseState::InCommentSawStar, CssParseAction::Nothing),
            _ => (ParseState::InComment, CssParseAction::Nothing),
        },
        ParseState::StringDbl => match c {
            '"' | '\n' => (ParseState::Normal, CssParseAction::Nothing),
            '\\' => (ParseState::StringDblEsc, CssParseAction::Nothing),
            _ => (ParseState::StringDbl, CssParseAction::Nothing),
        },
        ParseState::StringDblEsc => (ParseState::StringDbl, CssParseAction::Nothing),
        ParseState::StringSgl => match c {
            '\'' | '\n' => (ParseState::Normal, CssParseAction::Nothing),
            '\\' => (ParseState::StringSglEsc, CssParseAction::Nothing),
            _ => (ParseState::StringSgl, CssParseAction::Nothing),
        },
        ParseState::StringSglEsc => (ParseState::StringSgl, CssParseAction::Nothing),
        ParseState::End => (ParseState::End, CssParseAction::Nothing),
    }
}

fn do_action(
    action: CssParseAction,
    comment_state: CommentTrackState,
    position: usize,
    mut matches: Vec<CommentMatch>,
) -> Result<(CommentTrackState, Vec<CommentMatch>), StripError> {
    let next = match (action, comment_state) {
        (CssParseAction::Nothing, state) => state,
        (CssParseAction::CommentMightStart, _) => CommentTrackState::SawSlash(position),
        (CssParseAction::ConfirmComment, CommentTrackState::SawSlash(from)) => {
            CommentTrackState::InComment(from)
        }
        (CssParseAction::ConfirmComment, _) => {
            return Err(StripError::UnbalancedState(
                "css comment confirmed without an opening slash",
            ));
        }
        (CssParseAction::DismissPotential, _) => CommentTrackState::NotIn,
        (CssParseAction::CommentEnd, CommentTrackState::InComment(from)) => {
            matches.push(CommentMatch::new(from, position + 1));
            CommentTrackState::NotIn
        }
        (CssParseAction::CommentEnd, _) => CommentTrackState::NotIn,
    };
    Ok((next, matches))
}

pub fn find_comments(input: &str) -> Result<Vec<CommentMatch>, StripError> {
    find_comments_impl(input, state_transition, do_action)
}

#[cfg(test)]
mod tests {
    use crate::stripper::{LanguageFamily, strip};

    fn css(input: &str) -> String {
        strip(input, LanguageFamily::Css).into_owned()
    }

    #[test]
    fn removes_block_between_rules() {
        assert_eq!(
            css("a{color:red;}/* comment */b{color:blue;}"),
            "a{color:red;}b{color:blue;}"
        );
    }

    #[test]
    fn block_removal_is_non_greedy() {
        assert_eq!(css("/* a */ code /* b */"), " code ");
    }

    #[test]
    fn multi_line_and_starred_blocks() {
        let input = "/**\n * Header\n **/\nbody { margin: 0; }\n";
        assert_eq!(css(input), "\nbody { margin: 0; }\n");
        assert_eq!(css("a{}/**/b{}"), "a{}b{}");
    }

    #[test]
    fn markers_inside_strings_are_kept() {
        let input = "a::before { content: \"/* not a comment */\"; }\n";
        assert_eq!(css(input), input);
        let input = "a { background: url('http://x/*y*/z.png'); }";
        assert_eq!(css(input), input);
    }

    #[test]
    fn unterminated_comment_is_left_alone() {
        let input = "a { color: red; } /* dangling";
        assert_eq!(css(input), input);
    }

    #[test]
    fn scss_line_comments_are_not_touched() {
        let input = ".a {\n  // nested note\n  .b { color: red; }\n}\n";
        assert_eq!(css(input), input);
    }
}
