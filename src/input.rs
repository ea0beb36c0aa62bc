use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use petsim::ActionKind;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Action(ActionKind),
    Retry,
    Continue,
    Quit,
}

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_command(end_screen: bool, ev: &InputEvent) -> Option<UiCommand> {
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(UiCommand::Quit);
    }
    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(UiCommand::Quit),
        _ => {}
    }

    if end_screen {
        return match ev.key {
            KeyCode::Char('r') | KeyCode::Char('R') => Some(UiCommand::Retry),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(UiCommand::Continue),
            _ => None,
        };
    }

    let kind = match ev.key {
        KeyCode::Char('1') | KeyCode::Char('p') | KeyCode::Char('P') => ActionKind::Pet,
        KeyCode::Char('2') | KeyCode::Char('f') | KeyCode::Char('F') => ActionKind::Feed,
        KeyCode::Char('3') | KeyCode::Char('w') | KeyCode::Char('W') => ActionKind::Water,
        KeyCode::Char('4') | KeyCode::Char('l') | KeyCode::Char('L') => ActionKind::Play,
        _ => return None,
    };
    Some(UiCommand::Action(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> InputEvent {
        InputEvent {
            key: KeyCode::Char(c),
            mods: KeyModifiers::NONE,
        }
    }

    #[test]
    fn action_keys_map_to_actions() {
        assert_eq!(
            map_event_to_command(false, &key('f')),
            Some(UiCommand::Action(ActionKind::Feed))
        );
        assert_eq!(
            map_event_to_command(false, &key('4')),
            Some(UiCommand::Action(ActionKind::Play))
        );
        assert_eq!(map_event_to_command(false, &key('r')), None);
    }

    #[test]
    fn end_screen_only_takes_retry_and_continue() {
        assert_eq!(map_event_to_command(true, &key('r')), Some(UiCommand::Retry));
        assert_eq!(map_event_to_command(true, &key('c')), Some(UiCommand::Continue));
        assert_eq!(map_event_to_command(true, &key('p')), None);
        assert_eq!(map_event_to_command(true, &key('q')), Some(UiCommand::Quit));
    }
}
