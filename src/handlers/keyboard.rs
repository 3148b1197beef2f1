//! Keyboard Input Handler
//!
//! Maps key presses to intents. Which keys mean what depends on what has
//! focus: the top modal, the search box, or the listing directory.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use servicefinder::logic::gating::GatedAction;
use servicefinder::model::{Model, VimCommandState};
use servicefinder::update::{top_modal, Intent, TopModal};

/// Translate a key press; `None` when the key does nothing here
pub fn key_to_intent(model: &mut Model, key: KeyEvent) -> Option<Intent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Intent::Quit);
    }

    if let Some(modal) = top_modal(model) {
        return modal_key(modal, key, ctrl);
    }

    if model.ui.search_mode {
        return search_key(key);
    }

    directory_key(model, key, ctrl)
}

fn modal_key(modal: TopModal, key: KeyEvent, ctrl: bool) -> Option<Intent> {
    if key.code == KeyCode::Esc {
        return Some(Intent::CloseModal);
    }

    match modal {
        TopModal::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Intent::Submit),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(Intent::CloseModal),
            _ => None,
        },

        TopModal::Rate => match key.code {
            KeyCode::Char(c @ '1'..='5') => c.to_digit(10).map(|d| Intent::SetStars(d as u8)),
            KeyCode::Left | KeyCode::Char('h') => Some(Intent::AdjustSelector { forward: false }),
            KeyCode::Right | KeyCode::Char('l') => Some(Intent::AdjustSelector { forward: true }),
            KeyCode::Enter => Some(Intent::Submit),
            _ => None,
        },

        TopModal::Contact => match key.code {
            KeyCode::Enter | KeyCode::Char('q') => Some(Intent::CloseModal),
            _ => None,
        },

        TopModal::Auth | TopModal::AddListing | TopModal::Profile => match key.code {
            KeyCode::Char('t') if ctrl && modal == TopModal::Auth => Some(Intent::SwitchAuthTab),
            KeyCode::Tab | KeyCode::Down => Some(Intent::FocusNext),
            KeyCode::BackTab | KeyCode::Up => Some(Intent::FocusPrev),
            KeyCode::Left => Some(Intent::AdjustSelector { forward: false }),
            KeyCode::Right => Some(Intent::AdjustSelector { forward: true }),
            KeyCode::Enter => Some(Intent::Submit),
            KeyCode::Backspace => Some(Intent::FormBackspace),
            KeyCode::Char(c) if !ctrl => Some(Intent::FormChar(c)),
            _ => None,
        },
    }
}

fn search_key(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Esc => Some(Intent::CancelSearch),
        KeyCode::Enter => Some(Intent::ApplySearch),
        KeyCode::Backspace => Some(Intent::SearchBackspace),
        KeyCode::Char(c) => Some(Intent::SearchChar(c)),
        _ => None,
    }
}

fn directory_key(model: &mut Model, key: KeyEvent, ctrl: bool) -> Option<Intent> {
    let vim = model.ui.vim_mode;

    // Vim 'gg' needs two presses; anything else cancels the first
    if vim {
        let waiting = model.ui.vim_command_state == VimCommandState::WaitingForSecondG;
        model.ui.vim_command_state = VimCommandState::None;
        match key.code {
            KeyCode::Char('g') if waiting => return Some(Intent::SelectFirst),
            KeyCode::Char('g') => {
                model.ui.vim_command_state = VimCommandState::WaitingForSecondG;
                return None;
            }
            KeyCode::Char('G') => return Some(Intent::SelectLast),
            KeyCode::Char('j') => return Some(Intent::SelectNext),
            KeyCode::Char('k') => return Some(Intent::SelectPrev),
            KeyCode::Char('h') => return Some(Intent::PrevPage),
            KeyCode::Char('l') => return Some(Intent::NextPage),
            KeyCode::Char('f') | KeyCode::Char('d') if ctrl => return Some(Intent::NextPage),
            KeyCode::Char('b') | KeyCode::Char('u') if ctrl => return Some(Intent::PrevPage),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('q') => Some(Intent::Quit),
        KeyCode::Char('/') => Some(Intent::StartSearch),
        KeyCode::Esc => Some(Intent::ClearFilters),

        KeyCode::Down => Some(Intent::SelectNext),
        KeyCode::Up => Some(Intent::SelectPrev),
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char(']') => Some(Intent::NextPage),
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('[') => Some(Intent::PrevPage),
        KeyCode::Home => Some(Intent::FirstPage),
        KeyCode::End => Some(Intent::LastPage),

        KeyCode::Char('c') => Some(Intent::CycleCategory { forward: true }),
        KeyCode::Char('C') => Some(Intent::CycleCategory { forward: false }),
        KeyCode::Char('t') => Some(Intent::CycleCity { forward: true }),
        KeyCode::Char('T') => Some(Intent::CycleCity { forward: false }),
        KeyCode::Char('m') => Some(Intent::CycleMinRating),
        KeyCode::Char('s') => Some(Intent::CycleSort),
        KeyCode::Char('v') => Some(Intent::ToggleView),
        KeyCode::Char('x') => Some(Intent::ClearFilters),
        KeyCode::Char('R') | KeyCode::F(5) => Some(Intent::Refresh),

        KeyCode::Enter => Some(Intent::Gated(GatedAction::Contact)),
        KeyCode::Char('r') => Some(Intent::Gated(GatedAction::Rate)),
        KeyCode::Char('a') => Some(Intent::Gated(GatedAction::AddListing)),
        KeyCode::Char('d') => Some(Intent::Gated(GatedAction::DeleteListing)),
        KeyCode::Char('p') => Some(Intent::Gated(GatedAction::EditProfile)),
        KeyCode::Char('i') => Some(Intent::OpenSignIn),
        KeyCode::Char('o') => Some(Intent::SignOut),

        _ => None,
    }
}
