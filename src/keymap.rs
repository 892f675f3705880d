use crate::layout::{COLS, ROWS};
use crossterm::event::KeyCode;

/// Legends of the 4x16 key matrix. Columns 7 and 8 are the thumb keys,
/// (3, 6) and (3, 9) the palm keys.
pub const LEGENDS: [[&str; COLS as usize]; ROWS as usize] = [
    ["prog", "1", "2", "3", "4", "5", "led", "ctrl", "ctrl", "any", "6", "7", "8", "9", "0", "num"],
    ["`", "q", "w", "e", "r", "t", "tab", "bksp", "space", "enter", "y", "u", "i", "o", "p", "="],
    ["pgup", "a", "s", "d", "f", "g", "esc", "gui", "alt", "alt", "h", "j", "k", "l", ";", "'"],
    ["pgdn", "z", "x", "c", "v", "b", "fn", "shift", "shift", "fn", "n", "m", ",", ".", "/", "-"],
];

pub fn legend(row: u8, col: u8) -> &'static str {
    LEGENDS
        .get(row as usize)
        .and_then(|r| r.get(col as usize))
        .copied()
        .unwrap_or("")
}

/// Unshifted character for a shifted one
fn unshift(c: char) -> char {
    match c {
        '~' => '`',
        '!' => '1',
        '@' => '2',
        '#' => '3',
        '$' => '4',
        '%' => '5',
        '^' => '6',
        '&' => '7',
        '*' => '8',
        '(' => '9',
        ')' => '0',
        '+' => '=',
        '_' => '-',
        ':' => ';',
        '"' => '\'',
        '<' => ',',
        '>' => '.',
        '?' => '/',
        c => c.to_ascii_lowercase(),
    }
}

fn find(label: &str) -> Option<(u8, u8)> {
    LEGENDS.iter().enumerate().find_map(|(r, row)| {
        row.iter()
            .position(|l| *l == label)
            .map(|c| (r as u8, c as u8))
    })
}

/// Physical key for a terminal key, if it is on the board
pub fn key_position(code: KeyCode) -> Option<(u8, u8)> {
    match code {
        KeyCode::Char(' ') => find("space"),
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            find(unshift(c).encode_utf8(&mut buf))
        }
        KeyCode::Tab | KeyCode::BackTab => find("tab"),
        KeyCode::Enter => find("enter"),
        KeyCode::Backspace => find("bksp"),
        KeyCode::Esc => find("esc"),
        KeyCode::PageUp => find("pgup"),
        KeyCode::PageDown => find("pgdn"),
        _ => None,
    }
}
