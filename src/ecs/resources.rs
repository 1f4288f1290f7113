use bracket_terminal::prelude::RGB;

pub mod log_color {
    pub const PLAYER_ATTACK: (u8, u8, u8) = (224, 224, 224);
    pub const ENEMY_ATTACK: (u8, u8, u8) = (255, 192, 192);
    pub const PLAYER_DIE: (u8, u8, u8) = (255, 48, 48);
    pub const ENEMY_DIE: (u8, u8, u8) = (255, 160, 48);
    pub const IMPOSSIBLE: (u8, u8, u8) = (128, 128, 128);
    pub const HEALTH_RECOVERED: (u8, u8, u8) = (0, 255, 0);
    pub const STATUS_EFFECT: (u8, u8, u8) = (63, 255, 63);
    pub const TRICK: (u8, u8, u8) = (200, 5, 0);
    pub const WELCOME: (u8, u8, u8) = (32, 160, 255);
    pub const DESCEND: (u8, u8, u8) = (159, 63, 255);
    pub const NEUTRAL: (u8, u8, u8) = (255, 255, 255);
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub color: RGB,
}

/// Full-history message log; the renderer shows the tail.
#[derive(Default)]
pub struct MessageLog {
    pub entries: Vec<LogEntry>,
}

impl MessageLog {
    pub fn push<S: Into<String>>(&mut self, text: S, color: (u8, u8, u8)) {
        self.entries.push(LogEntry {
            text: text.into(),
            color: RGB::from_u8(color.0, color.1, color.2),
        });
    }

    pub fn tail(&self, count: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_returns_the_most_recent_entries() {
        let mut log = MessageLog::default();
        for i in 0..10 {
            log.push(format!("entry {i}"), log_color::NEUTRAL);
        }
        let tail = log.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].text, "entry 7");
        assert_eq!(tail[2].text, "entry 9");
        assert_eq!(log.tail(50).len(), 10);
    }
}
