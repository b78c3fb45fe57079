use colored::Colorize;

pub struct Theme {
    pub title: fn(&str) -> String,
    pub line: fn(&str) -> String,
    pub idx: fn(&str) -> String,
    pub label: fn(&str) -> String,
    pub price: fn(&str) -> String,
    pub discount: fn(&str) -> String,
    pub muted: fn(&str) -> String,
    pub eco: fn(&str) -> String,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "leaf" | "" => Self::leaf(),
            "earth" => Self::earth(),
            "plain" => Self::plain(),
            _ => {
                eprintln!("{}", format!("✘ Unknown theme: {}", name).red());
                Self::leaf()
            }
        }
    }

    fn leaf() -> Self {
        Self {
            title: |s| s.bright_green().bold().underline().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.bright_white().to_string(),
            label: |s| s.white().to_string(),
            price: |s| s.yellow().bold().to_string(),
            discount: |s| s.red().italic().to_string(),
            muted: |s| s.bright_white().dimmed().italic().to_string(),
            eco: |s| s.green().to_string(),
        }
    }

    fn earth() -> Self {
        Self {
            title: |s| s.yellow().bold().underline().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.cyan().to_string(),
            label: |s| s.bright_white().to_string(),
            price: |s| s.bright_yellow().to_string(),
            discount: |s| s.magenta().to_string(),
            muted: |s| s.bright_black().italic().to_string(),
            eco: |s| s.bright_green().italic().to_string(),
        }
    }

    fn plain() -> Self {
        Self {
            title: |s| s.to_string(),
            line: |s| s.to_string(),
            idx: |s| s.to_string(),
            label: |s| s.to_string(),
            price: |s| s.to_string(),
            discount: |s| s.to_string(),
            muted: |s| s.to_string(),
            eco: |s| s.to_string(),
        }
    }
}
