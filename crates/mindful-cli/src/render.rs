//! Text and JSON rendering of session events.

use chrono::Month;
use mindful_core::{format_clock, DisplayConfig, Event, MonthSummary};

const BELL: &str = "\x07";

pub struct Renderer {
    json: bool,
    display: DisplayConfig,
}

impl Renderer {
    pub fn new(json: bool, display: DisplayConfig) -> Self {
        Self { json, display }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Text to write for `event`, `None` when nothing should be shown.
    ///
    /// Tick lines start with `\r` and have no newline so the countdown
    /// redraws in place; every other line ends with `\n`.
    pub fn render(&self, event: &Event) -> Option<String> {
        if self.json {
            return serde_json::to_string(event).ok().map(|line| line + "\n");
        }
        match event {
            Event::Tick {
                remaining_secs,
                elapsed_secs,
            } => self.display.ticks.then(|| {
                format!(
                    "\r{} / {}",
                    format_clock(*remaining_secs),
                    format_clock(remaining_secs + elapsed_secs)
                )
            }),
            Event::Chime { elapsed_secs, .. } => Some(format!(
                "\n{}chime at {}\n",
                self.bell(),
                format_clock(*elapsed_secs)
            )),
            Event::TimerFinished { duration_secs, .. } => Some(format!(
                "\n{}session complete ({})\n",
                self.bell(),
                format_clock(*duration_secs)
            )),
            other => Some(format!("{}\n", describe(other))),
        }
    }

    fn bell(&self) -> &'static str {
        if self.display.bell {
            BELL
        } else {
            ""
        }
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::TimerStarted {
            remaining_secs,
            resumed,
            ..
        } => {
            let verb = if *resumed { "resumed" } else { "started" };
            format!("{verb} ({} left)", format_clock(*remaining_secs))
        }
        Event::TimerPaused { remaining_secs, .. } => {
            format!("\npaused at {}", format_clock(*remaining_secs))
        }
        Event::TimerReset { duration_secs, .. } => {
            format!("reset to {}", format_clock(*duration_secs))
        }
        Event::HistoryRecorded {
            date,
            added_secs,
            day_total_secs,
        } => format!(
            "recorded {} min on {date} ({} min today)",
            minutes(*added_secs),
            minutes(*day_total_secs)
        ),
        Event::AutoReset { duration_secs, .. } => {
            format!("ready ({})", format_clock(*duration_secs))
        }
        Event::DurationChanged { duration_secs, .. } => {
            format!("duration {}", format_clock(*duration_secs))
        }
        Event::SettingChanged { change, .. } => format!("setting {change:?}"),
        Event::SoundSelected { sound, .. } => format!("sound {}", sound.display_name()),
        Event::StateSnapshot {
            state,
            remaining_secs,
            duration_secs,
            progress_pct,
            settings,
            ..
        } => format!(
            "{state:?} {} / {} ({progress_pct:.0}%) sound={} fade={} chime={}m",
            format_clock(*remaining_secs),
            format_clock(*duration_secs),
            settings.sound,
            if settings.fade_enabled { "on" } else { "off" },
            settings.chime_interval_min
        ),
        Event::HistoryReport {
            month,
            lifetime_secs,
            ..
        } => format!(
            "{}lifetime: {} min",
            calendar(month),
            minutes(*lifetime_secs)
        ),
        Event::Tick { .. } | Event::Chime { .. } | Event::TimerFinished { .. } => String::new(),
    }
}

fn minutes(secs: u64) -> u64 {
    (secs + 30) / 60
}

/// Sunday-first month grid; each cell shows minutes practiced, `*` marks today.
fn calendar(month: &MonthSummary) -> String {
    let name = u8::try_from(month.month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("?");
    let mut out = format!("{name} {}\n", month.year);
    out.push_str(" Su  Mo  Tu  We  Th  Fr  Sa\n");

    let mut column = 0;
    for _ in 0..month.leading_blanks {
        out.push_str("    ");
        column += 1;
    }
    for day in &month.days {
        let mark = if day.is_today { '*' } else { ' ' };
        if day.minutes > 0 {
            out.push_str(&format!("{:>3}{mark}", day.minutes));
        } else {
            out.push_str(&format!("{:>3}{mark}", "."));
        }
        column += 1;
        if column == 7 {
            out.push('\n');
            column = 0;
        }
    }
    if column != 0 {
        out.push('\n');
    }
    out.push_str(&format!("month: {} min\n", minutes(month.total_secs)));
    out
}
