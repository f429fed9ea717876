//! Terminal render sink

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};

use paylaugh_core::{BillingConfig, SessionStats};
use paylaugh_runtime::{
    Dashboard, OverlayBox, RenderFrame, RenderSink, SessionFailure, SessionStatus,
};

const RULE: &str = "╠══════════════════════════════════════════════════════════════╣";

/// Parse a `#rrggbb` overlay color
fn hex_color(hex: &str) -> Color {
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(255)
    };
    Color::Rgb {
        r: channel(1),
        g: channel(3),
        b: channel(5),
    }
}

/// Draws the club's screen with box characters
pub struct TerminalRenderer {
    billing: BillingConfig,
    status: SessionStatus,
    /// Print one JSON line per frame instead of the box UI
    json: bool,
}

impl TerminalRenderer {
    pub fn new(billing: BillingConfig, json: bool) -> Self {
        TerminalRenderer {
            billing,
            status: SessionStatus::Initializing,
            json,
        }
    }

    fn header(&self) {
        print!("\x1B[2J\x1B[H");
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║                      {}                           ║", "PAY PER LAUGH".red().bold());
        println!("║  \"The first comedy club that charges you for your happiness.\" ║");
        println!("{}", RULE);
    }

    fn dashboard(&self, stats: &SessionStats) {
        let dashboard = Dashboard::project(stats, &self.billing, self.status.is_active());
        println!("║ TOTAL LAUGHS: {}", dashboard.total_laughs.to_string().bold());
        if dashboard.season_ticket {
            println!(
                "║ CURRENT BILL: {}  {}",
                dashboard.bill.clone().green().bold(),
                "SEASON TICKET ACTIVE".black().on_yellow()
            );
        } else {
            println!("║ CURRENT BILL: {}", dashboard.bill.clone().green().bold());
        }
        println!("{}", RULE);

        let system = if dashboard.system_active {
            "Active".green()
        } else {
            "Offline".red()
        };
        println!(
            "║ System: {} | Rate: {} | Sensitivity: {}",
            system, dashboard.rate, dashboard.sensitivity
        );
    }

    fn face(overlay: &OverlayBox) {
        let b = overlay.bounding_box;
        println!(
            "║   {} [{:>4.0},{:>4.0} {:>3.0}x{:<3.0}]",
            overlay.label.clone().with(hex_color(overlay.style.color())).bold(),
            b.x,
            b.y,
            b.width,
            b.height
        );
    }

    fn footer(&self) {
        println!("{}", RULE);
        println!("║ Commands: [l]augh, [p]ause video, [s]top, [r]estart, [q]uit   ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        io::stdout().flush().ok();
    }

    /// Final screen once a session is torn down
    pub fn summary(&mut self, status: SessionStatus, stats: &SessionStats) {
        self.status = status;
        self.header();
        println!("║ Session {}. Thanks for laughing with us.", status);
        println!("{}", RULE);
        self.dashboard(stats);
        self.footer();
    }
}

impl RenderSink for TerminalRenderer {
    fn render(&mut self, frame: &RenderFrame) {
        self.status = frame.status;
        if self.json {
            match serde_json::to_string(frame) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("frame dump failed: {}", e),
            }
            return;
        }

        self.header();
        println!(
            "║ Session {} | {} | t={}",
            frame.session, frame.status, frame.at
        );
        println!("{}", RULE);
        self.dashboard(&frame.stats);
        println!("{}", RULE);

        if frame.overlays.is_empty() {
            println!("║   {}", "No faces in view".dark_grey());
        }
        for overlay in &frame.overlays {
            Self::face(overlay);
        }
        match frame.celebration {
            Some(c) => println!(
                "║\n║                 😂  {} billed, now {}",
                c.laugh.id,
                c.laugh.bill_after.to_string().green().bold()
            ),
            None => println!("║\n║"),
        }
        self.footer();
    }

    fn show_error(&mut self, failure: &SessionFailure) {
        self.status = SessionStatus::Error;
        self.header();
        println!("║ {}", "SYSTEM ERROR".red().bold());
        println!("║ {}", failure.message().red());
        println!("{}", RULE);
        println!("║ Commands: [r]etry system link, [q]uit                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        io::stdout().flush().ok();
    }

    fn status_changed(&mut self, status: SessionStatus) {
        self.status = status;
        if status == SessionStatus::Ready {
            println!("Camera and models ready. Starting the show...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#22c55e"), Color::Rgb { r: 0x22, g: 0xc5, b: 0x5e });
        assert_eq!(hex_color("#dc2626"), Color::Rgb { r: 0xdc, g: 0x26, b: 0x26 });
    }
}
