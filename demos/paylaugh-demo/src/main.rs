//! PAYLAUGH Demo - Pay per laugh comedy club
//!
//! Runs the real session controller against a synthetic camera and detector.
//! Press `l` to make the audience laugh and watch the bill grow.
//! Pass `--json` to dump every frame as a JSON line instead of the box UI.
//!
//! NOTE: This is a simulation - no actual video capture.

mod synthetic;
mod terminal;

use std::io::{self, Write};

use tokio::sync::mpsc;

use paylaugh_core::{Money, PaylaughError};
use paylaugh_runtime::{init_tracing, LogFormat, SessionConfig, SessionController};

use synthetic::{Mood, SyntheticCamera, SyntheticDetector, VideoControl};
use terminal::TerminalRenderer;

/// Ticks of laughter per `l` key press
const LAUGH_BURST: u32 = 8;

enum SessionEnd {
    Restart,
    Quit,
}

fn to_io(err: PaylaughError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn prompt(question: &str) -> io::Result<String> {
    print!("{}", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let format = std::env::var("PAYLAUGH_LOG_FORMAT")
        .ok()
        .and_then(|f| f.parse().ok())
        .unwrap_or(LogFormat::Pretty);
    let directive = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    if let Err(e) = init_tracing(format, Some(&directive)) {
        eprintln!("logging disabled: {}", e);
    }

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              PAYLAUGH Demo - Pay Per Laugh                   ║");
    println!("║                                                              ║");
    println!("║  The first comedy club that charges you for your happiness:  ║");
    println!("║  - Every laugh is billed at a fixed rate                     ║");
    println!("║  - A cooldown stops one long laugh being billed twice        ║");
    println!("║  - The bill is capped: laugh enough for a season ticket      ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let show = prompt("Show: [c]lub night or [s]hort show? ")?;
    let mut config = if show.to_lowercase().starts_with('s') {
        SessionConfig::short_show()
    } else {
        SessionConfig::default()
    };

    let price = prompt(&format!("Price per laugh [{}]: ", config.billing.price_per_laugh))?;
    if !price.is_empty() {
        match price.parse::<Money>() {
            Ok(price) => config.billing.price_per_laugh = price,
            Err(e) => println!("{}, keeping {}", e, config.billing.price_per_laugh),
        }
    }
    let threshold = prompt(&format!(
        "Laugh threshold [{}]: ",
        config.billing.laugh_threshold
    ))?;
    if !threshold.is_empty() {
        match threshold.parse::<f32>() {
            Ok(t) => config.billing.laugh_threshold = t,
            Err(e) => println!("{}, keeping {}", e, config.billing.laugh_threshold),
        }
    }
    config.validate().map_err(to_io)?;

    let faces: usize = prompt("Faces in the audience [1]: ")?.parse().unwrap_or(1);
    let granted = !prompt("Allow camera access? [Y/n] ")?
        .to_lowercase()
        .starts_with('n');

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<char>(10);
    std::thread::spawn(move || loop {
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => {
                let _ = cmd_tx.blocking_send('q');
                break;
            }
            Ok(_) => {
                if let Some(c) = input.trim().chars().next() {
                    if cmd_tx.blocking_send(c).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let json = std::env::args().any(|a| a == "--json");
    let mood = Mood::default();
    let mut seed = rand::random::<u64>();
    loop {
        let end = run_session(&config, granted, faces, seed, &mood, json, &mut cmd_rx).await?;
        match end {
            SessionEnd::Restart => seed = seed.wrapping_add(1),
            SessionEnd::Quit => break,
        }
    }

    println!("\n👋 Goodbye!");
    Ok(())
}

/// One session from camera acquisition to teardown
async fn run_session(
    config: &SessionConfig,
    granted: bool,
    faces: usize,
    seed: u64,
    mood: &Mood,
    json: bool,
    commands: &mut mpsc::Receiver<char>,
) -> io::Result<SessionEnd> {
    let video = VideoControl::default();
    let mut session = SessionController::new(
        config.clone(),
        SyntheticDetector::new(mood.clone(), faces, seed),
        SyntheticCamera::new(granted, video.clone()),
        TerminalRenderer::new(config.billing, json),
    )
    .map_err(to_io)?;

    println!("\nInitializing Biometric Billing Hardware...");
    if session.initialize().await.is_ok() {
        session.start().await.map_err(to_io)?;
    }

    let end = loop {
        let Some(cmd) = commands.recv().await else {
            break SessionEnd::Quit;
        };
        match cmd.to_ascii_lowercase() {
            'l' => mood.burst(LAUGH_BURST),
            'p' => {
                if video.toggle() {
                    tracing::info!("video paused");
                }
            }
            's' => {
                session.stop().await;
                let stats = session.stats();
                session.renderer().lock().summary(session.status(), &stats);
            }
            'r' => break SessionEnd::Restart,
            'q' => break SessionEnd::Quit,
            _ => {}
        }
    };

    session.stop().await;
    let poll = session.poll_stats();
    tracing::info!(
        session = %session.id(),
        ticks = poll.ticks,
        inference_errors = poll.inference_errors,
        laughs = poll.laughs_billed,
        "session ended"
    );
    let stats = session.stats();
    session.renderer().lock().summary(session.status(), &stats);

    Ok(end)
}
