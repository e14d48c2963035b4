//! Mock tray demo — two SNI icons driven through a scripted command
//! sequence: icons, tooltips, a blink phase, hide/show, removal.
//!
//! Run with:
//!     cargo run --bin multitray-demo
//!
//! Needs a running StatusNotifier host (waybar, a KDE/GNOME tray, ...).
//! Press Ctrl-C to quit early.

use image::{Rgba, RgbaImage};
use multitray::command::Command;
use multitray::registry::TrayRegistry;
use multitray::sni::backend::SniBackend;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Milliseconds between scripted steps.
const STEP_MS: u64 = 2_000;
/// Tick granularity while idling between steps.
const TICK_MS: u64 = 50;
/// Edge length of the generated icons.
const ICON_SIZE: u32 = 22;

fn write_icon(dir: &Path, name: &str, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    let img = RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, Rgba(rgba));
    img.save(&path).expect("write demo icon");
    path
}

fn main() {
    env_logger::init();

    let dir = std::env::temp_dir().join(format!("multitray-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create icon dir");
    let green = write_icon(&dir, "green.png", [0x2e, 0xcc, 0x71, 0xff]);
    let red = write_icon(&dir, "red.png", [0xe7, 0x4c, 0x3c, 0xff]);

    let mut registry = TrayRegistry::new(SniBackend::new());

    let script = [
        format!("mail set-icon {}", green.display()),
        "mail set-tooltip No unread mail".to_string(),
        format!("alert set-icon {}", red.display()),
        "alert set-tooltip Disk almost full".to_string(),
        "alert blink".to_string(),
        "mail hide".to_string(),
        "mail show".to_string(),
        "alert unblink".to_string(),
        "alert remove".to_string(),
        "mail remove".to_string(),
    ];

    eprintln!("Mock tray demo — two icons cycle through the command set.");
    eprintln!("Press Ctrl-C to quit.");

    for line in &script {
        eprintln!("> {}", line);
        let cmd = Command::parse(line).expect("demo script line");
        if let Err(e) = registry.handle(cmd) {
            eprintln!("  error: {}", e);
        }
        // Idle until the next step, ticking so blink phases advance.
        let step_end = Instant::now() + Duration::from_millis(STEP_MS);
        while Instant::now() < step_end {
            std::thread::sleep(Duration::from_millis(TICK_MS));
            registry.tick(Instant::now());
        }
    }

    registry.shutdown();
    let _ = std::fs::remove_dir_all(&dir);
    eprintln!("Done.");
}
