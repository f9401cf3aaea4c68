//! Desktop simulator for the nitrox-rs dive gas analyzer UI.
//!
//! Drives the nitrox-core control loop with keyboard-fed button presses and
//! renders every screen as text to the terminal. Gas readings are synthetic
//! so the UI can be exercised without hardware; the history log is persisted
//! to a local file between runs.
//!
//! # Key bindings (each followed by Enter)
//!
//! | Key | Button                        |
//! |-----|-------------------------------|
//! | 1   | Primary (top)                 |
//! | 2   | Secondary (middle)            |
//! | 3   | Tertiary (bottom)             |
//! | q   | Quit the simulator            |

use std::collections::VecDeque;
use std::convert::Infallible;
use std::fs;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use nitrox_core::config::DeviceConfig;
use nitrox_core::control::Controller;
use nitrox_core::gas::{GasReading, GasSource, Telemetry, compute_mod};
use nitrox_core::history::{HISTORY_CAPACITY, HISTORY_WIRE_MAX, HistoryEntry, HistoryLog};
use nitrox_core::input::{ButtonEvent, ButtonId, InputPort};
use nitrox_core::render::{RenderStyle, Renderer};
use nitrox_core::screens::ScreenContent;

/// Where the append-only history log lives between runs.
const HISTORY_PATH: &str = "nitrox-history.bin";

/// Character width of the simulated display.
const SCREEN_COLS: usize = 26;

// ---------------------------------------------------------------------------
// Synthetic gas source
// ---------------------------------------------------------------------------

/// xorshift64 is plenty for placeholder data.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform draw in [0, 1).
    fn unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform draw in [lo, hi).
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }
}

/// Generates plausible-looking measurements in place of a real O2 cell.
struct SyntheticGasSource {
    rng: Rng,
}

impl SyntheticGasSource {
    fn new(seed: u64) -> Self {
        Self {
            rng: Rng::new(seed),
        }
    }
}

impl GasSource for SyntheticGasSource {
    fn produce_reading(&mut self) -> GasReading {
        // Uniform continuous draw over the synthetic display range.
        loop {
            if let Ok(reading) = GasReading::new(self.rng.range(19.0, 75.0)) {
                return reading;
            }
        }
    }

    fn sample_telemetry(&mut self) -> Telemetry {
        Telemetry {
            battery_volts: 3.0 + self.rng.unit(),
            sensor_volts: self.rng.range(0.0, 5.0),
        }
    }

    fn fetch_history(&mut self, count: usize) -> heapless::Vec<HistoryEntry, HISTORY_CAPACITY> {
        let mut entries = heapless::Vec::new();
        for seq in (1..=count.min(HISTORY_CAPACITY) as u32).rev() {
            let o2 = round_to_tenth(self.rng.range(21.0, 99.9));
            let Ok(mod_1_6_m) = compute_mod(o2, 1.6) else {
                continue;
            };
            let _ = entries.push(HistoryEntry {
                sequence: seq,
                o2_percent: o2,
                mod_1_6_m,
            });
        }
        entries
    }
}

fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Keyboard input
// ---------------------------------------------------------------------------

/// Button presses typed on stdin, delivered at most one per button per
/// poll cycle; surplus presses stay queued for later cycles.
struct KeyInput {
    rx: mpsc::Receiver<ButtonId>,
    pending: VecDeque<ButtonId>,
}

impl InputPort for KeyInput {
    fn poll(&mut self) -> heapless::Vec<ButtonEvent, 3> {
        while let Ok(button) = self.rx.try_recv() {
            self.pending.push_back(button);
        }

        let mut out = heapless::Vec::new();
        let mut seen = [false; 3];
        let mut keep = VecDeque::new();
        while let Some(button) = self.pending.pop_front() {
            let slot = match button {
                ButtonId::Primary => 0,
                ButtonId::Secondary => 1,
                ButtonId::Tertiary => 2,
            };
            if seen[slot] {
                keep.push_back(button);
            } else {
                seen[slot] = true;
                let _ = out.push(ButtonEvent::Press(button));
            }
        }
        self.pending = keep;
        out
    }
}

/// Reads stdin on its own thread so the poll loop keeps its fixed cadence.
fn spawn_stdin_input() -> (KeyInput, Arc<AtomicBool>) {
    let quit = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();

    let quit_flag = Arc::clone(&quit);
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for ch in line.chars() {
                let button = match ch {
                    '1' => ButtonId::Primary,
                    '2' => ButtonId::Secondary,
                    '3' => ButtonId::Tertiary,
                    'q' | 'Q' => {
                        quit_flag.store(true, Ordering::Relaxed);
                        return;
                    }
                    _ => continue,
                };
                if tx.send(button).is_err() {
                    return;
                }
            }
        }
        quit_flag.store(true, Ordering::Relaxed);
    });

    (
        KeyInput {
            rx,
            pending: VecDeque::new(),
        },
        quit,
    )
}

// ---------------------------------------------------------------------------
// Terminal renderer
// ---------------------------------------------------------------------------

/// Full-screen redraw as a text frame. Colors and font scaling have no
/// terminal equivalent, so the style only shapes the frame width.
struct TerminalRenderer {
    cols: usize,
}

impl Renderer for TerminalRenderer {
    type Error = Infallible;

    fn draw(&mut self, content: &ScreenContent, _style: &RenderStyle) -> Result<(), Self::Error> {
        println!("+{}+", "-".repeat(self.cols));
        for line in &content.lines {
            println!("|{:^width$}|", line.as_str(), width = self.cols);
        }
        let labels: Vec<String> = content
            .button_labels
            .iter()
            .map(|label| {
                if label.is_empty() {
                    String::from("----")
                } else {
                    label.as_str().to_owned()
                }
            })
            .collect();
        println!("+{}+", "-".repeat(self.cols));
        println!("  1:{}  2:{}  3:{}", labels[0], labels[1], labels[2]);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Delay + persistence glue
// ---------------------------------------------------------------------------

struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Restore the persisted log, or seed a fresh one from the source.
fn load_or_seed_history(source: &mut SyntheticGasSource, depth: usize) -> HistoryLog {
    match fs::read(HISTORY_PATH) {
        Ok(bytes) => match HistoryLog::decode(&bytes) {
            Ok(log) => {
                info!("restored {} history entries from {}", log.len(), HISTORY_PATH);
                return log;
            }
            Err(err) => warn!("persisted history unreadable ({}), reseeding", err),
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("could not read {} ({}), reseeding", HISTORY_PATH, err),
    }
    HistoryLog::from_entries(&source.fetch_history(depth))
}

fn save_history(log: &HistoryLog) -> io::Result<()> {
    let mut buf = [0u8; HISTORY_WIRE_MAX];
    let bytes = log
        .encode(&mut buf)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    fs::write(HISTORY_PATH, bytes)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting nitrox-rs simulator");
    info!("Keys: 1=Primary  2=Secondary  3=Tertiary  q=Quit (Enter submits)");

    let config = DeviceConfig::default();
    let style = RenderStyle::default();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let mut source = SyntheticGasSource::new(seed);
    let history = load_or_seed_history(&mut source, config.boot_history_depth);

    let (inputs, quit) = spawn_stdin_input();
    let mut controller = Controller::new(
        inputs,
        source,
        TerminalRenderer { cols: SCREEN_COLS },
        StdDelay,
        history,
        config,
        style,
    );

    if let Err(err) = controller.start() {
        error!("initial draw failed: {}", err);
        return;
    }

    let poll_interval = Duration::from_millis(u64::from(config.poll_interval_ms));
    while !quit.load(Ordering::Relaxed) {
        // A bad frame is dropped loudly; the machine state stays valid and
        // the loop keeps polling.
        if let Err(err) = controller.poll_cycle() {
            error!("frame dropped: {}", err);
        }
        thread::sleep(poll_interval);
    }

    if let Err(err) = save_history(controller.history()) {
        warn!("could not persist history: {}", err);
    } else {
        info!("history saved to {}", HISTORY_PATH);
    }
    info!("Simulator exiting");
}
