//! Command implementations for the ffbctl CLI.

use std::thread;
use std::time::Duration;

use tracing::info;

use forcerelay_channel::CommandSink;
use forcerelay_control_protocol::{const_command, ControlCommand};

/// The sweep staircase: ramp left to right and back, ending released.
/// Values are wire-protocol units, -100 to 100.
pub const SWEEP_STEPS: [i8; 14] = [-60, -40, -20, 0, 20, 40, 60, 40, 20, 0, -20, -40, -60, 0];

/// The command a force value maps to: zero releases, anything else holds.
pub fn force_command(value: i8) -> ControlCommand {
    if value == 0 {
        ControlCommand::Stop
    } else {
        ControlCommand::Const(value)
    }
}

fn send(channel: &dyn CommandSink, command: &ControlCommand) {
    info!("sending {command}");
    println!("{command}");
    channel.send(command);
}

/// Hold one force for `hold_ms`, resending every `interval_ms` the way the
/// relay refreshes a playing effect, then release.
pub fn run_const(channel: &dyn CommandSink, value: i8, hold_ms: u64, interval_ms: u64) {
    let command = force_command(value);
    let hold = Duration::from_millis(hold_ms);
    let interval = Duration::from_millis(interval_ms.max(1));

    let mut elapsed = Duration::ZERO;
    loop {
        send(channel, &command);
        if elapsed >= hold {
            break;
        }
        let step = interval.min(hold - elapsed);
        thread::sleep(step);
        elapsed += step;
    }
    if command != ControlCommand::Stop {
        send(channel, &ControlCommand::Stop);
    }
}

/// Send a single release.
pub fn run_stop(channel: &dyn CommandSink) {
    send(channel, &ControlCommand::Stop);
}

/// Walk the staircase with a fixed dwell per step.
pub fn run_sweep(channel: &dyn CommandSink, interval_ms: u64) {
    let dwell = Duration::from_millis(interval_ms);
    for (index, value) in SWEEP_STEPS.iter().enumerate() {
        send(channel, &force_command(*value));
        if index + 1 < SWEEP_STEPS.len() {
            thread::sleep(dwell);
        }
    }
}

/// Run the relay's own magnitude translation and send the result.
pub fn run_magnitude(channel: &dyn CommandSink, magnitude: i32) {
    send(channel, &const_command(magnitude));
}
