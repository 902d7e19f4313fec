//! Invoker behavior against real child processes: streaming order,
//! pipe draining, and forced termination.

#![cfg(unix)]

mod common;

use reelsmith::{FnReporter, NullReporter, ToolCommand};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[test]
fn stream_lines_arrive_in_write_order() {
    let dir = tempfile::tempdir().unwrap();
    let script = common::fake_tool(
        dir.path(),
        "counter",
        "i=1\nwhile [ $i -le 50 ]; do echo $i; i=$((i+1)); done",
    );

    let lines = Mutex::new(Vec::new());
    let reporter = FnReporter(|_source: &str, line: &str| {
        lines.lock().unwrap().push(line.to_string());
    });

    let run = ToolCommand::new(&script).run(&reporter).expect("run counter");
    assert_eq!(run.exit_code, 0);

    let expected: Vec<String> = (1..=50).map(|i| i.to_string()).collect();
    assert_eq!(*lines.lock().unwrap(), expected);
    // Captured text matches the streamed lines.
    assert!(run.stdout.starts_with("1\n2\n"));
    assert!(run.stdout.ends_with("50"));
}

#[test]
fn stderr_lines_are_tagged() {
    let dir = tempfile::tempdir().unwrap();
    let script = common::fake_tool(dir.path(), "noisy", "echo info\necho warn >&2");

    let lines = Mutex::new(Vec::new());
    let reporter = FnReporter(|source: &str, line: &str| {
        lines.lock().unwrap().push(format!("{source}: {line}"));
    });

    ToolCommand::new(&script)
        .tag("noisy-op")
        .run(&reporter)
        .expect("run noisy");

    let lines = lines.lock().unwrap();
    assert!(lines.contains(&"noisy-op: info".to_string()));
    assert!(lines.contains(&"noisy-op: [stderr] warn".to_string()));
}

#[test]
fn kill_terminates_a_running_process_promptly() {
    let running = ToolCommand::new("sleep")
        .arg("30")
        .spawn()
        .expect("spawn sleep");
    let handle = running.handle();

    let killer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        handle.kill();
    });

    let started = Instant::now();
    let run = running.wait(&NullReporter).expect("wait after kill");
    killer.join().unwrap();

    // Wait must return promptly once killed, with a failure exit code.
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_ne!(run.exit_code, 0);
    assert!(!run.handle.is_live());
}

#[test]
fn kill_takes_down_descendants() {
    let dir = tempfile::tempdir().unwrap();
    let beat = dir.path().join("beat");
    // Background grandchild heartbeats into a file; the parent just
    // sleeps. Killing the group must silence the heartbeat too.
    let script = common::fake_tool(
        dir.path(),
        "parent",
        &format!(
            "(while true; do echo tick >> \"{beat}\"; sleep 0.1; done) &\nsleep 30",
            beat = beat.display()
        ),
    );

    let running = ToolCommand::new(&script).spawn().expect("spawn parent");
    let handle = running.handle();

    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(500));
        handle.kill();
    });

    running.wait(&NullReporter).expect("wait after kill");

    // Give any surviving heartbeat time to show itself.
    let size_after_kill = std::fs::metadata(&beat).map(|m| m.len()).unwrap_or(0);
    std::thread::sleep(Duration::from_millis(600));
    let size_later = std::fs::metadata(&beat).map(|m| m.len()).unwrap_or(0);
    assert_eq!(size_after_kill, size_later, "descendant kept running");
}

#[test]
fn duration_is_measured() {
    let run = ToolCommand::new("sleep")
        .arg("0.2")
        .run(&NullReporter)
        .expect("run sleep");
    assert!(run.duration >= Duration::from_millis(150));
}
