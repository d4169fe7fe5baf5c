// FarmWatch — Serial Input Task
//
// Splits the console input into lines and forwards them to the control task.
// No controller state is touched here.

use std::io::{BufRead, ErrorKind};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::config::STACK_SERIAL;

const IDLE_POLL: Duration = Duration::from_millis(50);

/// How to treat end-of-input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// The ESP-IDF console reports "no data yet" as EOF; keep polling.
    Polled,
    /// A real stream (host stdin); EOF ends the task.
    Stream,
}

pub fn spawn_line_reader<R>(
    reader: R,
    mode: InputMode,
    tx: Sender<String>,
) -> std::io::Result<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("serial".into())
        .stack_size(STACK_SERIAL)
        .spawn(move || serial_task(reader, mode, tx))
}

pub fn serial_task<R: BufRead>(mut reader: R, mode: InputMode, tx: Sender<String>) {
    log::info!("Serial task started");

    let mut buf = String::new();
    loop {
        match reader.read_line(&mut buf) {
            Ok(0) => {
                if mode == InputMode::Stream {
                    forward(&mut buf, &tx);
                    log::debug!("Serial input closed");
                    return;
                }
                thread::sleep(IDLE_POLL);
            }
            Ok(_) => {
                // Partial lines stay buffered until the newline arrives.
                if buf.ends_with('\n') && !forward(&mut buf, &tx) {
                    log::warn!("Command channel closed, exiting serial task");
                    return;
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                thread::sleep(IDLE_POLL);
            }
            Err(e) => {
                log::warn!("Serial read error: {e}");
                buf.clear();
                thread::sleep(IDLE_POLL);
            }
        }
    }
}

/// Send the buffered line (if any) and clear the buffer. Returns false when
/// the receiver has gone away.
fn forward(buf: &mut String, tx: &Sender<String>) -> bool {
    let line = buf.trim().to_string();
    buf.clear();
    if line.is_empty() {
        return true;
    }
    tx.send(line).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    #[test]
    fn forwards_trimmed_non_empty_lines() {
        let (tx, rx) = mpsc::channel();
        let input = Cursor::new("SETPOINT:65\r\n\n  STATUS  \nHELP");
        serial_task(input, InputMode::Stream, tx);
        let got: Vec<String> = rx.try_iter().collect();
        assert_eq!(got, vec!["SETPOINT:65", "STATUS", "HELP"]);
    }

    #[test]
    fn stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        // returns instead of looping forever
        serial_task(Cursor::new("STATUS\nINFO\n"), InputMode::Stream, tx);
    }

    #[test]
    fn spawned_reader_delivers_lines() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_line_reader(Cursor::new("RESET\n"), InputMode::Stream, tx).unwrap();
        handle.join().unwrap();
        assert_eq!(rx.recv().unwrap(), "RESET");
    }
}
